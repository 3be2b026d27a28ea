//! Batch property attachment for KiCad symbol libraries.
//!
//! Given a `.kicad_sym` file and one or more property names, [`attach_properties`]
//! adds a property block to every symbol that does not already carry a property
//! of that name. Classification runs over a parsed tree ([`symprop_sexpr`]),
//! but the edited file is produced by splicing property blocks into the
//! original source text so that everything untouched stays byte-for-byte
//! identical — spacing, comments, number formatting, and line endings.

pub mod attach;
pub mod backup;
pub mod encoding;
pub mod patch;
pub mod report;

pub use attach::{attach_properties, AttachError, AttachOptions, AttachStats};
pub use encoding::TextEncoding;
pub use patch::{insert_properties, Newline, PatchRequest};
