//! Run orchestration: classify every symbol against the requested property
//! names, then patch the original text and write it out.
//!
//! The parsed tree decides *which* symbols get *which* properties; the textual
//! patcher blindly executes those decisions. The tree is never serialized, so
//! the two representations cannot drift apart within a run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use symprop_sexpr::{library, ParseError};
use thiserror::Error;

use crate::backup::create_numbered_backup;
use crate::encoding::TextEncoding;
use crate::patch::{insert_properties, Newline, PatchRequest};

/// Placeholder used in stats and reports for symbols without a string name.
pub const UNNAMED_SYMBOL: &str = "<unnamed>";

/// Errors an attachment run can fail with. Parse and I/O failures are kept
/// distinct so callers can report them separately.
#[derive(Debug, Error)]
pub enum AttachError {
    #[error("syntax error: {0}")]
    Parse(#[from] ParseError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: not valid {encoding} text", path.display())]
    Decode { path: PathBuf, encoding: String },
}

impl AttachError {
    fn io(path: &Path, source: io::Error) -> Self {
        AttachError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Run configuration, passed explicitly rather than held in globals.
#[derive(Debug, Clone)]
pub struct AttachOptions {
    /// Where to write the patched library. `None` writes the input back in
    /// place.
    pub output: Option<PathBuf>,
    /// Classify and count, but leave the filesystem untouched.
    pub dry_run: bool,
    /// Encoding used for both reading and writing.
    pub encoding: TextEncoding,
}

impl Default for AttachOptions {
    fn default() -> Self {
        Self {
            output: None,
            dry_run: false,
            encoding: TextEncoding::utf8(),
        }
    }
}

/// Aggregate outcome of one run. The added/skipped lists hold one entry per
/// (symbol, property) decision, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachStats {
    pub symbols_processed: usize,
    pub properties_added: usize,
    pub properties_skipped: usize,
    pub added_symbols: Vec<String>,
    pub skipped_symbols: Vec<String>,
}

/// Attach `property_names` (with `property_value`) to every symbol in the
/// library at `input` that does not already carry them.
///
/// Unless `options.dry_run` is set, the input is first backed up to a numbered
/// `.orig` sibling, then the patched text is written to the output target
/// (defaulting to the input path), creating parent directories as needed.
/// Statistics are returned either way.
pub fn attach_properties(
    input: &Path,
    property_names: &[String],
    property_value: &str,
    options: &AttachOptions,
) -> Result<AttachStats, AttachError> {
    let bytes = fs::read(input).map_err(|e| AttachError::io(input, e))?;
    let original = options
        .encoding
        .decode(&bytes)
        .ok_or_else(|| AttachError::Decode {
            path: input.to_path_buf(),
            encoding: options.encoding.name().to_string(),
        })?;
    let root = symprop_sexpr::parse(&original)?;

    let mut stats = AttachStats::default();
    // Symbol name -> property names to insert, in document order. Keyed by
    // name so a library with duplicate symbol forms yields one request per
    // (name, property) pair; the patcher already hits every occurrence.
    let mut to_add: Vec<(String, Vec<String>)> = Vec::new();

    for (form, _idx) in library::symbols(&root) {
        stats.symbols_processed += 1;
        let name = library::symbol_name(form);
        let display = if name.is_empty() { UNNAMED_SYMBOL } else { name };
        let mut props_to_add: Vec<String> = Vec::new();
        for prop in property_names {
            if library::has_property(form, prop) {
                stats.properties_skipped += 1;
                stats.skipped_symbols.push(display.to_string());
            } else {
                stats.properties_added += 1;
                stats.added_symbols.push(display.to_string());
                props_to_add.push(prop.clone());
            }
        }
        // Unnamed symbols cannot be located textually; they are counted but
        // produce no patch request.
        if !name.is_empty() && !props_to_add.is_empty() {
            match to_add.iter_mut().find(|(n, _)| n.as_str() == name) {
                Some(entry) => entry.1 = props_to_add,
                None => to_add.push((name.to_string(), props_to_add)),
            }
        }
    }

    if !options.dry_run {
        create_numbered_backup(input).map_err(|e| AttachError::io(input, e))?;

        let target = options.output.as_deref().unwrap_or(input);
        let newline = Newline::detect(&original);
        let requests: Vec<PatchRequest> = to_add
            .iter()
            .flat_map(|(symbol, props)| {
                props.iter().map(|prop| PatchRequest {
                    symbol: symbol.clone(),
                    property: prop.clone(),
                    value: property_value.to_string(),
                })
            })
            .collect();
        log::debug!(
            "patching {} request(s) into {}",
            requests.len(),
            target.display()
        );
        let patched = insert_properties(&original, &requests, newline);

        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| AttachError::io(target, e))?;
            }
        }
        fs::write(target, options.encoding.encode(&patched))
            .map_err(|e| AttachError::io(target, e))?;
    }

    Ok(stats)
}
