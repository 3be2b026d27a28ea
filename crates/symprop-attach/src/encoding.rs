//! Text encoding of library files.
//!
//! Libraries are UTF-8 in practice, but the encoding is caller-configurable by
//! WHATWG label (`utf-8`, `windows-1252`, ...). Decoding is strict — malformed
//! input is an error, not replacement characters — and deliberately does not
//! strip a BOM, so a BOM survives the read-patch-write cycle untouched.

use std::fmt;

use encoding_rs::Encoding;

/// A resolved text encoding for reading and writing library files.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding(&'static Encoding);

impl TextEncoding {
    /// Resolve an encoding from a WHATWG label, e.g. `utf-8` or `latin1`.
    pub fn for_label(label: &str) -> Option<Self> {
        Encoding::for_label(label.trim().as_bytes()).map(Self)
    }

    pub fn utf8() -> Self {
        Self(encoding_rs::UTF_8)
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Decode file bytes. Returns `None` when the bytes are not valid in this
    /// encoding.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        self.0
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|cow| cow.into_owned())
    }

    /// Encode text for writing.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        let (bytes, _, _) = self.0.encode(text);
        bytes.into_owned()
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self::utf8()
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextEncoding({})", self.name())
    }
}
