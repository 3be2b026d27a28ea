//! Textual patching of `.kicad_sym` sources.
//!
//! Property blocks are spliced directly into the original text rather than
//! re-serializing the parsed tree: locating each `(symbol "<name>"` occurrence,
//! scanning to its matching closing paren with a depth counter and a
//! string-literal toggle, and inserting a self-balanced block just before the
//! closing paren. The search cursor only ever moves forward, so a symbol name
//! that happens to appear inside an inserted block is never re-matched.

use symprop_sexpr::quote_string;

/// One property block to insert into every textual occurrence of a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRequest {
    /// Symbol name, as it appears quoted in the source.
    pub symbol: String,
    /// Property name to insert.
    pub property: String,
    /// Property value.
    pub value: String,
}

/// Line-ending style of the file being patched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Newline {
    Lf,
    CrLf,
}

impl Newline {
    /// Detect the line-ending style from the first line break of `text`.
    /// Defaults to LF when there are no line breaks at all.
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(idx) if idx > 0 && text.as_bytes()[idx - 1] == b'\r' => Newline::CrLf,
            _ => Newline::Lf,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Newline::Lf => "\n",
            Newline::CrLf => "\r\n",
        }
    }
}

/// Insert property blocks into `original`, one request at a time.
///
/// Each request is applied to every occurrence of its symbol in the text as it
/// stands after earlier requests. An occurrence with no matching closing paren
/// before end of input is skipped and the run continues.
pub fn insert_properties(original: &str, requests: &[PatchRequest], newline: Newline) -> String {
    let mut text = original.to_string();
    for request in requests {
        let needle = format!("(symbol {}", quote_string(&request.symbol));
        let mut cursor = 0usize;
        while let Some(rel) = text[cursor..].find(&needle) {
            let hit = cursor + rel;
            // Back up to the opening paren of the symbol form. The needle
            // starts with one, so this cannot scan past the cursor.
            let Some(rel_open) = text[cursor..=hit].rfind('(') else {
                cursor = hit + needle.len();
                continue;
            };
            let open = cursor + rel_open;
            let Some(close) = matching_paren(&text, open) else {
                // Malformed occurrence: no closing paren before EOF.
                log::debug!(
                    "no closing paren for symbol {:?} at byte {open}; skipping occurrence",
                    request.symbol
                );
                cursor = open + 1;
                continue;
            };
            let indent = block_indent(&text, open, close);
            let block = property_block(&request.property, &request.value, &indent, newline);
            text.insert_str(close, &block);
            cursor = close + block.len() + 1;
        }
    }
    text
}

/// Find the index of the `)` matching the `(` at `open`.
///
/// Parens inside string literals do not affect depth; a quote preceded by a
/// backslash does not toggle string mode.
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth: usize = 0;
    let mut in_string = false;
    for i in open..bytes.len() {
        match bytes[i] {
            b'"' => {
                let escaped = i > 0 && bytes[i - 1] == b'\\';
                if !escaped {
                    in_string = !in_string;
                }
            }
            b'(' if !in_string => depth += 1,
            b')' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Derive the base indent for a new property block inside `text[open..close]`.
///
/// Prefers the exact leading whitespace of an existing `(property ` line inside
/// the span; falls back to the indent of the line holding the closing paren,
/// then to two spaces.
fn block_indent(text: &str, open: usize, close: usize) -> String {
    let span = &text[open..close];
    for line in span.lines() {
        let stripped = line.trim_start();
        if stripped.starts_with("(property ") {
            return line[..line.len() - stripped.len()].to_string();
        }
    }
    let Some(last_break) = span.rfind('\n') else {
        return "  ".to_string();
    };
    let indent: String = text[open + last_break + 1..]
        .chars()
        .take_while(|&ch| ch == ' ' || ch == '\t')
        .collect();
    if indent.is_empty() {
        "  ".to_string()
    } else {
        indent
    }
}

/// Build the full multi-line property block, KiCad-shaped, ready to splice in
/// front of a symbol form's closing paren.
fn property_block(name: &str, value: &str, indent: &str, newline: Newline) -> String {
    let nl = newline.as_str();
    let ind2 = format!("{indent}  ");
    let ind3 = format!("{ind2}  ");
    let ind4 = format!("{ind3}  ");
    format!(
        "{indent}(property {} {}{nl}\
         {ind2}(at 0 0 0){nl}\
         {ind2}(effects{nl}\
         {ind3}(font{nl}\
         {ind4}(size 1.27 1.27){nl}\
         {ind3}){nl}\
         {ind3}(hide yes){nl}\
         {ind2}){nl}\
         {indent}){nl}",
        quote_string(name),
        quote_string(value),
    )
}
