//! Symbol-library queries over a parsed `.kicad_sym` tree.
//!
//! A library file parses to a single root form `(kicad_symbol_lib ...)` whose
//! children are metadata forms (`version`, `generator`, ...) followed by
//! `(symbol "Name" ...)` forms. These helpers only read the tree; they never
//! modify it.

use crate::Sexpr;

/// Root tag of a KiCad symbol library document.
pub const LIBRARY_TAG: &str = "kicad_symbol_lib";

/// Tag of a symbol (component definition) form.
pub const SYMBOL_TAG: &str = "symbol";

/// Tag of a property form inside a symbol.
pub const PROPERTY_TAG: &str = "property";

/// Enumerate all top-level `(symbol ...)` forms in document order.
///
/// Returns each form with its index among the root form's children. Unknown
/// sibling forms are skipped but their positions still count, so the index is
/// stable for a given input.
pub fn symbols(root: &Sexpr) -> Vec<(&Sexpr, usize)> {
    let Some(items) = root.as_list() else {
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| {
            item.as_list()
                .and_then(|list| list.first())
                .and_then(Sexpr::as_sym)
                == Some(SYMBOL_TAG)
        })
        .map(|(idx, item)| (item, idx))
        .collect()
}

/// Get the symbol name from `(symbol "Name" ...)`.
///
/// Returns an empty string when the second element is missing or not a string
/// literal; such symbols are still processed and reported as `<unnamed>`.
pub fn symbol_name(form: &Sexpr) -> &str {
    form.as_list()
        .and_then(|items| items.get(1))
        .and_then(Sexpr::as_str)
        .unwrap_or("")
}

/// Check whether a symbol form already carries a property with this name.
///
/// Matching is exact and case-sensitive on the property form's second element;
/// the property's value and children are irrelevant.
pub fn has_property(form: &Sexpr, name: &str) -> bool {
    let Some(items) = form.as_list() else {
        return false;
    };
    items.iter().any(|item| {
        item.as_list().is_some_and(|list| {
            list.first().and_then(Sexpr::as_sym) == Some(PROPERTY_TAG)
                && list.get(1).and_then(Sexpr::as_str) == Some(name)
        })
    })
}
