//! Coercions applied to command-line strings before they go over the wire.

/// `"true"` in any case is `true`, everything else is `false`.
pub fn str_to_bool(s: &str) -> bool {
    s.eq_ignore_ascii_case("true")
}

/// Like [`str_to_bool`] but only `"true"` and `"false"` are accepted.
pub fn strict_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// The `"none"` placeholder (any case) stands for an empty field.
pub fn none_to_empty(s: &str) -> &str {
    if s.eq_ignore_ascii_case("none") {
        ""
    } else {
        s
    }
}

/// Split a comma separated list, keeping order and empty items.
///
/// An empty (or blank) input is an empty list, surrounding whitespace is
/// trimmed from each item.
pub fn split_list(s: &str) -> Vec<String> {
    if s.trim().is_empty() {
        return Vec::new();
    }
    s.split(',').map(|item| item.trim().to_string()).collect()
}
