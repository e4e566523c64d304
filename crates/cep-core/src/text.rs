// crates/cep-core/src/text.rs

/// Convert a string into a folded key suitable for comparison.
///
/// This performs:
/// 1\) Transliterate Unicode → ASCII (e.g. `São Paulo` -> `Sao Paulo`)
/// 2\) Normalize to lowercase
///
/// # Examples
///
/// ```rust
/// use cep_core::text::fold_key;
///
/// assert_eq!(fold_key("São João"), "sao joao");
/// assert_eq!(fold_key("AVENIDA PAULISTA"), "avenida paulista");
/// ```
pub fn fold_key(s: &str) -> String {
    deunicode::deunicode(s).to_lowercase()
}

/// Compares two strings for equality after folding.
pub fn equals_folded(a: &str, b: &str) -> bool {
    fold_key(a) == fold_key(b)
}

/// Accent- and case-insensitive substring test: does `haystack` contain `needle`?
///
/// An empty needle matches everything.
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    fold_key(haystack).contains(&fold_key(needle))
}

/// Upper-cases a UF and checks it is exactly two ASCII letters.
pub fn normalize_uf(uf: &str) -> Option<String> {
    let uf = uf.trim();
    if uf.len() == 2 && uf.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(uf.to_ascii_uppercase())
    } else {
        None
    }
}

/// `None` for absent or blank optional text, the trimmed value otherwise.
pub(crate) fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
