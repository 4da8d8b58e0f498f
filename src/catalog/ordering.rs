use std::cmp::Ordering;

use crate::core::types::CatalogEntry;

/// The integer a folder name starts with, e.g. `10` for "10. Oil System".
///
/// Leading whitespace is ignored. Returns `None` when the name does not start
/// with a digit or the number does not fit in a `u64`.
#[must_use]
pub fn extract_leading_integer(name: &str) -> Option<u64> {
    let trimmed = name.trim_start();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..digits_end].parse().ok()
}

/// Numbered names first, ascending by number (ties broken lexically), then
/// unnumbered names in lexical order.
#[must_use]
pub fn compare_folder_names(a: &str, b: &str) -> Ordering {
    match (extract_leading_integer(a), extract_leading_integer(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Sort catalog entries by display name using [`compare_folder_names`]
pub fn sort_entries(entries: &mut [CatalogEntry]) {
    entries.sort_by(|a, b| compare_folder_names(&a.name, &b.name));
}
