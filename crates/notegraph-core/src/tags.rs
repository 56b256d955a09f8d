//! Tag normalization.
//!
//! Tags are stored as a Postgres text array but treated as an unordered set:
//! trimmed, leading `#` stripped, lowercased, deduplicated, sorted.

use std::collections::BTreeSet;

/// Normalize a raw tag list into the stored form.
///
/// Empty and whitespace-only entries are dropped. The result is sorted so
/// that equal tag sets compare equal regardless of input order.
pub fn normalize_tags<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut set = BTreeSet::new();
    for tag in raw {
        let trimmed = tag.as_ref().trim().trim_start_matches('#').trim();
        if !trimmed.is_empty() {
            set.insert(trimmed.to_lowercase());
        }
    }
    set.into_iter().collect()
}
