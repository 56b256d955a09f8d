//! Tunable defaults shared across notegraph crates.

/// Timeout for a single external conversion command (pdftotext, pandoc).
pub const CONVERT_CMD_TIMEOUT_SECS: u64 = 60;

/// Default page size for note listings.
pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// Hard ceiling for note listings regardless of the requested limit.
pub const MAX_LIST_LIMIT: i64 = 1000;

/// Fallback title when an imported filename yields nothing usable.
pub const UNTITLED_NOTE_TITLE: &str = "Untitled Note";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_limits_ordered() {
        assert!(DEFAULT_LIST_LIMIT <= MAX_LIST_LIMIT);
    }
}
