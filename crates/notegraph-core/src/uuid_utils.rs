//! UUID v7 utilities for time-ordered identifiers.
//!
//! All entity IDs are UUIDv7 (RFC 9562): the first 48 bits embed a
//! millisecond Unix timestamp, so IDs sort chronologically and index
//! locality follows insertion order.

use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Check whether a UUID is version 7.
pub fn is_v7(id: &Uuid) -> bool {
    id.get_version_num() == 7
}
