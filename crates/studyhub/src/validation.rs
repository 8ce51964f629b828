use tracing::{debug, trace};

use crate::{Result, StoreError, MAX_BATCH_SIZE};

/// Windows reserved names that cannot be used as filenames.
pub const WINDOWS_RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8", "COM9", "LPT1", "LPT2",
    "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Checks that every character is ASCII alphanumeric, `_` or `-`, plus `.` when
/// `allow_dot` is set.
fn has_valid_chars(name: &str, allow_dot: bool) -> bool {
    name.chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || (allow_dot && ch == '.'))
}

/// Checks if a name is a Windows reserved name (case-insensitive), looking at
/// both the full name and the part before the first dot.
pub fn is_reserved_name(name: &str) -> bool {
    let upper = name.to_uppercase();
    let base = upper.split('.').next().unwrap_or(&upper);
    WINDOWS_RESERVED_NAMES.contains(&upper.as_str()) || WINDOWS_RESERVED_NAMES.contains(&base)
}

/// Validates a collection name.
///
/// # Rules
/// - Must not be empty
/// - Must not start with a dot, or end with a dot or space
/// - Must only contain ASCII alphanumerics, `_`, `-` and `.`
/// - Must not be a Windows reserved name
///
/// Mixed case is allowed (`moodEntries`, `thoughtRecords`).
pub fn validate_collection_name(name: &str) -> Result<()> {
    trace!("Validating collection name: {}", name);
    let invalid = name.is_empty() ||
        name.starts_with('.') ||
        name.ends_with('.') ||
        name.ends_with(' ') ||
        !has_valid_chars(name, true) ||
        is_reserved_name(name);
    if invalid {
        debug!("Rejected collection name: {:?}", name);
        return Err(StoreError::InvalidCollectionName {
            name: name.to_owned(),
        });
    }
    Ok(())
}

/// Validates a document id. Same rules as collection names except that dots
/// are never allowed, so ids cannot be confused with file extensions.
pub fn validate_document_id(id: &str) -> Result<()> {
    trace!("Validating document id: {}", id);
    if id.is_empty() || !has_valid_chars(id, false) || is_reserved_name(id) {
        debug!("Rejected document id: {:?}", id);
        return Err(StoreError::InvalidDocumentId {
            id: id.to_owned(),
        });
    }
    Ok(())
}

/// Validates a page size against the atomic batch limit.
///
/// A zero page size would never make progress, so it is rejected before any
/// store call is made.
pub const fn validate_page_size(page_size: usize) -> Result<()> {
    if page_size == 0 || page_size > MAX_BATCH_SIZE {
        return Err(StoreError::InvalidPageSize {
            page_size,
            max: MAX_BATCH_SIZE,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_collection_names() {
        for name in ["users", "moodEntries", "thought_records", "tests-2024", "v1.archive"] {
            assert!(validate_collection_name(name).is_ok(), "{} should be valid", name);
        }
    }

    #[test]
    fn test_invalid_collection_names() {
        for name in ["", ".hidden", "trailing.", "trailing ", "a/b", "a\\b", "CON", "nul.txt", "spa ce", "é"] {
            assert!(
                matches!(
                    validate_collection_name(name),
                    Err(StoreError::InvalidCollectionName { .. })
                ),
                "{:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_document_ids_reject_dots() {
        assert!(validate_document_id("user-123").is_ok());
        assert!(validate_document_id("placeholder").is_ok());
        assert!(matches!(
            validate_document_id("user.json"),
            Err(StoreError::InvalidDocumentId { .. })
        ));
        assert!(validate_document_id("").is_err());
        assert!(validate_document_id("LPT1").is_err());
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(matches!(
            validate_page_size(0),
            Err(StoreError::InvalidPageSize {
                page_size: 0,
                ..
            })
        ));
        assert!(validate_page_size(1).is_ok());
        assert!(validate_page_size(MAX_BATCH_SIZE).is_ok());
        assert!(validate_page_size(MAX_BATCH_SIZE + 1).is_err());
    }
}
