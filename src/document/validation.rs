//! Document validation
//!
//! Pure checks run before an insert touches any shared state.

use super::{Fields, ID_FIELD};

/// Reasons a document is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalid {
    /// No fields at all
    Empty,
    /// `_id` missing or blank
    MissingId,
    /// `_id` cannot be used as a file name under the storage root
    UnsafeId,
}

/// Validate caller-supplied document fields
///
/// A valid document has at least one field and a non-blank `_id` that is a
/// single, plain path component (it names the document's file).
pub fn validate_document(fields: &Fields) -> Result<(), Invalid> {
    if fields.is_empty() {
        return Err(Invalid::Empty);
    }

    let id = match fields.get(ID_FIELD) {
        Some(id) if !id.trim().is_empty() => id,
        _ => return Err(Invalid::MissingId),
    };

    if !is_safe_id(id) {
        return Err(Invalid::UnsafeId);
    }

    Ok(())
}

/// Predicate form of [`validate_document`]
pub fn is_valid_document(fields: &Fields) -> bool {
    validate_document(fields).is_ok()
}

/// True if `id` can be joined onto the storage root without escaping it
pub fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\', '\0'])
}
