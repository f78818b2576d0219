//! Document Module
//!
//! Value types handed between the protocol layer and the engine.
//!
//! ## Responsibilities
//! - `Fields`: the plain string→string mapping callers build and pass in
//! - `Document`: the identity-bearing record the engine owns once stored
//! - Validation of caller-supplied fields before any shared state is touched
//!
//! ## Data Structure Choice
//! Using BTreeMap for fields:
//! - Deterministic iteration (stable file bytes, readable debug output)
//! - Documents are small; ordered lookups cost nothing noticeable

mod record;
mod validation;

pub use record::{Document, Fields};
pub use validation::{is_safe_id, is_valid_document, validate_document, Invalid};

/// Reserved field carrying the store-wide unique document identifier
pub const ID_FIELD: &str = "_id";
