//! Reply strings
//!
//! The exact, case-sensitive text sent back for each outcome.

use crate::engine::InsertStatus;

pub const SUCCESS: &str = "SUCCESS";
pub const INVALID_COMMAND: &str = "INVALID_COMMAND";
pub const ID_CONFLICT: &str = "ID_CONFLICT";
pub const NO_RECORD_AVAILABLE: &str = "NO_RECORD_AVAILABLE";

/// Reply to `STOP`
pub const STOPPED_ACK: &str = "Adios!";

/// Reply to `PURGE_AND_STOP`
pub const PURGED_ACK: &str = "PURGED, Adios!";

/// Comma-joined insert statuses, in input order
pub fn render_statuses(statuses: &[InsertStatus]) -> String {
    statuses
        .iter()
        .map(InsertStatus::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Comma-joined ids, or `NO_RECORD_AVAILABLE` if there are none
pub fn render_ids(ids: &[String]) -> String {
    if ids.is_empty() {
        NO_RECORD_AVAILABLE.to_string()
    } else {
        ids.join(",")
    }
}

pub fn render_deleted(count: usize) -> String {
    format!("DELETED {} File(s)", count)
}
