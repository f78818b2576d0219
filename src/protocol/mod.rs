//! Protocol Module
//!
//! Defines the line-oriented text protocol clients speak to the store.
//!
//! ## Command Format
//! ```text
//! INSERT_ONE {field:value, field:value, ...}
//! INSERT_MANY {field:value,...} {field:value,...} ...
//! FIND {field:value, ...}
//! DELETE {field:value, ...}
//! STOP
//! PURGE_AND_STOP
//! ```
//!
//! - The operation keyword is case-insensitive
//! - Everything after the first whitespace run is the operand
//! - `{`, `}`, `,` and the first `:` of a pair are the only delimiters;
//!   there is no escaping, no nesting, and every value is a string
//!
//! ## Replies
//! - `SUCCESS`, `ID_CONFLICT`, `INVALID_COMMAND`
//! - comma-joined ids, or `NO_RECORD_AVAILABLE`
//! - `DELETED <n> File(s)`
//! - `Adios!`, `PURGED, Adios!`

mod command;
mod parser;
mod response;

pub use command::{Command, CommandType};
pub use parser::{parse_command, parse_document, parse_documents, split_operation};
pub use response::{
    render_deleted, render_ids, render_statuses, ID_CONFLICT, INVALID_COMMAND,
    NO_RECORD_AVAILABLE, PURGED_ACK, STOPPED_ACK, SUCCESS,
};
