//! Command definitions
//!
//! Represents parsed client commands.

use crate::document::Fields;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    InsertOne,
    InsertMany,
    Find,
    Delete,
    Stop,
    PurgeAndStop,
}

impl CommandType {
    /// Match an operation keyword, ignoring case
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "INSERT_ONE" => Some(CommandType::InsertOne),
            "INSERT_MANY" => Some(CommandType::InsertMany),
            "FIND" => Some(CommandType::Find),
            "DELETE" => Some(CommandType::Delete),
            "STOP" => Some(CommandType::Stop),
            "PURGE_AND_STOP" => Some(CommandType::PurgeAndStop),
            _ => None,
        }
    }

    /// Canonical keyword
    pub fn keyword(&self) -> &'static str {
        match self {
            CommandType::InsertOne => "INSERT_ONE",
            CommandType::InsertMany => "INSERT_MANY",
            CommandType::Find => "FIND",
            CommandType::Delete => "DELETE",
            CommandType::Stop => "STOP",
            CommandType::PurgeAndStop => "PURGE_AND_STOP",
        }
    }
}

/// A parsed command
///
/// `None` / empty operands mean the operand text did not parse; the executor
/// decides what that renders as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Insert a single document
    InsertOne { document: Option<Fields> },

    /// Insert every well-formed document group
    InsertMany { documents: Vec<Fields> },

    /// Find ids matching the criteria
    Find { criteria: Option<Fields> },

    /// Delete documents matching the criteria
    Delete { criteria: Option<Fields> },

    /// Stop the engine
    Stop,

    /// Purge all documents, then stop
    PurgeAndStop,

    /// Unrecognized or empty operation keyword
    Unknown { operation: String },
}

impl Command {
    /// Get the command type (`None` for unknown operations)
    pub fn command_type(&self) -> Option<CommandType> {
        match self {
            Command::InsertOne { .. } => Some(CommandType::InsertOne),
            Command::InsertMany { .. } => Some(CommandType::InsertMany),
            Command::Find { .. } => Some(CommandType::Find),
            Command::Delete { .. } => Some(CommandType::Delete),
            Command::Stop => Some(CommandType::Stop),
            Command::PurgeAndStop => Some(CommandType::PurgeAndStop),
            Command::Unknown { .. } => None,
        }
    }
}
