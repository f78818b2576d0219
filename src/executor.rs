//! Command Executor
//!
//! Binds parsed commands to engine operations and renders the results as
//! protocol replies.
//!
//! Parsing runs on the calling thread; only the engine operation itself is
//! queued on the worker pool. A lifecycle failure (engine stopped) surfaces
//! as `Err(RecordError::Stopped)` from the handle, never as a reply string.

use std::sync::Arc;

use crate::engine::Engine;
use crate::error::Result;
use crate::pool::TaskHandle;
use crate::protocol::{
    parse_command, render_deleted, render_ids, render_statuses, Command, INVALID_COMMAND,
    PURGED_ACK, STOPPED_ACK,
};

/// Stateless dispatcher; cheap to clone and share between threads
#[derive(Clone)]
pub struct CommandExecutor {
    engine: Arc<Engine>,
}

impl CommandExecutor {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }

    /// Parse and dispatch a command line
    pub fn execute(&self, line: &str) -> TaskHandle<String> {
        self.dispatch(parse_command(line))
    }

    /// Execute a command line and block for its reply
    pub fn execute_blocking(&self, line: &str) -> Result<String> {
        self.execute(line).wait()
    }

    /// Dispatch an already-parsed command
    pub fn dispatch(&self, command: Command) -> TaskHandle<String> {
        match command {
            Command::InsertOne { document: Some(fields) } => self
                .engine
                .insert_one(fields)
                .map(|status| status.as_str().to_string()),

            Command::InsertMany { documents } if !documents.is_empty() => self
                .engine
                .insert_many(documents)
                .map(|statuses| render_statuses(&statuses)),

            Command::Find { criteria: Some(criteria) } => {
                self.engine.find(criteria).map(|ids| render_ids(&ids))
            }

            Command::Delete { criteria: Some(criteria) } => {
                self.engine.delete(criteria).map(render_deleted)
            }
            Command::Delete { criteria: None } => reply(render_deleted(0)),

            Command::Stop => {
                self.engine.stop();
                reply(STOPPED_ACK)
            }

            Command::PurgeAndStop => {
                self.engine.purge_and_stop();
                reply(PURGED_ACK)
            }

            Command::InsertOne { document: None }
            | Command::InsertMany { .. }
            | Command::Find { criteria: None }
            | Command::Unknown { .. } => reply(INVALID_COMMAND),
        }
    }

    /// The engine commands are executed against
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }
}

fn reply(text: impl Into<String>) -> TaskHandle<String> {
    TaskHandle::ready(Ok(text.into()))
}
