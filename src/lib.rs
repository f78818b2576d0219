//! # RecordDB
//!
//! A concurrent, in-process document store with:
//! - A line-oriented text command protocol (`INSERT_ONE {_id:1, name:Alice}`)
//! - String-keyed, string-valued documents identified by `_id`
//! - One file per document, written before an insert reports success
//! - Reader/writer locking over a worker pool of asynchronous tasks
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Command Line (String)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ parse (caller thread)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Command Executor                           │
//! │              (dispatch + reply rendering)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ TaskHandle
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine                                 │
//! │        gate: RwLock<running>   documents: RwLock<map>        │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌─────────────────┐               ┌──────────────────┐
//!   │   Worker Pool   │               │   Persistence    │
//!   │   (crossbeam)   │               │ <_id>.bin files  │
//!   └─────────────────┘               └──────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod document;
pub mod persistence;
pub mod pool;
pub mod protocol;
pub mod engine;
pub mod executor;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{RecordError, Result};
pub use config::Config;
pub use document::{Document, Fields};
pub use engine::{Engine, InsertStatus};
pub use executor::CommandExecutor;
pub use pool::TaskHandle;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of RecordDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
