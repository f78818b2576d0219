//! Engine Module
//!
//! The storage engine: owns the document map, the lifecycle flag, the worker
//! pool, and the per-document files.
//!
//! ## Responsibilities
//! - Run every insert/find/delete as a task on the worker pool
//! - Keep each document's file and map entry in lockstep
//! - Refuse all data operations once stopped
//! - Purge memory and disk on request

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::Config;
use crate::document::{is_safe_id, validate_document, Document, Fields, ID_FIELD};
use crate::error::{RecordError, Result};
use crate::persistence::{BincodeSerializer, DocumentSerializer};
use crate::pool::{TaskHandle, WorkerPool};

/// Outcome of inserting one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertStatus {
    /// Stored in memory and on disk
    Success(String),

    /// Failed validation; nothing was touched
    InvalidDocument,

    /// `_id` already present; the stored document is unchanged
    IdConflict,
}

impl InsertStatus {
    /// Protocol reply for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            InsertStatus::Success(_) => "SUCCESS",
            InsertStatus::InvalidDocument => "INVALID_COMMAND",
            InsertStatus::IdConflict => "ID_CONFLICT",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, InsertStatus::Success(_))
    }
}

/// The main storage engine
///
/// ## Concurrency Model: one gate, one map lock
///
/// - **`gate`** (`RwLock<Lifecycle>`): the process-wide reader/writer lock.
///   insert_one, insert_many, delete, stop and purge take it exclusively;
///   find takes it shared. It also guards the `running` flag.
/// - **`documents`** (`RwLock<HashMap>`): protects the map itself. Always
///   acquired after the gate, never held across file I/O.
///
/// ## Known contention point: insert_many
/// insert_many holds the gate exclusively while fanning its documents out as
/// nested tasks on the same pool it is running on. With every other worker
/// parked on the gate those nested tasks would never be picked up, so the
/// batch waits with [`TaskHandle::wait_or_run`] and executes any nested task
/// no worker has claimed yet on its own thread. Inside the window the nested
/// tasks race only on the map lock.
pub struct Engine {
    shared: Arc<Shared>,
    pool: Arc<WorkerPool>,
}

/// State reachable from pool tasks
struct Shared {
    /// Engine configuration
    config: Config,

    /// Directory holding one file per document
    storage_dir: PathBuf,

    /// Lifecycle flag + operation ordering
    gate: RwLock<Lifecycle>,

    /// `_id` → document
    documents: RwLock<HashMap<String, Document>>,

    /// Persistence port
    serializer: Arc<dyn DocumentSerializer>,
}

struct Lifecycle {
    running: bool,
}

impl Lifecycle {
    fn ensure_running(&self) -> Result<()> {
        if self.running {
            Ok(())
        } else {
            Err(RecordError::Stopped)
        }
    }
}

impl Engine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const DOCUMENTS_DIR: &'static str = "documents";

    /// Open an engine with the default bincode file format
    ///
    /// On startup:
    /// 1. Validate config
    /// 2. Create data + storage directories
    /// 3. Optionally load persisted documents
    /// 4. Start the worker pool
    pub fn open(config: Config) -> Result<Self> {
        Self::open_with_serializer(config, Arc::new(BincodeSerializer::new()))
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let mut config = Config::default();
        config.data_dir = path.to_path_buf();
        Self::open(config)
    }

    /// Open an engine backed by a custom persistence port
    pub fn open_with_serializer(
        config: Config,
        serializer: Arc<dyn DocumentSerializer>,
    ) -> Result<Self> {
        config.validate()?;

        fs::create_dir_all(&config.data_dir)?;
        let storage_dir = config.data_dir.join(Self::DOCUMENTS_DIR);
        fs::create_dir_all(&storage_dir)?;

        let documents = if config.recover_on_open {
            recover_documents(&storage_dir, &config.file_extension, serializer.as_ref())?
        } else {
            HashMap::new()
        };

        let pool = WorkerPool::new(config.worker_threads)?;

        tracing::info!(
            "Engine opened at {} ({} workers, {} documents loaded)",
            storage_dir.display(),
            pool.size(),
            documents.len()
        );

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                storage_dir,
                gate: RwLock::new(Lifecycle { running: true }),
                documents: RwLock::new(documents),
                serializer,
            }),
            pool: Arc::new(pool),
        })
    }

    // =========================================================================
    // Data Operations (asynchronous)
    // =========================================================================

    /// Insert one document
    ///
    /// Resolves to `Success`, `InvalidDocument` or `IdConflict`; fails with
    /// `Stopped` after stop and with an I/O error if the file write fails (in
    /// which case the map entry is rolled back).
    pub fn insert_one(&self, fields: Fields) -> TaskHandle<InsertStatus> {
        let shared = Arc::clone(&self.shared);
        self.spawn(move || {
            let gate = shared.gate.write();
            gate.ensure_running()?;

            let status = shared.insert_document(fields);
            drop(gate);
            status
        })
    }

    /// Insert a batch of documents
    ///
    /// Each document gets the insert_one semantics; statuses come back in
    /// input order. The whole batch runs inside one exclusive window. If any
    /// file write fails the first such error is returned once every document
    /// has been attempted; documents that succeeded stay committed.
    pub fn insert_many(&self, batch: Vec<Fields>) -> TaskHandle<Vec<InsertStatus>> {
        let shared = Arc::clone(&self.shared);
        let pool = Arc::clone(&self.pool);
        self.spawn(move || {
            let gate = shared.gate.write();
            gate.ensure_running()?;

            tracing::debug!("Inserting batch of {} documents", batch.len());

            let handles: Vec<TaskHandle<InsertStatus>> = batch
                .into_iter()
                .map(|fields| {
                    let shared = Arc::clone(&shared);
                    pool.submit(move || shared.insert_document(fields))
                        .unwrap_or_else(|_| TaskHandle::ready(Err(RecordError::Stopped)))
                })
                .collect();

            // Every nested task must finish before the gate is released
            let mut statuses = Vec::with_capacity(handles.len());
            let mut first_error = None;
            for handle in handles {
                match handle.wait_or_run() {
                    Ok(status) => statuses.push(status),
                    Err(e) => {
                        if first_error.is_none() {
                            first_error = Some(e);
                        }
                    }
                }
            }
            drop(gate);

            match first_error {
                Some(e) => Err(e),
                None => Ok(statuses),
            }
        })
    }

    /// Ids of all documents matching `criteria`, sorted lexicographically
    ///
    /// An empty result means no records; empty criteria match everything.
    pub fn find(&self, criteria: Fields) -> TaskHandle<Vec<String>> {
        let shared = Arc::clone(&self.shared);
        self.spawn(move || {
            let gate = shared.gate.read();
            gate.ensure_running()?;

            let mut ids: Vec<String> = shared
                .documents
                .read()
                .iter()
                .filter(|(_, doc)| doc.matches(&criteria))
                .map(|(id, _)| id.clone())
                .collect();
            drop(gate);

            ids.sort();
            tracing::debug!("Find matched {} documents", ids.len());
            Ok(ids)
        })
    }

    /// Delete all documents matching `criteria`, returning how many were removed
    ///
    /// The map is authoritative: a file that cannot be removed is logged and
    /// the document still counts as deleted.
    pub fn delete(&self, criteria: Fields) -> TaskHandle<usize> {
        let shared = Arc::clone(&self.shared);
        self.spawn(move || {
            let gate = shared.gate.write();
            gate.ensure_running()?;

            let removed: Vec<String> = {
                let mut documents = shared.documents.write();
                let ids: Vec<String> = documents
                    .iter()
                    .filter(|(_, doc)| doc.matches(&criteria))
                    .map(|(id, _)| id.clone())
                    .collect();
                for id in &ids {
                    documents.remove(id);
                }
                ids
            };

            for id in &removed {
                shared.remove_file_logged(&shared.document_path(id));
            }
            drop(gate);

            tracing::debug!("Deleted {} documents", removed.len());
            Ok(removed.len())
        })
    }

    // =========================================================================
    // Lifecycle (synchronous)
    // =========================================================================

    /// Stop the engine
    ///
    /// Flips `running` under the exclusive gate, then drains the worker pool
    /// for up to the configured grace period before forcing it down. Tasks
    /// still queued behind the gate resolve to `Stopped`. Safe to call more
    /// than once.
    pub fn stop(&self) {
        {
            let mut gate = self.shared.gate.write();
            if gate.running {
                tracing::info!("Stopping engine");
            }
            gate.running = false;
        }
        self.drain_pool();
    }

    /// Clear every document from memory and disk, then stop
    ///
    /// File and directory errors are logged and skipped so one bad entry
    /// does not keep the rest from being purged.
    pub fn purge_and_stop(&self) {
        {
            let mut gate = self.shared.gate.write();

            let cleared = {
                let mut documents = self.shared.documents.write();
                let count = documents.len();
                documents.clear();
                count
            };
            let files = purge_files(&self.shared.storage_dir);

            gate.running = false;
            tracing::info!(
                "Purged {} documents ({} files) and stopping engine",
                cleared,
                files
            );
        }
        self.drain_pool();
    }

    fn drain_pool(&self) {
        let grace = self.shared.config.shutdown_grace();
        if !self.pool.shutdown(grace) {
            tracing::warn!("Forced worker pool shutdown after {:?}", grace);
        }
    }

    // =========================================================================
    // Read-back
    // =========================================================================

    /// Read a document's persisted file through the persistence port
    pub fn load_persisted(&self, id: &str) -> Result<Document> {
        if !is_safe_id(id) {
            return Err(RecordError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid document id: {:?}", id),
            )));
        }

        let gate = self.shared.gate.read();
        gate.ensure_running()?;
        self.shared.serializer.deserialize(&self.shared.document_path(id))
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// True until stop / purge_and_stop
    pub fn is_running(&self) -> bool {
        self.shared.gate.read().running
    }

    /// Number of documents in memory
    pub fn document_count(&self) -> usize {
        self.shared.documents.read().len()
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.shared.config.data_dir
    }

    /// Get the storage directory path (where document files are stored)
    pub fn storage_dir(&self) -> &Path {
        &self.shared.storage_dir
    }

    /// Path of the file a document with this id is persisted to
    pub fn document_path(&self, id: &str) -> PathBuf {
        self.shared.document_path(id)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Queue a task, failing fast once stopped
    fn spawn<T, F>(&self, task: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        // Don't block the caller behind a long write; the task re-checks
        if let Some(gate) = self.shared.gate.try_read() {
            if !gate.running {
                return TaskHandle::ready(Err(RecordError::Stopped));
            }
        }

        // The pool only closes after `running` is cleared
        self.pool
            .submit(task)
            .unwrap_or_else(|_| TaskHandle::ready(Err(RecordError::Stopped)))
    }
}

impl Shared {
    /// Validate, claim the id in the map, then persist
    ///
    /// Caller holds the gate exclusively.
    fn insert_document(&self, fields: Fields) -> Result<InsertStatus> {
        if let Err(reason) = validate_document(&fields) {
            tracing::debug!("Rejected document: {:?}", reason);
            return Ok(InsertStatus::InvalidDocument);
        }

        let id = match fields.get(ID_FIELD) {
            Some(id) => id.clone(),
            None => return Ok(InsertStatus::InvalidDocument),
        };
        let document = Document::from(fields);

        match self.documents.write().entry(id.clone()) {
            Entry::Occupied(_) => return Ok(InsertStatus::IdConflict),
            Entry::Vacant(slot) => {
                slot.insert(document.clone());
            }
        }

        let path = self.document_path(&id);
        if let Err(e) = self.serializer.serialize(&document, &path) {
            // Neither side is committed
            self.documents.write().remove(&id);
            let _ = fs::remove_file(&path);
            tracing::error!("Failed to persist document {}: {}", id, e);
            return Err(e);
        }

        tracing::trace!("Inserted document {}", id);
        Ok(InsertStatus::Success(id))
    }

    fn document_path(&self, id: &str) -> PathBuf {
        self.storage_dir
            .join(format!("{}.{}", id, self.config.file_extension))
    }

    /// Remove a file, logging anything other than "already gone"
    fn remove_file_logged(&self, path: &Path) {
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to delete file {}: {}", path.display(), e),
        }
    }
}

/// Load every `*.<ext>` file under `dir` into a fresh map
///
/// Undecodable files, files without a usable `_id`, and files not named
/// `<_id>.<ext>` are skipped, so every recovered entry owns exactly the file
/// `delete` would remove.
fn recover_documents(
    dir: &Path,
    extension: &str,
    serializer: &dyn DocumentSerializer,
) -> Result<HashMap<String, Document>> {
    let mut documents = HashMap::new();
    let mut skipped = 0usize;

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }

        let stem = path.file_stem().and_then(|s| s.to_str());

        match serializer.deserialize(&path) {
            Ok(doc) => match doc.id().map(str::to_string) {
                Some(id) if is_safe_id(&id) && stem == Some(id.as_str()) => {
                    match documents.entry(id) {
                        Entry::Vacant(slot) => {
                            slot.insert(doc);
                        }
                        Entry::Occupied(slot) => {
                            tracing::warn!(
                                "Skipping {}: duplicate _id {}",
                                path.display(),
                                slot.key()
                            );
                            skipped += 1;
                        }
                    }
                }
                Some(id) if is_safe_id(&id) => {
                    tracing::warn!(
                        "Skipping {}: file name does not match _id {}",
                        path.display(),
                        id
                    );
                    skipped += 1;
                }
                _ => {
                    tracing::warn!("Skipping {}: document has no usable _id", path.display());
                    skipped += 1;
                }
            },
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        tracing::warn!("Recovery skipped {} unreadable document files", skipped);
    }
    Ok(documents)
}

/// Delete every regular file under `dir`, recursively; returns files removed
fn purge_files(dir: &Path) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!("Failed to purge {}: {}", dir.display(), e);
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Failed to read entry in {}: {}", dir.display(), e);
                continue;
            }
        };

        let path = entry.path();
        match entry.file_type() {
            Ok(kind) if kind.is_dir() => removed += purge_files(&path),
            Ok(kind) if kind.is_file() => match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!("Failed to delete file {}: {}", path.display(), e),
            },
            Ok(_) => {}
            Err(e) => tracing::warn!("Failed to stat {}: {}", path.display(), e),
        }
    }
    removed
}
