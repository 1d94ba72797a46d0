//! # notekeep store
//!
//! The persistence layer of the notekeep service. All reads and writes of
//! note records go through [`NoteStore`], which owns the canonical copy of
//! every note.
//!
//! ## Backends
//!
//! Storage is pluggable through the blocking [`NoteBackend`] trait:
//! - [`InMemoryBackend`]: a `BTreeMap` behind a `RwLock`, for tests and
//!   throwaway instances.
//! - `RedbBackend`: a persistent, ACID embedded database (enabled by the
//!   default `backend-redb` feature).
//!
//! [`NoteStore`] wraps a backend and runs each call on Tokio's blocking pool,
//! so request handlers can await storage without stalling the runtime.
//!
//! ## Example
//!
//! ```
//! use notekeep::NewNote;
//! use store::{BackendConfig, CreateOutcome, NoteStore};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), store::StoreError> {
//! let store = NoteStore::open(&BackendConfig::in_memory())?;
//!
//! let note = store.create(NewNote::new("buy milk")).await?;
//! assert_eq!(store.get_by_id(note.id).await?, Some(note.clone()));
//!
//! let again = store.create_unique(NewNote::new("buy milk")).await?;
//! assert!(matches!(again, CreateOutcome::Duplicate(_)));
//! # Ok(())
//! # }
//! ```

mod backend;

pub use backend::{BackendConfig, InMemoryBackend, NoteBackend};
#[cfg(feature = "backend-redb")]
pub use backend::RedbBackend;

use chrono::Utc;
use notekeep::{NewNote, Note, NoteChanges, NoteId};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("note {0} not found")]
    NotFound(NoteId),
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("Serialization encode error: {0}")]
    Encode(String),
    #[error("Serialization decode error: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        StoreError::Backend(msg.into())
    }
}

/// Result of [`NoteStore::create_unique`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(Note),
    /// A note with identical text already exists; nothing was written.
    Duplicate(Note),
}

pub(crate) fn encode_note(note: &Note) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(note).map_err(|e| StoreError::Encode(e.to_string()))
}

pub(crate) fn decode_note(bytes: &[u8]) -> Result<Note, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Decode(e.to_string()))
}

/// Async facade over a [`NoteBackend`]. Cheap to clone.
#[derive(Clone)]
pub struct NoteStore {
    backend: Arc<dyn NoteBackend>,
}

impl NoteStore {
    pub fn new(backend: Box<dyn NoteBackend>) -> Self {
        Self {
            backend: Arc::from(backend),
        }
    }

    /// Build the configured backend and wrap it.
    pub fn open(config: &BackendConfig) -> Result<Self, StoreError> {
        Ok(Self::new(config.build()?))
    }

    async fn run<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn NoteBackend) -> Result<T, StoreError> + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        tokio::task::spawn_blocking(move || op(backend.as_ref()))
            .await
            .map_err(|e| StoreError::backend(format!("storage task failed: {e}")))?
    }

    /// Every note. Order is ascending id, which matches insertion order.
    pub async fn list_all(&self) -> Result<Vec<Note>, StoreError> {
        self.run(|backend| backend.list()).await
    }

    /// `Ok(None)` is a valid negative answer, distinct from a storage failure.
    pub async fn get_by_id(&self, id: NoteId) -> Result<Option<Note>, StoreError> {
        self.run(move |backend| backend.get(id)).await
    }

    /// Persist a note under a fresh id; `date` defaults to now.
    ///
    /// Does not check for duplicate text. See [`create_unique`](Self::create_unique).
    pub async fn create(&self, draft: NewNote) -> Result<Note, StoreError> {
        let now = Utc::now();
        let note = self.run(move |backend| backend.insert(draft, now)).await?;
        tracing::debug!(id = note.id, "note created");
        Ok(note)
    }

    /// Create unless a note with exactly the same text exists, atomically.
    pub async fn create_unique(&self, draft: NewNote) -> Result<CreateOutcome, StoreError> {
        let now = Utc::now();
        let outcome = self
            .run(move |backend| backend.insert_unique(draft, now))
            .await?;
        match &outcome {
            CreateOutcome::Created(note) => tracing::debug!(id = note.id, "note created"),
            CreateOutcome::Duplicate(note) => {
                tracing::debug!(id = note.id, "create skipped, text already stored")
            }
        }
        Ok(outcome)
    }

    /// Merge `changes` onto note `id` and return the stored result.
    pub async fn update(&self, id: NoteId, changes: NoteChanges) -> Result<Note, StoreError> {
        let updated = self
            .run(move |backend| backend.update(id, &changes))
            .await?
            .ok_or(StoreError::NotFound(id))?;
        tracing::debug!(id, "note updated");
        Ok(updated)
    }

    /// Hard-delete note `id`.
    pub async fn delete(&self, id: NoteId) -> Result<(), StoreError> {
        if self.run(move |backend| backend.remove(id)).await? {
            tracing::debug!(id, "note deleted");
            Ok(())
        } else {
            Err(StoreError::NotFound(id))
        }
    }
}
