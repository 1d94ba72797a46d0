use crate::{CreateOutcome, StoreError};
use chrono::{DateTime, Utc};
use notekeep::{NewNote, Note, NoteChanges, NoteId};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Blocking storage backend for note records.
///
/// Every mutating method is atomic for the record it touches. Implementations
/// assign ids themselves; callers never choose one.
pub trait NoteBackend: Send + Sync {
    /// Every stored note, in ascending id order.
    fn list(&self) -> Result<Vec<Note>, StoreError>;
    /// Point lookup. `Ok(None)` means the id is not stored.
    fn get(&self, id: NoteId) -> Result<Option<Note>, StoreError>;
    /// Allocate a fresh id and persist the note.
    fn insert(&self, draft: NewNote, now: DateTime<Utc>) -> Result<Note, StoreError>;
    /// Like [`insert`](Self::insert), unless a note with exactly the same text
    /// exists. The check and the insert happen in one transaction.
    fn insert_unique(&self, draft: NewNote, now: DateTime<Utc>)
        -> Result<CreateOutcome, StoreError>;
    /// Merge `changes` onto the stored note. `Ok(None)` if the id is not stored.
    fn update(&self, id: NoteId, changes: &NoteChanges) -> Result<Option<Note>, StoreError>;
    /// Remove a note. Returns whether it existed.
    fn remove(&self, id: NoteId) -> Result<bool, StoreError>;
}

/// Configuration for selecting and building a backend.
///
/// # Example
/// ```
/// use store::BackendConfig;
///
/// // In-memory (for testing)
/// let config = BackendConfig::in_memory();
///
/// // Redb (pure Rust, persistent)
/// let config = BackendConfig::redb("/data/notes.redb");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BackendConfig {
    /// Use Redb for storage. The `path` is the file path for the database.
    ///
    /// Requires the `backend-redb` feature (enabled by default).
    Redb { path: String },
    /// Keep notes in process memory. Nothing survives a restart.
    #[default]
    InMemory,
}

impl BackendConfig {
    pub fn in_memory() -> Self {
        BackendConfig::InMemory
    }

    pub fn redb<P: Into<String>>(path: P) -> Self {
        BackendConfig::Redb { path: path.into() }
    }

    /// Build the backend described by this configuration.
    pub fn build(&self) -> Result<Box<dyn NoteBackend>, StoreError> {
        match self {
            BackendConfig::InMemory => Ok(Box::new(InMemoryBackend::new())),
            BackendConfig::Redb { path } => {
                #[cfg(feature = "backend-redb")]
                {
                    Ok(Box::new(RedbBackend::open(path)?))
                }
                #[cfg(not(feature = "backend-redb"))]
                {
                    let _ = path;
                    Err(StoreError::backend("redb backend disabled at compile time"))
                }
            }
        }
    }
}

struct Notes {
    records: BTreeMap<NoteId, Note>,
    next_id: NoteId,
}

impl Notes {
    fn allocate(&mut self) -> Result<NoteId, StoreError> {
        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or_else(|| StoreError::backend("note id space exhausted"))?;
        Ok(id)
    }
}

/// An in-memory backend using a `RwLock` around a `BTreeMap`.
pub struct InMemoryBackend {
    notes: RwLock<Notes>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            notes: RwLock::new(Notes {
                records: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Notes>, StoreError> {
        self.notes
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Notes>, StoreError> {
        self.notes
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteBackend for InMemoryBackend {
    fn list(&self) -> Result<Vec<Note>, StoreError> {
        Ok(self.read()?.records.values().cloned().collect())
    }

    fn get(&self, id: NoteId) -> Result<Option<Note>, StoreError> {
        Ok(self.read()?.records.get(&id).cloned())
    }

    fn insert(&self, draft: NewNote, now: DateTime<Utc>) -> Result<Note, StoreError> {
        let mut guard = self.write()?;
        let id = guard.allocate()?;
        let note = draft.into_note(id, now);
        guard.records.insert(id, note.clone());
        Ok(note)
    }

    fn insert_unique(
        &self,
        draft: NewNote,
        now: DateTime<Utc>,
    ) -> Result<CreateOutcome, StoreError> {
        // One write lock covers both the lookup and the insert.
        let mut guard = self.write()?;
        if let Some(existing) = guard.records.values().find(|n| n.text == draft.text) {
            return Ok(CreateOutcome::Duplicate(existing.clone()));
        }
        let id = guard.allocate()?;
        let note = draft.into_note(id, now);
        guard.records.insert(id, note.clone());
        Ok(CreateOutcome::Created(note))
    }

    fn update(&self, id: NoteId, changes: &NoteChanges) -> Result<Option<Note>, StoreError> {
        let mut guard = self.write()?;
        Ok(guard.records.get_mut(&id).map(|note| {
            *note = changes.apply(note);
            note.clone()
        }))
    }

    fn remove(&self, id: NoteId) -> Result<bool, StoreError> {
        Ok(self.write()?.records.remove(&id).is_some())
    }
}

/// Redb-backed persistent storage.
#[cfg(feature = "backend-redb")]
pub mod redb;

#[cfg(feature = "backend-redb")]
pub use self::redb::RedbBackend;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn in_memory_assigns_increasing_ids() {
        let backend = InMemoryBackend::new();
        let a = backend.insert(NewNote::new("a"), now()).unwrap();
        let b = backend.insert(NewNote::new("b"), now()).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);

        backend.remove(b.id).unwrap();
        let c = backend.insert(NewNote::new("c"), now()).unwrap();
        assert_eq!(c.id, 3, "ids are never reused");
    }

    #[test]
    fn in_memory_lists_in_insertion_order() {
        let backend = InMemoryBackend::new();
        for text in ["first", "second", "third"] {
            backend.insert(NewNote::new(text), now()).unwrap();
        }
        let texts: Vec<_> = backend
            .list()
            .unwrap()
            .into_iter()
            .map(|n| n.text)
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn in_memory_unique_insert_detects_exact_text() {
        let backend = InMemoryBackend::new();
        let original = backend.insert(NewNote::new("x"), now()).unwrap();

        match backend.insert_unique(NewNote::new("x"), now()).unwrap() {
            CreateOutcome::Duplicate(existing) => assert_eq!(existing, original),
            CreateOutcome::Created(_) => panic!("duplicate text must not be inserted"),
        }
        assert_eq!(backend.list().unwrap().len(), 1);

        // Exact match only: case and padding make a different note.
        assert!(matches!(
            backend.insert_unique(NewNote::new("X"), now()).unwrap(),
            CreateOutcome::Created(_)
        ));
        assert!(matches!(
            backend.insert_unique(NewNote::new(" x"), now()).unwrap(),
            CreateOutcome::Created(_)
        ));
    }

    #[test]
    fn in_memory_update_and_remove_report_absence() {
        let backend = InMemoryBackend::new();
        assert_eq!(backend.update(5, &NoteChanges::default()).unwrap(), None);
        assert!(!backend.remove(5).unwrap());
    }

    #[test]
    fn build_in_memory_backend() {
        let backend = BackendConfig::in_memory().build().unwrap();
        assert!(backend.list().unwrap().is_empty());
    }
}
