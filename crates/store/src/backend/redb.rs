//! Redb (Rust embedded database) backend for note storage.
//!
//! Notes are kept in a `notes` table keyed by id, holding the JSON encoding of
//! each record. A `meta` table holds the id sequence so ids survive restarts
//! and are never reused. Each mutating call is a single write transaction.

use crate::{decode_note, encode_note, CreateOutcome, NoteBackend, StoreError};
use ::redb::{Database, ReadableTable, TableDefinition};
use chrono::{DateTime, Utc};
use notekeep::{NewNote, Note, NoteChanges, NoteId};
use std::path::Path;
use std::sync::Arc;

const NOTES_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("notes");
const META_TABLE: TableDefinition<&str, u64> = TableDefinition::new("meta");
const NEXT_ID_KEY: &str = "next_id";

fn backend_err<E: std::fmt::Display>(err: E) -> StoreError {
    StoreError::backend(err.to_string())
}

fn collect_notes<T>(table: &T) -> Result<Vec<Note>, StoreError>
where
    T: ReadableTable<u64, &'static [u8]>,
{
    let mut notes = Vec::new();
    for item in table.iter().map_err(backend_err)? {
        let (_, value) = item.map_err(backend_err)?;
        notes.push(decode_note(value.value())?);
    }
    Ok(notes)
}

/// Persistent backend on a single redb file.
///
/// The `Arc<Database>` wrapper allows sharing across threads; redb handles
/// its own locking and MVCC, and serializes write transactions.
pub struct RedbBackend {
    db: Arc<Database>,
}

impl RedbBackend {
    /// Open or create the database at `path` and make sure both tables exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(backend_err)?;

        let write_txn = db.begin_write().map_err(backend_err)?;
        {
            write_txn.open_table(NOTES_TABLE).map_err(backend_err)?;
            write_txn.open_table(META_TABLE).map_err(backend_err)?;
        }
        write_txn.commit().map_err(backend_err)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn insert_in(
        write_txn: &::redb::WriteTransaction,
        draft: NewNote,
        now: DateTime<Utc>,
    ) -> Result<Note, StoreError> {
        let mut meta = write_txn.open_table(META_TABLE).map_err(backend_err)?;
        let id = meta
            .get(NEXT_ID_KEY)
            .map_err(backend_err)?
            .map(|guard| guard.value())
            .unwrap_or(1);
        let next = id
            .checked_add(1)
            .ok_or_else(|| StoreError::backend("note id space exhausted"))?;
        meta.insert(NEXT_ID_KEY, next).map_err(backend_err)?;

        let note = draft.into_note(id, now);
        let bytes = encode_note(&note)?;
        let mut notes = write_txn.open_table(NOTES_TABLE).map_err(backend_err)?;
        notes.insert(id, bytes.as_slice()).map_err(backend_err)?;
        Ok(note)
    }
}

impl NoteBackend for RedbBackend {
    fn list(&self) -> Result<Vec<Note>, StoreError> {
        let read_txn = self.db.begin_read().map_err(backend_err)?;
        let table = read_txn.open_table(NOTES_TABLE).map_err(backend_err)?;
        collect_notes(&table)
    }

    fn get(&self, id: NoteId) -> Result<Option<Note>, StoreError> {
        let read_txn = self.db.begin_read().map_err(backend_err)?;
        let table = read_txn.open_table(NOTES_TABLE).map_err(backend_err)?;

        match table.get(id).map_err(backend_err)? {
            Some(value) => Ok(Some(decode_note(value.value())?)),
            None => Ok(None),
        }
    }

    fn insert(&self, draft: NewNote, now: DateTime<Utc>) -> Result<Note, StoreError> {
        let write_txn = self.db.begin_write().map_err(backend_err)?;
        let note = Self::insert_in(&write_txn, draft, now)?;
        write_txn.commit().map_err(backend_err)?;
        Ok(note)
    }

    fn insert_unique(
        &self,
        draft: NewNote,
        now: DateTime<Utc>,
    ) -> Result<CreateOutcome, StoreError> {
        let write_txn = self.db.begin_write().map_err(backend_err)?;
        let existing = {
            let table = write_txn.open_table(NOTES_TABLE).map_err(backend_err)?;
            collect_notes(&table)?
                .into_iter()
                .find(|note| note.text == draft.text)
        };
        if let Some(existing) = existing {
            write_txn.abort().map_err(backend_err)?;
            return Ok(CreateOutcome::Duplicate(existing));
        }

        let note = Self::insert_in(&write_txn, draft, now)?;
        write_txn.commit().map_err(backend_err)?;
        Ok(CreateOutcome::Created(note))
    }

    fn update(&self, id: NoteId, changes: &NoteChanges) -> Result<Option<Note>, StoreError> {
        let write_txn = self.db.begin_write().map_err(backend_err)?;
        let updated = {
            let mut table = write_txn.open_table(NOTES_TABLE).map_err(backend_err)?;
            let current = match table.get(id).map_err(backend_err)? {
                Some(value) => decode_note(value.value())?,
                None => return Ok(None),
            };
            let updated = changes.apply(&current);
            let bytes = encode_note(&updated)?;
            table.insert(id, bytes.as_slice()).map_err(backend_err)?;
            updated
        };
        write_txn.commit().map_err(backend_err)?;
        Ok(Some(updated))
    }

    fn remove(&self, id: NoteId) -> Result<bool, StoreError> {
        let write_txn = self.db.begin_write().map_err(backend_err)?;
        let existed = {
            let mut table = write_txn.open_table(NOTES_TABLE).map_err(backend_err)?;
            let removed = table.remove(id).map_err(backend_err)?;
            removed.is_some()
        };
        write_txn.commit().map_err(backend_err)?;
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::NamedTempFile;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap()
    }

    #[test]
    fn test_redb_backend_roundtrip() {
        let temp_file = NamedTempFile::new().unwrap();
        let backend = RedbBackend::open(temp_file.path()).unwrap();

        let note = backend.insert(NewNote::new("buy milk"), now()).unwrap();
        assert_eq!(note.id, 1);
        assert_eq!(backend.get(note.id).unwrap(), Some(note));
        assert_eq!(backend.get(2).unwrap(), None);
    }

    #[test]
    fn test_redb_backend_ids_survive_reopen() {
        let temp_file = NamedTempFile::new().unwrap();
        {
            let backend = RedbBackend::open(temp_file.path()).unwrap();
            backend.insert(NewNote::new("one"), now()).unwrap();
            let two = backend.insert(NewNote::new("two"), now()).unwrap();
            assert!(backend.remove(two.id).unwrap());
        }

        let backend = RedbBackend::open(temp_file.path()).unwrap();
        let three = backend.insert(NewNote::new("three"), now()).unwrap();
        assert_eq!(three.id, 3);
        let texts: Vec<_> = backend.list().unwrap().into_iter().map(|n| n.text).collect();
        assert_eq!(texts, vec!["one", "three"]);
    }

    #[test]
    fn test_redb_backend_unique_insert() {
        let temp_file = NamedTempFile::new().unwrap();
        let backend = RedbBackend::open(temp_file.path()).unwrap();

        let first = backend.insert_unique(NewNote::new("x"), now()).unwrap();
        let CreateOutcome::Created(first) = first else {
            panic!("first insert must create");
        };
        match backend.insert_unique(NewNote::new("x"), now()).unwrap() {
            CreateOutcome::Duplicate(existing) => assert_eq!(existing, first),
            CreateOutcome::Created(_) => panic!("duplicate text must not be inserted"),
        }
        assert_eq!(backend.list().unwrap().len(), 1);

        // The aborted transaction must not consume an id.
        let next = backend.insert(NewNote::new("y"), now()).unwrap();
        assert_eq!(next.id, 2);
    }

    #[test]
    fn test_redb_backend_update_merges() {
        let temp_file = NamedTempFile::new().unwrap();
        let backend = RedbBackend::open(temp_file.path()).unwrap();
        let note = backend.insert(NewNote::new("old"), now()).unwrap();

        let changes = NoteChanges {
            text: Some("new".to_string()),
            date: None,
        };
        let updated = backend.update(note.id, &changes).unwrap().unwrap();
        assert_eq!(updated.text, "new");
        assert_eq!(updated.date, note.date);
        assert_eq!(backend.get(note.id).unwrap(), Some(updated));

        assert_eq!(backend.update(99, &changes).unwrap(), None);
    }

    #[test]
    fn test_redb_backend_remove() {
        let temp_file = NamedTempFile::new().unwrap();
        let backend = RedbBackend::open(temp_file.path()).unwrap();
        let note = backend.insert(NewNote::new("gone"), now()).unwrap();

        assert!(backend.remove(note.id).unwrap());
        assert_eq!(backend.get(note.id).unwrap(), None);
        assert!(!backend.remove(note.id).unwrap());
    }
}
