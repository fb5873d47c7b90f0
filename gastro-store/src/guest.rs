//! Local symptom store for guest sessions.
//!
//! The whole record list lives as a JSON array under one key. Every write is a
//! read-modify-write of that list with no locking, so two overlapping writes
//! can lose one of them; guest mode is single-user, single-process.
//!
//! Storage failures never reach the caller. Reads of missing or corrupt data
//! return nothing, and failed writes are logged and dropped. Entries that do
//! not decode are skipped on read but kept on rewrite, and a list that cannot
//! be parsed at all is copied to [`GUEST_SYMPTOMS_BACKUP_KEY`] before the
//! next write replaces it.

use std::collections::HashMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, Utc};
use gastro_model::{start_of_day, NewSymptomRecord, SymptomRecord};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;

/// Key holding the guest symptom list.
pub const GUEST_SYMPTOMS_KEY: &str = "gc.guest.symptoms";

/// Key receiving an unparseable symptom list before it is replaced.
pub const GUEST_SYMPTOMS_BACKUP_KEY: &str = "gc.guest.symptoms.corrupt";

/// Durable string key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

/// One file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)
    }
}

/// In-process map. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> io::Error {
    io::Error::new(ErrorKind::Other, "memory store lock poisoned")
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// What the store found under its key.
enum Stored {
    Entries(Vec<Value>),
    /// Not a JSON array; the text is kept for the backup copy
    Corrupt(String),
    Unavailable,
}

fn decode_entries(entries: &[Value]) -> Vec<SymptomRecord> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match SymptomRecord::deserialize(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(index, error = %e, "Skipping unreadable guest symptom entry");
                None
            }
        })
        .collect()
}

/// Symptom records for an unauthenticated session.
#[derive(Clone)]
pub struct GuestSymptomStore {
    kv: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for GuestSymptomStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuestSymptomStore").finish_non_exhaustive()
    }
}

impl GuestSymptomStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Store backed by files under `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileKeyValueStore::new(dir)))
    }

    /// Store that forgets everything on drop.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKeyValueStore::new()))
    }

    fn load(&self) -> Stored {
        let raw = match self.kv.get(GUEST_SYMPTOMS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Stored::Entries(Vec::new()),
            Err(e) => {
                warn!(error = %e, "Guest storage unreadable, treating as empty");
                return Stored::Unavailable;
            }
        };

        match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(entries) => Stored::Entries(entries),
            Err(e) => {
                warn!(error = %e, "Guest symptom data is corrupt, treating as empty");
                Stored::Corrupt(raw)
            }
        }
    }

    fn read_all(&self) -> Vec<SymptomRecord> {
        match self.load() {
            Stored::Entries(entries) => decode_entries(&entries),
            Stored::Corrupt(_) | Stored::Unavailable => Vec::new(),
        }
    }

    fn write_entries(&self, entries: &[Value]) {
        let encoded = match serde_json::to_string(entries) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(error = %e, "Could not encode guest symptoms, write dropped");
                return;
            }
        };
        if let Err(e) = self.kv.set(GUEST_SYMPTOMS_KEY, &encoded) {
            warn!(error = %e, "Guest storage unavailable, write dropped");
        }
    }

    /// Append a record with a generated id and creation time.
    ///
    /// Only validation failures are returned; when storage is unavailable the
    /// constructed record is still returned but nothing is saved.
    pub fn create(&self, symptom: NewSymptomRecord) -> Result<SymptomRecord> {
        symptom.validate()?;
        let record = symptom.into_record(format!("guest-{}", uuid::Uuid::new_v4()), Utc::now());

        let mut entries = match self.load() {
            Stored::Entries(entries) => entries,
            Stored::Corrupt(raw) => {
                match self.kv.set(GUEST_SYMPTOMS_BACKUP_KEY, &raw) {
                    Ok(()) => warn!(backup = GUEST_SYMPTOMS_BACKUP_KEY, "Replacing corrupt guest symptom data"),
                    Err(e) => warn!(error = %e, "Replacing corrupt guest symptom data without a backup"),
                }
                Vec::new()
            }
            // The list may still be there; writing now would replace it.
            Stored::Unavailable => {
                warn!(id = %record.id, "Guest storage unreadable, write skipped");
                return Ok(record);
            }
        };

        match serde_json::to_value(&record) {
            Ok(value) => entries.push(value),
            Err(e) => {
                warn!(error = %e, "Could not encode guest symptom, write dropped");
                return Ok(record);
            }
        }
        self.write_entries(&entries);

        debug!(id = %record.id, total = entries.len(), "Stored guest symptom");
        Ok(record)
    }

    /// Up to `limit` records, most recent first; ties keep insertion order.
    ///
    /// The guest store has a single owner, so `user_id` is not used to filter.
    pub fn get_by_user(&self, _user_id: &str, limit: usize) -> Vec<SymptomRecord> {
        let mut list = self.read_all();
        list.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        list.truncate(limit);
        list
    }

    /// Most recent record since local midnight.
    pub fn get_today(&self, _user_id: &str) -> Option<SymptomRecord> {
        self.latest_since(start_of_day(&Local::now()))
    }

    /// Most recent record at or after `since`.
    pub fn latest_since(&self, since: DateTime<Utc>) -> Option<SymptomRecord> {
        let mut list: Vec<_> = self
            .read_all()
            .into_iter()
            .filter(|r| r.recorded_at >= since)
            .collect();
        list.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        list.into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use gastro_model::GUEST_USER_ID;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> io::Result<Option<String>> {
            Err(io::Error::new(ErrorKind::PermissionDenied, "denied"))
        }

        fn set(&self, _key: &str, _value: &str) -> io::Result<()> {
            Err(io::Error::new(ErrorKind::PermissionDenied, "denied"))
        }
    }

    fn symptom(pain: u8, at: DateTime<Utc>) -> NewSymptomRecord {
        NewSymptomRecord::new(GUEST_USER_ID, pain, 3).recorded_at(at)
    }

    #[test]
    fn test_create_then_read() {
        let store = GuestSymptomStore::in_memory();
        let before = Utc::now();

        let created = store.create(symptom(4, Utc::now())).unwrap();
        assert!(created.id.starts_with("guest-"));
        assert!(created.created_at >= before);

        let list = store.get_by_user(GUEST_USER_ID, 14);
        assert_eq!(list, vec![created]);
    }

    #[test]
    fn test_empty_store_returns_empty() {
        let store = GuestSymptomStore::in_memory();
        assert!(store.get_by_user(GUEST_USER_ID, 14).is_empty());
        assert!(store.get_today(GUEST_USER_ID).is_none());
    }

    #[test]
    fn test_sorted_desc_and_limited() {
        let store = GuestSymptomStore::in_memory();
        let now = Utc::now();
        for (i, pain) in [1u8, 2, 3, 4].iter().enumerate() {
            // oldest first on insert
            store.create(symptom(*pain, now - Duration::hours(10 - i as i64))).unwrap();
        }
        let pains: Vec<_> = store
            .get_by_user(GUEST_USER_ID, 3)
            .iter()
            .map(|r| r.pain_level)
            .collect();
        assert_eq!(pains, vec![4, 3, 2]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let store = GuestSymptomStore::in_memory();
        let at = Utc::now();
        let first = store.create(symptom(1, at)).unwrap();
        let second = store.create(symptom(2, at)).unwrap();
        let ids: Vec<_> = store
            .get_by_user(GUEST_USER_ID, 10)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test]
    fn test_today_ignores_older_records() {
        let store = GuestSymptomStore::in_memory();
        let now = Utc::now();
        store.create(symptom(7, now - Duration::days(2))).unwrap();
        store.create(symptom(6, now - Duration::days(3))).unwrap();
        assert!(store.get_today(GUEST_USER_ID).is_none());

        let today = store.create(symptom(3, now)).unwrap();
        assert_eq!(store.get_today(GUEST_USER_ID), Some(today));
    }

    #[test]
    fn test_latest_since_picks_most_recent() {
        let store = GuestSymptomStore::in_memory();
        let now = Utc::now();
        store.create(symptom(2, now - Duration::minutes(30))).unwrap();
        let newest = store.create(symptom(5, now - Duration::minutes(5))).unwrap();
        store.create(symptom(9, now - Duration::minutes(50))).unwrap();

        let found = store.latest_since(now - Duration::hours(1)).unwrap();
        assert_eq!(found.id, newest.id);
    }

    #[test]
    fn test_corrupt_data_reads_empty() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        kv.set(GUEST_SYMPTOMS_KEY, "{not json").unwrap();
        let store = GuestSymptomStore::new(kv.clone());
        assert!(store.get_by_user(GUEST_USER_ID, 14).is_empty());

        kv.set(GUEST_SYMPTOMS_KEY, r#"{"an":"object"}"#).unwrap();
        assert!(store.get_by_user(GUEST_USER_ID, 14).is_empty());
    }

    #[test]
    fn test_unavailable_storage_is_silent() {
        let store = GuestSymptomStore::new(Arc::new(BrokenStore));
        let record = store.create(symptom(5, Utc::now())).unwrap();
        assert_eq!(record.pain_level, 5);
        assert!(store.get_by_user(GUEST_USER_ID, 14).is_empty());
        assert!(store.get_today(GUEST_USER_ID).is_none());
    }

    #[test]
    fn test_validation_still_enforced() {
        let store = GuestSymptomStore::in_memory();
        assert!(store.create(NewSymptomRecord::new(GUEST_USER_ID, 12, 3)).is_err());
        assert!(store.get_by_user(GUEST_USER_ID, 14).is_empty());
    }

    fn stored_entries(kv: &MemoryKeyValueStore) -> Vec<Value> {
        let raw = kv.get(GUEST_SYMPTOMS_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_bad_entry_skipped_and_kept() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let store = GuestSymptomStore::new(kv.clone());
        let now = Utc::now();
        for pain in [2u8, 4, 6] {
            store.create(symptom(pain, now - Duration::hours(i64::from(pain)))).unwrap();
        }

        let mut entries = stored_entries(&kv);
        entries.push(serde_json::json!({ "id": "broken", "pain_level": "very high" }));
        kv.set(GUEST_SYMPTOMS_KEY, &serde_json::to_string(&entries).unwrap()).unwrap();

        assert_eq!(store.get_by_user(GUEST_USER_ID, 14).len(), 3);

        store.create(symptom(1, now)).unwrap();
        let entries = stored_entries(&kv);
        assert_eq!(entries.len(), 5);
        assert!(entries.iter().any(|e| e["id"] == "broken"));
        assert_eq!(store.get_by_user(GUEST_USER_ID, 14).len(), 4);
    }

    #[test]
    fn test_corrupt_list_backed_up_before_replace() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        kv.set(GUEST_SYMPTOMS_KEY, "{not json").unwrap();
        let store = GuestSymptomStore::new(kv.clone());

        store.create(symptom(3, Utc::now())).unwrap();
        assert_eq!(kv.get(GUEST_SYMPTOMS_BACKUP_KEY).unwrap().as_deref(), Some("{not json"));
        assert_eq!(stored_entries(&kv).len(), 1);
    }

    #[test]
    fn test_unreadable_storage_is_not_overwritten() {
        struct ReadFails(MemoryKeyValueStore);

        impl KeyValueStore for ReadFails {
            fn get(&self, _key: &str) -> io::Result<Option<String>> {
                Err(io::Error::new(ErrorKind::PermissionDenied, "denied"))
            }

            fn set(&self, key: &str, value: &str) -> io::Result<()> {
                self.0.set(key, value)
            }
        }

        let kv = Arc::new(ReadFails(MemoryKeyValueStore::new()));
        let store = GuestSymptomStore::new(kv.clone());
        let record = store.create(symptom(5, Utc::now())).unwrap();
        assert_eq!(record.pain_level, 5);
        assert!(kv.0.get(GUEST_SYMPTOMS_KEY).unwrap().is_none());
    }
}
