use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use recordbook_core::{AccountDirectory, CoreError, RecordRepository, RecordTable};
use recordbook_domain::{Account, AccountId, Displayable, Identifiable, NewRecord, Record, RecordId};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

const STORE_EXTENSION: &str = "json";
const LOCK_SUFFIX: &str = "lock";

/// Filesystem-backed JSON store for records and the accounts they reference.
///
/// The whole table lives in one document. Each mutating call reads it, applies
/// the change and replaces the file through a uniquely named temporary sibling,
/// all while holding an exclusive lock on `<store>.lock`. Reads take the lock
/// shared. The lock is an OS file lock, so separate handles and processes on the
/// same store serialize against each other.
#[derive(Debug)]
pub struct JsonRecordStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonRecordStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let lock_path = sibling_path(&path, LOCK_SUFFIX);
        let store = Self { path, lock_path };
        for warning in store.warnings()? {
            warn!(path = %store.path.display(), "{warning}");
        }
        Ok(store)
    }

    /// Opens `records.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Result<Self, CoreError> {
        Self::open(dir.join(format!("records.{}", STORE_EXTENSION)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn add_account(&self, name: &str) -> Result<Account, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Storage("account name must not be empty".into()));
        }
        let account = self.write(|table| Ok(table.add_account(name)))?;
        debug!(account = %account.display_label(), "account registered");
        Ok(account)
    }

    pub fn accounts(&self) -> Result<Vec<Account>, CoreError> {
        self.read(|table| table.accounts().to_vec())
    }

    /// Integrity findings for the stored records.
    pub fn warnings(&self) -> Result<Vec<String>, CoreError> {
        self.read(RecordTable::warnings)
    }

    /// Opens the lock file. The lock is released when the returned handle drops.
    fn lock_file(&self) -> Result<File, CoreError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        Ok(file)
    }

    fn read<T>(&self, f: impl FnOnce(&RecordTable) -> T) -> Result<T, CoreError> {
        let guard = self.lock_file()?;
        guard.lock_shared()?;
        let table = load_table(&self.path)?;
        drop(guard);
        Ok(f(&table))
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut RecordTable) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let guard = self.lock_file()?;
        guard.lock()?;
        let mut table = load_table(&self.path)?;
        let out = f(&mut table)?;
        save_table(&table, &self.path)?;
        drop(guard);
        Ok(out)
    }
}

impl AccountDirectory for JsonRecordStore {
    fn find_account(&self, id: AccountId) -> Result<Option<Account>, CoreError> {
        self.read(|table| table.account(id).cloned())
    }
}

impl RecordRepository for JsonRecordStore {
    fn find_by_id(&self, id: RecordId) -> Result<Option<Record>, CoreError> {
        self.read(|table| table.record(id).cloned())
    }

    fn find_all(&self) -> Result<Vec<Record>, CoreError> {
        self.read(|table| table.records().to_vec())
    }

    fn insert(&self, record: NewRecord, created_at: DateTime<Utc>) -> Result<Record, CoreError> {
        let inserted = self.write(|table| table.insert(record, created_at))?;
        debug!(record = %inserted.id(), path = %self.path.display(), "record written");
        Ok(inserted)
    }

    fn update(&self, record: &Record) -> Result<Record, CoreError> {
        self.write(|table| table.update(record))
    }

    fn remove(&self, id: RecordId) -> Result<(), CoreError> {
        self.write(|table| table.remove(id))
    }
}

/// Loads a table from the provided filesystem path. A missing file is an empty table.
pub fn load_table(path: &Path) -> Result<RecordTable, CoreError> {
    if !path.exists() {
        return Ok(RecordTable::default());
    }
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

/// Saves a table to an arbitrary path on disk.
///
/// The document is written to a fresh temporary file in the same directory and
/// renamed over `path`, so readers never observe a partial document. Callers
/// sharing a store must hold its lock.
pub fn save_table(table: &RecordTable, path: &Path) -> Result<(), CoreError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    let json =
        serde_json::to_string_pretty(table).map_err(|err| CoreError::Serde(err.to_string()))?;
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(json.as_bytes())?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut sibling = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, suffix),
        None => suffix.to_string(),
    };
    sibling.set_extension(ext);
    sibling
}
