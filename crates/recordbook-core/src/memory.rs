use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use recordbook_domain::{Account, AccountId, NewRecord, Record, RecordId};

use crate::storage::{AccountDirectory, RecordRepository};
use crate::table::RecordTable;
use crate::{CoreError, CoreResult};

/// In-process store guarding a [`RecordTable`] with a mutex.
///
/// Every repository call holds the lock for its whole duration, which gives
/// `update` its compare-and-swap semantics.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: Mutex<RecordTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_account(&self, name: impl Into<String>) -> CoreResult<Account> {
        Ok(self.lock()?.add_account(name))
    }

    pub fn snapshot(&self) -> CoreResult<RecordTable> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> CoreResult<MutexGuard<'_, RecordTable>> {
        self.table
            .lock()
            .map_err(|_| CoreError::Storage("memory store lock poisoned".into()))
    }
}

impl AccountDirectory for MemoryStore {
    fn find_account(&self, id: AccountId) -> CoreResult<Option<Account>> {
        Ok(self.lock()?.account(id).cloned())
    }
}

impl RecordRepository for MemoryStore {
    fn find_by_id(&self, id: RecordId) -> CoreResult<Option<Record>> {
        Ok(self.lock()?.record(id).cloned())
    }

    fn find_all(&self) -> CoreResult<Vec<Record>> {
        Ok(self.lock()?.records().to_vec())
    }

    fn insert(&self, record: NewRecord, created_at: DateTime<Utc>) -> CoreResult<Record> {
        self.lock()?.insert(record, created_at)
    }

    fn update(&self, record: &Record) -> CoreResult<Record> {
        self.lock()?.update(record)
    }

    fn remove(&self, id: RecordId) -> CoreResult<()> {
        self.lock()?.remove(id)
    }
}
