//! Identity-keyed table holding accounts and records.
//!
//! Relationships between records are stored as identities only, so the table
//! can be persisted as a flat document and shared by every store implementation.

use std::mem;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use recordbook_domain::{Account, AccountId, Identifiable, NewRecord, Record, RecordId};

use crate::storage::record_warnings;
use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordTable {
    #[serde(default = "RecordTable::first_id")]
    next_record_id: i64,
    #[serde(default = "RecordTable::first_id")]
    next_account_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    accounts: Vec<Account>,
    #[serde(default)]
    records: Vec<Record>,
}

impl Default for RecordTable {
    fn default() -> Self {
        Self {
            next_record_id: Self::first_id(),
            next_account_id: Self::first_id(),
            last_created_at: None,
            accounts: Vec::new(),
            records: Vec::new(),
        }
    }
}

impl RecordTable {
    fn first_id() -> i64 {
        1
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn add_account(&mut self, name: impl Into<String>) -> Account {
        let account = Account::new(AccountId(self.next_account_id), name);
        self.next_account_id += 1;
        self.accounts.push(account.clone());
        account
    }

    /// Inserts `new` with fresh identities. Creation times never go backwards.
    pub fn insert(&mut self, new: NewRecord, created_at: DateTime<Utc>) -> CoreResult<Record> {
        let created_at = match self.last_created_at {
            Some(last) if last > created_at => last,
            _ => created_at,
        };
        let next = &mut self.next_record_id;
        let materialized = new.materialize(created_at, || {
            let id = RecordId(*next);
            *next += 1;
            id
        })?;
        self.last_created_at = Some(created_at);
        let primary = materialized.primary;
        self.records.push(primary.clone());
        if let Some(tax) = materialized.tax {
            self.records.push(tax);
        }
        Ok(primary)
    }

    /// Replaces the stored record if its version still matches `record`.
    pub fn update(&mut self, record: &Record) -> CoreResult<Record> {
        let id = record.id();
        let stored = self
            .records
            .iter_mut()
            .find(|stored| stored.id() == id)
            .ok_or(CoreError::NotFound(id))?;
        if stored.version() != record.version() {
            return Err(CoreError::Conflict(id));
        }
        if stored.transfer() != record.transfer()
            || stored.created_at() != record.created_at()
            || mem::discriminant(stored.kind()) != mem::discriminant(record.kind())
        {
            return Err(CoreError::Integrity(format!(
                "record {} may only change its links",
                id
            )));
        }
        let updated = record.clone().with_version(stored.version() + 1);
        *stored = updated.clone();
        Ok(updated)
    }

    pub fn remove(&mut self, id: RecordId) -> CoreResult<()> {
        let before = self.records.len();
        self.records.retain(|record| record.id() != id);
        if self.records.len() == before {
            return Err(CoreError::NotFound(id));
        }
        Ok(())
    }

    pub fn warnings(&self) -> Vec<String> {
        record_warnings(&self.records, &self.accounts)
    }
}
