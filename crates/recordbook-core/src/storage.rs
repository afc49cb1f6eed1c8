use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use recordbook_domain::{Account, AccountId, Identifiable, NewRecord, Record, RecordId, RecordKind};

use crate::CoreError;

/// Read-only lookup of accounts by identity.
pub trait AccountDirectory: Send + Sync {
    fn find_account(&self, id: AccountId) -> Result<Option<Account>, CoreError>;
}

/// Persistence contract for records, keyed by record identity.
///
/// `insert` assigns identities; a standard record carrying a tax transfer is
/// written together with its tax record in one operation. `update` is a
/// compare-and-swap on [`Record::version`] and fails with
/// [`CoreError::Conflict`] when the stored version moved on.
pub trait RecordRepository: Send + Sync {
    fn find_by_id(&self, id: RecordId) -> Result<Option<Record>, CoreError>;
    fn find_all(&self) -> Result<Vec<Record>, CoreError>;
    fn insert(&self, record: NewRecord, created_at: DateTime<Utc>) -> Result<Record, CoreError>;
    fn update(&self, record: &Record) -> Result<Record, CoreError>;
    /// Withdraws a record that never got linked. Not part of any workflow.
    fn remove(&self, id: RecordId) -> Result<(), CoreError>;
}

/// Detects dangling references and other anomalies within a record snapshot.
pub fn record_warnings(records: &[Record], accounts: &[Account]) -> Vec<String> {
    let account_ids: HashSet<_> = accounts.iter().map(|a| a.id).collect();
    let by_id: HashMap<RecordId, &Record> = records.iter().map(|r| (r.id(), r)).collect();
    let mut warnings = Vec::new();

    for record in records {
        let id = record.id();
        if !account_ids.contains(&record.from_account().id) {
            warnings.push(format!(
                "record {} references unknown from_account {}",
                id,
                record.from_account().id
            ));
        }
        if !account_ids.contains(&record.to_account().id) {
            warnings.push(format!(
                "record {} references unknown to_account {}",
                id,
                record.to_account().id
            ));
        }
        match record.kind() {
            RecordKind::Standard { tax_record, .. } => {
                if let Some(tax_id) = tax_record {
                    match by_id.get(tax_id).map(|tax| tax.kind()) {
                        Some(RecordKind::Tax { owner, .. }) if *owner == id => {}
                        Some(_) => warnings.push(format!(
                            "record {} links tax record {} which does not belong to it",
                            id, tax_id
                        )),
                        None => warnings.push(format!(
                            "record {} links missing tax record {}",
                            id, tax_id
                        )),
                    }
                }
            }
            RecordKind::Tax { owner, .. } => {
                let owned = by_id
                    .get(owner)
                    .map(|parent| parent.tax_record() == Some(id))
                    .unwrap_or(false);
                if !owned {
                    warnings.push(format!("tax record {} is orphaned from owner {}", id, owner));
                }
            }
            RecordKind::Reverting { reverted } => match by_id.get(reverted) {
                Some(target) if target.reverting_record() == Some(id) => {}
                Some(_) => warnings.push(format!(
                    "reverting record {} is not linked from reversed record {}",
                    id, reverted
                )),
                None => warnings.push(format!(
                    "reverting record {} reverses missing record {}",
                    id, reverted
                )),
            },
        }
        if let Some(reverting_id) = record.reverting_record() {
            match by_id.get(&reverting_id).map(|rev| rev.kind()) {
                Some(RecordKind::Reverting { reverted }) if *reverted == id => {}
                _ => warnings.push(format!(
                    "record {} links reversal {} which does not revert it",
                    id, reverting_id
                )),
            }
        }
    }
    warnings
}
