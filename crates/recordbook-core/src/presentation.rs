//! External record shapes and their mapping to and from the domain model.
//!
//! Wire identities are 32-bit. Identities that do not fit are rejected with
//! [`CoreError::IdentityOutOfRange`], never truncated.

use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use recordbook_domain::{
    Account, AccountId, Identifiable, NewRecord, Record, RecordId, RecordKind, Transfer,
};

use crate::storage::AccountDirectory;
use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountView {
    pub id: i32,
    #[serde(default)]
    pub name: String,
}

impl AccountView {
    /// Inbound reference carrying only the identity.
    pub fn reference(id: i32) -> Self {
        Self {
            id,
            name: String::new(),
        }
    }
}

/// Rendered record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordView {
    pub id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub from: AccountView,
    pub to: AccountView,
    pub amount: Decimal,
    pub booking_date: NaiveDate,
    pub creation_time: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_record: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverting_record: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxed_record: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverted_record: Option<i32>,
}

/// Tax transfer embedded in a [`NewRecordView`]. Falls back to the owner's booking date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaxTransferView {
    pub from: AccountView,
    pub to: AccountView,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_date: Option<NaiveDate>,
}

/// Inbound request to create a record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewRecordView {
    pub from: AccountView,
    pub to: AccountView,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub amount: Decimal,
    pub booking_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_record: Option<TaxTransferView>,
}

fn narrow(id: i64) -> CoreResult<i32> {
    i32::try_from(id).map_err(|_| CoreError::IdentityOutOfRange(id))
}

fn narrow_record(id: RecordId) -> CoreResult<i32> {
    narrow(id.0)
}

fn narrow_link(id: Option<RecordId>) -> CoreResult<Option<i32>> {
    id.map(narrow_record).transpose()
}

pub fn render_account(account: &Account) -> CoreResult<AccountView> {
    Ok(AccountView {
        id: narrow(account.id.0)?,
        name: account.name.clone(),
    })
}

pub fn render(record: &Record) -> CoreResult<RecordView> {
    let related = narrow_link(record.related_record())?;
    let (taxed_record, reverted_record) = match record.kind() {
        RecordKind::Tax { .. } => (related, None),
        RecordKind::Reverting { .. } => (None, related),
        RecordKind::Standard { .. } => (None, None),
    };
    Ok(RecordView {
        id: narrow_record(record.id())?,
        description: record.description().map(str::to_string),
        from: render_account(record.from_account())?,
        to: render_account(record.to_account())?,
        amount: record.amount(),
        booking_date: record.booking_date(),
        creation_time: record.created_at().fixed_offset(),
        tax_record: narrow_link(record.tax_record())?,
        reverting_record: narrow_link(record.reverting_record())?,
        taxed_record,
        reverted_record,
    })
}

pub fn render_all(records: &[Record]) -> CoreResult<Vec<RecordView>> {
    records.iter().map(render).collect()
}

fn resolve_account(accounts: &dyn AccountDirectory, view: &AccountView) -> CoreResult<Account> {
    let id = AccountId(i64::from(view.id));
    accounts
        .find_account(id)?
        .ok_or(CoreError::AccountNotFound(id))
}

/// Resolves both accounts of the request, and of its tax transfer if present.
pub fn new_record_from_view(
    view: &NewRecordView,
    accounts: &dyn AccountDirectory,
) -> CoreResult<NewRecord> {
    let transfer = Transfer::new(
        resolve_account(accounts, &view.from)?,
        resolve_account(accounts, &view.to)?,
        view.amount,
        view.booking_date,
    )
    .with_description(view.description.clone());
    let mut record = NewRecord::standard(transfer);
    if let Some(tax) = &view.tax_record {
        let tax_transfer = Transfer::new(
            resolve_account(accounts, &tax.from)?,
            resolve_account(accounts, &tax.to)?,
            tax.amount,
            tax.booking_date.unwrap_or(view.booking_date),
        )
        .with_description(tax.description.clone());
        record = record.with_tax(tax_transfer);
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn created() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap()
    }

    fn transfer() -> Transfer {
        Transfer::new(
            Account::new(AccountId(1), "Checking"),
            Account::new(AccountId(2), "Savings"),
            Decimal::new(-2550, 2),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
    }

    #[test]
    fn render_uses_utc_offset_and_relation_ids() {
        let tax = Record::tax(RecordId(8), RecordId(7), transfer(), created());
        let view = render(&tax).expect("render");

        assert_eq!(view.id, 8);
        assert_eq!(view.taxed_record, Some(7));
        assert_eq!(view.reverted_record, None);
        assert_eq!(view.creation_time.offset().local_minus_utc(), 0);
        assert_eq!(view.amount, Decimal::new(-2550, 2));
        assert_eq!(view.from.name, "Checking");

        let json = serde_json::to_value(&view).expect("serialize");
        assert_eq!(json["taxedRecord"], 7);
        assert_eq!(json["bookingDate"], "2024-01-01");
        assert!(json.get("revertedRecord").is_none());
    }

    #[test]
    fn render_rejects_identities_beyond_wire_width() {
        let record = Record::standard(RecordId(i64::from(i32::MAX) + 1), transfer(), created());
        let err = render(&record).unwrap_err();
        assert!(matches!(err, CoreError::IdentityOutOfRange(id) if id == 2_147_483_648));
    }

    #[test]
    fn unknown_tax_account_fails_resolution() {
        let store = MemoryStore::new();
        store.add_account("Checking").unwrap();
        store.add_account("Savings").unwrap();

        let view = NewRecordView {
            from: AccountView::reference(1),
            to: AccountView::reference(2),
            description: None,
            amount: Decimal::new(100, 0),
            booking_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            tax_record: Some(TaxTransferView {
                from: AccountView::reference(1),
                to: AccountView::reference(99),
                description: None,
                amount: Decimal::new(10, 0),
                booking_date: None,
            }),
        };
        let err = new_record_from_view(&view, &store).unwrap_err();
        assert!(matches!(err, CoreError::AccountNotFound(AccountId(99))));
    }

    #[test]
    fn new_record_view_accepts_numeric_amounts() {
        let payload = r#"{
            "from": {"id": 1},
            "to": {"id": 2},
            "amount": 100.5,
            "bookingDate": "2024-01-01",
            "taxRecord": {"from": {"id": 3}, "to": {"id": 4}, "amount": "10.00"}
        }"#;
        let view: NewRecordView = serde_json::from_str(payload).expect("parse");
        assert_eq!(view.amount, Decimal::new(1005, 1));
        let tax = view.tax_record.expect("tax");
        assert_eq!(tax.amount, Decimal::new(1000, 2));
        assert_eq!(tax.booking_date, None);
    }
}
