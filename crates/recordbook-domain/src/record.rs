use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::common::{Displayable, Identifiable};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monetary payload shared by every record kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transfer {
    pub from_account: Account,
    pub to_account: Account,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub amount: Decimal,
    pub booking_date: NaiveDate,
}

impl Transfer {
    pub fn new(
        from_account: Account,
        to_account: Account,
        amount: Decimal,
        booking_date: NaiveDate,
    ) -> Self {
        Self {
            from_account,
            to_account,
            description: None,
            amount,
            booking_date,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Mirror of this transfer: accounts swapped, same amount, booked on `booking_date`.
    pub fn reversed(&self, booking_date: NaiveDate, prefix: &str) -> Transfer {
        let description = match self.description.as_deref() {
            Some(text) if !text.trim().is_empty() => format!("{prefix}{text}"),
            _ => prefix.trim_end().trim_end_matches(':').to_string(),
        };
        Transfer {
            from_account: self.to_account.clone(),
            to_account: self.from_account.clone(),
            description: Some(description),
            amount: self.amount,
            booking_date,
        }
    }
}

/// Kind-specific payload of a [`Record`]. Links are identities, never owned values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordKind {
    Standard {
        #[serde(default)]
        tax_record: Option<RecordId>,
        #[serde(default)]
        reverting_record: Option<RecordId>,
    },
    Tax {
        owner: RecordId,
        #[serde(default)]
        reverting_record: Option<RecordId>,
    },
    Reverting {
        reverted: RecordId,
    },
}

impl RecordKind {
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Standard { .. } => "standard",
            RecordKind::Tax { .. } => "tax",
            RecordKind::Reverting { .. } => "reverting",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReversalStatus {
    Active,
    Reverted(RecordId),
}

/// Violations of the link-once rules between records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    NotRevertable { id: RecordId, kind: &'static str },
    AlreadyReverted { id: RecordId, reverting: RecordId },
    TaxAlreadyAttached { id: RecordId, tax: RecordId },
    NotStandard { id: RecordId, kind: &'static str },
    Mismatched { id: RecordId, other: RecordId },
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::NotRevertable { id, kind } => {
                write!(f, "record {id} is a {kind} record and cannot be reverted")
            }
            LinkError::AlreadyReverted { id, reverting } => {
                write!(f, "record {id} is already reverted by record {reverting}")
            }
            LinkError::TaxAlreadyAttached { id, tax } => {
                write!(f, "record {id} already owns tax record {tax}")
            }
            LinkError::NotStandard { id, kind } => {
                write!(f, "record {id} is a {kind} record and cannot own a tax record")
            }
            LinkError::Mismatched { id, other } => {
                write!(f, "record {other} does not link back to record {id}")
            }
        }
    }
}

impl std::error::Error for LinkError {}

/// A persisted transfer between two accounts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    id: RecordId,
    transfer: Transfer,
    created_at: DateTime<Utc>,
    #[serde(default)]
    version: u64,
    kind: RecordKind,
}

impl Record {
    pub fn standard(id: RecordId, transfer: Transfer, created_at: DateTime<Utc>) -> Self {
        Self::with_kind(
            id,
            transfer,
            created_at,
            RecordKind::Standard {
                tax_record: None,
                reverting_record: None,
            },
        )
    }

    pub fn tax(
        id: RecordId,
        owner: RecordId,
        transfer: Transfer,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::with_kind(
            id,
            transfer,
            created_at,
            RecordKind::Tax {
                owner,
                reverting_record: None,
            },
        )
    }

    pub fn reverting(
        id: RecordId,
        reverted: RecordId,
        transfer: Transfer,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::with_kind(id, transfer, created_at, RecordKind::Reverting { reverted })
    }

    fn with_kind(
        id: RecordId,
        transfer: Transfer,
        created_at: DateTime<Utc>,
        kind: RecordKind,
    ) -> Self {
        Self {
            id,
            transfer,
            created_at,
            version: 0,
            kind,
        }
    }

    /// Returns the record tagged with the store's version counter.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn kind(&self) -> &RecordKind {
        &self.kind
    }

    pub fn transfer(&self) -> &Transfer {
        &self.transfer
    }

    pub fn from_account(&self) -> &Account {
        &self.transfer.from_account
    }

    pub fn to_account(&self) -> &Account {
        &self.transfer.to_account
    }

    pub fn description(&self) -> Option<&str> {
        self.transfer.description.as_deref()
    }

    pub fn amount(&self) -> Decimal {
        self.transfer.amount
    }

    pub fn booking_date(&self) -> NaiveDate {
        self.transfer.booking_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn tax_record(&self) -> Option<RecordId> {
        match self.kind {
            RecordKind::Standard { tax_record, .. } => tax_record,
            _ => None,
        }
    }

    pub fn reverting_record(&self) -> Option<RecordId> {
        match self.kind {
            RecordKind::Standard {
                reverting_record, ..
            }
            | RecordKind::Tax {
                reverting_record, ..
            } => reverting_record,
            RecordKind::Reverting { .. } => None,
        }
    }

    /// Owner of a tax record, or the reversed record of a reverting record.
    pub fn related_record(&self) -> Option<RecordId> {
        match self.kind {
            RecordKind::Standard { .. } => None,
            RecordKind::Tax { owner, .. } => Some(owner),
            RecordKind::Reverting { reverted } => Some(reverted),
        }
    }

    pub fn reversal_status(&self) -> ReversalStatus {
        match self.reverting_record() {
            Some(reverting) => ReversalStatus::Reverted(reverting),
            None => ReversalStatus::Active,
        }
    }

    /// Checks whether the record may be the direct target of a reversal.
    pub fn ensure_revertable(&self) -> Result<(), LinkError> {
        match self.kind {
            RecordKind::Standard {
                reverting_record: None,
                ..
            } => Ok(()),
            RecordKind::Standard {
                reverting_record: Some(reverting),
                ..
            } => Err(LinkError::AlreadyReverted {
                id: self.id,
                reverting,
            }),
            RecordKind::Tax { .. } | RecordKind::Reverting { .. } => {
                Err(LinkError::NotRevertable {
                    id: self.id,
                    kind: self.kind.label(),
                })
            }
        }
    }

    /// Links a tax record owned by this standard record. Succeeds at most once.
    pub fn attach_tax(&mut self, tax: &Record) -> Result<(), LinkError> {
        let id = self.id;
        match (&mut self.kind, &tax.kind) {
            (
                RecordKind::Standard {
                    tax_record: Some(existing),
                    ..
                },
                _,
            ) => Err(LinkError::TaxAlreadyAttached { id, tax: *existing }),
            (RecordKind::Standard { tax_record, .. }, RecordKind::Tax { owner, .. })
                if *owner == id =>
            {
                *tax_record = Some(tax.id);
                Ok(())
            }
            (RecordKind::Standard { .. }, _) => Err(LinkError::Mismatched { id, other: tax.id }),
            (kind, _) => Err(LinkError::NotStandard {
                id,
                kind: kind.label(),
            }),
        }
    }

    /// Links the record reversing this one. Succeeds at most once.
    pub fn attach_reverting(&mut self, reverting: &Record) -> Result<(), LinkError> {
        let id = self.id;
        let points_back = matches!(reverting.kind, RecordKind::Reverting { reverted } if reverted == id);
        match &mut self.kind {
            RecordKind::Reverting { .. } => Err(LinkError::NotRevertable {
                id,
                kind: "reverting",
            }),
            RecordKind::Standard {
                reverting_record: Some(existing),
                ..
            }
            | RecordKind::Tax {
                reverting_record: Some(existing),
                ..
            } => Err(LinkError::AlreadyReverted {
                id,
                reverting: *existing,
            }),
            RecordKind::Standard {
                reverting_record, ..
            }
            | RecordKind::Tax {
                reverting_record, ..
            } => {
                if !points_back {
                    return Err(LinkError::Mismatched {
                        id,
                        other: reverting.id,
                    });
                }
                *reverting_record = Some(reverting.id);
                Ok(())
            }
        }
    }
}

impl Identifiable for Record {
    type Id = RecordId;

    fn id(&self) -> RecordId {
        self.id
    }
}

impl Displayable for Record {
    fn display_label(&self) -> String {
        format!("record:{} [{}]", self.id, self.kind)
    }
}

/// Payload of a record that has not been given an identity yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewRecordKind {
    Standard { tax: Option<Transfer> },
    Reverting { reverted: RecordId },
}

/// Record awaiting insertion; the store assigns identities and wires links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    transfer: Transfer,
    kind: NewRecordKind,
}

/// Records produced by materializing a [`NewRecord`].
#[derive(Debug, Clone)]
pub struct Materialized {
    pub primary: Record,
    pub tax: Option<Record>,
}

impl NewRecord {
    pub fn standard(transfer: Transfer) -> Self {
        Self {
            transfer,
            kind: NewRecordKind::Standard { tax: None },
        }
    }

    pub fn with_tax(mut self, tax: Transfer) -> Self {
        if let NewRecordKind::Standard { tax: slot } = &mut self.kind {
            *slot = Some(tax);
        }
        self
    }

    /// Reverting counterpart of `record`, booked on `booking_date`.
    pub fn reversal_of(record: &Record, booking_date: NaiveDate, prefix: &str) -> Self {
        Self {
            transfer: record.transfer.reversed(booking_date, prefix),
            kind: NewRecordKind::Reverting {
                reverted: record.id,
            },
        }
    }

    pub fn transfer(&self) -> &Transfer {
        &self.transfer
    }

    pub fn kind(&self) -> &NewRecordKind {
        &self.kind
    }

    pub fn tax(&self) -> Option<&Transfer> {
        match &self.kind {
            NewRecordKind::Standard { tax } => tax.as_ref(),
            NewRecordKind::Reverting { .. } => None,
        }
    }

    /// Assigns identities via `allocate` and links an embedded tax record to its owner.
    pub fn materialize<F>(
        self,
        created_at: DateTime<Utc>,
        mut allocate: F,
    ) -> Result<Materialized, LinkError>
    where
        F: FnMut() -> RecordId,
    {
        let id = allocate();
        match self.kind {
            NewRecordKind::Standard { tax } => {
                let mut primary = Record::standard(id, self.transfer, created_at);
                let tax = match tax {
                    Some(transfer) => {
                        let tax = Record::tax(allocate(), id, transfer, created_at);
                        primary.attach_tax(&tax)?;
                        Some(tax)
                    }
                    None => None,
                };
                Ok(Materialized { primary, tax })
            }
            NewRecordKind::Reverting { reverted } => Ok(Materialized {
                primary: Record::reverting(id, reverted, self.transfer, created_at),
                tax: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountId;
    use chrono::TimeZone;

    fn account(id: i64, name: &str) -> Account {
        Account::new(AccountId(id), name)
    }

    fn transfer(amount: i64) -> Transfer {
        Transfer::new(
            account(1, "Checking"),
            account(2, "Rent"),
            Decimal::new(amount, 2),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .with_description(Some("January rent".into()))
    }

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap()
    }

    fn next_ids(start: i64) -> impl FnMut() -> RecordId {
        let mut next = start;
        move || {
            let id = RecordId(next);
            next += 1;
            id
        }
    }

    #[test]
    fn attach_reverting_succeeds_only_once() {
        let mut original = Record::standard(RecordId(1), transfer(10000), created());
        let first = Record::reverting(RecordId(2), RecordId(1), transfer(10000), created());
        let second = Record::reverting(RecordId(3), RecordId(1), transfer(10000), created());

        original.attach_reverting(&first).expect("first link");
        let err = original.attach_reverting(&second).unwrap_err();
        assert_eq!(
            err,
            LinkError::AlreadyReverted {
                id: RecordId(1),
                reverting: RecordId(2)
            }
        );
        assert_eq!(original.reverting_record(), Some(RecordId(2)));
        assert_eq!(original.reversal_status(), ReversalStatus::Reverted(RecordId(2)));
    }

    #[test]
    fn attach_reverting_rejects_foreign_reversal() {
        let mut original = Record::standard(RecordId(1), transfer(500), created());
        let foreign = Record::reverting(RecordId(9), RecordId(7), transfer(500), created());

        let err = original.attach_reverting(&foreign).unwrap_err();
        assert!(matches!(err, LinkError::Mismatched { other, .. } if other == RecordId(9)));
        assert_eq!(original.reversal_status(), ReversalStatus::Active);
    }

    #[test]
    fn reverting_records_never_accept_a_reversal() {
        let mut reverting = Record::reverting(RecordId(2), RecordId(1), transfer(500), created());
        let other = Record::reverting(RecordId(3), RecordId(2), transfer(500), created());

        assert!(matches!(
            reverting.attach_reverting(&other),
            Err(LinkError::NotRevertable { kind: "reverting", .. })
        ));
        assert!(matches!(
            reverting.ensure_revertable(),
            Err(LinkError::NotRevertable { kind: "reverting", .. })
        ));
    }

    #[test]
    fn tax_records_accept_a_reversal_but_are_not_revertable_directly() {
        let mut tax = Record::tax(RecordId(2), RecordId(1), transfer(1000), created());
        assert!(matches!(
            tax.ensure_revertable(),
            Err(LinkError::NotRevertable { kind: "tax", .. })
        ));

        let reverting = Record::reverting(RecordId(3), RecordId(2), transfer(1000), created());
        tax.attach_reverting(&reverting).expect("cascade link");
        assert_eq!(tax.reverting_record(), Some(RecordId(3)));
        assert_eq!(tax.related_record(), Some(RecordId(1)));
    }

    #[test]
    fn attach_tax_requires_matching_owner_and_links_once() {
        let mut owner = Record::standard(RecordId(1), transfer(10000), created());
        let stray = Record::tax(RecordId(5), RecordId(4), transfer(1000), created());
        assert!(matches!(
            owner.attach_tax(&stray),
            Err(LinkError::Mismatched { .. })
        ));

        let tax = Record::tax(RecordId(2), RecordId(1), transfer(1000), created());
        owner.attach_tax(&tax).expect("attach tax");
        assert_eq!(owner.tax_record(), Some(RecordId(2)));

        let again = Record::tax(RecordId(3), RecordId(1), transfer(1000), created());
        assert_eq!(
            owner.attach_tax(&again),
            Err(LinkError::TaxAlreadyAttached {
                id: RecordId(1),
                tax: RecordId(2)
            })
        );
    }

    #[test]
    fn materialize_wires_tax_back_reference() {
        let tax_transfer = Transfer::new(
            account(3, "Income"),
            account(4, "Tax office"),
            Decimal::new(1000, 2),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        let materialized = NewRecord::standard(transfer(10000))
            .with_tax(tax_transfer.clone())
            .materialize(created(), next_ids(10))
            .expect("materialize");

        let tax = materialized.tax.expect("tax record");
        assert_eq!(materialized.primary.id(), RecordId(10));
        assert_eq!(materialized.primary.tax_record(), Some(RecordId(11)));
        assert_eq!(tax.id(), RecordId(11));
        assert_eq!(tax.related_record(), Some(RecordId(10)));
        assert_eq!(tax.transfer(), &tax_transfer);
        assert_eq!(tax.created_at(), materialized.primary.created_at());
    }

    #[test]
    fn reversal_mirrors_monetary_fields() {
        let original = Record::standard(RecordId(1), transfer(10000), created());
        let booked = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let reversal = NewRecord::reversal_of(&original, booked, "Reversal: ")
            .materialize(created(), next_ids(2))
            .expect("materialize")
            .primary;

        assert_eq!(reversal.kind(), &RecordKind::Reverting { reverted: RecordId(1) });
        assert_eq!(reversal.amount(), original.amount());
        assert_eq!(reversal.from_account(), original.to_account());
        assert_eq!(reversal.to_account(), original.from_account());
        assert_eq!(reversal.booking_date(), booked);
        assert_eq!(reversal.description(), Some("Reversal: January rent"));
        assert_eq!(reversal.related_record(), Some(RecordId(1)));
        assert_eq!(reversal.reverting_record(), None);
    }

    #[test]
    fn record_kind_serializes_with_tag() {
        let record = Record::tax(RecordId(2), RecordId(1), transfer(1000), created());
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["kind"]["kind"], "tax");
        assert_eq!(json["kind"]["owner"], 1);

        let decoded: Record = serde_json::from_value(json).expect("deserialize");
        assert_eq!(decoded, record);
    }
}
