//! Creation and reversal of records.

use tracing::{debug, error, info, warn};

use recordbook_domain::{Displayable, Identifiable, LinkError, NewRecord, Record, RecordId, RecordKind};

use crate::presentation::{self, NewRecordView};
use crate::storage::{AccountDirectory, RecordRepository};
use crate::time::Clock;
use crate::{CoreError, CoreResult};

pub const DEFAULT_REVERSAL_PREFIX: &str = "Reversal: ";

/// What happened to the tax sub-record while reverting its owner.
#[derive(Debug, Clone)]
pub enum TaxCascade {
    NoTaxRecord,
    Reverted { tax: Record, reverting: Record },
    AlreadyReverted { tax: Record },
    Missing(RecordId),
}

/// Outcome of a successful revert.
#[derive(Debug, Clone)]
pub struct Reversal {
    pub original: Record,
    pub reverting: Record,
    pub tax: TaxCascade,
}

/// Orchestrates record workflows against the store and account directory.
pub struct RecordService<'a> {
    records: &'a dyn RecordRepository,
    accounts: &'a dyn AccountDirectory,
    clock: &'a dyn Clock,
    reversal_prefix: String,
}

impl<'a> RecordService<'a> {
    pub fn new(
        records: &'a dyn RecordRepository,
        accounts: &'a dyn AccountDirectory,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            records,
            accounts,
            clock,
            reversal_prefix: DEFAULT_REVERSAL_PREFIX.into(),
        }
    }

    pub fn with_reversal_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.reversal_prefix = prefix.into();
        self
    }

    /// Returns every stored record in store order.
    pub fn list(&self) -> CoreResult<Vec<Record>> {
        self.records.find_all()
    }

    pub fn find(&self, id: RecordId) -> CoreResult<Record> {
        self.records.find_by_id(id)?.ok_or(CoreError::NotFound(id))
    }

    /// Resolves the inbound shape and persists it. Nothing is written when an
    /// account does not resolve.
    pub fn create_from_view(&self, view: &NewRecordView) -> CoreResult<Record> {
        let record = presentation::new_record_from_view(view, self.accounts)?;
        self.create(record)
    }

    /// Persists a resolved record; an embedded tax transfer is saved together with it.
    pub fn create(&self, record: NewRecord) -> CoreResult<Record> {
        let has_tax = record.tax().is_some();
        let created = self.records.insert(record, self.clock.now())?;
        info!(
            record = %created.id(),
            tax_record = ?created.tax_record(),
            has_tax,
            "record created"
        );
        Ok(created)
    }

    /// Reverts a standard record and cascades to its tax sub-record.
    ///
    /// Re-issuing the call for an already reverted record completes a pending
    /// tax cascade before reporting [`CoreError::AlreadyReverted`].
    pub fn revert(&self, id: RecordId) -> CoreResult<Reversal> {
        let original = self.find(id)?;
        match original.ensure_revertable() {
            Ok(()) => {}
            Err(LinkError::AlreadyReverted { .. }) => {
                self.repair_cascade(&original)?;
                return Err(CoreError::AlreadyReverted(id));
            }
            Err(err) => return Err(err.into()),
        }

        let (original, reverting) = self.link_reversal(original)?;
        let tax = match original.tax_record() {
            Some(tax_id) => self.cascade_to_tax(tax_id)?,
            None => TaxCascade::NoTaxRecord,
        };
        info!(
            record = %original.id(),
            reverting = %reverting.id(),
            "record reverted"
        );
        Ok(Reversal {
            original,
            reverting,
            tax,
        })
    }

    fn repair_cascade(&self, original: &Record) -> CoreResult<()> {
        let Some(tax_id) = original.tax_record() else {
            return Ok(());
        };
        if let TaxCascade::Reverted { reverting, .. } = self.cascade_to_tax(tax_id)? {
            warn!(
                record = %original.id(),
                tax_record = %tax_id,
                reverting = %reverting.id(),
                "completed pending tax cascade"
            );
        }
        Ok(())
    }

    fn cascade_to_tax(&self, tax_id: RecordId) -> CoreResult<TaxCascade> {
        let Some(tax) = self.records.find_by_id(tax_id)? else {
            warn!(tax_record = %tax_id, "tax record missing, cascade skipped");
            return Ok(TaxCascade::Missing(tax_id));
        };
        if !matches!(tax.kind(), RecordKind::Tax { .. }) {
            return Err(CoreError::Integrity(format!(
                "record {} linked as tax record is a {} record",
                tax_id,
                tax.kind()
            )));
        }
        if tax.reverting_record().is_some() {
            debug!(tax_record = %tax_id, "tax record already reverted, cascade is a no-op");
            return Ok(TaxCascade::AlreadyReverted { tax });
        }
        match self.link_reversal(tax) {
            Ok((tax, reverting)) => Ok(TaxCascade::Reverted { tax, reverting }),
            Err(CoreError::AlreadyReverted(_)) => {
                let tax = self.find(tax_id)?;
                Ok(TaxCascade::AlreadyReverted { tax })
            }
            Err(err) => Err(err),
        }
    }

    /// Inserts the reverting counterpart of `target` and links it with a
    /// conditional write. A lost race withdraws the inserted record.
    fn link_reversal(&self, mut target: Record) -> CoreResult<(Record, Record)> {
        let new = NewRecord::reversal_of(&target, self.clock.today(), &self.reversal_prefix);
        let reverting = self.records.insert(new, self.clock.now())?;
        debug!(
            record = %target.display_label(),
            reverting = %reverting.display_label(),
            "reverting record inserted"
        );

        if let Err(err) = target.attach_reverting(&reverting) {
            self.withdraw(reverting.id());
            return Err(err.into());
        }
        match self.records.update(&target) {
            Ok(saved) => Ok((saved, reverting)),
            Err(CoreError::Conflict(id)) => {
                warn!(record = %id, "lost race while linking reversal");
                self.withdraw(reverting.id());
                Err(CoreError::AlreadyReverted(id))
            }
            Err(err) => {
                self.withdraw(reverting.id());
                Err(err)
            }
        }
    }

    fn withdraw(&self, id: RecordId) {
        if let Err(err) = self.records.remove(id) {
            error!(reverting = %id, error = %err, "failed to withdraw unlinked reverting record");
        }
    }
}
