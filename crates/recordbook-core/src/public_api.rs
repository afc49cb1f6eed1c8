//! Stable, public-facing helpers that wrap the internal service layer.
//!
//! One function per logical operation offered to callers (list, create,
//! revert). Each returns rendered records so frontends never touch the
//! domain model directly.

use recordbook_domain::RecordId;

use crate::presentation::{self, NewRecordView, RecordView};
use crate::record_service::RecordService;
use crate::CoreError;

/// Lists every stored record.
pub fn api_list_records(service: &RecordService<'_>) -> Result<Vec<RecordView>, CoreError> {
    presentation::render_all(&service.list()?)
}

/// Creates a record (and its tax sub-record, if embedded) and renders it.
pub fn api_create_record(
    service: &RecordService<'_>,
    request: &NewRecordView,
) -> Result<RecordView, CoreError> {
    let created = service.create_from_view(request)?;
    presentation::render(&created)
}

/// Reverts the record identified by the wire id `id` and renders the updated original.
pub fn api_revert_record(service: &RecordService<'_>, id: i32) -> Result<RecordView, CoreError> {
    let reversal = service.revert(RecordId(i64::from(id)))?;
    presentation::render(&reversal.original)
}
