//! recordbook-core
//!
//! Business logic for records: creation with an optional tax sub-record,
//! reversal with tax cascade, and the presentation shapes exchanged with callers.
//! Depends on recordbook-domain. Persistence and account lookup are consumed
//! through the traits in [`storage`].

pub mod error;
pub mod memory;
pub mod presentation;
pub mod public_api;
pub mod record_service;
pub mod storage;
pub mod table;
pub mod time;

pub use error::{CoreError, CoreResult};
pub use memory::MemoryStore;
pub use presentation::{AccountView, NewRecordView, RecordView, TaxTransferView};
pub use record_service::*;
pub use storage::{AccountDirectory, RecordRepository};
pub use table::RecordTable;
pub use time::{Clock, SystemClock};
