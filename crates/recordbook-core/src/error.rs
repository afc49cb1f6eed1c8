use recordbook_domain::{AccountId, LinkError, RecordId};
use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),
    #[error("Record not found: {0}")]
    NotFound(RecordId),
    #[error("Record {id} is a {kind} record and cannot be reverted")]
    NotRevertable { id: RecordId, kind: &'static str },
    #[error("Record {0} is already reverted")]
    AlreadyReverted(RecordId),
    #[error("Identity {0} does not fit the 32-bit wire format")]
    IdentityOutOfRange(i64),
    #[error("Concurrent modification of record {0}")]
    Conflict(RecordId),
    #[error("Inconsistent record graph: {0}")]
    Integrity(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LinkError> for CoreError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::NotRevertable { id, kind } => CoreError::NotRevertable { id, kind },
            LinkError::AlreadyReverted { id, .. } => CoreError::AlreadyReverted(id),
            other => CoreError::Integrity(other.to_string()),
        }
    }
}
