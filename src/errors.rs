use recordbook_config::ConfigError;
use recordbook_core::CoreError;
use thiserror::Error;

/// Unified error type for the record book frontends.
#[derive(Debug, Error)]
pub enum RecordbookError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RecordbookError>;

/// Caller-facing classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    BadRequest,
    NotFound,
    MethodNotAllowed,
    Internal,
}

impl Outcome {
    /// HTTP status a service frontend would answer with.
    pub fn status(self) -> u16 {
        match self {
            Outcome::BadRequest => 400,
            Outcome::NotFound => 404,
            Outcome::MethodNotAllowed => 405,
            Outcome::Internal => 500,
        }
    }

    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::BadRequest => 2,
            Outcome::NotFound => 3,
            Outcome::MethodNotAllowed => 4,
            Outcome::Internal => 1,
        }
    }
}

impl RecordbookError {
    pub fn outcome(&self) -> Outcome {
        match self {
            RecordbookError::Core(err) => match err {
                CoreError::AccountNotFound(_) => Outcome::BadRequest,
                CoreError::NotFound(_) => Outcome::NotFound,
                CoreError::NotRevertable { .. } | CoreError::AlreadyReverted(_) => {
                    Outcome::MethodNotAllowed
                }
                _ => Outcome::Internal,
            },
            RecordbookError::Input(_) => Outcome::BadRequest,
            RecordbookError::Config(_) | RecordbookError::Output(_) => Outcome::Internal,
        }
    }
}
