#![doc(test(attr(deny(warnings))))]

//! Recordbook keeps directed money transfers between accounts with optional tax
//! sub-records and supports reverting them through mirrored counter-records.

pub mod cli;
pub mod errors;
pub mod utils;

use std::sync::Once;

pub use errors::{Outcome, RecordbookError};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default filter.
pub fn init() {
    init_with_filter(utils::DEFAULT_LOG_FILTER);
}

/// Initializes global tracing once. `RUST_LOG` takes precedence over `filter`.
pub fn init_with_filter(filter: &str) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(filter);
        tracing::debug!("Recordbook tracing initialized.");
    });
}
