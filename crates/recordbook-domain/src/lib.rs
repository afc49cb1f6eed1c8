//! recordbook-domain
//!
//! Pure domain models (Account, Transfer, Record and its kinds).
//! No I/O, no CLI, no storage. Only data types and link rules.

pub mod account;
pub mod common;
pub mod record;

pub use account::*;
pub use common::*;
pub use record::*;
