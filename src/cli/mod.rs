//! Command-line frontend over the record service.
//!
//! Every successful command prints JSON on stdout; failures are reported on
//! stderr by [`output::report`] with an exit code derived from their [`Outcome`].
//!
//! [`Outcome`]: crate::Outcome

pub mod output;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use recordbook_config::{Config, ConfigManager};
use recordbook_core::{
    presentation, public_api, AccountView, NewRecordView, RecordService, SystemClock,
    TaxTransferView,
};
use recordbook_storage_json::JsonRecordStore;

use crate::errors::{RecordbookError, Result};

#[derive(Debug, Parser)]
#[command(name = "recordbook_cli", version, about = "Record book with tax sub-records and reversals")]
pub struct Cli {
    /// Path of the configuration file
    #[arg(long, env = "RECORDBOOK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path of the record store, overrides the configured one
    #[arg(long, env = "RECORDBOOK_STORE")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Work with records
    #[command(subcommand)]
    Records(RecordsCommand),

    /// Manage the accounts records refer to
    #[command(subcommand)]
    Accounts(AccountsCommand),
}

#[derive(Debug, Subcommand)]
pub enum RecordsCommand {
    /// List every stored record
    List,

    /// Create a record, optionally with a tax sub-record
    Create(CreateArgs),

    /// Revert a standard record and its tax sub-record
    Revert {
        /// Identity of the record to revert
        id: i32,
    },
}

#[derive(Debug, Subcommand)]
pub enum AccountsCommand {
    /// Register a new account
    Add {
        /// Display name of the account
        name: String,
    },

    /// List registered accounts
    List,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Source account id
    #[arg(long)]
    pub from: i32,
    /// Destination account id
    #[arg(long)]
    pub to: i32,
    #[arg(long, allow_hyphen_values = true)]
    pub amount: Decimal,
    /// Booking date (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,
    #[arg(long)]
    pub description: Option<String>,

    /// Source account of the tax sub-record
    #[arg(long, requires_all = ["tax_to", "tax_amount"])]
    pub tax_from: Option<i32>,
    /// Destination account of the tax sub-record
    #[arg(long, requires = "tax_from")]
    pub tax_to: Option<i32>,
    #[arg(long, requires = "tax_from", allow_hyphen_values = true)]
    pub tax_amount: Option<Decimal>,
    /// Booking date of the tax sub-record, defaults to --date
    #[arg(long, requires = "tax_from")]
    pub tax_date: Option<NaiveDate>,
    #[arg(long, requires = "tax_from")]
    pub tax_description: Option<String>,
}

impl CreateArgs {
    pub fn to_request(&self) -> NewRecordView {
        let tax_record = match (self.tax_from, self.tax_to, self.tax_amount) {
            (Some(from), Some(to), Some(amount)) => Some(TaxTransferView {
                from: AccountView::reference(from),
                to: AccountView::reference(to),
                description: self.tax_description.clone(),
                amount,
                booking_date: self.tax_date,
            }),
            _ => None,
        };
        NewRecordView {
            from: AccountView::reference(self.from),
            to: AccountView::reference(self.to),
            description: self.description.clone(),
            amount: self.amount,
            booking_date: self.date,
            tax_record,
        }
    }
}

/// Loads the configuration named on the command line, or the user default.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::new(path.clone()),
        None => ConfigManager::user_default()?,
    };
    Ok(manager.load()?)
}

/// Executes `cli` and returns the JSON document to print.
pub fn run(cli: &Cli, config: &Config) -> Result<String> {
    let store_path = cli
        .store
        .clone()
        .unwrap_or_else(|| config.resolve_store_path());
    debug!(store = %store_path.display(), "opening record store");
    let store = JsonRecordStore::open(store_path)?;
    let clock = SystemClock;
    let service = RecordService::new(&store, &store, &clock)
        .with_reversal_prefix(config.reversal_prefix.clone());

    match &cli.command {
        Command::Records(RecordsCommand::List) => {
            to_json(&public_api::api_list_records(&service)?)
        }
        Command::Records(RecordsCommand::Create(args)) => {
            to_json(&public_api::api_create_record(&service, &args.to_request())?)
        }
        Command::Records(RecordsCommand::Revert { id }) => {
            to_json(&public_api::api_revert_record(&service, *id)?)
        }
        Command::Accounts(AccountsCommand::Add { name }) => {
            if name.trim().is_empty() {
                return Err(RecordbookError::Input("account name must not be empty".into()));
            }
            let account = store.add_account(name)?;
            to_json(&presentation::render_account(&account)?)
        }
        Command::Accounts(AccountsCommand::List) => {
            let accounts = store
                .accounts()?
                .iter()
                .map(presentation::render_account)
                .collect::<std::result::Result<Vec<_>, _>>()?;
            to_json(&accounts)
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
