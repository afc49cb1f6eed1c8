use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ConfigError;

const STORE_DIR: &str = "recordbook";
const STORE_FILE: &str = "records.json";

/// User-level settings shared by the record book frontends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom location of the record store. Defaults to `<data dir>/recordbook/records.json`.
    pub store_path: Option<PathBuf>,
    #[serde(default = "Config::default_log_filter")]
    pub log_filter: String,
    #[serde(default = "Config::default_reversal_prefix")]
    pub reversal_prefix: String,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: None,
            log_filter: Self::default_log_filter(),
            reversal_prefix: Self::default_reversal_prefix(),
            ui_color_enabled: Self::default_ui_color_enabled(),
        }
    }
}

impl Config {
    pub fn default_log_filter() -> String {
        "recordbook=info".into()
    }

    pub fn default_reversal_prefix() -> String {
        "Reversal: ".into()
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn resolve_store_path(&self) -> PathBuf {
        if let Some(path) = &self.store_path {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join(STORE_DIR).join(STORE_FILE)
    }

    /// Rejects settings that would make the record book misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "log_filter",
                reason: "must not be empty".into(),
            });
        }
        if self.reversal_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "reversal_prefix",
                reason: "must contain visible characters".into(),
            });
        }
        Ok(())
    }
}
