use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

const BIN_NAME: &str = "recordbook_cli";

/// Isolated config and store locations for one test.
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("store").join("records.json")
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary exists");
        cmd.env("RECORDBOOK_CONFIG", self.dir.path().join("config.json"))
            .env("RECORDBOOK_STORE", self.store_path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Runs a command expected to succeed and parses its JSON output.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.command().args(args).output().expect("run binary");
        assert!(
            output.status.success(),
            "command {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("json output")
    }

    pub fn seed_accounts(&self) {
        for name in ["Checking", "Landlord", "Salary", "Tax office"] {
            self.json(&["accounts", "add", name]);
        }
    }
}
