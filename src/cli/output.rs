use colored::Colorize;

use crate::errors::RecordbookError;

/// Enables or disables ANSI colours for everything written afterwards.
pub fn set_color_enabled(enabled: bool) {
    if !enabled {
        colored::control::set_override(false);
    }
}

/// Formats a failure for stderr, prefixed with its outcome label.
pub fn format_error(err: &RecordbookError) -> String {
    let outcome = err.outcome();
    let label = format!("error[{}]:", outcome.status());
    format!("{} {}", label.red().bold(), err)
}

/// Writes `err` to stderr and returns the process exit code for it.
pub fn report(err: &RecordbookError) -> i32 {
    eprintln!("{}", format_error(err));
    err.outcome().exit_code()
}
