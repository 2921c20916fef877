//! # History File Management
//!
//! Resolves the location of the REPL history file. By default history
//! lives in `~/.minidb_history`; the `MINIDB_HISTORY` environment
//! variable overrides the path, and setting it to an empty string
//! disables persistence. rustyline handles the actual file I/O.

use std::env;
use std::path::PathBuf;

const DEFAULT_HISTORY_FILE: &str = ".minidb_history";
const HISTORY_ENV_VAR: &str = "MINIDB_HISTORY";

pub fn history_path() -> Option<PathBuf> {
    if let Ok(custom_path) = env::var(HISTORY_ENV_VAR) {
        if custom_path.is_empty() {
            return None;
        }
        return Some(PathBuf::from(custom_path));
    }

    env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(DEFAULT_HISTORY_FILE))
}
