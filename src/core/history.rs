//! # Input History
//!
//! Append-only record of submitted lines at `~/.tern_history`, newest last.
//! Write failures degrade to a warning; losing history must never take the
//! session down with it.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use log::warn;

pub struct HistoryFile {
    path: Option<PathBuf>,
}

impl HistoryFile {
    /// History at the fixed user-home path. `path` is None when no home
    /// directory can be determined; appends become no-ops.
    pub fn open_default() -> Self {
        let path = dirs::home_dir().map(|h| h.join(".tern_history"));
        if path.is_none() {
            warn!("Could not determine home directory, input history disabled");
        }
        Self { path }
    }

    #[cfg(test)]
    pub fn at(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// Appends one submitted entry. Multi-row submissions keep their
    /// newlines; each append is terminated by one.
    pub fn append(&self, entry: &str) {
        let Some(path) = &self.path else {
            return;
        };
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut f| writeln!(f, "{entry}"));
        if let Err(e) = result {
            warn!("Failed to append to history {}: {}", path.display(), e);
        }
    }
}
