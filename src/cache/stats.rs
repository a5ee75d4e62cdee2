//! Read-only inspection of a cache directory tree.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::warn;

use super::expiring::read_expiration;
use super::trailer::Expiration;
use crate::utils::NavtileError;

/// Tallies for one cache tree, as produced by [`CacheStats::gather`].
#[derive(Debug, Serialize)]
pub struct CacheStats {
    pub root: PathBuf,
    /// Files anywhere under the root.
    pub entries: u64,
    /// Files whose embedded expiration has already passed.
    pub expired_entries: u64,
    pub directories: u64,
    pub total_bytes: u64,
}

impl CacheStats {
    /// Walk the tree under `root` and tally its contents.
    ///
    /// An unreadable root is an error; anything unreadable below it is
    /// logged and skipped so a partially broken tree still reports.
    pub fn gather(root: impl Into<PathBuf>) -> Result<Self, NavtileError> {
        let root = root.into();
        let top = fs::read_dir(&root)?;

        let mut stats = Self {
            root,
            entries: 0,
            expired_entries: 0,
            directories: 0,
            total_bytes: 0,
        };
        stats.tally(top);
        Ok(stats)
    }

    fn tally(&mut self, entries: fs::ReadDir) {
        let now = Expiration::now();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                self.directories += 1;
                match fs::read_dir(&path) {
                    Ok(sub) => self.tally(sub),
                    Err(err) => {
                        warn!(directory = %path.display(), error = %err, "failed listing cache directory");
                    }
                }
                continue;
            }

            self.entries += 1;
            if let Ok(meta) = entry.metadata() {
                self.total_bytes += meta.len();
            }
            match read_expiration(&path) {
                Ok(expires) if expires < now => self.expired_entries += 1,
                Ok(_) => {}
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "failed reading cache entry");
                }
            }
        }
    }

    /// Plain-text rendering for the terminal.
    pub fn format(&self) -> String {
        format!(
            "Cache root:   {}\nEntries:      {} ({} expired)\nDirectories:  {}\nTotal size:   {}",
            self.root.display(),
            self.entries,
            self.expired_entries,
            self.directories,
            human_bytes(self.total_bytes),
        )
    }
}

fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
