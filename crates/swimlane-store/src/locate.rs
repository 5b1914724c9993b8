//! Case-insensitive filesystem lookup.
//!
//! Snapshots are deposited by a browser-automation step that does not agree
//! with the pipeline about casing, so every snapshot lookup matches names
//! case-insensitively. Writes always use exact case.

use std::path::{Path, PathBuf};

use tracing::warn;

/// Find a file in `dir` whose name matches `name` case-insensitively.
pub fn find_file_ci(dir: &Path, name: &str) -> Option<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot scan directory");
            return None;
        }
    };
    for entry in entries.flatten() {
        let file_name = entry.file_name();
        if let Some(candidate) = file_name.to_str() {
            if candidate.eq_ignore_ascii_case(name) && entry.path().is_file() {
                return Some(entry.path());
            }
        }
    }
    None
}

/// Locate a snapshot by base name, preferring the `.mhtml` extension and
/// falling back to the legacy `.mht`.
pub fn find_snapshot(dir: &Path, basename: &str) -> Option<PathBuf> {
    find_file_ci(dir, &format!("{basename}.mhtml"))
        .or_else(|| find_file_ci(dir, &format!("{basename}.mht")))
}
