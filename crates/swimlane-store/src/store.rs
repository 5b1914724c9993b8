//! Filesystem-backed artifact store.
//!
//! The directory tree *is* the database: artifacts are addressed purely by
//! the naming convention in [`crate::naming`], and every resolution
//! re-scans the relevant directory rather than caching. The store is a
//! deliberate chokepoint so the convention can later be swapped for a real
//! key-value store without touching the stages.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use chrono::{Duration, NaiveDateTime};
use tracing::{info, instrument, warn};

use swimlane_core::ids::{DayTag, SessionId};

use crate::error::StoreError;
use crate::kind::ArtifactKind;
use crate::naming;

pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a folder under the root by case-insensitive name match.
    /// Exactly one directory must match.
    pub fn resolve_dir(&self, tag: &str) -> Result<PathBuf, StoreError> {
        let mut matches = Vec::new();
        for entry in std::fs::read_dir(&self.root)?.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.eq_ignore_ascii_case(tag) && entry.path().is_dir() {
                matches.push(entry.path());
            }
        }
        match matches.len() {
            0 => Err(StoreError::NotFound(format!("folder '{tag}'"))),
            1 => Ok(matches.remove(0)),
            _ => Err(StoreError::Ambiguous(tag.to_string())),
        }
    }

    /// The day's folder, or `NotFound` when it does not exist.
    pub fn day_dir(&self, day: &DayTag) -> Result<PathBuf, StoreError> {
        self.resolve_dir(day.as_str())
    }

    /// Persist an artifact. The content is written in one shot, only after
    /// the caller has fully assembled it — stages never leave partial files.
    #[instrument(skip(self, content), fields(day = %day, kind = %kind, tag))]
    pub fn put(
        &self,
        day: &DayTag,
        kind: ArtifactKind,
        tag: &str,
        content: &str,
    ) -> Result<PathBuf, StoreError> {
        let dir = self.day_dir(day)?;
        let path = naming::artifact_path(&dir, kind, day, tag);
        std::fs::write(&path, content)?;
        info!(path = %path.display(), "artifact written");
        Ok(path)
    }

    /// The exact session-tagged artifact, or `NotFound`.
    #[instrument(skip(self), fields(day = %day, kind = %kind, session = %session))]
    pub fn get_exact(
        &self,
        day: &DayTag,
        kind: ArtifactKind,
        session: &SessionId,
    ) -> Result<PathBuf, StoreError> {
        let dir = self.day_dir(day)?;
        let path = naming::artifact_path(&dir, kind, day, session.as_str());
        if path.is_file() {
            Ok(path)
        } else {
            Err(StoreError::NotFound(format!(
                "artifact {}",
                path.display()
            )))
        }
    }

    /// Historical artifacts of `kind` for `day`, newest first by the
    /// timestamp embedded in each filename.
    ///
    /// Scans the day folder, then each extra root (the shared week folder).
    /// Paths in `exclude` are skipped, so the currently-resolved session
    /// artifact is never returned twice. Filenames whose timestamp cannot
    /// be parsed sort as oldest possible — a bad filename never fails the
    /// scan. At most `limit` paths are returned.
    #[instrument(skip(self, exclude, extra_roots), fields(day = %day, kind = %kind, limit))]
    pub fn resolve_historical(
        &self,
        day: &DayTag,
        kind: ArtifactKind,
        exclude: &HashSet<PathBuf>,
        limit: usize,
        extra_roots: &[PathBuf],
    ) -> Vec<PathBuf> {
        let mut seen = exclude.clone();
        let mut found = Vec::new();

        let mut roots = Vec::new();
        if let Ok(dir) = self.day_dir(day) {
            roots.push(dir);
        }
        roots.extend(extra_roots.iter().cloned());

        for root in &roots {
            let pattern = naming::artifact_pattern(root, kind, day);
            let Some(pattern) = pattern.to_str() else { continue };
            let Ok(paths) = glob::glob(pattern) else { continue };
            for path in paths.flatten() {
                if seen.insert(path.clone()) {
                    found.push(path);
                }
            }
        }

        found.sort_by_key(|path| {
            Reverse(naming::parse_file_timestamp(path).unwrap_or(NaiveDateTime::MIN))
        });
        found.truncate(limit);
        found
    }

    /// The most recently *modified* artifact of `kind` for `day`.
    ///
    /// This fallback deliberately compares filesystem modification time,
    /// not the filename timestamp: it serves consumers that have no session
    /// id at all, where any readable artifact beats none.
    #[instrument(skip(self), fields(day = %day, kind = %kind))]
    pub fn latest_by_mtime(
        &self,
        day: &DayTag,
        kind: ArtifactKind,
    ) -> Result<PathBuf, StoreError> {
        let dir = self.day_dir(day)?;
        let pattern = naming::artifact_pattern(&dir, kind, day);
        let pattern = pattern
            .to_str()
            .ok_or_else(|| StoreError::Io("non-UTF-8 store path".into()))?;

        let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
        if let Ok(paths) = glob::glob(pattern) {
            for path in paths.flatten() {
                let modified = std::fs::metadata(&path)
                    .and_then(|m| m.modified())
                    .unwrap_or(UNIX_EPOCH);
                if newest.as_ref().is_none_or(|(ts, _)| modified > *ts) {
                    newest = Some((modified, path));
                }
            }
        }
        newest
            .map(|(_, path)| path)
            .ok_or_else(|| StoreError::NotFound(format!("no {kind} artifact for {day}")))
    }

    /// Delete artifacts whose filename timestamp is strictly older than
    /// `now - horizon_days`. Unparsable filenames are left untouched —
    /// retention fails safe, never fast. Returns the number deleted.
    #[instrument(skip(self), fields(day = %day, horizon_days))]
    pub fn sweep(
        &self,
        day: &DayTag,
        horizon_days: i64,
        now: NaiveDateTime,
    ) -> Result<usize, StoreError> {
        let dir = self.day_dir(day)?;
        let cutoff = now - Duration::days(horizon_days);
        let mut deleted = 0;

        for kind in ArtifactKind::ALL {
            let pattern = naming::artifact_pattern(&dir, kind, day);
            let Some(pattern) = pattern.to_str() else { continue };
            let Ok(paths) = glob::glob(pattern) else { continue };
            for path in paths.flatten() {
                let Some(timestamp) = naming::parse_file_timestamp(&path) else {
                    continue;
                };
                if timestamp < cutoff {
                    match std::fs::remove_file(&path) {
                        Ok(()) => {
                            info!(path = %path.display(), "deleted expired artifact");
                            deleted += 1;
                        }
                        Err(e) => warn!(path = %path.display(), error = %e, "sweep failed to delete"),
                    }
                }
            }
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(tag: &str) -> DayTag {
        tag.parse().unwrap()
    }

    fn ts(date: &str) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn store_with_day(tag: &str) -> (tempfile::TempDir, ArtifactStore) {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join(tag)).unwrap();
        let store = ArtifactStore::new(root.path());
        (root, store)
    }

    #[test]
    fn day_dir_matches_case_insensitively() {
        let (_root, store) = store_with_day("Mon");
        let dir = store.day_dir(&day("mon")).unwrap();
        assert_eq!(dir.file_name().unwrap(), "Mon");
    }

    #[test]
    fn day_dir_missing_is_not_found() {
        let root = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(root.path());
        assert!(matches!(
            store.day_dir(&day("mon")),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn day_dir_double_match_is_ambiguous() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("mon")).unwrap();
        std::fs::create_dir(root.path().join("MON")).unwrap();
        let store = ArtifactStore::new(root.path());
        assert!(matches!(
            store.day_dir(&day("mon")),
            Err(StoreError::Ambiguous(_))
        ));
    }

    #[test]
    fn put_then_get_exact_roundtrip() {
        let (_root, store) = store_with_day("mon");
        let session = SessionId::from_raw("2026-03-02_09-15");

        let written = store
            .put(&day("mon"), ArtifactKind::Report, session.as_str(), "body")
            .unwrap();
        let resolved = store
            .get_exact(&day("mon"), ArtifactKind::Report, &session)
            .unwrap();

        assert_eq!(written, resolved);
        assert_eq!(std::fs::read_to_string(&resolved).unwrap(), "body");
        assert_eq!(
            resolved.file_name().unwrap(),
            "full_class_report-mon_2026-03-02_09-15.txt"
        );
    }

    #[test]
    fn get_exact_missing_session_is_not_found() {
        let (_root, store) = store_with_day("mon");
        let result = store.get_exact(
            &day("mon"),
            ArtifactKind::Report,
            &SessionId::from_raw("2026-03-02_09-15"),
        );
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn historical_orders_newest_first_and_caps_at_limit() {
        let (_root, store) = store_with_day("mon");
        let d = day("mon");
        for tag in ["2026-01-01_09-00", "2026-03-01_09-00", "2026-02-01_09-00"] {
            store.put(&d, ArtifactKind::Report, tag, "r").unwrap();
        }

        let found =
            store.resolve_historical(&d, ArtifactKind::Report, &HashSet::new(), 2, &[]);
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "full_class_report-mon_2026-03-01_09-00.txt",
                "full_class_report-mon_2026-02-01_09-00.txt",
            ]
        );
    }

    #[test]
    fn historical_excludes_current_session_artifact() {
        let (_root, store) = store_with_day("mon");
        let d = day("mon");
        let current = store
            .put(&d, ArtifactKind::Report, "2026-03-01_09-00", "current")
            .unwrap();
        store
            .put(&d, ArtifactKind::Report, "2026-02-01_09-00", "old")
            .unwrap();

        let exclude: HashSet<_> = [current.clone()].into();
        let found = store.resolve_historical(&d, ArtifactKind::Report, &exclude, 10, &[]);
        assert_eq!(found.len(), 1);
        assert!(!found.contains(&current));
    }

    #[test]
    fn historical_malformed_timestamp_sorts_last() {
        let (_root, store) = store_with_day("mon");
        let d = day("mon");
        store.put(&d, ArtifactKind::Report, "not-a-timestamp", "x").unwrap();
        store
            .put(&d, ArtifactKind::Report, "2026-01-01_09-00", "y")
            .unwrap();

        let found = store.resolve_historical(&d, ArtifactKind::Report, &HashSet::new(), 10, &[]);
        assert_eq!(found.len(), 2);
        assert!(found[1]
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .contains("not-a-timestamp"));
    }

    #[test]
    fn historical_scans_extra_roots_after_day_dir() {
        let (root, store) = store_with_day("mon");
        let d = day("mon");
        store
            .put(&d, ArtifactKind::Report, "2026-01-01_09-00", "day")
            .unwrap();

        let week = root.path().join("week");
        std::fs::create_dir(&week).unwrap();
        std::fs::write(
            week.join("full_class_report-mon_2026-02-01_09-00.txt"),
            "week",
        )
        .unwrap();

        let found =
            store.resolve_historical(&d, ArtifactKind::Report, &HashSet::new(), 10, &[week]);
        assert_eq!(found.len(), 2);
        // the week-folder artifact is newer, so it sorts first
        assert!(found[0].parent().unwrap().ends_with("week"));
    }

    #[test]
    fn latest_by_mtime_ignores_filename_timestamps() {
        let (_root, store) = store_with_day("mon");
        let d = day("mon");
        // filename says older, but it is written last so its mtime is newest
        store
            .put(&d, ArtifactKind::Report, "2026-03-01_09-00", "newer-name")
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(30));
        let touched = store
            .put(&d, ArtifactKind::Report, "2026-01-01_09-00", "older-name")
            .unwrap();

        let latest = store.latest_by_mtime(&d, ArtifactKind::Report).unwrap();
        assert_eq!(latest, touched);
    }

    #[test]
    fn latest_by_mtime_empty_is_not_found() {
        let (_root, store) = store_with_day("mon");
        assert!(matches!(
            store.latest_by_mtime(&day("mon"), ArtifactKind::Report),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn sweep_deletes_strictly_older_than_horizon() {
        let (_root, store) = store_with_day("mon");
        let d = day("mon");
        // now = 2026-03-06 12:00, horizon 64 days => cutoff 2026-01-01 12:00
        store.put(&d, ArtifactKind::Report, "2025-12-31_09-00", "old").unwrap();
        store.put(&d, ArtifactKind::Report, "2026-01-01_13-00", "keep").unwrap();
        store.put(&d, ArtifactKind::Plan, "2025-11-01_09-00", "old-plan").unwrap();
        store.put(&d, ArtifactKind::Analysis, "unparsable-tag", "keep").unwrap();

        let deleted = store.sweep(&d, 64, ts("2026-03-06")).unwrap();
        assert_eq!(deleted, 2);

        let dir = store.day_dir(&d).unwrap();
        assert!(!dir.join("full_class_report-mon_2025-12-31_09-00.txt").exists());
        assert!(dir.join("full_class_report-mon_2026-01-01_13-00.txt").exists());
        assert!(!dir.join("lesson_plans_output-mon_2025-11-01_09-00.txt").exists());
        assert!(dir.join("long_term_analysis-mon_unparsable-tag.txt").exists());
    }

    #[test]
    fn sweep_on_missing_day_fails() {
        let root = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(root.path());
        assert!(store.sweep(&day("mon"), 64, ts("2026-03-06")).is_err());
    }
}
