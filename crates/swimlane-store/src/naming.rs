//! Pure path and filename computation for the artifact convention.
//!
//! Artifacts are addressed as `<prefix>-<day>_<tag>.txt` where `tag` is a
//! session id or a free `YYYY-MM-DD_HH-MM` timestamp. Every stage must
//! interpret this convention identically or artifacts silently "disappear"
//! to the next stage, so all of it lives here.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use swimlane_core::ids::{DayTag, TAG_TIMESTAMP_FORMAT};

use crate::kind::ArtifactKind;

/// Length of the `YYYY-MM-DD_HH-MM` suffix embedded in artifact filenames.
const TIMESTAMP_LEN: usize = 16;

/// Artifact filename for `(kind, day, tag)`. No existence check.
pub fn artifact_file_name(kind: ArtifactKind, day: &DayTag, tag: &str) -> String {
    format!("{}-{}_{}.txt", kind.prefix(), day, tag)
}

/// Full artifact path under `dir`. Pure and deterministic.
pub fn artifact_path(dir: &Path, kind: ArtifactKind, day: &DayTag, tag: &str) -> PathBuf {
    dir.join(artifact_file_name(kind, day, tag))
}

/// Glob pattern matching every artifact of `kind` for `day` in a directory.
pub fn artifact_pattern(dir: &Path, kind: ArtifactKind, day: &DayTag) -> PathBuf {
    dir.join(format!("{}-{}_*.txt", kind.prefix(), day))
}

/// Parse the trailing `YYYY-MM-DD_HH-MM` timestamp embedded in an artifact
/// filename. Returns `None` for free-form tags; callers decide whether that
/// means "sort last" (historical ordering) or "leave alone" (retention).
pub fn parse_file_timestamp(path: &Path) -> Option<NaiveDateTime> {
    let stem = path.file_stem()?.to_str()?;
    let split_at = stem.len().checked_sub(TIMESTAMP_LEN)?;
    let tail = stem.get(split_at..)?;
    NaiveDateTime::parse_from_str(tail, TAG_TIMESTAMP_FORMAT).ok()
}

/// Register snapshot base name for a class join key (extension handled at
/// lookup: `.mhtml` preferred, legacy `.mht` accepted).
pub fn register_basename(time_key: &str, stage_key: &str) -> String {
    format!("{time_key}stage{stage_key}register")
}

/// Base skill snapshot name for a class join key.
pub fn skill_basename(time_key: &str, stage_key: &str) -> String {
    format!("{time_key}stage{stage_key}skill")
}

/// Numbered skill continuation page (`skill-1` .. `skill-5`).
pub fn skill_page_basename(time_key: &str, stage_key: &str, page: usize) -> String {
    format!("{time_key}stage{stage_key}skill-{page}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(tag: &str) -> DayTag {
        tag.parse().unwrap()
    }

    #[test]
    fn artifact_names_follow_convention() {
        assert_eq!(
            artifact_file_name(ArtifactKind::Report, &day("mon"), "2026-03-02_09-15"),
            "full_class_report-mon_2026-03-02_09-15.txt"
        );
        assert_eq!(
            artifact_file_name(ArtifactKind::Plan, &day("thu"), "2026-03-05_18-00"),
            "lesson_plans_output-thu_2026-03-05_18-00.txt"
        );
    }

    #[test]
    fn file_timestamp_parses_trailing_tag() {
        let path = Path::new("mon/full_class_report-mon_2026-03-02_09-15.txt");
        let ts = parse_file_timestamp(path).unwrap();
        assert_eq!(ts.format(TAG_TIMESTAMP_FORMAT).to_string(), "2026-03-02_09-15");
    }

    #[test]
    fn file_timestamp_rejects_free_form_tags() {
        assert!(parse_file_timestamp(Path::new("full_class_report-mon_session-one.txt")).is_none());
        assert!(parse_file_timestamp(Path::new("short.txt")).is_none());
        assert!(parse_file_timestamp(Path::new("long_term_analysis-mon.txt")).is_none());
    }

    #[test]
    fn snapshot_basenames_join_on_time_and_stage() {
        assert_eq!(register_basename("0900", "3"), "0900stage3register");
        assert_eq!(skill_basename("0900", "3"), "0900stage3skill");
        assert_eq!(skill_page_basename("0900", "3", 2), "0900stage3skill-2");
        assert_eq!(register_basename("1730", "a"), "1730stagearegister");
    }
}
