//! Per-class domain model extracted from the scraped snapshots.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// One class row from the class-index snapshot.
///
/// `(time_key, stage_key)` is the join key used to locate the class's
/// register and skill snapshot files by filename convention.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    /// "09:00 Stage 3 Swim" — the heading used in the report.
    pub full_name: String,
    /// Normalized grade code: "a" for adult classes, otherwise the first
    /// digit run in the class name with 8/9/10 folded to "8".
    pub stage_key: String,
    /// Start time with separators stripped ("09:00" -> "0900").
    pub time_key: String,
}

impl ClassDescriptor {
    /// Build a descriptor from the first two cells of an index row.
    /// Returns `None` when the class name yields no stage key — not every
    /// row in the table is a real class.
    pub fn from_row(time: &str, name: &str) -> Option<Self> {
        let stage_key = stage_key(name)?;
        Some(Self {
            full_name: format!("{time} {name}"),
            stage_key,
            time_key: time_key(time),
        })
    }
}

/// Normalized grade code for a class name, or `None` when the name carries
/// no recognizable stage.
pub fn stage_key(class_name: &str) -> Option<String> {
    if class_name.to_lowercase().contains("adult") {
        return Some("a".into());
    }
    let digits = DIGIT_RUN.find(class_name)?.as_str();
    // The top stages share one snapshot set on the portal.
    match digits {
        "8" | "9" | "10" => Some("8".into()),
        other => Some(other.to_string()),
    }
}

/// Class start time with separators stripped, as used in snapshot filenames.
pub fn time_key(time: &str) -> String {
    time.replace(':', "")
}

/// Canonical student key: the display name with any trailing
/// "(Stage ...)" suffix stripped. Must be stable across the register
/// document and every skill document for merging to work.
pub fn clean_name(display_name: &str) -> String {
    display_name
        .split(" (Stage")
        .next()
        .unwrap_or(display_name)
        .trim()
        .to_string()
}

/// One assessed objective for a student.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillStatus {
    pub objective: String,
    pub status: String,
}

/// Register data for one student, merged with skill statuses from the
/// paginated skill snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub display_name: String,
    /// Completion percentage as scraped, e.g. "40%".
    pub overall_progress: String,
    pub skills: Vec<SkillStatus>,
}

/// Roster keyed by clean name. The BTreeMap ordering is load-bearing:
/// report sections must appear in ascending clean-name order regardless of
/// scrape order.
pub type StudentRoster = BTreeMap<String, StudentRecord>;

/// One class plus its merged roster; renders to one report section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassReport {
    pub descriptor: ClassDescriptor,
    pub students: StudentRoster,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_key_adult_classes() {
        assert_eq!(stage_key("Adult Improver"), Some("a".into()));
        assert_eq!(stage_key("ADULT BEGINNER"), Some("a".into()));
    }

    #[test]
    fn stage_key_first_digit_run() {
        assert_eq!(stage_key("Stage 3 Swim"), Some("3".into()));
        assert_eq!(stage_key("Stage 12 Squad"), Some("12".into()));
    }

    #[test]
    fn stage_key_folds_top_stages() {
        assert_eq!(stage_key("Stage 8"), Some("8".into()));
        assert_eq!(stage_key("Stage 9"), Some("8".into()));
        assert_eq!(stage_key("Stage 10 Platinum"), Some("8".into()));
    }

    #[test]
    fn stage_key_none_for_unstaged_rows() {
        assert_eq!(stage_key("Lane closed"), None);
    }

    #[test]
    fn time_key_strips_separator() {
        assert_eq!(time_key("09:00"), "0900");
        assert_eq!(time_key("17:30"), "1730");
    }

    #[test]
    fn clean_name_strips_stage_suffix() {
        assert_eq!(clean_name("Alice Smith (Stage 3)"), "Alice Smith");
        assert_eq!(clean_name("Alice Smith"), "Alice Smith");
        assert_eq!(clean_name("  Bob Jones  "), "Bob Jones");
    }

    #[test]
    fn descriptor_from_row() {
        let desc = ClassDescriptor::from_row("09:00", "Stage 3 Swim").unwrap();
        assert_eq!(desc.full_name, "09:00 Stage 3 Swim");
        assert_eq!(desc.stage_key, "3");
        assert_eq!(desc.time_key, "0900");
        assert!(ClassDescriptor::from_row("10:00", "Private hire").is_none());
    }

    #[test]
    fn roster_orders_by_clean_name() {
        let mut roster = StudentRoster::new();
        for name in ["Zara", "Alice", "Mia"] {
            roster.insert(
                name.to_string(),
                StudentRecord {
                    display_name: name.to_string(),
                    overall_progress: "0%".into(),
                    skills: Vec::new(),
                },
            );
        }
        let keys: Vec<_> = roster.keys().cloned().collect();
        assert_eq!(keys, vec!["Alice", "Mia", "Zara"]);
    }
}
