use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The three artifact kinds the pipeline stages exchange.
///
/// Each kind maps to a fixed filename prefix; the prefix plus the
/// `<day>_<tag>` suffix is the whole addressing scheme — there is no
/// database behind it.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Parser output: the consolidated per-class progress report.
    Report,
    /// Historical-trend output from the Analyze stage.
    Analysis,
    /// Generated lesson plan from the Plan stage.
    Plan,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::Report,
        ArtifactKind::Analysis,
        ArtifactKind::Plan,
    ];

    /// Filename prefix for this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            ArtifactKind::Report => "full_class_report",
            ArtifactKind::Analysis => "long_term_analysis",
            ArtifactKind::Plan => "lesson_plans_output",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Report => write!(f, "report"),
            ArtifactKind::Analysis => write!(f, "analysis"),
            ArtifactKind::Plan => write!(f, "plan"),
        }
    }
}

impl FromStr for ArtifactKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "report" => Ok(ArtifactKind::Report),
            "analysis" => Ok(ArtifactKind::Analysis),
            "plan" => Ok(ArtifactKind::Plan),
            other => Err(format!("unknown artifact kind: {other}")),
        }
    }
}
