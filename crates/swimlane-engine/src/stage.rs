use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Local;

use swimlane_core::ids::{SessionId, TAG_TIMESTAMP_FORMAT};
use swimlane_llm::Document;

use crate::error::EngineError;

/// The three pipeline stages, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Parse,
    Analyze,
    Plan,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Parse => write!(f, "parse"),
            Stage::Analyze => write!(f, "analyze"),
            Stage::Plan => write!(f, "plan"),
        }
    }
}

/// A stage's success report: which stage ran and the artifact it wrote.
#[derive(Clone, Debug)]
pub struct StageOutcome {
    pub stage: Stage,
    pub artifact: PathBuf,
}

/// Where a run currently stands. A failure freezes the machine at the
/// failing stage; later stages never run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Parsed,
    Analyzed,
    Planned,
    Failed { stage: Stage, reason: String },
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "idle"),
            PipelineState::Parsed => write!(f, "parsed"),
            PipelineState::Analyzed => write!(f, "analyzed"),
            PipelineState::Planned => write!(f, "planned"),
            PipelineState::Failed { stage, reason } => {
                write!(f, "failed at {stage}: {reason}")
            }
        }
    }
}

/// Output tag for session-correlated artifacts: the session id when one
/// exists, otherwise a fresh timestamp in the same format.
pub(crate) fn artifact_tag(session: Option<&SessionId>) -> String {
    match session {
        Some(session) => session.as_str().to_string(),
        None => Local::now().format(TAG_TIMESTAMP_FORMAT).to_string(),
    }
}

/// Read every path into an attachment, preserving order.
pub(crate) fn load_documents(paths: &[PathBuf]) -> Result<Vec<Document>, EngineError> {
    paths
        .iter()
        .map(|p| Document::from_path(Path::new(p)).map_err(|e| EngineError::Io(e.to_string())))
        .collect()
}
