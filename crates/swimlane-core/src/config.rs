//! Pipeline configuration.
//!
//! Loaded from a JSON file with compiled defaults for every field, then
//! overridden by `SWIMLANE_*` environment variables. The loaded value is
//! passed explicitly into each component at construction — there is no
//! process-wide settings singleton.

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;
use crate::ids::DayTag;

/// Top-level configuration for one pipeline deployment.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Directory that contains the day folders and the shared week folder.
    pub data_root: PathBuf,
    /// Secondary root scanned for historical reports.
    pub week_folder: String,
    /// Day tags the scraper is expected to populate.
    pub teaching_days: Vec<String>,
    /// Class-index snapshot filename, looked up per day folder.
    pub class_index_filename: String,
    /// Artifacts older than this many days are deleted by the sweep.
    pub retention_days: i64,
    /// How many historical reports Analyze hands to the provider.
    pub historical_report_count: usize,
    /// Optional notes attached to every plan request, relative to `data_root`.
    pub weekly_notes_filename: String,
    /// Template for per-day ad-hoc notes; `-<day>` is inserted before the
    /// extension (`adhoc_notes.txt` -> `adhoc_notes-mon.txt`).
    pub adhoc_notes_filename: String,
    /// Reference documents attached to every plan request.
    pub knowledge_base: Vec<PathBuf>,
    pub analyzer: StageModelConfig,
    pub planner: StageModelConfig,
    pub provider: ProviderConfig,
}

/// Model + instruction prompt for one generative stage.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StageModelConfig {
    pub model: String,
    pub prompt_file: PathBuf,
}

/// Credentials and endpoint for the generative service.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("."),
            week_folder: "week".into(),
            teaching_days: vec!["mon".into(), "tue".into(), "thu".into()],
            class_index_filename: "sessions.mht".into(),
            retention_days: 64,
            historical_report_count: 3,
            weekly_notes_filename: "weekly_notes.txt".into(),
            adhoc_notes_filename: "adhoc_notes.txt".into(),
            knowledge_base: Vec::new(),
            analyzer: StageModelConfig {
                model: "gemini-2.0-flash-lite".into(),
                prompt_file: PathBuf::from("AI_ANALYZER_SYSTEM_PROMPT.txt"),
            },
            planner: StageModelConfig {
                model: "gemini-2.0-flash-lite".into(),
                prompt_file: PathBuf::from("AI_LESSON_PLANNER_SYSTEM_PROMPT.txt"),
            },
            provider: ProviderConfig::default(),
        }
    }
}

impl Default for StageModelConfig {
    fn default() -> Self {
        PipelineConfig::default().analyzer
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file, falling back to defaults when the file is
    /// absent, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str(&raw)?
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// `SWIMLANE_API_KEY` and `SWIMLANE_DATA_ROOT` take priority over the
    /// file layer, so deployments can keep the credential out of the file.
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("SWIMLANE_API_KEY") {
            if !key.is_empty() {
                self.provider.api_key = Some(SecretString::from(key));
            }
        }
        if let Ok(root) = std::env::var("SWIMLANE_DATA_ROOT") {
            if !root.is_empty() {
                self.data_root = PathBuf::from(root);
            }
        }
    }

    /// The credential, or a fail-fast error when it was never supplied.
    pub fn require_api_key(&self) -> Result<&SecretString, ConfigError> {
        self.provider.api_key.as_ref().ok_or(ConfigError::MissingApiKey)
    }

    /// Read a stage's instruction prompt. Missing file is a configuration
    /// error, not a degraded outcome.
    pub fn read_prompt(&self, prompt_file: &Path) -> Result<String, ConfigError> {
        if !prompt_file.exists() {
            return Err(ConfigError::MissingPromptFile(prompt_file.to_path_buf()));
        }
        Ok(std::fs::read_to_string(prompt_file)?)
    }

    /// Weekly notes path, relative to the data root.
    pub fn weekly_notes_path(&self) -> PathBuf {
        self.data_root.join(&self.weekly_notes_filename)
    }

    /// Per-day ad-hoc notes path derived from the template filename.
    pub fn adhoc_notes_path(&self, day: &DayTag) -> PathBuf {
        let name = match self.adhoc_notes_filename.rsplit_once('.') {
            Some((stem, ext)) => format!("{stem}-{day}.{ext}"),
            None => format!("{}-{day}", self.adhoc_notes_filename),
        };
        self.data_root.join(name)
    }
}
