use std::path::PathBuf;

/// Configuration failures are fatal: the pipeline refuses to start a stage
/// with a missing credential or prompt file rather than degrade.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file error: {0}")]
    Io(String),

    #[error("invalid config: {0}")]
    Parse(String),

    #[error("missing API credential (set SWIMLANE_API_KEY or provider.apiKey)")]
    MissingApiKey,

    #[error("prompt file not found: {}", .0.display())]
    MissingPromptFile(PathBuf),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}
