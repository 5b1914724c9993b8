use swimlane_core::error::ConfigError;
use swimlane_extract::SnapshotError;
use swimlane_llm::ProviderError;
use swimlane_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("no classes parsed from the class index for '{0}'")]
    NoClasses(String),

    #[error("no report available for '{0}'")]
    NoReport(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Io(e.to_string())
    }
}
