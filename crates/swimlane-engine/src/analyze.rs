//! Analyze stage: this run's report plus recent history in, a long-term
//! trend analysis artifact out.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{info, instrument, warn};

use swimlane_core::config::PipelineConfig;
use swimlane_core::ids::{DayTag, SessionId};
use swimlane_llm::{GenerativeProvider, ProviderError};
use swimlane_store::{ArtifactKind, ArtifactStore};

use crate::error::EngineError;
use crate::stage::{artifact_tag, load_documents, Stage, StageOutcome};

#[instrument(skip(config, store, provider), fields(day = %day))]
pub(crate) async fn run(
    config: &PipelineConfig,
    store: &ArtifactStore,
    provider: Option<&dyn GenerativeProvider>,
    day: &DayTag,
    session: Option<&SessionId>,
) -> Result<StageOutcome, EngineError> {
    let mut document_paths: Vec<PathBuf> = Vec::new();
    let mut exclude = HashSet::new();

    // The current session's report comes first so the provider reads it as
    // the freshest context. Missing is a warning, not a failure — the
    // historical reports can still carry the analysis.
    if let Some(session) = session {
        match store.get_exact(day, ArtifactKind::Report, session) {
            Ok(path) => {
                exclude.insert(path.clone());
                document_paths.push(path);
            }
            Err(_) => {
                warn!(session = %session, "report for this session not found; analyzing without current context")
            }
        }
    }

    let extra_roots: Vec<PathBuf> = store
        .resolve_dir(&config.week_folder)
        .ok()
        .into_iter()
        .collect();
    document_paths.extend(store.resolve_historical(
        day,
        ArtifactKind::Report,
        &exclude,
        config.historical_report_count,
        &extra_roots,
    ));

    let tag = artifact_tag(session);

    if document_paths.is_empty() {
        let placeholder = format!(
            "# Long-Term Progress Analysis ({})\n\nNo historical data found.\n",
            day.as_str().to_uppercase()
        );
        let artifact = store.put(day, ArtifactKind::Analysis, &tag, &placeholder)?;
        info!("no reports of any kind; wrote placeholder analysis");
        return Ok(StageOutcome {
            stage: Stage::Analyze,
            artifact,
        });
    }

    let provider = provider.ok_or(ProviderError::NotConfigured)?;
    let prompt = config.read_prompt(&config.analyzer.prompt_file)?;
    let documents = load_documents(&document_paths)?;
    info!(documents = documents.len(), "requesting analysis");

    let reply = provider.generate(&prompt, &documents).await?;
    let artifact = store.put(day, ArtifactKind::Analysis, &tag, &reply)?;
    Ok(StageOutcome {
        stage: Stage::Analyze,
        artifact,
    })
}
