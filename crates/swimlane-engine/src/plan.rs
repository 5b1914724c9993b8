//! Plan stage: knowledge base + report + analysis + notes in, a lesson
//! plan artifact out.

use std::path::PathBuf;

use tracing::{debug, info, instrument, warn};

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
    let day_dir = store.day_dir(day)?;

    // The report is the stage's primary input: exact session tag first,
    // then whatever report was most recently modified for this day.
    let report = match session.and_then(|s| store.get_exact(day, ArtifactKind::Report, s).ok()) {
        Some(path) => path,
        None => {
            if let Some(session) = session {
                warn!(session = %session, "exact-session report missing; falling back to most recently modified");
            }
            store
                .latest_by_mtime(day, ArtifactKind::Report)
                .map_err(|_| EngineError::NoReport(day.to_string()))?
        }
    };

    // The analysis is optional: session tag first, then the legacy
    // untagged filename that predates session correlation.
    let analysis = session
        .and_then(|s| store.get_exact(day, ArtifactKind::Analysis, s).ok())
        .or_else(|| {
            let legacy = day_dir.join(format!("{}-{}.txt", ArtifactKind::Analysis.prefix(), day));
            legacy.is_file().then_some(legacy)
        });
    if analysis.is_none() {
        debug!("no analysis artifact; planning from the report alone");
    }

    let mut document_paths: Vec<PathBuf> = config
        .knowledge_base
        .iter()
        .filter(|path| path.is_file())
        .cloned()
        .collect();
    document_paths.push(report);
    document_paths.extend(analysis);

    let weekly_notes = config.weekly_notes_path();
    if weekly_notes.is_file() {
        document_paths.push(weekly_notes);
    }
    let adhoc_notes = config.adhoc_notes_path(day);
    if adhoc_notes.is_file() {
        document_paths.push(adhoc_notes);
    }

    let provider = provider.ok_or(ProviderError::NotConfigured)?;
    let prompt = config.read_prompt(&config.planner.prompt_file)?;
    let documents = load_documents(&document_paths)?;
    info!(documents = documents.len(), "requesting lesson plans");

    let reply = provider.generate(&prompt, &documents).await?;
    let artifact = store.put(day, ArtifactKind::Plan, &artifact_tag(session), &reply)?;
    Ok(StageOutcome {
        stage: Stage::Plan,
        artifact,
    })
}
