//! Pipeline orchestrator — wires the store, the extractor stages, and the
//! generative provider together for one (day, session) run.

use std::sync::Arc;

use tracing::{error, info, instrument};

use swimlane_core::config::PipelineConfig;
use swimlane_core::ids::{DayTag, SessionId};
use swimlane_llm::GenerativeProvider;
use swimlane_store::ArtifactStore;

use crate::error::EngineError;
use crate::stage::{PipelineState, Stage, StageOutcome};
use crate::{analyze, parse, plan};

/// One pipeline instance per deployment. Holds no per-run state: every
/// resolution goes back to the filesystem, so concurrent runs for
/// *different* days can share an instance safely.
pub struct Pipeline {
    config: PipelineConfig,
    store: ArtifactStore,
    analyzer_provider: Option<Arc<dyn GenerativeProvider>>,
    planner_provider: Option<Arc<dyn GenerativeProvider>>,
}

/// Result of a full Parse → Analyze → Plan sequence.
#[derive(Debug)]
pub struct PipelineRun {
    pub state: PipelineState,
    pub outcomes: Vec<StageOutcome>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let store = ArtifactStore::new(config.data_root.clone());
        Self {
            config,
            store,
            analyzer_provider: None,
            planner_provider: None,
        }
    }

    /// Attach one generative backend for both stages. Parse and the
    /// retention sweep work without one; Analyze (with history) and Plan
    /// require it.
    pub fn with_provider(self, provider: Arc<dyn GenerativeProvider>) -> Self {
        self.with_analyzer_provider(provider.clone())
            .with_planner_provider(provider)
    }

    /// Backend used by the Analyze stage (stages may run different models).
    pub fn with_analyzer_provider(mut self, provider: Arc<dyn GenerativeProvider>) -> Self {
        self.analyzer_provider = Some(provider);
        self
    }

    /// Backend used by the Plan stage.
    pub fn with_planner_provider(mut self, provider: Arc<dyn GenerativeProvider>) -> Self {
        self.planner_provider = Some(provider);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Parse stage: extract snapshots into this session's report artifact.
    pub fn run_parse(
        &self,
        day: &DayTag,
        session: &SessionId,
    ) -> Result<StageOutcome, EngineError> {
        parse::run(&self.config, &self.store, day, session)
    }

    /// Analyze stage: report history in, analysis artifact out.
    pub async fn run_analyze(
        &self,
        day: &DayTag,
        session: Option<&SessionId>,
    ) -> Result<StageOutcome, EngineError> {
        analyze::run(
            &self.config,
            &self.store,
            self.analyzer_provider.as_deref(),
            day,
            session,
        )
        .await
    }

    /// Plan stage: report + analysis + notes in, plan artifact out.
    pub async fn run_plan(
        &self,
        day: &DayTag,
        session: Option<&SessionId>,
    ) -> Result<StageOutcome, EngineError> {
        plan::run(
            &self.config,
            &self.store,
            self.planner_provider.as_deref(),
            day,
            session,
        )
        .await
    }

    /// Full sequence for one run. A stage failure short-circuits the rest;
    /// retries, if any, belong to the caller.
    #[instrument(skip(self), fields(day = %day, session = %session))]
    pub async fn run(&self, day: &DayTag, session: &SessionId) -> PipelineRun {
        let mut outcomes = Vec::new();
        let mut state = PipelineState::Idle;
        info!(state = %state, "starting pipeline run");

        let stages: [(Stage, _); 3] = [
            (Stage::Parse, PipelineState::Parsed),
            (Stage::Analyze, PipelineState::Analyzed),
            (Stage::Plan, PipelineState::Planned),
        ];

        for (stage, next_state) in stages {
            let result = match stage {
                Stage::Parse => self.run_parse(day, session),
                Stage::Analyze => self.run_analyze(day, Some(session)).await,
                Stage::Plan => self.run_plan(day, Some(session)).await,
            };
            match result {
                Ok(outcome) => {
                    state = next_state;
                    info!(state = %state, artifact = %outcome.artifact.display(), "stage complete");
                    outcomes.push(outcome);
                }
                Err(e) => {
                    error!(stage = %stage, error = %e, "stage failed, aborting run");
                    return PipelineRun {
                        state: PipelineState::Failed {
                            stage,
                            reason: e.to_string(),
                        },
                        outcomes,
                    };
                }
            }
        }

        PipelineRun { state, outcomes }
    }
}
