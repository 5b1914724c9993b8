use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use swimlane_core::config::PipelineConfig;
use swimlane_core::ids::{DayTag, SessionId};
use swimlane_engine::{Pipeline, PipelineState};
use swimlane_llm::{GeminiConfig, GeminiProvider};

#[derive(Parser)]
#[command(name = "swimlane", about = "Progress-report and lesson-plan pipeline")]
struct Cli {
    /// Path to the JSON config file.
    #[arg(long, global = true, default_value = "swimlane.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Full Parse -> Analyze -> Plan sequence for one day.
    Run {
        #[arg(long)]
        day: DayTag,
        /// Correlation id for this run; freshly stamped when omitted.
        #[arg(long)]
        session: Option<SessionId>,
    },
    /// Parse snapshots into this session's report artifact.
    Parse {
        #[arg(long)]
        day: DayTag,
        #[arg(long)]
        session: Option<SessionId>,
    },
    /// Analyze report history into an analysis artifact.
    Analyze {
        #[arg(long)]
        day: DayTag,
        #[arg(long)]
        session: Option<SessionId>,
    },
    /// Generate the lesson-plan artifact.
    Plan {
        #[arg(long)]
        day: DayTag,
        #[arg(long)]
        session: Option<SessionId>,
    },
    /// Delete artifacts older than the retention horizon.
    Sweep {
        #[arg(long)]
        day: DayTag,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match PipelineConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("config error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run_command(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run_command(command: Command, config: PipelineConfig) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config)?;

    match command {
        Command::Run { day, session } => {
            let session = session.unwrap_or_else(SessionId::now);
            let run = pipeline.run(&day, &session).await;
            for outcome in &run.outcomes {
                println!("{}: {}", outcome.stage, outcome.artifact.display());
            }
            match run.state {
                PipelineState::Failed { stage, reason } => {
                    anyhow::bail!("{stage} failed: {reason}")
                }
                state => println!("pipeline {state} (session {session})"),
            }
        }
        Command::Parse { day, session } => {
            let session = session.unwrap_or_else(SessionId::now);
            let outcome = pipeline.run_parse(&day, &session)?;
            println!("report written: {}", outcome.artifact.display());
        }
        Command::Analyze { day, session } => {
            let outcome = pipeline.run_analyze(&day, session.as_ref()).await?;
            println!("analysis written: {}", outcome.artifact.display());
        }
        Command::Plan { day, session } => {
            let outcome = pipeline.run_plan(&day, session.as_ref()).await?;
            println!("plan written: {}", outcome.artifact.display());
        }
        Command::Sweep { day } => {
            let deleted = pipeline.store().sweep(
                &day,
                pipeline.config().retention_days,
                chrono_now(),
            )?;
            println!("deleted {deleted} expired artifact(s)");
        }
    }
    Ok(())
}

/// Attach the Gemini backends when a credential is configured; Parse and
/// Sweep still work without one. Analyze and Plan may run different models.
fn build_pipeline(config: PipelineConfig) -> anyhow::Result<Pipeline> {
    let Some(api_key) = config.provider.api_key.clone() else {
        tracing::warn!("no API credential configured; generative stages will fail");
        return Ok(Pipeline::new(config));
    };

    let analyzer = GeminiProvider::new(
        GeminiConfig::new(config.analyzer.model.clone(), api_key.clone())
            .with_base_url(config.provider.base_url.clone()),
    );
    let planner = GeminiProvider::new(
        GeminiConfig::new(config.planner.model.clone(), api_key)
            .with_base_url(config.provider.base_url.clone()),
    );

    Ok(Pipeline::new(config)
        .with_analyzer_provider(Arc::new(analyzer))
        .with_planner_provider(Arc::new(planner)))
}

fn chrono_now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}
