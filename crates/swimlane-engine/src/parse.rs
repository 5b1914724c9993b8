//! Parse stage: snapshots in, one consolidated report artifact out.

use std::path::Path;

use chrono::Local;
use tracing::{info, instrument, warn};

use swimlane_core::config::PipelineConfig;
use swimlane_core::ids::{DayTag, SessionId};
use swimlane_core::model::{ClassDescriptor, StudentRoster};
use swimlane_core::report::render_class_report;
use swimlane_extract::{extract_classes, extract_skill_statuses, extract_student_progress, read_snapshot};
use swimlane_store::{locate, naming, ArtifactKind, ArtifactStore, StoreError};

use crate::error::EngineError;
use crate::stage::{Stage, StageOutcome};

/// Skill continuation pages to probe (`skill-1` .. `skill-5`); the walk
/// stops at the first missing page.
const MAX_SKILL_PAGES: usize = 5;

#[instrument(skip(config, store), fields(day = %day, session = %session))]
pub(crate) fn run(
    config: &PipelineConfig,
    store: &ArtifactStore,
    day: &DayTag,
    session: &SessionId,
) -> Result<StageOutcome, EngineError> {
    // Housekeeping first. Session tagging already prevents logical
    // staleness; the sweep just keeps the disk bounded, so its failures
    // are warnings, not stage failures.
    match store.sweep(day, config.retention_days, Local::now().naive_local()) {
        Ok(0) => {}
        Ok(deleted) => info!(deleted, "retention sweep"),
        Err(e) => warn!(error = %e, "retention sweep failed"),
    }

    let day_dir = store.day_dir(day)?;
    let index_path = locate::find_file_ci(&day_dir, &config.class_index_filename)
        .ok_or_else(|| {
            StoreError::NotFound(format!(
                "class index '{}' in {}",
                config.class_index_filename,
                day_dir.display()
            ))
        })?;
    let index_html = read_snapshot(&index_path)?;

    let classes = extract_classes(&index_html);
    if classes.is_empty() {
        return Err(EngineError::NoClasses(day.to_string()));
    }
    info!(classes = classes.len(), "class index extracted");

    let mut sections = Vec::with_capacity(classes.len());
    for class in &classes {
        let roster = build_roster(&day_dir, class);
        sections.push(render_class_report(&class.full_name, &roster));
    }

    let artifact = store.put(
        day,
        ArtifactKind::Report,
        session.as_str(),
        &sections.join("\n\n"),
    )?;
    Ok(StageOutcome {
        stage: Stage::Parse,
        artifact,
    })
}

/// Merge one class's register and skill snapshots into a roster.
/// Every failure here degrades the section instead of aborting the stage.
fn build_roster(day_dir: &Path, class: &ClassDescriptor) -> StudentRoster {
    let mut roster = StudentRoster::new();

    let register_name = naming::register_basename(&class.time_key, &class.stage_key);
    match locate::find_snapshot(day_dir, &register_name) {
        Some(register) => match read_snapshot(&register) {
            Ok(html) => roster = extract_student_progress(&html),
            Err(e) => warn!(class = %class.full_name, error = %e, "register snapshot unreadable"),
        },
        None => warn!(class = %class.full_name, register = %register_name, "register snapshot missing"),
    }

    let skill_name = naming::skill_basename(&class.time_key, &class.stage_key);
    let Some(base_page) = locate::find_snapshot(day_dir, &skill_name) else {
        return roster;
    };

    let mut pages = vec![base_page];
    for page in 1..=MAX_SKILL_PAGES {
        let name = naming::skill_page_basename(&class.time_key, &class.stage_key, page);
        match locate::find_snapshot(day_dir, &name) {
            Some(path) => pages.push(path),
            None => break,
        }
    }

    for page in pages {
        match read_snapshot(&page) {
            Ok(html) => extract_skill_statuses(&html, &mut roster),
            Err(e) => warn!(page = %page.display(), error = %e, "skill snapshot unreadable"),
        }
    }
    roster
}
