//! Intake phase: objective refinement, project-type lock, note hygiene,
//! and project scaffolding.

use mar_adapters::LlmClient;
use mar_core::{Objective, ProjectType};
use mar_storage::{Domain, DomainNotes, StorageError};
use std::path::Path;

/// Objectives shorter than this get one refinement pass.
const REFINE_THRESHOLD_CHARS: usize = 40;

/// Expand a terse objective into a fuller one. Refinement failure keeps
/// the original text; this phase can never sink a run.
pub async fn refine_objective(llm: &dyn LlmClient, text: &str) -> String {
    if text.len() >= REFINE_THRESHOLD_CHARS {
        return text.to_string();
    }
    let prompt = format!(
        "Expand this short objective into one concrete, detailed objective \
         sentence. Keep the user's intent exactly. Output only the sentence.\n\n\
         OBJECTIVE: {text}"
    );
    match llm.call(&prompt, 256, 0.3).await {
        Ok(refined) if !refined.trim().is_empty() => refined.trim().to_string(),
        Ok(_) => text.to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "objective refinement failed, keeping original");
            text.to_string()
        }
    }
}

/// Clear research and decisions notes when the phrasing asks for a
/// novel design, so previous designs are not recycled into this run.
pub fn clear_stale_design_notes(
    notes: &DomainNotes,
    objective: &Objective,
) -> Result<bool, StorageError> {
    if !objective.wants_fresh_design() {
        return Ok(false);
    }
    notes.clear(Domain::Research)?;
    notes.clear(Domain::Decisions)?;
    Ok(true)
}

/// Create the project directory and the standard subfolders for the
/// locked type.
pub fn scaffold_project(project_dir: &Path, project_type: ProjectType) -> std::io::Result<()> {
    std::fs::create_dir_all(project_dir)?;
    for sub in project_type.scaffold_dirs() {
        std::fs::create_dir_all(project_dir.join(sub))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "intake_tests.rs"]
mod tests;
