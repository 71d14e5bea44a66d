//! Persisting recovered artifacts into the project tree.
//!
//! Applies the project-type extension policy, the overwrite policy, and
//! records every written path in the file index before returning.

use crate::overwrite::{decide, OverwriteDecision};
use crate::recover::Artifact;
use crate::{ExtractError, Skip, SkipReason};
use mar_core::ProjectType;
use mar_storage::FileIndex;
use std::path::Path;

/// What happened to each artifact of one extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistReport {
    pub written: Vec<String>,
    pub skips: Vec<Skip>,
}

/// Write artifacts under `project_dir`, honoring the extension and
/// overwrite policies. Every written path lands in `index` exactly once.
pub fn persist_artifacts(
    artifacts: &[Artifact],
    project_dir: &Path,
    project_type: ProjectType,
    index: &mut FileIndex,
) -> Result<PersistReport, ExtractError> {
    let mut report = PersistReport::default();

    for artifact in artifacts {
        let ext = artifact
            .path
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or_default();
        if !project_type.accepts_extension(ext) {
            report.skips.push(Skip {
                path: artifact.path.clone(),
                reason: SkipReason::ForbiddenExtension,
            });
            continue;
        }

        let target = project_dir.join(&artifact.path);
        let existing = match std::fs::read_to_string(&target) {
            Ok(existing) => Some(existing),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let file_name = artifact
            .path
            .rsplit('/')
            .next()
            .unwrap_or(artifact.path.as_str());
        match decide(file_name, existing.as_deref(), &artifact.content) {
            OverwriteDecision::Skip(reason) => {
                tracing::info!(path = %artifact.path, %reason, "skipping write");
                report.skips.push(Skip { path: artifact.path.clone(), reason });
            }
            OverwriteDecision::Write => {
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&target, &artifact.content)?;
                index.record(&artifact.path, artifact.content.len() as u64);
                // model-named files are deliberate outputs; the role
                // shields them from the finalizer's stub sweep
                if artifact.explicit {
                    index.set_role(&artifact.path, "declared");
                }
                report.written.push(artifact.path.clone());
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
#[path = "persist_tests.rs"]
mod tests;
