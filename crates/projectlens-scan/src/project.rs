//! Project-level helpers around a scan root.

use std::fs;
use std::path::Path;

use projectlens_core::{ImportantFile, ScanError, natural_cmp};

/// Check which of the expected files exist under `root`, in input order.
pub fn check_important_files(root: &Path, paths: &[String]) -> Vec<ImportantFile> {
    paths
        .iter()
        .map(|path| {
            let present = root.join(path.trim_start_matches('/')).exists();
            if !present {
                tracing::debug!(%path, "important file missing");
            }
            ImportantFile {
                path: path.clone(),
                present,
            }
        })
        .collect()
}

/// List the immediate subdirectories of `root` in natural order.
pub fn list_projects(root: &Path) -> Result<Vec<String>, ScanError> {
    let entries = fs::read_dir(root).map_err(|e| ScanError::not_readable(root, e))?;

    let mut projects = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(path = %root.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if entry.path().is_dir() {
            projects.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    projects.sort_by(|a, b| natural_cmp(a, b));
    tracing::debug!(count = projects.len(), root = %root.display(), "listed projects");
    Ok(projects)
}
