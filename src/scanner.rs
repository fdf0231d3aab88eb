// SPDX-License-Identifier: PMPL-1.0-or-later
//! Directory scanner for running ACT rules across a project.
//!
//! Walks directory trees in sorted order, parses each HTML file and runs it
//! through the runner. Files are evaluated one at a time.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::document::Document;
use crate::error::Result;
use crate::report::RunReport;
use crate::runner::{RunFilter, Runner};

/// File extensions to scan
const SCANNABLE_EXTENSIONS: &[&str] = &["html", "htm"];

/// Report for one scanned file
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub path: PathBuf,
    pub report: RunReport,
}

impl FileReport {
    pub fn blocks_release(&self) -> bool {
        self.report.blocks_release()
    }
}

/// Parse and evaluate a single HTML file
pub async fn scan_file(path: &Path, runner: &mut Runner, filter: &RunFilter) -> Result<RunReport> {
    let content = std::fs::read_to_string(path)?;
    let document = Document::parse(&content);
    let report = runner.run_all(&document, filter.clone()).await?;
    Ok(report)
}

/// Evaluate every HTML file below `dir`.
///
/// Hidden directories and those listed in the runner's `exclude`
/// configuration are skipped. Unreadable files are logged and skipped.
pub async fn scan_directory(
    dir: &Path,
    runner: &mut Runner,
    filter: &RunFilter,
) -> Result<Vec<FileReport>> {
    let exclude = runner.config().exclude.clone();
    let mut reports = Vec::new();

    info!("Scanning directory: {}", dir.display());

    let walker = WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_str().unwrap_or("");
            !exclude.iter().any(|x| x == name) && !name.starts_with('.')
        });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_scannable(entry.path()) {
            continue;
        }

        let path = entry.path();
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        let document = Document::parse(&content);
        let report = runner.run_all(&document, filter.clone()).await?;
        reports.push(FileReport {
            path: path.to_path_buf(),
            report,
        });
    }

    info!(
        "Scanned {} file(s), {} failing result(s)",
        reports.len(),
        reports.iter().map(|r| r.report.stats().invalid).sum::<usize>()
    );

    Ok(reports)
}

fn is_scannable(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| SCANNABLE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RuleRegistry;
    use std::fs;

    fn runner() -> Runner {
        Runner::new(RuleRegistry::with_default_rules().unwrap())
    }

    #[tokio::test]
    async fn test_scan_nonexistent_dir() {
        let mut runner = runner();
        let result = scan_directory(Path::new("/nonexistent/path"), &mut runner, &RunFilter::All).await;
        assert!(result.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scan_file_missing_is_io_error() {
        let mut runner = runner();
        let result = scan_file(Path::new("/nonexistent/page.html"), &mut runner, &RunFilter::All).await;
        assert!(matches!(result, Err(crate::error::Error::Io(_))));
    }

    #[tokio::test]
    async fn test_scan_directory_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.html"), "<h1>B</h1>").unwrap();
        fs::write(dir.path().join("a.htm"), "<h1>A</h1><h3>C</h3>").unwrap();
        fs::write(dir.path().join("notes.txt"), "<h1>ignored</h1>").unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules/dep.html"), "<h2>dep</h2>").unwrap();
        fs::create_dir(dir.path().join(".cache")).unwrap();
        fs::write(dir.path().join(".cache/page.html"), "<h2>cached</h2>").unwrap();

        let mut runner = runner();
        let reports = scan_directory(dir.path(), &mut runner, &RunFilter::All).await.unwrap();

        let names: Vec<_> = reports
            .iter()
            .map(|r| r.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.htm", "b.html"]);
        assert!(reports[0].blocks_release());
        assert!(!reports[1].blocks_release());
    }

    #[test]
    fn test_is_scannable() {
        assert!(is_scannable(Path::new("index.HTML")));
        assert!(is_scannable(Path::new("page.htm")));
        assert!(!is_scannable(Path::new("style.css")));
        assert!(!is_scannable(Path::new("README")));
    }
}
