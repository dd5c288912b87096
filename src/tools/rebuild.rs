//! Index rebuild and status tool handlers.

use crate::index::BuildReport;
use crate::worker::SearchState;
use std::fmt::Write as _;
use std::time::UNIX_EPOCH;

/// Rebuild the corpus and describe the outcome.
pub async fn handle_rebuild(state: &SearchState) -> Result<String, String> {
    let report = state
        .rebuild()
        .await
        .map_err(|e| format!("Rebuild failed: {:#}", e))?;
    Ok(format!("Index rebuilt.\n\n{}", format_report(&report)))
}

/// Describe the currently published corpus.
pub fn handle_index_status(state: &SearchState) -> String {
    let snapshot = state.snapshot();
    let entries = &snapshot.artifact.entries;
    let sections: usize = entries.iter().map(|e| e.sections.len()).sum();
    let published = snapshot
        .published_at
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    let mut output = format!(
        "Documents: {}\nSections: {}\nDocs directory: {}\nPublished at: {} (unix seconds)",
        entries.len(),
        sections,
        state.config().docs_dir.display(),
        published
    );
    match &snapshot.report {
        Some(report) => {
            let _ = write!(output, "\n\nLast build:\n{}", format_report(report));
        }
        None => output.push_str("\n\nLoaded from a prebuilt artifact."),
    }
    output
}

fn format_report(report: &BuildReport) -> String {
    format!(
        "Status: {:?}\nIndexed: {} of {}\nReused from cache: {}\nExtracted: {} ({} without sections)\n\
         Excluded: {} draft, {} untitled, {} by policy\nFailed: {}\nURL collisions: {}",
        report.status(),
        report.indexed,
        report.total,
        report.reused,
        report.extracted,
        report.degraded,
        report.excluded_drafts,
        report.excluded_untitled,
        report.excluded_by_policy,
        report.failed,
        report.url_collisions
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use assert2::check;
    use tempfile::TempDir;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_status_reflects_rebuild() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(
            dir.path().join("docs/guide.md"),
            "---\ntitle: Guide\n---\n## One\n\n## Two\n",
        )
        .unwrap();
        let state = SearchState::new(Config {
            docs_dir: dir.path().join("docs"),
            cache_file: Some(dir.path().join("cache.bin")),
            ..Config::default()
        });

        check!(handle_index_status(&state).contains("Documents: 0"));

        let rebuilt = handle_rebuild(&state).await.unwrap();
        check!(rebuilt.contains("Status: Complete"));

        let status = handle_index_status(&state);
        check!(status.contains("Documents: 1"));
        check!(status.contains("Sections: 2"));
        check!(status.contains("Last build:"));
    }
}
