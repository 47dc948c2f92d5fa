//! `score_evolution.md`: a running log of how each strategy correlated with
//! likes at each recalculation, newest entry first.

use std::fmt::Write as _;
use std::path::Path;

use crate::correlation::{format_correlation, StrategyCorrelation};
use crate::error::ReportError;

pub const EVOLUTION_FILE_NAME: &str = "score_evolution.md";
pub const EVOLUTION_HEADER: &str = "# Score accuracy history\n\n";

/// One dated entry with a row per strategy.
#[must_use]
pub fn render_evolution_entry(
    recorded_at: &str,
    sample_size: usize,
    correlations: &[StrategyCorrelation],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## {recorded_at}  samples: {sample_size}\n");
    out.push_str("| Strategy | Correlation |\n");
    out.push_str("|----------|-------------|\n");
    for c in correlations {
        let _ = writeln!(out, "| {} | {} |", c.strategy, format_correlation(c.correlation));
    }
    out.push('\n');
    out
}

/// Insert `entry` directly below the header of the evolution file at `path`,
/// creating the file (and its directory) if needed. Content that predates the
/// header is kept below the new entry.
///
/// # Errors
///
/// Returns [`ReportError::Io`] if the file cannot be read or written.
pub fn prepend_evolution_entry(path: &Path, entry: &str) -> Result<(), ReportError> {
    let existing = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(err) => return Err(ReportError::io(path, err)),
    };
    let rest = existing.strip_prefix(EVOLUTION_HEADER).unwrap_or(&existing);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ReportError::io(parent, e))?;
    }
    let content = format!("{EVOLUTION_HEADER}{entry}{rest}");
    std::fs::write(path, content).map_err(|e| ReportError::io(path, e))?;
    tracing::info!(path = %path.display(), "score evolution updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correlations(v1: Option<f64>, v2: Option<f64>) -> Vec<StrategyCorrelation> {
        vec![
            StrategyCorrelation {
                strategy: "v1",
                correlation: v1,
                sample_size: 10,
                mean_score: 40.0,
            },
            StrategyCorrelation {
                strategy: "v2",
                correlation: v2,
                sample_size: 10,
                mean_score: 55.0,
            },
        ]
    }

    #[test]
    fn entry_lists_each_strategy() {
        let entry = render_evolution_entry("2026-02-17 21:00", 10, &correlations(Some(0.12), None));
        assert!(entry.starts_with("## 2026-02-17 21:00  samples: 10\n"));
        assert!(entry.contains("| v1 | +0.120 |"));
        assert!(entry.contains("| v2 | n/a |"));
    }

    #[test]
    fn newest_entry_goes_first_under_one_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join(EVOLUTION_FILE_NAME);

        let first = render_evolution_entry("2026-02-01 09:00", 5, &correlations(Some(0.1), Some(0.2)));
        let second = render_evolution_entry("2026-02-17 09:00", 8, &correlations(Some(0.3), Some(0.4)));
        prepend_evolution_entry(&path, &first).unwrap();
        prepend_evolution_entry(&path, &second).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(EVOLUTION_HEADER));
        assert_eq!(content.matches("# Score accuracy history").count(), 1);
        let newer = content.find("2026-02-17").unwrap();
        let older = content.find("2026-02-01").unwrap();
        assert!(newer < older);
    }

    #[test]
    fn content_without_header_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(EVOLUTION_FILE_NAME);
        std::fs::write(&path, "legacy notes\n").unwrap();

        prepend_evolution_entry(&path, "## entry\n\n").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, format!("{EVOLUTION_HEADER}## entry\n\nlegacy notes\n"));
    }
}
