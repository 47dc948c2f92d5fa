use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::ReportError;

/// `{prefix}_{YYYYMMDD}.md`
#[must_use]
pub fn report_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}_{}.md", date.format("%Y%m%d"))
}

/// Write `body` to `dir/{prefix}_{YYYYMMDD}.md`, creating `dir` if needed.
/// An existing report for the same prefix and date is overwritten.
///
/// # Errors
///
/// Returns [`ReportError::Io`] if the directory or file cannot be written.
pub fn write_report(
    dir: &Path,
    prefix: &str,
    date: NaiveDate,
    body: &str,
) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(dir).map_err(|e| ReportError::io(dir, e))?;
    let path = dir.join(report_file_name(prefix, date));
    std::fs::write(&path, body).map_err(|e| ReportError::io(&path, e))?;
    tracing::info!(path = %path.display(), bytes = body.len(), "report written");
    Ok(path)
}
