//! CSV and spreadsheet readers.

use std::path::Path;

use buzz_core::Post;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate};

use crate::columns::{is_blank_text, parse_count, ColumnMap};
use crate::error::IngestError;

/// Rows read from one file, after dropping rows without text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedFile {
    /// File name (no directory), recorded as each post's `source`.
    pub source_file: String,
    pub rows_read: usize,
    pub skipped_empty: usize,
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Csv,
    Spreadsheet,
}

fn detect_format(path: &Path) -> Result<FileFormat, IngestError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => Ok(FileFormat::Csv),
        "xlsx" | "xls" => Ok(FileFormat::Spreadsheet),
        _ => Err(IngestError::UnsupportedFormat(if ext.is_empty() {
            path.display().to_string()
        } else {
            format!(".{ext}")
        })),
    }
}

/// Read posts from a `.csv`, `.xlsx` or `.xls` export.
///
/// CSV input is read as UTF-8 (a leading BOM is accepted) and falls back to
/// Shift_JIS, the encoding of Excel exports on Japanese Windows. For spreadsheets the
/// first worksheet is read and its first row is the header.
///
/// # Errors
///
/// - [`IngestError::UnsupportedFormat`] for any other extension.
/// - [`IngestError::MissingTextColumn`] when no text header is present.
/// - [`IngestError::Io`], [`IngestError::Csv`] or [`IngestError::Xlsx`] when
///   the file cannot be read.
pub fn read_posts_file(path: &Path) -> Result<IngestedFile, IngestError> {
    let format = detect_format(path)?;
    let source_file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let (headers, rows) = match format {
        FileFormat::Csv => read_csv_rows(path)?,
        FileFormat::Spreadsheet => read_sheet_rows(path)?,
    };

    let columns = ColumnMap::resolve(&headers)?;
    let rows_read = rows.len();
    let posts: Vec<Post> = rows
        .iter()
        .filter_map(|row| row_to_post(&columns, row, &source_file))
        .collect();
    let skipped_empty = rows_read - posts.len();

    tracing::info!(
        file = %source_file,
        rows_read,
        kept = posts.len(),
        skipped_empty,
        "read posts file"
    );

    Ok(IngestedFile {
        source_file,
        rows_read,
        skipped_empty,
        posts,
    })
}

/// Decode CSV bytes as UTF-8, or as Shift_JIS when they are not valid UTF-8.
fn decode_csv(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            let (text, _, had_errors) = encoding_rs::SHIFT_JIS.decode(err.as_bytes());
            if had_errors {
                tracing::warn!("CSV is neither UTF-8 nor Shift_JIS; undecodable bytes replaced");
            } else {
                tracing::debug!("decoded CSV as Shift_JIS");
            }
            text.into_owned()
        }
    };
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

fn read_csv_rows(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), IngestError> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = decode_csv(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        match record {
            Ok(record) => rows.push(record.iter().map(str::to_owned).collect()),
            Err(err) => {
                tracing::warn!(row = index + 2, error = %err, "skipping unreadable CSV row");
            }
        }
    }
    Ok((headers, rows))
}

fn read_sheet_rows(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), IngestError> {
    let mut workbook = open_workbook_auto(path)?;
    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestError::EmptyWorkbook(path.to_path_buf()))?;
    let range = workbook.worksheet_range(&first)?;

    let mut rows = range.rows().map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>());
    let headers = rows.next().unwrap_or_default();
    Ok((headers, rows.collect()))
}

/// Render a spreadsheet cell the way it would appear in a CSV export.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_string(dt.as_f64()),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

/// Excel serial day number (1900 date system) as `YYYY-MM-DD HH:MM:SS`.
#[allow(clippy::cast_possible_truncation)]
fn excel_serial_to_string(serial: f64) -> String {
    let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return String::new();
    };
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch
        .checked_add_signed(Duration::milliseconds(millis))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn row_to_post(columns: &ColumnMap, row: &[String], source_file: &str) -> Option<Post> {
    let cell = |index: Option<usize>| {
        index
            .and_then(|i| row.get(i))
            .map_or("", |value| value.trim())
    };

    let text = cell(Some(columns.text));
    if is_blank_text(text) {
        return None;
    }

    let url = cell(columns.url);
    Some(Post {
        text: text.to_string(),
        account: cell(columns.account).trim_start_matches('@').to_string(),
        likes: parse_count(cell(columns.likes)),
        retweets: parse_count(cell(columns.retweets)),
        replies: parse_count(cell(columns.replies)),
        impressions: parse_count(cell(columns.impressions)),
        created_at: cell(columns.date).to_string(),
        url: (!url.is_empty()).then(|| url.to_string()),
        source: Some(source_file.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_bytes(name: &str, contents: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    fn write_csv(name: &str, contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        write_bytes(name, contents.as_bytes())
    }

    #[test]
    fn reads_aliased_csv_with_bom() {
        let (_dir, path) = write_csv(
            "buzz.csv",
            "\u{feff}本文,いいね数,リポスト数,ユーザー名,投稿日時\n\
             3つの方法,\"1,200\",30,@alice,2026-02-17 21:05:00\n\
             ,5,0,bob,\n\
             nan,1,1,carol,\n\
             正直に話す,abc,2,dave,\n",
        );

        let file = read_posts_file(&path).unwrap();
        assert_eq!(file.source_file, "buzz.csv");
        assert_eq!(file.rows_read, 4);
        assert_eq!(file.skipped_empty, 2);
        assert_eq!(file.posts.len(), 2);

        let first = &file.posts[0];
        assert_eq!(first.text, "3つの方法");
        assert_eq!(first.likes, 1200);
        assert_eq!(first.retweets, 30);
        assert_eq!(first.account, "alice");
        assert_eq!(first.created_at, "2026-02-17 21:05:00");
        assert_eq!(first.source.as_deref(), Some("buzz.csv"));

        let second = &file.posts[1];
        assert_eq!(second.likes, 0, "malformed count defaults to zero");
        assert_eq!(second.replies, 0, "missing column defaults to zero");
    }

    #[test]
    fn reads_shift_jis_export() {
        let (encoded, _, had_errors) =
            encoding_rs::SHIFT_JIS.encode("本文,いいね数,ユーザー名\nこんにちは,5,@alice\n");
        assert!(!had_errors);
        assert!(std::str::from_utf8(&encoded).is_err());
        let (_dir, path) = write_bytes("sjis.csv", &encoded);

        let file = read_posts_file(&path).unwrap();
        assert_eq!(file.posts.len(), 1);
        assert_eq!(file.posts[0].text, "こんにちは");
        assert_eq!(file.posts[0].likes, 5);
        assert_eq!(file.posts[0].account, "alice");
    }

    #[test]
    fn short_rows_default_missing_cells() {
        let (_dir, path) = write_csv("short.csv", "text,account,likes\nhello\n");
        let file = read_posts_file(&path).unwrap();
        assert_eq!(file.posts.len(), 1);
        assert_eq!(file.posts[0].account, "");
        assert_eq!(file.posts[0].likes, 0);
    }

    #[test]
    fn missing_text_column_is_an_error() {
        let (_dir, path) = write_csv("bad.csv", "likes,account\n3,alice\n");
        let err = read_posts_file(&path).unwrap_err();
        assert!(matches!(err, IngestError::MissingTextColumn { .. }));
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let err = read_posts_file(Path::new("posts.json")).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat(ref ext) if ext == ".json"));
    }

    #[test]
    fn extension_match_ignores_case() {
        assert_eq!(detect_format(Path::new("A.CSV")).unwrap(), FileFormat::Csv);
        assert_eq!(
            detect_format(Path::new("b.Xlsx")).unwrap(),
            FileFormat::Spreadsheet
        );
    }

    #[test]
    fn spreadsheet_cells_render_like_csv() {
        assert_eq!(cell_to_string(&Data::Float(42.0)), "42");
        assert_eq!(cell_to_string(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_to_string(&Data::Int(7)), "7");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn excel_serial_dates_convert() {
        // 45000.5 is 2023-03-15 12:00 in the 1900 date system
        assert_eq!(excel_serial_to_string(45_000.5), "2023-03-15 12:00:00");
    }
}
