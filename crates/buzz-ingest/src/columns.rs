//! Header aliasing for the export formats seen in the wild.

use crate::error::IngestError;

const TEXT_ALIASES: &[&str] = &["本文", "テキスト", "text"];
const ACCOUNT_ALIASES: &[&str] = &["ユーザー名", "@", "account", "username"];
const LIKES_ALIASES: &[&str] = &["いいね数", "likes"];
const RETWEETS_ALIASES: &[&str] = &["リポスト数", "RT数", "retweets"];
const REPLIES_ALIASES: &[&str] = &["リプライ数", "replies"];
const IMPRESSIONS_ALIASES: &[&str] = &["imp", "インプレッション数", "impressions"];
const DATE_ALIASES: &[&str] = &["投稿日時", "date", "created_at"];
const URL_ALIASES: &[&str] = &["ポストURL", "url"];

/// Column indices for each post field. Only `text` is mandatory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub text: usize,
    pub account: Option<usize>,
    pub likes: Option<usize>,
    pub retweets: Option<usize>,
    pub replies: Option<usize>,
    pub impressions: Option<usize>,
    pub date: Option<usize>,
    pub url: Option<usize>,
}

impl ColumnMap {
    /// Resolve field columns from a header row. Aliases are tried in order and
    /// the first header present wins.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::MissingTextColumn`] listing the headers found
    /// when none of the text aliases is present.
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Result<Self, IngestError> {
        let headers: Vec<&str> = headers
            .iter()
            .map(|h| h.as_ref().trim().trim_start_matches('\u{feff}'))
            .collect();
        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| headers.iter().position(|h| h == alias))
        };

        let text = find(TEXT_ALIASES).ok_or_else(|| IngestError::MissingTextColumn {
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
        })?;

        Ok(Self {
            text,
            account: find(ACCOUNT_ALIASES),
            likes: find(LIKES_ALIASES),
            retweets: find(RETWEETS_ALIASES),
            replies: find(REPLIES_ALIASES),
            impressions: find(IMPRESSIONS_ALIASES),
            date: find(DATE_ALIASES),
            url: find(URL_ALIASES),
        })
    }
}

/// Lenient count parsing: thousands separators are stripped, fractional
/// values truncate, and anything unparseable becomes 0.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_count(raw: &str) -> u64 {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if let Ok(n) = cleaned.parse::<u64>() {
        return n;
    }
    match cleaned.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 => f as u64,
        _ => 0,
    }
}

/// `true` for cells that carry no text: blank or a spreadsheet `nan`.
#[must_use]
pub fn is_blank_text(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
}
