use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Naive layouts seen in spreadsheet exports; read as local to the caller's offset.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Layout used by the scraping API's `createdAt` field.
const API_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// One social-media post as ingested from a file export or the search API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub text: String,
    pub account: String,
    pub likes: u64,
    pub retweets: u64,
    pub replies: u64,
    pub impressions: u64,
    /// Raw timestamp as received. Parsing is best-effort, see [`Post::posted_at`].
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// File name or `api:<query>` the post came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Post {
    #[must_use]
    pub fn new(account: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    /// `likes + 2 * retweets + 3 * replies`.
    #[must_use]
    pub fn engagement_score(&self) -> u64 {
        self.likes
            .saturating_add(self.retweets.saturating_mul(2))
            .saturating_add(self.replies.saturating_mul(3))
    }

    /// Parsed `created_at`, or `None` when the raw value is in no known layout.
    #[must_use]
    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }

    /// `created_at` on the wall clock of `offset`. Naive timestamps are taken
    /// to already be in that zone.
    #[must_use]
    pub fn posted_at_in(&self, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
        parse_timestamp_in(&self.created_at, offset)
    }

    /// Number of Unicode scalar values in the text.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Parse a timestamp in any of the layouts the ingest sources produce.
///
/// Accepts RFC 3339, the API's `Tue Feb 17 10:00:00 +0000 2026` form, common
/// naive spreadsheet layouts (treated as UTC), and bare dates (midnight UTC).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    parse_timestamp_in(raw, Utc.fix()).map(|dt| dt.with_timezone(&Utc))
}

/// Like [`parse_timestamp`], but the result is on the wall clock of `offset`
/// and naive layouts are read as local times in that offset.
#[must_use]
pub fn parse_timestamp_in(raw: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&offset));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, API_FORMAT) {
        return Some(dt.with_timezone(&offset));
    }
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            ["%Y-%m-%d", "%Y/%m/%d"].iter().find_map(|format| {
                NaiveDate::parse_from_str(raw, format)
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
        })?;
    offset.from_local_datetime(&naive).single()
}
