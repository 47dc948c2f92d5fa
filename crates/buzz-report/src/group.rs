//! Group posts along one dimension and summarise engagement per group.

use std::collections::BTreeMap;

use buzz_core::Post;
use buzz_scorer::RuleSet;
use chrono::{Datelike, FixedOffset, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::stats::{mean, median};

/// Label used for posts without an account name.
pub const UNKNOWN_ACCOUNT: &str = "(unknown)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Category,
    OpeningPattern,
    HourOfDay,
    DayOfWeek,
    TimeSlot,
    Account,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Category,
        Dimension::OpeningPattern,
        Dimension::HourOfDay,
        Dimension::DayOfWeek,
        Dimension::TimeSlot,
        Dimension::Account,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Category => "category",
            Dimension::OpeningPattern => "opening_pattern",
            Dimension::HourOfDay => "hour_of_day",
            Dimension::DayOfWeek => "day_of_week",
            Dimension::TimeSlot => "time_slot",
            Dimension::Account => "account",
        }
    }

    /// Heading used in reports.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Dimension::Category => "Category",
            Dimension::OpeningPattern => "Opening pattern",
            Dimension::HourOfDay => "Hour of day",
            Dimension::DayOfWeek => "Day of week",
            Dimension::TimeSlot => "Time slot",
            Dimension::Account => "Account",
        }
    }

    /// Whether grouping needs a parseable posting time.
    #[must_use]
    pub fn is_time_based(self) -> bool {
        matches!(
            self,
            Dimension::HourOfDay | Dimension::DayOfWeek | Dimension::TimeSlot
        )
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown dimension: {0} (expected category, opening, hour, weekday, slot or account)")]
pub struct UnknownDimension(pub String);

impl std::str::FromStr for Dimension {
    type Err = UnknownDimension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "category" => Ok(Dimension::Category),
            "opening" | "opening_pattern" => Ok(Dimension::OpeningPattern),
            "hour" | "hour_of_day" => Ok(Dimension::HourOfDay),
            "weekday" | "day" | "day_of_week" => Ok(Dimension::DayOfWeek),
            "slot" | "time_slot" => Ok(Dimension::TimeSlot),
            "account" => Ok(Dimension::Account),
            _ => Err(UnknownDimension(s.to_string())),
        }
    }
}

/// Coarse part of the day a post went out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimeSlot {
    Morning,
    LateMorning,
    Afternoon,
    Evening,
    LateNight,
}

impl TimeSlot {
    #[must_use]
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=8 => TimeSlot::Morning,
            9..=11 => TimeSlot::LateMorning,
            12..=17 => TimeSlot::Afternoon,
            18..=21 => TimeSlot::Evening,
            _ => TimeSlot::LateNight,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TimeSlot::Morning => "morning (6-9)",
            TimeSlot::LateMorning => "late morning (9-12)",
            TimeSlot::Afternoon => "afternoon (12-18)",
            TimeSlot::Evening => "evening (18-22)",
            TimeSlot::LateNight => "late night (22-6)",
        }
    }
}

/// Engagement summary of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub key: String,
    pub count: usize,
    pub mean_likes: f64,
    pub median_likes: f64,
    pub mean_retweets: f64,
    pub median_retweets: f64,
    pub mean_replies: f64,
    pub median_replies: f64,
    pub mean_engagement: f64,
}

#[derive(Default)]
struct Samples {
    likes: Vec<f64>,
    retweets: Vec<f64>,
    replies: Vec<f64>,
    engagement: Vec<f64>,
}

impl Samples {
    #[allow(clippy::cast_precision_loss)]
    fn push(&mut self, post: &Post) {
        self.likes.push(post.likes as f64);
        self.retweets.push(post.retweets as f64);
        self.replies.push(post.replies as f64);
        self.engagement.push(post.engagement_score() as f64);
    }

    fn into_stats(self, key: String) -> GroupStats {
        GroupStats {
            key,
            count: self.likes.len(),
            mean_likes: mean(&self.likes),
            median_likes: median(&self.likes),
            mean_retweets: mean(&self.retweets),
            median_retweets: median(&self.retweets),
            mean_replies: mean(&self.replies),
            median_replies: median(&self.replies),
            mean_engagement: mean(&self.engagement),
        }
    }
}

fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Group key of `post`, or `None` when a time dimension cannot be derived.
fn key_for(post: &Post, dimension: Dimension, rules: &RuleSet, offset: FixedOffset) -> Option<String> {
    match dimension {
        Dimension::Category => Some(rules.classify_category(&post.text).as_str().to_string()),
        Dimension::OpeningPattern => Some(rules.classify_opening(&post.text).as_str().to_string()),
        Dimension::HourOfDay => post
            .posted_at_in(offset)
            .map(|dt| format!("{:02}:00", dt.hour())),
        Dimension::DayOfWeek => post
            .posted_at_in(offset)
            .map(|dt| weekday_label(dt.weekday()).to_string()),
        Dimension::TimeSlot => post
            .posted_at_in(offset)
            .map(|dt| TimeSlot::from_hour(dt.hour()).label().to_string()),
        Dimension::Account => Some(if post.account.trim().is_empty() {
            UNKNOWN_ACCOUNT.to_string()
        } else {
            post.account.clone()
        }),
    }
}

/// Per-group engagement along `dimension`, best mean likes first.
///
/// Time dimensions read timestamps on the wall clock of `offset` and leave
/// out posts whose timestamp does not parse.
#[must_use]
pub fn group_by(
    posts: &[Post],
    dimension: Dimension,
    rules: &RuleSet,
    offset: FixedOffset,
) -> Vec<GroupStats> {
    let mut groups: BTreeMap<String, Samples> = BTreeMap::new();
    let mut skipped = 0usize;

    for post in posts {
        match key_for(post, dimension, rules, offset) {
            Some(key) => groups.entry(key).or_default().push(post),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::debug!(dimension = %dimension, skipped, "posts without a usable timestamp");
    }

    let mut stats: Vec<GroupStats> = groups
        .into_iter()
        .map(|(key, samples)| samples.into_stats(key))
        .collect();
    stats.sort_by(|a, b| {
        b.mean_likes
            .total_cmp(&a.mean_likes)
            .then_with(|| a.key.cmp(&b.key))
    });
    stats
}
