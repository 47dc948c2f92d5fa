//! First-generation buzz score.
//!
//! Rewards emotional wording, explicit calls to action and a moderate amount
//! of emoji. Later data showed CTA and emoji correlate negatively with likes,
//! which is why [`crate::v2`] flips those weights; both tables are kept.

use std::sync::Arc;

use buzz_core::{Factor, ScoreResult};

use crate::classify::{line_breaks, RuleSet};
use crate::weights::{CategoryPoints, OpeningPoints};
use crate::{zero_if_blank, Scorer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuzzV1Weights {
    pub opening: OpeningPoints,
    /// Full marks when the character count falls inside this range.
    pub length_optimum: (usize, usize),
    pub length_max: i32,
    pub category: CategoryPoints,
    pub emotion_per_family: i32,
    pub emotion_cap: i32,
    pub cta_present: i32,
    pub story: i32,
    /// Emoji points for 0, 1..=`emoji_few_max`, and more than that.
    pub emoji_none: i32,
    pub emoji_few: i32,
    pub emoji_many: i32,
    pub emoji_few_max: usize,
    pub readable_line_breaks: (usize, usize),
    pub readable_line_points: i32,
    pub bullet_points: i32,
}

impl Default for BuzzV1Weights {
    fn default() -> Self {
        Self {
            opening: OpeningPoints {
                number_led: 20,
                question: 16,
                declarative: 8,
                empathy: 14,
                provocation: 14,
                address: 12,
                other: 5,
            },
            length_optimum: (100, 300),
            length_max: 15,
            category: CategoryPoints {
                achievement: 15,
                how_to: 13,
                anecdote: 11,
                problem_statement: 12,
                tool_promotion: 10,
                news: 8,
                other: 5,
            },
            emotion_per_family: 4,
            emotion_cap: 10,
            cta_present: 10,
            story: 10,
            emoji_none: 4,
            emoji_few: 10,
            emoji_many: 6,
            emoji_few_max: 3,
            readable_line_breaks: (3, 10),
            readable_line_points: 5,
            bullet_points: 5,
        }
    }
}

pub struct BuzzV1Scorer {
    rules: Arc<RuleSet>,
    weights: BuzzV1Weights,
}

impl BuzzV1Scorer {
    pub const NAME: &'static str = "v1";

    #[must_use]
    pub fn new(rules: Arc<RuleSet>, weights: BuzzV1Weights) -> Self {
        Self { rules, weights }
    }

    /// Full marks inside the optimum range, prorated linearly outside it.
    fn length_points(&self, chars: usize) -> i32 {
        let (low, high) = self.weights.length_optimum;
        let max = i64::from(self.weights.length_max);
        let chars_i = i64::try_from(chars).unwrap_or(i64::MAX);
        let points = if chars < low {
            max * chars_i / i64::try_from(low.max(1)).unwrap_or(1)
        } else if chars > high {
            max * i64::try_from(high).unwrap_or(0) / chars_i
        } else {
            max
        };
        i32::try_from(points).unwrap_or(0)
    }

    fn emoji_points(&self, count: usize) -> i32 {
        let w = &self.weights;
        match count {
            0 => w.emoji_none,
            n if n <= w.emoji_few_max => w.emoji_few,
            _ => w.emoji_many,
        }
    }
}

impl Scorer for BuzzV1Scorer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn score(&self, text: &str, _posted_at: Option<&str>) -> ScoreResult {
        let rules = &self.rules;
        let w = &self.weights;

        let opening = w.opening.points(rules.classify_opening(text));
        let length = self.length_points(text.chars().count());
        let category = w.category.points(rules.classify_category(text));

        let families = i32::try_from(rules.emotions(text).len()).unwrap_or(i32::MAX);
        let emotion = families
            .saturating_mul(w.emotion_per_family)
            .min(w.emotion_cap);

        let cta = if rules.cta_kinds(text).is_empty() {
            0
        } else {
            w.cta_present
        };
        let story = if rules.has_story(text) { w.story } else { 0 };
        let emoji = self.emoji_points(rules.emoji_count(text));

        let (min_breaks, max_breaks) = w.readable_line_breaks;
        let mut readability = 0;
        if (min_breaks..=max_breaks).contains(&line_breaks(text)) {
            readability += w.readable_line_points;
        }
        if rules.has_bullets(text) {
            readability += w.bullet_points;
        }

        let factors = vec![
            Factor::new("opening", opening),
            Factor::new("length", length),
            Factor::new("category", category),
            Factor::new("emotion", emotion),
            Factor::new("cta", cta),
            Factor::new("story", story),
            Factor::new("emoji", emoji),
            Factor::new("readability", readability),
        ];
        ScoreResult::from_factors(Self::NAME, zero_if_blank(text, factors))
    }
}
