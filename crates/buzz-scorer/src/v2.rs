//! Second-generation buzz score, re-weighted against observed likes.
//!
//! Short posts, digit-led openings and concrete numbers dominate. Emoji are
//! penalised and CTA/emotion factors are gone. Posting hour is extracted for
//! reference only.

use std::sync::Arc;

use buzz_core::{Factor, ScoreResult};

use crate::classify::{line_breaks, RuleSet};
use crate::weights::{CategoryPoints, OpeningPoints, StepTable};
use crate::{zero_if_blank, Scorer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuzzV2Weights {
    pub opening: OpeningPoints,
    /// Character-count steps; non-monotonic on purpose (81..=130 dips).
    pub length: StepTable,
    pub category: CategoryPoints,
    pub concrete_number: i32,
    pub money: i32,
    pub numbers_cap: i32,
    /// Fewer line breaks score higher.
    pub conciseness: StepTable,
    /// Emoji-count steps; fewer is better.
    pub emoji: StepTable,
    pub story: i32,
}

impl Default for BuzzV2Weights {
    fn default() -> Self {
        Self {
            opening: OpeningPoints {
                number_led: 25,
                question: 12,
                declarative: 8,
                empathy: 18,
                provocation: 6,
                address: 5,
                other: 10,
            },
            length: StepTable::new(&[(80, 20), (130, 13), (170, 17), (220, 10), (300, 4)], 2),
            category: CategoryPoints {
                achievement: 7,
                how_to: 8,
                anecdote: 15,
                problem_statement: 15,
                tool_promotion: 10,
                news: 5,
                other: 5,
            },
            concrete_number: 10,
            money: 5,
            numbers_cap: 15,
            conciseness: StepTable::new(&[(3, 10), (7, 7), (12, 4)], 1),
            emoji: StepTable::new(&[(0, 10), (2, 6)], 2),
            story: 5,
        }
    }
}

pub struct BuzzV2Scorer {
    rules: Arc<RuleSet>,
    weights: BuzzV2Weights,
}

impl BuzzV2Scorer {
    pub const NAME: &'static str = "v2";

    #[must_use]
    pub fn new(rules: Arc<RuleSet>, weights: BuzzV2Weights) -> Self {
        Self { rules, weights }
    }
}

impl Scorer for BuzzV2Scorer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn score(&self, text: &str, posted_at: Option<&str>) -> ScoreResult {
        let rules = &self.rules;
        let w = &self.weights;

        let opening = w.opening.points(rules.classify_opening(text));
        let length = w.length.points(text.chars().count());
        let category = w.category.points(rules.classify_category(text));

        let mut numbers = 0;
        if rules.has_concrete_number(text) {
            numbers += w.concrete_number;
        }
        if rules.has_money(text) {
            numbers += w.money;
        }
        let numbers = numbers.min(w.numbers_cap);

        let conciseness = w.conciseness.points(line_breaks(text));
        let emoji = w.emoji.points(rules.emoji_count(text));
        let story = if rules.has_story(text) { w.story } else { 0 };

        let factors = vec![
            Factor::new("opening", opening),
            Factor::new("length", length),
            Factor::new("category", category),
            Factor::new("concrete_numbers", numbers),
            Factor::new("conciseness", conciseness),
            Factor::new("emoji", emoji),
            Factor::new("story", story),
        ];
        ScoreResult::from_factors(Self::NAME, zero_if_blank(text, factors))
        .with_posted_hour(posted_at.and_then(|ts| rules.extract_hour(ts)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> BuzzV2Scorer {
        BuzzV2Scorer::new(Arc::new(RuleSet::new()), BuzzV2Weights::default())
    }

    #[test]
    fn default_weights_cap_at_hundred() {
        let w = BuzzV2Weights::default();
        let max = w.opening.number_led
            + w.length.points(0)
            + w.category.anecdote
            + w.numbers_cap
            + w.conciseness.points(0)
            + w.emoji.points(0)
            + w.story;
        assert_eq!(max, 100);
    }

    #[test]
    fn length_table_dips_between_81_and_130() {
        let w = BuzzV2Weights::default();
        assert_eq!(w.length.points(80), 20);
        assert_eq!(w.length.points(81), 13);
        assert_eq!(w.length.points(130), 13);
        assert_eq!(w.length.points(150), 17);
        assert_eq!(w.length.points(200), 10);
        assert_eq!(w.length.points(300), 4);
        assert_eq!(w.length.points(301), 2);
    }

    #[test]
    fn emoji_penalised() {
        let s = scorer();
        assert_eq!(s.score("絵文字なし", None).factor("emoji"), Some(10));
        assert_eq!(s.score("ひとつ😀", None).factor("emoji"), Some(6));
        assert_eq!(s.score("たくさん😀😀😀", None).factor("emoji"), Some(2));
    }

    #[test]
    fn concrete_numbers_capped() {
        let s = scorer();
        let result = s.score("3つの方法で月5万円稼いだ", None);
        assert_eq!(result.factor("concrete_numbers"), Some(15));
    }

    #[test]
    fn posted_hour_is_reference_only() {
        let s = scorer();
        let with_hour = s.score("今日の学び", Some("2026-02-17 21:05:00"));
        let without = s.score("今日の学び", None);
        assert_eq!(with_hour.posted_hour, Some(21));
        assert_eq!(without.posted_hour, None);
        assert_eq!(with_hour.total_score, without.total_score);
    }

    #[test]
    fn blank_text_scores_nothing() {
        for text in ["", "  ", "\n\n"] {
            let result = scorer().score(text, None);
            assert!(result.factors.iter().all(|f| f.points == 0), "{text:?}");
            assert_eq!(result.total_score, 0);
        }
    }

    #[test]
    fn no_cta_or_emotion_factor() {
        let result = scorer().score("保存してね、まさかの展開", None);
        assert!(result.factor("cta").is_none());
        assert!(result.factor("emotion").is_none());
    }
}
