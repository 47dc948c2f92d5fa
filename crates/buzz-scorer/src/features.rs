//! Flat feature extraction for analysis and reporting.

use serde::Serialize;

use crate::classify::{line_breaks, Category, OpeningPattern, RuleSet};

/// Everything the shared classifiers can say about one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostFeatures {
    pub char_count: usize,
    pub line_breaks: usize,
    pub emoji_count: usize,
    pub opening: OpeningPattern,
    pub category: Category,
    pub has_question: bool,
    pub has_concrete_number: bool,
    pub has_money: bool,
    pub has_story: bool,
    pub has_bullets: bool,
    pub has_self_disclosure: bool,
    pub cta_kinds: Vec<&'static str>,
    pub emotions: Vec<&'static str>,
}

impl PostFeatures {
    #[must_use]
    pub fn has_cta(&self) -> bool {
        !self.cta_kinds.is_empty()
    }
}

#[must_use]
pub fn extract_features(rules: &RuleSet, text: &str) -> PostFeatures {
    PostFeatures {
        char_count: text.chars().count(),
        line_breaks: line_breaks(text),
        emoji_count: rules.emoji_count(text),
        opening: rules.classify_opening(text),
        category: rules.classify_category(text),
        has_question: rules.has_question(text),
        has_concrete_number: rules.has_concrete_number(text),
        has_money: rules.has_money(text),
        has_story: rules.has_story(text),
        has_bullets: rules.has_bullets(text),
        has_self_disclosure: rules.has_self_disclosure(text),
        cta_kinds: rules.cta_kinds(text),
        emotions: rules.emotions(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_no_features() {
        let features = extract_features(&RuleSet::new(), "");
        assert_eq!(features.char_count, 0);
        assert_eq!(features.opening, OpeningPattern::Other);
        assert_eq!(features.category, Category::Other);
        assert!(!features.has_cta());
        assert!(features.emotions.is_empty());
    }

    #[test]
    fn counts_characters_not_bytes() {
        let features = extract_features(&RuleSet::new(), "正直に言う\n実は");
        assert_eq!(features.char_count, 8);
        assert_eq!(features.line_breaks, 1);
        assert!(features.has_self_disclosure);
    }

    #[test]
    fn serializes_enums_as_snake_case() {
        let features = extract_features(&RuleSet::new(), "3つの方法");
        let json = serde_json::to_value(&features).unwrap();
        assert_eq!(json["opening"], "number_led");
    }
}
