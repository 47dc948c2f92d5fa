use serde::Serialize;

pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 100;

/// A single named contribution to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Factor {
    pub name: &'static str,
    pub points: i32,
}

impl Factor {
    #[must_use]
    pub const fn new(name: &'static str, points: i32) -> Self {
        Self { name, points }
    }
}

/// Output of one scoring strategy for one text.
///
/// `factors` keeps the order in which the strategy evaluated them. The sum of
/// their points is the raw total; `total_score` is that sum clamped to
/// `[MIN_SCORE, MAX_SCORE]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreResult {
    pub strategy: &'static str,
    pub total_score: i32,
    pub factors: Vec<Factor>,
    /// Hour of posting, reported for reference and never part of the total.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_hour: Option<u32>,
}

impl ScoreResult {
    #[must_use]
    pub fn from_factors(strategy: &'static str, factors: Vec<Factor>) -> Self {
        let raw: i32 = factors.iter().map(|f| f.points).sum();
        Self {
            strategy,
            total_score: raw.clamp(MIN_SCORE, MAX_SCORE),
            factors,
            posted_hour: None,
        }
    }

    #[must_use]
    pub fn with_posted_hour(mut self, hour: Option<u32>) -> Self {
        self.posted_hour = hour;
        self
    }

    /// Sum of factor points before clamping.
    #[must_use]
    pub fn raw_total(&self) -> i32 {
        self.factors.iter().map(|f| f.points).sum()
    }

    #[must_use]
    pub fn factor(&self, name: &str) -> Option<i32> {
        self.factors
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_sum_of_factors() {
        let result = ScoreResult::from_factors(
            "test",
            vec![Factor::new("a", 10), Factor::new("b", 25)],
        );
        assert_eq!(result.total_score, 35);
        assert_eq!(result.raw_total(), 35);
    }

    #[test]
    fn negative_total_clamps_to_zero() {
        let result = ScoreResult::from_factors(
            "test",
            vec![Factor::new("a", 3), Factor::new("penalty", -15)],
        );
        assert_eq!(result.total_score, 0);
        assert_eq!(result.raw_total(), -12);
    }

    #[test]
    fn oversized_total_clamps_to_hundred() {
        let result = ScoreResult::from_factors("test", vec![Factor::new("a", 140)]);
        assert_eq!(result.total_score, 100);
    }

    #[test]
    fn factor_lookup_by_name() {
        let result = ScoreResult::from_factors("test", vec![Factor::new("length", 7)]);
        assert_eq!(result.factor("length"), Some(7));
        assert_eq!(result.factor("missing"), None);
    }

    #[test]
    fn serializes_factor_names_in_order() {
        let result = ScoreResult::from_factors(
            "v2",
            vec![Factor::new("opening", 25), Factor::new("length", 20)],
        );
        let json = serde_json::to_string(&result).expect("serialize");
        let opening = json.find("opening").expect("opening present");
        let length = json.find("length").expect("length present");
        assert!(opening < length);
        assert!(!json.contains("posted_hour"));
    }
}
