//! How well each scoring strategy tracks observed likes.

use buzz_core::Post;
use buzz_scorer::Scorer;
use serde::Serialize;

use crate::stats::{mean, pearson};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyCorrelation {
    pub strategy: &'static str,
    /// Pearson correlation between score and likes; `None` when undefined.
    pub correlation: Option<f64>,
    pub sample_size: usize,
    pub mean_score: f64,
}

/// Score every post with each strategy and correlate the totals with likes.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn strategy_correlations(posts: &[Post], scorers: &[Box<dyn Scorer>]) -> Vec<StrategyCorrelation> {
    let likes: Vec<f64> = posts.iter().map(|p| p.likes as f64).collect();

    scorers
        .iter()
        .map(|scorer| {
            let scores: Vec<f64> = posts
                .iter()
                .map(|p| f64::from(scorer.score(&p.text, Some(&p.created_at)).total_score))
                .collect();
            let correlation = pearson(&scores, &likes);
            tracing::debug!(
                strategy = scorer.name(),
                sample_size = posts.len(),
                correlation = ?correlation,
                "strategy correlation"
            );
            StrategyCorrelation {
                strategy: scorer.name(),
                correlation,
                sample_size: posts.len(),
                mean_score: mean(&scores),
            }
        })
        .collect()
}

/// `+0.123` style rendering, or `n/a`.
#[must_use]
pub fn format_correlation(correlation: Option<f64>) -> String {
    correlation.map_or_else(|| "n/a".to_string(), |c| format!("{c:+.3}"))
}
