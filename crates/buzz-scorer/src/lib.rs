//! Heuristic buzz scorers for short-form posts.
//!
//! Every strategy implements [`Scorer`] and is built from immutable tables:
//! a shared [`RuleSet`] of classifier regexes plus one weight struct per
//! strategy. Scoring is pure and total; no input makes a scorer panic.

pub mod algorithm;
pub mod classify;
pub mod features;
pub mod psychology;
pub mod tone;
pub mod v1;
pub mod v2;
pub mod weights;

use std::sync::Arc;

pub use algorithm::{AlgorithmScorer, AlgorithmWeights, LinkSignals, ThreadSignals};
pub use buzz_core::{Factor, ScoreResult};
pub use classify::{Category, OpeningPattern, RuleSet};
pub use features::{extract_features, PostFeatures};
pub use psychology::{
    analyze_reader_psychology, PsychologyReport, ReaderPsychologyScorer, TriggerHit,
};
pub use tone::{analyze_tone, Tone, ToneAnalysis, ToneRules};
pub use v1::{BuzzV1Scorer, BuzzV1Weights};
pub use v2::{BuzzV2Scorer, BuzzV2Weights};

/// A scoring strategy.
pub trait Scorer: Send + Sync {
    /// Stable strategy label, stored alongside results.
    fn name(&self) -> &'static str;

    /// Score `text`. `posted_at` is an optional raw timestamp some
    /// strategies report on without scoring.
    fn score(&self, text: &str, posted_at: Option<&str>) -> ScoreResult;
}

#[derive(Debug, thiserror::Error)]
#[error("unknown scoring strategy: {0} (expected v1, v2, algorithm or psychology)")]
pub struct UnknownStrategy(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    V1,
    V2,
    Algorithm,
    Psychology,
}

impl ScorerKind {
    pub const ALL: [ScorerKind; 4] = [
        ScorerKind::V1,
        ScorerKind::V2,
        ScorerKind::Algorithm,
        ScorerKind::Psychology,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScorerKind::V1 => BuzzV1Scorer::NAME,
            ScorerKind::V2 => BuzzV2Scorer::NAME,
            ScorerKind::Algorithm => AlgorithmScorer::NAME,
            ScorerKind::Psychology => ReaderPsychologyScorer::NAME,
        }
    }
}

impl std::fmt::Display for ScorerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScorerKind {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" => Ok(ScorerKind::V1),
            "v2" => Ok(ScorerKind::V2),
            "algorithm" | "algo" => Ok(ScorerKind::Algorithm),
            "psychology" | "psych" => Ok(ScorerKind::Psychology),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

/// Whether `text` has nothing but whitespace.
#[must_use]
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Blank text carries no signal, so every factor drops to zero points.
pub(crate) fn zero_if_blank(text: &str, mut factors: Vec<Factor>) -> Vec<Factor> {
    if is_blank(text) {
        for factor in &mut factors {
            factor.points = 0;
        }
    }
    factors
}

/// Build a scorer with the default weight table for `kind`.
#[must_use]
pub fn build_scorer(kind: ScorerKind, rules: Arc<RuleSet>) -> Box<dyn Scorer> {
    match kind {
        ScorerKind::V1 => Box::new(BuzzV1Scorer::new(rules, BuzzV1Weights::default())),
        ScorerKind::V2 => Box::new(BuzzV2Scorer::new(rules, BuzzV2Weights::default())),
        ScorerKind::Algorithm => Box::new(AlgorithmScorer::new(rules, AlgorithmWeights::default())),
        ScorerKind::Psychology => Box::new(ReaderPsychologyScorer::new(rules)),
    }
}

/// One scorer per strategy, in [`ScorerKind::ALL`] order, sharing `rules`.
#[must_use]
pub fn build_all_scorers(rules: &Arc<RuleSet>) -> Vec<Box<dyn Scorer>> {
    ScorerKind::ALL
        .iter()
        .map(|kind| build_scorer(*kind, Arc::clone(rules)))
        .collect()
}
