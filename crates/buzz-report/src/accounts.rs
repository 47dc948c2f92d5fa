//! Cross-account comparison: what each account posts and how it lands.

use std::collections::BTreeMap;
use std::sync::Arc;

use buzz_core::Post;
use buzz_scorer::{
    AlgorithmScorer, AlgorithmWeights, Category, OpeningPattern, ReaderPsychologyScorer, RuleSet,
    Scorer, Tone,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::group::UNKNOWN_ACCOUNT;
use crate::stats::mean;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub account: String,
    pub post_count: usize,
    pub mean_likes: f64,
    pub max_likes: u64,
    pub top_category: Category,
    pub top_opening: OpeningPattern,
    pub top_tone: Tone,
    pub top_emotion: &'static str,
    pub mean_algorithm_score: f64,
    /// Share of posts containing a question, `0.0..=1.0`.
    pub question_rate: f64,
    /// Share of posts with candid first-person disclosure, `0.0..=1.0`.
    pub self_disclosure_rate: f64,
    pub mean_length: f64,
    /// Posting frequency over the span of parseable dates. `None` when no
    /// date parses.
    pub posts_per_day: Option<f64>,
}

/// Most frequent key; ties go to the smallest key.
fn mode<K: Ord + Copy>(counts: &BTreeMap<K, usize>) -> Option<K> {
    let mut best: Option<(K, usize)> = None;
    for (key, count) in counts {
        if best.is_none_or(|(_, top)| *count > top) {
            best = Some((*key, *count));
        }
    }
    best.map(|(key, _)| key)
}

#[allow(clippy::cast_precision_loss)]
fn posts_per_day(dates: &[DateTime<Utc>]) -> Option<f64> {
    let first = dates.iter().min()?;
    let last = dates.iter().max()?;
    let days = ((*last - *first).num_hours() as f64 / 24.0).max(1.0);
    Some(dates.len() as f64 / days)
}

struct AccountAnalyzer {
    rules: Arc<RuleSet>,
    algorithm: AlgorithmScorer,
    psychology: ReaderPsychologyScorer,
}

impl AccountAnalyzer {
    fn new(rules: &Arc<RuleSet>) -> Self {
        Self {
            rules: Arc::clone(rules),
            algorithm: AlgorithmScorer::new(Arc::clone(rules), AlgorithmWeights::default()),
            psychology: ReaderPsychologyScorer::new(Arc::clone(rules)),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn summarise(&self, account: String, posts: &[&Post]) -> AccountSummary {
        let mut categories = BTreeMap::new();
        let mut openings = BTreeMap::new();
        let mut tones = BTreeMap::new();
        let mut emotions = BTreeMap::new();
        let mut likes = Vec::with_capacity(posts.len());
        let mut algorithm_scores = Vec::with_capacity(posts.len());
        let mut lengths = Vec::with_capacity(posts.len());
        let mut dates = Vec::new();
        let mut questions = 0usize;
        let mut disclosures = 0usize;

        for post in posts {
            let text = post.text.as_str();
            *categories.entry(self.rules.classify_category(text)).or_insert(0) += 1;
            *openings.entry(self.rules.classify_opening(text)).or_insert(0) += 1;

            let psychology = self.psychology.analyze(text);
            *tones.entry(psychology.tone).or_insert(0) += 1;
            *emotions.entry(psychology.primary_emotion).or_insert(0) += 1;

            let score = self.algorithm.score(text, Some(&post.created_at));
            algorithm_scores.push(f64::from(score.total_score));

            likes.push(post.likes as f64);
            lengths.push(post.char_count() as f64);
            questions += usize::from(self.rules.has_question(text));
            disclosures += usize::from(self.rules.has_self_disclosure(text));
            if let Some(dt) = post.posted_at() {
                dates.push(dt);
            }
        }

        let count = posts.len();
        let rate = |hits: usize| if count == 0 { 0.0 } else { hits as f64 / count as f64 };
        AccountSummary {
            account,
            post_count: count,
            mean_likes: mean(&likes),
            max_likes: posts.iter().map(|p| p.likes).max().unwrap_or(0),
            top_category: mode(&categories).unwrap_or(Category::Other),
            top_opening: mode(&openings).unwrap_or(OpeningPattern::Other),
            top_tone: mode(&tones).unwrap_or(Tone::Neutral),
            top_emotion: mode(&emotions).unwrap_or("interest"),
            mean_algorithm_score: mean(&algorithm_scores),
            question_rate: rate(questions),
            self_disclosure_rate: rate(disclosures),
            mean_length: mean(&lengths),
            posts_per_day: posts_per_day(&dates),
        }
    }
}

/// One summary per account with at least `min_posts` posts, best mean likes
/// first.
#[must_use]
pub fn account_summaries(
    posts: &[Post],
    rules: &Arc<RuleSet>,
    min_posts: usize,
) -> Vec<AccountSummary> {
    let mut by_account: BTreeMap<&str, Vec<&Post>> = BTreeMap::new();
    for post in posts {
        let account = post.account.trim();
        let account = if account.is_empty() { UNKNOWN_ACCOUNT } else { account };
        by_account.entry(account).or_default().push(post);
    }

    let analyzer = AccountAnalyzer::new(rules);
    let mut summaries: Vec<AccountSummary> = by_account
        .into_iter()
        .filter(|(_, posts)| posts.len() >= min_posts.max(1))
        .map(|(account, posts)| analyzer.summarise(account.to_string(), &posts))
        .collect();

    summaries.sort_by(|a, b| {
        b.mean_likes
            .total_cmp(&a.mean_likes)
            .then_with(|| a.account.cmp(&b.account))
    });
    summaries
}
