//! Ad hoc scoring of pasted text.

use std::io::Read as _;
use std::str::FromStr;
use std::sync::Arc;

use buzz_scorer::psychology::Reaction;
use buzz_scorer::{
    build_all_scorers, build_scorer, extract_features, ReaderPsychologyScorer, RuleSet,
    ScoreResult, ScorerKind, UnknownStrategy,
};

/// `--strategy` value: one strategy or all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StrategyChoice {
    All,
    One(ScorerKind),
}

impl FromStr for StrategyChoice {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::One)
        }
    }
}

impl StrategyChoice {
    fn kinds(self) -> Vec<ScorerKind> {
        match self {
            Self::All => ScorerKind::ALL.to_vec(),
            Self::One(kind) => vec![kind],
        }
    }
}

/// The text argument itself, or stdin when it is `-`.
pub(crate) fn read_text_arg(arg: &str) -> anyhow::Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    Ok(text.trim_end_matches(['\r', '\n']).to_string())
}

fn print_result(result: &ScoreResult) {
    println!("[{}] {}/100", result.strategy, result.total_score);
    for factor in &result.factors {
        println!("  {:<28}{:>+5}", factor.name, factor.points);
    }
    if let Some(hour) = result.posted_hour {
        println!("  {:<28}{:>5}", "posted_hour (reference)", hour);
    }
}

/// Score `text` and print a factor table per strategy.
///
/// # Errors
///
/// Returns an error only when JSON output cannot be serialised.
pub(crate) fn run_score(
    text: &str,
    strategy: StrategyChoice,
    posted_at: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let rules = Arc::new(RuleSet::new());
    let results: Vec<ScoreResult> = strategy
        .kinds()
        .into_iter()
        .map(|kind| build_scorer(kind, Arc::clone(&rules)).score(text, posted_at))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    let features = extract_features(&rules, text);
    println!(
        "{} chars, {} line breaks, opening {}, category {}",
        features.char_count, features.line_breaks, features.opening, features.category
    );
    for result in &results {
        println!();
        print_result(result);
    }
    Ok(())
}

/// Print the reader-psychology breakdown of `text`.
///
/// # Errors
///
/// Returns an error only when JSON output cannot be serialised.
pub(crate) fn run_psych(text: &str, json: bool) -> anyhow::Result<()> {
    let scorer = ReaderPsychologyScorer::new(Arc::new(RuleSet::new()));
    let report = scorer.analyze(text);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("why: {}", report.one_line_why);
    println!("primary emotion: {}", report.primary_emotion);
    println!("tone: {}", report.tone);
    for reaction in Reaction::ALL {
        let hits = report.hits(reaction);
        if hits.is_empty() {
            continue;
        }
        println!();
        println!("{}:", reaction.as_str());
        for hit in hits {
            println!("  {:<24}{}", hit.trigger, hit.explanation);
        }
    }
    if report.trigger_count() == 0 {
        println!();
        println!("no reader triggers matched");
    }
    Ok(())
}

/// Score two drafts with every strategy and print the difference.
pub(crate) fn run_compare(a: &str, b: &str) {
    let rules = Arc::new(RuleSet::new());
    let features_a = extract_features(&rules, a);
    let features_b = extract_features(&rules, b);

    println!("{:<14}{:>8}{:>8}{:>8}", "STRATEGY", "A", "B", "B-A");
    for scorer in build_all_scorers(&rules) {
        let score_a = scorer.score(a, None).total_score;
        let score_b = scorer.score(b, None).total_score;
        println!(
            "{:<14}{:>8}{:>8}{:>+8}",
            scorer.name(),
            score_a,
            score_b,
            score_b - score_a
        );
    }

    println!();
    println!("{:<14}{:<20}{:<20}", "FEATURE", "A", "B");
    println!("{:<14}{:<20}{:<20}", "opening", features_a.opening.as_str(), features_b.opening.as_str());
    println!("{:<14}{:<20}{:<20}", "category", features_a.category.as_str(), features_b.category.as_str());
    println!("{:<14}{:<20}{:<20}", "length", features_a.char_count, features_b.char_count);
    println!("{:<14}{:<20}{:<20}", "question", features_a.has_question, features_b.has_question);
    println!("{:<14}{:<20}{:<20}", "cta", features_a.has_cta(), features_b.has_cta());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_choice_parses_all_and_single() {
        assert_eq!("all".parse::<StrategyChoice>().unwrap(), StrategyChoice::All);
        assert_eq!(
            "algo".parse::<StrategyChoice>().unwrap(),
            StrategyChoice::One(ScorerKind::Algorithm)
        );
        assert!("v9".parse::<StrategyChoice>().is_err());
    }

    #[test]
    fn all_expands_to_every_strategy() {
        assert_eq!(StrategyChoice::All.kinds(), ScorerKind::ALL.to_vec());
        assert_eq!(
            StrategyChoice::One(ScorerKind::V2).kinds(),
            vec![ScorerKind::V2]
        );
    }

    #[test]
    fn literal_text_is_returned_as_is() {
        assert_eq!(read_text_arg("hello").unwrap(), "hello");
    }
}
