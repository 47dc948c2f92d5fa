//! Report, account comparison and score-recalculation handlers.

use std::sync::Arc;

use buzz_core::{AppConfig, Post};
use buzz_report::{
    account_summaries, format_correlation, prepend_evolution_entry, render_analysis_report,
    render_evolution_entry, strategy_correlations, write_report, Dimension, ReportOptions,
    EVOLUTION_FILE_NAME,
};
use buzz_scorer::{build_all_scorers, RuleSet};
use chrono::Utc;
use sqlx::SqlitePool;

const REPORT_PREFIX: &str = "analysis";
const RECALC_NOTE: &str = "recalc";

async fn load_posts(pool: &SqlitePool, account: Option<&str>) -> anyhow::Result<Vec<Post>> {
    let rows = buzz_db::list_posts(pool, account, None).await?;
    Ok(rows.into_iter().map(buzz_db::PostRow::into_post).collect())
}

/// Render the analysis report from stored posts and write it to the output
/// directory (or stdout).
///
/// # Errors
///
/// Returns an error if the query fails or the report cannot be written.
pub(crate) async fn run_report(
    pool: &SqlitePool,
    config: &AppConfig,
    dimensions: Vec<Dimension>,
    account: Option<&str>,
    top: usize,
    to_stdout: bool,
) -> anyhow::Result<()> {
    let posts = load_posts(pool, account).await?;
    if posts.is_empty() {
        println!(
            "no posts stored{}; run `import` or `fetch` first",
            account.map(|a| format!(" for @{a}")).unwrap_or_default()
        );
        return Ok(());
    }

    let defaults = ReportOptions::default();
    let options = ReportOptions {
        title: account.map_or(defaults.title.clone(), |a| format!("{} for @{a}", defaults.title)),
        dimensions: if dimensions.is_empty() {
            defaults.dimensions.clone()
        } else {
            dimensions
        },
        top_n: top,
        utc_offset: config.utc_offset(),
        ..defaults
    };

    let rules = Arc::new(RuleSet::new());
    let now = Utc::now();
    let body = render_analysis_report(&posts, &rules, &options, now);

    if to_stdout {
        print!("{body}");
        return Ok(());
    }
    let date = now.with_timezone(&options.utc_offset).date_naive();
    let path = write_report(&config.output_dir, REPORT_PREFIX, date, &body)?;
    println!("report written: {} ({} posts)", path.display(), posts.len());
    Ok(())
}

/// Print a comparison table of stored accounts.
///
/// # Errors
///
/// Returns an error if the query fails.
pub(crate) async fn run_accounts(pool: &SqlitePool, min_posts: usize) -> anyhow::Result<()> {
    let posts = load_posts(pool, None).await?;
    let rules = Arc::new(RuleSet::new());
    let summaries = account_summaries(&posts, &rules, min_posts);

    if summaries.is_empty() {
        println!("no account has {min_posts} or more stored posts");
        return Ok(());
    }

    println!(
        "{:<22}{:>6}{:>10}{:>10}  {:<18}{:<14}{:>6}{:>7}",
        "ACCOUNT", "POSTS", "AVG LIKES", "MAX", "CATEGORY", "OPENING", "ALGO", "Q-RATE"
    );
    for s in &summaries {
        println!(
            "{:<22}{:>6}{:>10.1}{:>10}  {:<18}{:<14}{:>6.1}{:>6.0}%",
            format!("@{}", s.account),
            s.post_count,
            s.mean_likes,
            s.max_likes,
            s.top_category.as_str(),
            s.top_opening.as_str(),
            s.mean_algorithm_score,
            s.question_rate * 100.0
        );
    }
    Ok(())
}

/// Re-score every stored post, record each strategy's correlation with
/// likes, and prepend an entry to the score evolution log.
///
/// # Errors
///
/// Returns an error if the query or inserts fail, or the log cannot be
/// written.
pub(crate) async fn run_recalc(pool: &SqlitePool, config: &AppConfig) -> anyhow::Result<()> {
    let posts = load_posts(pool, None).await?;
    if posts.is_empty() {
        println!("no posts stored; run `import` or `fetch` first");
        return Ok(());
    }

    let rules = Arc::new(RuleSet::new());
    let correlations = strategy_correlations(&posts, &build_all_scorers(&rules));
    let sample_size = i64::try_from(posts.len()).unwrap_or(i64::MAX);

    println!("{} posts", posts.len());
    println!("{:<14}{:>12}{:>12}", "STRATEGY", "CORRELATION", "MEAN SCORE");
    for c in &correlations {
        buzz_db::insert_score_history(
            pool,
            &buzz_db::NewScoreHistory {
                version: c.strategy.to_string(),
                correlation: c.correlation,
                sample_size,
                notes: Some(RECALC_NOTE.to_string()),
            },
        )
        .await?;
        println!(
            "{:<14}{:>12}{:>12.1}",
            c.strategy,
            format_correlation(c.correlation),
            c.mean_score
        );
    }

    let recorded_at = Utc::now()
        .with_timezone(&config.utc_offset())
        .format("%Y-%m-%d %H:%M")
        .to_string();
    let entry = render_evolution_entry(&recorded_at, posts.len(), &correlations);
    let path = config.output_dir.join(EVOLUTION_FILE_NAME);
    prepend_evolution_entry(&path, &entry)?;
    println!("history updated: {}", path.display());
    Ok(())
}
