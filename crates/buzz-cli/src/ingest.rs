//! Ingest command handlers: file import, API fetches and stored-post dedupe.
//!
//! Every path runs the same filter chain (block list, then duplicate
//! collapse) before anything is written. A failed API page ends that
//! keyword's or account's fetch early; posts collected so far are kept.

use std::path::Path;

use buzz_core::{AppConfig, Post};
use buzz_ingest::{
    apply_filters, build_search_query, keep_top_per_account, BlockList, FetchOutcome,
    TwitterApiClient,
};
use sqlx::SqlitePool;

/// Filter `posts` and store them unless `dry_run`. With `top_per_account`
/// only each account's most-liked surviving post is kept.
async fn filter_and_store(
    pool: &SqlitePool,
    posts: Vec<Post>,
    top_per_account: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let collected = posts.len();
    let mut outcome = apply_filters(posts, &BlockList::builtin());
    if top_per_account {
        let before = outcome.posts.len();
        outcome.posts = keep_top_per_account(outcome.posts);
        tracing::info!(before, after = outcome.posts.len(), "kept top post per account");
    }
    println!(
        "collected {collected}, blocked {}, duplicates {}, kept {}",
        outcome.blocked,
        outcome.duplicates,
        outcome.posts.len()
    );

    if dry_run {
        println!("dry-run: nothing written");
        for post in outcome.posts.iter().take(5) {
            let preview: String = post.text.chars().take(40).collect();
            println!("  @{:<20}{:>8}  {}", post.account, post.likes, preview.replace('\n', " "));
        }
        return Ok(());
    }

    let summary = buzz_db::import_posts(pool, &outcome.posts).await?;
    println!(
        "inserted {}, already stored {}",
        summary.inserted, summary.skipped
    );
    Ok(())
}

/// Import a CSV or XLSX export.
///
/// # Errors
///
/// Returns an error if the file cannot be read, lacks a text column, or the
/// database write fails.
pub(crate) async fn run_import(pool: &SqlitePool, file: &Path, dry_run: bool) -> anyhow::Result<()> {
    let ingested = buzz_ingest::read_posts_file(file)?;
    println!(
        "{}: {} rows, {} without text",
        ingested.source_file, ingested.rows_read, ingested.skipped_empty
    );
    filter_and_store(pool, ingested.posts, false, dry_run).await
}

fn report_partial(label: &str, outcome: &FetchOutcome) {
    if let Some(err) = &outcome.error {
        eprintln!(
            "warning: {label} stopped after {} page(s): {err}; keeping {} post(s)",
            outcome.pages,
            outcome.posts.len()
        );
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SearchOptions {
    pub min_faves: u64,
    pub max_pages: usize,
    /// Sample one post per author so prolific accounts do not dominate.
    pub top_per_account: bool,
    pub dry_run: bool,
}

/// Search each keyword in turn and store the results.
///
/// # Errors
///
/// Returns an error if no API key is configured or the database write fails.
/// API failures end the affected keyword's fetch early and are reported as
/// warnings.
pub(crate) async fn run_fetch_search(
    pool: &SqlitePool,
    config: &AppConfig,
    keywords: &[String],
    options: SearchOptions,
) -> anyhow::Result<()> {
    let client = TwitterApiClient::from_config(config)?;
    let mut posts = Vec::new();

    for (i, keyword) in keywords.iter().enumerate() {
        if i > 0 {
            client.pause().await;
        }
        let query = build_search_query(keyword, options.min_faves);
        let outcome = client.fetch_all_search(&query, options.max_pages).await;
        report_partial(&format!("search '{keyword}'"), &outcome);
        println!("{:<30}{:>4} page(s){:>6} post(s)", keyword, outcome.pages, outcome.posts.len());
        posts.extend(outcome.posts);
    }

    filter_and_store(pool, posts, options.top_per_account, options.dry_run).await
}

/// Fetch each account's latest posts and store them.
///
/// # Errors
///
/// Same as [`run_fetch_search`].
pub(crate) async fn run_fetch_user(
    pool: &SqlitePool,
    config: &AppConfig,
    accounts: &[String],
    max_pages: usize,
    dry_run: bool,
) -> anyhow::Result<()> {
    let client = TwitterApiClient::from_config(config)?;
    let mut posts = Vec::new();

    for (i, account) in accounts.iter().enumerate() {
        if i > 0 {
            client.pause().await;
        }
        let outcome = client.fetch_all_user_tweets(account, max_pages).await;
        report_partial(&format!("account '{account}'"), &outcome);
        println!("@{:<29}{:>4} page(s){:>6} post(s)", account.trim_start_matches('@'), outcome.pages, outcome.posts.len());
        posts.extend(outcome.posts);
    }

    filter_and_store(pool, posts, false, dry_run).await
}

/// Delete stored near-duplicates.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub(crate) async fn run_dedupe(pool: &SqlitePool) -> anyhow::Result<()> {
    let before = buzz_db::count_posts(pool).await?;
    let deleted = buzz_db::delete_near_duplicates(pool).await?;
    println!(
        "deleted {deleted} near-duplicate post(s) (same account, same first {} characters); {} remain",
        buzz_db::NEAR_DUPLICATE_PREFIX_CHARS,
        before - i64::try_from(deleted).unwrap_or(0)
    );
    Ok(())
}
