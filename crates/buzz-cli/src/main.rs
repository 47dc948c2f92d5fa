mod ingest;
mod report;
mod score;

use std::path::PathBuf;

use buzz_report::Dimension;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use score::StrategyChoice;

#[derive(Debug, Parser)]
#[command(name = "buzz")]
#[command(about = "Score, collect and report on high-engagement posts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database utilities
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Import posts from a CSV or XLSX export
    Import {
        /// Path to the export file
        file: PathBuf,
        /// Read and filter the file without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Fetch posts from the search API
    Fetch {
        #[command(subcommand)]
        command: FetchCommands,
    },
    /// Score a text with one or every strategy (`-` reads stdin)
    Score {
        text: String,
        /// v1, v2, algorithm, psychology or all
        #[arg(long, default_value = "all")]
        strategy: StrategyChoice,
        /// Posting time, e.g. "2026-02-17 21:00"
        #[arg(long)]
        posted_at: Option<String>,
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Explain which reader reactions a text is likely to trigger
    Psych {
        text: String,
        #[arg(long)]
        json: bool,
    },
    /// Score two drafts side by side
    Compare { a: String, b: String },
    /// Generate the Markdown analysis report from stored posts
    Report {
        /// Dimensions to group by (repeat or comma-separate)
        #[arg(long = "by", value_delimiter = ',')]
        by: Vec<Dimension>,
        /// Restrict the report to one account
        #[arg(long)]
        account: Option<String>,
        /// Number of top posts to break down
        #[arg(long, default_value = "10")]
        top: usize,
        /// Print to stdout instead of writing into the output directory
        #[arg(long)]
        stdout: bool,
    },
    /// Compare stored accounts
    Accounts {
        /// Minimum stored posts for an account to be listed
        #[arg(long, default_value = "5")]
        min_posts: usize,
    },
    /// Re-score every stored post and record each strategy's correlation
    /// with likes
    Recalc,
    /// Delete near-duplicate stored posts
    Dedupe,
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check the database connection
    Ping,
}

#[derive(Debug, Subcommand)]
enum FetchCommands {
    /// Search recent Japanese posts by keyword
    Search {
        /// Keyword to search for (repeatable)
        #[arg(long = "keyword", required = true)]
        keywords: Vec<String>,
        /// Minimum likes a post must have
        #[arg(long, default_value = "500")]
        min_faves: u64,
        #[arg(long, default_value = "5")]
        max_pages: usize,
        /// Keep only each account's most-liked post
        #[arg(long)]
        top_per_account: bool,
        /// Fetch and filter without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Fetch the latest posts of accounts
    User {
        /// Account name, with or without `@` (repeatable)
        #[arg(long = "account", required = true)]
        accounts: Vec<String>,
        #[arg(long, default_value = "3")]
        max_pages: usize,
        #[arg(long)]
        dry_run: bool,
    },
}

fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Connect to the configured database and bring its schema up to date.
async fn open_pool(config: &buzz_core::AppConfig) -> anyhow::Result<sqlx::SqlitePool> {
    let pool = buzz_db::connect_pool_from_config(config).await?;
    let applied = buzz_db::run_migrations(&pool).await?;
    if applied > 0 {
        tracing::info!(applied, "applied pending migrations");
    }
    Ok(pool)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = buzz_core::load_app_config()?;
    init_tracing(&config.log_level)?;

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Db { command }) => {
            let pool = buzz_db::connect_pool_from_config(&config).await?;
            match command {
                DbCommands::Migrate => {
                    let applied = buzz_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
                DbCommands::Ping => {
                    buzz_db::ping(&pool).await?;
                    println!("database ok: {}", config.database_url);
                }
            }
            pool.close().await;
        }
        Some(Commands::Import { file, dry_run }) => {
            let pool = open_pool(&config).await?;
            ingest::run_import(&pool, &file, dry_run).await?;
        }
        Some(Commands::Fetch { command }) => {
            let pool = open_pool(&config).await?;
            match command {
                FetchCommands::Search {
                    keywords,
                    min_faves,
                    max_pages,
                    top_per_account,
                    dry_run,
                } => {
                    let options = ingest::SearchOptions {
                        min_faves,
                        max_pages,
                        top_per_account,
                        dry_run,
                    };
                    ingest::run_fetch_search(&pool, &config, &keywords, options).await?;
                }
                FetchCommands::User {
                    accounts,
                    max_pages,
                    dry_run,
                } => {
                    ingest::run_fetch_user(&pool, &config, &accounts, max_pages, dry_run).await?;
                }
            }
        }
        Some(Commands::Score {
            text,
            strategy,
            posted_at,
            json,
        }) => {
            let text = score::read_text_arg(&text)?;
            score::run_score(&text, strategy, posted_at.as_deref(), json)?;
        }
        Some(Commands::Psych { text, json }) => {
            let text = score::read_text_arg(&text)?;
            score::run_psych(&text, json)?;
        }
        Some(Commands::Compare { a, b }) => score::run_compare(&a, &b),
        Some(Commands::Report {
            by,
            account,
            top,
            stdout,
        }) => {
            let pool = open_pool(&config).await?;
            report::run_report(&pool, &config, by, account.as_deref(), top, stdout).await?;
        }
        Some(Commands::Accounts { min_posts }) => {
            let pool = open_pool(&config).await?;
            report::run_accounts(&pool, min_posts).await?;
        }
        Some(Commands::Recalc) => {
            let pool = open_pool(&config).await?;
            report::run_recalc(&pool, &config).await?;
        }
        Some(Commands::Dedupe) => {
            let pool = open_pool(&config).await?;
            ingest::run_dedupe(&pool).await?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
