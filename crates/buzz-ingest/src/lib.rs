//! Post ingestion: spreadsheet and CSV exports, the tweet search API, and the
//! blocklist/dedupe filters applied before storage.

pub mod client;
pub mod columns;
pub mod error;
pub mod file;
pub mod filter;
pub(crate) mod retry;
pub mod types;

pub use client::{build_search_query, FetchOutcome, TwitterApiClient};
pub use columns::ColumnMap;
pub use error::IngestError;
pub use file::{read_posts_file, IngestedFile};
pub use filter::{apply_filters, dedupe_posts, keep_top_per_account, BlockList, FilterOutcome};
pub use types::{ApiAuthor, ApiTweet, TweetPage};
