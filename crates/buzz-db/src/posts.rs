//! Database operations for `posts`.

use buzz_core::Post;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::DbError;

/// Posts whose texts agree on this many leading characters (same account)
/// are treated as near-duplicates.
pub const NEAR_DUPLICATE_PREFIX_CHARS: i64 = 50;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `posts` table.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub account: String,
    pub text: String,
    pub likes: i64,
    pub retweets: i64,
    pub replies: i64,
    pub impressions: i64,
    /// Raw posting timestamp as ingested.
    pub date: String,
    pub source_file: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl PostRow {
    #[must_use]
    pub fn into_post(self) -> Post {
        Post {
            text: self.text,
            account: self.account,
            likes: to_count(self.likes),
            retweets: to_count(self.retweets),
            replies: to_count(self.replies),
            impressions: to_count(self.impressions),
            created_at: self.date,
            url: None,
            source: self.source_file,
        }
    }
}

/// Number of posts stored for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct AccountCount {
    pub account: String,
    pub post_count: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn to_column(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

// ---------------------------------------------------------------------------
// posts operations
// ---------------------------------------------------------------------------

/// Insert `post` unless a row with the same `(text, account)` already exists.
///
/// Returns `true` when a row was inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_post_if_new(pool: &SqlitePool, post: &Post) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO posts \
             (account, text, likes, retweets, replies, impressions, date, source_file, added_at) \
         SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9 \
         WHERE NOT EXISTS (SELECT 1 FROM posts WHERE text = ?2 AND account = ?1)",
    )
    .bind(&post.account)
    .bind(&post.text)
    .bind(to_column(post.likes))
    .bind(to_column(post.retweets))
    .bind(to_column(post.replies))
    .bind(to_column(post.impressions))
    .bind(&post.created_at)
    .bind(post.source.as_deref())
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Insert each post that is not already stored.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on the first failed insert. Posts inserted
/// before the failure stay inserted.
pub async fn import_posts(pool: &SqlitePool, posts: &[Post]) -> Result<ImportSummary, DbError> {
    let mut summary = ImportSummary::default();
    for post in posts {
        if insert_post_if_new(pool, post).await? {
            summary.inserted += 1;
        } else {
            summary.skipped += 1;
        }
    }
    tracing::info!(
        inserted = summary.inserted,
        skipped = summary.skipped,
        "imported posts"
    );
    Ok(summary)
}

/// Posts ordered by likes descending, optionally for one account.
///
/// `limit` of `None` returns every matching row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_posts(
    pool: &SqlitePool,
    account: Option<&str>,
    limit: Option<i64>,
) -> Result<Vec<PostRow>, DbError> {
    let rows = sqlx::query_as::<_, PostRow>(
        "SELECT id, account, text, likes, retweets, replies, impressions, date, source_file, added_at \
         FROM posts \
         WHERE (?1 IS NULL OR account = ?1) \
         ORDER BY likes DESC, id ASC \
         LIMIT ?2",
    )
    .bind(account)
    .bind(limit.unwrap_or(-1))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_posts(pool: &SqlitePool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Accounts with their post counts, most prolific first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_accounts(pool: &SqlitePool) -> Result<Vec<AccountCount>, DbError> {
    let rows = sqlx::query_as::<_, AccountCount>(
        "SELECT account, COUNT(*) AS post_count \
         FROM posts \
         WHERE account <> '' \
         GROUP BY account \
         ORDER BY post_count DESC, account ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Delete near-duplicates: rows with the same account whose texts share the
/// first [`NEAR_DUPLICATE_PREFIX_CHARS`] characters. The lowest id survives.
///
/// Returns the number of rows deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_near_duplicates(pool: &SqlitePool) -> Result<u64, DbError> {
    let result = sqlx::query(
        "DELETE FROM posts \
         WHERE id NOT IN ( \
             SELECT MIN(id) FROM posts GROUP BY account, substr(text, 1, ?1) \
         )",
    )
    .bind(NEAR_DUPLICATE_PREFIX_CHARS)
    .execute(pool)
    .await?;

    let deleted = result.rows_affected();
    tracing::info!(deleted, "deleted near-duplicate posts");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect_memory_pool;

    fn post(account: &str, text: &str, likes: u64) -> Post {
        Post {
            likes,
            created_at: "2026-02-17 21:05:00".to_string(),
            source: Some("test.csv".to_string()),
            ..Post::new(account, text)
        }
    }

    #[tokio::test]
    async fn insert_skips_existing_text_and_account() {
        let pool = connect_memory_pool().await.unwrap();

        assert!(insert_post_if_new(&pool, &post("alice", "hello", 1)).await.unwrap());
        assert!(!insert_post_if_new(&pool, &post("alice", "hello", 99)).await.unwrap());
        assert!(insert_post_if_new(&pool, &post("bob", "hello", 1)).await.unwrap());
        assert_eq!(count_posts(&pool).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn import_reports_inserted_and_skipped() {
        let pool = connect_memory_pool().await.unwrap();
        let posts = vec![post("a", "one", 1), post("a", "two", 2), post("a", "one", 3)];

        let summary = import_posts(&pool, &posts).await.unwrap();
        assert_eq!(summary, ImportSummary { inserted: 2, skipped: 1 });

        let again = import_posts(&pool, &posts).await.unwrap();
        assert_eq!(again, ImportSummary { inserted: 0, skipped: 3 });
    }

    #[tokio::test]
    async fn list_posts_orders_by_likes_and_filters_account() {
        let pool = connect_memory_pool().await.unwrap();
        let posts = vec![post("a", "low", 1), post("b", "high", 50), post("a", "mid", 10)];
        import_posts(&pool, &posts).await.unwrap();

        let all = list_posts(&pool, None, None).await.unwrap();
        let likes: Vec<i64> = all.iter().map(|r| r.likes).collect();
        assert_eq!(likes, vec![50, 10, 1]);

        let only_a = list_posts(&pool, Some("a"), Some(1)).await.unwrap();
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].text, "mid");

        let round_trip = only_a[0].clone().into_post();
        assert_eq!(round_trip.likes, 10);
        assert_eq!(round_trip.created_at, "2026-02-17 21:05:00");
        assert_eq!(round_trip.source.as_deref(), Some("test.csv"));
    }

    #[tokio::test]
    async fn list_accounts_counts_posts() {
        let pool = connect_memory_pool().await.unwrap();
        let posts = vec![
            post("a", "1", 1),
            post("b", "2", 1),
            post("a", "3", 1),
            post("", "anonymous", 1),
        ];
        import_posts(&pool, &posts).await.unwrap();

        let accounts = list_accounts(&pool).await.unwrap();
        assert_eq!(
            accounts,
            vec![
                AccountCount { account: "a".into(), post_count: 2 },
                AccountCount { account: "b".into(), post_count: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn near_duplicates_keep_lowest_id() {
        let pool = connect_memory_pool().await.unwrap();
        let prefix = "あ".repeat(50);
        let posts = vec![
            post("a", &format!("{prefix} first"), 1),
            post("a", &format!("{prefix} second"), 5),
            post("b", &format!("{prefix} other account"), 1),
            post("a", "short and distinct", 1),
        ];
        import_posts(&pool, &posts).await.unwrap();

        assert_eq!(delete_near_duplicates(&pool).await.unwrap(), 1);
        let remaining = list_posts(&pool, Some("a"), None).await.unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().any(|r| r.text.ends_with("first")));
        assert!(!remaining.iter().any(|r| r.text.ends_with("second")));
    }
}
