//! Database operations for `score_history`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::DbError;

/// One recorded scorer evaluation: how well a strategy's scores tracked
/// likes at the time.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ScoreHistoryRow {
    pub id: i64,
    pub version: String,
    pub correlation: Option<f64>,
    pub sample_size: i64,
    pub recorded_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewScoreHistory {
    pub version: String,
    /// `None` when the sample was too small or had no variance.
    pub correlation: Option<f64>,
    pub sample_size: i64,
    pub notes: Option<String>,
}

/// Record an evaluation and return the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_score_history(
    pool: &SqlitePool,
    entry: &NewScoreHistory,
) -> Result<ScoreHistoryRow, DbError> {
    let row = sqlx::query_as::<_, ScoreHistoryRow>(
        "INSERT INTO score_history (version, correlation, sample_size, recorded_at, notes) \
         VALUES (?1, ?2, ?3, ?4, ?5) \
         RETURNING id, version, correlation, sample_size, recorded_at, notes",
    )
    .bind(&entry.version)
    .bind(entry.correlation)
    .bind(entry.sample_size)
    .bind(Utc::now())
    .bind(entry.notes.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Evaluations, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_score_history(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<ScoreHistoryRow>, DbError> {
    let rows = sqlx::query_as::<_, ScoreHistoryRow>(
        "SELECT id, version, correlation, sample_size, recorded_at, notes \
         FROM score_history \
         ORDER BY recorded_at DESC, id DESC \
         LIMIT ?1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect_memory_pool;

    fn entry(version: &str, correlation: Option<f64>) -> NewScoreHistory {
        NewScoreHistory {
            version: version.to_string(),
            correlation,
            sample_size: 120,
            notes: None,
        }
    }

    #[tokio::test]
    async fn insert_returns_stored_row() {
        let pool = connect_memory_pool().await.unwrap();

        let row = insert_score_history(
            &pool,
            &NewScoreHistory {
                notes: Some("weekly recalc".to_string()),
                ..entry("v2", Some(0.42))
            },
        )
        .await
        .unwrap();

        assert!(row.id > 0);
        assert_eq!(row.version, "v2");
        assert_eq!(row.correlation, Some(0.42));
        assert_eq!(row.sample_size, 120);
        assert_eq!(row.notes.as_deref(), Some("weekly recalc"));
    }

    #[tokio::test]
    async fn list_is_newest_first_and_limited() {
        let pool = connect_memory_pool().await.unwrap();
        for version in ["v1", "v2", "algorithm"] {
            insert_score_history(&pool, &entry(version, None)).await.unwrap();
        }

        let rows = list_score_history(&pool, 2).await.unwrap();
        let versions: Vec<&str> = rows.iter().map(|r| r.version.as_str()).collect();
        assert_eq!(versions, vec!["algorithm", "v2"]);
        assert!(rows.iter().all(|r| r.correlation.is_none()));
    }
}
