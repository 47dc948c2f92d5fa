use axum::{
    extract::{Query, State},
    Extension, Json,
};
use buzz_scorer::{Category, OpeningPattern};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct PostsQuery {
    account: Option<String>,
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct PostItem {
    id: i64,
    account: String,
    text: String,
    likes: i64,
    retweets: i64,
    replies: i64,
    impressions: i64,
    date: String,
    source_file: Option<String>,
    added_at: DateTime<Utc>,
    category: Category,
    opening: OpeningPattern,
}

/// Stored posts, most-liked first.
pub(super) async fn list_posts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PostsQuery>,
) -> Result<Json<ApiResponse<Vec<PostItem>>>, ApiError> {
    let account = query
        .account
        .as_deref()
        .map(|a| a.trim().trim_start_matches('@'))
        .filter(|a| !a.is_empty());
    let limit = normalize_limit(query.limit);

    let rows = buzz_db::list_posts(&state.pool, account, Some(limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let items = rows
        .into_iter()
        .map(|row| PostItem {
            category: state.rules.classify_category(&row.text),
            opening: state.rules.classify_opening(&row.text),
            id: row.id,
            account: row.account,
            text: row.text,
            likes: row.likes,
            retweets: row.retweets,
            replies: row.replies,
            impressions: row.impressions,
            date: row.date,
            source_file: row.source_file,
            added_at: row.added_at,
        })
        .collect();

    Ok(Json(ApiResponse::new(req_id.0, items)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use buzz_core::Post;

    use super::super::test_support::{get, send, test_state};

    fn post(account: &str, text: &str, likes: u64) -> Post {
        Post {
            likes,
            created_at: "2026-02-17 21:00:00".to_string(),
            ..Post::new(account, text)
        }
    }

    #[tokio::test]
    async fn lists_posts_by_likes_with_account_filter() {
        let state = test_state().await;
        buzz_db::import_posts(
            &state.pool,
            &[
                post("alice", "first", 10),
                post("alice", "second", 300),
                post("bob", "third", 50),
            ],
        )
        .await
        .expect("seed posts");

        let (status, json) = send(state.clone(), get("/api/v1/posts")).await;
        assert_eq!(status, StatusCode::OK);
        let likes: Vec<i64> = json["data"]
            .as_array()
            .expect("data array")
            .iter()
            .filter_map(|p| p["likes"].as_i64())
            .collect();
        assert_eq!(likes, vec![300, 50, 10]);
        assert!(json["data"][0]["category"].is_string());

        let (status, json) = send(state, get("/api/v1/posts?account=@alice&limit=1")).await;
        assert_eq!(status, StatusCode::OK);
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["text"], "second");
    }

    #[tokio::test]
    async fn empty_database_returns_empty_list() {
        let (status, json) = send(test_state().await, get("/api/v1/posts")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().map(Vec::len), Some(0));
    }
}
