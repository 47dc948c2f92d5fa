use axum::{
    extract::{Query, State},
    Extension, Json,
};
use buzz_report::{group_by, Dimension, GroupStats};
use serde::{Deserialize, Serialize};

use super::{map_db_error, ApiError, ApiResponse, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct AggregatesQuery {
    by: Option<String>,
    account: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct AggregatesData {
    dimension: Dimension,
    post_count: usize,
    groups: Vec<GroupStats>,
}

/// Engagement per group of stored posts along one dimension (default
/// `category`).
pub(super) async fn list_aggregates(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<AggregatesQuery>,
) -> Result<Json<ApiResponse<AggregatesData>>, ApiError> {
    let dimension = match query.by.as_deref().map(str::trim) {
        None | Some("") => Dimension::Category,
        Some(raw) => raw
            .parse::<Dimension>()
            .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?,
    };
    let account = query
        .account
        .as_deref()
        .map(|a| a.trim().trim_start_matches('@'))
        .filter(|a| !a.is_empty());

    let posts: Vec<_> = buzz_db::list_posts(&state.pool, account, None)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .into_iter()
        .map(buzz_db::PostRow::into_post)
        .collect();

    let groups = group_by(&posts, dimension, &state.rules, state.utc_offset);
    tracing::debug!(%dimension, posts = posts.len(), groups = groups.len(), "aggregated posts");

    Ok(Json(ApiResponse::new(
        req_id.0,
        AggregatesData {
            dimension,
            post_count: posts.len(),
            groups,
        },
    )))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use buzz_core::Post;

    use super::super::test_support::{get, send, test_state};

    #[tokio::test]
    async fn groups_by_requested_dimension() {
        let state = test_state().await;
        let posts: Vec<Post> = [("alice", 100), ("alice", 200), ("bob", 30)]
            .iter()
            .enumerate()
            .map(|(i, (account, likes))| Post {
                likes: *likes,
                created_at: "2026-02-17 21:00:00".to_string(),
                ..Post::new(*account, format!("post number {i}"))
            })
            .collect();
        buzz_db::import_posts(&state.pool, &posts)
            .await
            .expect("seed posts");

        let (status, json) = send(state, get("/api/v1/aggregates?by=account")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["dimension"], "account");
        assert_eq!(json["data"]["post_count"], 3);
        let groups = json["data"]["groups"].as_array().expect("groups array");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0]["key"], "alice");
        assert_eq!(groups[0]["count"], 2);
        assert_eq!(groups[0]["mean_likes"], 150.0);
    }

    #[tokio::test]
    async fn defaults_to_category() {
        let (status, json) = send(test_state().await, get("/api/v1/aggregates")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["dimension"], "category");
        assert_eq!(json["data"]["groups"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn unknown_dimension_is_a_validation_error() {
        let (status, json) = send(test_state().await, get("/api/v1/aggregates?by=colour")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }
}
