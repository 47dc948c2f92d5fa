use axum::{
    extract::{Query, State},
    Extension, Json,
};
use buzz_db::ScoreHistoryRow;
use serde::Deserialize;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct ScoreHistoryQuery {
    limit: Option<i64>,
}

/// Recorded strategy correlations, newest first.
pub(super) async fn list_score_history(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ScoreHistoryQuery>,
) -> Result<Json<ApiResponse<Vec<ScoreHistoryRow>>>, ApiError> {
    let limit = normalize_limit(query.limit);
    let rows = buzz_db::list_score_history(&state.pool, limit)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse::new(req_id.0, rows)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use buzz_db::NewScoreHistory;

    use super::super::test_support::{get, send, test_state};

    #[tokio::test]
    async fn returns_recorded_entries_with_limit() {
        let state = test_state().await;
        for (version, correlation) in [("v1", Some(0.12)), ("v2", None)] {
            buzz_db::insert_score_history(
                &state.pool,
                &NewScoreHistory {
                    version: version.to_string(),
                    correlation,
                    sample_size: 40,
                    notes: None,
                },
            )
            .await
            .expect("insert history");
        }

        let (status, json) = send(state.clone(), get("/api/v1/score-history")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().map(Vec::len), Some(2));

        let (_, json) = send(state, get("/api/v1/score-history?limit=1")).await;
        assert_eq!(json["data"].as_array().map(Vec::len), Some(1));
    }
}
