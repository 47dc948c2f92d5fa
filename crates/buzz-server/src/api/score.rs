use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use buzz_scorer::{
    build_scorer, extract_features, PostFeatures, PsychologyReport, ScoreResult, ScorerKind,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResponse, AppState};
use crate::middleware::RequestId;

/// Longest text accepted for ad hoc scoring, in characters.
const MAX_TEXT_CHARS: usize = 10_000;

#[derive(Debug, Deserialize)]
pub(super) struct ScoreRequest {
    text: String,
    /// One strategy name, or `all` (the default).
    strategy: Option<String>,
    posted_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PsychologyRequest {
    text: String,
}

#[derive(Debug, Serialize)]
pub(super) struct ScoreData {
    features: PostFeatures,
    results: Vec<ScoreResult>,
}

fn validate_text(req_id: &str, text: &str) -> Result<(), ApiError> {
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            format!("text must be at most {MAX_TEXT_CHARS} characters"),
        ));
    }
    Ok(())
}

fn parse_strategies(req_id: &str, raw: Option<&str>) -> Result<Vec<ScorerKind>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(ScorerKind::ALL.to_vec()),
        Some(s) if s.eq_ignore_ascii_case("all") => Ok(ScorerKind::ALL.to_vec()),
        Some(s) => s
            .parse::<ScorerKind>()
            .map(|kind| vec![kind])
            .map_err(|e| ApiError::new(req_id, "validation_error", e.to_string())),
    }
}

pub(super) async fn score_text(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ScoreRequest>,
) -> Result<Json<ApiResponse<ScoreData>>, ApiError> {
    validate_text(&req_id.0, &body.text)?;
    let kinds = parse_strategies(&req_id.0, body.strategy.as_deref())?;

    let results = kinds
        .into_iter()
        .map(|kind| {
            build_scorer(kind, Arc::clone(&state.rules))
                .score(&body.text, body.posted_at.as_deref())
        })
        .collect();
    let data = ScoreData {
        features: extract_features(&state.rules, &body.text),
        results,
    };

    Ok(Json(ApiResponse::new(req_id.0, data)))
}

pub(super) async fn analyze_psychology(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<PsychologyRequest>,
) -> Result<Json<ApiResponse<PsychologyReport>>, ApiError> {
    validate_text(&req_id.0, &body.text)?;
    let report = state.psychology.analyze(&body.text);
    Ok(Json(ApiResponse::new(req_id.0, report)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::super::test_support::{post_json, send, test_state};
    use super::*;

    #[test]
    fn missing_or_all_strategy_expands_to_every_kind() {
        assert_eq!(parse_strategies("r", None).unwrap().len(), 4);
        assert_eq!(parse_strategies("r", Some(" ALL ")).unwrap().len(), 4);
        assert_eq!(
            parse_strategies("r", Some("v2")).unwrap(),
            vec![ScorerKind::V2]
        );
        assert!(parse_strategies("r", Some("v9")).is_err());
    }

    #[tokio::test]
    async fn score_returns_one_result_per_strategy() {
        let (status, json) = send(
            test_state().await,
            post_json("/api/v1/score", &json!({ "text": "正直、これは知らなかった。どう思う？" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let results = json["data"]["results"].as_array().expect("results array");
        let names: Vec<&str> = results
            .iter()
            .filter_map(|r| r["strategy"].as_str())
            .collect();
        assert_eq!(names, vec!["v1", "v2", "algorithm", "psychology"]);
        for result in results {
            let total = result["total_score"].as_i64().expect("total score");
            assert!((0..=100).contains(&total));
        }
        assert!(json["data"]["features"]["char_count"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn score_accepts_a_single_strategy() {
        let (status, json) = send(
            test_state().await,
            post_json(
                "/api/v1/score",
                &json!({ "text": "hello", "strategy": "algorithm", "posted_at": "2026-02-17 21:00" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["results"].as_array().unwrap().len(), 1);
        assert_eq!(json["data"]["results"][0]["strategy"], "algorithm");
    }

    #[tokio::test]
    async fn unknown_strategy_is_a_validation_error() {
        let (status, json) = send(
            test_state().await,
            post_json("/api/v1/score", &json!({ "text": "hello", "strategy": "v9" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn oversized_text_is_rejected() {
        let text = "あ".repeat(MAX_TEXT_CHARS + 1);
        let (status, json) = send(
            test_state().await,
            post_json("/api/v1/psychology", &json!({ "text": text })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn psychology_returns_report() {
        let (status, json) = send(
            test_state().await,
            post_json("/api/v1/psychology", &json!({ "text": "" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["data"]["tone"].is_string());
        assert!(json["data"]["one_line_why"].is_string());
    }
}
