pub mod health;
pub mod scoring;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Inspection
        .route("/api/v1/sections", post(scoring::handle_sections))
        .route("/api/v1/requirements", post(scoring::handle_requirements))
        .route("/api/v1/skills/extract", post(scoring::handle_extract_skills))
        // Scoring
        .route("/api/v1/score", post(scoring::handle_score))
        .route("/api/v1/rank", post(scoring::handle_rank))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::{CanonicalSkillMap, RelevanceEngine, ScoreWeights, SkillCanonicalizer};
    use crate::embedding::HashingEmbedder;

    const SKILL_MAP: &str = r#"{
        "Python": ["python3"],
        "SQL": ["postgresql"],
        "Docker": ["containers"]
    }"#;

    const JD: &str = "Backend Engineer\nMust-have:\nPython, SQL\nNice-to-have:\nDocker";

    fn app() -> Router {
        let map = CanonicalSkillMap::from_json_str(SKILL_MAP).unwrap();
        let canonicalizer = SkillCanonicalizer::new(map, 80.0).unwrap();
        let engine = RelevanceEngine::new(Arc::new(canonicalizer), Arc::new(HashingEmbedder::new(64)));
        build_router(AppState::new(engine, ScoreWeights::default()))
    }

    async fn send(method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send("GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        // Canonical names plus synonyms.
        assert_eq!(body["skill_vocabulary"], 6);
        assert_eq!(body["embedding_dimension"], 64);
    }

    #[tokio::test]
    async fn test_sections_endpoint() {
        let (status, body) = send(
            "POST",
            "/api/v1/sections",
            Some(json!({ "text": "Jane Doe\nSkills:\nPython\nEducation\nBSc" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["skills"], "Python");
        assert_eq!(body["education"], "BSc");
        assert_eq!(body["other"], "Jane Doe");
    }

    #[tokio::test]
    async fn test_requirements_endpoint() {
        let (status, body) = send("POST", "/api/v1/requirements", Some(json!({ "jd_text": JD }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["raw"]["must"], json!(["python", "sql"]));
        assert_eq!(body["canonical"]["must"], json!(["Python", "SQL"]));
        assert_eq!(body["canonical"]["nice"], json!(["Docker"]));
    }

    #[tokio::test]
    async fn test_extract_skills_endpoint() {
        let (status, body) = send(
            "POST",
            "/api/v1/skills/extract",
            Some(json!({ "text": "python3, postgresql\nships containers" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["skills"], json!(["Docker", "Python", "SQL"]));
    }

    #[tokio::test]
    async fn test_score_endpoint() {
        let (status, body) = send(
            "POST",
            "/api/v1/score",
            Some(json!({
                "resume_text": "Skills\nPython3, PostgreSQL",
                "jd_text": JD,
                "weights": { "hard": 1.0, "semantic": 0.0 }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["filename"], "resume");
        assert_eq!(body["result"]["hard"]["must_matched"], json!(["Python", "SQL"]));
        assert_eq!(body["result"]["hard"]["nice_missing"], json!(["Docker"]));
        // Full must coverage, no nice coverage.
        assert_eq!(body["result"]["final_score"], 50);
        assert_eq!(body["result"]["verdict"], "Low");
    }

    #[tokio::test]
    async fn test_score_rejects_empty_jd() {
        let (status, body) = send(
            "POST",
            "/api/v1/score",
            Some(json!({ "resume_text": "Skills\nPython", "jd_text": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_score_rejects_out_of_range_weights() {
        let (status, body) = send(
            "POST",
            "/api/v1/score",
            Some(json!({
                "resume_text": "Skills\nPython",
                "jd_text": JD,
                "weights": { "hard": 1.5, "semantic": -0.5 }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].as_str().unwrap().contains("weights.hard"));
    }

    #[tokio::test]
    async fn test_rank_endpoint_orders_candidates() {
        let (status, body) = send(
            "POST",
            "/api/v1/rank",
            Some(json!({
                "jd_text": JD,
                "resumes": [
                    { "filename": "weak.txt", "text": "Skills\nCobol" },
                    { "filename": "strong.txt", "text": "Skills\nPython, SQL, Docker" }
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let candidates = body["candidates"].as_array().unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0]["filename"], "strong.txt");
        assert_eq!(candidates[1]["filename"], "weak.txt");
        assert!(body["batch_id"].is_string());
    }

    #[tokio::test]
    async fn test_rank_rejects_empty_batch() {
        let (status, _) = send("POST", "/api/v1/rank", Some(json!({ "jd_text": JD, "resumes": [] }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
