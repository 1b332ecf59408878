//! Axum route handlers for the scoring API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::analysis::{
    requirements, sections, CandidateEvaluation, RankingReport, RequirementSet, ResumeDocument,
    ScoreWeights, SectionMap, SkillSet,
};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct RequirementsRequest {
    pub jd_text: String,
}

#[derive(Debug, Serialize)]
pub struct RequirementsResponse {
    pub raw: RequirementSet,
    pub canonical: RequirementSet,
}

#[derive(Debug, Serialize)]
pub struct SkillsResponse {
    pub skills: SkillSet,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub resume_text: String,
    pub jd_text: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub weights: Option<ScoreWeights>,
}

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub jd_text: String,
    pub resumes: Vec<ResumeDocument>,
    #[serde(default)]
    pub weights: Option<ScoreWeights>,
}

fn require_text(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Request weights override the configured default. Each must lie in `0.0..=1.0`.
fn resolve_weights(requested: Option<ScoreWeights>, default: ScoreWeights) -> Result<ScoreWeights, AppError> {
    let weights = requested.unwrap_or(default);
    for (name, value) in [("hard", weights.hard), ("semantic", weights.semantic)] {
        if !(0.0..=1.0).contains(&value) {
            return Err(AppError::Validation(format!(
                "weights.{name} must be between 0.0 and 1.0, got {value}"
            )));
        }
    }
    Ok(weights)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sections
///
/// Splits résumé text into the fixed section vocabulary. Empty text is valid.
pub async fn handle_sections(Json(request): Json<TextRequest>) -> Json<SectionMap> {
    Json(sections::segment(&sections::normalize_text(&request.text)))
}

/// POST /api/v1/requirements
///
/// Previews must-have / nice-to-have extraction before scoring.
pub async fn handle_requirements(
    State(state): State<AppState>,
    Json(request): Json<RequirementsRequest>,
) -> Result<Json<RequirementsResponse>, AppError> {
    require_text(&request.jd_text, "jd_text")?;

    let raw = requirements::extract(&sections::normalize_text(&request.jd_text));
    let canonical = raw.canonicalize(state.engine.canonicalizer());

    Ok(Json(RequirementsResponse { raw, canonical }))
}

/// POST /api/v1/skills/extract
pub async fn handle_extract_skills(
    State(state): State<AppState>,
    Json(request): Json<TextRequest>,
) -> Json<SkillsResponse> {
    Json(SkillsResponse {
        skills: state.engine.canonicalizer().extract_from_text(&request.text),
    })
}

/// POST /api/v1/score
///
/// Scores a single résumé against a JD.
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<CandidateEvaluation>, AppError> {
    require_text(&request.jd_text, "jd_text")?;
    require_text(&request.resume_text, "resume_text")?;

    let weights = resolve_weights(request.weights, state.default_weights)?;
    let job = state.engine.prepare_job(&request.jd_text).await?;
    let filename = request.filename.as_deref().unwrap_or("resume");
    let evaluation = state
        .engine
        .evaluate(&job, filename, &request.resume_text, weights)
        .await?;

    Ok(Json(evaluation))
}

/// POST /api/v1/rank
///
/// Scores a batch of résumés against one JD and returns them best-first.
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(request): Json<RankRequest>,
) -> Result<Json<RankingReport>, AppError> {
    require_text(&request.jd_text, "jd_text")?;
    if request.resumes.is_empty() {
        return Err(AppError::Validation("resumes cannot be empty".to_string()));
    }

    let weights = resolve_weights(request.weights, state.default_weights)?;
    let report = state
        .engine
        .rank(&request.jd_text, &request.resumes, weights)
        .await?;

    Ok(Json(report))
}
