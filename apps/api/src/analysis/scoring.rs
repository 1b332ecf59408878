//! Hybrid scoring: lexical skill overlap ("hard") blended with embedding similarity ("semantic").
//!
//! hard_score     = 50 · |must ∩ skills| / max(1, |must|) + 50 · |nice ∩ skills| / max(1, |nice|)
//! semantic_score = cosine(embed(resume), embed(jd)) · 100
//! final_score    = round(w_hard · hard_score + w_semantic · semantic_score)
//!
//! Verdict thresholds are fixed: ≥80 High, ≥60 Medium, otherwise Low.

use serde::{Deserialize, Serialize};

use crate::analysis::skills::SkillSet;
use crate::embedding::{EmbeddingError, EmbeddingProvider};

const CATEGORY_POINTS: f64 = 50.0;
const HIGH_THRESHOLD: i64 = 80;
const MEDIUM_THRESHOLD: i64 = 60;

/// Blend weights. Callers keep `hard + semantic == 1.0`; it is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub hard: f64,
    pub semantic: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            hard: 0.6,
            semantic: 0.4,
        }
    }
}

impl ScoreWeights {
    /// Weights with `semantic = 1 - hard`.
    pub fn from_hard(hard: f64) -> Self {
        Self {
            hard,
            semantic: 1.0 - hard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    High,
    Medium,
    Low,
}

impl Verdict {
    pub fn from_score(final_score: i64) -> Self {
        if final_score >= HIGH_THRESHOLD {
            Verdict::High
        } else if final_score >= MEDIUM_THRESHOLD {
            Verdict::Medium
        } else {
            Verdict::Low
        }
    }
}

/// Requirement coverage. Matched/missing lists keep the requirement order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardScore {
    pub hard_score: f64,
    pub must_matched: Vec<String>,
    pub must_missing: Vec<String>,
    pub nice_matched: Vec<String>,
    pub nice_missing: Vec<String>,
}

/// Final result for one (résumé, JD) pair. Field names are a stable external contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub final_score: i64,
    pub verdict: Verdict,
    pub hard: HardScore,
    pub semantic_score: f64,
    pub semantic_sim: f64,
}

pub fn compute_hard_score(resume_skills: &SkillSet, jd_must: &[String], jd_nice: &[String]) -> HardScore {
    let (must_matched, must_missing) = partition(jd_must, resume_skills);
    let (nice_matched, nice_missing) = partition(jd_nice, resume_skills);

    let must_total = jd_must.len().max(1) as f64;
    let nice_total = jd_nice.len().max(1) as f64;

    let hard_score = CATEGORY_POINTS * must_matched.len() as f64 / must_total
        + CATEGORY_POINTS * nice_matched.len() as f64 / nice_total;

    HardScore {
        hard_score: round_to(hard_score, 2),
        must_matched,
        must_missing,
        nice_matched,
        nice_missing,
    }
}

fn partition(requirements: &[String], resume_skills: &SkillSet) -> (Vec<String>, Vec<String>) {
    requirements
        .iter()
        .cloned()
        .partition(|skill| resume_skills.contains(skill))
}

/// Cosine similarity. 0.0 when either vector is empty, has zero norm, or the
/// dimensions disagree. Not clamped: opposed vectors yield negative values.
pub fn cosine_sim(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Pure blend of a hard score and a precomputed similarity.
pub fn combine(hard: HardScore, semantic_sim: f64, weights: ScoreWeights) -> ScoreResult {
    let semantic_score = round_to(semantic_sim * 100.0, 2);
    let blended = weights.hard * hard.hard_score + weights.semantic * semantic_score;
    let final_score = blended.round_ties_even() as i64;

    ScoreResult {
        final_score,
        verdict: Verdict::from_score(final_score),
        hard,
        semantic_score,
        semantic_sim: round_to(semantic_sim, 4),
    }
}

/// Scores one résumé against one JD, embedding both texts through `embedder`.
///
/// Provider failures propagate unchanged.
pub async fn score(
    resume_text: &str,
    jd_text: &str,
    resume_skills: &SkillSet,
    jd_must: &[String],
    jd_nice: &[String],
    embedder: &dyn EmbeddingProvider,
    weights: ScoreWeights,
) -> Result<ScoreResult, EmbeddingError> {
    let hard = compute_hard_score(resume_skills, jd_must, jd_nice);
    let resume_vec = embedder.encode(resume_text).await?;
    let jd_vec = embedder.encode(jd_text).await?;
    Ok(combine(hard, cosine_sim(&resume_vec, &jd_vec), weights))
}

/// One suggestion per missing skill, must-haves first.
pub fn build_recommendations(hard: &HardScore) -> Vec<String> {
    let missing: Vec<&String> = hard.must_missing.iter().chain(&hard.nice_missing).collect();
    if missing.is_empty() {
        return vec!["Candidate already covers every listed requirement.".to_string()];
    }
    missing
        .into_iter()
        .map(|skill| {
            let kind = if hard.must_missing.contains(skill) {
                "must-have"
            } else {
                "nice-to-have"
            };
            format!("Build evidence of {skill} ({kind})")
        })
        .collect()
}

/// Half-to-even, like the final score.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
