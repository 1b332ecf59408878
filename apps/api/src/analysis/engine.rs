//! Relevance engine: the long-lived handle that runs the full pipeline.
//!
//! JD:     normalize → extract requirements → canonicalize → embed (once per JD)
//! Résumé: normalize → segment → extract skills → embed → hard + semantic blend
//!
//! The engine owns no mutable state. Clone it freely; every clone shares the same
//! canonicalizer and embedding provider.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::requirements::{self, RequirementSet};
use crate::analysis::scoring::{self, ScoreResult, ScoreWeights};
use crate::analysis::sections::{self, Section, SectionMap};
use crate::analysis::skills::{SkillCanonicalizer, SkillSet};
use crate::embedding::{EmbeddingError, EmbeddingProvider};

/// A requirement document prepared for scoring many résumés.
#[derive(Debug, Clone)]
pub struct JobProfile {
    pub text: String,
    /// Raw lowercased tokens, before canonicalization.
    pub raw_requirements: RequirementSet,
    pub requirements: RequirementSet,
    embedding: Vec<f32>,
}

/// A candidate document to rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub filename: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateEvaluation {
    pub filename: String,
    pub result: ScoreResult,
    pub resume_skills: SkillSet,
    pub sections: SectionMap,
    pub experience_years: u32,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingReport {
    pub batch_id: Uuid,
    pub scored_at: DateTime<Utc>,
    pub requirements: RequirementSet,
    /// Sorted by `final_score`, highest first. Ties keep submission order.
    pub candidates: Vec<CandidateEvaluation>,
}

#[derive(Clone)]
pub struct RelevanceEngine {
    canonicalizer: Arc<SkillCanonicalizer>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl RelevanceEngine {
    pub fn new(canonicalizer: Arc<SkillCanonicalizer>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            canonicalizer,
            embedder,
        }
    }

    pub fn canonicalizer(&self) -> &SkillCanonicalizer {
        &self.canonicalizer
    }

    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    /// Skills in a résumé: the skills section when present, otherwise the whole text.
    pub fn resume_skills(&self, sections: &SectionMap, full_text: &str) -> SkillSet {
        let skills_text = sections.get(Section::Skills);
        let source = if skills_text.is_empty() {
            full_text
        } else {
            skills_text
        };
        self.canonicalizer.extract_from_text(source)
    }

    pub async fn prepare_job(&self, jd_text: &str) -> Result<JobProfile, EmbeddingError> {
        let text = sections::normalize_text(jd_text);
        let raw_requirements = requirements::extract(&text);
        let requirements = raw_requirements.canonicalize(&self.canonicalizer);
        let embedding = self.embedder.encode(&text).await?;

        debug!(
            "Prepared JD: {} must-have, {} nice-to-have requirements",
            requirements.must.len(),
            requirements.nice.len()
        );

        Ok(JobProfile {
            text,
            raw_requirements,
            requirements,
            embedding,
        })
    }

    pub async fn evaluate(
        &self,
        job: &JobProfile,
        filename: &str,
        resume_text: &str,
        weights: ScoreWeights,
    ) -> Result<CandidateEvaluation, EmbeddingError> {
        let text = sections::normalize_text(resume_text);
        let sections = sections::segment(&text);
        let resume_skills = self.resume_skills(&sections, &text);

        let hard = scoring::compute_hard_score(
            &resume_skills,
            &job.requirements.must,
            &job.requirements.nice,
        );
        let resume_embedding = self.embedder.encode(&text).await?;
        let similarity = scoring::cosine_sim(&resume_embedding, &job.embedding);
        let result = scoring::combine(hard, similarity, weights);

        debug!(
            "Scored {}: final={} verdict={:?} hard={} semantic={}",
            filename, result.final_score, result.verdict, result.hard.hard_score, result.semantic_score
        );

        Ok(CandidateEvaluation {
            filename: filename.to_string(),
            recommendations: scoring::build_recommendations(&result.hard),
            experience_years: sections::experience_years(sections.get(Section::Experience)),
            result,
            resume_skills,
            sections,
        })
    }

    /// Scores every document against one JD. The JD is parsed and embedded once.
    pub async fn rank(
        &self,
        jd_text: &str,
        documents: &[ResumeDocument],
        weights: ScoreWeights,
    ) -> Result<RankingReport, EmbeddingError> {
        let batch_id = Uuid::new_v4();
        info!("Ranking batch {batch_id}: {} résumés", documents.len());

        let job = self.prepare_job(jd_text).await?;

        let mut candidates = Vec::with_capacity(documents.len());
        for document in documents {
            candidates.push(
                self.evaluate(&job, &document.filename, &document.text, weights)
                    .await?,
            );
        }
        candidates.sort_by(|a, b| b.result.final_score.cmp(&a.result.final_score));

        info!("Ranking batch {batch_id} complete");

        Ok(RankingReport {
            batch_id,
            scored_at: Utc::now(),
            requirements: job.requirements,
            candidates,
        })
    }
}
