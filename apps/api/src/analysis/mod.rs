// Hybrid relevance scoring core.
// Implements: section segmentation, requirement extraction, skill canonicalization,
// hard/semantic score blending, and the engine that runs them per JD and résumé.
// Embeddings always go through `crate::embedding`; nothing here calls a provider directly.

pub mod engine;
pub mod fuzzy;
pub mod requirements;
pub mod scoring;
pub mod sections;
pub mod skills;

// Re-export the public API consumed by handlers and library callers.
pub use engine::{CandidateEvaluation, JobProfile, RankingReport, RelevanceEngine, ResumeDocument};
pub use requirements::RequirementSet;
pub use scoring::{ScoreResult, ScoreWeights, Verdict};
pub use sections::{Section, SectionMap};
pub use skills::{CanonicalSkillMap, InlineScan, SkillCanonicalizer, SkillMapError, SkillSet};
