use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::analysis::{CanonicalSkillMap, RelevanceEngine, ScoreWeights, SkillCanonicalizer};
use crate::config::Config;
use crate::embedding::{EmbeddingProvider, HashingEmbedder, HttpEmbedder};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Long-lived scoring handle: skill vocabulary + embedding provider, built once.
    pub engine: RelevanceEngine,
    /// Blend applied when a request omits `weights`.
    pub default_weights: ScoreWeights,
}

impl AppState {
    pub fn new(engine: RelevanceEngine, default_weights: ScoreWeights) -> Self {
        Self {
            engine,
            default_weights,
        }
    }

    /// Loads the skill map and selects the embedding provider described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let skill_map = CanonicalSkillMap::load(&config.skill_map_path)
            .with_context(|| format!("Failed to load skill map from '{}'", config.skill_map_path))?;
        info!(
            "Loaded skill map: {} canonical skills from {}",
            skill_map.len(),
            config.skill_map_path
        );

        let canonicalizer = SkillCanonicalizer::new(skill_map, config.fuzzy_threshold)?
            .with_inline_scan(config.inline_scan);

        let embedder: Arc<dyn EmbeddingProvider> = match &config.embedding_api_url {
            Some(url) => {
                let client = HttpEmbedder::new(
                    url,
                    config.embedding_api_key.clone(),
                    config.embedding_model.clone(),
                    config.embedding_dim,
                )?;
                info!(
                    "Embedding provider: {} (model: {})",
                    client.endpoint(),
                    config.embedding_model
                );
                Arc::new(client)
            }
            None => {
                info!(
                    "Embedding provider: in-process hashing ({} dims)",
                    config.embedding_dim
                );
                Arc::new(HashingEmbedder::new(config.embedding_dim))
            }
        };

        Ok(Self::new(
            RelevanceEngine::new(Arc::new(canonicalizer), embedder),
            config.weights,
        ))
    }
}
