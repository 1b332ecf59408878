use anyhow::{anyhow, Context, Result};

use crate::analysis::skills::{InlineScan, DEFAULT_FUZZY_THRESHOLD};
use crate::analysis::ScoreWeights;
use crate::embedding::DEFAULT_DIMENSION;

const DEFAULT_SKILL_MAP_PATH: &str = "data/skill_map.json";
const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";

/// Service configuration loaded from environment variables.
/// Every variable is optional; startup fails only on values that do not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub skill_map_path: String,
    pub fuzzy_threshold: f64,
    pub inline_scan: InlineScan,
    /// Default blend used when a request does not carry its own weights.
    pub weights: ScoreWeights,
    pub embedding_dim: usize,
    /// When set, embeddings come from this OpenAI-compatible API instead of the
    /// in-process hashing embedder.
    pub embedding_api_url: Option<String>,
    pub embedding_api_key: Option<String>,
    pub embedding_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let hard_weight: f64 = parse_env("HARD_WEIGHT", 0.6)?;
        if !(0.0..=1.0).contains(&hard_weight) {
            return Err(anyhow!("HARD_WEIGHT must be between 0.0 and 1.0, got {hard_weight}"));
        }

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            skill_map_path: optional_env("SKILL_MAP_PATH")
                .unwrap_or_else(|| DEFAULT_SKILL_MAP_PATH.to_string()),
            fuzzy_threshold: parse_env("FUZZY_THRESHOLD", DEFAULT_FUZZY_THRESHOLD)?,
            inline_scan: match optional_env("INLINE_SCAN") {
                Some(raw) => raw.parse().map_err(|e: String| anyhow!(e))?,
                None => InlineScan::default(),
            },
            weights: ScoreWeights::from_hard(hard_weight),
            embedding_dim: parse_env("EMBEDDING_DIM", DEFAULT_DIMENSION)?,
            embedding_api_url: optional_env("EMBEDDING_API_URL"),
            embedding_api_key: optional_env("EMBEDDING_API_KEY"),
            embedding_model: optional_env("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
        })
    }
}

/// Unset and blank variables are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
