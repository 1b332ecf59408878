//! Skill canonicalization: maps free-text skill mentions onto a controlled vocabulary.
//!
//! Matching runs in two explicit passes whose union is the extracted skill set:
//! - the **token pass** splits text on newlines and commas and resolves each token
//!   by exact lookup, then fuzzy `token_sort_ratio` against every vocabulary key;
//! - the **inline pass** scans the lowercased text for every vocabulary key to catch
//!   skills mentioned mid-sentence. It trades precision for recall and can be
//!   restricted to word boundaries or switched off via [`InlineScan`].

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::analysis::fuzzy;

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 80.0;

const BULLET_CHARS: &[char] = &['•', '-', '–', '—'];

/// Deduplicated, ordered set of canonical skill names.
pub type SkillSet = BTreeSet<String>;

#[derive(Debug, Error)]
pub enum SkillMapError {
    #[error("failed to read skill map at {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("skill map is not a JSON object of string arrays: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("fuzzy threshold {0} is outside 0..=100")]
    InvalidThreshold(f64),
}

/// Canonical skill name → synonyms, in the order the source file lists them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalSkillMap(IndexMap<String, Vec<String>>);

impl CanonicalSkillMap {
    pub fn from_json_str(json: &str) -> Result<Self, SkillMapError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SkillMapError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| SkillMapError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for CanonicalSkillMap {
    fn from_iter<T: IntoIterator<Item = (String, Vec<String>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A synonym claimed by more than one canonical skill. The claim later in the file wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillConflict {
    pub key: String,
    pub overridden: String,
    pub winner: String,
}

/// How the inline pass matches vocabulary keys against running text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InlineScan {
    /// Any substring occurrence counts, including inside longer words.
    #[default]
    Substring,
    /// An occurrence counts only when not flanked by alphanumeric characters.
    WordBoundary,
    Disabled,
}

impl FromStr for InlineScan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "substring" => Ok(InlineScan::Substring),
            "word_boundary" => Ok(InlineScan::WordBoundary),
            "off" | "disabled" => Ok(InlineScan::Disabled),
            other => Err(format!(
                "unknown inline scan mode '{other}' (expected substring, word_boundary or off)"
            )),
        }
    }
}

/// Resolves skill mentions to canonical names. Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct SkillCanonicalizer {
    lookup: HashMap<String, String>,
    /// Lookup keys in first-insertion order; the fuzzy candidate pool.
    candidates: Vec<String>,
    threshold: f64,
    inline_scan: InlineScan,
    conflicts: Vec<SkillConflict>,
}

impl SkillCanonicalizer {
    pub fn new(skill_map: CanonicalSkillMap, fuzzy_threshold: f64) -> Result<Self, SkillMapError> {
        if !(0.0..=100.0).contains(&fuzzy_threshold) {
            return Err(SkillMapError::InvalidThreshold(fuzzy_threshold));
        }

        let mut lookup: HashMap<String, String> = HashMap::new();
        let mut candidates = Vec::new();
        let mut conflicts = Vec::new();

        for (canonical, synonyms) in skill_map.0 {
            let keys = std::iter::once(canonical.as_str()).chain(synonyms.iter().map(String::as_str));
            for key in keys {
                let key = key.trim().to_lowercase();
                if key.is_empty() {
                    continue;
                }
                match lookup.insert(key.clone(), canonical.clone()) {
                    None => candidates.push(key),
                    Some(previous) if previous != canonical => {
                        warn!(
                            "Skill map conflict: '{}' listed under '{}' and '{}'; using '{}'",
                            key, previous, canonical, canonical
                        );
                        conflicts.push(SkillConflict {
                            key,
                            overridden: previous,
                            winner: canonical.clone(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        debug!(
            "Skill canonicalizer built: {} lookup keys, threshold {}",
            candidates.len(),
            fuzzy_threshold
        );

        Ok(Self {
            lookup,
            candidates,
            threshold: fuzzy_threshold,
            inline_scan: InlineScan::default(),
            conflicts,
        })
    }

    #[must_use]
    pub fn with_inline_scan(mut self, mode: InlineScan) -> Self {
        self.inline_scan = mode;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn inline_scan(&self) -> InlineScan {
        self.inline_scan
    }

    pub fn vocabulary_size(&self) -> usize {
        self.candidates.len()
    }

    pub fn conflicts(&self) -> &[SkillConflict] {
        &self.conflicts
    }

    /// Resolves one token to its canonical skill name.
    ///
    /// An exact key returns immediately; otherwise the best fuzzy candidate is accepted
    /// when its score reaches the threshold.
    pub fn match_token(&self, token: &str) -> Option<&str> {
        let token = token.trim().to_lowercase();
        if token.is_empty() {
            return None;
        }
        if let Some(canonical) = self.lookup.get(&token) {
            return Some(canonical.as_str());
        }
        let (key, score) = fuzzy::best_match(&token, self.candidates.iter().map(String::as_str))?;
        if score >= self.threshold {
            self.lookup.get(key).map(String::as_str)
        } else {
            None
        }
    }

    /// Token pass: newline- then comma-separated tokens, bullets stripped, each matched.
    pub fn match_tokens(&self, text: &str) -> SkillSet {
        text.split('\n')
            .flat_map(|line| line.split(','))
            .map(|token| token.trim_matches(|c: char| BULLET_CHARS.contains(&c) || c.is_whitespace()))
            .filter(|token| !token.is_empty())
            .filter_map(|token| self.match_token(token))
            .map(str::to_string)
            .collect()
    }

    /// Inline pass: vocabulary keys occurring anywhere in the lowercased text.
    pub fn scan_inline(&self, text: &str) -> SkillSet {
        if self.inline_scan == InlineScan::Disabled || text.is_empty() {
            return SkillSet::new();
        }
        let lowered = text.to_lowercase();
        self.candidates
            .iter()
            .filter(|key| match self.inline_scan {
                InlineScan::WordBoundary => occurs_as_word(&lowered, key),
                _ => lowered.contains(key.as_str()),
            })
            .filter_map(|key| self.lookup.get(key.as_str()).cloned())
            .collect()
    }

    /// Union of the token pass and the inline pass.
    pub fn extract_from_text(&self, text: &str) -> SkillSet {
        if text.is_empty() {
            return SkillSet::new();
        }
        let mut skills = self.match_tokens(text);
        skills.extend(self.scan_inline(text));
        skills
    }
}

fn occurs_as_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
