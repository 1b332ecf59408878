//! Requirement extraction: turns free-form JD text into must-have / nice-to-have token lists.
//!
//! Lines are classified by a three-state capture machine. Header lines switch state;
//! content lines inside a capture block are split on `,` `;` `-` and collected under
//! the active list. A must/nice header written inline (`Must-have: Python, SQL`)
//! contributes the text after its first colon as content of the block it opens.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::analysis::skills::SkillCanonicalizer;

const MUST_MARKERS: &[&str] = &["must-have", "must have", "required"];
const NICE_MARKERS: &[&str] = &["nice-to-have", "nice to have"];
const STOP_MARKERS: &[&str] = &["qualification", "responsibility", "role"];
const TOKEN_DELIMITERS: &[char] = &[',', ';', '-'];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaptureState {
    #[default]
    None,
    Must,
    Nice,
}

/// Must-have and nice-to-have requirement tokens. Order is not significant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementSet {
    pub must: Vec<String>,
    pub nice: Vec<String>,
}

impl RequirementSet {
    /// Maps every token to its canonical skill, keeping the raw token when nothing matches.
    ///
    /// Synonyms of one skill collapse to a single entry so they are not counted twice.
    pub fn canonicalize(&self, canonicalizer: &SkillCanonicalizer) -> RequirementSet {
        RequirementSet {
            must: canonical_tokens(&self.must, canonicalizer),
            nice: canonical_tokens(&self.nice, canonicalizer),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.nice.is_empty()
    }
}

fn canonical_tokens(tokens: &[String], canonicalizer: &SkillCanonicalizer) -> Vec<String> {
    let mut seen = BTreeSet::new();
    tokens
        .iter()
        .map(|token| {
            canonicalizer
                .match_token(token)
                .map_or_else(|| token.clone(), str::to_string)
        })
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

/// Pure transition: classifies one line against the current state.
///
/// Checks run in priority order: must markers, nice markers, stop markers, content.
pub fn transition(state: CaptureState, line: &str) -> (CaptureState, Vec<String>) {
    let lowered = line.trim().to_lowercase();

    if lowered.is_empty() {
        return (state, Vec::new());
    }
    if contains_any(&lowered, MUST_MARKERS) {
        return (CaptureState::Must, inline_tokens(&lowered));
    }
    if contains_any(&lowered, NICE_MARKERS) {
        return (CaptureState::Nice, inline_tokens(&lowered));
    }
    if contains_any(&lowered, STOP_MARKERS) {
        return (CaptureState::None, Vec::new());
    }

    let tokens = match state {
        CaptureState::None => Vec::new(),
        CaptureState::Must | CaptureState::Nice => split_tokens(&lowered),
    };
    (state, tokens)
}

/// Tokens written after the colon of a header line; none when there is no colon.
fn inline_tokens(header: &str) -> Vec<String> {
    header
        .split_once(':')
        .map(|(_, rest)| split_tokens(rest))
        .unwrap_or_default()
}

fn split_tokens(line: &str) -> Vec<String> {
    line.split(TOKEN_DELIMITERS)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Extracts raw, lowercased, deduplicated requirement tokens from JD text.
pub fn extract(requirement_text: &str) -> RequirementSet {
    let mut state = CaptureState::None;
    let mut must = BTreeSet::new();
    let mut nice = BTreeSet::new();

    for line in requirement_text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let (next, tokens) = transition(state, line);
        match next {
            CaptureState::Must => must.extend(tokens),
            CaptureState::Nice => nice.extend(tokens),
            CaptureState::None => {}
        }
        state = next;
    }

    RequirementSet {
        must: must.into_iter().collect(),
        nice: nice.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::skills::CanonicalSkillMap;

    #[test]
    fn test_must_and_nice_blocks() {
        let set = extract("Must-have:\nPython, SQL\nNice-to-have:\nDocker");
        assert_eq!(set.must, vec!["python", "sql"]);
        assert_eq!(set.nice, vec!["docker"]);
    }

    #[test]
    fn test_inline_header_tokens() {
        let set = extract("Must-have: Python, SQL\nNice-to-have: Docker");
        assert_eq!(set.must, vec!["python", "sql"]);
        assert_eq!(set.nice, vec!["docker"]);
    }

    #[test]
    fn test_header_without_colon_contributes_no_tokens() {
        let (state, tokens) = transition(CaptureState::None, "Nice to have skills");
        assert_eq!(state, CaptureState::Nice);
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_qualifications_header_before_capture() {
        let set = extract("Qualifications\nMust-have: Java");
        assert_eq!(set.must, vec!["java"]);
        assert!(set.nice.is_empty());
    }

    #[test]
    fn test_must_marker_beats_stop_marker() {
        let (state, tokens) = transition(CaptureState::Nice, "Required qualifications");
        assert_eq!(state, CaptureState::Must);
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_stop_marker_exits_capture() {
        let set = extract("Must have\nRust\nYour role\nShip features, mentor\nNice to have\nKafka");
        assert_eq!(set.must, vec!["rust"]);
        assert_eq!(set.nice, vec!["kafka"]);
    }

    #[test]
    fn test_content_outside_capture_is_ignored() {
        let set = extract("We are a fast growing startup\nPython, Go");
        assert!(set.is_empty());
    }

    #[test]
    fn test_all_delimiters_split_and_dedupe() {
        let set = extract("Required\nPython; SQL - AWS\npython,  ,sql");
        assert_eq!(set.must, vec!["aws", "python", "sql"]);
    }

    #[test]
    fn test_hyphen_splits_compound_tokens() {
        let (_, tokens) = transition(CaptureState::Nice, "CI-CD");
        assert_eq!(tokens, vec!["ci", "cd"]);
    }

    #[test]
    fn test_empty_text_yields_empty_set() {
        assert_eq!(extract(""), RequirementSet::default());
    }

    #[test]
    fn test_canonicalize_maps_and_dedupes_synonyms() {
        let map = CanonicalSkillMap::from_json_str(
            r#"{"JavaScript": ["js", "javascript"], "Python": ["py"]}"#,
        )
        .unwrap();
        let canonicalizer = SkillCanonicalizer::new(map, 80.0).unwrap();
        let raw = RequirementSet {
            must: vec!["js".into(), "javascript".into(), "cobol".into()],
            nice: vec!["py".into()],
        };
        let canonical = raw.canonicalize(&canonicalizer);
        assert_eq!(canonical.must, vec!["JavaScript", "cobol"]);
        assert_eq!(canonical.nice, vec!["Python"]);
    }
}
