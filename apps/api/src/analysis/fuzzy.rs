//! Fuzzy string similarity on a 0–100 scale.
//!
//! `ratio` is the normalized indel similarity from `rapidfuzz`, scaled to percent.
//! `token_sort_ratio` sorts the whitespace-separated words of both inputs first,
//! so word order does not matter.

use rapidfuzz::distance::indel;

pub fn ratio(a: &str, b: &str) -> f64 {
    indel::normalized_similarity(a.chars(), b.chars()) * 100.0
}

pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_words(a), &sorted_words(b))
}

/// Highest-scoring candidate by `token_sort_ratio`; the earliest candidate wins ties.
pub fn best_match<'a, I>(query: &str, candidates: I) -> Option<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let query = sorted_words(query);
    let mut best: Option<(&'a str, f64)> = None;
    for candidate in candidates {
        let score = ratio(&query, &sorted_words(candidate));
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((candidate, score));
        }
    }
    best
}

fn sorted_words(s: &str) -> String {
    let mut words: Vec<&str> = s.split_whitespace().collect();
    words.sort_unstable();
    words.join(" ")
}
