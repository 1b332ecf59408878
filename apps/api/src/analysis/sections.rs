//! Section segmentation: splits raw résumé text into named sections by heading detection.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// The fixed section vocabulary. Every `SectionMap` carries exactly one entry per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Skills,
    Experience,
    Projects,
    Summary,
    Education,
    Certifications,
    Objective,
    Other,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Skills,
        Section::Experience,
        Section::Projects,
        Section::Summary,
        Section::Education,
        Section::Certifications,
        Section::Objective,
        Section::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Skills => "skills",
            Section::Experience => "experience",
            Section::Projects => "projects",
            Section::Summary => "summary",
            Section::Education => "education",
            Section::Certifications => "certifications",
            Section::Objective => "objective",
            Section::Other => "other",
        }
    }
}

/// Heading vocabulary (lowercase) and the section each heading opens.
const HEADINGS: &[(&str, Section)] = &[
    ("skills", Section::Skills),
    ("technical skills", Section::Skills),
    ("experience", Section::Experience),
    ("work experience", Section::Experience),
    ("projects", Section::Projects),
    ("education", Section::Education),
    ("certifications", Section::Certifications),
    ("summary", Section::Summary),
    ("objective", Section::Objective),
];

static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"20\d{2}").expect("year pattern is a valid regex"));

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("blank-line pattern is a valid regex"));

/// Total mapping from `Section` to the text that belongs to it (possibly empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionMap(BTreeMap<Section, String>);

impl SectionMap {
    fn empty() -> Self {
        Self(
            Section::ALL
                .iter()
                .map(|section| (*section, String::new()))
                .collect(),
        )
    }

    pub fn get(&self, section: Section) -> &str {
        self.0.get(&section).map(String::as_str).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (Section, &str)> {
        self.0.iter().map(|(section, text)| (*section, text.as_str()))
    }

    /// Stores a flushed chunk. A section selected twice keeps both chunks, newline-joined.
    fn append(&mut self, section: Section, chunk: &str) {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            return;
        }
        let slot = self.0.entry(section).or_default();
        if !slot.is_empty() {
            slot.push('\n');
        }
        slot.push_str(chunk);
    }
}

/// Returns the section a line opens, if the line is a heading.
///
/// One case-insensitive membership test: trim, drop trailing colons, lowercase.
/// Fully capitalized headings ("EXPERIENCE") fall out of the casefold.
fn heading_section(line: &str) -> Option<Section> {
    let candidate = line
        .trim()
        .trim_end_matches(|c: char| c == ':' || c.is_whitespace())
        .to_lowercase();
    HEADINGS
        .iter()
        .find(|(heading, _)| *heading == candidate)
        .map(|(_, section)| *section)
}

/// Splits résumé text into sections.
///
/// Text before the first heading lands in `other`; a document with no headings at all
/// lands entirely in `summary`. Blank lines inside a section are kept.
pub fn segment(text: &str) -> SectionMap {
    let mut sections = SectionMap::empty();
    let mut current: Option<Section> = None;
    let mut buffer: Vec<&str> = Vec::new();

    for line in text.lines() {
        if let Some(section) = heading_section(line) {
            sections.append(current.unwrap_or(Section::Other), &buffer.join("\n"));
            buffer.clear();
            current = Some(section);
            continue;
        }
        buffer.push(line);
    }

    sections.append(current.unwrap_or(Section::Summary), &buffer.join("\n"));
    sections
}

/// Normalizes line endings, collapses runs of blank lines to one, and trims the ends.
pub fn normalize_text(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    BLANK_RUNS.replace_all(&unified, "\n\n").trim().to_string()
}

/// Estimates years of experience as the span between the earliest and latest `20xx` year.
pub fn experience_years(text: &str) -> u32 {
    let years: Vec<u32> = YEAR_PATTERN
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    if years.len() < 2 {
        return 0;
    }
    let earliest = years.iter().min().copied().unwrap_or(0);
    let latest = years.iter().max().copied().unwrap_or(0);
    latest - earliest
}
