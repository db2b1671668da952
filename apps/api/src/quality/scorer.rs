//! Heuristic text-quality checklist for narrative sections.
//!
//! Six independent pass/fail checks and a sentence-rhythm signal. Everything
//! here is a pure function of its inputs: no I/O, no randomness, no panics.
//! The naturalness value is a writing-rhythm hint and is reported as such.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Coefficient of variation above which sentence rhythm counts as natural.
pub const NATURALNESS_THRESHOLD: f64 = 0.3;
/// Lower bound of the length window as a fraction of the maximum.
const MIN_LENGTH_RATIO: f64 = 0.7;
const MIN_KEYWORD_HITS: usize = 2;

static SPECIFICITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\d|\b(?:days?|weeks?|months?|years?|semesters?|hours?|minutes?|sessions?|times|people|participants|members|interviews?)\b",
    )
    .expect("valid regex")
});
static KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:explor|analy[sz]|research|design|present|discuss|experiment|investigat|develop|produc)\w*",
    )
    .expect("valid regex")
});
static VAGUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:a lot|lots of|very|really|various|many things|somehow|stuff|kind of|sort of|etc|i think|hard work|passionate)\b",
    )
    .expect("valid regex")
});
static GROWTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:learn\w*|grew|grow\w*|improv\w*|realiz\w*|chang\w*|taught|discover\w*|understood|overcame|better)\b",
    )
    .expect("valid regex")
});
static CONNECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:career|future|goals?|aspir\w*|interest\w*|pursue|major(?:ing)?|field of|profession\w*|dream)\b|\b\w+-(?:major|field)\b",
    )
    .expect("valid regex")
});
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").expect("valid regex"));

/// The kind of narrative section being scored. Only the hints differ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Motivation,
    Process,
    Reflection,
    Career,
    #[default]
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    Length,
    Specificity,
    Keyword,
    Avoidance,
    Growth,
    Connection,
}

impl Check {
    pub const ALL: [Check; 6] = [
        Check::Length,
        Check::Specificity,
        Check::Keyword,
        Check::Avoidance,
        Check::Growth,
        Check::Connection,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub check: Check,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Naturalness {
    pub coefficient: f64,
    pub sentences: usize,
    pub natural: bool,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub checks: Vec<CheckResult>,
    pub passed: usize,
    pub score: u8,
    pub naturalness: Naturalness,
}

/// Scores `text` against a `max_length` character budget.
pub fn score(text: &str, max_length: usize, section_type: SectionType) -> QualityReport {
    let trimmed = text.trim();
    let checks: Vec<CheckResult> = Check::ALL
        .iter()
        .map(|&check| {
            let passed = passes(check, trimmed, max_length);
            CheckResult {
                check,
                passed,
                hint: (!passed).then(|| hint(check, trimmed, max_length, section_type)),
            }
        })
        .collect();

    let passed = checks.iter().filter(|c| c.passed).count();
    let score = (100.0 * passed as f64 / Check::ALL.len() as f64).round() as u8;

    QualityReport {
        checks,
        passed,
        score,
        naturalness: naturalness(trimmed),
    }
}

fn passes(check: Check, text: &str, max_length: usize) -> bool {
    match check {
        Check::Length => {
            let (min, max) = length_window(max_length);
            let len = text.chars().count();
            !text.is_empty() && len as f64 >= min && len <= max
        }
        Check::Specificity => SPECIFICITY.is_match(text),
        Check::Keyword => KEYWORD.find_iter(text).count() >= MIN_KEYWORD_HITS,
        // Blank text avoids nothing.
        Check::Avoidance => !text.is_empty() && !VAGUE.is_match(text),
        Check::Growth => GROWTH.is_match(text),
        Check::Connection => CONNECTION.is_match(text),
    }
}

fn length_window(max_length: usize) -> (f64, usize) {
    (max_length as f64 * MIN_LENGTH_RATIO, max_length)
}

fn hint(check: Check, text: &str, max_length: usize, section_type: SectionType) -> String {
    match check {
        Check::Length => {
            let (min, max) = length_window(max_length);
            let min = min.ceil() as usize;
            let len = text.chars().count();
            if len > max {
                format!("Trim about {} characters to fit within {max}.", len - max)
            } else {
                format!(
                    "Add about {} more characters; aim for {min} to {max}.",
                    min.saturating_sub(len).max(1)
                )
            }
        }
        Check::Specificity => {
            "Add a concrete number, duration or count, such as \"over 6 weeks\" or \"12 interviews\"."
                .to_string()
        }
        Check::Keyword => match section_type {
            SectionType::Motivation => {
                "Say what you set out to explore or investigate, and what you planned to research."
            }
            SectionType::Process => {
                "Walk through the steps: what you researched, designed, tested and analyzed."
            }
            SectionType::Reflection => {
                "Name what you analyzed or discussed afterwards, not only what happened."
            }
            SectionType::Career => "Show what you developed or produced that points toward your goal.",
            SectionType::General => {
                "Use at least two action verbs such as explore, analyze, design or present."
            }
        }
        .to_string(),
        Check::Avoidance => match VAGUE.find(text) {
            Some(found) => format!(
                "Replace vague phrasing such as \"{}\" with a concrete detail.",
                found.as_str()
            ),
            None => "Write something first.".to_string(),
        },
        Check::Growth => match section_type {
            SectionType::Reflection => "State what you learned or would now do differently.",
            SectionType::Process => "Mention what changed or improved between attempts.",
            _ => "Mention something you learned or how your thinking changed.",
        }
        .to_string(),
        Check::Connection => match section_type {
            SectionType::Career | SectionType::Motivation => {
                "Tie this to your intended major, field or career goal."
            }
            _ => "Connect the experience to your interests or future plans.",
        }
        .to_string(),
    }
}

/// Coefficient of variation (population standard deviation over mean) of
/// sentence lengths in characters. Fewer than two sentences is too uniform.
pub fn naturalness(text: &str) -> Naturalness {
    let lengths: Vec<f64> = SENTENCE_END
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.chars().count() as f64)
        .collect();

    let coefficient = if lengths.len() < 2 {
        0.0
    } else {
        let n = lengths.len() as f64;
        let mean = lengths.iter().sum::<f64>() / n;
        let variance = lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / n;
        variance.sqrt() / mean
    };
    let natural = coefficient > NATURALNESS_THRESHOLD;

    Naturalness {
        coefficient,
        sentences: lengths.len(),
        natural,
        label: if natural { "natural" } else { "too_uniform" },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRONG: &str = "Over 6 weeks I explored how students research local history. \
        I designed a survey and analyzed 120 responses! \
        The project taught me to listen, and it changed how I see my future career in education.";

    fn passed(report: &QualityReport, check: Check) -> bool {
        report.checks.iter().find(|c| c.check == check).unwrap().passed
    }

    #[test]
    fn test_empty_text_scores_zero() {
        for max in [0, 100] {
            let report = score("", max, SectionType::General);
            assert_eq!(report.passed, 0);
            assert_eq!(report.score, 0);
            assert!(report.checks.iter().all(|c| c.hint.is_some()));
            assert!(!report.naturalness.natural);
        }
    }

    #[test]
    fn test_strong_paragraph_passes_every_check() {
        let max = STRONG.chars().count();
        let report = score(STRONG, max, SectionType::Reflection);
        assert_eq!(report.passed, 6, "{:?}", report.checks);
        assert_eq!(report.score, 100);
        assert!(report.checks.iter().all(|c| c.hint.is_none()));
    }

    #[test]
    fn test_partial_score_rounds() {
        let text = "I learned a lot about my future major.";
        let report = score(text, text.len(), SectionType::General);

        assert!(passed(&report, Check::Length));
        assert!(passed(&report, Check::Growth));
        assert!(passed(&report, Check::Connection));
        assert!(!passed(&report, Check::Avoidance));
        assert!(!passed(&report, Check::Keyword));
        assert!(!passed(&report, Check::Specificity));
        assert_eq!(report.score, 50);

        let one = score("I learned.", 1000, SectionType::General);
        assert_eq!(one.passed, 2);
        assert_eq!(one.score, 33);
    }

    #[test]
    fn test_length_window_bounds() {
        let text = "x".repeat(70);
        assert!(passed(&score(&text, 100, SectionType::General), Check::Length));
        assert!(!passed(&score(&text[..69], 100, SectionType::General), Check::Length));
        assert!(!passed(&score(&"x".repeat(101), 100, SectionType::General), Check::Length));
    }

    #[test]
    fn test_single_keyword_is_not_enough() {
        let report = score("We explored the river.", 100, SectionType::General);
        assert!(!passed(&report, Check::Keyword));
        let report = score("We explored the river and analyzed samples.", 100, SectionType::General);
        assert!(passed(&report, Check::Keyword));
    }

    #[test]
    fn test_hyphenated_field_counts_as_connection() {
        let report = score("My design-field friends helped.", 100, SectionType::General);
        assert!(passed(&report, Check::Connection));
    }

    #[test]
    fn test_section_type_changes_hints_not_score() {
        let text = "It was fine.";
        let general = score(text, 100, SectionType::General);
        let process = score(text, 100, SectionType::Process);
        assert_eq!(general.score, process.score);
        let hint = |r: &QualityReport| {
            r.checks
                .iter()
                .find(|c| c.check == Check::Keyword)
                .and_then(|c| c.hint.clone())
        };
        assert_ne!(hint(&general), hint(&process));
    }

    #[test]
    fn test_avoidance_hint_names_the_phrase() {
        let report = score("It was really good.", 100, SectionType::General);
        let hint = report
            .checks
            .iter()
            .find(|c| c.check == Check::Avoidance)
            .and_then(|c| c.hint.clone())
            .unwrap();
        assert!(hint.contains("\"really\""), "{hint}");
    }

    #[test]
    fn test_naturalness_uniform_and_varied() {
        let uniform = naturalness("I like cats. I like dogs. I like fish.");
        assert_eq!(uniform.sentences, 3);
        assert!(!uniform.natural);
        assert_eq!(uniform.label, "too_uniform");

        let varied =
            naturalness("Yes. I spent the entire summer rebuilding an old radio from salvaged parts.");
        assert!(varied.coefficient > NATURALNESS_THRESHOLD);
        assert!(varied.natural);

        let single = naturalness("Only one sentence here");
        assert_eq!(single.sentences, 1);
        assert_eq!(single.coefficient, 0.0);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let a = score(STRONG, 120, SectionType::Career);
        let b = score(STRONG, 120, SectionType::Career);
        assert_eq!(a, b);
    }
}
