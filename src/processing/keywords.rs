//! Keyword presence detection against a role profile

use crate::error::{Result, ResumeScorerError};
use crate::processing::role::ExpectedKeyword;
use crate::processing::text_processor::TextProcessor;
use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Single-token keywords shorter than this (after stemming) are never fuzzy matched.
const MIN_FUZZY_TERM_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub term: String,
    pub weight: f64,
    pub present: bool,
    /// Present only through a near-spelling.
    pub fuzzy: bool,
}

pub struct KeywordMatcher {
    text_processor: TextProcessor,
    fuzzy_threshold: Option<f64>,
}

impl KeywordMatcher {
    pub fn new(fuzzy_threshold: Option<f64>) -> Self {
        Self {
            text_processor: TextProcessor::new(),
            fuzzy_threshold,
        }
    }

    /// One entry per keyword, in the order given. A keyword is present when
    /// its stemmed token sequence occurs in the text, when it occurs verbatim
    /// between word boundaries, or when a single-word keyword is within the
    /// fuzzy threshold of a resume word.
    pub fn match_keywords(&self, text: &str, keywords: &[ExpectedKeyword]) -> Result<Vec<KeywordMatch>> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        let tokens = self.text_processor.tokenize_terms(text);
        let haystack = format!(" {} ", tokens.join(" "));
        let lowered = text.to_lowercase();

        let term_tokens: Vec<Vec<String>> = keywords
            .iter()
            .map(|k| self.text_processor.tokenize_terms(&k.term))
            .collect();

        // Padding with spaces keeps matches on whole tokens.
        let patterns: Vec<String> = term_tokens
            .iter()
            .map(|t| {
                if t.is_empty() {
                    // Cannot occur in a space-joined token stream.
                    "\u{0}".to_string()
                } else {
                    format!(" {} ", t.join(" "))
                }
            })
            .collect();

        let automaton = AhoCorasick::new(&patterns)
            .map_err(|e| ResumeScorerError::Processing(format!("Failed to build keyword matcher: {}", e)))?;

        let found: HashSet<usize> = automaton
            .find_overlapping_iter(&haystack)
            .map(|m| m.pattern().as_usize())
            .collect();

        let vocabulary: HashSet<&str> = tokens.iter().map(String::as_str).collect();

        Ok(keywords
            .iter()
            .enumerate()
            .map(|(idx, keyword)| {
                let exact = found.contains(&idx) || contains_phrase(&lowered, &keyword.term.to_lowercase());
                let fuzzy = !exact && self.fuzzy_present(&term_tokens[idx], &vocabulary);
                KeywordMatch {
                    term: keyword.term.clone(),
                    weight: keyword.weight,
                    present: exact || fuzzy,
                    fuzzy,
                }
            })
            .collect())
    }

    fn fuzzy_present(&self, term_tokens: &[String], vocabulary: &HashSet<&str>) -> bool {
        let Some(threshold) = self.fuzzy_threshold else {
            return false;
        };
        let [term] = term_tokens else {
            return false;
        };
        if term.chars().count() < MIN_FUZZY_TERM_LEN {
            return false;
        }

        vocabulary.iter().any(|word| {
            word.chars().count() >= MIN_FUZZY_TERM_LEN && strsim::jaro_winkler(term, word) >= threshold
        })
    }
}

/// Weighted share of the expected keywords that are present.
pub fn coverage(matches: &[KeywordMatch]) -> f64 {
    let total: f64 = matches.iter().map(|m| m.weight).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let matched: f64 = matches.iter().filter(|m| m.present).map(|m| m.weight).sum();
    matched / total
}

/// Case-insensitive occurrence of `phrase` not embedded in a longer word.
fn contains_phrase(text: &str, phrase: &str) -> bool {
    let phrase = phrase.trim();
    if phrase.is_empty() {
        return false;
    }

    text.match_indices(phrase).any(|(start, matched)| {
        let end = start + matched.len();
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        before.map_or(true, |c| !c.is_alphanumeric()) && after.map_or(true, |c| !c.is_alphanumeric())
    })
}
