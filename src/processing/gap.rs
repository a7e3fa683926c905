//! Keyword gap analysis

use crate::processing::keywords::KeywordMatch;

/// Missing keywords, highest weight first. Equal weights keep the order the
/// taxonomy declares them in. Terms that are present never appear.
pub fn recommend_keywords(matches: &[KeywordMatch], limit: usize) -> Vec<String> {
    let mut missing: Vec<&KeywordMatch> = matches.iter().filter(|m| !m.present).collect();
    missing.sort_by(|a, b| b.weight.total_cmp(&a.weight));

    let mut seen = Vec::new();
    for keyword in missing {
        if seen.len() >= limit {
            break;
        }
        if !seen.iter().any(|s: &String| s.eq_ignore_ascii_case(&keyword.term)) {
            seen.push(keyword.term.clone());
        }
    }
    seen
}
