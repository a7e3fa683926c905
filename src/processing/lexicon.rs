//! Action-verb vocabulary shared by the normalizer, scorers and rewriter

/// Verbs that open a strong achievement bullet.
const STRONG_VERBS: &[&str] = &[
    "accelerated", "achieved", "acquired", "analyzed", "applied", "architected", "automated", "boosted",
    "built", "championed", "coached", "collaborated", "completed", "conducted", "consolidated",
    "contributed", "coordinated", "created", "cut", "debugged", "decreased", "defined",
    "delivered", "deployed", "designed", "developed", "directed", "drove", "eliminated",
    "enabled", "engineered", "established", "executed", "expanded", "generated", "grew",
    "headed", "identified", "implemented", "improved", "increased", "initiated", "integrated",
    "introduced", "launched", "led", "maintained", "managed", "mentored", "migrated",
    "modernized", "negotiated", "optimized", "orchestrated", "organized", "oversaw",
    "owned", "partnered", "piloted", "pioneered", "planned", "produced", "published",
    "rebuilt", "redesigned", "reduced", "refactored", "resolved", "restructured",
    "revamped", "saved", "scaled", "secured", "shipped", "simplified", "spearheaded",
    "streamlined", "strengthened", "supervised", "supported", "trained", "transformed", "tripled",
    "doubled", "upgraded", "won", "wrote",
];

/// Weak openers and the strong phrasing that replaces them. Longer phrases
/// are listed before their single-word prefixes.
const WEAK_LEADS: &[(&str, &str)] = &[
    ("responsible for", "Led"),
    ("in charge of", "Led"),
    ("tasked with", "Executed"),
    ("duties included", "Delivered"),
    ("worked on", "Developed"),
    ("worked with", "Collaborated with"),
    ("helped with", "Contributed to"),
    ("helped to", "Contributed to"),
    ("assisted with", "Contributed to"),
    ("assisted in", "Contributed to"),
    ("participated in", "Contributed to"),
    ("involved in", "Contributed to"),
    ("was part of", "Contributed to"),
    ("helped", "Contributed to"),
    ("assisted", "Supported"),
    ("handled", "Managed"),
    ("did", "Executed"),
    ("made", "Created"),
    ("used", "Applied"),
    ("utilized", "Applied"),
    ("got", "Achieved"),
    ("tried", "Piloted"),
    ("worked", "Delivered"),
    ("was", "Delivered"),
    ("were", "Delivered"),
];

/// Opener used when a bullet has no recognizable verb.
pub const DEFAULT_STRONG_VERB: &str = "Delivered";

pub fn is_strong_verb(word: &str) -> bool {
    let lower = word.to_lowercase();
    STRONG_VERBS.contains(&lower.as_str())
}

pub fn is_weak_verb(word: &str) -> bool {
    let lower = word.to_lowercase();
    WEAK_LEADS
        .iter()
        .any(|(phrase, _)| phrase.split(' ').next() == Some(lower.as_str()))
}

/// Whether the first token of a bullet looks like a verb.
pub fn is_verb_like(word: &str) -> bool {
    let lower = word.to_lowercase();
    is_strong_verb(&lower)
        || is_weak_verb(&lower)
        || (lower.len() > 4 && lower.ends_with("ed"))
}

/// Match a weak opener at the start of `text`. Returns the byte length of the
/// matched phrase and its replacement.
pub fn match_weak_lead(text: &str) -> Option<(usize, &'static str)> {
    let lower = text.to_lowercase();
    WEAK_LEADS.iter().find_map(|(phrase, replacement)| {
        let rest = lower.strip_prefix(phrase)?;
        let at_boundary = rest.chars().next().map_or(true, |c| !c.is_alphanumeric());
        at_boundary.then_some((phrase.len(), *replacement))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_and_weak_verbs() {
        assert!(is_strong_verb("Managed"));
        assert!(is_strong_verb("led"));
        assert!(!is_strong_verb("helped"));
        assert!(is_weak_verb("Responsible"));
        assert!(is_weak_verb("helped"));
        assert!(!is_weak_verb("architected"));
    }

    #[test]
    fn test_verb_like_heuristic() {
        assert!(is_verb_like("reconciled"));
        assert!(is_verb_like("built"));
        assert!(!is_verb_like("python"));
        assert!(!is_verb_like("red"));
    }

    #[test]
    fn test_weak_lead_prefers_longest_phrase() {
        assert_eq!(match_weak_lead("Helped with the migration"), Some((11, "Contributed to")));
        assert_eq!(match_weak_lead("Helped customers"), Some((6, "Contributed to")));
        assert_eq!(match_weak_lead("Responsible for billing"), Some((15, "Led")));
        assert_eq!(match_weak_lead("Washington office"), None);
        assert_eq!(match_weak_lead("Designed APIs"), None);
    }
}
