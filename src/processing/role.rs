//! Role taxonomy and target-role resolution

use crate::config::TaxonomyConfig;
use crate::error::{Result, ResumeScorerError};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

const EMBEDDED_TAXONOMY: &str = include_str!("../../data/taxonomy.toml");

/// Minimum Jaro-Winkler similarity for a title to fall into a family whose
/// aliases it does not contain verbatim.
const FUZZY_TITLE_THRESHOLD: f64 = 0.92;

const JUNIOR_CUES: &[&str] = &["intern", "internship", "junior", "jr", "entry", "graduate", "trainee", "apprentice"];
const MID_CUES: &[&str] = &["mid", "intermediate"];
const SENIOR_CUES: &[&str] = &["senior", "sr", "lead", "staff", "principal", "head"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeniorityCue {
    Junior,
    Mid,
    Senior,
    Unknown,
}

impl SeniorityCue {
    /// Rank on the junior..senior ladder. `Unknown` has none.
    pub fn rank(&self) -> Option<u8> {
        match self {
            SeniorityCue::Junior => Some(0),
            SeniorityCue::Mid => Some(1),
            SeniorityCue::Senior => Some(2),
            SeniorityCue::Unknown => None,
        }
    }

    /// Seniority implied by a count of years of experience.
    pub fn from_years(years: u32) -> Self {
        match years {
            0..=1 => SeniorityCue::Junior,
            2..=4 => SeniorityCue::Mid,
            _ => SeniorityCue::Senior,
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        if JUNIOR_CUES.contains(&token) {
            Some(SeniorityCue::Junior)
        } else if MID_CUES.contains(&token) {
            Some(SeniorityCue::Mid)
        } else if SENIOR_CUES.contains(&token) {
            Some(SeniorityCue::Senior)
        } else {
            None
        }
    }
}

impl fmt::Display for SeniorityCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeniorityCue::Junior => write!(f, "junior"),
            SeniorityCue::Mid => write!(f, "mid-level"),
            SeniorityCue::Senior => write!(f, "senior"),
            SeniorityCue::Unknown => write!(f, "unspecified"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedKeyword {
    pub term: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleProfile {
    pub title: String,
    pub normalized_title: String,
    pub family: String,
    /// Declared order from the taxonomy; ties in weight keep this order.
    pub expected_keywords: Vec<ExpectedKeyword>,
    pub expected_seniority_cue: SeniorityCue,
    /// False when the title fell back to the generic profile.
    pub matched_family: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct TaxonomyFile {
    generic: FamilyEntry,
    #[serde(default)]
    families: Vec<FamilyEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct FamilyEntry {
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
    keywords: Vec<ExpectedKeyword>,
}

/// A role family with its aliases already normalized.
#[derive(Debug, Clone)]
pub struct RoleFamily {
    pub name: String,
    pub aliases: Vec<String>,
    pub keywords: Vec<ExpectedKeyword>,
}

/// Immutable, validated mapping from role families to weighted keywords.
#[derive(Debug, Clone)]
pub struct RoleTaxonomy {
    generic: RoleFamily,
    families: Vec<RoleFamily>,
}

impl RoleTaxonomy {
    /// The taxonomy compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(EMBEDDED_TAXONOMY)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| {
            ResumeScorerError::Configuration(format!("Taxonomy {}: {}", path.display(), e))
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: TaxonomyFile = toml::from_str(content)
            .map_err(|e| ResumeScorerError::Configuration(format!("Failed to parse taxonomy: {}", e)))?;

        let generic = build_family(file.generic)?;
        let families = file
            .families
            .into_iter()
            .map(build_family)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { generic, families })
    }

    pub fn families(&self) -> &[RoleFamily] {
        &self.families
    }

    pub fn generic(&self) -> &RoleFamily {
        &self.generic
    }

    /// Resolve a free-text target role. Never fails for a non-blank title:
    /// unknown roles get the generic profile.
    pub fn resolve(&self, target_role: &str) -> Result<RoleProfile> {
        let title = target_role.trim();
        if title.is_empty() {
            return Err(ResumeScorerError::EmptyRole);
        }

        let normalized_title = normalize_title(title);
        let expected_seniority_cue = seniority_cue(&normalized_title);

        let (family, matched_family) = match self.lookup_family(&normalized_title) {
            Ok(family) => (family, true),
            Err(err) => {
                debug!("{}; using the generic profile", err);
                (&self.generic, false)
            }
        };

        Ok(RoleProfile {
            title: title.to_string(),
            normalized_title,
            family: family.name.clone(),
            expected_keywords: family.keywords.clone(),
            expected_seniority_cue,
            matched_family,
        })
    }

    /// Exact alias match first, then a fuzzy match on the title with its
    /// seniority words removed.
    pub fn lookup_family(&self, normalized_title: &str) -> Result<&RoleFamily> {
        if let Some(family) = self.match_alias(normalized_title) {
            return Ok(family);
        }
        if let Some(family) = self.match_fuzzy(normalized_title) {
            return Ok(family);
        }
        Err(ResumeScorerError::TaxonomyLookupMiss(normalized_title.to_string()))
    }

    fn match_alias(&self, normalized_title: &str) -> Option<&RoleFamily> {
        let padded = format!(" {} ", normalized_title);
        let mut best: Option<(&RoleFamily, usize)> = None;

        for family in &self.families {
            for alias in &family.aliases {
                if !padded.contains(&format!(" {} ", alias)) {
                    continue;
                }
                let words = alias.split(' ').count();
                if best.map_or(true, |(_, best_words)| words > best_words) {
                    best = Some((family, words));
                }
            }
        }

        best.map(|(family, _)| family)
    }

    fn match_fuzzy(&self, normalized_title: &str) -> Option<&RoleFamily> {
        let core = normalized_title
            .split(' ')
            .filter(|token| SeniorityCue::from_token(token).is_none())
            .collect::<Vec<_>>()
            .join(" ");
        if core.is_empty() {
            return None;
        }

        let mut best: Option<(&RoleFamily, f64)> = None;
        for family in &self.families {
            for alias in &family.aliases {
                let similarity = strsim::jaro_winkler(&core, alias);
                if similarity >= FUZZY_TITLE_THRESHOLD
                    && best.map_or(true, |(_, best_sim)| similarity > best_sim)
                {
                    best = Some((family, similarity));
                }
            }
        }

        best.map(|(family, _)| family)
    }
}

fn build_family(entry: FamilyEntry) -> Result<RoleFamily> {
    if entry.keywords.is_empty() {
        return Err(ResumeScorerError::Configuration(format!(
            "Role family '{}' has no keywords",
            entry.name
        )));
    }
    let mut seen = std::collections::HashSet::new();
    for keyword in &entry.keywords {
        if !seen.insert(keyword.term.trim().to_lowercase()) {
            return Err(ResumeScorerError::Configuration(format!(
                "Role family '{}' lists '{}' twice",
                entry.name, keyword.term
            )));
        }
        if keyword.term.trim().is_empty() {
            return Err(ResumeScorerError::Configuration(format!(
                "Role family '{}' has an empty keyword",
                entry.name
            )));
        }
        if !(keyword.weight > 0.0 && keyword.weight <= 1.0) {
            return Err(ResumeScorerError::Configuration(format!(
                "Keyword '{}' in '{}' has weight {} outside (0, 1]",
                keyword.term, entry.name, keyword.weight
            )));
        }
    }

    Ok(RoleFamily {
        aliases: entry
            .aliases
            .iter()
            .map(|alias| normalize_title(alias))
            .filter(|alias| !alias.is_empty())
            .collect(),
        name: entry.name,
        keywords: entry.keywords,
    })
}

/// Lowercase, punctuation to spaces, whitespace collapsed. `+` and `#`
/// are kept so `c++ developer` stays distinct.
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '+' || c == '#' { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// First seniority word in title order.
pub fn seniority_cue(normalized_title: &str) -> SeniorityCue {
    normalized_title
        .split(' ')
        .find_map(SeniorityCue::from_token)
        .unwrap_or(SeniorityCue::Unknown)
}

/// Shared, swappable taxonomy. Readers take a snapshot and keep using it
/// while a reload installs a new one.
pub struct TaxonomyStore {
    current: RwLock<Arc<RoleTaxonomy>>,
}

impl TaxonomyStore {
    pub fn new(taxonomy: RoleTaxonomy) -> Self {
        Self {
            current: RwLock::new(Arc::new(taxonomy)),
        }
    }

    /// Taxonomy from the configured file, or the embedded one.
    pub fn from_config(config: &TaxonomyConfig) -> Result<Self> {
        let taxonomy = match &config.path {
            Some(path) => {
                info!("Loading role taxonomy from {}", path.display());
                RoleTaxonomy::from_file(path)?
            }
            None => RoleTaxonomy::embedded()?,
        };
        Ok(Self::new(taxonomy))
    }

    pub fn snapshot(&self) -> Arc<RoleTaxonomy> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Install a new taxonomy, returning the previous one.
    pub fn swap(&self, taxonomy: RoleTaxonomy) -> Arc<RoleTaxonomy> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(taxonomy))
    }

    /// Parse `path` and swap it in. On error the current taxonomy stays.
    pub fn reload_from(&self, path: &Path) -> Result<()> {
        let taxonomy = RoleTaxonomy::from_file(path)?;
        info!(
            "Reloaded role taxonomy from {} ({} families)",
            path.display(),
            taxonomy.families().len()
        );
        self.swap(taxonomy);
        Ok(())
    }

    pub fn resolve(&self, target_role: &str) -> Result<RoleProfile> {
        self.snapshot().resolve(target_role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy() -> RoleTaxonomy {
        RoleTaxonomy::embedded().unwrap()
    }

    #[test]
    fn test_embedded_taxonomy_parses() {
        let taxonomy = taxonomy();
        assert!(taxonomy.families().len() >= 10);
        assert_eq!(taxonomy.generic().name, "professional");
    }

    #[test]
    fn test_resolve_senior_backend_engineer() {
        let profile = taxonomy().resolve("Senior Backend Engineer").unwrap();

        assert_eq!(profile.family, "backend engineering");
        assert_eq!(profile.normalized_title, "senior backend engineer");
        assert_eq!(profile.expected_seniority_cue, SeniorityCue::Senior);
        assert!(profile.matched_family);
        assert!(profile.expected_keywords.iter().any(|k| k.term == "api"));
    }

    #[test]
    fn test_longest_alias_wins() {
        // "developer" alone maps to software engineering, the longer
        // "frontend developer" alias must take precedence.
        let profile = taxonomy().resolve("Frontend Developer").unwrap();
        assert_eq!(profile.family, "frontend engineering");
    }

    #[test]
    fn test_punctuation_is_normalized() {
        let profile = taxonomy().resolve("  Sr. Data-Scientist (Remote) ").unwrap();
        assert_eq!(profile.normalized_title, "sr data scientist remote");
        assert_eq!(profile.family, "data science");
        assert_eq!(profile.expected_seniority_cue, SeniorityCue::Senior);
    }

    #[test]
    fn test_fuzzy_match_tolerates_typos() {
        let profile = taxonomy().resolve("Junior Backend Enginer").unwrap();
        assert_eq!(profile.family, "backend engineering");
        assert_eq!(profile.expected_seniority_cue, SeniorityCue::Junior);
    }

    #[test]
    fn test_unknown_role_gets_generic_profile() {
        let taxonomy = taxonomy();
        let first = taxonomy.resolve("Underwater Basket Weaver").unwrap();
        let second = taxonomy.resolve("Underwater Basket Weaver").unwrap();

        assert!(!first.matched_family);
        assert_eq!(first.family, "professional");
        assert!(!first.expected_keywords.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_punctuation_only_role_is_still_resolved() {
        let profile = taxonomy().resolve("???").unwrap();
        assert_eq!(profile.family, "professional");
    }

    #[test]
    fn test_blank_role_is_rejected() {
        assert!(matches!(taxonomy().resolve("   "), Err(ResumeScorerError::EmptyRole)));
        assert!(matches!(taxonomy().resolve(""), Err(ResumeScorerError::EmptyRole)));
    }

    #[test]
    fn test_lookup_miss_is_reported() {
        let taxonomy = taxonomy();
        let result = taxonomy.lookup_family("astronaut");
        assert!(matches!(result, Err(ResumeScorerError::TaxonomyLookupMiss(_))));
    }

    #[test]
    fn test_seniority_cue_takes_first_word() {
        assert_eq!(seniority_cue("lead junior developer"), SeniorityCue::Senior);
        assert_eq!(seniority_cue("entry level analyst"), SeniorityCue::Junior);
        assert_eq!(seniority_cue("mid level designer"), SeniorityCue::Mid);
        assert_eq!(seniority_cue("designer"), SeniorityCue::Unknown);
    }

    #[test]
    fn test_invalid_weight_rejected() {
        let content = r#"
            [generic]
            name = "professional"
            keywords = [{ term = "communication", weight = 1.5 }]
        "#;
        assert!(matches!(
            RoleTaxonomy::from_toml_str(content),
            Err(ResumeScorerError::Configuration(_))
        ));
    }

    #[test]
    fn test_duplicate_term_rejected() {
        let content = r#"
            [generic]
            name = "professional"
            keywords = [{ term = "SQL", weight = 0.5 }, { term = "sql", weight = 0.7 }]
        "#;
        assert!(RoleTaxonomy::from_toml_str(content).is_err());
    }

    #[test]
    fn test_store_swap_keeps_old_snapshot_alive() {
        let store = TaxonomyStore::new(taxonomy());
        let before = store.snapshot();

        let replacement = RoleTaxonomy::from_toml_str(
            r#"
            [generic]
            name = "anything"
            keywords = [{ term = "teamwork", weight = 1.0 }]
            "#,
        )
        .unwrap();
        store.swap(replacement);

        assert_eq!(before.generic().name, "professional");
        assert_eq!(store.snapshot().generic().name, "anything");
        assert_eq!(store.resolve("Backend Engineer").unwrap().family, "anything");
    }

    #[test]
    fn test_reload_failure_keeps_current() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taxonomy.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        let store = TaxonomyStore::new(taxonomy());
        assert!(store.reload_from(&path).is_err());
        assert_eq!(store.snapshot().generic().name, "professional");
    }
}
