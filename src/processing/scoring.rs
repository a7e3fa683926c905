//! Category scorers and the shared rubric

use crate::config::ScoringConfig;
use crate::error::{Result, ResumeScorerError};
use crate::processing::document::{ResumeModel, SectionKind};
use crate::processing::keywords::{self, KeywordMatch};
use crate::processing::lexicon;
use crate::processing::role::{RoleProfile, SeniorityCue};
use crate::processing::text_processor::TextProcessor;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryId {
    KeywordMatch,
    QuantifiedImpact,
    StructureCompleteness,
    ActionLanguage,
    Conciseness,
    SeniorityAlignment,
}

impl CategoryId {
    pub const ALL: [CategoryId; 6] = [
        CategoryId::KeywordMatch,
        CategoryId::QuantifiedImpact,
        CategoryId::StructureCompleteness,
        CategoryId::ActionLanguage,
        CategoryId::Conciseness,
        CategoryId::SeniorityAlignment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryId::KeywordMatch => "keyword_match",
            CategoryId::QuantifiedImpact => "quantified_impact",
            CategoryId::StructureCompleteness => "structure_completeness",
            CategoryId::ActionLanguage => "action_language",
            CategoryId::Conciseness => "conciseness",
            CategoryId::SeniorityAlignment => "seniority_alignment",
        }
    }

    /// Human-readable name for reports.
    pub fn label(&self) -> &'static str {
        match self {
            CategoryId::KeywordMatch => "Keyword Match",
            CategoryId::QuantifiedImpact => "Quantified Impact",
            CategoryId::StructureCompleteness => "Structure & Completeness",
            CategoryId::ActionLanguage => "Action Language",
            CategoryId::Conciseness => "Conciseness",
            CategoryId::SeniorityAlignment => "Seniority Alignment",
        }
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreBand {
    Weak,
    Adequate,
    Strong,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=3 => ScoreBand::Weak,
            4..=6 => ScoreBand::Adequate,
            _ => ScoreBand::Strong,
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreBand::Weak => write!(f, "Weak"),
            ScoreBand::Adequate => write!(f, "Adequate"),
            ScoreBand::Strong => write!(f, "Strong"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category_id: CategoryId,
    pub score: u8,
    pub feedback: String,
}

impl CategoryResult {
    fn new(category_id: CategoryId, score: u8, detail: impl fmt::Display) -> Self {
        let score = score.min(10);
        Self {
            category_id,
            score,
            feedback: format!("{}: {}", ScoreBand::from_score(score), detail),
        }
    }
}

/// Map a ratio in [0, 1] onto the 0..=10 scale. Each tenth is one point; the
/// epsilon keeps exact tenths like 0.7 from flooring down to 6.
pub fn score_from_ratio(ratio: f64) -> u8 {
    if !ratio.is_finite() {
        return 0;
    }
    ((ratio.clamp(0.0, 1.0) * 10.0) + 1e-9).floor() as u8
}

/// Structure points for 0..=4 core sections present.
const STRUCTURE_TABLE: [u8; 5] = [0, 2, 5, 7, 10];

const CORE_SECTIONS: [SectionKind; 4] = [
    SectionKind::Experience,
    SectionKind::Education,
    SectionKind::Skills,
    SectionKind::Summary,
];

/// Score when the role carries no seniority cue.
const SENIORITY_UNSPECIFIED_SCORE: u8 = 6;
/// Score when the resume states no years of experience.
const SENIORITY_UNDETECTED_SCORE: u8 = 5;
/// Score when there are no bullets to judge length by.
const CONCISENESS_NEUTRAL_SCORE: u8 = 5;

/// Everything a scorer reads. Built once per analysis and shared read-only.
#[derive(Debug, Clone)]
pub struct ScoringContext {
    pub model: ResumeModel,
    pub profile: RoleProfile,
    pub keyword_matches: Vec<KeywordMatch>,
    pub config: ScoringConfig,
}

pub trait CategoryScorer: Send + Sync {
    fn category(&self) -> CategoryId;
    fn score(&self, ctx: &ScoringContext) -> CategoryResult;
}

pub struct KeywordMatchScorer;

impl CategoryScorer for KeywordMatchScorer {
    fn category(&self) -> CategoryId {
        CategoryId::KeywordMatch
    }

    fn score(&self, ctx: &ScoringContext) -> CategoryResult {
        let matches = &ctx.keyword_matches;
        let present = matches.iter().filter(|m| m.present).count();
        let score = score_from_ratio(keywords::coverage(matches));

        let mut missing: Vec<&KeywordMatch> = matches.iter().filter(|m| !m.present).collect();
        missing.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        let top_missing: Vec<&str> = missing.iter().take(3).map(|m| m.term.as_str()).collect();

        let mut detail = format!(
            "matched {} of {} expected {} keywords",
            present,
            matches.len(),
            ctx.profile.family
        );
        if !top_missing.is_empty() {
            detail.push_str(&format!("; most valuable missing: {}", top_missing.join(", ")));
        }
        CategoryResult::new(self.category(), score, detail)
    }
}

pub struct QuantifiedImpactScorer;

impl CategoryScorer for QuantifiedImpactScorer {
    fn category(&self) -> CategoryId {
        CategoryId::QuantifiedImpact
    }

    fn score(&self, ctx: &ScoringContext) -> CategoryResult {
        let bullets = &ctx.model.bullets;
        if bullets.is_empty() {
            return CategoryResult::new(
                self.category(),
                0,
                "no experience or project bullets found to show measurable results",
            );
        }

        let with_metric = bullets.iter().filter(|b| b.has_metric).count();
        let mut score = score_from_ratio(with_metric as f64 / bullets.len() as f64);
        if with_metric > 0 {
            score = score.max(2);
        }

        CategoryResult::new(
            self.category(),
            score,
            format!(
                "{} of {} bullets include a number, percentage or amount",
                with_metric,
                bullets.len()
            ),
        )
    }
}

pub struct StructureScorer;

impl CategoryScorer for StructureScorer {
    fn category(&self) -> CategoryId {
        CategoryId::StructureCompleteness
    }

    fn score(&self, ctx: &ScoringContext) -> CategoryResult {
        let (present, missing): (Vec<SectionKind>, Vec<SectionKind>) = CORE_SECTIONS
            .iter()
            .copied()
            .partition(|kind| ctx.model.has_section(*kind));

        let score = STRUCTURE_TABLE[present.len()];
        let detail = if missing.is_empty() {
            "all core sections present (experience, education, skills, summary)".to_string()
        } else {
            let names: Vec<String> = missing.iter().map(|k| k.to_string().to_lowercase()).collect();
            format!("{} of 4 core sections present; missing {}", present.len(), names.join(", "))
        };
        CategoryResult::new(self.category(), score, detail)
    }
}

pub struct ActionLanguageScorer;

impl CategoryScorer for ActionLanguageScorer {
    fn category(&self) -> CategoryId {
        CategoryId::ActionLanguage
    }

    fn score(&self, ctx: &ScoringContext) -> CategoryResult {
        let bullets = &ctx.model.bullets;
        if bullets.is_empty() {
            return CategoryResult::new(self.category(), 0, "no bullets found that open with an action verb");
        }

        let strong = bullets
            .iter()
            .filter(|b| b.leading_verb.as_deref().map_or(false, lexicon::is_strong_verb))
            .count();
        let score = score_from_ratio(strong as f64 / bullets.len() as f64);

        CategoryResult::new(
            self.category(),
            score,
            format!("{} of {} bullets open with a strong action verb", strong, bullets.len()),
        )
    }
}

pub struct ConcisenessScorer;

impl CategoryScorer for ConcisenessScorer {
    fn category(&self) -> CategoryId {
        CategoryId::Conciseness
    }

    fn score(&self, ctx: &ScoringContext) -> CategoryResult {
        let bullets = &ctx.model.bullets;
        let threshold = ctx.config.bullet_length_threshold;
        if bullets.is_empty() {
            return CategoryResult::new(
                self.category(),
                CONCISENESS_NEUTRAL_SCORE,
                "no bullets to measure; keep achievements under a couple of lines",
            );
        }

        let too_long = bullets.iter().filter(|b| b.length_chars > threshold).count();
        let score = 10 - score_from_ratio(too_long as f64 / bullets.len() as f64);

        CategoryResult::new(
            self.category(),
            score,
            format!(
                "{} of {} bullets exceed {} characters",
                too_long,
                bullets.len(),
                threshold
            ),
        )
    }
}

pub struct SeniorityScorer {
    text_processor: TextProcessor,
}

impl Default for SeniorityScorer {
    fn default() -> Self {
        Self {
            text_processor: TextProcessor::new(),
        }
    }
}

impl CategoryScorer for SeniorityScorer {
    fn category(&self) -> CategoryId {
        CategoryId::SeniorityAlignment
    }

    fn score(&self, ctx: &ScoringContext) -> CategoryResult {
        let expected = ctx.profile.expected_seniority_cue;
        let Some(expected_rank) = expected.rank() else {
            return CategoryResult::new(
                self.category(),
                SENIORITY_UNSPECIFIED_SCORE,
                "role title does not state a seniority level",
            );
        };

        let Some(years) = self.text_processor.years_of_experience(&ctx.model.raw_text) else {
            return CategoryResult::new(
                self.category(),
                SENIORITY_UNDETECTED_SCORE,
                format!("no stated years of experience to compare against a {} role", expected),
            );
        };

        let detected = SeniorityCue::from_years(years);
        let detected_rank = detected.rank().unwrap_or(0);
        let score = match detected_rank as i8 - expected_rank as i8 {
            0 => 10,
            1 => 8,
            2 => 7,
            -1 => 5,
            _ => 2,
        };

        CategoryResult::new(
            self.category(),
            score,
            format!(
                "{} years of experience reads as {} for a {} role",
                years, detected, expected
            ),
        )
    }
}

/// One scorer per category, in `CategoryId::ALL` order.
pub fn default_scorers() -> Vec<Arc<dyn CategoryScorer>> {
    vec![
        Arc::new(KeywordMatchScorer),
        Arc::new(QuantifiedImpactScorer),
        Arc::new(StructureScorer),
        Arc::new(ActionLanguageScorer),
        Arc::new(ConcisenessScorer),
        Arc::new(SeniorityScorer::default()),
    ]
}

/// Run every scorer on the blocking pool and wait for all of them.
pub async fn score_all(
    scorers: &[Arc<dyn CategoryScorer>],
    ctx: Arc<ScoringContext>,
) -> Result<Vec<CategoryResult>> {
    let handles: Vec<_> = scorers
        .iter()
        .map(|scorer| {
            let scorer = Arc::clone(scorer);
            let ctx = Arc::clone(&ctx);
            tokio::task::spawn_blocking(move || scorer.score(&ctx))
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let result = handle
            .await
            .map_err(|e| ResumeScorerError::Processing(format!("Category scorer failed: {}", e)))?;
        debug!("{} scored {}", result.category_id, result.score);
        results.push(result);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::processing::document::DocumentNormalizer;
    use crate::processing::keywords::KeywordMatcher;
    use crate::processing::role::RoleTaxonomy;

    fn context(resume: &str, role: &str) -> ScoringContext {
        let config = Config::default();
        let model = DocumentNormalizer::new(config.normalizer.clone())
            .normalize_text(resume)
            .unwrap();
        let profile = RoleTaxonomy::embedded().unwrap().resolve(role).unwrap();
        let keyword_matches = KeywordMatcher::new(config.scoring.fuzzy_match_threshold)
            .match_keywords(&model.raw_text, &profile.expected_keywords)
            .unwrap();
        ScoringContext {
            model,
            profile,
            keyword_matches,
            config: config.scoring,
        }
    }

    const STRONG_RESUME: &str = "Alex Kim\nalex@example.com\n\n\
        Summary\nBackend engineer with 8 years of experience building APIs.\n\n\
        Experience\n\
        - Built REST API services in Python and Golang handling 2M requests per day\n\
        - Migrated 40 microservices to Kubernetes on AWS, cutting costs 30%\n\
        - Led SQL and PostgreSQL tuning that reduced p99 latency by 45%\n\n\
        Education\nB.S. Computer Science\n\n\
        Skills\nDocker, Redis, distributed systems, CI/CD, caching, unit testing\n";

    const WEAK_RESUME: &str = "Sam Lee\n\n\
        Experience\n\
        - Responsible for stocking shelves at the grocery store\n\
        - Helped customers find products\n";

    #[test]
    fn test_score_from_ratio() {
        assert_eq!(score_from_ratio(0.0), 0);
        assert_eq!(score_from_ratio(0.7), 7);
        assert_eq!(score_from_ratio(0.69), 6);
        assert_eq!(score_from_ratio(1.0), 10);
        assert_eq!(score_from_ratio(1.7), 10);
        assert_eq!(score_from_ratio(f64::NAN), 0);
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::from_score(3), ScoreBand::Weak);
        assert_eq!(ScoreBand::from_score(4), ScoreBand::Adequate);
        assert_eq!(ScoreBand::from_score(6), ScoreBand::Adequate);
        assert_eq!(ScoreBand::from_score(7), ScoreBand::Strong);
    }

    #[test]
    fn test_keyword_match_scoring() {
        let strong = KeywordMatchScorer.score(&context(STRONG_RESUME, "Senior Backend Engineer"));
        let weak = KeywordMatchScorer.score(&context(WEAK_RESUME, "Senior Backend Engineer"));

        assert!(strong.score >= 7, "strong resume scored {}", strong.score);
        assert!(weak.score <= 2);
        assert!(weak.feedback.starts_with("Weak: "));
        assert!(weak.feedback.contains("api"));
    }

    #[test]
    fn test_quantified_impact() {
        let strong = QuantifiedImpactScorer.score(&context(STRONG_RESUME, "Backend Engineer"));
        assert_eq!(strong.score, 10);

        let weak = QuantifiedImpactScorer.score(&context(WEAK_RESUME, "Backend Engineer"));
        assert_eq!(weak.score, 0);

        let one_of_six = "Name\n\nExperience\n- Cut costs 5%\n- Wrote docs\n- Wrote code\n\
            - Wrote tests\n- Wrote specs\n- Wrote notes\n";
        let floored = QuantifiedImpactScorer.score(&context(one_of_six, "Backend Engineer"));
        assert_eq!(floored.score, 2);
    }

    #[test]
    fn test_structure_table() {
        let full = StructureScorer.score(&context(STRONG_RESUME, "Backend Engineer"));
        assert_eq!(full.score, 10);

        let partial = StructureScorer.score(&context(WEAK_RESUME, "Backend Engineer"));
        assert_eq!(partial.score, 2);
        assert!(partial.feedback.contains("missing education, skills, summary"));
    }

    #[test]
    fn test_action_language() {
        let strong = ActionLanguageScorer.score(&context(STRONG_RESUME, "Backend Engineer"));
        assert_eq!(strong.score, 10);

        let weak = ActionLanguageScorer.score(&context(WEAK_RESUME, "Backend Engineer"));
        assert_eq!(weak.score, 0);
    }

    #[test]
    fn test_conciseness() {
        let short = ConcisenessScorer.score(&context(STRONG_RESUME, "Backend Engineer"));
        assert_eq!(short.score, 10);

        let long_line = format!("- Built {}", "a very long description of work ".repeat(10));
        let resume = format!("Name\n\nExperience\n{}\n- Built things\n", long_line);
        let half = ConcisenessScorer.score(&context(&resume, "Backend Engineer"));
        assert_eq!(half.score, 5);

        let none = ConcisenessScorer.score(&context("Name\n\nSummary\nSeasoned generalist with range.", "Backend Engineer"));
        assert_eq!(none.score, 5);
    }

    #[test]
    fn test_seniority_alignment() {
        let scorer = SeniorityScorer::default();

        let aligned = scorer.score(&context(STRONG_RESUME, "Senior Backend Engineer"));
        assert_eq!(aligned.score, 10);

        let overqualified = scorer.score(&context(STRONG_RESUME, "Junior Backend Engineer"));
        assert_eq!(overqualified.score, 7);

        let junior_resume = STRONG_RESUME.replace("8 years", "1 year");
        let underqualified = scorer.score(&context(&junior_resume, "Senior Backend Engineer"));
        assert_eq!(underqualified.score, 2);

        let unspecified = scorer.score(&context(STRONG_RESUME, "Backend Engineer"));
        assert_eq!(unspecified.score, 6);

        let undetected = scorer.score(&context(WEAK_RESUME, "Senior Backend Engineer"));
        assert_eq!(undetected.score, 5);
    }

    #[tokio::test]
    async fn test_score_all_covers_every_category() {
        let ctx = Arc::new(context(STRONG_RESUME, "Senior Backend Engineer"));
        let results = score_all(&default_scorers(), ctx).await.unwrap();

        let ids: Vec<CategoryId> = results.iter().map(|r| r.category_id).collect();
        assert_eq!(ids, CategoryId::ALL.to_vec());
        assert!(results.iter().all(|r| r.score <= 10));
    }
}
