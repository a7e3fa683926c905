//! Analysis engine: document and role in, `AnalysisResult` out

use crate::config::Config;
use crate::error::Result;
use crate::processing::composer::{AnalysisResult, ResultComposer};
use crate::processing::document::DocumentNormalizer;
use crate::processing::gap;
use crate::processing::keywords::KeywordMatcher;
use crate::processing::rewriter::{self, BulletRewriter};
use crate::processing::role::TaxonomyStore;
use crate::processing::scoring::{self, CategoryScorer, ScoringContext};
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

/// Stateless per request. The only shared state is the taxonomy store.
pub struct AnalysisEngine {
    config: Config,
    taxonomy: Arc<TaxonomyStore>,
    normalizer: DocumentNormalizer,
    keyword_matcher: KeywordMatcher,
    scorers: Vec<Arc<dyn CategoryScorer>>,
    rewriter: Box<dyn BulletRewriter>,
    composer: ResultComposer,
}

impl AnalysisEngine {
    /// Engine with the configured taxonomy and rewriter.
    pub fn new(config: Config) -> Result<Self> {
        let taxonomy = Arc::new(TaxonomyStore::from_config(&config.taxonomy)?);
        Self::with_taxonomy(config, taxonomy)
    }

    pub fn with_taxonomy(config: Config, taxonomy: Arc<TaxonomyStore>) -> Result<Self> {
        config.validate()?;
        let rewriter = rewriter::build_rewriter(&config.rewriter, config.scoring.bullet_length_threshold)?;

        Ok(Self {
            normalizer: DocumentNormalizer::new(config.normalizer.clone()),
            keyword_matcher: KeywordMatcher::new(config.scoring.fuzzy_match_threshold),
            scorers: scoring::default_scorers(),
            composer: ResultComposer::new(config.scoring.weights),
            rewriter,
            taxonomy,
            config,
        })
    }

    pub fn with_rewriter(mut self, rewriter: Box<dyn BulletRewriter>) -> Self {
        self.rewriter = rewriter;
        self
    }

    pub fn taxonomy(&self) -> &Arc<TaxonomyStore> {
        &self.taxonomy
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the full pipeline. Only unsupported formats, empty documents and
    /// blank roles fail; everything else degrades into a complete result.
    pub async fn analyze(&self, raw_bytes: &[u8], mime_type: &str, target_role: &str) -> Result<AnalysisResult> {
        let started = Instant::now();

        let model = self.normalizer.normalize(raw_bytes, mime_type)?;
        // One snapshot for the whole request, even if a reload lands meanwhile.
        let profile = self.taxonomy.snapshot().resolve(target_role)?;
        info!(
            "Analyzing resume for '{}' (family: {}, seniority: {})",
            profile.title, profile.family, profile.expected_seniority_cue
        );

        let keyword_matches = self
            .keyword_matcher
            .match_keywords(&model.raw_text, &profile.expected_keywords)?;
        debug!(
            "Matched keywords: {:?}",
            keyword_matches
                .iter()
                .filter(|m| m.present)
                .map(|m| m.term.as_str())
                .collect::<Vec<_>>()
        );

        let recommended_keywords =
            gap::recommend_keywords(&keyword_matches, self.config.scoring.max_recommended_keywords);

        let selected = rewriter::select_for_rewrite(
            &model.bullets,
            self.config.scoring.bullet_length_threshold,
            self.config.rewriter.max_rewrites,
        )
        .into_iter()
        .cloned()
        .collect::<Vec<_>>();
        debug!("Selected {} of {} bullets for rewriting", selected.len(), model.bullets.len());

        let ctx = Arc::new(ScoringContext {
            model,
            profile,
            keyword_matches,
            config: self.config.scoring.clone(),
        });

        // Scorers run on the blocking pool while the rewriter awaits.
        let (category_results, bullet_rewrites) = tokio::join!(
            scoring::score_all(&self.scorers, Arc::clone(&ctx)),
            self.rewriter.rewrite(&selected, &ctx.profile),
        );

        let result = self
            .composer
            .compose(category_results?, recommended_keywords, bullet_rewrites?)?;

        info!(
            "Analysis complete: overall score {} in {}ms",
            result.overall_score,
            started.elapsed().as_millis()
        );
        Ok(result)
    }
}
