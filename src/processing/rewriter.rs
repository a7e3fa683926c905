//! Bullet selection and rewrite suggestions

use crate::config::{RewriteMode, RewriterConfig};
use crate::error::{Result, ResumeScorerError};
use crate::llm::prompts::{self, REWRITE_SYSTEM_PROMPT};
use crate::llm::ChatClient;
use crate::processing::document::{self, Bullet};
use crate::processing::lexicon::{self, DEFAULT_STRONG_VERB};
use crate::processing::role::RoleProfile;
use crate::processing::text_processor::TextProcessor;
use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::time::Duration;

/// Appended to bullets that state no measurable result.
const METRIC_PLACEHOLDER: &str = ", improving [metric] by [X]%";

const FILLERS: &[(&str, &str)] = &[
    (" in order to ", " to "),
    (" a number of ", " several "),
    (" was able to ", " "),
    (" successfully ", " "),
    (" really ", " "),
    (" very ", " "),
];

/// Openers that can be lowercased when a verb is put in front of them.
const LOWERCASE_OPENERS: &[&str] = &[
    "the", "a", "an", "our", "my", "all", "several", "multiple", "various", "new", "daily", "weekly",
    "team", "teams",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletRewrite {
    pub original: String,
    pub suggested: String,
}

/// One point each for: no metric, a weak or missing opening verb, over the
/// length threshold.
pub fn weakness_score(bullet: &Bullet, length_threshold: usize) -> u8 {
    u8::from(!bullet.has_metric) + u8::from(has_weak_opening(bullet)) + u8::from(bullet.length_chars > length_threshold)
}

/// True exactly when `strengthen_opening` would change the bullet's first words.
/// Action verbs outside the curated lists are left as written.
pub fn has_weak_opening(bullet: &Bullet) -> bool {
    bullet.leading_verb.is_none() || lexicon::match_weak_lead(&bullet.text).is_some()
}

/// Weakest bullets first, document order among equals, at most `limit`.
pub fn select_for_rewrite(bullets: &[Bullet], length_threshold: usize, limit: usize) -> Vec<&Bullet> {
    let mut candidates: Vec<(&Bullet, u8)> = bullets
        .iter()
        .map(|b| (b, weakness_score(b, length_threshold)))
        .filter(|(_, score)| *score > 0)
        .collect();
    candidates.sort_by_key(|(_, score)| Reverse(*score));
    candidates.into_iter().take(limit).map(|(b, _)| b).collect()
}

#[async_trait]
pub trait BulletRewriter: Send + Sync {
    /// Suggest rewrites for already-selected bullets. Bullets whose suggestion
    /// would equal the original are left out.
    async fn rewrite(&self, bullets: &[Bullet], role: &RoleProfile) -> Result<Vec<BulletRewrite>>;
}

/// Deterministic rewrites from the verb lexicon and a few text rules.
pub struct RuleBasedRewriter {
    max_chars: usize,
}

impl RuleBasedRewriter {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn rewrite_bullet(&self, bullet: &Bullet) -> Option<String> {
        let original = bullet.text.trim();
        let opened = strengthen_opening(original, bullet);
        let tightened = tighten(&opened);
        let body = tightened.trim_end_matches(|c: char| c == '.' || c == ';' || c == ',' || c.is_whitespace());

        let suffix = if bullet.has_metric { "" } else { METRIC_PLACEHOLDER };
        let budget = self.max_chars.saturating_sub(suffix.chars().count());
        let body = fit_to_length(body, budget);
        if body.is_empty() {
            return None;
        }

        let suggested = format!("{}{}", body, suffix);
        (suggested != original).then_some(suggested)
    }
}

#[async_trait]
impl BulletRewriter for RuleBasedRewriter {
    async fn rewrite(&self, bullets: &[Bullet], _role: &RoleProfile) -> Result<Vec<BulletRewrite>> {
        Ok(bullets
            .iter()
            .filter_map(|bullet| {
                self.rewrite_bullet(bullet).map(|suggested| BulletRewrite {
                    original: bullet.text.clone(),
                    suggested,
                })
            })
            .collect())
    }
}

/// Rewrites from a chat-completions model, bounded by a deadline.
pub struct AssistedRewriter {
    client: ChatClient,
    timeout: Duration,
    max_chars: usize,
    text_processor: TextProcessor,
    // Fills in bullets the model left blank.
    rules: RuleBasedRewriter,
}

impl AssistedRewriter {
    pub fn new(client: ChatClient, timeout: Duration, max_chars: usize) -> Self {
        Self {
            client,
            timeout,
            max_chars,
            text_processor: TextProcessor::new(),
            rules: RuleBasedRewriter::new(max_chars),
        }
    }
}

#[async_trait]
impl BulletRewriter for AssistedRewriter {
    async fn rewrite(&self, bullets: &[Bullet], role: &RoleProfile) -> Result<Vec<BulletRewrite>> {
        if bullets.is_empty() {
            return Ok(Vec::new());
        }

        let outgoing: Vec<String> = bullets
            .iter()
            .map(|b| self.text_processor.remove_pii(&b.text))
            .collect();
        let prompt = prompts::render_rewrite_prompt(&role.title, &outgoing, self.max_chars);

        debug!("Requesting assisted rewrites for {} bullets", bullets.len());
        let reply = tokio::time::timeout(self.timeout, self.client.complete(REWRITE_SYSTEM_PROMPT, &prompt))
            .await
            .map_err(|_| ResumeScorerError::ExternalServiceTimeout(self.timeout))??;

        let suggestions = prompts::parse_rewrite_response(&reply)?;
        if suggestions.len() != bullets.len() {
            return Err(ResumeScorerError::Processing(format!(
                "Expected {} rewrites, model returned {}",
                bullets.len(),
                suggestions.len()
            )));
        }

        Ok(bullets
            .iter()
            .zip(suggestions)
            .filter_map(|(bullet, suggested)| {
                let suggested = if suggested.is_empty() {
                    debug!("Model left a bullet blank; using the rule-based rewrite");
                    self.rules.rewrite_bullet(bullet)?
                } else {
                    suggested
                };
                (bullet.text.trim() != suggested).then(|| BulletRewrite {
                    original: bullet.text.clone(),
                    suggested,
                })
            })
            .collect())
    }
}

/// Tries `primary` and answers from `fallback` if it fails for any reason.
pub struct FallbackRewriter {
    primary: Box<dyn BulletRewriter>,
    fallback: RuleBasedRewriter,
}

impl FallbackRewriter {
    pub fn new(primary: Box<dyn BulletRewriter>, fallback: RuleBasedRewriter) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl BulletRewriter for FallbackRewriter {
    async fn rewrite(&self, bullets: &[Bullet], role: &RoleProfile) -> Result<Vec<BulletRewrite>> {
        match self.primary.rewrite(bullets, role).await {
            Ok(rewrites) => Ok(rewrites),
            Err(err) => {
                warn!("Assisted rewrite unavailable ({}); using rule-based rewrites", err);
                self.fallback.rewrite(bullets, role).await
            }
        }
    }
}

/// Rewriter for the configured mode. Assisted mode always carries the
/// rule-based fallback.
pub fn build_rewriter(config: &RewriterConfig, max_chars: usize) -> Result<Box<dyn BulletRewriter>> {
    match config.mode {
        RewriteMode::RuleBased => Ok(Box::new(RuleBasedRewriter::new(max_chars))),
        RewriteMode::Assisted => {
            info!("Assisted rewrites enabled via {} ({})", config.endpoint, config.model);
            let client = ChatClient::from_config(config)?;
            let assisted = AssistedRewriter::new(client, Duration::from_secs(config.timeout_secs), max_chars);
            Ok(Box::new(FallbackRewriter::new(
                Box::new(assisted),
                RuleBasedRewriter::new(max_chars),
            )))
        }
    }
}

fn strengthen_opening(text: &str, bullet: &Bullet) -> String {
    if !has_weak_opening(bullet) {
        return text.to_string();
    }

    // "Was responsible for" collapses to a single replacement.
    let mut rest = text;
    let mut replacement = None;
    while let Some((len, verb)) = lexicon::match_weak_lead(rest) {
        let Some(tail) = rest.get(len..) else {
            break;
        };
        replacement = Some(verb);
        rest = tail.trim_start();
    }

    match replacement {
        Some(verb) => join_opening(verb, rest),
        None if bullet.leading_verb.is_none() => join_opening(DEFAULT_STRONG_VERB, text),
        None => text.to_string(),
    }
}

fn join_opening(verb: &str, rest: &str) -> String {
    if rest.is_empty() {
        return verb.to_string();
    }

    let first_word = rest.split_whitespace().next().unwrap_or_default();
    let rest = if LOWERCASE_OPENERS.contains(&first_word.to_lowercase().as_str()) {
        let mut chars = rest.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        rest.to_string()
    };
    format!("{} {}", verb, rest)
}

fn tighten(text: &str) -> String {
    let mut tightened = format!(" {} ", text);
    for (filler, replacement) in FILLERS {
        tightened = tightened.replace(filler, replacement);
    }
    tightened.trim().to_string()
}

/// Cut to at most `budget` characters, preferring a clause break in the
/// second half, then a word break.
fn fit_to_length(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }

    let cut: String = text.chars().take(budget).collect();
    let clause_end = cut
        .rfind(|c: char| c == ',' || c == ';')
        .filter(|&idx| cut[..idx].chars().count() >= budget / 2);
    let end = clause_end.or_else(|| cut.rfind(' ')).unwrap_or(cut.len());

    cut[..end]
        .trim_end_matches(|c: char| c == ',' || c == ';' || c == '-' || c.is_whitespace())
        .to_string()
}

/// Whether a rewrite still needs the author to fill in a number.
pub fn has_placeholder(suggested: &str) -> bool {
    suggested.contains("[X]") && !document::has_metric(suggested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::document::SectionKind;
    use crate::processing::role::RoleTaxonomy;
    use crate::processing::text_processor::TextProcessor;

    fn bullet(text: &str) -> Bullet {
        let processor = TextProcessor::new();
        Bullet {
            text: text.to_string(),
            section_kind: SectionKind::Experience,
            has_metric: document::has_metric(text),
            leading_verb: processor.first_word(text).filter(|w| lexicon::is_verb_like(w)),
            length_chars: text.chars().count(),
        }
    }

    fn role() -> RoleProfile {
        RoleTaxonomy::embedded().unwrap().resolve("Backend Engineer").unwrap()
    }

    #[test]
    fn test_weakness_score() {
        assert_eq!(weakness_score(&bullet("Managed team of 10, increased revenue 20%"), 220), 0);
        assert_eq!(weakness_score(&bullet("Managed the team"), 220), 1);
        assert_eq!(weakness_score(&bullet("Responsible for the billing service"), 220), 2);
        let long = format!("Helped {}", "with many small things ".repeat(12));
        assert_eq!(weakness_score(&bullet(&long), 220), 3);
    }

    #[test]
    fn test_selection_order_and_cap() {
        let bullets = vec![
            bullet("Managed team of 10, increased revenue 20%"),
            bullet("Built the deploy tool"),
            bullet("Responsible for the billing service"),
            bullet("Worked on dashboards"),
        ];
        let selected = select_for_rewrite(&bullets, 220, 2);
        let texts: Vec<&str> = selected.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["Responsible for the billing service", "Worked on dashboards"]);

        let all = select_for_rewrite(&bullets, 220, 5);
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|b| !b.text.starts_with("Managed team of 10")));
    }

    #[test]
    fn test_weak_lead_is_replaced() {
        let rewriter = RuleBasedRewriter::new(220);
        let suggested = rewriter.rewrite_bullet(&bullet("Responsible for the billing service.")).unwrap();
        assert_eq!(suggested, "Led the billing service, improving [metric] by [X]%");
        assert!(has_placeholder(&suggested));

        let chained = rewriter.rewrite_bullet(&bullet("Was responsible for onboarding")).unwrap();
        assert!(chained.starts_with("Led onboarding"));
    }

    #[test]
    fn test_missing_verb_gets_default() {
        let rewriter = RuleBasedRewriter::new(220);
        let suggested = rewriter.rewrite_bullet(&bullet("The quarterly audit for 12 regions")).unwrap();
        assert_eq!(suggested, "Delivered the quarterly audit for 12 regions");
    }

    #[test]
    fn test_long_bullet_is_shortened() {
        let rewriter = RuleBasedRewriter::new(80);
        let text = "Built a very large internal platform in order to support 30 product teams, \
                    including onboarding, billing, reporting and a number of other services";
        let suggested = rewriter.rewrite_bullet(&bullet(text)).unwrap();

        assert!(suggested.chars().count() <= 80, "{}", suggested);
        assert!(suggested.starts_with("Built a large internal platform to support 30 product teams"));
        assert!(!suggested.ends_with(','));
    }

    #[test]
    fn test_unlisted_action_verb_is_not_a_weak_opening() {
        let reconciled = bullet("Reconciled vendor accounts");
        assert!(!has_weak_opening(&reconciled));
        assert_eq!(weakness_score(&reconciled, 220), 1);

        let rewriter = RuleBasedRewriter::new(220);
        let suggested = rewriter.rewrite_bullet(&reconciled).unwrap();
        assert_eq!(suggested, "Reconciled vendor accounts, improving [metric] by [X]%");

        for text in ["Worked on dashboards", "Handled escalations", "The quarterly audit"] {
            let weak = bullet(text);
            assert!(has_weak_opening(&weak), "{}", text);
            let suggested = rewriter.rewrite_bullet(&weak).unwrap();
            let first = TextProcessor::new().first_word(&suggested).unwrap();
            assert!(lexicon::is_strong_verb(&first), "{} -> {}", text, suggested);
        }
    }

    #[test]
    fn test_unchanged_bullet_is_skipped() {
        let rewriter = RuleBasedRewriter::new(220);
        assert!(rewriter.rewrite_bullet(&bullet("Managed team of 10, increased revenue 20%")).is_none());
    }

    #[test]
    fn test_rewrites_open_with_strong_verbs() {
        let rewriter = RuleBasedRewriter::new(220);
        for text in ["Worked on dashboards", "Used Python for reports", "Handled escalations", "Helped with hiring"] {
            let suggested = rewriter.rewrite_bullet(&bullet(text)).unwrap();
            let first = TextProcessor::new().first_word(&suggested).unwrap();
            assert!(lexicon::is_strong_verb(&first), "{} -> {}", text, suggested);
        }
    }

    struct FailingRewriter;

    #[async_trait]
    impl BulletRewriter for FailingRewriter {
        async fn rewrite(&self, _bullets: &[Bullet], _role: &RoleProfile) -> Result<Vec<BulletRewrite>> {
            Err(ResumeScorerError::ExternalServiceTimeout(Duration::from_secs(5)))
        }
    }

    #[tokio::test]
    async fn test_fallback_on_failure() {
        let rewriter = FallbackRewriter::new(Box::new(FailingRewriter), RuleBasedRewriter::new(220));
        let bullets = vec![bullet("Worked on dashboards")];
        let rewrites = rewriter.rewrite(&bullets, &role()).await.unwrap();

        assert_eq!(rewrites.len(), 1);
        assert_eq!(rewrites[0].original, "Worked on dashboards");
        assert!(rewrites[0].suggested.starts_with("Developed dashboards"));
    }

    #[test]
    fn test_fit_to_length_prefers_clause_break() {
        let text = "Shipped the new checkout flow across web and mobile, then iterated on conversion";
        assert_eq!(fit_to_length(text, 60), "Shipped the new checkout flow across web and mobile");
        assert_eq!(fit_to_length("short", 60), "short");
    }
}
