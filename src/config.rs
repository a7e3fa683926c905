//! Configuration management for the resume scorer

use crate::error::{Result, ResumeScorerError};
use crate::processing::scoring::CategoryId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub normalizer: NormalizerConfig,
    pub scoring: ScoringConfig,
    pub rewriter: RewriterConfig,
    #[serde(default)]
    pub taxonomy: TaxonomyConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Documents with fewer non-whitespace characters are rejected.
    pub min_document_chars: usize,
    /// Longer lines are never treated as section headers.
    pub max_header_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub bullet_length_threshold: usize,
    pub max_recommended_keywords: usize,
    /// Jaro-Winkler similarity above which a single-word keyword counts as present.
    pub fuzzy_match_threshold: Option<f64>,
    pub weights: CategoryWeights,
}

/// Aggregation weights, one per category. Must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    pub keyword_match: f64,
    pub quantified_impact: f64,
    pub structure_completeness: f64,
    pub action_language: f64,
    pub conciseness: f64,
    pub seniority_alignment: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriterConfig {
    pub mode: RewriteMode,
    pub max_rewrites: usize,
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteMode {
    RuleBased,
    Assisted,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
    pub pretty_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            keyword_match: 0.30,
            quantified_impact: 0.20,
            structure_completeness: 0.10,
            action_language: 0.15,
            conciseness: 0.10,
            seniority_alignment: 0.15,
        }
    }
}

impl CategoryWeights {
    pub fn get(&self, category: CategoryId) -> f64 {
        match category {
            CategoryId::KeywordMatch => self.keyword_match,
            CategoryId::QuantifiedImpact => self.quantified_impact,
            CategoryId::StructureCompleteness => self.structure_completeness,
            CategoryId::ActionLanguage => self.action_language,
            CategoryId::Conciseness => self.conciseness,
            CategoryId::SeniorityAlignment => self.seniority_alignment,
        }
    }

    pub fn total(&self) -> f64 {
        CategoryId::ALL.iter().map(|c| self.get(*c)).sum()
    }

    pub fn validate(&self) -> Result<()> {
        for category in CategoryId::ALL {
            let weight = self.get(category);
            if !weight.is_finite() || weight < 0.0 {
                return Err(ResumeScorerError::Configuration(format!(
                    "Weight for {} must be a non-negative number, got {}",
                    category, weight
                )));
            }
        }

        let total = self.total();
        if (total - 1.0).abs() > 1e-3 {
            return Err(ResumeScorerError::Configuration(format!(
                "Category weights must sum to 1.0, got {:.3}",
                total
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            normalizer: NormalizerConfig {
                min_document_chars: 30,
                max_header_chars: 48,
            },
            scoring: ScoringConfig {
                bullet_length_threshold: 220,
                max_recommended_keywords: 8,
                fuzzy_match_threshold: Some(0.94),
                weights: CategoryWeights::default(),
            },
            rewriter: RewriterConfig {
                mode: RewriteMode::RuleBased,
                max_rewrites: 5,
                endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
                model: "gpt-3.5-turbo".to_string(),
                api_key_env: "OPENAI_API_KEY".to_string(),
                timeout_secs: 5,
            },
            taxonomy: TaxonomyConfig::default(),
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
                pretty_json: true,
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            ResumeScorerError::Configuration(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            ResumeScorerError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-scorer")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        self.scoring.weights.validate()?;

        if self.scoring.bullet_length_threshold == 0 {
            return Err(ResumeScorerError::Configuration(
                "scoring.bullet_length_threshold must be greater than zero".to_string(),
            ));
        }
        if self.scoring.max_recommended_keywords == 0 {
            return Err(ResumeScorerError::Configuration(
                "scoring.max_recommended_keywords must be greater than zero".to_string(),
            ));
        }
        if let Some(threshold) = self.scoring.fuzzy_match_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ResumeScorerError::Configuration(format!(
                    "scoring.fuzzy_match_threshold must be within [0, 1], got {}",
                    threshold
                )));
            }
        }
        if self.rewriter.max_rewrites == 0 {
            return Err(ResumeScorerError::Configuration(
                "rewriter.max_rewrites must be greater than zero".to_string(),
            ));
        }
        if self.rewriter.timeout_secs == 0 {
            return Err(ResumeScorerError::Configuration(
                "rewriter.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
