//! Console, JSON and Markdown renderings of an analysis result

use crate::config::{OutputConfig, OutputFormat};
use crate::error::{Result, ResumeScorerError};
use crate::processing::composer::AnalysisResult;
use crate::processing::rewriter;
use crate::processing::scoring::{CategoryId, ScoreBand};
use chrono::{DateTime, Utc};
use colored::{Color, Colorize};
use std::path::Path;

/// Context shown around the result. Never part of the JSON payload.
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub resume_name: String,
    pub target_role: String,
    pub generated_at: DateTime<Utc>,
}

impl ReportMeta {
    pub fn new(resume_name: impl Into<String>, target_role: impl Into<String>) -> Self {
        Self {
            resume_name: resume_name.into(),
            target_role: target_role.into(),
            generated_at: Utc::now(),
        }
    }
}

pub trait OutputFormatter {
    fn format_result(&self, result: &AnalysisResult, meta: &ReportMeta) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

pub struct ConsoleFormatter {
    use_colors: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter;

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };
        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: u32) -> String {
        let (badge, color) = match score {
            90..=100 => ("EXCELLENT", Color::Green),
            80..=89 => ("VERY GOOD", Color::BrightGreen),
            70..=79 => ("GOOD", Color::Yellow),
            60..=69 => ("FAIR", Color::BrightYellow),
            50..=59 => ("BELOW AVG", Color::Red),
            _ => ("POOR", Color::BrightRed),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_bar(&self, score: u8) -> String {
        let filled = usize::from(score.min(10));
        let bar = format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled));
        let color = match ScoreBand::from_score(score) {
            ScoreBand::Strong => Color::Green,
            ScoreBand::Adequate => Color::Yellow,
            ScoreBand::Weak => Color::Red,
        };
        self.colorize(&bar, color)
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_result(&self, result: &AnalysisResult, meta: &ReportMeta) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("📊 RESUME SCORE REPORT", 1));
        output.push_str(&format!(
            "Resume: {} | Role: {} | Generated: {}\n",
            meta.resume_name,
            meta.target_role,
            meta.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        output.push_str(&self.format_header("Overall", 2));
        output.push_str(&format!(
            "Overall Score: {}/100 {}\n",
            result.overall_score,
            self.format_score_badge(result.overall_score)
        ));

        output.push_str(&self.format_header("Category Scores", 2));
        for category in CategoryId::ALL {
            let Some(score) = result.category_scores.get(&category) else {
                continue;
            };
            output.push_str(&format!(
                "{:<26} {} {:>2}/10\n",
                category.label(),
                self.format_bar(*score),
                score
            ));
            if let Some(feedback) = result.feedback.get(&category) {
                output.push_str(&format!("  {}\n", self.colorize(feedback, Color::BrightBlack)));
            }
        }

        if !result.recommended_keywords.is_empty() {
            output.push_str(&self.format_header("🔍 Recommended Keywords", 2));
            for keyword in &result.recommended_keywords {
                output.push_str(&format!("  • {}\n", self.colorize(keyword, Color::Cyan)));
            }
        }

        if !result.bullet_rewrites.is_empty() {
            output.push_str(&self.format_header("✏️  Suggested Bullet Rewrites", 2));
            for (i, rewrite) in result.bullet_rewrites.iter().enumerate() {
                output.push_str(&format!("{}. {}\n", i + 1, self.colorize(&rewrite.original, Color::Red)));
                output.push_str(&format!("   → {}\n", self.colorize(&rewrite.suggested, Color::Green)));
                if rewriter::has_placeholder(&rewrite.suggested) {
                    output.push_str(&format!(
                        "   {}\n",
                        self.colorize("Replace the [X] placeholder with a real figure", Color::BrightBlack)
                    ));
                }
            }
        }

        if !result.summary.is_empty() {
            output.push_str(&self.format_header("Summary", 2));
            output.push_str(&format!("{}\n", result.summary));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_result(&self, result: &AnalysisResult, _meta: &ReportMeta) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(result)?)
        } else {
            Ok(serde_json::to_string(result)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    fn markdown_score_badge(score: u32) -> &'static str {
        match score {
            90..=100 => "🟢 Excellent",
            80..=89 => "🟡 Very Good",
            70..=79 => "🟠 Good",
            60..=69 => "🔴 Fair",
            50..=59 => "🔴 Below Average",
            _ => "🔴 Poor",
        }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_result(&self, result: &AnalysisResult, meta: &ReportMeta) -> Result<String> {
        let mut output = String::new();

        output.push_str("# Resume Score Report\n\n");
        output.push_str(&format!("**Resume:** {}  \n", meta.resume_name));
        output.push_str(&format!("**Target role:** {}  \n", meta.target_role));
        output.push_str(&format!(
            "**Generated:** {}\n\n",
            meta.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        output.push_str(&format!(
            "## Overall Score: {}/100 ({})\n\n",
            result.overall_score,
            Self::markdown_score_badge(result.overall_score)
        ));

        output.push_str("## Category Scores\n\n");
        output.push_str("| Category | Score | Feedback |\n");
        output.push_str("|----------|-------|----------|\n");
        for category in CategoryId::ALL {
            if let Some(score) = result.category_scores.get(&category) {
                let feedback = result.feedback.get(&category).map(String::as_str).unwrap_or_default();
                output.push_str(&format!(
                    "| {} | {}/10 | {} |\n",
                    category.label(),
                    score,
                    feedback.replace('|', "\\|")
                ));
            }
        }
        output.push('\n');

        if !result.recommended_keywords.is_empty() {
            output.push_str("## Recommended Keywords\n\n");
            output.push_str(&format!("`{}`\n\n", result.recommended_keywords.join("`, `")));
        }

        if !result.bullet_rewrites.is_empty() {
            output.push_str("## Suggested Bullet Rewrites\n\n");
            for (i, rewrite) in result.bullet_rewrites.iter().enumerate() {
                output.push_str(&format!("{}. ~~{}~~  \n   **{}**\n", i + 1, rewrite.original, rewrite.suggested));
            }
            output.push('\n');
        }

        if !result.summary.is_empty() {
            output.push_str("## Summary\n\n");
            output.push_str(&format!("{}\n", result.summary));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

/// Picks the formatter for a requested format.
pub struct ReportGenerator {
    formatters: Vec<Box<dyn OutputFormatter>>,
}

impl ReportGenerator {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            formatters: vec![
                Box::new(ConsoleFormatter::new(config.color_output)),
                Box::new(JsonFormatter::new(config.pretty_json)),
                Box::new(MarkdownFormatter),
            ],
        }
    }

    pub fn generate(&self, result: &AnalysisResult, meta: &ReportMeta, format: OutputFormat) -> Result<String> {
        let formatter = self
            .formatters
            .iter()
            .find(|formatter| formatter.supports_format() == format)
            .ok_or_else(|| ResumeScorerError::OutputFormatting(format!("No formatter for {:?}", format)))?;
        formatter.format_result(result, meta)
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content).map_err(|e| {
        ResumeScorerError::OutputFormatting(format!("Failed to write {}: {}", file_path.display(), e))
    })
}

pub fn suggest_filename(format: OutputFormat, resume_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(resume_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}_score{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}_score{}.json", base_name, timestamp_suffix),
        OutputFormat::Markdown => format!("{}_score{}.md", base_name, timestamp_suffix),
    }
}
