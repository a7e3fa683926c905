//! Resume document structures and the document normalizer

use crate::config::NormalizerConfig;
use crate::error::{Result, ResumeScorerError};
use crate::input::file_detector::DocumentFormat;
use crate::input::text_extractor;
use crate::processing::lexicon;
use crate::processing::text_processor::TextProcessor;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Lines before the first recognized header, usually the contact block.
    Preamble,
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
}

impl SectionKind {
    /// Sections whose bulleted lines become `Bullet`s.
    pub fn carries_bullets(&self) -> bool {
        matches!(self, SectionKind::Experience | SectionKind::Projects)
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SectionKind::Preamble => write!(f, "Preamble"),
            SectionKind::Summary => write!(f, "Summary"),
            SectionKind::Experience => write!(f, "Experience"),
            SectionKind::Education => write!(f, "Education"),
            SectionKind::Skills => write!(f, "Skills"),
            SectionKind::Projects => write!(f, "Projects"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub text: String,
    pub section_kind: SectionKind,
    pub has_metric: bool,
    pub leading_verb: Option<String>,
    pub length_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeModel {
    pub raw_text: String,
    pub sections: BTreeMap<SectionKind, Vec<String>>,
    pub bullets: Vec<Bullet>,
    pub contact_present: bool,
}

impl ResumeModel {
    /// A section counts as present once its header was seen, even if empty.
    pub fn has_section(&self, kind: SectionKind) -> bool {
        self.sections.contains_key(&kind)
    }
}

/// Header rule: a short line matching `pattern` opens a `kind` section.
struct SectionRule {
    kind: SectionKind,
    pattern: Regex,
}

// Evaluated in order; the first matching rule wins.
static SECTION_RULES: LazyLock<Vec<SectionRule>> = LazyLock::new(|| {
    let rule = |kind, pattern: &str| SectionRule {
        kind,
        pattern: Regex::new(pattern).expect("Invalid regex: section header rule"),
    };
    vec![
        rule(SectionKind::Experience, r"(?i)\b(experience|employment|work history|career history)\b"),
        rule(SectionKind::Education, r"(?i)\b(education|academic background|qualifications)\b"),
        rule(SectionKind::Skills, r"(?i)\b(skills|competencies|technologies|tech stack|expertise)\b"),
        rule(SectionKind::Summary, r"(?i)\b(summary|profile|objective|about me)\b"),
        rule(SectionKind::Projects, r"(?i)\b(projects|portfolio)\b"),
    ]
});

static NUMBERED_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}[.)]\s+").expect("Invalid regex: numbered bullet"));

static METRIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[$€£]\s?\d|\d+(?:[.,]\d+)*\s*(%|percent\b|x\b|k\b|m\b|\+)?|\b(doubled|tripled|halved)\b")
        .expect("Invalid regex: metric pattern")
});

const BULLET_GLYPHS: &[char] = &[
    '•', '◦', '▪', '‣', '●', '■', '□', '◆', '►', '➢', '✓', '·', '\u{f0b7}', '\u{f0a7}',
];

/// Document normalizer: raw bytes plus declared MIME type in, `ResumeModel` out.
pub struct DocumentNormalizer {
    config: NormalizerConfig,
    text_processor: TextProcessor,
}

impl DocumentNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self {
            config,
            text_processor: TextProcessor::new(),
        }
    }

    pub fn normalize(&self, raw_bytes: &[u8], mime_type: &str) -> Result<ResumeModel> {
        let format = DocumentFormat::from_mime(mime_type);
        if !format.is_supported() {
            return Err(ResumeScorerError::UnsupportedFormat(mime_type.to_string()));
        }

        let extracted = text_extractor::extract_text(raw_bytes, format)?;
        self.normalize_text(&extracted)
    }

    /// Segment already-extracted text.
    pub fn normalize_text(&self, text: &str) -> Result<ResumeModel> {
        let raw_text = self.text_processor.normalize_unicode(text);

        let chars = raw_text.chars().filter(|c| !c.is_whitespace()).count();
        if chars < self.config.min_document_chars {
            return Err(ResumeScorerError::EmptyDocument {
                chars,
                minimum: self.config.min_document_chars,
            });
        }

        let mut sections: BTreeMap<SectionKind, Vec<String>> = BTreeMap::new();
        let mut bullets: Vec<Bullet> = Vec::new();
        let mut current = SectionKind::Preamble;
        // Index into `bullets` of the bullet a wrapped line may continue.
        let mut open_bullet: Option<usize> = None;

        for raw_line in raw_text.lines() {
            let line = self.text_processor.normalize_whitespace(raw_line);
            if line.is_empty() {
                open_bullet = None;
                continue;
            }

            if let Some((kind, inline)) = self.classify_header(&line, current) {
                current = kind;
                open_bullet = None;
                let blocks = sections.entry(kind).or_default();
                if let Some(inline) = inline {
                    blocks.push(inline);
                }
                continue;
            }

            if current.carries_bullets() {
                if let Some(content) = strip_bullet_marker(&line) {
                    bullets.push(self.build_bullet(content, current));
                    open_bullet = Some(bullets.len() - 1);
                } else if let Some(idx) = open_bullet.filter(|_| starts_lowercase(&line)) {
                    let merged = format!("{} {}", bullets[idx].text, line);
                    bullets[idx] = self.build_bullet(&merged, current);
                } else {
                    open_bullet = None;
                }
            }

            sections.entry(current).or_default().push(line);
        }

        let contact_present = match sections.get(&SectionKind::Preamble) {
            Some(preamble) => self.text_processor.has_contact_info(&preamble.join("\n")),
            None => false,
        };

        debug!(
            "Normalized resume: {} sections, {} bullets, contact block: {}",
            sections.len(),
            bullets.len(),
            contact_present
        );

        Ok(ResumeModel {
            raw_text,
            sections,
            bullets,
            contact_present,
        })
    }

    /// Returns the section a header line opens, plus any content after a colon
    /// (`Skills: Rust, Go`). Inside experience or projects, a labelled line such
    /// as `Technologies: Rust, Go` belongs to the entry and opens nothing.
    fn classify_header(&self, line: &str, current: SectionKind) -> Option<(SectionKind, Option<String>)> {
        if strip_bullet_marker(line).is_some() {
            return None;
        }

        let (head, inline) = match line.split_once(':') {
            Some((head, rest)) => {
                let rest = rest.trim();
                (head.trim(), (!rest.is_empty()).then(|| rest.to_string()))
            }
            None => (line, None),
        };

        if inline.is_some() && current.carries_bullets() {
            return None;
        }

        if head.is_empty()
            || head.chars().count() > self.config.max_header_chars
            || head.split_whitespace().count() > 5
            || head.ends_with('.')
            || head.chars().any(|c| c.is_ascii_digit())
        {
            return None;
        }

        SECTION_RULES
            .iter()
            .find(|rule| rule.pattern.is_match(head))
            .map(|rule| (rule.kind, inline))
    }

    fn build_bullet(&self, content: &str, section_kind: SectionKind) -> Bullet {
        let leading_verb = self
            .text_processor
            .first_word(content)
            .filter(|word| lexicon::is_verb_like(word));

        Bullet {
            text: content.to_string(),
            section_kind,
            has_metric: has_metric(content),
            leading_verb,
            length_chars: content.chars().count(),
        }
    }
}

/// Text after a bullet glyph, short dash or list number, if the line is a bullet.
pub fn strip_bullet_marker(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let mut chars = trimmed.chars();
    let first = chars.next()?;

    let rest = if BULLET_GLYPHS.contains(&first) {
        chars.as_str()
    } else if first == '-' || first == '*' {
        let after = trimmed.trim_start_matches('-');
        let after = if first == '*' { &trimmed[1..] } else { after };
        let dashes = trimmed.len() - after.len();
        if dashes > 2 || !after.starts_with(char::is_whitespace) {
            return None;
        }
        after
    } else if let Some(m) = NUMBERED_BULLET.find(trimmed) {
        &trimmed[m.end()..]
    } else {
        return None;
    };

    let content = rest.trim();
    (!content.is_empty()).then_some(content)
}

/// True when the text carries a number, percentage or currency amount. Bare
/// four-digit years do not count.
pub fn has_metric(text: &str) -> bool {
    METRIC.captures_iter(text).any(|cap| {
        let whole = cap.get(0).map(|m| m.as_str()).unwrap_or_default().trim();
        let has_suffix = cap.get(1).is_some();
        !(is_year(whole) && !has_suffix)
    })
}

fn is_year(token: &str) -> bool {
    token.len() == 4
        && token
            .parse::<u32>()
            .map(|n| (1950..=2099).contains(&n))
            .unwrap_or(false)
}

fn starts_lowercase(line: &str) -> bool {
    line.chars().next().map_or(false, |c| c.is_lowercase())
}
