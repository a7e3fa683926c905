//! Text extraction from document bytes

use crate::error::{Result, ResumeScorerError};
use crate::input::file_detector::DocumentFormat;
use pulldown_cmark::{html, Parser};
use regex::Regex;
use std::sync::LazyLock;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid regex: html tag pattern"));

pub trait TextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
            ResumeScorerError::PdfExtraction(format!("Failed to extract text from PDF: {}", e))
        })
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let markdown_content = String::from_utf8_lossy(bytes);

        let parser = Parser::new(&markdown_content);
        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);

        Ok(self.html_to_text(&html_output))
    }
}

impl MarkdownExtractor {
    /// List items keep a leading bullet glyph so experience bullets survive extraction.
    fn html_to_text(&self, html: &str) -> String {
        let text = html
            .replace("<li>", "\n• ")
            .replace("<br>", "\n")
            .replace("<br />", "\n")
            .replace("</p>", "\n\n")
            .replace("</h1>", "\n")
            .replace("</h2>", "\n")
            .replace("</h3>", "\n");

        // Entities are decoded only after tags are gone, so `&lt;200ms` stays text.
        let clean_text = HTML_TAG
            .replace_all(&text, "")
            .replace("&nbsp;", " ")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&");

        let lines: Vec<&str> = clean_text
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect();

        lines.join("\n")
    }
}

/// Route bytes to the extractor for `format`.
pub fn extract_text(bytes: &[u8], format: DocumentFormat) -> Result<String> {
    match format {
        DocumentFormat::Pdf => PdfExtractor.extract(bytes),
        DocumentFormat::Text => PlainTextExtractor.extract(bytes),
        DocumentFormat::Markdown => MarkdownExtractor.extract(bytes),
        DocumentFormat::Unknown => Err(ResumeScorerError::UnsupportedFormat(
            "unknown document type".to_string(),
        )),
    }
}
