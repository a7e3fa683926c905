//! Document format detection from declared MIME types and file extensions

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Text,
    Markdown,
    Unknown,
}

impl DocumentFormat {
    /// Parameters such as `; charset=utf-8` are ignored.
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        match essence.as_str() {
            "application/pdf" | "application/x-pdf" => DocumentFormat::Pdf,
            "text/plain" => DocumentFormat::Text,
            "text/markdown" | "text/x-markdown" => DocumentFormat::Markdown,
            _ => DocumentFormat::Unknown,
        }
    }

    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => DocumentFormat::Pdf,
            "txt" => DocumentFormat::Text,
            "md" | "markdown" => DocumentFormat::Markdown,
            _ => DocumentFormat::Unknown,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Text => "text/plain",
            DocumentFormat::Markdown => "text/markdown",
            DocumentFormat::Unknown => "application/octet-stream",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, DocumentFormat::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_detection_ignores_parameters_and_case() {
        assert_eq!(DocumentFormat::from_mime("application/pdf"), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_mime("Text/Plain; charset=utf-8"), DocumentFormat::Text);
        assert_eq!(DocumentFormat::from_mime("text/markdown"), DocumentFormat::Markdown);
        assert_eq!(DocumentFormat::from_mime("image/png"), DocumentFormat::Unknown);
        assert_eq!(DocumentFormat::from_mime(""), DocumentFormat::Unknown);
    }

    #[test]
    fn test_extension_maps_to_mime() {
        for ext in ["pdf", "TXT", "md", "markdown"] {
            let format = DocumentFormat::from_extension(ext);
            assert!(format.is_supported());
            assert_eq!(DocumentFormat::from_mime(format.mime_type()), format);
        }
        assert!(!DocumentFormat::from_extension("docx").is_supported());
    }
}
