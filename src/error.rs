//! Error handling for the resume scorer

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeScorerError {
    #[error("File format not supported: {0}. Please re-upload a PDF, plain text or Markdown document")]
    UnsupportedFormat(String),

    #[error("Document is too short to analyze: {chars} characters extracted, at least {minimum} required")]
    EmptyDocument { chars: usize, minimum: usize },

    #[error("Target role must not be empty")]
    EmptyRole,

    #[error("External service timed out after {0:?}")]
    ExternalServiceTimeout(Duration),

    #[error("No taxonomy entry for role: {0}")]
    TaxonomyLookupMiss(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

impl ResumeScorerError {
    /// Errors the caller must show to the user. Everything else is absorbed
    /// inside the pipeline or indicates a deployment problem.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            ResumeScorerError::UnsupportedFormat(_)
                | ResumeScorerError::EmptyDocument { .. }
                | ResumeScorerError::EmptyRole
        )
    }
}

pub type Result<T> = std::result::Result<T, ResumeScorerError>;

impl From<reqwest::Error> for ResumeScorerError {
    fn from(err: reqwest::Error) -> Self {
        ResumeScorerError::Network(err.to_string())
    }
}
