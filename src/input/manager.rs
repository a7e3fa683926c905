//! Input manager for loading resume documents from disk

use crate::error::{Result, ResumeScorerError};
use crate::input::file_detector::DocumentFormat;
use log::info;
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

/// Raw document bytes plus the MIME type the engine should treat them as.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

pub struct InputManager {
    cache: HashMap<String, LoadedDocument>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    pub async fn load(&mut self, path: &Path) -> Result<LoadedDocument> {
        let path_str = path.to_string_lossy().to_string();

        if let Some(cached) = self.cache.get(&path_str) {
            info!("Using cached document for: {}", path.display());
            return Ok(cached.clone());
        }

        if !path.exists() {
            return Err(ResumeScorerError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let format = self.detect_format(path)?;
        if !format.is_supported() {
            return Err(ResumeScorerError::UnsupportedFormat(format!(
                "Unsupported file type for: {}",
                path.display()
            )));
        }

        info!("Reading {} document: {}", format.mime_type(), path.display());
        let bytes = fs::read(path).await?;

        let document = LoadedDocument {
            bytes,
            mime_type: format.mime_type().to_string(),
        };

        self.cache.insert(path_str, document.clone());

        Ok(document)
    }

    fn detect_format(&self, path: &Path) -> Result<DocumentFormat> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                ResumeScorerError::InvalidInput(format!("File has no extension: {}", path.display()))
            })?;

        Ok(DocumentFormat::from_extension(extension))
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
