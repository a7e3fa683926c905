//! Resume-to-role scoring engine

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod llm;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{Result, ResumeScorerError};
pub use processing::{AnalysisEngine, AnalysisResult};
