//! Resume-to-role scoring engine

pub mod analyzer;
pub mod composer;
pub mod document;
pub mod gap;
pub mod keywords;
pub mod lexicon;
pub mod rewriter;
pub mod role;
pub mod scoring;
pub mod text_processor;

pub use analyzer::AnalysisEngine;
pub use composer::AnalysisResult;
