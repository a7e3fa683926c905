//! Chat-completions client and prompts for assisted rewrites

pub mod client;
pub mod prompts;

pub use client::ChatClient;
