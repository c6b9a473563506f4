//! LLM-written explanations and retention emails

pub mod client;
pub mod prompts;

pub use client::LlmClient;
