// rest_api/src/ai/mod.rs
//! Diagnosis assistance: prompt construction, the model client and parsing
//! of its untrusted output.

pub mod client;
pub mod parse;
pub mod prompt;

pub use client::{AiError, GeminiClient, GenerativeModel};
pub use parse::parse_analysis;
pub use prompt::{build_prompt, AnalysisRequest, PatientContext};
