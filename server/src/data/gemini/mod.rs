//! Gemini generateContent client
//!
//! - `client` - [`GenerationClient`] trait and the reqwest-backed implementation
//! - `check` - one-shot key diagnostic behind `treasuremap check-key`

mod check;
mod client;
mod error;

pub use check::{KeyCheckOutcome, KeyCheckReport, check_key};
pub use client::{GeminiClient, GenerationClient, UnconfiguredClient, from_config, request_body};
pub use error::GeminiError;
