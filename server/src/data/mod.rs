//! Upstream services
//!
//! - `gemini` - generative-language API client

pub mod gemini;
