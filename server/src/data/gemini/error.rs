use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("{0}")]
    Config(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Auth(#[from] gcp_auth::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl GeminiError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}
