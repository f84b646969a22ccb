use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value as JsonValue, json};

use super::error::GeminiError;
use crate::core::config::GeminiConfig;
use crate::core::constants::{GEMINI_API_KEY_HEADER, GEMINI_OAUTH_SCOPE, PLACEHOLDER_URL_MARKERS};
use crate::domain::itinerary::{extract_response_text, strip_code_fences};
use crate::utils::string::truncate_preview;

/// Longest upstream error body kept in a `GeminiError::Status`
const ERROR_BODY_PREVIEW: usize = 300;

/// Sends a prompt and returns the model's text payload
#[async_trait]
pub trait GenerationClient: Send + Sync + std::fmt::Debug {
    async fn generate(&self, prompt: &str) -> Result<String, GeminiError>;
}

/// The `generateContent` request body
pub fn request_body(prompt: &str) -> JsonValue {
    json!({ "contents": [{ "parts": [{ "text": prompt }] }] })
}

enum Credentials {
    /// Sent as a default header on every request
    ApiKey,
    ServiceAccount(Arc<CustomServiceAccount>),
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey => f.write_str("ApiKey"),
            Self::ServiceAccount(_) => f.write_str("ServiceAccount"),
        }
    }
}

#[derive(Debug)]
pub struct GeminiClient {
    client: reqwest::Client,
    url: String,
    credentials: Credentials,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, GeminiError> {
        let url = validate_url(config.url.as_deref())?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let credentials = match (&config.api_key, &config.service_account_file) {
            (Some(key), _) if config.use_api_key => {
                let mut value = HeaderValue::from_str(key)
                    .map_err(|e| GeminiError::config(format!("invalid API key: {}", e)))?;
                value.set_sensitive(true);
                headers.insert(GEMINI_API_KEY_HEADER, value);
                Credentials::ApiKey
            }
            (_, Some(path)) => {
                let account = CustomServiceAccount::from_file(path)?;
                Credentials::ServiceAccount(Arc::new(account))
            }
            _ => {
                return Err(GeminiError::config(
                    "No API key set and no service account file provided. \
                     Set GEMINI_API_KEY or GOOGLE_SERVICE_ACCOUNT_FILE.",
                ));
            }
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| GeminiError::config(format!("failed to build HTTP client: {}", e)))?;

        tracing::debug!(
            url = %url,
            credentials = ?credentials,
            timeout_secs = config.timeout_secs,
            "Gemini client initialized"
        );
        Ok(Self {
            client,
            url,
            credentials,
        })
    }
}

fn validate_url(url: Option<&str>) -> Result<String, GeminiError> {
    let url = url
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| GeminiError::config("GEMINI_API_URL is not set"))?;
    if PLACEHOLDER_URL_MARKERS.iter().any(|m| url.contains(m)) {
        return Err(GeminiError::config(
            "GEMINI_API_URL appears to be a placeholder. Set it to the real Gemini endpoint.",
        ));
    }
    Ok(url.to_string())
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
        let mut request = self.client.post(&self.url).json(&request_body(prompt));
        if let Credentials::ServiceAccount(account) = &self.credentials {
            let token = account.token(&[GEMINI_OAUTH_SCOPE]).await?;
            request = request.bearer_auth(token.as_str());
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GeminiError::Status {
                status: status.as_u16(),
                body: truncate_preview(&body, ERROR_BODY_PREVIEW),
            });
        }

        let body: JsonValue = resp
            .json()
            .await
            .map_err(|e| GeminiError::InvalidResponse(e.to_string()))?;
        let text = extract_response_text(&body)
            .ok_or_else(|| GeminiError::InvalidResponse("empty response body".to_string()))?;

        tracing::debug!(len = text.len(), "Gemini response received");
        Ok(strip_code_fences(&text).trim().to_string())
    }
}

/// Stand-in used when the upstream is not configured. Every call fails with
/// the original configuration error.
#[derive(Debug)]
pub struct UnconfiguredClient {
    reason: String,
}

impl UnconfiguredClient {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl GenerationClient for UnconfiguredClient {
    async fn generate(&self, _prompt: &str) -> Result<String, GeminiError> {
        Err(GeminiError::Config(self.reason.clone()))
    }
}

/// Build the configured client, or an [`UnconfiguredClient`] carrying the reason.
pub fn from_config(config: &GeminiConfig) -> Arc<dyn GenerationClient> {
    match GeminiClient::new(config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::warn!(error = %e, "Gemini client unavailable, plans will use the sample itinerary");
            Arc::new(UnconfiguredClient::new(e.to_string()))
        }
    }
}
