//! `check-key` diagnostic: one test prompt against the endpoint

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value as JsonValue;

use super::client::request_body;
use crate::core::cli::CheckKeyArgs;
use crate::core::constants::{CHECK_KEY_TIMEOUT_SECS, GEMINI_API_KEY_HEADER};
use crate::domain::itinerary::extract_response_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCheckOutcome {
    Success,
    MissingKey,
    Network,
    Unauthorized,
    UnexpectedStatus,
}

impl KeyCheckOutcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::MissingKey => 2,
            Self::Network => 3,
            Self::Unauthorized => 4,
            Self::UnexpectedStatus => 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeyCheckReport {
    pub outcome: KeyCheckOutcome,
    pub status: Option<u16>,
    /// Extracted text on success, otherwise the error or response body
    pub detail: String,
}

impl KeyCheckReport {
    fn failed(outcome: KeyCheckOutcome, status: Option<u16>, detail: impl Into<String>) -> Self {
        Self {
            outcome,
            status,
            detail: detail.into(),
        }
    }

    /// Print the report the way an operator reads it
    pub fn print(&self, url: &str) {
        println!("Testing endpoint: {}", url);
        if let Some(status) = self.status {
            println!("HTTP {}", status);
        }
        match self.outcome {
            KeyCheckOutcome::Success => {
                println!("Success: model returned text:");
                println!("{}", self.detail);
            }
            KeyCheckOutcome::MissingKey => {
                eprintln!("ERROR: {}", self.detail);
            }
            KeyCheckOutcome::Network => {
                eprintln!("Network error when calling the endpoint: {}", self.detail);
            }
            KeyCheckOutcome::Unauthorized => {
                eprintln!("Unauthorized (401). The API key was rejected.");
                eprintln!("Common fixes to try:");
                eprintln!("- Verify the API key value is correct and not expired or rotated.");
                eprintln!("- Enable the Generative Language API for the project.");
                eprintln!("- Ensure billing is enabled for the project.");
                eprintln!("- Check API key restrictions (APIs, HTTP referrers, IPs).");
                eprintln!("- Alternatively use a service account (GOOGLE_SERVICE_ACCOUNT_FILE).");
                eprintln!("Response body:");
                eprintln!("{}", self.detail);
            }
            KeyCheckOutcome::UnexpectedStatus => {
                println!("Non-200 response; printing body for debugging:");
                println!("{}", self.detail);
            }
        }
    }
}

/// Pretty-print a JSON body, or return it unchanged
fn pretty_body(body: &str) -> String {
    serde_json::from_str::<JsonValue>(body)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or_else(|| body.to_string())
}

pub async fn check_key(args: &CheckKeyArgs) -> KeyCheckReport {
    check_key_with_timeout(args, Duration::from_secs(CHECK_KEY_TIMEOUT_SECS)).await
}

async fn check_key_with_timeout(args: &CheckKeyArgs, timeout: Duration) -> KeyCheckReport {
    let Some(key) = args.key.as_deref().filter(|k| !k.trim().is_empty()) else {
        return KeyCheckReport::failed(
            KeyCheckOutcome::MissingKey,
            None,
            "No API key provided. Set GEMINI_API_KEY env var or pass --key.",
        );
    };

    let client = match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => return KeyCheckReport::failed(KeyCheckOutcome::Network, None, e.to_string()),
    };

    let resp = match client
        .post(&args.url)
        .header(GEMINI_API_KEY_HEADER, key)
        .json(&request_body(&args.prompt))
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            tracing::debug!(error = %e, "check-key request failed");
            return KeyCheckReport::failed(KeyCheckOutcome::Network, None, e.to_string());
        }
    };

    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let code = Some(status.as_u16());

    match status {
        StatusCode::OK => {
            let detail = match serde_json::from_str::<JsonValue>(&body) {
                Ok(json) => extract_response_text(&json).unwrap_or_default(),
                Err(_) => body,
            };
            KeyCheckReport {
                outcome: KeyCheckOutcome::Success,
                status: code,
                detail: detail.trim().to_string(),
            }
        }
        StatusCode::UNAUTHORIZED => {
            KeyCheckReport::failed(KeyCheckOutcome::Unauthorized, code, body)
        }
        _ => KeyCheckReport::failed(KeyCheckOutcome::UnexpectedStatus, code, pretty_body(&body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::CHECK_KEY_PROMPT;
    use httpmock::prelude::*;
    use serde_json::json;

    fn args(url: String, key: Option<&str>) -> CheckKeyArgs {
        CheckKeyArgs {
            url,
            key: key.map(str::to_string),
            prompt: CHECK_KEY_PROMPT.to_string(),
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(KeyCheckOutcome::Success.exit_code(), 0);
        assert_eq!(KeyCheckOutcome::MissingKey.exit_code(), 2);
        assert_eq!(KeyCheckOutcome::Network.exit_code(), 3);
        assert_eq!(KeyCheckOutcome::Unauthorized.exit_code(), 4);
        assert_eq!(KeyCheckOutcome::UnexpectedStatus.exit_code(), 5);
    }

    #[tokio::test]
    async fn test_missing_key() {
        let report = check_key(&args("http://127.0.0.1:1/gen".into(), Some(" "))).await;
        assert_eq!(report.outcome, KeyCheckOutcome::MissingKey);
        assert!(report.status.is_none());
    }

    #[tokio::test]
    async fn test_network_error() {
        let report = check_key_with_timeout(
            &args("http://127.0.0.1:1/gen".into(), Some("k")),
            Duration::from_secs(2),
        )
        .await;
        assert_eq!(report.outcome, KeyCheckOutcome::Network);
    }

    #[tokio::test]
    async fn test_success_extracts_text() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/gen").header("x-goog-api-key", "k");
                then.status(200).json_body(json!({
                    "candidates": [{"content": {"parts": [{"text": "OK\n"}]}}]
                }));
            })
            .await;

        let report = check_key(&args(server.url("/gen"), Some("k"))).await;
        mock.assert_async().await;
        assert_eq!(report.outcome, KeyCheckOutcome::Success);
        assert_eq!(report.status, Some(200));
        assert_eq!(report.detail, "OK");
    }

    #[tokio::test]
    async fn test_unauthorized_and_other_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/denied");
                then.status(401).body("bad key");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/quota");
                then.status(429).json_body(json!({"error": {"code": 429}}));
            })
            .await;

        let report = check_key(&args(server.url("/denied"), Some("k"))).await;
        assert_eq!(report.outcome, KeyCheckOutcome::Unauthorized);
        assert_eq!(report.detail, "bad key");

        let report = check_key(&args(server.url("/quota"), Some("k"))).await;
        assert_eq!(report.outcome, KeyCheckOutcome::UnexpectedStatus);
        assert_eq!(report.status, Some(429));
        assert!(report.detail.contains("\"code\": 429"));
    }
}
