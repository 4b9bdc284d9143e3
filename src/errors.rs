// src/errors.rs
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::Value;
use thiserror::Error;

use crate::models::ErrorBody;

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("No image provided")]
    MissingInput,

    #[error("Invalid request body: {0}")]
    InvalidRequest(String),

    #[error("Image too large")]
    PayloadTooLarge { limit: usize },

    #[error("{provider} API key not configured")]
    MissingCredential {
        provider: &'static str,
        env_var: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("{provider} API quota exceeded")]
    QuotaExceeded { provider: &'static str, message: String },

    #[error("Invalid {provider} API key")]
    Unauthorized { provider: &'static str, message: String },

    #[error("{provider} API is unavailable")]
    Unavailable { provider: &'static str, message: String },

    #[error("Failed to analyze food image")]
    Upstream {
        provider: &'static str,
        status: Option<u16>,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, AnalyzeError>;

impl AnalyzeError {
    /// Stable category name reported to clients in the `kind` field.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyzeError::MissingInput => "missing_input",
            AnalyzeError::InvalidRequest(_) => "invalid_request",
            AnalyzeError::PayloadTooLarge { .. } => "payload_too_large",
            AnalyzeError::MissingCredential { .. }
            | AnalyzeError::Config(_)
            | AnalyzeError::FileRead(_)
            | AnalyzeError::TomlParse(_) => "configuration_error",
            AnalyzeError::QuotaExceeded { .. } => "upstream_quota_exceeded",
            AnalyzeError::Unauthorized { .. } => "upstream_auth_error",
            AnalyzeError::Unavailable { .. } => "upstream_unavailable",
            AnalyzeError::Upstream { .. } => "upstream_error",
        }
    }

    /// Human-readable detail shown next to the error headline.
    pub fn details(&self) -> Option<String> {
        match self {
            AnalyzeError::MissingInput => None,
            AnalyzeError::PayloadTooLarge { limit } => Some(format!(
                "Request body exceeds the {} byte limit; try a smaller image",
                limit
            )),
            AnalyzeError::InvalidRequest(msg) | AnalyzeError::Config(msg) => Some(msg.clone()),
            AnalyzeError::MissingCredential { env_var, .. } => Some(format!(
                "Please set the {} environment variable",
                env_var
            )),
            AnalyzeError::FileRead(e) => Some(e.to_string()),
            AnalyzeError::TomlParse(e) => Some(e.to_string()),
            AnalyzeError::QuotaExceeded { provider, message } => Some(format!(
                "Please check your {} account billing and usage limits ({})",
                provider, message
            )),
            AnalyzeError::Unauthorized { message, .. }
            | AnalyzeError::Unavailable { message, .. }
            | AnalyzeError::Upstream { message, .. } => Some(message.clone()),
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
            details: self.details(),
            kind: self.kind().to_string(),
        }
    }

    /// Classifies a non-success upstream reply.
    ///
    /// Both OpenAI (`{"error":{"code":"insufficient_quota",...}}`) and Gemini
    /// (`{"error":{"status":"RESOURCE_EXHAUSTED",...}}`) error envelopes are recognized.
    pub fn from_upstream(provider: &'static str, status: u16, body: &str) -> Self {
        let envelope = serde_json::from_str::<Value>(body).ok();
        let error = envelope.as_ref().and_then(|v| v.get("error"));

        let field = |name: &str| -> Option<String> {
            error.and_then(|e| e.get(name)).and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
        };

        let code = field("code").unwrap_or_default();
        let error_type = field("type").unwrap_or_default();
        let rpc_status = field("status").unwrap_or_default();
        let message = field("message").unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                body.trim().to_string()
            }
        });

        let key_invalid = error
            .and_then(|e| e.get("details"))
            .and_then(Value::as_array)
            .is_some_and(|details| {
                details
                    .iter()
                    .any(|d| d.get("reason").and_then(Value::as_str) == Some("API_KEY_INVALID"))
            });

        if status == 429
            || code == "insufficient_quota"
            || error_type == "insufficient_quota"
            || rpc_status == "RESOURCE_EXHAUSTED"
        {
            AnalyzeError::QuotaExceeded { provider, message }
        } else if status == 401
            || status == 403
            || code == "invalid_api_key"
            || rpc_status == "UNAUTHENTICATED"
            || rpc_status == "PERMISSION_DENIED"
            || key_invalid
        {
            AnalyzeError::Unauthorized { provider, message }
        } else if (500..=599).contains(&status) || rpc_status == "UNAVAILABLE" {
            AnalyzeError::Unavailable { provider, message }
        } else {
            AnalyzeError::Upstream {
                provider,
                status: Some(status),
                message,
            }
        }
    }

    /// Classifies a failure to reach the upstream service at all.
    pub fn from_transport(provider: &'static str, err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            AnalyzeError::Unavailable {
                provider,
                message: err.to_string(),
            }
        } else {
            AnalyzeError::Upstream {
                provider,
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }
}

impl ResponseError for AnalyzeError {
    fn status_code(&self) -> StatusCode {
        match self {
            AnalyzeError::MissingInput | AnalyzeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AnalyzeError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AnalyzeError::MissingCredential { .. }
            | AnalyzeError::Config(_)
            | AnalyzeError::FileRead(_)
            | AnalyzeError::TomlParse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AnalyzeError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            AnalyzeError::Unauthorized { .. } | AnalyzeError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AnalyzeError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.to_body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_insufficient_quota() {
        let body = r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota","code":"insufficient_quota"}}"#;
        let err = AnalyzeError::from_upstream("OpenAI", 429, body);
        assert_eq!(err.kind(), "upstream_quota_exceeded");
        assert_eq!(err.to_string(), "OpenAI API quota exceeded");
        assert!(err.details().unwrap().contains("You exceeded your current quota"));
    }

    #[test]
    fn test_openai_invalid_key() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        let err = AnalyzeError::from_upstream("OpenAI", 401, body);
        assert_eq!(err.kind(), "upstream_auth_error");
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_gemini_invalid_key_reason() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT","details":[{"@type":"type.googleapis.com/google.rpc.ErrorInfo","reason":"API_KEY_INVALID"}]}}"#;
        let err = AnalyzeError::from_upstream("Gemini", 400, body);
        assert_eq!(err.kind(), "upstream_auth_error");
        assert_eq!(
            err.details().as_deref(),
            Some("API key not valid. Please pass a valid API key.")
        );
    }

    #[test]
    fn test_server_errors_are_unavailable() {
        let err = AnalyzeError::from_upstream("Gemini", 503, "");
        assert_eq!(err.kind(), "upstream_unavailable");
        assert_eq!(err.details().as_deref(), Some("HTTP 503"));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_unrecognized_failure_keeps_raw_message() {
        let err = AnalyzeError::from_upstream("OpenAI", 400, "bad things happened");
        assert_eq!(err.kind(), "upstream_error");
        assert_eq!(err.details().as_deref(), Some("bad things happened"));
        match err {
            AnalyzeError::Upstream { status, .. } => assert_eq!(status, Some(400)),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_credential_body() {
        let err = AnalyzeError::MissingCredential {
            provider: "OpenAI",
            env_var: "OPENAI_API_KEY",
        };
        let body = err.to_body();
        assert_eq!(body.error, "OpenAI API key not configured");
        assert_eq!(body.kind, "configuration_error");
        assert!(body.details.unwrap().contains("OPENAI_API_KEY"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_every_classification_branch() {
        let cases: &[(u16, &str, &str, StatusCode)] = &[
            (429, "", "upstream_quota_exceeded", StatusCode::TOO_MANY_REQUESTS),
            (
                400,
                r#"{"error":{"message":"quota","code":"insufficient_quota"}}"#,
                "upstream_quota_exceeded",
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                400,
                r#"{"error":{"message":"quota","type":"insufficient_quota"}}"#,
                "upstream_quota_exceeded",
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                400,
                r#"{"error":{"code":400,"message":"Resource exhausted","status":"RESOURCE_EXHAUSTED"}}"#,
                "upstream_quota_exceeded",
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (401, "", "upstream_auth_error", StatusCode::BAD_GATEWAY),
            (403, "", "upstream_auth_error", StatusCode::BAD_GATEWAY),
            (
                400,
                r#"{"error":{"message":"bad key","code":"invalid_api_key"}}"#,
                "upstream_auth_error",
                StatusCode::BAD_GATEWAY,
            ),
            (
                400,
                r#"{"error":{"message":"no creds","status":"UNAUTHENTICATED"}}"#,
                "upstream_auth_error",
                StatusCode::BAD_GATEWAY,
            ),
            (
                400,
                r#"{"error":{"message":"denied","status":"PERMISSION_DENIED"}}"#,
                "upstream_auth_error",
                StatusCode::BAD_GATEWAY,
            ),
            (500, "", "upstream_unavailable", StatusCode::SERVICE_UNAVAILABLE),
            (502, "bad gateway", "upstream_unavailable", StatusCode::SERVICE_UNAVAILABLE),
            (
                400,
                r#"{"error":{"message":"overloaded","status":"UNAVAILABLE"}}"#,
                "upstream_unavailable",
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                400,
                r#"{"error":{"code":400,"message":"bad image","status":"INVALID_ARGUMENT"}}"#,
                "upstream_error",
                StatusCode::BAD_GATEWAY,
            ),
            (404, "", "upstream_error", StatusCode::BAD_GATEWAY),
        ];

        for (status, body, kind, http) in cases {
            let err = AnalyzeError::from_upstream("Gemini", *status, body);
            assert_eq!(err.kind(), *kind, "kind for ({}, {})", status, body);
            assert_eq!(err.status_code(), *http, "status for ({}, {})", status, body);
            assert_eq!(err.to_body().kind, *kind);
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        let send_err = reqwest::Client::new()
            .get("http://127.0.0.1:1")
            .send()
            .await
            .unwrap_err();

        let err = AnalyzeError::from_transport("OpenAI", send_err);
        assert_eq!(err.kind(), "upstream_unavailable");
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "OpenAI API is unavailable");
    }

    #[test]
    fn test_oversized_body_maps_to_413() {
        let err = AnalyzeError::PayloadTooLarge { limit: 1024 };
        assert_eq!(err.kind(), "payload_too_large");
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(err.details().unwrap().contains("1024 byte limit"));
    }
}
