// src/providers/gemini.rs

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::UpstreamConfig;
use crate::errors::{AnalyzeError, Result};
use crate::models::ImagePayload;
use crate::providers::VisionProvider;

const PROVIDER: &str = "Gemini";

/// A provider for interacting with Google's Gemini models.
pub struct GeminiProvider {
    client: Client,
    config: UpstreamConfig,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

impl GeminiProvider {
    /// Creates a new `GeminiProvider`.
    pub fn new(client: Client, config: UpstreamConfig, api_key: String) -> Self {
        Self { client, config, api_key }
    }

    fn request_body<'a>(&self, prompt: &'a str, image: &'a ImagePayload) -> GeminiRequest<'a> {
        GeminiRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: prompt },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: &image.mime_type,
                            data: &image.data,
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            },
        }
    }
}

impl VisionProvider for GeminiProvider {
    /// Calls the Gemini API with a prompt and inline image and returns the model's response text and latency.
    async fn describe_image(&self, prompt: &str, image: &ImagePayload) -> Result<(String, u64)> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        );

        log::info!("📡 Calling Gemini: {} with model: {}", url, self.config.model);

        let body = self.request_body(prompt, image);
        let start = Instant::now();

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalyzeError::from_transport(PROVIDER, e))?;

        let status = resp.status();
        let latency_ms = start.elapsed().as_millis() as u64;

        log::info!("📥 Gemini response status: {} ({}ms)", status, latency_ms);

        if !status.is_success() {
            let error_body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error body".to_string());
            return Err(AnalyzeError::from_upstream(PROVIDER, status.as_u16(), &error_body));
        }

        let gemini_resp: GeminiResponse = resp.json().await.map_err(|e| AnalyzeError::Upstream {
            provider: PROVIDER,
            status: Some(status.as_u16()),
            message: format!("Unexpected response structure: {}", e),
        })?;

        // Blocked or empty candidates come back without text; the normalizer falls back for those.
        let output = gemini_resp
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
            .unwrap_or_default();

        if output.is_empty() {
            log::warn!("⚠️  Gemini returned no text for this image");
        }

        Ok((output, latency_ms))
    }
}
