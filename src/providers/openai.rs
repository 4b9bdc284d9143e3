// src/providers/openai.rs

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::UpstreamConfig;
use crate::errors::{AnalyzeError, Result};
use crate::models::ImagePayload;
use crate::providers::VisionProvider;

const PROVIDER: &str = "OpenAI";

/// A provider for OpenAI vision-capable chat models.
pub struct OpenAIProvider {
    client: Client,
    config: UpstreamConfig,
    api_key: String,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: Option<String>,
}

impl OpenAIProvider {
    /// Creates a new `OpenAIProvider`.
    pub fn new(client: Client, config: UpstreamConfig, api_key: String) -> Self {
        Self { client, config, api_key }
    }

    fn request_body<'a>(&'a self, prompt: &'a str, image: &ImagePayload) -> OpenAIRequest<'a> {
        OpenAIRequest {
            model: &self.config.model,
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: image.data_url() },
                    },
                ],
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }
}

impl VisionProvider for OpenAIProvider {
    async fn describe_image(&self, prompt: &str, image: &ImagePayload) -> Result<(String, u64)> {
        let url = format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'));

        log::info!("📡 Calling OpenAI: {} with model: {}", url, self.config.model);

        let body = self.request_body(prompt, image);
        let start = Instant::now();

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalyzeError::from_transport(PROVIDER, e))?;

        let status = resp.status();
        let latency_ms = start.elapsed().as_millis() as u64;

        log::info!("📥 OpenAI response status: {} ({}ms)", status, latency_ms);

        if !status.is_success() {
            let error_body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error body".to_string());
            return Err(AnalyzeError::from_upstream(PROVIDER, status.as_u16(), &error_body));
        }

        let openai_resp: OpenAIResponse = resp.json().await.map_err(|e| AnalyzeError::Upstream {
            provider: PROVIDER,
            status: Some(status.as_u16()),
            message: format!("Unexpected response structure: {}", e),
        })?;

        let output = openai_resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok((output, latency_ms))
    }
}
