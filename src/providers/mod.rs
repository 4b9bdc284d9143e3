// src/providers/mod.rs

use reqwest::Client;

use crate::config::{ProviderKind, UpstreamConfig};
use crate::errors::Result;
use crate::models::ImagePayload;

pub mod gemini;
pub mod openai;

use gemini::GeminiProvider;
use openai::OpenAIProvider;

/// A common trait for hosted vision-capable models.
///
/// Note: We're not using async_trait here, so implementers must handle async directly.
pub trait VisionProvider: Send + Sync {
    /// Sends one instruction plus one image and returns the raw completion text
    /// and the latency in milliseconds.
    ///
    /// An empty completion is not an error; the caller normalizes it.
    fn describe_image(
        &self,
        prompt: &str,
        image: &ImagePayload,
    ) -> impl std::future::Future<Output = Result<(String, u64)>> + Send;
}

/// The upstream client built once at startup for the configured backend.
pub enum UpstreamClient {
    OpenAI(OpenAIProvider),
    Gemini(GeminiProvider),
}

impl UpstreamClient {
    /// Returns `None` when no credential is configured.
    pub fn from_config(client: Client, config: &UpstreamConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        let upstream = match config.provider {
            ProviderKind::OpenAI => {
                UpstreamClient::OpenAI(OpenAIProvider::new(client, config.clone(), api_key))
            }
            ProviderKind::Gemini => {
                UpstreamClient::Gemini(GeminiProvider::new(client, config.clone(), api_key))
            }
        };
        Some(upstream)
    }
}

impl VisionProvider for UpstreamClient {
    async fn describe_image(&self, prompt: &str, image: &ImagePayload) -> Result<(String, u64)> {
        match self {
            UpstreamClient::OpenAI(provider) => provider.describe_image(prompt, image).await,
            UpstreamClient::Gemini(provider) => provider.describe_image(prompt, image).await,
        }
    }
}
