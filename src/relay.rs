// src/relay.rs
use std::time::Instant;
use uuid::Uuid;

use crate::config::ProviderKind;
use crate::errors::{AnalyzeError, Result};
use crate::models::{AnalysisResult, AnalyzeRequest, ImagePayload};
use crate::normalizer;
use crate::providers::VisionProvider;

/// Runs one food photo through the upstream model and normalizes the reply.
///
/// `provider` is `None` when no credential was configured at startup; that is
/// reported before the request body is even looked at. A request without an
/// image never reaches the upstream service either.
pub async fn analyze_food<P: VisionProvider>(
    provider: Option<&P>,
    kind: ProviderKind,
    prompt: &str,
    request: &AnalyzeRequest,
) -> Result<AnalysisResult> {
    let request_id = Uuid::new_v4();

    let provider = provider.ok_or_else(|| {
        log::error!("❌ [{}] {} not found in environment", request_id, kind.key_env());
        AnalyzeError::MissingCredential {
            provider: kind.label(),
            env_var: kind.key_env(),
        }
    })?;

    let image = request
        .image
        .as_deref()
        .and_then(ImagePayload::parse)
        .ok_or(AnalyzeError::MissingInput)?;

    log::info!(
        "🍽️  [{}] Analyzing {} image ({} base64 chars) with {}",
        request_id,
        image.mime_type,
        image.data.len(),
        kind.label()
    );

    let start = Instant::now();
    let (completion, latency_ms) = provider.describe_image(prompt, &image).await.map_err(|e| {
        log::error!("❌ [{}] Upstream call failed: {}", request_id, e);
        e
    })?;

    log::debug!("[{}] Raw completion: {}", request_id, completion);

    let result = normalizer::normalize(&completion);

    log::info!(
        "✅ [{}] {} (safe: {}, {} warnings) upstream {}ms, total {}ms",
        request_id,
        result.food_name,
        result.is_safe,
        result.warnings.len(),
        latency_ms,
        start.elapsed().as_millis()
    );

    Ok(result)
}
