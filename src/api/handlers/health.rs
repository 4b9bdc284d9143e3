// src/api/handlers/health.rs
use actix_web::{web, HttpResponse, Result};
use serde_json::json;
use crate::api::AppState;

/// Liveness plus provider/model/key-presence; never the key itself.
pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    let upstream = &state.config.upstream;
    Ok(HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "food-analyzer",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "provider": upstream.provider.label(),
        "model": upstream.model,
        "hasApiKey": state.upstream.is_some()
    })))
}
