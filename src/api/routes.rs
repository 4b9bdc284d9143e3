// src/api/routes.rs
use actix_web::error::JsonPayloadError;
use actix_web::web;
use super::handlers;
use crate::errors::AnalyzeError;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health_check))
            .route("/analyze", web::post().to(handlers::analyze_food))
            // path the browser client posts to
            .route("/analyze-food", web::post().to(handlers::analyze_food))
    );
}

/// JSON extractor settings; base64 images need a far larger limit than actix's default.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            match err {
                JsonPayloadError::OverflowKnownLength { limit, .. }
                | JsonPayloadError::Overflow { limit } => AnalyzeError::PayloadTooLarge { limit },
                other => AnalyzeError::InvalidRequest(other.to_string()),
            }
            .into()
        })
}
