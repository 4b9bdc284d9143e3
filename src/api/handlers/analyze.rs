// src/api/handlers/analyze.rs
use actix_web::{web, HttpResponse};
use crate::api::AppState;
use crate::errors::AnalyzeError;
use crate::models::AnalyzeRequest;
use crate::relay;

pub async fn analyze_food(
    state: web::Data<AppState>,
    req: web::Json<AnalyzeRequest>,
) -> Result<HttpResponse, AnalyzeError> {
    let result = relay::analyze_food(
        state.upstream.as_deref(),
        state.config.upstream.provider,
        &state.config.prompt,
        &req,
    )
    .await?;

    Ok(HttpResponse::Ok().json(result))
}
