// Health check endpoint
use actix_web::{HttpResponse, Result};

use crate::models::HealthResponse;

/// Health check handler
///
/// # Errors
/// Never fails; the `Result` wrapper matches the actix handler signature
pub async fn health() -> Result<HttpResponse> {
    let response = HealthResponse {
        status: "ok".to_string(),
        message: "Pawnest adoption API is running".to_string(),
    };
    Ok(HttpResponse::Ok().json(response))
}
