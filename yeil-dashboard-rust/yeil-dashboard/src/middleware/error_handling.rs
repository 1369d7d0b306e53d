use crate::domain::error::{DashboardError, ValidationError};
use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde_json::json;

pub struct ErrorResponseBuilder;

impl ErrorResponseBuilder {
    pub fn not_found(message: &str) -> HttpResponse {
        HttpResponse::NotFound().json(json!({
            "error": "NOT_FOUND",
            "message": message,
            "timestamp": Utc::now().to_rfc3339(),
        }))
    }
}

/// Malformed request bodies answer with the same JSON error shape as every
/// other validation failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            DashboardError::Validation(ValidationError::InvalidJson(err.to_string())).into()
        })
}

pub async fn not_found(req: HttpRequest) -> HttpResponse {
    ErrorResponseBuilder::not_found(&format!("No route for {} {}", req.method(), req.path()))
}
