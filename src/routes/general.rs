use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;

use crate::core::suggest_themes;
use crate::models::{HealthResponse, SuggestThemesRequest, ThemeSuggestionsResponse};
use crate::routes::{error_response, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/themes/suggest", web::post().to(suggest_event_themes));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        events: state.registry.len().await,
        timestamp: chrono::Utc::now(),
    })
}

/// Suggest themes for an event that is still being named
///
/// POST /api/v1/themes/suggest
///
/// Request body:
/// ```json
/// { "eventName": "Summer Music Night" }
/// ```
async fn suggest_event_themes(req: web::Json<SuggestThemesRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for theme suggestion: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }

    let themes = suggest_themes(&req.event_name);
    tracing::debug!("Suggested {} themes for '{}'", themes.len(), req.event_name);

    HttpResponse::Ok().json(ThemeSuggestionsResponse {
        themes: themes.into_iter().map(str::to_string).collect(),
    })
}
