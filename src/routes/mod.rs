// Route exports
pub mod events;
pub mod general;
pub mod registration;

use actix_web::{http::StatusCode, web, HttpResponse};
use std::sync::Arc;

use crate::core::{LocationPolicy, MatchMaker};
use crate::models::{ErrorResponse, EventError, API_PREFIX};
use crate::services::{Geocoder, Notifier, QrRenderer, Registry, RegistryError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<dyn Registry>,
    pub matchmaker: MatchMaker,
    pub geocoder: Arc<dyn Geocoder>,
    pub notifier: Arc<dyn Notifier>,
    pub qr: Arc<dyn QrRenderer>,
    pub location_policy: LocationPolicy,
    /// Base URL for share, dashboard and QR links
    pub public_url: String,
    pub max_code_attempts: u32,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope(API_PREFIX)
            .configure(general::configure)
            .configure(events::configure)
            .configure(registration::configure),
    );
}

pub(crate) fn error_response(
    status: StatusCode,
    error: &str,
    message: impl ToString,
) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.to_string(),
        status_code: status.as_u16(),
    })
}

pub(crate) fn registry_error_response(err: &RegistryError) -> HttpResponse {
    tracing::info!("Registry error: {}", err);
    match err {
        RegistryError::NotFound(_) => {
            error_response(StatusCode::NOT_FOUND, "Event not found", err)
        }
        RegistryError::CodeCollision(_) | RegistryError::ShareIdCollision(_) => {
            error_response(StatusCode::CONFLICT, "Identifier collision", err)
        }
        RegistryError::CodeSpaceExhausted(_) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, "No event code available", err)
        }
    }
}

pub(crate) fn event_error_response(err: &EventError) -> HttpResponse {
    tracing::info!("Event error: {}", err);
    match err {
        EventError::Validation(_) => {
            error_response(StatusCode::BAD_REQUEST, "Validation failed", err)
        }
        EventError::AttendeeNotFound(_) => {
            error_response(StatusCode::NOT_FOUND, "Attendee not found", err)
        }
        EventError::MatchNotFound(_) => {
            error_response(StatusCode::NOT_FOUND, "Match not found", err)
        }
        EventError::AttendeeUnavailable(_) => {
            error_response(StatusCode::CONFLICT, "Attendee unavailable", err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_status_mapping() {
        let not_found = registry_error_response(&RegistryError::NotFound("X".into()));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let collision = registry_error_response(&RegistryError::CodeCollision("X".into()));
        assert_eq!(collision.status(), StatusCode::CONFLICT);

        let invalid = event_error_response(&EventError::Validation("bad".into()));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let missing = event_error_response(&EventError::MatchNotFound(Uuid::new_v4()));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
