use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    AddQuestionRequest, AttendeeSummary, CreateEventRequest, CreateEventResponse, Event, Location,
    Match, MatchRunResponse, MatchSummary, ShareResponse,
};
use crate::core::is_valid_code;
use crate::routes::{error_response, event_error_response, registry_error_response, AppState};
use crate::services::{
    register_event, render_confirmation, ConfirmationLinks, RegistryError, SharedEvent,
};

/// Configure organizer-facing event routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/events", web::post().to(create_event))
        .route("/events/{code}", web::get().to(get_dashboard))
        .route("/events/{code}/questions", web::post().to(add_question))
        .route("/events/{code}/share", web::get().to(share_event))
        .route("/events/{code}/match", web::post().to(match_attendees))
        .route(
            "/events/{code}/matches/{match_id}/extend",
            web::post().to(extend_match),
        );
}

/// Create event endpoint
///
/// POST /api/v1/events
///
/// Request body:
/// ```json
/// {
///   "name": "string",
///   "creator": "string",
///   "creatorEmail": "string",
///   "location": "string",
///   "radius": 5.0
/// }
/// ```
async fn create_event(
    state: web::Data<AppState>,
    req: web::Json<CreateEventRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for create_event request: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }

    let mut event = match Event::create(
        req.name.as_str(),
        Location::new(req.location.trim()),
        req.creator.as_str(),
        req.creator_email.as_str(),
        req.radius,
    ) {
        Ok(event) => event,
        Err(e) => return event_error_response(&e),
    };

    // Geocoding is best-effort; the event stays usable without coordinates
    match state.geocoder.geocode(&event.location.address).await {
        Ok(Some(coordinates)) => event.location.coordinates = Some(coordinates),
        Ok(None) => tracing::warn!(
            "Could not geocode '{}', storing address only",
            event.location.address
        ),
        Err(e) => tracing::warn!(
            "Geocoding '{}' failed, storing address only: {}",
            event.location.address,
            e
        ),
    }

    let shared = match register_event(state.registry.as_ref(), event, state.max_code_attempts).await
    {
        Ok(shared) => shared,
        Err(e) => return registry_error_response(&e),
    };

    let (response, notification) = {
        let event = shared.lock().await;
        let links = ConfirmationLinks::for_event(&state.public_url, &event);
        let notification = render_confirmation(&event, &links);
        let response = CreateEventResponse {
            code: event.code().to_string(),
            share_id: event.share_id().to_string(),
            share_link: links.share_link,
            dashboard_link: links.dashboard_link,
            event: event.to_representation(),
        };
        (response, notification)
    };

    tracing::info!("Created event '{}' ({})", response.event.name, response.share_id);

    if let Err(e) = state.notifier.send(&notification).await {
        tracing::warn!(
            "Event {} created but confirmation to {} failed: {}",
            response.share_id,
            notification.recipient,
            e
        );
    }

    HttpResponse::Created().json(response)
}

/// Organizer dashboard
///
/// GET /api/v1/events/{code}
async fn get_dashboard(state: web::Data<AppState>, code: web::Path<String>) -> impl Responder {
    let shared = match find_event(&state, &code).await {
        Ok(shared) => shared,
        Err(response) => return response,
    };

    let event = shared.lock().await;
    HttpResponse::Ok().json(event.to_representation())
}

/// Append a question to the event
///
/// POST /api/v1/events/{code}/questions
async fn add_question(
    state: web::Data<AppState>,
    code: web::Path<String>,
    req: web::Json<AddQuestionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }

    let shared = match find_event(&state, &code).await {
        Ok(shared) => shared,
        Err(response) => return response,
    };

    let mut event = shared.lock().await;
    event.add_question(req.text.trim());
    tracing::debug!("Event {} now has {} questions", event.share_id(), event.questions.len());

    HttpResponse::Created().json(event.to_representation())
}

/// Share link and the QR code that encodes it
///
/// GET /api/v1/events/{code}/share
async fn share_event(state: web::Data<AppState>, code: web::Path<String>) -> impl Responder {
    let shared = match find_event(&state, &code).await {
        Ok(shared) => shared,
        Err(response) => return response,
    };

    let share_link = shared.lock().await.share_link(&state.public_url);

    match state.qr.render(&share_link) {
        Ok(image) => HttpResponse::Ok().json(ShareResponse {
            share_link,
            qr_content_type: image.content_type.to_string(),
            qr_data_uri: image.data_uri(),
            qr_code_base64: image.base64,
        }),
        Err(e) => {
            tracing::error!("Failed to render QR code for {}: {}", share_link, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to render QR code", e)
        }
    }
}

/// Pair everyone currently waiting
///
/// POST /api/v1/events/{code}/match
///
/// With fewer than two attendees waiting nothing is paired and the response
/// lists them as unmatched.
async fn match_attendees(state: web::Data<AppState>, code: web::Path<String>) -> impl Responder {
    let shared = match find_event(&state, &code).await {
        Ok(shared) => shared,
        Err(response) => return response,
    };

    let mut event = shared.lock().await;

    let (total_waiting, planned, unmatched) = {
        let waiting = event.waiting_attendees();
        let pairing = state.matchmaker.pair_attendees(&waiting);

        if pairing.is_empty_pool() {
            tracing::info!(
                "Not enough attendees waiting in event {} to pair ({})",
                event.share_id(),
                pairing.pool_size()
            );
        }

        let planned: Vec<(Uuid, Uuid, Vec<String>)> = pairing
            .pairs
            .iter()
            .map(|&(first, second)| {
                let starters = state.matchmaker.generate_conversation_starters((first, second));
                (first.id, second.id, starters)
            })
            .collect();
        let unmatched: Vec<AttendeeSummary> =
            pairing.unmatched.iter().map(|&a| AttendeeSummary::from(a)).collect();

        (pairing.pool_size(), planned, unmatched)
    };

    let mut match_ids = Vec::with_capacity(planned.len());
    for (first, second, starters) in planned {
        match event.record_match(first, second, starters) {
            Ok(record) => match_ids.push(record.id),
            Err(e) => {
                tracing::error!("Failed to record match in event {}: {}", event.share_id(), e);
                return event_error_response(&e);
            }
        }
    }

    let matches: Vec<MatchSummary> = match_ids
        .iter()
        .filter_map(|id| event.matches.iter().find(|m| m.id == *id))
        .filter_map(|record| summarize(&event, record))
        .collect();

    tracing::info!(
        "Paired {} of {} waiting attendees in event {} using {} scorer",
        matches.len() * 2,
        total_waiting,
        event.share_id(),
        state.matchmaker.scorer_name()
    );

    HttpResponse::Ok().json(MatchRunResponse {
        matches,
        unmatched,
        total_waiting,
    })
}

/// Keep a pair together past the current round
///
/// POST /api/v1/events/{code}/matches/{match_id}/extend
async fn extend_match(
    state: web::Data<AppState>,
    path: web::Path<(String, Uuid)>,
) -> impl Responder {
    let (code, match_id) = path.into_inner();

    let shared = match find_event(&state, &code).await {
        Ok(shared) => shared,
        Err(response) => return response,
    };

    let mut event = shared.lock().await;
    if let Err(e) = event.extend_match(match_id) {
        return event_error_response(&e);
    }

    tracing::info!("Extended match {} in event {}", match_id, event.share_id());

    match event
        .matches
        .iter()
        .find(|m| m.id == match_id)
        .and_then(|record| summarize(&event, record))
    {
        Some(summary) => HttpResponse::Ok().json(summary),
        None => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Inconsistent match",
            format!("Match {} references an unknown attendee", match_id),
        ),
    }
}

/// Look up an event by organizer code; malformed codes never reach the registry
async fn find_event(state: &AppState, code: &str) -> Result<SharedEvent, HttpResponse> {
    if !is_valid_code(code) {
        return Err(registry_error_response(&RegistryError::NotFound(code.to_string())));
    }

    state
        .registry
        .lookup(code)
        .await
        .map_err(|e| registry_error_response(&e))
}

fn summarize(event: &Event, record: &Match) -> Option<MatchSummary> {
    let first = event.attendee(record.attendees[0])?;
    let second = event.attendee(record.attendees[1])?;
    Some(MatchSummary::new(record, first, second))
}
