use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    Attendee, AttendeeStatus, AttendeeSummary, Coordinates, EventError, RegisterAttendeeRequest,
    RegistrationResponse, SubmitAnswersRequest, WaitingRoomResponse,
};
use crate::routes::{error_response, event_error_response, registry_error_response, AppState};

/// Configure attendee-facing routes reached through a share link
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/register/{share_id}", web::get().to(get_public_event))
        .route("/register/{share_id}", web::post().to(register_attendee))
        .route(
            "/register/{share_id}/attendees/{attendee_id}/answers",
            web::put().to(submit_answers),
        )
        .route(
            "/register/{share_id}/attendees/{attendee_id}",
            web::get().to(waiting_room),
        );
}

/// Public event view shown on the registration page
///
/// GET /api/v1/register/{share_id}
async fn get_public_event(
    state: web::Data<AppState>,
    share_id: web::Path<String>,
) -> impl Responder {
    let shared = match state.registry.lookup_by_share_id(&share_id).await {
        Ok(shared) => shared,
        Err(e) => return registry_error_response(&e),
    };

    let event = shared.lock().await;
    HttpResponse::Ok().json(event.to_public_representation())
}

/// Register an attendee
///
/// POST /api/v1/register/{share_id}
///
/// Request body:
/// ```json
/// {
///   "name": "string",
///   "details": { "occupation": "string" },
///   "answers": { "question": "answer" },
///   "latitude": 52.52,
///   "longitude": 13.40
/// }
/// ```
async fn register_attendee(
    state: web::Data<AppState>,
    share_id: web::Path<String>,
    req: web::Json<RegisterAttendeeRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for registration: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }

    let position = match (req.latitude, req.longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates { latitude, longitude }),
        (None, None) => None,
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Validation failed",
                "latitude and longitude must be given together",
            )
        }
    };

    let remote_addr = http_req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string();

    let shared = match state.registry.lookup_by_share_id(&share_id).await {
        Ok(shared) => shared,
        Err(e) => return registry_error_response(&e),
    };

    let mut event = shared.lock().await;

    let location_check = match position {
        Some(position) => state.location_policy.check(&event, position),
        None => state.matchmaker.verify_attendee_location(&remote_addr),
    };

    if !location_check.is_allowed() {
        tracing::info!(
            "Refusing registration for event {}: {}",
            event.share_id(),
            location_check
        );
        return error_response(
            StatusCode::FORBIDDEN,
            "Outside event radius",
            format!("You are {}", location_check),
        );
    }

    let mut attendee = match Attendee::new(req.name.as_str(), req.details.clone()) {
        Ok(attendee) => attendee,
        Err(e) => return event_error_response(&e),
    };
    attendee.set_answers(req.answers.clone());
    attendee.coordinates = position;

    let attendee_id = attendee.id;
    let status = attendee.status;
    event.add_attendee(attendee);

    tracing::info!(
        "Registered attendee {} for event {} ({} total)",
        attendee_id,
        event.share_id(),
        event.attendees.len()
    );

    HttpResponse::Created().json(RegistrationResponse {
        attendee_id,
        status,
        location_check,
        event: event.to_public_representation(),
    })
}

/// Merge answers into an attendee's existing answers
///
/// PUT /api/v1/register/{share_id}/attendees/{attendee_id}/answers
async fn submit_answers(
    state: web::Data<AppState>,
    path: web::Path<(String, Uuid)>,
    req: web::Json<SubmitAnswersRequest>,
) -> impl Responder {
    let (share_id, attendee_id) = path.into_inner();

    let shared = match state.registry.lookup_by_share_id(&share_id).await {
        Ok(shared) => shared,
        Err(e) => return registry_error_response(&e),
    };

    let mut event = shared.lock().await;
    let Some(attendee) = event.attendee_mut(attendee_id) else {
        return event_error_response(&EventError::AttendeeNotFound(attendee_id));
    };

    for (question, answer) in req.into_inner().answers {
        attendee.set_answer(question, answer);
    }

    tracing::debug!("Attendee {} now has {} answers", attendee_id, attendee.answers.len());

    HttpResponse::Ok().json(&*attendee)
}

/// Waiting-room status: partner and conversation starters once matched
///
/// GET /api/v1/register/{share_id}/attendees/{attendee_id}
async fn waiting_room(
    state: web::Data<AppState>,
    path: web::Path<(String, Uuid)>,
) -> impl Responder {
    let (share_id, attendee_id) = path.into_inner();

    let shared = match state.registry.lookup_by_share_id(&share_id).await {
        Ok(shared) => shared,
        Err(e) => return registry_error_response(&e),
    };

    let event = shared.lock().await;
    let Some(attendee) = event.attendee(attendee_id) else {
        return event_error_response(&EventError::AttendeeNotFound(attendee_id));
    };

    let current = if attendee.status == AttendeeStatus::Waiting {
        None
    } else {
        event.current_match_for(attendee_id)
    };

    let partner = current
        .and_then(|record| record.partner_of(attendee_id))
        .and_then(|partner_id| event.attendee(partner_id))
        .map(AttendeeSummary::from);

    HttpResponse::Ok().json(WaitingRoomResponse {
        attendee: attendee.into(),
        status: attendee.status,
        partner,
        match_id: current.map(|record| record.id),
        conversation_starters: current
            .map(|record| record.conversation_starters.clone())
            .unwrap_or_default(),
    })
}
