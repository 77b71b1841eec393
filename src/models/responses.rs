use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::LocationCheck;
use crate::models::domain::{
    Attendee, AttendeeStatus, EventRepresentation, Match, MatchStatus, PublicEventView,
};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub events: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeSuggestionsResponse {
    pub themes: Vec<String>,
}

/// Response for event creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventResponse {
    pub code: String,
    #[serde(rename = "shareId")]
    pub share_id: String,
    #[serde(rename = "shareLink")]
    pub share_link: String,
    #[serde(rename = "dashboardLink")]
    pub dashboard_link: String,
    pub event: EventRepresentation,
}

/// Share link plus the QR image that encodes it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareResponse {
    #[serde(rename = "shareLink")]
    pub share_link: String,
    #[serde(rename = "qrContentType")]
    pub qr_content_type: String,
    #[serde(rename = "qrCodeBase64")]
    pub qr_code_base64: String,
    /// Ready to drop into an `<img src>`
    #[serde(rename = "qrDataUri")]
    pub qr_data_uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendeeSummary {
    pub id: Uuid,
    pub name: String,
}

impl From<&Attendee> for AttendeeSummary {
    fn from(attendee: &Attendee) -> Self {
        Self {
            id: attendee.id,
            name: attendee.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    #[serde(rename = "matchId")]
    pub match_id: Uuid,
    pub status: MatchStatus,
    pub attendees: Vec<AttendeeSummary>,
    #[serde(rename = "conversationStarters")]
    pub conversation_starters: Vec<String>,
    #[serde(rename = "startedAt")]
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl MatchSummary {
    pub fn new(record: &Match, first: &Attendee, second: &Attendee) -> Self {
        Self {
            match_id: record.id,
            status: record.status,
            attendees: vec![first.into(), second.into()],
            conversation_starters: record.conversation_starters.clone(),
            started_at: record.started_at,
        }
    }
}

/// Result of a matching run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRunResponse {
    pub matches: Vec<MatchSummary>,
    pub unmatched: Vec<AttendeeSummary>,
    #[serde(rename = "totalWaiting")]
    pub total_waiting: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationResponse {
    #[serde(rename = "attendeeId")]
    pub attendee_id: Uuid,
    pub status: AttendeeStatus,
    #[serde(rename = "locationCheck")]
    pub location_check: LocationCheck,
    pub event: PublicEventView,
}

/// What an attendee sees while waiting to be paired
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitingRoomResponse {
    pub attendee: AttendeeSummary,
    pub status: AttendeeStatus,
    pub partner: Option<AttendeeSummary>,
    #[serde(rename = "matchId")]
    pub match_id: Option<Uuid>,
    #[serde(rename = "conversationStarters", default)]
    pub conversation_starters: Vec<String>,
}
