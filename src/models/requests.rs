use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use crate::models::domain::DEFAULT_RADIUS_KM;

/// Request to create an event
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 200))]
    pub creator: String,
    #[validate(email)]
    #[serde(alias = "creator_email", rename = "creatorEmail")]
    pub creator_email: String,
    /// Free-text address, geocoded on creation
    #[validate(length(min = 1, max = 500))]
    pub location: String,
    /// Kilometers
    #[serde(default = "default_radius")]
    pub radius: f64,
}

fn default_radius() -> f64 {
    DEFAULT_RADIUS_KM
}

/// Request to append a question to an event
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddQuestionRequest {
    #[validate(length(min = 1, max = 500))]
    pub text: String,
}

/// Registration submitted through a share link
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterAttendeeRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
    /// Self-reported position, checked against the event radius when enforced
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default)]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Answers to merge into an attendee's existing answers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswersRequest {
    pub answers: BTreeMap<String, String>,
}

/// Request for theme suggestions while naming an event
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SuggestThemesRequest {
    #[validate(length(max = 200))]
    #[serde(alias = "event_name", rename = "eventName")]
    pub event_name: String,
}
