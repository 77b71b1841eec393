use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

use crate::core::codes::{generate_share_id, generate_unique_code};

/// Radius used when the organizer does not pick one
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

/// Path prefix every HTTP route is mounted under
pub const API_PREFIX: &str = "/api/v1";

/// Errors raised while building or mutating events and attendees
#[derive(Debug, Error, PartialEq)]
pub enum EventError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Attendee not found: {0}")]
    AttendeeNotFound(Uuid),

    #[error("Attendee is not waiting for a match: {0}")]
    AttendeeUnavailable(Uuid),

    #[error("Match not found: {0}")]
    MatchNotFound(Uuid),
}

/// Geographic point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Event venue: the free-text address plus whatever the geocoder resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

impl Location {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            coordinates: None,
        }
    }

    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendeeStatus {
    Waiting,
    Matched,
    Extended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Active,
    Extended,
}

/// A person registered for one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
    pub status: AttendeeStatus,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(rename = "registeredAt")]
    pub registered_at: DateTime<Utc>,
}

impl Attendee {
    pub fn new(
        name: impl Into<String>,
        details: BTreeMap<String, String>,
    ) -> Result<Self, EventError> {
        let name = name.into();
        require("name", &name)?;

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            details,
            answers: BTreeMap::new(),
            status: AttendeeStatus::Waiting,
            coordinates: None,
            registered_at: Utc::now(),
        })
    }

    /// Replace every stored answer
    pub fn set_answers(&mut self, answers: BTreeMap<String, String>) {
        self.answers = answers;
    }

    /// Insert or overwrite the answer to a single question
    pub fn set_answer(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.answers.insert(question.into(), answer.into());
    }

    pub fn is_waiting(&self) -> bool {
        self.status == AttendeeStatus::Waiting
    }
}

/// Two attendees paired by the matchmaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    pub attendees: [Uuid; 2],
    pub status: MatchStatus,
    #[serde(rename = "startedAt")]
    pub started_at: DateTime<Utc>,
    #[serde(rename = "conversationStarters", default)]
    pub conversation_starters: Vec<String>,
}

impl Match {
    pub fn involves(&self, attendee_id: Uuid) -> bool {
        self.attendees.contains(&attendee_id)
    }

    /// The other side of the match, if `attendee_id` is part of it
    pub fn partner_of(&self, attendee_id: Uuid) -> Option<Uuid> {
        match self.attendees {
            [a, b] if a == attendee_id => Some(b),
            [a, b] if b == attendee_id => Some(a),
            _ => None,
        }
    }
}

/// An organizer's event together with everyone registered for it
///
/// `code` is the organizer's control token and doubles as the registry key.
/// `share_id` is what goes into public registration links and QR codes.
#[derive(Debug, Clone)]
pub struct Event {
    pub name: String,
    pub location: Location,
    pub creator: String,
    pub creator_email: String,
    /// Kilometers
    pub radius: f64,
    pub questions: Vec<String>,
    pub attendees: Vec<Attendee>,
    pub matches: Vec<Match>,
    pub created_at: DateTime<Utc>,
    code: String,
    share_id: String,
}

impl Event {
    pub fn create(
        name: impl Into<String>,
        location: Location,
        creator: impl Into<String>,
        creator_email: impl Into<String>,
        radius: f64,
    ) -> Result<Self, EventError> {
        let name = name.into();
        let creator = creator.into();
        let creator_email = creator_email.into();

        require("name", &name)?;
        require("creator", &creator)?;
        require("creator_email", &creator_email)?;
        require("location", &location.address)?;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(EventError::Validation(format!(
                "radius must be a positive number of kilometers, got {}",
                radius
            )));
        }

        let code = generate_unique_code();
        let mut share_id = generate_share_id();
        while share_id == code {
            share_id = generate_share_id();
        }

        Ok(Self {
            name: name.trim().to_string(),
            location,
            creator: creator.trim().to_string(),
            creator_email: creator_email.trim().to_string(),
            radius,
            questions: Vec::new(),
            attendees: Vec::new(),
            matches: Vec::new(),
            created_at: Utc::now(),
            code,
            share_id,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn share_id(&self) -> &str {
        &self.share_id
    }

    /// Draw a fresh organizer code after the registry reported a collision
    pub fn reroll_code(&mut self) {
        let previous = std::mem::take(&mut self.code);
        let mut code = generate_unique_code();
        while code == previous || code == self.share_id {
            code = generate_unique_code();
        }
        self.code = code;
    }

    /// Draw a fresh share id after the registry reported a collision
    pub fn reroll_share_id(&mut self) {
        let previous = std::mem::take(&mut self.share_id);
        let mut share_id = generate_share_id();
        while share_id == previous || share_id == self.code {
            share_id = generate_share_id();
        }
        self.share_id = share_id;
    }

    #[cfg(test)]
    pub(crate) fn force_code(&mut self, code: &str) {
        self.code = code.to_string();
    }

    #[cfg(test)]
    pub(crate) fn force_share_id(&mut self, share_id: &str) {
        self.share_id = share_id.to_string();
    }

    pub fn add_question(&mut self, text: impl Into<String>) {
        self.questions.push(text.into());
    }

    pub fn add_attendee(&mut self, attendee: Attendee) {
        self.attendees.push(attendee);
    }

    pub fn attendee(&self, id: Uuid) -> Option<&Attendee> {
        self.attendees.iter().find(|a| a.id == id)
    }

    pub fn attendee_mut(&mut self, id: Uuid) -> Option<&mut Attendee> {
        self.attendees.iter_mut().find(|a| a.id == id)
    }

    /// Attendees not currently in a match, in registration order
    pub fn waiting_attendees(&self) -> Vec<&Attendee> {
        self.attendees.iter().filter(|a| a.is_waiting()).collect()
    }

    /// Public registration link, also the payload encoded into the QR code
    pub fn share_link(&self, base_url: &str) -> String {
        format!(
            "{}{}/register/{}",
            base_url.trim_end_matches('/'),
            API_PREFIX,
            self.share_id
        )
    }

    /// Store a new active match and take both attendees out of the waiting pool
    pub fn record_match(
        &mut self,
        first: Uuid,
        second: Uuid,
        conversation_starters: Vec<String>,
    ) -> Result<&Match, EventError> {
        for id in [first, second] {
            let attendee = self.attendee(id).ok_or(EventError::AttendeeNotFound(id))?;
            if !attendee.is_waiting() {
                return Err(EventError::AttendeeUnavailable(id));
            }
        }
        if first == second {
            return Err(EventError::AttendeeUnavailable(first));
        }

        for attendee in self.attendees.iter_mut() {
            if attendee.id == first || attendee.id == second {
                attendee.status = AttendeeStatus::Matched;
            }
        }

        self.matches.push(Match {
            id: Uuid::new_v4(),
            attendees: [first, second],
            status: MatchStatus::Active,
            started_at: Utc::now(),
            conversation_starters,
        });

        Ok(&self.matches[self.matches.len() - 1])
    }

    /// Mark a match and both of its attendees as extended
    pub fn extend_match(&mut self, match_id: Uuid) -> Result<&Match, EventError> {
        let index = self
            .matches
            .iter()
            .position(|m| m.id == match_id)
            .ok_or(EventError::MatchNotFound(match_id))?;

        self.matches[index].status = MatchStatus::Extended;
        let pair = self.matches[index].attendees;
        for attendee in self.attendees.iter_mut() {
            if pair.contains(&attendee.id) {
                attendee.status = AttendeeStatus::Extended;
            }
        }

        Ok(&self.matches[index])
    }

    /// Most recent match the attendee took part in
    pub fn current_match_for(&self, attendee_id: Uuid) -> Option<&Match> {
        self.matches.iter().rev().find(|m| m.involves(attendee_id))
    }

    /// Full snapshot for the organizer dashboard. Contains the organizer code.
    pub fn to_representation(&self) -> EventRepresentation {
        EventRepresentation {
            name: self.name.clone(),
            location: self.location.clone(),
            creator: self.creator.clone(),
            creator_email: self.creator_email.clone(),
            radius: self.radius,
            code: self.code.clone(),
            share_id: self.share_id.clone(),
            questions: self.questions.clone(),
            attendees: self.attendees.clone(),
            matches: self.matches.clone(),
            created_at: self.created_at,
        }
    }

    /// Snapshot safe to hand to anyone holding the share link
    pub fn to_public_representation(&self) -> PublicEventView {
        PublicEventView {
            name: self.name.clone(),
            address: self.location.address.clone(),
            creator: self.creator.clone(),
            radius: self.radius,
            share_id: self.share_id.clone(),
            questions: self.questions.clone(),
            attendee_count: self.attendees.len(),
        }
    }
}

fn require(field: &str, value: &str) -> Result<(), EventError> {
    if value.trim().is_empty() {
        return Err(EventError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Serializable form of an [`Event`] used for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRepresentation {
    pub name: String,
    pub location: Location,
    pub creator: String,
    #[serde(rename = "creatorEmail")]
    pub creator_email: String,
    pub radius: f64,
    pub code: String,
    #[serde(rename = "shareId")]
    pub share_id: String,
    pub questions: Vec<String>,
    pub attendees: Vec<Attendee>,
    pub matches: Vec<Match>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// What an attendee sees on the registration page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicEventView {
    pub name: String,
    pub address: String,
    pub creator: String,
    pub radius: f64,
    #[serde(rename = "shareId")]
    pub share_id: String,
    pub questions: Vec<String>,
    #[serde(rename = "attendeeCount")]
    pub attendee_count: usize,
}

/// Weights for the attribute-overlap scorer
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub details: f64,
    pub answers: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            details: 0.4,
            answers: 0.6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_event() -> Event {
        Event::create(
            "Rust Meetup",
            Location::new("Main St"),
            "Ada",
            "ada@example.com",
            DEFAULT_RADIUS_KM,
        )
        .unwrap()
    }

    fn create_attendee(name: &str) -> Attendee {
        Attendee::new(name, BTreeMap::new()).unwrap()
    }

    #[test]
    fn test_create_generates_distinct_identifiers() {
        let event = create_test_event();
        assert_eq!(event.code().len(), 6);
        assert_eq!(event.share_id().len(), 8);
        assert_ne!(event.code(), event.share_id());
    }

    #[test]
    fn test_create_rejects_blank_fields() {
        let err = Event::create("  ", Location::new("Main St"), "Ada", "ada@example.com", 5.0)
            .unwrap_err();
        assert!(matches!(err, EventError::Validation(_)));

        let err = Event::create("Meetup", Location::new(""), "Ada", "ada@example.com", 5.0)
            .unwrap_err();
        assert!(matches!(err, EventError::Validation(_)));
    }

    #[test]
    fn test_create_rejects_non_positive_radius() {
        for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = Event::create("Meetup", Location::new("Main St"), "Ada", "a@b.c", radius);
            assert!(result.is_err(), "radius {} should be rejected", radius);
        }
    }

    #[test]
    fn test_reroll_code_changes_code() {
        let mut event = create_test_event();
        let before = event.code().to_string();
        event.reroll_code();
        assert_ne!(event.code(), before);
        assert_eq!(event.code().len(), 6);
    }

    #[test]
    fn test_attendee_requires_name() {
        assert!(Attendee::new("", BTreeMap::new()).is_err());
        let attendee = create_attendee("Grace");
        assert!(attendee.answers.is_empty());
        assert_eq!(attendee.status, AttendeeStatus::Waiting);
    }

    #[test]
    fn test_questions_keep_order_and_duplicates() {
        let mut event = create_test_event();
        event.add_question("Favourite language?");
        event.add_question("Favourite language?");
        event.add_question("Tabs or spaces?");
        assert_eq!(event.questions.len(), 3);
        assert_eq!(event.questions[2], "Tabs or spaces?");
    }

    #[test]
    fn test_record_and_extend_match() {
        let mut event = create_test_event();
        let a = create_attendee("A");
        let b = create_attendee("B");
        let (a_id, b_id) = (a.id, b.id);
        event.add_attendee(a);
        event.add_attendee(b);

        let match_id = event.record_match(a_id, b_id, vec![]).unwrap().id;
        assert!(event.waiting_attendees().is_empty());
        assert_eq!(event.attendee(a_id).unwrap().status, AttendeeStatus::Matched);

        // Already matched attendees cannot be matched again
        assert_eq!(
            event.record_match(a_id, b_id, vec![]).unwrap_err(),
            EventError::AttendeeUnavailable(a_id)
        );

        let extended = event.extend_match(match_id).unwrap();
        assert_eq!(extended.status, MatchStatus::Extended);
        assert_eq!(event.attendee(b_id).unwrap().status, AttendeeStatus::Extended);
        assert_eq!(event.current_match_for(b_id).unwrap().partner_of(b_id), Some(a_id));
    }

    #[test]
    fn test_extend_unknown_match() {
        let mut event = create_test_event();
        let id = Uuid::new_v4();
        assert_eq!(event.extend_match(id).unwrap_err(), EventError::MatchNotFound(id));
    }

    #[test]
    fn test_share_link() {
        let event = create_test_event();
        let link = event.share_link("https://events.example.com/");
        assert_eq!(
            link,
            format!("https://events.example.com/api/v1/register/{}", event.share_id())
        );
    }

    #[test]
    fn test_public_view_hides_code() {
        let event = create_test_event();
        let json = serde_json::to_string(&event.to_public_representation()).unwrap();
        assert!(!json.contains(event.code()));
        assert!(!json.contains("ada@example.com"));
    }
}
