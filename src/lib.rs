//! EventMatch - live matchmaking for in-person events
//!
//! Organizers create an event and share a link (or its QR code). Attendees
//! register through the link, answer the organizer's questions and wait to be
//! paired; the organizer then pairs everyone currently waiting.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{MatchMaker, Pairing, Scorer, ScorerKind};
pub use models::{Attendee, Coordinates, Event, EventError, Location, Match, ScoringWeights};
pub use services::{InMemoryRegistry, Registry, RegistryError};
