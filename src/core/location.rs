use serde::Serialize;
use std::fmt;

use crate::core::distance::distance_between;
use crate::models::{Coordinates, Event};

/// Outcome of checking an attendee's position against an event's radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum LocationCheck {
    Within {
        #[serde(rename = "distanceKm")]
        distance_km: f64,
    },
    Outside {
        #[serde(rename = "distanceKm")]
        distance_km: f64,
        #[serde(rename = "radiusKm")]
        radius_km: f64,
    },
    /// No check was performed; nothing about the attendee's position is claimed
    Unchecked,
}

impl LocationCheck {
    /// Only a measured position outside the radius refuses registration
    pub fn is_allowed(&self) -> bool {
        !matches!(self, LocationCheck::Outside { .. })
    }
}

/// Radius enforcement for registrations
#[derive(Debug, Clone, Copy, Default)]
pub struct LocationPolicy {
    pub enforce_radius: bool,
}

impl LocationPolicy {
    pub fn new(enforce_radius: bool) -> Self {
        Self { enforce_radius }
    }

    /// Compare self-reported coordinates with the event venue
    ///
    /// Returns `Unchecked` when enforcement is off or the venue was never
    /// geocoded.
    pub fn check(&self, event: &Event, position: Coordinates) -> LocationCheck {
        if !self.enforce_radius {
            return LocationCheck::Unchecked;
        }

        let Some(venue) = event.location.coordinates else {
            tracing::debug!("Event {} has no coordinates, skipping radius check", event.share_id());
            return LocationCheck::Unchecked;
        };

        let distance_km = distance_between(venue, position);
        if distance_km <= event.radius {
            LocationCheck::Within { distance_km }
        } else {
            LocationCheck::Outside {
                distance_km,
                radius_km: event.radius,
            }
        }
    }
}

impl fmt::Display for LocationCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationCheck::Within { distance_km } => {
                write!(f, "{:.2} km from the venue", distance_km)
            }
            LocationCheck::Outside { distance_km, radius_km } => write!(
                f,
                "{:.2} km from the venue; registration is limited to {} km",
                distance_km, radius_km
            ),
            LocationCheck::Unchecked => write!(f, "position not checked"),
        }
    }
}
