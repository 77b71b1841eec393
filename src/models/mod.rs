// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Attendee, AttendeeStatus, Coordinates, Event, EventError, EventRepresentation, Location, Match,
    MatchStatus, PublicEventView, ScoringWeights, API_PREFIX, DEFAULT_RADIUS_KM,
};
pub use requests::{
    AddQuestionRequest, CreateEventRequest, RegisterAttendeeRequest, SubmitAnswersRequest,
    SuggestThemesRequest,
};
pub use responses::{
    AttendeeSummary, CreateEventResponse, ErrorResponse, HealthResponse, MatchRunResponse,
    MatchSummary, RegistrationResponse, ShareResponse, ThemeSuggestionsResponse,
    WaitingRoomResponse,
};
