// Core algorithm exports
pub mod codes;
pub mod distance;
pub mod location;
pub mod matcher;
pub mod scoring;
pub mod starters;
pub mod themes;

pub use codes::{generate_share_id, generate_unique_code, is_valid_code};
pub use distance::{distance_between, haversine_distance, is_within_radius};
pub use location::{LocationCheck, LocationPolicy};
pub use matcher::{MatchMaker, Pairing};
pub use scoring::{build_scorer, OverlapScorer, RandomScorer, Scorer, ScorerKind};
pub use starters::{conversation_starters, DEFAULT_STARTERS};
pub use themes::{suggest_themes, EVENT_THEMES};
