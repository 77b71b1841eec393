use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::core::location::LocationCheck;
use crate::core::scoring::{OverlapScorer, Scorer};
use crate::core::starters::conversation_starters;
use crate::models::{Attendee, Event};

/// Result of one pairing run
///
/// With an odd pool the last attendee ends up in `unmatched`; with fewer than
/// two attendees nothing is paired and every input is returned there.
#[derive(Debug, Clone, PartialEq)]
pub struct Pairing<'a> {
    pub pairs: Vec<(&'a Attendee, &'a Attendee)>,
    pub unmatched: Vec<&'a Attendee>,
}

impl Pairing<'_> {
    /// True when the pool held fewer than two attendees
    pub fn is_empty_pool(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of attendees that went into the run
    pub fn pool_size(&self) -> usize {
        self.pairs.len() * 2 + self.unmatched.len()
    }
}

/// Greedy pairing of attendees
///
/// # Algorithm
/// 1. Take the first attendee still in the pool
/// 2. Score it against every other remaining attendee
/// 3. Pair it with the highest scorer (first one wins ties)
/// 4. Repeat while two or more attendees remain
///
/// Order dependent by construction: the attendee registered first picks first.
#[derive(Clone)]
pub struct MatchMaker {
    scorer: Arc<dyn Scorer>,
}

impl MatchMaker {
    pub fn new(scorer: Arc<dyn Scorer>) -> Self {
        Self { scorer }
    }

    pub fn scorer_name(&self) -> &'static str {
        self.scorer.name()
    }

    /// Pair the given attendees
    ///
    /// The input slice is copied into a working pool; callers keep their list.
    pub fn pair_attendees<'a>(&self, attendees: &[&'a Attendee]) -> Pairing<'a> {
        let mut pool: VecDeque<&'a Attendee> = attendees.iter().copied().collect();
        let mut pairs = Vec::with_capacity(pool.len() / 2);

        while pool.len() >= 2 {
            let Some(first) = pool.pop_front() else {
                break;
            };

            let best = self.best_partner(first, &pool);
            if let Some(partner) = pool.remove(best) {
                pairs.push((first, partner));
            }
        }

        Pairing {
            pairs,
            unmatched: pool.into_iter().collect(),
        }
    }

    /// Pair every attendee of the event, regardless of status
    pub fn pair_event<'a>(&self, event: &'a Event) -> Pairing<'a> {
        let attendees: Vec<&Attendee> = event.attendees.iter().collect();
        self.pair_attendees(&attendees)
    }

    /// Index in `pool` of the best partner for `attendee`
    ///
    /// Only a strictly higher score replaces the current best, so ties go to
    /// the earliest candidate and NaN scores never win.
    fn best_partner(&self, attendee: &Attendee, pool: &VecDeque<&Attendee>) -> usize {
        let mut best_index = 0;
        let mut best_score = f64::NEG_INFINITY;

        for (index, candidate) in pool.iter().enumerate() {
            let score = self.scorer.score(attendee, candidate);
            if score > best_score {
                best_index = index;
                best_score = score;
            }
        }

        best_index
    }

    pub fn generate_conversation_starters(&self, pair: (&Attendee, &Attendee)) -> Vec<String> {
        conversation_starters(pair.0, pair.1)
    }

    /// IP-based location verification is not implemented
    ///
    /// Always answers [`LocationCheck::Unchecked`]; radius enforcement from
    /// self-reported coordinates lives in `LocationPolicy`.
    pub fn verify_attendee_location(&self, ip_address: &str) -> LocationCheck {
        tracing::debug!("No IP geolocation available, not verifying {}", ip_address);
        LocationCheck::Unchecked
    }
}

impl Default for MatchMaker {
    fn default() -> Self {
        Self::new(Arc::new(OverlapScorer::default()))
    }
}

impl fmt::Debug for MatchMaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchMaker")
            .field("scorer", &self.scorer.name())
            .finish()
    }
}
