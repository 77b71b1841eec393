use rand::Rng;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::models::{Attendee, ScoringWeights};

/// Compatibility between two attendees; higher is better
///
/// Implementations must be cheap: the matchmaker calls `score` once per
/// remaining candidate on every pairing step.
pub trait Scorer: Send + Sync {
    fn score(&self, first: &Attendee, second: &Attendee) -> f64;

    /// Name used in logs
    fn name(&self) -> &'static str;
}

/// Which scorer the service runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScorerKind {
    #[default]
    Overlap,
    Random,
}

pub fn build_scorer(kind: ScorerKind, weights: ScoringWeights) -> Arc<dyn Scorer> {
    match kind {
        ScorerKind::Overlap => Arc::new(OverlapScorer::new(weights)),
        ScorerKind::Random => Arc::new(RandomScorer),
    }
}

/// Deterministic score (0-100) from shared registration details and answers
///
/// Scoring formula:
/// score = (
///     detail_overlap * weights.details +   # same value for the same form field
///     answer_overlap * weights.answers     # same answer to the same question
/// ) / (weights.details + weights.answers) * 100
///
/// Each overlap is the number of keys both attendees filled in with the same
/// value (case-insensitive, trimmed) divided by the number of distinct keys
/// either of them filled in.
#[derive(Debug, Clone, Copy)]
pub struct OverlapScorer {
    weights: ScoringWeights,
}

impl OverlapScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }
}

impl Default for OverlapScorer {
    fn default() -> Self {
        Self::new(ScoringWeights::default())
    }
}

impl Scorer for OverlapScorer {
    fn score(&self, first: &Attendee, second: &Attendee) -> f64 {
        let total_weight = self.weights.details + self.weights.answers;
        if total_weight <= 0.0 {
            return 0.0;
        }

        let details = overlap(&first.details, &second.details);
        let answers = overlap(&first.answers, &second.answers);

        let score = (details * self.weights.details + answers * self.weights.answers)
            / total_weight
            * 100.0;

        score.clamp(0.0, 100.0)
    }

    fn name(&self) -> &'static str {
        "overlap"
    }
}

/// Uniform random score, re-drawn on every call
///
/// Not symmetric and not repeatable. Kept for organizers who want shuffled
/// pairings rather than similarity-based ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomScorer;

impl Scorer for RandomScorer {
    fn score(&self, _first: &Attendee, _second: &Attendee) -> f64 {
        rand::thread_rng().gen_range(0.0..100.0)
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

#[inline]
fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Fraction of filled-in keys on which both maps agree
fn overlap(first: &BTreeMap<String, String>, second: &BTreeMap<String, String>) -> f64 {
    let keys: BTreeSet<&String> = first
        .iter()
        .chain(second.iter())
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(key, _)| key)
        .collect();

    if keys.is_empty() {
        return 0.0;
    }

    let shared = keys
        .iter()
        .filter(|key| match (first.get(**key), second.get(**key)) {
            (Some(a), Some(b)) => {
                let a = normalize(a);
                !a.is_empty() && a == normalize(b)
            }
            _ => false,
        })
        .count();

    shared as f64 / keys.len() as f64
}
