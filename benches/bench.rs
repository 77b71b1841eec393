// Criterion benchmarks for EventMatch

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use event_match::core::{haversine_distance, MatchMaker, OverlapScorer, Scorer};
use event_match::models::Attendee;
use std::collections::BTreeMap;

const OCCUPATIONS: [&str; 5] = ["developer", "designer", "chef", "nurse", "teacher"];
const LANGUAGES: [&str; 4] = ["Rust", "Go", "Python", "Haskell"];

fn create_attendee(id: usize) -> Attendee {
    let mut details = BTreeMap::new();
    details.insert("occupation".to_string(), OCCUPATIONS[id % OCCUPATIONS.len()].to_string());
    details.insert("city".to_string(), if id % 2 == 0 { "Berlin" } else { "Hamburg" }.to_string());

    let mut attendee = Attendee::new(format!("Attendee {}", id), details)
        .expect("generated names are never blank");
    attendee.set_answer("Favourite language?", LANGUAGES[id % LANGUAGES.len()]);
    attendee.set_answer("Coffee or tea?", if id % 3 == 0 { "tea" } else { "coffee" });
    attendee
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(52.5200),
                black_box(13.4050),
                black_box(52.5219),
                black_box(13.4132),
            )
        });
    });
}

fn bench_overlap_score(c: &mut Criterion) {
    let scorer = OverlapScorer::default();
    let first = create_attendee(0);
    let second = create_attendee(4);

    c.bench_function("overlap_score", |b| {
        b.iter(|| scorer.score(black_box(&first), black_box(&second)));
    });
}

fn bench_pairing(c: &mut Criterion) {
    let matchmaker = MatchMaker::default();

    let mut group = c.benchmark_group("pairing");

    for attendee_count in [10, 50, 100, 250].iter() {
        let attendees: Vec<Attendee> = (0..*attendee_count).map(create_attendee).collect();
        let refs: Vec<&Attendee> = attendees.iter().collect();

        group.bench_with_input(
            BenchmarkId::new("pair_attendees", attendee_count),
            attendee_count,
            |b, _| {
                b.iter(|| matchmaker.pair_attendees(black_box(&refs)).pairs.len());
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_overlap_score,
    bench_pairing
);

criterion_main!(benches);
