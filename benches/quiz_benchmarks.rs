use chrono::{TimeZone, Utc};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use wordquiz::engine::distractor::{self, DEFAULT_SIMILARITY_THRESHOLD};
use wordquiz::engine::selector;
use wordquiz::engine::similarity;
use wordquiz::engine::word_stats::WordStats;
use wordquiz::store::history::HistoryEvent;

fn make_meanings(count: usize) -> Vec<String> {
    let stems = ["to reduce", "a formal", "the process of", "an official", "relating to"];
    let tails = ["agreement", "expense", "inspection", "request", "schedule", "permit"];
    (0..count)
        .map(|i| format!("{} {} #{i}", stems[i % stems.len()], tails[i % tails.len()]))
        .collect()
}

fn make_events(words: &[String], count: usize) -> Vec<HistoryEvent> {
    let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| HistoryEvent {
            word: words[(i * 7) % words.len()].clone(),
            correct: i % 3 != 0, // ~33% wrong
            timestamp: base + chrono::Duration::minutes(i as i64),
        })
        .collect()
}

fn bench_similarity(c: &mut Criterion) {
    c.bench_function("similarity ratio (short phrases)", |b| {
        b.iter(|| similarity::ratio(black_box("to postpone a meeting"), black_box("to cancel a meeting")))
    });
}

fn bench_distractors(c: &mut Criterion) {
    let meanings = make_meanings(1000);
    let pool: Vec<&str> = meanings.iter().map(String::as_str).collect();
    let mut rng = SmallRng::seed_from_u64(1);

    c.bench_function("distractor generate (1000 meanings)", |b| {
        b.iter(|| {
            distractor::generate(
                black_box(pool[0]),
                black_box(&pool),
                DEFAULT_SIMILARITY_THRESHOLD,
                &mut rng,
            )
        })
    });
}

fn bench_selection(c: &mut Criterion) {
    let words: Vec<String> = (0..2000).map(|i| format!("word{i}")).collect();
    let refs: Vec<&str> = words.iter().map(String::as_str).collect();
    let events = make_events(&words, 20_000);
    let stats = WordStats::from_events(&events);
    let mut rng = SmallRng::seed_from_u64(2);

    c.bench_function("word stats from 20k events", |b| {
        b.iter(|| WordStats::from_events(black_box(&events)))
    });

    c.bench_function("weighted sample 20 of 2000", |b| {
        b.iter(|| selector::sample_weighted(black_box(&refs), 20, &stats, &mut rng))
    });
}

criterion_group!(benches, bench_similarity, bench_distractors, bench_selection);
criterion_main!(benches);
