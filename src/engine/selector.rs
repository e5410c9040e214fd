use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::engine::word_stats::WordStats;
use crate::store::history::HistoryLog;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionMode {
    Uniform,
    Adaptive,
}

/// Pick up to `count` distinct words from `words`.
///
/// With a history log the draw is adaptive; an unreadable log degrades to a
/// uniform draw.
pub fn select(
    words: &[&str],
    count: usize,
    history: Option<&dyn HistoryLog>,
    rng: &mut SmallRng,
) -> (Vec<String>, SelectionMode) {
    let Some(log) = history else {
        return (sample_uniform(words, count, rng), SelectionMode::Uniform);
    };
    match log.read_all() {
        Ok(events) => {
            let stats = WordStats::from_events(&events);
            (sample_weighted(words, count, &stats, rng), SelectionMode::Adaptive)
        }
        Err(err) => {
            tracing::warn!(error = %err, "history unreadable, selecting uniformly");
            (sample_uniform(words, count, rng), SelectionMode::Uniform)
        }
    }
}

/// Uniform sample without replacement, in random order.
pub fn sample_uniform(words: &[&str], count: usize, rng: &mut SmallRng) -> Vec<String> {
    let mut pool = dedup(words);
    pool.shuffle(rng);
    pool.truncate(count);
    pool.into_iter().map(str::to_string).collect()
}

/// Weighted sample without replacement: one weighted draw at a time, each
/// over the words not yet drawn.
pub fn sample_weighted(
    words: &[&str],
    count: usize,
    stats: &WordStats,
    rng: &mut SmallRng,
) -> Vec<String> {
    let mut pool = dedup(words);
    let mut weights: Vec<u64> = pool.iter().map(|w| stats.weight(w)).collect();
    let target = count.min(pool.len());

    let mut picked = Vec::with_capacity(target);
    while picked.len() < target {
        let idx = match WeightedIndex::new(&weights) {
            Ok(dist) => dist.sample(rng),
            // Weights are floored at 1, so this only happens on an empty pool.
            Err(_) => break,
        };
        picked.push(pool.swap_remove(idx).to_string());
        weights.swap_remove(idx);
    }
    picked
}

fn dedup<'a>(words: &[&'a str]) -> Vec<&'a str> {
    let mut seen = std::collections::HashSet::new();
    words.iter().copied().filter(|w| seen.insert(*w)).collect()
}
