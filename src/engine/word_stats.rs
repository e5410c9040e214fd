use std::collections::HashMap;

use crate::store::history::HistoryEvent;

const BASE_WEIGHT: i64 = 10;
const WRONG_WEIGHT: i64 = 20;
const CORRECT_WEIGHT: i64 = 2;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WordStat {
    pub correct_count: u32,
    pub wrong_count: u32,
}

impl WordStat {
    pub fn attempts(&self) -> u32 {
        self.correct_count + self.wrong_count
    }

    /// Selection weight in adaptive mode. Never below 1, so every word stays
    /// reachable however often it was answered correctly.
    pub fn weight(&self) -> u64 {
        let raw = BASE_WEIGHT + WRONG_WEIGHT * i64::from(self.wrong_count)
            - CORRECT_WEIGHT * i64::from(self.correct_count);
        raw.max(1) as u64
    }
}

/// Per-word totals over every recorded attempt.
#[derive(Clone, Debug, Default)]
pub struct WordStats {
    stats: HashMap<String, WordStat>,
}

impl WordStats {
    pub fn from_events(events: &[HistoryEvent]) -> Self {
        let mut stats: HashMap<String, WordStat> = HashMap::new();
        for event in events {
            let stat = stats.entry(event.word.clone()).or_default();
            if event.correct {
                stat.correct_count += 1;
            } else {
                stat.wrong_count += 1;
            }
        }
        Self { stats }
    }

    /// Stats for `word`, zero when never attempted.
    pub fn get(&self, word: &str) -> WordStat {
        self.stats.get(word).cloned().unwrap_or_default()
    }

    pub fn weight(&self, word: &str) -> u64 {
        self.get(word).weight()
    }

    /// Words with at least one wrong answer, most wrong first.
    pub fn most_missed(&self, limit: usize) -> Vec<(&str, WordStat)> {
        let mut missed: Vec<(&str, WordStat)> = self
            .stats
            .iter()
            .filter(|(_, s)| s.wrong_count > 0)
            .map(|(w, s)| (w.as_str(), s.clone()))
            .collect();
        missed.sort_by(|a, b| {
            b.1.wrong_count
                .cmp(&a.1.wrong_count)
                .then(a.1.correct_count.cmp(&b.1.correct_count))
                .then(a.0.cmp(b.0))
        });
        missed.truncate(limit);
        missed
    }
}
