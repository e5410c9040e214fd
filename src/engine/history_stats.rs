use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::engine::word_stats::WordStats;
use crate::error::HistoryError;
use crate::store::history::{HistoryEvent, HistoryLog};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DayCount {
    pub answers: usize,
    pub correct: usize,
}

/// Read-only dashboard aggregation over the whole history log.
#[derive(Clone, Debug, Default)]
pub struct HistoryStats {
    pub total_answers: usize,
    pub total_correct: usize,
    /// Keyed by UTC calendar day.
    pub per_day: BTreeMap<NaiveDate, DayCount>,
    pub words: WordStats,
}

impl HistoryStats {
    pub fn from_events(events: &[HistoryEvent]) -> Self {
        let mut per_day: BTreeMap<NaiveDate, DayCount> = BTreeMap::new();
        let mut total_correct = 0;
        for event in events {
            let day = per_day.entry(event.timestamp.date_naive()).or_default();
            day.answers += 1;
            if event.correct {
                day.correct += 1;
                total_correct += 1;
            }
        }
        Self {
            total_answers: events.len(),
            total_correct,
            per_day,
            words: WordStats::from_events(events),
        }
    }

    pub fn from_log(log: &dyn HistoryLog) -> Result<Self, HistoryError> {
        Ok(Self::from_events(&log.read_all()?))
    }

    /// Percentage of correct answers, 0 when nothing was answered.
    pub fn accuracy(&self) -> f64 {
        if self.total_answers == 0 {
            return 0.0;
        }
        self.total_correct as f64 / self.total_answers as f64 * 100.0
    }

    pub fn days_practiced(&self) -> usize {
        self.per_day.len()
    }

    pub fn answers_on(&self, day: NaiveDate) -> usize {
        self.per_day.get(&day).map(|d| d.answers).unwrap_or(0)
    }
}
