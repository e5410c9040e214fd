use std::time::{Duration, Instant};

/// Countdown for one question. Polled from the event loop's tick; it fires at
/// most once per arming and carries the index it was armed for, so a timeout
/// that loses the race against an answer can be recognised as stale.
#[derive(Clone, Debug)]
pub struct QuestionTimer {
    limit: Option<Duration>,
    armed: Option<(usize, Instant)>,
}

impl QuestionTimer {
    pub fn new(limit: Option<Duration>) -> Self {
        Self { limit, armed: None }
    }

    pub fn is_timed(&self) -> bool {
        self.limit.is_some()
    }

    /// Start counting down for question `index`. No-op when untimed.
    pub fn arm(&mut self, index: usize, now: Instant) {
        self.armed = self.limit.map(|limit| (index, now + limit));
    }

    pub fn disarm(&mut self) {
        self.armed = None;
    }

    pub fn armed_for(&self) -> Option<usize> {
        self.armed.map(|(index, _)| index)
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.armed
            .map(|(_, deadline)| deadline.saturating_duration_since(now))
    }

    /// Remaining share of the limit in `[0, 1]`, for the countdown bar.
    pub fn remaining_ratio(&self, now: Instant) -> Option<f64> {
        let limit = self.limit?;
        let remaining = self.remaining(now)?;
        if limit.is_zero() {
            return Some(0.0);
        }
        Some((remaining.as_secs_f64() / limit.as_secs_f64()).clamp(0.0, 1.0))
    }

    /// The question index whose deadline has passed, once.
    pub fn poll(&mut self, now: Instant) -> Option<usize> {
        match self.armed {
            Some((index, deadline)) if now >= deadline => {
                self.armed = None;
                Some(index)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untimed_never_fires() {
        let mut timer = QuestionTimer::new(None);
        let t0 = Instant::now();
        timer.arm(0, t0);
        assert!(!timer.is_timed());
        assert_eq!(timer.armed_for(), None);
        assert_eq!(timer.poll(t0 + Duration::from_secs(3600)), None);
    }

    #[test]
    fn fires_once_after_deadline() {
        let mut timer = QuestionTimer::new(Some(Duration::from_secs(10)));
        let t0 = Instant::now();
        timer.arm(2, t0);
        assert_eq!(timer.poll(t0 + Duration::from_secs(9)), None);
        assert_eq!(timer.poll(t0 + Duration::from_secs(10)), Some(2));
        assert_eq!(timer.poll(t0 + Duration::from_secs(11)), None);
    }

    #[test]
    fn disarm_on_answer_cancels_pending_timeout() {
        let mut timer = QuestionTimer::new(Some(Duration::from_secs(5)));
        let t0 = Instant::now();
        timer.arm(0, t0);
        timer.disarm();
        assert_eq!(timer.poll(t0 + Duration::from_secs(60)), None);
    }

    #[test]
    fn remaining_counts_down() {
        let mut timer = QuestionTimer::new(Some(Duration::from_secs(10)));
        let t0 = Instant::now();
        timer.arm(0, t0);
        assert_eq!(timer.remaining(t0 + Duration::from_secs(4)), Some(Duration::from_secs(6)));
        let ratio = timer.remaining_ratio(t0 + Duration::from_secs(4)).unwrap();
        assert!((ratio - 0.6).abs() < 1e-9);
        assert_eq!(timer.remaining(t0 + Duration::from_secs(20)), Some(Duration::ZERO));
    }

    #[test]
    fn rearming_moves_to_the_next_question() {
        let mut timer = QuestionTimer::new(Some(Duration::from_secs(5)));
        let t0 = Instant::now();
        timer.arm(0, t0);
        timer.arm(1, t0 + Duration::from_secs(3));
        assert_eq!(timer.poll(t0 + Duration::from_secs(6)), None);
        assert_eq!(timer.poll(t0 + Duration::from_secs(8)), Some(1));
    }
}
