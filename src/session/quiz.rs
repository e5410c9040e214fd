use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rust_i18n::t;

use crate::engine::distractor::{self, CHOICE_COUNT, DEFAULT_SIMILARITY_THRESHOLD};
use crate::engine::selector::{self, SelectionMode};
use crate::error::{MIN_WORDS, QuizError};
use crate::store::history::{HistoryEvent, HistoryLog};
use crate::store::words::{WordEntry, WordStore};

/// Settings fixed for the lifetime of one session.
#[derive(Clone, Debug, PartialEq)]
pub struct QuizConfig {
    pub question_count: usize,
    /// 0 means untimed.
    pub time_limit_secs: u64,
    pub adaptive: bool,
    pub similarity_threshold: f64,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            question_count: 10,
            time_limit_secs: 0,
            adaptive: false,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl QuizConfig {
    pub fn time_limit(&self) -> Option<Duration> {
        (self.time_limit_secs > 0).then(|| Duration::from_secs(self.time_limit_secs))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
    TimedOut,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LastResult {
    pub message: String,
    pub outcome: Outcome,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Active { index: usize, score: usize },
    Finished { score: usize, total: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub index: usize,
    pub total: usize,
    pub word: String,
    pub choices: [String; CHOICE_COUNT],
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub was_correct: bool,
    pub correct_meaning: String,
    pub outcome: Outcome,
    /// False when the history append failed; the session carries on anyway.
    pub recorded: bool,
}

/// One run through a fixed question plan.
#[derive(Clone, Debug)]
pub struct QuizSession {
    config: QuizConfig,
    plan: Vec<WordEntry>,
    current_index: usize,
    score: usize,
    current_choices: Option<[String; CHOICE_COUNT]>,
    last_result: Option<LastResult>,
    selection_mode: SelectionMode,
    seed: u64,
}

impl QuizSession {
    /// Draw a plan from `store` and enter the first question.
    ///
    /// The history log is only consulted when `config.adaptive` is set.
    pub fn start(
        store: &WordStore,
        config: QuizConfig,
        history: Option<&dyn HistoryLog>,
        rng: &mut SmallRng,
    ) -> Result<Self, QuizError> {
        check_pool(store)?;
        let history = if config.adaptive { history } else { None };
        let words = store.words();
        let (picked, selection_mode) =
            selector::select(&words, config.question_count.max(1), history, rng);
        let plan = picked
            .iter()
            .filter_map(|word| store.entry(word))
            .collect::<Vec<_>>();

        tracing::info!(
            questions = plan.len(),
            mode = ?selection_mode,
            time_limit = config.time_limit_secs,
            "quiz session started"
        );
        let mut session = Self::from_plan(plan, config, rng.r#gen());
        session.selection_mode = selection_mode;
        Ok(session)
    }

    /// A session over an explicit plan. `seed` drives choice generation.
    pub fn from_plan(plan: Vec<WordEntry>, config: QuizConfig, seed: u64) -> Self {
        Self {
            config,
            plan,
            current_index: 0,
            score: 0,
            current_choices: None,
            last_result: None,
            selection_mode: SelectionMode::Uniform,
            seed,
        }
    }

    /// A fresh session with the same config and a newly drawn plan.
    pub fn retry(
        &self,
        store: &WordStore,
        history: Option<&dyn HistoryLog>,
        rng: &mut SmallRng,
    ) -> Result<Self, QuizError> {
        Self::start(store, self.config.clone(), history, rng)
    }

    pub fn phase(&self) -> SessionPhase {
        if self.is_finished() {
            SessionPhase::Finished {
                score: self.score,
                total: self.plan.len(),
            }
        } else {
            SessionPhase::Active {
                index: self.current_index,
                score: self.score,
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.current_index >= self.plan.len()
    }

    /// `(correct, total)`.
    pub fn score(&self) -> (usize, usize) {
        (self.score, self.plan.len())
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total(&self) -> usize {
        self.plan.len()
    }

    pub fn plan(&self) -> &[WordEntry] {
        &self.plan
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.selection_mode
    }

    pub fn last_result(&self) -> Option<&LastResult> {
        self.last_result.as_ref()
    }

    /// Fraction of the plan already answered.
    pub fn progress(&self) -> f64 {
        if self.plan.is_empty() {
            return 1.0;
        }
        self.current_index as f64 / self.plan.len() as f64
    }

    /// The current word and its four choices. Choices are generated on the
    /// first call for each index and reused until the index advances.
    pub fn current_question(&mut self, store: &WordStore) -> Result<Question, QuizError> {
        let entry = self
            .plan
            .get(self.current_index)
            .ok_or(QuizError::SessionFinished)?;

        let choices = match self.current_choices.clone() {
            Some(choices) => choices,
            None => {
                let mut rng = SmallRng::seed_from_u64(self.question_seed());
                let choices = distractor::build_choices(
                    &entry.meaning,
                    &store.meanings(),
                    self.config.similarity_threshold,
                    &mut rng,
                )?;
                self.current_choices = Some(choices.clone());
                choices
            }
        };

        Ok(Question {
            index: self.current_index,
            total: self.plan.len(),
            word: entry.word.clone(),
            choices,
        })
    }

    pub fn submit_answer(
        &mut self,
        choice: &str,
        history: &mut dyn HistoryLog,
    ) -> Result<AnswerFeedback, QuizError> {
        let entry = self
            .plan
            .get(self.current_index)
            .ok_or(QuizError::SessionFinished)?;
        let outcome = if choice == entry.meaning {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        };
        Ok(self.resolve(outcome, history))
    }

    /// The timer ran out on the current question: recorded as a wrong answer.
    pub fn submit_timeout(&mut self, history: &mut dyn HistoryLog) -> Result<AnswerFeedback, QuizError> {
        if self.is_finished() {
            return Err(QuizError::SessionFinished);
        }
        Ok(self.resolve(Outcome::TimedOut, history))
    }

    /// Timeout for question `index`, ignored when that question was already
    /// answered.
    pub fn expire(
        &mut self,
        index: usize,
        history: &mut dyn HistoryLog,
    ) -> Option<AnswerFeedback> {
        if index != self.current_index || self.is_finished() {
            tracing::debug!(index, current = self.current_index, "ignoring stale timeout");
            return None;
        }
        Some(self.resolve(Outcome::TimedOut, history))
    }

    fn resolve(&mut self, outcome: Outcome, history: &mut dyn HistoryLog) -> AnswerFeedback {
        let entry = &self.plan[self.current_index];
        let was_correct = outcome == Outcome::Correct;

        let recorded = match history.append(&HistoryEvent::now(&entry.word, was_correct)) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(word = %entry.word, error = %err, "failed to record answer");
                false
            }
        };

        let message = match outcome {
            Outcome::Correct => t!("quiz.correct").to_string(),
            Outcome::Incorrect => t!("quiz.incorrect", answer = &entry.meaning).to_string(),
            Outcome::TimedOut => t!("quiz.timeout", answer = &entry.meaning).to_string(),
        };
        let feedback = AnswerFeedback {
            was_correct,
            correct_meaning: entry.meaning.clone(),
            outcome,
            recorded,
        };

        if was_correct {
            self.score += 1;
        }
        self.last_result = Some(LastResult { message, outcome });
        self.current_choices = None;
        self.current_index += 1;

        if self.is_finished() {
            tracing::info!(score = self.score, total = self.plan.len(), "quiz session finished");
        }
        feedback
    }

    fn question_seed(&self) -> u64 {
        self.seed ^ (self.current_index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }
}

fn check_pool(store: &WordStore) -> Result<(), QuizError> {
    if store.len() < MIN_WORDS {
        return Err(QuizError::InsufficientData {
            found: store.len(),
            required: MIN_WORDS,
        });
    }
    let distinct = store.distinct_meanings();
    if distinct < MIN_WORDS {
        return Err(QuizError::InsufficientData {
            found: distinct,
            required: MIN_WORDS,
        });
    }
    Ok(())
}
