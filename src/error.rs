use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Minimum number of entries (and distinct meanings) needed for one correct
/// answer plus three distractors.
pub const MIN_WORDS: usize = 4;

#[derive(Debug, Error)]
pub enum QuizError {
    /// The word source is missing, unreadable, or lacks the required fields.
    #[error("failed to load word data from {source_name}: {reason}")]
    DataLoad { source_name: String, reason: String },

    /// Fewer usable entries than a session needs.
    #[error("not enough words: found {found}, need at least {required}")]
    InsufficientData { found: usize, required: usize },

    #[error(transparent)]
    History(#[from] HistoryError),

    /// A question operation was called after the last question was answered.
    #[error("the quiz session has already finished")]
    SessionFinished,

    #[error("unknown course: {0}")]
    UnknownCourse(String),
}

impl QuizError {
    pub fn data_load(source_name: impl Into<String>, reason: impl ToString) -> Self {
        QuizError::DataLoad {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    /// Errors that prevent a session from starting at all.
    pub fn is_fatal_at_start(&self) -> bool {
        matches!(
            self,
            QuizError::DataLoad { .. } | QuizError::InsufficientData { .. } | QuizError::UnknownCourse(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to read history from {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("failed to write history to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Storage is not reachable at all (used by in-memory fakes).
    #[error("history storage unavailable")]
    Unavailable,
}

impl HistoryError {
    pub fn read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        HistoryError::Read {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message_names_counts() {
        let err = QuizError::InsufficientData {
            found: 2,
            required: MIN_WORDS,
        };
        let msg = err.to_string();
        assert!(msg.contains('2'));
        assert!(msg.contains('4'));
        assert!(err.is_fatal_at_start());
    }

    #[test]
    fn history_errors_are_not_fatal_at_start() {
        let err: QuizError = HistoryError::Unavailable.into();
        assert!(!err.is_fatal_at_start());
        assert!(!QuizError::SessionFinished.is_fatal_at_start());
    }
}
