use std::collections::HashSet;
use std::fs;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tempfile::TempDir;

use wordquiz::engine::history_stats::HistoryStats;
use wordquiz::engine::selector::SelectionMode;
use wordquiz::error::QuizError;
use wordquiz::session::quiz::{Outcome, QuizConfig, QuizSession, SessionPhase};
use wordquiz::store::history::{CsvHistoryLog, HistoryLog};
use wordquiz::store::words::{WordSource, WordStore};

const WORDS_CSV: &str = "\
Word,Meaning,Level
apple,a fruit,1
banana,a fruit-like thing,1
car,a vehicle,1
sky,the air above,2
river,flowing water,2
stone,a small rock,2
cloud,white mass in the sky,3
tiger,a big striped cat,3
";

fn write_words(dir: &TempDir) -> WordStore {
    let path = dir.path().join("words.csv");
    fs::write(&path, WORDS_CSV).unwrap();
    WordStore::load(&WordSource::File(path)).unwrap()
}

fn config(question_count: usize, adaptive: bool) -> QuizConfig {
    QuizConfig {
        question_count,
        adaptive,
        ..QuizConfig::default()
    }
}

#[test]
fn full_session_is_persisted_to_the_history_file() {
    let dir = TempDir::new().unwrap();
    let store = write_words(&dir);
    let history_path = dir.path().join("data").join("history.csv");
    let mut log = CsvHistoryLog::new(&history_path);
    let mut rng = SmallRng::seed_from_u64(11);

    let mut session = QuizSession::start(&store, config(5, false), Some(&log), &mut rng).unwrap();
    assert_eq!(session.selection_mode(), SelectionMode::Uniform);

    let mut asked = HashSet::new();
    let mut expected_score = 0;
    while !session.is_finished() {
        let question = session.current_question(&store).unwrap();
        assert!(asked.insert(question.word.clone()), "word asked twice");

        let meanings: HashSet<&String> = question.choices.iter().collect();
        assert_eq!(meanings.len(), 4);
        let correct = store.meaning(&question.word).unwrap().to_string();
        assert!(question.choices.contains(&correct));

        // Alternate right and wrong answers.
        let pick = if question.index % 2 == 0 {
            expected_score += 1;
            correct.clone()
        } else {
            question.choices.iter().find(|c| **c != correct).unwrap().clone()
        };
        let feedback = session.submit_answer(&pick, &mut log).unwrap();
        assert!(feedback.recorded);
        assert_eq!(feedback.correct_meaning, correct);
    }

    assert_eq!(
        session.phase(),
        SessionPhase::Finished {
            score: expected_score,
            total: 5
        }
    );
    assert!(matches!(session.current_question(&store), Err(QuizError::SessionFinished)));

    let text = fs::read_to_string(&history_path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("word,correct,timestamp"));
    assert_eq!(lines.count(), 5);

    let stats = HistoryStats::from_log(&log).unwrap();
    assert_eq!(stats.total_answers, 5);
    assert_eq!(stats.total_correct, expected_score);
    assert_eq!(stats.days_practiced(), 1);
}

#[test]
fn timeout_counts_as_wrong_and_names_the_answer() {
    let dir = TempDir::new().unwrap();
    let store = write_words(&dir);
    let mut log = CsvHistoryLog::new(dir.path().join("history.csv"));
    let mut rng = SmallRng::seed_from_u64(3);

    let mut session = QuizSession::start(&store, config(3, false), None, &mut rng).unwrap();
    let question = session.current_question(&store).unwrap();
    let feedback = session.submit_timeout(&mut log).unwrap();

    assert!(!feedback.was_correct);
    assert_eq!(feedback.outcome, Outcome::TimedOut);
    let last = session.last_result().unwrap();
    assert_eq!(last.outcome, Outcome::TimedOut);
    assert!(last.message.contains(store.meaning(&question.word).unwrap()));

    let events = log.read_all().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].word, question.word);
    assert!(!events[0].correct);

    // A timeout for the question already resolved is ignored.
    assert!(session.expire(0, &mut log).is_none());
    assert_eq!(log.read_all().unwrap().len(), 1);
}

#[test]
fn adaptive_session_reads_back_the_csv_history() {
    let dir = TempDir::new().unwrap();
    let store = write_words(&dir);
    let mut log = CsvHistoryLog::new(dir.path().join("history.csv"));

    // Miss "tiger" many times in earlier sessions.
    let mut rng = SmallRng::seed_from_u64(21);
    let plan = vec![store.entry("tiger").unwrap()];
    for _ in 0..15 {
        let mut session = QuizSession::from_plan(plan.clone(), config(1, false), 5);
        session.submit_answer("wrong", &mut log).unwrap();
    }

    let mut tiger_picked = 0;
    for _ in 0..100 {
        let session = QuizSession::start(&store, config(2, true), Some(&log), &mut rng).unwrap();
        assert_eq!(session.selection_mode(), SelectionMode::Adaptive);
        if session.plan().iter().any(|e| e.word == "tiger") {
            tiger_picked += 1;
        }
    }
    // Uniformly it would appear in about a quarter of two-word plans.
    assert!(tiger_picked > 80, "tiger picked {tiger_picked}/100");
}

#[test]
fn cleared_history_starts_empty_but_stays_readable() {
    let dir = TempDir::new().unwrap();
    let store = write_words(&dir);
    let path = dir.path().join("history.csv");
    let mut log = CsvHistoryLog::new(&path);
    let mut rng = SmallRng::seed_from_u64(8);

    let mut session = QuizSession::start(&store, config(2, false), None, &mut rng).unwrap();
    let question = session.current_question(&store).unwrap();
    session.submit_answer(&question.choices[0], &mut log).unwrap();
    assert_eq!(log.read_all().unwrap().len(), 1);

    log.clear().unwrap();
    assert!(log.read_all().unwrap().is_empty());
    assert_eq!(fs::read_to_string(&path).unwrap().trim(), "word,correct,timestamp");

    let question = session.current_question(&store).unwrap();
    session.submit_answer(&question.choices[0], &mut log).unwrap();
    assert_eq!(log.read_all().unwrap().len(), 1);
}

#[test]
fn word_lists_with_too_few_entries_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tiny.csv");
    fs::write(&path, "word,meaning\napple,a fruit\ncar,a vehicle\n,blank\n").unwrap();
    let err = WordStore::load(&WordSource::File(path)).unwrap_err();
    assert!(matches!(err, QuizError::InsufficientData { found: 2, required: 4 }));
    assert!(err.is_fatal_at_start());
}

#[test]
fn missing_meaning_column_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "term,definition\napple,a fruit\n").unwrap();
    let err = WordStore::load(&WordSource::File(path)).unwrap_err();
    assert!(matches!(err, QuizError::DataLoad { .. }));
}

#[test]
fn bundled_course_list_supports_a_full_session() {
    let store = WordStore::load(&WordSource::parse("builtin:toeic.csv")).unwrap();
    assert!(store.len() >= 20);
    let mut rng = SmallRng::seed_from_u64(99);
    let mut log = wordquiz::store::history::MemoryHistoryLog::default();
    let mut session = QuizSession::start(&store, config(10, false), None, &mut rng).unwrap();
    while !session.is_finished() {
        let question = session.current_question(&store).unwrap();
        let correct = store.meaning(&question.word).unwrap().to_string();
        session.submit_answer(&correct, &mut log).unwrap();
    }
    assert_eq!(session.score(), (10, 10));
    assert_eq!(log.events().len(), 10);
}
