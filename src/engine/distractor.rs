use rand::Rng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::engine::similarity::is_similar;
use crate::error::{MIN_WORDS, QuizError};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.4;
pub const DISTRACTOR_COUNT: usize = 3;
pub const CHOICE_COUNT: usize = DISTRACTOR_COUNT + 1;

#[derive(Clone, Debug, PartialEq)]
pub struct DistractorSet {
    pub distractors: Vec<String>,
    /// Set when the similarity filter let fewer than three candidates through
    /// and the rest were drawn at random.
    pub used_fallback: bool,
}

/// Pick three wrong meanings for `correct` from `pool`.
///
/// Candidates are visited in shuffled order and rejected when they equal
/// `correct` or are more similar than `threshold` to `correct` or to an
/// already accepted distractor. Remaining slots are filled uniformly from the
/// distinct pool entries other than `correct`, with no similarity check.
pub fn generate(
    correct: &str,
    pool: &[&str],
    threshold: f64,
    rng: &mut SmallRng,
) -> Result<DistractorSet, QuizError> {
    let mut candidates: Vec<&str> = pool.to_vec();
    candidates.shuffle(rng);

    let mut chosen: Vec<&str> = Vec::with_capacity(DISTRACTOR_COUNT);
    for &candidate in &candidates {
        if chosen.len() == DISTRACTOR_COUNT {
            break;
        }
        if candidate == correct || chosen.contains(&candidate) {
            continue;
        }
        if is_similar(candidate, correct, threshold) {
            continue;
        }
        if chosen.iter().any(|c| is_similar(candidate, c, threshold)) {
            continue;
        }
        chosen.push(candidate);
    }

    let used_fallback = chosen.len() < DISTRACTOR_COUNT;
    if used_fallback {
        let mut remaining: Vec<&str> = Vec::new();
        for &candidate in &candidates {
            if candidate != correct && !chosen.contains(&candidate) && !remaining.contains(&candidate) {
                remaining.push(candidate);
            }
        }
        let missing = DISTRACTOR_COUNT - chosen.len();
        if remaining.len() < missing {
            return Err(QuizError::InsufficientData {
                found: chosen.len() + remaining.len() + 1,
                required: MIN_WORDS,
            });
        }
        for _ in 0..missing {
            let idx = rng.gen_range(0..remaining.len());
            chosen.push(remaining.swap_remove(idx));
        }
        tracing::debug!(correct, "distractor filter fell back to random fill");
    }

    Ok(DistractorSet {
        distractors: chosen.into_iter().map(str::to_string).collect(),
        used_fallback,
    })
}

/// The four answer choices for one question: three distractors plus the
/// correct meaning, in random order.
pub fn build_choices(
    correct: &str,
    pool: &[&str],
    threshold: f64,
    rng: &mut SmallRng,
) -> Result<[String; CHOICE_COUNT], QuizError> {
    let set = generate(correct, pool, threshold, rng)?;
    let [a, b, c]: [String; DISTRACTOR_COUNT] = set
        .distractors
        .try_into()
        .map_err(|_| QuizError::InsufficientData {
            found: 0,
            required: MIN_WORDS,
        })?;
    let mut choices = [a, b, c, correct.to_string()];
    choices.shuffle(rng);
    Ok(choices)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;

    use super::*;
    use crate::engine::similarity::ratio;

    const FRUITS: [&str; 4] = ["a fruit", "a fruit-like", "a vehicle", "the atmosphere"];

    fn assert_contract(correct: &str, set: &DistractorSet) {
        assert_eq!(set.distractors.len(), DISTRACTOR_COUNT);
        let unique: HashSet<&String> = set.distractors.iter().collect();
        assert_eq!(unique.len(), DISTRACTOR_COUNT, "distractors must be distinct");
        assert!(set.distractors.iter().all(|d| d != correct));
    }

    #[test]
    fn small_homogeneous_pool_falls_back_to_all_other_meanings() {
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let set = generate("a fruit", &FRUITS, 0.4, &mut rng).unwrap();
            assert_contract("a fruit", &set);
            assert!(set.used_fallback, "seed {seed}: 'a fruit-like' must be filtered");
            let got: HashSet<&str> = set.distractors.iter().map(String::as_str).collect();
            let expected: HashSet<&str> = ["a fruit-like", "a vehicle", "the atmosphere"].into();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn filtered_path_respects_threshold() {
        let pool = [
            "cat",
            "to run quickly",
            "a large body of water",
            "xyz",
            "mountain",
            "qqqq",
            "bright",
        ];
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let set = generate("cat", &pool, 0.4, &mut rng).unwrap();
            assert_contract("cat", &set);
            if !set.used_fallback {
                for (i, a) in set.distractors.iter().enumerate() {
                    assert!(ratio(a, "cat") <= 0.4);
                    for b in &set.distractors[i + 1..] {
                        assert!(ratio(a, b) <= 0.4, "{a:?} vs {b:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn different_seeds_keep_the_contract() {
        let pool = ["alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf"];
        let mut outputs = HashSet::new();
        for seed in 0..30 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let set = generate("alpha", &pool, 0.4, &mut rng).unwrap();
            assert_contract("alpha", &set);
            let mut sorted = set.distractors.clone();
            sorted.sort();
            outputs.insert(sorted);
        }
        assert!(outputs.len() > 1, "shuffling should vary the chosen distractors");
    }

    #[test]
    fn duplicate_meanings_in_pool_are_not_chosen_twice() {
        let pool = ["same", "same", "same", "other", "third", "answer"];
        for seed in 0..20 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let set = generate("answer", &pool, 0.4, &mut rng).unwrap();
            assert_contract("answer", &set);
        }
    }

    #[test]
    fn too_few_distinct_meanings_is_an_error() {
        let pool = ["answer", "same", "same", "other"];
        let mut rng = SmallRng::seed_from_u64(1);
        let err = generate("answer", &pool, 0.4, &mut rng).unwrap_err();
        assert!(matches!(err, QuizError::InsufficientData { .. }));
    }

    #[test]
    fn choices_contain_correct_once_and_three_distractors() {
        let mut rng = SmallRng::seed_from_u64(7);
        let choices = build_choices("a vehicle", &FRUITS, 0.4, &mut rng).unwrap();
        assert_eq!(choices.iter().filter(|c| *c == "a vehicle").count(), 1);
        let unique: HashSet<&String> = choices.iter().collect();
        assert_eq!(unique.len(), CHOICE_COUNT);
    }

    #[test]
    fn correct_answer_position_varies() {
        let mut positions = HashSet::new();
        for seed in 0..40 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let choices = build_choices("a vehicle", &FRUITS, 0.4, &mut rng).unwrap();
            positions.insert(choices.iter().position(|c| c == "a vehicle").unwrap());
        }
        assert!(positions.len() > 1);
    }
}
