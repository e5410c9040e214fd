pub mod distractor;
pub mod history_stats;
pub mod selector;
pub mod similarity;
pub mod word_stats;

