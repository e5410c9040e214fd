pub mod history;
pub mod words;
