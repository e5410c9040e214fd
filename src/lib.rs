// The terminal front-end lives in main.rs; everything it drives is exposed
// here so benches and integration tests can reach it as `wordquiz::*`.
rust_i18n::i18n!("locales", fallback = "en");

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod logging;
pub mod session;
pub mod store;
pub mod ui;
