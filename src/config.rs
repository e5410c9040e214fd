use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::distractor::DEFAULT_SIMILARITY_THRESHOLD;
use crate::error::QuizError;
use crate::session::quiz::QuizConfig;
use crate::store::words::WordSource;

pub const SUPPORTED_LOCALES: &[&str] = &["en", "ja"];
pub const MAX_QUESTION_COUNT: usize = 100;
pub const MAX_TIME_LIMIT_SECS: u64 = 300;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    /// `builtin:<file>` or a path to a CSV/TSV/JSON word list.
    pub source: String,
    #[serde(default)]
    pub adaptive: bool,
}

impl Course {
    pub fn word_source(&self) -> WordSource {
        WordSource::parse(&self.source)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_question_count")]
    pub question_count: usize,
    #[serde(default)]
    pub time_limit_secs: u64,
    #[serde(default)]
    pub adaptive: bool,
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_history_path")]
    pub history_path: String,
    #[serde(default = "default_courses")]
    pub courses: Vec<Course>,
}

fn default_question_count() -> usize {
    10
}
fn default_similarity_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}
fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_locale() -> String {
    "en".to_string()
}
fn default_history_path() -> String {
    data_dir().join("history.csv").to_string_lossy().to_string()
}
fn default_courses() -> Vec<Course> {
    vec![
        Course {
            name: "TOEIC Advanced (800-990)".to_string(),
            source: "builtin:toeic.csv".to_string(),
            adaptive: false,
        },
        Course {
            name: "TOEIC Review".to_string(),
            source: "builtin:toeic.csv".to_string(),
            adaptive: true,
        },
        Course {
            name: "Everyday English".to_string(),
            source: "builtin:basic-en.csv".to_string(),
            adaptive: false,
        },
    ]
}

/// Settings given on the command line. They apply to the current run only
/// and are never written back to the config file.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub question_count: Option<usize>,
    pub time_limit_secs: Option<u64>,
    pub adaptive: bool,
    pub theme: Option<String>,
    pub locale: Option<String>,
}

impl ConfigOverrides {
    /// The effective config for this run: `saved` with the overrides on top.
    pub fn apply(&self, saved: &Config) -> Config {
        let mut config = saved.clone();
        if let Some(count) = self.question_count {
            config.question_count = count;
        }
        if let Some(secs) = self.time_limit_secs {
            config.time_limit_secs = secs;
        }
        if self.adaptive {
            config.adaptive = true;
        }
        if let Some(ref theme) = self.theme {
            config.theme = theme.clone();
        }
        if let Some(ref locale) = self.locale {
            config.locale = locale.clone();
        }
        config.validate();
        config
    }
}

/// `<data_dir>/wordquiz`, falling back to the working directory.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wordquiz")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            question_count: default_question_count(),
            time_limit_secs: 0,
            adaptive: false,
            similarity_threshold: default_similarity_threshold(),
            theme: default_theme(),
            locale: default_locale(),
            history_path: default_history_path(),
            courses: default_courses(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wordquiz")
            .join("config.toml")
    }

    /// Clamp out-of-range values and restore defaults for unusable ones.
    pub fn validate(&mut self) {
        self.question_count = self.question_count.clamp(1, MAX_QUESTION_COUNT);
        self.time_limit_secs = self.time_limit_secs.min(MAX_TIME_LIMIT_SECS);
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            tracing::warn!(
                value = self.similarity_threshold,
                "similarity_threshold out of range, using default"
            );
            self.similarity_threshold = default_similarity_threshold();
        }
        if !SUPPORTED_LOCALES.contains(&self.locale.as_str()) {
            self.locale = default_locale();
        }
        self.courses.retain(|c| !c.name.trim().is_empty() && !c.source.trim().is_empty());
        if self.courses.is_empty() {
            self.courses = default_courses();
        }
    }

    pub fn course(&self, name: &str) -> Result<&Course, QuizError> {
        self.courses
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| QuizError::UnknownCourse(name.to_string()))
    }

    /// Session settings for `course`. A course marked adaptive always runs
    /// adaptively; other courses follow the global toggle.
    pub fn quiz_config(&self, course: &Course) -> QuizConfig {
        QuizConfig {
            question_count: self.question_count.max(1),
            time_limit_secs: self.time_limit_secs,
            adaptive: self.adaptive || course.adaptive,
            similarity_threshold: self.similarity_threshold,
        }
    }

    pub fn history_path(&self) -> PathBuf {
        PathBuf::from(&self.history_path)
    }
}
