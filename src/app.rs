use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::{Config, ConfigOverrides, Course, SUPPORTED_LOCALES};
use crate::engine::history_stats::HistoryStats;
use crate::error::QuizError;
use crate::session::quiz::{Question, QuizSession};
use crate::session::timer::QuestionTimer;
use crate::store::history::{CsvHistoryLog, HistoryLog};
use crate::store::words::WordStore;
use crate::ui::components::menu::{Menu, MenuAction};
use crate::ui::components::quiz_view::Countdown;
use crate::ui::components::stats_dashboard::TAB_COUNT;
use crate::ui::theme::Theme;

pub const QUESTION_COUNT_OPTIONS: [usize; 4] = [5, 10, 15, 20];
pub const TIME_LIMIT_OPTIONS: [u64; 6] = [0, 10, 15, 20, 30, 60];
pub const SETTINGS_FIELDS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Quiz,
    QuizResult,
    Stats,
    Settings,
}

pub struct App {
    pub screen: AppScreen,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    /// Effective settings for this run, command-line overrides included.
    pub config: Config,
    /// What the config file holds plus changes made on the settings screen.
    pub saved_config: Config,
    pub course: Option<Course>,
    pub store: Option<WordStore>,
    pub session: Option<QuizSession>,
    pub question: Option<Question>,
    pub timer: QuestionTimer,
    pub history: Box<dyn HistoryLog>,
    pub stats: HistoryStats,
    /// The last stats refresh could not read the history log.
    pub stats_error: bool,
    pub stats_tab: usize,
    pub confirm_reset: bool,
    pub settings_selected: usize,
    /// Shown in the menu footer until the next screen change.
    pub error: Option<String>,
    pub should_quit: bool,
    rng: SmallRng,
}

impl App {
    pub fn new(saved: Config, overrides: &ConfigOverrides) -> Self {
        let history = Box::new(CsvHistoryLog::new(saved.history_path()));
        let mut app = Self::with_history(saved, overrides, history, 0);
        app.rng = SmallRng::from_entropy();
        app
    }

    /// App over an explicit history log and a seeded rng.
    pub fn with_history(
        saved: Config,
        overrides: &ConfigOverrides,
        history: Box<dyn HistoryLog>,
        seed: u64,
    ) -> Self {
        let config = overrides.apply(&saved);
        let loaded_theme = Theme::load(&config.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %config.theme, "unknown theme, using default");
            Theme::default()
        });
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let menu = Menu::new(&config.courses, theme);

        Self {
            screen: AppScreen::Menu,
            menu,
            theme,
            config,
            saved_config: saved,
            course: None,
            store: None,
            session: None,
            question: None,
            timer: QuestionTimer::new(None),
            history,
            stats: HistoryStats::default(),
            stats_error: false,
            stats_tab: 0,
            confirm_reset: false,
            settings_selected: 0,
            error: None,
            should_quit: false,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn activate_menu_item(&mut self, now: Instant) {
        match self.menu.selected_action() {
            Some(MenuAction::StartCourse(idx)) => self.start_course(idx, now),
            Some(MenuAction::Stats) => self.go_to_stats(),
            Some(MenuAction::Settings) => self.go_to_settings(),
            Some(MenuAction::Quit) => self.should_quit = true,
            None => {}
        }
    }

    pub fn start_course(&mut self, idx: usize, now: Instant) {
        let Some(course) = self.config.courses.get(idx).cloned() else {
            return;
        };
        self.start(course, now);
    }

    pub fn start_named_course(&mut self, name: &str, now: Instant) -> Result<(), QuizError> {
        let course = self.config.course(name)?.clone();
        self.start(course, now);
        Ok(())
    }

    /// Load the course's word list and begin a session. Failures leave the
    /// app on the menu with the error shown.
    pub fn start(&mut self, course: Course, now: Instant) {
        let result = WordStore::load(&course.word_source()).and_then(|store| {
            let config = self.config.quiz_config(&course);
            let session = QuizSession::start(&store, config, Some(self.history.as_ref()), &mut self.rng)?;
            Ok((store, session))
        });

        match result {
            Ok((store, session)) => {
                tracing::info!(course = %course.name, words = store.len(), "starting course");
                self.timer = QuestionTimer::new(session.config().time_limit());
                self.course = Some(course);
                self.store = Some(store);
                self.session = Some(session);
                self.error = None;
                self.screen = AppScreen::Quiz;
                self.enter_question(now);
            }
            Err(err) => {
                tracing::error!(course = %course.name, error = %err, "cannot start course");
                self.fail(err);
            }
        }
    }

    /// Show the current question and arm its timer, or move to the result
    /// screen once the plan is exhausted.
    fn enter_question(&mut self, now: Instant) {
        let (Some(session), Some(store)) = (self.session.as_mut(), self.store.as_ref()) else {
            return;
        };
        if session.is_finished() {
            self.timer.disarm();
            self.question = None;
            self.screen = AppScreen::QuizResult;
            return;
        }
        match session.current_question(store) {
            Ok(question) => {
                self.timer.arm(question.index, now);
                self.question = Some(question);
            }
            Err(err) => {
                tracing::error!(error = %err, "cannot build question");
                self.fail(err);
            }
        }
    }

    fn fail(&mut self, err: QuizError) {
        self.error = Some(err.to_string());
        self.session = None;
        self.question = None;
        self.timer.disarm();
        self.screen = AppScreen::Menu;
    }

    /// Answer the current question with choice `choice_idx` (0-based).
    pub fn answer(&mut self, choice_idx: usize, now: Instant) {
        if self.screen != AppScreen::Quiz {
            return;
        }
        let (Some(session), Some(question)) = (self.session.as_mut(), self.question.as_ref()) else {
            return;
        };
        let Some(choice) = question.choices.get(choice_idx) else {
            return;
        };
        self.timer.disarm();
        if let Err(err) = session.submit_answer(choice, self.history.as_mut()) {
            tracing::warn!(error = %err, "answer ignored");
        }
        self.enter_question(now);
    }

    /// Advance the question timer; an expiry counts as a wrong answer.
    pub fn tick(&mut self, now: Instant) {
        if self.screen != AppScreen::Quiz {
            return;
        }
        let Some(index) = self.timer.poll(now) else {
            return;
        };
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.expire(index, self.history.as_mut()).is_some() {
            self.enter_question(now);
        }
    }

    pub fn countdown(&self, now: Instant) -> Option<Countdown> {
        let remaining = self.timer.remaining(now)?;
        let ratio = self.timer.remaining_ratio(now)?;
        Some(Countdown {
            secs_left: remaining.as_secs_f64().ceil() as u64,
            ratio,
        })
    }

    pub fn retry(&mut self, now: Instant) {
        let (Some(session), Some(store)) = (self.session.as_ref(), self.store.as_ref()) else {
            return;
        };
        match session.retry(store, Some(self.history.as_ref()), &mut self.rng) {
            Ok(session) => {
                self.session = Some(session);
                self.screen = AppScreen::Quiz;
                self.enter_question(now);
            }
            Err(err) => self.fail(err),
        }
    }

    pub fn go_to_menu(&mut self) {
        self.timer.disarm();
        self.question = None;
        self.confirm_reset = false;
        self.screen = AppScreen::Menu;
    }

    pub fn go_to_stats(&mut self) {
        self.refresh_stats();
        self.stats_tab = 0;
        self.confirm_reset = false;
        self.screen = AppScreen::Stats;
    }

    pub fn go_to_settings(&mut self) {
        self.settings_selected = 0;
        self.screen = AppScreen::Settings;
    }

    fn refresh_stats(&mut self) {
        match HistoryStats::from_log(self.history.as_ref()) {
            Ok(stats) => {
                self.stats = stats;
                self.stats_error = false;
            }
            Err(err) => {
                tracing::warn!(error = %err, "history unreadable");
                self.error = Some(err.to_string());
                self.stats = HistoryStats::default();
                self.stats_error = true;
            }
        }
    }

    pub fn next_stats_tab(&mut self) {
        self.stats_tab = (self.stats_tab + 1) % TAB_COUNT;
    }

    pub fn prev_stats_tab(&mut self) {
        self.stats_tab = if self.stats_tab == 0 {
            TAB_COUNT - 1
        } else {
            self.stats_tab - 1
        };
    }

    /// Ask for confirmation before clearing. Offered when there is history
    /// to clear or when the log could not be read at all.
    pub fn request_reset(&mut self) {
        if self.stats.total_answers > 0 || self.stats_error {
            self.confirm_reset = true;
        }
    }

    pub fn cancel_reset(&mut self) {
        self.confirm_reset = false;
    }

    pub fn reset_history(&mut self) {
        self.confirm_reset = false;
        match self.history.clear() {
            Ok(()) => tracing::info!("history cleared"),
            Err(err) => {
                tracing::error!(error = %err, "failed to clear history");
                self.error = Some(err.to_string());
            }
        }
        self.refresh_stats();
    }

    /// Persist the settings screen's changes. Command-line overrides stay
    /// out of the file.
    pub fn save_settings(&self) -> anyhow::Result<()> {
        self.saved_config.save()
    }

    pub fn settings_up(&mut self) {
        self.settings_selected = self.settings_selected.saturating_sub(1);
    }

    pub fn settings_down(&mut self) {
        self.settings_selected = (self.settings_selected + 1).min(SETTINGS_FIELDS - 1);
    }

    pub fn settings_cycle_forward(&mut self) {
        self.settings_cycle(true);
    }

    pub fn settings_cycle_backward(&mut self) {
        self.settings_cycle(false);
    }

    fn settings_cycle(&mut self, forward: bool) {
        match self.settings_selected {
            0 => {
                let count = step(&QUESTION_COUNT_OPTIONS, &self.config.question_count, forward);
                self.config.question_count = count;
                self.saved_config.question_count = count;
            }
            1 => {
                let secs = step(&TIME_LIMIT_OPTIONS, &self.config.time_limit_secs, forward);
                self.config.time_limit_secs = secs;
                self.saved_config.time_limit_secs = secs;
            }
            2 => {
                let adaptive = !self.config.adaptive;
                self.config.adaptive = adaptive;
                self.saved_config.adaptive = adaptive;
            }
            3 => {
                let themes = Theme::available_themes();
                self.config.theme = step(&themes, &self.config.theme, forward);
                self.saved_config.theme = self.config.theme.clone();
                if let Some(new_theme) = Theme::load(&self.config.theme) {
                    let theme: &'static Theme = Box::leak(Box::new(new_theme));
                    self.theme = theme;
                    self.menu.theme = theme;
                }
            }
            4 => {
                let locales: Vec<String> = SUPPORTED_LOCALES.iter().map(|l| l.to_string()).collect();
                self.config.locale = step(&locales, &self.config.locale, forward);
                self.saved_config.locale = self.config.locale.clone();
                rust_i18n::set_locale(&self.config.locale);
                let selected = self.menu.selected;
                self.menu = Menu::new(&self.config.courses, self.theme);
                self.menu.selected = selected;
            }
            _ => {}
        }
    }
}

/// The option after (or before) `current`, wrapping. Values not in the list
/// jump to the first option.
fn step<T: Clone + PartialEq>(options: &[T], current: &T, forward: bool) -> T {
    let Some(first) = options.first() else {
        return current.clone();
    };
    match options.iter().position(|o| o == current) {
        Some(idx) => {
            let next = if forward {
                (idx + 1) % options.len()
            } else if idx == 0 {
                options.len() - 1
            } else {
                idx - 1
            };
            options[next].clone()
        }
        None => first.clone(),
    }
}
