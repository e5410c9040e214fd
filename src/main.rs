use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use rust_i18n::t;

use wordquiz::app::{App, AppScreen};
use wordquiz::config::{self, Config, ConfigOverrides, Course};
use wordquiz::event::{AppEvent, EventHandler, TICK_RATE};
use wordquiz::logging;
use wordquiz::session::quiz::SessionPhase;
use wordquiz::ui;
use wordquiz::ui::components::dashboard::ResultDashboard;
use wordquiz::ui::components::quiz_view::QuizView;
use wordquiz::ui::components::stats_dashboard::StatsDashboard;
use wordquiz::ui::layout::{AppLayout, pack_hint_lines};

rust_i18n::i18n!("locales", fallback = "en");

#[derive(Parser)]
#[command(name = "wordquiz", version, about = "Terminal vocabulary quiz with adaptive review")]
struct Cli {
    #[arg(short = 'n', long, help = "Number of questions per session")]
    questions: Option<usize>,

    #[arg(short, long, help = "Seconds allowed per question (0 for no limit)")]
    time_limit: Option<u64>,

    #[arg(short, long, help = "Weight question selection toward words you miss")]
    adaptive: bool,

    #[arg(short, long, help = "Start this course immediately")]
    course: Option<String>,

    #[arg(short, long, help = "Start immediately with a CSV, TSV or JSON word list")]
    words: Option<PathBuf>,

    #[arg(long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Interface language (en, ja)")]
    locale: Option<String>,

    #[arg(short, long, help = "Log at debug level")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = config::data_dir();
    if let Err(err) = logging::init(&data_dir, cli.verbose) {
        eprintln!("warning: logging disabled: {err:#}");
    }

    let saved = Config::load().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "config unreadable, using defaults");
        Config::default()
    });
    let overrides = ConfigOverrides {
        question_count: cli.questions,
        time_limit_secs: cli.time_limit,
        adaptive: cli.adaptive,
        theme: cli.theme,
        locale: cli.locale,
    };

    let mut app = App::new(saved, &overrides);
    rust_i18n::set_locale(&app.config.locale);

    let now = Instant::now();
    if let Some(path) = cli.words {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let course = Course {
            name,
            source: path.display().to_string(),
            adaptive: app.config.adaptive,
        };
        app.start(course, now);
    } else if let Some(name) = cli.course {
        app.start_named_course(&name, now)?;
    }
    if let Some(err) = app.error.take() {
        anyhow::bail!(err);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(TICK_RATE);

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "event loop failed");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.tick(Instant::now()),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Quiz => handle_quiz_key(app, key),
        AppScreen::QuizResult => handle_result_key(app, key),
        AppScreen::Stats => handle_stats_key(app, key),
        AppScreen::Settings => handle_settings_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char(ch @ '1'..='9') => {
            let idx = ch as usize - '1' as usize;
            app.start_course(idx, Instant::now());
        }
        KeyCode::Char('s') => app.go_to_stats(),
        KeyCode::Char('c') => app.go_to_settings(),
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => app.activate_menu_item(Instant::now()),
        _ => {}
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(ch @ '1'..='4') => {
            let idx = ch as usize - '1' as usize;
            app.answer(idx, Instant::now());
        }
        KeyCode::Esc => app.go_to_menu(),
        _ => {}
    }
}

fn handle_result_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') | KeyCode::Enter => app.retry(Instant::now()),
        KeyCode::Char('q') | KeyCode::Char('m') | KeyCode::Esc => app.go_to_menu(),
        KeyCode::Char('s') => app.go_to_stats(),
        _ => {}
    }
}

fn handle_stats_key(app: &mut App, key: KeyEvent) {
    // Confirmation dialog takes priority
    if app.confirm_reset {
        match key.code {
            KeyCode::Char('y') => app.reset_history(),
            KeyCode::Char('n') | KeyCode::Esc => app.cancel_reset(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Char('1') => app.stats_tab = 0,
        KeyCode::Char('2') => app.stats_tab = 1,
        KeyCode::Char('3') => app.stats_tab = 2,
        KeyCode::Tab => app.next_stats_tab(),
        KeyCode::BackTab => app.prev_stats_tab(),
        KeyCode::Char('x') | KeyCode::Delete => app.request_reset(),
        _ => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            if let Err(err) = app.save_settings() {
                tracing::warn!(error = %err, "failed to save config");
            }
            app.go_to_menu();
        }
        KeyCode::Up | KeyCode::Char('k') => app.settings_up(),
        KeyCode::Down | KeyCode::Char('j') => app.settings_down(),
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.settings_cycle_forward(),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle_backward(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Quiz => render_quiz(frame, app),
        AppScreen::QuizResult => render_result(frame, app),
        AppScreen::Stats => render_stats(frame, app),
        AppScreen::Settings => render_settings(frame, app),
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect, info: &str) {
    let colors = &app.theme.colors;
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " wordquiz ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info.to_string(),
            Style::default()
                .fg(colors.text_pending())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect, hints: &[&str]) {
    let lines: Vec<Line> = pack_hint_lines(hints, area.width as usize)
        .into_iter()
        .map(|line| {
            Line::from(Span::styled(
                line,
                Style::default().fg(app.theme.colors.text_pending()),
            ))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(area);

    let info = t!("menu.header", questions = app.config.question_count, seconds = app.config.time_limit_secs);
    render_header(frame, app, layout[0], &info);

    let menu_area = ui::layout::centered_rect(50, 90, layout[1]);
    frame.render_widget(&app.menu, menu_area);

    if let Some(ref err) = app.error {
        let footer = Paragraph::new(Line::from(Span::styled(
            format!(" {err}"),
            Style::default().fg(colors.error()).add_modifier(Modifier::BOLD),
        )));
        frame.render_widget(footer, layout[2]);
    } else {
        let start = t!("hint.start_course");
        let stats = t!("hint.stats");
        let settings = t!("hint.settings");
        let quit = t!("hint.quit");
        render_footer(frame, app, layout[2], &[&*start, &*stats, &*settings, &*quit]);
    }
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let Some(ref question) = app.question else {
        return;
    };
    let app_layout = AppLayout::new(area);

    let course = app.course.as_ref().map(|c| c.name.as_str()).unwrap_or("");
    let score = match app.session.as_ref().map(|s| s.phase()) {
        Some(SessionPhase::Active { score, .. }) | Some(SessionPhase::Finished { score, .. }) => score,
        None => 0,
    };
    let info = format!("| {course} | {}: {score}", t!("result.score"));
    render_header(frame, app, app_layout.header, &info);

    let view = QuizView::new(question, app.theme)
        .last_result(app.session.as_ref().and_then(|s| s.last_result()))
        .countdown(app.countdown(Instant::now()));
    let main = ui::layout::centered_rect(70, 100, app_layout.main);
    frame.render_widget(view, main);

    let answer = t!("hint.answer");
    let menu = t!("hint.menu");
    render_footer(frame, app, app_layout.footer, &[&*answer, &*menu]);
}

fn render_result(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    if let Some(ref session) = app.session {
        let course = app.course.as_ref().map(|c| c.name.as_str()).unwrap_or("");
        let centered = ui::layout::centered_rect(60, 70, area);
        let dashboard = ResultDashboard::new(
            course,
            session.score(),
            session.selection_mode(),
            session.last_result(),
            app.theme,
        );
        frame.render_widget(dashboard, centered);
    }
}

fn render_stats(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let dashboard = StatsDashboard::new(
        &app.stats,
        app.stats_tab,
        app.confirm_reset,
        chrono::Utc::now().date_naive(),
        app.theme,
    );
    frame.render_widget(dashboard, area);
}

fn render_settings(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let centered = ui::layout::centered_rect(60, 80, area);

    let block = Block::bordered()
        .title(format!(" {} ", t!("settings.title")))
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let time_limit = if app.config.time_limit_secs == 0 {
        t!("settings.off").to_string()
    } else {
        format!("{}s", app.config.time_limit_secs)
    };
    let adaptive = if app.config.adaptive {
        t!("settings.on")
    } else {
        t!("settings.off")
    };
    let fields: Vec<(String, String)> = vec![
        (t!("settings.question_count").to_string(), app.config.question_count.to_string()),
        (t!("settings.time_limit").to_string(), time_limit),
        (t!("settings.adaptive").to_string(), adaptive.to_string()),
        (t!("settings.theme").to_string(), app.config.theme.clone()),
        (t!("settings.language").to_string(), app.config.locale.clone()),
    ];

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(fields.len() as u16 * 3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(inner);

    let header = Paragraph::new(Line::from(Span::styled(
        format!("  {}", t!("settings.help")),
        Style::default().fg(colors.text_pending()),
    )));
    header.render(layout[0], frame.buffer_mut());

    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(fields.iter().map(|_| Constraint::Length(3)).collect::<Vec<_>>())
        .split(layout[1]);

    for (i, (label, value)) in fields.iter().enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };

        let label_style = Style::default()
            .fg(if is_selected { colors.accent() } else { colors.fg() })
            .add_modifier(if is_selected { Modifier::BOLD } else { Modifier::empty() });
        let value_style = Style::default().fg(if is_selected {
            colors.border_focused()
        } else {
            colors.text_pending()
        });

        let lines = vec![
            Line::from(Span::styled(format!("{indicator}{label}:"), label_style)),
            Line::from(Span::styled(format!("  < {value} >"), value_style)),
        ];
        Paragraph::new(lines).render(field_layout[i], frame.buffer_mut());
    }

    let footer = Paragraph::new(Line::from(Span::styled(
        format!("  {}", t!("hint.save_back")),
        Style::default().fg(colors.accent()),
    )));
    footer.render(layout[3], frame.buffer_mut());
}
