use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::session::quiz::{LastResult, Outcome, Question};
use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::theme::{Theme, ThemeColors};

/// Seconds left and the remaining share of the limit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Countdown {
    pub secs_left: u64,
    pub ratio: f64,
}

pub struct QuizView<'a> {
    pub question: &'a Question,
    pub last_result: Option<&'a LastResult>,
    pub countdown: Option<Countdown>,
    pub theme: &'a Theme,
}

impl<'a> QuizView<'a> {
    pub fn new(question: &'a Question, theme: &'a Theme) -> Self {
        Self {
            question,
            last_result: None,
            countdown: None,
            theme,
        }
    }

    pub fn last_result(mut self, last_result: Option<&'a LastResult>) -> Self {
        self.last_result = last_result;
        self
    }

    pub fn countdown(mut self, countdown: Option<Countdown>) -> Self {
        self.countdown = countdown;
        self
    }
}

impl Widget for QuizView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(if self.countdown.is_some() { 3 } else { 0 }),
                Constraint::Length(3),
                Constraint::Length(2 * self.question.choices.len() as u16),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(inner);

        let answered = self.question.index as f64 / self.question.total.max(1) as f64;
        ProgressBar::new(&t!("quiz.progress"), answered, self.theme)
            .caption(format!("{} / {}", self.question.index + 1, self.question.total))
            .render(layout[0], buf);

        if let Some(countdown) = self.countdown {
            ProgressBar::new(&t!("quiz.time_left"), countdown.ratio, self.theme)
                .caption(format!("{}s", countdown.secs_left))
                .fill(countdown_color(countdown.ratio, colors))
                .render(layout[1], buf);
        }

        Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                self.question.word.as_str(),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
        ])
        .alignment(Alignment::Center)
        .render(layout[2], buf);

        let choice_lines: Vec<Line> = self
            .question
            .choices
            .iter()
            .enumerate()
            .flat_map(|(i, choice)| {
                vec![
                    Line::from(vec![
                        Span::styled(
                            format!("  [{}] ", i + 1),
                            Style::default()
                                .fg(colors.accent())
                                .add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(choice.as_str(), Style::default().fg(colors.fg())),
                    ]),
                    Line::from(""),
                ]
            })
            .collect();
        Paragraph::new(choice_lines)
            .wrap(Wrap { trim: false })
            .render(layout[3], buf);

        if let Some(result) = self.last_result {
            Paragraph::new(Line::from(Span::styled(
                result.message.as_str(),
                Style::default()
                    .fg(outcome_color(result.outcome, colors))
                    .add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center)
            .render(layout[4], buf);
        }
    }
}

pub fn outcome_color(outcome: Outcome, colors: &ThemeColors) -> Color {
    match outcome {
        Outcome::Correct => colors.success(),
        Outcome::Incorrect => colors.error(),
        Outcome::TimedOut => colors.warning(),
    }
}

fn countdown_color(ratio: f64, colors: &ThemeColors) -> Color {
    if ratio > 0.5 {
        colors.bar_filled()
    } else if ratio > 0.2 {
        colors.warning()
    } else {
        colors.error()
    }
}
