use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use rust_i18n::t;

use crate::engine::selector::SelectionMode;
use crate::session::quiz::LastResult;
use crate::ui::components::quiz_view::outcome_color;
use crate::ui::layout::pack_hint_lines;
use crate::ui::theme::Theme;

/// Summary shown once a session is finished.
pub struct ResultDashboard<'a> {
    pub course: &'a str,
    pub score: usize,
    pub total: usize,
    pub mode: SelectionMode,
    pub last_result: Option<&'a LastResult>,
    pub theme: &'a Theme,
}

impl<'a> ResultDashboard<'a> {
    pub fn new(
        course: &'a str,
        (score, total): (usize, usize),
        mode: SelectionMode,
        last_result: Option<&'a LastResult>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            course,
            score,
            total,
            mode,
            last_result,
            theme,
        }
    }

    fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.score as f64 / self.total as f64 * 100.0
    }
}

impl Widget for ResultDashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", t!("result.title")))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(2),
            ])
            .split(inner);

        Paragraph::new(Line::from(Span::styled(
            self.course,
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        let percent = self.percent();
        let score_color = if percent >= 80.0 {
            colors.success()
        } else if percent >= 50.0 {
            colors.warning()
        } else {
            colors.error()
        };
        Paragraph::new(Line::from(vec![
            Span::styled(format!("  {}: ", t!("result.score")), Style::default().fg(colors.fg())),
            Span::styled(
                format!("{} / {}", self.score, self.total),
                Style::default().fg(score_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({percent:.0}%)"),
                Style::default().fg(colors.text_pending()),
            ),
        ]))
        .render(layout[1], buf);

        let mode = match self.mode {
            SelectionMode::Uniform => t!("result.mode_uniform"),
            SelectionMode::Adaptive => t!("result.mode_adaptive"),
        };
        Paragraph::new(Line::from(vec![
            Span::styled(format!("  {}: ", t!("result.mode")), Style::default().fg(colors.fg())),
            Span::styled(mode.to_string(), Style::default().fg(colors.text_pending())),
        ]))
        .render(layout[2], buf);

        if let Some(result) = self.last_result {
            Paragraph::new(Line::from(vec![
                Span::styled(format!("  {}: ", t!("result.last_answer")), Style::default().fg(colors.fg())),
                Span::styled(
                    result.message.as_str(),
                    Style::default().fg(outcome_color(result.outcome, colors)),
                ),
            ]))
            .render(layout[3], buf);
        }

        let message = if self.total > 0 && self.score == self.total {
            t!("result.perfect")
        } else {
            t!("result.keep_going")
        };
        Paragraph::new(Line::from(Span::styled(
            format!("  {message}"),
            Style::default().fg(colors.fg()),
        )))
        .render(layout[4], buf);

        let retry = t!("hint.retry");
        let menu = t!("hint.menu");
        let stats = t!("hint.stats");
        let hints: [&str; 3] = [&retry, &menu, &stats];
        let help: Vec<Line> = pack_hint_lines(&hints, layout[6].width as usize)
            .into_iter()
            .map(|line| Line::from(Span::styled(line, Style::default().fg(colors.accent()))))
            .collect();
        Paragraph::new(help).render(layout[6], buf);
    }
}
