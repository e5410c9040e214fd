use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};
use rust_i18n::t;

use crate::engine::history_stats::{DayCount, HistoryStats};
use crate::ui::components::activity_heatmap::ActivityHeatmap;
use crate::ui::components::chart::AccuracyChart;
use crate::ui::layout::pack_hint_lines;
use crate::ui::theme::{Theme, ThemeColors};

pub const TAB_COUNT: usize = 3;
const MISSED_LIMIT: usize = 15;
const CHART_DAYS: usize = 30;

pub struct StatsDashboard<'a> {
    pub stats: &'a HistoryStats,
    pub active_tab: usize,
    pub confirm_reset: bool,
    pub today: NaiveDate,
    pub theme: &'a Theme,
}

impl<'a> StatsDashboard<'a> {
    pub fn new(
        stats: &'a HistoryStats,
        active_tab: usize,
        confirm_reset: bool,
        today: NaiveDate,
        theme: &'a Theme,
    ) -> Self {
        Self {
            stats,
            active_tab,
            confirm_reset,
            today,
            theme,
        }
    }
}

impl Widget for StatsDashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", t!("stats.title")))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(8),
                Constraint::Length(2),
            ])
            .split(inner);

        let tabs = [
            format!("[1] {}", t!("stats.tab_overview")),
            format!("[2] {}", t!("stats.tab_activity")),
            format!("[3] {}", t!("stats.tab_missed")),
        ];
        let tab_spans: Vec<Span> = tabs
            .iter()
            .enumerate()
            .flat_map(|(i, label)| {
                let style = if i == self.active_tab {
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                } else {
                    Style::default().fg(colors.text_pending())
                };
                vec![Span::styled(format!(" {label} "), style), Span::raw("  ")]
            })
            .collect();
        Paragraph::new(Line::from(tab_spans)).render(layout[0], buf);

        if self.stats.total_answers == 0 {
            Paragraph::new(Line::from(Span::styled(
                format!("  {}", t!("stats.empty")),
                Style::default().fg(colors.text_pending()),
            )))
            .render(layout[1], buf);
        } else {
            match self.active_tab {
                0 => self.render_overview_tab(layout[1], buf),
                1 => self.render_activity_tab(layout[1], buf),
                _ => self.render_missed_tab(layout[1], buf),
            }
        }

        let back = t!("hint.back");
        let next_tab = t!("hint.next_tab");
        let switch_tab = t!("hint.switch_tab");
        let reset = t!("hint.reset_history");
        let hints: [&str; 4] = [&back, &next_tab, &switch_tab, &reset];
        let footer: Vec<Line> = pack_hint_lines(&hints, layout[2].width as usize)
            .into_iter()
            .map(|line| Line::from(Span::styled(line, Style::default().fg(colors.accent()))))
            .collect();
        Paragraph::new(footer).render(layout[2], buf);

        if self.confirm_reset {
            let dialog_width = 44u16.min(area.width);
            let dialog_height = 5u16.min(area.height);
            let dialog_x = area.x + area.width.saturating_sub(dialog_width) / 2;
            let dialog_y = area.y + area.height.saturating_sub(dialog_height) / 2;
            let dialog_area = Rect::new(dialog_x, dialog_y, dialog_width, dialog_height);

            Clear.render(dialog_area, buf);
            Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("  {}  ", t!("stats.confirm_reset")),
                    Style::default().fg(colors.fg()),
                )),
            ])
            .style(Style::default().bg(colors.bg()))
            .block(
                Block::bordered()
                    .title(format!(" {} ", t!("stats.confirm_title")))
                    .border_style(Style::default().fg(colors.error()))
                    .style(Style::default().bg(colors.bg())),
            )
            .render(dialog_area, buf);
        }
    }
}

impl StatsDashboard<'_> {
    fn render_overview_tab(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(6)])
            .split(area);

        let summary_block = Block::bordered()
            .title(Line::from(Span::styled(
                format!(" {} ", t!("stats.summary")),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )))
            .border_style(Style::default().fg(colors.accent()));
        let summary_inner = summary_block.inner(layout[0]);
        summary_block.render(layout[0], buf);

        let accuracy = self.stats.accuracy();
        let (current_streak, best_streak) = compute_streaks(&self.stats.per_day, self.today);
        let summary = vec![
            Line::from(vec![
                Span::styled(format!("  {}: ", t!("stats.answers")), Style::default().fg(colors.fg())),
                Span::styled(
                    self.stats.total_answers.to_string(),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("    {}: ", t!("stats.correct")), Style::default().fg(colors.fg())),
                Span::styled(
                    self.stats.total_correct.to_string(),
                    Style::default().fg(colors.success()),
                ),
                Span::styled(format!("    {}: ", t!("stats.accuracy")), Style::default().fg(colors.fg())),
                Span::styled(
                    format!("{accuracy:.1}%"),
                    Style::default()
                        .fg(accuracy_color(accuracy, colors))
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled(format!("  {}: ", t!("stats.days")), Style::default().fg(colors.fg())),
                Span::styled(
                    self.stats.days_practiced().to_string(),
                    Style::default().fg(colors.text_pending()),
                ),
                Span::styled(format!("    {}: ", t!("stats.streak")), Style::default().fg(colors.fg())),
                Span::styled(
                    format!("{current_streak}d"),
                    Style::default().fg(colors.success()),
                ),
                Span::styled(format!("    {}: ", t!("stats.best_streak")), Style::default().fg(colors.fg())),
                Span::styled(format!("{best_streak}d"), Style::default().fg(colors.accent())),
            ]),
        ];
        Paragraph::new(summary).render(summary_inner, buf);

        AccuracyChart::new(&self.stats.per_day, CHART_DAYS, self.theme).render(layout[1], buf);
    }

    fn render_activity_tab(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(4)])
            .split(area);
        ActivityHeatmap::new(&self.stats.per_day, self.today, self.theme).render(layout[0], buf);

        let mut top_days: Vec<(&NaiveDate, &DayCount)> = self.stats.per_day.iter().collect();
        top_days.sort_by(|a, b| b.1.answers.cmp(&a.1.answers).then_with(|| b.0.cmp(a.0)));
        let parts: Vec<String> = top_days
            .iter()
            .take(3)
            .map(|(day, count)| format!("{} ({})", day.format("%Y-%m-%d"), count.answers))
            .collect();

        let block = Block::bordered().border_style(Style::default().fg(colors.border()));
        let inner = block.inner(layout[1]);
        block.render(layout[1], buf);
        Paragraph::new(Line::from(Span::styled(
            format!("  {}: {}", t!("stats.top_days"), parts.join("  |  ")),
            Style::default().fg(colors.text_pending()),
        )))
        .render(inner, buf);
    }

    fn render_missed_tab(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(Line::from(Span::styled(
                format!(" {} ", t!("stats.missed_title")),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )))
            .border_style(Style::default().fg(colors.accent()));
        let inner = block.inner(area);
        block.render(area, buf);

        let missed = self.stats.words.most_missed(MISSED_LIMIT);
        if missed.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                format!("  {}", t!("stats.no_missed")),
                Style::default().fg(colors.success()),
            )))
            .render(inner, buf);
            return;
        }

        let header = Line::from(Span::styled(
            format!(
                "  {:<24}{:>8}{:>10}",
                t!("stats.col_word"),
                t!("stats.col_wrong"),
                t!("stats.col_correct")
            ),
            Style::default()
                .fg(colors.text_pending())
                .add_modifier(Modifier::BOLD),
        ));
        let mut lines = vec![header];
        lines.extend(missed.iter().map(|(word, stat)| {
            Line::from(vec![
                Span::styled(format!("  {word:<24}"), Style::default().fg(colors.fg())),
                Span::styled(format!("{:>8}", stat.wrong_count), Style::default().fg(colors.error())),
                Span::styled(
                    format!("{:>10}", stat.correct_count),
                    Style::default().fg(colors.success()),
                ),
            ])
        }));
        Paragraph::new(lines).render(inner, buf);
    }
}

fn accuracy_color(accuracy: f64, colors: &ThemeColors) -> Color {
    if accuracy >= 90.0 {
        colors.success()
    } else if accuracy >= 70.0 {
        colors.warning()
    } else {
        colors.error()
    }
}

/// `(current, best)` runs of consecutive practice days. The current run
/// counts back from `today`.
fn compute_streaks(per_day: &BTreeMap<NaiveDate, DayCount>, today: NaiveDate) -> (usize, usize) {
    let mut best = 0usize;
    let mut run = 0usize;
    let mut prev: Option<NaiveDate> = None;
    for &day in per_day.keys() {
        run = match prev {
            Some(p) if day - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(day);
    }

    let mut current = 0usize;
    let mut cursor = today;
    while per_day.contains_key(&cursor) {
        current += 1;
        cursor -= Duration::days(1);
    }

    (current, best)
}
