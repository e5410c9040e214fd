use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Widget};
use rust_i18n::t;

use crate::engine::history_stats::DayCount;
use crate::ui::theme::{Theme, ThemeColors};

const MAX_WEEKS: usize = 26;

/// Answers per day laid out as week columns, Monday at the top.
pub struct ActivityHeatmap<'a> {
    per_day: &'a BTreeMap<NaiveDate, DayCount>,
    today: NaiveDate,
    theme: &'a Theme,
}

impl<'a> ActivityHeatmap<'a> {
    pub fn new(
        per_day: &'a BTreeMap<NaiveDate, DayCount>,
        today: NaiveDate,
        theme: &'a Theme,
    ) -> Self {
        Self {
            per_day,
            today,
            theme,
        }
    }
}

impl Widget for ActivityHeatmap<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", t!("stats.activity_title")))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 8 || inner.width < 12 {
            return;
        }

        let weeks = ((inner.width as usize).saturating_sub(2) / 2).min(MAX_WEEKS);
        let mut column_start = first_column(self.today, weeks);

        for (row, label) in ["M", " ", "W", " ", "F", " ", "S"].iter().enumerate() {
            buf.set_string(
                inner.x,
                inner.y + 1 + row as u16,
                label,
                Style::default().fg(colors.text_pending()),
            );
        }

        let right = inner.x + inner.width;
        let mut x = inner.x + 2;
        let mut last_month = None;
        while column_start <= self.today && x + 1 < right {
            if last_month != Some(column_start.month()) {
                let month = column_start.format("%b").to_string();
                if x + 3 <= right {
                    buf.set_string(x, inner.y, &month, Style::default().fg(colors.text_pending()));
                }
                last_month = Some(column_start.month());
            }

            for offset in 0..7u16 {
                let date = column_start + Duration::days(i64::from(offset));
                if date > self.today {
                    break;
                }
                let answers = self.per_day.get(&date).map_or(0, |d| d.answers);
                let (ch, color) = intensity_cell(answers, colors);
                buf.set_string(x, inner.y + 1 + offset, ch.to_string(), Style::default().fg(color));
            }

            column_start += Duration::weeks(1);
            x += 2;
        }
    }
}

/// Monday of the week `weeks` before the one containing `today`.
fn first_column(today: NaiveDate, weeks: usize) -> NaiveDate {
    let start = today - Duration::weeks(weeks as i64);
    start - Duration::days(i64::from(start.weekday().num_days_from_monday()))
}

fn scale_color(base: Color, factor: f64) -> Color {
    match base {
        Color::Rgb(r, g, b) => Color::Rgb(
            (r as f64 * factor).min(255.0) as u8,
            (g as f64 * factor).min(255.0) as u8,
            (b as f64 * factor).min(255.0) as u8,
        ),
        other => other,
    }
}

fn intensity_cell(answers: usize, colors: &ThemeColors) -> (char, Color) {
    let success = colors.success();
    match answers {
        0 => ('·', colors.accent_dim()),
        1..=9 => ('▪', scale_color(success, 0.4)),
        10..=29 => ('▪', scale_color(success, 0.65)),
        30..=59 => ('█', scale_color(success, 0.85)),
        _ => ('█', success),
    }
}
