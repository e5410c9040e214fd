use std::collections::BTreeMap;

use chrono::NaiveDate;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::widgets::{Axis, Block, Chart, Dataset, GraphType, Widget};
use rust_i18n::t;

use crate::engine::history_stats::DayCount;
use crate::ui::theme::Theme;

/// Daily accuracy over the most recent practice days.
pub struct AccuracyChart<'a> {
    pub data: Vec<(f64, f64)>,
    pub theme: &'a Theme,
}

impl<'a> AccuracyChart<'a> {
    pub fn new(per_day: &BTreeMap<NaiveDate, DayCount>, max_days: usize, theme: &'a Theme) -> Self {
        Self {
            data: accuracy_points(per_day, max_days),
            theme,
        }
    }
}

/// `(n, percent)` for the last `max_days` days that have answers, oldest first.
pub fn accuracy_points(per_day: &BTreeMap<NaiveDate, DayCount>, max_days: usize) -> Vec<(f64, f64)> {
    let skip = per_day.len().saturating_sub(max_days);
    per_day
        .values()
        .skip(skip)
        .filter(|day| day.answers > 0)
        .enumerate()
        .map(|(i, day)| {
            (
                (i + 1) as f64,
                day.correct as f64 / day.answers as f64 * 100.0,
            )
        })
        .collect()
}

impl Widget for AccuracyChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(format!(" {} ", t!("stats.accuracy_chart_title")))
            .border_style(Style::default().fg(colors.border()));

        if self.data.is_empty() {
            block.render(area, buf);
            return;
        }

        let max_x = self.data.last().map(|(x, _)| *x).unwrap_or(1.0).max(2.0);

        let dataset = Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(colors.accent()))
            .data(&self.data);

        Chart::new(vec![dataset])
            .block(block)
            .x_axis(
                Axis::default()
                    .title(t!("stats.axis_day").to_string())
                    .style(Style::default().fg(colors.text_pending()))
                    .bounds([1.0, max_x]),
            )
            .y_axis(
                Axis::default()
                    .title("%")
                    .style(Style::default().fg(colors.text_pending()))
                    .bounds([0.0, 100.0])
                    .labels(["0", "50", "100"]),
            )
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn points_keep_only_the_latest_days() {
        let mut per_day = BTreeMap::new();
        per_day.insert(day(1), DayCount { answers: 4, correct: 1 });
        per_day.insert(day(2), DayCount { answers: 10, correct: 5 });
        per_day.insert(day(3), DayCount { answers: 2, correct: 2 });

        let points = accuracy_points(&per_day, 2);
        assert_eq!(points, vec![(1.0, 50.0), (2.0, 100.0)]);
    }

    #[test]
    fn empty_history_has_no_points() {
        assert!(accuracy_points(&BTreeMap::new(), 30).is_empty());
    }
}
