//! Closing-price line chart

use crate::series::{LookbackWindow, PriceSeries};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Widget};

/// Share of the price range added above and below the line
const Y_PADDING: f64 = 0.05;

/// Line chart of one price series.
///
/// x is the day offset from the first trading date, so gaps for weekends and
/// holidays stay visible.
#[derive(Debug, Clone)]
pub struct PriceChart {
    title: String,
    points: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    x_labels: [String; 3],
    y_labels: [String; 3],
}

impl PriceChart {
    /// Build a chart, `None` for an empty series
    pub fn new(series: &PriceSeries, window: LookbackWindow) -> Option<Self> {
        let first = series.first_date()?;
        let last = series.last_date()?;

        let points: Vec<(f64, f64)> = series
            .points()
            .iter()
            .map(|p| ((p.date - first).num_days() as f64, p.close))
            .collect();

        let span_days = (last - first).num_days() as f64;
        // a single point still needs a non-zero axis
        let x_bounds = [0.0, span_days.max(1.0)];

        let (lo, hi) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| {
                (lo.min(y), hi.max(y))
            });
        let pad = if hi > lo { (hi - lo) * Y_PADDING } else { 1.0 };
        let y_bounds = [(lo - pad).max(0.0), hi + pad];
        let y_mid = (y_bounds[0] + y_bounds[1]) / 2.0;

        let mid_date = first + chrono::Days::new((span_days / 2.0) as u64);

        Some(Self {
            title: format!(" 🗓 {} {} 股價走勢 ", series.ticker(), window.label()),
            points,
            x_bounds,
            y_bounds,
            x_labels: [
                first.format("%Y-%m-%d").to_string(),
                mid_date.format("%Y-%m-%d").to_string(),
                last.format("%Y-%m-%d").to_string(),
            ],
            y_labels: [
                format!("{:.2}", y_bounds[0]),
                format!("{y_mid:.2}"),
                format!("{:.2}", y_bounds[1]),
            ],
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn y_bounds(&self) -> [f64; 2] {
        self.y_bounds
    }

    /// The ratatui widget, borrowing the chart's data
    pub fn widget(&self) -> Chart<'_> {
        let dataset = Dataset::default()
            .name("Close")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&self.points);

        Chart::new(vec![dataset])
            .block(Block::default().borders(Borders::ALL).title(self.title.as_str()))
            .x_axis(
                Axis::default()
                    .title("Date")
                    .style(Style::default().fg(Color::Gray))
                    .bounds(self.x_bounds)
                    .labels(
                        self.x_labels
                            .iter()
                            .map(|l| Span::raw(l.as_str()))
                            .collect::<Vec<_>>(),
                    ),
            )
            .y_axis(
                Axis::default()
                    .title("TWD")
                    .style(Style::default().fg(Color::Gray))
                    .bounds(self.y_bounds)
                    .labels(
                        self.y_labels
                            .iter()
                            .map(|l| Span::raw(l.as_str()))
                            .collect::<Vec<_>>(),
                    ),
            )
    }

    /// Draw into an off-screen buffer and return its text, one line per row
    pub fn render_text(&self, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        self.widget().render(area, &mut buffer);

        let mut out = String::new();
        for y in 0..height {
            let mut line = String::new();
            let mut x = 0;
            while x < width {
                let symbol = buffer[(x, y)].symbol();
                line.push_str(symbol);
                // wide glyphs own the following cell
                x += Span::raw(symbol).width().max(1) as u16;
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::PricePoint;
    use crate::ticker::Ticker;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        PriceSeries::new(
            Ticker::normalize("2330"),
            closes
                .iter()
                .enumerate()
                .map(|(i, &c)| PricePoint::new(start + chrono::Days::new(i as u64), c)),
        )
    }

    #[test]
    fn test_empty_series_has_no_chart() {
        assert!(PriceChart::new(&series(&[]), LookbackWindow::OneYear).is_none());
    }

    #[test]
    fn test_points_and_bounds() {
        let chart = PriceChart::new(&series(&[100.0, 110.0, 90.0]), LookbackWindow::OneYear).unwrap();
        assert_eq!(chart.points(), &[(0.0, 100.0), (1.0, 110.0), (2.0, 90.0)]);

        let [lo, hi] = chart.y_bounds();
        assert!(lo < 90.0 && hi > 110.0);
        assert!(chart.title().contains("2330.TW"));
        assert!(chart.title().contains("近一年"));
    }

    #[test]
    fn test_flat_series_has_range() {
        let chart = PriceChart::new(&series(&[50.0]), LookbackWindow::SixMonths).unwrap();
        let [lo, hi] = chart.y_bounds();
        assert!(hi > lo);
    }

    #[test]
    fn test_render_text_draws_line() {
        let closes: Vec<f64> = (0..60).map(|i| 500.0 + f64::from(i % 7) * 3.5).collect();
        let chart = PriceChart::new(&series(&closes), LookbackWindow::ThreeMonths).unwrap();

        let text = chart.render_text(80, 20);
        assert_eq!(text.lines().count(), 20);
        assert!(text.contains("2025-01-02"));
        assert!(text.chars().any(|c| ('\u{2801}'..='\u{28FF}').contains(&c)));
    }
}
