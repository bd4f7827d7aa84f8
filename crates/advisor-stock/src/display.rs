//! Output surfaces for an analysis run

use crate::advisor::MarketSnapshot;
use crate::chart::PriceChart;
use crate::report::AdvisoryReport;
use crate::stats::SummaryStats;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use std::fmt::Display;
use std::io::{self, Write};

/// Receives the visible results of one analysis, stage by stage.
///
/// Implementations decide how each piece is shown; the pipeline decides
/// which pieces are shown and in what order.
pub trait Presenter {
    /// A long-running step is about to start
    fn progress(&mut self, _message: &str) {}

    /// Recoverable condition, e.g. no data for the ticker
    fn warning(&mut self, message: &str);

    /// The action failed
    fn error(&mut self, message: &str);

    /// Summary statistics of the fetched history
    fn metrics(&mut self, snapshot: &MarketSnapshot);

    /// Price chart of the fetched history
    fn chart(&mut self, chart: &PriceChart);

    /// The model's report
    fn report(&mut self, report: &AdvisoryReport);
}

/// Metrics as a one-row table
pub fn metrics_table(stats: &SummaryStats) -> Table {
    let metrics = stats.metrics();
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(metrics.iter().map(|m| m.label).collect::<Vec<_>>())
        .add_row(metrics.iter().map(|m| m.value.as_str()).collect::<Vec<_>>());
    table
}

/// Plain-text presenter for one-shot command-line output
pub struct TextPresenter<W: Write> {
    out: W,
    chart_size: Option<(u16, u16)>,
    show_report: bool,
    failed: Option<io::Error>,
}

impl<W: Write> TextPresenter<W> {
    /// Write to `out` with an 80x20 chart
    pub fn new(out: W) -> Self {
        Self {
            out,
            chart_size: Some((80, 20)),
            show_report: true,
            failed: None,
        }
    }

    /// Change the chart size, or hide it with `None`
    pub fn with_chart_size(mut self, size: Option<(u16, u16)>) -> Self {
        self.chart_size = size;
        self
    }

    /// Show or hide the report text
    pub fn with_report(mut self, show: bool) -> Self {
        self.show_report = show;
        self
    }

    /// Return the writer, or the first write error
    pub fn finish(self) -> io::Result<W> {
        match self.failed {
            Some(err) => Err(err),
            None => Ok(self.out),
        }
    }

    fn emit(&mut self, text: impl Display) {
        if self.failed.is_none() {
            if let Err(err) = writeln!(self.out, "{text}") {
                self.failed = Some(err);
            }
        }
    }
}

impl<W: Write> Presenter for TextPresenter<W> {
    fn progress(&mut self, message: &str) {
        self.emit(format_args!("⏳ {message}"));
    }

    fn warning(&mut self, message: &str) {
        self.emit(message);
    }

    fn error(&mut self, message: &str) {
        self.emit(message);
    }

    fn metrics(&mut self, snapshot: &MarketSnapshot) {
        self.emit(format_args!(
            "\n🗓 {} 股價走勢與統計 ({})",
            snapshot.lookback.label(),
            snapshot.ticker
        ));
        self.emit(metrics_table(&snapshot.stats));
    }

    fn chart(&mut self, chart: &PriceChart) {
        if let Some((width, height)) = self.chart_size {
            self.emit(chart.render_text(width, height));
        }
    }

    fn report(&mut self, report: &AdvisoryReport) {
        if self.show_report {
            self.emit(format_args!("\n{}\n", report.title()));
            self.emit(&report.text);
        }
    }
}
