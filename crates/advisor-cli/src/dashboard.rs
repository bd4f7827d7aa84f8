//! Full-screen terminal dashboard

use advisor_stock::stats::SummaryStats;
use advisor_stock::ticker::is_blank;
use advisor_stock::{
    Advisor, AdvisoryReport, MarketDataSource, MarketSnapshot, Presenter, PriceChart, run_analysis,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use std::time::Duration;
use tracing::warn;

const TITLE: &str = "📊 台股 AI 投資顧問";
const CAPTION: &str = "輸入台股代號 (例如：2330.TW, 0050.TW) 進行深度分析。";
const FOOTER: &str = "Enter 開始分析 · ↑/↓ PgUp/PgDn 捲動報告 · Esc 離開 · 由 Gemini API 提供支援";

/// Line under the input box
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Busy(String),
    Warning(String),
    Error(String),
}

/// What a key press asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Analyze(String),
}

/// Dashboard state; results are replaced wholesale on every analysis
pub struct App {
    input: String,
    status: Status,
    snapshot: Option<MarketSnapshot>,
    chart: Option<PriceChart>,
    report: Option<AdvisoryReport>,
    scroll: u16,
}

impl App {
    pub fn new(default_ticker: impl Into<String>) -> Self {
        Self {
            input: default_ticker.into(),
            status: Status::Idle,
            snapshot: None,
            chart: None,
            report: None,
            scroll: 0,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Map a key press to an action, editing the input as a side effect
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        match key.code {
            KeyCode::Esc => Action::Quit,
            KeyCode::Enter if is_blank(&self.input) => Action::None,
            KeyCode::Enter => Action::Analyze(self.input.clone()),
            KeyCode::Backspace => {
                self.input.pop();
                Action::None
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                Action::None
            }
            KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                Action::None
            }
            KeyCode::Down => {
                self.scroll = self.scroll.saturating_add(1);
                Action::None
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                Action::None
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                Action::None
            }
            _ => Action::None,
        }
    }

    /// Drop the previous run's results
    fn reset(&mut self) {
        self.status = Status::Idle;
        self.snapshot = None;
        self.chart = None;
        self.report = None;
        self.scroll = 0;
    }
}

/// Presenter that updates the app and redraws after every stage
struct DashboardPresenter<'a, B: Backend> {
    terminal: &'a mut Terminal<B>,
    app: &'a mut App,
}

impl<B: Backend> DashboardPresenter<'_, B> {
    fn redraw(&mut self) {
        let app = &*self.app;
        if let Err(e) = self.terminal.draw(|f| ui(f, app)) {
            warn!("Failed to redraw dashboard: {e}");
        }
    }
}

impl<B: Backend> Presenter for DashboardPresenter<'_, B> {
    fn progress(&mut self, message: &str) {
        self.app.status = Status::Busy(message.to_string());
        self.redraw();
    }

    fn warning(&mut self, message: &str) {
        self.app.status = Status::Warning(message.to_string());
        self.redraw();
    }

    fn error(&mut self, message: &str) {
        self.app.status = Status::Error(message.to_string());
        self.redraw();
    }

    fn metrics(&mut self, snapshot: &MarketSnapshot) {
        self.app.snapshot = Some(snapshot.clone());
        self.redraw();
    }

    fn chart(&mut self, chart: &PriceChart) {
        self.app.chart = Some(chart.clone());
        self.redraw();
    }

    fn report(&mut self, report: &AdvisoryReport) {
        self.app.report = Some(report.clone());
        self.app.status = Status::Idle;
        self.redraw();
    }
}

/// Event loop; returns when the user quits
pub async fn run<B: Backend, S: MarketDataSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    advisor: &Advisor<S>,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.handle_key(key) {
            Action::Quit => return Ok(()),
            Action::Analyze(raw) => {
                app.reset();
                let mut presenter = DashboardPresenter {
                    terminal: &mut *terminal,
                    app: &mut *app,
                };
                // outcome is already on screen
                let _ = run_analysis(advisor, &mut presenter, &raw).await;
            }
            Action::None => {}
        }
    }
}

/// Draw the whole dashboard
pub fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Percentage(40),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0]);
    draw_input(frame, chunks[1], app);
    draw_status(frame, chunks[2], app);
    draw_metrics(frame, chunks[3], app.snapshot.as_ref().map(|s| &s.stats));
    draw_chart(frame, chunks[4], app.chart.as_ref());
    draw_report(frame, chunks[5], app);

    let footer = Paragraph::new(FOOTER).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[6]);
}

fn draw_header(frame: &mut Frame, area: Rect) {
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            TITLE,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(CAPTION, Style::default().fg(Color::Gray))),
    ]);
    frame.render_widget(header, area);
}

fn draw_input(frame: &mut Frame, area: Rect, app: &App) {
    let input = Paragraph::new(app.input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" 請輸入股票或 ETF 代號 · Enter 📈 開始分析 "),
    );
    frame.render_widget(input, area);

    let width = Span::raw(app.input.as_str()).width() as u16;
    frame.set_cursor_position((
        (area.x + 1 + width).min(area.right().saturating_sub(2)),
        area.y + 1,
    ));
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let (text, style) = match &app.status {
        Status::Idle => (String::new(), Style::default()),
        Status::Busy(m) => (format!("⏳ {m}"), Style::default().fg(Color::Cyan)),
        Status::Warning(m) => (m.clone(), Style::default().fg(Color::Yellow)),
        Status::Error(m) => (m.clone(), Style::default().fg(Color::Red)),
    };
    frame.render_widget(Paragraph::new(text).style(style), area);
}

fn draw_metrics(frame: &mut Frame, area: Rect, stats: Option<&SummaryStats>) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);

    let Some(stats) = stats else {
        for column in columns.iter() {
            frame.render_widget(Block::default().borders(Borders::ALL), *column);
        }
        return;
    };

    for (metric, column) in stats.metrics().iter().zip(columns.iter()) {
        let widget = Paragraph::new(metric.value.as_str())
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL).title(metric.label));
        frame.render_widget(widget, *column);
    }
}

fn draw_chart(frame: &mut Frame, area: Rect, chart: Option<&PriceChart>) {
    match chart {
        Some(chart) => frame.render_widget(chart.widget(), area),
        None => {
            let empty = Paragraph::new("  尚無股價資料")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title(" 股價走勢 "));
            frame.render_widget(empty, area);
        }
    }
}

fn draw_report(frame: &mut Frame, area: Rect, app: &App) {
    let (title, text) = match &app.report {
        Some(report) => (format!(" {} ", report.title()), report.text.as_str()),
        None => (" AI 深度分析 ".to_string(), ""),
    };

    let report = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0))
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(report, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_stock::{LookbackWindow, PricePoint, PriceSeries, Ticker};
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;

    fn press(app: &mut App, code: KeyCode) -> Action {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_default_input() {
        let app = App::new("0050.TW");
        assert_eq!(app.input(), "0050.TW");
        assert_eq!(app.status(), &Status::Idle);
    }

    #[test]
    fn test_editing_and_submit() {
        let mut app = App::new("0050.TW");
        for _ in 0..7 {
            press(&mut app, KeyCode::Backspace);
        }
        for c in "2330".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(press(&mut app, KeyCode::Enter), Action::Analyze("2330".to_string()));
    }

    #[test]
    fn test_blank_input_does_nothing() {
        let mut app = App::new("  ");
        assert_eq!(press(&mut app, KeyCode::Enter), Action::None);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = App::new("");
        assert_eq!(press(&mut app, KeyCode::Esc), Action::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.handle_key(ctrl_c), Action::Quit);
        assert_eq!(app.input(), "");
    }

    #[test]
    fn test_scroll_saturates() {
        let mut app = App::new("");
        press(&mut app, KeyCode::Up);
        assert_eq!(app.scroll, 0);
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.scroll, 10);
    }

    #[test]
    fn test_renders_results() {
        let ticker = Ticker::normalize("2330");
        let series = PriceSeries::new(
            ticker,
            vec![
                PricePoint::new(date(2025, 1, 2), 1000.0),
                PricePoint::new(date(2025, 1, 3), 1010.0),
            ],
        );
        let snapshot = MarketSnapshot::from_series(series, LookbackWindow::OneYear).unwrap();

        let mut app = App::new("2330");
        app.chart = snapshot.chart();
        app.snapshot = Some(snapshot);
        app.status = Status::Warning("careful".to_string());

        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| ui(f, &app)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("2330"));
        assert!(text.contains("1010.00 TWD"));
        assert!(text.contains("1000.00 TWD"));
        assert!(text.contains("careful"));
    }

    #[test]
    fn test_reset_clears_results() {
        let mut app = App::new("0050");
        app.status = Status::Error("x".to_string());
        app.scroll = 5;
        app.reset();
        assert_eq!(app.status, Status::Idle);
        assert_eq!(app.scroll, 0);
        assert!(app.snapshot.is_none());
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }
}
