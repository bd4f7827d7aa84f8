//! Command-line interface for tw-advisor

mod dashboard;

use advisor_stock::{
    Advisor, AdvisorConfig, AnalysisError, ErrorKind, LookbackWindow, TextPresenter, run_analysis,
};
use advisor_stock::config::AdvisorConfigBuilder;
use advisor_utils::{GEMINI_API_KEY, LogTarget, SecretStore, init_tracing};
use clap::{Parser, Subcommand};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

const LOG_TARGETS: [&str; 4] = ["tw_advisor", "advisor_stock", "advisor_llm", "advisor_utils"];

#[derive(Parser, Debug)]
#[command(name = "tw-advisor", version)]
#[command(about = "AI investment advisor for Taiwan stocks and ETFs", long_about = None)]
struct Cli {
    /// Configuration file; defaults apply when it does not exist
    #[arg(long, global = true, default_value = "advisor.toml")]
    config: PathBuf,

    /// Secrets file holding GEMINI_API_KEY
    #[arg(long, global = true)]
    secrets: Option<PathBuf>,

    /// History window (1mo, 3mo, 6mo, 1y, 2y, 5y)
    #[arg(long, global = true)]
    lookback: Option<LookbackWindow>,

    /// Model name, overrides the config file and GEMINI_MODEL
    #[arg(long, global = true)]
    model: Option<String>,

    /// Ticker prefilled in the dashboard input
    #[arg(long, global = true)]
    default_ticker: Option<String>,

    /// Disable web search grounding
    #[arg(long, global = true)]
    no_search: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log file used by the dashboard
    #[arg(long, global = true, default_value = "tw-advisor.log")]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive full-screen dashboard (default)
    Dashboard,
    /// Analyse one ticker and print the result
    Analyze {
        /// Stock or ETF code, e.g. 2330 or 0050.TW
        ticker: String,

        /// Skip the price chart
        #[arg(long)]
        no_chart: bool,

        /// Stop after the metrics and chart
        #[arg(long)]
        no_report: bool,

        /// Chart width in columns
        #[arg(long, default_value_t = 80)]
        width: u16,

        /// Chart height in rows
        #[arg(long, default_value_t = 20)]
        height: u16,
    },
}

impl Cli {
    /// Our crates log at info (-v debug), dependencies only warn; -vv traces everything
    fn log_filter(&self) -> String {
        let level = match self.verbose {
            0 => "info",
            1 => "debug",
            _ => return "trace".to_string(),
        };
        LOG_TARGETS
            .iter()
            .fold("warn".to_string(), |filter, target| format!("{filter},{target}={level}"))
    }

    fn advisor_config(&self) -> Result<AdvisorConfig, AnalysisError> {
        let base = AdvisorConfig::load(&self.config)
            .map_err(|e| AnalysisError::ConfigurationMissing(e.to_string()))?;

        let mut builder = AdvisorConfigBuilder::from_config(base).with_env_model();
        if let Some(model) = &self.model {
            builder = builder.model(model.as_str());
        }
        if let Some(lookback) = self.lookback {
            builder = builder.lookback(lookback);
        }
        if let Some(ticker) = &self.default_ticker {
            builder = builder.default_ticker(ticker.as_str());
        }
        if self.no_search {
            builder = builder.web_search(false);
        }

        builder
            .build()
            .map_err(|e| AnalysisError::ConfigurationMissing(e.to_string()))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let target = match cli.command {
        Some(Command::Analyze { .. }) => LogTarget::Stderr,
        Some(Command::Dashboard) | None => LogTarget::File(cli.log_file.clone()),
    };
    if let Err(e) = init_tracing(&cli.log_filter(), &target) {
        eprintln!("無法開啟日誌檔 {}: {e}", cli.log_file.display());
        return ExitCode::FAILURE;
    }

    info!("Starting tw-advisor");

    let (config, advisor) = match build_advisor(&cli) {
        Ok(parts) => parts,
        Err(err) => {
            error!("Startup failed: {err}");
            eprintln!("{}", err.user_message());
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Some(Command::Analyze {
            ticker,
            no_chart,
            no_report,
            width,
            height,
        }) => {
            let chart_size = (!no_chart).then_some((width, height));
            analyze(&advisor, &ticker, chart_size, !no_report).await
        }
        Some(Command::Dashboard) | None => match run_dashboard(&advisor, &config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("Dashboard failed: {e:#}");
                eprintln!("Error: {e:#}");
                ExitCode::FAILURE
            }
        },
    }
}

fn build_advisor(cli: &Cli) -> Result<(AdvisorConfig, Advisor), AnalysisError> {
    let config = cli.advisor_config()?;
    let secrets = SecretStore::load(cli.secrets.as_deref(), &[GEMINI_API_KEY])?;
    let advisor = Advisor::from_config(&config, &secrets)?;
    info!(model = %config.model, lookback = %config.lookback, "Advisor ready");
    Ok((config, advisor))
}

async fn analyze(
    advisor: &Advisor,
    ticker: &str,
    chart_size: Option<(u16, u16)>,
    with_report: bool,
) -> ExitCode {
    let mut presenter = TextPresenter::new(io::stdout())
        .with_chart_size(chart_size)
        .with_report(with_report);

    let outcome = if with_report {
        run_analysis(advisor, &mut presenter, ticker).await.map(|_| ())
    } else {
        metrics_only(advisor, &mut presenter, ticker).await
    };

    if let Ok(mut out) = presenter.finish() {
        let _ = out.flush();
    }

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.kind() == ErrorKind::DataUnavailable => ExitCode::from(2),
        Err(_) => ExitCode::FAILURE,
    }
}

/// Fetch and present the history without calling the model
async fn metrics_only(
    advisor: &Advisor,
    presenter: &mut TextPresenter<io::Stdout>,
    ticker: &str,
) -> Result<(), AnalysisError> {
    use advisor_stock::Presenter;

    match advisor.prepare(ticker).await {
        Ok(snapshot) => {
            presenter.metrics(&snapshot);
            if let Some(chart) = snapshot.chart() {
                presenter.chart(&chart);
            }
            Ok(())
        }
        Err(err) => {
            if err.kind() == ErrorKind::DataUnavailable {
                presenter.warning(&err.user_message());
            } else {
                presenter.error(&err.user_message());
            }
            Err(err)
        }
    }
}

/// Puts the terminal back in cooked mode when dropped, including on panic
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = Self;
        execute!(io::stdout(), EnterAlternateScreen)?;

        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_terminal();
            default_hook(info);
        }));

        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
}

async fn run_dashboard(advisor: &Advisor, config: &AdvisorConfig) -> anyhow::Result<()> {
    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let mut app = dashboard::App::new(config.default_ticker.as_str());
    dashboard::run(&mut terminal, &mut app, advisor).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_dashboard() {
        let cli = Cli::try_parse_from(["tw-advisor"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("advisor.toml"));
        assert_eq!(
            cli.log_filter(),
            "warn,tw_advisor=info,advisor_stock=info,advisor_llm=info,advisor_utils=info"
        );
    }

    #[test]
    fn test_verbose_raises_our_crates_only() {
        let cli = Cli::try_parse_from(["tw-advisor", "-v"]).unwrap();
        let filter = cli.log_filter();
        assert!(filter.starts_with("warn,"));
        assert!(filter.contains("advisor_stock=debug"));
    }

    #[test]
    fn test_default_ticker_flag() {
        let cli = Cli::try_parse_from([
            "tw-advisor",
            "--config",
            "does-not-exist.toml",
            "--default-ticker",
            "2330.TW",
        ])
        .unwrap();

        let config = cli.advisor_config().unwrap();
        assert_eq!(config.default_ticker, "2330.TW");
    }

    #[test]
    fn test_restore_terminal_without_raw_mode() {
        // Safe to run when the terminal was never switched, and more than once
        restore_terminal();
        restore_terminal();
    }

    #[test]
    fn test_analyze_flags() {
        let cli = Cli::try_parse_from([
            "tw-advisor",
            "analyze",
            "2330",
            "--no-chart",
            "--lookback",
            "6mo",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.lookback, Some(LookbackWindow::SixMonths));
        assert_eq!(cli.log_filter(), "trace");
        match cli.command {
            Some(Command::Analyze {
                ticker,
                no_chart,
                no_report,
                width,
                ..
            }) => {
                assert_eq!(ticker, "2330");
                assert!(no_chart);
                assert!(!no_report);
                assert_eq!(width, 80);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_lookback_rejected() {
        assert!(Cli::try_parse_from(["tw-advisor", "--lookback", "10y"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "tw-advisor",
            "--config",
            "does-not-exist.toml",
            "--model",
            "gemini-2.5-pro",
            "--no-search",
            "--lookback",
            "3mo",
        ])
        .unwrap();

        let config = cli.advisor_config().unwrap();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.lookback, LookbackWindow::ThreeMonths);
        assert!(!config.web_search);
    }
}
