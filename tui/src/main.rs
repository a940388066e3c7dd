//! lolGPT TUI Entry Point
//!
//! Launches the terminal chat client for lolGPT.
//!
//! Usage:
//!   lolgpt [OPTIONS]
//!
//! Options:
//!   --api-url <URL>              Answer service base URL
//!   --reveal-interval-ms <MS>    Delay between revealed characters
//!   --timeout-secs <SECS>        Per-request timeout
//!   --max-input-bytes <BYTES>    Longest accepted question
//!   --config <PATH>              Config file to read

use std::fs::{self, File};
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lolgpt_core::{load_config, ChatConfig, ConfigOverrides};
use lolgpt_tui::{App, ChatClient};

/// Terminal client for the lolGPT League of Legends assistant
#[derive(Debug, Parser)]
#[command(name = "lolgpt", version, about)]
struct Args {
    /// Answer service base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Milliseconds between revealed characters
    #[arg(long)]
    reveal_interval_ms: Option<u64>,

    /// Seconds to wait for an answer before giving up
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Longest accepted question, in bytes
    #[arg(long)]
    max_input_bytes: Option<usize>,

    /// Config file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            api_url: self.api_url.clone(),
            reveal_interval_ms: self.reveal_interval_ms,
            request_timeout_secs: self.timeout_secs,
            max_input_bytes: self.max_input_bytes,
        }
    }
}

/// Log to a file; the terminal belongs to the UI
fn init_logging() -> anyhow::Result<PathBuf> {
    let dir = dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("lolgpt");
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let path = dir.join("lolgpt.log");
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .init();

    Ok(path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Config errors are reported before the terminal is taken over
    let config = load_config(&args.overrides())?;

    let log_path = init_logging()?;
    tracing::info!(
        api_url = %config.api_url,
        log = %log_path.display(),
        "Starting lolGPT"
    );
    let sources = config.sources();
    tracing::debug!(
        api_url = %sources.api_url,
        reveal_interval_ms = %sources.reveal_interval_ms,
        request_timeout_secs = %sources.request_timeout_secs,
        max_input_bytes = %sources.max_input_bytes,
        "Config sources"
    );

    // Check if we have a TTY before attempting initialization
    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: lolgpt requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means:");
        eprintln!("  - stdin or stdout is piped");
        eprintln!("  - SSH without -t flag");
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal before printing panic
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste
        );
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    // Pastes arrive as one event, so a pasted newline never submits
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let result = run_app(&mut terminal, &config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    // Propagate any errors
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &ChatConfig,
) -> anyhow::Result<()> {
    let size = crossterm::terminal::size()?;
    let mut app = App::new(ChatClient::from_config(config), size);
    app.run(terminal).await?;

    tracing::info!("lolGPT closed");
    Ok(())
}
