use std::fs::File;
use std::io::{self, Stdout, Write};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{
    DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use log::{info, warn};

use logo3d::app::{App, CrosstermEventSource};
use logo3d::config::{AppConfig, Cli};

const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// Puts the terminal back the way it was, whichever way `run` exits
struct TerminalGuard {
    stdout: Stdout,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange,
            Hide,
            Clear(ClearType::All)
        )
        .context("failed to set up the terminal")?;
        Ok(TerminalGuard { stdout })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            self.stdout,
            Show,
            DisableFocusChange,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = disable_raw_mode();
        let _ = self.stdout.flush();
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    match &cli.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        // stdout and stderr both land on the canvas
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
    Ok(())
}

fn terminal_size() -> (u16, u16) {
    match termsize::get() {
        Some(size) => (size.cols, size.rows),
        None => {
            warn!(
                "could not read terminal size, assuming {}x{}",
                FALLBACK_SIZE.0, FALLBACK_SIZE.1
            );
            FALLBACK_SIZE
        }
    }
}

/// Main function
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;
    let config = AppConfig::from_cli(&cli)?;

    let (width, height) = terminal_size();
    info!("starting with {config:?}");
    let mut app = App::new(config, width, height);

    let mut guard = TerminalGuard::enter()?;
    app.run(&mut guard.stdout, &mut CrosstermEventSource)
}
