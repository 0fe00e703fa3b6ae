mod demo;
mod event;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use termcordion_config::Config;
use termcordion_core::IdPolicy;
use termcordion_logger::LogLevel;

use demo::{style_from_config, App};
use event::EventHandler;

const TICK_RATE: Duration = Duration::from_millis(250);

fn main() -> Result<()> {
    let config = Config::load().unwrap_or_default();

    let min_level = config
        .logging
        .min_level
        .parse()
        .unwrap_or(LogLevel::Info);
    termcordion_logger::init(
        config.log_file_path().ok(),
        config.logging.max_entries,
        min_level,
    );

    let policy = config
        .general
        .id_policy
        .parse::<IdPolicy>()
        .unwrap_or_else(|e| {
            termcordion_logger::warn(e);
            IdPolicy::default()
        });
    termcordion_logger::info(format!("Starting with {} ids", policy.to_str()));
    let style = style_from_config(&config.appearance);

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(TICK_RATE);
    let result =
        App::new(policy.source(), style).and_then(|mut app| app.run(&mut terminal, &events));

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Print error if there was one
    if let Err(err) = result {
        termcordion_logger::error(format!("{:?}", err));
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
