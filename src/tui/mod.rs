//! Terminal user interface for the dictionary-data admin screen
//!
//! One table view with a search form, a create/edit modal, delete
//! confirmation, and toolbar actions, driven by a single event loop.

pub mod app;
pub mod operations;
pub mod screens;
pub mod ui;

pub use app::App;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::info;

use crate::api::HttpApi;
use crate::config::Config;
use crate::notify::StatusLine;

/// Set up the terminal, run the admin screen, and restore the terminal
/// on the way out
pub async fn run_tui(config: Config, initial_dict_type: Option<String>) -> Result<()> {
    let api = HttpApi::new(&config)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(api, StatusLine::new(), config, initial_dict_type);
    let result = app.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!("Admin TUI exited");
    result
}
