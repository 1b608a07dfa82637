pub mod render;
pub mod state;

use crate::loader::{RowState, ScrollPosition};
use crate::settings::SettingsHub;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use state::AppState;
use std::io::stdout;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Commands the TUI sends back to the row session.
#[derive(Debug, Clone, PartialEq)]
pub enum TuiCommand {
    Quit,
    Scrolled(ScrollPosition),
}

/// Run the TUI. Reads row snapshots from `row_rx`, sends commands on `cmd_tx`.
pub async fn run_tui(
    row_rx: watch::Receiver<RowState>,
    settings: SettingsHub,
    cmd_tx: mpsc::Sender<TuiCommand>,
) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = tui_loop(&mut terminal, row_rx, settings, cmd_tx).await;

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn tui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    mut row_rx: watch::Receiver<RowState>,
    settings: SettingsHub,
    cmd_tx: mpsc::Sender<TuiCommand>,
) -> Result<()> {
    let mut settings_rx = settings.subscribe();
    let mut state = AppState::new(row_rx.borrow_and_update().clone(), settings.current());
    let mut spinner_frame: u8 = 0;

    loop {
        if row_rx.has_changed().unwrap_or(false) {
            let row = row_rx.borrow_and_update().clone();
            state.apply_row(row);
        }
        if settings_rx.has_changed().unwrap_or(false) {
            state.debug = *settings_rx.borrow_and_update();
        }

        terminal.draw(|f| render::draw(f, &state, spinner_frame))?;
        spinner_frame = spinner_frame.wrapping_add(1);

        // Row viewport: full width minus the row block's borders.
        let viewport = terminal.size()?.width.saturating_sub(2) as usize;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        let _ = cmd_tx.send(TuiCommand::Quit).await;
                        return Ok(());
                    }
                    KeyCode::Right | KeyCode::Char('l') => {
                        state.select_next(viewport);
                        let _ = cmd_tx.send(TuiCommand::Scrolled(state.scroll_position(viewport))).await;
                    }
                    KeyCode::Left | KeyCode::Char('h') => {
                        state.select_prev(viewport);
                        let _ = cmd_tx.send(TuiCommand::Scrolled(state.scroll_position(viewport))).await;
                    }
                    KeyCode::Enter => {
                        let picked = state
                            .row
                            .visible
                            .entries()
                            .get(state.selected)
                            .map(|e| (e.item.title.clone(), e.trailer.clone()));
                        match picked {
                            Some((title, Some(trailer))) => {
                                state.push_log("PLAY", format!("{}: {}", title, trailer.watch_url()));
                            }
                            Some((title, None)) => {
                                state.push_log("INFO", format!("{}: still checking for a trailer", title));
                            }
                            None => {}
                        }
                    }
                    KeyCode::Char('d') => settings.toggle_overlay(),
                    _ => {}
                }
            }
        }
    }
}
