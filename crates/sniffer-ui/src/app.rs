//! Interactive display of an [`ActivityPlot`].
//!
//! [`ActivityPlot::show`] takes over the terminal (raw mode, alternate
//! screen), redraws the plot until the user dismisses it, then restores the
//! terminal.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::layout::Rect;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::debug;

use sniffer_core::{Result, SnifferError};

use crate::plot::{ActivityPlot, FigureSize};

impl ActivityPlot {
    /// Show the plot full-screen until `q`, `Esc` or `Ctrl+C` is pressed.
    ///
    /// The plot is drawn at its figure size, centred, and shrunk to fit when
    /// the terminal is smaller.
    pub fn show(&self) -> Result<()> {
        enable_raw_mode()
            .map_err(|e| SnifferError::Terminal(format!("cannot enable raw mode: {}", e)))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|e| {
            let _ = disable_raw_mode();
            SnifferError::Terminal(format!("cannot enter alternate screen: {}", e))
        })?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("Showing {} plot \"{}\"", self.kind, self.title);

        let result = self.event_loop(&mut terminal);

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        let tick_rate = Duration::from_millis(250);

        loop {
            terminal.draw(|frame| {
                let area = centered(frame.area(), self.size);
                frame.render_widget(self, area);
            })?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if is_quit(&key) {
                        return Ok(());
                    }
                }
            }
        }
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        _ => false,
    }
}

/// `size` centred in `area`, clipped to it.
fn centered(area: Rect, size: FigureSize) -> Rect {
    let width = size.width.min(area.width);
    let height = size.height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

// ── Tests ──────────────────────────────────────────────────────────────────────
