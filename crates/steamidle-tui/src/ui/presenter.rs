use std::io::{self, Stdout};

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use steamidle_core::{Notice, StatusPresenter, StatusSnapshot};
use tracing::warn;

use super::render::render;

/// Shows the status block on the alternate screen and notices on the main one.
///
/// Raw mode is never enabled, so Ctrl+C still arrives as a signal.
#[derive(Default)]
pub struct TerminalPresenter {
    terminal: Option<Terminal<CrosstermBackend<Stdout>>>,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    fn terminal(&mut self) -> io::Result<&mut Terminal<CrosstermBackend<Stdout>>> {
        let terminal = match self.terminal.take() {
            Some(terminal) => terminal,
            None => {
                let mut stdout = io::stdout();
                execute!(stdout, EnterAlternateScreen)?;
                let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
                terminal.hide_cursor()?;
                terminal.clear()?;
                terminal
            }
        };
        Ok(self.terminal.insert(terminal))
    }

    /// Go back to the main screen so printed text stays visible.
    fn restore(&mut self) {
        if let Some(mut terminal) = self.terminal.take() {
            if let Err(e) = execute!(terminal.backend_mut(), LeaveAlternateScreen) {
                warn!(error = %e, "Failed to leave alternate screen");
            }
            if let Err(e) = terminal.show_cursor() {
                warn!(error = %e, "Failed to show cursor");
            }
        }
    }
}

impl StatusPresenter for TerminalPresenter {
    fn render(&mut self, status: &StatusSnapshot) -> io::Result<()> {
        self.terminal()?.draw(|f| render(f, status))?;
        Ok(())
    }

    fn notify(&mut self, notice: Notice<'_>) {
        match notice {
            Notice::LoggedIn { display_name } => println!("✓ Logged in as {}", display_name),
            Notice::IdleStarted { app_ids } => println!("✓ Idling started (App ID: {})", app_ids),
            Notice::Rejected(reason) => println!("✗ Error: {}", reason),
            Notice::HandshakeFailed(message) => println!("✗ Error: {}", message),
            Notice::Fault(message) => {
                self.restore();
                println!("✗ Error: {}", message);
            }
            Notice::ShuttingDown => {
                self.restore();
                println!("\nShutting down...");
            }
            Notice::LoggedOut => println!("✓ Logged out"),
        }
    }
}

impl Drop for TerminalPresenter {
    fn drop(&mut self) {
        self.restore();
    }
}
