use std::io::{self, IsTerminal, Stdout};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::error::WatchError;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Enables raw mode and switches to the alternate screen.
pub fn setup_terminal() -> Result<Tui, WatchError> {
    if !io::stdout().is_terminal() {
        return Err(WatchError::Config(
            "pulse_watch needs an interactive terminal".to_string(),
        ));
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e.into());
    }

    match Terminal::new(CrosstermBackend::new(stdout)) {
        Ok(terminal) => Ok(terminal),
        Err(e) => {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            Err(e.into())
        }
    }
}

pub fn restore_terminal(terminal: &mut Tui) -> Result<(), WatchError> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
