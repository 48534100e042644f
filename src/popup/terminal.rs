//! Terminal setup and teardown for the popup
//!
//! The popup is launched with null stdio, so it draws on the controlling
//! terminal when one exists and falls back to stdout otherwise. Sharing a
//! terminal with another full-screen program splits the keystrokes between
//! them; configure a terminal emulator as the presenter to avoid that.

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Write};

/// ASCII BEL, the terminal's notification sound
const BELL: &[u8] = b"\x07";

/// Where the popup draws
pub type PopupOutput = Box<dyn Write + Send>;

/// Raw-mode alternate screen owned for the popup's lifetime
pub struct PopupTerminal {
    terminal: Terminal<CrosstermBackend<PopupOutput>>,
}

impl PopupTerminal {
    pub fn new() -> Result<Self> {
        enable_raw_mode().context("enable raw mode")?;

        let mut output = open_output();
        if let Err(e) = execute!(output, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e).context("enter alternate screen");
        }

        let terminal = Terminal::new(CrosstermBackend::new(output)).context("create terminal")?;
        Ok(Self { terminal })
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<PopupOutput>> {
        &mut self.terminal
    }

    /// Ring the terminal bell
    pub fn ring(&mut self) -> Result<()> {
        let backend = self.terminal.backend_mut();
        backend.write_all(BELL)?;
        backend.flush()?;
        Ok(())
    }
}

impl Drop for PopupTerminal {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Put the terminal back into cooked mode; safe to call more than once
pub fn restore() {
    let _ = disable_raw_mode();
    let mut output = open_output();
    let _ = execute!(output, LeaveAlternateScreen);
}

/// Controlling terminal if there is one, stdout otherwise
pub fn open_output() -> PopupOutput {
    #[cfg(unix)]
    {
        if let Ok(tty) = std::fs::OpenOptions::new().write(true).open("/dev/tty") {
            return Box::new(tty);
        }
    }
    Box::new(io::stdout())
}
