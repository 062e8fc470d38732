use std::{
    io::{stdout, Stdout},
    ops::{Deref, DerefMut},
};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, Clear, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;

type TerminalBackend = ratatui::Terminal<CrosstermBackend<Stdout>>;

/// Raw-mode alternate-screen terminal that restores the user's shell
/// on drop. `suspend`/`resume` bracket running a child process in the
/// real terminal.
pub struct Terminal {
    inner: TerminalBackend,
}

impl Terminal {
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            Clear(crossterm::terminal::ClearType::All)
        )?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = ratatui::Terminal::new(backend)?;

        Ok(Self { inner: terminal })
    }

    pub fn suspend(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(stdout(), LeaveAlternateScreen)?;
        self.inner.show_cursor()?;
        Ok(())
    }

    pub fn resume(&mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        execute!(
            stdout(),
            EnterAlternateScreen,
            Clear(crossterm::terminal::ClearType::All)
        )?;
        self.inner.clear()?;
        Ok(())
    }
}

impl Deref for Terminal {
    type Target = TerminalBackend;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for Terminal {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}

fn restore_terminal() -> anyhow::Result<()> {
    execute!(stdout(), LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}
