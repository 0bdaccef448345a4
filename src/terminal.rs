// src/terminal.rs
//! The terminal capability contract and its concrete `crossterm` backend.
//! Grounded on `ui.h`/`ui/term.c`: `init`/`quit`, `dimensions`, a
//! double-buffered `draw_at`/`set_attr_at`, `clear`/`flush`, and
//! `poll_event` with the `polling` mutual-exclusion flag the flicker
//! scheduler relies on (see `scheduler.rs`).

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm::{cursor, event, execute, queue, style, terminal};
use crossterm::style::Stylize;

use crate::color::Color;
use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellAttr {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub reverse: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Unhandled,
}

/// `ui_polling`: released true on poll entry, relaxed-stored false on exit.
/// The flicker scheduler checks this before touching shared floor state so
/// it never races a blocking key read.
pub static POLLING: AtomicBool = AtomicBool::new(false);

pub trait Terminal {
    fn init(&mut self) -> Result<()>;
    fn quit(&mut self) -> Result<()>;
    fn dimensions(&self) -> (u16, u16);
    fn draw_at(&mut self, row: u16, col: u16, text: &str, attr: CellAttr);
    fn clear(&mut self);
    fn flush(&mut self) -> Result<()>;
    /// Blocks until either a key arrives or `timeout` elapses.
    fn poll_event(&mut self, timeout: Duration) -> Result<Option<Key>>;
}

pub struct CrosstermBackend {
    out: io::Stdout,
}

impl CrosstermBackend {
    pub fn new() -> Self {
        CrosstermBackend { out: io::stdout() }
    }
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for CrosstermBackend {
    fn init(&mut self) -> Result<()> {
        terminal::enable_raw_mode().map_err(|e| Error::Terminal(e.to_string()))?;
        execute!(self.out, terminal::EnterAlternateScreen, cursor::Hide)
            .map_err(|e| Error::Terminal(e.to_string()))?;
        Ok(())
    }

    fn quit(&mut self) -> Result<()> {
        execute!(self.out, cursor::Show, terminal::LeaveAlternateScreen)
            .map_err(|e| Error::Terminal(e.to_string()))?;
        terminal::disable_raw_mode().map_err(|e| Error::Terminal(e.to_string()))?;
        Ok(())
    }

    fn dimensions(&self) -> (u16, u16) {
        terminal::size().unwrap_or((80, 24))
    }

    fn draw_at(&mut self, row: u16, col: u16, text: &str, attr: CellAttr) {
        let fg = style::Color::Rgb {
            r: attr.fg.r,
            g: attr.fg.g,
            b: attr.fg.b,
        };
        let bg = style::Color::Rgb {
            r: attr.bg.r,
            g: attr.bg.g,
            b: attr.bg.b,
        };
        let mut styled = style::style(text.to_string()).with(fg).on(bg);
        if attr.bold {
            styled = styled.bold();
        }
        if attr.reverse {
            styled = styled.negative();
        }
        let _ = queue!(self.out, cursor::MoveTo(col, row), style::PrintStyledContent(styled));
    }

    fn clear(&mut self) {
        let _ = queue!(self.out, terminal::Clear(terminal::ClearType::All));
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush().map_err(Error::from)
    }

    fn poll_event(&mut self, timeout: Duration) -> Result<Option<Key>> {
        POLLING.store(true, Ordering::Release);
        let ready = event::poll(timeout).map_err(|e| Error::Terminal(e.to_string()))?;
        if !ready {
            POLLING.store(false, Ordering::Relaxed);
            return Ok(None);
        }
        let ev = event::read().map_err(|e| Error::Terminal(e.to_string()))?;
        POLLING.store(false, Ordering::Relaxed);
        match ev {
            event::Event::Key(key_event) => match key_event.code {
                event::KeyCode::Char(c) => Ok(Some(Key::Char(c))),
                _ => Ok(Some(Key::Unhandled)),
            },
            _ => Ok(Some(Key::Unhandled)),
        }
    }
}
