//! RAII terminal lifecycle guard.
//!
//! [`TerminalGuard`] enters raw mode, the alternate screen, and mouse
//! capture on construction, and restores the terminal on [`Drop`] — even
//! during panics or early error returns. A custom panic hook restores the
//! terminal *before* the default panic message prints, so the backtrace
//! lands on a readable screen.

use std::io::{self, Write};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};

/// Raw mode is active. Checked by the panic hook to decide whether
/// terminal restoration is needed.
static RAW_MODE_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Guard owning the terminal state for the lifetime of the HUD surface.
pub struct TerminalGuard {
    hook_installed: bool,
}

impl TerminalGuard {
    /// Enter raw mode, alternate screen, and mouse capture, installing a
    /// panic-safe cleanup hook.
    ///
    /// # Errors
    /// I/O errors from terminal setup. On partial failure whatever was
    /// set up is torn down again before returning.
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(err) = execute!(io::stdout(), EnterAlternateScreen, Hide, EnableMouseCapture) {
            let _ = terminal::disable_raw_mode();
            return Err(err);
        }
        RAW_MODE_ACTIVE.store(true, Ordering::SeqCst);

        let prev = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal_best_effort();
            prev(info);
        }));

        Ok(Self {
            hook_installed: true,
        })
    }

    /// Terminal dimensions (columns, rows), with an 80x24 fallback when
    /// no tty is attached.
    #[must_use]
    pub fn size() -> (u16, u16) {
        terminal::size().unwrap_or((80, 24))
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal_best_effort();
        if self.hook_installed {
            // The previous hook was moved into our closure; reset to the
            // default since the guard's lifetime brackets all HUD usage.
            let _ = panic::take_hook();
        }
    }
}

/// Best-effort terminal restoration, safe to call more than once.
fn restore_terminal_best_effort() {
    if RAW_MODE_ACTIVE.swap(false, Ordering::SeqCst) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen, Show);
        let _ = terminal::disable_raw_mode();
        let _ = stdout.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_mode_flag_starts_false() {
        assert!(!RAW_MODE_ACTIVE.load(Ordering::SeqCst));
    }

    #[test]
    fn restore_is_idempotent() {
        restore_terminal_best_effort();
        restore_terminal_best_effort();
        assert!(!RAW_MODE_ACTIVE.load(Ordering::SeqCst));
    }
}
