//! Key and mouse translation for the terminal surface.

use std::ops::Range;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::runtime::HudInput;

/// What a key press asks the surface to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermCommand {
    Hud(HudInput),
    Quit,
}

/// Map a key event to a surface command.
#[must_use]
pub fn translate_key(key: &KeyEvent) -> Option<TermCommand> {
    match key.code {
        KeyCode::Left => Some(TermCommand::Hud(HudInput::PrevPressed)),
        KeyCode::Right => Some(TermCommand::Hud(HudInput::NextPressed)),
        KeyCode::Delete | KeyCode::Backspace => Some(TermCommand::Hud(HudInput::DeletePressed)),
        KeyCode::Char('r') => Some(TermCommand::Hud(HudInput::Refresh)),
        KeyCode::Char('q') | KeyCode::Esc => Some(TermCommand::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(TermCommand::Quit)
        }
        _ => None,
    }
}

/// Turns mouse rows into pointer-enter/leave edges over the HUD band.
///
/// Terminals report motion, not containment, so the tracker keeps the
/// previous containment state and emits an input only on the edge.
#[derive(Debug, Default)]
pub struct HoverTracker {
    over: bool,
}

impl HoverTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe the pointer on `row`; emits an input when containment in
    /// `hud_rows` flips.
    pub fn observe(&mut self, row: u16, hud_rows: &Range<u16>) -> Option<HudInput> {
        let inside = hud_rows.contains(&row);
        if inside == self.over {
            return None;
        }
        self.over = inside;
        Some(if inside {
            HudInput::PointerEnter
        } else {
            HudInput::PointerLeave
        })
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.over
    }
}
