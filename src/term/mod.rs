//! Optional crossterm front-end for the HUD.
//!
//! A raw-mode/alternate-screen guard, a frame painter, and a key/mouse
//! translator. The painter and translator are pure over [`HudFrame`] and
//! crossterm event structs, so they test without a terminal attached.
//!
//! [`HudFrame`]: crate::runtime::HudFrame

pub mod guard;
pub mod input;
pub mod paint;

pub use guard::TerminalGuard;
pub use input::{HoverTracker, TermCommand, translate_key};
pub use paint::paint;
