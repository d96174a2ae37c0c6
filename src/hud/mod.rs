//! HUD core: recent-event history, the fade lifecycle, content
//! reconciliation, and the navigator that orchestrates them.

#![allow(missing_docs)]

pub mod fade;
pub mod history;
pub mod navigator;
pub mod reconcile;

#[cfg(test)]
mod test_properties;

pub use fade::{FadePhase, FadeTimer};
pub use history::HistoryBuffer;
pub use navigator::{DisplayState, Navigator};
pub use reconcile::Reconciler;
