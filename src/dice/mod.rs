//! Dice tray state, roll formula composition, and formula evaluation.

pub mod compose;
pub mod eval;
pub mod tray;

pub use compose::{ComposerRegistry, DefaultComposer, RollCard, RollComposer};
pub use eval::{DiceEvaluator, RollEvaluator};
pub use tray::{DiceTray, Die, RollMode};
