//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use chat_hud::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{HudError, Result};

// Events
pub use crate::event::{
    ChatEvent, ContentRenderer, EventDraft, EventSource, MemoryTransport, MessageKind,
    RenderedContent, RollPayload, RollSummary,
};

// HUD
pub use crate::hud::{FadePhase, HistoryBuffer, Navigator, Reconciler};

// Runtime
pub use crate::runtime::{HudFrame, HudInput, HudRuntime};

// Settings & chrome
pub use crate::settings::{SettingScope, SettingValue, SettingsService};
pub use crate::sidebar::{SidebarContext, SidebarTab};

// Dice
pub use crate::dice::{ComposerRegistry, DiceEvaluator, DiceTray, Die, RollEvaluator};

// Notifications
pub use crate::notify::{HudNotice, NoticeLevel, Notifier};
