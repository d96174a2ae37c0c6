//! Chat event data model shared across the HUD.

#![allow(missing_docs)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of a chat event, driving presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Out-of-character table talk.
    Ooc,
    /// In-character speech.
    Ic,
    /// Emote / action description.
    Emote,
    /// A dice roll.
    Roll,
    /// Anything else the feed produces.
    Other,
}

impl MessageKind {
    #[must_use]
    pub const fn is_roll(self) -> bool {
        matches!(self, Self::Roll)
    }
}

/// Outcome of evaluating a dice formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollSummary {
    pub formula: String,
    pub total: i64,
    /// Individual die faces, in roll order.
    pub dice: Vec<i64>,
}

/// Roll state attached to a roll event.
///
/// Feeds may deliver roll events before evaluation completes; such events
/// carry a `Pending` payload until the roll is finalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RollPayload {
    Pending { formula: String },
    Final(RollSummary),
}

impl RollPayload {
    /// The formula, regardless of state.
    #[must_use]
    pub fn formula(&self) -> &str {
        match self {
            Self::Pending { formula } => formula,
            Self::Final(summary) => &summary.formula,
        }
    }

    #[must_use]
    pub const fn is_final(&self) -> bool {
        matches!(self, Self::Final(_))
    }

    /// The evaluated summary, when finalized.
    #[must_use]
    pub const fn summary(&self) -> Option<&RollSummary> {
        match self {
            Self::Pending { .. } => None,
            Self::Final(summary) => Some(summary),
        }
    }
}

/// A single event from the chat feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEvent {
    pub id: String,
    /// In-world speaker alias, when one is set.
    pub speaker: Option<String>,
    /// Account name of the author.
    pub author: Option<String>,
    pub kind: MessageKind,
    pub body: String,
    pub roll: Option<RollPayload>,
    pub ts: DateTime<Utc>,
}

impl ChatEvent {
    /// Display name: speaker alias, then author, then "Unknown".
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.speaker
            .as_deref()
            .or(self.author.as_deref())
            .unwrap_or("Unknown")
    }
}

/// A not-yet-posted event handed to the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    pub speaker: Option<String>,
    pub author: Option<String>,
    pub kind: MessageKind,
    pub body: String,
    pub roll: Option<RollPayload>,
}
