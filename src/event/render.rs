//! Rendering seam: turning stored events into displayable content.

#![allow(missing_docs)]

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::core::errors::Result;
use crate::event::model::{ChatEvent, MessageKind, RollPayload, RollSummary};

/// Displayable form of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedContent {
    pub speaker: String,
    pub kind: MessageKind,
    pub body: String,
    pub roll: Option<RollSummary>,
}

/// Result of a render attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Ready(RenderedContent),
    /// The event exists but its content cannot be rendered yet.
    NotReady,
}

impl RenderOutcome {
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Turns a stored event into displayable content.
pub trait ContentRenderer: Send + Sync {
    fn render(&self, event: &ChatEvent) -> Result<RenderOutcome>;
}

/// Default single-line renderer.
///
/// Roll events stay unrenderable until their payload is final, so callers
/// go through their usual retry path instead of flashing a formula with
/// no result.
#[derive(Debug, Clone, Default)]
pub struct CompactRenderer {
    hide_totals: bool,
}

impl CompactRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Omit roll totals from rendered bodies (show the formula only).
    #[must_use]
    pub const fn with_hidden_totals(mut self, hide: bool) -> Self {
        self.hide_totals = hide;
        self
    }
}

impl ContentRenderer for CompactRenderer {
    fn render(&self, event: &ChatEvent) -> Result<RenderOutcome> {
        let speaker = event.display_name().to_string();

        if event.kind.is_roll() {
            let Some(RollPayload::Final(summary)) = &event.roll else {
                return Ok(RenderOutcome::NotReady);
            };
            let body = if self.hide_totals {
                format!("Roll: {}", summary.formula)
            } else {
                format!("Roll: {} ({})", summary.total, summary.formula)
            };
            return Ok(RenderOutcome::Ready(RenderedContent {
                speaker,
                kind: MessageKind::Roll,
                body,
                roll: Some(summary.clone()),
            }));
        }

        let body = match event.kind {
            MessageKind::Emote => format!("{speaker} {}", event.body),
            _ => event.body.clone(),
        };

        Ok(RenderOutcome::Ready(RenderedContent {
            speaker,
            kind: event.kind,
            body,
            roll: None,
        }))
    }
}

/// Renderer whose readiness is scripted per event id.
///
/// Wraps [`CompactRenderer`] but reports `NotReady` for an id until its
/// scripted miss count is spent. Used to exercise the retry path in tests
/// and demos.
#[derive(Default)]
pub struct ScriptedRenderer {
    inner: CompactRenderer,
    misses: Mutex<HashMap<String, u32>>,
}

impl ScriptedRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `misses` render calls for `id` report `NotReady`.
    pub fn not_ready_for(&self, id: &str, misses: u32) {
        self.misses.lock().insert(id.to_string(), misses);
    }

    /// Remaining scripted misses for `id`.
    #[must_use]
    pub fn pending_misses(&self, id: &str) -> u32 {
        self.misses.lock().get(id).copied().unwrap_or(0)
    }
}

impl ContentRenderer for ScriptedRenderer {
    fn render(&self, event: &ChatEvent) -> Result<RenderOutcome> {
        {
            let mut misses = self.misses.lock();
            if let Some(count) = misses.get_mut(event.id.as_str())
                && *count > 0
            {
                *count -= 1;
                return Ok(RenderOutcome::NotReady);
            }
        }
        self.inner.render(event)
    }
}
