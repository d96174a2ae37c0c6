//! Orchestrator tying the history buffer, fade timer, and reconciler to
//! the event feed.
//!
//! Failures are absorbed here: resolution and deletion problems become
//! notices, never panics or errors returned to the caller, so the HUD can
//! never take the host down with it.

use std::sync::Arc;
use std::time::Instant;

use crate::core::config::{Config, FadeConfig};
use crate::core::errors::HudError;
use crate::event::{EventSource, RenderedContent};
use crate::hud::fade::{FadePhase, FadeTimer};
use crate::hud::history::HistoryBuffer;
use crate::hud::reconcile::Reconciler;
use crate::notify::{HudNotice, Notifier};

/// The message currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub id: String,
    pub content: RenderedContent,
}

/// Whether a display change runs the entrance transition or pins opacity
/// and re-arms the countdown at once.
enum ShowMode {
    Entrance,
    Settled,
}

/// Drives the HUD: one displayed message, a cursor over recent history,
/// and the fade lifecycle.
pub struct Navigator {
    history: HistoryBuffer,
    timer: FadeTimer,
    reconciler: Reconciler,
    source: Arc<dyn EventSource>,
    notifier: Notifier,
    fade: FadeConfig,
    display: Option<DisplayState>,
}

impl Navigator {
    #[must_use]
    pub fn new(
        config: &Config,
        source: Arc<dyn EventSource>,
        reconciler: Reconciler,
        notifier: Notifier,
    ) -> Self {
        Self {
            history: HistoryBuffer::new(config.history.capacity),
            timer: FadeTimer::new(&config.fade),
            reconciler,
            source,
            notifier,
            fade: config.fade.clone(),
            display: None,
        }
    }

    /// A new event arrived on the feed. It is recorded in history
    /// unconditionally; display only changes when resolution succeeds.
    pub fn on_new_event(&mut self, now: Instant, id: &str) {
        self.history.append(id);
        self.display_resolved(now, id, ShowMode::Entrance);
    }

    /// Record an arriving event without touching the display. Used while
    /// the HUD is toggled off so history stays current for re-enable.
    pub fn record_event(&mut self, id: &str) {
        self.history.append(id);
    }

    /// Page through history. Skips the entrance transition since the user
    /// is looking right at the HUD. No-op on empty history or when already
    /// at the requested boundary.
    pub fn navigate(&mut self, now: Instant, delta: i64) {
        let before = self.history.cursor_index();
        if self.history.move_cursor(delta).is_none() {
            return;
        }
        if self.history.cursor_index() == before {
            return;
        }
        if let Some(id) = self.history.current().map(str::to_string) {
            self.display_resolved(now, &id, ShowMode::Settled);
        }
    }

    /// Ask the transport to delete the event under the cursor.
    ///
    /// The entry leaves history only after the transport confirms; a
    /// rejection becomes a notice and the buffer stays untouched.
    pub fn delete_current(&mut self, now: Instant) {
        let Some(id) = self.history.current().map(str::to_string) else {
            return;
        };

        if let Err(err) = self.source.delete_event(&id) {
            self.notifier.notify(&HudNotice::DeletionRejected {
                id,
                details: err.to_string(),
            });
            return;
        }

        self.history.remove(&id);
        self.show_current_or_clear(now);
    }

    /// Re-resolve and re-display the current entry without moving the
    /// cursor. No-op on empty history; on failure the stale display stays.
    pub fn refresh(&mut self, now: Instant) {
        if let Some(id) = self.history.current().map(str::to_string) {
            self.display_resolved(now, &id, ShowMode::Settled);
        }
    }

    /// The feed reported an event deleted elsewhere. No transport call is
    /// made; the entry just leaves history, and the display moves on if it
    /// was showing the deleted event.
    pub fn handle_external_delete(&mut self, now: Instant, id: &str) {
        if !self.history.remove(id) {
            return;
        }
        if self.display.as_ref().is_some_and(|d| d.id == id) {
            self.show_current_or_clear(now);
        }
    }

    /// The feed reported an event updated elsewhere.
    ///
    /// If it is on screen, its content is re-resolved in place without
    /// restarting the fade lifecycle. If it is the current entry but never
    /// made it on screen (its first resolution failed), this is the
    /// deferred arrival and it is displayed with the full entrance.
    pub fn handle_external_update(&mut self, now: Instant, id: &str) {
        if self.display.as_ref().is_some_and(|d| d.id == id) {
            match self.reconciler.resolve(self.source.as_ref(), id) {
                Ok(content) => {
                    if let Some(display) = &mut self.display {
                        display.content = content;
                    }
                }
                Err(err) => self.notify_resolution_failure(id, &err),
            }
            return;
        }

        if self.history.current() == Some(id) {
            self.display_resolved(now, id, ShowMode::Entrance);
        }
    }

    /// Entrance-completion signal from the presentation layer.
    pub fn entrance_complete(&mut self, now: Instant) {
        self.timer.entrance_complete(now);
    }

    pub fn pointer_enter(&mut self, now: Instant) {
        self.timer.pointer_enter(now);
    }

    pub fn pointer_leave(&mut self, now: Instant) {
        self.timer.pointer_leave(now);
    }

    /// Fire any due fade transitions.
    pub fn tick(&mut self, now: Instant) {
        self.timer.tick(now);
    }

    /// Drop the displayed message and cancel the fade lifecycle.
    pub fn clear_display(&mut self) {
        self.display = None;
        self.timer.clear();
    }

    #[must_use]
    pub fn display(&self) -> Option<&DisplayState> {
        self.display.as_ref()
    }

    #[must_use]
    pub fn opacity(&self, now: Instant) -> f64 {
        self.timer.opacity(now)
    }

    #[must_use]
    pub const fn phase(&self) -> FadePhase {
        self.timer.phase()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.next_deadline()
    }

    /// Whether an older entry exists to page back to.
    #[must_use]
    pub fn can_go_prev(&self) -> bool {
        !self.history.is_at_start()
    }

    /// Whether a newer entry exists to page forward to.
    #[must_use]
    pub fn can_go_next(&self) -> bool {
        !self.history.is_at_end()
    }

    #[must_use]
    pub const fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    #[must_use]
    pub const fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    /// Display the current entry, or clear when history is empty or the
    /// entry cannot be resolved. Used after deletions, where keeping the
    /// old content on screen would show a deleted message.
    fn show_current_or_clear(&mut self, now: Instant) {
        let Some(next) = self.history.current().map(str::to_string) else {
            self.clear_display();
            return;
        };
        if !self.display_resolved(now, &next, ShowMode::Settled) {
            self.clear_display();
        }
    }

    fn display_resolved(&mut self, now: Instant, id: &str, mode: ShowMode) -> bool {
        match self.reconciler.resolve(self.source.as_ref(), id) {
            Ok(content) => {
                self.display = Some(DisplayState {
                    id: id.to_string(),
                    content,
                });
                match mode {
                    ShowMode::Entrance => self.timer.show(now, &self.fade),
                    ShowMode::Settled => self.timer.show_settled(now, &self.fade),
                }
                true
            }
            Err(err) => {
                self.notify_resolution_failure(id, &err);
                false
            }
        }
    }

    fn notify_resolution_failure(&mut self, id: &str, err: &HudError) {
        let notice = HudNotice::ResolutionFailed {
            id: id.to_string(),
            attempts: self.reconciler.attempts_allowed(),
            details: err.to_string(),
        };
        self.notifier.notify(&notice);
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("history_len", &self.history.len())
            .field("phase", &self.phase())
            .field("display", &self.display)
            .finish_non_exhaustive()
    }
}
