//! HUD runtime: owned init/teardown lifecycle around the navigator.
//!
//! The runtime binds a feed subscription, the settings service, and the
//! navigator into one pollable unit. Hosts call [`HudRuntime::poll`] on
//! their tick, feed user actions through [`HudRuntime::handle`], and paint
//! whatever [`HudRuntime::frame`] returns. `poll` and `handle` never fail:
//! everything past init is absorbed into notices.

use std::sync::Arc;
use std::time::Instant;

use crate::core::config::Config;
use crate::core::errors::Result;
use crate::dice::{ComposerRegistry, DiceTray, RollEvaluator};
use crate::event::{
    ContentRenderer, EventDraft, EventSource, FeedEvent, FeedSubscription, MessageKind,
    RenderedContent, RollPayload,
};
use crate::hud::navigator::Navigator;
use crate::hud::reconcile::Reconciler;
use crate::notify::{HudNotice, Notifier};
use crate::placement::{PlacementController, Position, Size};
use crate::settings::{SettingScope, SettingValue, SettingsService, keys};

/// Default HUD rectangle used for drag hit-testing, in viewport units.
const DEFAULT_HUD_SIZE: Size = Size::new(320.0, 48.0);

/// A user action aimed at the HUD, surface-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudInput {
    PrevPressed,
    NextPressed,
    DeletePressed,
    Refresh,
    PointerEnter,
    PointerLeave,
    EntranceComplete,
}

/// Per-tick view snapshot for a surface to paint.
#[derive(Debug, Clone, PartialEq)]
pub struct HudFrame {
    /// False while the HUD is toggled off or has nothing to show.
    pub visible: bool,
    /// Id of the displayed event, when one is visible.
    pub event_id: Option<String>,
    pub content: Option<RenderedContent>,
    /// Current opacity in `[target, 1.0]`.
    pub opacity: f64,
    /// The entrance transition has not completed yet.
    pub entrance_pending: bool,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

impl HudFrame {
    /// Frame painted while the HUD is disabled or empty.
    #[must_use]
    pub const fn hidden() -> Self {
        Self {
            visible: false,
            event_id: None,
            content: None,
            opacity: 0.0,
            entrance_pending: false,
            prev_enabled: false,
            next_enabled: false,
        }
    }
}

/// The assembled HUD: navigator, settings, dice tray, and feed plumbing.
pub struct HudRuntime {
    config: Config,
    settings: SettingsService,
    navigator: Navigator,
    source: Arc<dyn EventSource>,
    subscription: Option<FeedSubscription>,
    tray: DiceTray,
    composers: ComposerRegistry,
    roller: Box<dyn RollEvaluator>,
    placement: PlacementController,
    system_key: String,
    user_name: String,
    enabled: bool,
}

impl HudRuntime {
    /// Build the runtime and attach it to the feed.
    ///
    /// Registers the standard settings, loads both scope files from the
    /// configured paths (missing files are fine), subscribes to the
    /// transport, and restores the persisted HUD position. `finalizer`
    /// evaluates pending roll payloads during reconciliation; `roller`
    /// evaluates formulas the dice tray posts.
    pub fn init(
        config: Config,
        source: Arc<dyn EventSource>,
        renderer: Box<dyn ContentRenderer>,
        finalizer: Box<dyn RollEvaluator>,
        roller: Box<dyn RollEvaluator>,
    ) -> Result<Self> {
        let mut settings = SettingsService::with_standard()?;
        settings.load_scope(SettingScope::World, &config.paths.world_settings_file)?;
        settings.load_scope(SettingScope::Client, &config.paths.client_settings_file)?;

        let mut notifier = Notifier::from_config(&config.notify);
        let subscription = source.subscribe()?;
        notifier.notify(&HudNotice::FeedAttached {
            subscription: subscription.id,
        });

        let reconciler = Reconciler::new(renderer, finalizer, &config.reconcile);
        let navigator = Navigator::new(&config, Arc::clone(&source), reconciler, notifier);

        let enabled = settings.get_bool(keys::SHOW_RECENT_MESSAGE)?;
        let mut placement = PlacementController::new(true, DEFAULT_HUD_SIZE);
        if let SettingValue::Json(value) = settings.get(keys::HUD_POSITION)? {
            placement.set_position(Position::from_value(value));
        }

        Ok(Self {
            config,
            settings,
            navigator,
            source,
            subscription: Some(subscription),
            tray: DiceTray::new(),
            composers: ComposerRegistry::new(),
            roller,
            placement,
            system_key: String::new(),
            user_name: "Player".to_string(),
            enabled,
        })
    }

    /// Detach from the feed and drop the display.
    ///
    /// After teardown the transport no longer holds a sender for this
    /// runtime, so nothing posted later can reach it.
    pub fn teardown(mut self) -> Result<()> {
        self.navigator.clear_display();
        if let Some(subscription) = self.subscription.take() {
            self.navigator.notifier_mut().notify(&HudNotice::FeedDetached {
                subscription: subscription.id,
            });
            self.source.unsubscribe(subscription)?;
        }
        Ok(())
    }

    /// Advance the HUD: apply the enable toggle, drain the feed mailbox,
    /// and fire due fade transitions. Never fails.
    pub fn poll(&mut self, now: Instant) {
        self.apply_enable_toggle(now);
        self.drain_feed(now);
        self.navigator.tick(now);
    }

    /// Route a user action to the navigator. Ignored while the HUD is
    /// toggled off. Never fails.
    pub fn handle(&mut self, input: HudInput, now: Instant) {
        if !self.enabled {
            return;
        }
        match input {
            HudInput::PrevPressed => self.navigator.navigate(now, -1),
            HudInput::NextPressed => self.navigator.navigate(now, 1),
            HudInput::DeletePressed => self.navigator.delete_current(now),
            HudInput::Refresh => self.navigator.refresh(now),
            HudInput::PointerEnter => self.navigator.pointer_enter(now),
            HudInput::PointerLeave => self.navigator.pointer_leave(now),
            HudInput::EntranceComplete => self.navigator.entrance_complete(now),
        }
    }

    /// Snapshot the current view for a surface to paint.
    #[must_use]
    pub fn frame(&self, now: Instant) -> HudFrame {
        if !self.enabled {
            return HudFrame::hidden();
        }
        let Some(display) = self.navigator.display() else {
            return HudFrame::hidden();
        };
        HudFrame {
            visible: true,
            event_id: Some(display.id.clone()),
            content: Some(display.content.clone()),
            opacity: self.navigator.opacity(now),
            entrance_pending: self.navigator.phase() == crate::hud::FadePhase::Showing,
            prev_enabled: self.navigator.can_go_prev(),
            next_enabled: self.navigator.can_go_next(),
        }
    }

    /// Compose, evaluate, and post the tray as a roll card, then reset
    /// the tray. An empty tray warns and posts nothing; evaluation or
    /// posting failures leave the tray intact.
    pub fn post_roll(&mut self) {
        let Some(formula) = self.composers.compose(&self.system_key, &self.tray) else {
            self.navigator.notifier_mut().notify(&HudNotice::EmptyTray);
            return;
        };

        let summary = match self.roller.evaluate(&formula) {
            Ok(summary) => summary,
            Err(err) => {
                self.navigator.notifier_mut().notify(&HudNotice::EvaluationFailed {
                    formula,
                    details: err.to_string(),
                });
                return;
            }
        };

        let hide_total = self
            .settings
            .get_bool(keys::HIDE_TOTAL_RESULT)
            .unwrap_or(false);
        let card = crate::dice::RollCard::from_summary(&summary, hide_total);
        let draft = EventDraft {
            speaker: None,
            author: Some(self.user_name.clone()),
            kind: MessageKind::Roll,
            body: card.to_body(),
            roll: Some(RollPayload::Final(summary.clone())),
        };

        match self.source.post_event(draft) {
            Ok(_) => {
                self.navigator.notifier_mut().notify(&HudNotice::RollPosted {
                    formula,
                    total: summary.total,
                });
                self.tray.reset();
            }
            Err(err) => {
                self.navigator.notifier_mut().notify(&HudNotice::PostRejected {
                    details: err.to_string(),
                });
            }
        }
    }

    /// Post a plain out-of-character line authored by the current user.
    /// Blank input is ignored.
    pub fn post_chat(&mut self, text: &str) {
        let body = text.trim();
        if body.is_empty() {
            return;
        }
        let draft = EventDraft {
            speaker: None,
            author: Some(self.user_name.clone()),
            kind: MessageKind::Ooc,
            body: body.to_string(),
            roll: None,
        };
        if let Err(err) = self.source.post_event(draft) {
            self.navigator.notifier_mut().notify(&HudNotice::PostRejected {
                details: err.to_string(),
            });
        }
    }

    /// Finish a drag gesture and persist the final position.
    pub fn release_drag(&mut self) {
        if let Some(position) = self.placement.release() {
            self.settings
                .set(keys::HUD_POSITION, SettingValue::Json(position.to_value()))
                .ok();
        }
    }

    /// Write both settings scopes to their configured files.
    pub fn save_settings(&self) -> Result<()> {
        self.settings
            .save_scope(SettingScope::World, &self.config.paths.world_settings_file)?;
        self.settings
            .save_scope(SettingScope::Client, &self.config.paths.client_settings_file)?;
        Ok(())
    }

    /// Flip the enable toggle. Takes effect on the next `poll`.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        self.settings
            .set(keys::SHOW_RECENT_MESSAGE, SettingValue::Bool(enabled))?;
        Ok(())
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Earliest instant a fade transition is due, for sizing poll sleeps.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.navigator.next_deadline()
    }

    pub fn set_user_name(&mut self, name: impl Into<String>) {
        self.user_name = name.into();
    }

    /// Game-system key used to pick a roll composer. Unknown keys fall
    /// back to the default composer.
    pub fn set_system_key(&mut self, key: impl Into<String>) {
        self.system_key = key.into();
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn settings(&self) -> &SettingsService {
        &self.settings
    }

    pub const fn settings_mut(&mut self) -> &mut SettingsService {
        &mut self.settings
    }

    #[must_use]
    pub const fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    #[must_use]
    pub const fn tray(&self) -> &DiceTray {
        &self.tray
    }

    pub const fn tray_mut(&mut self) -> &mut DiceTray {
        &mut self.tray
    }

    pub const fn composers_mut(&mut self) -> &mut ComposerRegistry {
        &mut self.composers
    }

    #[must_use]
    pub const fn placement(&self) -> &PlacementController {
        &self.placement
    }

    pub const fn placement_mut(&mut self) -> &mut PlacementController {
        &mut self.placement
    }

    fn apply_enable_toggle(&mut self, now: Instant) {
        let wanted = self
            .settings
            .get_bool(keys::SHOW_RECENT_MESSAGE)
            .unwrap_or(self.enabled);
        if wanted == self.enabled {
            return;
        }
        self.enabled = wanted;
        if wanted {
            // Pick up whatever accumulated while the HUD was off.
            self.navigator.refresh(now);
        } else {
            self.navigator.clear_display();
        }
        self.navigator
            .notifier_mut()
            .notify(&HudNotice::HudToggled { enabled: wanted });
    }

    fn drain_feed(&mut self, now: Instant) {
        // Collect first: on_new_event may block for the grace period, and
        // holding the receiver borrow across it would be wrong anyway.
        let mut batch = Vec::new();
        if let Some(subscription) = &self.subscription {
            while let Ok(event) = subscription.receiver.try_recv() {
                batch.push(event);
            }
        }

        for event in batch {
            match event {
                FeedEvent::Created { id } => {
                    if self.enabled {
                        self.navigator.on_new_event(now, &id);
                    } else {
                        self.navigator.record_event(&id);
                    }
                }
                FeedEvent::Updated { id } => {
                    if self.enabled {
                        self.navigator.handle_external_update(now, &id);
                    }
                }
                FeedEvent::Deleted { id } => {
                    self.navigator.handle_external_delete(now, &id);
                }
            }
        }
    }
}

impl std::fmt::Debug for HudRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HudRuntime")
            .field("enabled", &self.enabled)
            .field("attached", &self.subscription.is_some())
            .field("navigator", &self.navigator)
            .finish_non_exhaustive()
    }
}
