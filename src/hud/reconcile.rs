//! Resolves history entries into renderable content.
//!
//! Feed notifications race the renderer: an event can be announced before
//! its content is available, and a roll can still carry an unfinalized
//! payload. The reconciler absorbs both races with one short grace retry
//! and finalizes pending rolls locally before rendering.

use std::thread;
use std::time::Duration;

use crate::core::config::ReconcileConfig;
use crate::core::errors::{HudError, Result};
use crate::dice::RollEvaluator;
use crate::event::{
    ChatEvent, ContentRenderer, EventSource, RenderOutcome, RenderedContent, RollPayload,
};

enum Attempt {
    Resolved(RenderedContent),
    /// Retryable miss with the reason kept for the failure message.
    Absent(&'static str),
}

/// Turns an event id into rendered content, tolerating not-yet-visible
/// events and not-yet-renderable content.
pub struct Reconciler {
    renderer: Box<dyn ContentRenderer>,
    evaluator: Box<dyn RollEvaluator>,
    grace: Duration,
    max_retries: u32,
}

impl Reconciler {
    #[must_use]
    pub fn new(
        renderer: Box<dyn ContentRenderer>,
        evaluator: Box<dyn RollEvaluator>,
        config: &ReconcileConfig,
    ) -> Self {
        Self {
            renderer,
            evaluator,
            grace: config.grace(),
            max_retries: config.max_retries,
        }
    }

    /// Total attempts a resolution may consume, for failure reporting.
    #[must_use]
    pub const fn attempts_allowed(&self) -> u32 {
        self.max_retries + 1
    }

    /// Resolve `id` to rendered content.
    ///
    /// A missing event or not-yet-ready content is retried once after the
    /// grace period; transport and evaluation failures propagate
    /// immediately. The grace wait blocks the caller.
    pub fn resolve(&mut self, source: &dyn EventSource, id: &str) -> Result<RenderedContent> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_resolve(source, id)? {
                Attempt::Resolved(content) => return Ok(content),
                Attempt::Absent(reason) => {
                    if attempt > self.max_retries {
                        return Err(HudError::resolution(
                            id,
                            format!("{reason} after {attempt} attempts"),
                        ));
                    }
                    thread::sleep(self.grace);
                }
            }
        }
    }

    fn try_resolve(&mut self, source: &dyn EventSource, id: &str) -> Result<Attempt> {
        let Some(event) = source.event_by_id(id)? else {
            return Ok(Attempt::Absent("event not in feed yet"));
        };
        let event = self.finalize(event)?;
        match self.renderer.render(&event)? {
            RenderOutcome::Ready(content) => Ok(Attempt::Resolved(content)),
            RenderOutcome::NotReady => Ok(Attempt::Absent("content not rendered yet")),
        }
    }

    /// Evaluate a pending roll payload so the rendered card never shows a
    /// placeholder total. Evaluation failures are terminal, not retried.
    fn finalize(&mut self, mut event: ChatEvent) -> Result<ChatEvent> {
        if let Some(RollPayload::Pending { formula }) = &event.roll {
            let summary = self.evaluator.evaluate(formula)?;
            event.roll = Some(RollPayload::Final(summary));
        }
        Ok(event)
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("grace", &self.grace)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}
