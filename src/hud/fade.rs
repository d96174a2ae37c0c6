//! Visibility timer: hold displayed content, then fade it unless hovered.
//!
//! Deadline-driven state machine. Every mutating operation takes the
//! current instant; `tick` fires due transitions and `opacity` interpolates
//! during the fade animation. The machine stores at most one deadline, so
//! "a new trigger cancels the outstanding timer" holds structurally.

use std::time::{Duration, Instant};

use crate::core::config::FadeConfig;

/// Lifecycle phase of the displayed content's visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadePhase {
    /// Nothing displayed.
    Idle,
    /// Content just shown; entrance transition still running.
    Showing,
    /// Entrance done; fade countdown running.
    Settled,
    /// Pointer over the HUD; countdown suspended, opacity pinned to 1.0.
    Engaged,
    /// Opacity animating toward the target.
    Fading,
    /// At target opacity, awaiting the next trigger.
    Faded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Showing { fallback_at: Instant },
    Settled { fade_at: Instant },
    Engaged,
    Fading { started: Instant },
    Faded,
}

/// The fade timer for the single displayed message.
///
/// Durations and the target opacity are snapshotted from configuration
/// each time content is shown; mid-flight config changes take effect on
/// the next show.
#[derive(Debug, Clone)]
pub struct FadeTimer {
    state: State,
    /// Physical pointer presence, tracked across all states. Pointer
    /// presence during `Showing` takes effect once the entrance completes.
    pointer_over: bool,
    delay: Duration,
    animation: Duration,
    entrance_fallback: Duration,
    target_opacity: f64,
}

impl FadeTimer {
    #[must_use]
    pub fn new(config: &FadeConfig) -> Self {
        Self {
            state: State::Idle,
            pointer_over: false,
            delay: config.delay(),
            animation: config.animation(),
            entrance_fallback: config.entrance_fallback(),
            target_opacity: config.target_opacity,
        }
    }

    /// New content displayed with an entrance transition. Replaces any
    /// outstanding deadline and snapshots the config.
    pub fn show(&mut self, now: Instant, config: &FadeConfig) {
        self.snapshot(config);
        self.state = State::Showing {
            fallback_at: now + self.entrance_fallback,
        };
    }

    /// Content replaced without an entrance transition (navigation,
    /// refresh). Opacity pins to 1.0 and the countdown re-arms at once.
    pub fn show_settled(&mut self, now: Instant, config: &FadeConfig) {
        self.snapshot(config);
        self.state = self.settled_state(now);
    }

    /// Explicit entrance-completion signal. Ignored outside `Showing`.
    pub fn entrance_complete(&mut self, now: Instant) {
        if matches!(self.state, State::Showing { .. }) {
            self.state = self.settled_state(now);
        }
    }

    /// Pointer moved over the HUD: suspend the countdown and pin opacity.
    pub fn pointer_enter(&mut self, _now: Instant) {
        self.pointer_over = true;
        match self.state {
            State::Idle | State::Showing { .. } | State::Engaged => {}
            State::Settled { .. } | State::Fading { .. } | State::Faded => {
                self.state = State::Engaged;
            }
        }
    }

    /// Pointer left the HUD: restart the countdown from scratch.
    pub fn pointer_leave(&mut self, now: Instant) {
        self.pointer_over = false;
        if self.state == State::Engaged {
            self.state = State::Settled {
                fade_at: now + self.delay,
            };
        }
    }

    /// Nothing displayed anymore; cancels everything.
    pub fn clear(&mut self) {
        self.state = State::Idle;
    }

    /// Fire all transitions whose deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        loop {
            match self.state {
                State::Showing { fallback_at } if now >= fallback_at => {
                    // Entrance signal never arrived; settle anyway.
                    self.state = self.settled_state(fallback_at);
                }
                State::Settled { fade_at } if now >= fade_at => {
                    self.state = State::Fading { started: fade_at };
                }
                State::Fading { started } if now >= started + self.animation => {
                    self.state = State::Faded;
                }
                _ => break,
            }
        }
    }

    /// Current opacity in `[target, 1.0]`.
    #[must_use]
    pub fn opacity(&self, now: Instant) -> f64 {
        match self.state {
            State::Idle
            | State::Showing { .. }
            | State::Settled { .. }
            | State::Engaged => 1.0,
            State::Faded => self.target_opacity,
            State::Fading { started } => {
                if self.animation.is_zero() {
                    return self.target_opacity;
                }
                let elapsed = now.saturating_duration_since(started);
                let t = (elapsed.as_secs_f64() / self.animation.as_secs_f64()).clamp(0.0, 1.0);
                (self.target_opacity - 1.0).mul_add(t, 1.0)
            }
        }
    }

    #[must_use]
    pub const fn phase(&self) -> FadePhase {
        match self.state {
            State::Idle => FadePhase::Idle,
            State::Showing { .. } => FadePhase::Showing,
            State::Settled { .. } => FadePhase::Settled,
            State::Engaged => FadePhase::Engaged,
            State::Fading { .. } => FadePhase::Fading,
            State::Faded => FadePhase::Faded,
        }
    }

    /// The single outstanding deadline, when one exists. Callers use this
    /// to size their poll timeout.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            State::Showing { fallback_at } => Some(fallback_at),
            State::Settled { fade_at } => Some(fade_at),
            State::Fading { started } => Some(started + self.animation),
            State::Idle | State::Engaged | State::Faded => None,
        }
    }

    #[must_use]
    pub const fn is_pointer_over(&self) -> bool {
        self.pointer_over
    }

    fn snapshot(&mut self, config: &FadeConfig) {
        self.delay = config.delay();
        self.animation = config.animation();
        self.entrance_fallback = config.entrance_fallback();
        self.target_opacity = config.target_opacity;
    }

    fn settled_state(&self, now: Instant) -> State {
        if self.pointer_over {
            State::Engaged
        } else {
            State::Settled {
                fade_at: now + self.delay,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FadeConfig {
        FadeConfig {
            delay_seconds: 10.0,
            target_opacity: 0.4,
            animation_ms: 1_000,
            entrance_fallback_ms: 2_000,
        }
    }

    fn shown(now: Instant) -> FadeTimer {
        let cfg = config();
        let mut timer = FadeTimer::new(&cfg);
        timer.show(now, &cfg);
        timer
    }

    #[test]
    fn show_enters_showing_at_full_opacity() {
        let now = Instant::now();
        let timer = shown(now);
        assert_eq!(timer.phase(), FadePhase::Showing);
        assert!((timer.opacity(now) - 1.0).abs() < f64::EPSILON);
        assert_eq!(
            timer.next_deadline(),
            Some(now + Duration::from_millis(2_000))
        );
    }

    #[test]
    fn entrance_completion_arms_countdown() {
        let now = Instant::now();
        let mut timer = shown(now);

        timer.entrance_complete(now + Duration::from_millis(300));
        assert_eq!(timer.phase(), FadePhase::Settled);
        assert_eq!(
            timer.next_deadline(),
            Some(now + Duration::from_millis(300) + Duration::from_secs(10))
        );
    }

    #[test]
    fn entrance_fallback_settles_without_signal() {
        let now = Instant::now();
        let mut timer = shown(now);

        timer.tick(now + Duration::from_millis(1_999));
        assert_eq!(timer.phase(), FadePhase::Showing);

        timer.tick(now + Duration::from_millis(2_000));
        assert_eq!(timer.phase(), FadePhase::Settled);
        // Countdown is anchored at the fallback deadline, not the tick.
        assert_eq!(
            timer.next_deadline(),
            Some(now + Duration::from_millis(2_000) + Duration::from_secs(10))
        );
    }

    #[test]
    fn countdown_elapse_starts_fade() {
        let now = Instant::now();
        let mut timer = shown(now);
        timer.entrance_complete(now);

        timer.tick(now + Duration::from_secs(10));
        assert_eq!(timer.phase(), FadePhase::Fading);
    }

    #[test]
    fn fade_interpolates_linearly() {
        let now = Instant::now();
        let mut timer = shown(now);
        timer.entrance_complete(now);
        timer.tick(now + Duration::from_secs(10));

        let halfway = now + Duration::from_secs(10) + Duration::from_millis(500);
        let expected = 1.0 - (1.0 - 0.4) * 0.5;
        assert!((timer.opacity(halfway) - expected).abs() < 1e-9);

        let done = now + Duration::from_secs(10) + Duration::from_millis(1_000);
        timer.tick(done);
        assert_eq!(timer.phase(), FadePhase::Faded);
        assert!((timer.opacity(done) - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn pointer_enter_pins_opacity_and_suspends_countdown() {
        let now = Instant::now();
        let mut timer = shown(now);
        timer.entrance_complete(now);

        timer.pointer_enter(now + Duration::from_secs(3));
        assert_eq!(timer.phase(), FadePhase::Engaged);
        assert_eq!(timer.next_deadline(), None);

        // The old countdown deadline must not fire.
        timer.tick(now + Duration::from_secs(60));
        assert_eq!(timer.phase(), FadePhase::Engaged);
        assert!((timer.opacity(now + Duration::from_secs(60)) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn pointer_enter_mid_fade_restores_full_opacity() {
        let now = Instant::now();
        let mut timer = shown(now);
        timer.entrance_complete(now);
        timer.tick(now + Duration::from_secs(10));
        assert_eq!(timer.phase(), FadePhase::Fading);

        timer.pointer_enter(now + Duration::from_secs(10) + Duration::from_millis(400));
        assert_eq!(timer.phase(), FadePhase::Engaged);
        assert!((timer.opacity(now + Duration::from_secs(11)) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn pointer_enter_when_faded_engages() {
        let now = Instant::now();
        let mut timer = shown(now);
        timer.entrance_complete(now);
        timer.tick(now + Duration::from_secs(12));
        assert_eq!(timer.phase(), FadePhase::Faded);

        timer.pointer_enter(now + Duration::from_secs(13));
        assert_eq!(timer.phase(), FadePhase::Engaged);
        assert!((timer.opacity(now + Duration::from_secs(13)) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn pointer_leave_restarts_countdown() {
        let now = Instant::now();
        let mut timer = shown(now);
        timer.entrance_complete(now);
        timer.pointer_enter(now + Duration::from_secs(1));

        let left = now + Duration::from_secs(30);
        timer.pointer_leave(left);
        assert_eq!(timer.phase(), FadePhase::Settled);
        assert_eq!(timer.next_deadline(), Some(left + Duration::from_secs(10)));
    }

    #[test]
    fn pointer_during_showing_takes_effect_on_settle() {
        let now = Instant::now();
        let mut timer = shown(now);

        timer.pointer_enter(now + Duration::from_millis(100));
        assert_eq!(timer.phase(), FadePhase::Showing);

        timer.entrance_complete(now + Duration::from_millis(500));
        assert_eq!(timer.phase(), FadePhase::Engaged);
    }

    #[test]
    fn pointer_leave_during_showing_settles_normally() {
        let now = Instant::now();
        let mut timer = shown(now);
        timer.pointer_enter(now + Duration::from_millis(100));
        timer.pointer_leave(now + Duration::from_millis(200));

        timer.entrance_complete(now + Duration::from_millis(500));
        assert_eq!(timer.phase(), FadePhase::Settled);
    }

    #[test]
    fn new_show_cancels_pending_fade() {
        let now = Instant::now();
        let mut timer = shown(now);
        timer.entrance_complete(now);
        timer.tick(now + Duration::from_secs(10));
        assert_eq!(timer.phase(), FadePhase::Fading);

        let cfg = config();
        timer.show(now + Duration::from_secs(10), &cfg);
        assert_eq!(timer.phase(), FadePhase::Showing);
        // Only the new entrance deadline remains.
        assert_eq!(
            timer.next_deadline(),
            Some(now + Duration::from_secs(10) + Duration::from_millis(2_000))
        );
    }

    #[test]
    fn show_settled_skips_entrance() {
        let now = Instant::now();
        let cfg = config();
        let mut timer = FadeTimer::new(&cfg);

        timer.show_settled(now, &cfg);
        assert_eq!(timer.phase(), FadePhase::Settled);
        assert!((timer.opacity(now) - 1.0).abs() < f64::EPSILON);
        assert_eq!(timer.next_deadline(), Some(now + Duration::from_secs(10)));
    }

    #[test]
    fn show_settled_with_pointer_over_engages() {
        let now = Instant::now();
        let cfg = config();
        let mut timer = FadeTimer::new(&cfg);
        timer.pointer_enter(now);

        timer.show_settled(now, &cfg);
        assert_eq!(timer.phase(), FadePhase::Engaged);
    }

    #[test]
    fn late_tick_passes_through_all_phases() {
        let now = Instant::now();
        let mut timer = shown(now);

        // One tick far in the future: fallback, countdown, and animation
        // deadlines have all passed.
        timer.tick(now + Duration::from_secs(60));
        assert_eq!(timer.phase(), FadePhase::Faded);
    }

    #[test]
    fn config_snapshot_taken_at_show_time() {
        let now = Instant::now();
        let mut cfg = config();
        let mut timer = FadeTimer::new(&cfg);
        timer.show_settled(now, &cfg);

        // Later shows pick up new values; armed deadlines are unaffected.
        cfg.delay_seconds = 1.0;
        assert_eq!(timer.next_deadline(), Some(now + Duration::from_secs(10)));

        timer.show_settled(now, &cfg);
        assert_eq!(timer.next_deadline(), Some(now + Duration::from_secs(1)));
    }

    #[test]
    fn clear_returns_to_idle() {
        let now = Instant::now();
        let mut timer = shown(now);
        timer.clear();
        assert_eq!(timer.phase(), FadePhase::Idle);
        assert_eq!(timer.next_deadline(), None);
    }

    #[test]
    fn zero_delay_fades_on_next_tick() {
        let now = Instant::now();
        let cfg = FadeConfig {
            delay_seconds: 0.0,
            ..config()
        };
        let mut timer = FadeTimer::new(&cfg);
        timer.show_settled(now, &cfg);

        timer.tick(now);
        assert_eq!(timer.phase(), FadePhase::Fading);
    }
}
