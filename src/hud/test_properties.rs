//! Property-based tests for HUD state invariants.
//!
//! Uses `proptest` to verify that arbitrary operation sequences maintain
//! the critical invariants: the history cursor stays valid, the buffer
//! stays bounded, the fade machine never holds more than one deadline,
//! opacity stays within the configured range, and the navigator keeps
//! history and transport in agreement.

use std::sync::Arc;
use std::time::{Duration, Instant};

use proptest::prelude::*;

use super::fade::{FadePhase, FadeTimer};
use super::history::HistoryBuffer;
use super::navigator::Navigator;
use super::reconcile::Reconciler;
use crate::core::config::{Config, FadeConfig};
use crate::dice::DiceEvaluator;
use crate::event::{CompactRenderer, EventSource, MemoryTransport, MessageKind};
use crate::notify::{MemoryChannel, Notifier, NotifyConfig};

// ──────────────────── strategies ────────────────────

#[derive(Debug, Clone)]
enum HistoryOp {
    Append(u8),
    Remove(u8),
    Move(i64),
}

fn arb_history_op() -> impl Strategy<Value = HistoryOp> {
    prop_oneof![
        (0u8..40).prop_map(HistoryOp::Append),
        (0u8..40).prop_map(HistoryOp::Remove),
        (-5i64..=5).prop_map(HistoryOp::Move),
    ]
}

fn apply_history_op(buffer: &mut HistoryBuffer, op: HistoryOp) {
    match op {
        HistoryOp::Append(n) => buffer.append(format!("msg-{n}")),
        HistoryOp::Remove(n) => {
            buffer.remove(&format!("msg-{n}"));
        }
        HistoryOp::Move(delta) => {
            buffer.move_cursor(delta);
        }
    }
}

#[derive(Debug, Clone)]
enum FadeOp {
    Show,
    ShowSettled,
    EntranceComplete,
    PointerEnter,
    PointerLeave,
    Clear,
    Advance(u64),
}

fn arb_fade_op() -> impl Strategy<Value = FadeOp> {
    prop_oneof![
        Just(FadeOp::Show),
        Just(FadeOp::ShowSettled),
        Just(FadeOp::EntranceComplete),
        Just(FadeOp::PointerEnter),
        Just(FadeOp::PointerLeave),
        Just(FadeOp::Clear),
        // Spans the fallback, countdown, and animation deadlines.
        (0u64..15_000).prop_map(FadeOp::Advance),
    ]
}

#[derive(Debug, Clone)]
enum NavOp {
    Post,
    Prev,
    Next,
    Delete,
    Refresh,
    PointerEnter,
    PointerLeave,
    EntranceComplete,
    Advance(u64),
}

fn arb_nav_op() -> impl Strategy<Value = NavOp> {
    prop_oneof![
        Just(NavOp::Post),
        Just(NavOp::Prev),
        Just(NavOp::Next),
        Just(NavOp::Delete),
        Just(NavOp::Refresh),
        Just(NavOp::PointerEnter),
        Just(NavOp::PointerLeave),
        Just(NavOp::EntranceComplete),
        (0u64..15_000).prop_map(NavOp::Advance),
    ]
}

fn fresh_navigator(source: &Arc<MemoryTransport>) -> (Navigator, Arc<MemoryChannel>) {
    let mut config = Config::default();
    // Small capacity so eviction is exercised; zero grace keeps sequences fast.
    config.history.capacity = 4;
    config.reconcile.grace_ms = 0;

    let reconciler = Reconciler::new(
        Box::new(CompactRenderer::new()),
        Box::new(DiceEvaluator::seeded(5)),
        &config.reconcile,
    );
    let notifier = Notifier::from_config(&NotifyConfig {
        channels: vec!["memory".to_string()],
        ..NotifyConfig::default()
    });
    let notices = notifier.memory().expect("memory channel configured");

    let source: Arc<dyn EventSource> = Arc::<MemoryTransport>::clone(source);
    (
        Navigator::new(&config, source, reconciler, notifier),
        notices,
    )
}

// ──────────────────── invariant helpers ────────────────────

fn assert_history_invariants(buffer: &HistoryBuffer) {
    assert!(
        buffer.len() <= buffer.capacity(),
        "buffer len {} exceeds capacity {}",
        buffer.len(),
        buffer.capacity()
    );

    match buffer.cursor_index() {
        None => assert!(buffer.is_empty(), "cursor cleared while entries remain"),
        Some(cursor) => {
            assert!(
                cursor < buffer.len(),
                "cursor {cursor} out of bounds for len {}",
                buffer.len()
            );
        }
    }

    if buffer.is_empty() {
        assert!(
            buffer.is_at_start() && buffer.is_at_end(),
            "empty buffer must report both boundaries"
        );
    }
}

fn assert_fade_invariants(timer: &FadeTimer, now: Instant, target: f64) {
    let opacity = timer.opacity(now);
    assert!(
        opacity <= 1.0 + f64::EPSILON,
        "opacity {opacity} above full in phase {:?}",
        timer.phase()
    );
    assert!(
        opacity >= target - f64::EPSILON,
        "opacity {opacity} below target {target} in phase {:?}",
        timer.phase()
    );

    // At most one deadline, and only in the waiting phases.
    match timer.phase() {
        FadePhase::Showing | FadePhase::Settled | FadePhase::Fading => {
            let deadline = timer.next_deadline();
            assert!(
                deadline.is_some(),
                "phase {:?} must carry a deadline",
                timer.phase()
            );
            // This helper runs right after a tick, so the deadline cannot
            // already be due.
            assert!(
                deadline.is_some_and(|d| d > now),
                "stale deadline survived tick in phase {:?}",
                timer.phase()
            );
        }
        FadePhase::Idle | FadePhase::Engaged | FadePhase::Faded => {
            assert!(
                timer.next_deadline().is_none(),
                "phase {:?} must not carry a deadline",
                timer.phase()
            );
        }
    }

    if timer.phase() == FadePhase::Engaged {
        assert!(
            timer.is_pointer_over(),
            "engaged phase without pointer presence"
        );
        assert!(
            (opacity - 1.0).abs() < f64::EPSILON,
            "engaged phase must pin opacity to full"
        );
    }
}

fn assert_navigator_invariants(nav: &Navigator, source: &MemoryTransport, now: Instant) {
    assert_history_invariants(nav.history());

    // Display and fade lifecycle move together.
    assert_eq!(
        nav.display().is_some(),
        nav.phase() != FadePhase::Idle,
        "display presence must match fade phase {:?}",
        nav.phase()
    );

    // Affordances reflect the cursor position.
    if let Some(cursor) = nav.history().cursor_index() {
        assert_eq!(nav.can_go_prev(), cursor > 0, "prev affordance mismatch");
        assert_eq!(
            nav.can_go_next(),
            cursor + 1 < nav.history().len(),
            "next affordance mismatch"
        );
    } else {
        assert!(!nav.can_go_prev() && !nav.can_go_next());
    }

    // Deletions keep history and transport in sync: every retained id
    // still exists upstream.
    for id in nav.history().ids() {
        assert!(
            source
                .event_by_id(id)
                .expect("memory transport lookups are infallible")
                .is_some(),
            "history retains {id} that the transport no longer has"
        );
    }

    // Default target opacity is 0.35.
    let opacity = nav.opacity(now);
    assert!((0.35 - f64::EPSILON..=1.0 + f64::EPSILON).contains(&opacity));
}

// ──────────────────── property tests ────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any sequence of appends, removals, and moves keeps the cursor
    /// valid and the buffer bounded.
    #[test]
    fn history_ops_preserve_invariants(
        capacity in 1usize..8,
        ops in prop::collection::vec(arb_history_op(), 1..60)
    ) {
        let mut buffer = HistoryBuffer::new(capacity);
        for op in ops {
            apply_history_op(&mut buffer, op);
            assert_history_invariants(&buffer);
        }
    }

    /// Appending always parks the cursor on the newest entry, regardless
    /// of what came before.
    #[test]
    fn append_parks_cursor_at_end(
        ops in prop::collection::vec(arb_history_op(), 0..40),
        id in 0u8..40
    ) {
        let mut buffer = HistoryBuffer::new(5);
        for op in ops {
            apply_history_op(&mut buffer, op);
        }

        let expected = format!("msg-{id}");
        buffer.append(expected.clone());
        prop_assert!(buffer.is_at_end());
        prop_assert_eq!(buffer.current(), Some(expected.as_str()));
    }

    /// Navigation never grows or shrinks the buffer.
    #[test]
    fn moves_never_change_contents(
        deltas in prop::collection::vec(-5i64..=5, 1..30)
    ) {
        let mut buffer = HistoryBuffer::new(10);
        for n in 0..6 {
            buffer.append(format!("msg-{n}"));
        }
        let before: Vec<String> = buffer.ids().map(str::to_string).collect();

        for delta in deltas {
            buffer.move_cursor(delta);
            assert_history_invariants(&buffer);
        }

        let after: Vec<String> = buffer.ids().map(str::to_string).collect();
        prop_assert_eq!(before, after);
    }

    /// The fade machine holds at most one deadline and keeps opacity in
    /// `[target, 1]` across arbitrary trigger/timer interleavings.
    #[test]
    fn fade_ops_preserve_invariants(
        ops in prop::collection::vec(arb_fade_op(), 1..60)
    ) {
        let config = FadeConfig::default();
        let mut timer = FadeTimer::new(&config);
        let mut now = Instant::now();

        for op in ops {
            match op {
                FadeOp::Show => timer.show(now, &config),
                FadeOp::ShowSettled => timer.show_settled(now, &config),
                FadeOp::EntranceComplete => timer.entrance_complete(now),
                FadeOp::PointerEnter => timer.pointer_enter(now),
                FadeOp::PointerLeave => timer.pointer_leave(now),
                FadeOp::Clear => timer.clear(),
                FadeOp::Advance(ms) => now += Duration::from_millis(ms),
            }
            timer.tick(now);
            assert_fade_invariants(&timer, now, config.target_opacity);
        }
    }

    /// While the pointer is over the HUD, no amount of elapsed time dims
    /// the content.
    #[test]
    fn hovered_content_never_fades(
        advances in prop::collection::vec(1u64..60_000, 1..20)
    ) {
        let config = FadeConfig::default();
        let mut timer = FadeTimer::new(&config);
        let mut now = Instant::now();

        timer.show_settled(now, &config);
        timer.pointer_enter(now);

        for ms in advances {
            now += Duration::from_millis(ms);
            timer.tick(now);
            prop_assert_eq!(timer.phase(), FadePhase::Engaged);
            prop_assert!((timer.opacity(now) - 1.0).abs() < f64::EPSILON);
        }
    }

    /// Arbitrary interleavings of feed posts, navigation, deletion, and
    /// timer traffic keep the navigator, history, and transport agreeing,
    /// and a healthy feed never produces a notice.
    #[test]
    fn navigator_ops_preserve_invariants(
        ops in prop::collection::vec(arb_nav_op(), 1..40)
    ) {
        let source = Arc::new(MemoryTransport::new());
        let (mut nav, notices) = fresh_navigator(&source);
        let mut now = Instant::now();
        let mut posted = 0u32;

        for op in ops {
            match op {
                NavOp::Post => {
                    posted += 1;
                    let event = source
                        .post("prop", MessageKind::Ooc, &format!("body {posted}"))
                        .expect("memory transport post");
                    nav.on_new_event(now, &event.id);
                }
                NavOp::Prev => nav.navigate(now, -1),
                NavOp::Next => nav.navigate(now, 1),
                NavOp::Delete => nav.delete_current(now),
                NavOp::Refresh => nav.refresh(now),
                NavOp::PointerEnter => nav.pointer_enter(now),
                NavOp::PointerLeave => nav.pointer_leave(now),
                NavOp::EntranceComplete => nav.entrance_complete(now),
                NavOp::Advance(ms) => now += Duration::from_millis(ms),
            }
            nav.tick(now);
            assert_navigator_invariants(&nav, &source, now);
        }

        prop_assert!(
            notices.is_empty(),
            "healthy-feed sequence produced notices: {:?}",
            notices.snapshot()
        );
    }
}

// ──────────────────── non-proptest invariant tests ────────────────────

#[test]
fn move_cursor_extreme_deltas_clamp() {
    let mut buffer = HistoryBuffer::new(5);
    for n in 0..5 {
        buffer.append(format!("msg-{n}"));
    }

    buffer.move_cursor(i64::MIN);
    assert_eq!(buffer.cursor_index(), Some(0));

    buffer.move_cursor(i64::MAX);
    assert_eq!(buffer.cursor_index(), Some(4));
}

#[test]
fn capacity_one_buffer_always_shows_newest() {
    let mut buffer = HistoryBuffer::new(1);
    for n in 0..10 {
        buffer.append(format!("msg-{n}"));
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.current(), Some(format!("msg-{n}").as_str()));
        assert!(buffer.is_at_start() && buffer.is_at_end());
    }
}
