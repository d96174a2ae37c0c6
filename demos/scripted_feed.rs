//! Run the HUD headless over a scripted feed and print each frame change.
//!
//! Usage:
//!   cargo run --example scripted_feed
//!
//! Demonstrates library-only usage: in-memory transport, runtime lifecycle,
//! navigation, a pending roll finalized mid-stream, and the fade timeline.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chat_hud::core::config::Config;
use chat_hud::dice::{DiceEvaluator, Die};
use chat_hud::event::{EventDraft, EventSource, MemoryTransport, MessageKind, RollPayload};
use chat_hud::notify::NotifyConfig;
use chat_hud::runtime::{HudInput, HudRuntime};

fn main() {
    let mut config = Config::default();
    // Compressed timeline so the whole lifecycle fits in a few seconds.
    config.fade.delay_seconds = 1.5;
    config.fade.entrance_fallback_ms = 300;
    config.fade.animation_ms = 500;
    config.notify = NotifyConfig {
        channels: vec!["stderr".to_string()],
        ..NotifyConfig::default()
    };

    let transport = Arc::new(MemoryTransport::new());
    let mut runtime = HudRuntime::init(
        config,
        Arc::clone(&transport) as Arc<dyn EventSource>,
        Box::new(chat_hud::event::CompactRenderer::new()),
        Box::new(DiceEvaluator::seeded(42)),
        Box::new(DiceEvaluator::seeded(7)),
    )
    .expect("runtime init");
    runtime.set_user_name("Watcher");

    // Feeder thread: a short scene, then a roll that finalizes late.
    let feed = Arc::clone(&transport);
    let feeder = thread::spawn(move || {
        let lines = [
            ("Alice", MessageKind::Ooc, "everyone ready?"),
            ("Bob", MessageKind::Ic, "The torch gutters in the draft."),
            ("Cara", MessageKind::Emote, "draws her blade"),
        ];
        for (author, kind, body) in lines {
            feed.post(author, kind, body).expect("post");
            thread::sleep(Duration::from_millis(400));
        }

        let pending = feed
            .post_event(EventDraft {
                speaker: None,
                author: Some("Bob".to_string()),
                kind: MessageKind::Roll,
                body: String::new(),
                roll: Some(RollPayload::Pending {
                    formula: "1d20 + 3".to_string(),
                }),
            })
            .expect("post pending roll");
        thread::sleep(Duration::from_millis(400));
        pending.id
    });

    let started = Instant::now();
    let mut last_line = String::new();
    while started.elapsed() < Duration::from_secs(6) {
        let now = Instant::now();
        runtime.poll(now);
        print_frame_changes(&runtime, now, &mut last_line);
        thread::sleep(Duration::from_millis(50));
    }
    let roll_id = feeder.join().expect("feeder thread");
    println!("--- scripted feed done (pending roll was {roll_id}) ---");

    // Page back through what accumulated, then post a tray roll.
    let now = Instant::now();
    runtime.handle(HudInput::PrevPressed, now);
    print_frame_changes(&runtime, now, &mut last_line);
    runtime.handle(HudInput::PrevPressed, now);
    print_frame_changes(&runtime, now, &mut last_line);

    runtime.tray_mut().add_die(Die::D6);
    runtime.tray_mut().add_die(Die::D6);
    runtime.tray_mut().bump_modifier(2);
    runtime.post_roll();
    let now = Instant::now();
    runtime.poll(now);
    print_frame_changes(&runtime, now, &mut last_line);

    runtime.teardown().expect("teardown");
    println!("--- detached ---");
}

fn print_frame_changes(runtime: &HudRuntime, now: Instant, last_line: &mut String) {
    let frame = runtime.frame(now);
    let line = frame.content.as_ref().map_or_else(
        || "(hidden)".to_string(),
        |content| {
            format!(
                "{} {}  {}: {}  (opacity {:.2})",
                if frame.prev_enabled { "<" } else { " " },
                if frame.next_enabled { ">" } else { " " },
                content.speaker,
                content.body,
                frame.opacity,
            )
        },
    );
    if line != *last_line {
        println!("{line}");
        *last_line = line;
    }
}
