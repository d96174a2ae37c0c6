//! Interactive terminal HUD over a random in-memory feed.
//!
//! Usage:
//!   cargo run --example terminal_hud
//!
//! Arrow keys page history, Delete removes the shown message, `r`
//! refreshes, mouse-over the HUD band pauses the fade, `q` quits.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, MouseEventKind};

use chat_hud::core::config::Config;
use chat_hud::dice::DiceEvaluator;
use chat_hud::event::{CompactRenderer, EventSource, MemoryTransport, MessageKind};
use chat_hud::notify::NotifyConfig;
use chat_hud::runtime::HudRuntime;
use chat_hud::term::paint::HUD_ROWS;
use chat_hud::term::{HoverTracker, TermCommand, TerminalGuard, paint, translate_key};

const HUD_TOP: u16 = 1;

fn main() -> io::Result<()> {
    let mut config = Config::default();
    config.fade.delay_seconds = 4.0;
    config.fade.entrance_fallback_ms = 400;
    config.notify = NotifyConfig {
        enabled: false,
        ..NotifyConfig::default()
    };

    let transport = Arc::new(MemoryTransport::new());
    let mut runtime = HudRuntime::init(
        config,
        Arc::clone(&transport) as Arc<dyn EventSource>,
        Box::new(CompactRenderer::new()),
        Box::new(DiceEvaluator::new()),
        Box::new(DiceEvaluator::new()),
    )
    .expect("runtime init");

    let stop = Arc::new(AtomicBool::new(false));
    let feeder = spawn_feeder(Arc::clone(&transport), Arc::clone(&stop));

    let guard = TerminalGuard::new()?;
    let result = run(&mut runtime, &guard);

    stop.store(true, Ordering::Relaxed);
    drop(guard);
    feeder.join().expect("feeder thread");
    runtime.teardown().expect("teardown");
    result
}

fn run(runtime: &mut HudRuntime, _guard: &TerminalGuard) -> io::Result<()> {
    let mut stdout = io::stdout();
    let mut hover = HoverTracker::new();
    let band = HUD_TOP..HUD_TOP + HUD_ROWS;

    loop {
        if event::poll(Duration::from_millis(50))? {
            let now = Instant::now();
            match event::read()? {
                Event::Key(key) => match translate_key(&key) {
                    Some(TermCommand::Quit) => return Ok(()),
                    Some(TermCommand::Hud(input)) => runtime.handle(input, now),
                    None => {}
                },
                Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Moved) => {
                    if let Some(input) = hover.observe(mouse.row, &band) {
                        runtime.handle(input, now);
                    }
                }
                _ => {}
            }
        }

        let now = Instant::now();
        runtime.poll(now);
        let (cols, _rows) = TerminalGuard::size();
        paint(&mut stdout, &runtime.frame(now), cols, HUD_TOP)?;
    }
}

fn spawn_feeder(
    transport: Arc<MemoryTransport>,
    stop: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        use rand::Rng;
        let mut rng = rand::rng();
        let authors = ["Alice", "Bob", "Cara", "Dmitri"];
        let bodies = [
            "the corridor forks here",
            "I check the door for traps",
            "we should rest before the descent",
            "who has the rope?",
            "something moves in the dark",
        ];
        while !stop.load(Ordering::Relaxed) {
            let author = authors[rng.random_range(0..authors.len())];
            let body = bodies[rng.random_range(0..bodies.len())];
            let kind = if rng.random_bool(0.2) {
                MessageKind::Emote
            } else {
                MessageKind::Ooc
            };
            transport.post(author, kind, body).expect("post");
            thread::sleep(Duration::from_millis(rng.random_range(1_500..4_000)));
        }
    })
}
