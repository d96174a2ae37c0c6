//! Shared fixtures for the integration suites.

// Each test binary compiles its own copy; not every binary uses every
// helper.
#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;

use chat_hud::core::config::Config;
use chat_hud::dice::DiceEvaluator;
use chat_hud::event::{EventSource, MemoryTransport, ScriptedRenderer};
use chat_hud::notify::{MemoryChannel, NotifyConfig};
use chat_hud::runtime::HudRuntime;

/// A fully wired runtime over an in-memory transport, with notices
/// captured in memory and settings persisted into a temp dir.
pub struct Fixture {
    pub runtime: HudRuntime,
    pub transport: Arc<MemoryTransport>,
    pub notices: Arc<MemoryChannel>,
    pub renderer: Arc<ScriptedRenderer>,
    /// Keeps the settings files alive for the fixture's lifetime.
    pub dir: TempDir,
}

/// Test timings: 1 ms grace, 2 s fade delay, 1 s animation, 500 ms
/// entrance fallback. Everything is driven with synthetic instants, so
/// only the grace period is ever actually waited out.
pub fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.fade.delay_seconds = 2.0;
    config.fade.entrance_fallback_ms = 500;
    config.reconcile.grace_ms = 1;
    config.paths.world_settings_file = dir.path().join("world.json");
    config.paths.client_settings_file = dir.path().join("client.json");
    config.notify = NotifyConfig {
        channels: vec!["memory".to_string()],
        ..NotifyConfig::default()
    };
    config
}

pub fn fixture() -> Fixture {
    fixture_with(|_| {})
}

pub fn fixture_with(tweak: impl FnOnce(&mut Config)) -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = test_config(&dir);
    tweak(&mut config);

    let transport = Arc::new(MemoryTransport::new());
    let renderer = Arc::new(ScriptedRenderer::new());

    let runtime = HudRuntime::init(
        config,
        Arc::clone(&transport) as Arc<dyn EventSource>,
        Box::new(SharedRenderer(Arc::clone(&renderer))),
        Box::new(DiceEvaluator::seeded(17)),
        Box::new(DiceEvaluator::seeded(23)),
    )
    .expect("runtime init");
    let notices = runtime
        .navigator()
        .notifier()
        .memory()
        .expect("memory channel configured");

    Fixture {
        runtime,
        transport,
        notices,
        renderer,
        dir,
    }
}

/// Lets the test hold the scripted renderer while the reconciler owns a
/// boxed handle to it.
struct SharedRenderer(Arc<ScriptedRenderer>);

impl chat_hud::event::ContentRenderer for SharedRenderer {
    fn render(
        &self,
        event: &chat_hud::event::ChatEvent,
    ) -> chat_hud::core::errors::Result<chat_hud::event::RenderOutcome> {
        self.0.render(event)
    }
}
