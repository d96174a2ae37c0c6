//! Host notification surface: stderr, JSONL file, and in-memory channels.
//!
//! The navigator and dice tray report noteworthy activity (resolution
//! failures, rejected deletions, posted rolls) as structured notices.
//! Dispatch is fire-and-forget with min-level filtering per channel — a
//! failing channel never blocks or crashes the HUD.

#![allow(missing_docs)]

use std::collections::VecDeque;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

// ──────────────────── notice level ────────────────────

/// Severity level for notice filtering. Mirrors the host-side notification
/// tiers (info banner, warning toast, error toast).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

// ──────────────────── notices ────────────────────

/// A structured notice describing HUD activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HudNotice {
    /// An event id could not be resolved to content, even after the grace
    /// retry. The previous display persists.
    ResolutionFailed {
        id: String,
        attempts: u32,
        details: String,
    },
    /// The transport rejected a deletion request; the history is unchanged.
    DeletionRejected { id: String, details: String },
    /// A dice roll was composed, evaluated, and posted.
    RollPosted { formula: String, total: i64 },
    /// Roll requested with an empty tray.
    EmptyTray,
    /// Evaluating a composed formula failed.
    EvaluationFailed { formula: String, details: String },
    /// Posting an event through the transport failed.
    PostRejected { details: String },
    /// The recent-message HUD was switched on or off.
    HudToggled { enabled: bool },
    /// A settings write happened; `reload_required` mirrors the registration.
    SettingChanged { key: String, reload_required: bool },
    /// The runtime attached to / detached from the event feed.
    FeedAttached { subscription: u64 },
    FeedDetached { subscription: u64 },
}

impl HudNotice {
    /// The severity level of this notice (for min-level filtering).
    #[must_use]
    pub const fn level(&self) -> NoticeLevel {
        match self {
            Self::RollPosted { .. }
            | Self::HudToggled { .. }
            | Self::FeedAttached { .. }
            | Self::FeedDetached { .. } => NoticeLevel::Info,

            Self::ResolutionFailed { .. } | Self::EmptyTray => NoticeLevel::Warning,

            Self::SettingChanged {
                reload_required, ..
            } => {
                if *reload_required {
                    NoticeLevel::Warning
                } else {
                    NoticeLevel::Info
                }
            }

            Self::DeletionRejected { .. }
            | Self::EvaluationFailed { .. }
            | Self::PostRejected { .. } => NoticeLevel::Error,
        }
    }

    /// Short human-readable summary line.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::ResolutionFailed {
                id,
                attempts,
                details,
            } => format!("could not resolve event {id} after {attempts} attempt(s): {details}"),
            Self::DeletionRejected { id, details } => {
                format!("deletion of event {id} rejected: {details}")
            }
            Self::RollPosted { formula, total } => format!("rolled {formula} = {total}"),
            Self::EmptyTray => "select at least one die to roll".to_string(),
            Self::EvaluationFailed { formula, details } => {
                format!("evaluating {formula} failed: {details}")
            }
            Self::PostRejected { details } => format!("posting message failed: {details}"),
            Self::HudToggled { enabled } => {
                if *enabled {
                    "recent message HUD enabled".to_string()
                } else {
                    "recent message HUD disabled".to_string()
                }
            }
            Self::SettingChanged {
                key,
                reload_required,
            } => {
                if *reload_required {
                    format!("setting {key} changed (reload required)")
                } else {
                    format!("setting {key} changed")
                }
            }
            Self::FeedAttached { subscription } => {
                format!("attached to event feed (subscription {subscription})")
            }
            Self::FeedDetached { subscription } => {
                format!("detached from event feed (subscription {subscription})")
            }
        }
    }
}

// ──────────────────── configuration ────────────────────

/// Top-level notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NotifyConfig {
    /// Master switch for all notices.
    pub enabled: bool,
    /// Which channel names to activate.
    pub channels: Vec<String>,
    pub stderr: StderrConfig,
    pub file: FileConfig,
    pub memory: MemoryConfig,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            channels: vec!["stderr".to_string(), "memory".to_string()],
            stderr: StderrConfig::default(),
            file: FileConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

/// Stderr notice settings (tagged single-line records).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StderrConfig {
    pub min_level: NoticeLevel,
}

impl Default for StderrConfig {
    fn default() -> Self {
        Self {
            min_level: NoticeLevel::Warning,
        }
    }
}

/// File notice settings (append-only JSONL).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileConfig {
    pub path: PathBuf,
    pub min_level: NoticeLevel,
}

impl Default for FileConfig {
    fn default() -> Self {
        let home = std::env::var_os("HOME").map_or_else(|| PathBuf::from("/tmp"), PathBuf::from);
        Self {
            path: home
                .join(".local")
                .join("share")
                .join("chat_hud")
                .join("notices.jsonl"),
            min_level: NoticeLevel::Info,
        }
    }
}

/// In-memory ring settings. Hosts drain this ring to show notices in their
/// own UI (the stand-in for a toast stack).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MemoryConfig {
    pub capacity: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

// ──────────────────── JSONL record ────────────────────

/// A single notice record written to the JSONL file.
#[derive(Debug, Serialize)]
struct NoticeRecord {
    ts: String,
    level: NoticeLevel,
    summary: String,
    #[serde(flatten)]
    notice: HudNotice,
}

// ──────────────────── channels ────────────────────

/// A notice channel that can dispatch events.
trait NoticeChannel: Send + Sync {
    fn name(&self) -> &'static str;
    fn send(&self, notice: &HudNotice);
}

// ──── Stderr (tagged lines) ────

struct StderrChannel {
    min_level: NoticeLevel,
}

impl StderrChannel {
    const fn new(config: &StderrConfig) -> Self {
        Self {
            min_level: config.min_level,
        }
    }
}

impl NoticeChannel for StderrChannel {
    fn name(&self) -> &'static str {
        "stderr"
    }

    fn send(&self, notice: &HudNotice) {
        if notice.level() < self.min_level {
            return;
        }

        let tag = match notice.level() {
            NoticeLevel::Error => "ERROR",
            NoticeLevel::Warning => "WARN",
            NoticeLevel::Info => "INFO",
        };

        eprintln!("[HUD-NOTIFY] [{tag}] {}", notice.summary());
    }
}

// ──── File (append-only JSONL) ────

struct FileChannel {
    path: PathBuf,
    min_level: NoticeLevel,
}

impl FileChannel {
    fn new(config: &FileConfig) -> Self {
        Self {
            path: config.path.clone(),
            min_level: config.min_level,
        }
    }
}

impl NoticeChannel for FileChannel {
    fn name(&self) -> &'static str {
        "file"
    }

    fn send(&self, notice: &HudNotice) {
        if notice.level() < self.min_level {
            return;
        }

        let record = NoticeRecord {
            ts: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            level: notice.level(),
            summary: notice.summary(),
            notice: notice.clone(),
        };

        let Ok(json) = serde_json::to_string(&record) else {
            return;
        };

        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{json}");
        }
    }
}

// ──── Memory (bounded ring the host can drain) ────

/// Bounded in-memory notice ring. Oldest notices are dropped once the
/// capacity is reached.
pub struct MemoryChannel {
    capacity: usize,
    ring: Mutex<VecDeque<HudNotice>>,
}

impl MemoryChannel {
    /// Create a ring with the given capacity (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            ring: Mutex::new(VecDeque::new()),
        }
    }

    /// Remove and return all buffered notices, oldest first.
    pub fn drain(&self) -> Vec<HudNotice> {
        self.ring.lock().drain(..).collect()
    }

    /// Copy of the buffered notices, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<HudNotice> {
        self.ring.lock().iter().cloned().collect()
    }

    /// Number of buffered notices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.lock().len()
    }

    /// Whether the ring is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.lock().is_empty()
    }
}

impl NoticeChannel for MemoryChannel {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn send(&self, notice: &HudNotice) {
        let mut ring = self.ring.lock();
        if ring.len() == self.capacity {
            ring.pop_front();
        }
        ring.push_back(notice.clone());
    }
}

// ──────────────────── notifier ────────────────────

/// Coordinates dispatching notices to all enabled channels.
///
/// Cheap to call — each channel's `send()` is fire-and-forget (stderr write,
/// file append, ring push). Notice failures never propagate.
pub struct Notifier {
    channels: Vec<Box<dyn NoticeChannel>>,
    memory: Option<Arc<MemoryChannel>>,
    enabled: bool,
    sent: u64,
}

impl Notifier {
    /// Build a notifier from configuration.
    #[must_use]
    pub fn from_config(config: &NotifyConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }

        let mut channels: Vec<Box<dyn NoticeChannel>> = Vec::new();
        let mut memory = None;

        for channel_name in &config.channels {
            match channel_name.as_str() {
                "stderr" => channels.push(Box::new(StderrChannel::new(&config.stderr))),
                "file" => channels.push(Box::new(FileChannel::new(&config.file))),
                "memory" => {
                    let ring = Arc::new(MemoryChannel::new(config.memory.capacity));
                    memory = Some(Arc::clone(&ring));
                    channels.push(Box::new(SharedMemoryChannel(ring)));
                }
                _ => {
                    // Unknown channel name — skip silently.
                }
            }
        }

        Self {
            channels,
            memory,
            enabled: true,
            sent: 0,
        }
    }

    /// Create a disabled (no-op) notifier.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            channels: Vec::new(),
            memory: None,
            enabled: false,
            sent: 0,
        }
    }

    /// Dispatch a notice to all enabled channels.
    pub fn notify(&mut self, notice: &HudNotice) {
        if !self.enabled {
            return;
        }

        self.sent += 1;
        for channel in &self.channels {
            channel.send(notice);
        }
    }

    /// Handle to the in-memory ring, when the `memory` channel is active.
    #[must_use]
    pub fn memory(&self) -> Option<Arc<MemoryChannel>> {
        self.memory.as_ref().map(Arc::clone)
    }

    /// Number of active channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Whether the notifier is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Total notices dispatched since construction.
    #[must_use]
    pub const fn sent_count(&self) -> u64 {
        self.sent
    }

    /// List the names of active channels.
    #[must_use]
    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }
}

/// Adapter so the notifier can hand out the ring while also owning a
/// channel slot for it.
struct SharedMemoryChannel(Arc<MemoryChannel>);

impl NoticeChannel for SharedMemoryChannel {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn send(&self, notice: &HudNotice) {
        self.0.send(notice);
    }
}

// ──────────────────── tests ────────────────────
