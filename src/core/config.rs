//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{HudError, Result};
use crate::notify::NotifyConfig;

/// Full HUD configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
#[derive(Default)]
pub struct Config {
    pub fade: FadeConfig,
    pub history: HistoryConfig,
    pub reconcile: ReconcileConfig,
    pub paths: PathsConfig,
    pub notify: NotifyConfig,
}

/// Fade-out timing and opacity knobs.
///
/// The fade timer snapshots these values when a countdown is armed, so a
/// change takes effect the next time the display is shown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FadeConfig {
    /// Seconds of full visibility before the fade animation starts.
    pub delay_seconds: f64,
    /// Opacity the display settles at once faded (0.0 = invisible).
    pub target_opacity: f64,
    /// Duration of the fade animation itself.
    pub animation_ms: u64,
    /// How long to wait for entrance-animation completion before arming
    /// the countdown anyway.
    pub entrance_fallback_ms: u64,
}

/// History buffer sizing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of events retained; oldest are evicted first.
    pub capacity: usize,
}

/// Content-resolution retry knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Grace period before retrying a failed resolution. This is a
    /// blocking wait, so it is validated to stay small.
    pub grace_ms: u64,
    /// 0 disables the grace retry; 1 enables it. The reconciler never
    /// retries more than once per resolution.
    pub max_retries: u32,
}

/// Filesystem paths used by the HUD.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    /// World-scope settings store (shared, admin-writable).
    pub world_settings_file: PathBuf,
    /// Client-scope settings store (per user).
    pub client_settings_file: PathBuf,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            delay_seconds: 10.0,
            target_opacity: 0.35,
            animation_ms: 1_000,
            entrance_fallback_ms: 2_000,
        }
    }
}

impl FadeConfig {
    /// Delay before the fade animation starts.
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_seconds.max(0.0))
    }

    /// Duration of the fade animation.
    #[must_use]
    pub const fn animation(&self) -> Duration {
        Duration::from_millis(self.animation_ms)
    }

    /// Upper bound on waiting for the entrance animation.
    #[must_use]
    pub const fn entrance_fallback(&self) -> Duration {
        Duration::from_millis(self.entrance_fallback_ms)
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { capacity: 50 }
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            grace_ms: 5,
            max_retries: 1,
        }
    }
}

impl ReconcileConfig {
    /// Grace period as a `Duration`.
    #[must_use]
    pub const fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                eprintln!(
                    "[HUD-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths"
                );
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        let cfg = home_dir.join(".config").join("chat_hud").join("config.toml");
        let data = home_dir.join(".local").join("share").join("chat_hud");
        Self {
            config_file: cfg,
            world_settings_file: data.join("world-settings.json"),
            client_settings_file: data.join("client-settings.json"),
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| HudError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(HudError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for logging.
    ///
    /// Uses FNV-1a for cross-process-stable hashing (no `DefaultHasher`
    /// whose seed may vary across Rust releases).
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        // fade
        set_env_f64("CHAT_HUD_FADE_DELAY_SECONDS", &mut self.fade.delay_seconds)?;
        set_env_f64(
            "CHAT_HUD_FADE_TARGET_OPACITY",
            &mut self.fade.target_opacity,
        )?;
        set_env_u64("CHAT_HUD_FADE_ANIMATION_MS", &mut self.fade.animation_ms)?;
        set_env_u64(
            "CHAT_HUD_FADE_ENTRANCE_FALLBACK_MS",
            &mut self.fade.entrance_fallback_ms,
        )?;

        // history
        set_env_usize("CHAT_HUD_HISTORY_CAPACITY", &mut self.history.capacity)?;

        // reconcile
        set_env_u64("CHAT_HUD_RECONCILE_GRACE_MS", &mut self.reconcile.grace_ms)?;
        set_env_u32(
            "CHAT_HUD_RECONCILE_MAX_RETRIES",
            &mut self.reconcile.max_retries,
        )?;

        // paths
        if let Some(raw) = env_var("CHAT_HUD_WORLD_SETTINGS_FILE") {
            self.paths.world_settings_file = PathBuf::from(raw);
        }
        if let Some(raw) = env_var("CHAT_HUD_CLIENT_SETTINGS_FILE") {
            self.paths.client_settings_file = PathBuf::from(raw);
        }

        // notify
        self.apply_notify_env_overrides_from(env_var)?;

        Ok(())
    }

    fn apply_notify_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("CHAT_HUD_NOTIFY_ENABLED") {
            self.notify.enabled = parse_env_bool("CHAT_HUD_NOTIFY_ENABLED", &raw)?;
        }

        if let Some(raw) = lookup("CHAT_HUD_NOTIFY_CHANNELS") {
            self.notify.channels = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(raw) = lookup("CHAT_HUD_NOTIFY_FILE") {
            self.notify.file.path = PathBuf::from(raw);
        }

        if let Some(raw) = lookup("CHAT_HUD_NOTIFY_MEMORY_CAPACITY") {
            self.notify.memory.capacity =
                parse_env_usize("CHAT_HUD_NOTIFY_MEMORY_CAPACITY", &raw)?;
        }

        // Global quiet switch: silences every notice channel.
        if let Some(raw) = lookup("CHAT_HUD_QUIET")
            && parse_env_bool("CHAT_HUD_QUIET", &raw)?
        {
            self.notify.enabled = false;
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !self.fade.delay_seconds.is_finite() || self.fade.delay_seconds < 0.0 {
            return Err(HudError::InvalidConfig {
                details: format!(
                    "fade.delay_seconds must be finite and >= 0, got {}",
                    self.fade.delay_seconds
                ),
            });
        }

        validate_unit_interval("fade.target_opacity", self.fade.target_opacity)?;

        if self.fade.animation_ms == 0 {
            return Err(HudError::InvalidConfig {
                details: "fade.animation_ms must be >= 1".to_string(),
            });
        }

        if self.fade.entrance_fallback_ms == 0 {
            return Err(HudError::InvalidConfig {
                details: "fade.entrance_fallback_ms must be >= 1".to_string(),
            });
        }

        if self.history.capacity == 0 {
            return Err(HudError::InvalidConfig {
                details: "history.capacity must be >= 1".to_string(),
            });
        }

        // The grace wait blocks the caller, so keep it short.
        if self.reconcile.grace_ms > 1_000 {
            return Err(HudError::InvalidConfig {
                details: format!(
                    "reconcile.grace_ms ({}) must be <= 1000",
                    self.reconcile.grace_ms
                ),
            });
        }

        if self.reconcile.max_retries > 1 {
            return Err(HudError::InvalidConfig {
                details: format!(
                    "reconcile.max_retries must be 0 or 1, got {}",
                    self.reconcile.max_retries
                ),
            });
        }

        if self.notify.memory.capacity == 0 {
            return Err(HudError::InvalidConfig {
                details: "notify.memory.capacity must be >= 1".to_string(),
            });
        }

        Ok(())
    }
}

fn validate_unit_interval(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(HudError::InvalidConfig {
            details: format!("{name} must be in [0,1], got {value}"),
        });
    }
    Ok(())
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn set_env_f64(name: &str, slot: &mut f64) -> Result<()> {
    if let Some(raw) = env_var(name) {
        *slot = raw.parse::<f64>().map_err(|error| HudError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })?;
    }
    Ok(())
}

fn set_env_u64(name: &str, slot: &mut u64) -> Result<()> {
    if let Some(raw) = env_var(name) {
        *slot = raw.parse::<u64>().map_err(|error| HudError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })?;
    }
    Ok(())
}

fn set_env_u32(name: &str, slot: &mut u32) -> Result<()> {
    if let Some(raw) = env_var(name) {
        *slot = raw.parse::<u32>().map_err(|error| HudError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })?;
    }
    Ok(())
}

fn set_env_usize(name: &str, slot: &mut usize) -> Result<()> {
    if let Some(raw) = env_var(name) {
        *slot = parse_env_usize(name, &raw)?;
    }
    Ok(())
}

fn parse_env_usize(name: &str, raw: &str) -> Result<usize> {
    raw.parse::<usize>().map_err(|error| HudError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    raw.parse::<bool>().map_err(|error| HudError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}
