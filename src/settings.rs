//! Registration-based typed settings with per-scope JSON persistence.
//!
//! Settings must be registered before they can be read or written; an
//! unregistered key is a structured error, never a silent default. Each
//! scope persists to its own JSON file with an atomic write (temp file,
//! fsync, rename), and loading tolerates missing files and ignores keys
//! that are no longer registered.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write as _};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::errors::{HudError, Result};
use crate::sidebar::SidebarTab;

/// Well-known setting keys.
pub mod keys {
    /// Hide the HUD navigation buttons for everyone. World, reload.
    pub const HIDE_NAV_BUTTONS_ALL: &str = "hide_nav_buttons_all";
    /// Hide the HUD navigation buttons for non-GM users only. World, reload.
    pub const HIDE_NAV_BUTTONS_FOR_PLAYERS: &str = "hide_nav_buttons_for_players";
    /// Omit roll totals from rendered roll cards. World, reload.
    pub const HIDE_TOTAL_RESULT: &str = "hide_total_result";
    /// Hide the advantage/disadvantage toggles on the dice tray. World, reload.
    pub const HIDE_ADV_DISADV: &str = "hide_adv_disadv";
    /// The HUD enable toggle. Client scope, applied live.
    pub const SHOW_RECENT_MESSAGE: &str = "show_recent_message";
    /// Persisted drag position, or null for the anchored default. Client.
    pub const HUD_POSITION: &str = "hud_position";
}

// ──────────────────── value model ────────────────────

/// Who a setting belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingScope {
    /// Shared, admin-writable, synced to players.
    World,
    /// Per-user.
    Client,
}

/// A typed setting value. Serializes untagged, so world files read as
/// plain JSON objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Json(serde_json::Value),
}

impl SettingValue {
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            Self::Json(_) => None,
        }
    }

    /// Type label used in mismatch errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Json(_) => "json",
        }
    }

    fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(b) => Self::Bool(b),
            other => Self::Json(other),
        }
    }
}

/// Callback fired whenever the setting is written.
pub type ChangeHook = Box<dyn FnMut(&SettingValue) + Send>;

/// Declaration of one setting.
pub struct SettingSpec {
    pub key: String,
    pub label: String,
    pub hint: String,
    pub scope: SettingScope,
    pub default: SettingValue,
    pub reload_required: bool,
    pub on_change: Option<ChangeHook>,
}

impl SettingSpec {
    #[must_use]
    pub fn bool(key: impl Into<String>, scope: SettingScope, default: bool) -> Self {
        Self {
            key: key.into(),
            label: String::new(),
            hint: String::new(),
            scope,
            default: SettingValue::Bool(default),
            reload_required: false,
            on_change: None,
        }
    }

    #[must_use]
    pub fn json(key: impl Into<String>, scope: SettingScope, default: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            label: String::new(),
            hint: String::new(),
            scope,
            default: SettingValue::Json(default),
            reload_required: false,
            on_change: None,
        }
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }

    #[must_use]
    pub fn reload_required(mut self) -> Self {
        self.reload_required = true;
        self
    }

    #[must_use]
    pub fn on_change(mut self, hook: impl FnMut(&SettingValue) + Send + 'static) -> Self {
        self.on_change = Some(Box::new(hook));
        self
    }
}

/// Registration metadata for one key, for hosts building a settings UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingDescriptor<'a> {
    pub label: &'a str,
    pub hint: &'a str,
    pub scope: SettingScope,
    pub reload_required: bool,
    pub default: &'a SettingValue,
}

struct Entry {
    label: String,
    hint: String,
    scope: SettingScope,
    default: SettingValue,
    reload_required: bool,
    value: SettingValue,
    hook: Option<ChangeHook>,
}

// ──────────────────── service ────────────────────

/// The settings store. Keys iterate in sorted order, so persisted files
/// are stable.
#[derive(Default)]
pub struct SettingsService {
    entries: BTreeMap<String, Entry>,
}

impl SettingsService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A service with the standard HUD registrations in place.
    pub fn with_standard() -> Result<Self> {
        let mut service = Self::new();
        for spec in standard_registrations() {
            service.register(spec)?;
        }
        Ok(service)
    }

    /// Declare a setting. Registering a key twice is an error.
    pub fn register(&mut self, spec: SettingSpec) -> Result<()> {
        if self.entries.contains_key(&spec.key) {
            return Err(HudError::settings(spec.key, "already registered"));
        }
        self.entries.insert(
            spec.key,
            Entry {
                label: spec.label,
                hint: spec.hint,
                scope: spec.scope,
                value: spec.default.clone(),
                default: spec.default,
                reload_required: spec.reload_required,
                hook: spec.on_change,
            },
        );
        Ok(())
    }

    #[must_use]
    pub fn is_registered(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Current value of a registered key.
    pub fn get(&self, key: &str) -> Result<&SettingValue> {
        self.entries
            .get(key)
            .map(|entry| &entry.value)
            .ok_or_else(|| HudError::settings(key, "not registered"))
    }

    /// Current value of a registered boolean key.
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        let value = self.get(key)?;
        value
            .as_bool()
            .ok_or_else(|| HudError::settings(key, format!("expected bool, found {}", value.kind())))
    }

    /// Write a registered key, firing its change hook. The value must
    /// match the registered default's type. Returns whether the host
    /// should prompt for a reload.
    pub fn set(&mut self, key: &str, value: SettingValue) -> Result<bool> {
        let entry = self
            .entries
            .get_mut(key)
            .ok_or_else(|| HudError::settings(key, "not registered"))?;
        if value.kind() != entry.default.kind() {
            return Err(HudError::settings(
                key,
                format!("expected {} value, got {}", entry.default.kind(), value.kind()),
            ));
        }

        let Entry {
            value: slot,
            hook,
            reload_required,
            ..
        } = entry;
        *slot = value;
        if let Some(hook) = hook {
            hook(slot);
        }
        Ok(*reload_required)
    }

    /// Registration metadata for a key.
    pub fn describe(&self, key: &str) -> Result<SettingDescriptor<'_>> {
        self.entries
            .get(key)
            .map(|entry| SettingDescriptor {
                label: &entry.label,
                hint: &entry.hint,
                scope: entry.scope,
                reload_required: entry.reload_required,
                default: &entry.default,
            })
            .ok_or_else(|| HudError::settings(key, "not registered"))
    }

    /// Registered keys in sorted order.
    pub fn registered_keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Persist every value in `scope` as a JSON object. Atomic: the file
    /// never holds a partial write.
    pub fn save_scope(&self, scope: SettingScope, path: &Path) -> Result<()> {
        let values: BTreeMap<&str, &SettingValue> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.scope == scope)
            .map(|(key, entry)| (key.as_str(), &entry.value))
            .collect();
        let json = serde_json::to_string_pretty(&values)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| HudError::io(parent, e))?;
        }

        let tmp = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp).map_err(|e| HudError::io(&tmp, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| HudError::io(&tmp, e))?;
            file.sync_all().map_err(|e| HudError::io(&tmp, e))?;
        }
        fs::rename(&tmp, path).map_err(|e| HudError::io(path, e))?;
        Ok(())
    }

    /// Load values for `scope` from a JSON object written by
    /// [`save_scope`](Self::save_scope).
    ///
    /// Keys that are unregistered, belong to the other scope, or no longer
    /// match the registered type are skipped. A missing file loads nothing.
    /// Hooks do not fire; this seeds initial state. Returns the number of
    /// values applied.
    pub fn load_scope(&mut self, scope: SettingScope, path: &Path) -> Result<usize> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(HudError::io(path, e)),
        };
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(&content)?;

        let mut applied = 0;
        for (key, value) in raw {
            let Some(entry) = self.entries.get_mut(&key) else {
                continue;
            };
            if entry.scope != scope {
                continue;
            }
            let value = SettingValue::from_json(value);
            if value.kind() != entry.default.kind() {
                continue;
            }
            entry.value = value;
            applied += 1;
        }
        Ok(applied)
    }

    /// Copy the standard sync key set from a GM/world store, firing hooks.
    ///
    /// Client-only settings are never synced. Keys missing on either side
    /// are skipped. Returns the keys whose value actually changed.
    pub fn sync_from(&mut self, source: &Self) -> Vec<String> {
        let mut changed = Vec::new();
        for key in sync_keys() {
            let Ok(value) = source.get(key) else {
                continue;
            };
            let value = value.clone();
            let differs = self.get(key).is_ok_and(|current| *current != value);
            if self.set(key, value).is_ok() && differs {
                changed.push(key.to_string());
            }
        }
        changed
    }
}

impl std::fmt::Debug for SettingsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsService")
            .field("registered", &self.entries.len())
            .finish_non_exhaustive()
    }
}

// ──────────────────── standard registrations ────────────────────

/// The keys `sync_from` copies from a world store.
#[must_use]
pub fn sync_keys() -> Vec<&'static str> {
    let mut set = vec![keys::HIDE_NAV_BUTTONS_ALL];
    set.extend(SidebarTab::ALL.iter().map(|tab| tab.setting_key()));
    set.push(keys::HIDE_TOTAL_RESULT);
    set.push(keys::HIDE_ADV_DISADV);
    set
}

/// The full standard registration set: the four world flags, one hide flag
/// per sidebar tab, the client enable toggle, and the persisted position.
#[must_use]
pub fn standard_registrations() -> Vec<SettingSpec> {
    let mut specs = vec![
        SettingSpec::bool(keys::HIDE_NAV_BUTTONS_ALL, SettingScope::World, false)
            .label("Hide navigation buttons")
            .hint("Remove the previous/next message buttons for everyone.")
            .reload_required(),
        SettingSpec::bool(
            keys::HIDE_NAV_BUTTONS_FOR_PLAYERS,
            SettingScope::World,
            false,
        )
        .label("Hide navigation buttons for players")
        .hint("Remove the previous/next message buttons for non-GM users.")
        .reload_required(),
        SettingSpec::bool(keys::HIDE_TOTAL_RESULT, SettingScope::World, false)
            .label("Hide roll totals")
            .hint("Show only the formula on posted roll cards.")
            .reload_required(),
        SettingSpec::bool(keys::HIDE_ADV_DISADV, SettingScope::World, false)
            .label("Hide advantage/disadvantage")
            .hint("Remove the advantage and disadvantage toggles from the dice tray.")
            .reload_required(),
    ];

    for tab in SidebarTab::ALL {
        specs.push(
            SettingSpec::bool(tab.setting_key(), SettingScope::World, tab.default_hidden())
                .label(format!("Hide buttons on the {} tab", tab.label()))
                .hint("Suppress the HUD navigation buttons while this tab is active."),
        );
    }

    specs.push(
        SettingSpec::bool(keys::SHOW_RECENT_MESSAGE, SettingScope::Client, true)
            .label("Show recent message")
            .hint("Display the recent-message HUD."),
    );
    specs.push(
        SettingSpec::json(keys::HUD_POSITION, SettingScope::Client, serde_json::Value::Null)
            .label("HUD position")
            .hint("Saved drag position; null means the anchored default."),
    );

    specs
}
