//! Sidebar tab policy: which tabs suppress the HUD navigation buttons,
//! and when the dice toolbar is shown.

use std::fmt;

use crate::settings::{SettingsService, keys};

/// The host application's sidebar tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SidebarTab {
    Chat,
    Combat,
    Scenes,
    Actors,
    Items,
    Journal,
    Tables,
    Cards,
    Playlists,
    Compendium,
    Settings,
}

impl SidebarTab {
    pub const ALL: [Self; 11] = [
        Self::Chat,
        Self::Combat,
        Self::Scenes,
        Self::Actors,
        Self::Items,
        Self::Journal,
        Self::Tables,
        Self::Cards,
        Self::Playlists,
        Self::Compendium,
        Self::Settings,
    ];

    /// The per-tab hide flag's setting key.
    #[must_use]
    pub const fn setting_key(self) -> &'static str {
        match self {
            Self::Chat => "hide_tab_chat",
            Self::Combat => "hide_tab_combat",
            Self::Scenes => "hide_tab_scenes",
            Self::Actors => "hide_tab_actors",
            Self::Items => "hide_tab_items",
            Self::Journal => "hide_tab_journal",
            Self::Tables => "hide_tab_tables",
            Self::Cards => "hide_tab_cards",
            Self::Playlists => "hide_tab_playlists",
            Self::Compendium => "hide_tab_compendium",
            Self::Settings => "hide_tab_settings",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Chat => "Chat",
            Self::Combat => "Combat",
            Self::Scenes => "Scenes",
            Self::Actors => "Actors",
            Self::Items => "Items",
            Self::Journal => "Journal",
            Self::Tables => "Tables",
            Self::Cards => "Cards",
            Self::Playlists => "Playlists",
            Self::Compendium => "Compendium",
            Self::Settings => "Settings",
        }
    }

    /// Default value of the per-tab hide flag. Tabs where chat rarely
    /// matters start hidden.
    #[must_use]
    pub const fn default_hidden(self) -> bool {
        matches!(
            self,
            Self::Scenes | Self::Items | Self::Tables | Self::Cards | Self::Compendium
        )
    }
}

impl fmt::Display for SidebarTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Who is looking at the sidebar, and its collapse state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidebarContext {
    pub is_gm: bool,
    pub collapsed: bool,
}

/// Whether the HUD navigation buttons are suppressed on `tab`.
///
/// A GM is exempt while the hide rule targets players only. Otherwise a
/// tab hides its buttons iff its flag is set and either the global hide
/// flag is set or the sidebar is collapsed. Missing registrations read as
/// unset.
#[must_use]
pub fn nav_buttons_hidden(settings: &SettingsService, ctx: SidebarContext, tab: SidebarTab) -> bool {
    if ctx.is_gm
        && settings
            .get_bool(keys::HIDE_NAV_BUTTONS_FOR_PLAYERS)
            .unwrap_or(false)
    {
        return false;
    }

    let flagged = settings.get_bool(tab.setting_key()).unwrap_or(false);
    let hide_all = settings
        .get_bool(keys::HIDE_NAV_BUTTONS_ALL)
        .unwrap_or(false);
    flagged && (hide_all || ctx.collapsed)
}

/// Tabs whose navigation buttons are suppressed under `ctx`.
#[must_use]
pub fn hidden_tabs(settings: &SettingsService, ctx: SidebarContext) -> Vec<SidebarTab> {
    SidebarTab::ALL
        .iter()
        .copied()
        .filter(|tab| nav_buttons_hidden(settings, ctx, *tab))
        .collect()
}

/// The dice toolbar shows only while the sidebar is collapsed.
#[must_use]
pub const fn toolbar_visible(collapsed: bool) -> bool {
    collapsed
}
