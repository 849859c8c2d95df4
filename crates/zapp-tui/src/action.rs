//! Action enum — all user-initiated intents the key dispatcher can produce.

/// Which tab (mode) is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Channels,
    Favorites,
    Groups,
    History,
    Settings,
}

impl Tab {
    /// Fixed cycle order for the Tab key.
    pub const RING: [Tab; 5] = [
        Tab::Channels,
        Tab::Favorites,
        Tab::Groups,
        Tab::History,
        Tab::Settings,
    ];

    pub fn next(self) -> Tab {
        let i = Self::RING.iter().position(|t| *t == self).unwrap_or(0);
        Self::RING[(i + 1) % Self::RING.len()]
    }

    /// Tabs whose list items are channels (navigation auto-selects there).
    pub fn shows_channels(self) -> bool {
        matches!(self, Tab::Channels | Tab::Favorites | Tab::History)
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Channels => "channels",
            Tab::Favorites => "favorites",
            Tab::Groups => "groups",
            Tab::History => "history",
            Tab::Settings => "settings",
        }
    }
}

/// All actions that can flow through the system.
/// The key dispatcher produces Actions; the App dispatches each one.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Navigation ───────────────────────────────────────────────────────────
    MoveFocus(isize),
    PageStart,
    PageEnd,
    NextTab,

    // ── Selection / playback ─────────────────────────────────────────────────
    SelectFocused,
    Activate,
    ToggleFavorite,
    CopyUrl,

    // ── Search ───────────────────────────────────────────────────────────────
    FocusSearch,
    ClearSearch,
    ClearAllFilters,

    // ── Groups ───────────────────────────────────────────────────────────────
    ToggleGroupEnabled,
    EnableAllGroups,
    DisableAllGroups,
    ToggleDisplayMode,

    // ── Saved filter slots ───────────────────────────────────────────────────
    ApplySlot(u8),
    SaveSlot(u8),
    DeleteSlot(u8),

    // ── Channel lists ────────────────────────────────────────────────────────
    SelectChannelList(i64),

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
}
