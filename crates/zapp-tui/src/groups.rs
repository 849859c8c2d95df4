//! Group filtering — the algebra deciding which channels are visible.

use std::collections::HashSet;

use zapp_proto::model::{Channel, SavedFilter};

/// How the channels tab filters by group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Show channels whose group is in the enablement set.
    #[default]
    EnabledGroups,
    /// Show everything, or one explicitly selected group.
    AllGroups,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::EnabledGroups => Self::AllGroups,
            Self::AllGroups => Self::EnabledGroups,
        }
    }
}

/// Group-side view state: the enablement set, the display mode, and the
/// single selected group.
///
/// Invariant: the two selection mechanisms are mutually exclusive — a
/// selected group only exists in `AllGroups` mode.  Every entry point that
/// changes one side re-establishes the invariant on the other.
#[derive(Debug, Default)]
pub struct GroupView {
    pub enabled: HashSet<String>,
    pub mode: DisplayMode,
    pub selected: Option<String>,
}

impl GroupView {
    pub fn set_mode(&mut self, mode: DisplayMode) {
        self.mode = mode;
        self.selected = None;
    }

    /// Select one group explicitly.  Forces `AllGroups` mode so the
    /// selection actually takes part in filtering.
    pub fn select_group(&mut self, group: String) {
        self.mode = DisplayMode::AllGroups;
        self.selected = Some(group);
    }

    pub fn clear_filter(&mut self) {
        self.mode = DisplayMode::EnabledGroups;
        self.selected = None;
    }

    pub fn is_enabled(&self, group: &str) -> bool {
        self.enabled.contains(group)
    }

    /// Flip one group's enablement locally.  Returns the new state; the
    /// caller persists it and flips back if the backend rejects the change.
    pub fn toggle(&mut self, group: &str) -> bool {
        if self.enabled.remove(group) {
            false
        } else {
            self.enabled.insert(group.to_string());
            true
        }
    }

    /// Restore a saved filter's group side: a concrete group implies
    /// `AllGroups`, no group implies the enablement view.
    pub fn apply_filter(&mut self, filter: &SavedFilter) {
        match &filter.selected_group {
            Some(group) => {
                self.mode = DisplayMode::AllGroups;
                self.selected = Some(group.clone());
            }
            None => {
                self.mode = DisplayMode::EnabledGroups;
                self.selected = None;
            }
        }
    }
}

/// The visible subset of `channels` under the current group view.
pub fn visible_channels<'a>(channels: &'a [Channel], view: &GroupView) -> Vec<&'a Channel> {
    match (view.mode, view.selected.as_deref()) {
        (DisplayMode::EnabledGroups, _) => channels
            .iter()
            .filter(|c| view.enabled.contains(&c.group_title))
            .collect(),
        (DisplayMode::AllGroups, None) => channels.iter().collect(),
        (DisplayMode::AllGroups, Some(group)) => channels
            .iter()
            .filter(|c| c.group_title == group)
            .collect(),
    }
}
