//! Saved filter slots — ten numbered (query, group) presets per channel list.
//!
//! The cache mirrors the backend for the selected list only; it is wiped and
//! reloaded whenever the selection changes.

use zapp_proto::model::SavedFilter;

#[derive(Debug, Default)]
pub struct FilterSlots {
    filters: Vec<SavedFilter>,
}

impl FilterSlots {
    pub fn get(&self, slot: u8) -> Option<&SavedFilter> {
        self.filters.iter().find(|f| f.slot_number == slot)
    }

    pub fn all(&self) -> &[SavedFilter] {
        &self.filters
    }

    pub fn replace(&mut self, filters: Vec<SavedFilter>) {
        self.filters = filters;
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    /// Display name for a quick-saved slot:
    /// `"<group or All> + <"query" or No search>"`.
    pub fn display_name(query: &str, group: Option<&str>) -> String {
        let group_part = group.unwrap_or("All");
        let search_part = if query.is_empty() {
            "No search".to_string()
        } else {
            format!("\"{query}\"")
        };
        format!("{group_part} + {search_part}")
    }
}
