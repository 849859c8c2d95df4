//! Shared data model — what the backend owns and the client caches.

use serde::{Deserialize, Serialize};

/// One playable channel within a channel list.
///
/// `name` is the identity (unique within its list).  Channels are immutable
/// once fetched; the whole cache is replaced when the owning list refreshes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    #[serde(default)]
    pub logo: String,
    pub url: String,
    #[serde(default)]
    pub group_title: String,
    #[serde(default)]
    pub tvg_id: String,
    #[serde(default)]
    pub resolution: String,
    #[serde(default)]
    pub extra_info: String,
}

/// A named playlist of channels, sourced from a URL or file.
///
/// Owned by the backend; the client holds read-only copies plus the id of
/// the currently selected list.  At most one list is the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelList {
    pub id: i64,
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub is_default: bool,
    /// Unix seconds of the last successful playlist fetch.
    pub last_fetched: Option<i64>,
}

/// A saved (query, group) preset bound to a numbered slot of one list.
///
/// Slots are scoped to a channel list and reloaded wholesale whenever the
/// selected list changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedFilter {
    pub slot_number: u8,
    pub search_query: String,
    pub selected_group: Option<String>,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_optional_fields_default() {
        let ch: Channel = serde_json::from_str(
            r#"{"name":"News 24","url":"http://example.com/news.m3u8"}"#,
        )
        .unwrap();
        assert_eq!(ch.name, "News 24");
        assert!(ch.group_title.is_empty());
        assert!(ch.tvg_id.is_empty());
    }

    #[test]
    fn saved_filter_round_trips_null_group() {
        let f = SavedFilter {
            slot_number: 3,
            search_query: "news".into(),
            selected_group: None,
            name: "All + \"news\"".into(),
        };
        let json = serde_json::to_string(&f).unwrap();
        assert!(json.contains("\"selected_group\":null"));
        let back: SavedFilter = serde_json::from_str(&json).unwrap();
        assert_eq!(back, f);
    }
}
