//! In-memory gateway for tests: canned per-list data, a recorded call log,
//! and per-operation failure injection.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use zapp_proto::gateway::{Gateway, GatewayError, GatewayResult};
use zapp_proto::model::{Channel, ChannelList, SavedFilter};

pub fn channel(name: &str, group: &str) -> Channel {
    Channel {
        name: name.into(),
        logo: String::new(),
        url: format!("http://example.com/{}.m3u8", name.to_lowercase()),
        group_title: group.into(),
        tvg_id: String::new(),
        resolution: String::new(),
        extra_info: String::new(),
    }
}

#[derive(Default)]
struct ListFixture {
    channels: Vec<Channel>,
    groups: Vec<String>,
    enabled: HashSet<String>,
    filters: Vec<SavedFilter>,
}

#[derive(Default)]
struct FakeState {
    lists: Vec<ChannelList>,
    per_list: HashMap<i64, ListFixture>,
    favorites: Vec<Channel>,
    history: Vec<Channel>,
    calls: Vec<String>,
    fail: HashSet<&'static str>,
}

#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<FakeState>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_list(
        &self,
        id: i64,
        channels: Vec<Channel>,
        groups: Vec<String>,
        enabled: Vec<String>,
    ) {
        let mut s = self.state.lock().unwrap();
        let is_default = s.lists.is_empty();
        s.lists.push(ChannelList {
            id,
            name: format!("list-{id}"),
            source: format!("http://example.com/{id}.m3u"),
            is_default,
            last_fetched: None,
        });
        s.per_list.insert(
            id,
            ListFixture {
                channels,
                groups,
                enabled: enabled.into_iter().collect(),
                filters: Vec::new(),
            },
        );
    }

    /// Make every call to the named operation fail with `Unavailable`.
    pub fn fail_on(&self, op: &'static str) {
        self.state.lock().unwrap().fail.insert(op);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn favorites_snapshot(&self) -> Vec<Channel> {
        self.state.lock().unwrap().favorites.clone()
    }

    pub fn history_snapshot(&self) -> Vec<Channel> {
        self.state.lock().unwrap().history.clone()
    }

    pub fn enabled_snapshot(&self, id: i64) -> HashSet<String> {
        self.state.lock().unwrap().per_list[&id].enabled.clone()
    }

    fn record(&self, call: String, op: &'static str) -> GatewayResult<()> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(call);
        if s.fail.contains(op) {
            Err(GatewayError::Unavailable("injected failure".into()))
        } else {
            Ok(())
        }
    }
}

impl Gateway for FakeGateway {
    async fn channel_lists(&self) -> GatewayResult<Vec<ChannelList>> {
        self.record("channel_lists".into(), "channel_lists")?;
        Ok(self.state.lock().unwrap().lists.clone())
    }

    async fn channels(&self, list_id: Option<i64>) -> GatewayResult<Vec<Channel>> {
        self.record(format!("channels:{list_id:?}"), "channels")?;
        let s = self.state.lock().unwrap();
        Ok(list_id
            .and_then(|id| s.per_list.get(&id))
            .map(|f| f.channels.clone())
            .unwrap_or_default())
    }

    async fn search_channels(
        &self,
        query: &str,
        list_id: Option<i64>,
    ) -> GatewayResult<Vec<Channel>> {
        self.record(format!("search:{query}:{list_id:?}"), "search")?;
        let s = self.state.lock().unwrap();
        let needle = query.to_lowercase();
        Ok(list_id
            .and_then(|id| s.per_list.get(&id))
            .map(|f| {
                f.channels
                    .iter()
                    .filter(|c| c.name.to_lowercase().contains(&needle))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn groups(&self, list_id: Option<i64>) -> GatewayResult<Vec<String>> {
        self.record(format!("groups:{list_id:?}"), "groups")?;
        let s = self.state.lock().unwrap();
        Ok(list_id
            .and_then(|id| s.per_list.get(&id))
            .map(|f| f.groups.clone())
            .unwrap_or_default())
    }

    async fn enabled_groups(&self, list_id: i64) -> GatewayResult<Vec<String>> {
        self.record(format!("enabled_groups:{list_id}"), "enabled_groups")?;
        let s = self.state.lock().unwrap();
        Ok(s.per_list
            .get(&list_id)
            .map(|f| f.enabled.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn sync_groups(&self, list_id: i64, groups: &[String]) -> GatewayResult<()> {
        self.record(format!("sync_groups:{list_id}"), "sync_groups")?;
        let mut s = self.state.lock().unwrap();
        if let Some(fixture) = s.per_list.get_mut(&list_id) {
            // Rows for vanished groups are pruned; new groups get rows that
            // start disabled, so only the retain matters here.
            fixture.enabled.retain(|g| groups.contains(g));
        }
        Ok(())
    }

    async fn enable_all_groups(&self, list_id: i64, groups: &[String]) -> GatewayResult<()> {
        self.record(format!("enable_all:{list_id}"), "enable_all")?;
        let mut s = self.state.lock().unwrap();
        if let Some(fixture) = s.per_list.get_mut(&list_id) {
            fixture.enabled = groups.iter().cloned().collect();
        }
        Ok(())
    }

    async fn update_group_selection(
        &self,
        list_id: i64,
        group: &str,
        enabled: bool,
    ) -> GatewayResult<()> {
        self.record(
            format!("group_selection:{list_id}:{group}:{enabled}"),
            "group_selection",
        )?;
        let mut s = self.state.lock().unwrap();
        if let Some(fixture) = s.per_list.get_mut(&list_id) {
            if enabled {
                fixture.enabled.insert(group.to_string());
            } else {
                fixture.enabled.remove(group);
            }
        }
        Ok(())
    }

    async fn favorites(&self) -> GatewayResult<Vec<Channel>> {
        self.record("favorites".into(), "favorites")?;
        Ok(self.state.lock().unwrap().favorites.clone())
    }

    async fn add_favorite(&self, channel: &Channel) -> GatewayResult<()> {
        self.record(format!("add_favorite:{}", channel.name), "add_favorite")?;
        self.state.lock().unwrap().favorites.push(channel.clone());
        Ok(())
    }

    async fn remove_favorite(&self, name: &str) -> GatewayResult<()> {
        self.record(format!("remove_favorite:{name}"), "remove_favorite")?;
        self.state.lock().unwrap().favorites.retain(|c| c.name != name);
        Ok(())
    }

    async fn history(&self) -> GatewayResult<Vec<Channel>> {
        self.record("history".into(), "history")?;
        Ok(self.state.lock().unwrap().history.clone())
    }

    async fn play_channel(&self, channel: &Channel) -> GatewayResult<()> {
        self.record(format!("play:{}", channel.name), "play")?;
        self.state.lock().unwrap().history.push(channel.clone());
        Ok(())
    }

    async fn saved_filters(&self, list_id: i64) -> GatewayResult<Vec<SavedFilter>> {
        self.record(format!("saved_filters:{list_id}"), "saved_filters")?;
        let s = self.state.lock().unwrap();
        Ok(s.per_list
            .get(&list_id)
            .map(|f| f.filters.clone())
            .unwrap_or_default())
    }

    async fn save_filter(&self, list_id: i64, filter: &SavedFilter) -> GatewayResult<()> {
        self.record(
            format!("save_filter:{list_id}:{}", filter.slot_number),
            "save_filter",
        )?;
        let mut s = self.state.lock().unwrap();
        if let Some(fixture) = s.per_list.get_mut(&list_id) {
            fixture
                .filters
                .retain(|f| f.slot_number != filter.slot_number);
            fixture.filters.push(filter.clone());
        }
        Ok(())
    }

    async fn delete_saved_filter(&self, list_id: i64, slot: u8) -> GatewayResult<()> {
        self.record(format!("delete_filter:{list_id}:{slot}"), "delete_filter")?;
        let mut s = self.state.lock().unwrap();
        if let Some(fixture) = s.per_list.get_mut(&list_id) {
            fixture.filters.retain(|f| f.slot_number != slot);
        }
        Ok(())
    }
}
