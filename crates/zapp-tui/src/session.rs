//! Session controller — keeps the per-list caches consistent across
//! channel-list switches.
//!
//! A switch bumps an epoch and flips the transition/suppression flags
//! synchronously, then hands the slow work to a background task running
//! `load_list_data`.  The finished snapshot is committed back on the event
//! loop only when its (epoch, id) stamp still matches the live selection;
//! anything else is a stale result and is dropped without a trace beyond a
//! debug line.  Last writer wins by id comparison, not by completion order.

use std::collections::HashSet;

use tracing::{debug, warn};
use zapp_proto::gateway::Gateway;
use zapp_proto::model::{Channel, SavedFilter};

use crate::groups::{DisplayMode, GroupView};
use crate::slots::FilterSlots;

/// Everything `load_list_data` gathered for one channel list.
#[derive(Debug, Default)]
pub struct ListSnapshot {
    pub channels: Vec<Channel>,
    pub favorites: Vec<Channel>,
    pub history: Vec<Channel>,
    pub groups: Vec<String>,
    pub enabled: HashSet<String>,
    pub filters: Vec<SavedFilter>,
    /// Set when the channels fetch itself failed — the one step whose
    /// failure is surfaced to the user rather than only logged.
    pub channels_error: Option<String>,
}

/// The client-side caches plus the switch bookkeeping.
#[derive(Default)]
pub struct Session {
    pub channels: Vec<Channel>,
    pub favorites: Vec<Channel>,
    pub history: Vec<Channel>,
    pub groups: Vec<String>,
    pub view: GroupView,
    pub slots: FilterSlots,
    pub selected_list: Option<i64>,
    /// True while a list switch is loading.
    pub loading: bool,
    /// True while search resolutions must stay inert.
    pub search_suppressed: bool,
    epoch: u64,
}

impl Session {
    /// Start switching to `id`.  Returns the epoch stamp for the load task,
    /// or `None` when `id` is already selected (re-selecting is a no-op).
    ///
    /// Runs synchronously, before any backend call: the flags flip, the
    /// channel and group caches empty out so the UI can show a loading
    /// state, and the single-group selection resets.
    pub fn begin_switch(&mut self, id: i64) -> Option<u64> {
        if self.selected_list == Some(id) {
            return None;
        }
        self.loading = true;
        self.search_suppressed = true;
        self.channels.clear();
        self.groups.clear();
        self.view.selected = None;
        self.slots.clear();
        self.selected_list = Some(id);
        self.epoch += 1;
        Some(self.epoch)
    }

    /// Commit a finished load.  Returns `false` (and changes nothing) when
    /// the stamp no longer matches the live selection.
    pub fn commit_switch(&mut self, epoch: u64, id: i64, snapshot: ListSnapshot) -> bool {
        if epoch != self.epoch || self.selected_list != Some(id) {
            debug!(
                "dropping stale load for list {id} (epoch {epoch}, current {})",
                self.epoch
            );
            return false;
        }
        self.channels = snapshot.channels;
        self.favorites = snapshot.favorites;
        self.history = snapshot.history;
        self.groups = snapshot.groups;
        self.view.enabled = snapshot.enabled;
        self.view.set_mode(DisplayMode::EnabledGroups);
        self.slots.replace(snapshot.filters);
        self.loading = false;
        self.search_suppressed = false;
        true
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// The switch load sequence, strictly in order: channels, favorites,
/// history, groups, group sync, enablement, auto-enable, saved filters.
///
/// Every step is best-effort — a failure logs a warning, leaves that slice
/// of the snapshot empty, and never stops the remaining steps, so one broken
/// table can't leave the whole UI stuck loading.
pub async fn load_list_data<G: Gateway>(gateway: &G, id: i64) -> ListSnapshot {
    let mut snap = ListSnapshot::default();

    match gateway.channels(Some(id)).await {
        Ok(channels) => snap.channels = channels,
        Err(e) => {
            warn!("channels fetch failed for list {id}: {e}");
            snap.channels_error = Some(e.to_string());
        }
    }

    match gateway.favorites().await {
        Ok(favorites) => snap.favorites = favorites,
        Err(e) => warn!("favorites fetch failed: {e}"),
    }
    match gateway.history().await {
        Ok(history) => snap.history = history,
        Err(e) => warn!("history fetch failed: {e}"),
    }

    let mut groups_ok = false;
    match gateway.groups(Some(id)).await {
        Ok(groups) => {
            snap.groups = groups;
            groups_ok = true;
        }
        Err(e) => warn!("groups fetch failed for list {id}: {e}"),
    }

    // Reconcile stored enablement rows against the authoritative group list.
    // Skipped when the group fetch failed: syncing against an empty list
    // would prune every stored row.
    if groups_ok {
        if let Err(e) = gateway.sync_groups(id, &snap.groups).await {
            warn!("group sync failed for list {id}: {e}");
        }
    }

    match gateway.enabled_groups(id).await {
        Ok(enabled) => snap.enabled = enabled.into_iter().collect(),
        Err(e) => warn!("enabled-groups fetch failed for list {id}: {e}"),
    }

    // A non-empty list with nothing enabled has never been configured:
    // enable everything, then refetch to confirm.
    if snap.enabled.is_empty() && !snap.groups.is_empty() {
        debug!("auto-enabling all {} groups for list {id}", snap.groups.len());
        match gateway.enable_all_groups(id, &snap.groups).await {
            Ok(()) => match gateway.enabled_groups(id).await {
                Ok(enabled) => snap.enabled = enabled.into_iter().collect(),
                Err(e) => {
                    warn!("enabled-groups refetch failed for list {id}: {e}");
                    snap.enabled = snap.groups.iter().cloned().collect();
                }
            },
            Err(e) => warn!("bulk enable failed for list {id}: {e}"),
        }
    }

    match gateway.saved_filters(id).await {
        Ok(filters) => snap.filters = filters,
        Err(e) => warn!("saved-filters fetch failed for list {id}: {e}"),
    }

    snap
}
