//! App — component wiring and the main event loop.
//!
//! Architecture:
//! - `App` owns the session caches, the search controller, and the UI bits.
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background
//!   tasks; the event loop draws a frame, then awaits the next message.
//! - Key events become `Action`s (see `keys`); `dispatch` applies each one.
//! - Background tasks never touch state: they fetch and send a message, and
//!   every result is stamped so a late arrival for a superseded selection or
//!   query is dropped on the floor.

use std::collections::HashSet;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, widgets::ListState, Terminal};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use zapp_proto::config::Config;
use zapp_proto::gateway::{Gateway, GatewayResult};
use zapp_proto::model::{Channel, ChannelList, SavedFilter};

use crate::action::{Action, Tab};
use crate::groups::visible_channels;
use crate::keys::{self, KeyContext};
use crate::search::{SearchController, SearchPlan};
use crate::session::{load_list_data, ListSnapshot, Session};
use crate::slots::FilterSlots;
use crate::ui;
use crate::widgets::search_input::{SearchInput, SearchInputAction};
use crate::widgets::toast::ToastManager;

// ── Internal event bus ────────────────────────────────────────────────────────

pub enum AppMessage {
    Event(Event),
    ListsLoaded(GatewayResult<Vec<ChannelList>>),
    /// A channel-list switch finished loading.  Stamped with the epoch and
    /// target id it was started for.
    ListLoaded {
        epoch: u64,
        id: i64,
        snapshot: ListSnapshot,
    },
    /// A search (or search-cleared) resolution finished.  `channels: None`
    /// means both the search and its unfiltered fallback failed.
    SearchDone {
        seq: u64,
        list_id: Option<i64>,
        channels: Option<Vec<Channel>>,
    },
    FavoritesLoaded(Vec<Channel>),
    HistoryLoaded(Vec<Channel>),
    FavoriteToggleFailed {
        name: String,
        error: String,
    },
    GroupToggleFailed {
        group: String,
    },
    /// Authoritative enablement set, fetched to reconcile after a failed
    /// bulk operation.
    EnablementReloaded {
        list_id: i64,
        enabled: HashSet<String>,
    },
    SlotsLoaded {
        list_id: i64,
        filters: Vec<SavedFilter>,
    },
    SlotSaved {
        slot: u8,
        name: String,
    },
    SlotSaveFailed {
        slot: u8,
    },
    PlayFailed {
        name: String,
        error: String,
    },
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App<G> {
    gateway: Arc<G>,
    pub(crate) ui_cfg: zapp_proto::config::UiConfig,

    pub(crate) session: Session,
    pub(crate) search: SearchController,
    pub(crate) channel_lists: Vec<ChannelList>,

    pub(crate) tab: Tab,
    pub(crate) focused: usize,
    pub(crate) selected_channel: Option<Channel>,

    pub(crate) input: SearchInput,
    pub(crate) toast: ToastManager,
    pub(crate) list_state: ListState,

    should_quit: bool,
    tx: mpsc::Sender<AppMessage>,
}

impl<G: Gateway + 'static> App<G> {
    pub fn new(gateway: Arc<G>, config: Config) -> (Self, mpsc::Receiver<AppMessage>) {
        let (tx, rx) = mpsc::channel::<AppMessage>(256);
        let search = SearchController::new(config.search_debounce(), config.ui.search_min_chars);
        let app = Self {
            gateway,
            ui_cfg: config.ui,
            session: Session::default(),
            search,
            channel_lists: Vec::new(),
            tab: Tab::Channels,
            focused: 0,
            selected_channel: None,
            input: SearchInput::new(),
            toast: ToastManager::new(),
            list_state: ListState::default(),
            should_quit: false,
            tx,
        };
        (app, rx)
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self, mut rx: mpsc::Receiver<AppMessage>) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // ── Background task: keyboard events ──────────────────────────────────
        let event_tx = self.tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // ── Initial load: channel lists, then the default one ─────────────────
        {
            let gateway = self.gateway.clone();
            let tx = self.tx.clone();
            tokio::spawn(async move {
                let result = gateway.channel_lists().await;
                let _ = tx.send(AppMessage::ListsLoaded(result)).await;
            });
        }

        let mut toast_tick = tokio::time::interval(Duration::from_millis(250));
        toast_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            terminal.draw(|f| ui::draw(f, &mut self))?;

            if self.should_quit {
                break;
            }

            let deadline = self.search.deadline();
            tokio::select! {
                maybe = rx.recv() => {
                    match maybe {
                        Some(msg) => self.handle_message(msg),
                        None => break,
                    }
                }

                // Debounce deadline: armed on every keystroke, only the most
                // recently armed one fires.
                _ = async {
                    match deadline {
                        Some(d) => tokio::time::sleep_until(d).await,
                        None => std::future::pending::<()>().await,
                    }
                } => {
                    let plan = self.search.fire(self.session.search_suppressed);
                    self.spawn_search(plan);
                }

                _ = toast_tick.tick() => {
                    self.toast.tick();
                }
            }
        }

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        Ok(())
    }

    // ── Message handler ───────────────────────────────────────────────────────

    pub(crate) fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Event(ev) => {
                if let Event::Key(key) = ev {
                    if key.kind == KeyEventKind::Release {
                        return;
                    }
                    if self.input.is_active() {
                        match self.input.handle_key(key) {
                            SearchInputAction::Edited(value) => self.search.set_query(value),
                            SearchInputAction::Blurred => {}
                        }
                        return;
                    }
                    let ctx = KeyContext {
                        tab: self.tab,
                        slots: &self.session.slots,
                        scroll_step: self.ui_cfg.scroll_step,
                    };
                    for action in keys::handle_key(key, &ctx) {
                        self.dispatch(action);
                    }
                }
            }

            AppMessage::ListsLoaded(result) => match result {
                Ok(lists) => {
                    self.channel_lists = lists;
                    if self.session.selected_list.is_none() {
                        if let Some(default) =
                            self.channel_lists.iter().find(|l| l.is_default).cloned()
                        {
                            info!("selecting default channel list {}", default.id);
                            self.select_channel_list(default.id);
                        }
                    }
                }
                Err(e) => self.toast.error(format!("channel lists unavailable: {e}")),
            },

            AppMessage::ListLoaded {
                epoch,
                id,
                mut snapshot,
            } => {
                let channels_error = snapshot.channels_error.take();
                if self.session.commit_switch(epoch, id, snapshot) {
                    self.focused = 0;
                    self.selected_channel = None;
                    if let Some(e) = channels_error {
                        self.toast.error(format!("channel load failed: {e}"));
                    }
                    // The switch is over; a search typed during it now runs
                    // against the new list.
                    if let Some(plan) = self.search.reevaluate() {
                        self.spawn_search(plan);
                    }
                }
            }

            AppMessage::SearchDone {
                seq,
                list_id,
                channels,
            } => {
                if !self.search.accepts(seq) {
                    debug!("discarding superseded search resolution {seq}");
                    return;
                }
                self.search.finish(seq);
                if self.session.selected_list != list_id {
                    debug!("discarding search resolution for stale list {list_id:?}");
                    return;
                }
                if let Some(channels) = channels {
                    self.session.channels = channels;
                    self.clamp_focus();
                }
            }

            AppMessage::FavoritesLoaded(favorites) => {
                self.session.favorites = favorites;
                if self.tab == Tab::Favorites {
                    self.clamp_focus();
                }
            }

            AppMessage::HistoryLoaded(history) => {
                self.session.history = history;
                if self.tab == Tab::History {
                    self.clamp_focus();
                }
            }

            AppMessage::FavoriteToggleFailed { name, error } => {
                self.toast
                    .error(format!("favorite toggle failed for {name}: {error}"));
            }

            AppMessage::GroupToggleFailed { group } => {
                // Roll the optimistic flip back.
                self.session.view.toggle(&group);
                self.toast.error(format!("could not update group \"{group}\""));
            }

            AppMessage::EnablementReloaded { list_id, enabled } => {
                if self.session.selected_list == Some(list_id) {
                    self.session.view.enabled = enabled;
                }
            }

            AppMessage::SlotsLoaded { list_id, filters } => {
                if self.session.selected_list == Some(list_id) {
                    self.session.slots.replace(filters);
                }
            }

            AppMessage::SlotSaved { slot, name } => {
                self.toast.success(format!("slot {slot}: {name}"));
            }

            AppMessage::SlotSaveFailed { slot } => {
                self.toast.error(format!("could not save filter slot {slot}"));
            }

            AppMessage::PlayFailed { name, error } => {
                self.toast.error(format!("playback failed for {name}: {error}"));
            }
        }
    }

    // ── Action dispatch ───────────────────────────────────────────────────────

    pub(crate) fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,

            Action::NextTab => {
                self.tab = self.tab.next();
                self.focused = 0;
                self.list_state = ListState::default();
            }

            Action::MoveFocus(delta) => {
                let len = self.items_len();
                if len == 0 {
                    self.focused = 0;
                    return;
                }
                let new = self.focused as isize + delta;
                self.focused = new.clamp(0, len as isize - 1) as usize;
                self.auto_select_focused();
            }

            Action::PageStart => {
                let start = (self.focused / self.ui_cfg.page_size) * self.ui_cfg.page_size;
                self.focused = start.min(self.items_len().saturating_sub(1));
                self.auto_select_focused();
            }

            Action::PageEnd => {
                let len = self.items_len();
                if len == 0 {
                    return;
                }
                let page = self.focused / self.ui_cfg.page_size;
                let end = (page + 1) * self.ui_cfg.page_size - 1;
                self.focused = end.min(len - 1);
                self.auto_select_focused();
            }

            Action::SelectFocused => match self.tab {
                Tab::Channels | Tab::Favorites | Tab::History => {
                    self.selected_channel = self.focused_channel();
                }
                Tab::Groups => self.select_focused_group(),
                Tab::Settings => self.select_focused_list(),
            },

            Action::Activate => match self.tab {
                Tab::Channels | Tab::Favorites | Tab::History => {
                    if let Some(channel) = self.focused_channel() {
                        self.play(channel);
                    }
                }
                Tab::Groups => self.select_focused_group(),
                Tab::Settings => self.select_focused_list(),
            },

            Action::ToggleFavorite => {
                if let Some(channel) = self.focused_channel() {
                    self.toggle_favorite(channel);
                }
            }

            Action::CopyUrl => {
                if let Some(channel) = self.focused_channel() {
                    match arboard::Clipboard::new().and_then(|mut c| c.set_text(channel.url.clone()))
                    {
                        Ok(()) => self.toast.info(format!("copied url for {}", channel.name)),
                        Err(e) => self.toast.warning(format!("clipboard error: {e}")),
                    }
                }
            }

            Action::FocusSearch => self.input.activate(),

            Action::ClearSearch => {
                self.input.set_value("");
                self.search.set_query("");
            }

            Action::ClearAllFilters => {
                self.input.set_value("");
                self.search.set_query("");
                self.session.view.clear_filter();
                self.focused = 0;
            }

            Action::ToggleGroupEnabled => {
                if let Some(group) = self.session.groups.get(self.focused).cloned() {
                    self.toggle_group(group);
                }
            }

            Action::EnableAllGroups => self.enable_all_groups(),
            Action::DisableAllGroups => self.disable_all_groups(),

            Action::ToggleDisplayMode => {
                let mode = self.session.view.mode.toggled();
                self.session.view.set_mode(mode);
                self.clamp_focus();
            }

            Action::ApplySlot(slot) => self.apply_slot(slot),
            Action::SaveSlot(slot) => self.save_slot(slot),
            Action::DeleteSlot(slot) => self.delete_slot(slot),

            Action::SelectChannelList(id) => self.select_channel_list(id),
        }
    }

    // ── List switching ────────────────────────────────────────────────────────

    fn select_channel_list(&mut self, id: i64) {
        let Some(epoch) = self.session.begin_switch(id) else {
            debug!("list {id} already selected");
            return;
        };
        self.tab = Tab::Channels;
        self.focused = 0;
        self.selected_channel = None;

        let gateway = self.gateway.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let snapshot = load_list_data(gateway.as_ref(), id).await;
            let _ = tx.send(AppMessage::ListLoaded { epoch, id, snapshot }).await;
        });
    }

    fn select_focused_list(&mut self) {
        if let Some(id) = self.channel_lists.get(self.focused).map(|l| l.id) {
            self.dispatch(Action::SelectChannelList(id));
        }
    }

    // ── Search ────────────────────────────────────────────────────────────────

    fn spawn_search(&mut self, plan: SearchPlan) {
        let list_id = self.session.selected_list;
        let gateway = self.gateway.clone();
        let tx = self.tx.clone();
        match plan {
            SearchPlan::Suppressed => {}

            SearchPlan::FetchAll { seq } => {
                tokio::spawn(async move {
                    let channels = match gateway.channels(list_id).await {
                        Ok(channels) => Some(channels),
                        Err(e) => {
                            warn!("channel reload failed: {e}");
                            None
                        }
                    };
                    let _ = tx
                        .send(AppMessage::SearchDone {
                            seq,
                            list_id,
                            channels,
                        })
                        .await;
                });
            }

            SearchPlan::Query { seq, query } => {
                tokio::spawn(async move {
                    let channels = match gateway.search_channels(&query, list_id).await {
                        Ok(channels) => Some(channels),
                        Err(e) => {
                            // Fall back to the unfiltered list rather than
                            // leaving stale search results on screen.
                            warn!("search {query:?} failed, falling back: {e}");
                            match gateway.channels(list_id).await {
                                Ok(channels) => Some(channels),
                                Err(e2) => {
                                    warn!("fallback channel fetch failed: {e2}");
                                    None
                                }
                            }
                        }
                    };
                    let _ = tx
                        .send(AppMessage::SearchDone {
                            seq,
                            list_id,
                            channels,
                        })
                        .await;
                });
            }
        }
    }

    // ── Playback / favorites ──────────────────────────────────────────────────

    fn play(&mut self, channel: Channel) {
        self.selected_channel = Some(channel.clone());
        self.toast.info(format!("playing {}", channel.name));
        let gateway = self.gateway.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match gateway.play_channel(&channel).await {
                Ok(()) => {
                    // The backend appended to history; refresh the cache.
                    if let Ok(history) = gateway.history().await {
                        let _ = tx.send(AppMessage::HistoryLoaded(history)).await;
                    }
                }
                Err(e) => {
                    let _ = tx
                        .send(AppMessage::PlayFailed {
                            name: channel.name.clone(),
                            error: e.to_string(),
                        })
                        .await;
                }
            }
        });
    }

    pub(crate) fn is_favorite(&self, channel: &Channel) -> bool {
        self.session.favorites.iter().any(|f| f.name == channel.name)
    }

    fn toggle_favorite(&mut self, channel: Channel) {
        let remove = self.is_favorite(&channel);
        let gateway = self.gateway.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = if remove {
                gateway.remove_favorite(&channel.name).await
            } else {
                gateway.add_favorite(&channel).await
            };
            match result {
                Ok(()) => {
                    if let Ok(favorites) = gateway.favorites().await {
                        let _ = tx.send(AppMessage::FavoritesLoaded(favorites)).await;
                    }
                }
                Err(e) => {
                    let _ = tx
                        .send(AppMessage::FavoriteToggleFailed {
                            name: channel.name.clone(),
                            error: e.to_string(),
                        })
                        .await;
                }
            }
        });
    }

    // ── Group enablement ──────────────────────────────────────────────────────

    fn select_focused_group(&mut self) {
        if let Some(group) = self.session.groups.get(self.focused).cloned() {
            self.session.view.select_group(group);
            self.tab = Tab::Channels;
            self.focused = 0;
        }
    }

    fn toggle_group(&mut self, group: String) {
        let Some(list_id) = self.session.selected_list else {
            return;
        };
        // Optimistic flip; rolled back via GroupToggleFailed.
        let enabled = self.session.view.toggle(&group);
        let gateway = self.gateway.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            if let Err(e) = gateway
                .update_group_selection(list_id, &group, enabled)
                .await
            {
                warn!("group toggle persist failed for {group:?}: {e}");
                let _ = tx.send(AppMessage::GroupToggleFailed { group }).await;
            }
        });
    }

    fn enable_all_groups(&mut self) {
        let Some(list_id) = self.session.selected_list else {
            return;
        };
        let groups = self.session.groups.clone();
        if groups.is_empty() {
            return;
        }
        self.session.view.enabled = groups.iter().cloned().collect();
        let gateway = self.gateway.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            if let Err(e) = gateway.enable_all_groups(list_id, &groups).await {
                warn!("bulk enable failed: {e}");
                reconcile_enablement(gateway.as_ref(), list_id, &tx).await;
            }
        });
    }

    fn disable_all_groups(&mut self) {
        let Some(list_id) = self.session.selected_list else {
            return;
        };
        let groups = self.session.groups.clone();
        self.session.view.enabled.clear();
        let gateway = self.gateway.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            // No bulk disable on the backend: issue the per-group calls
            // sequentially so an interruption can't leave interleaved state.
            for group in &groups {
                if let Err(e) = gateway.update_group_selection(list_id, group, false).await {
                    warn!("bulk disable stopped at {group:?}: {e}");
                    reconcile_enablement(gateway.as_ref(), list_id, &tx).await;
                    return;
                }
            }
        });
    }

    // ── Saved filter slots ────────────────────────────────────────────────────

    fn apply_slot(&mut self, slot: u8) {
        let Some(filter) = self.session.slots.get(slot).cloned() else {
            return;
        };
        debug!("applying saved filter {slot}: {:?}", filter.name);
        self.input.set_value(&filter.search_query);
        self.search.set_query(filter.search_query.clone());
        self.session.view.apply_filter(&filter);
        self.tab = Tab::Channels;
        self.focused = 0;
    }

    fn save_slot(&mut self, slot: u8) {
        let Some(list_id) = self.session.selected_list else {
            self.toast.warning("no channel list selected");
            return;
        };
        let name = FilterSlots::display_name(
            self.search.query(),
            self.session.view.selected.as_deref(),
        );
        let filter = SavedFilter {
            slot_number: slot,
            search_query: self.search.query().to_string(),
            selected_group: self.session.view.selected.clone(),
            name: name.clone(),
        };
        let gateway = self.gateway.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match gateway.save_filter(list_id, &filter).await {
                Ok(()) => {
                    if let Ok(filters) = gateway.saved_filters(list_id).await {
                        let _ = tx.send(AppMessage::SlotsLoaded { list_id, filters }).await;
                    }
                    let _ = tx.send(AppMessage::SlotSaved { slot, name }).await;
                }
                Err(e) => {
                    warn!("filter save failed for slot {slot}: {e}");
                    let _ = tx.send(AppMessage::SlotSaveFailed { slot }).await;
                }
            }
        });
    }

    fn delete_slot(&mut self, slot: u8) {
        let Some(list_id) = self.session.selected_list else {
            return;
        };
        if self.session.slots.get(slot).is_none() {
            // Deleting an empty slot is a no-op.
            return;
        }
        let gateway = self.gateway.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match gateway.delete_saved_filter(list_id, slot).await {
                Ok(()) => {
                    if let Ok(filters) = gateway.saved_filters(list_id).await {
                        let _ = tx.send(AppMessage::SlotsLoaded { list_id, filters }).await;
                    }
                }
                Err(e) => warn!("filter delete failed for slot {slot}: {e}"),
            }
        });
    }

    // ── Item plumbing ─────────────────────────────────────────────────────────

    pub(crate) fn visible(&self) -> Vec<&Channel> {
        visible_channels(&self.session.channels, &self.session.view)
    }

    pub(crate) fn items_len(&self) -> usize {
        match self.tab {
            Tab::Channels => self.visible().len(),
            Tab::Favorites => self.session.favorites.len(),
            Tab::Groups => self.session.groups.len(),
            Tab::History => self.session.history.len(),
            Tab::Settings => self.channel_lists.len(),
        }
    }

    pub(crate) fn focused_channel(&self) -> Option<Channel> {
        match self.tab {
            Tab::Channels => self.visible().get(self.focused).map(|c| (*c).clone()),
            Tab::Favorites => self.session.favorites.get(self.focused).cloned(),
            Tab::History => self.session.history.get(self.focused).cloned(),
            _ => None,
        }
    }

    fn auto_select_focused(&mut self) {
        if self.tab.shows_channels() {
            if let Some(channel) = self.focused_channel() {
                self.selected_channel = Some(channel);
            }
        }
    }

    fn clamp_focus(&mut self) {
        let len = self.items_len();
        if len == 0 {
            self.focused = 0;
        } else if self.focused >= len {
            self.focused = len - 1;
        }
    }
}

/// Fetch the backend's enablement set and push it into the event loop, so a
/// failed bulk operation converges back onto what the backend accepted.
async fn reconcile_enablement<G: Gateway>(
    gateway: &G,
    list_id: i64,
    tx: &mpsc::Sender<AppMessage>,
) {
    match gateway.enabled_groups(list_id).await {
        Ok(enabled) => {
            let _ = tx
                .send(AppMessage::EnablementReloaded {
                    list_id,
                    enabled: enabled.into_iter().collect(),
                })
                .await;
        }
        Err(e) => warn!("enablement reconcile failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::DisplayMode;
    use crate::testgw::{channel, FakeGateway};

    fn app_with(gateway: Arc<FakeGateway>) -> (App<FakeGateway>, mpsc::Receiver<AppMessage>) {
        App::new(gateway, Config::default())
    }

    /// Drain `n` pending messages from the background tasks into the app.
    async fn pump(app: &mut App<FakeGateway>, rx: &mut mpsc::Receiver<AppMessage>, n: usize) {
        for _ in 0..n {
            let msg = rx.recv().await.expect("expected a message");
            app.handle_message(msg);
        }
    }

    #[tokio::test]
    async fn j_twice_moves_focus_and_auto_selects() {
        let gateway = Arc::new(FakeGateway::new());
        let (mut app, _rx) = app_with(gateway);
        app.session.channels = vec![
            channel("A", "News"),
            channel("B", "News"),
            channel("C", "News"),
        ];
        app.session.view.set_mode(DisplayMode::AllGroups);

        app.dispatch(Action::MoveFocus(1));
        app.dispatch(Action::MoveFocus(1));

        assert_eq!(app.focused, 2);
        assert_eq!(app.selected_channel.as_ref().unwrap().name, "C");
    }

    #[tokio::test]
    async fn focus_clamps_at_both_ends() {
        let gateway = Arc::new(FakeGateway::new());
        let (mut app, _rx) = app_with(gateway);
        app.session.channels = vec![channel("A", "News"), channel("B", "News")];
        app.session.view.set_mode(DisplayMode::AllGroups);

        app.dispatch(Action::MoveFocus(10));
        assert_eq!(app.focused, 1);
        app.dispatch(Action::MoveFocus(-10));
        assert_eq!(app.focused, 0);
        app.dispatch(Action::PageEnd);
        assert_eq!(app.focused, 1);
        app.dispatch(Action::PageStart);
        assert_eq!(app.focused, 0);
    }

    #[tokio::test]
    async fn alt_digit_saves_and_digit_restores() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.add_list(1, vec![channel("A", "Sports")], vec!["Sports".into()], vec![]);
        let (mut app, mut rx) = app_with(gateway);
        app.session.selected_list = Some(1);
        app.search.set_query("news");
        app.session.view.select_group("Sports".into());

        app.dispatch(Action::SaveSlot(3));
        pump(&mut app, &mut rx, 2).await; // SlotsLoaded + SlotSaved

        let saved = app.session.slots.get(3).expect("slot 3 saved").clone();
        assert_eq!(saved.name, "Sports + \"news\"");
        assert_eq!(saved.search_query, "news");
        assert_eq!(saved.selected_group.as_deref(), Some("Sports"));

        // Wipe the live state, then restore from the slot.
        app.search.set_query("");
        app.session.view.clear_filter();
        app.tab = Tab::Groups;
        app.focused = 7;

        app.dispatch(Action::ApplySlot(3));
        assert_eq!(app.search.query(), "news");
        assert_eq!(app.session.view.mode, DisplayMode::AllGroups);
        assert_eq!(app.session.view.selected.as_deref(), Some("Sports"));
        assert_eq!(app.tab, Tab::Channels);
        assert_eq!(app.focused, 0);
    }

    #[tokio::test]
    async fn applying_a_groupless_filter_restores_enabled_view() {
        let gateway = Arc::new(FakeGateway::new());
        let (mut app, _rx) = app_with(gateway);
        app.session.slots.replace(vec![SavedFilter {
            slot_number: 0,
            search_query: String::new(),
            selected_group: None,
            name: "All + No search".into(),
        }]);
        app.session.view.select_group("Sports".into());

        app.dispatch(Action::ApplySlot(0));
        assert_eq!(app.session.view.mode, DisplayMode::EnabledGroups);
        assert_eq!(app.session.view.selected, None);
    }

    #[tokio::test]
    async fn playing_a_channel_refreshes_history() {
        let gateway = Arc::new(FakeGateway::new());
        let (mut app, mut rx) = app_with(gateway.clone());
        app.session.channels = vec![channel("A", "News")];
        app.session.view.set_mode(DisplayMode::AllGroups);

        app.dispatch(Action::Activate);
        pump(&mut app, &mut rx, 1).await; // HistoryLoaded

        assert_eq!(gateway.history_snapshot().len(), 1);
        assert_eq!(app.session.history.len(), 1);
        assert_eq!(app.session.history[0].name, "A");
        assert_eq!(app.selected_channel.as_ref().unwrap().name, "A");
    }

    #[tokio::test]
    async fn favorite_toggle_round_trips() {
        let gateway = Arc::new(FakeGateway::new());
        let (mut app, mut rx) = app_with(gateway.clone());
        app.session.channels = vec![channel("A", "News")];
        app.session.view.set_mode(DisplayMode::AllGroups);

        app.dispatch(Action::ToggleFavorite);
        pump(&mut app, &mut rx, 1).await;
        assert_eq!(app.session.favorites.len(), 1);
        assert_eq!(gateway.favorites_snapshot().len(), 1);

        app.dispatch(Action::ToggleFavorite);
        pump(&mut app, &mut rx, 1).await;
        assert!(app.session.favorites.is_empty());
        assert!(gateway.favorites_snapshot().is_empty());
    }

    #[tokio::test]
    async fn group_toggle_rolls_back_on_backend_failure() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.add_list(1, vec![], vec!["News".into()], vec![]);
        gateway.fail_on("group_selection");
        let (mut app, mut rx) = app_with(gateway);
        app.session.selected_list = Some(1);
        app.session.groups = vec!["News".into()];
        app.tab = Tab::Groups;

        app.dispatch(Action::ToggleGroupEnabled);
        assert!(app.session.view.is_enabled("News"), "optimistic flip");
        pump(&mut app, &mut rx, 1).await; // GroupToggleFailed
        assert!(!app.session.view.is_enabled("News"), "rolled back");
    }

    #[tokio::test]
    async fn search_failure_falls_back_to_unfiltered() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.add_list(
            1,
            vec![channel("Alpha", "News"), channel("Beta", "News")],
            vec!["News".into()],
            vec!["News".into()],
        );
        gateway.fail_on("search");
        let (mut app, mut rx) = app_with(gateway);
        app.session.selected_list = Some(1);

        app.search.set_query("alpha");
        let plan = app.search.fire(false);
        app.spawn_search(plan);
        pump(&mut app, &mut rx, 1).await;

        assert!(!app.search.is_searching);
        // The fallback reloaded the full list instead of leaving stale data.
        assert_eq!(app.session.channels.len(), 2);
    }

    #[tokio::test]
    async fn search_typed_during_a_switch_runs_after_commit() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.add_list(
            1,
            vec![channel("Alpha News", "News"), channel("Beta Film", "News")],
            vec!["News".into()],
            vec!["News".into()],
        );
        let (mut app, mut rx) = app_with(gateway);

        app.dispatch(Action::SelectChannelList(1));
        assert!(app.session.search_suppressed);

        // The user types while the switch is still loading: the debounce
        // fires but the resolution stays inert.
        app.search.set_query("alpha");
        let plan = app.search.fire(app.session.search_suppressed);
        assert_eq!(plan, SearchPlan::Suppressed);
        app.spawn_search(plan);

        pump(&mut app, &mut rx, 1).await; // ListLoaded -> commit + reevaluate
        assert!(!app.session.search_suppressed);
        pump(&mut app, &mut rx, 1).await; // SearchDone for the latched query

        assert_eq!(app.session.channels.len(), 1);
        assert_eq!(app.session.channels[0].name, "Alpha News");
    }

    #[tokio::test]
    async fn deleting_a_slot_removes_it_and_is_idempotent() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.add_list(1, vec![], vec![], vec![]);
        let (mut app, mut rx) = app_with(gateway);
        app.session.selected_list = Some(1);
        app.search.set_query("news");

        app.dispatch(Action::SaveSlot(5));
        pump(&mut app, &mut rx, 2).await;
        assert!(app.session.slots.get(5).is_some());

        app.dispatch(Action::DeleteSlot(5));
        pump(&mut app, &mut rx, 1).await; // SlotsLoaded
        assert!(app.session.slots.get(5).is_none());

        // Deleting again issues nothing.
        app.dispatch(Action::DeleteSlot(5));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn selecting_a_group_from_the_groups_tab_switches_to_channels() {
        let gateway = Arc::new(FakeGateway::new());
        let (mut app, _rx) = app_with(gateway);
        app.session.groups = vec!["News".into(), "Sports".into()];
        app.tab = Tab::Groups;
        app.focused = 1;

        app.dispatch(Action::Activate);
        assert_eq!(app.tab, Tab::Channels);
        assert_eq!(app.session.view.selected.as_deref(), Some("Sports"));
        assert_eq!(app.session.view.mode, DisplayMode::AllGroups);
        assert_eq!(app.focused, 0);
    }

    #[tokio::test]
    async fn stale_search_results_are_discarded() {
        let gateway = Arc::new(FakeGateway::new());
        let (mut app, _rx) = app_with(gateway);
        app.session.selected_list = Some(1);
        app.session.channels = vec![channel("Current", "News")];
        app.session.view.set_mode(DisplayMode::AllGroups);

        // A resolution for a list that is no longer selected.
        app.handle_message(AppMessage::SearchDone {
            seq: 0,
            list_id: Some(9),
            channels: Some(vec![channel("Stale", "Old")]),
        });
        assert_eq!(app.session.channels[0].name, "Current");
    }

    #[tokio::test]
    async fn tab_ring_cycles_and_resets_focus() {
        let gateway = Arc::new(FakeGateway::new());
        let (mut app, _rx) = app_with(gateway);
        app.focused = 5;
        app.dispatch(Action::NextTab);
        assert_eq!(app.tab, Tab::Favorites);
        assert_eq!(app.focused, 0);
        for _ in 0..4 {
            app.dispatch(Action::NextTab);
        }
        assert_eq!(app.tab, Tab::Channels);
    }
}
