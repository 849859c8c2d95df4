//! Backend gateway — the client's only window onto persistent state.
//!
//! Every operation is an asynchronous request/response call that can fail.
//! The trait keeps the session layer independent of the transport:
//! `HttpGateway` talks JSON to the backend daemon, tests substitute an
//! in-memory implementation.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::model::{Channel, ChannelList, SavedFilter};

/// Failure modes of a backend call.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The call was rejected, timed out, or the daemon is unreachable.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    /// A referenced id does not exist on the backend.
    #[error("not found: {0}")]
    NotFound(String),
    /// The backend rejected the request as malformed.
    #[error("invalid request: {0}")]
    Validation(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Request/response operations the client depends on.
///
/// `list_id: None` means "the backend's default list" for read operations
/// that accept it; enablement and saved-filter operations are always bound
/// to an explicit list.
pub trait Gateway: Send + Sync {
    fn channel_lists(&self) -> impl Future<Output = GatewayResult<Vec<ChannelList>>> + Send;

    fn channels(
        &self,
        list_id: Option<i64>,
    ) -> impl Future<Output = GatewayResult<Vec<Channel>>> + Send;

    fn search_channels(
        &self,
        query: &str,
        list_id: Option<i64>,
    ) -> impl Future<Output = GatewayResult<Vec<Channel>>> + Send;

    fn groups(
        &self,
        list_id: Option<i64>,
    ) -> impl Future<Output = GatewayResult<Vec<String>>> + Send;

    fn enabled_groups(&self, list_id: i64)
        -> impl Future<Output = GatewayResult<Vec<String>>> + Send;

    /// Reconcile the backend's stored enablement rows against the current
    /// group list: new groups get rows, rows for vanished groups are pruned.
    fn sync_groups(
        &self,
        list_id: i64,
        groups: &[String],
    ) -> impl Future<Output = GatewayResult<()>> + Send;

    fn enable_all_groups(
        &self,
        list_id: i64,
        groups: &[String],
    ) -> impl Future<Output = GatewayResult<()>> + Send;

    fn update_group_selection(
        &self,
        list_id: i64,
        group: &str,
        enabled: bool,
    ) -> impl Future<Output = GatewayResult<()>> + Send;

    fn favorites(&self) -> impl Future<Output = GatewayResult<Vec<Channel>>> + Send;

    fn add_favorite(&self, channel: &Channel) -> impl Future<Output = GatewayResult<()>> + Send;

    fn remove_favorite(&self, name: &str) -> impl Future<Output = GatewayResult<()>> + Send;

    fn history(&self) -> impl Future<Output = GatewayResult<Vec<Channel>>> + Send;

    /// Hand the channel to the external player; the backend also appends it
    /// to the watch history.
    fn play_channel(&self, channel: &Channel) -> impl Future<Output = GatewayResult<()>> + Send;

    fn saved_filters(
        &self,
        list_id: i64,
    ) -> impl Future<Output = GatewayResult<Vec<SavedFilter>>> + Send;

    fn save_filter(
        &self,
        list_id: i64,
        filter: &SavedFilter,
    ) -> impl Future<Output = GatewayResult<()>> + Send;

    fn delete_saved_filter(
        &self,
        list_id: i64,
        slot: u8,
    ) -> impl Future<Output = GatewayResult<()>> + Send;
}

// ── HTTP implementation ───────────────────────────────────────────────────────

/// JSON client for the backend daemon's HTTP API.
pub struct HttpGateway {
    client: reqwest::Client,
    base: String,
}

#[derive(Serialize)]
struct GroupSyncBody<'a> {
    channel_list_id: i64,
    groups: &'a [String],
}

#[derive(Serialize)]
struct GroupSelectionBody<'a> {
    channel_list_id: i64,
    group_name: &'a str,
    enabled: bool,
}

#[derive(Serialize)]
struct SaveFilterBody<'a> {
    channel_list_id: i64,
    #[serde(flatten)]
    filter: &'a SavedFilter,
}

#[derive(Serialize)]
struct DeleteFilterBody {
    channel_list_id: i64,
    slot_number: u8,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base, path)
    }

    fn list_query(list_id: Option<i64>) -> Vec<(&'static str, String)> {
        list_id.map(|id| ("id", id.to_string())).into_iter().collect()
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> GatewayResult<T> {
        debug!("GET {path} {query:?}");
        let resp = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(transport_err)?;
        decode_json(resp).await
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> GatewayResult<()> {
        debug!("POST {path}");
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(transport_err)?;
        check_status(resp).await
    }
}

fn transport_err(e: reqwest::Error) -> GatewayError {
    GatewayError::Unavailable(e.to_string())
}

async fn error_from_status(resp: reqwest::Response) -> GatewayError {
    let status = resp.status();
    let detail = resp.text().await.unwrap_or_default();
    let detail = if detail.is_empty() {
        status.to_string()
    } else {
        detail
    };
    match status {
        reqwest::StatusCode::NOT_FOUND => GatewayError::NotFound(detail),
        reqwest::StatusCode::BAD_REQUEST => GatewayError::Validation(detail),
        _ => GatewayError::Unavailable(detail),
    }
}

async fn decode_json<T: DeserializeOwned>(resp: reqwest::Response) -> GatewayResult<T> {
    if resp.status().is_success() {
        resp.json().await.map_err(transport_err)
    } else {
        Err(error_from_status(resp).await)
    }
}

async fn check_status(resp: reqwest::Response) -> GatewayResult<()> {
    if resp.status().is_success() {
        Ok(())
    } else {
        Err(error_from_status(resp).await)
    }
}

impl Gateway for HttpGateway {
    async fn channel_lists(&self) -> GatewayResult<Vec<ChannelList>> {
        self.get_json("channel_lists", &[]).await
    }

    async fn channels(&self, list_id: Option<i64>) -> GatewayResult<Vec<Channel>> {
        self.get_json("channels", &Self::list_query(list_id)).await
    }

    async fn search_channels(
        &self,
        query: &str,
        list_id: Option<i64>,
    ) -> GatewayResult<Vec<Channel>> {
        let mut params = vec![("query", query.to_string())];
        params.extend(Self::list_query(list_id));
        self.get_json("search", &params).await
    }

    async fn groups(&self, list_id: Option<i64>) -> GatewayResult<Vec<String>> {
        self.get_json("groups", &Self::list_query(list_id)).await
    }

    async fn enabled_groups(&self, list_id: i64) -> GatewayResult<Vec<String>> {
        self.get_json("enabled_groups", &Self::list_query(Some(list_id)))
            .await
    }

    async fn sync_groups(&self, list_id: i64, groups: &[String]) -> GatewayResult<()> {
        self.post(
            "sync_groups",
            &GroupSyncBody {
                channel_list_id: list_id,
                groups,
            },
        )
        .await
    }

    async fn enable_all_groups(&self, list_id: i64, groups: &[String]) -> GatewayResult<()> {
        self.post(
            "enable_all_groups",
            &GroupSyncBody {
                channel_list_id: list_id,
                groups,
            },
        )
        .await
    }

    async fn update_group_selection(
        &self,
        list_id: i64,
        group: &str,
        enabled: bool,
    ) -> GatewayResult<()> {
        self.post(
            "group_selection",
            &GroupSelectionBody {
                channel_list_id: list_id,
                group_name: group,
                enabled,
            },
        )
        .await
    }

    async fn favorites(&self) -> GatewayResult<Vec<Channel>> {
        self.get_json("favorites", &[]).await
    }

    async fn add_favorite(&self, channel: &Channel) -> GatewayResult<()> {
        self.post("add_favorite", channel).await
    }

    async fn remove_favorite(&self, name: &str) -> GatewayResult<()> {
        #[derive(Serialize)]
        struct Body<'a> {
            name: &'a str,
        }
        self.post("remove_favorite", &Body { name }).await
    }

    async fn history(&self) -> GatewayResult<Vec<Channel>> {
        self.get_json("history", &[]).await
    }

    async fn play_channel(&self, channel: &Channel) -> GatewayResult<()> {
        self.post("play", channel).await
    }

    async fn saved_filters(&self, list_id: i64) -> GatewayResult<Vec<SavedFilter>> {
        self.get_json("saved_filters", &Self::list_query(Some(list_id)))
            .await
    }

    async fn save_filter(&self, list_id: i64, filter: &SavedFilter) -> GatewayResult<()> {
        self.post(
            "save_filter",
            &SaveFilterBody {
                channel_list_id: list_id,
                filter,
            },
        )
        .await
    }

    async fn delete_saved_filter(&self, list_id: i64, slot: u8) -> GatewayResult<()> {
        self.post(
            "delete_filter",
            &DeleteFilterBody {
                channel_list_id: list_id,
                slot_number: slot,
            },
        )
        .await
    }
}
