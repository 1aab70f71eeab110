//! Stores backed by the hosted REST API.
//!
//! One blocking client serves all three seams. Requests carry the
//! identity provider's bearer token when one is available; the server
//! scopes rows by that token, which is why the `user_id` arguments are
//! not sent over the wire.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use grail_sync::api::{HttpStore, SearchStore};
//! use grail_sync::identity::StaticIdentity;
//! use grail_sync::SyncConfig;
//!
//! let identity = StaticIdentity::user("user-1").with_token("jwt-abc");
//! let config = SyncConfig::from_env();
//! let store = HttpStore::new(&config, Arc::new(identity))?;
//!
//! let searches = store.list_searches("user-1")?;
//! ```

use std::sync::Arc;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::{AlertQuery, AlertStore, ApiError, Page, SearchStore, SeriesStore};
use crate::config::SyncConfig;
use crate::identity::IdentityProvider;
use crate::record::{Alert, ComicSeries, GrailSearch, SearchDraft, SearchPatch};

#[derive(Clone)]
pub struct HttpStore {
    base: Url,
    client: Client,
    identity: Arc<dyn IdentityProvider>,
}

impl HttpStore {
    pub fn new(
        config: &SyncConfig,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, ApiError> {
        // A trailing slash makes relative joins keep any path prefix.
        let mut base = config.api_base_url().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base).map_err(|err| {
            ApiError::Transport(format!(
                "invalid api base url {:?}: {}",
                config.api_base_url(),
                err
            ))
        })?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        Ok(HttpStore {
            base,
            client,
            identity,
        })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|err| ApiError::Transport(format!("invalid path {:?}: {}", path, err)))
    }

    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        match self.identity.access_token() {
            Ok(Some(token)) => Ok(request.bearer_auth(token)),
            Ok(None) => Ok(request),
            Err(err) => Err(ApiError::Transport(format!(
                "could not resolve access token: {}",
                err
            ))),
        }
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let request = self.authorize(request)?;
        let response = request
            .send()
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("").to_string();
        let bytes = response
            .bytes()
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::from_response(status.as_u16(), &reason, &bytes));
        }
        if status == StatusCode::NO_CONTENT || bytes.is_empty() {
            return serde_json::from_value(Value::Null)
                .map_err(|err| ApiError::Decode(format!("empty response: {}", err)));
        }
        serde_json::from_slice(&bytes).map_err(ApiError::from)
    }
}

#[derive(Deserialize)]
struct SearchList {
    searches: Vec<GrailSearch>,
}

#[derive(Deserialize)]
struct AlertList {
    alerts: Vec<Alert>,
    pagination: PageInfo,
}

/// Only the total is interesting; the window is what we asked for.
#[derive(Deserialize)]
struct PageInfo {
    total: u64,
}

#[derive(Deserialize)]
struct SeriesList {
    series: Vec<ComicSeries>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusBody {
    is_active: bool,
}

impl SearchStore for HttpStore {
    fn list_searches(&self, _user_id: &str) -> Result<Vec<GrailSearch>, ApiError> {
        let url = self.url("api/searches")?;
        let list: SearchList = self.send(self.client.get(url))?;
        Ok(list.searches)
    }

    fn get_search(&self, _user_id: &str, id: &str) -> Result<GrailSearch, ApiError> {
        let url = self.url(&format!("api/searches/{}", id))?;
        self.send(self.client.get(url))
    }

    fn create_search(&self, _user_id: &str, draft: &SearchDraft) -> Result<GrailSearch, ApiError> {
        let url = self.url("api/searches")?;
        self.send(self.client.post(url).json(draft))
    }

    fn update_search(
        &self,
        _user_id: &str,
        id: &str,
        patch: &SearchPatch,
    ) -> Result<GrailSearch, ApiError> {
        let url = self.url(&format!("api/searches/{}", id))?;
        self.send(self.client.patch(url).json(patch))
    }

    fn set_search_active(
        &self,
        _user_id: &str,
        id: &str,
        active: bool,
    ) -> Result<GrailSearch, ApiError> {
        let url = self.url(&format!("api/searches/{}/status", id))?;
        self.send(self.client.patch(url).json(&StatusBody { is_active: active }))
    }

    fn delete_search(&self, _user_id: &str, id: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("api/searches/{}", id))?;
        self.send(self.client.delete(url))
    }
}

impl AlertStore for HttpStore {
    fn list_alerts(&self, _user_id: &str, query: &AlertQuery) -> Result<Page<Alert>, ApiError> {
        let mut url = self.url("api/alerts")?;
        url.set_query(Some(&query.to_query_string()));
        let list: AlertList = self.send(self.client.get(url))?;
        Ok(Page::new(list.alerts, list.pagination.total))
    }
}

impl SeriesStore for HttpStore {
    fn search_series(&self, query: &str) -> Result<Vec<ComicSeries>, ApiError> {
        if query.trim().chars().count() < 2 {
            return Ok(Vec::new());
        }
        let mut url = self.url("api/series/search")?;
        url.query_pairs_mut().append_pair("q", query);
        let list: SeriesList = self.send(self.client.get(url))?;
        Ok(list.series)
    }
}
