//! HTTP client for upstream provider A (spec.md §6): `player_api.php?action=...`.
//!
//! Mirrors the teacher's `BilibiliClient` shape — a shared, connection-pooled
//! `reqwest::Client`, one method per upstream action, JSON deserialized
//! straight into the wire types in [`super::types`]. Credentials travel as
//! `username`/`password` query params and are never written to a log line;
//! [`redact_url`] is the single place that scrubs them before a URL reaches
//! `tracing`.

use std::sync::LazyLock;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{check_response, ProviderClientError};

use super::types::{
    XtreamCategory, XtreamLiveStream, XtreamSeries, XtreamSeriesInfo, XtreamVodInfo,
    XtreamVodStream,
};

static SHARED_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .build()
        .expect("failed to build xtream shared HTTP client")
});

/// Redacts `username=...` and `password=...` query parameters from a URL
/// before it is allowed into a log line (spec.md §6, §7).
#[must_use]
pub fn redact_url(url: &str) -> String {
    let mut redacted = url.to_string();
    for param in ["username", "password"] {
        let needle = format!("{param}=");
        if let Some(start) = redacted.find(&needle) {
            let value_start = start + needle.len();
            let value_end = redacted[value_start..]
                .find('&')
                .map_or(redacted.len(), |i| value_start + i);
            redacted.replace_range(value_start..value_end, "****");
        }
    }
    redacted
}

#[derive(Debug, Clone)]
pub struct XtreamConnection {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

pub struct XtreamClient {
    client: Client,
    conn: XtreamConnection,
}

impl XtreamClient {
    #[must_use]
    pub fn new(conn: XtreamConnection) -> Self {
        Self {
            client: SHARED_CLIENT.clone(),
            conn,
        }
    }

    fn action_url(&self, action: &str, extra: &[(&str, &str)]) -> String {
        let mut url = format!(
            "{}/player_api.php?username={}&password={}&action={}",
            self.conn.base_url.trim_end_matches('/'),
            self.conn.username,
            self.conn.password,
            action
        );
        for (key, value) in extra {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(value);
        }
        url
    }

    /// Issues one request and parses the JSON body, with no retry of its
    /// own — [`get_json`](Self::get_json) wraps this with the spec's retry
    /// policy.
    async fn get_json_once<T: DeserializeOwned>(&self, url: &str) -> Result<T, ProviderClientError> {
        let resp = check_response(self.client.get(url).send().await?)?;
        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            ProviderClientError::Parse(format!(
                "{e} (url={})",
                redact_url(url)
            ))
        })
    }

    /// 4xx responses are input errors and are not retried. 5xx responses and
    /// connect/network errors retry with exponential backoff, capped at 3
    /// attempts with an initial delay of 1s (spec.md §7).
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ProviderClientError> {
        const MAX_ATTEMPTS: u32 = 3;
        let mut delay = Duration::from_secs(1);

        for attempt in 1..=MAX_ATTEMPTS {
            match self.get_json_once(url).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < MAX_ATTEMPTS && is_retryable(&err) => {
                    warn!(
                        attempt,
                        error = %err,
                        url = %redact_url(url),
                        "retrying xtream request after transient error"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(err) => return Err(err),
            }
        }
        unreachable!("loop always returns within MAX_ATTEMPTS")
    }

    pub async fn get_categories(
        &self,
        content_type: &str,
    ) -> Result<Vec<XtreamCategory>, ProviderClientError> {
        let action = categories_action(content_type)?;
        let url = self.action_url(action, &[]);
        self.get_json(&url).await
    }

    /// Listing fallback (spec.md §6, §8): try `category_id=*`, then
    /// `category_id=0`, then no category parameter at all, stopping at the
    /// first attempt that yields a non-empty list.
    async fn list_with_category_fallback<T: DeserializeOwned>(
        &self,
        action: &str,
    ) -> Result<Vec<T>, ProviderClientError> {
        for attempt in [Some("*"), Some("0"), None] {
            let url = match attempt {
                Some(category_id) => self.action_url(action, &[("category_id", category_id)]),
                None => self.action_url(action, &[]),
            };
            let items: Vec<T> = self.get_json(&url).await?;
            if !items.is_empty() {
                return Ok(items);
            }
        }
        Ok(Vec::new())
    }

    pub async fn get_live_streams(&self) -> Result<Vec<XtreamLiveStream>, ProviderClientError> {
        self.list_with_category_fallback("get_live_streams").await
    }

    pub async fn get_vod_streams(&self) -> Result<Vec<XtreamVodStream>, ProviderClientError> {
        self.list_with_category_fallback("get_vod_streams").await
    }

    pub async fn get_series(&self) -> Result<Vec<XtreamSeries>, ProviderClientError> {
        self.list_with_category_fallback("get_series").await
    }

    pub async fn get_vod_info(&self, vod_id: i64) -> Result<XtreamVodInfo, ProviderClientError> {
        let url = self.action_url("get_vod_info", &[("vod_id", &vod_id.to_string())]);
        self.get_json(&url).await
    }

    pub async fn get_series_info(
        &self,
        series_id: i64,
    ) -> Result<XtreamSeriesInfo, ProviderClientError> {
        let url = self.action_url("get_series_info", &[("series_id", &series_id.to_string())]);
        self.get_json(&url).await
    }

    /// Raw pass-through (spec.md §6: "raw pass-through").
    pub async fn get_short_epg(
        &self,
        stream_id: i64,
        limit: u32,
    ) -> Result<serde_json::Value, ProviderClientError> {
        let url = self.action_url(
            "get_short_epg",
            &[("stream_id", &stream_id.to_string()), ("limit", &limit.to_string())],
        );
        self.get_json(&url).await
    }

    /// Builds the opaque live/VOD/series stream URL form reproduced in
    /// spec.md §6: `<scheme>://<host>:<port>/{live|movie|series}/<user>/<pass>/<id>.<ext>`.
    #[must_use]
    pub fn build_stream_url(&self, kind: &str, id: &str, ext: &str) -> String {
        format!(
            "{}/{kind}/{}/{}/{id}.{ext}",
            self.conn.base_url.trim_end_matches('/'),
            self.conn.username,
            self.conn.password,
        )
    }
}

/// 5xx and network/connect errors are retryable; 4xx (bad input) is not
/// (spec.md §7).
fn is_retryable(err: &ProviderClientError) -> bool {
    match err {
        ProviderClientError::Network(_) => true,
        ProviderClientError::Http { status, .. } => status.is_server_error(),
        _ => false,
    }
}

fn categories_action(content_type: &str) -> Result<&'static str, ProviderClientError> {
    match content_type {
        "live" => Ok("get_live_categories"),
        "vod" => Ok("get_vod_categories"),
        "series" | "episode" => Ok("get_series_categories"),
        other => Err(ProviderClientError::InvalidConfig(format!(
            "unknown xtream content type: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_url_scrubs_credentials() {
        let url = "http://host:80/player_api.php?username=alice&password=hunter2&action=get_vod_streams";
        let redacted = redact_url(url);
        assert!(!redacted.contains("alice"));
        assert!(!redacted.contains("hunter2"));
        assert!(redacted.contains("action=get_vod_streams"));
    }

    #[test]
    fn server_errors_and_network_errors_are_retryable() {
        assert!(is_retryable(&ProviderClientError::Network(
            "connection reset".to_string()
        )));
        assert!(is_retryable(&ProviderClientError::Http {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            url: "http://host/x".to_string(),
        }));
    }

    #[test]
    fn client_errors_are_not_retryable() {
        assert!(!is_retryable(&ProviderClientError::Http {
            status: reqwest::StatusCode::NOT_FOUND,
            url: "http://host/x".to_string(),
        }));
        assert!(!is_retryable(&ProviderClientError::Parse(
            "bad json".to_string()
        )));
    }
}
