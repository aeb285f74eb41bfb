//! Shared provider client error types
//!
//! Common error enum and utilities used by the upstream provider HTTP/parse
//! clients (xtream, telegram export). Converts into `nx_core::Error` so the
//! `CatalogSource`/`DetailSource` trait methods (which return
//! `nx_core::Result`) can use `?` directly.

use thiserror::Error;

/// Common error type for all provider HTTP clients.
#[derive(Debug, Error)]
pub enum ProviderClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error {status} for {url}")]
    Http { status: reqwest::StatusCode, url: String },

    #[error("API error (code {code}): {message}")]
    Api { code: u64, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Check HTTP response status before processing body.
pub fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ProviderClientError> {
    let status = resp.status();
    if status.is_client_error() || status.is_server_error() {
        return Err(ProviderClientError::Http {
            status,
            url: resp.url().to_string(),
        });
    }
    Ok(resp)
}

impl From<reqwest::Error> for ProviderClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ProviderClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// 4xx are input errors, not retried; 5xx/connect errors are retried with
/// backoff by the HTTP client itself before this conversion ever runs
/// (spec.md §7, see `xtream::client::get_json`). This mapping only carries
/// the final status code through to `nx_core::Error` once retries (if any)
/// are exhausted.
impl From<ProviderClientError> for nx_core::Error {
    fn from(err: ProviderClientError) -> Self {
        match err {
            ProviderClientError::Http { status, .. } => nx_core::Error::ProviderHttp(status.as_u16()),
            ProviderClientError::Network(msg) => nx_core::Error::Internal(msg),
            ProviderClientError::Parse(msg) => nx_core::Error::ParseError(msg),
            ProviderClientError::Api { code, message } => {
                nx_core::Error::ParseError(format!("api error {code}: {message}"))
            }
            ProviderClientError::InvalidConfig(msg) => nx_core::Error::InvalidInput(msg),
        }
    }
}
