//! Minimal credentials resolver (SPEC_FULL.md ambient addition).
//!
//! Real secret-store integration is out of scope (spec.md Non-goals); this
//! resolver treats `credentials_handle` as `"<username>:<password>"`
//! directly so the rest of the xtream adapter can be exercised without one.

use async_trait::async_trait;
use nx_providers::xtream::XtreamCredentialsResolver;

pub struct PlainCredentialsResolver;

#[async_trait]
impl XtreamCredentialsResolver for PlainCredentialsResolver {
    async fn resolve(&self, credentials_handle: &str) -> nx_core::Result<(String, String)> {
        credentials_handle
            .split_once(':')
            .map(|(user, pass)| (user.to_string(), pass.to_string()))
            .ok_or_else(|| {
                nx_core::Error::InvalidInput(format!(
                    "credentials_handle {credentials_handle} is not in \"user:pass\" form"
                ))
            })
    }
}
