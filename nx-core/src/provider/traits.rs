//! Capability seams for the two upstream providers (spec.md §4.6, §6, §9).
//!
//! `CatalogSource` is the only mandatory trait a provider adapter implements
//! (`scan`); everything else — category listing, detail enrichment, URL
//! building — is an optional capability exposed through an `as_*` accessor,
//! the same registry-of-capabilities shape the rest of this codebase (and
//! the wider corpus) uses instead of downcasting a trait object.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::{
    models::{Category, RawRecord, WorkSourceRef},
    Result,
};

use super::context::ProviderContext;

pub type RawRecordStream = BoxStream<'static, Result<RawRecord>>;

/// Mandatory capability: produce a cold stream of raw records for one
/// content-type phase (spec.md §4.6). `since_ms` is `None` for a full scan
/// and `Some(timestamp)` for an incremental one; sources without native
/// incremental support simply ignore it and let the pipeline's timestamp
/// filter (tier-3) do the skipping.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Provider type name, matching `SourceType` in the key codec (e.g.
    /// `"xtream"`, `"tg"`).
    fn name(&self) -> &'static str;

    async fn scan(
        &self,
        ctx: &ProviderContext<'_>,
        content_type: &str,
        since_ms: Option<i64>,
    ) -> Result<RawRecordStream>;

    /// True if this source can filter server-side by `since_ms` rather than
    /// relying on the pipeline's client-side timestamp filter.
    fn supports_native_incremental_sync(&self) -> bool {
        false
    }

    fn as_category_provider(&self) -> Option<&dyn CategoryProvider> {
        None
    }
}

/// Optional capability: list the provider's category taxonomy
/// (`loadCategories`, spec.md §4.8).
#[async_trait]
pub trait CategoryProvider: Send + Sync {
    async fn load_categories(
        &self,
        ctx: &ProviderContext<'_>,
        content_type: &str,
    ) -> Result<Vec<Category>>;
}

/// A metadata update the detail enrichment service (§4.9) applies to a
/// `Work`. Fields are `None` when the source had nothing new to offer.
#[derive(Debug, Clone, Default)]
pub struct DetailUpdate {
    pub plot: Option<String>,
    pub rating: Option<f32>,
    pub genres: Option<Vec<String>>,
    pub cast: Option<Vec<String>>,
    pub director: Option<String>,
    pub poster: Option<String>,
    pub backdrop: Option<String>,
    pub trailer: Option<String>,
    pub container_hint: Option<String>,
}

/// Optional capability: fetch richer metadata for one `Work` on demand
/// (spec.md §4.9). Providers implementing this are tried in the priority
/// order the enrichment service defines (xtream-style provider detail
/// first, authority lookup second).
#[async_trait]
pub trait DetailSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_detail(
        &self,
        ctx: &ProviderContext<'_>,
        source_ref: &WorkSourceRef,
    ) -> Result<DetailUpdate>;
}

/// Builds the opaque stream URI handed off to the (out-of-scope) playback
/// layer, per the two wire formats reproduced in spec.md §6.
pub trait UrlBuilder: Send + Sync {
    fn name(&self) -> &'static str;

    fn build_url(&self, source_ref: &WorkSourceRef, quality_tag: &str) -> Result<String>;
}

/// Injected into the normalizer (§4.5); never performs I/O from inside the
/// normalizer itself — this trait is where the I/O boundary lives.
#[async_trait]
pub trait AuthorityResolver: Send + Sync {
    async fn resolve_movie(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> Result<Option<crate::models::ExternalIds>>;

    async fn resolve_series(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> Result<Option<crate::models::ExternalIds>>;
}

/// An `AuthorityResolver` that never resolves anything — the normalizer's
/// default when no authority lookup is configured. Title+year+kind slugging
/// (identity preference tier 2) still works without it.
pub struct NoopAuthorityResolver;

#[async_trait]
impl AuthorityResolver for NoopAuthorityResolver {
    async fn resolve_movie(
        &self,
        _title: &str,
        _year: Option<i32>,
    ) -> Result<Option<crate::models::ExternalIds>> {
        Ok(None)
    }

    async fn resolve_series(
        &self,
        _title: &str,
        _year: Option<i32>,
    ) -> Result<Option<crate::models::ExternalIds>> {
        Ok(None)
    }
}
