//! Detail enrichment service (spec.md §4.9): on-demand per-work metadata
//! refresh, gated through the priority dispatcher so a foreground UI request
//! never waits behind a background scan.

use tracing::{info, warn};

use crate::dispatch::PriorityDispatcher;
use crate::models::Work;
use crate::provider::{AuthorityResolver, DetailSource};
use crate::store::{EntityKind, NxStore};
use crate::Result;

/// `HIGH` for an ordinary UI-triggered enrichment; `CRITICAL` when the
/// result blocks immediate playback (e.g. the container extension needed to
/// build a playback URL).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichPriority {
    High,
    Critical,
}

pub struct DetailEnrichmentService<'a> {
    store: &'a NxStore,
    dispatcher: PriorityDispatcher,
    provider_detail: Option<&'a dyn DetailSource>,
    authority: &'a dyn AuthorityResolver,
}

impl<'a> DetailEnrichmentService<'a> {
    #[must_use]
    pub const fn new(
        store: &'a NxStore,
        dispatcher: PriorityDispatcher,
        provider_detail: Option<&'a dyn DetailSource>,
        authority: &'a dyn AuthorityResolver,
    ) -> Self {
        Self {
            store,
            dispatcher,
            provider_detail,
            authority,
        }
    }

    /// Refreshes `work_key`'s detail fields if missing. Fast path: a work
    /// with a non-empty plot is returned unchanged. Otherwise prefers the
    /// highest-fidelity source available: a provider detail fetch first,
    /// then an authority lookup.
    pub async fn enrich(&self, work_key: &str, priority: EnrichPriority) -> Result<Work> {
        let Some(work) = self.store.work.get(work_key).await? else {
            return Err(crate::Error::NotFound(format!("work {work_key} not found")));
        };

        if work.plot.as_deref().is_some_and(|p| !p.is_empty()) {
            return Ok(work);
        }

        let run = || async { self.enrich_inner(work).await };
        match priority {
            EnrichPriority::Critical => self.dispatcher.with_critical(run).await,
            EnrichPriority::High => self.dispatcher.with_high(run).await,
        }
    }

    async fn enrich_inner(&self, mut work: Work) -> Result<Work> {
        if let Some(provider_detail) = self.provider_detail {
            if let Some(refreshed) = self
                .try_provider_detail(&work.work_key, provider_detail)
                .await?
            {
                apply_update(&mut work, refreshed);
                return self.persist(work).await;
            }
        }

        if let Some(authority_update) = self.try_authority(&work).await? {
            apply_update(&mut work, authority_update);
            return self.persist(work).await;
        }

        warn!(work_key = %work.work_key, "no detail source yielded an update");
        Ok(work)
    }

    async fn try_provider_detail(
        &self,
        work_key: &str,
        provider_detail: &dyn DetailSource,
    ) -> Result<Option<crate::provider::DetailUpdate>> {
        let refs = self.store.work_source_ref.list_by_work(work_key).await?;
        let Some(source_ref) = refs.first() else {
            return Ok(None);
        };
        let ctx = crate::provider::ProviderContext::new(&source_ref.account_key, work_key);
        let update = provider_detail.fetch_detail(&ctx, source_ref).await?;
        Ok(Some(update))
    }

    async fn try_authority(&self, work: &Work) -> Result<Option<crate::provider::DetailUpdate>> {
        use crate::key::WorkType;

        let external_ids = match work.work_type {
            WorkType::Movie => {
                self.authority
                    .resolve_movie(&work.canonical_title, work.year)
                    .await?
            }
            WorkType::Series | WorkType::Episode => {
                self.authority
                    .resolve_series(&work.canonical_title, work.year)
                    .await?
            }
            WorkType::Live => None,
        };

        // Authority resolution here only confirms identity; it carries no
        // plot/rating/genre payload of its own in this spec's scope, so a
        // hit only clears the "no source available" case for callers that
        // just need to know an authority id exists.
        Ok(external_ids.map(|_| crate::provider::DetailUpdate::default()))
    }

    async fn persist(&self, mut work: Work) -> Result<Work> {
        // Canonical title is never overwritten by enrichment (§4.9).
        let preserved_title = work.canonical_title.clone();
        work.set_canonical_title(preserved_title);

        let saved = self.store.work.upsert(&work).await?;
        self.store.notify_changed(EntityKind::Work, saved.work_key.clone());
        info!(work_key = %saved.work_key, "enrichment upserted work");
        Ok(saved)
    }
}

fn apply_update(work: &mut Work, update: crate::provider::DetailUpdate) {
    if let Some(plot) = update.plot {
        work.plot = Some(plot);
    }
    if let Some(rating) = update.rating {
        work.rating = Some(rating);
    }
    if let Some(genres) = update.genres {
        work.genres = genres;
    }
    if let Some(cast) = update.cast {
        work.cast = cast;
    }
    if let Some(director) = update.director {
        work.director = Some(director);
    }
    if let Some(poster) = update.poster {
        work.poster = Some(poster);
    }
    if let Some(backdrop) = update.backdrop {
        work.backdrop = Some(backdrop);
    }
    if let Some(trailer) = update.trailer {
        work.trailer = Some(trailer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::WorkType;

    #[test]
    fn apply_update_never_touches_canonical_title() {
        let mut work = Work::new("movie:x:2020".to_string(), WorkType::Movie, "X".to_string());
        let update = crate::provider::DetailUpdate {
            plot: Some("plot".to_string()),
            ..Default::default()
        };
        apply_update(&mut work, update);
        assert_eq!(work.canonical_title, "X");
        assert_eq!(work.plot.as_deref(), Some("plot"));
    }
}
