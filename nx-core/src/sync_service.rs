//! Catalog sync service (spec.md §4.8): phased, cancellable orchestration of
//! a single account's provider scan. Ties together the decider, the
//! normalizer, the channel sync buffer, the ingest ledger, and the priority
//! dispatcher, the same service-struct-holding-collaborators shape the
//! teacher uses for its own orchestration services.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::decider::{IncrementalSyncDecider, SyncDecision};
use crate::dispatch::PriorityDispatcher;
use crate::key::{self, SourceKind, SourceType, WorkType};
use crate::ledger::{fingerprint_fields, IngestLedger};
use crate::models::{
    Category, Checkpoint, FingerprintEntry, IngestLedgerEntry, Phase, RawRecord, ReasonCode,
    ScanCounts, SyncStatus, Work, WorkSourceRef, WorkVariant,
};
use crate::normalize::Normalizer;
use crate::provider::{CatalogSource, NoopAuthorityResolver, ProviderContext};
use crate::store::{BatchGuard, EntityKind, NxStore};
use crate::syncbuf::{SyncBuffer, DEFAULT_CAPACITY, LOW_RAM_CAPACITY};
use crate::Result;

/// Minimum usable clip length, in milliseconds, below which a VOD item is
/// rejected as `REJECTED_TOO_SHORT`. Not named explicitly in spec.md's prose
/// but implied by the reason code's existence and §8 scenario 5.
const MIN_DURATION_MS: i64 = 60_000;

/// Ambient addition (SPEC_FULL §4.8): content types enabled, consumer
/// concurrency, batch size, and the force-full flag, with named presets for
/// the default and low-RAM device profiles.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub enabled_phases: Vec<Phase>,
    pub consumer_concurrency: usize,
    pub batch_size: usize,
    pub buffer_capacity: usize,
    pub force_full: bool,
}

impl SyncConfig {
    #[must_use]
    pub fn default_profile() -> Self {
        Self {
            enabled_phases: Phase::ordered().to_vec(),
            consumer_concurrency: 3,
            batch_size: 200,
            buffer_capacity: DEFAULT_CAPACITY,
            force_full: false,
        }
    }

    #[must_use]
    pub fn low_ram() -> Self {
        Self {
            enabled_phases: Phase::ordered().to_vec(),
            consumer_concurrency: 2,
            batch_size: 50,
            buffer_capacity: LOW_RAM_CAPACITY,
            force_full: false,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::default_profile()
    }
}

/// Handle returned alongside the `SyncStatus` stream; `cancel()` requests
/// cooperative cancellation and returns immediately (§4.8).
#[derive(Clone)]
pub struct SyncHandle {
    token: CancellationToken,
}

impl SyncHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

pub struct CatalogSyncService {
    store: NxStore,
    dispatcher: PriorityDispatcher,
    decider: IncrementalSyncDecider,
    ledger: IngestLedger,
    sync_generation_clock: Arc<AtomicU64>,
}

impl CatalogSyncService {
    #[must_use]
    pub fn new(
        store: NxStore,
        dispatcher: PriorityDispatcher,
        decider: IncrementalSyncDecider,
        ledger: IngestLedger,
    ) -> Self {
        Self {
            store,
            dispatcher,
            decider,
            ledger,
            sync_generation_clock: Arc::new(AtomicU64::new(1)),
        }
    }

    /// `loadCategories(accountKey)` (§4.8): current category taxonomy for the
    /// account's source type, refreshed from the provider when it exposes a
    /// `CategoryProvider` capability.
    pub async fn load_categories(
        &self,
        account_key: &str,
        source: &dyn CatalogSource,
        content_type: &str,
    ) -> Result<Vec<Category>> {
        if let Some(category_provider) = source.as_category_provider() {
            let ctx = ProviderContext::new(account_key, account_key);
            let fetched = category_provider.load_categories(&ctx, content_type).await?;
            for category in &fetched {
                self.store.category.upsert(category).await?;
            }
        }
        self.store
            .category
            .list_by_account(account_key, source.name())
            .await
    }

    /// `clearCheckpoint(accountKey)` (§4.8): resets resume state.
    pub async fn clear_checkpoint(&self, account_key: &str) -> Result<u64> {
        self.store.checkpoint.clear_account(account_key).await
    }

    /// `sync(config)` (§4.8): runs every enabled phase in fixed order
    /// (`live -> vod -> series -> episodes`), returning a cancellable
    /// `SyncStatus` stream and a handle to request cancellation.
    pub fn sync(
        &self,
        account_key: String,
        source: Arc<dyn CatalogSource>,
        config: SyncConfig,
    ) -> (ReceiverStream<SyncStatus>, SyncHandle) {
        let (tx, rx) = mpsc::channel(16);
        let token = CancellationToken::new();
        let handle = SyncHandle {
            token: token.clone(),
        };

        let store = self.store.clone();
        let dispatcher = self.dispatcher.clone();
        let decider = self.decider.clone();
        let ledger = self.ledger.clone();
        let generation = self.sync_generation_clock.clone();
        let source_type = source.name().to_string();

        tokio::spawn(run_sync(
            account_key,
            source,
            config,
            store,
            dispatcher,
            decider,
            ledger,
            generation,
            source_type,
            token,
            tx,
        ));

        (ReceiverStream::new(rx), handle)
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_sync(
    account_key: String,
    source: Arc<dyn CatalogSource>,
    config: SyncConfig,
    store: NxStore,
    dispatcher: PriorityDispatcher,
    decider: IncrementalSyncDecider,
    ledger: IngestLedger,
    generation_clock: Arc<AtomicU64>,
    source_type: String,
    token: CancellationToken,
    tx: mpsc::Sender<SyncStatus>,
) {
    let started_at = Instant::now();
    let _ = tx.send(SyncStatus::Started).await;
    store.set_sync_in_progress(true);

    let mut totals = ScanCounts::default();
    let mut any_incremental = false;
    let generation = generation_clock.fetch_add(1, Ordering::SeqCst) as i64;

    for phase in &config.enabled_phases {
        if token.is_cancelled() {
            let _ = tx
                .send(SyncStatus::Cancelled {
                    reason: "cancelled by caller".to_string(),
                    phase: *phase,
                    processed: totals.accepted + totals.rejected + totals.skipped,
                    can_resume: true,
                })
                .await;
            store.set_sync_in_progress(false);
            return;
        }

        let content_type = phase.content_type();
        let decision = match decider
            .decide(
                &source_type,
                &account_key,
                content_type,
                config.force_full,
                chrono::Utc::now(),
            )
            .await
        {
            Ok(d) => d,
            Err(e) => {
                let _ = tx
                    .send(SyncStatus::Error {
                        error_type: "decider".to_string(),
                        message: e.to_string(),
                        phase: *phase,
                        processed: 0,
                        can_retry: true,
                    })
                    .await;
                continue;
            }
        };

        let since_ms = match decision {
            SyncDecision::SkipSync { reason } => {
                info!(phase = ?phase, %reason, "skipping phase");
                continue;
            }
            SyncDecision::IncrementalSync { since_ms } => {
                any_incremental = true;
                Some(since_ms)
            }
            SyncDecision::FullSync { reason } => {
                info!(phase = ?phase, %reason, "running full sync");
                None
            }
        };

        match run_phase(
            &account_key,
            &source,
            &source_type,
            *phase,
            since_ms,
            generation,
            &config,
            &store,
            &dispatcher,
            &ledger,
            &token,
        )
        .await
        {
            Ok(phase_counts) => {
                totals.discovered += phase_counts.discovered;
                totals.accepted += phase_counts.accepted;
                totals.rejected += phase_counts.rejected;
                totals.skipped += phase_counts.skipped;

                let _ = tx
                    .send(SyncStatus::InProgress {
                        phase: *phase,
                        processed: phase_counts.discovered,
                        total: None,
                    })
                    .await;

                if token.is_cancelled() {
                    let _ = tx
                        .send(SyncStatus::Cancelled {
                            reason: "cancelled by caller".to_string(),
                            phase: *phase,
                            processed: totals.accepted + totals.rejected + totals.skipped,
                            can_resume: true,
                        })
                        .await;
                    store.set_sync_in_progress(false);
                    return;
                }

                let checkpoint = Checkpoint {
                    source_type: source_type.clone(),
                    account_key: account_key.clone(),
                    content_type: content_type.to_string(),
                    last_success_at_ms: Some(chrono::Utc::now().timestamp_millis()),
                    last_phase_completed: Some(content_type.to_string()),
                };
                if let Err(e) = store.checkpoint.upsert(&checkpoint).await {
                    warn!(error = %e, "failed to advance checkpoint");
                }
                if since_ms.is_none() {
                    if let Err(e) = ledger
                        .sweep_stale_fingerprints(&source_type, &account_key, content_type, generation)
                        .await
                    {
                        warn!(error = %e, "failed to sweep stale fingerprints");
                    }
                }
            }
            Err(e) => {
                let _ = tx
                    .send(SyncStatus::Error {
                        error_type: "phase".to_string(),
                        message: e.to_string(),
                        phase: *phase,
                        processed: totals.accepted + totals.rejected + totals.skipped,
                        can_retry: true,
                    })
                    .await;
            }
        }
    }

    store.set_sync_in_progress(false);
    let _ = tx
        .send(SyncStatus::Completed {
            totals,
            duration_ms: started_at.elapsed().as_millis() as i64,
            was_incremental: any_incremental,
        })
        .await;
}

/// Runs one phase's pipeline: a producer task scans, filters (timestamp then
/// fingerprint), and normalizes; this task drains the buffer in
/// `config.batch_size`-sized batches, each committed atomically through a
/// [`BatchGuard`] alongside its ledger entries (§4.6, §4.7).
#[allow(clippy::too_many_arguments)]
async fn run_phase(
    account_key: &str,
    source: &Arc<dyn CatalogSource>,
    source_type: &str,
    phase: Phase,
    since_ms: Option<i64>,
    generation: i64,
    config: &SyncConfig,
    store: &NxStore,
    dispatcher: &PriorityDispatcher,
    ledger: &IngestLedger,
    token: &CancellationToken,
) -> Result<ScanCounts> {
    let mut buffer = SyncBuffer::new(config.buffer_capacity);
    let receiver = buffer
        .take_receiver()
        .expect("receiver taken exactly once per phase");
    let receiver = Arc::new(tokio::sync::Mutex::new(receiver));
    let sender = buffer.sender();

    let ctx = ProviderContext::new(account_key, account_key);
    let content_type = phase.content_type();
    let mut raw_stream = source.scan(&ctx, content_type, since_ms).await?;

    let producer_ledger = ledger.clone();
    let producer_token = token.clone();
    let producer_dispatcher = dispatcher.clone();
    let producer_pool = store.pool().clone();
    let producer_account_key = account_key.to_string();
    let producer_source_type = source_type.to_string();
    let producer_content_type = content_type.to_string();
    let producer_counts: Arc<tokio::sync::Mutex<ScanCounts>> =
        Arc::new(tokio::sync::Mutex::new(ScanCounts::default()));
    let counts_for_producer = producer_counts.clone();

    let producer = tokio::spawn(async move {
        use futures::StreamExt;

        let resolver = NoopAuthorityResolver;
        let normalizer = Normalizer::new(&resolver);

        while let Some(item) = raw_stream.next().await {
            if producer_token.is_cancelled() {
                break;
            }
            producer_dispatcher.await_low_priority_clear().await;

            let raw = match item {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(error = %e, "scan item error");
                    continue;
                }
            };

            {
                let mut counts = counts_for_producer.lock().await;
                counts.discovered += 1;
            }

            let common = raw.common();

            // Tier 3: timestamp filter in incremental mode.
            if let Some(since) = since_ms {
                if common.added_at_ms.is_some_and(|t| t < since) {
                    let mut counts = counts_for_producer.lock().await;
                    counts.skipped += 1;
                    continue;
                }
            }

            let source_key = match key::format_source(
                parse_source_type(&common.source_type),
                &common.account_key,
                source_kind_for_phase(&raw),
                &common.source_id,
            ) {
                Ok(k) => k,
                Err(e) => {
                    let _ = producer_ledger
                        .record_with_executor(
                            format!("invalid:{}:{}", common.account_key, common.source_id),
                            ReasonCode::RejectedInvalidId,
                            Some(e.to_string()),
                            None,
                            chrono::Utc::now().timestamp_millis(),
                            None,
                            &producer_pool,
                        )
                        .await;
                    let mut counts = counts_for_producer.lock().await;
                    counts.rejected += 1;
                    continue;
                }
            };

            if matches!(raw, RawRecord::Vod(_))
                && common.duration_ms.is_some_and(|d| d < MIN_DURATION_MS)
            {
                let _ = producer_ledger
                    .record_with_executor(
                        source_key.clone(),
                        ReasonCode::RejectedTooShort,
                        Some(format!("duration below {MIN_DURATION_MS}ms")),
                        None,
                        chrono::Utc::now().timestamp_millis(),
                        None,
                        &producer_pool,
                    )
                    .await;
                let mut counts = counts_for_producer.lock().await;
                counts.rejected += 1;
                continue;
            }

            // Tier 4: fingerprint filter. Duration and poster are excluded
            // here since `NormalizedRecord` (what is actually persisted and
            // re-fingerprinted downstream) does not carry either.
            let (season, episode) = raw.season_episode().unzip();
            let fingerprint = fingerprint_fields(
                &common.original_title,
                common.year,
                season,
                episode,
                None,
                None,
                common.external_ids.tmdb.as_deref(),
                common.external_ids.imdb.as_deref(),
                common.external_ids.tvdb.as_deref(),
            );

            let last = producer_ledger
                .last_fingerprint(
                    &producer_source_type,
                    &producer_account_key,
                    &producer_content_type,
                    &common.source_id,
                )
                .await
                .ok()
                .flatten();

            if last == Some(fingerprint) {
                let _ = producer_ledger
                    .record_with_executor(
                        source_key.clone(),
                        ReasonCode::SkippedUnchangedFingerprint,
                        None,
                        None,
                        chrono::Utc::now().timestamp_millis(),
                        None,
                        &producer_pool,
                    )
                    .await;
                let mut counts = counts_for_producer.lock().await;
                counts.skipped += 1;
                continue;
            }

            let normalized = match normalizer.normalize(&raw).await {
                Ok(n) => n,
                Err(e) => {
                    warn!(error = %e, "normalize failed");
                    let mut counts = counts_for_producer.lock().await;
                    counts.rejected += 1;
                    continue;
                }
            };

            if sender.send(normalized).await.is_err() {
                break;
            }
        }
    });

    // N parallel consumers share one `BufferReceiver` behind a mutex (§4.7,
    // §4.8: "launch a producer ... and N parallel consumers"). Each consumer
    // locks the receiver only long enough to pull its next batch, then
    // releases it and commits independently through its own `BatchGuard`, so
    // multiple batches can be in flight (committing) at once (§5: "multiple
    // consumers may batch concurrently"; commit order across consumers is
    // not preserved and not observable externally).
    let accepted_counter = Arc::new(AtomicU64::new(0));
    let consumer_count = config.consumer_concurrency.max(1);
    let mut consumers = Vec::with_capacity(consumer_count);
    for _ in 0..consumer_count {
        let receiver = receiver.clone();
        let store = store.clone();
        let account_key = account_key.to_string();
        let source_type = source_type.to_string();
        let content_type = content_type.to_string();
        let accepted_counter = accepted_counter.clone();
        let batch_size = config.batch_size;

        consumers.push(tokio::spawn(async move {
            loop {
                let mut batch = Vec::with_capacity(batch_size);
                {
                    let mut rx = receiver.lock().await;
                    for _ in 0..batch_size {
                        match rx.receive().await {
                            Some(item) => batch.push(item),
                            None => break,
                        }
                    }
                }
                if batch.is_empty() {
                    return Ok(());
                }
                commit_batch_with_retry(
                    &store,
                    batch,
                    &account_key,
                    &source_type,
                    &content_type,
                    generation,
                    &accepted_counter,
                )
                .await?;
            }
        }));
    }

    for consumer in consumers {
        consumer
            .await
            .map_err(|e| crate::Error::Internal(format!("consumer task panicked: {e}")))??;
    }

    let _ = producer.await;
    let mut totals = *producer_counts.lock().await;
    totals.accepted = accepted_counter.load(Ordering::SeqCst);
    Ok(totals)
}

/// Wraps [`commit_batch`] with the `PersistenceConflict` retry policy (§7):
/// a conflicting concurrent transaction (Postgres serialization failure or
/// deadlock) retries the whole batch once; a second failure bubbles up as a
/// phase `Error` status.
#[allow(clippy::too_many_arguments)]
async fn commit_batch_with_retry(
    store: &NxStore,
    batch: Vec<crate::models::NormalizedRecord>,
    account_key: &str,
    source_type: &str,
    content_type: &str,
    generation: i64,
    accepted_counter: &Arc<AtomicU64>,
) -> Result<()> {
    match commit_batch(
        store,
        batch.clone(),
        account_key,
        source_type,
        content_type,
        generation,
        accepted_counter,
    )
    .await
    {
        Err(crate::Error::PersistenceConflict(detail)) => {
            warn!(%detail, "persistence conflict, retrying batch once");
            commit_batch(
                store,
                batch,
                account_key,
                source_type,
                content_type,
                generation,
                accepted_counter,
            )
            .await
        }
        other => other,
    }
}

#[allow(clippy::too_many_arguments)]
async fn commit_batch(
    store: &NxStore,
    batch: Vec<crate::models::NormalizedRecord>,
    account_key: &str,
    source_type: &str,
    content_type: &str,
    generation: i64,
    accepted_counter: &Arc<AtomicU64>,
) -> Result<()> {
    let mut guard = BatchGuard::begin(store.pool()).await?;
    let mut committed_work_keys = Vec::with_capacity(batch.len());

    for normalized in batch {
        let work_type = parse_work_type_from_key(&normalized.work_key_candidate)?;
        let mut work = Work::new(
            normalized.work_key_candidate.clone(),
            work_type,
            normalized.canonical_title.clone(),
        );
        work.year = normalized.year;
        work.season = normalized.season;
        work.episode = normalized.episode;
        work.duration_ms = normalized.duration_ms;
        work.authority_refs.tmdb_id = normalized.external_ids.tmdb.clone();
        work.authority_refs.imdb_id = normalized.external_ids.imdb.clone();
        work.authority_refs.tvdb_id = normalized.external_ids.tvdb.clone();

        let previous = store.work.get(&work.work_key).await?;
        let existed_before = previous.is_some();
        let duration_changed = previous.and_then(|p| p.duration_ms) != work.duration_ms;

        let saved_work = store
            .work
            .upsert_with_executor(&work, &mut **guard.transaction())
            .await?;

        // Decision 3 (DESIGN.md): `WorkUserState.total_duration_ms` is
        // denormalized from `Work.duration_ms` and must stay in sync,
        // inside the same transaction as the `Work` update.
        if duration_changed {
            if let Some(duration_ms) = saved_work.duration_ms {
                store
                    .work_user_state
                    .resync_total_duration(&saved_work.work_key, duration_ms, &mut **guard.transaction())
                    .await?;
            }
        }

        let source_key = key::format_source(
            parse_source_type(source_type),
            account_key,
            source_kind_for_work_type(work_type),
            &normalized.source_id,
        )?;

        let source_ref = WorkSourceRef {
            source_key: source_key.clone(),
            work_key: saved_work.work_key.clone(),
            source_type: source_type.to_string(),
            account_key: account_key.to_string(),
            provider_item_id: normalized.source_id.clone(),
            raw_title: normalized.raw_title.clone(),
            container_hint: normalized.playback_hints.container.clone(),
            epg_channel_id: None,
            has_catchup: false,
            category_id: None,
        };
        store
            .work_source_ref
            .upsert_with_executor(&source_ref, &mut **guard.transaction())
            .await?;

        let variant_key = key::format_variant(
            &source_key,
            &normalized.playback_hints.quality,
            &normalized.playback_hints.language,
        )?;
        let variant = WorkVariant {
            variant_key,
            source_key: source_key.clone(),
            method: normalized.playback_hints.method,
            url_hint: normalized.playback_hints.url_hint.clone(),
            container: normalized.playback_hints.container.clone(),
            codec: normalized.playback_hints.codec.clone(),
            bitrate: normalized.playback_hints.bitrate,
            language: normalized.playback_hints.language.clone(),
            quality: normalized.playback_hints.quality.clone(),
        };
        store
            .work_variant
            .upsert_with_executor(&variant, &mut **guard.transaction())
            .await?;

        let fingerprint = fingerprint_fields(
            &normalized.raw_title,
            normalized.year,
            normalized.season,
            normalized.episode,
            None,
            None,
            normalized.external_ids.tmdb.as_deref(),
            normalized.external_ids.imdb.as_deref(),
            normalized.external_ids.tvdb.as_deref(),
        );

        // `IngestLedger::record_with_executor` requires a `Copy` executor (it
        // writes the ledger row and, on accept, the fingerprint row under
        // the same executor); a borrowed `Transaction` isn't `Copy`, so the
        // two writes go straight through the store's repositories here, each
        // taking its own fresh reborrow of the batch transaction.
        let decision_reason = if existed_before {
            ReasonCode::AcceptedLinkedExisting
        } else {
            ReasonCode::AcceptedNewWork
        };
        let ledger_entry = IngestLedgerEntry::new(
            source_key.clone(),
            decision_reason,
            None,
            Some(saved_work.work_key.clone()),
            chrono::Utc::now().timestamp_millis(),
        )?;
        store
            .ingest_ledger
            .append_with_executor(&ledger_entry, &mut **guard.transaction())
            .await?;
        store
            .fingerprint
            .upsert_with_executor(
                &FingerprintEntry {
                    source_type: source_type.to_string(),
                    account_key: account_key.to_string(),
                    content_type: content_type.to_string(),
                    provider_item_id: normalized.source_id.clone(),
                    fingerprint,
                    sync_generation: generation,
                },
                &mut **guard.transaction(),
            )
            .await?;

        committed_work_keys.push(saved_work.work_key);
    }

    // Counter/notification side effects only happen once the transaction
    // actually commits — incrementing them per item above the `commit()`
    // call would overcount on a `PersistenceConflict` retry of this same
    // batch (the rolled-back attempt's increments would still stick).
    guard.commit().await?;

    accepted_counter.fetch_add(committed_work_keys.len() as u64, Ordering::SeqCst);
    for work_key in committed_work_keys {
        store.notify_changed(EntityKind::Work, work_key);
    }
    Ok(())
}

fn parse_source_type(s: &str) -> SourceType {
    match s {
        "tg" => SourceType::Tg,
        "local" => SourceType::Local,
        _ => SourceType::Xtream,
    }
}

fn source_kind_for_phase(raw: &RawRecord) -> SourceKind {
    match raw {
        RawRecord::Vod(_) => SourceKind::Vod,
        RawRecord::Series(_) => SourceKind::Series,
        RawRecord::Episode { .. } => SourceKind::Episode,
        RawRecord::Live(_) => SourceKind::Live,
    }
}

fn source_kind_for_work_type(work_type: WorkType) -> SourceKind {
    match work_type {
        WorkType::Movie => SourceKind::Vod,
        WorkType::Series => SourceKind::Series,
        WorkType::Episode => SourceKind::Episode,
        WorkType::Live => SourceKind::Live,
    }
}

fn parse_work_type_from_key(work_key: &str) -> Result<WorkType> {
    match key::parse_work(work_key)? {
        key::ParsedWorkKey::Movie { .. } => Ok(WorkType::Movie),
        key::ParsedWorkKey::Series { .. } => Ok(WorkType::Series),
        key::ParsedWorkKey::Episode { .. } => Ok(WorkType::Episode),
        key::ParsedWorkKey::Live { .. } => Ok(WorkType::Live),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_has_three_consumers() {
        let cfg = SyncConfig::default_profile();
        assert_eq!(cfg.consumer_concurrency, 3);
        assert_eq!(cfg.buffer_capacity, DEFAULT_CAPACITY);
    }

    #[test]
    fn low_ram_profile_halves_concurrency_and_buffer() {
        let cfg = SyncConfig::low_ram();
        assert_eq!(cfg.consumer_concurrency, 2);
        assert_eq!(cfg.buffer_capacity, LOW_RAM_CAPACITY);
    }

    #[test]
    fn phase_content_types_map_to_spec_strings() {
        assert_eq!(Phase::Live.content_type(), "live");
        assert_eq!(Phase::Episodes.content_type(), "episode");
    }

    #[test]
    fn phase_order_is_fixed() {
        assert_eq!(
            Phase::ordered(),
            [Phase::Live, Phase::Vod, Phase::Series, Phase::Episodes]
        );
    }
}
