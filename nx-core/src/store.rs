//! Entity store facade (spec.md §4.2). `NxStore` holds one `PgPool` and one
//! repository per entity kind, mirroring the teacher's one-repository-per-
//! aggregate layout. It additionally owns the change-stream plumbing
//! (`observe`/`observe_by_type`) and the `BatchGuard` RAII wrapper batch
//! writers use to make sure a borrowed transaction is always released.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sqlx::{PgPool, Postgres, Transaction};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::repository::{
    CategoryRepository, CheckpointRepository, CloudOutboxRepository, FingerprintRepository,
    IngestLedgerRepository, ProfileRepository, ProfileRuleRepository, ProfileUsageRepository,
    SourceAccountRepository, WorkCategoryRefRepository, WorkEmbeddingRepository,
    WorkRedirectRepository, WorkRelationRepository, WorkRepository, WorkRuntimeStateRepository,
    WorkSourceRefRepository, WorkUserStateRepository, WorkVariantRepository,
};
use crate::Result;

/// Entity kinds that expose a change stream. Not every row in §3's table is
/// listed here — ledger/fingerprint/checkpoint rows are write-heavy
/// bookkeeping, not UI-observed entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Work,
    WorkSourceRef,
    WorkVariant,
    WorkRelation,
    WorkUserState,
    WorkRuntimeState,
    Profile,
    ProfileRule,
    ProfileUsage,
    SourceAccount,
    Category,
    WorkCategoryRef,
    WorkEmbedding,
    WorkRedirect,
    CloudOutboxEvent,
}

/// One commit's worth of change, pushed to `observe`/`observe_by_type`
/// subscribers. Carries only the key — subscribers re-read the current
/// value through the matching repository, the same "push stream of current
/// value" contract as §4.2 describes, without this module needing to know
/// every entity's full shape.
#[derive(Debug, Clone)]
pub struct ChangeNotification {
    pub kind: EntityKind,
    pub key: String,
}

const IDLE_DEBOUNCE: Duration = Duration::from_millis(100);
const SYNC_DEBOUNCE: Duration = Duration::from_millis(2000);
const CHANGE_CHANNEL_CAPACITY: usize = 4096;

/// Entity store. One `PgPool`, one repository per entity kind, and the
/// change-stream broadcast plumbing (§4.2, §5).
#[derive(Clone)]
pub struct NxStore {
    pool: PgPool,
    changes: broadcast::Sender<ChangeNotification>,
    sync_in_progress: Arc<AtomicBool>,

    pub work: WorkRepository,
    pub work_source_ref: WorkSourceRefRepository,
    pub work_variant: WorkVariantRepository,
    pub work_relation: WorkRelationRepository,
    pub work_user_state: WorkUserStateRepository,
    pub work_runtime_state: WorkRuntimeStateRepository,
    pub profile: ProfileRepository,
    pub profile_rule: ProfileRuleRepository,
    pub profile_usage: ProfileUsageRepository,
    pub source_account: SourceAccountRepository,
    pub category: CategoryRepository,
    pub work_category_ref: WorkCategoryRefRepository,
    pub work_embedding: WorkEmbeddingRepository,
    pub work_redirect: WorkRedirectRepository,
    pub cloud_outbox: CloudOutboxRepository,
    pub ingest_ledger: IngestLedgerRepository,
    pub fingerprint: FingerprintRepository,
    pub checkpoint: CheckpointRepository,
}

impl NxStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            work: WorkRepository::new(pool.clone()),
            work_source_ref: WorkSourceRefRepository::new(pool.clone()),
            work_variant: WorkVariantRepository::new(pool.clone()),
            work_relation: WorkRelationRepository::new(pool.clone()),
            work_user_state: WorkUserStateRepository::new(pool.clone()),
            work_runtime_state: WorkRuntimeStateRepository::new(pool.clone()),
            profile: ProfileRepository::new(pool.clone()),
            profile_rule: ProfileRuleRepository::new(pool.clone()),
            profile_usage: ProfileUsageRepository::new(pool.clone()),
            source_account: SourceAccountRepository::new(pool.clone()),
            category: CategoryRepository::new(pool.clone()),
            work_category_ref: WorkCategoryRefRepository::new(pool.clone()),
            work_embedding: WorkEmbeddingRepository::new(pool.clone()),
            work_redirect: WorkRedirectRepository::new(pool.clone()),
            cloud_outbox: CloudOutboxRepository::new(pool.clone()),
            ingest_ledger: IngestLedgerRepository::new(pool.clone()),
            fingerprint: FingerprintRepository::new(pool.clone()),
            checkpoint: CheckpointRepository::new(pool.clone()),
            pool,
            changes,
            sync_in_progress: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Marks a sync as in progress, widening the debounce window used by
    /// `observe_by_type` from 100ms to 2000ms (§5). The catalog sync service
    /// calls this around each `sync()` run.
    pub fn set_sync_in_progress(&self, in_progress: bool) {
        self.sync_in_progress.store(in_progress, Ordering::SeqCst);
    }

    /// Call after a commit affecting `key` of kind `kind`. Never blocks: a
    /// full subscriber channel simply drops the oldest buffered event
    /// (`broadcast`'s lagged-receiver semantics), which is acceptable since
    /// subscribers re-read current state rather than relying on every
    /// individual notification.
    pub fn notify_changed(&self, kind: EntityKind, key: impl Into<String>) {
        let _ = self.changes.send(ChangeNotification {
            kind,
            key: key.into(),
        });
    }

    /// `observe(key)`: a debounced stream of notifications for one key,
    /// regardless of kind (callers already know the kind from the key
    /// format).
    pub fn observe(&self, key: String) -> impl tokio_stream::Stream<Item = ChangeNotification> {
        let raw = BroadcastStream::new(self.changes.subscribe());
        raw.filter_map(move |r| r.ok()).filter(move |n| n.key == key)
    }

    /// `observeByType(kind, limit)`: a bounded, debounced set of recently
    /// changed keys of one kind. Debounce window is 100ms when idle, 2000ms
    /// while a sync is in progress (§5); empty emissions are filtered during
    /// a sync so consumers never see a no-op "nothing changed" tick.
    pub fn observe_by_type(
        &self,
        kind: EntityKind,
        limit: usize,
    ) -> impl tokio_stream::Stream<Item = Vec<String>> {
        let mut raw = BroadcastStream::new(self.changes.subscribe());
        let sync_in_progress = self.sync_in_progress.clone();

        async_stream::stream! {
            let mut pending: Vec<String> = Vec::new();
            loop {
                let debounce = if sync_in_progress.load(Ordering::SeqCst) {
                    SYNC_DEBOUNCE
                } else {
                    IDLE_DEBOUNCE
                };

                tokio::select! {
                    item = raw.next() => {
                        match item {
                            Some(Ok(notification)) if notification.kind == kind => {
                                pending.retain(|k| k != &notification.key);
                                pending.push(notification.key);
                                if pending.len() > limit {
                                    pending.remove(0);
                                }
                            }
                            Some(Ok(_)) => continue,
                            Some(Err(_)) => continue,
                            None => break,
                        }
                    }
                    () = tokio::time::sleep(debounce) => {
                        if !pending.is_empty() {
                            yield std::mem::take(&mut pending);
                        }
                    }
                }
            }
        }
    }
}

/// RAII guard around a borrowed batch transaction. Ensures the transaction
/// is rolled back on every exit path — including early `?` returns and
/// panics — unless `commit()` is called explicitly. Mirrors `UnitOfWork`'s
/// Drop-based safety net, scoped to a single batch rather than a whole
/// unit-of-work call.
pub struct BatchGuard<'a> {
    tx: Option<Transaction<'a, Postgres>>,
}

impl<'a> BatchGuard<'a> {
    pub async fn begin(pool: &'a PgPool) -> Result<Self> {
        Ok(Self {
            tx: Some(pool.begin().await?),
        })
    }

    pub fn transaction(&mut self) -> &mut Transaction<'a, Postgres> {
        self.tx.as_mut().expect("batch transaction already consumed")
    }

    pub async fn commit(mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
        }
        Ok(())
    }
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        // `tx`, if still `Some`, is dropped here and rolled back by sqlx's
        // own `Transaction::drop` — this guard's only job is to make that
        // the *only* way an uncommitted batch transaction can end.
    }
}
