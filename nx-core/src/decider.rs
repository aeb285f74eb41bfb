//! Incremental-sync decider (spec.md §4.4). A pure function of an injected
//! clock, the checkpoint store, and `forceFull` — no hidden `Instant::now()`,
//! so tests drive it with a fixed `now` the way the teacher's small service
//! structs take injected collaborators instead of reaching for globals.

use chrono::{DateTime, Utc};

use crate::models::Checkpoint;
use crate::repository::CheckpointRepository;

/// Minimum age between two successful syncs of the same
/// `(sourceType, accountKey, contentType)` before a third is allowed to run
/// (§4.4).
pub const MIN_SYNC_INTERVAL_SECONDS: i64 = 60;

/// Decider output (§4.4). `IncrementalSync` carries the timestamp to filter
/// since; `FullSync`/`SkipSync` carry a human-readable reason for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncDecision {
    SkipSync { reason: String },
    IncrementalSync { since_ms: i64 },
    FullSync { reason: String },
}

/// Pure decision function: reads one injected checkpoint row, applies the
/// policy in §4.4, returns a decision. No I/O of its own.
#[must_use]
pub fn decide(force_full: bool, checkpoint: Option<&Checkpoint>, now: DateTime<Utc>) -> SyncDecision {
    if force_full {
        return SyncDecision::FullSync {
            reason: "forceFull requested".to_string(),
        };
    }

    let Some(last_success_at_ms) = checkpoint.and_then(|c| c.last_success_at_ms) else {
        return SyncDecision::FullSync {
            reason: "no prior successful sync".to_string(),
        };
    };

    let last_success = DateTime::from_timestamp_millis(last_success_at_ms).unwrap_or(now);
    let age_seconds = (now - last_success).num_seconds();

    if age_seconds < MIN_SYNC_INTERVAL_SECONDS {
        return SyncDecision::SkipSync {
            reason: format!(
                "last success {age_seconds}s ago, below minimum interval of \
                 {MIN_SYNC_INTERVAL_SECONDS}s"
            ),
        };
    }

    SyncDecision::IncrementalSync {
        since_ms: last_success_at_ms,
    }
}

/// Orchestration wrapper: reads the checkpoint row for `(source_type,
/// account_key, content_type)` and applies [`decide`].
#[derive(Clone)]
pub struct IncrementalSyncDecider {
    checkpoints: CheckpointRepository,
}

impl IncrementalSyncDecider {
    #[must_use]
    pub const fn new(checkpoints: CheckpointRepository) -> Self {
        Self { checkpoints }
    }

    pub async fn decide(
        &self,
        source_type: &str,
        account_key: &str,
        content_type: &str,
        force_full: bool,
        now: DateTime<Utc>,
    ) -> crate::Result<SyncDecision> {
        let checkpoint = self
            .checkpoints
            .get(source_type, account_key, content_type)
            .await?;
        Ok(decide(force_full, checkpoint.as_ref(), now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn checkpoint_at(last_success_at_ms: Option<i64>) -> Checkpoint {
        Checkpoint {
            source_type: "xtream".to_string(),
            account_key: "acc1".to_string(),
            content_type: "vod".to_string(),
            last_success_at_ms,
            last_phase_completed: None,
        }
    }

    #[test]
    fn force_full_always_wins() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let cp = checkpoint_at(Some(now.timestamp_millis()));
        assert_eq!(
            decide(true, Some(&cp), now),
            SyncDecision::FullSync {
                reason: "forceFull requested".to_string()
            }
        );
    }

    #[test]
    fn no_checkpoint_means_full_sync() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            decide(false, None, now),
            SyncDecision::FullSync {
                reason: "no prior successful sync".to_string()
            }
        );
    }

    #[test]
    fn recent_success_skips() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 1, 0).unwrap();
        let last_success = now - chrono::Duration::seconds(10);
        let cp = checkpoint_at(Some(last_success.timestamp_millis()));
        assert!(matches!(
            decide(false, Some(&cp), now),
            SyncDecision::SkipSync { .. }
        ));
    }

    #[test]
    fn stale_success_is_incremental() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 1, 0, 0).unwrap();
        let last_success = now - chrono::Duration::seconds(120);
        let since_ms = last_success.timestamp_millis();
        let cp = checkpoint_at(Some(since_ms));
        assert_eq!(
            decide(false, Some(&cp), now),
            SyncDecision::IncrementalSync { since_ms }
        );
    }
}
