use serde::{Deserialize, Serialize};

use super::raw::RawRecord;

/// Fixed phase order per account: `live -> vod -> series -> episodes`
/// (§5), unless the caller disables a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Live,
    Vod,
    Series,
    Episodes,
}

impl Phase {
    #[must_use]
    pub const fn ordered() -> [Phase; 4] {
        [Phase::Live, Phase::Vod, Phase::Series, Phase::Episodes]
    }

    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Phase::Live => "live",
            Phase::Vod => "vod",
            Phase::Series => "series",
            Phase::Episodes => "episode",
        }
    }
}

/// Per-phase item counters, reported by `ScanProgress` and folded into
/// `ScanCompleted`/`SyncStatus::Completed` totals.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScanCounts {
    pub discovered: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub skipped: u64,
}

/// A single provider scan's event stream (§4.6). Cold: nothing happens
/// until the stream is polled/consumed.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    ScanStarted { phase: Phase },
    ItemDiscovered { phase: Phase, raw: Box<RawRecord> },
    ScanProgress { phase: Phase, counts: ScanCounts },
    ScanCompleted { phase: Phase, totals: ScanCounts },
    ScanError { phase: Phase, cause: String },
}

/// Stream emitted by `CatalogSyncService::sync` (§4.8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SyncStatus {
    Started,
    InProgress {
        phase: Phase,
        processed: u64,
        total: Option<u64>,
    },
    Completed {
        totals: ScanCounts,
        duration_ms: i64,
        was_incremental: bool,
    },
    Cancelled {
        reason: String,
        phase: Phase,
        processed: u64,
        can_resume: bool,
    },
    Error {
        error_type: String,
        message: String,
        phase: Phase,
        processed: u64,
        can_retry: bool,
    },
}
