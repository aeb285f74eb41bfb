use serde::{Deserialize, Serialize};

/// Exactly one is written per ingest candidate (INV-01).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestDecision {
    Accepted,
    Rejected,
    Skipped,
}

/// Reason codes named in spec.md §4.3. This set is the minimum; providers
/// may not invent new `Accepted`/`Rejected`/`Skipped` decisions without an
/// accompanying reason code here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    AcceptedNewWork,
    AcceptedLinkedExisting,
    RejectedTooShort,
    RejectedInvalidId,
    RejectedBlockedByRule,
    SkippedUnchangedFingerprint,
    SkippedRateLimited,
    SkippedCancelled,
}

impl ReasonCode {
    #[must_use]
    pub fn decision(self) -> IngestDecision {
        match self {
            ReasonCode::AcceptedNewWork | ReasonCode::AcceptedLinkedExisting => {
                IngestDecision::Accepted
            }
            ReasonCode::RejectedTooShort
            | ReasonCode::RejectedInvalidId
            | ReasonCode::RejectedBlockedByRule => IngestDecision::Rejected,
            ReasonCode::SkippedUnchangedFingerprint
            | ReasonCode::SkippedRateLimited
            | ReasonCode::SkippedCancelled => IngestDecision::Skipped,
        }
    }
}

/// Append-only ledger row. Diagnostics may read; normal operation only ever
/// appends (§4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestLedgerEntry {
    pub id: i64,
    pub source_key: String,
    pub decision: IngestDecision,
    pub reason_code: ReasonCode,
    pub detail: Option<String>,
    pub resolved_work_key: Option<String>,
    pub ingested_at_ms: i64,
}

impl IngestLedgerEntry {
    /// Builds a ledger row, enforcing INV-02: an `Accepted` decision must
    /// carry a resolved `workKey`.
    pub fn new(
        source_key: String,
        reason_code: ReasonCode,
        detail: Option<String>,
        resolved_work_key: Option<String>,
        ingested_at_ms: i64,
    ) -> crate::Result<Self> {
        let decision = reason_code.decision();
        if decision == IngestDecision::Accepted && resolved_work_key.is_none() {
            return Err(crate::Error::InvariantViolation(
                "ACCEPTED ledger entry requires a resolved workKey (INV-02)".to_string(),
            ));
        }
        Ok(Self {
            id: 0,
            source_key,
            decision,
            reason_code,
            detail,
            resolved_work_key,
            ingested_at_ms,
        })
    }
}

/// Fingerprint store row, keyed by `(sourceType, accountKey, contentType,
/// providerItemId)`. `fingerprint` is the 32-bit hash defined in §4.3;
/// `sync_generation` lets obsolete entries be swept after a full sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintEntry {
    pub source_type: String,
    pub account_key: String,
    pub content_type: String,
    pub provider_item_id: String,
    pub fingerprint: u32,
    pub sync_generation: i64,
}

/// Checkpoint store row, single-writer per `(sourceType, accountKey,
/// contentType)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub source_type: String,
    pub account_key: String,
    pub content_type: String,
    pub last_success_at_ms: Option<i64>,
    pub last_phase_completed: Option<String>,
}
