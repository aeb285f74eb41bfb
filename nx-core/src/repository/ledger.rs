//! Persistence for the ingest ledger, fingerprint store, and checkpoint
//! store (spec.md §4.3). Ledger append is write-only in normal operation;
//! these repositories don't enforce that — `crate::ledger` is the module
//! that owns the write-only policy and fingerprint hashing.

use sqlx::{PgPool, Row};

use crate::{
    models::{Checkpoint, FingerprintEntry, IngestDecision, IngestLedgerEntry, ReasonCode},
    Result,
};

#[derive(Clone)]
pub struct IngestLedgerRepository {
    pool: PgPool,
}

impl IngestLedgerRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// INV-01: exactly one ledger entry per ingest candidate. Callers are
    /// responsible for calling this at most once per `source_key` per run;
    /// the repository itself just appends.
    pub async fn append(&self, entry: &IngestLedgerEntry) -> Result<IngestLedgerEntry> {
        self.append_with_executor(entry, &self.pool).await
    }

    pub async fn append_with_executor<'e, E>(
        &self,
        entry: &IngestLedgerEntry,
        executor: E,
    ) -> Result<IngestLedgerEntry>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let row = sqlx::query(
            r"
            INSERT INTO ingest_ledger (source_key, decision, reason_code, detail,
                                        resolved_work_key, ingested_at_ms)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, source_key, decision, reason_code, detail, resolved_work_key,
                      ingested_at_ms
            ",
        )
        .bind(&entry.source_key)
        .bind(decision_str(entry.decision))
        .bind(reason_code_str(entry.reason_code))
        .bind(&entry.detail)
        .bind(&entry.resolved_work_key)
        .bind(entry.ingested_at_ms)
        .fetch_one(executor)
        .await?;
        Self::row_to_entry(row)
    }

    /// Diagnostics-only read: every entry ever written for a source key.
    pub async fn history_for_source(&self, source_key: &str) -> Result<Vec<IngestLedgerEntry>> {
        let rows = sqlx::query(
            r"
            SELECT id, source_key, decision, reason_code, detail, resolved_work_key,
                   ingested_at_ms
            FROM ingest_ledger WHERE source_key = $1 ORDER BY ingested_at_ms
            ",
        )
        .bind(source_key)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_entry).collect()
    }

    pub async fn count_since(&self, since_ms: i64) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM ingest_ledger WHERE ingested_at_ms >= $1")
            .bind(since_ms)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }

    fn row_to_entry(row: sqlx::postgres::PgRow) -> Result<IngestLedgerEntry> {
        let decision: String = row.try_get("decision")?;
        let reason_code: String = row.try_get("reason_code")?;
        Ok(IngestLedgerEntry {
            id: row.try_get("id")?,
            source_key: row.try_get("source_key")?,
            decision: parse_decision(&decision)?,
            reason_code: parse_reason_code(&reason_code)?,
            detail: row.try_get("detail")?,
            resolved_work_key: row.try_get("resolved_work_key")?,
            ingested_at_ms: row.try_get("ingested_at_ms")?,
        })
    }
}

fn decision_str(decision: IngestDecision) -> &'static str {
    match decision {
        IngestDecision::Accepted => "accepted",
        IngestDecision::Rejected => "rejected",
        IngestDecision::Skipped => "skipped",
    }
}

fn parse_decision(s: &str) -> Result<IngestDecision> {
    match s {
        "accepted" => Ok(IngestDecision::Accepted),
        "rejected" => Ok(IngestDecision::Rejected),
        "skipped" => Ok(IngestDecision::Skipped),
        other => Err(crate::Error::UnknownKeyKind(other.to_string())),
    }
}

fn reason_code_str(reason: ReasonCode) -> &'static str {
    match reason {
        ReasonCode::AcceptedNewWork => "ACCEPTED_NEW_WORK",
        ReasonCode::AcceptedLinkedExisting => "ACCEPTED_LINKED_EXISTING",
        ReasonCode::RejectedTooShort => "REJECTED_TOO_SHORT",
        ReasonCode::RejectedInvalidId => "REJECTED_INVALID_ID",
        ReasonCode::RejectedBlockedByRule => "REJECTED_BLOCKED_BY_RULE",
        ReasonCode::SkippedUnchangedFingerprint => "SKIPPED_UNCHANGED_FINGERPRINT",
        ReasonCode::SkippedRateLimited => "SKIPPED_RATE_LIMITED",
        ReasonCode::SkippedCancelled => "SKIPPED_CANCELLED",
    }
}

fn parse_reason_code(s: &str) -> Result<ReasonCode> {
    match s {
        "ACCEPTED_NEW_WORK" => Ok(ReasonCode::AcceptedNewWork),
        "ACCEPTED_LINKED_EXISTING" => Ok(ReasonCode::AcceptedLinkedExisting),
        "REJECTED_TOO_SHORT" => Ok(ReasonCode::RejectedTooShort),
        "REJECTED_INVALID_ID" => Ok(ReasonCode::RejectedInvalidId),
        "REJECTED_BLOCKED_BY_RULE" => Ok(ReasonCode::RejectedBlockedByRule),
        "SKIPPED_UNCHANGED_FINGERPRINT" => Ok(ReasonCode::SkippedUnchangedFingerprint),
        "SKIPPED_RATE_LIMITED" => Ok(ReasonCode::SkippedRateLimited),
        "SKIPPED_CANCELLED" => Ok(ReasonCode::SkippedCancelled),
        other => Err(crate::Error::UnknownKeyKind(other.to_string())),
    }
}

/// Keyed by `(sourceType, accountKey, contentType, providerItemId)`;
/// single-writer per `(sourceType, accountKey, contentType)` per §5.
#[derive(Clone)]
pub struct FingerprintRepository {
    pool: PgPool,
}

impl FingerprintRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(
        &self,
        source_type: &str,
        account_key: &str,
        content_type: &str,
        provider_item_id: &str,
    ) -> Result<Option<FingerprintEntry>> {
        let row = sqlx::query(
            r"
            SELECT source_type, account_key, content_type, provider_item_id, fingerprint,
                   sync_generation
            FROM fingerprints
            WHERE source_type = $1 AND account_key = $2 AND content_type = $3
              AND provider_item_id = $4
            ",
        )
        .bind(source_type)
        .bind(account_key)
        .bind(content_type)
        .bind(provider_item_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_entry).transpose()
    }

    pub async fn upsert_with_executor<'e, E>(
        &self,
        entry: &FingerprintEntry,
        executor: E,
    ) -> Result<()>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        sqlx::query(
            r"
            INSERT INTO fingerprints (source_type, account_key, content_type, provider_item_id,
                                       fingerprint, sync_generation)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (source_type, account_key, content_type, provider_item_id) DO UPDATE SET
                fingerprint = EXCLUDED.fingerprint,
                sync_generation = EXCLUDED.sync_generation
            ",
        )
        .bind(&entry.source_type)
        .bind(&entry.account_key)
        .bind(&entry.content_type)
        .bind(&entry.provider_item_id)
        .bind(entry.fingerprint as i64)
        .bind(entry.sync_generation)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Sweeps fingerprint rows left behind by a full sync: anything with
    /// `sync_generation` older than the just-completed generation is an
    /// item the provider no longer reports.
    pub async fn sweep_stale(
        &self,
        source_type: &str,
        account_key: &str,
        content_type: &str,
        current_generation: i64,
    ) -> Result<u64> {
        let result = sqlx::query(
            r"
            DELETE FROM fingerprints
            WHERE source_type = $1 AND account_key = $2 AND content_type = $3
              AND sync_generation < $4
            ",
        )
        .bind(source_type)
        .bind(account_key)
        .bind(content_type)
        .bind(current_generation)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    fn row_to_entry(row: sqlx::postgres::PgRow) -> Result<FingerprintEntry> {
        Ok(FingerprintEntry {
            source_type: row.try_get("source_type")?,
            account_key: row.try_get("account_key")?,
            content_type: row.try_get("content_type")?,
            provider_item_id: row.try_get("provider_item_id")?,
            fingerprint: row.try_get::<i64, _>("fingerprint")? as u32,
            sync_generation: row.try_get("sync_generation")?,
        })
    }
}

/// Resumable per-source sync progress, single-writer per `(sourceType,
/// accountKey, contentType)`.
#[derive(Clone)]
pub struct CheckpointRepository {
    pool: PgPool,
}

impl CheckpointRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(
        &self,
        source_type: &str,
        account_key: &str,
        content_type: &str,
    ) -> Result<Option<Checkpoint>> {
        let row = sqlx::query(
            r"
            SELECT source_type, account_key, content_type, last_success_at_ms,
                   last_phase_completed
            FROM checkpoints WHERE source_type = $1 AND account_key = $2 AND content_type = $3
            ",
        )
        .bind(source_type)
        .bind(account_key)
        .bind(content_type)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_checkpoint).transpose()
    }

    pub async fn upsert(&self, checkpoint: &Checkpoint) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO checkpoints (source_type, account_key, content_type, last_success_at_ms,
                                      last_phase_completed)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (source_type, account_key, content_type) DO UPDATE SET
                last_success_at_ms = EXCLUDED.last_success_at_ms,
                last_phase_completed = EXCLUDED.last_phase_completed
            ",
        )
        .bind(&checkpoint.source_type)
        .bind(&checkpoint.account_key)
        .bind(&checkpoint.content_type)
        .bind(checkpoint.last_success_at_ms)
        .bind(&checkpoint.last_phase_completed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// `clearCheckpoint` (§4.8): resets resume state for every content type
    /// under an account.
    pub async fn clear_account(&self, account_key: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM checkpoints WHERE account_key = $1")
            .bind(account_key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    fn row_to_checkpoint(row: sqlx::postgres::PgRow) -> Result<Checkpoint> {
        Ok(Checkpoint {
            source_type: row.try_get("source_type")?,
            account_key: row.try_get("account_key")?,
            content_type: row.try_get("content_type")?,
            last_success_at_ms: row.try_get("last_success_at_ms")?,
            last_phase_completed: row.try_get("last_phase_completed")?,
        })
    }
}

#[cfg(test)]
mod tests {
    #[tokio::test]
    #[ignore = "Requires database"]
    async fn test_ledger_append_is_write_only_in_practice() {
        // Integration test placeholder: INV-01, one entry per candidate.
    }
}
