//! Fingerprint hashing and the write-only ingest-ledger policy (spec.md
//! §4.3). The `repository::ledger` module owns persistence; this module owns
//! the hash function (Decision 1 in `DESIGN.md`) and the small orchestration
//! wrapper the pipeline calls on every ingest candidate.

use crate::models::{FingerprintEntry, IngestDecision, IngestLedgerEntry, ReasonCode};
use crate::repository::ledger::{FingerprintRepository, IngestLedgerRepository};
use crate::Result;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Stable 32-bit hash over the identity-shaping fields named in spec.md
/// §4.3, joined by `|` in the fixed order: original title, year, season,
/// episode, duration, poster hash, tmdb id, imdb id, tvdb id.
///
/// FNV-1a: dependency-free and stable across platforms, which is all the
/// change-detection contract in §9's open question requires.
#[must_use]
pub fn fingerprint_fields(
    original_title: &str,
    year: Option<i32>,
    season: Option<u32>,
    episode: Option<u32>,
    duration_ms: Option<i64>,
    poster: Option<&str>,
    tmdb_id: Option<&str>,
    imdb_id: Option<&str>,
    tvdb_id: Option<&str>,
) -> u32 {
    let joined = [
        original_title,
        &year.map_or_else(String::new, |v| v.to_string()),
        &season.map_or_else(String::new, |v| v.to_string()),
        &episode.map_or_else(String::new, |v| v.to_string()),
        &duration_ms.map_or_else(String::new, |v| v.to_string()),
        poster.unwrap_or_default(),
        tmdb_id.unwrap_or_default(),
        imdb_id.unwrap_or_default(),
        tvdb_id.unwrap_or_default(),
    ]
    .join("|");
    fnv1a(joined.as_bytes())
}

fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in bytes {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Write-only orchestration over the ledger and fingerprint repositories:
/// append exactly one ledger entry (INV-01) and, for accepted/updated items,
/// advance the fingerprint row under the current sync generation.
#[derive(Clone)]
pub struct IngestLedger {
    ledger: IngestLedgerRepository,
    fingerprints: FingerprintRepository,
}

impl IngestLedger {
    #[must_use]
    pub const fn new(ledger: IngestLedgerRepository, fingerprints: FingerprintRepository) -> Self {
        Self {
            ledger,
            fingerprints,
        }
    }

    /// Returns the stored fingerprint for `provider_item_id`, if any. A
    /// caller compares this to a freshly computed fingerprint to decide
    /// whether to emit `SKIPPED_UNCHANGED_FINGERPRINT` (pipeline tier-4).
    pub async fn last_fingerprint(
        &self,
        source_type: &str,
        account_key: &str,
        content_type: &str,
        provider_item_id: &str,
    ) -> Result<Option<u32>> {
        Ok(self
            .fingerprints
            .get(source_type, account_key, content_type, provider_item_id)
            .await?
            .map(|entry| entry.fingerprint))
    }

    /// Records one ingest decision (INV-01) and, when accepted, advances the
    /// fingerprint row. Both writes share `executor` so they commit or roll
    /// back as a unit with whatever entity write accompanies them.
    pub async fn record_with_executor<'e, E>(
        &self,
        source_key: String,
        reason_code: ReasonCode,
        detail: Option<String>,
        resolved_work_key: Option<String>,
        ingested_at_ms: i64,
        fingerprint_update: Option<(&str, &str, &str, &str, u32, i64)>,
        executor: E,
    ) -> Result<IngestLedgerEntry>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres> + Copy,
    {
        let entry = IngestLedgerEntry::new(
            source_key,
            reason_code,
            detail,
            resolved_work_key,
            ingested_at_ms,
        )?;
        let written = self.ledger.append_with_executor(&entry, executor).await?;

        if written.decision == IngestDecision::Accepted {
            if let Some((source_type, account_key, content_type, provider_item_id, fp, gen)) =
                fingerprint_update
            {
                self.fingerprints
                    .upsert_with_executor(
                        &FingerprintEntry {
                            source_type: source_type.to_string(),
                            account_key: account_key.to_string(),
                            content_type: content_type.to_string(),
                            provider_item_id: provider_item_id.to_string(),
                            fingerprint: fp,
                            sync_generation: gen,
                        },
                        executor,
                    )
                    .await?;
            }
        }

        Ok(written)
    }

    /// Sweeps fingerprint rows not touched by the just-completed full sync.
    pub async fn sweep_stale_fingerprints(
        &self,
        source_type: &str,
        account_key: &str,
        content_type: &str,
        current_generation: i64,
    ) -> Result<u64> {
        self.fingerprints
            .sweep_stale(source_type, account_key, content_type, current_generation)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_for_identical_inputs() {
        let a = fingerprint_fields(
            "The Matrix",
            Some(1999),
            None,
            None,
            Some(8_160_000),
            Some("hash123"),
            Some("603"),
            None,
            None,
        );
        let b = fingerprint_fields(
            "The Matrix",
            Some(1999),
            None,
            None,
            Some(8_160_000),
            Some("hash123"),
            Some("603"),
            None,
            None,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_changes_when_a_field_changes() {
        let a = fingerprint_fields("The Matrix", Some(1999), None, None, None, None, None, None, None);
        let b = fingerprint_fields("The Matrix", Some(2000), None, None, None, None, None, None, None);
        assert_ne!(a, b);
    }

    #[test]
    fn fnv1a_matches_known_vector() {
        // "" hashes to the FNV-1a 32-bit offset basis itself.
        assert_eq!(fnv1a(b""), FNV_OFFSET_BASIS);
    }
}
