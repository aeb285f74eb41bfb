//! Raw→canonical normalizer (spec.md §4.5). Converts a provider-agnostic
//! [`RawRecord`] into a [`NormalizedRecord`] carrying a canonical-identity
//! candidate. Never performs network I/O itself — authority lookups go
//! through an injected [`AuthorityResolver`], the same capability-injection
//! shape the rest of this crate uses instead of a module-level singleton.

use std::sync::LazyLock;

use regex::Regex;

use crate::key::{self, WorkType};
use crate::models::{ExternalIds, NormalizedRecord, RawRecord, RawRecordCommon};
use crate::provider::AuthorityResolver;
use crate::Result;

/// Scene-tag / release-group bracket groups: `[...]`, `(...)` containing
/// digits or common scene tokens, plus trailing quality/codec tags.
static BRACKET_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\[\(][^\]\)]*[\]\)]").expect("valid regex"));

static QUALITY_CODEC_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(1080p|720p|2160p|4k|hdr|webrip|web-dl|webdl|bluray|brrip|dvdrip|x264|x265|h264|h265|hevc|aac|ac3|dts)\b",
    )
    .expect("valid regex")
});

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Title cleaning (§4.5): strips scene tags, bracket groups, quality/codec
/// tokens; collapses whitespace; preserves diacritics (no ASCII folding —
/// that is the key codec's `slugify`'s job, not this function's).
#[must_use]
pub fn clean_title(raw_title: &str) -> String {
    let no_brackets = BRACKET_GROUP.replace_all(raw_title, " ");
    let no_tokens = QUALITY_CODEC_TOKEN.replace_all(&no_brackets, " ");
    WHITESPACE_RUN.replace_all(&no_tokens, " ").trim().to_string()
}

/// Injected authority resolver used for identity-preference tier 1.
pub struct Normalizer<'a> {
    authority: &'a dyn AuthorityResolver,
}

impl<'a> Normalizer<'a> {
    #[must_use]
    pub const fn new(authority: &'a dyn AuthorityResolver) -> Self {
        Self { authority }
    }

    /// Normalizes one raw record into a canonical-identity candidate.
    ///
    /// Identity preference order (§4.5):
    /// 1. authority id → `workKey` derived from the authority-linked
    ///    canonical title and year (requires the authority actually
    ///    resolved; a bare `externalIds` field with no resolver confirmation
    ///    falls through to tier 2).
    /// 2. title+year+kind slug.
    /// 3. for episodes, append `s<season>:e<episode>` to whichever of the
    ///    above produced the base slug.
    ///
    /// LIVE records skip authority/year entirely: year is the literal
    /// `LIVE` marker baked into the key codec's `WorkType::Live` branch.
    pub async fn normalize(&self, raw: &RawRecord) -> Result<NormalizedRecord> {
        let common = raw.common();
        let cleaned_title = clean_title(&common.original_title);

        let (work_type, season, episode) = match raw {
            RawRecord::Vod(_) => (WorkType::Movie, None, None),
            RawRecord::Series(_) => (WorkType::Series, None, None),
            RawRecord::Episode { season, episode, .. } => {
                (WorkType::Episode, Some(*season), Some(*episode))
            }
            RawRecord::Live(_) => (WorkType::Live, None, None),
        };

        if matches!(work_type, WorkType::Live) {
            let work_key_candidate = key::format_work(WorkType::Live, &cleaned_title, None, None, None)?;
            return Ok(NormalizedRecord {
                canonical_title: cleaned_title,
                work_key_candidate,
                season: None,
                episode: None,
                year: None,
                external_ids: common.external_ids.clone(),
                playback_hints: common.playback_hints.clone(),
                duration_ms: common.duration_ms,
                source_id: common.source_id.clone(),
                raw_title: common.original_title.clone(),
            });
        }

        let (canonical_title, year, external_ids) =
            self.resolve_identity(&cleaned_title, common, work_type).await?;

        let work_key_candidate =
            key::format_work(work_type, &canonical_title, year, season, episode)?;

        Ok(NormalizedRecord {
            canonical_title,
            work_key_candidate,
            season,
            episode,
            year,
            external_ids,
            playback_hints: common.playback_hints.clone(),
            duration_ms: common.duration_ms,
            source_id: common.source_id.clone(),
            raw_title: common.original_title.clone(),
        })
    }

    /// Tier 1 then tier 2 of the identity-preference order. Episodes defer
    /// season/episode composition to the caller (tier 3 lives in
    /// `normalize`, after the base slug is chosen here).
    async fn resolve_identity(
        &self,
        cleaned_title: &str,
        common: &RawRecordCommon,
        work_type: WorkType,
    ) -> Result<(String, Option<i32>, ExternalIds)> {
        let authority_hit = match work_type {
            WorkType::Movie => self.authority.resolve_movie(cleaned_title, common.year).await?,
            WorkType::Series | WorkType::Episode => {
                self.authority.resolve_series(cleaned_title, common.year).await?
            }
            WorkType::Live => None,
        };

        if let Some(ids) = authority_hit {
            return Ok((cleaned_title.to_string(), common.year, ids));
        }

        // Tier 2: title+year+kind slug. `externalIds` passed through
        // unresolved — they may still carry ids the provider reported even
        // though we didn't independently confirm them via a resolver call.
        Ok((cleaned_title.to_string(), common.year, common.external_ids.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::source_ref::PlaybackMethod;
    use crate::models::{ExternalIds, PlaybackHints};
    use crate::provider::NoopAuthorityResolver;

    fn common(title: &str, year: Option<i32>) -> RawRecordCommon {
        RawRecordCommon {
            original_title: title.to_string(),
            year,
            duration_ms: Some(7_200_000),
            external_ids: ExternalIds::default(),
            source_type: "xtream".to_string(),
            account_key: "acc1".to_string(),
            source_id: "603".to_string(),
            added_at_ms: Some(1_700_000_000_000),
            playback_hints: PlaybackHints {
                method: PlaybackMethod::Direct,
                url_hint: "http://host/movie/u/p/603.mkv".to_string(),
                container: Some("mkv".to_string()),
                codec: None,
                bitrate: None,
                language: "en".to_string(),
                quality: "1080p".to_string(),
            },
        }
    }

    #[test]
    fn clean_title_strips_brackets_and_quality_tokens() {
        let cleaned = clean_title("The.Matrix.1999.1080p.BluRay.x264-GROUP [EN]");
        assert!(!cleaned.to_lowercase().contains("1080p"));
        assert!(!cleaned.contains('['));
    }

    #[tokio::test]
    async fn movie_without_authority_uses_title_year_slug() {
        let resolver = crate::provider::NoopAuthorityResolver;
        let normalizer = Normalizer::new(&resolver);
        let raw = RawRecord::Vod(common("The Matrix", Some(1999)));
        let normalized = normalizer.normalize(&raw).await.unwrap();
        assert_eq!(normalized.work_key_candidate, "movie:the-matrix:1999");
    }

    #[tokio::test]
    async fn episode_appends_season_episode_marker() {
        let resolver = NoopAuthorityResolver;
        let normalizer = Normalizer::new(&resolver);
        let raw = RawRecord::Episode {
            common: common("The Matrix", Some(1999)),
            season: 1,
            episode: 5,
        };
        let normalized = normalizer.normalize(&raw).await.unwrap();
        assert_eq!(normalized.work_key_candidate, "episode:the-matrix:1999:s1:e5");
    }

    #[tokio::test]
    async fn live_record_gets_literal_live_marker() {
        let resolver = NoopAuthorityResolver;
        let normalizer = Normalizer::new(&resolver);
        let raw = RawRecord::Live(common("BBC One", None));
        let normalized = normalizer.normalize(&raw).await.unwrap();
        assert_eq!(normalized.work_key_candidate, "live:bbc-one:LIVE");
    }
}
