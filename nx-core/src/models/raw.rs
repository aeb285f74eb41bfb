use serde::{Deserialize, Serialize};

use crate::models::source_ref::PlaybackMethod;

/// Authority ids carried by a raw record, when the provider exposes them
/// directly (xtream-style info blocks sometimes do; messaging exports never
/// do).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalIds {
    pub tmdb: Option<String>,
    pub imdb: Option<String>,
    pub tvdb: Option<String>,
}

/// Playback-relevant fields carried through from the raw record to the
/// `WorkVariant` the normalizer creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackHints {
    pub method: PlaybackMethod,
    pub url_hint: String,
    pub container: Option<String>,
    pub codec: Option<String>,
    pub bitrate: Option<i64>,
    pub language: String,
    pub quality: String,
}

/// Fields common to every `RawRecord` variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecordCommon {
    pub original_title: String,
    pub year: Option<i32>,
    pub duration_ms: Option<i64>,
    pub external_ids: ExternalIds,
    pub source_type: String,
    pub account_key: String,
    pub source_id: String,
    /// Provider-reported insertion timestamp, used by the pipeline's
    /// timestamp filter (§4.6 step 1). `None` if the provider does not
    /// report one (e.g. messaging exports).
    pub added_at_ms: Option<i64>,
    pub playback_hints: PlaybackHints,
}

/// Provider-agnostic raw ingest candidate. Tagged by content kind rather
/// than carrying a `mediaKind` field, per the capability-polymorphism design
/// (spec §9): normalizer and pipeline code match on the variant instead of
/// branching on a string/enum field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RawRecord {
    Vod(RawRecordCommon),
    Series(RawRecordCommon),
    Episode {
        common: RawRecordCommon,
        season: u32,
        episode: u32,
    },
    Live(RawRecordCommon),
}

impl RawRecord {
    #[must_use]
    pub fn common(&self) -> &RawRecordCommon {
        match self {
            RawRecord::Vod(c) | RawRecord::Series(c) | RawRecord::Live(c) => c,
            RawRecord::Episode { common, .. } => common,
        }
    }

    #[must_use]
    pub fn season_episode(&self) -> Option<(u32, u32)> {
        match self {
            RawRecord::Episode { season, episode, .. } => Some((*season, *episode)),
            _ => None,
        }
    }
}

/// Output of the normalizer (§4.5): a canonical identity candidate plus the
/// passthrough fields the entity store needs to build a `Work`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub canonical_title: String,
    pub work_key_candidate: String,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub year: Option<i32>,
    pub external_ids: ExternalIds,
    pub playback_hints: PlaybackHints,
    pub duration_ms: Option<i64>,
    /// Provider's own item id, passed through unchanged. This, not
    /// `canonical_title`, is what `sourceKey`'s `providerItemId` component
    /// and `WorkSourceRef.provider_item_id` must be built from — the
    /// producer-side ledger entries (rejected/skipped items) already key off
    /// `RawRecordCommon.source_id`, so the accepted path has to agree or the
    /// same item gets two different `sourceKey`s (INV-01/INV-04).
    pub source_id: String,
    /// Provider's raw, uncleaned title — kept separate from
    /// `canonical_title` so enrichment (§4.9) never overwrites the
    /// canonical title with it.
    pub raw_title: String,
}
