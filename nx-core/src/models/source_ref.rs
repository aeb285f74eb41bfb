use serde::{Deserialize, Serialize};

/// A provider item bound to a `Work`. At least one must exist per Work
/// (INV-10). Never deleted except during explicit reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkSourceRef {
    pub source_key: String,
    pub work_key: String,
    pub source_type: String,
    pub account_key: String,
    pub provider_item_id: String,
    pub raw_title: String,
    pub container_hint: Option<String>,
    pub epg_channel_id: Option<String>,
    pub has_catchup: bool,
    pub category_id: Option<String>,
}

/// Playback delivery method for a `WorkVariant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMethod {
    Direct,
    Hls,
    Mpd,
}

/// A concrete playable rendition of a `WorkSourceRef`. At least one must
/// exist per Work with non-empty playback hints for the Work to be
/// UI-visible (INV-03, INV-11).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkVariant {
    pub variant_key: String,
    pub source_key: String,
    pub method: PlaybackMethod,
    pub url_hint: String,
    pub container: Option<String>,
    pub codec: Option<String>,
    pub bitrate: Option<i64>,
    pub language: String,
    pub quality: String,
}

impl WorkVariant {
    /// True if this variant carries enough information for a player to
    /// attempt playback (INV-03's "non-empty playback hints").
    #[must_use]
    pub fn has_playback_hints(&self) -> bool {
        !self.url_hint.is_empty()
    }
}
