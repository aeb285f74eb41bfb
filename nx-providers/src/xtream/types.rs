//! Wire types for upstream provider A (the xtream-style HTTP catalog API,
//! spec.md §6). Field names and the id-aliasing fallback list are
//! reproduced verbatim from the spec; this module owns no behavior beyond
//! deserialization.

use serde::Deserialize;

fn non_zero(id: Option<i64>) -> Option<i64> {
    id.filter(|&v| v != 0)
}

/// `get_live_categories` / `get_vod_categories` / `get_series_categories`.
#[derive(Debug, Clone, Deserialize)]
pub struct XtreamCategory {
    pub category_id: String,
    pub category_name: String,
    #[serde(default)]
    pub parent_id: Option<serde_json::Value>,
}

impl XtreamCategory {
    #[must_use]
    pub fn parent_id_str(&self) -> Option<String> {
        match &self.parent_id {
            Some(serde_json::Value::String(s)) if !s.is_empty() && s != "0" => Some(s.clone()),
            Some(serde_json::Value::Number(n)) if n.as_i64().is_some_and(|v| v != 0) => {
                Some(n.to_string())
            }
            _ => None,
        }
    }
}

/// `get_live_streams[?category_id=...]`.
#[derive(Debug, Clone, Deserialize)]
pub struct XtreamLiveStream {
    pub stream_id: i64,
    pub name: String,
    #[serde(default)]
    pub stream_icon: Option<String>,
    #[serde(default)]
    pub epg_channel_id: Option<String>,
    #[serde(default)]
    pub tv_archive: Option<i32>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub added: Option<String>,
}

/// `get_vod_streams[?category_id=...]`. The id-aliasing fallback list
/// (`vod_id | movie_id | id | stream_id`, first non-null non-zero wins,
/// spec.md §9) is resolved by [`Self::resolved_id`].
#[derive(Debug, Clone, Deserialize)]
pub struct XtreamVodStream {
    pub name: String,
    #[serde(default)]
    pub vod_id: Option<i64>,
    #[serde(default)]
    pub movie_id: Option<i64>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub stream_id: Option<i64>,
    #[serde(default)]
    pub stream_icon: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub container_extension: Option<String>,
    #[serde(default)]
    pub added: Option<String>,
}

impl XtreamVodStream {
    #[must_use]
    pub fn resolved_id(&self) -> Option<i64> {
        non_zero(self.vod_id)
            .or_else(|| non_zero(self.movie_id))
            .or_else(|| non_zero(self.id))
            .or_else(|| non_zero(self.stream_id))
    }
}

/// `get_series[?category_id=...]`.
#[derive(Debug, Clone, Deserialize)]
pub struct XtreamSeries {
    pub series_id: i64,
    pub name: String,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
}

/// Nested `info{}` block shared by `get_vod_info` and `get_series_info`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct XtreamInfo {
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub cast: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub cover_big: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<Vec<String>>,
    #[serde(default)]
    pub youtube_trailer: Option<String>,
    #[serde(default)]
    pub releasedate: Option<String>,
    #[serde(default)]
    pub tmdb_id: Option<serde_json::Value>,
    #[serde(default)]
    pub duration_secs: Option<i64>,
}

/// `movie_data{}` block of `get_vod_info`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct XtreamMovieData {
    #[serde(default)]
    pub container_extension: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct XtreamVodInfo {
    #[serde(default)]
    pub info: XtreamInfo,
    #[serde(default)]
    pub movie_data: XtreamMovieData,
}

/// `get_series_info?series_id=...`: `info`, `seasons[]`, and
/// `episodes{season: [...]}`, season keyed by string in the wire format.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct XtreamSeriesInfo {
    #[serde(default)]
    pub info: XtreamInfo,
    #[serde(default)]
    pub seasons: Vec<serde_json::Value>,
    #[serde(default)]
    pub episodes: std::collections::HashMap<String, Vec<XtreamEpisode>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XtreamEpisode {
    pub id: serde_json::Value,
    pub title: String,
    #[serde(default)]
    pub container_extension: Option<String>,
    #[serde(default)]
    pub season: Option<i64>,
    #[serde(default)]
    pub episode_num: Option<serde_json::Value>,
    #[serde(default)]
    pub info: Option<XtreamEpisodeInfo>,
    #[serde(default)]
    pub added: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct XtreamEpisodeInfo {
    #[serde(default)]
    pub duration_secs: Option<i64>,
    #[serde(default)]
    pub plot: Option<String>,
}

impl XtreamEpisode {
    #[must_use]
    pub fn id_str(&self) -> String {
        match &self.id {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => String::new(),
        }
    }

    #[must_use]
    pub fn episode_number(&self) -> Option<u32> {
        match &self.episode_num {
            Some(serde_json::Value::String(s)) => s.parse().ok(),
            Some(serde_json::Value::Number(n)) => n.as_u64().map(|v| v as u32),
            _ => None,
        }
    }
}
