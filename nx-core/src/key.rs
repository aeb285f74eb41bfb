//! Deterministic key codec.
//!
//! Sole owner of the string representations used to identify works, source
//! references, variants, and authority records. Pure parsing/formatting: no
//! I/O, no database access. Redirect resolution lives on the entity store
//! (it needs to read `WorkRedirect` rows), not here.

use crate::{Error, Result};

const REDIRECT_HOP_CAP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    Movie,
    Series,
    Episode,
    Live,
}

impl WorkType {
    fn as_str(self) -> &'static str {
        match self {
            WorkType::Movie => "movie",
            WorkType::Series => "series",
            WorkType::Episode => "episode",
            WorkType::Live => "live",
        }
    }

    fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "movie" => Ok(WorkType::Movie),
            "series" => Ok(WorkType::Series),
            "episode" => Ok(WorkType::Episode),
            "live" => Ok(WorkType::Live),
            other => Err(Error::UnknownKeyKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Xtream,
    Tg,
    Local,
}

impl SourceType {
    fn as_str(self) -> &'static str {
        match self {
            SourceType::Xtream => "xtream",
            SourceType::Tg => "tg",
            SourceType::Local => "local",
        }
    }

    fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "xtream" => Ok(SourceType::Xtream),
            "tg" => Ok(SourceType::Tg),
            "local" => Ok(SourceType::Local),
            other => Err(Error::UnknownKeyKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Vod,
    Series,
    Episode,
    Live,
}

impl SourceKind {
    fn as_str(self) -> &'static str {
        match self {
            SourceKind::Vod => "vod",
            SourceKind::Series => "series",
            SourceKind::Episode => "episode",
            SourceKind::Live => "live",
        }
    }

    fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "vod" => Ok(SourceKind::Vod),
            "series" => Ok(SourceKind::Series),
            "episode" => Ok(SourceKind::Episode),
            "live" => Ok(SourceKind::Live),
            other => Err(Error::UnknownKeyKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Authority {
    Tmdb,
    Imdb,
    Tvdb,
}

impl Authority {
    fn as_str(self) -> &'static str {
        match self {
            Authority::Tmdb => "tmdb",
            Authority::Imdb => "imdb",
            Authority::Tvdb => "tvdb",
        }
    }

    fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tmdb" => Ok(Authority::Tmdb),
            "imdb" => Ok(Authority::Imdb),
            "tvdb" => Ok(Authority::Tvdb),
            other => Err(Error::UnknownKeyKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityMediaType {
    Movie,
    Tv,
}

impl AuthorityMediaType {
    fn as_str(self) -> &'static str {
        match self {
            AuthorityMediaType::Movie => "movie",
            AuthorityMediaType::Tv => "tv",
        }
    }

    fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "movie" => Ok(AuthorityMediaType::Movie),
            "tv" => Ok(AuthorityMediaType::Tv),
            other => Err(Error::UnknownKeyKind(other.to_string())),
        }
    }
}

/// Coarse classification used by UI filtering and routing. Distinct from
/// `WorkType`/`SourceKind` because callers may hand either a work key or a
/// source key to `detect_content_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Vod,
    Live,
    Series,
    Episode,
    Unknown,
}

/// Result of `parse_work`, tagged by `WorkType`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedWorkKey {
    Movie { canonical_slug: String, year: i32 },
    Series { canonical_slug: String, year: i32 },
    Episode {
        canonical_slug: String,
        year: i32,
        season: u32,
        episode: u32,
    },
    Live { canonical_slug: String },
}

/// Result of `parse_source`, tagged by `SourceKind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedSourceKey {
    Vod(SourceKeyFields),
    Series(SourceKeyFields),
    Episode(SourceKeyFields),
    Live(SourceKeyFields),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceKeyFields {
    pub source_type: SourceType,
    pub account_key: String,
    pub provider_item_id: String,
}

impl ParsedSourceKey {
    #[must_use]
    pub fn fields(&self) -> &SourceKeyFields {
        match self {
            ParsedSourceKey::Vod(f)
            | ParsedSourceKey::Series(f)
            | ParsedSourceKey::Episode(f)
            | ParsedSourceKey::Live(f) => f,
        }
    }
}

fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_dash = false;
    for ch in title.trim().chars() {
        if ch.is_whitespace() || ch == '-' {
            if !last_was_dash && !slug.is_empty() {
                slug.push('-');
                last_was_dash = true;
            }
        } else if ch.is_alphanumeric() || !ch.is_ascii() {
            // preserve diacritics and other non-ascii letters
            slug.extend(ch.to_lowercase());
            last_was_dash = false;
        }
        // punctuation (ascii, non-alphanumeric) is stripped outright
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

fn reject_zero_id(id: &str) -> Result<()> {
    if let Ok(parsed) = id.trim().parse::<i64>() {
        if parsed == 0 {
            return Err(Error::InvalidKeyFormat(format!(
                "provider item id must not be zero: {id}"
            )));
        }
    }
    Ok(())
}

/// `formatWork` — build a `workKey` from its semantic parts.
pub fn format_work(
    work_type: WorkType,
    canonical_title: &str,
    year: Option<i32>,
    season: Option<u32>,
    episode: Option<u32>,
) -> Result<String> {
    let slug = slugify(canonical_title);
    if slug.is_empty() {
        return Err(Error::InvalidKeyFormat(
            "canonical title produced an empty slug".to_string(),
        ));
    }

    match work_type {
        WorkType::Live => Ok(format!("live:{slug}:LIVE")),
        WorkType::Movie | WorkType::Series => {
            let year = year.ok_or_else(|| {
                Error::InvalidKeyFormat("movie/series work key requires a year".to_string())
            })?;
            Ok(format!("{}:{slug}:{year}", work_type.as_str()))
        }
        WorkType::Episode => {
            let year = year.ok_or_else(|| {
                Error::InvalidKeyFormat("episode work key requires a year".to_string())
            })?;
            let season = season.ok_or_else(|| {
                Error::InvalidKeyFormat("episode work key requires a season".to_string())
            })?;
            let episode = episode.ok_or_else(|| {
                Error::InvalidKeyFormat("episode work key requires an episode".to_string())
            })?;
            Ok(format!("episode:{slug}:{year}:s{season}:e{episode}"))
        }
    }
}

/// `parseWork` — returns a tagged variant matching the key's `workType`.
pub fn parse_work(key: &str) -> Result<ParsedWorkKey> {
    let mut parts = key.split(':');
    let work_type = parts
        .next()
        .ok_or_else(|| Error::InvalidKeyFormat(key.to_string()))?;
    let work_type = WorkType::parse(work_type)?;

    let slug = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::InvalidKeyFormat(key.to_string()))?
        .to_string();

    let year_or_live = parts
        .next()
        .ok_or_else(|| Error::InvalidKeyFormat(key.to_string()))?;

    match work_type {
        WorkType::Live => {
            if !year_or_live.eq_ignore_ascii_case("live") {
                return Err(Error::InvalidKeyFormat(key.to_string()));
            }
            if parts.next().is_some() {
                return Err(Error::InvalidKeyFormat(key.to_string()));
            }
            Ok(ParsedWorkKey::Live {
                canonical_slug: slug,
            })
        }
        WorkType::Movie => {
            if parts.next().is_some() {
                return Err(Error::InvalidKeyFormat(key.to_string()));
            }
            let year = year_or_live
                .parse::<i32>()
                .map_err(|_| Error::InvalidKeyFormat(key.to_string()))?;
            Ok(ParsedWorkKey::Movie {
                canonical_slug: slug,
                year,
            })
        }
        WorkType::Series => {
            if parts.next().is_some() {
                return Err(Error::InvalidKeyFormat(key.to_string()));
            }
            let year = year_or_live
                .parse::<i32>()
                .map_err(|_| Error::InvalidKeyFormat(key.to_string()))?;
            Ok(ParsedWorkKey::Series {
                canonical_slug: slug,
                year,
            })
        }
        WorkType::Episode => {
            let year = year_or_live
                .parse::<i32>()
                .map_err(|_| Error::InvalidKeyFormat(key.to_string()))?;
            let season_tok = parts
                .next()
                .ok_or_else(|| Error::InvalidKeyFormat(key.to_string()))?;
            let episode_tok = parts
                .next()
                .ok_or_else(|| Error::InvalidKeyFormat(key.to_string()))?;
            if parts.next().is_some() {
                return Err(Error::InvalidKeyFormat(key.to_string()));
            }
            let season = parse_marker(season_tok, 's')
                .ok_or_else(|| Error::InvalidKeyFormat(key.to_string()))?;
            let episode = parse_marker(episode_tok, 'e')
                .ok_or_else(|| Error::InvalidKeyFormat(key.to_string()))?;
            Ok(ParsedWorkKey::Episode {
                canonical_slug: slug,
                year,
                season,
                episode,
            })
        }
    }
}

/// Parses `sNN` / `SNN` (or `eNN` / `ENN`) markers, case-insensitively.
fn parse_marker(token: &str, marker: char) -> Option<u32> {
    let mut chars = token.chars();
    let first = chars.next()?;
    if !first.eq_ignore_ascii_case(&marker) {
        return None;
    }
    chars.as_str().parse::<u32>().ok()
}

/// `formatSource` — always emits the current composite form, never the
/// legacy short form.
pub fn format_source(
    source_type: SourceType,
    account_key: &str,
    kind: SourceKind,
    provider_item_id: &str,
) -> Result<String> {
    if account_key.is_empty() {
        return Err(Error::InvalidKeyFormat(
            "accountKey must not be empty".to_string(),
        ));
    }
    reject_zero_id(provider_item_id)?;
    Ok(format!(
        "src:{}:{}:{}:{}",
        source_type.as_str(),
        account_key,
        kind.as_str(),
        provider_item_id
    ))
}

/// `parseSource` — accepts both the current composite form and the legacy
/// short form on read. New writers must go through `format_source`, which
/// always emits the composite form (see Decision 2 in DESIGN.md).
pub fn parse_source(key: &str) -> Result<ParsedSourceKey> {
    if let Some(rest) = key.strip_prefix("src:") {
        let parts: Vec<&str> = rest.split(':').collect();
        let [source_type, account_key, kind, provider_item_id] = parts.as_slice() else {
            return Err(Error::InvalidKeyFormat(key.to_string()));
        };
        return build_parsed_source(source_type, account_key, kind, provider_item_id, key);
    }
    parse_source_legacy(key)
}

/// Accepts the legacy short form `"<sourceType>:<accountKey>:<providerItemId>"`.
/// The legacy form predates the `kind` segment; since it was only ever used
/// for VOD items, it is parsed as `SourceKind::Vod`.
pub fn parse_source_legacy(key: &str) -> Result<ParsedSourceKey> {
    let parts: Vec<&str> = key.split(':').collect();
    let [source_type, account_key, provider_item_id] = parts.as_slice() else {
        return Err(Error::InvalidKeyFormat(key.to_string()));
    };
    build_parsed_source(source_type, account_key, "vod", provider_item_id, key)
}

fn build_parsed_source(
    source_type: &str,
    account_key: &str,
    kind: &str,
    provider_item_id: &str,
    original: &str,
) -> Result<ParsedSourceKey> {
    if account_key.is_empty() || provider_item_id.is_empty() {
        return Err(Error::InvalidKeyFormat(original.to_string()));
    }
    reject_zero_id(provider_item_id)?;
    let source_type = SourceType::parse(source_type)?;
    let kind = SourceKind::parse(kind)?;
    let fields = SourceKeyFields {
        source_type,
        account_key: account_key.to_string(),
        provider_item_id: provider_item_id.to_string(),
    };
    Ok(match kind {
        SourceKind::Vod => ParsedSourceKey::Vod(fields),
        SourceKind::Series => ParsedSourceKey::Series(fields),
        SourceKind::Episode => ParsedSourceKey::Episode(fields),
        SourceKind::Live => ParsedSourceKey::Live(fields),
    })
}

/// `formatVariant` — `"<sourceKey>#<qualityTag>:<languageTag>"`.
pub fn format_variant(source_key: &str, quality_tag: &str, language_tag: &str) -> Result<String> {
    if quality_tag.is_empty() || language_tag.is_empty() {
        return Err(Error::InvalidKeyFormat(
            "quality/language tags must not be empty".to_string(),
        ));
    }
    Ok(format!("{source_key}#{quality_tag}:{language_tag}"))
}

pub struct ParsedVariantKey {
    pub source_key: String,
    pub quality_tag: String,
    pub language_tag: String,
}

pub fn parse_variant(key: &str) -> Result<ParsedVariantKey> {
    let (source_key, suffix) = key
        .split_once('#')
        .ok_or_else(|| Error::InvalidKeyFormat(key.to_string()))?;
    let (quality_tag, language_tag) = suffix
        .split_once(':')
        .ok_or_else(|| Error::InvalidKeyFormat(key.to_string()))?;
    if source_key.is_empty() || quality_tag.is_empty() || language_tag.is_empty() {
        return Err(Error::InvalidKeyFormat(key.to_string()));
    }
    Ok(ParsedVariantKey {
        source_key: source_key.to_string(),
        quality_tag: quality_tag.to_string(),
        language_tag: language_tag.to_string(),
    })
}

/// `formatAuthority` — `"<authority>:<type>:<id>"`.
pub fn format_authority(
    authority: Authority,
    media_type: AuthorityMediaType,
    id: &str,
) -> Result<String> {
    if id.is_empty() {
        return Err(Error::InvalidKeyFormat(
            "authority id must not be empty".to_string(),
        ));
    }
    Ok(format!(
        "{}:{}:{}",
        authority.as_str(),
        media_type.as_str(),
        id
    ))
}

pub struct ParsedAuthorityKey {
    pub authority: Authority,
    pub media_type: AuthorityMediaType,
    pub id: String,
}

pub fn parse_authority(key: &str) -> Result<ParsedAuthorityKey> {
    let parts: Vec<&str> = key.split(':').collect();
    let [authority, media_type, id] = parts.as_slice() else {
        return Err(Error::InvalidKeyFormat(key.to_string()));
    };
    if id.is_empty() {
        return Err(Error::InvalidKeyFormat(key.to_string()));
    }
    Ok(ParsedAuthorityKey {
        authority: Authority::parse(authority)?,
        media_type: AuthorityMediaType::parse(media_type)?,
        id: (*id).to_string(),
    })
}

/// `detectContentType` — classifies any of the four key kinds.
#[must_use]
pub fn detect_content_type(any_key: &str) -> ContentType {
    if let Some(rest) = any_key.strip_prefix("src:") {
        let mut parts = rest.split(':');
        let _source_type = parts.next();
        let _account_key = parts.next();
        return match parts.next() {
            Some("vod") => ContentType::Vod,
            Some("series") => ContentType::Series,
            Some("episode") => ContentType::Episode,
            Some("live") => ContentType::Live,
            _ => ContentType::Unknown,
        };
    }
    if let Some((source_key, _)) = any_key.split_once('#') {
        return detect_content_type(source_key);
    }
    match parse_work(any_key) {
        Ok(ParsedWorkKey::Movie { .. }) => ContentType::Vod,
        Ok(ParsedWorkKey::Series { .. }) => ContentType::Series,
        Ok(ParsedWorkKey::Episode { .. }) => ContentType::Episode,
        Ok(ParsedWorkKey::Live { .. }) => ContentType::Live,
        Err(_) => ContentType::Unknown,
    }
}

/// `isValid` — true if `any_key` parses as any of the four key kinds.
#[must_use]
pub fn is_valid(any_key: &str) -> bool {
    parse_work(any_key).is_ok()
        || parse_source(any_key).is_ok()
        || parse_variant(any_key).is_ok()
        || parse_authority(any_key).is_ok()
}

/// Maximum hop count `resolve_through_redirects` callers must enforce; the
/// entity store applies this cap, the codec only publishes the constant so
/// the policy lives in one place.
#[must_use]
pub const fn redirect_hop_cap() -> usize {
    REDIRECT_HOP_CAP
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_key_round_trip() {
        let key = format_work(WorkType::Movie, "The Matrix", Some(1999), None, None).unwrap();
        assert_eq!(key, "movie:the-matrix:1999");
        match parse_work(&key).unwrap() {
            ParsedWorkKey::Movie { canonical_slug, year } => {
                assert_eq!(canonical_slug, "the-matrix");
                assert_eq!(year, 1999);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn episode_key_round_trip_matches_scenario() {
        let key = format_work(
            WorkType::Episode,
            "The Matrix",
            Some(1999),
            Some(1),
            Some(5),
        )
        .unwrap();
        assert_eq!(key, "episode:the-matrix:1999:s1:e5");
        match parse_work(&key).unwrap() {
            ParsedWorkKey::Episode {
                canonical_slug,
                year,
                season,
                episode,
            } => {
                assert_eq!(canonical_slug, "the-matrix");
                assert_eq!(year, 1999);
                assert_eq!(season, 1);
                assert_eq!(episode, 5);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn episode_marker_is_case_insensitive() {
        match parse_work("episode:the-matrix:1999:S1:E5").unwrap() {
            ParsedWorkKey::Episode { season, episode, .. } => {
                assert_eq!(season, 1);
                assert_eq!(episode, 5);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn live_key_uses_literal_live_year() {
        let key = format_work(WorkType::Live, "BBC One", None, None, None).unwrap();
        assert_eq!(key, "live:bbc-one:LIVE");
        assert!(matches!(parse_work(&key).unwrap(), ParsedWorkKey::Live { .. }));
    }

    #[test]
    fn source_key_collision_safety_across_accounts() {
        let acc1 = format_source(SourceType::Xtream, "acc1", SourceKind::Vod, "603").unwrap();
        let acc2 = format_source(SourceType::Xtream, "acc2", SourceKind::Vod, "603").unwrap();
        assert_eq!(acc1, "src:xtream:acc1:vod:603");
        assert_eq!(acc2, "src:xtream:acc2:vod:603");
        assert_ne!(acc1, acc2);
    }

    #[test]
    fn legacy_source_key_parses_as_vod() {
        let parsed = parse_source("xtream:acc1:603").unwrap();
        assert!(matches!(parsed, ParsedSourceKey::Vod(_)));
        assert_eq!(parsed.fields().account_key, "acc1");
    }

    #[test]
    fn format_source_never_emits_legacy_form() {
        let key = format_source(SourceType::Xtream, "acc1", SourceKind::Vod, "603").unwrap();
        assert!(key.starts_with("src:"));
    }

    #[test]
    fn zero_provider_id_rejected() {
        assert!(format_source(SourceType::Xtream, "acc1", SourceKind::Vod, "0").is_err());
        assert!(parse_source("src:xtream:acc1:vod:0").is_err());
    }

    #[test]
    fn negative_provider_id_allowed_for_fixtures() {
        assert!(format_source(SourceType::Xtream, "acc1", SourceKind::Vod, "-5").is_ok());
    }

    #[test]
    fn variant_key_round_trip() {
        let source_key = format_source(SourceType::Xtream, "acc1", SourceKind::Vod, "603").unwrap();
        let variant_key = format_variant(&source_key, "1080p", "en").unwrap();
        let parsed = parse_variant(&variant_key).unwrap();
        assert_eq!(parsed.source_key, source_key);
        assert_eq!(parsed.quality_tag, "1080p");
        assert_eq!(parsed.language_tag, "en");
    }

    #[test]
    fn authority_key_round_trip() {
        let key = format_authority(Authority::Tmdb, AuthorityMediaType::Movie, "603").unwrap();
        assert_eq!(key, "tmdb:movie:603");
        let parsed = parse_authority(&key).unwrap();
        assert_eq!(parsed.id, "603");
    }

    #[test]
    fn detect_content_type_covers_all_kinds() {
        assert!(matches!(detect_content_type("movie:x:2000"), ContentType::Vod));
        assert!(matches!(detect_content_type("live:x:LIVE"), ContentType::Live));
        assert!(matches!(
            detect_content_type("src:xtream:acc1:series:1"),
            ContentType::Series
        ));
        assert!(matches!(detect_content_type("not-a-key"), ContentType::Unknown));
    }

    #[test]
    fn is_valid_rejects_garbage() {
        assert!(!is_valid("definitely not a key"));
        assert!(is_valid("movie:the-matrix:1999"));
    }

    #[test]
    fn slug_strips_punctuation_and_preserves_diacritics() {
        let key = format_work(WorkType::Movie, "Amélie: Special Edition!", Some(2001), None, None)
            .unwrap();
        assert_eq!(key, "movie:amélie-special-edition:2001");
    }
}
