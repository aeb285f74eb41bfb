use serde::{Deserialize, Serialize};

use crate::key::WorkType;

/// UI source-of-truth for a single canonical title. Created by the
/// normalizer on first `ACCEPTED` ingest; never deleted — superseded works
/// point at their survivor via a [`WorkRedirect`](super::redirect::WorkRedirect).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Work {
    pub work_key: String,
    pub work_type: WorkType,
    pub canonical_title: String,
    pub canonical_title_lower: String,
    pub year: Option<i32>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub duration_ms: Option<i64>,
    pub plot: Option<String>,
    pub rating: Option<f32>,
    pub genres: Vec<String>,
    pub cast: Vec<String>,
    pub director: Option<String>,
    pub poster: Option<String>,
    pub backdrop: Option<String>,
    pub trailer: Option<String>,
    pub authority_refs: AuthorityRefs,
    pub is_adult: bool,
    pub needs_review: bool,
}

/// A work may carry at most one id per authority; all are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorityRefs {
    pub tmdb_id: Option<String>,
    pub imdb_id: Option<String>,
    pub tvdb_id: Option<String>,
}

impl Work {
    #[must_use]
    pub fn new(work_key: String, work_type: WorkType, canonical_title: String) -> Self {
        let canonical_title_lower = canonical_title.to_lowercase();
        Self {
            work_key,
            work_type,
            canonical_title,
            canonical_title_lower,
            year: None,
            season: None,
            episode: None,
            duration_ms: None,
            plot: None,
            rating: None,
            genres: Vec::new(),
            cast: Vec::new(),
            director: None,
            poster: None,
            backdrop: None,
            trailer: None,
            authority_refs: AuthorityRefs::default(),
            is_adult: false,
            needs_review: false,
        }
    }

    /// Sets `canonical_title` and keeps `canonical_title_lower` in sync. Detail
    /// enrichment must call this rather than assigning the field directly.
    pub fn set_canonical_title(&mut self, title: String) {
        self.canonical_title_lower = title.to_lowercase();
        self.canonical_title = title;
    }
}

/// Kind of `WorkRelation` edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    SeriesToEpisode,
    Next,
    Prev,
    Related,
}

/// `(parentWorkKey, childWorkKey)` unique edge. Season/episode are duplicated
/// from the child `Work` for query efficiency and must be kept in sync with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkRelation {
    pub parent_work_key: String,
    pub child_work_key: String,
    pub kind: RelationKind,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub sort_order: i32,
}
