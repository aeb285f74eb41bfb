use serde::{Deserialize, Serialize};

/// `(profileKey, workKey)` unique. `resume_percent` is the cross-source
/// source-of-truth for resume position (§3, scenario 6): when playback
/// switches sources, the new source's position is computed from this
/// percentage rather than from `resume_position_ms`, which is
/// source-specific.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkUserState {
    pub profile_key: String,
    pub work_key: String,
    pub resume_position_ms: i64,
    pub resume_percent: f32,
    pub total_duration_ms: i64,
    pub is_favorite: bool,
    pub is_watched: bool,
    pub watch_count: u32,
    pub user_rating: Option<u8>,
    pub last_variant_key: Option<String>,
    pub last_watched_at_ms: i64,
}

impl WorkUserState {
    #[must_use]
    pub fn new(profile_key: String, work_key: String) -> Self {
        Self {
            profile_key,
            work_key,
            resume_position_ms: 0,
            resume_percent: 0.0,
            total_duration_ms: 0,
            is_favorite: false,
            is_watched: false,
            watch_count: 0,
            user_rating: None,
            last_variant_key: None,
            last_watched_at_ms: 0,
        }
    }

    /// Resume position in milliseconds for a newly selected variant, derived
    /// from `resume_percent` rather than the (possibly source-specific)
    /// `resume_position_ms`.
    #[must_use]
    pub fn resume_position_for_duration(&self, duration_ms: i64) -> i64 {
        ((f64::from(self.resume_percent)) * (duration_ms as f64)) as i64
    }

    pub fn record_progress(
        &mut self,
        variant_key: String,
        position_ms: i64,
        duration_ms: i64,
        now_ms: i64,
    ) {
        self.resume_position_ms = position_ms;
        self.total_duration_ms = duration_ms;
        self.resume_percent = if duration_ms > 0 {
            (position_ms as f64 / duration_ms as f64).clamp(0.0, 1.0) as f32
        } else {
            0.0
        };
        self.last_variant_key = Some(variant_key);
        self.last_watched_at_ms = now_ms;
    }
}

/// Transient, evictable per-work liveness state. Not covered by the
/// entity-store uniqueness/durability guarantees the other entities get.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkRuntimeState {
    pub work_key: String,
    pub availability: Availability,
    pub last_error_code: Option<String>,
    pub last_probe_at_ms: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Unknown,
    Available,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    Owner,
    Guest,
    Kid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub profile_key: String,
    pub kind: ProfileKind,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    RatingCap,
    CategoryFilter,
    AllowList,
    DenyList,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRule {
    pub profile_key: String,
    pub rule_kind: RuleKind,
    pub allow_list: Vec<String>,
    pub deny_list: Vec<String>,
    pub rating_cap: Option<f32>,
    pub category_filters: Vec<String>,
}

/// `(profileKey, epochDay)` unique. `epoch_day` is days since the Unix
/// epoch, UTC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUsage {
    pub profile_key: String,
    pub epoch_day: i64,
    pub watch_time_ms: i64,
    pub items_watched: u32,
    pub last_activity_at_ms: i64,
}
