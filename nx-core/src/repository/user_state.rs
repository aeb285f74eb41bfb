//! `WorkUserState`, `WorkRuntimeState`, `Profile`, `ProfileRule`, and
//! `ProfileUsage` persistence.

use sqlx::{PgPool, Row};

use crate::{
    models::{
        Availability, Profile, ProfileKind, ProfileRule, ProfileUsage, RuleKind,
        WorkRuntimeState, WorkUserState,
    },
    Result,
};

#[derive(Clone)]
pub struct WorkUserStateRepository {
    pool: PgPool,
}

impl WorkUserStateRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, profile_key: &str, work_key: &str) -> Result<Option<WorkUserState>> {
        let row = sqlx::query(
            r"
            SELECT profile_key, work_key, resume_position_ms, resume_percent, total_duration_ms,
                   is_favorite, is_watched, watch_count, user_rating, last_variant_key,
                   last_watched_at_ms
            FROM work_user_states WHERE profile_key = $1 AND work_key = $2
            ",
        )
        .bind(profile_key)
        .bind(work_key)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_state).transpose()
    }

    pub async fn upsert(&self, state: &WorkUserState) -> Result<WorkUserState> {
        self.upsert_with_executor(state, &self.pool).await
    }

    pub async fn upsert_with_executor<'e, E>(
        &self,
        state: &WorkUserState,
        executor: E,
    ) -> Result<WorkUserState>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let row = sqlx::query(
            r"
            INSERT INTO work_user_states (profile_key, work_key, resume_position_ms,
                                           resume_percent, total_duration_ms, is_favorite,
                                           is_watched, watch_count, user_rating, last_variant_key,
                                           last_watched_at_ms)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (profile_key, work_key) DO UPDATE SET
                resume_position_ms = EXCLUDED.resume_position_ms,
                resume_percent = EXCLUDED.resume_percent,
                total_duration_ms = EXCLUDED.total_duration_ms,
                is_favorite = EXCLUDED.is_favorite,
                is_watched = EXCLUDED.is_watched,
                watch_count = EXCLUDED.watch_count,
                user_rating = EXCLUDED.user_rating,
                last_variant_key = EXCLUDED.last_variant_key,
                last_watched_at_ms = EXCLUDED.last_watched_at_ms
            RETURNING profile_key, work_key, resume_position_ms, resume_percent,
                      total_duration_ms, is_favorite, is_watched, watch_count, user_rating,
                      last_variant_key, last_watched_at_ms
            ",
        )
        .bind(&state.profile_key)
        .bind(&state.work_key)
        .bind(state.resume_position_ms)
        .bind(state.resume_percent)
        .bind(state.total_duration_ms)
        .bind(state.is_favorite)
        .bind(state.is_watched)
        .bind(state.watch_count as i32)
        .bind(state.user_rating.map(i32::from))
        .bind(&state.last_variant_key)
        .bind(state.last_watched_at_ms)
        .fetch_one(executor)
        .await?;
        Self::row_to_state(row)
    }

    /// Decision 3 (DESIGN.md): resynchronizes the denormalized
    /// `total_duration_ms` on every `WorkUserState` row for a work whenever
    /// `Work.duration_ms` changes. Callers invoke this inside the same
    /// transaction as the `Work` upsert.
    pub async fn resync_total_duration<'e, E>(
        &self,
        work_key: &str,
        duration_ms: i64,
        executor: E,
    ) -> Result<u64>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let result = sqlx::query(
            "UPDATE work_user_states SET total_duration_ms = $1 WHERE work_key = $2",
        )
        .bind(duration_ms)
        .bind(work_key)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    fn row_to_state(row: sqlx::postgres::PgRow) -> Result<WorkUserState> {
        Ok(WorkUserState {
            profile_key: row.try_get("profile_key")?,
            work_key: row.try_get("work_key")?,
            resume_position_ms: row.try_get("resume_position_ms")?,
            resume_percent: row.try_get("resume_percent")?,
            total_duration_ms: row.try_get("total_duration_ms")?,
            is_favorite: row.try_get("is_favorite")?,
            is_watched: row.try_get("is_watched")?,
            watch_count: row.try_get::<i32, _>("watch_count")? as u32,
            user_rating: row.try_get::<Option<i32>, _>("user_rating")?.map(|v| v as u8),
            last_variant_key: row.try_get("last_variant_key")?,
            last_watched_at_ms: row.try_get("last_watched_at_ms")?,
        })
    }
}

/// Transient, evictable — no uniqueness/durability guarantee beyond
/// last-write-wins per `work_key`.
#[derive(Clone)]
pub struct WorkRuntimeStateRepository {
    pool: PgPool,
}

impl WorkRuntimeStateRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, state: &WorkRuntimeState) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO work_runtime_states (work_key, availability, last_error_code,
                                               last_probe_at_ms)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (work_key) DO UPDATE SET
                availability = EXCLUDED.availability,
                last_error_code = EXCLUDED.last_error_code,
                last_probe_at_ms = EXCLUDED.last_probe_at_ms
            ",
        )
        .bind(&state.work_key)
        .bind(availability_str(state.availability))
        .bind(&state.last_error_code)
        .bind(state.last_probe_at_ms)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, work_key: &str) -> Result<Option<WorkRuntimeState>> {
        let row = sqlx::query(
            "SELECT work_key, availability, last_error_code, last_probe_at_ms \
             FROM work_runtime_states WHERE work_key = $1",
        )
        .bind(work_key)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_state).transpose()
    }

    fn row_to_state(row: sqlx::postgres::PgRow) -> Result<WorkRuntimeState> {
        let availability: String = row.try_get("availability")?;
        Ok(WorkRuntimeState {
            work_key: row.try_get("work_key")?,
            availability: parse_availability(&availability)?,
            last_error_code: row.try_get("last_error_code")?,
            last_probe_at_ms: row.try_get("last_probe_at_ms")?,
        })
    }
}

fn availability_str(availability: Availability) -> &'static str {
    match availability {
        Availability::Unknown => "unknown",
        Availability::Available => "available",
        Availability::Unavailable => "unavailable",
    }
}

fn parse_availability(s: &str) -> Result<Availability> {
    match s {
        "unknown" => Ok(Availability::Unknown),
        "available" => Ok(Availability::Available),
        "unavailable" => Ok(Availability::Unavailable),
        other => Err(crate::Error::UnknownKeyKind(other.to_string())),
    }
}

#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, profile: &Profile) -> Result<Profile> {
        let row = sqlx::query(
            r"
            INSERT INTO profiles (profile_key, kind, display_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (profile_key) DO UPDATE SET
                kind = EXCLUDED.kind,
                display_name = EXCLUDED.display_name
            RETURNING profile_key, kind, display_name
            ",
        )
        .bind(&profile.profile_key)
        .bind(profile_kind_str(profile.kind))
        .bind(&profile.display_name)
        .fetch_one(&self.pool)
        .await?;
        Self::row_to_profile(row)
    }

    pub async fn get(&self, profile_key: &str) -> Result<Option<Profile>> {
        let row = sqlx::query("SELECT profile_key, kind, display_name FROM profiles WHERE profile_key = $1")
            .bind(profile_key)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_profile).transpose()
    }

    fn row_to_profile(row: sqlx::postgres::PgRow) -> Result<Profile> {
        let kind: String = row.try_get("kind")?;
        Ok(Profile {
            profile_key: row.try_get("profile_key")?,
            kind: parse_profile_kind(&kind)?,
            display_name: row.try_get("display_name")?,
        })
    }
}

fn profile_kind_str(kind: ProfileKind) -> &'static str {
    match kind {
        ProfileKind::Owner => "owner",
        ProfileKind::Guest => "guest",
        ProfileKind::Kid => "kid",
    }
}

fn parse_profile_kind(s: &str) -> Result<ProfileKind> {
    match s {
        "owner" => Ok(ProfileKind::Owner),
        "guest" => Ok(ProfileKind::Guest),
        "kid" => Ok(ProfileKind::Kid),
        other => Err(crate::Error::UnknownKeyKind(other.to_string())),
    }
}

#[derive(Clone)]
pub struct ProfileRuleRepository {
    pool: PgPool,
}

impl ProfileRuleRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, rule: &ProfileRule) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO profile_rules (profile_key, rule_kind, allow_list, deny_list, rating_cap,
                                        category_filters)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (profile_key, rule_kind) DO UPDATE SET
                allow_list = EXCLUDED.allow_list,
                deny_list = EXCLUDED.deny_list,
                rating_cap = EXCLUDED.rating_cap,
                category_filters = EXCLUDED.category_filters
            ",
        )
        .bind(&rule.profile_key)
        .bind(rule_kind_str(rule.rule_kind))
        .bind(&rule.allow_list)
        .bind(&rule.deny_list)
        .bind(rule.rating_cap)
        .bind(&rule.category_filters)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_for_profile(&self, profile_key: &str) -> Result<Vec<ProfileRule>> {
        let rows = sqlx::query(
            r"
            SELECT profile_key, rule_kind, allow_list, deny_list, rating_cap, category_filters
            FROM profile_rules WHERE profile_key = $1
            ",
        )
        .bind(profile_key)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_rule).collect()
    }

    fn row_to_rule(row: sqlx::postgres::PgRow) -> Result<ProfileRule> {
        let rule_kind: String = row.try_get("rule_kind")?;
        Ok(ProfileRule {
            profile_key: row.try_get("profile_key")?,
            rule_kind: parse_rule_kind(&rule_kind)?,
            allow_list: row.try_get("allow_list")?,
            deny_list: row.try_get("deny_list")?,
            rating_cap: row.try_get("rating_cap")?,
            category_filters: row.try_get("category_filters")?,
        })
    }
}

fn rule_kind_str(kind: RuleKind) -> &'static str {
    match kind {
        RuleKind::RatingCap => "rating_cap",
        RuleKind::CategoryFilter => "category_filter",
        RuleKind::AllowList => "allow_list",
        RuleKind::DenyList => "deny_list",
    }
}

fn parse_rule_kind(s: &str) -> Result<RuleKind> {
    match s {
        "rating_cap" => Ok(RuleKind::RatingCap),
        "category_filter" => Ok(RuleKind::CategoryFilter),
        "allow_list" => Ok(RuleKind::AllowList),
        "deny_list" => Ok(RuleKind::DenyList),
        other => Err(crate::Error::UnknownKeyKind(other.to_string())),
    }
}

#[derive(Clone)]
pub struct ProfileUsageRepository {
    pool: PgPool,
}

impl ProfileUsageRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, usage: &ProfileUsage) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO profile_usages (profile_key, epoch_day, watch_time_ms, items_watched,
                                         last_activity_at_ms)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (profile_key, epoch_day) DO UPDATE SET
                watch_time_ms = profile_usages.watch_time_ms + EXCLUDED.watch_time_ms,
                items_watched = profile_usages.items_watched + EXCLUDED.items_watched,
                last_activity_at_ms = EXCLUDED.last_activity_at_ms
            ",
        )
        .bind(&usage.profile_key)
        .bind(usage.epoch_day)
        .bind(usage.watch_time_ms)
        .bind(usage.items_watched as i32)
        .bind(usage.last_activity_at_ms)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
