//! `Work` persistence: get/upsert/upsert_batch/delete over `workKey`.

use sqlx::{types::Json, PgPool, Row};

use crate::{
    key::WorkType,
    models::{AuthorityRefs, Work},
    Result,
};

#[derive(Clone)]
pub struct WorkRepository {
    pool: PgPool,
}

impl WorkRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn get(&self, work_key: &str) -> Result<Option<Work>> {
        let row = sqlx::query(
            r"
            SELECT work_key, work_type, canonical_title, canonical_title_lower, year, season,
                   episode, duration_ms, plot, rating, genres, cast_members, director, poster, backdrop,
                   trailer, authority_refs, is_adult, needs_review
            FROM works WHERE work_key = $1
            ",
        )
        .bind(work_key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_work).transpose()
    }

    /// Upsert is idempotent: duplicate inserts by `workKey` update in place
    /// rather than erroring (§4.2).
    pub async fn upsert(&self, work: &Work) -> Result<Work> {
        self.upsert_with_executor(work, &self.pool).await
    }

    pub async fn upsert_with_executor<'e, E>(&self, work: &Work, executor: E) -> Result<Work>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let row = sqlx::query(
            r"
            INSERT INTO works (work_key, work_type, canonical_title, canonical_title_lower, year,
                               season, episode, duration_ms, plot, rating, genres, cast_members, director,
                               poster, backdrop, trailer, authority_refs, is_adult, needs_review)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            ON CONFLICT (work_key) DO UPDATE SET
                canonical_title = EXCLUDED.canonical_title,
                canonical_title_lower = EXCLUDED.canonical_title_lower,
                year = EXCLUDED.year,
                season = EXCLUDED.season,
                episode = EXCLUDED.episode,
                duration_ms = EXCLUDED.duration_ms,
                plot = EXCLUDED.plot,
                rating = EXCLUDED.rating,
                genres = EXCLUDED.genres,
                cast_members = EXCLUDED.cast_members,
                director = EXCLUDED.director,
                poster = EXCLUDED.poster,
                backdrop = EXCLUDED.backdrop,
                trailer = EXCLUDED.trailer,
                authority_refs = EXCLUDED.authority_refs,
                is_adult = EXCLUDED.is_adult,
                needs_review = EXCLUDED.needs_review
            RETURNING work_key, work_type, canonical_title, canonical_title_lower, year, season,
                      episode, duration_ms, plot, rating, genres, cast_members, director, poster, backdrop,
                      trailer, authority_refs, is_adult, needs_review
            ",
        )
        .bind(&work.work_key)
        .bind(work_type_str(work.work_type))
        .bind(&work.canonical_title)
        .bind(&work.canonical_title_lower)
        .bind(work.year)
        .bind(work.season.map(|s| s as i32))
        .bind(work.episode.map(|e| e as i32))
        .bind(work.duration_ms)
        .bind(&work.plot)
        .bind(work.rating)
        .bind(&work.genres)
        .bind(&work.cast)
        .bind(&work.director)
        .bind(&work.poster)
        .bind(&work.backdrop)
        .bind(&work.trailer)
        .bind(Json(&work.authority_refs))
        .bind(work.is_adult)
        .bind(work.needs_review)
        .fetch_one(executor)
        .await?;

        Self::row_to_work(row)
    }

    /// Atomic per-list batch upsert; callers wrap with `UnitOfWork` when the
    /// batch must commit alongside other writes (ledger entries, fingerprints).
    pub async fn upsert_batch(&self, works: &[Work]) -> Result<Vec<Work>> {
        let mut tx = self.pool.begin().await?;
        let mut results = Vec::with_capacity(works.len());
        for work in works {
            results.push(self.upsert_with_executor(work, &mut *tx).await?);
        }
        tx.commit().await?;
        Ok(results)
    }

    pub async fn delete(&self, work_key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM works WHERE work_key = $1")
            .bind(work_key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// INV-03: UI-visible iff ≥1 `WorkSourceRef` and ≥1 `WorkVariant` with
    /// non-empty playback hints exist.
    pub async fn list_visible(&self, limit: i64) -> Result<Vec<Work>> {
        let rows = sqlx::query(
            r"
            SELECT w.work_key, w.work_type, w.canonical_title, w.canonical_title_lower, w.year,
                   w.season, w.episode, w.duration_ms, w.plot, w.rating, w.genres, w.cast_members,
                   w.director, w.poster, w.backdrop, w.trailer, w.authority_refs, w.is_adult,
                   w.needs_review
            FROM works w
            WHERE EXISTS (SELECT 1 FROM work_source_refs sr WHERE sr.work_key = w.work_key)
              AND EXISTS (
                SELECT 1 FROM work_variants v
                JOIN work_source_refs sr2 ON v.source_key = sr2.source_key
                WHERE sr2.work_key = w.work_key AND v.url_hint <> ''
              )
            ORDER BY w.work_key
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_work).collect()
    }

    fn row_to_work(row: sqlx::postgres::PgRow) -> Result<Work> {
        let work_type_str: String = row.try_get("work_type")?;
        let authority_refs: Json<AuthorityRefs> = row.try_get("authority_refs")?;
        Ok(Work {
            work_key: row.try_get("work_key")?,
            work_type: parse_work_type(&work_type_str)?,
            canonical_title: row.try_get("canonical_title")?,
            canonical_title_lower: row.try_get("canonical_title_lower")?,
            year: row.try_get("year")?,
            season: row.try_get::<Option<i32>, _>("season")?.map(|v| v as u32),
            episode: row.try_get::<Option<i32>, _>("episode")?.map(|v| v as u32),
            duration_ms: row.try_get("duration_ms")?,
            plot: row.try_get("plot")?,
            rating: row.try_get("rating")?,
            genres: row.try_get("genres")?,
            cast: row.try_get("cast_members")?,
            director: row.try_get("director")?,
            poster: row.try_get("poster")?,
            backdrop: row.try_get("backdrop")?,
            trailer: row.try_get("trailer")?,
            authority_refs: authority_refs.0,
            is_adult: row.try_get("is_adult")?,
            needs_review: row.try_get("needs_review")?,
        })
    }
}

fn work_type_str(work_type: WorkType) -> &'static str {
    match work_type {
        WorkType::Movie => "movie",
        WorkType::Series => "series",
        WorkType::Episode => "episode",
        WorkType::Live => "live",
    }
}

fn parse_work_type(s: &str) -> Result<WorkType> {
    match s {
        "movie" => Ok(WorkType::Movie),
        "series" => Ok(WorkType::Series),
        "episode" => Ok(WorkType::Episode),
        "live" => Ok(WorkType::Live),
        other => Err(crate::Error::UnknownKeyKind(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    #[tokio::test]
    #[ignore = "Requires database"]
    async fn test_upsert_is_idempotent() {
        // Integration test placeholder: upsert(e); upsert(e) must not duplicate.
    }
}
