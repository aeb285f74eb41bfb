//! `WorkSourceRef` and `WorkVariant` persistence.

use sqlx::{PgPool, Row};

use crate::{
    models::{PlaybackMethod, WorkSourceRef, WorkVariant},
    Result,
};

#[derive(Clone)]
pub struct WorkSourceRefRepository {
    pool: PgPool,
}

impl WorkSourceRefRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, source_key: &str) -> Result<Option<WorkSourceRef>> {
        let row = sqlx::query(
            r"
            SELECT source_key, work_key, source_type, account_key, provider_item_id, raw_title,
                   container_hint, epg_channel_id, has_catchup, category_id
            FROM work_source_refs WHERE source_key = $1
            ",
        )
        .bind(source_key)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_ref).transpose()
    }

    /// `sourceKey` is globally unique (INV-04); upsert keeps it unique by
    /// construction rather than erroring on duplicate inserts.
    pub async fn upsert_with_executor<'e, E>(
        &self,
        source_ref: &WorkSourceRef,
        executor: E,
    ) -> Result<WorkSourceRef>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let row = sqlx::query(
            r"
            INSERT INTO work_source_refs (source_key, work_key, source_type, account_key,
                                           provider_item_id, raw_title, container_hint,
                                           epg_channel_id, has_catchup, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (source_key) DO UPDATE SET
                work_key = EXCLUDED.work_key,
                raw_title = EXCLUDED.raw_title,
                container_hint = EXCLUDED.container_hint,
                epg_channel_id = EXCLUDED.epg_channel_id,
                has_catchup = EXCLUDED.has_catchup,
                category_id = EXCLUDED.category_id
            RETURNING source_key, work_key, source_type, account_key, provider_item_id, raw_title,
                      container_hint, epg_channel_id, has_catchup, category_id
            ",
        )
        .bind(&source_ref.source_key)
        .bind(&source_ref.work_key)
        .bind(&source_ref.source_type)
        .bind(&source_ref.account_key)
        .bind(&source_ref.provider_item_id)
        .bind(&source_ref.raw_title)
        .bind(&source_ref.container_hint)
        .bind(&source_ref.epg_channel_id)
        .bind(source_ref.has_catchup)
        .bind(&source_ref.category_id)
        .fetch_one(executor)
        .await?;
        Self::row_to_ref(row)
    }

    pub async fn upsert(&self, source_ref: &WorkSourceRef) -> Result<WorkSourceRef> {
        self.upsert_with_executor(source_ref, &self.pool).await
    }

    pub async fn list_by_work(&self, work_key: &str) -> Result<Vec<WorkSourceRef>> {
        let rows = sqlx::query(
            r"
            SELECT source_key, work_key, source_type, account_key, provider_item_id, raw_title,
                   container_hint, epg_channel_id, has_catchup, category_id
            FROM work_source_refs WHERE work_key = $1
            ",
        )
        .bind(work_key)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_ref).collect()
    }

    pub async fn delete(&self, source_key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM work_source_refs WHERE source_key = $1")
            .bind(source_key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_ref(row: sqlx::postgres::PgRow) -> Result<WorkSourceRef> {
        Ok(WorkSourceRef {
            source_key: row.try_get("source_key")?,
            work_key: row.try_get("work_key")?,
            source_type: row.try_get("source_type")?,
            account_key: row.try_get("account_key")?,
            provider_item_id: row.try_get("provider_item_id")?,
            raw_title: row.try_get("raw_title")?,
            container_hint: row.try_get("container_hint")?,
            epg_channel_id: row.try_get("epg_channel_id")?,
            has_catchup: row.try_get("has_catchup")?,
            category_id: row.try_get("category_id")?,
        })
    }
}

#[derive(Clone)]
pub struct WorkVariantRepository {
    pool: PgPool,
}

impl WorkVariantRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert_with_executor<'e, E>(
        &self,
        variant: &WorkVariant,
        executor: E,
    ) -> Result<WorkVariant>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let row = sqlx::query(
            r"
            INSERT INTO work_variants (variant_key, source_key, method, url_hint, container,
                                        codec, bitrate, language, quality)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (variant_key) DO UPDATE SET
                url_hint = EXCLUDED.url_hint,
                container = EXCLUDED.container,
                codec = EXCLUDED.codec,
                bitrate = EXCLUDED.bitrate,
                language = EXCLUDED.language,
                quality = EXCLUDED.quality
            RETURNING variant_key, source_key, method, url_hint, container, codec, bitrate,
                      language, quality
            ",
        )
        .bind(&variant.variant_key)
        .bind(&variant.source_key)
        .bind(method_str(variant.method))
        .bind(&variant.url_hint)
        .bind(&variant.container)
        .bind(&variant.codec)
        .bind(variant.bitrate)
        .bind(&variant.language)
        .bind(&variant.quality)
        .fetch_one(executor)
        .await?;
        Self::row_to_variant(row)
    }

    pub async fn upsert(&self, variant: &WorkVariant) -> Result<WorkVariant> {
        self.upsert_with_executor(variant, &self.pool).await
    }

    /// INV-11: at least one variant per work, with non-empty playback
    /// hints, is required for the work to be UI-visible; this query is the
    /// one the store's visibility check joins through.
    pub async fn list_by_source(&self, source_key: &str) -> Result<Vec<WorkVariant>> {
        let rows = sqlx::query(
            r"
            SELECT variant_key, source_key, method, url_hint, container, codec, bitrate,
                   language, quality
            FROM work_variants WHERE source_key = $1
            ",
        )
        .bind(source_key)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_variant).collect()
    }

    pub async fn delete(&self, variant_key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM work_variants WHERE variant_key = $1")
            .bind(variant_key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_variant(row: sqlx::postgres::PgRow) -> Result<WorkVariant> {
        let method: String = row.try_get("method")?;
        Ok(WorkVariant {
            variant_key: row.try_get("variant_key")?,
            source_key: row.try_get("source_key")?,
            method: parse_method(&method)?,
            url_hint: row.try_get("url_hint")?,
            container: row.try_get("container")?,
            codec: row.try_get("codec")?,
            bitrate: row.try_get("bitrate")?,
            language: row.try_get("language")?,
            quality: row.try_get("quality")?,
        })
    }
}

fn method_str(method: PlaybackMethod) -> &'static str {
    match method {
        PlaybackMethod::Direct => "direct",
        PlaybackMethod::Hls => "hls",
        PlaybackMethod::Mpd => "mpd",
    }
}

fn parse_method(s: &str) -> Result<PlaybackMethod> {
    match s {
        "direct" => Ok(PlaybackMethod::Direct),
        "hls" => Ok(PlaybackMethod::Hls),
        "mpd" => Ok(PlaybackMethod::Mpd),
        other => Err(crate::Error::UnknownKeyKind(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    #[tokio::test]
    #[ignore = "Requires database"]
    async fn test_source_key_globally_unique() {
        // Integration test placeholder: two upserts of acc1/acc2 603 must not collide.
    }
}
