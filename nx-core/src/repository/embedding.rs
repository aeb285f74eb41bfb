//! `WorkEmbedding` persistence — kept separate from `works` so re-embedding
//! does not churn the Work change stream (§3).

use sqlx::{PgPool, Row};

use crate::{models::WorkEmbedding, Result};

#[derive(Clone)]
pub struct WorkEmbeddingRepository {
    pool: PgPool,
}

impl WorkEmbeddingRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, embedding: &WorkEmbedding) -> Result<WorkEmbedding> {
        let row = sqlx::query(
            r"
            INSERT INTO work_embeddings (work_key, model, version, vector, updated_at_ms)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (work_key, model, version) DO UPDATE SET
                vector = EXCLUDED.vector,
                updated_at_ms = EXCLUDED.updated_at_ms
            RETURNING work_key, model, version, vector, updated_at_ms
            ",
        )
        .bind(&embedding.work_key)
        .bind(&embedding.model)
        .bind(embedding.version as i32)
        .bind(&embedding.vector)
        .bind(embedding.updated_at_ms)
        .fetch_one(&self.pool)
        .await?;
        Self::row_to_embedding(row)
    }

    pub async fn get(&self, work_key: &str, model: &str, version: u32) -> Result<Option<WorkEmbedding>> {
        let row = sqlx::query(
            r"
            SELECT work_key, model, version, vector, updated_at_ms
            FROM work_embeddings WHERE work_key = $1 AND model = $2 AND version = $3
            ",
        )
        .bind(work_key)
        .bind(model)
        .bind(version as i32)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_embedding).transpose()
    }

    fn row_to_embedding(row: sqlx::postgres::PgRow) -> Result<WorkEmbedding> {
        Ok(WorkEmbedding {
            work_key: row.try_get("work_key")?,
            model: row.try_get("model")?,
            version: row.try_get::<i32, _>("version")? as u32,
            vector: row.try_get("vector")?,
            updated_at_ms: row.try_get("updated_at_ms")?,
        })
    }
}
