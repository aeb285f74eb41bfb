//! `WorkRedirect` persistence and transitive resolution (spec.md §3, §8:
//! at most `crate::key::redirect_hop_cap()` hops).

use sqlx::{PgPool, Row};

use crate::{models::WorkRedirect, Result};

#[derive(Clone)]
pub struct WorkRedirectRepository {
    pool: PgPool,
}

impl WorkRedirectRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert_with_executor<'e, E>(
        &self,
        redirect: &WorkRedirect,
        executor: E,
    ) -> Result<()>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        sqlx::query(
            r"
            INSERT INTO work_redirects (obsolete_work_key, target_work_key, created_at_ms)
            VALUES ($1, $2, $3)
            ON CONFLICT (obsolete_work_key) DO UPDATE SET
                target_work_key = EXCLUDED.target_work_key
            ",
        )
        .bind(&redirect.obsolete_work_key)
        .bind(&redirect.target_work_key)
        .bind(redirect.created_at_ms)
        .execute(executor)
        .await?;
        Ok(())
    }

    async fn target_of(&self, work_key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT target_work_key FROM work_redirects WHERE obsolete_work_key = $1")
            .bind(work_key)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| r.try_get("target_work_key").map_err(Into::into))
            .transpose()
    }

    /// `resolveThroughRedirects` — follows the chain up to
    /// `crate::key::redirect_hop_cap()` hops; beyond that, returns the last
    /// reached key rather than erroring (spec.md §3).
    pub async fn resolve(&self, work_key: &str) -> Result<String> {
        let mut current = work_key.to_string();
        for _ in 0..crate::key::redirect_hop_cap() {
            match self.target_of(&current).await? {
                Some(next) if next != current => current = next,
                _ => return Ok(current),
            }
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    #[tokio::test]
    #[ignore = "Requires database"]
    async fn test_redirect_resolution_terminates_within_hop_cap() {
        // Integration test placeholder: a cycle must resolve in <= 10 hops.
    }
}
