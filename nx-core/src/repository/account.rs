//! `SourceAccount`, `Category`, and `WorkCategoryRef` persistence.

use sqlx::{types::Json, PgPool, Row};

use crate::{
    models::{Category, SourceAccount, SourceCapabilities, WorkCategoryRef},
    Result,
};

#[derive(Clone)]
pub struct SourceAccountRepository {
    pool: PgPool,
}

impl SourceAccountRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, account_key: &str) -> Result<Option<SourceAccount>> {
        let row = sqlx::query(
            r"
            SELECT account_key, provider_type, endpoint, credentials_handle, capabilities
            FROM source_accounts WHERE account_key = $1
            ",
        )
        .bind(account_key)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_account).transpose()
    }

    pub async fn upsert(&self, account: &SourceAccount) -> Result<SourceAccount> {
        let row = sqlx::query(
            r"
            INSERT INTO source_accounts (account_key, provider_type, endpoint,
                                          credentials_handle, capabilities)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (account_key) DO UPDATE SET
                provider_type = EXCLUDED.provider_type,
                endpoint = EXCLUDED.endpoint,
                credentials_handle = EXCLUDED.credentials_handle,
                capabilities = EXCLUDED.capabilities
            RETURNING account_key, provider_type, endpoint, credentials_handle, capabilities
            ",
        )
        .bind(&account.account_key)
        .bind(&account.provider_type)
        .bind(&account.endpoint)
        .bind(&account.credentials_handle)
        .bind(Json(&account.capabilities))
        .fetch_one(&self.pool)
        .await?;
        Self::row_to_account(row)
    }

    pub async fn list(&self) -> Result<Vec<SourceAccount>> {
        let rows = sqlx::query(
            "SELECT account_key, provider_type, endpoint, credentials_handle, capabilities \
             FROM source_accounts ORDER BY account_key",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_account).collect()
    }

    fn row_to_account(row: sqlx::postgres::PgRow) -> Result<SourceAccount> {
        let capabilities: Json<SourceCapabilities> = row.try_get("capabilities")?;
        Ok(SourceAccount {
            account_key: row.try_get("account_key")?,
            provider_type: row.try_get("provider_type")?,
            endpoint: row.try_get("endpoint")?,
            credentials_handle: row.try_get("credentials_handle")?,
            capabilities: capabilities.0,
        })
    }
}

/// `(accountKey, sourceType, sourceCategoryId)` unique. Drives scoped sync:
/// `loadCategories` (§4.8) reads through this repository.
#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, category: &Category) -> Result<Category> {
        let row = sqlx::query(
            r"
            INSERT INTO categories (account_key, source_type, source_category_id, display_name,
                                     parent_id, sort_order, is_selected)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (account_key, source_type, source_category_id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                parent_id = EXCLUDED.parent_id,
                sort_order = EXCLUDED.sort_order,
                is_selected = EXCLUDED.is_selected
            RETURNING account_key, source_type, source_category_id, display_name, parent_id,
                      sort_order, is_selected
            ",
        )
        .bind(&category.account_key)
        .bind(&category.source_type)
        .bind(&category.source_category_id)
        .bind(&category.display_name)
        .bind(&category.parent_id)
        .bind(category.sort_order)
        .bind(category.is_selected)
        .fetch_one(&self.pool)
        .await?;
        Self::row_to_category(row)
    }

    pub async fn list_by_account(
        &self,
        account_key: &str,
        source_type: &str,
    ) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            r"
            SELECT account_key, source_type, source_category_id, display_name, parent_id,
                   sort_order, is_selected
            FROM categories WHERE account_key = $1 AND source_type = $2
            ORDER BY sort_order
            ",
        )
        .bind(account_key)
        .bind(source_type)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_category).collect()
    }

    fn row_to_category(row: sqlx::postgres::PgRow) -> Result<Category> {
        Ok(Category {
            account_key: row.try_get("account_key")?,
            source_type: row.try_get("source_type")?,
            source_category_id: row.try_get("source_category_id")?,
            display_name: row.try_get("display_name")?,
            parent_id: row.try_get("parent_id")?,
            sort_order: row.try_get("sort_order")?,
            is_selected: row.try_get("is_selected")?,
        })
    }
}

#[derive(Clone)]
pub struct WorkCategoryRefRepository {
    pool: PgPool,
}

impl WorkCategoryRefRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert_with_executor<'e, E>(
        &self,
        work_ref: &WorkCategoryRef,
        executor: E,
    ) -> Result<()>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        sqlx::query(
            r"
            INSERT INTO work_category_refs (work_key, category_key)
            VALUES ($1, $2)
            ON CONFLICT (work_key, category_key) DO NOTHING
            ",
        )
        .bind(&work_ref.work_key)
        .bind(&work_ref.category_key)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn list_by_work(&self, work_key: &str) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT category_key FROM work_category_refs WHERE work_key = $1")
            .bind(work_key)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| row.try_get::<String, _>("category_key").map_err(Into::into))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #[tokio::test]
    #[ignore = "Requires database"]
    async fn test_category_key_composite_unique() {
        // Integration test placeholder: (account_key, source_type, source_category_id) unique.
    }
}
