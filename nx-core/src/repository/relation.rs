//! `WorkRelation` persistence — series↔episode, next/prev, related edges.

use sqlx::{PgPool, Row};

use crate::{
    models::{RelationKind, WorkRelation},
    Result,
};

#[derive(Clone)]
pub struct WorkRelationRepository {
    pool: PgPool,
}

impl WorkRelationRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert_with_executor<'e, E>(
        &self,
        relation: &WorkRelation,
        executor: E,
    ) -> Result<()>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        sqlx::query(
            r"
            INSERT INTO work_relations (parent_work_key, child_work_key, kind, season, episode,
                                         sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (parent_work_key, child_work_key) DO UPDATE SET
                kind = EXCLUDED.kind,
                season = EXCLUDED.season,
                episode = EXCLUDED.episode,
                sort_order = EXCLUDED.sort_order
            ",
        )
        .bind(&relation.parent_work_key)
        .bind(&relation.child_work_key)
        .bind(kind_str(relation.kind))
        .bind(relation.season.map(|s| s as i32))
        .bind(relation.episode.map(|e| e as i32))
        .bind(relation.sort_order)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn children_of(&self, parent_work_key: &str) -> Result<Vec<WorkRelation>> {
        let rows = sqlx::query(
            r"
            SELECT parent_work_key, child_work_key, kind, season, episode, sort_order
            FROM work_relations WHERE parent_work_key = $1 ORDER BY sort_order
            ",
        )
        .bind(parent_work_key)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_relation).collect()
    }

    fn row_to_relation(row: sqlx::postgres::PgRow) -> Result<WorkRelation> {
        let kind: String = row.try_get("kind")?;
        Ok(WorkRelation {
            parent_work_key: row.try_get("parent_work_key")?,
            child_work_key: row.try_get("child_work_key")?,
            kind: parse_kind(&kind)?,
            season: row.try_get::<Option<i32>, _>("season")?.map(|v| v as u32),
            episode: row.try_get::<Option<i32>, _>("episode")?.map(|v| v as u32),
            sort_order: row.try_get("sort_order")?,
        })
    }
}

fn kind_str(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::SeriesToEpisode => "series_to_episode",
        RelationKind::Next => "next",
        RelationKind::Prev => "prev",
        RelationKind::Related => "related",
    }
}

fn parse_kind(s: &str) -> Result<RelationKind> {
    match s {
        "series_to_episode" => Ok(RelationKind::SeriesToEpisode),
        "next" => Ok(RelationKind::Next),
        "prev" => Ok(RelationKind::Prev),
        "related" => Ok(RelationKind::Related),
        other => Err(crate::Error::UnknownKeyKind(other.to_string())),
    }
}
