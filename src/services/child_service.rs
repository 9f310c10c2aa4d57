use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::child_dto::{ChildSummary, ChildUpdated};
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct ChildService {
    pool: PgPool,
}

impl ChildService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, parent_id: Uuid) -> Result<Vec<ChildSummary>> {
        let children = sqlx::query_as::<_, ChildSummary>(
            r#"
            SELECT c.id, c.name, l.code AS level_code, c.created_at
            FROM children c
            LEFT JOIN levels l ON l.id = c.current_level_id
            WHERE c.parent_id = $1
            ORDER BY c.created_at
            "#,
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(children)
    }

    pub async fn create(
        &self,
        parent_id: Uuid,
        name: &str,
        level_code: &str,
    ) -> Result<ChildSummary> {
        let level_id = self.level_id_by_code(level_code).await?;

        let child = sqlx::query_as::<_, ChildSummary>(
            r#"
            INSERT INTO children (parent_id, name, current_level_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, $4::text AS level_code, created_at
            "#,
        )
        .bind(parent_id)
        .bind(name)
        .bind(level_id)
        .bind(level_code)
        .fetch_one(&self.pool)
        .await?;
        Ok(child)
    }

    pub async fn update(
        &self,
        parent_id: Uuid,
        child_id: Uuid,
        name: Option<String>,
        level_code: Option<String>,
    ) -> Result<ChildUpdated> {
        let level_id = match &level_code {
            Some(code) => Some(self.level_id_by_code(code).await?),
            None => None,
        };

        let row = sqlx::query_as::<_, (Uuid, String, Option<i64>)>(
            r#"
            UPDATE children
            SET name = COALESCE($3, name),
                current_level_id = COALESCE($4, current_level_id)
            WHERE id = $1 AND parent_id = $2
            RETURNING id, name, current_level_id
            "#,
        )
        .bind(child_id)
        .bind(parent_id)
        .bind(name)
        .bind(level_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Child not found".to_string()))?;

        let (id, name, current_level_id) = row;
        let level_code = match current_level_id {
            Some(level_id) => {
                sqlx::query_scalar::<_, String>("SELECT code FROM levels WHERE id = $1")
                    .bind(level_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => None,
        };

        Ok(ChildUpdated {
            id,
            name,
            level_code,
        })
    }

    async fn level_id_by_code(&self, code: &str) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM levels WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::Validation("invalid level_code".to_string()))
    }
}
