//! Repository for the `teasers` table.

use peekit_core::types::EntityId;
use sqlx::PgPool;

use crate::models::teaser::{NewTeaser, Teaser};

const COLUMNS: &str = "id, project_id, user_id, kind, url, title, created_at, updated_at";

pub struct TeaserRepo;

impl TeaserRepo {
    pub async fn create(pool: &PgPool, input: &NewTeaser) -> Result<Teaser, sqlx::Error> {
        let query = format!(
            "INSERT INTO teasers (project_id, user_id, kind, url, title)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Teaser>(&query)
            .bind(input.project_id)
            .bind(input.user_id)
            .bind(input.kind.as_str())
            .bind(&input.url)
            .bind(&input.title)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: EntityId) -> Result<Option<Teaser>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM teasers WHERE id = $1");
        sqlx::query_as::<_, Teaser>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's teasers in upload order.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: EntityId,
    ) -> Result<Vec<Teaser>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM teasers WHERE project_id = $1 ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Teaser>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: EntityId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teasers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_by_user(pool: &PgPool, user_id: EntityId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teasers WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
