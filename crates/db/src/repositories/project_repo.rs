//! Repository for the `projects` table.

use peekit_core::media::FocalPoint;
use peekit_core::source::StageSource;
use peekit_core::transition::StageRecord;
use peekit_core::types::{EntityId, Timestamp};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::project::{NewProject, Project, UpdateProject};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, client_name, client_email, secondary_email, project_type, \
    date, expected_delivery_date, location, cover_image, cover_focal_x, cover_focal_y, \
    current_stage, is_finalized, stages_config, access_password, last_update, \
    client_last_viewed_at, created_at, updated_at";

/// Provides CRUD and stage operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (user_id, client_name, client_email, secondary_email, \
                project_type, date, expected_delivery_date, location, current_stage, stages_config)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(input.user_id)
            .bind(&input.client_name)
            .bind(&input.client_email)
            .bind(&input.secondary_email)
            .bind(&input.project_type)
            .bind(input.date)
            .bind(input.expected_delivery_date)
            .bind(&input.location)
            .bind(&input.current_stage)
            .bind(input.stages_column())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: EntityId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a studio's projects, most recently created first.
    pub async fn list_by_user(pool: &PgPool, user_id: EntityId) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE user_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update project info. Only non-`None` fields in `input` are applied;
    /// an empty `secondary_email` stores `NULL`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: EntityId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                client_name = COALESCE($2, client_name),
                client_email = COALESCE($3, client_email),
                secondary_email = CASE WHEN $4::TEXT IS NULL THEN secondary_email ELSE NULLIF($4, '') END,
                project_type = COALESCE($5, project_type),
                date = COALESCE($6, date),
                expected_delivery_date = COALESCE($7, expected_delivery_date),
                location = COALESCE($8, location),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.client_name)
            .bind(&input.client_email)
            .bind(&input.secondary_email)
            .bind(&input.project_type)
            .bind(input.date)
            .bind(input.expected_delivery_date)
            .bind(&input.location)
            .fetch_optional(pool)
            .await
    }

    /// Persist a stage transition. Returns `true` if a row was updated.
    pub async fn record_stage(
        pool: &PgPool,
        id: EntityId,
        record: &StageRecord,
        at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects
             SET current_stage = $2, is_finalized = $3, last_update = $4, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&record.current_stage)
        .bind(record.is_finalized)
        .bind(at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Store the project's workflow source (`NULL` tracks the studio default).
    pub async fn set_stage_source(
        pool: &PgPool,
        id: EntityId,
        source: &StageSource,
    ) -> Result<bool, sqlx::Error> {
        let column = source.clone().into_column().map(Json);
        let result = sqlx::query(
            "UPDATE projects SET stages_config = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(column)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_access_password(
        pool: &PgPool,
        id: EntityId,
        password: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET access_password = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_cover_image(
        pool: &PgPool,
        id: EntityId,
        url: &str,
        focal: FocalPoint,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects
             SET cover_image = $2, cover_focal_x = $3, cover_focal_y = $4, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(url)
        .bind(focal.x)
        .bind(focal.y)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_focal_point(
        pool: &PgPool,
        id: EntityId,
        focal: FocalPoint,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects
             SET cover_focal_x = $2, cover_focal_y = $3, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(focal.x)
        .bind(focal.y)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record that the client opened the tracking page. Leaves `updated_at`
    /// alone so it is not mistaken for an owner edit.
    pub async fn mark_client_viewed(
        pool: &PgPool,
        id: EntityId,
        at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE projects SET client_last_viewed_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a project. Teasers go with it via `ON DELETE CASCADE`.
    pub async fn delete(pool: &PgPool, id: EntityId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every project of a studio. Returns the number of rows removed.
    pub async fn delete_by_user(pool: &PgPool, user_id: EntityId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
