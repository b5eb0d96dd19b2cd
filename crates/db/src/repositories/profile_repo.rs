//! Repository for the `profiles` table.

use peekit_core::types::EntityId;
use peekit_core::workflow::StagesConfiguration;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::profile::{Profile, UpsertProfile};

const COLUMNS: &str =
    "user_id, studio_name, plan, onboarding_completed, stages_config, created_at, updated_at";

pub struct ProfileRepo;

impl ProfileRepo {
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: EntityId,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE user_id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or update a profile.
    ///
    /// On update, `plan` and `stages_config` are kept when not supplied and
    /// `onboarding_completed` never goes back to false.
    pub async fn upsert(
        pool: &PgPool,
        user_id: EntityId,
        input: &UpsertProfile,
    ) -> Result<Profile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles (user_id, studio_name, plan, onboarding_completed, stages_config)
             VALUES ($1, $2, COALESCE($3, 'discovery'), $4, $5)
             ON CONFLICT (user_id) DO UPDATE SET
                studio_name = EXCLUDED.studio_name,
                plan = COALESCE($3, profiles.plan),
                onboarding_completed = profiles.onboarding_completed OR EXCLUDED.onboarding_completed,
                stages_config = COALESCE($5, profiles.stages_config),
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .bind(&input.studio_name)
            .bind(input.plan.map(|p| p.as_str()))
            .bind(input.onboarding_completed)
            .bind(input.stages_config.clone().map(Json))
            .fetch_one(pool)
            .await
    }

    /// Replace the studio default workflow. Returns `false` if the profile
    /// does not exist.
    pub async fn set_stages(
        pool: &PgPool,
        user_id: EntityId,
        config: &StagesConfiguration,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE profiles SET stages_config = $2, updated_at = NOW() WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(Json(config))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &PgPool, user_id: EntityId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
