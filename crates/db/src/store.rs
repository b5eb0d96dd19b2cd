//! The persistence seam used by the HTTP layer.

use async_trait::async_trait;
use peekit_core::media::FocalPoint;
use peekit_core::source::StageSource;
use peekit_core::transition::StageRecord;
use peekit_core::types::{EntityId, Timestamp};
use peekit_core::workflow::StagesConfiguration;

use crate::models::profile::{Profile, UpsertProfile};
use crate::models::project::{NewProject, Project, UpdateProject};
use crate::models::teaser::{NewTeaser, Teaser};
use crate::repositories::{ProfileRepo, ProjectRepo, TeaserRepo};
use crate::DbPool;

pub type StoreResult<T> = Result<T, sqlx::Error>;

/// Studio, project and teaser persistence.
///
/// Mutations that target a single row return `false` (or `None`) when the
/// row does not exist.
#[async_trait]
pub trait StudioStore: Send + Sync {
    async fn create_project(&self, input: &NewProject) -> StoreResult<Project>;
    async fn find_project(&self, id: EntityId) -> StoreResult<Option<Project>>;
    /// Newest first.
    async fn list_projects(&self, owner: EntityId) -> StoreResult<Vec<Project>>;
    async fn update_project(
        &self,
        id: EntityId,
        input: &UpdateProject,
    ) -> StoreResult<Option<Project>>;
    async fn record_stage(
        &self,
        id: EntityId,
        record: &StageRecord,
        at: Timestamp,
    ) -> StoreResult<bool>;
    async fn set_stage_source(&self, id: EntityId, source: &StageSource) -> StoreResult<bool>;
    async fn set_access_password(&self, id: EntityId, password: Option<&str>)
        -> StoreResult<bool>;
    async fn set_cover_image(&self, id: EntityId, url: &str, focal: FocalPoint)
        -> StoreResult<bool>;
    async fn set_focal_point(&self, id: EntityId, focal: FocalPoint) -> StoreResult<bool>;
    async fn mark_client_viewed(&self, id: EntityId, at: Timestamp) -> StoreResult<bool>;
    /// Removes the project's teasers too.
    async fn delete_project(&self, id: EntityId) -> StoreResult<bool>;

    async fn insert_teaser(&self, input: &NewTeaser) -> StoreResult<Teaser>;
    async fn find_teaser(&self, id: EntityId) -> StoreResult<Option<Teaser>>;
    async fn delete_teaser(&self, id: EntityId) -> StoreResult<bool>;
    /// Upload order.
    async fn list_teasers(&self, project_id: EntityId) -> StoreResult<Vec<Teaser>>;

    async fn find_profile(&self, user_id: EntityId) -> StoreResult<Option<Profile>>;
    async fn upsert_profile(&self, user_id: EntityId, input: &UpsertProfile)
        -> StoreResult<Profile>;
    async fn set_studio_stages(
        &self,
        user_id: EntityId,
        config: &StagesConfiguration,
    ) -> StoreResult<bool>;
    /// Remove teasers, projects and the profile of a studio.
    async fn delete_account(&self, user_id: EntityId) -> StoreResult<()>;

    /// Whether the backing store is reachable.
    async fn health_check(&self) -> StoreResult<()>;
}

/// [`StudioStore`] over Postgres.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl StudioStore for PgStore {
    async fn create_project(&self, input: &NewProject) -> StoreResult<Project> {
        ProjectRepo::create(&self.pool, input).await
    }

    async fn find_project(&self, id: EntityId) -> StoreResult<Option<Project>> {
        ProjectRepo::find_by_id(&self.pool, id).await
    }

    async fn list_projects(&self, owner: EntityId) -> StoreResult<Vec<Project>> {
        ProjectRepo::list_by_user(&self.pool, owner).await
    }

    async fn update_project(
        &self,
        id: EntityId,
        input: &UpdateProject,
    ) -> StoreResult<Option<Project>> {
        ProjectRepo::update(&self.pool, id, input).await
    }

    async fn record_stage(
        &self,
        id: EntityId,
        record: &StageRecord,
        at: Timestamp,
    ) -> StoreResult<bool> {
        ProjectRepo::record_stage(&self.pool, id, record, at).await
    }

    async fn set_stage_source(&self, id: EntityId, source: &StageSource) -> StoreResult<bool> {
        ProjectRepo::set_stage_source(&self.pool, id, source).await
    }

    async fn set_access_password(
        &self,
        id: EntityId,
        password: Option<&str>,
    ) -> StoreResult<bool> {
        ProjectRepo::set_access_password(&self.pool, id, password).await
    }

    async fn set_cover_image(
        &self,
        id: EntityId,
        url: &str,
        focal: FocalPoint,
    ) -> StoreResult<bool> {
        ProjectRepo::set_cover_image(&self.pool, id, url, focal).await
    }

    async fn set_focal_point(&self, id: EntityId, focal: FocalPoint) -> StoreResult<bool> {
        ProjectRepo::set_focal_point(&self.pool, id, focal).await
    }

    async fn mark_client_viewed(&self, id: EntityId, at: Timestamp) -> StoreResult<bool> {
        ProjectRepo::mark_client_viewed(&self.pool, id, at).await
    }

    async fn delete_project(&self, id: EntityId) -> StoreResult<bool> {
        ProjectRepo::delete(&self.pool, id).await
    }

    async fn insert_teaser(&self, input: &NewTeaser) -> StoreResult<Teaser> {
        TeaserRepo::create(&self.pool, input).await
    }

    async fn find_teaser(&self, id: EntityId) -> StoreResult<Option<Teaser>> {
        TeaserRepo::find_by_id(&self.pool, id).await
    }

    async fn delete_teaser(&self, id: EntityId) -> StoreResult<bool> {
        TeaserRepo::delete(&self.pool, id).await
    }

    async fn list_teasers(&self, project_id: EntityId) -> StoreResult<Vec<Teaser>> {
        TeaserRepo::list_by_project(&self.pool, project_id).await
    }

    async fn find_profile(&self, user_id: EntityId) -> StoreResult<Option<Profile>> {
        ProfileRepo::find_by_user(&self.pool, user_id).await
    }

    async fn upsert_profile(
        &self,
        user_id: EntityId,
        input: &UpsertProfile,
    ) -> StoreResult<Profile> {
        ProfileRepo::upsert(&self.pool, user_id, input).await
    }

    async fn set_studio_stages(
        &self,
        user_id: EntityId,
        config: &StagesConfiguration,
    ) -> StoreResult<bool> {
        ProfileRepo::set_stages(&self.pool, user_id, config).await
    }

    async fn delete_account(&self, user_id: EntityId) -> StoreResult<()> {
        let teasers = TeaserRepo::delete_by_user(&self.pool, user_id).await?;
        let projects = ProjectRepo::delete_by_user(&self.pool, user_id).await?;
        ProfileRepo::delete(&self.pool, user_id).await?;
        tracing::info!(%user_id, teasers, projects, "Deleted account data");
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await
    }
}
