//! In-process [`StudioStore`] used by tests and `STORE_BACKEND=memory`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use peekit_core::media::FocalPoint;
use peekit_core::plan::Plan;
use peekit_core::source::StageSource;
use peekit_core::transition::StageRecord;
use peekit_core::types::{EntityId, Timestamp};
use peekit_core::workflow::StagesConfiguration;
use sqlx::types::Json;
use tokio::sync::RwLock;

use crate::models::profile::{Profile, UpsertProfile};
use crate::models::project::{NewProject, Project, UpdateProject};
use crate::models::teaser::{NewTeaser, Teaser};
use crate::store::{StoreResult, StudioStore};

#[derive(Default)]
struct Tables {
    projects: Vec<Project>,
    teasers: Vec<Teaser>,
    profiles: HashMap<EntityId, Profile>,
}

impl Tables {
    fn project_mut(&mut self, id: EntityId) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == id)
    }
}

/// A [`StudioStore`] holding every table behind one lock.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `f` to a project row, bumping `updated_at`.
    async fn touch_project(&self, id: EntityId, f: impl FnOnce(&mut Project) + Send) -> bool {
        let mut tables = self.tables.write().await;
        match tables.project_mut(id) {
            Some(project) => {
                f(project);
                project.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl StudioStore for MemoryStore {
    async fn create_project(&self, input: &NewProject) -> StoreResult<Project> {
        let now = Utc::now();
        let project = Project {
            id: EntityId::new_v4(),
            user_id: input.user_id,
            client_name: input.client_name.clone(),
            client_email: input.client_email.clone(),
            secondary_email: input.secondary_email.clone(),
            project_type: input.project_type.clone(),
            date: input.date,
            expected_delivery_date: input.expected_delivery_date,
            location: input.location.clone(),
            cover_image: None,
            cover_focal_x: None,
            cover_focal_y: None,
            current_stage: input.current_stage.clone(),
            is_finalized: false,
            stages_config: input.stages_column(),
            access_password: None,
            last_update: now,
            client_last_viewed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.projects.push(project.clone());
        Ok(project)
    }

    async fn find_project(&self, id: EntityId) -> StoreResult<Option<Project>> {
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_projects(&self, owner: EntityId) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;
        // Reverse insertion order is newest first, also for equal timestamps.
        Ok(tables
            .projects
            .iter()
            .rev()
            .filter(|p| p.user_id == owner)
            .cloned()
            .collect())
    }

    async fn update_project(
        &self,
        id: EntityId,
        input: &UpdateProject,
    ) -> StoreResult<Option<Project>> {
        let mut tables = self.tables.write().await;
        let Some(project) = tables.project_mut(id) else {
            return Ok(None);
        };
        if let Some(v) = &input.client_name {
            project.client_name = v.clone();
        }
        if let Some(v) = &input.client_email {
            project.client_email = v.clone();
        }
        if let Some(v) = &input.secondary_email {
            project.secondary_email = Some(v.clone()).filter(|e| !e.is_empty());
        }
        if let Some(v) = &input.project_type {
            project.project_type = v.clone();
        }
        if let Some(v) = input.date {
            project.date = Some(v);
        }
        if let Some(v) = input.expected_delivery_date {
            project.expected_delivery_date = Some(v);
        }
        if let Some(v) = &input.location {
            project.location = v.clone();
        }
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn record_stage(
        &self,
        id: EntityId,
        record: &StageRecord,
        at: Timestamp,
    ) -> StoreResult<bool> {
        Ok(self
            .touch_project(id, |p| {
                p.current_stage = record.current_stage.clone();
                p.is_finalized = record.is_finalized;
                p.last_update = at;
            })
            .await)
    }

    async fn set_stage_source(&self, id: EntityId, source: &StageSource) -> StoreResult<bool> {
        let column = source.clone().into_column().map(Json);
        Ok(self.touch_project(id, |p| p.stages_config = column).await)
    }

    async fn set_access_password(
        &self,
        id: EntityId,
        password: Option<&str>,
    ) -> StoreResult<bool> {
        let password = password.map(str::to_string);
        Ok(self.touch_project(id, |p| p.access_password = password).await)
    }

    async fn set_cover_image(
        &self,
        id: EntityId,
        url: &str,
        focal: FocalPoint,
    ) -> StoreResult<bool> {
        let url = url.to_string();
        Ok(self
            .touch_project(id, |p| {
                p.cover_image = Some(url);
                p.cover_focal_x = Some(focal.x);
                p.cover_focal_y = Some(focal.y);
            })
            .await)
    }

    async fn set_focal_point(&self, id: EntityId, focal: FocalPoint) -> StoreResult<bool> {
        Ok(self
            .touch_project(id, |p| {
                p.cover_focal_x = Some(focal.x);
                p.cover_focal_y = Some(focal.y);
            })
            .await)
    }

    async fn mark_client_viewed(&self, id: EntityId, at: Timestamp) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(match tables.project_mut(id) {
            Some(project) => {
                project.client_last_viewed_at = Some(at);
                true
            }
            None => false,
        })
    }

    async fn delete_project(&self, id: EntityId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.projects.len();
        tables.projects.retain(|p| p.id != id);
        let removed = tables.projects.len() < before;
        if removed {
            tables.teasers.retain(|t| t.project_id != id);
        }
        Ok(removed)
    }

    async fn insert_teaser(&self, input: &NewTeaser) -> StoreResult<Teaser> {
        let mut tables = self.tables.write().await;
        if !tables.projects.iter().any(|p| p.id == input.project_id) {
            return Err(sqlx::Error::RowNotFound);
        }
        let now = Utc::now();
        let teaser = Teaser {
            id: EntityId::new_v4(),
            project_id: input.project_id,
            user_id: input.user_id,
            kind: input.kind.as_str().to_string(),
            url: input.url.clone(),
            title: input.title.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.teasers.push(teaser.clone());
        Ok(teaser)
    }

    async fn find_teaser(&self, id: EntityId) -> StoreResult<Option<Teaser>> {
        let tables = self.tables.read().await;
        Ok(tables.teasers.iter().find(|t| t.id == id).cloned())
    }

    async fn delete_teaser(&self, id: EntityId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.teasers.len();
        tables.teasers.retain(|t| t.id != id);
        Ok(tables.teasers.len() < before)
    }

    async fn list_teasers(&self, project_id: EntityId) -> StoreResult<Vec<Teaser>> {
        let tables = self.tables.read().await;
        Ok(tables
            .teasers
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn find_profile(&self, user_id: EntityId) -> StoreResult<Option<Profile>> {
        Ok(self.tables.read().await.profiles.get(&user_id).cloned())
    }

    async fn upsert_profile(
        &self,
        user_id: EntityId,
        input: &UpsertProfile,
    ) -> StoreResult<Profile> {
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        let profile = tables.profiles.entry(user_id).or_insert_with(|| Profile {
            user_id,
            studio_name: String::new(),
            plan: Plan::Discovery.as_str().to_string(),
            onboarding_completed: false,
            stages_config: None,
            created_at: now,
            updated_at: now,
        });
        profile.studio_name = input.studio_name.clone();
        if let Some(plan) = input.plan {
            profile.plan = plan.as_str().to_string();
        }
        profile.onboarding_completed |= input.onboarding_completed;
        if let Some(config) = &input.stages_config {
            profile.stages_config = Some(Json(config.clone()));
        }
        profile.updated_at = now;
        Ok(profile.clone())
    }

    async fn set_studio_stages(
        &self,
        user_id: EntityId,
        config: &StagesConfiguration,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(match tables.profiles.get_mut(&user_id) {
            Some(profile) => {
                profile.stages_config = Some(Json(config.clone()));
                profile.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn delete_account(&self, user_id: EntityId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.teasers.retain(|t| t.user_id != user_id);
        tables.projects.retain(|p| p.user_id != user_id);
        tables.profiles.remove(&user_id);
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::models::project::CreateProject;
    use peekit_core::media::TeaserKind;
    use peekit_core::workflow::default_stages;

    fn new_project(user_id: EntityId, name: &str) -> NewProject {
        NewProject::new(
            user_id,
            CreateProject {
                client_name: name.to_string(),
                client_email: "client@example.com".to_string(),
                secondary_email: None,
                project_type: "Portrait".to_string(),
                date: None,
                expected_delivery_date: None,
                location: String::new(),
                stages_config: None,
            },
            default_stages(),
        )
    }

    fn new_teaser(project: &Project, title: &str) -> NewTeaser {
        NewTeaser {
            project_id: project.id,
            user_id: project.user_id,
            kind: TeaserKind::Image,
            url: format!("https://cdn.test/{title}"),
            title: Some(title.to_string()),
        }
    }

    #[tokio::test]
    async fn projects_list_newest_first_per_owner() {
        let store = MemoryStore::new();
        let owner = EntityId::new_v4();
        store.create_project(&new_project(owner, "first")).await.unwrap();
        store.create_project(&new_project(owner, "second")).await.unwrap();
        store
            .create_project(&new_project(EntityId::new_v4(), "other"))
            .await
            .unwrap();

        let names: Vec<String> = store
            .list_projects(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.client_name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn stage_source_round_trips() {
        let store = MemoryStore::new();
        let project = store
            .create_project(&new_project(EntityId::new_v4(), "a"))
            .await
            .unwrap();
        assert_eq!(project.stage_source(), StageSource::Snapshot(default_stages()));

        store
            .set_stage_source(project.id, &StageSource::StudioDefault)
            .await
            .unwrap();
        let found = store.find_project(project.id).await.unwrap().unwrap();
        assert_eq!(found.stage_source(), StageSource::StudioDefault);
    }

    #[tokio::test]
    async fn record_stage_updates_last_update() {
        let store = MemoryStore::new();
        let project = store
            .create_project(&new_project(EntityId::new_v4(), "a"))
            .await
            .unwrap();
        let at = Utc::now() + chrono::Duration::seconds(10);
        let record = StageRecord {
            current_stage: "delivery".to_string(),
            is_finalized: true,
        };
        assert!(store.record_stage(project.id, &record, at).await.unwrap());
        let found = store.find_project(project.id).await.unwrap().unwrap();
        assert_eq!(found.stage_record(), record);
        assert_eq!(found.last_update, at);

        assert!(!store
            .record_stage(EntityId::new_v4(), &record, at)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn deleting_project_removes_its_teasers() {
        let store = MemoryStore::new();
        let owner = EntityId::new_v4();
        let project = store.create_project(&new_project(owner, "a")).await.unwrap();
        let keep = store.create_project(&new_project(owner, "b")).await.unwrap();
        store.insert_teaser(&new_teaser(&project, "1.jpg")).await.unwrap();
        store.insert_teaser(&new_teaser(&keep, "2.jpg")).await.unwrap();

        assert!(store.delete_project(project.id).await.unwrap());
        assert!(store.list_teasers(project.id).await.unwrap().is_empty());
        assert_eq!(store.list_teasers(keep.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn teasers_keep_upload_order() {
        let store = MemoryStore::new();
        let project = store
            .create_project(&new_project(EntityId::new_v4(), "a"))
            .await
            .unwrap();
        for title in ["c", "a", "b"] {
            store.insert_teaser(&new_teaser(&project, title)).await.unwrap();
        }
        let titles: Vec<Option<String>> = store
            .list_teasers(project.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(
            titles,
            vec![Some("c".into()), Some("a".into()), Some("b".into())]
        );
    }

    #[tokio::test]
    async fn teaser_for_missing_project_is_rejected() {
        let store = MemoryStore::new();
        let teaser = NewTeaser {
            project_id: EntityId::new_v4(),
            user_id: EntityId::new_v4(),
            kind: TeaserKind::Video,
            url: "u".to_string(),
            title: None,
        };
        let result = store.insert_teaser(&teaser).await;
        assert_matches!(result, Err(sqlx::Error::RowNotFound));
    }

    #[tokio::test]
    async fn upsert_profile_keeps_plan_and_onboarding() {
        let store = MemoryStore::new();
        let user = EntityId::new_v4();
        let created = store
            .upsert_profile(
                user,
                &UpsertProfile {
                    studio_name: "Studio Lumière".to_string(),
                    plan: Some(Plan::Pro),
                    onboarding_completed: true,
                    stages_config: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(created.plan(), Plan::Pro);

        let updated = store
            .upsert_profile(
                user,
                &UpsertProfile {
                    studio_name: "Lumière".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.studio_name, "Lumière");
        assert_eq!(updated.plan(), Plan::Pro);
        assert!(updated.onboarding_completed);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn delete_account_removes_everything_for_user() {
        let store = MemoryStore::new();
        let user = EntityId::new_v4();
        let other = EntityId::new_v4();
        store
            .upsert_profile(user, &UpsertProfile {
                studio_name: "S".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let project = store.create_project(&new_project(user, "a")).await.unwrap();
        store.insert_teaser(&new_teaser(&project, "x")).await.unwrap();
        store.create_project(&new_project(other, "b")).await.unwrap();

        store.delete_account(user).await.unwrap();
        assert!(store.find_profile(user).await.unwrap().is_none());
        assert!(store.list_projects(user).await.unwrap().is_empty());
        assert!(store.find_project(project.id).await.unwrap().is_none());
        assert_eq!(store.list_projects(other).await.unwrap().len(), 1);
    }
}
