//! Response payloads shared by the owner and public handlers.

use chrono::NaiveDate;
use peekit_core::access;
use peekit_core::activity;
use peekit_core::media::{download_name, FocalPoint, TeaserKind, DOWNLOAD_INTERVAL_MS};
use peekit_core::plan::Plan;
use peekit_core::progress::StageProgress;
use peekit_core::tracking::{ClientView, DeliveryStatus, OwnerView};
use peekit_core::transition::TransitionKind;
use peekit_core::types::{EntityId, Timestamp};
use peekit_core::workflow::StagesConfiguration;
use peekit_db::models::profile::Profile;
use peekit_db::models::project::Project;
use peekit_db::models::teaser::Teaser;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Owner side
// ---------------------------------------------------------------------------

/// Dashboard card.
#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    pub id: EntityId,
    pub client_name: String,
    pub client_email: String,
    pub project_type: String,
    pub date: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub location: String,
    pub cover_image: Option<String>,
    pub focal_point: FocalPoint,
    pub current_stage: String,
    pub is_finalized: bool,
    pub progress: StageProgress,
    pub status: DeliveryStatus,
    pub is_locked: bool,
    pub has_unread_view: bool,
    pub last_update: Timestamp,
    pub created_at: Timestamp,
}

impl ProjectSummary {
    pub fn build(project: &Project, config: &StagesConfiguration, plan: Plan) -> Self {
        let view = OwnerView::build(config, &project.stage_record());
        Self {
            id: project.id,
            client_name: project.client_name.clone(),
            client_email: project.client_email.clone(),
            project_type: project.project_type.clone(),
            date: project.date,
            expected_delivery_date: project.expected_delivery_date,
            location: project.location.clone(),
            cover_image: project.cover_image.clone(),
            focal_point: project.focal_point(),
            current_stage: project.current_stage.clone(),
            is_finalized: project.is_finalized,
            progress: view.progress,
            status: view.status,
            is_locked: access::is_locked(project.access_password.as_deref()),
            has_unread_view: plan.has_view_notifications()
                && activity::has_unread_view(project.client_last_viewed_at, project.last_update),
            last_update: project.last_update,
            created_at: project.created_at,
        }
    }
}

/// Full owner view of one project.
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    pub id: EntityId,
    pub client_name: String,
    pub client_email: String,
    pub secondary_email: Option<String>,
    pub project_type: String,
    pub date: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub location: String,
    pub cover_image: Option<String>,
    pub focal_point: FocalPoint,
    pub current_stage: String,
    pub is_finalized: bool,
    /// Owners can read back the plaintext gate password.
    pub access_password: Option<String>,
    pub tracking_url: String,
    /// The project tracks the live studio default instead of a snapshot.
    pub uses_studio_default: bool,
    pub workflow: StagesConfiguration,
    pub tracking: OwnerView,
    pub teasers: Vec<TeaserView>,
    pub last_update: Timestamp,
    pub client_last_viewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProjectDetail {
    pub fn build(
        project: &Project,
        config: StagesConfiguration,
        teasers: &[Teaser],
        public_origin: &str,
    ) -> Self {
        Self {
            id: project.id,
            client_name: project.client_name.clone(),
            client_email: project.client_email.clone(),
            secondary_email: project.secondary_email.clone(),
            project_type: project.project_type.clone(),
            date: project.date,
            expected_delivery_date: project.expected_delivery_date,
            location: project.location.clone(),
            cover_image: project.cover_image.clone(),
            focal_point: project.focal_point(),
            current_stage: project.current_stage.clone(),
            is_finalized: project.is_finalized,
            access_password: project.access_password.clone(),
            tracking_url: activity::tracking_link(public_origin, project.id),
            uses_studio_default: !project.stage_source().is_snapshot(),
            tracking: OwnerView::build(&config, &project.stage_record()),
            workflow: config,
            teasers: teasers.iter().map(TeaserView::from).collect(),
            last_update: project.last_update,
            client_last_viewed_at: project.client_last_viewed_at,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

/// Outcome of a stage command. Rejections are `applied: false`, not errors.
#[derive(Debug, Serialize)]
pub struct StageActionResponse {
    pub applied: bool,
    pub transition: Option<TransitionKind>,
    /// Machine-readable rejection code.
    pub reason: Option<&'static str>,
    pub message: Option<String>,
    pub current_stage: String,
    pub is_finalized: bool,
    pub tracking: OwnerView,
}

/// Outcome of a workflow save, reset or step removal.
#[derive(Debug, Serialize)]
pub struct WorkflowResponse {
    pub applied: bool,
    pub workflow: StagesConfiguration,
    pub uses_studio_default: bool,
    /// `[old, new]` ids reassigned on save.
    pub renamed: Vec<(String, String)>,
    /// Owner tracking view for project-scope edits.
    pub tracking: Option<OwnerView>,
}

#[derive(Debug, Serialize)]
pub struct StudioView {
    pub user_id: EntityId,
    pub studio_name: String,
    pub plan: Plan,
    pub onboarding_completed: bool,
    pub workflow: StagesConfiguration,
    pub limits: PlanLimits,
}

#[derive(Debug, Serialize)]
pub struct PlanLimits {
    pub teasers_per_project: Option<usize>,
    pub can_edit_step_content: bool,
    pub view_notifications: bool,
}

impl StudioView {
    pub fn build(profile: &Profile, workflow: StagesConfiguration) -> Self {
        let plan = profile.plan();
        Self {
            user_id: profile.user_id,
            studio_name: profile.studio_name.clone(),
            plan,
            onboarding_completed: profile.onboarding_completed,
            workflow,
            limits: PlanLimits {
                teasers_per_project: plan.teaser_limit(),
                can_edit_step_content: plan.can_edit_step_content(),
                view_notifications: plan.has_view_notifications(),
            },
        }
    }
}

/// A client view the owner has not seen yet.
#[derive(Debug, Serialize)]
pub struct ViewNotification {
    pub project_id: EntityId,
    pub client_name: String,
    pub viewed_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Teasers
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct TeaserView {
    pub id: EntityId,
    pub kind: TeaserKind,
    pub url: String,
    pub title: Option<String>,
    pub created_at: Timestamp,
}

impl From<&Teaser> for TeaserView {
    fn from(teaser: &Teaser) -> Self {
        Self {
            id: teaser.id,
            kind: teaser.teaser_kind(),
            url: teaser.url.clone(),
            title: teaser.title.clone(),
            created_at: teaser.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Public side
// ---------------------------------------------------------------------------

/// What an anonymous visitor sees before unlocking.
#[derive(Debug, Serialize)]
pub struct LockedGate {
    pub locked: bool,
    pub client_name: String,
    pub studio_name: String,
}

/// The client tracking page. Carries no internal content and no password.
#[derive(Debug, Serialize)]
pub struct ClientTracking {
    pub locked: bool,
    pub id: EntityId,
    pub client_name: String,
    pub studio_name: String,
    pub project_type: String,
    pub date: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub location: String,
    pub cover_image: Option<String>,
    pub focal_point: FocalPoint,
    pub last_update: Timestamp,
    pub tracking: ClientView,
    pub teasers: Vec<TeaserView>,
}

impl ClientTracking {
    pub fn build(
        project: &Project,
        studio_name: String,
        config: &StagesConfiguration,
        teasers: &[Teaser],
    ) -> Self {
        Self {
            locked: false,
            id: project.id,
            client_name: project.client_name.clone(),
            studio_name,
            project_type: project.project_type.clone(),
            date: project.date,
            expected_delivery_date: project.expected_delivery_date,
            location: project.location.clone(),
            cover_image: project.cover_image.clone(),
            focal_point: project.focal_point(),
            last_update: project.last_update,
            tracking: ClientView::build(config, &project.stage_record()),
            teasers: teasers.iter().map(TeaserView::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PublicProject {
    Locked(LockedGate),
    Open(Box<ClientTracking>),
}

/// Files for "download all". Clients start each file at least
/// `interval_ms` after the previous one.
#[derive(Debug, Serialize)]
pub struct DownloadManifest {
    pub interval_ms: u64,
    pub files: Vec<DownloadFile>,
}

#[derive(Debug, Serialize)]
pub struct DownloadFile {
    pub id: EntityId,
    pub url: String,
    pub file_name: String,
    pub kind: TeaserKind,
}

impl DownloadManifest {
    pub fn build(teasers: &[Teaser]) -> Self {
        Self {
            interval_ms: DOWNLOAD_INTERVAL_MS,
            files: teasers
                .iter()
                .map(|t| DownloadFile {
                    id: t.id,
                    url: t.url.clone(),
                    file_name: download_name(t.id, t.title.as_deref()),
                    kind: t.teaser_kind(),
                })
                .collect(),
        }
    }
}
