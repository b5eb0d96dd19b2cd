//! Owner and client renderings of a project's stage state.
//!
//! Both views wrap the same [`TrackingSnapshot`], produced by
//! [`snapshot`], so their index, percent and label always agree.

use serde::Serialize;

use crate::progress::{progress_for_phase, StageProgress};
use crate::transition::{apply, Phase, StageCommand, StageRecord};
use crate::workflow::{default_step_content, StagesConfiguration, WorkflowStep};

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Delivery state as shown to both audiences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    InProgress,
    /// On the terminal stage, not yet finalized.
    AwaitingDelivery,
    Delivered,
}

impl DeliveryStatus {
    pub fn of(config: &StagesConfiguration, phase: &Phase) -> Self {
        match phase {
            Phase::Delivered => Self::Delivered,
            Phase::InProgress(index) if config.last_index() == Some(*index) => {
                Self::AwaitingDelivery
            }
            _ => Self::InProgress,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowState {
    Done,
    Current,
    Pending,
}

/// One stage row, without internal content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageRow {
    pub id: String,
    pub label: String,
    pub message: String,
    pub min_days: u32,
    pub max_days: u32,
    pub state: RowState,
    pub has_note: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingSnapshot {
    pub phase: Phase,
    pub progress: StageProgress,
    pub status: DeliveryStatus,
    pub stages: Vec<StageRow>,
}

/// Build the shared snapshot from the effective configuration and the
/// persisted stage record.
pub fn snapshot(config: &StagesConfiguration, record: &StageRecord) -> TrackingSnapshot {
    let phase = record.phase(config);
    let current = phase.display_index(config);

    let stages = config
        .steps()
        .iter()
        .enumerate()
        .map(|(index, step)| {
            let state = if phase.is_delivered() || index < current {
                RowState::Done
            } else if index == current {
                RowState::Current
            } else {
                RowState::Pending
            };
            StageRow {
                id: step.id.clone(),
                label: step.label.clone(),
                message: step.message.clone(),
                min_days: step.min_days,
                max_days: step.max_days,
                state,
                has_note: has_note(step.description.as_deref()),
            }
        })
        .collect();

    TrackingSnapshot {
        phase,
        progress: progress_for_phase(config, &phase),
        status: DeliveryStatus::of(config, &phase),
        stages,
    }
}

fn has_note(description: Option<&str>) -> bool {
    description.is_some_and(|d| !d.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Owner view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerStageRow {
    #[serde(flatten)]
    pub row: StageRow,
    pub description: Option<String>,
    /// Internal notes, never sent to clients. Built-in steps without
    /// saved notes show their default checklist.
    pub content: String,
    /// Activating this row would apply a transition.
    pub clickable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerView {
    pub progress: StageProgress,
    pub status: DeliveryStatus,
    pub stages: Vec<OwnerStageRow>,
    pub can_finalize: bool,
}

impl OwnerView {
    pub fn build(config: &StagesConfiguration, record: &StageRecord) -> Self {
        let TrackingSnapshot {
            phase,
            progress,
            status,
            stages,
        } = snapshot(config, record);

        let stages = stages
            .into_iter()
            .zip(config.steps())
            .map(|(row, step)| {
                let clickable =
                    apply(config, phase, &StageCommand::Activate(step.id.clone())).is_ok();
                OwnerStageRow {
                    row,
                    description: step.description.clone(),
                    content: owner_content(step),
                    clickable,
                }
            })
            .collect();

        Self {
            progress,
            status,
            stages,
            can_finalize: apply(config, phase, &StageCommand::Finalize).is_ok(),
        }
    }
}

fn owner_content(step: &WorkflowStep) -> String {
    match step.content.as_deref() {
        Some(content) if !content.is_empty() => content.to_string(),
        _ => default_step_content(&step.id).unwrap_or_default().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Client view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientView {
    pub progress: StageProgress,
    pub status: DeliveryStatus,
    pub stages: Vec<StageRow>,
    /// Client-facing note of the current stage.
    pub note: Option<String>,
    pub has_note: bool,
}

impl ClientView {
    pub fn build(config: &StagesConfiguration, record: &StageRecord) -> Self {
        let TrackingSnapshot {
            phase,
            progress,
            status,
            stages,
        } = snapshot(config, record);

        let note = config
            .get(phase.display_index(config))
            .and_then(|step| step.description.clone())
            .filter(|d| !d.trim().is_empty());

        Self {
            progress,
            status,
            stages,
            has_note: note.is_some(),
            note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{default_stages, WorkflowStep};

    fn record(stage: &str, finalized: bool) -> StageRecord {
        StageRecord {
            current_stage: stage.to_string(),
            is_finalized: finalized,
        }
    }

    fn states(snapshot: &TrackingSnapshot) -> Vec<RowState> {
        snapshot.stages.iter().map(|r| r.state).collect()
    }

    #[test]
    fn rows_split_done_current_pending() {
        let s = snapshot(&default_stages(), &record("editing", false));
        assert_eq!(
            states(&s),
            vec![
                RowState::Done,
                RowState::Done,
                RowState::Current,
                RowState::Pending,
                RowState::Pending
            ]
        );
        assert_eq!(s.status, DeliveryStatus::InProgress);
    }

    #[test]
    fn terminal_unfinalized_is_awaiting_delivery() {
        let s = snapshot(&default_stages(), &record("delivery", false));
        assert_eq!(s.status, DeliveryStatus::AwaitingDelivery);
        assert_eq!(s.progress.percent, 100);
        assert_eq!(s.stages[4].state, RowState::Current);
    }

    #[test]
    fn delivered_marks_every_row_done() {
        let s = snapshot(&default_stages(), &record("delivery", true));
        assert_eq!(s.status, DeliveryStatus::Delivered);
        assert!(s.stages.iter().all(|r| r.state == RowState::Done));
    }

    #[test]
    fn stale_finalized_flag_is_not_delivered() {
        let s = snapshot(&default_stages(), &record("export", true));
        assert_eq!(s.status, DeliveryStatus::InProgress);
    }

    #[test]
    fn unknown_stage_renders_first_row_current() {
        let s = snapshot(&default_stages(), &record("removed", false));
        assert_eq!(s.phase, Phase::Unplaced);
        assert_eq!(s.progress.percent, 0);
        assert_eq!(s.stages[0].state, RowState::Current);
    }

    #[test]
    fn empty_config_renders_safely() {
        let s = snapshot(&StagesConfiguration::empty(), &record("x", false));
        assert!(s.stages.is_empty());
        assert_eq!(s.progress.percent, 0);
        let owner = OwnerView::build(&StagesConfiguration::empty(), &record("x", false));
        assert!(!owner.can_finalize);
    }

    #[test]
    fn owner_clickable_rows_follow_transition_rules() {
        let owner = OwnerView::build(&default_stages(), &record("editing", false));
        let clickable: Vec<bool> = owner.stages.iter().map(|r| r.clickable).collect();
        assert_eq!(clickable, vec![true, true, true, false, false]);
        assert!(!owner.can_finalize);
    }

    #[test]
    fn owner_can_finalize_only_when_awaiting() {
        let awaiting = OwnerView::build(&default_stages(), &record("delivery", false));
        assert!(awaiting.can_finalize);
        assert!(!awaiting.stages[4].clickable);

        let delivered = OwnerView::build(&default_stages(), &record("delivery", true));
        assert!(!delivered.can_finalize);
        assert!(delivered.stages[3].clickable);
        assert!(!delivered.stages[4].clickable);
    }

    #[test]
    fn owner_view_fills_default_content_for_built_in_steps() {
        let owner = OwnerView::build(&default_stages(), &record("secured", false));
        assert_eq!(
            owner.stages[0].content,
            default_step_content("secured").unwrap()
        );

        let config = StagesConfiguration::new(vec![
            WorkflowStep::new("culling", "Tri", "m", 0, 1).with_content("mes notes"),
            WorkflowStep::new("custom", "Perso", "m", 0, 1),
        ]);
        let owner = OwnerView::build(&config, &record("culling", false));
        assert_eq!(owner.stages[0].content, "mes notes");
        assert_eq!(owner.stages[1].content, "");
    }

    #[test]
    fn client_view_never_carries_default_content() {
        let client = ClientView::build(&default_stages(), &record("secured", false));
        let json = serde_json::to_string(&client).unwrap();
        assert!(!json.contains(default_step_content("secured").unwrap()));
    }

    #[test]
    fn client_view_carries_note_but_never_content() {
        let config = StagesConfiguration::new(vec![
            WorkflowStep::new("a", "A", "m", 0, 1)
                .with_description("On vous tient informé")
                .with_content("interne"),
            WorkflowStep::new("b", "B", "m", 0, 1).with_description(""),
        ]);
        let client = ClientView::build(&config, &record("a", false));
        assert_eq!(client.note.as_deref(), Some("On vous tient informé"));
        assert!(client.has_note);

        let json = serde_json::to_string(&client).unwrap();
        assert!(!json.contains("interne"));
        assert!(!json.contains("clickable"));

        let client = ClientView::build(&config, &record("b", false));
        assert_eq!(client.note, None);
        assert!(!client.has_note);
    }

    #[test]
    fn both_views_agree_on_progress() {
        let config = default_stages();
        for (stage, finalized) in [("secured", false), ("delivery", false), ("delivery", true)] {
            let r = record(stage, finalized);
            let owner = OwnerView::build(&config, &r);
            let client = ClientView::build(&config, &r);
            assert_eq!(owner.progress, client.progress);
            assert_eq!(owner.status, client.status);
        }
    }
}
