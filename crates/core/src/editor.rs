//! Workflow editor: a mutable draft over an immutable saved configuration.
//!
//! Edits touch the draft only. [`WorkflowDraft::save`],
//! [`WorkflowDraft::remove_step`] and [`WorkflowDraft::reset_to_default`]
//! produce a [`WorkflowCommit`] holding an independent configuration for
//! the caller to persist.

use serde::Serialize;

use crate::error::CoreError;
use crate::plan::Plan;
use crate::source::StageSource;
use crate::types::EntityId;
use crate::workflow::{
    default_stages, default_step_content, fresh_step_id, StagesConfiguration, WorkflowStep,
    MAX_STEPS,
};

/// What a draft edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", content = "project_id", rename_all = "snake_case")]
pub enum EditScope {
    /// A single project's override.
    Project(EntityId),
    /// The studio default applied to new projects.
    Studio,
}

/// A single-field edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepField {
    Label(String),
    Message(String),
    Description(Option<String>),
    Content(String),
    MinDays(u32),
    MaxDays(u32),
}

/// A configuration ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowCommit {
    pub scope: EditScope,
    pub config: StagesConfiguration,
    /// `(old, new)` ids reassigned because they were blank or duplicated.
    pub renamed: Vec<(String, String)>,
}

impl WorkflowCommit {
    /// The stage source to store for a project-scope commit.
    pub fn stage_source(&self) -> StageSource {
        StageSource::from_override(self.config.clone())
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowDraft {
    scope: EditScope,
    plan: Plan,
    saved: Vec<WorkflowStep>,
    steps: Vec<WorkflowStep>,
    editing: Option<String>,
}

impl WorkflowDraft {
    /// Open a draft over `saved`. Steps without content get the built-in
    /// content for well-known ids, else an empty string.
    pub fn open(scope: EditScope, plan: Plan, saved: &StagesConfiguration) -> Self {
        let saved: Vec<WorkflowStep> = saved
            .steps()
            .iter()
            .cloned()
            .map(with_default_content)
            .collect();
        Self {
            scope,
            plan,
            steps: saved.clone(),
            saved,
            editing: None,
        }
    }

    pub fn scope(&self) -> EditScope {
        self.scope
    }

    pub fn steps(&self) -> &[WorkflowStep] {
        &self.steps
    }

    /// Id of the step whose form is open.
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.steps != self.saved
    }

    /// Append a placeholder step and open it for editing.
    pub fn add_step(&mut self, now_ms: i64) -> Result<&WorkflowStep, CoreError> {
        if self.steps.len() >= MAX_STEPS {
            return Err(CoreError::Validation(format!(
                "A workflow can hold at most {MAX_STEPS} steps"
            )));
        }
        let id = fresh_step_id(self.steps.iter().map(|s| s.id.as_str()), now_ms);
        self.editing = Some(id.clone());
        self.steps.push(WorkflowStep::placeholder(id));
        Ok(&self.steps[self.steps.len() - 1])
    }

    /// Open an existing step for editing. Returns `false` for unknown ids.
    pub fn begin_edit(&mut self, id: &str) -> bool {
        if self.position(id).is_none() {
            return false;
        }
        self.editing = Some(id.to_string());
        true
    }

    /// Apply one field edit. Returns whether anything changed.
    ///
    /// Content edits are ignored on plans without content editing.
    pub fn edit_step(&mut self, id: &str, field: StepField) -> bool {
        if matches!(field, StepField::Content(_)) && !self.plan.can_edit_step_content() {
            return false;
        }
        let Some(index) = self.position(id) else {
            return false;
        };
        let step = &mut self.steps[index];
        match field {
            StepField::Label(v) => step.label = v,
            StepField::Message(v) => step.message = v,
            StepField::Description(v) => step.description = v,
            StepField::Content(v) => step.content = Some(v),
            StepField::MinDays(v) => step.min_days = v,
            StepField::MaxDays(v) => step.max_days = v,
        }
        true
    }

    /// Remove a step and commit at once.
    ///
    /// `Ok(None)` when `id` is unknown or is the last remaining step.
    pub fn remove_step(
        &mut self,
        id: &str,
        now_ms: i64,
    ) -> Result<Option<WorkflowCommit>, CoreError> {
        if self.steps.len() <= 1 {
            return Ok(None);
        }
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        self.steps.remove(index);
        self.save(now_ms).map(Some)
    }

    /// Move a step to position `to` (clamped). Returns `false` for unknown ids.
    pub fn move_step(&mut self, id: &str, to: usize) -> bool {
        let Some(from) = self.position(id) else {
            return false;
        };
        let step = self.steps.remove(from);
        let to = to.min(self.steps.len());
        self.steps.insert(to, step);
        true
    }

    /// Load a complete draft, e.g. one submitted by a client form.
    ///
    /// Without content editing, each step keeps the content already stored
    /// for its id.
    pub fn replace_steps(&mut self, steps: Vec<WorkflowStep>) {
        let can_edit_content = self.plan.can_edit_step_content();
        self.steps = steps
            .into_iter()
            .map(|mut step| {
                if !can_edit_content {
                    step.content = self
                        .saved
                        .iter()
                        .find(|s| s.id == step.id)
                        .and_then(|s| s.content.clone());
                }
                with_default_content(step)
            })
            .collect();
        self.editing = None;
    }

    /// Validate the draft and make it the new saved baseline.
    ///
    /// Blank and duplicate ids are repaired rather than rejected.
    pub fn save(&mut self, now_ms: i64) -> Result<WorkflowCommit, CoreError> {
        let (config, renamed) = StagesConfiguration::new(self.steps.clone()).repaired(now_ms);
        match self.scope {
            EditScope::Studio => config.validate_as_studio_default()?,
            EditScope::Project(_) => config.validate()?,
        }
        self.steps = config.steps().to_vec();
        self.saved = self.steps.clone();
        self.editing = None;
        Ok(WorkflowCommit {
            scope: self.scope,
            config,
            renamed,
        })
    }

    /// Replace everything with a fresh copy of the built-in workflow.
    pub fn reset_to_default(&mut self) -> WorkflowCommit {
        self.steps = default_stages()
            .into_steps()
            .into_iter()
            .map(with_default_content)
            .collect();
        self.saved = self.steps.clone();
        self.editing = None;
        WorkflowCommit {
            scope: self.scope,
            config: StagesConfiguration::new(self.steps.clone()),
            renamed: Vec::new(),
        }
    }

    /// Drop all unsaved edits.
    pub fn cancel(&mut self) {
        self.steps = self.saved.clone();
        self.editing = None;
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == id)
    }
}

fn with_default_content(mut step: WorkflowStep) -> WorkflowStep {
    if step.content.is_none() {
        step.content = Some(default_step_content(&step.id).unwrap_or_default().to_string());
    }
    step
}
