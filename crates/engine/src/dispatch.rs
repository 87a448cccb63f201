// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run dispatch: create and enqueue runs across every execution mode.

use orq_core::{
    Clock, Edge, Error, ProjectId, Resource, Result, Run, RunId, RunStatus, Step, StepId,
    StepRun, TenantId, TriggeredBy, UserId, VERSION_CURRENT_DRAFT,
};
use orq_storage::{BlockDefinitionRepo, ProjectRepo, RunRepo, StepRepo, StepRunRepo};
use orq_wire::{ExecutionMode, JobQueue, RunJob};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::graph::forward_closure;
use crate::guard::check_exists;
use crate::versions::VersionStore;

/// Inputs for a full run.
#[derive(Debug, Clone)]
pub struct CreateRun {
    pub tenant: TenantId,
    pub project_id: ProjectId,
    /// None or 0 resolve to the project's current version; an explicit
    /// version must exist.
    pub version: Option<u32>,
    pub input: Value,
    pub triggered_by: TriggeredBy,
    pub user: Option<UserId>,
    /// Selects which Start flow to enter.
    pub start_step_id: StepId,
}

/// What a resume will re-execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumePlan {
    pub run_id: RunId,
    pub steps_to_execute: Vec<StepId>,
}

/// Inputs for invoking a system project as a subroutine.
#[derive(Debug, Clone)]
pub struct SystemRunRequest {
    pub tenant: TenantId,
    pub slug: String,
    pub entry_point: Option<String>,
    pub input: Value,
    pub source: String,
    pub metadata: Option<Value>,
}

/// Receipt for a system-project invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemRunReceipt {
    pub run_id: RunId,
    pub project_id: ProjectId,
    pub version: u32,
}

/// The run dispatch engine: persists runs and emits jobs for the worker.
pub struct Dispatcher<C: Clock> {
    projects: Arc<dyn ProjectRepo>,
    steps: Arc<dyn StepRepo>,
    edges: Arc<dyn orq_storage::EdgeRepo>,
    versions: VersionStore,
    runs: Arc<dyn RunRepo>,
    step_runs: Arc<dyn StepRunRepo>,
    block_definitions: Option<Arc<dyn BlockDefinitionRepo>>,
    queue: Arc<dyn JobQueue>,
    clock: C,
}

impl<C: Clock> Dispatcher<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        projects: Arc<dyn ProjectRepo>,
        steps: Arc<dyn StepRepo>,
        edges: Arc<dyn orq_storage::EdgeRepo>,
        versions: VersionStore,
        runs: Arc<dyn RunRepo>,
        step_runs: Arc<dyn StepRunRepo>,
        block_definitions: Option<Arc<dyn BlockDefinitionRepo>>,
        queue: Arc<dyn JobQueue>,
        clock: C,
    ) -> Self {
        Self { projects, steps, edges, versions, runs, step_runs, block_definitions, queue, clock }
    }

    /// Create and enqueue a full run.
    pub async fn create(&self, req: CreateRun) -> Result<Run> {
        let project = check_exists(self.projects.as_ref(), req.tenant, req.project_id).await?;

        let version = match req.version {
            None | Some(VERSION_CURRENT_DRAFT) => project.version,
            Some(version) => self.versions.get(project.id, version).await?.version,
        };

        let start = self
            .steps
            .get(req.start_step_id)
            .await?
            .filter(|s| s.project_id == project.id)
            .ok_or_else(|| Error::not_found(Resource::Step, req.start_step_id))?;
        if !start.is_start() {
            return Err(Error::validation("start_step_id", "step is not a start block"));
        }
        self.validate_start_input(req.tenant, &start, &req.input).await?;

        let now = self.clock.now();
        let run = Run {
            id: RunId::new(),
            tenant_id: req.tenant,
            project_id: project.id,
            project_version: version,
            status: RunStatus::Pending,
            input: req.input.clone(),
            triggered_by: req.triggered_by,
            triggered_by_user: req.user,
            start_step_id: Some(start.id),
            internal_trigger_source: None,
            internal_trigger_metadata: None,
            started_at: None,
            finished_at: None,
            created_at: now,
            updated_at: now,
        };
        self.runs.create(&run).await?;

        self.queue
            .enqueue(&RunJob {
                tenant_id: run.tenant_id,
                project_id: run.project_id,
                project_version: run.project_version,
                run_id: run.id,
                input: run.input.clone(),
                execution_mode: ExecutionMode::Full,
                target_step_id: Some(start.id),
                step_input: None,
                injected_outputs: None,
                project_tenant_id: None,
            })
            .await?;

        tracing::info!(
            run_id = %run.id,
            project_id = %run.project_id,
            version = run.project_version,
            triggered_by = %run.triggered_by,
            "run enqueued"
        );
        Ok(run)
    }

    /// Re-execute one step of a terminal run.
    ///
    /// Returns the in-memory step run for the new attempt; the worker
    /// persists it and assigns the sequence number when execution starts.
    pub async fn execute_single_step(
        &self,
        tenant: TenantId,
        run_id: RunId,
        step_id: StepId,
        input_override: Option<Value>,
    ) -> Result<StepRun> {
        let run = self.require_terminal_run(tenant, run_id).await?;
        let (mut steps, _) = self.load_definition(&run).await?;

        // A step deleted from the flow since the snapshot can still be
        // tested: graft it in from the current project.
        if !steps.iter().any(|s| s.id == step_id) {
            let grafted = self
                .steps
                .get(step_id)
                .await?
                .filter(|s| s.project_id == run.project_id);
            match grafted {
                Some(step) => steps.push(step),
                None => return Err(Error::not_found(Resource::Step, step_id)),
            }
        }
        let step = steps
            .iter()
            .find(|s| s.id == step_id)
            .ok_or_else(|| Error::not_found(Resource::Step, step_id))?;

        let step_input = match input_override {
            Some(input) => input,
            None => self
                .step_runs
                .latest_by_step(run_id, step_id)
                .await?
                .map(|sr| sr.input)
                .unwrap_or(Value::Null),
        };

        let new_attempt = self.step_runs.max_attempt(run_id).await? + 1;
        let injected = self.injected_outputs(run_id, None).await?;

        self.queue
            .enqueue(&RunJob {
                tenant_id: run.tenant_id,
                project_id: run.project_id,
                project_version: run.project_version,
                run_id: run.id,
                input: run.input.clone(),
                execution_mode: ExecutionMode::SingleStep,
                target_step_id: Some(step_id),
                step_input: Some(step_input.clone()),
                injected_outputs: Some(injected),
                project_tenant_id: None,
            })
            .await?;

        tracing::info!(
            run_id = %run_id,
            step_id = %step_id,
            attempt = new_attempt,
            "single step enqueued"
        );
        Ok(StepRun::new_attempt(
            run_id,
            step_id,
            step.name.clone(),
            new_attempt,
            step_input,
            self.clock.now(),
        ))
    }

    /// Re-execute a terminal run from one step forward.
    ///
    /// Unlike single-step execution, the step must exist in the snapshot:
    /// steps deleted since then are not grafted back in.
    pub async fn resume_from_step(
        &self,
        tenant: TenantId,
        run_id: RunId,
        from_step_id: StepId,
        input_override: Option<Value>,
    ) -> Result<ResumePlan> {
        let run = self.require_terminal_run(tenant, run_id).await?;
        let (steps, edges) = self.load_definition(&run).await?;

        if !steps.iter().any(|s| s.id == from_step_id) {
            return Err(Error::not_found(Resource::Step, from_step_id));
        }

        let steps_to_execute = forward_closure(&edges, from_step_id);

        // Outputs of steps about to re-execute are intentionally discarded.
        let injected = self.injected_outputs(run_id, Some(&steps_to_execute)).await?;

        let step_input = match input_override {
            Some(input) => input,
            None => self
                .step_runs
                .latest_by_step(run_id, from_step_id)
                .await?
                .map(|sr| sr.input)
                .unwrap_or(Value::Null),
        };

        self.queue
            .enqueue(&RunJob {
                tenant_id: run.tenant_id,
                project_id: run.project_id,
                project_version: run.project_version,
                run_id: run.id,
                input: run.input.clone(),
                execution_mode: ExecutionMode::Resume,
                target_step_id: Some(from_step_id),
                step_input: Some(step_input),
                injected_outputs: Some(injected),
                project_tenant_id: None,
            })
            .await?;

        tracing::info!(
            run_id = %run_id,
            from_step_id = %from_step_id,
            steps = steps_to_execute.len(),
            "resume enqueued"
        );
        Ok(ResumePlan { run_id, steps_to_execute })
    }

    /// Test one step against the current draft: a fresh run with the
    /// version-zero sentinel, so the worker resolves the live definition.
    pub async fn execute_inline_test(
        &self,
        tenant: TenantId,
        project_id: ProjectId,
        step_id: StepId,
        input: Value,
        user: Option<UserId>,
    ) -> Result<Run> {
        let project = check_exists(self.projects.as_ref(), tenant, project_id).await?;

        // The target may live only in the draft overlay; that is the whole
        // point of inline tests. Check persisted steps, then the draft.
        let persisted = self
            .steps
            .get(step_id)
            .await?
            .is_some_and(|s| s.project_id == project.id);
        let drafted = project
            .draft
            .as_ref()
            .is_some_and(|d| d.steps.iter().any(|s| s.id == step_id));
        if !persisted && !drafted {
            return Err(Error::not_found(Resource::Step, step_id));
        }

        let now = self.clock.now();
        let run = Run {
            id: RunId::new(),
            tenant_id: tenant,
            project_id,
            project_version: VERSION_CURRENT_DRAFT,
            status: RunStatus::Pending,
            input: Value::Null,
            triggered_by: TriggeredBy::Test,
            triggered_by_user: user,
            start_step_id: None,
            internal_trigger_source: None,
            internal_trigger_metadata: None,
            started_at: None,
            finished_at: None,
            created_at: now,
            updated_at: now,
        };
        self.runs.create(&run).await?;

        self.queue
            .enqueue(&RunJob {
                tenant_id: tenant,
                project_id,
                project_version: VERSION_CURRENT_DRAFT,
                run_id: run.id,
                input: Value::Null,
                execution_mode: ExecutionMode::SingleStep,
                target_step_id: Some(step_id),
                step_input: Some(input),
                injected_outputs: Some(HashMap::new()),
                project_tenant_id: None,
            })
            .await?;

        tracing::info!(run_id = %run.id, step_id = %step_id, "inline test enqueued");
        Ok(run)
    }

    /// Invoke a published system project by slug and entry point. The run
    /// lands in the caller's tenant; the job carries the owning tenant so
    /// the worker loads the right definition.
    pub async fn execute_system_project(
        &self,
        req: SystemRunRequest,
    ) -> Result<SystemRunReceipt> {
        let project = self
            .projects
            .find_system_by_slug(&req.slug)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Project, &req.slug))?;
        if project.status != orq_core::ProjectStatus::Published || project.version < 1 {
            return Err(Error::validation("status", "system project is not published"));
        }

        let starts: Vec<Step> = self
            .steps
            .list_by_project(project.id)
            .await?
            .into_iter()
            .filter(Step::is_start)
            .collect();
        let start = match req.entry_point.as_deref() {
            Some(entry) if !entry.is_empty() => starts
                .iter()
                .find(|s| s.entry_point() == Some(entry))
                .ok_or_else(|| {
                    Error::validation("entry_point", format!("no start block named {entry:?}"))
                })?,
            _ => starts
                .first()
                .ok_or_else(|| Error::validation("steps", "system project has no start block"))?,
        };

        let now = self.clock.now();
        let run = Run {
            id: RunId::new(),
            tenant_id: req.tenant,
            project_id: project.id,
            project_version: project.version,
            status: RunStatus::Pending,
            input: req.input.clone(),
            triggered_by: TriggeredBy::Internal,
            triggered_by_user: None,
            start_step_id: Some(start.id),
            internal_trigger_source: Some(req.source),
            internal_trigger_metadata: req.metadata,
            started_at: None,
            finished_at: None,
            created_at: now,
            updated_at: now,
        };
        self.runs.create(&run).await?;

        self.queue
            .enqueue(&RunJob {
                tenant_id: req.tenant,
                project_id: project.id,
                project_version: project.version,
                run_id: run.id,
                input: req.input,
                execution_mode: ExecutionMode::Full,
                target_step_id: Some(start.id),
                step_input: None,
                injected_outputs: None,
                project_tenant_id: Some(project.tenant_id),
            })
            .await?;

        tracing::info!(
            run_id = %run.id,
            slug = %req.slug,
            project_id = %project.id,
            "system project run enqueued"
        );
        Ok(SystemRunReceipt { run_id: run.id, project_id: project.id, version: project.version })
    }

    /// Cancel a pending or running run. The worker observes the status
    /// transition between step dispatches.
    pub async fn cancel(&self, tenant: TenantId, run_id: RunId) -> Result<Run> {
        let mut run = self.require_run(tenant, run_id).await?;
        run.cancel(self.clock.now())?;
        self.runs.update(&run).await?;
        tracing::info!(run_id = %run_id, "run cancelled");
        Ok(run)
    }

    pub async fn get_run(&self, tenant: TenantId, run_id: RunId) -> Result<Run> {
        self.require_run(tenant, run_id).await
    }

    async fn require_run(&self, tenant: TenantId, run_id: RunId) -> Result<Run> {
        self.runs
            .get(run_id)
            .await?
            .filter(|r| r.tenant_id == tenant)
            .ok_or_else(|| Error::not_found(Resource::Run, run_id))
    }

    async fn require_terminal_run(&self, tenant: TenantId, run_id: RunId) -> Result<Run> {
        let run = self.require_run(tenant, run_id).await?;
        if !matches!(run.status, RunStatus::Completed | RunStatus::Failed) {
            return Err(Error::RunNotResumable(run.status.to_string()));
        }
        Ok(run)
    }

    /// The definition a partial re-run executes against: the run's snapshot,
    /// or the live project rows when the snapshot is missing (inline-test
    /// runs carry the version-zero sentinel).
    async fn load_definition(&self, run: &Run) -> Result<(Vec<Step>, Vec<Edge>)> {
        match self.versions.get(run.project_id, run.project_version).await {
            Ok(snapshot) => Ok((snapshot.definition.steps, snapshot.definition.edges)),
            Err(err) if err.is_version_not_found() => {
                let steps = self.steps.list_by_project(run.project_id).await?;
                let edges = self.edges.list_by_project(run.project_id).await?;
                Ok((steps, edges))
            }
            Err(err) => Err(err),
        }
    }

    /// Outputs of completed step runs, keyed by step id. Steps in `exclude`
    /// are dropped: they are about to re-execute.
    async fn injected_outputs(
        &self,
        run_id: RunId,
        exclude: Option<&[StepId]>,
    ) -> Result<HashMap<String, Value>> {
        let mut outputs = HashMap::new();
        for step_run in self.step_runs.completed_by_run(run_id).await? {
            if exclude.is_some_and(|skip| skip.contains(&step_run.step_id)) {
                continue;
            }
            // Chronological listing: a later attempt overwrites an earlier one.
            outputs.insert(step_run.step_id.to_string(), step_run.output);
        }
        Ok(outputs)
    }

    /// Validate run input against the start block's declared schema. The
    /// check is best-effort: no definition or an uncompilable schema defers
    /// to the worker.
    async fn validate_start_input(
        &self,
        tenant: TenantId,
        start: &Step,
        input: &Value,
    ) -> Result<()> {
        let Some(definitions) = &self.block_definitions else { return Ok(()) };

        let def = if let Some(def_id) = start.block_definition_id {
            definitions.get(def_id).await?
        } else {
            match definitions.find_by_slug(Some(tenant), &start.step_type).await? {
                Some(def) => Some(def),
                None => definitions.find_by_slug(None, &start.step_type).await?,
            }
        };
        let Some(schema) = def.and_then(|d| d.input_schema) else { return Ok(()) };

        let Ok(validator) = jsonschema::options().build(&schema) else {
            tracing::warn!("start block input schema does not compile; deferring to worker");
            return Ok(());
        };
        if let Err(violation) = validator.validate(input) {
            return Err(Error::validation("input", violation.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
