//! Dependency-ordered execution of a decomposed objective.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tracing::{Instrument, debug, info_span};

use super::capability::WorkflowCapability;
use super::config::{ExecutionMode, OrchestratorConfig};
use super::error::OrchestratorError;
use super::observer::{TracingObserver, WorkflowEvent, WorkflowObserver};
use super::plan::{Task, WorkflowPlan, WorkflowStage};
use super::result::{FAILED_WORKFLOW_ID, WorkflowResult};

type TaskOutcome = (usize, Result<String, OrchestratorError>);

/// Turns an objective into a plan of tasks and runs them in dependency order.
///
/// Both the decomposition and the per-task work are delegated to a
/// [`WorkflowCapability`]. The orchestrator only decides *when* a task may
/// run: a task becomes eligible once every task it depends on has completed.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use llm_workflow::orchestrator::{AgentCapability, WorkflowOrchestrator};
/// # use llm_workflow::agent::{Agent, AgentError};
/// # use async_trait::async_trait;
/// # struct MyAgent;
/// # #[async_trait]
/// # impl Agent for MyAgent {
/// #     type Output = String;
/// #     fn expertise(&self) -> &str { "" }
/// #     async fn execute(&self, _: String) -> Result<String, AgentError> { Ok(String::new()) }
/// # }
///
/// # async fn demo() {
/// let orchestrator = WorkflowOrchestrator::new(Arc::new(AgentCapability::new(MyAgent)));
/// let result = orchestrator.run("Write a blog post about Rust").await;
///
/// if result.success {
///     for (task_id, output) in &result.results {
///         println!("{task_id}: {output}");
///     }
/// } else {
///     eprintln!("{}", result.error_message.unwrap_or_default());
/// }
/// # }
/// ```
pub struct WorkflowOrchestrator {
    capability: Arc<dyn WorkflowCapability>,
    config: OrchestratorConfig,
    observer: Arc<dyn WorkflowObserver>,
}

impl WorkflowOrchestrator {
    /// Creates an orchestrator with the default configuration, reporting
    /// progress through `tracing`.
    pub fn new(capability: Arc<dyn WorkflowCapability>) -> Self {
        Self {
            capability,
            config: OrchestratorConfig::default(),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn WorkflowObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    fn emit(&self, event: WorkflowEvent) {
        self.observer.observe(&event);
    }

    /// Decomposes `objective` into a fresh plan.
    ///
    /// The dependency graph is taken as returned by the capability; it is not
    /// validated here.
    pub async fn plan(&self, objective: &str) -> Result<WorkflowPlan, OrchestratorError> {
        if objective.trim().is_empty() {
            return Err(OrchestratorError::EmptyObjective);
        }

        self.emit(WorkflowEvent::PlanRequested {
            objective: objective.to_string(),
        });

        let tasks = self
            .capability
            .decompose(objective)
            .await
            .map_err(OrchestratorError::Decomposition)?;

        let plan = WorkflowPlan::new(objective, tasks);
        self.emit(WorkflowEvent::PlanCreated {
            workflow_id: plan.workflow_id.clone(),
            task_count: plan.tasks.len(),
        });

        Ok(plan)
    }

    /// Runs a single task through the capability.
    pub async fn execute(&self, task: &Task) -> Result<String, OrchestratorError> {
        debug!(task_id = %task.task_id, "Delegating task execution");
        self.capability
            .execute(&task.description)
            .await
            .map_err(|source| OrchestratorError::Execution {
                task_id: task.task_id.clone(),
                source,
            })
    }

    /// Plans and executes `objective`.
    ///
    /// Never fails: any error is reported as a failed [`WorkflowResult`]
    /// with no results.
    pub async fn run(&self, objective: &str) -> WorkflowResult {
        let started = Instant::now();

        async {
            match self.plan(objective).await {
                Ok(plan) => self.finish(plan, started).await,
                Err(e) => {
                    let error = e.to_string();
                    self.emit(WorkflowEvent::WorkflowFailed {
                        workflow_id: FAILED_WORKFLOW_ID.to_string(),
                        error: error.clone(),
                    });
                    WorkflowResult::failure(FAILED_WORKFLOW_ID, error)
                }
            }
        }
        .instrument(info_span!("workflow_run", objective = %objective.trim()))
        .await
    }

    /// Executes a caller-built plan. Task status and results are reset first.
    pub async fn run_plan(&self, plan: WorkflowPlan) -> WorkflowResult {
        let started = Instant::now();
        let plan = WorkflowPlan::with_id(plan.workflow_id, plan.objective, plan.tasks);
        let span = info_span!("workflow_run", workflow_id = %plan.workflow_id);

        self.finish(plan, started).instrument(span).await
    }

    async fn finish(&self, mut plan: WorkflowPlan, started: Instant) -> WorkflowResult {
        match self.execute_plan(&mut plan).await {
            Ok(results) => {
                let execution_time_ms = started.elapsed().as_millis() as u64;
                self.emit(WorkflowEvent::WorkflowCompleted {
                    workflow_id: plan.workflow_id.clone(),
                    execution_time_ms,
                });
                WorkflowResult::success(plan.workflow_id, results, execution_time_ms)
            }
            Err(e) => {
                let error = e.to_string();
                self.emit(WorkflowEvent::WorkflowFailed {
                    workflow_id: plan.workflow_id.clone(),
                    error: error.clone(),
                });
                WorkflowResult::failure(plan.workflow_id, error)
            }
        }
    }

    /// Executes every task of `plan` in dependency order and returns the
    /// output of each task keyed by task id.
    ///
    /// On success every task is `Completed` and the plan stage is
    /// `Completed`. On error the plan stage is `Failed` and tasks completed so
    /// far keep their results.
    pub async fn execute_plan(
        &self,
        plan: &mut WorkflowPlan,
    ) -> Result<HashMap<String, String>, OrchestratorError> {
        let span = info_span!(
            "workflow_execute",
            workflow_id = %plan.workflow_id,
            task_count = plan.tasks.len(),
        );

        async {
            if self.config.validate_dependencies {
                if let Err(e) = plan.validate() {
                    plan.stage = WorkflowStage::Failed;
                    return Err(e);
                }
            }

            plan.stage = WorkflowStage::Executing;
            let outcome = match self.config.mode {
                ExecutionMode::Sequential => self.execute_sequential(plan).await,
                ExecutionMode::Concurrent => self.execute_concurrent(plan).await,
            };

            match &outcome {
                Ok(_) => plan.mark_completed(),
                Err(_) => plan.stage = WorkflowStage::Failed,
            }
            outcome
        }
        .instrument(span)
        .await
    }

    /// Indices of pending tasks whose dependencies all have results.
    fn eligible_tasks(
        plan: &WorkflowPlan,
        results: &HashMap<String, String>,
        in_flight: &HashSet<usize>,
    ) -> Vec<usize> {
        plan.tasks
            .iter()
            .enumerate()
            .filter(|(index, task)| {
                !task.is_completed()
                    && !in_flight.contains(index)
                    && task.dependencies.iter().all(|dep| results.contains_key(dep))
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// The capability call for one task, owning everything it needs so it can
    /// run on its own tokio task. A panic inside the capability then surfaces
    /// as a `JoinError` instead of unwinding through the orchestrator.
    fn task_future(
        capability: Arc<dyn WorkflowCapability>,
        index: usize,
        task_id: String,
        description: String,
    ) -> impl Future<Output = TaskOutcome> + Send + 'static {
        let task_span = info_span!("workflow_task", task_id = %task_id);

        async move {
            debug!(task_id = %task_id, "Delegating task execution");
            let outcome = capability
                .execute(&description)
                .await
                .map_err(|source| OrchestratorError::Execution { task_id, source });
            (index, outcome)
        }
        .instrument(task_span)
    }

    fn no_progress(&self, plan: &WorkflowPlan) -> OrchestratorError {
        let pending = plan.pending_task_ids();
        self.emit(WorkflowEvent::NoProgress {
            workflow_id: plan.workflow_id.clone(),
            pending: pending.clone(),
        });
        OrchestratorError::DependencyCycle { pending }
    }

    async fn execute_sequential(
        &self,
        plan: &mut WorkflowPlan,
    ) -> Result<HashMap<String, String>, OrchestratorError> {
        let mut results = HashMap::new();
        let no_in_flight = HashSet::new();
        let mut scan = 0usize;

        while !plan.all_completed() {
            scan += 1;
            // Eligibility is fixed at the start of the scan.
            let eligible = Self::eligible_tasks(plan, &results, &no_in_flight);
            if eligible.is_empty() {
                return Err(self.no_progress(plan));
            }

            self.emit(WorkflowEvent::ScanStarted {
                workflow_id: plan.workflow_id.clone(),
                scan,
                pending: plan.pending_task_ids().len(),
            });

            for index in eligible {
                let task_id = plan.tasks[index].task_id.clone();
                self.emit(WorkflowEvent::TaskStarted {
                    workflow_id: plan.workflow_id.clone(),
                    task_id: task_id.clone(),
                    scan,
                });

                let task = Self::task_future(
                    Arc::clone(&self.capability),
                    index,
                    task_id.clone(),
                    plan.tasks[index].description.clone(),
                );
                let (_, outcome) = tokio::spawn(task)
                    .await
                    .map_err(|join_error| OrchestratorError::TaskJoin(join_error.to_string()))?;
                let output = outcome?;
                plan.tasks[index].complete(output.clone());
                results.insert(task_id.clone(), output);

                self.emit(WorkflowEvent::TaskCompleted {
                    workflow_id: plan.workflow_id.clone(),
                    task_id,
                    scan,
                });
            }
        }

        Ok(results)
    }

    async fn execute_concurrent(
        &self,
        plan: &mut WorkflowPlan,
    ) -> Result<HashMap<String, String>, OrchestratorError> {
        let limit = self.config.concurrency_limit();
        let mut results = HashMap::new();
        let mut in_flight: HashMap<usize, usize> = HashMap::new();
        let mut join_set: JoinSet<TaskOutcome> = JoinSet::new();
        let mut round = 0usize;

        while !plan.all_completed() {
            let running: HashSet<usize> = in_flight.keys().copied().collect();
            let eligible = Self::eligible_tasks(plan, &results, &running);
            let capacity = limit.saturating_sub(in_flight.len());

            if !eligible.is_empty() && capacity > 0 {
                round += 1;
                self.emit(WorkflowEvent::ScanStarted {
                    workflow_id: plan.workflow_id.clone(),
                    scan: round,
                    pending: plan.pending_task_ids().len(),
                });

                for index in eligible.into_iter().take(capacity) {
                    let task = &plan.tasks[index];
                    self.emit(WorkflowEvent::TaskStarted {
                        workflow_id: plan.workflow_id.clone(),
                        task_id: task.task_id.clone(),
                        scan: round,
                    });

                    join_set.spawn(Self::task_future(
                        Arc::clone(&self.capability),
                        index,
                        task.task_id.clone(),
                        task.description.clone(),
                    ));
                    in_flight.insert(index, round);
                }
            }

            if in_flight.is_empty() {
                return Err(self.no_progress(plan));
            }

            let joined = match join_set.join_next().await {
                Some(joined) => joined,
                None => {
                    return Err(OrchestratorError::TaskJoin(
                        "no task left to join while tasks were in flight".to_string(),
                    ));
                }
            };

            match joined {
                Ok((index, Ok(output))) => {
                    let scan = in_flight.remove(&index).unwrap_or(round);
                    let task_id = plan.tasks[index].task_id.clone();
                    plan.tasks[index].complete(output.clone());
                    results.insert(task_id.clone(), output);

                    self.emit(WorkflowEvent::TaskCompleted {
                        workflow_id: plan.workflow_id.clone(),
                        task_id,
                        scan,
                    });
                }
                Ok((_, Err(e))) => {
                    join_set.abort_all();
                    return Err(e);
                }
                Err(join_error) => {
                    join_set.abort_all();
                    return Err(OrchestratorError::TaskJoin(join_error.to_string()));
                }
            }
        }

        Ok(results)
    }
}
