//! Workflow Execution Engine
//!
//! The run loop that ties the pieces together:
//! - Validates the document into a graph (duplicate IDs abort here)
//! - Orders nodes topologically and records reference/cycle violations
//! - Applies the failure cascade before each node
//! - Executes eligible nodes one at a time against the simulator
//! - Builds the final report
//!
//! Execution is strictly sequential so the trace is reproducible.

use log::{info, warn};

use crate::error::EngineError;
use crate::report::{ExecutionReport, ReportBuilder, StepStatus, TraceRecorder, TraceStep};
use crate::simulator::ServiceSimulator;
use crate::workflow::{parse_and_validate, planner, GraphDocument};

use super::cascade::{CascadePolicy, Verdict};
use super::events::ExecutionEvent;
use super::step::execute_step;

/// What to do when the graph contains a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePolicy {
    /// Run the acyclic part; skip cycle nodes and everything downstream.
    #[default]
    SkipAffected,
    /// Fail the run before any node executes.
    Abort,
}

/// Engine settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub cycle_policy: CyclePolicy,
    /// Record eligible nodes as successful without calling the simulator
    pub dry_run: bool,
    /// Overrides the document name in the report
    pub workflow_name: Option<String>,
}

type Observer<'o> = Box<dyn FnMut(&ExecutionEvent) + 'o>;

/// Workflow execution engine.
///
/// Holds one document and runs it against a simulator. The engine keeps
/// no state between runs; every call to [`Engine::run`] rebuilds the graph.
///
/// # Example
///
/// ```
/// use flowforge_engine::{Engine, GraphDocument, NodeSpec, ScriptedSimulator, StepStatus};
///
/// let document = GraphDocument::new("wf-1", "onboarding")
///     .with_node(NodeSpec::new("account", "google", "create_account"))
///     .with_node(NodeSpec::new("invite", "slack", "invite_user").depends_on("account"));
///
/// let mut simulator = ScriptedSimulator::new().failing("google", "create_account", "quota exceeded");
/// let report = Engine::new(document).run(&mut simulator).unwrap();
///
/// assert_eq!(report.step("account").unwrap().status, StepStatus::Failed);
/// assert_eq!(report.step("invite").unwrap().status, StepStatus::Skipped);
/// ```
pub struct Engine<'o> {
    document: GraphDocument,
    config: EngineConfig,
    observer: Option<Observer<'o>>,
}

impl<'o> Engine<'o> {
    /// Creates an engine with default settings.
    pub fn new(document: GraphDocument) -> Self {
        Self::with_config(document, EngineConfig::default())
    }

    pub fn with_config(document: GraphDocument, config: EngineConfig) -> Self {
        Self {
            document,
            config,
            observer: None,
        }
    }

    /// Sets how cycles are handled.
    pub fn set_cycle_policy(&mut self, policy: CyclePolicy) {
        self.config.cycle_policy = policy;
    }

    /// Enables or disables dry run mode.
    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.config.dry_run = dry_run;
    }

    /// Overrides the workflow name used in the report.
    pub fn set_workflow_name(&mut self, name: impl Into<String>) {
        self.config.workflow_name = Some(name.into());
    }

    /// Registers a callback receiving every progress event in order.
    pub fn set_observer(&mut self, observer: impl FnMut(&ExecutionEvent) + 'o) {
        self.observer = Some(Box::new(observer));
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn document(&self) -> &GraphDocument {
        &self.document
    }

    fn workflow_name(&self) -> String {
        self.config
            .workflow_name
            .clone()
            .unwrap_or_else(|| self.document.name.clone())
    }

    fn emit(&mut self, event: ExecutionEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&event);
        }
    }

    /// Executes the document against `simulator`.
    ///
    /// # Returns
    ///
    /// * `Ok(report)` - Every node reached a terminal status
    /// * `Err` - The document has duplicate node IDs, or it has a cycle
    ///   and the engine is set to [`CyclePolicy::Abort`]
    pub fn run(
        &mut self,
        simulator: &mut dyn ServiceSimulator,
    ) -> Result<ExecutionReport, EngineError> {
        let workflow_name = self.workflow_name();
        let builder = ReportBuilder::start(workflow_name.clone());

        let (graph, violations) = parse_and_validate(&self.document)?;
        let schedule = planner::order(&graph);

        if !schedule.is_complete() && self.config.cycle_policy == CyclePolicy::Abort {
            return Err(EngineError::CycleDetected(schedule.unresolved().to_vec()));
        }

        info!(
            "{}: starting run '{}' ({} nodes, dry run: {})",
            crate::APP_NAME,
            workflow_name,
            graph.len(),
            self.config.dry_run
        );
        self.emit(ExecutionEvent::RunStarted {
            workflow_name,
            total_steps: graph.len(),
        });

        let mut recorder = TraceRecorder::new();
        for violation in violations.iter().chain(&schedule.violations) {
            recorder.record_violation(violation);
            self.emit(ExecutionEvent::ViolationRecorded {
                message: violation.to_string(),
            });
        }

        let policy = CascadePolicy::new(&graph, schedule.unresolved());

        for node_id in &schedule.order {
            let Some(node) = graph.node(node_id) else {
                continue;
            };

            let step = match policy.decide(node_id, &recorder) {
                Verdict::Skip(reason) => {
                    info!("Skipping step '{}': {}", node_id, reason);
                    let mut step = TraceStep::pending(node);
                    step.skip(reason.clone());
                    self.emit(ExecutionEvent::StepSkipped {
                        node_id: node_id.clone(),
                        reason,
                    });
                    step
                }
                Verdict::Run => {
                    info!("Starting step: {}", node_id);
                    self.emit(ExecutionEvent::StepStarted {
                        node_id: node_id.clone(),
                        service: node.service.clone(),
                        action: node.action.clone(),
                    });

                    let step = if self.config.dry_run {
                        let mut step = TraceStep::pending(node);
                        step.mark_running();
                        step.succeed(None, std::time::Duration::ZERO);
                        step
                    } else {
                        execute_step(node, simulator)
                    };

                    match step.status {
                        StepStatus::Success => {
                            info!("Step '{}' completed in {} ms", node_id, step.duration_ms)
                        }
                        _ => warn!(
                            "Step '{}' failed: {}",
                            node_id,
                            step.error.as_deref().unwrap_or("unknown error")
                        ),
                    }

                    self.emit(ExecutionEvent::StepFinished { step: step.clone() });
                    step
                }
            };

            recorder.record(step)?;
        }

        let report = builder.finish(recorder.finish());
        self.emit(ExecutionEvent::RunFinished {
            summary: report.summary,
        });

        Ok(report)
    }
}

/// Runs a document once with default settings.
pub fn execute_workflow(
    document: &GraphDocument,
    simulator: &mut dyn ServiceSimulator,
) -> Result<ExecutionReport, EngineError> {
    Engine::new(document.clone()).run(simulator)
}
