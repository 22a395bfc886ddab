//! Execution Trace
//!
//! Per-step outcome records and the recorder that accumulates them in
//! scheduling order for one run.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::workflow::{NodeSpec, Parameters, Value, Violation};

/// Status of a step during a run.
///
/// `Pending -> Running -> {Success, Failed}` or `Pending -> Skipped`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Not yet processed
    Pending,
    /// Handed to the simulator
    Running,
    /// Simulator returned normally
    Success,
    /// Simulator raised an error
    Failed,
    /// Never executed (upstream failure or cycle)
    Skipped,
}

impl StepStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::Skipped)
    }

    /// True for outcomes that block every dependent.
    pub fn blocks_dependents(self) -> bool {
        matches!(self, Self::Failed | Self::Skipped)
    }

    /// Whether `self -> next` is an allowed transition.
    pub fn can_transition_to(self, next: StepStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (Self::Pending, Self::Skipped)
                | (Self::Running, Self::Success)
                | (Self::Running, Self::Failed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome record for one node.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TraceStep {
    pub node_id: String,
    pub service: String,
    pub action: String,
    pub parameters: Parameters,
    pub status: StepStatus,
    pub result: Option<Value>,
    pub error: Option<String>,
    #[serde(rename = "timestamp")]
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl TraceStep {
    /// Creates the pending record for a node.
    pub fn pending(node: &NodeSpec) -> Self {
        Self {
            node_id: node.id.clone(),
            service: node.service.clone(),
            action: node.action.clone(),
            parameters: node.parameters.clone(),
            status: StepStatus::Pending,
            result: None,
            error: None,
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }

    fn transition(&mut self, next: StepStatus) {
        debug_assert!(
            self.status.can_transition_to(next),
            "illegal step transition {} -> {} for '{}'",
            self.status,
            next,
            self.node_id
        );
        self.status = next;
    }

    /// Marks the step as handed to the simulator and stamps its start time.
    pub fn mark_running(&mut self) {
        self.transition(StepStatus::Running);
        self.started_at = Utc::now();
    }

    pub fn succeed(&mut self, result: Option<Value>, elapsed: Duration) {
        self.transition(StepStatus::Success);
        self.result = result;
        self.duration_ms = millis(elapsed);
    }

    pub fn fail(&mut self, error: impl Into<String>, elapsed: Duration) {
        self.transition(StepStatus::Failed);
        self.error = Some(error.into());
        self.duration_ms = millis(elapsed);
    }

    /// Skips the step without executing it.
    pub fn skip(&mut self, reason: impl Into<String>) {
        self.transition(StepStatus::Skipped);
        self.error = Some(reason.into());
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Ordered record of one run.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ExecutionTrace {
    pub steps: Vec<TraceStep>,
    pub dependency_violations: Vec<String>,
}

impl ExecutionTrace {
    /// Looks up a step by node ID.
    pub fn step(&self, node_id: &str) -> Option<&TraceStep> {
        self.steps.iter().find(|s| s.node_id == node_id)
    }

    /// Node IDs in execution order.
    pub fn order(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.node_id.as_str()).collect()
    }
}

/// Accumulates steps and violations while a run progresses.
#[derive(Debug, Default)]
pub struct TraceRecorder {
    trace: ExecutionTrace,
    index: HashMap<String, usize>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a violation message. Violations are never removed.
    pub fn record_violation(&mut self, violation: &Violation) {
        self.trace.dependency_violations.push(violation.to_string());
    }

    /// Appends a finished step.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidStep`] if the step is not terminal or its node
    /// was already recorded.
    pub fn record(&mut self, step: TraceStep) -> Result<(), EngineError> {
        if !step.status.is_terminal() {
            return Err(EngineError::InvalidStep {
                node_id: step.node_id,
                reason: "step has not reached a terminal status",
            });
        }
        if self.index.contains_key(&step.node_id) {
            return Err(EngineError::InvalidStep {
                node_id: step.node_id,
                reason: "step already recorded",
            });
        }

        self.index.insert(step.node_id.clone(), self.trace.steps.len());
        self.trace.steps.push(step);
        Ok(())
    }

    /// Recorded status of a node, if it has been processed.
    pub fn status(&self, node_id: &str) -> Option<StepStatus> {
        self.index
            .get(node_id)
            .map(|&position| self.trace.steps[position].status)
    }

    pub fn len(&self) -> usize {
        self.trace.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trace.steps.is_empty()
    }

    /// Freezes the trace.
    pub fn finish(self) -> ExecutionTrace {
        self.trace
    }
}
