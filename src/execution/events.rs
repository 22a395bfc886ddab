//! Execution progress events.
//!
//! A closed set of tagged events delivered to an observer while a run
//! progresses, in the same order the trace is built.

use serde::{Deserialize, Serialize};

use crate::report::{Summary, TraceStep};

/// One progress notification.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionEvent {
    /// Validation and scheduling finished; execution begins.
    RunStarted {
        workflow_name: String,
        total_steps: usize,
    },
    /// A structural defect was recorded.
    ViolationRecorded { message: String },
    /// A node was handed to the executor (the `running` state).
    StepStarted {
        node_id: String,
        service: String,
        action: String,
    },
    /// An executed node reached `success` or `failed`.
    StepFinished { step: TraceStep },
    /// A node was skipped without executing.
    StepSkipped { node_id: String, reason: String },
    /// Every node is terminal.
    RunFinished { summary: Summary },
}

impl ExecutionEvent {
    /// Node the event refers to, if any.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Self::StepStarted { node_id, .. } | Self::StepSkipped { node_id, .. } => {
                Some(node_id.as_str())
            }
            Self::StepFinished { step } => Some(step.node_id.as_str()),
            _ => None,
        }
    }
}
