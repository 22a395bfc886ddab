//! Individual Step Execution
//!
//! Runs one eligible node against the simulator inside a failure boundary:
//! simulator errors and panics become a `failed` step, never an error that
//! aborts the run. A node whose required parameters are absent or null
//! fails without reaching the simulator.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use log::{debug, error};

use crate::report::TraceStep;
use crate::simulator::{ServiceSimulator, SimulatorError};
use crate::workflow::NodeSpec;

/// Executes a single node and returns its finished trace record.
///
/// The caller has already decided the node may run (see
/// [`super::cascade`]); this function does not look at dependencies.
pub fn execute_step(node: &NodeSpec, simulator: &mut dyn ServiceSimulator) -> TraceStep {
    let mut step = TraceStep::pending(node);
    step.mark_running();
    let clock = Instant::now();

    debug!(
        "Step '{}': calling {}.{} with {} parameters",
        node.id,
        node.service,
        node.action,
        node.parameters.len()
    );

    if let Some(name) = node.missing_parameter() {
        let e = SimulatorError::MissingParameter(name.to_string());
        error!("Step '{}' failed ({}): {}", node.id, e.error_type(), e);
        step.fail(e.to_string(), clock.elapsed());
        return step;
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        simulator.run(&node.service, &node.action, &node.parameters)
    }));

    match outcome {
        Ok(Ok(result)) => step.succeed(Some(result), clock.elapsed()),
        Ok(Err(e)) => {
            error!("Step '{}' failed ({}): {}", node.id, e.error_type(), e);
            step.fail(e.to_string(), clock.elapsed());
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("Step '{}' panicked: {}", node.id, message);
            step.fail(format!("simulator panicked: {}", message), clock.elapsed());
        }
    }

    step
}

/// Extracts the text of a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
