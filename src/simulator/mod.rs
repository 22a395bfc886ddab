//! Service Simulator Module
//!
//! The engine never talks to real services. Every step is delegated to a
//! [`ServiceSimulator`], a synchronous call that either returns a result
//! value or a [`SimulatorError`].
//!
//! - [`scripted`]: Configurable simulator with canned responses and
//!   failure injection

pub mod scripted;

pub use scripted::{CannedResponse, FailureRule, ScenarioConfig, ScriptedSimulator, SimulatorCall};

use thiserror::Error;

use crate::workflow::{Parameters, Value};

/// Errors a simulated service call can raise.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulatorError {
    #[error("unknown service '{0}'")]
    UnknownService(String),

    #[error("service '{service}' does not support action '{action}'")]
    UnsupportedAction { service: String, action: String },

    #[error("missing required parameter '{0}'")]
    MissingParameter(String),

    /// Failure reported by the service itself.
    #[error("{message}")]
    Service { error_type: String, message: String },
}

impl SimulatorError {
    /// Creates a service-side failure with the generic error type.
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            error_type: "connector_error".to_string(),
            message: message.into(),
        }
    }

    /// Machine-readable category of the failure.
    pub fn error_type(&self) -> &str {
        match self {
            Self::UnknownService(_) => "unknown_service",
            Self::UnsupportedAction { .. } => "unsupported_action",
            Self::MissingParameter(_) => "missing_parameter",
            Self::Service { error_type, .. } => error_type,
        }
    }
}

/// Stand-in for a real service call.
///
/// Implementations may keep internal state (call counters for failure
/// injection), which is why `run` takes `&mut self`. Give each run a fresh
/// instance; the engine never resets one.
pub trait ServiceSimulator {
    fn run(
        &mut self,
        service: &str,
        action: &str,
        parameters: &Parameters,
    ) -> Result<Value, SimulatorError>;
}

impl<F> ServiceSimulator for F
where
    F: FnMut(&str, &str, &Parameters) -> Result<Value, SimulatorError>,
{
    fn run(
        &mut self,
        service: &str,
        action: &str,
        parameters: &Parameters,
    ) -> Result<Value, SimulatorError> {
        self(service, action, parameters)
    }
}
