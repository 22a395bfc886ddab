//! Scripted Service Simulator
//!
//! A deterministic simulator driven by a [`ScenarioConfig`]:
//! - Canned results per service (optionally per action)
//! - Failure injection, on every call or only on the Nth call
//! - Optional blocking latency per call
//! - A log of every call for assertions
//!
//! # Example YAML Scenario
//!
//! ```yaml
//! latency_ms: 0
//! strict: false
//! responses:
//!   - service: slack
//!     action: create_channel
//!     result: { channel_id: C123 }
//! failures:
//!   - service: jira
//!     action: create_issue
//!     on_call: 2
//!     message: JIRA is down
//!     error_type: service_unavailable
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{ServiceSimulator, SimulatorError};
use crate::error::EngineError;
use crate::workflow::{DocumentFormat, Parameters, Value};

fn default_failure_message() -> String {
    "simulated failure".to_string()
}

fn default_error_type() -> String {
    "connector_error".to_string()
}

/// Fixed result returned for matching calls.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CannedResponse {
    pub service: String,
    /// Matches every action of the service when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default)]
    pub result: Value,
}

/// Failure-injection rule.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FailureRule {
    pub service: String,

    /// Matches every action of the service when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    /// Parameters that must all be present with equal values
    #[serde(default, skip_serializing_if = "Parameters::is_empty")]
    pub when: Parameters,

    /// Only fail on this (1-based) call of the service/action pair
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_call: Option<u32>,

    #[serde(default = "default_failure_message")]
    pub message: String,

    #[serde(default = "default_error_type")]
    pub error_type: String,
}

impl FailureRule {
    /// A rule failing every call to `service.action`.
    pub fn new(
        service: impl Into<String>,
        action: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            action: Some(action.into()),
            when: Parameters::new(),
            on_call: None,
            message: message.into(),
            error_type: default_error_type(),
        }
    }

    /// Restricts the rule to the Nth call.
    pub fn on_call(mut self, call: u32) -> Self {
        self.on_call = Some(call);
        self
    }

    /// Restricts the rule to calls carrying `key = value`.
    pub fn when_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.when.insert(key.into(), value.into());
        self
    }

    pub fn with_error_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = error_type.into();
        self
    }

    fn matches(&self, service: &str, action: &str, parameters: &Parameters, call: u32) -> bool {
        self.service == service
            && self.action.as_deref().map_or(true, |a| a == action)
            && self.on_call.map_or(true, |n| n == call)
            && self
                .when
                .iter()
                .all(|(key, expected)| parameters.get(key) == Some(expected))
    }
}

/// Behaviour of a [`ScriptedSimulator`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Blocking delay applied to every call
    pub latency_ms: u64,
    /// Reject services with no response and no failure rule
    pub strict: bool,
    pub responses: Vec<CannedResponse>,
    pub failures: Vec<FailureRule>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, EngineError> {
        serde_yaml::from_str(content).map_err(|e| EngineError::Parse {
            format: "YAML",
            message: e.to_string(),
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self, EngineError> {
        serde_json::from_str(content).map_err(|e| EngineError::Parse {
            format: "JSON",
            message: e.to_string(),
        })
    }

    /// Loads a scenario file; the extension picks YAML or JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match DocumentFormat::from_path(path) {
            DocumentFormat::Yaml => Self::from_yaml_str(&content),
            DocumentFormat::Json => Self::from_json_str(&content),
        }
    }

    fn knows_service(&self, service: &str) -> bool {
        self.responses.iter().any(|r| r.service == service)
            || self.failures.iter().any(|f| f.service == service)
    }
}

/// One recorded simulator invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorCall {
    pub service: String,
    pub action: String,
    pub parameters: Parameters,
}

/// Deterministic simulator whose output is a pure function of the call
/// and its per-(service, action) call count.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSimulator {
    config: ScenarioConfig,
    counters: HashMap<(String, String), u32>,
    calls: Vec<SimulatorCall>,
}

impl ScriptedSimulator {
    /// Creates a simulator that echoes every call back as a success.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: ScenarioConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Registers a canned result for `service.action`.
    pub fn with_response(
        mut self,
        service: impl Into<String>,
        action: impl Into<String>,
        result: impl Into<Value>,
    ) -> Self {
        self.config.responses.push(CannedResponse {
            service: service.into(),
            action: Some(action.into()),
            result: result.into(),
        });
        self
    }

    /// Makes every call to `service.action` fail.
    pub fn failing(
        self,
        service: impl Into<String>,
        action: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.with_failure(FailureRule::new(service, action, message))
    }

    pub fn with_failure(mut self, rule: FailureRule) -> Self {
        self.config.failures.push(rule);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.config.latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn strict(mut self) -> Self {
        self.config.strict = true;
        self
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// All calls received, in order.
    pub fn calls(&self) -> &[SimulatorCall] {
        &self.calls
    }

    /// Number of calls received for `service.action`.
    pub fn call_count(&self, service: &str, action: &str) -> u32 {
        self.counters
            .get(&(service.to_string(), action.to_string()))
            .copied()
            .unwrap_or(0)
    }

    fn canned_response(&self, service: &str, action: &str) -> Option<&Value> {
        let exact = self
            .config
            .responses
            .iter()
            .find(|r| r.service == service && r.action.as_deref() == Some(action));

        exact
            .or_else(|| {
                self.config
                    .responses
                    .iter()
                    .find(|r| r.service == service && r.action.is_none())
            })
            .map(|r| &r.result)
    }
}

impl ServiceSimulator for ScriptedSimulator {
    fn run(
        &mut self,
        service: &str,
        action: &str,
        parameters: &Parameters,
    ) -> Result<Value, SimulatorError> {
        let counter = self
            .counters
            .entry((service.to_string(), action.to_string()))
            .or_insert(0);
        *counter += 1;
        let call = *counter;

        self.calls.push(SimulatorCall {
            service: service.to_string(),
            action: action.to_string(),
            parameters: parameters.clone(),
        });

        debug!("Simulating {}.{} (call {})", service, action, call);

        if self.config.latency_ms > 0 {
            thread::sleep(Duration::from_millis(self.config.latency_ms));
        }

        if self.config.strict && !self.config.knows_service(service) {
            return Err(SimulatorError::UnknownService(service.to_string()));
        }

        if let Some(rule) = self
            .config
            .failures
            .iter()
            .find(|rule| rule.matches(service, action, parameters, call))
        {
            return Err(SimulatorError::Service {
                error_type: rule.error_type.clone(),
                message: rule.message.clone(),
            });
        }

        if let Some(result) = self.canned_response(service, action) {
            return Ok(result.clone());
        }

        if self.config.strict {
            return Err(SimulatorError::UnsupportedAction {
                service: service.to_string(),
                action: action.to_string(),
            });
        }

        let mut echo = Parameters::new();
        echo.insert("service".to_string(), Value::from(service));
        echo.insert("action".to_string(), Value::from(action));
        echo.insert("parameters".to_string(), Value::Map(parameters.clone()));
        echo.insert("call".to_string(), Value::from(call));
        Ok(Value::Map(echo))
    }
}
