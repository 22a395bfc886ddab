//! FlowForge Engine - Workflow Graph Execution
//!
//! Takes a workflow described as a graph of steps, each naming a service,
//! an action and parameters, and runs it in dependency order against a
//! simulated service layer. The result is an auditable trace of what ran,
//! what failed and what was skipped.
//!
//! # Architecture
//!
//! The library is organized into four main modules:
//!
//! - [`workflow`]: Document model, parsing, validation and scheduling
//! - [`execution`]: Sequential run loop with failure cascading
//! - [`simulator`]: The service-call seam and a scriptable simulator
//! - [`report`]: Per-step trace and the final execution report
//!
//! # Example
//!
//! ```rust,no_run
//! use flowforge_engine::{load_document, Engine, ScenarioConfig, ScriptedSimulator};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load a workflow and a failure scenario from YAML
//!     let document = load_document("onboarding.yaml")?;
//!     let scenario = ScenarioConfig::load("scenario.yaml")?;
//!
//!     let mut engine = Engine::new(document);
//!     engine.set_observer(|event| println!("{:?}", event));
//!
//!     let report = engine.run(&mut ScriptedSimulator::from_config(scenario))?;
//!     println!("{}", report.to_markdown());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod execution;
pub mod report;
pub mod simulator;
pub mod workflow;

// Re-export commonly used types
pub use error::EngineError;
pub use execution::{execute_workflow, CyclePolicy, Engine, EngineConfig, ExecutionEvent};
pub use report::{ExecutionReport, ExecutionTrace, StepStatus, Summary, TraceStep};
pub use simulator::{FailureRule, ScenarioConfig, ScriptedSimulator, ServiceSimulator, SimulatorError};
pub use workflow::{load_document, save_document, EdgeSpec, GraphDocument, NodeSpec, Parameters, Value, Violation};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name, as reported in logs
pub const APP_NAME: &str = "FlowForge";
