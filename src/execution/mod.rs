//! Workflow Execution Module
//!
//! Runs a validated graph one node at a time against a service simulator.
//!
//! # Architecture
//!
//! - [`engine`]: Main run loop and engine configuration
//! - [`cascade`]: Skip decisions for nodes with failed or skipped dependencies
//! - [`step`]: Individual step execution inside a failure boundary
//! - [`events`]: Progress events delivered to an optional observer

pub mod cascade;
pub mod engine;
pub mod events;
pub mod step;

pub use cascade::{CascadePolicy, Verdict};
pub use engine::{execute_workflow, CyclePolicy, Engine, EngineConfig};
pub use events::ExecutionEvent;
pub use step::execute_step;
