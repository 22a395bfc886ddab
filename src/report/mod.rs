//! Trace & Report Module
//!
//! Records per-step outcomes during a run and builds the final report.
//!
//! # Components
//!
//! - [`TraceRecorder`]: Ordered step outcomes plus dependency violations
//! - [`ReportBuilder`]: Status counts and wall-clock timing

pub mod summary;
pub mod trace;

pub use summary::{ExecutionReport, ReportBuilder, Summary};
pub use trace::{ExecutionTrace, StepStatus, TraceRecorder, TraceStep};
