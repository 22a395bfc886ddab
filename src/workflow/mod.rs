//! Graph Definition Module
//!
//! Provides data structures and utilities for decoding, validating, and
//! ordering step-dependency documents.
//!
//! # Structure
//!
//! - [`model`]: Wire-format structures (GraphDocument, NodeSpec, Value)
//! - [`parser`]: JSON/YAML decoding and file loading
//! - [`graph`]: Validated graph with forward/backward adjacency
//! - [`validator`]: Duplicate and dangling-reference checks
//! - [`planner`]: Topological scheduling and cycle detection

pub mod graph;
pub mod model;
pub mod parser;
pub mod planner;
pub mod validator;

pub use graph::Graph;
pub use model::{EdgeSpec, GraphDocument, NodeSpec, Parameters, Value};
pub use parser::{load_document, save_document, DocumentFormat};
pub use planner::{order, Schedule};
pub use validator::{parse_and_validate, Violation};
