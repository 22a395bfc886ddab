//! Execution Report
//!
//! Aggregates a finished trace into status counts and wall-clock timing,
//! and renders the result as JSON or Markdown.

use std::fmt::Write as _;
use std::time::Instant;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use super::trace::{ExecutionTrace, StepStatus, TraceStep};
use crate::error::EngineError;

/// Terminal-status counts for one run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total_steps: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Summary {
    /// Counts terminal statuses across the steps.
    pub fn from_steps(steps: &[TraceStep]) -> Self {
        let mut summary = Self {
            total_steps: steps.len(),
            ..Self::default()
        };

        for step in steps {
            match step.status {
                StepStatus::Success => summary.successful += 1,
                StepStatus::Failed => summary.failed += 1,
                StepStatus::Skipped => summary.skipped += 1,
                StepStatus::Pending | StepStatus::Running => {}
            }
        }

        summary
    }

    /// Fraction of steps that succeeded, 0.0 for an empty run.
    pub fn success_rate(&self) -> f64 {
        if self.total_steps == 0 {
            return 0.0;
        }
        self.successful as f64 / self.total_steps as f64
    }
}

/// Final, read-only result of one run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub workflow_name: String,
    pub trace: ExecutionTrace,
    pub summary: Summary,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_duration_ms: u64,
}

impl ExecutionReport {
    /// Looks up a step by node ID.
    pub fn step(&self, node_id: &str) -> Option<&TraceStep> {
        self.trace.step(node_id)
    }

    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }

    pub fn to_json_pretty(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(self).map_err(|e| EngineError::Encode {
            format: "JSON",
            message: e.to_string(),
        })
    }

    /// Renders a human-readable report.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let s = &self.summary;

        let _ = writeln!(out, "# Execution Report: {}\n", self.workflow_name);
        let _ = writeln!(out, "| Total | Successful | Failed | Skipped |");
        let _ = writeln!(out, "|-------|------------|--------|---------|");
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |\n",
            s.total_steps, s.successful, s.failed, s.skipped
        );
        let _ = writeln!(out, "Total duration: {} ms\n", self.total_duration_ms);

        let _ = writeln!(out, "## Steps\n");
        for (position, step) in self.trace.steps.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. **{}** `{}.{}` [{}] ({} ms)",
                position + 1,
                step.node_id,
                step.service,
                step.action,
                step.status,
                step.duration_ms
            );
            if let Some(error) = &step.error {
                let _ = writeln!(out, "   - error: {}", error);
            }
        }

        if !self.trace.dependency_violations.is_empty() {
            let _ = writeln!(out, "\n## Dependency Violations\n");
            for violation in &self.trace.dependency_violations {
                let _ = writeln!(out, "- {}", violation);
            }
        }

        out
    }
}

/// Captures the run's start and turns the finished trace into a report.
#[derive(Debug)]
pub struct ReportBuilder {
    workflow_name: String,
    start_time: DateTime<Utc>,
    clock: Instant,
}

impl ReportBuilder {
    /// Starts the run clock.
    pub fn start(workflow_name: impl Into<String>) -> Self {
        Self {
            workflow_name: workflow_name.into(),
            start_time: Utc::now(),
            clock: Instant::now(),
        }
    }

    /// Finalizes the report. The duration is the run's wall-clock span,
    /// not the sum of step durations.
    pub fn finish(self, trace: ExecutionTrace) -> ExecutionReport {
        let total_duration_ms = u64::try_from(self.clock.elapsed().as_millis()).unwrap_or(u64::MAX);
        let summary = Summary::from_steps(&trace.steps);

        info!(
            "Run '{}' finished in {} ms: {} successful, {} failed, {} skipped",
            self.workflow_name, total_duration_ms, summary.successful, summary.failed, summary.skipped
        );

        ExecutionReport {
            workflow_name: self.workflow_name,
            trace,
            summary,
            start_time: self.start_time,
            end_time: Utc::now(),
            total_duration_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::NodeSpec;
    use std::thread;
    use std::time::Duration;

    fn step(id: &str, status: StepStatus) -> TraceStep {
        let mut step = TraceStep::pending(&NodeSpec::new(id, "hr", "lookup"));
        match status {
            StepStatus::Success => {
                step.mark_running();
                step.succeed(None, Duration::from_millis(1));
            }
            StepStatus::Failed => {
                step.mark_running();
                step.fail("boom", Duration::from_millis(1));
            }
            StepStatus::Skipped => step.skip("upstream failure: x"),
            _ => {}
        }
        step
    }

    fn sample_trace() -> ExecutionTrace {
        ExecutionTrace {
            steps: vec![
                step("a", StepStatus::Success),
                step("b", StepStatus::Failed),
                step("c", StepStatus::Success),
                step("d", StepStatus::Skipped),
            ],
            dependency_violations: vec!["Edge 'a' -> 'Z' references unknown node 'Z'".into()],
        }
    }

    #[test]
    fn test_summary_counts() {
        let summary = Summary::from_steps(&sample_trace().steps);
        assert_eq!(
            summary,
            Summary {
                total_steps: 4,
                successful: 2,
                failed: 1,
                skipped: 1
            }
        );
        assert_eq!(summary.success_rate(), 0.5);
    }

    #[test]
    fn test_summary_empty() {
        let summary = Summary::from_steps(&[]);
        assert_eq!(summary.total_steps, 0);
        assert_eq!(summary.success_rate(), 0.0);
    }

    #[test]
    fn test_builder_measures_wall_clock() {
        let builder = ReportBuilder::start("timed");
        thread::sleep(Duration::from_millis(30));
        let report = builder.finish(sample_trace());

        // Step durations sum to 3 ms; the span covers the sleep
        assert!(report.total_duration_ms >= 30);
        assert!(report.end_time >= report.start_time);
        assert_eq!(report.workflow_name, "timed");
        assert!(report.has_failures());
    }

    #[test]
    fn test_report_json_shape() {
        let report = ReportBuilder::start("shape").finish(sample_trace());
        let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();

        assert_eq!(json["workflow_name"], "shape");
        assert_eq!(json["summary"]["total_steps"], 4);
        assert_eq!(json["trace"]["steps"][1]["status"], "failed");
        assert_eq!(json["trace"]["dependency_violations"].as_array().unwrap().len(), 1);
        assert!(json.get("start_time").is_some());
        assert!(json.get("end_time").is_some());
        assert!(json.get("total_duration_ms").is_some());
    }

    #[test]
    fn test_markdown_rendering() {
        let report = ReportBuilder::start("onboarding").finish(sample_trace());
        let markdown = report.to_markdown();

        assert!(markdown.contains("# Execution Report: onboarding"));
        assert!(markdown.contains("| 4 | 2 | 1 | 1 |"));
        assert!(markdown.contains("2. **b** `hr.lookup` [failed]"));
        assert!(markdown.contains("error: boom"));
        assert!(markdown.contains("## Dependency Violations"));
    }
}
