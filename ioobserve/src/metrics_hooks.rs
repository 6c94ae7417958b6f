//! Metrics-based pipeline hooks.
//!
//! Counters and histograms are named `io_pipeline_*` and labelled by step or
//! operation; a process without a recorder installed drops them.

use std::time::Duration;

use iochat::{ChatError, ChatOperation, ChatPhase, PipelineHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsPipelineHooks;

impl PipelineHooks for MetricsPipelineHooks {
    fn on_step_start(&self, phase: ChatPhase) {
        metrics::counter!("io_pipeline_step_start_total", "step" => phase.as_str()).increment(1);
    }

    fn on_step_success(&self, phase: ChatPhase, elapsed: Duration) {
        metrics::counter!("io_pipeline_step_success_total", "step" => phase.as_str())
            .increment(1);
        metrics::histogram!("io_pipeline_step_duration_seconds", "step" => phase.as_str())
            .record(elapsed.as_secs_f64());
    }

    fn on_step_failure(&self, phase: ChatPhase, error: &ChatError, elapsed: Duration) {
        metrics::counter!(
            "io_pipeline_step_failure_total",
            "step" => phase.as_str(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!("io_pipeline_step_duration_seconds", "step" => phase.as_str())
            .record(elapsed.as_secs_f64());
    }

    fn on_request_complete(
        &self,
        operation: ChatOperation,
        error: Option<&ChatError>,
        elapsed: Duration,
    ) {
        let outcome = if error.is_some() { "error" } else { "ok" };
        metrics::counter!(
            "io_pipeline_requests_total",
            "operation" => operation.as_str(),
            "outcome" => outcome
        )
        .increment(1);
        metrics::histogram!(
            "io_pipeline_request_duration_seconds",
            "operation" => operation.as_str()
        )
        .record(elapsed.as_secs_f64());
    }
}
