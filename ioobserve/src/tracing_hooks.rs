//! Tracing-based pipeline hooks.
//!
//! ```rust
//! use iochat::PipelineHooks;
//! use ioobserve::TracingPipelineHooks;
//!
//! fn accepts_hooks(_hooks: &dyn PipelineHooks) {}
//!
//! accepts_hooks(&TracingPipelineHooks);
//! ```

use std::time::Duration;

use iochat::{ChatError, ChatOperation, ChatPhase, PipelineHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPipelineHooks;

impl PipelineHooks for TracingPipelineHooks {
    fn on_step_start(&self, phase: ChatPhase) {
        tracing::debug!(phase = "pipeline", event = "step_start", step = phase.as_str());
    }

    fn on_step_success(&self, phase: ChatPhase, elapsed: Duration) {
        tracing::debug!(
            phase = "pipeline",
            event = "step_success",
            step = phase.as_str(),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_step_failure(&self, phase: ChatPhase, error: &ChatError, elapsed: Duration) {
        tracing::error!(
            phase = "pipeline",
            event = "step_failure",
            step = phase.as_str(),
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            category = ?error.category(),
            retryable = error.is_retryable(),
            error = %error
        );
    }

    fn on_request_complete(
        &self,
        operation: ChatOperation,
        error: Option<&ChatError>,
        elapsed: Duration,
    ) {
        match error {
            None => tracing::info!(
                phase = "request",
                event = "complete",
                operation = operation.as_str(),
                elapsed_ms = elapsed.as_millis() as u64
            ),
            Some(error) => tracing::warn!(
                phase = "request",
                event = "failed",
                operation = operation.as_str(),
                elapsed_ms = elapsed.as_millis() as u64,
                failed_step = error.phase.map(ChatPhase::as_str),
                error_kind = ?error.kind
            ),
        }
    }
}
