use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use iochat::{ChatError, ChatOperation, ChatPhase, PipelineHooks};

/// Runs the wrapped hooks with panics contained, so a faulty observer never
/// fails a chat request.
pub struct SafePipelineHooks<H> {
    inner: H,
}

impl<H> SafePipelineHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H> PipelineHooks for SafePipelineHooks<H>
where
    H: PipelineHooks,
{
    fn on_step_start(&self, phase: ChatPhase) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_step_start(phase)));
    }

    fn on_step_success(&self, phase: ChatPhase, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_step_success(phase, elapsed)
        }));
    }

    fn on_step_failure(&self, phase: ChatPhase, error: &ChatError, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_step_failure(phase, error, elapsed)
        }));
    }

    fn on_request_complete(
        &self,
        operation: ChatOperation,
        error: Option<&ChatError>,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_request_complete(operation, error, elapsed)
        }));
    }
}
