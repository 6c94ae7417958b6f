use std::sync::Arc;
use std::time::Duration;

use iochat::{ChatError, ChatOperation, ChatPhase, PipelineHooks};

/// Forwards every callback to each registered hook set, in registration order.
#[derive(Clone, Default)]
pub struct FanoutPipelineHooks {
    hooks: Vec<Arc<dyn PipelineHooks>>,
}

impl FanoutPipelineHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, hooks: impl PipelineHooks + 'static) -> Self {
        self.hooks.push(Arc::new(hooks));
        self
    }

    pub fn push(&mut self, hooks: Arc<dyn PipelineHooks>) {
        self.hooks.push(hooks);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl PipelineHooks for FanoutPipelineHooks {
    fn on_step_start(&self, phase: ChatPhase) {
        for hooks in &self.hooks {
            hooks.on_step_start(phase);
        }
    }

    fn on_step_success(&self, phase: ChatPhase, elapsed: Duration) {
        for hooks in &self.hooks {
            hooks.on_step_success(phase, elapsed);
        }
    }

    fn on_step_failure(&self, phase: ChatPhase, error: &ChatError, elapsed: Duration) {
        for hooks in &self.hooks {
            hooks.on_step_failure(phase, error, elapsed);
        }
    }

    fn on_request_complete(
        &self,
        operation: ChatOperation,
        error: Option<&ChatError>,
        elapsed: Duration,
    ) {
        for hooks in &self.hooks {
            hooks.on_request_complete(operation, error, elapsed);
        }
    }
}
