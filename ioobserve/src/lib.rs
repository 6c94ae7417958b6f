//! Production-friendly observability hooks for the chat pipeline.
//!
//! ```rust
//! use ioobserve::{MetricsPipelineHooks, SafePipelineHooks, TracingPipelineHooks};
//!
//! let _hooks = SafePipelineHooks::new(TracingPipelineHooks);
//! let _metrics = MetricsPipelineHooks;
//! ```

mod fanout;
mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use fanout::FanoutPipelineHooks;
pub use metrics_hooks::MetricsPipelineHooks;
pub use safe_hooks::SafePipelineHooks;
pub use tracing_hooks::TracingPipelineHooks;

pub mod prelude {
    pub use crate::{
        FanoutPipelineHooks, MetricsPipelineHooks, SafePipelineHooks, TracingPipelineHooks,
    };
}
