//! Build pipeline.
/// Fetch → filter → fan-out → manifest → cleanup
mod orchestrator;
/// Pipeline type definitions
mod types;

pub use orchestrator::Pipeline;
pub use types::{
    BuildReport,
    PipelineError,
    PipelineState,
};
