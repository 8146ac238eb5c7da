//! jm-engine: the pipeline execution model (C5-C10, C12) — stages, once-
//! runners, post hooks, the running/template split, and the report sink
//! that ties a finished run back to disk.

pub mod event;
pub mod executable;
pub mod executor;
pub mod fs_copy;
pub mod once_runner;
pub mod pipeline;
pub mod post;
pub mod report;
pub mod stage;
pub mod stages;
pub mod store;

pub use event::Event;
pub use executable::{Cache, Cd, Executable, Inline, ResetDir, Sh, CMD_OUT_KEY};
pub use executor::Executor;
pub use once_runner::OnceRunner;
pub use pipeline::{execute_pipeline, AgentProvider, PipelineId, PipelineTemplate, RunningPipeline};
pub use post::Post;
pub use report::{ReportSink, ReportType};
pub use stage::Stage;
pub use stages::Stages;
pub use store::PipelineStore;

#[cfg(test)]
pub(crate) mod test_support;
