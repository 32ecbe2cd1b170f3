mod driver;
mod scheduler;
mod types;

pub use driver::{run, RunLimits, RunSummary};
pub use scheduler::Scheduler;
pub use types::{
    Cadence, FramePair, NoOpSink, PipelineSnapshot, PipelineState, PipelineStats, RunState,
    ScheduledTick, StatusEvent, StatusSink, TickOutcome, TickToken,
};
