use std::sync::Arc;
use std::time::Instant;

use crate::error::{FilterError, SourceError};
use crate::filters::FilterSpec;
use crate::frame::Frame;
use crate::viewport::Viewports;

/// How the scheduler keeps itself going while running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cadence {
    /// Re-polls the source every tick interval.
    Live,
    /// Static source: one pass, then waits for a filter change or a new source.
    Dormant,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Idle,
    Running(Cadence),
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Running(Cadence::Live) => write!(f, "Running (live)"),
            Self::Running(Cadence::Dormant) => write!(f, "Running (static)"),
        }
    }
}

/// An original frame and its filtered counterpart from the same poll.
#[derive(Clone, Debug)]
pub struct FramePair {
    pub original: Arc<Frame>,
    pub filtered: Arc<Frame>,
    /// Poll that produced `original`. Re-filtering keeps the number.
    pub sequence: u64,
    /// Filter that produced `filtered`.
    pub filter: FilterSpec,
}

/// Identifies one scheduled tick. Only the most recently scheduled token
/// is honoured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickToken(pub(crate) u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledTick {
    pub token: TickToken,
    pub due: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// A new pair was published.
    Published,
    /// The poll failed; the previous pair is still current.
    Failed,
    /// The token was cancelled or superseded; nothing ran.
    Stale,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub polls: u64,
    pub read_failures: u64,
    pub filter_passes: u64,
    pub publications: u64,
}

/// Everything the scheduler knows, as a plain value.
///
/// Cloning is cheap: frames are shared, not copied. A clone taken with
/// [`Scheduler::snapshot`](super::Scheduler::snapshot) is what a reader on
/// another thread should hold.
#[derive(Clone, Debug, Default)]
pub struct PipelineState {
    pub run_state: RunState,
    pub filter: FilterSpec,
    pub frames: Option<Arc<FramePair>>,
    pub viewports: Viewports,
    pub last_error: Option<SourceError>,
    pub stats: PipelineStats,
}

/// A detached copy of [`PipelineState`] handed to readers.
pub type PipelineSnapshot = PipelineState;

/// Something worth telling the user about, typically as status-bar text.
#[derive(Clone, Debug)]
pub enum StatusEvent {
    SourceOpened { description: String, live: bool },
    FramePublished {
        sequence: u64,
        width: usize,
        height: usize,
        filter: FilterSpec,
    },
    FilterChanged(FilterSpec),
    FilterAdjusted(FilterError),
    SourceError(SourceError),
    Stopped,
}

impl std::fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceOpened { description, live } => {
                if *live {
                    write!(f, "Webcam activated: {description}")
                } else {
                    write!(f, "Loaded: {description}")
                }
            }
            Self::FramePublished {
                sequence,
                width,
                height,
                filter,
            } => write!(f, "Frame {sequence} ({width}x{height}) - {filter}"),
            Self::FilterChanged(spec) => write!(f, "Filter: {spec}"),
            Self::FilterAdjusted(e) => write!(f, "Adjusted: {e}"),
            Self::SourceError(e) => write!(f, "Error: {e}"),
            Self::Stopped => write!(f, "Source stopped"),
        }
    }
}

/// Receives status events from the scheduler.
///
/// Closures taking `&StatusEvent` implement this directly.
pub trait StatusSink {
    fn notify(&self, event: &StatusEvent);
}

impl<F> StatusSink for F
where
    F: Fn(&StatusEvent),
{
    fn notify(&self, event: &StatusEvent) {
        self(event)
    }
}

/// Sink that drops every event.
pub struct NoOpSink;

impl StatusSink for NoOpSink {
    fn notify(&self, _event: &StatusEvent) {}
}
