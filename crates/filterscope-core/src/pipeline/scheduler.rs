use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::capture::{DeviceOpener, NoCaptureBackend};
use crate::config::PreviewConfig;
use crate::error::{FilterError, SourceError};
use crate::filters::{self, FilterKind, FilterSpec};
use crate::frame::Frame;
use crate::source::{FrameSource, SourceRequest};
use crate::viewport::{render, RenderedView, ViewportId};

use super::types::{
    Cadence, FramePair, NoOpSink, PipelineSnapshot, PipelineState, RunState, ScheduledTick,
    StatusEvent, StatusSink, TickOutcome, TickToken,
};

/// Owns the active source, the active filter and the published frame pair.
///
/// All work happens on the caller's thread. For a live source the scheduler
/// hands out one [`ScheduledTick`] at a time; the caller waits until it is
/// due and passes its token to [`run_tick`](Self::run_tick). Stopping or
/// switching sources cancels the outstanding token.
pub struct Scheduler {
    config: PreviewConfig,
    source: FrameSource,
    opener: Box<dyn DeviceOpener>,
    sink: Box<dyn StatusSink>,
    state: PipelineState,
    pending: Option<ScheduledTick>,
    next_token: u64,
    next_sequence: u64,
}

impl Scheduler {
    pub fn new(config: PreviewConfig) -> Self {
        let (filter, notices) = config.filter.sanitized();
        for notice in notices {
            warn!("Configured filter adjusted: {notice}");
        }
        Self {
            config,
            source: FrameSource::Closed,
            opener: Box::new(NoCaptureBackend),
            sink: Box::new(NoOpSink),
            state: PipelineState {
                filter,
                ..PipelineState::default()
            },
            pending: None,
            next_token: 0,
            next_sequence: 0,
        }
    }

    pub fn with_opener(mut self, opener: Box<dyn DeviceOpener>) -> Self {
        self.opener = opener;
        self
    }

    pub fn with_status_sink(mut self, sink: impl StatusSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Detached copy of the current state.
    pub fn snapshot(&self) -> PipelineSnapshot {
        self.state.clone()
    }

    pub fn source(&self) -> &FrameSource {
        &self.source
    }

    pub fn run_state(&self) -> RunState {
        self.state.run_state
    }

    pub fn pending_tick(&self) -> Option<ScheduledTick> {
        self.pending
    }

    /// Switch to a new source and publish its first frame.
    ///
    /// A static image that fails to decode leaves everything as it was. A
    /// live device that fails to open leaves the source closed and the
    /// scheduler idle.
    pub fn set_source(&mut self, request: SourceRequest) -> Result<(), SourceError> {
        info!(source = %request, "Switching source");
        self.pending = None;

        let opened = match &request {
            SourceRequest::Static(path) => self.source.open_static(path),
            SourceRequest::Live(index) => self.source.open_live(
                self.opener.as_mut(),
                *index,
                self.config.read_failure_threshold,
            ),
        };

        if let Err(e) = opened {
            warn!(source = %request, "Could not open source: {e}");
            if self.source.is_closed() {
                self.state.run_state = RunState::Idle;
            } else {
                self.schedule_next();
            }
            self.state.last_error = Some(e.clone());
            self.emit(StatusEvent::SourceError(e.clone()));
            return Err(e);
        }

        let live = self.source.is_live();
        self.state.run_state = RunState::Running(if live { Cadence::Live } else { Cadence::Dormant });
        self.state.viewports.reset();
        self.state.last_error = None;
        self.emit(StatusEvent::SourceOpened {
            description: self.source.describe(),
            live,
        });

        self.poll_and_publish();
        self.schedule_next();
        Ok(())
    }

    /// Make `spec` the active filter and re-filter the cached frame.
    pub fn set_filter(&mut self, spec: FilterSpec) {
        let (spec, notices) = spec.sanitized();
        for notice in notices {
            warn!("{notice}");
            self.emit(StatusEvent::FilterAdjusted(notice));
        }

        info!(filter = %spec, "Filter selected");
        self.state.filter = spec.clone();
        self.emit(StatusEvent::FilterChanged(spec));
        self.refilter();
    }

    /// Update one parameter of the active filter.
    ///
    /// Returns `Ok(false)` without doing anything when `kind` is not the
    /// active filter. Out-of-range values are clamped and reported through
    /// the status sink.
    pub fn set_parameter(&mut self, kind: FilterKind, name: &str, value: f64) -> Result<bool, FilterError> {
        if self.state.filter.kind() != kind {
            debug!(%kind, name, "Ignoring parameter for inactive filter");
            return Ok(false);
        }

        if let Some(notice) = self.state.filter.set_parameter(name, value)? {
            warn!("{notice}");
            self.emit(StatusEvent::FilterAdjusted(notice));
        }
        debug!(filter = %self.state.filter, "Parameter updated");
        self.refilter();
        Ok(true)
    }

    pub fn pan(&mut self, viewport: ViewportId, dx: f32, dy: f32) {
        self.state.viewports.get_mut(viewport).pan_by(dx, dy);
    }

    pub fn zoom(&mut self, viewport: ViewportId, factor: f32) {
        self.state.viewports.get_mut(viewport).zoom_by(factor);
    }

    /// Set an absolute zoom, clamped to the allowed range.
    pub fn set_zoom(&mut self, viewport: ViewportId, zoom: f32) {
        self.state.viewports.get_mut(viewport).set_zoom(zoom);
    }

    /// Release the source and cancel any scheduled tick.
    ///
    /// The last published pair stays available for display.
    pub fn stop(&mut self) {
        self.pending = None;
        self.source.close();
        if self.state.run_state != RunState::Idle {
            info!("Pipeline stopped");
            self.state.run_state = RunState::Idle;
            self.emit(StatusEvent::Stopped);
        }
    }

    /// Execute the tick identified by `token`, if it is still the current one.
    pub fn run_tick(&mut self, token: TickToken) -> TickOutcome {
        match self.pending {
            Some(tick) if tick.token == token => self.pending = None,
            _ => return TickOutcome::Stale,
        }

        let outcome = self.poll_and_publish();
        self.schedule_next();
        outcome
    }

    /// Scale the cached frame for `viewport` by that view's zoom.
    pub fn render(&self, viewport: ViewportId) -> Option<RenderedView> {
        let pair = self.state.frames.as_ref()?;
        let frame = match viewport {
            ViewportId::Original => &pair.original,
            ViewportId::Filtered => &pair.filtered,
        };
        Some(render(
            frame,
            self.state.viewports.get(viewport),
            self.config.resample,
        ))
    }

    fn poll_and_publish(&mut self) -> TickOutcome {
        self.state.stats.polls += 1;

        match self.source.poll() {
            Ok(frame) => {
                self.state.last_error = None;
                self.next_sequence += 1;
                self.publish(Arc::new(frame), self.next_sequence);
                TickOutcome::Published
            }
            Err(e) => {
                match &e {
                    SourceError::ReadFailed { .. } => self.state.stats.read_failures += 1,
                    _ if e.is_fatal() => {
                        self.pending = None;
                        self.state.run_state = RunState::Idle;
                    }
                    _ => {}
                }
                self.state.last_error = Some(e.clone());
                self.emit(StatusEvent::SourceError(e));
                TickOutcome::Failed
            }
        }
    }

    fn refilter(&mut self) {
        if let Some(pair) = self.state.frames.clone() {
            self.publish(Arc::clone(&pair.original), pair.sequence);
        }
    }

    /// Filter `original` and replace the published pair in one assignment.
    fn publish(&mut self, original: Arc<Frame>, sequence: u64) {
        let filter = self.state.filter.clone();
        let filtered = Arc::new(filters::apply(&original, &filter));
        self.state.stats.filter_passes += 1;

        let (width, height) = (original.width(), original.height());
        self.state.frames = Some(Arc::new(FramePair {
            original,
            filtered,
            sequence,
            filter: filter.clone(),
        }));
        self.state.stats.publications += 1;

        debug!(sequence, width, height, filter = %filter, "Published frame pair");
        self.emit(StatusEvent::FramePublished {
            sequence,
            width,
            height,
            filter,
        });
    }

    fn schedule_next(&mut self) {
        if self.state.run_state != RunState::Running(Cadence::Live) {
            self.pending = None;
            return;
        }
        self.next_token += 1;
        self.pending = Some(ScheduledTick {
            token: TickToken(self.next_token),
            due: Instant::now() + self.config.tick_interval(),
        });
    }

    fn emit(&self, event: StatusEvent) {
        self.sink.notify(&event);
    }
}
