use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use super::scheduler::Scheduler;
use super::types::TickOutcome;

/// Longest single sleep, so cancellation is noticed promptly.
const MAX_SLEEP: Duration = Duration::from_millis(50);

/// When a blocking [`run`] should give up.
#[derive(Clone, Debug, Default)]
pub struct RunLimits {
    pub max_ticks: Option<u64>,
    pub deadline: Option<Instant>,
    pub cancel: Option<Arc<AtomicBool>>,
}

impl RunLimits {
    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Acquire))
    }

    fn past_deadline(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub published: u64,
    pub failed: u64,
}

/// Drive the scheduler's live ticks on the current thread.
///
/// Sleeps until each scheduled tick is due and runs it. Returns once no
/// tick is scheduled (static source, stop, or lost device) or a limit is
/// reached.
pub fn run(scheduler: &mut Scheduler, limits: &RunLimits) -> RunSummary {
    let mut summary = RunSummary::default();

    while let Some(tick) = scheduler.pending_tick() {
        if limits.max_ticks.is_some_and(|max| summary.ticks >= max) || limits.cancelled() {
            break;
        }

        let now = Instant::now();
        if limits.past_deadline(now) {
            break;
        }
        if tick.due > now {
            std::thread::sleep((tick.due - now).min(MAX_SLEEP));
            continue;
        }

        match scheduler.run_tick(tick.token) {
            TickOutcome::Published => summary.published += 1,
            TickOutcome::Failed => summary.failed += 1,
            TickOutcome::Stale => continue,
        }
        summary.ticks += 1;
    }

    debug!(
        ticks = summary.ticks,
        published = summary.published,
        failed = summary.failed,
        "Run loop finished"
    );
    summary
}
