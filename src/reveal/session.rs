//! Flashing session timers.
//!
//! One tokio task per flashing session drives both the periodic tick and
//! the one-shot completion. Cancelling the session token stops both.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, trace};

use super::machine::Shared;

/// Handle to a live (or finished) session task.
#[derive(Debug)]
pub(crate) struct SessionHandle {
    session: u64,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Arms the timers for `session`.
    ///
    /// The first tick lands one `interval` after `started`; completion lands
    /// `total_flashes × interval` after `started`. Deadlines too far out to
    /// represent are clamped, so such a session simply never completes.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub(crate) fn spawn(
        shared: Arc<Shared>,
        session: u64,
        total_flashes: u32,
        interval: Duration,
        started: Instant,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(
            run(shared, session, total_flashes, interval, started, token)
                .instrument(tracing::info_span!("session", id = session)),
        );
        Self {
            session,
            cancel,
            task,
        }
    }

    /// Stops both timers. Idempotent.
    pub(crate) fn cancel(&self) {
        trace!(session = self.session, "cancelling session timers");
        self.cancel.cancel();
    }

    /// Returns `true` once the task has exited.
    pub(crate) fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Upper bound on how far ahead a timer is armed. Offsets beyond it are
/// clamped so `Instant` arithmetic cannot overflow.
const MAX_TIMER_OFFSET: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `base + offset`, clamped to [`MAX_TIMER_OFFSET`].
fn deadline(base: Instant, offset: Duration) -> Instant {
    let offset = offset.min(MAX_TIMER_OFFSET);
    base.checked_add(offset).unwrap_or(base)
}

async fn run(
    shared: Arc<Shared>,
    session: u64,
    total_flashes: u32,
    interval: Duration,
    started: Instant,
    cancel: CancellationToken,
) {
    let completion = tokio::time::sleep_until(deadline(
        started,
        interval.saturating_mul(total_flashes),
    ));
    let mut next_tick = deadline(started, interval);
    let tick = tokio::time::sleep_until(next_tick);
    tokio::pin!(completion, tick);

    loop {
        // Completion is polled before the ticker: a tick due at the same
        // instant as completion is never applied.
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                trace!(session, "session cancelled");
                break;
            }
            () = &mut completion => {
                shared.complete(session);
                break;
            }
            () = &mut tick => {
                if !shared.tick(session) {
                    trace!(session, "stale session, stopping timers");
                    break;
                }
                // Missed ticks fire back to back, keeping the original grid.
                next_tick = deadline(next_tick, interval);
                tick.as_mut().reset(next_tick);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_adds_offset() {
        let base = Instant::now();
        assert_eq!(
            deadline(base, Duration::from_millis(120)),
            base + Duration::from_millis(120)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_clamps_huge_offsets() {
        let base = Instant::now();
        assert_eq!(deadline(base, Duration::MAX), base + MAX_TIMER_OFFSET);
        let far = deadline(base, Duration::from_millis(u64::MAX).saturating_mul(u32::MAX));
        assert_eq!(far, base + MAX_TIMER_OFFSET);
    }
}
