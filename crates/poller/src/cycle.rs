use log::{debug, trace, warn};
use settle_core::{PollConfig, SettleError, SettleHost, WaiterRegistry};
use serde_json::json;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

/// Why a tick did not settle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Busy {
    Transition,
    PendingRequests(usize),
    ScheduledWork,
    /// Index of the first busy waiter, in registration order
    Waiter(usize),
}

/// Outcome of sampling every probe once
#[derive(Debug, Clone)]
pub enum Tick {
    Idle,
    Busy(Busy),
    /// A probe failed; the tick counts as busy.
    Faulted(SettleError),
}

/// Evaluate the probes cheapest-first, stopping at the first that is busy
/// or fails.
pub async fn sample<H>(host: &H, waiters: &WaiterRegistry) -> Tick
where
    H: SettleHost + ?Sized,
{
    match host.is_transition_active().await {
        Ok(true) => return Tick::Busy(Busy::Transition),
        Ok(false) => {}
        Err(e) => return Tick::Faulted(e),
    }

    match host.pending_request_count().await {
        Ok(0) => {}
        Ok(n) => return Tick::Busy(Busy::PendingRequests(n)),
        Err(e) => return Tick::Faulted(e),
    }

    match host.has_scheduled_work().await {
        Ok(true) => return Tick::Busy(Busy::ScheduledWork),
        Ok(false) => {}
        Err(e) => return Tick::Faulted(e),
    }

    for (idx, waiter) in waiters.snapshot().iter().enumerate() {
        match panic::catch_unwind(AssertUnwindSafe(|| waiter.is_busy())) {
            Ok(Ok(true)) => return Tick::Busy(Busy::Waiter(idx)),
            Ok(Ok(false)) => {}
            Ok(Err(e)) => return Tick::Faulted(e),
            Err(payload) => {
                return Tick::Faulted(
                    SettleError::probe(format!("waiter {} panicked: {}", idx, panic_message(&*payload)))
                        .with_context(json!({ "waiter": idx })),
                );
            }
        }
    }

    Tick::Idle
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// One timer-driven sequence of sample steps, owned by a single wait.
pub(crate) struct PollCycle<H: ?Sized> {
    pub(crate) id: u64,
    pub(crate) host: Arc<H>,
    pub(crate) waiters: WaiterRegistry,
    pub(crate) config: PollConfig,
}

impl<H> PollCycle<H>
where
    H: SettleHost + ?Sized,
{
    /// Ticks until every probe is idle. Returns the number of ticks taken.
    pub(crate) async fn run(&self) -> Result<u64, SettleError> {
        let period = self.config.interval();
        // first sample one period out, like a platform interval timer
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut ticks: u64 = 0;
        let mut faults: u32 = 0;
        let mut last_busy = None;

        loop {
            ticker.tick().await;
            ticks += 1;

            match sample(&*self.host, &self.waiters).await {
                Tick::Idle => {
                    debug!("wait#{}: settled after {} ticks", self.id, ticks);
                    return Ok(ticks);
                }
                Tick::Busy(reason) => {
                    faults = 0;
                    if last_busy != Some(reason) {
                        trace!("wait#{}: busy ({:?})", self.id, reason);
                        last_busy = Some(reason);
                    }
                }
                Tick::Faulted(err) => {
                    faults += 1;
                    last_busy = None;
                    warn!("wait#{}: probe failed on tick {} ({} in a row): {}", self.id, ticks, faults, err);

                    if let Some(max) = self.config.probe_error_limit() {
                        if faults >= max {
                            return Err(SettleError::probe(format!(
                                "probes failed on {} consecutive ticks, last error: {}",
                                faults, err.message
                            ))
                            .with_context(json!({
                                "ticks": ticks,
                                "consecutive_faults": faults,
                                "last_error": err,
                            })));
                        }
                    }
                }
            }
        }
    }
}
