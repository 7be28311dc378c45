use futures::FutureExt;
use log::{debug, warn};
use settle_core::{PollConfig, SettleError, SettleHost, Waiter, WaiterRegistry};
use serde_json::json;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::oneshot;
use tokio::time::timeout;

use crate::cycle::{PollCycle, panic_message};
use crate::settled::Settled;

static NEXT_WAIT_ID: AtomicU64 = AtomicU64::new(1);

/// Detects when a host has gone quiet.
///
/// Every [`Poller::wait`] starts its own poll cycle with its own timer; the
/// waiter registry is the only state cycles share.
pub struct Poller<H: ?Sized> {
    host: Arc<H>,
    waiters: WaiterRegistry,
    config: PollConfig,
}

impl<H: ?Sized> Clone for Poller<H> {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
            waiters: self.waiters.clone(),
            config: self.config.clone(),
        }
    }
}

impl<H> Poller<H>
where
    H: SettleHost + ?Sized + 'static,
{
    /// Poller with a fresh, empty waiter registry and default config.
    pub fn new(host: Arc<H>) -> Self {
        Self::with_registry(host, WaiterRegistry::new())
    }

    /// Poller sharing `waiters` with whoever else holds the registry.
    pub fn with_registry(host: Arc<H>, waiters: WaiterRegistry) -> Self {
        Self {
            host,
            waiters,
            config: PollConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PollConfig) -> Self {
        self.config = config;
        self
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    pub fn waiters(&self) -> &WaiterRegistry {
        &self.waiters
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    pub fn register_waiter(&self, waiter: impl Waiter + 'static) {
        self.waiters.register(waiter);
    }

    /// Resolve with `value` once every probe reports idle on the same tick.
    ///
    /// Polling starts immediately on a spawned task, so this must be called
    /// from within a tokio runtime. The value is delivered through the
    /// host's [`SettleHost::schedule_flush`], never straight from the tick.
    /// Dropping the returned future does not stop the cycle.
    pub fn wait<T>(&self, value: T) -> Settled<T>
    where
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let id = NEXT_WAIT_ID.fetch_add(1, Ordering::Relaxed);
        let deadline = self.config.deadline();
        let deadline_ms = self.config.deadline_ms;
        let cycle = PollCycle {
            id,
            host: Arc::clone(&self.host),
            waiters: self.waiters.clone(),
            config: self.config.clone(),
        };

        debug!("wait#{}: polling every {:?}", id, cycle.config.interval());

        tokio::spawn(async move {
            // a host probe that panics ends this cycle; report it instead of
            // letting the channel close
            let guarded = AssertUnwindSafe(cycle.run()).catch_unwind().map(|result| {
                result.unwrap_or_else(|payload| {
                    Err(SettleError::probe(format!(
                        "poll cycle panicked: {}",
                        panic_message(&*payload)
                    )))
                })
            });

            let outcome = match deadline {
                Some(limit) => match timeout(limit, guarded).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(SettleError::timeout(format!(
                        "app did not settle within {}ms",
                        limit.as_millis()
                    ))
                    .with_context(json!({ "deadline_ms": deadline_ms }))),
                },
                None => guarded.await,
            };

            match outcome {
                Ok(_) => {
                    cycle.host.schedule_flush(Box::new(move || {
                        // receiver may be gone; the wait is still complete
                        let _ = tx.send(Ok(value));
                    }));
                }
                Err(err) => {
                    warn!("wait#{}: {}", id, err);
                    let _ = tx.send(Err(err));
                }
            }
        });

        Settled::new(rx)
    }
}
