use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::SettleError;

/// A caller-registered probe. `Ok(true)` means "busy, keep waiting".
pub trait Waiter: Send + Sync {
    fn is_busy(&self) -> Result<bool, SettleError>;
}

impl<F> Waiter for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_busy(&self) -> Result<bool, SettleError> {
        Ok(self())
    }
}

/// Predicate evaluated against a tracked object rather than captured state.
pub struct Bound<T, F> {
    context: Arc<T>,
    predicate: F,
}

impl<T, F> Bound<T, F> {
    pub fn new(context: Arc<T>, predicate: F) -> Self {
        Self { context, predicate }
    }
}

impl<T, F> Waiter for Bound<T, F>
where
    T: Send + Sync,
    F: Fn(&T) -> bool + Send + Sync,
{
    fn is_busy(&self) -> Result<bool, SettleError> {
        Ok((self.predicate)(&self.context))
    }
}

/// Predicate that can fail. Failures surface as probe errors on the tick.
pub struct Fallible<F>(pub F);

impl<F, E> Waiter for Fallible<F>
where
    F: Fn() -> Result<bool, E> + Send + Sync,
    E: fmt::Display,
{
    fn is_busy(&self) -> Result<bool, SettleError> {
        (self.0)().map_err(|e| SettleError::probe(format!("waiter failed: {}", e)))
    }
}

/// Append-only set of waiters shared by every poller holding a clone.
///
/// Registrations become visible to running poll cycles on their next tick.
/// Independent registries never see each other's waiters.
#[derive(Clone, Default)]
pub struct WaiterRegistry {
    waiters: Arc<RwLock<Vec<Arc<dyn Waiter>>>>,
}

impl WaiterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, waiter: impl Waiter + 'static) {
        self.waiters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(waiter));
    }

    pub fn register_with<T, F>(&self, context: Arc<T>, predicate: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.register(Bound::new(context, predicate));
    }

    pub fn register_fallible<F, E>(&self, predicate: F)
    where
        F: Fn() -> Result<bool, E> + Send + Sync + 'static,
        E: fmt::Display + 'static,
    {
        self.register(Fallible(predicate));
    }

    pub fn len(&self) -> usize {
        self.waiters.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current waiters in registration order. The lock is released before
    /// any predicate runs, so a predicate may register further waiters.
    pub fn snapshot(&self) -> Vec<Arc<dyn Waiter>> {
        self.waiters.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl fmt::Debug for WaiterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaiterRegistry").field("waiters", &self.len()).finish()
    }
}
