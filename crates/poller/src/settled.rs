use settle_core::SettleError;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Completion of a [`Poller::wait`](crate::Poller::wait). Resolves at most once.
#[must_use = "a settle wait does nothing observable unless awaited"]
pub struct Settled<T> {
    rx: oneshot::Receiver<Result<T, SettleError>>,
}

impl<T> Settled<T> {
    pub(crate) fn new(rx: oneshot::Receiver<Result<T, SettleError>>) -> Self {
        Self { rx }
    }
}

impl<T> Future for Settled<T> {
    type Output = Result<T, SettleError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().rx).poll(cx).map(|received| {
            received.unwrap_or_else(|_| Err(SettleError::host("flush task was dropped before the wait resolved")))
        })
    }
}
