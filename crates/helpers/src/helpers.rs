use log::{debug, info};
use serde_json::json;
use settle_core::{EventKind, EventOptions, SettleError, TestApp};
use settle_poller::{Poller, Settled};
use std::sync::Arc;

use crate::events::{build_event, event_kind, is_focusable};
use crate::target::Target;

/// Test helpers bound to one application.
///
/// Every async helper performs its action and then waits for the app to
/// settle, so chained steps observe the results of the previous one.
pub struct Helpers<A> {
    app: Arc<A>,
    poller: Poller<A>,
}

impl<A> Clone for Helpers<A> {
    fn clone(&self) -> Self {
        Self {
            app: Arc::clone(&self.app),
            poller: self.poller.clone(),
        }
    }
}

impl<A> Helpers<A>
where
    A: TestApp + 'static,
{
    pub fn new(app: Arc<A>) -> Self {
        Self::with_poller(Poller::new(app))
    }

    /// Helpers driven by an existing poller (and its waiter registry).
    pub fn with_poller(poller: Poller<A>) -> Self {
        Self {
            app: Arc::clone(poller.host()),
            poller,
        }
    }

    pub fn app(&self) -> &Arc<A> {
        &self.app
    }

    pub fn poller(&self) -> &Poller<A> {
        &self.poller
    }

    /// Resolve with `value` once the app has settled.
    pub fn wait<T>(&self, value: T) -> Settled<T>
    where
        T: Send + 'static,
    {
        self.poller.wait(value)
    }

    /// Route to `url` as though the user navigated there.
    pub async fn visit(&self, url: &str) -> Result<(), SettleError> {
        info!("visit {}", url);
        self.app.boot().await?;
        self.app.set_url(url).await?;

        if self.app.readiness_deferrals() > 0 {
            self.app.advance_readiness(url).await?;
        } else {
            self.app.handle_url(url).await?;
        }

        self.wait(()).await
    }

    pub async fn click(&self, target: impl Into<Target>) -> Result<(), SettleError> {
        let target = target.into();
        let element = self.first(&target).await?;
        debug!("click {}", target);

        self.fire(&element, "mousedown", EventOptions::new()).await?;
        self.focus(&element).await?;
        self.fire(&element, "mouseup", EventOptions::new()).await?;
        self.fire(&element, "click", EventOptions::new()).await?;

        self.wait(()).await
    }

    pub async fn trigger_event(
        &self,
        target: impl Into<Target>,
        event_type: &str,
        options: EventOptions,
    ) -> Result<(), SettleError> {
        let target = target.into();
        let element = self.first(&target).await?;
        debug!("trigger {} on {}", event_type, target);

        self.fire(&element, event_type, options).await?;
        self.wait(()).await
    }

    /// Key event carrying `key_code` as both `keyCode` and `which`.
    pub async fn key_event(
        &self,
        target: impl Into<Target>,
        event_type: &str,
        key_code: u32,
    ) -> Result<(), SettleError> {
        self.trigger_event(target, event_type, EventOptions::new().key(key_code))
            .await
    }

    pub async fn fill_in(&self, target: impl Into<Target>, text: &str) -> Result<(), SettleError> {
        let target = target.into();
        let element = self.first(&target).await?;
        debug!("fill in {} with {:?}", target, text);

        self.focus(&element).await?;
        self.app.set_value(&element, text).await?;
        self.fire(&element, "input", EventOptions::new()).await?;
        self.fire(&element, "change", EventOptions::new()).await?;

        self.wait(()).await
    }

    /// Elements matching the target, scoped to the app's root element when
    /// the target has no context.
    pub async fn find(&self, target: impl Into<Target>) -> Result<Vec<A::Element>, SettleError> {
        let target = target.into();
        let context = target.context().unwrap_or_else(|| self.app.root_selector());
        self.app.query(target.selector(), context).await
    }

    /// Like [`Helpers::find`], but an empty result is an error.
    pub async fn find_with_assert(&self, target: impl Into<Target>) -> Result<Vec<A::Element>, SettleError> {
        let target = target.into();
        let found = self.find(target.clone()).await?;
        if found.is_empty() {
            let err = SettleError::element_not_found(target.selector());
            return Err(match target.context() {
                Some(context) => err.with_context(json!({ "selector": target.selector(), "context": context })),
                None => err,
            });
        }
        Ok(found)
    }

    /// Run `callback` against the app, then wait with its result.
    pub async fn and_then<T, F>(&self, callback: F) -> Result<T, SettleError>
    where
        F: FnOnce(&A) -> T,
        T: Send + 'static,
    {
        let value = callback(self.app.as_ref());
        self.wait(value).await
    }

    pub async fn current_route_name(&self) -> Result<Option<String>, SettleError> {
        self.app.current_route_name().await
    }

    pub async fn current_path(&self) -> Result<Option<String>, SettleError> {
        self.app.current_path().await
    }

    pub async fn current_url(&self) -> Result<String, SettleError> {
        self.app.current_url().await
    }

    /// Never resolves. Await it to freeze a test and inspect the app.
    pub async fn pause_test(&self) {
        info!("test paused");
        std::future::pending::<()>().await
    }

    async fn first(&self, target: &Target) -> Result<A::Element, SettleError> {
        let mut found = self.find_with_assert(target.clone()).await?;
        Ok(found.swap_remove(0))
    }

    async fn fire(&self, element: &A::Element, event_type: &str, options: EventOptions) -> Result<(), SettleError> {
        let rect = match event_kind(event_type) {
            EventKind::Mouse => Some(self.app.bounding_rect(element).await?),
            _ => None,
        };
        let event = build_event(event_type, options, rect);
        self.app.dispatch(element, &event).await
    }

    async fn focus(&self, element: &A::Element) -> Result<(), SettleError> {
        let info = self.app.element_info(element).await?;
        if is_focusable(&info) {
            self.app.focus(element).await?;
        }
        Ok(())
    }
}
