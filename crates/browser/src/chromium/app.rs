use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use log::{debug, trace};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use settle_core::{DomEvent, ElementInfo, FlushTask, Rect, SettleError, SettleHost, TestApp};
use tokio::sync::Mutex;

use super::launch;
use crate::shared::{BrowserOptions, is_context_lost, js, to_settle_error};

/// Handle to an element in the page's element table. Handles do not survive
/// a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BrowserElement(pub(crate) u64);

impl BrowserElement {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// A web app driven in a real Chromium page.
///
/// The settle probes read counters kept by a script injected into every
/// document: fetch and XHR calls in flight, timers that have not fired, and
/// whether the document is still loading.
pub struct ChromiumApp {
    browser: Mutex<Browser>,
    page: Page,
    options: BrowserOptions,
}

impl ChromiumApp {
    pub async fn launch(options: BrowserOptions) -> Result<Self, SettleError> {
        let browser = launch::launch(&options).await?;
        let page = browser.new_page("about:blank").await
            .map_err(|e| SettleError::browser(format!("New page failed: {}", e)))?;
        launch::install_probes(&page).await?;

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            options,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn options(&self) -> &BrowserOptions {
        &self.options
    }

    pub async fn close(&self) -> Result<(), SettleError> {
        let mut browser = self.browser.lock().await;
        browser.close().await.map_err(|e| to_settle_error(e, "Close"))?;
        debug!("chromium closed");
        Ok(())
    }

    async fn call(&self, func: &str, args: &[Value], action: &str) -> Result<Value, SettleError> {
        let js = js::build_js_call(func, args);
        let result = self.page.evaluate(js).await
            .map_err(|e| to_settle_error(e, action))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    /// Like `call`, but a lost context means the page is mid-navigation,
    /// which `busy` stands in for.
    async fn probe<T: DeserializeOwned>(&self, func: &str, busy: T, action: &str) -> Result<T, SettleError> {
        let js = js::build_js_call(func, &[]);
        match self.page.evaluate(js).await {
            Ok(result) => serde_json::from_value(result.value().cloned().unwrap_or(Value::Null))
                .map_err(|e| SettleError::parsing(format!("{} returned unexpected value: {}", action, e))),
            Err(e) if is_context_lost(&e) => {
                trace!("{} hit a lost context, reporting busy", action);
                Ok(busy)
            }
            Err(e) => Err(to_settle_error(e, action)),
        }
    }

    async fn call_on(
        &self,
        element: &BrowserElement,
        func: &str,
        extra: &[Value],
        action: &str,
    ) -> Result<Value, SettleError> {
        let mut args = vec![json!(element.0)];
        args.extend_from_slice(extra);
        let value = self.call(func, &args, action).await?;

        if value.get("missing").and_then(|v| v.as_bool()).unwrap_or(false) {
            return Err(SettleError::host(format!("{}: element {} is no longer in the page", action, element.0))
                .with_context(json!({ "element": element.0 })));
        }
        Ok(value)
    }
}

#[async_trait]
impl SettleHost for ChromiumApp {
    async fn is_transition_active(&self) -> Result<bool, SettleError> {
        self.probe(js::probe::TRANSITION, true, "TransitionProbe").await
    }

    async fn pending_request_count(&self) -> Result<usize, SettleError> {
        self.probe(js::probe::PENDING_REQUESTS, 1, "PendingProbe").await
    }

    async fn has_scheduled_work(&self) -> Result<bool, SettleError> {
        self.probe(js::probe::SCHEDULED_WORK, true, "TimerProbe").await
    }

    fn schedule_flush(&self, task: FlushTask) {
        tokio::spawn(async move { task() });
    }
}

#[async_trait]
impl TestApp for ChromiumApp {
    type Element = BrowserElement;

    fn root_selector(&self) -> &str {
        &self.options.root_selector
    }

    async fn query(&self, selector: &str, context: &str) -> Result<Vec<BrowserElement>, SettleError> {
        let value = self.call(js::element::QUERY, &[json!(selector), json!(context)], "Query").await?;
        let ids: Vec<u64> = serde_json::from_value(value)
            .map_err(|e| SettleError::parsing(format!("Query returned unexpected value: {}", e))
                .with_context(json!({ "selector": selector, "context": context })))?;
        Ok(ids.into_iter().map(BrowserElement).collect())
    }

    async fn element_info(&self, element: &BrowserElement) -> Result<ElementInfo, SettleError> {
        let value = self.call_on(element, js::element::ELEMENT_INFO, &[], "ElementInfo").await?;
        serde_json::from_value(value)
            .map_err(|e| SettleError::parsing(format!("ElementInfo returned unexpected value: {}", e)))
    }

    async fn bounding_rect(&self, element: &BrowserElement) -> Result<Rect, SettleError> {
        let value = self.call_on(element, js::element::BOUNDING_RECT, &[], "BoundingRect").await?;
        serde_json::from_value(value)
            .map_err(|e| SettleError::parsing(format!("BoundingRect returned unexpected value: {}", e)))
    }

    async fn dispatch(&self, element: &BrowserElement, event: &DomEvent) -> Result<(), SettleError> {
        let event_json = serde_json::to_value(event)
            .map_err(|e| SettleError::parsing(format!("Event did not serialize: {}", e)))?;
        self.call_on(element, js::element::DISPATCH_EVENT, &[event_json], "Dispatch").await?;
        Ok(())
    }

    async fn focus(&self, element: &BrowserElement) -> Result<(), SettleError> {
        self.call_on(element, js::element::FOCUS, &[], "Focus").await?;
        Ok(())
    }

    async fn set_value(&self, element: &BrowserElement, value: &str) -> Result<(), SettleError> {
        self.call_on(element, js::element::SET_VALUE, &[json!(value)], "SetValue").await?;
        Ok(())
    }

    async fn advance_readiness(&self, initial_url: &str) -> Result<(), SettleError> {
        self.handle_url(initial_url).await
    }

    /// The browser's location is only changed by navigating, which
    /// `handle_url` does.
    async fn set_url(&self, _url: &str) -> Result<(), SettleError> {
        Ok(())
    }

    async fn handle_url(&self, url: &str) -> Result<(), SettleError> {
        let target = self.options.resolve(url);
        debug!("navigating to {}", target);

        tokio::time::timeout(self.options.navigation, self.page.goto(target.clone()))
            .await
            .map_err(|_| {
                SettleError::timeout(format!(
                    "Navigation to {} timed out after {}ms",
                    target,
                    self.options.navigation.as_millis()
                ))
                .with_context(json!({ "url": target }))
            })?
            .map_err(|e| SettleError::navigation(format!("Navigation failed: {}", e))
                .with_context(json!({ "url": target })))?;
        Ok(())
    }

    async fn current_route_name(&self) -> Result<Option<String>, SettleError> {
        let Some(expression) = &self.options.route_name_expression else {
            return Ok(None);
        };
        let result = self.page.evaluate(expression.clone()).await
            .map_err(|e| to_settle_error(e, "RouteName"))?;
        Ok(result.value().and_then(|v| v.as_str()).map(str::to_string))
    }

    async fn current_path(&self) -> Result<Option<String>, SettleError> {
        let location = self.call(js::probe::LOCATION, &[], "Location").await?;
        Ok(location.get("pathname").and_then(|v| v.as_str()).map(str::to_string))
    }

    async fn current_url(&self) -> Result<String, SettleError> {
        let location = self.call(js::probe::LOCATION, &[], "Location").await?;
        let part = |key: &str| location.get(key).and_then(|v| v.as_str()).unwrap_or_default().to_string();
        Ok(format!("{}{}{}", part("pathname"), part("search"), part("hash")))
    }
}
