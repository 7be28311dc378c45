use async_trait::async_trait;
use log::{debug, info, warn};
use settle_core::{DomEvent, ElementInfo, FlushTask, Rect, SettleError, SettleHost, TestApp};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::dom::{self, FixtureElement};

/// Reaction to a dispatched event. Gets the app so it can start simulated
/// async work (requests, timers, transitions).
pub type EventHandler = Arc<dyn Fn(&FixtureApp, &DomEvent) + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub element: FixtureElement,
    pub event: DomEvent,
}

#[derive(Debug, Clone)]
struct Route {
    url: String,
    name: String,
    path: String,
}

#[derive(Debug, Default)]
struct RouterState {
    url: String,
    booted: bool,
    deferrals: usize,
    routes: Vec<Route>,
    current: Option<Route>,
}

#[derive(Debug, Default)]
struct DomState {
    values: HashMap<FixtureElement, String>,
    focused: Option<FixtureElement>,
    events: Vec<RecordedEvent>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Decrements a shared counter when dropped.
struct Busy(Arc<AtomicUsize>);

impl Busy {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for Busy {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// In-memory application: static markup, a route table and counters standing
/// in for transitions, requests, timers and the run loop.
///
/// Simulated work is spawned on the current tokio runtime, so the paused
/// test clock drives it.
pub struct FixtureApp {
    markup: String,
    root: String,
    transition_delay: Duration,
    router: Arc<Mutex<RouterState>>,
    dom: Mutex<DomState>,
    handlers: Mutex<Vec<(String, String, EventHandler)>>,
    transitions: Arc<AtomicUsize>,
    pending: Arc<AtomicUsize>,
    timers: Arc<AtomicUsize>,
    run_loop: Arc<AtomicUsize>,
}

impl FixtureApp {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            root: "body".to_string(),
            transition_delay: Duration::ZERO,
            router: Arc::new(Mutex::new(RouterState::default())),
            dom: Mutex::new(DomState::default()),
            handlers: Mutex::new(Vec::new()),
            transitions: Arc::new(AtomicUsize::new(0)),
            pending: Arc::new(AtomicUsize::new(0)),
            timers: Arc::new(AtomicUsize::new(0)),
            run_loop: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_root(mut self, selector: impl Into<String>) -> Self {
        self.root = selector.into();
        self
    }

    /// Route whose path is its name.
    pub fn with_route(self, url: &str, name: &str) -> Self {
        self.with_nested_route(url, name, name)
    }

    /// Route reporting a separate full path, e.g. `posts.index` for `posts`.
    pub fn with_nested_route(self, url: &str, name: &str, path: &str) -> Self {
        lock(&self.router).routes.push(Route {
            url: url.to_string(),
            name: name.to_string(),
            path: path.to_string(),
        });
        self
    }

    /// How long each route transition stays in flight.
    pub fn with_transition_delay(mut self, delay: Duration) -> Self {
        self.transition_delay = delay;
        self
    }

    pub fn with_readiness_deferrals(self, count: usize) -> Self {
        lock(&self.router).deferrals = count;
        self
    }

    /// React to `event_type` events dispatched on elements matching `selector`.
    pub fn on<F>(&self, selector: &str, event_type: &str, handler: F)
    where
        F: Fn(&FixtureApp, &DomEvent) + Send + Sync + 'static,
    {
        lock(&self.handlers).push((selector.to_string(), event_type.to_string(), Arc::new(handler)));
    }

    pub fn begin_transition(&self) {
        self.transitions.fetch_add(1, Ordering::SeqCst);
    }

    pub fn end_transition(&self) {
        let _ = self
            .transitions
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    pub fn start_request(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    pub fn finish_request(&self) {
        let _ = self
            .pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    /// A request that completes on its own after `latency`.
    pub fn request_for(&self, latency: Duration) {
        let request = Busy::enter(&self.pending);
        tokio::spawn(async move {
            sleep(latency).await;
            drop(request);
        });
    }

    /// A timer that fires after `delay`.
    pub fn schedule_timer(&self, delay: Duration) {
        let timer = Busy::enter(&self.timers);
        tokio::spawn(async move {
            sleep(delay).await;
            drop(timer);
        });
    }

    /// Run `f` inside a run-loop frame.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        let _frame = Busy::enter(&self.run_loop);
        f()
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn is_booted(&self) -> bool {
        lock(&self.router).booted
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        lock(&self.dom).events.clone()
    }

    pub fn event_types(&self) -> Vec<String> {
        lock(&self.dom).events.iter().map(|r| r.event.event_type.clone()).collect()
    }

    pub fn focused(&self) -> Option<FixtureElement> {
        lock(&self.dom).focused
    }

    /// Value set by a helper, else the markup's `value` attribute.
    pub fn value_of(&self, element: FixtureElement) -> Result<Option<String>, SettleError> {
        if let Some(value) = lock(&self.dom).values.get(&element) {
            return Ok(Some(value.clone()));
        }
        dom::attr(&self.markup, element, "value")
    }

    pub fn attr_of(&self, element: FixtureElement, name: &str) -> Result<Option<String>, SettleError> {
        dom::attr(&self.markup, element, name)
    }

    fn route_for(&self, url: &str) -> Option<Route> {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        lock(&self.router).routes.iter().find(|r| r.url == path).cloned()
    }
}

#[async_trait]
impl SettleHost for FixtureApp {
    async fn is_transition_active(&self) -> Result<bool, SettleError> {
        Ok(self.transitions.load(Ordering::SeqCst) > 0)
    }

    async fn pending_request_count(&self) -> Result<usize, SettleError> {
        Ok(self.pending.load(Ordering::SeqCst))
    }

    async fn has_scheduled_work(&self) -> Result<bool, SettleError> {
        Ok(self.timers.load(Ordering::SeqCst) > 0 || self.run_loop.load(Ordering::SeqCst) > 0)
    }

    fn schedule_flush(&self, task: FlushTask) {
        let run_loop = Arc::clone(&self.run_loop);
        tokio::spawn(async move {
            let _frame = Busy::enter(&run_loop);
            task();
        });
    }
}

#[async_trait]
impl TestApp for FixtureApp {
    type Element = FixtureElement;

    fn root_selector(&self) -> &str {
        &self.root
    }

    async fn query(&self, selector: &str, context: &str) -> Result<Vec<FixtureElement>, SettleError> {
        dom::query(&self.markup, selector, context)
    }

    async fn element_info(&self, element: &FixtureElement) -> Result<ElementInfo, SettleError> {
        dom::info(&self.markup, *element)
    }

    async fn bounding_rect(&self, element: &FixtureElement) -> Result<Rect, SettleError> {
        dom::rect(&self.markup, *element)
    }

    async fn dispatch(&self, element: &FixtureElement, event: &DomEvent) -> Result<(), SettleError> {
        lock(&self.dom).events.push(RecordedEvent {
            element: *element,
            event: event.clone(),
        });

        let candidates: Vec<(String, EventHandler)> = lock(&self.handlers)
            .iter()
            .filter(|(_, ty, _)| *ty == event.event_type)
            .map(|(selector, _, handler)| (selector.clone(), Arc::clone(handler)))
            .collect();

        for (selector, handler) in candidates {
            let selector = dom::parse_selector(&selector)?;
            if dom::matches(&self.markup, *element, &selector) {
                self.run(|| handler(self, event));
            }
        }
        Ok(())
    }

    async fn focus(&self, element: &FixtureElement) -> Result<(), SettleError> {
        lock(&self.dom).focused = Some(*element);
        Ok(())
    }

    async fn set_value(&self, element: &FixtureElement, value: &str) -> Result<(), SettleError> {
        lock(&self.dom).values.insert(*element, value.to_string());
        Ok(())
    }

    async fn boot(&self) -> Result<(), SettleError> {
        let mut router = lock(&self.router);
        if !router.booted {
            debug!("fixture booted");
            router.booted = true;
        }
        Ok(())
    }

    fn readiness_deferrals(&self) -> usize {
        lock(&self.router).deferrals
    }

    async fn advance_readiness(&self, initial_url: &str) -> Result<(), SettleError> {
        let ready = {
            let mut router = lock(&self.router);
            router.deferrals = router.deferrals.saturating_sub(1);
            router.deferrals == 0
        };
        if ready {
            self.handle_url(initial_url).await?;
        }
        Ok(())
    }

    async fn set_url(&self, url: &str) -> Result<(), SettleError> {
        lock(&self.router).url = url.to_string();
        Ok(())
    }

    async fn handle_url(&self, url: &str) -> Result<(), SettleError> {
        let route = self.route_for(url);
        match &route {
            Some(r) => info!("transition to {} ({})", r.name, url),
            None => warn!("no route for {}", url),
        }

        let transition = Busy::enter(&self.transitions);
        let router = Arc::clone(&self.router);
        let delay = self.transition_delay;
        let url = url.to_string();
        tokio::spawn(async move {
            sleep(delay).await;
            let mut router = lock(&router);
            router.url = url;
            router.current = route;
            drop(transition);
        });
        Ok(())
    }

    async fn current_route_name(&self) -> Result<Option<String>, SettleError> {
        Ok(lock(&self.router).current.as_ref().map(|r| r.name.clone()))
    }

    async fn current_path(&self) -> Result<Option<String>, SettleError> {
        Ok(lock(&self.router).current.as_ref().map(|r| r.path.clone()))
    }

    async fn current_url(&self) -> Result<String, SettleError> {
        Ok(lock(&self.router).url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settle_core::{EventKind, EventOptions};
    use tokio::time::Instant;

    const PAGE: &str = r#"<html><body><button id="save">Save</button><input id="name" value="Ann"></body></html>"#;

    fn click_event() -> DomEvent {
        DomEvent {
            event_type: "click".into(),
            kind: EventKind::Mouse,
            init: EventOptions::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_request_clears_after_latency() {
        let app = FixtureApp::new(PAGE);
        app.request_for(Duration::from_millis(30));
        assert_eq!(app.pending_request_count().await.unwrap(), 1);

        sleep(Duration::from_millis(31)).await;
        assert_eq!(app.pending_request_count().await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn timers_and_run_loop_count_as_scheduled_work() {
        let app = FixtureApp::new(PAGE);
        assert!(!app.has_scheduled_work().await.unwrap());

        app.schedule_timer(Duration::from_millis(5));
        assert!(app.has_scheduled_work().await.unwrap());
        sleep(Duration::from_millis(6)).await;
        assert!(!app.has_scheduled_work().await.unwrap());

        let inside = app.run(|| app.run_loop.load(Ordering::SeqCst));
        assert_eq!(inside, 1);
        assert_eq!(app.run_loop.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn handle_url_transitions_for_the_configured_delay() {
        let app = FixtureApp::new(PAGE)
            .with_nested_route("/posts", "posts", "posts.index")
            .with_transition_delay(Duration::from_millis(20));
        let start = Instant::now();

        app.handle_url("/posts?page=2").await.unwrap();
        assert!(app.is_transition_active().await.unwrap());
        assert_eq!(app.current_route_name().await.unwrap(), None);

        while app.is_transition_active().await.unwrap() {
            sleep(Duration::from_millis(1)).await;
        }
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert_eq!(app.current_route_name().await.unwrap().as_deref(), Some("posts"));
        assert_eq!(app.current_path().await.unwrap().as_deref(), Some("posts.index"));
        assert_eq!(app.current_url().await.unwrap(), "/posts?page=2");
    }

    #[tokio::test]
    async fn dispatch_records_and_runs_matching_handlers() {
        let app = FixtureApp::new(PAGE);
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let hits = Arc::clone(&hits);
            app.on("#save", "click", move |app, _| {
                hits.fetch_add(1, Ordering::SeqCst);
                app.start_request();
            });
        }
        app.on("#name", "click", |_, _| panic!("wrong element"));

        let save = app.query("#save", "body").await.unwrap()[0];
        app.dispatch(&save, &click_event()).await.unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(app.pending_requests(), 1);
        assert_eq!(app.event_types(), vec!["click"]);
        assert_eq!(app.events()[0].element, save);
    }

    #[tokio::test]
    async fn values_fall_back_to_markup() {
        let app = FixtureApp::new(PAGE);
        let name = app.query("#name", "body").await.unwrap()[0];
        assert_eq!(app.value_of(name).unwrap().as_deref(), Some("Ann"));

        app.set_value(&name, "Bo").await.unwrap();
        assert_eq!(app.value_of(name).unwrap().as_deref(), Some("Bo"));
    }

    #[tokio::test]
    async fn readiness_routes_only_after_last_deferral() {
        let app = FixtureApp::new(PAGE).with_route("/", "index").with_readiness_deferrals(2);

        app.advance_readiness("/").await.unwrap();
        assert_eq!(app.readiness_deferrals(), 1);
        assert!(!app.is_transition_active().await.unwrap());

        app.advance_readiness("/").await.unwrap();
        assert_eq!(app.readiness_deferrals(), 0);
        assert!(app.is_transition_active().await.unwrap());
    }
}
