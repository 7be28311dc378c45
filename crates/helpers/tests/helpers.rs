use settle_core::{ErrorCategory, EventKind, EventOptions, TestApp};
use settle_fixture::FixtureApp;
use settle_helpers::{Helpers, Target};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::{Instant, timeout};

const PAGE: &str = r#"
<html><body>
  <div id="app">
    <form id="post">
      <input id="title" type="text" data-rect="10,20,300,24">
      <input id="draft" type="checkbox">
      <button id="save" class="go" data-rect="40,80,60,20">Save</button>
    </form>
    <div id="sidebar"><a class="go" href="/other">Other</a></div>
    <div id="banner">Hello</div>
  </div>
  <div id="outside" class="go"></div>
</body></html>
"#;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn helpers(app: FixtureApp) -> Helpers<FixtureApp> {
    init_logs();
    Helpers::new(Arc::new(app))
}

#[tokio::test(start_paused = true)]
async fn visit_waits_for_the_route_transition() {
    let h = helpers(
        FixtureApp::new(PAGE)
            .with_nested_route("/posts", "posts", "posts.index")
            .with_transition_delay(Duration::from_millis(30)),
    );
    let start = Instant::now();

    h.visit("/posts").await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(30));
    assert!(h.app().is_booted());
    assert_eq!(h.current_route_name().await.unwrap().as_deref(), Some("posts"));
    assert_eq!(h.current_path().await.unwrap().as_deref(), Some("posts.index"));
    assert_eq!(h.current_url().await.unwrap(), "/posts");
}

#[tokio::test(start_paused = true)]
async fn visit_supplies_initial_url_while_readiness_is_deferred() {
    let h = helpers(FixtureApp::new(PAGE).with_route("/", "index").with_readiness_deferrals(1));

    h.visit("/").await.unwrap();

    assert_eq!(h.app().readiness_deferrals(), 0);
    assert_eq!(h.current_route_name().await.unwrap().as_deref(), Some("index"));
}

#[tokio::test(start_paused = true)]
async fn click_fires_mouse_sequence_and_waits_for_triggered_work() {
    let app = FixtureApp::new(PAGE);
    app.on("#save", "click", |app, _| app.request_for(Duration::from_millis(40)));
    let h = helpers(app);
    let start = Instant::now();

    h.click("#save").await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(40));
    assert_eq!(h.app().pending_requests(), 0);
    assert_eq!(h.app().event_types(), vec!["mousedown", "mouseup", "click"]);

    let save = h.find("#save").await.unwrap()[0];
    assert_eq!(h.app().focused(), Some(save));

    let click = &h.app().events()[2].event;
    assert_eq!(click.kind, EventKind::Mouse);
    assert_eq!(click.init.client_x, Some(41.0));
    assert_eq!(click.init.client_y, Some(81.0));
    assert_eq!(click.init.screen_x, Some(46.0));
    assert_eq!(click.init.screen_y, Some(176.0));
}

#[tokio::test(start_paused = true)]
async fn click_does_not_focus_plain_elements() {
    let h = helpers(FixtureApp::new(PAGE));

    h.click("#banner").await.unwrap();

    assert_eq!(h.app().focused(), None);
    assert_eq!(h.app().event_types().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn missing_element_is_reported_by_selector() {
    let h = helpers(FixtureApp::new(PAGE));

    let err = h.click(".nope").await.unwrap_err();

    assert_eq!(err.category, ErrorCategory::ElementNotFound);
    assert_eq!(err.message, "Element .nope not found.");
    assert!(h.app().events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn fill_in_sets_value_and_fires_input_then_change() {
    let h = helpers(FixtureApp::new(PAGE));

    h.fill_in("#title", "First post").await.unwrap();

    let title = h.find("#title").await.unwrap()[0];
    assert_eq!(h.app().value_of(title).unwrap().as_deref(), Some("First post"));
    assert_eq!(h.app().focused(), Some(title));
    assert_eq!(h.app().event_types(), vec!["input", "change"]);
    assert!(h.app().events().iter().all(|r| r.event.kind == EventKind::Basic));
}

#[tokio::test(start_paused = true)]
async fn checkboxes_are_not_focused() {
    let h = helpers(FixtureApp::new(PAGE));

    h.fill_in("#draft", "on").await.unwrap();

    assert_eq!(h.app().focused(), None);
}

#[tokio::test(start_paused = true)]
async fn key_event_sets_key_code_and_which() {
    let h = helpers(FixtureApp::new(PAGE));

    h.key_event("#title", "keypress", 13).await.unwrap();

    let event = &h.app().events()[0].event;
    assert_eq!(event.event_type, "keypress");
    assert_eq!(event.kind, EventKind::Keyboard);
    assert_eq!(event.init.key_code, Some(13));
    assert_eq!(event.init.which, Some(13));
}

#[tokio::test(start_paused = true)]
async fn trigger_event_honours_context_and_options() {
    let h = helpers(FixtureApp::new(PAGE));

    h.trigger_event(
        Target::new(".go").within("#sidebar"),
        "blur",
        EventOptions::new().with("reason", "tab"),
    )
    .await
    .unwrap();

    let recorded = &h.app().events()[0];
    let link = h.find(Target::new("a").within("#sidebar")).await.unwrap()[0];
    assert_eq!(recorded.element, link);
    assert_eq!(recorded.event.init.extra["reason"], "tab");
    assert!(recorded.event.bubbles());
}

#[tokio::test(start_paused = true)]
async fn find_is_scoped_to_the_root_element() {
    let unscoped = helpers(FixtureApp::new(PAGE));
    assert_eq!(unscoped.find(".go").await.unwrap().len(), 3);

    let scoped = helpers(FixtureApp::new(PAGE).with_root("#app"));
    assert_eq!(scoped.find(".go").await.unwrap().len(), 2);
    assert!(scoped.find("#outside").await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn find_with_assert_reports_context() {
    let h = helpers(FixtureApp::new(PAGE));

    let err = h
        .find_with_assert(Target::new("button").within("#sidebar"))
        .await
        .unwrap_err();

    assert_eq!(err.category, ErrorCategory::ElementNotFound);
    assert_eq!(err.context["context"], "#sidebar");
}

#[tokio::test(start_paused = true)]
async fn and_then_waits_with_the_callback_result() {
    let app = FixtureApp::new(PAGE);
    app.request_for(Duration::from_millis(25));
    let h = helpers(app);
    let start = Instant::now();

    let pending_at_call = h.and_then(|app| app.pending_requests()).await.unwrap();

    assert_eq!(pending_at_call, 1);
    assert!(start.elapsed() >= Duration::from_millis(25));
}

#[tokio::test(start_paused = true)]
async fn registered_waiters_hold_helpers_back() {
    let h = helpers(FixtureApp::new(PAGE));
    let loading = Arc::new(AtomicBool::new(true));
    {
        let loading = Arc::clone(&loading);
        h.poller().register_waiter(move || loading.load(Ordering::SeqCst));
    }

    assert!(timeout(Duration::from_millis(100), h.wait(())).await.is_err());

    loading.store(false, Ordering::SeqCst);
    assert_eq!(h.wait("done").await.unwrap(), "done");
}

#[tokio::test(start_paused = true)]
async fn pause_test_never_resolves() {
    let h = helpers(FixtureApp::new(PAGE));
    assert!(timeout(Duration::from_secs(60), h.pause_test()).await.is_err());
}
