use settle_core::{DomEvent, ElementInfo, EventKind, EventOptions, Rect};

pub const KEYBOARD_EVENTS: &[&str] = &["keydown", "keypress", "keyup"];

pub const MOUSE_EVENTS: &[&str] = &[
    "click",
    "mousedown",
    "mouseup",
    "dblclick",
    "mouseenter",
    "mouseleave",
    "mousemove",
    "mouseout",
    "mouseover",
];

/// Input types that never take focus from a helper
const UNFOCUSABLE_INPUT_TYPES: &[&str] = &["checkbox", "radio", "hidden"];

const FORM_TAGS: &[&str] = &["input", "textarea", "select", "button"];

pub fn event_kind(event_type: &str) -> EventKind {
    if KEYBOARD_EVENTS.contains(&event_type) {
        EventKind::Keyboard
    } else if MOUSE_EVENTS.contains(&event_type) {
        EventKind::Mouse
    } else {
        EventKind::Basic
    }
}

/// Resolve `options` into a dispatchable event.
///
/// Events bubble and are cancelable unless told otherwise. Mouse events aimed
/// at an element with a known `rect` get pointer coordinates just inside its
/// top-left corner; explicit options win over the simulated ones.
pub fn build_event(event_type: &str, options: EventOptions, rect: Option<Rect>) -> DomEvent {
    let kind = event_kind(event_type);
    let mut init = options;
    init.can_bubble.get_or_insert(true);
    init.cancelable.get_or_insert(true);

    if let (EventKind::Mouse, Some(rect)) = (kind, rect) {
        let x = rect.left + 1.0;
        let y = rect.top + 1.0;
        init.client_x.get_or_insert(x);
        init.client_y.get_or_insert(y);
        init.screen_x.get_or_insert(x + 5.0);
        init.screen_y.get_or_insert(y + 95.0);
    }

    DomEvent {
        event_type: event_type.to_string(),
        kind,
        init,
    }
}

/// Form controls and `contenteditable` elements take focus, except the
/// checkbox, radio and hidden input types.
pub fn is_focusable(info: &ElementInfo) -> bool {
    if !FORM_TAGS.contains(&info.tag.as_str()) && !info.content_editable {
        return false;
    }
    match info.input_type.as_deref() {
        Some(ty) => !UNFOCUSABLE_INPUT_TYPES.contains(&ty.to_ascii_lowercase().as_str()),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(tag: &str, input_type: Option<&str>, content_editable: bool) -> ElementInfo {
        ElementInfo {
            tag: tag.to_string(),
            input_type: input_type.map(str::to_string),
            content_editable,
        }
    }

    #[test]
    fn classifies_event_types() {
        assert_eq!(event_kind("keyup"), EventKind::Keyboard);
        assert_eq!(event_kind("dblclick"), EventKind::Mouse);
        assert_eq!(event_kind("mouseenter"), EventKind::Mouse);
        assert_eq!(event_kind("blur"), EventKind::Basic);
        assert_eq!(event_kind("input"), EventKind::Basic);
    }

    #[test]
    fn mouse_events_get_simulated_coordinates() {
        let rect = Rect { left: 10.0, top: 20.0, width: 100.0, height: 30.0 };
        let event = build_event("mousedown", EventOptions::new(), Some(rect));

        assert_eq!(event.kind, EventKind::Mouse);
        assert_eq!(event.init.client_x, Some(11.0));
        assert_eq!(event.init.client_y, Some(21.0));
        assert_eq!(event.init.screen_x, Some(16.0));
        assert_eq!(event.init.screen_y, Some(116.0));
        assert!(event.bubbles());
    }

    #[test]
    fn explicit_options_override_simulated_coordinates() {
        let rect = Rect { left: 0.0, top: 0.0, width: 5.0, height: 5.0 };
        let event = build_event("click", EventOptions::new().client(300.0, 400.0), Some(rect));
        assert_eq!(event.init.client_x, Some(300.0));
        assert_eq!(event.init.client_y, Some(400.0));
        assert_eq!(event.init.screen_x, Some(6.0));
    }

    #[test]
    fn keyboard_events_keep_key_codes_and_skip_coordinates() {
        let rect = Rect::default();
        let event = build_event("keypress", EventOptions::new().key(13), Some(rect));
        assert_eq!(event.kind, EventKind::Keyboard);
        assert_eq!(event.init.key_code, Some(13));
        assert_eq!(event.init.which, Some(13));
        assert_eq!(event.init.client_x, None);
    }

    #[test]
    fn basic_events_respect_bubbling_override() {
        let mut options = EventOptions::new().with("detailText", "x");
        options.can_bubble = Some(false);
        let event = build_event("blur", options, None);
        assert!(!event.bubbles());
        assert!(event.cancelable());
        assert_eq!(event.init.extra["detailText"], "x");
    }

    #[test]
    fn focus_rule() {
        assert!(is_focusable(&info("input", Some("text"), false)));
        assert!(is_focusable(&info("input", None, false)));
        assert!(is_focusable(&info("textarea", None, false)));
        assert!(is_focusable(&info("div", None, true)));
        assert!(!is_focusable(&info("div", None, false)));
        assert!(!is_focusable(&info("input", Some("checkbox"), false)));
        assert!(!is_focusable(&info("input", Some("RADIO"), false)));
        assert!(!is_focusable(&info("input", Some("hidden"), false)));
    }
}
