use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which DOM event constructor an event should be built with
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Keyboard,
    Mouse,
    Basic,
}

/// Init options for a simulated event, named as the DOM names them.
///
/// Unset fields fall back to the defaults of the event kind. Anything the
/// typed fields don't cover goes into `extra` and is copied onto the event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_bubble: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctrl_key: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_key: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift_key: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_key: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_code: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub char_code: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub which: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button: Option<i16>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets both `keyCode` and `which`, as key helpers do.
    pub fn key(mut self, code: u32) -> Self {
        self.key_code = Some(code);
        self.which = Some(code);
        self
    }

    pub fn client(mut self, x: f64, y: f64) -> Self {
        self.client_x = Some(x);
        self.client_y = Some(y);
        self
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl_key = Some(true);
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift_key = Some(true);
        self
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

/// A fully-resolved event, ready for an adapter to dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub kind: EventKind,
    pub init: EventOptions,
}

impl DomEvent {
    pub fn bubbles(&self) -> bool {
        self.init.can_bubble.unwrap_or(true)
    }

    pub fn cancelable(&self) -> bool {
        self.init.cancelable.unwrap_or(true)
    }
}
