use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{DomEvent, SettleError, SettleHost};

/// Element bounding box in viewport coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// What the helpers need to know about an element to decide on focus
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementInfo {
    /// Lowercase tag name
    pub tag: String,
    pub input_type: Option<String>,
    pub content_editable: bool,
}

/// An application under test: a settle host plus the DOM and router surface
/// the test helpers drive.
#[async_trait]
pub trait TestApp: SettleHost {
    type Element: Clone + Send + Sync + 'static;

    /// Selector of the element lookups are scoped to when no context is given.
    fn root_selector(&self) -> &str;

    /// Elements matching `selector` that are descendants of an element
    /// matching `context`, in document order.
    async fn query(&self, selector: &str, context: &str) -> Result<Vec<Self::Element>, SettleError>;

    async fn element_info(&self, element: &Self::Element) -> Result<ElementInfo, SettleError>;

    async fn bounding_rect(&self, element: &Self::Element) -> Result<Rect, SettleError>;

    async fn dispatch(&self, element: &Self::Element, event: &DomEvent) -> Result<(), SettleError>;

    async fn focus(&self, element: &Self::Element) -> Result<(), SettleError>;

    async fn set_value(&self, element: &Self::Element, value: &str) -> Result<(), SettleError>;

    async fn boot(&self) -> Result<(), SettleError> {
        Ok(())
    }

    /// Outstanding readiness deferrals; while non-zero the app has not
    /// routed yet and a visit supplies the initial URL instead.
    fn readiness_deferrals(&self) -> usize {
        0
    }

    async fn advance_readiness(&self, initial_url: &str) -> Result<(), SettleError>;

    /// Update the location without routing.
    async fn set_url(&self, url: &str) -> Result<(), SettleError>;

    /// Route to `url`.
    async fn handle_url(&self, url: &str) -> Result<(), SettleError>;

    async fn current_route_name(&self) -> Result<Option<String>, SettleError>;

    async fn current_path(&self) -> Result<Option<String>, SettleError>;

    async fn current_url(&self) -> Result<String, SettleError>;
}
