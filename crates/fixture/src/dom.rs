use scraper::{ElementRef, Html, Selector};
use serde_json::json;
use settle_core::{ElementInfo, Rect, SettleError};

/// Element handle: position in document order. Stable because fixture
/// markup never changes after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FixtureElement(pub(crate) usize);

impl FixtureElement {
    pub fn index(&self) -> usize {
        self.0
    }
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector, SettleError> {
    Selector::parse(selector).map_err(|e| {
        SettleError::parsing(format!("invalid selector '{}': {}", selector, e))
            .with_context(json!({ "selector": selector }))
    })
}

/// Parse `markup` and hand every element, in document order, to `f`.
fn with_elements<R>(markup: &str, f: impl FnOnce(&[ElementRef<'_>]) -> R) -> R {
    let html = Html::parse_document(markup);
    let elements: Vec<ElementRef<'_>> = html
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .collect();
    f(&elements)
}

fn with_element<R>(
    markup: &str,
    element: FixtureElement,
    f: impl FnOnce(ElementRef<'_>) -> R,
) -> Result<R, SettleError> {
    with_elements(markup, |elements| elements.get(element.0).copied().map(f))
        .ok_or_else(|| SettleError::host(format!("no element at index {}", element.0)))
}

pub(crate) fn query(markup: &str, selector: &str, context: &str) -> Result<Vec<FixtureElement>, SettleError> {
    let selector = parse_selector(selector)?;
    let context = parse_selector(context)?;

    Ok(with_elements(markup, |elements| {
        elements
            .iter()
            .enumerate()
            .filter(|(_, el)| selector.matches(el))
            .filter(|(_, el)| {
                el.ancestors()
                    .filter_map(ElementRef::wrap)
                    .any(|ancestor| context.matches(&ancestor))
            })
            .map(|(idx, _)| FixtureElement(idx))
            .collect()
    }))
}

pub(crate) fn matches(markup: &str, element: FixtureElement, selector: &Selector) -> bool {
    with_element(markup, element, |el| selector.matches(&el)).unwrap_or(false)
}

pub(crate) fn info(markup: &str, element: FixtureElement) -> Result<ElementInfo, SettleError> {
    with_element(markup, element, |el| {
        let value = el.value();
        ElementInfo {
            tag: value.name().to_ascii_lowercase(),
            input_type: value.attr("type").map(str::to_string),
            content_editable: value
                .attr("contenteditable")
                .is_some_and(|v| v.eq_ignore_ascii_case("true")),
        }
    })
}

pub(crate) fn attr(markup: &str, element: FixtureElement, name: &str) -> Result<Option<String>, SettleError> {
    with_element(markup, element, |el| el.value().attr(name).map(str::to_string))
}

/// Layout comes from `data-rect="left,top,width,height"`; elements without
/// one sit at the origin with no size.
pub(crate) fn rect(markup: &str, element: FixtureElement) -> Result<Rect, SettleError> {
    let Some(raw) = attr(markup, element, "data-rect")? else {
        return Ok(Rect::default());
    };

    let parts = raw
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| SettleError::parsing(format!("bad data-rect '{}': {}", raw, e)))?;

    match parts.as_slice() {
        [left, top, width, height] => Ok(Rect {
            left: *left,
            top: *top,
            width: *width,
            height: *height,
        }),
        _ => Err(SettleError::parsing(format!(
            "data-rect needs 4 numbers, got '{}'",
            raw
        ))),
    }
}
