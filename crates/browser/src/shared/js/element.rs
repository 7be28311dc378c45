//! Element scripts. Elements are addressed by the id `QUERY` assigned them in
//! the page's element table; every script returns `{ missing: true }` when the
//! id no longer resolves. The table holds elements weakly and drops ids once
//! their element is collected.

pub const QUERY: &str = r#"
(selector, context) => {
    const state = window.__settle;
    const ids = [];
    const seen = new Set();
    for (const root of document.querySelectorAll(context)) {
        for (const el of root.querySelectorAll(selector)) {
            let id = state.ids.get(el);
            if (id === undefined) {
                id = state.nextId++;
                state.ids.set(el, id);
                state.elements.set(id, new WeakRef(el));
                state.collected.register(el, id);
            }
            if (!seen.has(id)) {
                seen.add(id);
                ids.push(id);
            }
        }
    }
    return ids;
}
"#;

pub const ELEMENT_INFO: &str = r#"
(id) => {
    const el = window.__settle && window.__settle.lookup(id);
    if (!el) return { missing: true };
    return {
        tag: el.tagName.toLowerCase(),
        input_type: el.getAttribute('type'),
        content_editable: el.getAttribute('contenteditable') === 'true'
    };
}
"#;

pub const BOUNDING_RECT: &str = r#"
(id) => {
    const el = window.__settle && window.__settle.lookup(id);
    if (!el) return { missing: true };
    const rect = el.getBoundingClientRect();
    return { left: rect.left, top: rect.top, width: rect.width, height: rect.height };
}
"#;

/// Builds the event with the constructor its kind names. Key codes are
/// read-only on constructed events, so they are defined as own properties.
pub const DISPATCH_EVENT: &str = r#"
(id, event) => {
    const el = window.__settle && window.__settle.lookup(id);
    if (!el) return { missing: true };

    const init = Object.assign({}, event.init);
    init.bubbles = init.canBubble !== false;
    init.cancelable = init.cancelable !== false;
    init.view = window;
    delete init.canBubble;

    let ev;
    if (event.kind === 'keyboard') {
        ev = new KeyboardEvent(event.type, init);
    } else if (event.kind === 'mouse') {
        ev = new MouseEvent(event.type, init);
    } else {
        ev = new Event(event.type, init);
    }

    const typed = ['bubbles', 'cancelable', 'view', 'ctrlKey', 'altKey', 'shiftKey', 'metaKey',
        'detail', 'screenX', 'screenY', 'clientX', 'clientY', 'button'];
    for (const [key, value] of Object.entries(init)) {
        if (typed.includes(key) && event.kind !== 'basic') continue;
        if (key === 'bubbles' || key === 'cancelable' || key === 'view') continue;
        try {
            Object.defineProperty(ev, key, { value, configurable: true });
        } catch (e) {}
    }

    el.dispatchEvent(ev);
    return { missing: false };
}
"#;

/// Focus only counts when the document has focus; otherwise a `focusin` is
/// fired so handlers still run.
pub const FOCUS: &str = r#"
(id) => {
    const el = window.__settle && window.__settle.lookup(id);
    if (!el) return { missing: true };
    el.focus();
    if (!document.hasFocus || !document.hasFocus()) {
        el.dispatchEvent(new FocusEvent('focusin', { bubbles: true }));
    }
    return { missing: false };
}
"#;

pub const SET_VALUE: &str = r#"
(id, value) => {
    const el = window.__settle && window.__settle.lookup(id);
    if (!el) return { missing: true };
    el.value = value;
    return { missing: false };
}
"#;
