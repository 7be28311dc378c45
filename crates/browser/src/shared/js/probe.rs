/// Installed on every new document before page scripts run. Counts fetch and
/// XHR calls in flight and keeps the ids of timers that have not fired.
pub const INSTALL_PROBES: &str = r#"
(() => {
    if (window.__settle) return;
    const state = { pending: 0, timers: new Set(), elements: new Map(), ids: new WeakMap(), nextId: 1 };
    state.collected = new FinalizationRegistry((id) => state.elements.delete(id));
    state.lookup = (id) => {
        const ref = state.elements.get(id);
        return ref ? ref.deref() : undefined;
    };
    window.__settle = state;

    const origFetch = window.fetch;
    if (origFetch) {
        window.fetch = function (...args) {
            state.pending++;
            let settled = false;
            const done = () => { if (!settled) { settled = true; state.pending--; } };
            try {
                return origFetch.apply(this, args).finally(done);
            } catch (e) {
                done();
                throw e;
            }
        };
    }

    const origSend = XMLHttpRequest.prototype.send;
    XMLHttpRequest.prototype.send = function (...args) {
        state.pending++;
        this.addEventListener('loadend', () => { state.pending--; }, { once: true });
        try {
            return origSend.apply(this, args);
        } catch (e) {
            state.pending--;
            throw e;
        }
    };

    const origSetTimeout = window.setTimeout;
    const origClearTimeout = window.clearTimeout;
    window.setTimeout = function (fn, delay, ...rest) {
        if (typeof fn !== 'function') {
            return origSetTimeout.call(window, fn, delay, ...rest);
        }
        let id;
        const wrapped = function () {
            state.timers.delete(id);
            return fn.apply(this, rest);
        };
        id = origSetTimeout.call(window, wrapped, delay);
        state.timers.add(id);
        return id;
    };
    window.clearTimeout = function (id) {
        state.timers.delete(id);
        return origClearTimeout.call(window, id);
    };
})()
"#;

pub const TRANSITION: &str = r#"
() => document.readyState !== 'complete'
"#;

pub const PENDING_REQUESTS: &str = r#"
() => window.__settle ? window.__settle.pending : 0
"#;

pub const SCHEDULED_WORK: &str = r#"
() => !!window.__settle && window.__settle.timers.size > 0
"#;

pub const LOCATION: &str = r#"
() => ({
    pathname: window.location.pathname,
    search: window.location.search,
    hash: window.location.hash
})
"#;
