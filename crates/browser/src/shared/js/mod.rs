pub mod element;
pub mod probe;

use serde_json::Value;

pub fn build_js_call(func: &str, args: &[Value]) -> String {
    let args_str = args.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("({})({})", func, args_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_call_with_json_arguments() {
        let js = build_js_call("(a, b) => a + b", &[json!(1), json!("x\"y")]);
        assert_eq!(js, r#"((a, b) => a + b)(1, "x\"y")"#);
    }

    #[test]
    fn builds_call_without_arguments() {
        assert_eq!(build_js_call("() => 1", &[]), "(() => 1)()");
    }

    #[test]
    fn element_table_is_keyed_both_ways() {
        assert!(probe::INSTALL_PROBES.contains("ids: new WeakMap()"));
        assert!(element::QUERY.contains("state.ids.get(el)"));
    }

    #[test]
    fn non_function_timers_bypass_tracking() {
        let guard = probe::INSTALL_PROBES.find("typeof fn !== 'function'").unwrap();
        let tracked = probe::INSTALL_PROBES.find("state.timers.add(id)").unwrap();
        assert!(guard < tracked);
    }
}
