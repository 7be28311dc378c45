use settle_core::SettleError;

/// Page is mid-navigation; its JavaScript context is gone until the new
/// document loads.
pub fn is_context_lost(e: &impl std::fmt::Display) -> bool {
    let s = e.to_string();
    s.contains("Cannot find context") || s.contains("Execution context was destroyed")
}

pub fn to_settle_error(e: impl std::fmt::Display, action: &str) -> SettleError {
    let s = e.to_string();
    if s.contains("timeout") || s.contains("Timeout") {
        SettleError::timeout(format!("{} timed out: {}", action, s))
    } else if s.contains("navigation") || s.contains("Navigation") {
        SettleError::navigation(format!("{} navigation failed: {}", action, s))
    } else if s.contains("Uncaught") || s.contains("ReferenceError") || s.contains("TypeError") {
        SettleError::script(format!("{} script failed: {}", action, s))
    } else {
        SettleError::browser(format!("{} failed: {}", action, s))
    }
}
