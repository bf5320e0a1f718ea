use console::style;
use std::sync::atomic::{AtomicBool, Ordering};

/// Environment variable that turns on debug output without `--verbose`.
pub const DEBUG_ENV: &str = "GIT_HISTORY_REWRITE_DEBUG";

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Turns debug output on for the rest of the process.
pub fn enable() {
    VERBOSE.store(true, Ordering::Relaxed);
}

/// Returns `true` when `--verbose` was given or [`DEBUG_ENV`] is `"1"`.
pub fn is_enabled() -> bool {
    VERBOSE.load(Ordering::Relaxed) || std::env::var(DEBUG_ENV).unwrap_or_default() == "1"
}

/// Debug logging utility function
///
/// Prints `msg` to stderr with a colored prefix when debugging is enabled.
pub fn debug_log(msg: &str) {
    if is_enabled() {
        eprintln!("{} {}", style("[git-history-rewrite]").yellow().bold(), msg);
    }
}
