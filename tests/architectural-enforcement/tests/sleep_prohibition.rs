//! The core never blocks or waits on wall-clock sleeps
//!
//! Timing in the conversation core goes through `tokio::time::interval`
//! (reveal) and request timeouts. A `sleep` in production code is either a
//! polling loop or a race papered over.

use architectural_enforcement::{scan_production_code, workspace_root};

#[test]
fn test_no_sleep_in_core() {
    let core_src = workspace_root().join("core").join("src");
    let violations = scan_production_code(&core_src, &["sleep(", "sleep_until("]);

    assert!(
        violations.is_empty(),
        "sleep calls in core production code:\n{}",
        violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    );
}

#[test]
fn test_no_blocking_thread_sleep_in_tui() {
    let tui_src = workspace_root().join("tui").join("src");
    let violations = scan_production_code(&tui_src, &["thread::sleep"]);

    assert!(
        violations.is_empty(),
        "blocking sleeps in the TUI:\n{}",
        violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    );
}
