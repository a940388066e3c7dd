//! The conversation core knows nothing about terminals

use std::fs;

use architectural_enforcement::{scan_production_code, workspace_root};

const UI_CRATES: [&str; 2] = ["ratatui", "crossterm"];

#[test]
fn test_core_manifest_has_no_ui_dependencies() {
    let manifest = fs::read_to_string(workspace_root().join("core").join("Cargo.toml"))
        .expect("core/Cargo.toml should be readable");

    for name in UI_CRATES {
        assert!(
            !manifest.contains(name),
            "core/Cargo.toml depends on {name}"
        );
    }
}

#[test]
fn test_core_sources_do_not_use_ui_crates() {
    let core_src = workspace_root().join("core").join("src");
    let patterns: Vec<String> = UI_CRATES.iter().map(|name| format!("{name}::")).collect();
    let patterns: Vec<&str> = patterns.iter().map(String::as_str).collect();

    let violations = scan_production_code(&core_src, &patterns);
    assert!(
        violations.is_empty(),
        "UI crates used in core:\n{}",
        violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    );
}
