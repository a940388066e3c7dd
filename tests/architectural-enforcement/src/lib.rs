//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No sleep() calls in the conversation core
//! - The core stays free of UI frameworks
//!
//! These tests are designed to catch violations early in the development cycle.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Root of the workspace (two levels above this package)
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// All `.rs` files under `dir`, sorted
pub fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "rs"))
        .collect();
    files.sort();
    files
}

/// Lines of production code in `source`: everything before the first
/// `#[cfg(test)]`, with line comments dropped
pub fn production_lines(source: &str) -> Vec<(usize, &str)> {
    source
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .filter(|(_, line)| {
            let trimmed = line.trim_start();
            !trimmed.starts_with("//")
        })
        .map(|(i, line)| (i + 1, line))
        .collect()
}

/// A forbidden pattern found in a file
#[derive(Debug)]
pub struct Violation {
    /// File containing the match
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The offending line
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.path.display(), self.line, self.text.trim())
    }
}

/// Scan production code of every Rust file in `dir` for any of `patterns`
pub fn scan_production_code(dir: &Path, patterns: &[&str]) -> Vec<Violation> {
    let mut violations = Vec::new();

    for path in rust_files(dir) {
        let Ok(source) = fs::read_to_string(&path) else {
            continue;
        };
        for (line, text) in production_lines(&source) {
            if patterns.iter().any(|p| text.contains(p)) {
                violations.push(Violation {
                    path: path.clone(),
                    line,
                    text: text.to_string(),
                });
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let source = "fn a() {}\n// sleep here\nfn b() {}\n#[cfg(test)]\nmod tests { fn sleep() {} }\n";
        let lines = production_lines(source);
        assert_eq!(lines, vec![(1, "fn a() {}"), (3, "fn b() {}")]);
    }

    #[test]
    fn test_workspace_root_has_manifest() {
        assert!(workspace_root().join("Cargo.toml").exists());
    }
}
