//! Fixture-driven diagnostic tests.
//!
//! Every `.mc` file under `tests/data/diagnostics/` carries one or more
//! `// EXPECT:` directives in its leading comments:
//!
//! - `// EXPECT: OK` — the analyzer must emit no error-level diagnostics
//!   (warnings are allowed);
//! - `// EXPECT: <substring>` — at least one emitted diagnostic message
//!   must contain the substring.

use minicheck::diagnostics::Severity;
use minicheck::pipeline::analyze_source;
use std::fs;
use std::path::{Path, PathBuf};

const EXPECT_PREFIX: &str = "// EXPECT:";

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join("diagnostics")
}

fn extract_expectations(source: &str) -> Vec<String> {
    source
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix(EXPECT_PREFIX))
        .map(|rest| rest.trim().to_string())
        .collect()
}

fn run_fixture(path: &Path) -> Result<(), String> {
    let source = fs::read_to_string(path).map_err(|e| format!("read failed: {e}"))?;
    let expected = extract_expectations(&source);
    if expected.is_empty() {
        return Err("no EXPECT directives found".to_string());
    }

    let diagnostics = analyze_source(path, &source);

    if expected == ["OK"] {
        let errors: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .collect();
        if errors.is_empty() {
            return Ok(());
        }
        return Err(format!("expected no errors, got: {errors:#?}"));
    }

    for substring in &expected {
        if !diagnostics.iter().any(|d| d.message.contains(substring)) {
            return Err(format!(
                "no diagnostic message contains {substring:?}; got: {:?}",
                diagnostics.iter().map(|d| &d.message).collect::<Vec<_>>()
            ));
        }
    }
    Ok(())
}

#[test]
fn test_all_fixtures() {
    let mut paths: Vec<PathBuf> = fs::read_dir(fixture_dir())
        .expect("fixture directory exists")
        .map(|entry| entry.expect("readable entry").path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "mc"))
        .collect();
    paths.sort();
    assert!(!paths.is_empty(), "no fixtures found");

    let mut failures = Vec::new();
    for path in &paths {
        if let Err(reason) = run_fixture(path) {
            failures.push(format!("{}: {reason}", path.display()));
        }
    }

    assert!(
        failures.is_empty(),
        "{} fixture(s) failed:\n{}",
        failures.len(),
        failures.join("\n")
    );
}

#[test]
fn test_fixtures_are_deterministic() {
    for path in fs::read_dir(fixture_dir()).unwrap() {
        let path = path.unwrap().path();
        if !path.extension().is_some_and(|ext| ext == "mc") {
            continue;
        }
        let source = fs::read_to_string(&path).unwrap();
        let first = analyze_source(&path, &source);
        let second = analyze_source(&path, &source);
        assert_eq!(first, second, "{} is not deterministic", path.display());
    }
}
