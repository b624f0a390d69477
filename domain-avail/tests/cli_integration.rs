// domain-avail/tests/cli_integration.rs

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::{NamedTempFile, TempDir};

const ENV_VARS: &[&str] = &[
    "DA_TLD",
    "DA_INPUT",
    "DA_OUTPUT_DIR",
    "DA_CHUNK_SIZE",
    "DA_RETRY",
    "DA_BASE_URL",
    "DA_TIMEOUT",
];

/// Command with no DA_* variables leaking in from the environment
fn domain_avail() -> Command {
    let mut cmd = Command::cargo_bin("domain-avail").unwrap();
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

/// Helper to create a YAML input file
fn create_input_file(content: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("Failed to create temp file");
    fs::write(file.path(), content).expect("Failed to write to temp file");
    file
}

#[test]
fn test_help_lists_flags() {
    domain_avail()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--tld"))
        .stdout(predicate::str::contains("--file"))
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--chunk-size"))
        .stdout(predicate::str::contains("--retry"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn test_version() {
    domain_avail()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_invalid_chunk_size() {
    domain_avail()
        .args(["shop", "--chunk-size", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Chunk size must be between 1 and 100",
        ));
}

#[test]
fn test_missing_input_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.yaml");
    let output = dir.path().join("out.txt");

    domain_avail()
        .arg("-f")
        .arg(&missing)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stdout(predicate::str::contains("!!! read_input_file").not())
        .stdout(predicate::str::contains(">>> read_input_file"))
        .stdout(predicate::str::contains("Total run time"))
        .stderr(predicate::str::contains("Cannot read input file"));

    assert!(!output.exists());
}

#[test]
fn test_empty_input_reports_no_input() {
    let input = create_input_file("in.th:\nco.th: []\n");
    let dir = TempDir::new().unwrap();

    domain_avail()
        .arg("-f")
        .arg(input.path())
        .arg("--output-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "<<< read_input_param | Warn: No input data were found",
        ))
        .stdout(predicate::str::contains(
            "<<< read_input_file | Read 2 tld(s) with total 0 domain(s)",
        ))
        .stderr(predicate::str::contains("No input data were found"));
}

#[test]
fn test_invalid_config_file() {
    let config = create_input_file("[defaults]\nchunk_size = 500\n");

    domain_avail()
        .arg("shop")
        .arg("--config")
        .arg(config.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config file"));
}

#[test]
fn test_unreachable_registrar_exhausts_retries() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.txt");

    domain_avail()
        .env("DA_BASE_URL", "http://127.0.0.1:9")
        .args(["shop", "cafe", "--retry", "0", "-o"])
        .arg(&output)
        .assert()
        .failure()
        .stdout(predicate::str::contains("!!! read_input_file | Skipped"))
        .stdout(predicate::str::contains(
            "|-> get_availability(0) | Fetching... domains=[shop,cafe]",
        ))
        .stderr(predicate::str::contains("Retry count have been exceeded 0"));

    // Opened before fetching, left empty
    assert_eq!(fs::read_to_string(&output).unwrap(), "");
}
