//! Integration tests for log destinations of the CLI binary.
//!
//! Logs go to stderr at `warn` by default; file output lands in the data
//! directory unless a path is given.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

struct Sandbox {
    _temp: TempDir,
    root: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().to_path_buf();
        for dir in ["home", "config", "data"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        Self { _temp: temp, root }
    }

    fn data_dir(&self) -> PathBuf {
        self.root.join("data").join("itafacile")
    }

    fn write_config(&self, contents: &str) {
        let dir = self.root.join("config").join("itafacile");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), contents).unwrap();
    }

    fn run(&self, args: &[&str]) -> Output {
        let bin = env!("CARGO_BIN_EXE_itafacile");
        Command::new(bin)
            .env("HOME", self.root.join("home"))
            .env("XDG_CONFIG_HOME", self.root.join("config"))
            .env("XDG_DATA_HOME", self.root.join("data"))
            .env_remove("ITAFACILE_LOG")
            .env_remove("ITAFACILE_LOG_FORMAT")
            .env_remove("ITAFACILE_LOG_OUTPUT")
            .env_remove("ITAFACILE_LOG_MODULES")
            .args(args)
            .output()
            .unwrap()
    }
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "itafacile should succeed: stderr={:?}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn read_log(path: &Path) -> String {
    assert!(path.exists(), "log file should exist at {}", path.display());
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_default_logging_keeps_info_out_of_stderr() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["library", "list"]);

    assert_success(&output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        !stderr.contains("itafacile starting"),
        "info logs should be filtered at the default level; got: {}",
        stderr
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("vuota"));
    assert!(!sandbox.data_dir().join("itafacile.log").exists());
}

#[test]
fn test_file_output_defaults_to_data_dir() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["--log-output", "file", "--log-level", "info", "library", "list"]);

    assert_success(&output);
    let content = read_log(&sandbox.data_dir().join("itafacile.log"));
    assert!(
        content.contains("itafacile starting"),
        "log file should contain a startup message; got: {}",
        content.lines().next().unwrap_or("")
    );
    assert!(!String::from_utf8_lossy(&output.stderr).contains("itafacile starting"));
}

#[test]
fn test_explicit_log_file_path() {
    let sandbox = Sandbox::new();
    let log_file = sandbox.root.join("logs").join("custom.log");
    let output = sandbox.run(&[
        "--log-output",
        "file",
        "--log-level",
        "info",
        "--log-file",
        log_file.to_str().unwrap(),
        "library",
        "list",
    ]);

    assert_success(&output);
    assert!(read_log(&log_file).contains("itafacile starting"));
    assert!(!sandbox.data_dir().join("itafacile.log").exists());
}

#[test]
fn test_verbose_logging_mirrors_to_stderr_and_file() {
    let sandbox = Sandbox::new();
    sandbox.write_config("[logging]\noutput = \"file\"\n");
    let output = sandbox.run(&["--verbose", "library", "list"]);

    assert_success(&output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("itafacile starting"),
        "verbose should mirror logs to stderr; got: {}",
        stderr
    );
    assert!(read_log(&sandbox.data_dir().join("itafacile.log")).contains("itafacile starting"));
}

#[test]
fn test_quiet_writes_no_log_file() {
    let sandbox = Sandbox::new();
    sandbox.write_config("[logging]\noutput = \"file\"\nlevel = \"info\"\n");
    let output = sandbox.run(&["--quiet", "library", "list"]);

    assert_success(&output);
    assert!(output.stderr.is_empty());
    assert!(!sandbox.data_dir().join("itafacile.log").exists());
}

#[test]
fn test_json_format_writes_json_lines() {
    let sandbox = Sandbox::new();
    let log_file = sandbox.root.join("json.log");
    let output = sandbox.run(&[
        "--log-output",
        "file",
        "--log-format",
        "json",
        "--log-level",
        "info",
        "--log-file",
        log_file.to_str().unwrap(),
        "library",
        "list",
    ]);

    assert_success(&output);
    let content = read_log(&log_file);
    let first = content.lines().next().unwrap();
    let line: serde_json::Value = serde_json::from_str(first).unwrap();
    assert_eq!(line["level"], "INFO");
}
