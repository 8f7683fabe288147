#![allow(dead_code)]

pub mod fixtures;

use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper struct to run leadflow commands in an isolated temp directory
pub struct LeadflowTest {
    pub temp_dir: TempDir,
    binary_path: &'static str,
    env: Vec<(String, String)>,
}

impl LeadflowTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        LeadflowTest {
            temp_dir,
            binary_path: env!("CARGO_BIN_EXE_leadflow"),
            env: Vec::new(),
        }
    }

    /// Point the binary at a REST API, e.g. a mock server.
    pub fn with_api_url(mut self, url: &str) -> Self {
        self.env
            .push(("LEADFLOW_API_URL".to_string(), url.to_string()));
        self
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.env
            .push(("LEADFLOW_TOKEN".to_string(), token.to_string()));
        self
    }

    pub fn run(&self, args: &[&str]) -> Output {
        let mut command = Command::new(self.binary_path);
        command
            .args(args)
            .current_dir(self.temp_dir.path())
            .env_remove("LEADFLOW_API_URL")
            .env_remove("LEADFLOW_TOKEN")
            .env_remove("LEADFLOW_LOG")
            .env("NO_COLOR", "1");
        for (key, value) in &self.env {
            command.env(key, value);
        }
        command.output().expect("Failed to execute leadflow command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let stdout = self.run_success(args);
        serde_json::from_str(&stdout)
            .unwrap_or_else(|e| panic!("Output of {args:?} is not JSON ({e}): {stdout}"))
    }

    pub fn write_config(&self, content: &str) {
        let dir = self.temp_dir.path().join(".leadflow");
        fs::create_dir_all(&dir).expect("Failed to create .leadflow directory");
        fs::write(dir.join("config.yaml"), content).expect("Failed to write config file");
    }

    pub fn read_config(&self) -> String {
        let path = self.temp_dir.path().join(".leadflow").join("config.yaml");
        fs::read_to_string(path).expect("Failed to read config file")
    }
}
