//! Test environment builder for isolated Stackplan testing.
//!
//! Provides `TestEnv` - an isolated project directory plus helpers to run
//! the Stackplan CLI against it.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Context variables the CLI would otherwise pick up from the test runner
const CONTEXT_VARS: &[&str] = &[
    "STACKPLAN_DOMAIN_NAME",
    "STACKPLAN_HOSTED_ZONE_ID",
    "STACKPLAN_APP_NAME",
    "STACKPLAN_CERTIFICATE_ARN",
    "STACKPLAN_PR_ID",
    "STACKPLAN_IMAGE_TAG",
    "STACKPLAN_LOG",
    "SECRET_KEY",
    "REQUIRED_SETTING",
    "DATABASE_URL",
    "REDIS_URL",
    "SENTRY_DSN",
];

/// Result of running a Stackplan CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Check if command succeeded
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Parse every stdout line as JSON
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| {
                serde_json::from_str(l)
                    .unwrap_or_else(|e| panic!("stdout line is not JSON ({}): {}", e, l))
            })
            .collect()
    }
}

/// Isolated test environment with a temp project directory.
pub struct TestEnv {
    /// Temporary directory for the project
    pub project_root: TempDir,
    /// Path to the stackplan binary
    stackplan_bin: PathBuf,
}

impl TestEnv {
    /// Create a new TestEnvBuilder
    pub fn builder() -> TestEnvBuilder {
        TestEnvBuilder::new()
    }

    /// Get path relative to project root
    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    /// Default state directory
    pub fn state_path(&self, relative: &str) -> PathBuf {
        self.project_path(".stackplan").join(relative)
    }

    /// Run stackplan in this environment from project root
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    /// Run stackplan from project root with extra env vars.
    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        self.run_from_with_env(self.project_root.path(), args, env_vars)
    }

    /// Run stackplan from a specific directory with extra env vars.
    pub fn run_from_with_env(
        &self,
        cwd: &Path,
        args: &[&str],
        env_vars: &[(&str, &str)],
    ) -> TestResult {
        let mut cmd = Command::new(&self.stackplan_bin);
        cmd.current_dir(cwd).args(args);
        for key in CONTEXT_VARS {
            cmd.env_remove(key);
        }
        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute stackplan");
        output_to_result(output)
    }

    /// Write a file to the project directory
    pub fn write_project_file(&self, relative_path: &str, content: &str) {
        let full_path = self.project_path(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
    }

    /// Read a file from the state directory
    pub fn read_state_file(&self, relative_path: &str) -> String {
        let full_path = self.state_path(relative_path);
        std::fs::read_to_string(&full_path)
            .unwrap_or_else(|e| panic!("Failed to read state file {}: {}", relative_path, e))
    }
}

/// Convert Command output to TestResult
fn output_to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

/// Builder for TestEnv with fluent API
pub struct TestEnvBuilder {
    project_config: Option<String>,
    plaintext_secrets: Vec<(String, String)>,
    init_git: bool,
}

impl TestEnvBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            project_config: None,
            plaintext_secrets: Vec::new(),
            init_git: true,
        }
    }

    /// Set stackplan.toml content
    pub fn with_project_config(mut self, toml: &str) -> Self {
        self.project_config = Some(toml.to_string());
        self
    }

    /// Write `secrets/<env>/secrets.dec.yaml`
    pub fn with_plaintext_secrets(mut self, environment: &str, yaml: &str) -> Self {
        self.plaintext_secrets
            .push((environment.to_string(), yaml.to_string()));
        self
    }

    /// Skip git initialization
    pub fn without_git(mut self) -> Self {
        self.init_git = false;
        self
    }

    /// Build the TestEnv
    pub fn build(self) -> TestEnv {
        let project_root = tempfile::tempdir().expect("Failed to create project dir");
        let env = TestEnv {
            project_root,
            stackplan_bin: PathBuf::from(env!("CARGO_BIN_EXE_stackplan")),
        };

        if self.init_git {
            std::fs::create_dir_all(env.project_path(".git")).expect("Failed to create .git");
        }
        if let Some(config) = &self.project_config {
            env.write_project_file("stackplan.toml", config);
        }
        for (environment, yaml) in &self.plaintext_secrets {
            env.write_project_file(&format!("secrets/{}/secrets.dec.yaml", environment), yaml);
        }
        env
    }
}

impl Default for TestEnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}
