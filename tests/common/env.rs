//! Test environment for isolated ecs-template runs.
//!
//! Provides `TestEnv` - a temp working directory plus an isolated HOME so
//! no user configuration leaks into a test, and helpers to run the binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Result of running the ecs-template binary
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Isolated test environment with temp directories.
pub struct TestEnv {
    /// Working directory the binary runs in
    pub work_dir: TempDir,
    /// Temporary HOME / XDG config home
    pub home_dir: TempDir,
    bin: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().expect("Failed to create work dir"),
            home_dir: TempDir::new().expect("Failed to create home dir"),
            bin: PathBuf::from(env!("CARGO_BIN_EXE_ecs-template")),
        }
    }

    /// Get path relative to the working directory
    pub fn path(&self, relative: &str) -> PathBuf {
        self.work_dir.path().join(relative)
    }

    /// Write a file relative to the working directory, creating parents
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Write a gzip compressed tarball holding `files` (path, content)
    pub fn write_tar_gz(&self, relative: &str, files: &[(&str, &str)]) -> PathBuf {
        let path = self.path(relative);
        let file = fs::File::create(&path).expect("Failed to create archive");
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, name, content.as_bytes())
                .expect("Failed to append archive entry");
        }
        builder
            .into_inner()
            .and_then(|encoder| encoder.finish())
            .expect("Failed to finish archive");
        path
    }

    /// Read a file relative to the working directory
    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative))
            .unwrap_or_else(|e| panic!("Failed to read {relative}: {e}"))
    }

    /// Run ecs-template from the working directory
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    /// Run ecs-template from the working directory with extra env vars.
    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        self.run_from_with_env(self.work_dir.path(), args, env_vars)
    }

    /// Run ecs-template from a specific directory with extra env vars.
    pub fn run_from_with_env(
        &self,
        cwd: &Path,
        args: &[&str],
        env_vars: &[(&str, &str)],
    ) -> TestResult {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(cwd)
            .args(args)
            .env("HOME", self.home_dir.path())
            .env("XDG_CONFIG_HOME", self.home_dir.path().join(".config"))
            .env_remove("ECS_TEMPLATE_CONFIG")
            .env_remove("ECS_TEMPLATE_LOG")
            .env_remove("ECS_TEMPLATE_QUIET")
            .env_remove("ECS_TEMPLATE_AWS_BIN")
            .env_remove("ECS_TEMPLATE_S3_ENDPOINT");

        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute ecs-template");
        output_to_result(output)
    }

    /// Install an executable fake `aws` CLI and return its path.
    ///
    /// Every invocation appends its arguments to `aws-calls.log`.
    #[cfg(unix)]
    pub fn fake_aws(&self, script_body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let dir = self.home_dir.path().join("bin");
        fs::create_dir_all(&dir).expect("Failed to create bin dir");
        let path = dir.join("aws");
        let log = self.home_dir.path().join("aws-calls.log");
        let script = format!(
            "#!/bin/sh\necho \"$*\" >> '{}'\n{}\n",
            log.display(),
            script_body
        );
        fs::write(&path, script).expect("Failed to write fake aws");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("Failed to chmod fake aws");
        path
    }

    /// Lines logged by the fake `aws` CLI
    pub fn aws_calls(&self) -> Vec<String> {
        fs::read_to_string(self.home_dir.path().join("aws-calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

fn output_to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}
