//! AWS CLI secret backend
//!
//! Talks to SSM Parameter Store and KMS by shelling out to the `aws` binary
//! with `--output json`. Region comes from configuration, the CLI profile,
//! or EC2 instance metadata, in that order.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;

use crate::config::AwsConfig;
use crate::domain::ports::{Parameter, ParameterPage, SecretBackend};
use crate::secrets::{LookupReason, SecretError};

const IMDS_TOKEN_URL: &str = "http://169.254.169.254/latest/api/token";
const IMDS_IDENTITY_URL: &str = "http://169.254.169.254/latest/dynamic/instance-identity/document";
const IMDS_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetParameterOutput {
    parameter: ParameterOutput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParameterOutput {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetParametersByPathOutput {
    #[serde(default)]
    parameters: Vec<ParameterOutput>,
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DecryptOutput {
    plaintext: String,
}

#[derive(Debug, Deserialize)]
struct IdentityDocument {
    region: String,
}

/// A failed `aws` invocation
#[derive(Debug)]
struct CliFailure {
    stderr: String,
}

impl CliFailure {
    fn reason(&self) -> LookupReason {
        if self.stderr.contains("ParameterNotFound")
            || self.stderr.contains("ParameterVersionNotFound")
        {
            LookupReason::NotFound
        } else if self.stderr.contains("AccessDenied")
            || self.stderr.contains("UnauthorizedOperation")
        {
            LookupReason::AccessDenied
        } else {
            LookupReason::Backend
        }
    }
}

/// [`SecretBackend`] backed by the `aws` command line tool
#[derive(Debug, Clone)]
pub struct AwsCliBackend {
    binary: PathBuf,
    region: String,
    profile: Option<String>,
    page_size: u32,
}

impl AwsCliBackend {
    /// Locate the CLI and determine the region.
    pub fn connect(config: &AwsConfig) -> Result<Self, SecretError> {
        let binary = which::which(&config.binary).map_err(|e| {
            SecretError::ServiceInit(format!(
                "'{}' not found in PATH ({e}); install the AWS CLI or set aws.binary",
                config.binary
            ))
        })?;

        let region = match config.region.clone().filter(|r| !r.is_empty()) {
            Some(region) => region,
            None => discover_region(&binary, config.profile.as_deref())?,
        };
        tracing::debug!(binary = %binary.display(), region = %region, "using AWS CLI backend");

        Ok(Self {
            binary,
            region,
            profile: config.profile.clone(),
            page_size: config.page_size.max(1),
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    fn base_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["--output".into(), "json".into()];
        args.push("--region".into());
        args.push(self.region.clone().into());
        if let Some(profile) = &self.profile {
            args.push("--profile".into());
            args.push(profile.into());
        }
        args
    }

    fn run(&self, args: Vec<OsString>) -> Result<Result<Vec<u8>, CliFailure>, SecretError> {
        let output = Command::new(&self.binary)
            .args(self.base_args())
            .args(&args)
            .output()
            .map_err(|e| {
                SecretError::ServiceInit(format!(
                    "failed to execute '{}': {e}",
                    self.binary.display()
                ))
            })?;

        if output.status.success() {
            Ok(Ok(output.stdout))
        } else {
            Ok(Err(CliFailure {
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }))
        }
    }
}

fn with_decryption(args: &mut Vec<OsString>, decrypt: bool) {
    args.push(if decrypt {
        "--with-decryption".into()
    } else {
        "--no-with-decryption".into()
    });
}

fn parse_parameter(key: &str, stdout: &[u8]) -> Result<String, SecretError> {
    let output: GetParameterOutput = serde_json::from_slice(stdout)
        .map_err(|e| SecretError::lookup(key, LookupReason::Backend, e.to_string()))?;
    Ok(output.parameter.value)
}

fn parse_page(path: &str, stdout: &[u8]) -> Result<ParameterPage, SecretError> {
    let output: GetParametersByPathOutput = serde_json::from_slice(stdout)
        .map_err(|e| SecretError::lookup(path, LookupReason::Backend, e.to_string()))?;
    Ok(ParameterPage {
        parameters: output
            .parameters
            .into_iter()
            .map(|p| Parameter {
                name: p.name,
                value: p.value,
            })
            .collect(),
        next_token: output.next_token.filter(|t| !t.is_empty()),
    })
}

fn parse_plaintext(stdout: &[u8]) -> Result<Vec<u8>, SecretError> {
    let output: DecryptOutput =
        serde_json::from_slice(stdout).map_err(|e| SecretError::Decrypt(e.to_string()))?;
    STANDARD
        .decode(output.plaintext.trim())
        .map_err(|e| SecretError::Decrypt(format!("plaintext is not valid base64: {e}")))
}

impl SecretBackend for AwsCliBackend {
    fn get_parameter(&self, key: &str, decrypt: bool) -> Result<String, SecretError> {
        let mut args: Vec<OsString> = vec![
            "ssm".into(),
            "get-parameter".into(),
            "--name".into(),
            key.into(),
        ];
        with_decryption(&mut args, decrypt);

        match self.run(args)? {
            Ok(stdout) => parse_parameter(key, &stdout),
            Err(failure) => Err(SecretError::lookup(key, failure.reason(), failure.stderr)),
        }
    }

    fn get_parameters_by_path(
        &self,
        path: &str,
        decrypt: bool,
        recursive: bool,
        next_token: Option<&str>,
    ) -> Result<ParameterPage, SecretError> {
        let mut args: Vec<OsString> = vec![
            "ssm".into(),
            "get-parameters-by-path".into(),
            "--path".into(),
            path.into(),
            "--max-items".into(),
            self.page_size.to_string().into(),
        ];
        with_decryption(&mut args, decrypt);
        if recursive {
            args.push("--recursive".into());
        }
        if let Some(token) = next_token {
            args.push("--starting-token".into());
            args.push(token.into());
        }

        match self.run(args)? {
            Ok(stdout) => parse_page(path, &stdout),
            Err(failure) => Err(SecretError::lookup(path, failure.reason(), failure.stderr)),
        }
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, SecretError> {
        // fileb:// keeps the blob out of the process arguments
        let mut blob = tempfile::NamedTempFile::new()
            .and_then(|mut f| f.write_all(ciphertext).map(|_| f))
            .map_err(|e| SecretError::Decrypt(e.to_string()))?;
        blob.flush().map_err(|e| SecretError::Decrypt(e.to_string()))?;

        let mut blob_arg = OsString::from("fileb://");
        blob_arg.push(blob.path());
        let args: Vec<OsString> = vec![
            "kms".into(),
            "decrypt".into(),
            "--ciphertext-blob".into(),
            blob_arg,
        ];

        match self.run(args)? {
            Ok(stdout) => parse_plaintext(&stdout),
            Err(failure) => Err(SecretError::Decrypt(failure.stderr)),
        }
    }
}

/// Region from `aws configure get region`, then instance metadata.
fn discover_region(binary: &Path, profile: Option<&str>) -> Result<String, SecretError> {
    if let Some(region) = configured_region(binary, profile) {
        return Ok(region);
    }

    metadata_region().map_err(|e| {
        SecretError::ServiceInit(format!(
            "AWS_REGION is unset or incorrect and could not determine region via instance metadata: {e}"
        ))
    })
}

fn configured_region(binary: &Path, profile: Option<&str>) -> Option<String> {
    let mut command = Command::new(binary);
    command.args(["configure", "get", "region"]);
    if let Some(profile) = profile {
        command.args(["--profile", profile]);
    }

    let output = command.output().ok()?;
    if !output.status.success() {
        return None;
    }
    let region = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!region.is_empty()).then_some(region)
}

/// IMDSv2 token then the instance identity document
fn metadata_region() -> Result<String, reqwest::Error> {
    let client = reqwest::blocking::Client::builder()
        .timeout(IMDS_TIMEOUT)
        .build()?;

    let token = client
        .put(IMDS_TOKEN_URL)
        .header("X-aws-ec2-metadata-token-ttl-seconds", "60")
        .send()?
        .error_for_status()?
        .text()?;

    let document: IdentityDocument = client
        .get(IMDS_IDENTITY_URL)
        .header("X-aws-ec2-metadata-token", token)
        .send()?
        .error_for_status()?
        .json()?;

    Ok(document.region)
}
