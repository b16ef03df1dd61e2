//! Error types for Stackplan
//!
//! Uses `thiserror` for library errors. The binary wraps these in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ports::{DecryptError, ExportError, ProvisionError};

/// Result type alias for Stackplan operations
pub type StackplanResult<T> = Result<T, StackplanError>;

/// Coarse error classification used for exit codes and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Raised before any resource is touched
    Configuration,
    /// Fatal secret-resolution failure
    Secrets,
    /// A resource-creation call failed
    Provisioning,
    /// An ephemeral deployment referenced exports that do not exist
    CrossStackImport,
    /// Local I/O or serialization failure
    Io,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Secrets => "secrets",
            ErrorCategory::Provisioning => "provisioning",
            ErrorCategory::CrossStackImport => "cross-stack import",
            ErrorCategory::Io => "io",
        }
    }

    /// Process exit code for this category
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCategory::Configuration => 2,
            _ => 1,
        }
    }
}

/// Main error type for Stackplan operations
#[derive(Error, Debug)]
pub enum StackplanError {
    /// Environment name is not defined in the configuration document
    #[error("unknown environment '{name}' (valid: {}){}", .valid.join(", "), suggestion_suffix(.suggestion))]
    UnknownEnvironment {
        name: String,
        valid: Vec<String>,
        suggestion: Option<String>,
    },

    /// A feature was requested without context that has no safe default
    #[error("{feature} requires '{key}' to be set")]
    MissingContext { feature: String, key: String },

    /// Configuration document failed to parse or validate
    #[error("invalid configuration in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// Ephemeral identifier sanitizes to nothing usable
    #[error("ephemeral deployment id '{raw}' contains no usable characters")]
    InvalidEphemeralId { raw: String },

    /// Address block could not be parsed
    #[error("invalid address block '{value}': {message}")]
    InvalidCidr { value: String, message: String },

    /// Subnet allocation ran past the end of the network block
    #[error("address space {network} exhausted while allocating a /{prefix} subnet")]
    AddressSpaceExhausted { network: String, prefix: u8 },

    /// Required key missing or empty in a parsed secret bundle
    #[error("secret bundle is missing required key '{key}'")]
    SecretValidation { key: String },

    /// Secret document could not be parsed
    #[error("failed to parse secrets from {path}: {message}")]
    SecretParse { path: PathBuf, message: String },

    /// Decryption failed for a reason other than key-management access
    #[error("failed to decrypt {path}: {message}")]
    SecretDecrypt { path: PathBuf, message: String },

    /// Resource creation failed
    #[error("provisioning {stack}/{resource} failed: {message}")]
    Provisioning {
        stack: String,
        resource: String,
        message: String,
    },

    /// Certificate for an explicitly requested domain could not be validated
    #[error("certificate validation for '{domain}' failed: {message}\n  → Fix: check DNS delegation for the hosted zone")]
    CertificateValidation { domain: String, message: String },

    /// Cross-stack import refers to an export that was never published
    #[error("export '{output}' of stack '{stack}' not found\n  → Fix: deploy the standing environment before creating preview deployments")]
    ExportNotFound { stack: String, output: String },

    /// Resource graph is structurally invalid
    #[error("invalid resource graph: {message}")]
    InvalidGraph { message: String },

    /// Export store could not be read or written
    #[error("export store error: {0}")]
    ExportStore(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(". Did you mean '{}'?", s))
        .unwrap_or_default()
}

impl StackplanError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StackplanError::UnknownEnvironment { .. }
            | StackplanError::MissingContext { .. }
            | StackplanError::InvalidConfig { .. }
            | StackplanError::InvalidEphemeralId { .. }
            | StackplanError::InvalidCidr { .. }
            | StackplanError::AddressSpaceExhausted { .. }
            | StackplanError::InvalidGraph { .. }
            | StackplanError::Toml(_) => ErrorCategory::Configuration,
            StackplanError::SecretValidation { .. }
            | StackplanError::SecretParse { .. }
            | StackplanError::SecretDecrypt { .. } => ErrorCategory::Secrets,
            StackplanError::Provisioning { .. } | StackplanError::CertificateValidation { .. } => {
                ErrorCategory::Provisioning
            }
            StackplanError::ExportNotFound { .. } => ErrorCategory::CrossStackImport,
            StackplanError::ExportStore(_)
            | StackplanError::Io(_)
            | StackplanError::Json(_)
            | StackplanError::Yaml(_) => ErrorCategory::Io,
        }
    }
}

impl From<ExportError> for StackplanError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::NotFound { stack, output } => {
                StackplanError::ExportNotFound { stack, output }
            }
            other => StackplanError::ExportStore(other.to_string()),
        }
    }
}

impl StackplanError {
    /// Attach stack/resource context to a provisioner failure
    pub fn from_provision(stack: &str, resource: &str, err: ProvisionError) -> Self {
        match err {
            ProvisionError::CertificateValidation { domain, message } => {
                StackplanError::CertificateValidation { domain, message }
            }
            other => StackplanError::Provisioning {
                stack: stack.to_string(),
                resource: resource.to_string(),
                message: other.to_string(),
            },
        }
    }

    /// Attach the secret file path to a decrypt failure
    pub fn from_decrypt(path: PathBuf, err: DecryptError) -> Self {
        StackplanError::SecretDecrypt {
            path,
            message: err.to_string(),
        }
    }
}
