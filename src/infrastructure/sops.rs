//! sops-backed decryptor

use std::path::Path;
use std::process::Command;

use crate::domain::ports::{DecryptError, Decryptor};

/// stderr fragments that mean the key-management backend refused access
const KEY_ACCESS_MARKERS: [&str; 5] = [
    "kms",
    "access denied",
    "accessdenied",
    "credentials",
    "data key",
];

pub struct SopsDecryptor {
    program: String,
}

impl SopsDecryptor {
    pub fn new() -> Self {
        Self {
            program: "sops".to_string(),
        }
    }

    /// Use a different executable (tests, wrappers)
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SopsDecryptor {
    fn default() -> Self {
        Self::new()
    }
}

impl Decryptor for SopsDecryptor {
    fn name(&self) -> &str {
        &self.program
    }

    fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }

    fn decrypt(&self, path: &Path) -> Result<String, DecryptError> {
        if !path.is_file() {
            return Err(DecryptError::Unavailable(format!(
                "{} does not exist",
                path.display()
            )));
        }

        let output = Command::new(&self.program)
            .args(["--input-type", "yaml", "--output-type", "yaml", "-d"])
            .arg(path)
            .output()
            .map_err(|e| DecryptError::Unavailable(format!("{}: {}", self.program, e)))?;

        if output.status.success() {
            return String::from_utf8(output.stdout)
                .map_err(|e| DecryptError::Failed(format!("output is not UTF-8: {}", e)));
        }

        Err(classify_failure(&String::from_utf8_lossy(&output.stderr)))
    }
}

/// Key-access problems are recoverable; anything else is a broken document
pub fn classify_failure(stderr: &str) -> DecryptError {
    let message = stderr.trim().to_string();
    let lower = message.to_lowercase();
    if KEY_ACCESS_MARKERS.iter().any(|m| lower.contains(m)) {
        DecryptError::KeyAccess(message)
    } else {
        DecryptError::Failed(message)
    }
}
