//! Secrets Resolver
//!
//! Produces the secret bundle for one environment through a fixed fallback
//! chain:
//!
//! 1. decrypt `<dir>/<env>/secrets.enc.yaml`
//! 2. read `<dir>/<env>/secrets.dec.yaml`
//! 3. build from process environment variables with placeholders
//!
//! Step 1 falls through only when the tool is unavailable, the encrypted file
//! is missing, or key-management access failed. A document that parses but
//! lacks a required key is fatal on both file paths; step 3 never fails.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::entities::SecretBundle;
use crate::domain::ports::{Decryptor, EnvSource};
use crate::error::{StackplanError, StackplanResult};

pub const ENCRYPTED_FILE: &str = "secrets.enc.yaml";
pub const PLAINTEXT_FILE: &str = "secrets.dec.yaml";
pub const DEFAULT_SECRETS_DIR: &str = "secrets";

pub const DEFAULT_DATABASE_URL: &str = "sqlite:///db.sqlite3";
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379/0";

/// Where the bundle came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretSource {
    Decrypted,
    Plaintext,
    Environment,
}

impl SecretSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecretSource::Decrypted => "decrypted",
            SecretSource::Plaintext => "plaintext",
            SecretSource::Environment => "environment",
        }
    }
}

impl fmt::Display for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSecrets {
    pub bundle: SecretBundle,
    pub source: SecretSource,
    /// File the bundle was read from, if any
    pub path: Option<PathBuf>,
}

pub struct SecretsResolver<'a> {
    decryptor: &'a dyn Decryptor,
    env: &'a dyn EnvSource,
    root: PathBuf,
}

impl<'a> SecretsResolver<'a> {
    pub fn new(decryptor: &'a dyn Decryptor, env: &'a dyn EnvSource, root: impl Into<PathBuf>) -> Self {
        Self {
            decryptor,
            env,
            root: root.into(),
        }
    }

    pub fn encrypted_path(&self, environment: &str) -> PathBuf {
        self.root.join(environment).join(ENCRYPTED_FILE)
    }

    pub fn plaintext_path(&self, environment: &str) -> PathBuf {
        self.root.join(environment).join(PLAINTEXT_FILE)
    }

    /// Run the fallback chain for `environment`
    pub fn resolve(&self, environment: &str) -> StackplanResult<ResolvedSecrets> {
        let encrypted = self.encrypted_path(environment);

        if !encrypted.is_file() {
            tracing::debug!("no encrypted secrets at {}", encrypted.display());
        } else if !self.decryptor.is_available() {
            tracing::warn!(
                "{} not available; skipping {}",
                self.decryptor.name(),
                encrypted.display()
            );
        } else {
            match self.decryptor.decrypt(&encrypted) {
                Ok(plaintext) => {
                    let bundle = parse_bundle(&plaintext, &encrypted)?;
                    return Ok(ResolvedSecrets {
                        bundle,
                        source: SecretSource::Decrypted,
                        path: Some(encrypted),
                    });
                }
                Err(err) if err.is_recoverable() => {
                    tracing::warn!("decrypting {} failed: {}", encrypted.display(), err);
                }
                Err(err) => return Err(StackplanError::from_decrypt(encrypted, err)),
            }
        }

        let plaintext = self.plaintext_path(environment);
        if plaintext.is_file() {
            let content = std::fs::read_to_string(&plaintext)?;
            let bundle = parse_bundle(&content, &plaintext)?;
            tracing::info!("using plaintext secrets from {}", plaintext.display());
            return Ok(ResolvedSecrets {
                bundle,
                source: SecretSource::Plaintext,
                path: Some(plaintext),
            });
        }

        tracing::warn!(
            "no secrets file for '{}'; falling back to environment variables",
            environment
        );
        Ok(ResolvedSecrets {
            bundle: from_environment(self.env, environment),
            source: SecretSource::Environment,
            path: None,
        })
    }
}

/// Parse a YAML secret document and check the required keys
pub fn parse_bundle(content: &str, path: &Path) -> StackplanResult<SecretBundle> {
    let parse_error = |message: String| StackplanError::SecretParse {
        path: path.to_path_buf(),
        message,
    };
    let doc: serde_yaml_ng::Value =
        serde_yaml_ng::from_str(content).map_err(|e| parse_error(e.to_string()))?;
    let bundle = SecretBundle::from_yaml(&doc).map_err(parse_error)?;
    if let Some(key) = bundle.missing_required() {
        return Err(StackplanError::SecretValidation { key });
    }
    Ok(bundle)
}

/// Bundle built from process environment variables
///
/// Unset values get placeholders so the result always passes validation.
pub fn from_environment(env: &dyn EnvSource, environment: &str) -> SecretBundle {
    let var = |key: &str, default: String| env.var(key).unwrap_or(default);

    let mut bundle = SecretBundle::new();
    bundle.insert(
        "application",
        "secret_key",
        var("SECRET_KEY", format!("{}-insecure-placeholder-secret-key", environment)),
    );
    bundle.insert(
        "application",
        "required_setting",
        var("REQUIRED_SETTING", format!("{}-placeholder", environment)),
    );
    bundle.insert(
        "services",
        "database_url",
        var("DATABASE_URL", DEFAULT_DATABASE_URL.to_string()),
    );
    bundle.insert(
        "services",
        "redis_url",
        var("REDIS_URL", DEFAULT_REDIS_URL.to_string()),
    );
    bundle.insert("observability", "sentry_dsn", var("SENTRY_DSN", String::new()));
    bundle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::DecryptError;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    struct FakeDecryptor {
        available: bool,
        result: Result<String, DecryptError>,
    }

    impl Decryptor for FakeDecryptor {
        fn name(&self) -> &str {
            "fake"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn decrypt(&self, _path: &Path) -> Result<String, DecryptError> {
            self.result.clone()
        }
    }

    #[derive(Default)]
    struct Vars(HashMap<String, String>);

    impl EnvSource for Vars {
        fn var(&self, key: &str) -> Option<String> {
            self.0.get(key).cloned()
        }
    }

    const VALID: &str = "application:\n  secret_key: s3cr3t\n  required_setting: on-file\nservices:\n  database_url: postgres://db/app\n";

    fn decrypting(result: Result<String, DecryptError>) -> FakeDecryptor {
        FakeDecryptor {
            available: true,
            result,
        }
    }

    fn write(root: &Path, env: &str, file: &str, content: &str) {
        fs::create_dir_all(root.join(env)).unwrap();
        fs::write(root.join(env).join(file), content).unwrap();
    }

    #[test]
    fn decrypted_bundle_is_returned_unchanged() {
        let dir = tempdir().unwrap();
        write(dir.path(), "dev", ENCRYPTED_FILE, "ENC[...]");
        let decryptor = decrypting(Ok(VALID.to_string()));
        let env = Vars::default();

        let resolved = SecretsResolver::new(&decryptor, &env, dir.path())
            .resolve("dev")
            .unwrap();
        assert_eq!(resolved.source, SecretSource::Decrypted);
        assert_eq!(resolved.bundle.get("application", "secret_key"), Some("s3cr3t"));
        assert_eq!(
            resolved.bundle.get("services", "database_url"),
            Some("postgres://db/app")
        );
    }

    #[test]
    fn missing_signing_key_is_fatal() {
        let dir = tempdir().unwrap();
        write(dir.path(), "dev", ENCRYPTED_FILE, "ENC[...]");
        let decryptor = decrypting(Ok("application:\n  required_setting: x\n".to_string()));
        let env = Vars::default();

        let err = SecretsResolver::new(&decryptor, &env, dir.path())
            .resolve("dev")
            .unwrap_err();
        match err {
            StackplanError::SecretValidation { key } => {
                assert_eq!(key, "application.secret_key")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unavailable_tool_falls_back_to_plaintext() {
        let dir = tempdir().unwrap();
        write(dir.path(), "staging", ENCRYPTED_FILE, "ENC[...]");
        write(dir.path(), "staging", PLAINTEXT_FILE, VALID);
        let decryptor = FakeDecryptor {
            available: false,
            result: Err(DecryptError::Unavailable("sops".into())),
        };
        let env = Vars::default();

        let resolved = SecretsResolver::new(&decryptor, &env, dir.path())
            .resolve("staging")
            .unwrap();
        assert_eq!(resolved.source, SecretSource::Plaintext);
        assert_eq!(
            resolved.bundle.get("application", "required_setting"),
            Some("on-file")
        );
    }

    #[test]
    fn key_access_failure_falls_back_to_environment() {
        let dir = tempdir().unwrap();
        write(dir.path(), "dev", ENCRYPTED_FILE, "ENC[...]");
        let decryptor = decrypting(Err(DecryptError::KeyAccess("AccessDenied".into())));
        let mut env = Vars::default();
        env.0.insert("SECRET_KEY".into(), "from-env".into());

        let resolved = SecretsResolver::new(&decryptor, &env, dir.path())
            .resolve("dev")
            .unwrap();
        assert_eq!(resolved.source, SecretSource::Environment);
        assert_eq!(resolved.bundle.get("application", "secret_key"), Some("from-env"));
        assert_eq!(
            resolved.bundle.get("application", "required_setting"),
            Some("dev-placeholder")
        );
    }

    #[test]
    fn corrupt_encrypted_file_is_fatal() {
        let dir = tempdir().unwrap();
        write(dir.path(), "dev", ENCRYPTED_FILE, "ENC[...]");
        write(dir.path(), "dev", PLAINTEXT_FILE, VALID);
        let decryptor = decrypting(Err(DecryptError::Failed("MAC mismatch".into())));
        let env = Vars::default();

        let err = SecretsResolver::new(&decryptor, &env, dir.path())
            .resolve("dev")
            .unwrap_err();
        assert!(matches!(err, StackplanError::SecretDecrypt { .. }));
    }

    #[test]
    fn malformed_plaintext_is_a_parse_error() {
        let dir = tempdir().unwrap();
        write(dir.path(), "dev", PLAINTEXT_FILE, "- just\n- a list\n");
        let decryptor = decrypting(Err(DecryptError::Unavailable("sops".into())));
        let env = Vars::default();

        let err = SecretsResolver::new(&decryptor, &env, dir.path())
            .resolve("dev")
            .unwrap_err();
        assert!(matches!(err, StackplanError::SecretParse { .. }));
    }

    #[test]
    fn nothing_on_disk_never_fails() {
        let dir = tempdir().unwrap();
        let decryptor = decrypting(Err(DecryptError::Unavailable("sops".into())));
        let env = Vars::default();

        let resolved = SecretsResolver::new(&decryptor, &env, dir.path())
            .resolve("production")
            .unwrap();
        assert_eq!(resolved.source, SecretSource::Environment);
        assert_eq!(resolved.path, None);
        assert_eq!(
            resolved.bundle.get("application", "secret_key"),
            Some("production-insecure-placeholder-secret-key")
        );
        assert_eq!(
            resolved.bundle.get("services", "redis_url"),
            Some(DEFAULT_REDIS_URL)
        );
        assert_eq!(resolved.bundle.missing_required(), None);
    }
}
