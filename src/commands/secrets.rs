use std::path::Path;

use anyhow::Result;
use stackplan::application::SecretsResolver;
use stackplan::config::closest;
use stackplan::infrastructure::{ProcessEnv, SopsDecryptor};
use stackplan::presentation::cli::secrets_dir_or_default;
use stackplan::StackplanError;

use super::Session;

pub fn cmd_secrets(session: &Session, environment: &str, secrets_dir: Option<&Path>) -> Result<()> {
    let document = &session.config.document;
    if !document.environments.contains_key(environment) {
        let valid = document.environment_names();
        return Err(StackplanError::UnknownEnvironment {
            name: environment.to_string(),
            suggestion: closest(environment, valid.iter().map(String::as_str), 2),
            valid,
        }
        .into());
    }

    let dir = secrets_dir_or_default(secrets_dir, &session.project_root);
    let decryptor = SopsDecryptor::new();
    let resolved = SecretsResolver::new(&decryptor, &ProcessEnv, &dir).resolve(environment)?;

    if session.json {
        let output = serde_json::json!({
            "event": "secrets",
            "environment": environment,
            "source": resolved.source,
            "path": resolved.path.as_ref().map(|p| p.display().to_string()),
            "digest": resolved.bundle.digest().to_string(),
            "keys": resolved.bundle.keys(),
        });
        println!("{}", output);
        return Ok(());
    }

    match &resolved.path {
        Some(path) => println!("Source: {} ({})", resolved.source, path.display()),
        None => println!("Source: {}", resolved.source),
    }
    for line in resolved.bundle.masked() {
        println!("  {}", line);
    }
    Ok(())
}
