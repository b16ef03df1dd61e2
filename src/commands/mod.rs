//! Command handlers
//!
//! Each handler takes the shared `Session` built from global flags and
//! prints its own output. Errors bubble up to `main` for exit-code mapping.

pub mod deploy;
pub mod environments;
pub mod exports;
pub mod plan;
pub mod project_root;
pub mod secrets;

use std::path::{Path, PathBuf};

use anyhow::Result;
use is_terminal::IsTerminal;
use stackplan::config::{load_or_default, ConfigWarning, LoadedConfig};
use stackplan::presentation::cli::{Cli, DEFAULT_STATE_DIR};
use stackplan::presentation::TextRenderer;

use project_root::discover_project_root;

/// Global flags resolved against the filesystem
pub struct Session {
    pub json: bool,
    pub verbose: u8,
    pub project_root: PathBuf,
    pub state_dir: PathBuf,
    pub config: LoadedConfig,
}

impl Session {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let project_root = match &cli.project_root {
            Some(root) => root.clone(),
            None => discover_project_root(&std::env::current_dir()?),
        };
        let state_dir = match &cli.state_dir {
            Some(dir) => dir.clone(),
            None => project_root.join(DEFAULT_STATE_DIR),
        };
        let config = load_or_default(&project_root, cli.config.as_deref())?;
        if !cli.json {
            print_config_warnings(&config.source, &config.warnings);
        }
        tracing::debug!(
            root = %project_root.display(),
            state = %state_dir.display(),
            "session ready"
        );

        Ok(Self {
            json: cli.json,
            verbose: cli.verbose,
            project_root,
            state_dir,
            config,
        })
    }

    pub fn text_renderer(&self) -> TextRenderer {
        TextRenderer {
            unicode: std::io::stdout().is_terminal(),
            verbose: self.verbose,
        }
    }
}

pub fn print_config_warnings(path: &Path, warnings: &[ConfigWarning]) {
    for w in warnings {
        if let Some(line) = w.line {
            eprintln!("⚠ Unknown config key '{}' in {}:{}", w.key, path.display(), line);
        } else {
            eprintln!("⚠ Unknown config key '{}' in {}", w.key, path.display());
        }

        if let Some(suggestion) = &w.suggestion {
            eprintln!("   Did you mean '{}'?\n", suggestion);
        }
    }
}
