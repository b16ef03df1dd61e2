//! Use Case Factory
//!
//! Creates use cases with infrastructure dependencies wired up.
//! This is the dependency injection point for the application.

use std::path::Path;
use std::sync::Arc;

use crate::application::DeployUseCase;
use crate::config::ConfigDocument;
use crate::domain::ports::DeployEventSink;
use crate::infrastructure::{
    ConsoleEventSink, FileExportStore, JsonEventSink, LocalStateProvisioner, ProcessEnv,
    SopsDecryptor,
};

/// Type alias for the concrete DeployUseCase with all dependencies
pub type ConcreteDeployUseCase = DeployUseCase<LocalStateProvisioner, FileExportStore>;

/// Create a deploy use case with all dependencies wired up
///
/// State (stack records and exports) lives under `state_dir`; secrets are
/// decrypted with sops and context overrides come from the process environment.
pub fn create_deploy_use_case(document: ConfigDocument, state_dir: &Path) -> ConcreteDeployUseCase {
    DeployUseCase::new(
        document,
        LocalStateProvisioner::new(state_dir),
        FileExportStore::in_dir(state_dir),
        Box::new(SopsDecryptor::new()),
        Box::new(ProcessEnv),
    )
}

/// NDJSON on stdout for `--json`, progress lines on stderr otherwise
pub fn create_event_sink(json: bool, verbose: u8) -> Arc<dyn DeployEventSink> {
    if json {
        Arc::new(JsonEventSink::stdout())
    } else {
        Arc::new(ConsoleEventSink::stderr(verbose > 0))
    }
}
