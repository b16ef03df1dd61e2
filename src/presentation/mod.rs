//! Presentation Layer
//!
//! This layer handles:
//! - CLI argument parsing (via clap)
//! - Creating use cases with infrastructure dependencies
//! - Output formatting (text/JSON)
//!
//! ## Structure
//!
//! - `cli` - Command-line definition
//! - `factory` - Creates use cases with proper dependencies (dependency injection)
//! - `output` - Output rendering abstractions
//!
//! ## Usage
//!
//! ```ignore
//! use stackplan::presentation::factory;
//!
//! // Create deploy use case with all dependencies wired up
//! let mut use_case = factory::create_deploy_use_case(document, &state_dir);
//! let summary = use_case.execute(&options)?;
//! ```

pub mod cli;
pub mod factory;
pub mod output;

pub use cli::{Cli, Commands, TargetArgs};
pub use factory::{create_deploy_use_case, create_event_sink, ConcreteDeployUseCase};
pub use output::{create_renderer, OutputFormat, SummaryRenderer, TextRenderer};
