//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `exports/` - Export stores (JSON file, in-memory)
//! - `provisioner/` - Local state provisioner
//! - `events/` - Console and NDJSON event sinks
//! - `sops` - Decryptor backed by the sops CLI
//! - `env` - Process and fixed environment sources
//! - `plans` - Saved plans and plan diffs

pub mod env;
pub mod events;
pub mod exports;
pub mod fs;
pub mod plans;
pub mod provisioner;
pub mod sops;

// Re-export for convenience
pub use env::{ProcessEnv, StaticEnv};
pub use events::{ConsoleEventSink, JsonEventSink};
pub use exports::{FileExportStore, InMemoryExportStore};
pub use plans::{diff_plans, render_plan, PlanDiff, PlanStore};
pub use provisioner::LocalStateProvisioner;
pub use sops::SopsDecryptor;
