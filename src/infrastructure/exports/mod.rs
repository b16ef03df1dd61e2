//! Export store implementations

mod file;
mod memory;

pub use file::{FileExportStore, EXPORTS_FILE};
pub use memory::InMemoryExportStore;
