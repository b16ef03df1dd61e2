//! Domain Layer
//!
//! The core of Stackplan: planning logic without I/O dependencies.
//!
//! ## Structure
//!
//! - `entities/` - Resources, stack plans, the resource graph, secret bundles
//! - `value_objects/` - Address blocks, ephemeral ids, certificate sources, hashes
//! - `services/` - Network, platform and application planners plus the composer
//! - `ports/` - Interface definitions for infrastructure
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the file system, processes or network
//! 2. **Deterministic** - The same resolved environment always yields the same graph
//! 3. **Ports & Adapters** - Provisioning, decryption and export lookup go through traits

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
