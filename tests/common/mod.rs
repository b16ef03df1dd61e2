//! Common test utilities for Stackplan CLI and scenario tests.
//!
//! This module provides:
//! - `TestEnv`: Isolated project directory with CLI helpers
//! - Assertion macros: `assert_success!`, `assert_output_contains!`, etc.
//! - Fixtures: Reusable configuration and secret documents

#![allow(dead_code)]

pub mod assertions;
pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;
