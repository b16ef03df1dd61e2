//! Deploy Event Port
//!
//! Provides an observable interface for deploy operations.
//! Enables progress reporting, JSON event streams, and debugging.

use crate::domain::entities::{ResourceKind, StackId};

/// Event emitted during deploy operations
#[derive(Debug, Clone)]
pub enum DeployEvent {
    /// Planning finished
    Planned {
        environment: String,
        stack_count: usize,
        resource_count: usize,
        fingerprint: String,
    },

    /// Import of a stack outside this deployment resolved
    ImportResolved { stack: StackId, output: String },

    /// Stack application started
    StackStarted {
        stack: StackId,
        resource_count: usize,
    },

    /// One resource was created
    ResourceCreated {
        stack: StackId,
        resource: String,
        kind: ResourceKind,
        physical_id: String,
    },

    /// Stack applied and its exports published
    StackCompleted {
        stack: StackId,
        export_count: usize,
    },

    /// Non-fatal degradation
    Warning { message: String },

    /// Deploy completed
    Completed {
        stack_count: usize,
        resource_count: usize,
        dry_run: bool,
    },
}

/// Trait for receiving deploy events
///
/// Implementations can be:
/// - ConsoleEventSink: Progress lines on stderr
/// - JsonEventSink: NDJSON event stream for CI
/// - NoopEventSink: Silent operation
pub trait DeployEventSink: Send + Sync {
    /// Handle a deploy event
    fn on_event(&self, event: DeployEvent);

    /// Check if this sink wants per-resource events
    fn wants_detailed_events(&self) -> bool {
        true
    }
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {}

    fn wants_detailed_events(&self) -> bool {
        false
    }
}
