//! JSON Event Sink
//!
//! Outputs deploy events as NDJSON for CI/automation consumption.

use crate::domain::ports::{DeployEvent, DeployEventSink};
use std::io::{self, Write};
use std::sync::Mutex;

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    /// Mutex to ensure thread-safe writes
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a JSON event sink writing to a custom writer (for testing)
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write_event(&self, event: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

/// JSON form of one event
pub fn event_json(event: &DeployEvent) -> serde_json::Value {
    match event {
        DeployEvent::Planned {
            environment,
            stack_count,
            resource_count,
            fingerprint,
        } => serde_json::json!({
            "event": "planned",
            "command": "deploy",
            "environment": environment,
            "stacks": stack_count,
            "resources": resource_count,
            "fingerprint": fingerprint,
        }),

        DeployEvent::ImportResolved { stack, output } => serde_json::json!({
            "event": "import_resolved",
            "command": "deploy",
            "stack": stack,
            "output": output,
        }),

        DeployEvent::StackStarted {
            stack,
            resource_count,
        } => serde_json::json!({
            "event": "stack_start",
            "command": "deploy",
            "stack": stack,
            "resources": resource_count,
        }),

        DeployEvent::ResourceCreated {
            stack,
            resource,
            kind,
            physical_id,
        } => serde_json::json!({
            "event": "resource_created",
            "command": "deploy",
            "stack": stack,
            "resource": resource,
            "kind": kind,
            "physical_id": physical_id,
        }),

        DeployEvent::StackCompleted {
            stack,
            export_count,
        } => serde_json::json!({
            "event": "stack_complete",
            "command": "deploy",
            "stack": stack,
            "exports": export_count,
        }),

        DeployEvent::Warning { message } => serde_json::json!({
            "event": "warning",
            "command": "deploy",
            "message": message,
        }),

        DeployEvent::Completed {
            stack_count,
            resource_count,
            dry_run,
        } => serde_json::json!({
            "event": "complete",
            "command": "deploy",
            "status": if *dry_run { "planned" } else { "applied" },
            "stacks": stack_count,
            "resources": resource_count,
        }),
    }
}

impl DeployEventSink for JsonEventSink {
    fn on_event(&self, event: DeployEvent) {
        self.write_event(event_json(&event));
    }

    fn wants_detailed_events(&self) -> bool {
        true // JSON mode wants all events
    }
}
