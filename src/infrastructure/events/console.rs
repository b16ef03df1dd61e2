//! Console Event Sink
//!
//! Human-readable progress lines on stderr.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::domain::ports::{DeployEvent, DeployEventSink};

pub struct ConsoleEventSink {
    writer: Mutex<Box<dyn Write + Send>>,
    verbose: bool,
}

impl ConsoleEventSink {
    pub fn stderr(verbose: bool) -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stderr())),
            verbose,
        }
    }

    pub fn with_writer<W: Write + Send + 'static>(writer: W, verbose: bool) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            verbose,
        }
    }

    fn line(&self, text: String) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", text);
        }
    }
}

/// One progress line, or `None` for events the console skips
pub fn event_line(event: &DeployEvent) -> Option<String> {
    match event {
        DeployEvent::Planned {
            environment,
            stack_count,
            resource_count,
            ..
        } => Some(format!(
            "Planned {}: {} stacks, {} resources",
            environment, stack_count, resource_count
        )),
        DeployEvent::ImportResolved { stack, output } => {
            Some(format!("  ✓ import {}/{}", stack, output))
        }
        DeployEvent::StackStarted {
            stack,
            resource_count,
        } => Some(format!("→ {} ({} resources)", stack, resource_count)),
        DeployEvent::ResourceCreated {
            resource,
            physical_id,
            ..
        } => Some(format!("    + {} [{}]", resource, physical_id)),
        DeployEvent::StackCompleted {
            stack,
            export_count,
        } => Some(format!("  ✓ {} ({} exports)", stack, export_count)),
        DeployEvent::Warning { message } => Some(format!("⚠ {}", message)),
        DeployEvent::Completed { dry_run: true, .. } => {
            Some("Dry run: nothing was created".to_string())
        }
        DeployEvent::Completed { .. } => None,
    }
}

impl DeployEventSink for ConsoleEventSink {
    fn on_event(&self, event: DeployEvent) {
        if let Some(text) = event_line(&event) {
            self.line(text);
        }
    }

    fn wants_detailed_events(&self) -> bool {
        self.verbose
    }
}
