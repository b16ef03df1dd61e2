//! Output Rendering
//!
//! Renders summaries, plans and exports as text or JSON. Renderers return
//! strings; commands decide where they go.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::application::DeploymentSummary;
use crate::config::ConfigDocument;
use crate::domain::entities::{PublishedExports, ResourceGraph, StackId};

/// Output format for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

/// Icons for output rendering
struct Icons {
    check: &'static str,
    cross: &'static str,
    arrow: &'static str,
    warn: &'static str,
}

impl Icons {
    fn unicode() -> Self {
        Self {
            check: "✓",
            cross: "✗",
            arrow: "→",
            warn: "⚠",
        }
    }

    fn ascii() -> Self {
        Self {
            check: "[OK]",
            cross: "[--]",
            arrow: "->",
            warn: "[!]",
        }
    }
}

/// Trait for rendering deployment summaries
pub trait SummaryRenderer {
    fn render(&self, summary: &DeploymentSummary) -> String;
}

/// Text renderer for summaries and plans
pub struct TextRenderer {
    /// Whether to use unicode
    pub unicode: bool,
    /// Verbosity level
    pub verbose: u8,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            unicode: true,
            verbose: 0,
        }
    }
}

impl TextRenderer {
    fn icons(&self) -> Icons {
        if self.unicode {
            Icons::unicode()
        } else {
            Icons::ascii()
        }
    }

    fn flag(&self, on: bool) -> &'static str {
        let icons = self.icons();
        if on {
            icons.check
        } else {
            icons.cross
        }
    }

    /// Stacks in apply order with resource counts; `-v` lists resources
    pub fn render_graph(&self, graph: &ResourceGraph) -> String {
        let icons = self.icons();
        let mut out = String::new();
        for stack in &graph.stacks {
            let _ = write!(
                out,
                "{} {} ({} resources, {} exports)",
                icons.arrow,
                stack.id,
                stack.resources.len(),
                stack.exports.len()
            );
            if !stack.depends_on.is_empty() {
                let upstream: Vec<&str> = stack.depends_on.iter().map(StackId::as_str).collect();
                let _ = write!(out, " after {}", upstream.join(", "));
            }
            out.push('\n');
            if self.verbose > 0 {
                for resource in &stack.resources {
                    let _ = writeln!(out, "    {} [{}]", resource.id, resource.kind.prefix());
                }
            }
        }
        let external = graph.external_imports();
        if !external.is_empty() {
            out.push_str("  Imports:\n");
            for (stack, outputs) in external {
                for output in outputs {
                    let _ = writeln!(out, "    {}/{}", stack, output);
                }
            }
        }
        out
    }

    pub fn render_environments(&self, document: &ConfigDocument) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Project: {} ({})", document.project, document.region);
        for (name, env) in &document.environments {
            let durability = if env.durability.is_durable() {
                "durable"
            } else {
                "ephemeral"
            };
            let _ = writeln!(
                out,
                "  {:<12} {:<9} {} zones, tasks {}/{}/{}, {} cpu / {} MiB",
                name,
                durability,
                env.network.availability_zones,
                env.capacity.min,
                env.capacity.desired,
                env.capacity.max,
                env.task.cpu,
                env.task.memory
            );
        }
        out
    }

    pub fn render_exports(&self, stacks: &BTreeMap<StackId, PublishedExports>) -> String {
        if stacks.is_empty() {
            return "No exports published\n".to_string();
        }
        let mut out = String::new();
        for (stack, exports) in stacks {
            let _ = writeln!(out, "{}", stack);
            for (name, value) in &exports.values {
                let _ = writeln!(out, "  {} = {}", name, value);
            }
        }
        out
    }
}

impl SummaryRenderer for TextRenderer {
    fn render(&self, summary: &DeploymentSummary) -> String {
        let icons = self.icons();
        let features = &summary.features;
        let mut out = String::new();

        let title = if summary.applied {
            "Deploy Complete"
        } else {
            "Plan Ready"
        };
        let _ = writeln!(out, "{} {}", icons.check, title);
        out.push('\n');
        let _ = writeln!(
            out,
            "  Environment: {} ({}, base {})",
            summary.environment, summary.mode, summary.base_environment
        );
        let _ = writeln!(
            out,
            "  Stacks:      {} ({} resources)",
            summary.stacks.join(", "),
            summary.resource_count
        );
        let _ = writeln!(out, "  Plan:        {}", summary.fingerprint);
        let _ = writeln!(out, "  Secrets:     {}", summary.secrets_source);
        let _ = writeln!(out, "  URL:         {}", summary.application_url);
        out.push('\n');
        let _ = writeln!(
            out,
            "  {} HTTPS (certificate: {})",
            self.flag(features.https),
            features.certificate
        );
        let _ = writeln!(out, "  {} Firewall", self.flag(features.firewall));
        let _ = writeln!(out, "  {} Flow logs", self.flag(features.flow_logs));
        let _ = writeln!(out, "  {} Dual stack", self.flag(features.dual_stack));
        let _ = writeln!(out, "  {} Hardened containers", self.flag(features.hardened));
        let _ = writeln!(
            out,
            "  NAT gateways: {} across {} zones",
            features.nat_gateways, features.availability_zones
        );
        let _ = writeln!(
            out,
            "  Capacity: min {} / desired {} / max {}",
            features.capacity.min, features.capacity.desired, features.capacity.max
        );

        if !summary.warnings.is_empty() {
            out.push('\n');
            let _ = writeln!(out, "  Warnings ({}):", summary.warnings.len());
            for warning in &summary.warnings {
                let _ = writeln!(out, "    {} {}", icons.warn, warning);
            }
        }
        out
    }
}

/// JSON renderer for summaries
pub struct JsonRenderer;

impl SummaryRenderer for JsonRenderer {
    fn render(&self, summary: &DeploymentSummary) -> String {
        let json = serde_json::json!({
            "event": "summary",
            "summary": summary,
        });
        json.to_string()
    }
}

/// Create a renderer based on format
pub fn create_renderer(format: OutputFormat, unicode: bool, verbose: u8) -> Box<dyn SummaryRenderer> {
    match format {
        OutputFormat::Text => Box::new(TextRenderer { unicode, verbose }),
        OutputFormat::Json => Box::new(JsonRenderer),
    }
}
