//! Configuration loading and validation

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::value_objects::{sanitize, Ipv4Block, Ipv6Block, MAX_TOKEN_LEN};
use crate::error::{StackplanError, StackplanResult};

use super::suggest::closest;
use super::types::{ConfigDocument, EnvironmentSpec, TargetTracking};

/// Project-level configuration file name
pub const CONFIG_FILE_NAME: &str = "stackplan.toml";

/// Label used in messages for the embedded document
pub const BUILTIN_LABEL: &str = "<built-in>";

const BUILTIN_DEFAULTS: &str = include_str!("defaults.toml");

/// Highest availability-zone count the resolver can name
pub const MAX_AVAILABILITY_ZONES: u8 = 6;

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

/// A loaded, validated document and where it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub document: ConfigDocument,
    pub source: PathBuf,
    pub warnings: Vec<ConfigWarning>,
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> StackplanResult<(ConfigDocument, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;
    parse_with_warnings(&content, path)
}

/// Parse a document from text; `file` is only used for messages
pub fn parse_with_warnings(
    content: &str,
    file: &Path,
) -> StackplanResult<(ConfigDocument, Vec<ConfigWarning>)> {
    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(content);

    let document: ConfigDocument = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| StackplanError::InvalidConfig {
        file: file.to_path_buf(),
        message: e.to_string(),
    })?;

    validate(&document, file)?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: file.to_path_buf(),
                line: find_line_number(content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((document, warnings))
}

/// The embedded `dev`/`staging`/`production` document
pub fn builtin() -> StackplanResult<ConfigDocument> {
    let (document, _) = parse_with_warnings(BUILTIN_DEFAULTS, Path::new(BUILTIN_LABEL))?;
    Ok(document)
}

/// Load an explicit file, the project's `stackplan.toml`, or the built-in document
pub fn load_or_default(project_root: &Path, explicit: Option<&Path>) -> StackplanResult<LoadedConfig> {
    let candidate = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(StackplanError::InvalidConfig {
                    file: path.to_path_buf(),
                    message: "file not found".to_string(),
                });
            }
            Some(path.to_path_buf())
        }
        None => {
            let project = project_root.join(CONFIG_FILE_NAME);
            project.exists().then_some(project)
        }
    };

    match candidate {
        Some(path) => {
            let (document, warnings) = load_with_warnings(&path)?;
            tracing::debug!(path = %path.display(), "loaded configuration");
            Ok(LoadedConfig {
                document,
                source: path,
                warnings,
            })
        }
        None => Ok(LoadedConfig {
            document: builtin()?,
            source: PathBuf::from(BUILTIN_LABEL),
            warnings: Vec::new(),
        }),
    }
}

/// Structural checks a planner relies on
pub fn validate(document: &ConfigDocument, file: &Path) -> StackplanResult<()> {
    let fail = |env: &str, message: String| StackplanError::InvalidConfig {
        file: file.to_path_buf(),
        message: format!("environments.{}: {}", env, message),
    };

    if document.environments.is_empty() {
        return Err(StackplanError::InvalidConfig {
            file: file.to_path_buf(),
            message: "no environments defined".to_string(),
        });
    }
    if document.project.trim().is_empty() {
        return Err(StackplanError::InvalidConfig {
            file: file.to_path_buf(),
            message: "project must not be empty".to_string(),
        });
    }
    if sanitize(&document.project) != document.project {
        return Err(StackplanError::InvalidConfig {
            file: file.to_path_buf(),
            message: format!(
                "project '{}' must be a lowercase DNS label of at most {} characters (try '{}')",
                document.project,
                MAX_TOKEN_LEN,
                sanitize(&document.project)
            ),
        });
    }

    for (name, env) in &document.environments {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(fail(name, "names must match [a-z0-9-]+".to_string()));
        }
        if name.starts_with("pr-") {
            return Err(fail(name, "the 'pr-' prefix is reserved".to_string()));
        }
        validate_environment(env).map_err(|message| fail(name, message))?;
    }
    Ok(())
}

fn validate_environment(env: &EnvironmentSpec) -> Result<(), String> {
    let network = &env.network;
    let block: Ipv4Block = network.cidr.parse().map_err(|e: StackplanError| e.to_string())?;
    for (label, mask) in [
        ("public_subnet_mask", network.public_subnet_mask),
        ("private_subnet_mask", network.private_subnet_mask),
    ] {
        if mask <= block.prefix() || mask > 28 {
            return Err(format!(
                "network.{} must be between /{} and /28",
                label,
                block.prefix() + 1
            ));
        }
    }
    if network.availability_zones == 0 || network.availability_zones > MAX_AVAILABILITY_ZONES {
        return Err(format!(
            "network.availability_zones must be between 1 and {}",
            MAX_AVAILABILITY_ZONES
        ));
    }
    if !network.nat.high_availability && network.nat.gateways == 0 {
        return Err("network.nat.gateways must be at least 1".to_string());
    }
    if network.dual_stack {
        let raw = network
            .ipv6_block
            .as_deref()
            .ok_or_else(|| "network.ipv6_block is required when dual_stack is on".to_string())?;
        let v6: Ipv6Block = raw.parse().map_err(|e: StackplanError| e.to_string())?;
        if v6.prefix() > 56 {
            return Err("network.ipv6_block must be a /56 or wider".to_string());
        }
    }

    let cap = &env.capacity;
    if !(cap.min <= cap.desired && cap.desired <= cap.max) {
        return Err(format!(
            "capacity must satisfy min <= desired <= max (got {}/{}/{})",
            cap.min, cap.desired, cap.max
        ));
    }
    if cap.max == 0 {
        return Err("capacity.max must be at least 1".to_string());
    }

    if env.task.memory == 0 || env.task.cpu == 0 {
        return Err("task.cpu and task.memory must be positive".to_string());
    }

    check_tracking("scaling.cpu", &env.scaling.cpu)?;
    check_tracking("scaling.memory", &env.scaling.memory)?;

    let hc = &env.health_check;
    if !hc.path.starts_with('/') {
        return Err("health_check.path must start with '/'".to_string());
    }
    if hc.timeout_secs >= hc.interval_secs {
        return Err("health_check.timeout_secs must be below interval_secs".to_string());
    }
    if !(200..=499).contains(&hc.expected_status) {
        return Err("health_check.expected_status must be between 200 and 499".to_string());
    }

    if env.container.port == 0 || env.container.port > u16::MAX - 2 {
        return Err("container.port is out of range".to_string());
    }
    if env.firewall.enabled && env.firewall.rate_limit < 100 {
        return Err("firewall.rate_limit must be at least 100".to_string());
    }
    Ok(())
}

fn check_tracking(label: &str, tracking: &TargetTracking) -> Result<(), String> {
    if tracking.target_utilization == 0 || tracking.target_utilization > 100 {
        return Err(format!("{}.target_utilization must be within 1-100", label));
    }
    if tracking.scale_out_cooldown_secs >= tracking.scale_in_cooldown_secs {
        return Err(format!(
            "{}: scale-out cool-down must be shorter than scale-in cool-down",
            label
        ));
    }
    Ok(())
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "project",
        "region",
        "environments",
        "durability",
        "network",
        "cidr",
        "public_subnet_mask",
        "private_subnet_mask",
        "availability_zones",
        "nat",
        "high_availability",
        "gateways",
        "dual_stack",
        "ipv6_block",
        "flow_logs",
        "enabled",
        "retention_days",
        "cold_storage_after_days",
        "capacity",
        "desired",
        "min",
        "max",
        "task",
        "cpu",
        "memory",
        "scaling",
        "target_utilization",
        "scale_out_cooldown_secs",
        "scale_in_cooldown_secs",
        "health_check",
        "path",
        "expected_status",
        "interval_secs",
        "timeout_secs",
        "healthy_threshold",
        "unhealthy_threshold",
        "firewall",
        "rate_limit",
        "blocked_countries",
        "container",
        "port",
        "run_as_non_root",
        "read_only_root_filesystem",
        "writable_paths",
        "environment",
        "logs",
    ];

    closest(unknown, CANDIDATES.iter().copied(), 2)
}
