//! Environment resolver
//!
//! Turns one environment table of the configuration document plus the
//! per-invocation context into the fully derived settings the planners
//! consume. Pure apart from `tracing` warnings; every warning is also kept on
//! the result so it reaches the deployment summary.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::value_objects::{
    CertificateSource, Durability, EphemeralId, Ipv4Block, Ipv6Block,
};
use crate::error::{StackplanError, StackplanResult};

use super::context::DeploymentContext;
use super::loader::MAX_AVAILABILITY_ZONES;
use super::suggest::closest;
use super::types::{
    Capacity, ConfigDocument, EnvironmentSpec, HealthCheck, TargetTracking, TaskSizing,
};

/// Capacity bounds for review deployments
pub const EPHEMERAL_CAPACITY: Capacity = Capacity {
    desired: 1,
    min: 1,
    max: 2,
};

/// Image tag used for standing environments when none is supplied
pub const DEFAULT_IMAGE_TAG: &str = "latest";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Full Network, Platform and Application stacks
    Standing,
    /// Application stack only, importing a standing environment's outputs
    Ephemeral { id: EphemeralId },
}

impl DeploymentMode {
    pub fn label(&self) -> &'static str {
        match self {
            DeploymentMode::Standing => "standing",
            DeploymentMode::Ephemeral { .. } => "ephemeral",
        }
    }

    pub fn ephemeral_id(&self) -> Option<&EphemeralId> {
        match self {
            DeploymentMode::Standing => None,
            DeploymentMode::Ephemeral { id } => Some(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowLogSettings {
    pub retention_days: u32,
    /// Cold-storage transition; only ever set for durable environments
    pub cold_storage_after_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkSettings {
    pub cidr: Ipv4Block,
    pub public_subnet_mask: u8,
    pub private_subnet_mask: u8,
    pub availability_zones: Vec<String>,
    pub nat_gateways: usize,
    pub nat_high_availability: bool,
    pub ipv6_block: Option<Ipv6Block>,
    pub flow_logs: Option<FlowLogSettings>,
}

impl NetworkSettings {
    pub fn zone_count(&self) -> usize {
        self.availability_zones.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirewallSettings {
    pub rate_limit: u32,
    /// Empty unless the environment is durable
    pub blocked_countries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hardening {
    pub run_as_non_root: bool,
    pub read_only_root_filesystem: bool,
    pub writable_paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerSettings {
    pub port: u16,
    pub image_tag: String,
    pub hardening: Option<Hardening>,
    pub environment: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScalingSettings {
    pub cpu: TargetTracking,
    pub memory: TargetTracking,
}

/// Everything a planner needs for one deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEnvironment {
    /// Name used in stack ids: the environment, or `pr-<token>`
    pub name: String,
    /// Standing environment the deployment belongs to
    pub base_environment: String,
    pub project: String,
    pub region: String,
    pub durability: Durability,
    #[serde(flatten)]
    pub mode: DeploymentMode,
    pub network: NetworkSettings,
    pub capacity: Capacity,
    pub task: TaskSizing,
    pub scaling: ScalingSettings,
    pub health_check: HealthCheck,
    pub firewall: Option<FirewallSettings>,
    pub container: ContainerSettings,
    pub certificate: CertificateSource,
    /// Public host name when HTTPS is enabled
    pub public_host: Option<String>,
    pub log_retention_days: u32,
    pub warnings: Vec<String>,
}

impl ResolvedEnvironment {
    pub fn is_ephemeral(&self) -> bool {
        matches!(self.mode, DeploymentMode::Ephemeral { .. })
    }

    pub fn https(&self) -> bool {
        self.certificate.is_https()
    }
}

/// Resolve `name` against `document` with the given context
pub fn resolve(
    document: &ConfigDocument,
    name: &str,
    context: &DeploymentContext,
) -> StackplanResult<ResolvedEnvironment> {
    let context = context.clone().normalized();
    let spec = document.environments.get(name).ok_or_else(|| {
        let valid = document.environment_names();
        StackplanError::UnknownEnvironment {
            name: name.to_string(),
            suggestion: closest(name, valid.iter().map(String::as_str), 2),
            valid,
        }
    })?;

    let mut warnings = Vec::new();
    let mut warn = |message: String| {
        tracing::warn!("{}", message);
        warnings.push(message);
    };

    let mode = match &context.ephemeral_id {
        Some(raw) => DeploymentMode::Ephemeral {
            id: EphemeralId::parse(raw)?,
        },
        None => DeploymentMode::Standing,
    };

    let image_tag = match (&mode, &context.image_tag) {
        (_, Some(tag)) => tag.clone(),
        (DeploymentMode::Ephemeral { .. }, None) => {
            return Err(StackplanError::MissingContext {
                feature: "ephemeral deployment".to_string(),
                key: "image_tag".to_string(),
            })
        }
        (DeploymentMode::Standing, None) => DEFAULT_IMAGE_TAG.to_string(),
    };

    let network = resolve_network(document, spec)?;

    let (certificate, public_host) = resolve_https(name, &context, &mode, &mut warn);

    let firewall = spec.firewall.enabled.then(|| FirewallSettings {
        rate_limit: spec.firewall.rate_limit,
        blocked_countries: if spec.durability.is_durable() {
            spec.firewall.blocked_countries.clone()
        } else {
            Vec::new()
        },
    });

    let container = &spec.container;
    let hardening = (container.run_as_non_root || container.read_only_root_filesystem).then(|| {
        Hardening {
            run_as_non_root: container.run_as_non_root,
            read_only_root_filesystem: container.read_only_root_filesystem,
            writable_paths: container.writable_paths.clone(),
        }
    });

    let (env_name, capacity) = match &mode {
        DeploymentMode::Standing => (name.to_string(), spec.capacity),
        DeploymentMode::Ephemeral { id } => (id.environment_name(), EPHEMERAL_CAPACITY),
    };

    Ok(ResolvedEnvironment {
        name: env_name,
        base_environment: name.to_string(),
        project: document.project.clone(),
        region: document.region.clone(),
        durability: spec.durability,
        mode,
        network,
        capacity,
        task: spec.task,
        scaling: ScalingSettings {
            cpu: spec.scaling.cpu,
            memory: spec.scaling.memory,
        },
        health_check: spec.health_check.clone(),
        firewall,
        container: ContainerSettings {
            port: container.port,
            image_tag,
            hardening,
            environment: container.environment.clone(),
        },
        certificate,
        public_host,
        log_retention_days: spec.logs.retention_days,
        warnings,
    })
}

fn resolve_network(
    document: &ConfigDocument,
    spec: &EnvironmentSpec,
) -> StackplanResult<NetworkSettings> {
    let net = &spec.network;
    let zone_count = net.availability_zones.min(MAX_AVAILABILITY_ZONES);
    let availability_zones = availability_zones(&document.region, zone_count);
    let zones = availability_zones.len();

    let nat_gateways = if net.nat.high_availability {
        zones
    } else {
        usize::from(net.nat.gateways).min(zones)
    };

    let ipv6_block = match (net.dual_stack, &net.ipv6_block) {
        (true, Some(raw)) => Some(raw.parse::<Ipv6Block>()?),
        (true, None) => {
            return Err(StackplanError::MissingContext {
                feature: "dual-stack addressing".to_string(),
                key: "network.ipv6_block".to_string(),
            })
        }
        (false, _) => None,
    };

    let flow_logs = net.flow_logs.enabled.then(|| FlowLogSettings {
        retention_days: net.flow_logs.retention_days,
        cold_storage_after_days: if spec.durability.is_durable() {
            net.flow_logs.cold_storage_after_days
        } else {
            None
        },
    });

    Ok(NetworkSettings {
        cidr: net.cidr.parse()?,
        public_subnet_mask: net.public_subnet_mask,
        private_subnet_mask: net.private_subnet_mask,
        availability_zones,
        nat_gateways,
        nat_high_availability: net.nat.high_availability,
        ipv6_block,
        flow_logs,
    })
}

/// `<region>a`, `<region>b`, ...
pub fn availability_zones(region: &str, count: u8) -> Vec<String> {
    (0..count.min(MAX_AVAILABILITY_ZONES))
        .map(|i| format!("{}{}", region, char::from(b'a' + i)))
        .collect()
}

fn resolve_https(
    base_environment: &str,
    context: &DeploymentContext,
    mode: &DeploymentMode,
    warn: &mut impl FnMut(String),
) -> (CertificateSource, Option<String>) {
    let (domain, app_name) = match (&context.domain, &context.app_name) {
        (Some(domain), Some(app_name)) => (domain, app_name),
        (domain, app_name) => {
            let missing: Vec<&str> = [
                domain.is_none().then_some("domain"),
                app_name.is_none().then_some("app name"),
            ]
            .into_iter()
            .flatten()
            .collect();
            let reason = format!("no {} supplied", missing.join(" or "));
            warn(format!(
                "HTTPS disabled ({}); serving HTTP only. Supply --domain and --app-name to enable HTTPS",
                reason
            ));
            if context.certificate.is_some() {
                warn(
                    "certificate reference ignored because HTTPS requires both a domain and an app name"
                        .to_string(),
                );
            }
            return (CertificateSource::None { reason }, None);
        }
    };

    if let Some(id) = mode.ephemeral_id() {
        if context.certificate.is_some() {
            warn(format!(
                "certificate reference ignored; review deployments use the HTTPS listener of '{}'",
                base_environment
            ));
        }
        return (
            CertificateSource::Inherited {
                base_environment: base_environment.to_string(),
            },
            Some(format!("pr-{}.{}", id.token(), domain)),
        );
    }

    let host = format!("{}.{}", app_name, domain);

    let certificate = match &context.certificate {
        Some(reference) => CertificateSource::Imported {
            reference: reference.clone(),
        },
        None => {
            if context.hosted_zone.is_none() {
                warn(format!(
                    "no hosted zone supplied for '{}'; DNS validation records must be created manually",
                    domain
                ));
            }
            CertificateSource::Issued {
                domain: domain.clone(),
                alternative_names: vec![format!("*.{}", domain)],
                hosted_zone: context.hosted_zone.clone(),
            }
        }
    };

    (certificate, Some(host))
}
