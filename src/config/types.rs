//! Configuration type definitions
//!
//! One `ConfigDocument` per project: project/region plus a table per
//! standing environment. Sections an environment omits fall back to the
//! defaults below.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Durability;

/// Top-level configuration document (`stackplan.toml`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default = "default_project")]
    pub project: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentSpec>,
}

impl ConfigDocument {
    /// Valid environment names, sorted
    pub fn environment_names(&self) -> Vec<String> {
        self.environments.keys().cloned().collect()
    }
}

fn default_project() -> String {
    "webapp".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

/// One standing environment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSpec {
    #[serde(default)]
    pub durability: Durability,

    #[serde(default)]
    pub network: NetworkSpec,

    #[serde(default)]
    pub capacity: Capacity,

    #[serde(default)]
    pub task: TaskSizing,

    #[serde(default)]
    pub scaling: ScalingSpec,

    #[serde(default)]
    pub health_check: HealthCheck,

    #[serde(default)]
    pub firewall: FirewallSpec,

    #[serde(default)]
    pub container: ContainerSpec,

    #[serde(default)]
    pub logs: LogSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    #[serde(default = "default_cidr")]
    pub cidr: String,

    #[serde(default = "default_subnet_mask")]
    pub public_subnet_mask: u8,

    #[serde(default = "default_subnet_mask")]
    pub private_subnet_mask: u8,

    #[serde(default = "default_zones")]
    pub availability_zones: u8,

    #[serde(default)]
    pub nat: NatSpec,

    #[serde(default)]
    pub dual_stack: bool,

    /// Secondary address block; required when `dual_stack` is on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6_block: Option<String>,

    #[serde(default)]
    pub flow_logs: FlowLogSpec,
}

impl Default for NetworkSpec {
    fn default() -> Self {
        Self {
            cidr: default_cidr(),
            public_subnet_mask: default_subnet_mask(),
            private_subnet_mask: default_subnet_mask(),
            availability_zones: default_zones(),
            nat: NatSpec::default(),
            dual_stack: false,
            ipv6_block: None,
            flow_logs: FlowLogSpec::default(),
        }
    }
}

fn default_cidr() -> String {
    "10.0.0.0/16".to_string()
}

fn default_subnet_mask() -> u8 {
    24
}

fn default_zones() -> u8 {
    2
}

/// NAT egress redundancy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatSpec {
    /// One gateway per zone; `gateways` is ignored
    #[serde(default)]
    pub high_availability: bool,

    #[serde(default = "default_nat_gateways")]
    pub gateways: u8,
}

impl Default for NatSpec {
    fn default() -> Self {
        Self {
            high_availability: false,
            gateways: default_nat_gateways(),
        }
    }
}

fn default_nat_gateways() -> u8 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowLogSpec {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_flow_log_retention")]
    pub retention_days: u32,

    /// Days before objects move to cold storage; durable environments only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cold_storage_after_days: Option<u32>,
}

impl Default for FlowLogSpec {
    fn default() -> Self {
        Self {
            enabled: false,
            retention_days: default_flow_log_retention(),
            cold_storage_after_days: None,
        }
    }
}

fn default_flow_log_retention() -> u32 {
    7
}

/// Task count bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub desired: u32,
    pub min: u32,
    pub max: u32,
}

impl Default for Capacity {
    fn default() -> Self {
        Self {
            desired: 1,
            min: 1,
            max: 3,
        }
    }
}

/// Task size in CPU units and MiB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSizing {
    pub cpu: u32,
    pub memory: u32,
}

impl Default for TaskSizing {
    fn default() -> Self {
        Self {
            cpu: 256,
            memory: 512,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingSpec {
    #[serde(default = "default_cpu_tracking")]
    pub cpu: TargetTracking,

    #[serde(default = "default_memory_tracking")]
    pub memory: TargetTracking,
}

impl Default for ScalingSpec {
    fn default() -> Self {
        Self {
            cpu: default_cpu_tracking(),
            memory: default_memory_tracking(),
        }
    }
}

fn default_cpu_tracking() -> TargetTracking {
    TargetTracking {
        target_utilization: 70,
        scale_out_cooldown_secs: 60,
        scale_in_cooldown_secs: 300,
    }
}

fn default_memory_tracking() -> TargetTracking {
    TargetTracking {
        target_utilization: 80,
        scale_out_cooldown_secs: 60,
        scale_in_cooldown_secs: 300,
    }
}

/// Target-tracking policy parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetTracking {
    /// Percent, 1-100
    pub target_utilization: u8,
    pub scale_out_cooldown_secs: u32,
    pub scale_in_cooldown_secs: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    #[serde(default = "default_health_path")]
    pub path: String,

    #[serde(default = "default_expected_status")]
    pub expected_status: u16,

    #[serde(default = "default_health_interval")]
    pub interval_secs: u32,

    #[serde(default = "default_health_timeout")]
    pub timeout_secs: u32,

    #[serde(default = "default_healthy_threshold")]
    pub healthy_threshold: u32,

    #[serde(default = "default_unhealthy_threshold")]
    pub unhealthy_threshold: u32,
}

impl Default for HealthCheck {
    fn default() -> Self {
        Self {
            path: default_health_path(),
            expected_status: default_expected_status(),
            interval_secs: default_health_interval(),
            timeout_secs: default_health_timeout(),
            healthy_threshold: default_healthy_threshold(),
            unhealthy_threshold: default_unhealthy_threshold(),
        }
    }
}

fn default_health_path() -> String {
    "/health/".to_string()
}

fn default_expected_status() -> u16 {
    200
}

fn default_health_interval() -> u32 {
    30
}

fn default_health_timeout() -> u32 {
    5
}

fn default_healthy_threshold() -> u32 {
    2
}

fn default_unhealthy_threshold() -> u32 {
    3
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallSpec {
    #[serde(default)]
    pub enabled: bool,

    /// Requests per 5-minute window per client address
    #[serde(default = "default_rate_limit")]
    pub rate_limit: u32,

    /// ISO country codes; applied to durable environments only
    #[serde(default)]
    pub blocked_countries: Vec<String>,
}

impl Default for FirewallSpec {
    fn default() -> Self {
        Self {
            enabled: false,
            rate_limit: default_rate_limit(),
            blocked_countries: Vec::new(),
        }
    }
}

fn default_rate_limit() -> u32 {
    1000
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub run_as_non_root: bool,

    #[serde(default)]
    pub read_only_root_filesystem: bool,

    /// Scratch mounts for a hardened task
    #[serde(default = "default_writable_paths")]
    pub writable_paths: Vec<String>,

    /// Plain (non-secret) environment variables
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

impl Default for ContainerSpec {
    fn default() -> Self {
        Self {
            port: default_port(),
            run_as_non_root: false,
            read_only_root_filesystem: false,
            writable_paths: default_writable_paths(),
            environment: BTreeMap::new(),
        }
    }
}

fn default_port() -> u16 {
    8000
}

fn default_writable_paths() -> Vec<String> {
    vec!["/tmp".to_string()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSpec {
    #[serde(default = "default_log_retention")]
    pub retention_days: u32,
}

impl Default for LogSpec {
    fn default() -> Self {
        Self {
            retention_days: default_log_retention(),
        }
    }
}

fn default_log_retention() -> u32 {
    7
}
