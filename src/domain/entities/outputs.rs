//! Stack outputs
//!
//! Well-known export names and the typed views downstream planners consume.
//! In both standing and ephemeral mode downstream stacks read upstream values
//! through `Property::Import`; the only difference is whether the exporting
//! stack is part of the same graph.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Property, StackId};

/// Export names published by the network stack
pub mod network {
    pub const NETWORK_ID: &str = "network-id";
    pub const PUBLIC_SUBNET_IDS: &str = "public-subnet-ids";
    pub const PRIVATE_SUBNET_IDS: &str = "private-subnet-ids";
    pub const LB_SECURITY_GROUP_ID: &str = "lb-security-group-id";
    pub const WORKLOAD_SECURITY_GROUP_ID: &str = "workload-security-group-id";
    pub const AVAILABILITY_ZONES: &str = "availability-zones";
    pub const IPV6_BLOCKS: &str = "ipv6-blocks";
    pub const FLOW_LOG_BUCKET_ARN: &str = "flow-log-bucket-arn";
}

/// Export names published by the platform stack
pub mod platform {
    pub const CLUSTER_ID: &str = "cluster-id";
    pub const CLUSTER_NAME: &str = "cluster-name";
    pub const REGISTRY_URI: &str = "registry-uri";
    pub const LOAD_BALANCER_ID: &str = "load-balancer-id";
    pub const LOAD_BALANCER_DNS_NAME: &str = "load-balancer-dns-name";
    pub const HTTP_LISTENER_ID: &str = "http-listener-id";
    pub const HTTPS_LISTENER_ID: &str = "https-listener-id";
    /// Listener application rules attach to (HTTPS when available)
    pub const APP_LISTENER_ID: &str = "app-listener-id";
    pub const CERTIFICATE_ID: &str = "certificate-id";
    pub const LOG_GROUP_NAME: &str = "log-group-name";
    pub const LOG_GROUP_ARN: &str = "log-group-arn";
}

/// Export names published by the application stack
pub mod application {
    pub const SERVICE_NAME: &str = "service-name";
    pub const HEALTH_CHECK: &str = "health-check";
    pub const SCALABLE_TARGET_ID: &str = "scalable-target-id";
}

/// Network values as seen from a downstream stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkOutputs {
    pub network_id: Property,
    pub public_subnet_ids: Property,
    pub private_subnet_ids: Property,
    pub lb_security_group_id: Property,
    pub workload_security_group_id: Property,
}

impl NetworkOutputs {
    pub fn imported(stack: &StackId) -> Self {
        Self {
            network_id: Property::import(stack, network::NETWORK_ID),
            public_subnet_ids: Property::import(stack, network::PUBLIC_SUBNET_IDS),
            private_subnet_ids: Property::import(stack, network::PRIVATE_SUBNET_IDS),
            lb_security_group_id: Property::import(stack, network::LB_SECURITY_GROUP_ID),
            workload_security_group_id: Property::import(
                stack,
                network::WORKLOAD_SECURITY_GROUP_ID,
            ),
        }
    }
}

/// Platform values as seen from the application stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformOutputs {
    pub cluster_name: Property,
    pub registry_uri: Property,
    pub app_listener_id: Property,
    pub log_group_name: Property,
}

impl PlatformOutputs {
    pub fn imported(stack: &StackId) -> Self {
        Self {
            cluster_name: Property::import(stack, platform::CLUSTER_NAME),
            registry_uri: Property::import(stack, platform::REGISTRY_URI),
            app_listener_id: Property::import(stack, platform::APP_LISTENER_ID),
            log_group_name: Property::import(stack, platform::LOG_GROUP_NAME),
        }
    }
}

/// Resolved values one stack published after it was applied
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedExports {
    pub values: BTreeMap<String, String>,
}

impl PublishedExports {
    pub fn get(&self, output: &str) -> Option<&str> {
        self.values.get(output).map(String::as_str)
    }

    pub fn insert(&mut self, output: impl Into<String>, value: impl Into<String>) {
        self.values.insert(output.into(), value.into());
    }
}
