//! Deploy Result
//!
//! The deployment summary: which optional features ended up enabled, what
//! was applied, and the best-known application URL.

use serde::Serialize;

use crate::application::secrets::SecretSource;
use crate::config::{Capacity, ResolvedEnvironment};
use crate::domain::value_objects::CertificateSource;

/// Placeholder when no URL can be known yet
pub const PENDING_URL: &str = "available after deployment";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureFlags {
    pub https: bool,
    /// `none`, `imported`, `issued` or `inherited`
    pub certificate: &'static str,
    /// Why HTTPS is off, when it is
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https_disabled_reason: Option<String>,
    pub firewall: bool,
    pub geo_block: bool,
    pub flow_logs: bool,
    pub dual_stack: bool,
    pub hardened: bool,
    pub nat_gateways: usize,
    pub availability_zones: usize,
    pub capacity: Capacity,
}

impl FeatureFlags {
    pub fn from_environment(env: &ResolvedEnvironment) -> Self {
        Self {
            https: env.https(),
            certificate: env.certificate.label(),
            https_disabled_reason: match &env.certificate {
                CertificateSource::None { reason } => Some(reason.clone()),
                _ => None,
            },
            firewall: env.firewall.is_some(),
            geo_block: env
                .firewall
                .as_ref()
                .is_some_and(|f| !f.blocked_countries.is_empty()),
            flow_logs: env.network.flow_logs.is_some(),
            dual_stack: env.network.ipv6_block.is_some(),
            hardened: env.container.hardening.is_some(),
            nat_gateways: if env.is_ephemeral() {
                0
            } else {
                env.network.nat_gateways
            },
            availability_zones: env.network.zone_count(),
            capacity: env.capacity,
        }
    }
}

/// Result of a plan or deploy run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentSummary {
    pub environment: String,
    pub base_environment: String,
    pub mode: &'static str,
    /// Whether resources were actually created
    pub applied: bool,
    pub stacks: Vec<String>,
    pub resource_count: usize,
    pub fingerprint: String,
    pub secrets_source: SecretSource,
    pub features: FeatureFlags,
    pub warnings: Vec<String>,
    pub application_url: String,
}

/// `https://<host>` when HTTPS is on, else the load balancer's DNS name once
/// known, else the placeholder
pub fn application_url(env: &ResolvedEnvironment, lb_dns_name: Option<&str>) -> String {
    match (&env.public_host, lb_dns_name) {
        (Some(host), _) => format!("https://{}", host),
        (None, Some(dns)) => format!("http://{}", dns),
        (None, None) => PENDING_URL.to_string(),
    }
}
