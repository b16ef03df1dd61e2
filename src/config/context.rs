//! Deployment context
//!
//! Per-invocation values that are not part of the configuration document.
//! Priority: CLI flags, then `STACKPLAN_*` environment variables.

use serde::Serialize;

use crate::domain::ports::EnvSource;

pub const ENV_DOMAIN_NAME: &str = "STACKPLAN_DOMAIN_NAME";
pub const ENV_HOSTED_ZONE_ID: &str = "STACKPLAN_HOSTED_ZONE_ID";
pub const ENV_APP_NAME: &str = "STACKPLAN_APP_NAME";
pub const ENV_CERTIFICATE_ARN: &str = "STACKPLAN_CERTIFICATE_ARN";
pub const ENV_PR_ID: &str = "STACKPLAN_PR_ID";
pub const ENV_IMAGE_TAG: &str = "STACKPLAN_IMAGE_TAG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeploymentContext {
    pub domain: Option<String>,
    pub hosted_zone: Option<String>,
    pub app_name: Option<String>,
    pub certificate: Option<String>,
    pub ephemeral_id: Option<String>,
    pub image_tag: Option<String>,
}

impl DeploymentContext {
    /// Fill unset fields from `STACKPLAN_*` variables and drop blank values
    pub fn with_env_overrides(self, env: &dyn EnvSource) -> Self {
        let pick = |value: Option<String>, key: &str| non_blank(value).or_else(|| non_blank(env.var(key)));
        Self {
            domain: pick(self.domain, ENV_DOMAIN_NAME),
            hosted_zone: pick(self.hosted_zone, ENV_HOSTED_ZONE_ID),
            app_name: pick(self.app_name, ENV_APP_NAME),
            certificate: pick(self.certificate, ENV_CERTIFICATE_ARN),
            ephemeral_id: pick(self.ephemeral_id, ENV_PR_ID),
            image_tag: pick(self.image_tag, ENV_IMAGE_TAG),
        }
    }

    /// Same context with blank strings treated as absent
    pub fn normalized(self) -> Self {
        Self {
            domain: non_blank(self.domain),
            hosted_zone: non_blank(self.hosted_zone),
            app_name: non_blank(self.app_name),
            certificate: non_blank(self.certificate),
            ephemeral_id: non_blank(self.ephemeral_id),
            image_tag: non_blank(self.image_tag),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
