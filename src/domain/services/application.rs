//! Application stack planner
//!
//! The workload: managed secret, task definition, target group, listener
//! rule, service and target-tracking autoscaling. The stack never touches
//! platform resources directly; it attaches through its own listener rule.

use crate::config::{ResolvedEnvironment, TargetTracking};
use crate::domain::entities::outputs::application as out;
use crate::domain::entities::{
    NetworkOutputs, PlatformOutputs, Property, Resource, ResourceKind, SecretBundle, StackId,
    StackKind, StackPlan,
};
use crate::domain::services::task_spec::{
    container_environment, secret_references, BaseTask, TaskSpec, CONTAINER_NAME,
};
use crate::domain::value_objects::sanitize;

/// Priority of the standing environment's catch-all rule
pub const STANDING_RULE_PRIORITY: u32 = 50_000;

/// Header that routes to a review deployment when HTTPS is off
pub const PREVIEW_HEADER: &str = "X-Preview-Deployment";

/// How the listener rule selects this deployment's traffic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleMatch {
    /// Everything not claimed by a more specific rule
    CatchAll,
    /// Review deployment on its own host name
    Host(String),
    /// Review deployment selected by header
    Header { name: String, value: String },
}

impl RuleMatch {
    fn conditions(&self) -> Property {
        let condition = match self {
            RuleMatch::CatchAll => Property::map([("path", "/*")]),
            RuleMatch::Host(host) => Property::map([("host", host.as_str())]),
            RuleMatch::Header { name, value } => Property::map([(
                "header",
                Property::map([("name", name.as_str()), ("value", value.as_str())]),
            )]),
        };
        Property::List(vec![condition])
    }
}

/// Service name: `<project>-<env>` or `<project>-pr-<token>`
pub fn service_name(env: &ResolvedEnvironment) -> String {
    match env.mode.ephemeral_id() {
        Some(id) => id.service_name(&env.project),
        None => format!("{}-{}", sanitize(&env.project), env.name),
    }
}

/// Listener-rule priority and match for this deployment
pub fn listener_rule(env: &ResolvedEnvironment) -> (u32, RuleMatch) {
    match env.mode.ephemeral_id() {
        None => (STANDING_RULE_PRIORITY, RuleMatch::CatchAll),
        Some(id) => {
            let matcher = match &env.public_host {
                Some(host) => RuleMatch::Host(host.clone()),
                None => RuleMatch::Header {
                    name: PREVIEW_HEADER.to_string(),
                    value: id.token().to_string(),
                },
            };
            (id.rule_priority(), matcher)
        }
    }
}

/// The task shape this environment gets
pub fn task_spec(
    env: &ResolvedEnvironment,
    platform: &PlatformOutputs,
    secrets: &SecretBundle,
) -> TaskSpec {
    let base = BaseTask {
        family: service_name(env),
        cpu: env.task.cpu,
        memory: env.task.memory,
        port: env.container.port,
        image_repository: platform.registry_uri.clone(),
        image_tag: env.container.image_tag.clone(),
        environment: container_environment(env),
        secrets: secret_references(secrets, "app-secret"),
        log_group: platform.log_group_name.clone(),
        log_stream_prefix: env.name.clone(),
    };
    TaskSpec::build(base, env.container.hardening.as_ref())
}

pub fn plan_application(
    env: &ResolvedEnvironment,
    id: &StackId,
    network: &NetworkOutputs,
    platform: &PlatformOutputs,
    secrets: &SecretBundle,
) -> StackPlan {
    let name = service_name(env);
    let mut plan = StackPlan::new(id.clone(), StackKind::Application);

    plan.add(
        Resource::new("app-secret", ResourceKind::Secret)
            .with("name", format!("{}/{}/app", env.project, env.name))
            .with("keys", secrets.keys())
            .with("value", Property::Secret(secrets.to_payload())),
    );

    let spec = task_spec(env, platform, secrets);
    let mut task = Resource::new("task-definition", ResourceKind::TaskDefinition);
    task.properties = spec.properties();
    plan.add(task);

    let hc = &env.health_check;
    plan.add(
        Resource::new("target-group", ResourceKind::TargetGroup)
            .with("network", network.network_id.clone())
            .with("port", env.container.port)
            .with("protocol", "HTTP")
            .with("target_type", "ip")
            .with("deregistration_delay_secs", if env.is_ephemeral() { 5u32 } else { 30u32 })
            .with(
                "health_check",
                Property::map([
                    ("path", Property::from(hc.path.as_str())),
                    ("expected_status", Property::from(hc.expected_status)),
                    ("interval_secs", Property::from(hc.interval_secs)),
                    ("timeout_secs", Property::from(hc.timeout_secs)),
                    ("healthy_threshold", Property::from(hc.healthy_threshold)),
                    ("unhealthy_threshold", Property::from(hc.unhealthy_threshold)),
                ]),
            ),
    );

    let (priority, matcher) = listener_rule(env);
    plan.add(
        Resource::new("listener-rule", ResourceKind::ListenerRule)
            .with("listener", platform.app_listener_id.clone())
            .with("priority", priority)
            .with("conditions", matcher.conditions())
            .with(
                "action",
                Property::map([
                    ("type", Property::from("forward")),
                    ("target_group", Property::reference("target-group", "arn")),
                ]),
            ),
    );

    plan.add(
        Resource::new("service", ResourceKind::Service)
            .with("name", name.as_str())
            .with("cluster", platform.cluster_name.clone())
            .with("task_definition", Property::reference("task-definition", "arn"))
            .with("desired_count", env.capacity.desired)
            .with("subnets", network.private_subnet_ids.clone())
            .with(
                "security_groups",
                Property::List(vec![network.workload_security_group_id.clone()]),
            )
            .with("assign_public_ip", false)
            .with(
                "load_balancer",
                Property::map([
                    ("target_group", Property::reference("target-group", "arn")),
                    ("container", Property::from(CONTAINER_NAME)),
                    ("port", Property::from(env.container.port)),
                ]),
            )
            .with("health_check_grace_secs", 60u32)
            .depends_on("listener-rule"),
    );

    plan.add(
        Resource::new("scalable-target", ResourceKind::ScalableTarget)
            .with("service", Property::reference("service", "name"))
            .with("cluster", platform.cluster_name.clone())
            .with("min_capacity", env.capacity.min)
            .with("max_capacity", env.capacity.max),
    );

    plan.add(scaling_policy("cpu-scaling", "cpu", &env.scaling.cpu));
    plan.add(scaling_policy("memory-scaling", "memory", &env.scaling.memory));

    plan.export(out::SERVICE_NAME, Property::reference("service", "name"));
    plan.export(
        out::HEALTH_CHECK,
        format!("GET {} -> {}", hc.path, hc.expected_status),
    );
    plan.export(out::SCALABLE_TARGET_ID, Property::id_of("scalable-target"));

    plan
}

fn scaling_policy(id: &str, metric: &str, tracking: &TargetTracking) -> Resource {
    Resource::new(id, ResourceKind::ScalingPolicy)
        .with("target", Property::id_of("scalable-target"))
        .with("metric", metric)
        .with("target_utilization", u32::from(tracking.target_utilization))
        .with("scale_out_cooldown_secs", tracking.scale_out_cooldown_secs)
        .with("scale_in_cooldown_secs", tracking.scale_in_cooldown_secs)
}
