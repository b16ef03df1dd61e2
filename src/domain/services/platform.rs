//! Platform stack planner
//!
//! Cluster, registry, log group and the internet-facing load balancer. HTTPS
//! wiring and the firewall are composed from the resolved environment's
//! `CertificateSource` and firewall settings.

use crate::config::ResolvedEnvironment;
use crate::domain::entities::outputs::platform as out;
use crate::domain::entities::{
    NetworkOutputs, Property, Resource, ResourceKind, StackId, StackKind, StackPlan,
};
use crate::domain::value_objects::CertificateSource;

/// Managed rule groups every firewall carries
pub const MANAGED_RULE_GROUPS: [&str; 2] = ["common-rule-set", "known-bad-inputs"];

pub fn plan_platform(env: &ResolvedEnvironment, id: &StackId, network: &NetworkOutputs) -> StackPlan {
    let durable = env.durability.is_durable();
    let prefix = format!("{}-{}", env.project, env.name);
    let mut plan = StackPlan::new(id.clone(), StackKind::Platform);

    plan.add(
        Resource::new("log-group", ResourceKind::LogGroup)
            .with("name", format!("/{}/{}", env.project, env.name))
            .with("retention_days", env.log_retention_days),
    );

    plan.add(
        Resource::new("cluster", ResourceKind::Cluster)
            .with("name", prefix.as_str())
            .with("container_insights", durable),
    );

    plan.add(
        Resource::new("registry", ResourceKind::Registry)
            .with("name", prefix.as_str())
            .with("scan_on_push", true)
            .with("immutable_tags", durable),
    );

    plan.add(
        Resource::new("load-balancer", ResourceKind::LoadBalancer)
            .with("name", prefix.as_str())
            .with("scheme", "internet-facing")
            .with(
                "address_type",
                if env.network.ipv6_block.is_some() {
                    "dualstack"
                } else {
                    "ipv4"
                },
            )
            .with("subnets", network.public_subnet_ids.clone())
            .with(
                "security_groups",
                Property::List(vec![network.lb_security_group_id.clone()]),
            )
            .with("deletion_protection", durable),
    );

    plan.add(
        Resource::new("http-listener", ResourceKind::Listener)
            .with("load_balancer", Property::reference("load-balancer", "arn"))
            .with("port", 80u16)
            .with("protocol", "HTTP")
            .with("default_action", fixed_not_found()),
    );

    let https = match &env.certificate {
        CertificateSource::None { .. } | CertificateSource::Inherited { .. } => false,
        CertificateSource::Imported { reference } => {
            plan.add(
                Resource::new("certificate", ResourceKind::Certificate)
                    .with("existing_reference", reference.as_str()),
            );
            true
        }
        CertificateSource::Issued {
            domain,
            alternative_names,
            hosted_zone,
        } => {
            plan.add(
                Resource::new("certificate", ResourceKind::Certificate)
                    .with("domain", domain.as_str())
                    .with("alternative_names", alternative_names.clone())
                    .with("validation", "dns")
                    .with_opt("hosted_zone", hosted_zone.clone()),
            );
            true
        }
    };

    if https {
        plan.add(
            Resource::new("https-listener", ResourceKind::Listener)
                .with("load_balancer", Property::reference("load-balancer", "arn"))
                .with("port", 443u16)
                .with("protocol", "HTTPS")
                .with("certificate", Property::reference("certificate", "arn"))
                .with("tls_policy", "tls13-recommended")
                .with("default_action", fixed_not_found()),
        );
        plan.add(
            Resource::new("http-to-https-redirect", ResourceKind::ListenerRule)
                .with("listener", Property::reference("http-listener", "arn"))
                .with("priority", 1u32)
                .with(
                    "conditions",
                    Property::List(vec![Property::map([("path", "/*")])]),
                )
                .with(
                    "action",
                    Property::map([
                        ("type", Property::from("redirect")),
                        ("protocol", Property::from("HTTPS")),
                        ("port", Property::from(443u16)),
                        ("status", Property::from(301u16)),
                    ]),
                )
                .depends_on("https-listener"),
        );
    }

    if let Some(firewall) = &env.firewall {
        let mut rules: Vec<Property> = MANAGED_RULE_GROUPS
            .iter()
            .enumerate()
            .map(|(priority, group)| {
                Property::map([
                    ("name", Property::from(*group)),
                    ("priority", Property::from(priority as u32)),
                    ("managed_group", Property::from(*group)),
                ])
            })
            .collect();
        rules.push(Property::map([
            ("name", Property::from("rate-limit")),
            ("priority", Property::from(2u32)),
            ("limit", Property::from(firewall.rate_limit)),
            ("aggregate_by", Property::from("client-ip")),
            ("action", Property::from("block")),
        ]));
        if durable && !firewall.blocked_countries.is_empty() {
            rules.push(Property::map([
                ("name", Property::from("geo-block")),
                ("priority", Property::from(3u32)),
                ("country_codes", Property::from(firewall.blocked_countries.clone())),
                ("action", Property::from("block")),
            ]));
        }

        plan.add(
            Resource::new("web-acl", ResourceKind::WebAcl)
                .with("name", format!("{}-acl", prefix))
                .with("scope", "regional")
                .with("default_action", "allow")
                .with("rules", Property::List(rules)),
        );
        plan.add(
            Resource::new("web-acl-association", ResourceKind::WebAclAssociation)
                .with("web_acl", Property::reference("web-acl", "arn"))
                .with("resource", Property::reference("load-balancer", "arn"))
                .depends_on("web-acl")
                .depends_on("load-balancer"),
        );
    }

    plan.export(out::CLUSTER_ID, Property::id_of("cluster"));
    plan.export(out::CLUSTER_NAME, Property::reference("cluster", "name"));
    plan.export(out::REGISTRY_URI, Property::reference("registry", "uri"));
    plan.export(out::LOAD_BALANCER_ID, Property::id_of("load-balancer"));
    plan.export(
        out::LOAD_BALANCER_DNS_NAME,
        Property::reference("load-balancer", "dns_name"),
    );
    plan.export(out::HTTP_LISTENER_ID, Property::id_of("http-listener"));
    plan.export(out::LOG_GROUP_NAME, Property::reference("log-group", "name"));
    plan.export(out::LOG_GROUP_ARN, Property::reference("log-group", "arn"));
    if https {
        plan.export(out::HTTPS_LISTENER_ID, Property::id_of("https-listener"));
        plan.export(out::CERTIFICATE_ID, Property::id_of("certificate"));
        plan.export(out::APP_LISTENER_ID, Property::id_of("https-listener"));
    } else {
        plan.export(out::APP_LISTENER_ID, Property::id_of("http-listener"));
    }

    plan
}

fn fixed_not_found() -> Property {
    Property::map([
        ("type", Property::from("fixed-response")),
        ("status", Property::from(404u16)),
        ("content_type", Property::from("text/plain")),
    ])
}
