//! Scenario: Production With A Public Domain
//!
//! Journey: an operator deploys `production` with a domain and an application
//! name, so the environment gets an issued certificate and a public host.
//!
//! Success Criteria:
//! - one NAT gateway per zone and dual-stack public subnets
//! - HTTPS listener plus the HTTP to HTTPS redirect
//! - firewall with rate limiting and geo blocking
//! - hardened task and production capacity (2, min 2, max 10)

use stackplan::config::{builtin, resolve, DeploymentContext};
use stackplan::domain::entities::{Property, ResourceKind, SecretBundle, StackKind};
use stackplan::domain::services::memory_reservation;
use stackplan::plan;

use crate::common::*;
use crate::{assert_output_contains, assert_success};

fn production_context() -> DeploymentContext {
    DeploymentContext {
        domain: Some("example.com".to_string()),
        app_name: Some("shop".to_string()),
        hosted_zone: Some("Z123".to_string()),
        ..Default::default()
    }
}

fn production_bundle() -> SecretBundle {
    let mut bundle = SecretBundle::new();
    bundle.insert("application", "secret_key", "prod-key");
    bundle.insert("application", "required_setting", "on");
    bundle.insert("database", "url", "postgres://db/prod");
    bundle
}

#[test]
fn scenario_production_https_plan() {
    let env = resolve(&builtin().unwrap(), "production", &production_context()).unwrap();
    assert_eq!(env.public_host.as_deref(), Some("shop.example.com"));
    let graph = plan(&env, &production_bundle()).unwrap();

    let network = graph
        .stacks
        .iter()
        .find(|s| s.kind == StackKind::Network)
        .unwrap();
    assert_eq!(network.count_kind(ResourceKind::NatGateway), 3);
    assert_eq!(network.count_kind(ResourceKind::Subnet), 6);
    for i in 0..3 {
        let subnet = network.resource(&format!("public-subnet-{}", i)).unwrap();
        assert!(subnet.property("ipv6_cidr").is_some());
    }

    let platform = graph
        .stacks
        .iter()
        .find(|s| s.kind == StackKind::Platform)
        .unwrap();
    assert!(platform.has_resource("certificate"));
    assert!(platform.has_resource("https-listener"));
    assert!(platform.has_resource("http-to-https-redirect"));
    let rules: Vec<&str> = platform
        .resource("web-acl")
        .and_then(|acl| acl.property("rules"))
        .and_then(Property::as_list)
        .unwrap()
        .iter()
        .filter_map(|r| r.get("name").and_then(Property::as_str))
        .collect();
    assert!(rules.contains(&"rate-limit"));
    assert!(rules.contains(&"geo-block"));

    let application = graph
        .stacks
        .iter()
        .find(|s| s.kind == StackKind::Application)
        .unwrap();
    let container = application
        .resource("task-definition")
        .and_then(|t| t.property("container"))
        .unwrap();
    assert_eq!(container.get("user").and_then(Property::as_str), Some("1000"));
    assert_eq!(
        container.get("read_only_root_filesystem"),
        Some(&Property::Bool(true))
    );
    assert_eq!(
        container.get("memory_reservation").and_then(Property::as_int),
        Some(i64::from(memory_reservation(2048)))
    );

    let target = application.resource("scalable-target").unwrap();
    assert_eq!(target.property("min_capacity"), Some(&Property::Int(2)));
    assert_eq!(target.property("max_capacity"), Some(&Property::Int(10)));
}

#[test]
fn scenario_production_https_deploy_from_cli() {
    let env = TestEnv::builder()
        .with_plaintext_secrets("production", VALID_SECRETS)
        .build();

    let result = env.run(&[
        "deploy",
        "-e",
        "production",
        "--domain",
        "example.com",
        "--app-name",
        "shop",
        "--hosted-zone",
        "Z123",
    ]);

    assert_success!(result);
    assert_output_contains!(result, "URL:         https://shop.example.com");
    assert_output_contains!(result, "HTTPS (certificate: issued)");
    let platform = env.read_state_file("stacks/webapp-production-platform.json");
    assert!(platform.contains("https-listener"));
    assert!(platform.contains("web-acl-association"));
}
