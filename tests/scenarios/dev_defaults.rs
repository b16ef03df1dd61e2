//! Scenario: Development Defaults
//!
//! Journey: a developer deploys the built-in `dev` environment with no
//! domain, no certificate and no project configuration.
//!
//! Success Criteria:
//! - one NAT gateway, two public and two private subnets
//! - plain HTTP listener only, no firewall
//! - default (unhardened) task, capacity 1 (min 1, max 3)

use stackplan::config::{builtin, resolve, DeploymentContext};
use stackplan::domain::entities::{Property, ResourceKind, SecretBundle, StackKind};
use stackplan::plan;

use crate::common::*;
use crate::{assert_output_contains, assert_success};

fn dev_bundle() -> SecretBundle {
    let mut bundle = SecretBundle::new();
    bundle.insert("application", "secret_key", "dev-key");
    bundle.insert("application", "required_setting", "on");
    bundle
}

#[test]
fn scenario_dev_defaults_plan() {
    let env = resolve(&builtin().unwrap(), "dev", &DeploymentContext::default()).unwrap();
    let graph = plan(&env, &dev_bundle()).unwrap();

    let network = graph
        .stacks
        .iter()
        .find(|s| s.kind == StackKind::Network)
        .unwrap();
    assert_eq!(network.count_kind(ResourceKind::NatGateway), 1);
    assert_eq!(network.count_kind(ResourceKind::Subnet), 4);
    assert!(network.has_resource("public-subnet-1"));
    assert!(network.has_resource("private-subnet-1"));
    assert!(!network.has_resource("ipv6-block"));

    let platform = graph
        .stacks
        .iter()
        .find(|s| s.kind == StackKind::Platform)
        .unwrap();
    assert!(platform.has_resource("http-listener"));
    assert!(!platform.has_resource("https-listener"));
    assert!(!platform.has_resource("certificate"));
    assert!(!platform.has_resource("web-acl"));

    let application = graph
        .stacks
        .iter()
        .find(|s| s.kind == StackKind::Application)
        .unwrap();
    let container = application
        .resource("task-definition")
        .and_then(|t| t.property("container"))
        .unwrap();
    assert!(container.get("user").is_none());
    assert!(container.get("read_only_root_filesystem").is_none());
    assert!(container.get("memory_reservation").is_none());

    let service = application.resource("service").unwrap();
    assert_eq!(service.property("desired_count"), Some(&Property::Int(1)));
    let target = application.resource("scalable-target").unwrap();
    assert_eq!(target.property("min_capacity"), Some(&Property::Int(1)));
    assert_eq!(target.property("max_capacity"), Some(&Property::Int(3)));
}

#[test]
fn scenario_dev_defaults_deploy_from_cli() {
    let env = TestEnv::builder().without_git().build();

    // Step 1: plan shows the feature set without creating anything
    let result = env.run(&["plan", "-e", "dev"]);
    assert_success!(result);
    assert_output_contains!(result, "HTTPS (certificate: none)");
    assert!(!env.state_path("stacks").exists());

    // Step 2: deploy creates all three stacks
    let result = env.run(&["deploy", "-e", "dev"]);
    assert_success!(result);
    assert_output_contains!(result, "Deploy Complete");
    assert_output_contains!(result, "Secrets:     environment");

    // Step 3: the load balancer address is now known
    let result = env.run(&["exports", "--stack", "webapp-dev-platform"]);
    assert_success!(result);
    assert_output_contains!(result, "lb.stackplan.local");
}
