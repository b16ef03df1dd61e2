//! Stack composer
//!
//! Wires the three planners into one validated resource graph. Standing
//! environments get Network, Platform and Application stacks with explicit
//! ordering edges; an ephemeral deployment gets only its own Application
//! stack, importing the base environment's network and platform outputs.

use crate::config::ResolvedEnvironment;
use crate::domain::entities::{
    NetworkOutputs, PlatformOutputs, ResourceGraph, SecretBundle, StackId, StackKind,
};
use crate::error::StackplanResult;

use super::application::plan_application;
use super::network::plan_network;
use super::platform::plan_platform;

/// Stack identifiers for one deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackNames {
    pub network: StackId,
    pub platform: StackId,
    pub application: StackId,
}

impl StackNames {
    /// Network and platform always belong to the base environment; the
    /// application stack is named after the deployment itself
    pub fn for_environment(env: &ResolvedEnvironment) -> Self {
        Self {
            network: StackId::new(&env.project, &env.base_environment, StackKind::Network),
            platform: StackId::new(&env.project, &env.base_environment, StackKind::Platform),
            application: StackId::new(&env.project, &env.name, StackKind::Application),
        }
    }
}

/// Plan every stack the deployment needs and validate the result
pub fn plan(env: &ResolvedEnvironment, secrets: &SecretBundle) -> StackplanResult<ResourceGraph> {
    let names = StackNames::for_environment(env);
    let network_outputs = NetworkOutputs::imported(&names.network);
    let platform_outputs = PlatformOutputs::imported(&names.platform);

    let mut graph = ResourceGraph::new();

    let application = plan_application(
        env,
        &names.application,
        &network_outputs,
        &platform_outputs,
        secrets,
    );

    if env.is_ephemeral() {
        graph.push(application);
    } else {
        graph.push(plan_network(env, &names.network)?);
        graph.push(plan_platform(env, &names.platform, &network_outputs).depends_on(&names.network));
        graph.push(
            application
                .depends_on(&names.network)
                .depends_on(&names.platform),
        );
    }

    graph.validate()?;

    tracing::debug!(
        environment = %env.name,
        stacks = graph.stacks.len(),
        resources = graph.resource_count(),
        "planned resource graph"
    );

    Ok(graph)
}
