//! Deploy Use Case
//!
//! Orchestrates the deployment flow:
//! 1. Resolve the environment from the configuration document and context;
//!    a review deployment keeps HTTPS only if its base publishes an HTTPS listener
//! 2. Resolve secrets through the fallback chain
//! 3. Plan the resource graph (pure)
//! 4. Preflight every import of a stack outside the graph
//! 5. Apply stacks in dependency order and publish their exports
//! 6. Build the deployment summary
//!
//! Nothing is created unless steps 1-4 succeed.

use std::sync::Arc;

use crate::application::secrets::{ResolvedSecrets, SecretSource, SecretsResolver};
use crate::config::{resolve, ConfigDocument, ResolvedEnvironment};
use crate::domain::entities::outputs::platform::{HTTPS_LISTENER_ID, LOAD_BALANCER_DNS_NAME};
use crate::domain::entities::{ResourceGraph, StackPlan};
use crate::domain::ports::{
    Decryptor, DeployEvent, DeployEventSink, EnvSource, ExportStore, NoopEventSink, Provisioner,
};
use crate::domain::services::{plan, StackNames};
use crate::domain::value_objects::{CertificateSource, ContentHash};
use crate::error::{StackplanError, StackplanResult};

use super::options::DeployOptions;
use super::result::{application_url, DeploymentSummary, FeatureFlags};
use super::values::{publishable_exports, resolve_resource, Created};

/// Everything decided before the first create call
#[derive(Debug, Clone)]
pub struct PlannedDeployment {
    pub environment: ResolvedEnvironment,
    pub secrets: ResolvedSecrets,
    pub graph: ResourceGraph,
    pub fingerprint: ContentHash,
}

impl PlannedDeployment {
    pub fn stack_names(&self) -> StackNames {
        StackNames::for_environment(&self.environment)
    }

    pub fn summary(&self, applied: bool, lb_dns_name: Option<&str>) -> DeploymentSummary {
        let env = &self.environment;
        let mut warnings = env.warnings.clone();
        if self.secrets.source == SecretSource::Environment {
            warnings.push(format!(
                "no secrets file for '{}'; secrets were built from environment variables",
                env.base_environment
            ));
        }

        DeploymentSummary {
            environment: env.name.clone(),
            base_environment: env.base_environment.clone(),
            mode: env.mode.label(),
            applied,
            stacks: self.graph.stacks.iter().map(|s| s.id.to_string()).collect(),
            resource_count: self.graph.resource_count(),
            fingerprint: self.fingerprint.to_string(),
            secrets_source: self.secrets.source,
            features: FeatureFlags::from_environment(env),
            warnings,
            application_url: application_url(env, lb_dns_name),
        }
    }
}

/// Deploy use case - orchestrates the deployment flow
///
/// Parameterized by its provisioning and export ports so tests can run the
/// whole flow in memory.
pub struct DeployUseCase<P, E>
where
    P: Provisioner,
    E: ExportStore,
{
    document: ConfigDocument,
    provisioner: P,
    exports: E,
    decryptor: Box<dyn Decryptor>,
    env: Box<dyn EnvSource>,
}

impl<P, E> DeployUseCase<P, E>
where
    P: Provisioner,
    E: ExportStore,
{
    pub fn new(
        document: ConfigDocument,
        provisioner: P,
        exports: E,
        decryptor: Box<dyn Decryptor>,
        env: Box<dyn EnvSource>,
    ) -> Self {
        Self {
            document,
            provisioner,
            exports,
            decryptor,
            env,
        }
    }

    pub fn provisioner(&self) -> &P {
        &self.provisioner
    }

    pub fn exports(&self) -> &E {
        &self.exports
    }

    /// Steps 1-3: resolve, load secrets, plan
    pub fn plan(&self, options: &DeployOptions) -> StackplanResult<PlannedDeployment> {
        let context = options
            .context
            .clone()
            .with_env_overrides(self.env.as_ref());
        let mut environment = resolve(&self.document, &options.environment, &context)?;
        self.confirm_inherited_https(&mut environment);

        let secrets = SecretsResolver::new(
            self.decryptor.as_ref(),
            self.env.as_ref(),
            &options.secrets_dir,
        )
        .resolve(&environment.base_environment)?;

        let graph = plan(&environment, &secrets.bundle)?;
        let fingerprint = graph.fingerprint()?;

        Ok(PlannedDeployment {
            environment,
            secrets,
            graph,
            fingerprint,
        })
    }

    /// Execute the deploy use case
    pub fn execute(&mut self, options: &DeployOptions) -> StackplanResult<DeploymentSummary> {
        self.execute_with_events(options, Arc::new(NoopEventSink))
    }

    /// Execute the deploy use case with event reporting
    pub fn execute_with_events(
        &mut self,
        options: &DeployOptions,
        event_sink: Arc<dyn DeployEventSink>,
    ) -> StackplanResult<DeploymentSummary> {
        let planned = self.plan(options)?;

        event_sink.on_event(DeployEvent::Planned {
            environment: planned.environment.name.clone(),
            stack_count: planned.graph.stacks.len(),
            resource_count: planned.graph.resource_count(),
            fingerprint: planned.fingerprint.to_string(),
        });
        for message in planned.summary(false, None).warnings {
            event_sink.on_event(DeployEvent::Warning { message });
        }

        self.preflight(&planned.graph, event_sink.as_ref())?;

        if options.dry_run {
            event_sink.on_event(DeployEvent::Completed {
                stack_count: planned.graph.stacks.len(),
                resource_count: planned.graph.resource_count(),
                dry_run: true,
            });
            let dns = self.load_balancer_dns(&planned);
            return Ok(planned.summary(false, dns.as_deref()));
        }

        for stack in planned.graph.ordered()? {
            self.apply_stack(stack, event_sink.as_ref())?;
        }

        event_sink.on_event(DeployEvent::Completed {
            stack_count: planned.graph.stacks.len(),
            resource_count: planned.graph.resource_count(),
            dry_run: false,
        });

        let dns = self.load_balancer_dns(&planned);
        Ok(planned.summary(true, dns.as_deref()))
    }

    /// Step 4: every import of a stack outside the graph must resolve
    pub fn preflight(
        &self,
        graph: &ResourceGraph,
        event_sink: &dyn DeployEventSink,
    ) -> StackplanResult<()> {
        for (stack, outputs) in graph.external_imports() {
            for output in outputs {
                self.exports.get(&stack, &output).map_err(|err| {
                    tracing::error!("import {}/{} unresolved: {}", stack, output, err);
                    StackplanError::from(err)
                })?;
                event_sink.on_event(DeployEvent::ImportResolved {
                    stack: stack.clone(),
                    output,
                });
            }
        }
        Ok(())
    }

    fn apply_stack(
        &mut self,
        stack: &StackPlan,
        event_sink: &dyn DeployEventSink,
    ) -> StackplanResult<()> {
        let provision_error =
            |resource: &str, err| StackplanError::from_provision(stack.id.as_str(), resource, err);

        tracing::info!("applying stack {} ({} resources)", stack.id, stack.resources.len());
        event_sink.on_event(DeployEvent::StackStarted {
            stack: stack.id.clone(),
            resource_count: stack.resources.len(),
        });
        self.provisioner
            .begin_stack(&stack.id)
            .map_err(|err| provision_error("", err))?;

        let mut created = Created::new();
        for resource in &stack.resources {
            let resolved = resolve_resource(&stack.id, resource, &created, &self.exports)?;
            let result = self
                .provisioner
                .create(&stack.id, &resolved)
                .map_err(|err| provision_error(&resource.id, err))?;
            tracing::debug!("created {}/{} as {}", stack.id, resource.id, result.physical_id);
            if event_sink.wants_detailed_events() {
                event_sink.on_event(DeployEvent::ResourceCreated {
                    stack: stack.id.clone(),
                    resource: resource.id.clone(),
                    kind: resource.kind,
                    physical_id: result.physical_id.clone(),
                });
            }
            created.insert(resource.id.clone(), result);
        }

        self.provisioner
            .finish_stack(&stack.id)
            .map_err(|err| provision_error("", err))?;

        let exports = publishable_exports(stack, &created, &self.exports)?;
        self.exports.publish(&stack.id, &exports)?;
        event_sink.on_event(DeployEvent::StackCompleted {
            stack: stack.id.clone(),
            export_count: exports.values.len(),
        });
        Ok(())
    }

    /// Downgrade a review deployment to HTTP when its base serves HTTP only
    fn confirm_inherited_https(&self, environment: &mut ResolvedEnvironment) {
        let CertificateSource::Inherited { base_environment } = &environment.certificate else {
            return;
        };
        let platform = StackNames::for_environment(environment).platform;
        if self.exports.get(&platform, HTTPS_LISTENER_ID).is_ok() {
            return;
        }

        let reason = format!("base environment '{}' has no HTTPS listener", base_environment);
        let message = format!(
            "HTTPS disabled ({}); the review deployment is served over HTTP",
            reason
        );
        tracing::warn!("{}", message);
        environment.warnings.push(message);
        environment.certificate = CertificateSource::None { reason };
        environment.public_host = None;
    }

    /// Best-effort lookup of the base environment's load balancer address
    fn load_balancer_dns(&self, planned: &PlannedDeployment) -> Option<String> {
        self.exports
            .get(&planned.stack_names().platform, LOAD_BALANCER_DNS_NAME)
            .ok()
    }
}
