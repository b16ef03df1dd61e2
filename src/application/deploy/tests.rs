//! Deploy Use Case Tests

use super::*;
use crate::application::secrets::SecretSource;
use crate::config::{builtin, DeploymentContext};
use crate::domain::entities::{Resource, ResourceKind, StackId};
use crate::domain::ports::{
    DecryptError, Decryptor, DeployEvent, DeployEventSink, ExportStore, ProvisionError,
    ProvisionedResource, Provisioner,
};
use crate::error::StackplanError;
use crate::infrastructure::{InMemoryExportStore, StaticEnv};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

// Mock implementations for testing

#[derive(Default)]
struct RecordingProvisioner {
    created: Vec<(StackId, String)>,
    fail_on: Option<ResourceKind>,
}

impl Provisioner for RecordingProvisioner {
    fn create(
        &mut self,
        stack: &StackId,
        resource: &Resource,
    ) -> Result<ProvisionedResource, ProvisionError> {
        if self.fail_on == Some(resource.kind) {
            return Err(ProvisionError::Rejected(format!("{} refused", resource.id)));
        }
        self.created.push((stack.clone(), resource.id.clone()));

        let physical_id = format!("{}-{}", resource.kind.prefix(), self.created.len());
        let mut result = ProvisionedResource {
            physical_id: physical_id.clone(),
            ..Default::default()
        };
        for attr in ["arn", "name", "uri", "dns_name"] {
            result
                .attributes
                .insert(attr.to_string(), format!("{}:{}", attr, physical_id));
        }
        Ok(result)
    }
}

struct NoDecryptor;

impl Decryptor for NoDecryptor {
    fn name(&self) -> &str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn decrypt(&self, path: &Path) -> Result<String, DecryptError> {
        Err(DecryptError::Unavailable(path.display().to_string()))
    }
}

struct RecordingEventSink {
    events: Arc<Mutex<Vec<DeployEvent>>>,
}

impl DeployEventSink for RecordingEventSink {
    fn on_event(&self, event: DeployEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn use_case(
    exports: InMemoryExportStore,
) -> DeployUseCase<RecordingProvisioner, InMemoryExportStore> {
    DeployUseCase::new(
        builtin().unwrap(),
        RecordingProvisioner::default(),
        exports,
        Box::new(NoDecryptor),
        Box::new(StaticEnv::new()),
    )
}

fn pr_context(id: &str) -> DeploymentContext {
    DeploymentContext {
        ephemeral_id: Some(id.to_string()),
        image_tag: Some("sha-abc123".to_string()),
        ..Default::default()
    }
}

#[test]
fn standing_deploy_applies_three_stacks_in_order() {
    let secrets = tempdir().unwrap();
    let mut uc = use_case(InMemoryExportStore::new());

    let summary = uc
        .execute(&DeployOptions::new("dev").with_secrets_dir(secrets.path()))
        .unwrap();

    assert!(summary.applied);
    assert_eq!(
        summary.stacks,
        vec![
            "webapp-dev-network",
            "webapp-dev-platform",
            "webapp-dev-application"
        ]
    );

    let stacks: Vec<&str> = uc
        .provisioner()
        .created
        .iter()
        .map(|(stack, _)| stack.as_str())
        .collect();
    let first_platform = stacks
        .iter()
        .position(|s| *s == "webapp-dev-platform")
        .unwrap();
    let last_network = stacks
        .iter()
        .rposition(|s| *s == "webapp-dev-network")
        .unwrap();
    assert!(last_network < first_platform);
    assert_eq!(stacks.len(), summary.resource_count);
}

#[test]
fn standing_deploy_publishes_exports_for_every_stack() {
    let secrets = tempdir().unwrap();
    let mut uc = use_case(InMemoryExportStore::new());
    uc.execute(&DeployOptions::new("dev").with_secrets_dir(secrets.path()))
        .unwrap();

    let published = uc.exports().list().unwrap();
    assert_eq!(published.len(), 3);
    assert!(published.contains_key(&StackId::from("webapp-dev-network")));
    assert!(published.contains_key(&StackId::from("webapp-dev-platform")));
}

#[test]
fn ephemeral_without_base_fails_before_any_create() {
    let secrets = tempdir().unwrap();
    let mut uc = use_case(InMemoryExportStore::new());

    let err = uc
        .execute(
            &DeployOptions::new("dev")
                .with_context(pr_context("123"))
                .with_secrets_dir(secrets.path()),
        )
        .unwrap_err();

    match err {
        StackplanError::ExportNotFound { stack, .. } => {
            assert!(stack.starts_with("webapp-dev-"), "stack was {}", stack);
        }
        other => panic!("expected ExportNotFound, got {:?}", other),
    }
    assert!(uc.provisioner().created.is_empty());
    assert!(uc.exports().list().unwrap().is_empty());
}

#[test]
fn ephemeral_after_standing_deploys_only_the_application() {
    let secrets = tempdir().unwrap();
    let mut standing = use_case(InMemoryExportStore::new());
    standing
        .execute(&DeployOptions::new("dev").with_secrets_dir(secrets.path()))
        .unwrap();

    let seeded = standing
        .exports()
        .list()
        .unwrap()
        .into_iter()
        .fold(InMemoryExportStore::new(), |store, (id, exports)| {
            store.with_stack(id, exports)
        });
    let mut uc = use_case(seeded);

    let summary = uc
        .execute(
            &DeployOptions::new("dev")
                .with_context(pr_context("PR-123"))
                .with_secrets_dir(secrets.path()),
        )
        .unwrap();

    assert_eq!(summary.environment, "pr-pr-123");
    assert_eq!(summary.base_environment, "dev");
    assert_eq!(summary.stacks, vec!["webapp-pr-pr-123-application"]);
    assert!(uc
        .provisioner()
        .created
        .iter()
        .all(|(stack, _)| stack.as_str() == "webapp-pr-pr-123-application"));
    assert!(uc
        .exports()
        .list()
        .unwrap()
        .contains_key(&StackId::from("webapp-pr-pr-123-application")));
}

fn deployed_base(secrets: &Path, context: DeploymentContext) -> InMemoryExportStore {
    let mut standing = use_case(InMemoryExportStore::new());
    standing
        .execute(
            &DeployOptions::new("dev")
                .with_context(context)
                .with_secrets_dir(secrets),
        )
        .unwrap();
    standing
        .exports()
        .list()
        .unwrap()
        .into_iter()
        .fold(InMemoryExportStore::new(), |store, (id, exports)| {
            store.with_stack(id, exports)
        })
}

fn review_with_domain(id: &str) -> DeploymentContext {
    DeploymentContext {
        domain: Some("example.com".to_string()),
        app_name: Some("shop".to_string()),
        ..pr_context(id)
    }
}

#[test]
fn review_against_http_only_base_is_downgraded_to_http() {
    let secrets = tempdir().unwrap();
    let base = deployed_base(secrets.path(), DeploymentContext::default());
    let mut uc = use_case(base);

    let summary = uc
        .execute(
            &DeployOptions::new("dev")
                .with_context(review_with_domain("42"))
                .with_secrets_dir(secrets.path()),
        )
        .unwrap();

    assert!(!summary.features.https);
    assert_eq!(summary.features.certificate, "none");
    assert!(summary
        .features
        .https_disabled_reason
        .as_deref()
        .is_some_and(|r| r.contains("no HTTPS listener")));
    assert!(summary.application_url.starts_with("http://"));
    assert!(summary.warnings.iter().any(|w| w.contains("served over HTTP")));
}

#[test]
fn review_against_https_base_inherits_its_listener() {
    let secrets = tempdir().unwrap();
    let https_base = DeploymentContext {
        domain: Some("example.com".to_string()),
        app_name: Some("shop".to_string()),
        ..Default::default()
    };
    let base = deployed_base(secrets.path(), https_base);
    let mut uc = use_case(base);

    let summary = uc
        .execute(
            &DeployOptions::new("dev")
                .with_context(review_with_domain("42"))
                .with_secrets_dir(secrets.path()),
        )
        .unwrap();

    assert!(summary.features.https);
    assert_eq!(summary.features.certificate, "inherited");
    assert_eq!(summary.application_url, "https://pr-42.example.com");
}

#[test]
fn dry_run_creates_and_publishes_nothing() {
    let secrets = tempdir().unwrap();
    let mut uc = use_case(InMemoryExportStore::new());

    let summary = uc
        .execute(
            &DeployOptions::new("staging")
                .with_secrets_dir(secrets.path())
                .with_dry_run(true),
        )
        .unwrap();

    assert!(!summary.applied);
    assert!(summary.resource_count > 0);
    assert!(uc.provisioner().created.is_empty());
    assert!(uc.exports().list().unwrap().is_empty());
    assert_eq!(summary.application_url, PENDING_URL);
}

#[test]
fn provisioning_failure_stops_later_stacks() {
    let secrets = tempdir().unwrap();
    let mut uc = DeployUseCase::new(
        builtin().unwrap(),
        RecordingProvisioner {
            fail_on: Some(ResourceKind::Cluster),
            ..Default::default()
        },
        InMemoryExportStore::new(),
        Box::new(NoDecryptor),
        Box::new(StaticEnv::new()),
    );

    let err = uc
        .execute(&DeployOptions::new("dev").with_secrets_dir(secrets.path()))
        .unwrap_err();

    assert!(matches!(err, StackplanError::Provisioning { .. }));
    assert!(uc
        .provisioner()
        .created
        .iter()
        .all(|(stack, _)| stack.as_str() != "webapp-dev-application"));
    // The network stack finished and stays published
    let published = uc.exports().list().unwrap();
    assert_eq!(published.len(), 1);
}

#[test]
fn environment_secrets_surface_a_warning() {
    let secrets = tempdir().unwrap();
    let uc = use_case(InMemoryExportStore::new());

    let planned = uc
        .plan(&DeployOptions::new("dev").with_secrets_dir(secrets.path()))
        .unwrap();

    assert_eq!(planned.secrets.source, SecretSource::Environment);
    let summary = planned.summary(false, None);
    assert!(summary
        .warnings
        .iter()
        .any(|w| w.contains("environment variables")));
}

#[test]
fn events_follow_the_apply_order() {
    let secrets = tempdir().unwrap();
    let mut uc = use_case(InMemoryExportStore::new());
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::new(RecordingEventSink {
        events: events.clone(),
    });

    uc.execute_with_events(
        &DeployOptions::new("dev").with_secrets_dir(secrets.path()),
        sink,
    )
    .unwrap();

    let events = events.lock().unwrap();
    assert!(matches!(events.first(), Some(DeployEvent::Planned { .. })));
    assert!(matches!(
        events.last(),
        Some(DeployEvent::Completed { dry_run: false, .. })
    ));
    let started: Vec<String> = events
        .iter()
        .filter_map(|e| match e {
            DeployEvent::StackStarted { stack, .. } => Some(stack.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(
        started,
        vec![
            "webapp-dev-network",
            "webapp-dev-platform",
            "webapp-dev-application"
        ]
    );
    assert!(events
        .iter()
        .any(|e| matches!(e, DeployEvent::ResourceCreated { .. })));
}

#[test]
fn unknown_environment_is_a_configuration_error() {
    let uc = use_case(InMemoryExportStore::new());
    let err = uc.plan(&DeployOptions::new("prod")).unwrap_err();
    assert!(matches!(err, StackplanError::UnknownEnvironment { .. }));
}
