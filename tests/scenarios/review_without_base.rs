//! Scenario: Review Deployment Before The Standing Environment Exists
//!
//! Journey: CI opens a pull request and tries to deploy a review environment
//! against `dev`, but nobody has deployed `dev` yet.
//!
//! Success Criteria:
//! - the run fails with a cross-stack import error
//! - nothing is created, not even the review stack's first resource

use stackplan::application::DeployOptions;
use stackplan::config::{builtin, DeploymentContext};
use stackplan::infrastructure::{InMemoryExportStore, LocalStateProvisioner, SopsDecryptor, StaticEnv};
use stackplan::{DeployUseCase, ErrorCategory};

use crate::common::*;
use crate::assert_success;

#[test]
fn scenario_review_without_base_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut use_case = DeployUseCase::new(
        builtin().unwrap(),
        LocalStateProvisioner::new(dir.path().join("state")),
        InMemoryExportStore::new(),
        Box::new(SopsDecryptor::new()),
        Box::new(StaticEnv::new()),
    );
    let options = DeployOptions::new("dev")
        .with_secrets_dir(dir.path().join("secrets"))
        .with_context(DeploymentContext {
            ephemeral_id: Some("PR-123".to_string()),
            image_tag: Some("sha-abc123".to_string()),
            ..Default::default()
        });

    let err = use_case.execute(&options).unwrap_err();

    assert_eq!(err.category(), ErrorCategory::CrossStackImport);
    assert!(err.to_string().contains("webapp-dev-"));
    assert!(use_case.provisioner().applied().is_empty());
    assert!(!dir.path().join("state/stacks").exists());
}

#[test]
fn scenario_review_without_base_from_cli() {
    let env = TestEnv::builder().build();

    let result = env.run_with_env(
        &["deploy", "-e", "dev"],
        &[("STACKPLAN_PR_ID", "123"), ("STACKPLAN_IMAGE_TAG", "sha-1")],
    );

    assert_eq!(result.exit_code, 1);
    assert!(result.stderr.contains("Error [cross-stack import]"));
    assert!(result.stderr.contains("deploy the standing environment"));
    assert!(!env.state_path("stacks").exists());

    // Once the standing environment exists, the same request succeeds
    assert_success!(env.run(&["deploy", "-e", "dev"]));
    let result = env.run_with_env(
        &["deploy", "-e", "dev"],
        &[("STACKPLAN_PR_ID", "123"), ("STACKPLAN_IMAGE_TAG", "sha-1")],
    );
    assert_success!(result);
    assert!(env.state_path("stacks/webapp-pr-123-application.json").exists());
}
