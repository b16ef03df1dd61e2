//! Property tests for the secrets fallback chain.

use proptest::prelude::*;

use stackplan::application::{SecretSource, SecretsResolver};
use stackplan::infrastructure::{SopsDecryptor, StaticEnv};

fn maybe_value() -> impl Strategy<Value = Option<String>> {
    proptest::option::of(prop_oneof![
        Just(String::new()),
        Just("  ".to_string()),
        "[ -~]{1,40}",
    ])
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: With no secret files, resolution always falls back to the
    /// environment and always yields a bundle with every required key.
    #[test]
    fn property_environment_fallback_never_fails(
        environment in "[a-z][a-z0-9-]{0,15}",
        secret_key in maybe_value(),
        required_setting in maybe_value(),
        database_url in maybe_value(),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let mut env = StaticEnv::new();
        for (key, value) in [
            ("SECRET_KEY", secret_key),
            ("REQUIRED_SETTING", required_setting),
            ("DATABASE_URL", database_url),
        ] {
            if let Some(value) = value {
                env = env.with(key, value);
            }
        }
        let decryptor = SopsDecryptor::new();

        let resolved = SecretsResolver::new(&decryptor, &env, dir.path())
            .resolve(&environment)
            .unwrap();

        prop_assert_eq!(resolved.source, SecretSource::Environment);
        prop_assert!(resolved.path.is_none());
        prop_assert_eq!(resolved.bundle.missing_required(), None);
        let secret = resolved.bundle.get("application", "secret_key").unwrap();
        prop_assert!(!secret.trim().is_empty());
    }
}
