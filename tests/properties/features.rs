//! Property tests for feature toggles and task sizing.

use proptest::prelude::*;

use stackplan::config::{builtin, resolve, DeploymentContext};
use stackplan::domain::services::memory_reservation;

fn environment_name() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("dev"), Just("staging"), Just("production")]
}

fn optional_label() -> impl Strategy<Value = Option<String>> {
    proptest::option::of(prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        "[a-z]{1,12}\\.com",
    ])
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: HTTPS is on exactly when both a domain and an app name are present.
    #[test]
    fn property_https_iff_domain_and_app_name(
        name in environment_name(),
        domain in optional_label(),
        app_name in optional_label(),
        certificate in proptest::option::of("arn:cert/[0-9]{1,4}"),
    ) {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        let expected = present(&domain) && present(&app_name);
        let context = DeploymentContext {
            domain,
            app_name,
            certificate,
            ..Default::default()
        };
        let env = resolve(&builtin().unwrap(), name, &context).unwrap();

        prop_assert_eq!(env.https(), expected);
        prop_assert_eq!(env.public_host.is_some(), expected);
    }

    /// PROPERTY: Hardened tasks reserve 80% of task memory.
    #[test]
    fn property_memory_reservation_is_eighty_percent(memory in 128u32..=120_000) {
        let reservation = memory_reservation(memory);
        prop_assert_eq!(reservation, memory * 80 / 100);
        prop_assert!(reservation < memory);
    }

    /// PROPERTY: Scaling out always reacts faster than scaling in.
    #[test]
    fn property_scale_out_faster_than_scale_in(
        name in environment_name(),
        pr in proptest::option::of("[0-9]{1,5}"),
    ) {
        let context = DeploymentContext {
            image_tag: pr.as_ref().map(|_| "sha-1".to_string()),
            ephemeral_id: pr,
            ..Default::default()
        };
        let env = resolve(&builtin().unwrap(), name, &context).unwrap();
        for tracking in [env.scaling.cpu, env.scaling.memory] {
            prop_assert!(tracking.scale_out_cooldown_secs < tracking.scale_in_cooldown_secs);
        }
    }
}
