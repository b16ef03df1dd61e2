//! Property tests for ephemeral identifiers and derived names.

use proptest::prelude::*;

use stackplan::config::{builtin, resolve, DeploymentContext};
use stackplan::domain::services::{listener_rule, service_name, STANDING_RULE_PRIORITY};
use stackplan::domain::value_objects::{sanitize, EphemeralId, MAX_TOKEN_LEN};

fn is_dns_safe(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Sanitized tokens only contain `[a-z0-9-]`, never start or end
    /// with a hyphen and never exceed the token cap.
    #[test]
    fn property_sanitize_is_dns_safe(raw in "(?s).{0,80}") {
        let token = sanitize(&raw);
        prop_assert!(token.len() <= MAX_TOKEN_LEN);
        if !token.is_empty() {
            prop_assert!(is_dns_safe(&token));
            prop_assert!(!token.starts_with('-'));
            prop_assert!(!token.ends_with('-'));
            prop_assert!(!token.contains("--"));
        }
    }

    /// PROPERTY: Sanitizing is idempotent.
    #[test]
    fn property_sanitize_idempotent(raw in "(?s).{0,80}") {
        let once = sanitize(&raw);
        prop_assert_eq!(sanitize(&once), once.clone());
    }

    /// PROPERTY: Review service names are DNS-safe for any accepted identifier.
    #[test]
    fn property_review_service_name_is_dns_safe(raw in "[A-Za-z0-9 _/#.!-]{1,60}") {
        let Ok(id) = EphemeralId::parse(&raw) else {
            prop_assert!(sanitize(&raw).is_empty());
            return Ok(());
        };
        let context = DeploymentContext {
            ephemeral_id: Some(raw),
            image_tag: Some("sha-1".to_string()),
            ..Default::default()
        };
        let env = resolve(&builtin().unwrap(), "dev", &context).unwrap();
        let name = service_name(&env);

        prop_assert!(is_dns_safe(&name));
        prop_assert_eq!(name, format!("webapp-pr-{}", id.token()));
    }

    /// PROPERTY: Review listener priorities never collide with the standing rule.
    #[test]
    fn property_review_priority_below_standing(raw in "[a-z0-9]{1,32}") {
        let id = EphemeralId::parse(&raw).unwrap();
        let priority = id.rule_priority();
        prop_assert!((1..STANDING_RULE_PRIORITY).contains(&priority));
        prop_assert_eq!(priority, EphemeralId::parse(&raw).unwrap().rule_priority());

        let context = DeploymentContext {
            ephemeral_id: Some(raw),
            image_tag: Some("sha-1".to_string()),
            ..Default::default()
        };
        let env = resolve(&builtin().unwrap(), "dev", &context).unwrap();
        prop_assert_eq!(listener_rule(&env).0, priority);
    }
}
