//! Test fixtures - reusable content constants for tests.

/// A complete plaintext secret document
pub const VALID_SECRETS: &str = r#"application:
  secret_key: fixture-signing-secret
  required_setting: enabled
database:
  url: postgres://app:pw@db.internal:5432/app
cache:
  url: redis://cache.internal:6379/0
"#;

/// Missing `application.secret_key`
pub const SECRETS_WITHOUT_SIGNING_KEY: &str = r#"application:
  required_setting: enabled
"#;

/// One small environment with a typo in a key
pub const CONFIG_WITH_TYPO: &str = r#"project = "shop"
region = "eu-west-1"

[environments.qa]
durability = "ephemeral"

[environments.qa.capacty]
desired = 1
"#;

/// Two custom environments
pub const CUSTOM_CONFIG: &str = r#"project = "shop"
region = "eu-west-1"

[environments.qa]
durability = "ephemeral"

[environments.qa.network]
availability_zones = 2

[environments.live]
durability = "durable"

[environments.live.network]
cidr = "10.9.0.0/16"
availability_zones = 3

[environments.live.network.nat]
high_availability = true

[environments.live.capacity]
desired = 2
min = 2
max = 6
"#;
