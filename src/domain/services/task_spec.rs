//! Task specification
//!
//! Two mutually exclusive shapes. A hardened task always carries the fixed
//! non-privileged identity, the read-only root filesystem, a soft memory
//! reservation and scratch volumes; a default task carries none of those keys.

use std::collections::BTreeMap;

use crate::config::{Hardening, ResolvedEnvironment};
use crate::domain::entities::{Property, SecretBundle};

/// Numeric identity the hardened container runs as
pub const NON_ROOT_UID: u32 = 1000;

/// Soft memory reservation as a percentage of the hard limit
pub const MEMORY_RESERVATION_PERCENT: u32 = 80;

pub const CONTAINER_NAME: &str = "web";

/// Fields shared by both task shapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseTask {
    pub family: String,
    pub cpu: u32,
    pub memory: u32,
    pub port: u16,
    pub image_repository: Property,
    pub image_tag: String,
    pub environment: BTreeMap<String, String>,
    /// Container variable name -> `(secret resource, json key)`
    pub secrets: BTreeMap<String, (String, String)>,
    pub log_group: Property,
    pub log_stream_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardenedTask {
    pub base: BaseTask,
    pub user: u32,
    pub read_only_root_filesystem: bool,
    pub memory_reservation: u32,
    pub scratch_paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSpec {
    Default(BaseTask),
    Hardened(HardenedTask),
}

impl TaskSpec {
    /// Choose the shape from the environment's hardening toggles
    pub fn build(base: BaseTask, hardening: Option<&Hardening>) -> Self {
        match hardening {
            None => TaskSpec::Default(base),
            Some(h) => TaskSpec::Hardened(HardenedTask {
                user: NON_ROOT_UID,
                read_only_root_filesystem: true,
                memory_reservation: memory_reservation(base.memory),
                scratch_paths: if h.writable_paths.is_empty() {
                    vec!["/tmp".to_string()]
                } else {
                    h.writable_paths.clone()
                },
                base,
            }),
        }
    }

    pub fn base(&self) -> &BaseTask {
        match self {
            TaskSpec::Default(base) => base,
            TaskSpec::Hardened(hardened) => &hardened.base,
        }
    }

    pub fn is_hardened(&self) -> bool {
        matches!(self, TaskSpec::Hardened(_))
    }

    /// Properties of the task-definition resource
    pub fn properties(&self) -> BTreeMap<String, Property> {
        let base = self.base();
        let mut container: BTreeMap<String, Property> = BTreeMap::new();
        container.insert("name".into(), CONTAINER_NAME.into());
        container.insert("image_repository".into(), base.image_repository.clone());
        container.insert("image_tag".into(), base.image_tag.clone().into());
        container.insert("memory".into(), base.memory.into());
        container.insert(
            "port_mappings".into(),
            Property::List(vec![Property::map([
                ("container_port", Property::from(base.port)),
                ("protocol", Property::from("tcp")),
            ])]),
        );
        container.insert(
            "environment".into(),
            Property::map(base.environment.iter().map(|(k, v)| (k.clone(), v.clone()))),
        );
        container.insert(
            "secrets".into(),
            Property::map(base.secrets.iter().map(|(name, (resource, key))| {
                (
                    name.clone(),
                    Property::map([
                        ("secret", Property::reference(resource.clone(), "arn")),
                        ("key", Property::from(key.clone())),
                    ]),
                )
            })),
        );
        container.insert(
            "logging".into(),
            Property::map([
                ("group", base.log_group.clone()),
                ("stream_prefix", Property::from(base.log_stream_prefix.clone())),
            ]),
        );

        let mut props: BTreeMap<String, Property> = BTreeMap::new();
        props.insert("family".into(), base.family.clone().into());
        props.insert("cpu".into(), base.cpu.into());
        props.insert("memory".into(), base.memory.into());
        props.insert("network_mode".into(), "private-ip".into());

        if let TaskSpec::Hardened(h) = self {
            container.insert("user".into(), h.user.to_string().into());
            container.insert(
                "read_only_root_filesystem".into(),
                h.read_only_root_filesystem.into(),
            );
            container.insert("memory_reservation".into(), h.memory_reservation.into());
            container.insert(
                "mount_points".into(),
                Property::List(
                    h.scratch_paths
                        .iter()
                        .enumerate()
                        .map(|(i, path)| {
                            Property::map([
                                ("volume", Property::from(format!("scratch-{}", i))),
                                ("path", Property::from(path.clone())),
                                ("read_only", Property::from(false)),
                            ])
                        })
                        .collect(),
                ),
            );
            props.insert(
                "volumes".into(),
                Property::List(
                    (0..h.scratch_paths.len())
                        .map(|i| Property::map([("name", format!("scratch-{}", i))]))
                        .collect(),
                ),
            );
        }

        props.insert("container".into(), Property::Map(container));
        props
    }
}

/// 80% of the hard limit, rounded down
pub fn memory_reservation(memory: u32) -> u32 {
    (u64::from(memory) * u64::from(MEMORY_RESERVATION_PERCENT) / 100) as u32
}

/// Container variable name for a bundle key: `services.database_url` -> `DATABASE_URL`
pub fn secret_variable_name(dotted_key: &str) -> String {
    dotted_key
        .rsplit('.')
        .next()
        .unwrap_or(dotted_key)
        .to_ascii_uppercase()
}

/// Section-qualified variable name: `database.password` -> `DATABASE_PASSWORD`
fn qualified_variable_name(dotted_key: &str) -> String {
    dotted_key.replace('.', "_").to_ascii_uppercase()
}

/// Plain variables every container receives, plus the configured map
pub fn container_environment(env: &ResolvedEnvironment) -> BTreeMap<String, String> {
    let mut vars = env.container.environment.clone();
    vars.insert("ENVIRONMENT".to_string(), env.name.clone());
    vars.insert("PORT".to_string(), env.container.port.to_string());
    vars
}

/// Secret references for every key in the bundle
///
/// Keys are exposed under their leaf name; leaves shared by several
/// sections fall back to the section-qualified name for each of them.
pub fn secret_references(
    bundle: &SecretBundle,
    secret_resource: &str,
) -> BTreeMap<String, (String, String)> {
    let keys = bundle.keys();
    let mut leaf_counts: BTreeMap<String, usize> = BTreeMap::new();
    for key in &keys {
        *leaf_counts.entry(secret_variable_name(key)).or_default() += 1;
    }

    keys.into_iter()
        .map(|key| {
            let leaf = secret_variable_name(&key);
            let name = if leaf_counts.get(&leaf).copied().unwrap_or(0) > 1 {
                qualified_variable_name(&key)
            } else {
                leaf
            };
            (name, (secret_resource.to_string(), key))
        })
        .collect()
}
