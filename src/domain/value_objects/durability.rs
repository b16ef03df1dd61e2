//! Durability Value Object
//!
//! Whether an environment is long-lived. Drives log retention, cold-storage
//! transitions, deletion protection and the firewall country block.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Durability {
    /// Short-lived (dev, review deployments)
    #[default]
    Ephemeral,
    /// Long-lived (staging, production)
    Durable,
}

impl Durability {
    pub fn is_durable(&self) -> bool {
        matches!(self, Durability::Durable)
    }
}
