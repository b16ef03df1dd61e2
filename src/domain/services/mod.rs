//! Domain Services
//!
//! Pure planners that turn a resolved environment into stack plans.
//! No I/O; everything here is deterministic for a given input.

mod application;
mod network;
mod planner;
mod platform;
mod task_spec;

pub use application::{
    listener_rule, plan_application, service_name, task_spec, RuleMatch, PREVIEW_HEADER,
    STANDING_RULE_PRIORITY,
};
pub use network::{plan_network, ANY_IPV4, ANY_IPV6, AUXILIARY_PORTS, WEB_PORTS};
pub use planner::{plan, StackNames};
pub use platform::{plan_platform, MANAGED_RULE_GROUPS};
pub use task_spec::{
    container_environment, memory_reservation, secret_references, secret_variable_name, BaseTask,
    HardenedTask, TaskSpec, CONTAINER_NAME, MEMORY_RESERVATION_PERCENT, NON_ROOT_UID,
};
