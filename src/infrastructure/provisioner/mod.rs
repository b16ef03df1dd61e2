//! Provisioner implementations

mod local;

pub use local::{
    load_stack_record, physical_id, stack_record_path, LocalStateProvisioner, RecordedResource,
    StackRecord, STACKS_DIR,
};
