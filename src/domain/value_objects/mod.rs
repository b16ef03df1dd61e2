//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod certificate;
mod cidr;
mod durability;
mod ephemeral_id;
mod hash;

pub use certificate::CertificateSource;
pub use cidr::{Ipv4Block, Ipv6Block, SubnetAllocator};
pub use durability::Durability;
pub use ephemeral_id::{sanitize, EphemeralId, MAX_TOKEN_LEN};
pub use hash::ContentHash;
