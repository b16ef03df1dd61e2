//! Address block arithmetic
//!
//! IPv4 and IPv6 blocks with just enough arithmetic for subnet planning:
//! parsing, containment, aligned sequential allocation and indexed slicing.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{StackplanError, StackplanResult};

/// An IPv4 network block such as `10.0.0.0/16`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Block {
    addr: u32,
    prefix: u8,
}

impl Ipv4Block {
    pub fn new(addr: Ipv4Addr, prefix: u8) -> StackplanResult<Self> {
        let value = format!("{}/{}", addr, prefix);
        if prefix > 32 {
            return Err(invalid(&value, "prefix length must be at most 32"));
        }
        let raw = u32::from(addr);
        if raw & !Self::mask(prefix) != 0 {
            return Err(invalid(&value, "host bits must be zero"));
        }
        Ok(Self { addr: raw, prefix })
    }

    fn mask(prefix: u8) -> u32 {
        if prefix == 0 {
            0
        } else {
            u32::MAX << (32 - prefix)
        }
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.addr)
    }

    /// Number of addresses in the block
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix))
    }
}

impl FromStr for Ipv4Block {
    type Err = StackplanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, prefix) = s
            .split_once('/')
            .ok_or_else(|| invalid(s, "expected <address>/<prefix>"))?;
        let addr: Ipv4Addr = addr
            .trim()
            .parse()
            .map_err(|e: std::net::AddrParseError| invalid(s, &e.to_string()))?;
        let prefix: u8 = prefix
            .trim()
            .parse()
            .map_err(|_| invalid(s, "prefix length is not a number"))?;
        Self::new(addr, prefix)
    }
}

impl Serialize for Ipv4Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for Ipv4Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix)
    }
}

/// Hands out aligned, non-overlapping sub-blocks of a network in order
#[derive(Debug, Clone)]
pub struct SubnetAllocator {
    network: Ipv4Block,
    cursor: u64,
}

impl SubnetAllocator {
    pub fn new(network: Ipv4Block) -> Self {
        Self { network, cursor: 0 }
    }

    /// Allocate the next block of the given prefix length
    pub fn allocate(&mut self, prefix: u8) -> StackplanResult<Ipv4Block> {
        if prefix < self.network.prefix || prefix > 32 {
            return Err(invalid(
                &format!("{}/{}", self.network.network(), prefix),
                &format!(
                    "subnet prefix must be between /{} and /32",
                    self.network.prefix
                ),
            ));
        }
        let size = 1u64 << (32 - u32::from(prefix));
        let aligned = self.cursor.div_ceil(size) * size;
        if aligned + size > self.network.size() {
            return Err(StackplanError::AddressSpaceExhausted {
                network: self.network.to_string(),
                prefix,
            });
        }
        self.cursor = aligned + size;
        // aligned + size <= network size, so the sum stays inside u32
        let addr = self.network.addr + aligned as u32;
        Ipv4Block::new(Ipv4Addr::from(addr), prefix)
    }
}

/// An IPv6 block such as `2001:db8:1200::/56`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv6Block {
    addr: u128,
    prefix: u8,
}

impl Ipv6Block {
    pub fn new(addr: Ipv6Addr, prefix: u8) -> StackplanResult<Self> {
        let value = format!("{}/{}", addr, prefix);
        if prefix > 128 {
            return Err(invalid(&value, "prefix length must be at most 128"));
        }
        let raw = u128::from(addr);
        let mask = if prefix == 0 {
            0
        } else {
            u128::MAX << (128 - u32::from(prefix))
        };
        if raw & !mask != 0 {
            return Err(invalid(&value, "host bits must be zero"));
        }
        Ok(Self { addr: raw, prefix })
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// The `index`-th sub-block of length `new_prefix`
    pub fn subnet(&self, new_prefix: u8, index: u32) -> StackplanResult<Ipv6Block> {
        let value = format!("{}/{}", Ipv6Addr::from(self.addr), new_prefix);
        if new_prefix < self.prefix || new_prefix > 128 {
            return Err(invalid(
                &value,
                &format!("subnet prefix must be between /{} and /128", self.prefix),
            ));
        }
        let extra_bits = u32::from(new_prefix - self.prefix);
        if extra_bits < 32 && u64::from(index) >= (1u64 << extra_bits) {
            return Err(StackplanError::AddressSpaceExhausted {
                network: self.to_string(),
                prefix: new_prefix,
            });
        }
        let offset = u128::from(index)
            .checked_shl(128 - u32::from(new_prefix))
            .unwrap_or(0);
        Ipv6Block::new(Ipv6Addr::from(self.addr | offset), new_prefix)
    }
}

impl FromStr for Ipv6Block {
    type Err = StackplanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, prefix) = s
            .split_once('/')
            .ok_or_else(|| invalid(s, "expected <address>/<prefix>"))?;
        let addr: Ipv6Addr = addr
            .trim()
            .parse()
            .map_err(|e: std::net::AddrParseError| invalid(s, &e.to_string()))?;
        let prefix: u8 = prefix
            .trim()
            .parse()
            .map_err(|_| invalid(s, "prefix length is not a number"))?;
        Self::new(addr, prefix)
    }
}

impl Serialize for Ipv6Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for Ipv6Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", Ipv6Addr::from(self.addr), self.prefix)
    }
}

fn invalid(value: &str, message: &str) -> StackplanError {
    StackplanError::InvalidCidr {
        value: value.to_string(),
        message: message.to_string(),
    }
}
