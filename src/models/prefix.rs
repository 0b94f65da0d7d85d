//! Address and CIDR prefix primitives.
//!
//! Provides [`Prefix`] for representing an IPv4 or IPv6 network (base address plus
//! length), along with the bit helpers used for containment tests.

use crate::error::{Error, Result};
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Maximum prefix length for an IPv4 network (32 bits).
pub const MAX_LENGTH_V4: u8 = 32;
/// Maximum prefix length for an IPv6 network (128 bits).
pub const MAX_LENGTH_V6: u8 = 128;

/// Width in bits of the address family of `addr`.
pub fn max_length(addr: IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => MAX_LENGTH_V4,
        IpAddr::V6(_) => MAX_LENGTH_V6,
    }
}

/// Convert a prefix length to a netmask inside an address of `width` bits.
///
/// # Examples
/// ```
/// use netdiagram::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24, 32), Some(0xFFFF_FF00));
/// ```
pub fn get_cidr_mask(len: u8, width: u8) -> Option<u128> {
    if len > width {
        return None;
    }
    let all_bits = if width == MAX_LENGTH_V6 {
        u128::MAX
    } else {
        (1u128 << width) - 1
    };
    let right_len = u32::from(width - len);
    // checked shifts: a /0 mask on a 128-bit family shifts by the full width
    let mask = all_bits
        .checked_shr(right_len)
        .and_then(|bits| bits.checked_shl(right_len))
        .unwrap_or(0);
    Some(mask)
}

fn to_bits(addr: IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => u128::from(u32::from(v4)),
        IpAddr::V6(v6) => u128::from(v6),
    }
}

fn from_bits(like: IpAddr, bits: u128) -> IpAddr {
    match like {
        // the mask keeps bits inside the family width, truncation is lossless
        IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::from(bits as u32)),
        IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::from(bits)),
    }
}

/// Get the network address for a given address and prefix length.
pub fn cut_addr(addr: IpAddr, len: u8) -> Option<IpAddr> {
    let mask = get_cidr_mask(len, max_length(addr))?;
    Some(from_bits(addr, to_bits(addr) & mask))
}

/// Calculate the highest (broadcast) address for a given address and prefix length.
pub fn broadcast_addr(addr: IpAddr, len: u8) -> Option<IpAddr> {
    let width = max_length(addr);
    let mask = get_cidr_mask(len, width)?;
    let family = get_cidr_mask(width, width)?;
    Some(from_bits(addr, (to_bits(addr) & mask) | (!mask & family)))
}

/// A contiguous, aligned address range: base address plus prefix length.
///
/// Host bits of the base address are always zero, so two equal ranges compare
/// equal. Ordering is by base address first, then by length.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct Prefix {
    addr: IpAddr,
    len: u8,
}

impl Prefix {
    /// The whole IPv4 address space, `0.0.0.0/0`.
    pub const V4_ALL: Prefix = Prefix {
        addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        len: 0,
    };

    /// The whole IPv6 address space, `::/0`.
    pub const V6_ALL: Prefix = Prefix {
        addr: IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        len: 0,
    };

    /// Create a prefix, rejecting over-long lengths and set host bits.
    pub fn new(addr: IpAddr, len: u8) -> Result<Prefix> {
        let invalid = |reason: &'static str| Error::InvalidPrefix {
            input: format!("{addr}/{len}"),
            reason,
        };
        let network = cut_addr(addr, len).ok_or_else(|| invalid("prefix length is too long"))?;
        if network != addr {
            return Err(invalid("host bits are set"));
        }
        Ok(Prefix { addr, len })
    }

    /// A prefix covering exactly one address.
    pub fn host(addr: IpAddr) -> Prefix {
        Prefix {
            addr,
            len: max_length(addr),
        }
    }

    /// Lowest address in the range.
    pub fn network(&self) -> IpAddr {
        self.addr
    }

    /// Highest address in the range.
    pub fn broadcast(&self) -> IpAddr {
        broadcast_addr(self.addr, self.len).unwrap_or(self.addr)
    }

    pub fn prefix_len(&self) -> u8 {
        self.len
    }

    /// Check if an address lies within this prefix.
    pub fn contains(&self, addr: IpAddr) -> bool {
        addr.is_ipv4() == self.addr.is_ipv4() && cut_addr(addr, self.len) == Some(self.addr)
    }

    /// `self ⊆ other`, equality included.
    pub fn is_subset_of(&self, other: &Prefix) -> bool {
        self.len >= other.len && other.contains(self.addr)
    }

    /// `self ⊂ other`, equality excluded.
    pub fn is_strict_subset_of(&self, other: &Prefix) -> bool {
        self.len > other.len && other.contains(self.addr)
    }

    /// Order by base address only, which is how siblings in the subnet tree sort.
    pub fn cmp_base(&self, other: &Prefix) -> Ordering {
        self.addr.cmp(&other.addr)
    }
}

impl FromStr for Prefix {
    type Err = Error;

    /// Parse `addr/len`, or a bare address as a single-address prefix.
    fn from_str(s: &str) -> Result<Prefix> {
        let s = s.trim();
        let Some((addr, len)) = s.split_once('/') else {
            return parse_address(s).map(Prefix::host);
        };
        let addr = parse_address(addr)?;
        let len: u8 = len.parse().map_err(|_| Error::InvalidPrefix {
            input: s.to_string(),
            reason: "prefix length is not a number",
        })?;
        Prefix::new(addr, len).map_err(|e| match e {
            Error::InvalidPrefix { reason, .. } => Error::InvalidPrefix {
                input: s.to_string(),
                reason,
            },
            other => other,
        })
    }
}

/// Parse a single IPv4 or IPv6 address.
pub fn parse_address(s: &str) -> Result<IpAddr> {
    s.trim().parse().map_err(|_| Error::InvalidAddress {
        input: s.to_string(),
    })
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.len)
    }
}

impl Serialize for Prefix {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Prefix {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Prefix, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Prefix::from_str(&s).map_err(de::Error::custom)
    }
}
