//! Domain models for the network topology.
//!
//! This module contains the core data structures used throughout the crate:
//! - [`Prefix`] - CIDR address range with containment tests
//! - [`Net`] - node of the subnet tree
//! - [`Nic`] - one address, optionally owned by a host
//! - [`Host`] - named owner of NICs

mod host;
mod net;
mod nic;
mod prefix;

use std::collections::BTreeMap;

// Re-export public types
pub use host::{Host, HostId};
pub use net::{Net, NetId};
pub use nic::{Nic, NicId};
pub use prefix::{
    broadcast_addr, cut_addr, get_cidr_mask, max_length, parse_address, Prefix, MAX_LENGTH_V4,
    MAX_LENGTH_V6,
};

/// String-keyed attributes attached to nets, hosts and NICs.
///
/// Ordered so that key unions and rendered attribute lists are deterministic.
pub type Attributes = BTreeMap<String, String>;

/// Merge a newly declared display name into an existing one.
///
/// Names accumulate as a comma separated list; a `None` update is a no-op.
pub fn merge_name(existing: &mut Option<String>, name: Option<&str>) {
    let Some(name) = name else {
        return;
    };
    match existing {
        Some(current) => {
            current.push_str(", ");
            current.push_str(name);
        }
        None => *existing = Some(name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_name() {
        let mut name = None;
        merge_name(&mut name, None);
        assert_eq!(name, None);

        merge_name(&mut name, Some("Private"));
        assert_eq!(name.as_deref(), Some("Private"));

        merge_name(&mut name, Some("LAN"));
        assert_eq!(name.as_deref(), Some("Private, LAN"));

        merge_name(&mut name, None);
        assert_eq!(name.as_deref(), Some("Private, LAN"));
    }
}
