//! Network interface model.

use super::{Attributes, HostId, NetId};
use std::net::IpAddr;

/// Handle of a [`Nic`] inside its [`Topology`](crate::topology::Topology).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NicId(pub(crate) usize);

impl NicId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One address on the network, optionally owned by a host.
#[derive(Debug, Clone)]
pub struct Nic {
    pub name: Option<String>,
    pub address: IpAddr,
    pub(crate) host: Option<HostId>,
    pub(crate) net: NetId,
    pub info: Attributes,
}

impl Nic {
    pub(crate) fn new(name: Option<&str>, address: IpAddr, net: NetId) -> Nic {
        Nic {
            name: name.map(str::to_string),
            address,
            host: None,
            net,
            info: Attributes::new(),
        }
    }

    pub fn host(&self) -> Option<HostId> {
        self.host
    }

    /// The most specific declared net containing this address.
    pub fn net(&self) -> NetId {
        self.net
    }
}
