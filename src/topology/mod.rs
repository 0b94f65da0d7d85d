//! In-memory network topology.
//!
//! [`Topology`] owns every [`Net`], [`Nic`] and [`Host`] in flat arenas; all
//! cross references are copyable handles into those arenas, so subtrees can be
//! re-parented without touching ownership.
//!
//! - [`tree`] - subnet lookup, insertion and common ancestors
//! - [`builder`] - NIC declaration and the scoped "current host"
//! - [`snapshot`] - serializable view of the tree

mod builder;
mod snapshot;
mod tree;

use crate::config;
use crate::models::{Host, HostId, Net, NetId, Nic, NicId, Prefix};
use std::collections::HashMap;

pub use builder::{HostScope, HostToken};
pub use snapshot::{NetSnapshot, NicSnapshot};

/// Subnet tree plus the NIC and host registries.
#[derive(Debug, Clone)]
pub struct Topology {
    nets: Vec<Net>,
    nics: Vec<Nic>,
    hosts: Vec<Host>,
    host_index: HashMap<String, HostId>,
    current_host: Option<HostId>,
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}

impl Topology {
    /// An IPv4 topology rooted at `0.0.0.0/0` ("The Internet").
    pub fn new() -> Topology {
        Topology::with_root(config::ROOT_PREFIX, Some(config::ROOT_NAME))
    }

    /// A topology whose root covers `prefix`.
    pub fn with_root(prefix: Prefix, name: Option<&str>) -> Topology {
        Topology {
            nets: vec![Net::new(name, prefix, None)],
            nics: Vec::new(),
            hosts: Vec::new(),
            host_index: HashMap::new(),
            current_host: None,
        }
    }

    pub fn root(&self) -> NetId {
        NetId(0)
    }

    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id.0]
    }

    pub fn net_mut(&mut self, id: NetId) -> &mut Net {
        &mut self.nets[id.0]
    }

    /// Every net, in creation order (the root first).
    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    pub fn nic(&self, id: NicId) -> &Nic {
        &self.nics[id.0]
    }

    pub fn nic_mut(&mut self, id: NicId) -> &mut Nic {
        &mut self.nics[id.0]
    }

    pub fn nics(&self) -> &[Nic] {
        &self.nics
    }

    pub fn host(&self, id: HostId) -> &Host {
        &self.hosts[id.0]
    }

    pub fn host_mut(&mut self, id: HostId) -> &mut Host {
        &mut self.hosts[id.0]
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    /// Handles of every host, in declaration order.
    pub fn host_ids(&self) -> impl Iterator<Item = HostId> {
        (0..self.hosts.len()).map(HostId)
    }

    pub fn host_by_name(&self, name: &str) -> Option<HostId> {
        self.host_index.get(name).copied()
    }

    /// The host NICs are currently attached to, if a host scope is open.
    pub fn current_host(&self) -> Option<HostId> {
        self.current_host
    }

    /// Nearest common ancestor of the nets of all the host's NICs.
    ///
    /// `None` for a host without NICs.
    pub fn effective_subnet(&self, host: HostId) -> Option<NetId> {
        self.host(host)
            .nics
            .iter()
            .map(|&nic| self.nic(nic).net)
            .reduce(|a, b| self.common_ancestor(a, b))
    }

    /// `true` when all of the host's NICs sit in the same net (or it has at most one).
    pub fn is_solitary(&self, host: HostId) -> bool {
        let mut nets = self.host(host).nics.iter().map(|&nic| self.nic(nic).net);
        match nets.next() {
            Some(first) => nets.all(|net| net == first),
            None => true,
        }
    }

    /// Port identifier of a NIC inside rendered tables.
    pub fn nic_port(&self, id: NicId) -> String {
        let nic = self.nic(id);
        match (&nic.name, nic.host) {
            (Some(name), Some(host)) => format!("{}_{name}", self.host(host).name),
            (Some(name), None) => name.clone(),
            (None, _) => format!("nic{}", id.0),
        }
    }
}
