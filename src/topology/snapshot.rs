//! Serializable view of the subnet tree.

use super::Topology;
use crate::models::{Attributes, NetId, Prefix};
use serde::Serialize;
use std::net::IpAddr;

/// One net with its attached NICs and its subtree.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NetSnapshot {
    pub name: Option<String>,
    pub prefix: Prefix,
    #[serde(skip_serializing_if = "Attributes::is_empty")]
    pub info: Attributes,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nics: Vec<NicSnapshot>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NetSnapshot>,
}

/// A NIC as seen from the net it is attached to.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NicSnapshot {
    pub name: Option<String>,
    pub address: IpAddr,
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Attributes::is_empty")]
    pub info: Attributes,
}

impl Topology {
    /// Snapshot of the whole tree from the root.
    pub fn snapshot(&self) -> NetSnapshot {
        self.snapshot_net(self.root())
    }

    fn snapshot_net(&self, id: NetId) -> NetSnapshot {
        let net = self.net(id);
        NetSnapshot {
            name: net.name.clone(),
            prefix: net.prefix,
            info: net.info.clone(),
            nics: net
                .nics()
                .iter()
                .map(|&n| {
                    let nic = self.nic(n);
                    NicSnapshot {
                        name: nic.name.clone(),
                        address: nic.address,
                        host: nic.host().map(|h| self.host(h).name.clone()),
                        info: nic.info.clone(),
                    }
                })
                .collect(),
            children: net
                .children()
                .iter()
                .map(|&ch| self.snapshot_net(ch))
                .collect(),
        }
    }
}
