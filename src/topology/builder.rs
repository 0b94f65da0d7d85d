//! Mutating operations: NIC declaration and the scoped "current host".

use super::Topology;
use crate::error::Result;
use crate::models::{merge_name, Host, HostId, Nic, NicId};
use std::net::IpAddr;
use std::ops::{Deref, DerefMut};

/// Returned by [`Topology::begin_host`]; hand it back to [`Topology::end_host`].
#[must_use = "pass the token to end_host to restore the previous host"]
#[derive(Debug)]
pub struct HostToken {
    host: HostId,
    previous: Option<HostId>,
}

impl HostToken {
    pub fn host(&self) -> HostId {
        self.host
    }
}

/// Guard making a host the implicit NIC owner while it lives.
///
/// Derefs to the [`Topology`], and restores the previously active host when
/// dropped, whichever way the scope is left.
pub struct HostScope<'a> {
    topology: &'a mut Topology,
    host: HostId,
    previous: Option<HostId>,
}

impl HostScope<'_> {
    pub fn id(&self) -> HostId {
        self.host
    }

    pub fn host_mut(&mut self) -> &mut Host {
        let host = self.host;
        self.topology.host_mut(host)
    }
}

impl Deref for HostScope<'_> {
    type Target = Topology;

    fn deref(&self) -> &Topology {
        self.topology
    }
}

impl DerefMut for HostScope<'_> {
    fn deref_mut(&mut self) -> &mut Topology {
        self.topology
    }
}

impl Drop for HostScope<'_> {
    fn drop(&mut self) {
        self.topology.current_host = self.previous;
    }
}

impl Topology {
    /// Find the host called `name`, creating it on first use.
    pub fn ensure_host(&mut self, name: &str) -> HostId {
        if let Some(id) = self.host_index.get(name) {
            return *id;
        }
        let id = HostId(self.hosts.len());
        self.hosts.push(Host::new(name));
        self.host_index.insert(name.to_string(), id);
        log::debug!("New host '{name}'");
        id
    }

    /// Make `name` the current host until the token is passed to [`end_host`](Self::end_host).
    pub fn begin_host(&mut self, name: &str) -> HostToken {
        let host = self.ensure_host(name);
        let previous = self.current_host.replace(host);
        HostToken { host, previous }
    }

    /// Close a scope opened by [`begin_host`](Self::begin_host).
    pub fn end_host(&mut self, token: HostToken) {
        self.current_host = token.previous;
    }

    /// Scope guard form of [`begin_host`](Self::begin_host) / [`end_host`](Self::end_host).
    pub fn with_host(&mut self, name: &str) -> HostScope<'_> {
        let host = self.ensure_host(name);
        let previous = self.current_host.replace(host);
        HostScope {
            topology: self,
            host,
            previous,
        }
    }

    /// Declare a NIC at `address`.
    ///
    /// The NIC lands in the most specific declared net; an existing NIC at the
    /// same address is reused and its name merged. Inside a host scope the NIC
    /// is also attached to the current host.
    ///
    /// # Errors
    /// [`Error::AddressOutOfRange`](crate::Error::AddressOutOfRange) if the root
    /// does not cover `address`; nothing is modified in that case.
    pub fn add_nic(&mut self, address: IpAddr, name: Option<&str>) -> Result<NicId> {
        let net = self.locate(address)?;

        let found = self
            .net(net)
            .nics
            .binary_search_by_key(&address, |&nic| self.nic(nic).address);
        let id = match found {
            Ok(ix) => {
                let id = self.net(net).nics[ix];
                merge_name(&mut self.nic_mut(id).name, name);
                id
            }
            Err(ix) => {
                let id = NicId(self.nics.len());
                self.nics.push(Nic::new(name, address, net));
                self.net_mut(net).nics.insert(ix, id);
                id
            }
        };

        if let Some(host) = self.current_host {
            self.attach_nic(host, id);
        }
        Ok(id)
    }

    /// Record `nic` in `host`'s sorted NIC list and point it back at the host.
    fn attach_nic(&mut self, host: HostId, nic: NicId) {
        let previous = self.nic(nic).host;
        if previous == Some(host) {
            return;
        }
        if let Some(other) = previous {
            log::debug!(
                "NIC {} moves from host '{}' to '{}'",
                self.nic(nic).address,
                self.host(other).name,
                self.host(host).name
            );
            self.host_mut(other).nics.retain(|&n| n != nic);
        }

        let address = self.nic(nic).address;
        let ix = self
            .host(host)
            .nics
            .partition_point(|&n| self.nic(n).address < address);
        self.host_mut(host).nics.insert(ix, nic);
        self.nic_mut(nic).host = Some(host);
    }
}
