//! Subnet tree: lookup, insertion with re-parenting, common ancestors.

use super::Topology;
use crate::error::{Error, Result};
use crate::models::{merge_name, Net, NetId, NicId, Prefix};
use std::collections::HashSet;
use std::net::IpAddr;

impl Topology {
    /// The most specific declared net containing `address`.
    ///
    /// # Errors
    /// [`Error::AddressOutOfRange`] if the root does not cover `address`.
    pub fn locate(&self, address: IpAddr) -> Result<NetId> {
        self.locate_from(self.root(), address)
    }

    /// Like [`locate`](Self::locate), starting the descent at `start`.
    pub fn locate_from(&self, start: NetId, address: IpAddr) -> Result<NetId> {
        let start_prefix = self.net(start).prefix;
        if !start_prefix.contains(address) {
            return Err(Error::AddressOutOfRange {
                address,
                prefix: start_prefix,
            });
        }

        let mut cur = start;
        loop {
            let children = &self.net(cur).children;
            // greatest child whose base address is <= address
            let ix = children.partition_point(|&ch| self.net(ch).prefix.network() <= address);
            match ix.checked_sub(1).map(|i| children[i]) {
                Some(ch) if self.net(ch).prefix.contains(address) => cur = ch,
                _ => return Ok(cur),
            }
        }
    }

    /// Declare a subnet somewhere under the root.
    ///
    /// Returns the existing node when `prefix` was declared before (merging the
    /// name), otherwise inserts a new node, pulling in every NIC and sibling net
    /// that now falls inside it.
    pub fn declare_subnet(&mut self, prefix: Prefix, name: Option<&str>) -> Result<NetId> {
        self.declare_subnet_in(self.root(), prefix, name)
    }

    /// Like [`declare_subnet`](Self::declare_subnet), claiming `prefix` nests under `start`.
    ///
    /// # Errors
    /// [`Error::AddressOutOfRange`] if `prefix` is outside the root's address
    /// family, [`Error::InvalidPrefixNesting`] if it is not a subset of `start`'s prefix.
    pub fn declare_subnet_in(
        &mut self,
        start: NetId,
        prefix: Prefix,
        name: Option<&str>,
    ) -> Result<NetId> {
        let root = self.net(self.root()).prefix;
        if prefix.network().is_ipv4() != root.network().is_ipv4() {
            return Err(Error::AddressOutOfRange {
                address: prefix.network(),
                prefix: root,
            });
        }

        let mut cur = start;
        loop {
            let parent = self.net(cur).prefix;
            if !prefix.is_subset_of(&parent) {
                return Err(Error::InvalidPrefixNesting { prefix, parent });
            }
            if prefix == parent {
                // only reachable for the starting node itself
                merge_name(&mut self.net_mut(cur).name, name);
                return Ok(cur);
            }

            let containing = self
                .net(cur)
                .children
                .iter()
                .copied()
                .find(|&ch| prefix.is_subset_of(&self.net(ch).prefix));

            match containing {
                Some(ch) if self.net(ch).prefix == prefix => {
                    log::debug!("Merging name {name:?} into existing net {prefix}");
                    merge_name(&mut self.net_mut(ch).name, name);
                    return Ok(ch);
                }
                Some(ch) => cur = ch,
                None => return Ok(self.insert_net(cur, prefix, name)),
            }
        }
    }

    /// Create a child of `parent` and move everything it now covers into it.
    fn insert_net(&mut self, parent: NetId, prefix: Prefix, name: Option<&str>) -> NetId {
        let id = NetId(self.nets.len());
        self.nets.push(Net::new(name, prefix, Some(parent)));

        let (moved_nics, kept_nics): (Vec<NicId>, Vec<NicId>) = self
            .net(parent)
            .nics
            .iter()
            .partition(|&&nic| prefix.contains(self.nic(nic).address));
        for &nic in &moved_nics {
            self.nics[nic.0].net = id;
        }

        let (moved_nets, kept_nets): (Vec<NetId>, Vec<NetId>) = self
            .net(parent)
            .children
            .iter()
            .partition(|&&ch| self.net(ch).prefix.is_subset_of(&prefix));
        for &ch in &moved_nets {
            self.nets[ch.0].parent = Some(id);
        }

        if !moved_nics.is_empty() || !moved_nets.is_empty() {
            log::debug!(
                "Net {prefix} takes over {} NIC(s) and {} subnet(s) from {}",
                moved_nics.len(),
                moved_nets.len(),
                self.net(parent).prefix
            );
        }

        // partition keeps relative order, so both halves stay sorted
        let new_net = self.net_mut(id);
        new_net.nics = moved_nics;
        new_net.children = moved_nets;

        let ix = kept_nets.partition_point(|&ch| self.net(ch).prefix.cmp_base(&prefix).is_lt());
        let parent_net = self.net_mut(parent);
        parent_net.nics = kept_nics;
        parent_net.children = kept_nets;
        parent_net.children.insert(ix, id);

        log::debug!("Declared net {prefix} ({name:?}) under {}", self.net(parent).prefix);
        id
    }

    /// `net` followed by each of its ancestors up to the root.
    pub fn ancestors(&self, net: NetId) -> impl Iterator<Item = NetId> + '_ {
        std::iter::successors(Some(net), move |&n| self.net(n).parent)
    }

    /// Nearest net that is an ancestor of (or equal to) both `a` and `b`.
    pub fn common_ancestor(&self, a: NetId, b: NetId) -> NetId {
        let ours: HashSet<NetId> = self.ancestors(a).collect();
        self.ancestors(b)
            .find(|n| ours.contains(n))
            .unwrap_or_else(|| self.root())
    }

    /// Depth of `net` below the root (the root is 0).
    pub fn depth(&self, net: NetId) -> usize {
        self.ancestors(net).count() - 1
    }

    /// All nets in pre-order: a node, then its children by base address.
    pub fn walk(&self) -> Vec<NetId> {
        let mut order = Vec::with_capacity(self.nets.len());
        let mut stack = vec![self.root()];
        while let Some(net) = stack.pop() {
            order.push(net);
            stack.extend(self.net(net).children.iter().rev());
        }
        order
    }
}
