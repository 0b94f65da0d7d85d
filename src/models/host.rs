//! Host model.

use super::{Attributes, NicId};

/// Handle of a [`Host`] inside its [`Topology`](crate::topology::Topology).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostId(pub(crate) usize);

impl HostId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named machine owning one or more NICs.
///
/// The host's subnet is not stored; it is derived from its NICs' nets.
#[derive(Debug, Clone)]
pub struct Host {
    pub name: String,
    /// Sorted by NIC address.
    pub(crate) nics: Vec<NicId>,
    pub info: Attributes,
}

impl Host {
    pub(crate) fn new(name: &str) -> Host {
        Host {
            name: name.to_string(),
            nics: Vec::new(),
            info: Attributes::new(),
        }
    }

    pub fn nics(&self) -> &[NicId] {
        &self.nics
    }
}
