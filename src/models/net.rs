//! Subnet tree node.

use super::{Attributes, NicId, Prefix};
use std::fmt;

/// Handle of a [`Net`] inside its [`Topology`](crate::topology::Topology).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NetId(pub(crate) usize);

impl NetId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One declared subnet scope (or the root of the tree).
#[derive(Debug, Clone)]
pub struct Net {
    /// Display name; repeated declarations of the same prefix are joined with `", "`.
    pub name: Option<String>,
    pub prefix: Prefix,
    pub(crate) parent: Option<NetId>,
    /// Sorted by base address, never overlapping.
    pub(crate) children: Vec<NetId>,
    /// Directly attached NICs, sorted by address.
    pub(crate) nics: Vec<NicId>,
    /// Free-form attributes; not rendered, but visible to style policies.
    pub info: Attributes,
}

impl Net {
    pub(crate) fn new(name: Option<&str>, prefix: Prefix, parent: Option<NetId>) -> Net {
        Net {
            name: name.map(str::to_string),
            prefix,
            parent,
            children: Vec::new(),
            nics: Vec::new(),
            info: Attributes::new(),
        }
    }

    pub fn parent(&self) -> Option<NetId> {
        self.parent
    }

    pub fn children(&self) -> &[NetId] {
        &self.children
    }

    pub fn nics(&self) -> &[NicId] {
        &self.nics
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Identifier used for the rendered node: the name, else the prefix.
    pub fn display_id(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.prefix.to_string(),
        }
    }
}

impl fmt::Display for Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({name})", self.prefix),
            None => write!(f, "{}", self.prefix),
        }
    }
}
