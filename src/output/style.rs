//! Style hooks for rendered diagrams.

use crate::models::{Attributes, Host, Net, Nic};

/// Attribute hooks consulted while rendering.
///
/// Every method defaults to no attributes, so a policy only overrides the
/// points it cares about. Implementations must be free of side effects; the
/// renderer may call them any number of times in any order.
pub trait StylePolicy {
    /// Graph-wide attributes.
    fn graph(&self) -> Attributes {
        Attributes::new()
    }

    /// Extra attributes for a net's cluster (the label is added by the renderer).
    fn cluster(&self, _net: &Net) -> Attributes {
        Attributes::new()
    }

    /// Attributes for a net's attached-NIC table.
    fn attached(&self, _hosts: &[&Host]) -> Attributes {
        Attributes::new()
    }

    /// Attributes for a net's routed-host table.
    fn routed(&self, _hosts: &[&Host]) -> Attributes {
        Attributes::new()
    }

    /// Attributes for the edge from a routed host to one of its NICs.
    fn connection(&self, _host: &Host, _nic: &Nic) -> Attributes {
        Attributes::new()
    }
}

/// Routed tables and their edges in green, rank/compound graph layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultStyle;

const ROUTED_COLOR: &str = "#0a0";

fn routed_color() -> Attributes {
    Attributes::from([("color".to_string(), ROUTED_COLOR.to_string())])
}

impl StylePolicy for DefaultStyle {
    fn graph(&self) -> Attributes {
        Attributes::from([
            ("newrank".to_string(), "true".to_string()),
            ("compound".to_string(), "true".to_string()),
        ])
    }

    fn routed(&self, _hosts: &[&Host]) -> Attributes {
        routed_color()
    }

    fn connection(&self, _host: &Host, _nic: &Nic) -> Attributes {
        routed_color()
    }
}

/// A policy that adds no attributes at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainStyle;

impl StylePolicy for PlainStyle {}
