//! Network topology diagrams.
//!
//! Declare hosts, NICs and subnets in any order; the [`Topology`] keeps a strict
//! subnet hierarchy with every NIC in the most specific subnet containing it.
//! [`render`] then walks the tree and emits nested clusters, per-subnet host
//! tables and edges for hosts spanning several subnets.
//!
//! ```
//! use netdiagram::{render, DefaultStyle, GraphViz, RenderOptions, Topology};
//!
//! let mut topology = Topology::new();
//! {
//!     let mut host = topology.with_host("a");
//!     host.add_nic("10.0.1.1".parse().unwrap(), Some("a_priv")).unwrap();
//!     host.add_nic("127.0.0.1".parse().unwrap(), Some("a_pub")).unwrap();
//! }
//! topology.declare_subnet("10.0.1.0/24".parse().unwrap(), Some("Private")).unwrap();
//!
//! let mut dot = GraphViz::new(Vec::new());
//! let stats = render(&topology, &mut dot, &DefaultStyle, &RenderOptions::default()).unwrap();
//! assert_eq!(stats.hosts_with_no_subnet, 0);
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod script;
pub mod topology;

pub use error::{Error, Result};
pub use output::{render, DefaultStyle, GraphViz, RenderOptions, RenderStats, Sink, StylePolicy};
pub use topology::Topology;
