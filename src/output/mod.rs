//! Output formatting for topology diagrams.
//!
//! This module handles turning a topology into a diagram:
//! - [`render`] - the recursive cluster/table/edge walk
//! - [`Sink`] - the structured output interface the walk writes to
//! - [`graphviz`] - DOT implementation of the sink plus quoting helpers
//! - [`StylePolicy`] - pluggable attribute hooks

pub mod graphviz;
mod render;
mod sink;
mod style;

pub use graphviz::GraphViz;
pub use render::{render, RenderOptions, RenderStats};
pub use sink::Sink;
pub use style::{DefaultStyle, PlainStyle, StylePolicy};
