//! Structured output sink consumed by the renderer.

use std::io;

/// Receives statements and properly nested groups.
///
/// Implementations own the concrete syntax: indentation, statement
/// terminators and how a group is opened and closed.
pub trait Sink {
    /// Write one complete statement.
    fn write_statement(&mut self, text: &str) -> io::Result<()>;

    /// Open a group; everything written until the matching close is nested in it.
    fn open_group(&mut self, label: &str) -> io::Result<()>;

    /// Close the group opened with the same `label`.
    fn close_group(&mut self, label: &str) -> io::Result<()>;

    /// Run `body` inside a group, closing it even when `body` fails.
    fn group<F>(&mut self, label: &str, body: F) -> io::Result<()>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> io::Result<()>,
    {
        self.open_group(label)?;
        let result = body(self);
        let closed = self.close_group(label);
        result.and(closed)
    }
}
