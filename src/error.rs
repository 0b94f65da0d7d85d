//! Error types for topology declaration and rendering.
//!
//! Structural checks run before any mutation, so an `Err` from a builder
//! operation leaves the topology exactly as it was.

use crate::models::Prefix;
use std::net::IpAddr;
use thiserror::Error;

/// Unified error type for the crate.
#[derive(Debug, Error)]
pub enum Error {
    // ── Structural errors ────────────────────────────────────────────
    #[error("Address {address} is outside {prefix}")]
    AddressOutOfRange { address: IpAddr, prefix: Prefix },

    #[error("Prefix {prefix} does not nest under {parent}")]
    InvalidPrefixNesting { prefix: Prefix, parent: Prefix },

    // ── Parse errors ─────────────────────────────────────────────────
    #[error("Invalid prefix '{input}': {reason}")]
    InvalidPrefix { input: String, reason: &'static str },

    #[error("Invalid address '{input}'")]
    InvalidAddress { input: String },

    #[error("Line {line}: {message}")]
    Declaration { line: usize, message: String },

    // ── Output errors ────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
