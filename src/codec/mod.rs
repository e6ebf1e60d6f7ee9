//! Package codec for async I/O.
//!
//! This module provides package-level reading and writing over async streams.

#[cfg(feature = "async-tokio")]
mod framed;

#[cfg(feature = "async-tokio")]
pub use framed::{PackageReader, PackageWriter};
