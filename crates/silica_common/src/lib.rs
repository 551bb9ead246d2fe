//! Shared foundational types used across the Silica synthesis core.
//!
//! This crate provides the common result type for internal errors and the
//! content hashing used to derive stable transformation identifiers.

#![warn(missing_docs)]

pub mod hash;
pub mod result;

pub use hash::ContentHash;
pub use result::{InternalError, SilicaResult};
