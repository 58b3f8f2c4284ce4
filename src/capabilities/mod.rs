//! The capabilities shipped with the fabric binary.
//!
//! Tests and embedders register their own; this closed set is what the
//! `satellite` subcommand runs with.

pub mod fibonacci;

pub use fibonacci::Fibonacci;

use crate::satellite::capability::CapabilityCatalog;

/// Fully-qualified name of the Fibonacci capability.
pub const FIBONACCI: &str = "capabilities.fibonacci";

/// Catalog of all shipped capabilities.
pub fn default_catalog() -> CapabilityCatalog {
    CapabilityCatalog::new().register(FIBONACCI, || Fibonacci)
}
