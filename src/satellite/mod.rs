//! Satellite worker nodes.
//!
//! A satellite registers itself with the dispatcher, then serves forwarded
//! job requests: resolve the named capability (cache first, source on a
//! miss), execute it, reply with the result.
//!
//! # Components
//!
//! - [`Capability`] / [`CapabilitySource`]: the unit of computation and
//!   where its implementation comes from
//! - [`CapabilityCache`]: per-process load-once memory of resolved
//!   capabilities
//! - [`Satellite`]: the accept-and-execute loop

pub mod cache;
pub mod capability;
pub mod node;

pub use cache::CapabilityCache;
pub use capability::{Capability, CapabilityCatalog, CapabilitySource};
pub use node::Satellite;
