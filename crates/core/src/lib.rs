// Core data model for nodeflow workflow graphs

pub mod error;
pub mod registry;
pub mod types;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use error::*;
pub use registry::{NodeContract, NodeError, NodeHandler, NodeRegistryLookup};
pub use types::*;
pub use workflow::*;
