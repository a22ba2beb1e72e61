// Node type registry for nodeflow

pub mod builtins;
pub mod definition;
pub mod error;
pub mod node_type;
pub mod registry;

pub use definition::{NodeDefinition, NodeMetadata};
pub use error::{RegistryError, RegistryResult};
pub use node_type::NodeType;
pub use registry::NodeRegistry;
