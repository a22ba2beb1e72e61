// Contract between workflow definitions and the registry of node types

use crate::types::{NodeConfig, NodeSpec, PortValues};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Failure reported by a node while executing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    #[error("missing input: {0}")]
    MissingInput(String),

    #[error("invalid input '{name}': {reason}")]
    InvalidInput { name: String, reason: String },

    #[error("node execution failed: {0}")]
    Failed(String),
}

/// The executable unit of work behind a node type
#[async_trait]
pub trait NodeHandler: Send + Sync {
    async fn execute(&self, inputs: PortValues) -> Result<PortValues, NodeError>;
}

/// A resolved node type: its declared ports plus the handler that runs it
#[derive(Clone)]
pub struct NodeContract {
    pub node_type: String,
    pub version: u32,
    pub inputs: BTreeSet<String>,
    pub outputs: BTreeSet<String>,
    pub handler: Arc<dyn NodeHandler>,
}

impl fmt::Debug for NodeContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeContract")
            .field("node_type", &self.node_type)
            .field("version", &self.version)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

/// Read-only view of a node type registry
pub trait NodeRegistryLookup: Send + Sync {
    /// Resolve a node type and version to its contract
    fn lookup(&self, node_type: &str, version: u32) -> Option<NodeContract>;

    /// Check a node's spec and configuration, returning a message on rejection.
    ///
    /// The default only requires the type to resolve.
    fn validate(&self, spec: &NodeSpec, _config: &NodeConfig) -> Result<(), String> {
        match self.lookup(spec.node_type(), spec.version()) {
            Some(_) => Ok(()),
            None => Err(format!("node type not found: {}", spec)),
        }
    }
}

impl<T: NodeRegistryLookup + ?Sized> NodeRegistryLookup for Arc<T> {
    fn lookup(&self, node_type: &str, version: u32) -> Option<NodeContract> {
        (**self).lookup(node_type, version)
    }

    fn validate(&self, spec: &NodeSpec, config: &NodeConfig) -> Result<(), String> {
        (**self).validate(spec, config)
    }
}
