//! Error types for workflow construction, validation and iteration.

use crate::types::{EdgeId, NodeId, PortId};
use std::fmt;

/// Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Which end of an edge an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeSide {
    Source,
    Target,
}

impl fmt::Display for EdgeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Target => write!(f, "target"),
        }
    }
}

/// Invalid value supplied when constructing an entity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// A required string was empty or blank.
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    /// Node versions start at 1.
    #[error("node version must be at least 1, got {0}")]
    InvalidVersion(u32),

    /// Both ends of an edge name the same node and port.
    #[error("edge cannot connect port {port_id} of node {node_id} to itself")]
    SelfLoop { node_id: NodeId, port_id: PortId },

    /// Port names are unique per side of a node.
    #[error("node {node_id} has more than one {direction} port named '{name}'")]
    DuplicatePortName {
        node_id: NodeId,
        name: String,
        direction: PortDirection,
    },
}

/// Violation of a graph-level invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    #[error("duplicate node id: {0}")]
    DuplicateNodeId(NodeId),

    #[error("edge {edge_id} references non-existent {side} node: {node_id}")]
    DanglingEdgeReference {
        edge_id: EdgeId,
        side: EdgeSide,
        node_id: NodeId,
    },

    #[error("entrypoint references non-existent node: {0}")]
    UnknownEntrypoint(NodeId),

    /// `path` starts and ends on the node that closes the cycle.
    #[error("cycle detected in workflow: {}", format_path(.path))]
    CycleDetected { path: Vec<NodeId> },

    #[error("node type not found: {node_type}@{version} (node {node_id})")]
    UnknownNodeType {
        node_id: NodeId,
        node_type: String,
        version: u32,
    },

    /// The registry rejected a node's configuration.
    #[error("node {node_id} failed registry validation: {message}")]
    RegistryRejected { node_id: NodeId, message: String },

    /// Only reported by draft validation; a definition may hold such nodes.
    #[error("node {0} has no connections")]
    OrphanedNode(NodeId),
}

fn format_path(path: &[NodeId]) -> String {
    path.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors raised while accumulating a workflow in the builder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuilderError {
    #[error("{side} node not found: {node_id}")]
    NodeNotFound { side: EdgeSide, node_id: NodeId },

    #[error("{direction} port '{port}' not found on node {node_id}")]
    PortNotFound {
        node_id: NodeId,
        port: String,
        direction: PortDirection,
    },

    #[error("node {0} already exists")]
    DuplicateNode(NodeId),

    #[error("invalid node spec: {0}")]
    InvalidSpec(ValueError),

    #[error(transparent)]
    InvalidValue(#[from] ValueError),
}

/// Direction a port is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Output => write!(f, "output"),
        }
    }
}

/// Errors raised while stepping through a definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IterationError {
    #[error("node type not found: {node_type}@{version} (node {node_id})")]
    UnknownNodeType {
        node_id: NodeId,
        node_type: String,
        version: u32,
    },
}

/// Top-level error for workflow operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("invalid value: {0}")]
    InvalidValue(#[from] ValueError),

    #[error("structural error: {0}")]
    Structural(#[from] StructuralError),

    #[error("builder error: {0}")]
    Builder(#[from] BuilderError),

    #[error("iteration error: {0}")]
    Iteration(#[from] IterationError),
}
