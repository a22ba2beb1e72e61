use nodeflow_core::{IterationError, NodeError, NodeId};

/// Why a run stopped before the iterator was exhausted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Iteration(#[from] IterationError),

    #[error("node {node_id} failed: {source}")]
    Node { node_id: NodeId, source: NodeError },

    #[error("node {node_id} timed out after {timeout_secs} seconds")]
    Timeout { node_id: NodeId, timeout_secs: u64 },
}
