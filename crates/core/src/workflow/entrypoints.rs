use super::graph::WorkflowGraph;
use crate::error::StructuralError;
use crate::types::NodeId;
use serde::{Deserialize, Serialize};

/// Node ids designated as starting points.
///
/// Stored positionally and not deduplicated; order only matters for
/// diagnostics and iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entrypoints(Vec<NodeId>);

impl Entrypoints {
    pub fn new(ids: Vec<NodeId>) -> Self {
        Self(ids)
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.0
    }

    pub fn is_entrypoint(&self, node_id: &NodeId) -> bool {
        self.0.contains(node_id)
    }

    /// Every entrypoint that does not name a node in `graph`
    pub fn unknown_in(&self, graph: &WorkflowGraph) -> Vec<StructuralError> {
        self.0
            .iter()
            .filter(|id| !graph.has_node(id))
            .map(|id| StructuralError::UnknownEntrypoint(id.clone()))
            .collect()
    }

    pub fn validate_against_graph(&self, graph: &WorkflowGraph) -> Result<(), StructuralError> {
        match self.unknown_in(graph).into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeConfig, NodeSpec};
    use crate::workflow::node::Node;

    fn graph_with(ids: &[&str]) -> WorkflowGraph {
        let nodes = ids
            .iter()
            .map(|id| {
                Node::with_port_names(
                    NodeId::new(*id),
                    NodeSpec::new("test.node", 1).unwrap(),
                    NodeConfig::new(),
                    Vec::<String>::new(),
                    Vec::<String>::new(),
                )
                .unwrap()
            })
            .collect();
        WorkflowGraph::new(nodes, vec![])
    }

    #[test]
    fn test_membership() {
        let entrypoints = Entrypoints::new(vec![NodeId::new("a"), NodeId::new("a")]);
        assert!(entrypoints.is_entrypoint(&NodeId::new("a")));
        assert!(!entrypoints.is_entrypoint(&NodeId::new("b")));
        assert_eq!(entrypoints.ids().len(), 2);
    }

    #[test]
    fn test_every_entry_is_checked() {
        let graph = graph_with(&["a", "b"]);
        let entrypoints = Entrypoints::new(vec![
            NodeId::new("a"),
            NodeId::new("b"),
            NodeId::new("missing"),
        ]);

        assert_eq!(
            entrypoints.validate_against_graph(&graph),
            Err(StructuralError::UnknownEntrypoint(NodeId::new("missing")))
        );
    }

    #[test]
    fn test_empty_is_valid() {
        let graph = graph_with(&[]);
        assert!(Entrypoints::default().validate_against_graph(&graph).is_ok());
    }
}
