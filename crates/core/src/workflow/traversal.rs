use super::definition::WorkflowDefinition;
use crate::types::NodeId;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, Dfs, Topo};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Order in which `walk` visits reachable nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalOrder {
    DepthFirst,
    BreadthFirst,
}

/// Node-level projection of a definition onto a petgraph graph
struct NodeDag {
    graph: DiGraph<NodeId, ()>,
    indices: HashMap<NodeId, NodeIndex>,
}

impl NodeDag {
    fn from_definition(definition: &WorkflowDefinition) -> Self {
        let mut graph = DiGraph::new();
        let mut indices = HashMap::new();

        for node in definition.nodes() {
            let index = graph.add_node(node.id().clone());
            indices.insert(node.id().clone(), index);
        }

        // Parallel edges between the same pair collapse into one
        for edge in definition.edges() {
            let source = indices.get(&edge.source().node_id);
            let target = indices.get(&edge.target().node_id);
            if let (Some(&source), Some(&target)) = (source, target) {
                graph.update_edge(source, target, ());
            }
        }

        Self { graph, indices }
    }

    fn ids_where(&self, direction: Direction) -> Vec<NodeId> {
        self.graph
            .node_indices()
            .filter(|&n| self.graph.neighbors_directed(n, direction).next().is_none())
            .map(|n| self.graph[n].clone())
            .collect()
    }
}

impl WorkflowDefinition {
    /// Every node, predecessors before successors
    pub fn topological_order(&self) -> Vec<NodeId> {
        let dag = NodeDag::from_definition(self);
        let mut topo = Topo::new(&dag.graph);
        let mut order = Vec::with_capacity(dag.graph.node_count());

        while let Some(index) = topo.next(&dag.graph) {
            order.push(dag.graph[index].clone());
        }

        order
    }

    /// Nodes without incoming edges, in node order
    pub fn root_nodes(&self) -> Vec<NodeId> {
        NodeDag::from_definition(self).ids_where(Direction::Incoming)
    }

    /// Nodes without outgoing edges, in node order
    pub fn leaf_nodes(&self) -> Vec<NodeId> {
        NodeDag::from_definition(self).ids_where(Direction::Outgoing)
    }

    /// Every node reachable from `node_id`, excluding itself
    pub fn descendants(&self, node_id: &NodeId) -> Vec<NodeId> {
        self.walk(node_id, TraversalOrder::DepthFirst)
            .into_iter()
            .skip(1)
            .collect()
    }

    /// Nodes reachable from `start`, beginning with `start` itself.
    ///
    /// Empty when `start` is not part of the definition.
    pub fn walk(&self, start: &NodeId, order: TraversalOrder) -> Vec<NodeId> {
        let dag = NodeDag::from_definition(self);
        let Some(&start) = dag.indices.get(start) else {
            return Vec::new();
        };

        let mut visited = Vec::new();
        match order {
            TraversalOrder::DepthFirst => {
                let mut dfs = Dfs::new(&dag.graph, start);
                while let Some(index) = dfs.next(&dag.graph) {
                    visited.push(dag.graph[index].clone());
                }
            }
            TraversalOrder::BreadthFirst => {
                let mut bfs = Bfs::new(&dag.graph, start);
                while let Some(index) = bfs.next(&dag.graph) {
                    visited.push(dag.graph[index].clone());
                }
            }
        }

        visited
    }
}
