use super::edge::Edge;
use super::node::Node;
use crate::error::{EdgeSide, StructuralError};
use crate::types::{EdgeId, NodeId};
use std::collections::{HashMap, HashSet};

/// DFS colouring used by cycle detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Nodes and edges of a workflow.
///
/// Construction never fails; the integrity checks are separate calls so the
/// definition can run them in a fixed order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl WorkflowGraph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn find_node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == node_id)
    }

    pub fn has_node(&self, node_id: &NodeId) -> bool {
        self.nodes.iter().any(|n| n.id() == node_id)
    }

    pub fn find_edge(&self, edge_id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id() == edge_id)
    }

    /// Edges whose target is `node_id`, in insertion order
    pub fn incoming_edges(&self, node_id: &NodeId) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| &e.target().node_id == node_id)
            .collect()
    }

    /// Edges whose source is `node_id`, in insertion order
    pub fn outgoing_edges(&self, node_id: &NodeId) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| &e.source().node_id == node_id)
            .collect()
    }

    /// Ids held by more than one node, each reported once at its first repeat
    pub fn duplicate_node_ids(&self) -> Vec<StructuralError> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut errors = Vec::new();

        for node in &self.nodes {
            if !seen.insert(node.id()) && reported.insert(node.id()) {
                errors.push(StructuralError::DuplicateNodeId(node.id().clone()));
            }
        }

        errors
    }

    pub fn validate_unique_node_ids(&self) -> Result<(), StructuralError> {
        match self.duplicate_node_ids().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Nodes touched by no edge, in node order.
    ///
    /// A graph with a single node has nothing to connect it to, so it is
    /// never reported.
    pub fn orphaned_nodes(&self) -> Vec<StructuralError> {
        if self.nodes.len() <= 1 {
            return Vec::new();
        }

        let connected: HashSet<&NodeId> = self
            .edges
            .iter()
            .flat_map(|e| [&e.source().node_id, &e.target().node_id])
            .collect();

        self.nodes
            .iter()
            .filter(|n| !connected.contains(n.id()))
            .map(|n| StructuralError::OrphanedNode(n.id().clone()))
            .collect()
    }

    /// Every edge that names a node missing from the graph, in edge order
    pub fn dangling_edge_references(&self) -> Vec<StructuralError> {
        let mut errors = Vec::new();

        for edge in &self.edges {
            for (side, endpoint) in [(EdgeSide::Source, edge.source()), (EdgeSide::Target, edge.target())] {
                if !self.has_node(&endpoint.node_id) {
                    errors.push(StructuralError::DanglingEdgeReference {
                        edge_id: edge.id().clone(),
                        side,
                        node_id: endpoint.node_id.clone(),
                    });
                }
            }
        }

        errors
    }

    /// Fail on the first edge (in edge order) that references a missing node
    pub fn validate_edge_references(&self) -> Result<(), StructuralError> {
        match self.dangling_edge_references().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Three-colour depth-first search over the node graph.
    ///
    /// Iterative so deep chains cannot overflow the call stack. Every
    /// component is visited; a back edge to an in-progress node is a cycle.
    pub fn validate_acyclic(&self) -> Result<(), StructuralError> {
        let mut adjacency: HashMap<&NodeId, Vec<&NodeId>> =
            self.nodes.iter().map(|n| (n.id(), Vec::new())).collect();

        for edge in &self.edges {
            if let Some(targets) = adjacency.get_mut(&edge.source().node_id) {
                targets.push(&edge.target().node_id);
            }
        }

        let mut marks: HashMap<&NodeId, Mark> =
            self.nodes.iter().map(|n| (n.id(), Mark::Unvisited)).collect();

        for node in &self.nodes {
            if marks.get(node.id()) != Some(&Mark::Unvisited) {
                continue;
            }

            // (node, index of the next neighbour to explore)
            let mut stack: Vec<(&NodeId, usize)> = vec![(node.id(), 0)];
            marks.insert(node.id(), Mark::InProgress);

            while let Some(&(current, next)) = stack.last() {
                let neighbors = adjacency.get(current).map(Vec::as_slice).unwrap_or(&[]);

                let Some(&neighbor) = neighbors.get(next) else {
                    marks.insert(current, Mark::Done);
                    stack.pop();
                    continue;
                };

                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }

                match marks.get(neighbor).copied() {
                    Some(Mark::InProgress) => {
                        let start = stack
                            .iter()
                            .position(|(id, _)| *id == neighbor)
                            .unwrap_or(0);
                        let mut path: Vec<NodeId> =
                            stack[start..].iter().map(|(id, _)| (*id).clone()).collect();
                        path.push(neighbor.clone());

                        tracing::debug!("Cycle detected: {:?}", path);
                        return Err(StructuralError::CycleDetected { path });
                    }
                    Some(Mark::Unvisited) => {
                        marks.insert(neighbor, Mark::InProgress);
                        stack.push((neighbor, 0));
                    }
                    // Finished nodes, and targets outside the node set
                    _ => {}
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeConfig, NodeSpec};
    use crate::workflow::edge::EdgeEndpoint;

    fn node(id: &str) -> Node {
        Node::with_port_names(
            NodeId::new(id),
            NodeSpec::new("test.node", 1).unwrap(),
            NodeConfig::new(),
            ["in", "in2"],
            ["out"],
        )
        .unwrap()
    }

    fn connect(from: &Node, to: &Node) -> Edge {
        connect_ports(from, "out", to, "in")
    }

    fn connect_ports(from: &Node, out: &str, to: &Node, input: &str) -> Edge {
        Edge::new(
            EdgeId::generate(),
            EdgeEndpoint::new(
                from.id().clone(),
                from.output_port_named(out).unwrap().id().clone(),
            )
            .unwrap(),
            EdgeEndpoint::new(
                to.id().clone(),
                to.input_port_named(input).unwrap().id().clone(),
            )
            .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_and_edge_queries() {
        let (a, b, c) = (node("a"), node("b"), node("c"));
        let ab = connect(&a, &b);
        let ac = connect(&a, &c);
        let bc = connect_ports(&b, "out", &c, "in2");
        let graph = WorkflowGraph::new(
            vec![a.clone(), b.clone(), c.clone()],
            vec![ab.clone(), ac.clone(), bc.clone()],
        );

        assert!(graph.has_node(&NodeId::new("a")));
        assert!(!graph.has_node(&NodeId::new("z")));
        assert_eq!(graph.find_node(&NodeId::new("b")), Some(&b));
        assert_eq!(graph.find_edge(ab.id()), Some(&ab));

        let incoming: Vec<_> = graph.incoming_edges(c.id()).into_iter().cloned().collect();
        assert_eq!(incoming, vec![ac.clone(), bc]);

        let outgoing: Vec<_> = graph.outgoing_edges(a.id()).into_iter().cloned().collect();
        assert_eq!(outgoing, vec![ab, ac]);
    }

    #[test]
    fn test_dangling_source_and_target() {
        let (a, ghost) = (node("a"), node("ghost"));
        let to_ghost = connect(&a, &ghost);
        let from_ghost = connect(&ghost, &a);
        let graph = WorkflowGraph::new(vec![a], vec![to_ghost.clone(), from_ghost]);

        let err = graph.validate_edge_references().unwrap_err();
        assert_eq!(
            err,
            StructuralError::DanglingEdgeReference {
                edge_id: to_ghost.id().clone(),
                side: EdgeSide::Target,
                node_id: NodeId::new("ghost"),
            }
        );
        assert_eq!(graph.dangling_edge_references().len(), 2);
    }

    #[test]
    fn test_duplicate_ids_reported_once() {
        let graph = WorkflowGraph::new(
            vec![node("a"), node("b"), node("a"), node("a"), node("b")],
            vec![],
        );

        assert_eq!(
            graph.duplicate_node_ids(),
            vec![
                StructuralError::DuplicateNodeId(NodeId::new("a")),
                StructuralError::DuplicateNodeId(NodeId::new("b")),
            ]
        );
        assert_eq!(
            graph.validate_unique_node_ids(),
            Err(StructuralError::DuplicateNodeId(NodeId::new("a")))
        );
        assert!(WorkflowGraph::new(vec![node("a"), node("b")], vec![])
            .validate_unique_node_ids()
            .is_ok());
    }

    #[test]
    fn test_orphaned_nodes() {
        let (a, b, c) = (node("a"), node("b"), node("c"));
        let ab = connect(&a, &b);
        let graph = WorkflowGraph::new(vec![a.clone(), b, c], vec![ab]);
        assert_eq!(
            graph.orphaned_nodes(),
            vec![StructuralError::OrphanedNode(NodeId::new("c"))]
        );

        // A lone node is not an orphan
        assert!(WorkflowGraph::new(vec![a], vec![]).orphaned_nodes().is_empty());
    }

    #[test]
    fn test_dag_is_acyclic() {
        let (a, b, c, d) = (node("a"), node("b"), node("c"), node("d"));
        let edges = vec![
            connect(&a, &b),
            connect(&a, &c),
            connect(&b, &d),
            connect_ports(&c, "out", &d, "in2"),
        ];
        let graph = WorkflowGraph::new(vec![a, b, c, d], edges);
        assert!(graph.validate_acyclic().is_ok());
    }

    #[test]
    fn test_two_cycle_detected() {
        let (a, b) = (node("a"), node("b"));
        let edges = vec![connect(&a, &b), connect(&b, &a)];
        let graph = WorkflowGraph::new(vec![a, b], edges);

        let err = graph.validate_acyclic().unwrap_err();
        assert_eq!(
            err,
            StructuralError::CycleDetected {
                path: vec![NodeId::new("a"), NodeId::new("b"), NodeId::new("a")],
            }
        );
    }

    #[test]
    fn test_self_loop_via_distinct_ports_detected() {
        let a = node("a");
        let edges = vec![connect(&a, &a)];
        let graph = WorkflowGraph::new(vec![a], edges);

        assert!(matches!(
            graph.validate_acyclic(),
            Err(StructuralError::CycleDetected { .. })
        ));
    }

    #[test]
    fn test_cycle_in_second_component_detected() {
        let (a, b, x, y, z) = (node("a"), node("b"), node("x"), node("y"), node("z"));
        let edges = vec![
            connect(&a, &b),
            connect(&x, &y),
            connect(&y, &z),
            connect(&z, &x),
        ];
        let graph = WorkflowGraph::new(vec![a, b, x, y, z], edges);

        let Err(StructuralError::CycleDetected { path }) = graph.validate_acyclic() else {
            panic!("expected a cycle");
        };
        assert_eq!(path.first(), path.last());
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let nodes: Vec<Node> = (0..10_000).map(|i| node(&format!("n{i}"))).collect();
        let edges: Vec<Edge> = nodes.windows(2).map(|w| connect(&w[0], &w[1])).collect();
        let graph = WorkflowGraph::new(nodes, edges);
        assert!(graph.validate_acyclic().is_ok());
    }
}
