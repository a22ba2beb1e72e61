use super::edge::Edge;
use super::entrypoints::Entrypoints;
use super::graph::WorkflowGraph;
use super::iterator::ExecutionIterator;
use super::node::Node;
use super::structure::{GraphStructure, StructureEdge, StructureNode};
use crate::error::StructuralError;
use crate::registry::NodeRegistryLookup;
use crate::types::{EdgeId, NodeId, WorkflowMetadata};
use std::fmt;
use std::sync::Arc;

/// Nodes whose spec does not resolve in `registry`, in node order
pub(crate) fn unknown_node_types(
    nodes: &[Node],
    registry: &dyn NodeRegistryLookup,
) -> Vec<StructuralError> {
    nodes
        .iter()
        .filter(|node| {
            registry
                .lookup(node.spec().node_type(), node.spec().version())
                .is_none()
        })
        .map(|node| StructuralError::UnknownNodeType {
            node_id: node.id().clone(),
            node_type: node.spec().node_type().to_string(),
            version: node.spec().version(),
        })
        .collect()
}

/// A validated, immutable workflow.
///
/// Either every invariant holds or no instance exists: edges reference
/// known nodes, entrypoints reference known nodes, the node graph is
/// acyclic and (when a registry was supplied) every node type resolves.
#[derive(Clone)]
pub struct WorkflowDefinition {
    metadata: WorkflowMetadata,
    graph: WorkflowGraph,
    entrypoints: Entrypoints,
    registry: Option<Arc<dyn NodeRegistryLookup>>,
}

impl WorkflowDefinition {
    /// Validate and assemble a definition.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// edge references, entrypoints, acyclicity, node types.
    pub fn create(
        metadata: WorkflowMetadata,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        entrypoints: Vec<NodeId>,
        registry: Option<Arc<dyn NodeRegistryLookup>>,
    ) -> Result<Self, StructuralError> {
        Self::create_with(metadata, nodes, edges, entrypoints, registry, true)
    }

    /// Like [`create`](Self::create), but node types are only checked when
    /// `check_node_types` is set. The registry is kept for iteration either way.
    pub fn create_with(
        metadata: WorkflowMetadata,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        entrypoints: Vec<NodeId>,
        registry: Option<Arc<dyn NodeRegistryLookup>>,
        check_node_types: bool,
    ) -> Result<Self, StructuralError> {
        let graph = WorkflowGraph::new(nodes, edges);
        let entrypoints = Entrypoints::new(entrypoints);

        graph.validate_unique_node_ids()?;
        graph.validate_edge_references()?;
        entrypoints.validate_against_graph(&graph)?;
        graph.validate_acyclic()?;

        if check_node_types {
            if let Some(registry) = registry.as_deref() {
                if let Some(err) = unknown_node_types(graph.nodes(), registry).into_iter().next() {
                    return Err(err);
                }
            }
        }

        tracing::info!(
            "Created workflow definition {}: {} nodes, {} edges, {} entrypoints",
            metadata,
            graph.nodes().len(),
            graph.edges().len(),
            entrypoints.ids().len()
        );

        Ok(Self {
            metadata,
            graph,
            entrypoints,
            registry,
        })
    }

    pub fn metadata(&self) -> &WorkflowMetadata {
        &self.metadata
    }

    pub fn nodes(&self) -> &[Node] {
        self.graph.nodes()
    }

    pub fn edges(&self) -> &[Edge] {
        self.graph.edges()
    }

    pub fn entrypoints(&self) -> &[NodeId] {
        self.entrypoints.ids()
    }

    pub fn find_node(&self, node_id: &NodeId) -> Option<&Node> {
        self.graph.find_node(node_id)
    }

    pub fn has_node(&self, node_id: &NodeId) -> bool {
        self.graph.has_node(node_id)
    }

    pub fn find_edge(&self, edge_id: &EdgeId) -> Option<&Edge> {
        self.graph.find_edge(edge_id)
    }

    pub fn incoming_edges(&self, node_id: &NodeId) -> Vec<&Edge> {
        self.graph.incoming_edges(node_id)
    }

    pub fn outgoing_edges(&self, node_id: &NodeId) -> Vec<&Edge> {
        self.graph.outgoing_edges(node_id)
    }

    pub fn is_entrypoint(&self, node_id: &NodeId) -> bool {
        self.entrypoints.is_entrypoint(node_id)
    }

    /// Registry retained from construction, used when iterating
    pub fn registry(&self) -> Option<&Arc<dyn NodeRegistryLookup>> {
        self.registry.as_ref()
    }

    /// Fresh snapshot of the topology
    pub fn graph_structure(&self) -> GraphStructure {
        GraphStructure {
            nodes: self
                .nodes()
                .iter()
                .map(|node| StructureNode {
                    id: node.id().to_string(),
                    node_type: node.spec().node_type().to_string(),
                })
                .collect(),
            edges: self
                .edges()
                .iter()
                .map(|edge| StructureEdge {
                    from: edge.source().node_id.to_string(),
                    to: edge.target().node_id.to_string(),
                })
                .collect(),
            entrypoints: self.entrypoints().iter().map(|id| id.to_string()).collect(),
        }
    }

    /// Start an independent stepping session against the retained registry
    pub fn create_iterator(&self) -> ExecutionIterator<'_> {
        ExecutionIterator::new(self, self.registry.clone())
    }

    /// Start a stepping session that resolves node types in `registry`
    pub fn create_iterator_with(
        &self,
        registry: Arc<dyn NodeRegistryLookup>,
    ) -> ExecutionIterator<'_> {
        ExecutionIterator::new(self, Some(registry))
    }
}

impl fmt::Debug for WorkflowDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowDefinition")
            .field("metadata", &self.metadata)
            .field("graph", &self.graph)
            .field("entrypoints", &self.entrypoints)
            .field("has_registry", &self.registry.is_some())
            .finish()
    }
}

impl fmt::Display for WorkflowDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WorkflowDefinition({}, {} nodes, {} edges)",
            self.metadata,
            self.nodes().len(),
            self.edges().len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EdgeSide;
    use crate::testing::KnownTypes;
    use crate::types::{NodeConfig, NodeSpec};
    use crate::workflow::edge::EdgeEndpoint;

    fn metadata() -> WorkflowMetadata {
        WorkflowMetadata::now("test", "1.0", None).unwrap()
    }

    fn node(id: &str, node_type: &str) -> Node {
        Node::with_port_names(
            NodeId::new(id),
            NodeSpec::new(node_type, 1).unwrap(),
            NodeConfig::new(),
            ["in"],
            ["out"],
        )
        .unwrap()
    }

    fn edge(from: &Node, to: &Node) -> Edge {
        Edge::new(
            EdgeId::generate(),
            EdgeEndpoint::new(from.id().clone(), from.outputs()[0].id().clone()).unwrap(),
            EdgeEndpoint::new(to.id().clone(), to.inputs()[0].id().clone()).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_definition() {
        let definition =
            WorkflowDefinition::create(metadata(), vec![], vec![], vec![], None).unwrap();

        assert!(definition.nodes().is_empty());
        assert!(definition.edges().is_empty());
        assert!(definition.entrypoints().is_empty());
        assert_eq!(definition.graph_structure(), GraphStructure::default());
    }

    #[test]
    fn test_dangling_edge_wins_over_other_failures() {
        let (a, b, ghost) = (node("a", "test.a"), node("b", "test.b"), node("ghost", "test.g"));
        // Cycle a <-> b, an unknown entrypoint and a dangling edge all at once
        let edges = vec![edge(&a, &b), edge(&b, &a), edge(&a, &ghost)];

        let err = WorkflowDefinition::create(
            metadata(),
            vec![a, b],
            edges,
            vec![NodeId::new("nowhere")],
            Some(Arc::new(KnownTypes(vec![]))),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            StructuralError::DanglingEdgeReference {
                side: EdgeSide::Target,
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_node_id_checked_first() {
        let (a, b, ghost) = (node("a", "test.a"), node("b", "test.b"), node("ghost", "test.g"));
        let twin = node("a", "test.other");
        let edges = vec![edge(&a, &b), edge(&b, &a), edge(&a, &ghost)];

        let err = WorkflowDefinition::create(
            metadata(),
            vec![a, b, twin],
            edges,
            vec![NodeId::new("nowhere")],
            Some(Arc::new(KnownTypes(vec![]))),
        )
        .unwrap_err();

        assert_eq!(err, StructuralError::DuplicateNodeId(NodeId::new("a")));
    }

    #[test]
    fn test_duplicate_node_id_rejected() {
        let (a, twin) = (node("a", "test.a"), node("a", "test.a"));
        let err = WorkflowDefinition::create(metadata(), vec![a, twin], vec![], vec![], None)
            .unwrap_err();
        assert_eq!(err, StructuralError::DuplicateNodeId(NodeId::new("a")));
    }

    #[test]
    fn test_entrypoint_checked_before_cycle() {
        let (a, b) = (node("a", "test.a"), node("b", "test.b"));
        let edges = vec![edge(&a, &b), edge(&b, &a)];

        let err = WorkflowDefinition::create(
            metadata(),
            vec![a, b],
            edges,
            vec![NodeId::new("nowhere")],
            None,
        )
        .unwrap_err();

        assert_eq!(err, StructuralError::UnknownEntrypoint(NodeId::new("nowhere")));
    }

    #[test]
    fn test_cycle_checked_before_node_types() {
        let (a, b) = (node("a", "test.a"), node("b", "test.b"));
        let edges = vec![edge(&a, &b), edge(&b, &a)];

        let err = WorkflowDefinition::create(
            metadata(),
            vec![a, b],
            edges,
            vec![NodeId::new("a")],
            Some(Arc::new(KnownTypes(vec![]))),
        )
        .unwrap_err();

        assert!(matches!(err, StructuralError::CycleDetected { .. }));
    }

    #[test]
    fn test_unknown_node_type_named() {
        let nodes = vec![node("a", "test.a"), node("b", "test.missing")];

        let err = WorkflowDefinition::create(
            metadata(),
            nodes,
            vec![],
            vec![],
            Some(Arc::new(KnownTypes(vec!["test.a"]))),
        )
        .unwrap_err();

        assert_eq!(
            err,
            StructuralError::UnknownNodeType {
                node_id: NodeId::new("b"),
                node_type: "test.missing".to_string(),
                version: 1,
            }
        );
    }

    #[test]
    fn test_node_type_check_can_be_skipped() {
        let nodes = vec![node("a", "test.missing")];
        let registry: Arc<dyn NodeRegistryLookup> = Arc::new(KnownTypes(vec![]));

        let definition = WorkflowDefinition::create_with(
            metadata(),
            nodes,
            vec![],
            vec![],
            Some(registry),
            false,
        )
        .unwrap();

        assert!(definition.registry().is_some());
    }

    #[test]
    fn test_accessors_and_structure() {
        let (a, b, c) = (node("a", "test.a"), node("b", "test.b"), node("c", "test.c"));
        let ab = edge(&a, &b);
        let bc = edge(&b, &c);

        let definition = WorkflowDefinition::create(
            metadata(),
            vec![a.clone(), b.clone(), c.clone()],
            vec![ab.clone(), bc.clone()],
            vec![a.id().clone()],
            Some(Arc::new(KnownTypes(vec!["test.a", "test.b", "test.c"]))),
        )
        .unwrap();

        assert_eq!(definition.find_node(b.id()), Some(&b));
        assert_eq!(definition.find_edge(bc.id()), Some(&bc));
        assert_eq!(definition.incoming_edges(b.id()), vec![&ab]);
        assert_eq!(definition.outgoing_edges(b.id()), vec![&bc]);
        assert!(definition.is_entrypoint(a.id()));
        assert!(!definition.is_entrypoint(b.id()));

        let structure = definition.graph_structure();
        assert_eq!(structure.nodes.len(), 3);
        assert!(structure.has_edge("a", "b"));
        assert!(structure.has_edge("b", "c"));
        assert!(!structure.has_edge("a", "c"));
        assert_eq!(structure.entrypoints, vec!["a".to_string()]);
        assert_eq!(structure.node_type("c"), Some("test.c"));

        assert_eq!(
            definition.to_string(),
            "WorkflowDefinition(test v1.0, 3 nodes, 2 edges)"
        );
    }
}
