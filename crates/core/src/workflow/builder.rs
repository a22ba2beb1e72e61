use super::definition::{unknown_node_types, WorkflowDefinition};
use super::edge::{Edge, EdgeEndpoint};
use super::entrypoints::Entrypoints;
use super::graph::WorkflowGraph;
use super::node::Node;
use super::validation::ValidationReport;
use crate::error::{BuilderError, EdgeSide, PortDirection, StructuralError, ValueError};
use crate::registry::NodeRegistryLookup;
use crate::types::{EdgeId, NodeConfig, NodeId, NodeSpec, PortId, WorkflowMetadata};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Builder behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Check node types against the registry passed to `build`
    #[serde(default = "default_check_node_types")]
    pub check_node_types: bool,
}

fn default_check_node_types() -> bool {
    true
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            check_node_types: default_check_node_types(),
        }
    }
}

/// Description of a node to add: spec, config and port names
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInput {
    pub node_type: String,
    pub version: u32,
    pub config: NodeConfig,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

impl NodeInput {
    pub fn new(node_type: impl Into<String>, version: u32) -> Self {
        Self {
            node_type: node_type.into(),
            version,
            config: NodeConfig::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn config(mut self, config: NodeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set a single config entry
    pub fn set(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    pub fn input(mut self, name: impl Into<String>) -> Self {
        self.inputs.push(name.into());
        self
    }

    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.outputs.push(name.into());
        self
    }
}

/// A port given either by its name or its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortRef {
    Name(String),
    Id(PortId),
}

impl From<&str> for PortRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for PortRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<PortId> for PortRef {
    fn from(id: PortId) -> Self {
        Self::Id(id)
    }
}

/// One end of a connection requested from the builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortAddress {
    pub node_id: NodeId,
    pub port: PortRef,
}

impl PortAddress {
    pub fn new(node_id: NodeId, port: impl Into<PortRef>) -> Self {
        Self {
            node_id,
            port: port.into(),
        }
    }

    pub fn named(node_id: &NodeId, name: impl Into<String>) -> Self {
        Self::new(node_id.clone(), PortRef::Name(name.into()))
    }

    pub fn id(node_id: &NodeId, port_id: PortId) -> Self {
        Self::new(node_id.clone(), PortRef::Id(port_id))
    }
}

/// Mutable accumulator for a workflow; nothing is validated until `build`
#[derive(Debug, Clone)]
pub struct WorkflowBuilder {
    metadata: WorkflowMetadata,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    entrypoints: Vec<NodeId>,
    config: BuilderConfig,
}

impl WorkflowBuilder {
    /// Start a workflow stamped with the current time
    pub fn init(name: impl Into<String>, version: impl Into<String>) -> Result<Self, ValueError> {
        Ok(Self {
            metadata: WorkflowMetadata::now(name, version, None)?,
            nodes: Vec::new(),
            edges: Vec::new(),
            entrypoints: Vec::new(),
            config: BuilderConfig::default(),
        })
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.metadata = self.metadata.with_description(Some(description.into()));
        self
    }

    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn metadata(&self) -> &WorkflowMetadata {
        &self.metadata
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Add a node under a generated id; every named port gets a fresh id
    pub fn add_node(&mut self, input: NodeInput) -> Result<NodeId, BuilderError> {
        self.add_node_with_id(NodeId::generate(), input)
    }

    /// Add a node under a caller-chosen id
    pub fn add_node_with_id(
        &mut self,
        id: NodeId,
        input: NodeInput,
    ) -> Result<NodeId, BuilderError> {
        let spec = NodeSpec::new(input.node_type, input.version).map_err(BuilderError::InvalidSpec)?;

        if self.find_node(&id).is_some() {
            return Err(BuilderError::DuplicateNode(id));
        }

        let node = Node::with_port_names(id.clone(), spec, input.config, input.inputs, input.outputs)?;

        tracing::debug!("Added node {} ({})", node.id(), node.spec());
        self.nodes.push(node);

        Ok(id)
    }

    /// Connect an output port of `source` to an input port of `target`
    pub fn connect(
        &mut self,
        source: PortAddress,
        target: PortAddress,
    ) -> Result<EdgeId, BuilderError> {
        let source_node = self.find_node(&source.node_id).ok_or_else(|| BuilderError::NodeNotFound {
            side: EdgeSide::Source,
            node_id: source.node_id.clone(),
        })?;
        let target_node = self.find_node(&target.node_id).ok_or_else(|| BuilderError::NodeNotFound {
            side: EdgeSide::Target,
            node_id: target.node_id.clone(),
        })?;

        let source_port = resolve_port(source_node, &source.port, PortDirection::Output)?;
        let target_port = resolve_port(target_node, &target.port, PortDirection::Input)?;

        let edge = Edge::new(
            EdgeId::generate(),
            EdgeEndpoint::new(source.node_id, source_port)?,
            EdgeEndpoint::new(target.node_id, target_port)?,
        )?;
        let edge_id = edge.id().clone();

        tracing::debug!("Connected {} -> {}", edge.source(), edge.target());
        self.edges.push(edge);

        Ok(edge_id)
    }

    /// Replace the entrypoint list
    pub fn set_entrypoints(&mut self, ids: Vec<NodeId>) {
        self.entrypoints = ids;
    }

    /// Validate everything accumulated so far into a definition
    pub fn build(
        &self,
        registry: Option<Arc<dyn NodeRegistryLookup>>,
    ) -> Result<WorkflowDefinition, StructuralError> {
        WorkflowDefinition::create_with(
            self.metadata.clone(),
            self.nodes.clone(),
            self.edges.clone(),
            self.entrypoints.clone(),
            registry,
            self.config.check_node_types,
        )
    }

    /// Snapshot of the accumulated workflow, not validated
    pub fn draft(&self) -> WorkflowDraft {
        WorkflowDraft {
            metadata: self.metadata.clone(),
            graph: WorkflowGraph::new(self.nodes.clone(), self.edges.clone()),
            entrypoints: Entrypoints::new(self.entrypoints.clone()),
        }
    }

    fn find_node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == node_id)
    }
}

fn resolve_port(node: &Node, port: &PortRef, direction: PortDirection) -> Result<PortId, BuilderError> {
    let found = match (port, direction) {
        (PortRef::Name(name), PortDirection::Output) => node.output_port_named(name),
        (PortRef::Name(name), PortDirection::Input) => node.input_port_named(name),
        (PortRef::Id(id), PortDirection::Output) => node.output_port(id),
        (PortRef::Id(id), PortDirection::Input) => node.input_port(id),
    };

    found.map(|p| p.id().clone()).ok_or_else(|| BuilderError::PortNotFound {
        node_id: node.id().clone(),
        port: match port {
            PortRef::Name(name) => name.clone(),
            PortRef::Id(id) => id.to_string(),
        },
        direction,
    })
}

/// An unvalidated workflow, for reporting every problem at once
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowDraft {
    metadata: WorkflowMetadata,
    graph: WorkflowGraph,
    entrypoints: Entrypoints,
}

impl WorkflowDraft {
    /// Wrap parts assembled elsewhere, such as nodes read from JSON
    pub fn new(
        metadata: WorkflowMetadata,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        entrypoints: Vec<NodeId>,
    ) -> Self {
        Self {
            metadata,
            graph: WorkflowGraph::new(nodes, edges),
            entrypoints: Entrypoints::new(entrypoints),
        }
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

    /// Run every check and collect all failures, in check order
    pub fn validate(&self, registry: Option<&dyn NodeRegistryLookup>) -> ValidationReport {
        let mut report = ValidationReport::new();

        report.extend(self.graph.duplicate_node_ids());
        report.extend(self.graph.dangling_edge_references());
        report.extend(self.entrypoints.unknown_in(&self.graph));
        if let Err(err) = self.graph.validate_acyclic() {
            report.push(err);
        }
        report.extend(self.graph.orphaned_nodes());

        if let Some(registry) = registry {
            let unknown = unknown_node_types(self.graph.nodes(), registry);
            let unknown_ids: Vec<NodeId> = unknown
                .iter()
                .filter_map(|err| match err {
                    StructuralError::UnknownNodeType { node_id, .. } => Some(node_id.clone()),
                    _ => None,
                })
                .collect();
            report.extend(unknown);

            for node in self.graph.nodes() {
                if unknown_ids.contains(node.id()) {
                    continue;
                }
                if let Err(message) = registry.validate(node.spec(), node.config()) {
                    report.push(StructuralError::RegistryRejected {
                        node_id: node.id().clone(),
                        message,
                    });
                }
            }
        }

        tracing::debug!("Validated draft {}: {}", self.metadata, report);
        report
    }

    /// Validate in the definition's fixed order and produce it
    pub fn finalize(
        self,
        registry: Option<Arc<dyn NodeRegistryLookup>>,
    ) -> Result<WorkflowDefinition, StructuralError> {
        WorkflowDefinition::create(
            self.metadata,
            self.graph.nodes().to_vec(),
            self.graph.edges().to_vec(),
            self.entrypoints.ids().to_vec(),
            registry,
        )
    }
}
