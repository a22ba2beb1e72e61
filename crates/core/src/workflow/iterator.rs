use super::definition::WorkflowDefinition;
use super::node::Node;
use crate::error::IterationError;
use crate::registry::{NodeError, NodeHandler, NodeRegistryLookup};
use crate::types::{NodeConfig, NodeId, PortValues};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// A node that is ready to run, with its inputs already gathered
#[derive(Clone)]
pub struct ExecutionStep {
    pub node_id: NodeId,
    pub node_type: String,
    pub node_version: u32,
    pub config: NodeConfig,
    pub inputs: PortValues,
    pub execute: Arc<dyn NodeHandler>,
}

impl ExecutionStep {
    /// Invoke the node's handler with the gathered inputs
    pub async fn run(&self) -> Result<PortValues, NodeError> {
        self.execute.execute(self.inputs.clone()).await
    }
}

impl fmt::Debug for ExecutionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionStep")
            .field("node_id", &self.node_id)
            .field("node_type", &self.node_type)
            .field("node_version", &self.node_version)
            .field("config", &self.config)
            .field("inputs", &self.inputs)
            .finish_non_exhaustive()
    }
}

/// Single-pass stepper over a definition.
///
/// The caller drives it with `get_next_step`, runs the step, then calls
/// `record_output` before asking for the next one. Each session owns its
/// own state, so several can run over the same definition.
pub struct ExecutionIterator<'a> {
    definition: &'a WorkflowDefinition,
    registry: Option<Arc<dyn NodeRegistryLookup>>,
    executed: HashSet<NodeId>,
    outputs: HashMap<NodeId, PortValues>,
}

impl<'a> ExecutionIterator<'a> {
    pub(crate) fn new(
        definition: &'a WorkflowDefinition,
        registry: Option<Arc<dyn NodeRegistryLookup>>,
    ) -> Self {
        Self {
            definition,
            registry,
            executed: HashSet::new(),
            outputs: HashMap::new(),
        }
    }

    /// Next ready node, or `None` once nothing else can become ready.
    ///
    /// The node is marked executed before its contract is resolved, so it is
    /// never offered twice even if the caller fails to run it.
    pub fn get_next_step(&mut self) -> Result<Option<ExecutionStep>, IterationError> {
        let Some(node) = self.find_next_ready_node() else {
            tracing::debug!(
                "No ready node left after {} executed node(s)",
                self.executed.len()
            );
            return Ok(None);
        };

        self.executed.insert(node.id().clone());

        let spec = node.spec();
        let contract = self
            .registry
            .as_ref()
            .and_then(|registry| registry.lookup(spec.node_type(), spec.version()))
            .ok_or_else(|| IterationError::UnknownNodeType {
                node_id: node.id().clone(),
                node_type: spec.node_type().to_string(),
                version: spec.version(),
            })?;

        let inputs = self.collect_inputs(node);

        tracing::debug!("Next step: node {} ({})", node.id(), spec);

        Ok(Some(ExecutionStep {
            node_id: node.id().clone(),
            node_type: spec.node_type().to_string(),
            node_version: spec.version(),
            config: node.config().clone(),
            inputs,
            execute: contract.handler,
        }))
    }

    /// Store (or replace) the outputs a node produced
    pub fn record_output(&mut self, node_id: NodeId, outputs: PortValues) {
        self.outputs.insert(node_id, outputs);
    }

    pub fn is_executed(&self, node_id: &NodeId) -> bool {
        self.executed.contains(node_id)
    }

    pub fn outputs_of(&self, node_id: &NodeId) -> Option<&PortValues> {
        self.outputs.get(node_id)
    }

    fn find_next_ready_node(&self) -> Option<&'a Node> {
        let definition = self.definition;

        // Only the first entrypoint in node order starts a traversal
        if self.executed.is_empty() {
            return definition
                .nodes()
                .iter()
                .find(|node| definition.is_entrypoint(node.id()));
        }

        definition.nodes().iter().find(|node| {
            if self.executed.contains(node.id()) {
                return false;
            }

            // Nodes without predecessors are only ever started as entrypoints
            let incoming = definition.incoming_edges(node.id());
            !incoming.is_empty()
                && incoming
                    .iter()
                    .all(|edge| self.executed.contains(&edge.source().node_id))
        })
    }

    /// Static config overlaid with upstream outputs, keyed by input port name.
    ///
    /// Missing outputs or ports are skipped; the node then only sees its config.
    fn collect_inputs(&self, node: &Node) -> PortValues {
        let mut inputs = node.config().clone();

        for edge in self.definition.incoming_edges(node.id()) {
            let source = edge.source();

            let Some(source_outputs) = self.outputs.get(&source.node_id) else {
                continue;
            };
            let Some(source_port) = self
                .definition
                .find_node(&source.node_id)
                .and_then(|n| n.output_port(&source.port_id))
            else {
                continue;
            };
            let Some(target_port) = node.input_port(&edge.target().port_id) else {
                continue;
            };

            if let Some(value) = source_outputs.get(source_port.name()) {
                inputs.insert(target_port.name().to_string(), value.clone());
            }
        }

        inputs
    }
}
