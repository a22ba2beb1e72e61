use crate::node_type::NodeType;
use nodeflow_core::{NodeContract, NodeHandler};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Human-facing description of a node type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    pub name: String,
    pub description: String,
}

impl NodeMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Everything the registry knows about one node type.
///
/// `inputs` and `outputs` map port names to a type label such as "string".
#[derive(Clone)]
pub struct NodeDefinition {
    pub node_type: NodeType,
    pub metadata: NodeMetadata,
    pub inputs: BTreeMap<String, String>,
    pub outputs: BTreeMap<String, String>,
    pub handler: Arc<dyn NodeHandler>,
}

impl NodeDefinition {
    pub fn new(node_type: NodeType, metadata: NodeMetadata, handler: Arc<dyn NodeHandler>) -> Self {
        Self {
            node_type,
            metadata,
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
            handler,
        }
    }

    pub fn input(mut self, name: impl Into<String>, label: impl Into<String>) -> Self {
        self.inputs.insert(name.into(), label.into());
        self
    }

    pub fn output(mut self, name: impl Into<String>, label: impl Into<String>) -> Self {
        self.outputs.insert(name.into(), label.into());
        self
    }

    /// The view handed to workflow definitions and iterators
    pub fn contract(&self) -> NodeContract {
        NodeContract {
            node_type: self.node_type.name().to_string(),
            version: self.node_type.version(),
            inputs: self.inputs.keys().cloned().collect(),
            outputs: self.outputs.keys().cloned().collect(),
            handler: self.handler.clone(),
        }
    }
}

impl fmt::Debug for NodeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeDefinition")
            .field("node_type", &self.node_type)
            .field("metadata", &self.metadata)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}
