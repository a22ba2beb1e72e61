use crate::error::{PortDirection, ValueError};
use crate::types::{NodeConfig, NodeId, NodeSpec, Port, PortId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Input and output ports owned by a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePorts {
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
}

/// A vertex in the workflow graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NodeRecord")]
pub struct Node {
    id: NodeId,
    spec: NodeSpec,
    config: NodeConfig,
    ports: NodePorts,
}

#[derive(Deserialize)]
struct NodeRecord {
    id: NodeId,
    spec: NodeSpec,
    config: NodeConfig,
    ports: NodePorts,
}

impl TryFrom<NodeRecord> for Node {
    type Error = ValueError;

    fn try_from(record: NodeRecord) -> Result<Self, Self::Error> {
        Self::new(record.id, record.spec, record.config, record.ports)
    }
}

impl Node {
    pub fn new(
        id: NodeId,
        spec: NodeSpec,
        config: NodeConfig,
        ports: NodePorts,
    ) -> Result<Self, ValueError> {
        if id.as_str().trim().is_empty() {
            return Err(ValueError::Empty("node id"));
        }
        check_unique_names(&id, &ports.inputs, PortDirection::Input)?;
        check_unique_names(&id, &ports.outputs, PortDirection::Output)?;
        Ok(Self {
            id,
            spec,
            config,
            ports,
        })
    }

    /// Build a node whose ports get freshly generated ids
    pub fn with_port_names<I, O>(
        id: NodeId,
        spec: NodeSpec,
        config: NodeConfig,
        inputs: I,
        outputs: O,
    ) -> Result<Self, ValueError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        let inputs = inputs
            .into_iter()
            .map(Port::named)
            .collect::<Result<Vec<_>, _>>()?;
        let outputs = outputs
            .into_iter()
            .map(Port::named)
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(id, spec, config, NodePorts { inputs, outputs })
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn spec(&self) -> &NodeSpec {
        &self.spec
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn ports(&self) -> &NodePorts {
        &self.ports
    }

    pub fn inputs(&self) -> &[Port] {
        &self.ports.inputs
    }

    pub fn outputs(&self) -> &[Port] {
        &self.ports.outputs
    }

    pub fn has_input_port(&self, port_id: &PortId) -> bool {
        self.ports.inputs.iter().any(|p| p.id() == port_id)
    }

    pub fn has_output_port(&self, port_id: &PortId) -> bool {
        self.ports.outputs.iter().any(|p| p.id() == port_id)
    }

    pub fn input_port(&self, port_id: &PortId) -> Option<&Port> {
        self.ports.inputs.iter().find(|p| p.id() == port_id)
    }

    pub fn output_port(&self, port_id: &PortId) -> Option<&Port> {
        self.ports.outputs.iter().find(|p| p.id() == port_id)
    }

    /// Look a port up by id on either side
    pub fn find_port(&self, port_id: &PortId) -> Option<&Port> {
        self.input_port(port_id)
            .or_else(|| self.output_port(port_id))
    }

    /// Case-sensitive lookup of an input port by name
    pub fn input_port_named(&self, name: &str) -> Option<&Port> {
        self.ports.inputs.iter().find(|p| p.name() == name)
    }

    /// Case-sensitive lookup of an output port by name
    pub fn output_port_named(&self, name: &str) -> Option<&Port> {
        self.ports.outputs.iter().find(|p| p.name() == name)
    }
}

fn check_unique_names(
    node_id: &NodeId,
    ports: &[Port],
    direction: PortDirection,
) -> Result<(), ValueError> {
    let mut seen = HashSet::new();
    for port in ports {
        if !seen.insert(port.name()) {
            return Err(ValueError::DuplicatePortName {
                node_id: node_id.clone(),
                name: port.name().to_string(),
                direction,
            });
        }
    }
    Ok(())
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({}, {})", self.id, self.spec)
    }
}
