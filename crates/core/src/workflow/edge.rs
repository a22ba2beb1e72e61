use crate::error::ValueError;
use crate::types::{EdgeId, NodeId, PortId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A (node, port) pair used as an edge terminus
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "EndpointRecord")]
pub struct EdgeEndpoint {
    pub node_id: NodeId,
    pub port_id: PortId,
}

#[derive(Deserialize)]
struct EndpointRecord {
    node_id: NodeId,
    port_id: PortId,
}

impl TryFrom<EndpointRecord> for EdgeEndpoint {
    type Error = ValueError;

    fn try_from(record: EndpointRecord) -> Result<Self, Self::Error> {
        Self::new(record.node_id, record.port_id)
    }
}

impl EdgeEndpoint {
    pub fn new(node_id: NodeId, port_id: PortId) -> Result<Self, ValueError> {
        if node_id.as_str().trim().is_empty() {
            return Err(ValueError::Empty("endpoint node id"));
        }
        if port_id.as_str().trim().is_empty() {
            return Err(ValueError::Empty("endpoint port id"));
        }
        Ok(Self { node_id, port_id })
    }
}

impl fmt::Display for EdgeEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node_id, self.port_id)
    }
}

/// Directed connection from an output port to an input port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EdgeRecord")]
pub struct Edge {
    id: EdgeId,
    source: EdgeEndpoint,
    target: EdgeEndpoint,
}

#[derive(Deserialize)]
struct EdgeRecord {
    id: EdgeId,
    source: EdgeEndpoint,
    target: EdgeEndpoint,
}

impl TryFrom<EdgeRecord> for Edge {
    type Error = ValueError;

    fn try_from(record: EdgeRecord) -> Result<Self, Self::Error> {
        Self::new(record.id, record.source, record.target)
    }
}

impl Edge {
    pub fn new(id: EdgeId, source: EdgeEndpoint, target: EdgeEndpoint) -> Result<Self, ValueError> {
        if id.as_str().trim().is_empty() {
            return Err(ValueError::Empty("edge id"));
        }
        // Two ports of the same node are allowed here; acyclicity catches them later
        if source == target {
            return Err(ValueError::SelfLoop {
                node_id: source.node_id,
                port_id: source.port_id,
            });
        }
        Ok(Self { id, source, target })
    }

    pub fn id(&self) -> &EdgeId {
        &self.id
    }

    pub fn source(&self) -> &EdgeEndpoint {
        &self.source
    }

    pub fn target(&self) -> &EdgeEndpoint {
        &self.target
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({} -> {})", self.source, self.target)
    }
}
