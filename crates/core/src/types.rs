use crate::error::ValueError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Static configuration handed to a node, and the shape of the values
/// flowing between ports
pub type NodeConfig = serde_json::Map<String, serde_json::Value>;

/// Named values produced by or handed to a node, keyed by port name
pub type PortValues = serde_json::Map<String, serde_json::Value>;

fn require_non_empty(value: &str, what: &'static str) -> Result<(), ValueError> {
    if value.trim().is_empty() {
        return Err(ValueError::Empty(what));
    }
    Ok(())
}

/// Unique identifier for a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an externally supplied identifier, rejecting blank strings
    pub fn parse(id: impl Into<String>) -> Result<Self, ValueError> {
        let id = id.into();
        require_non_empty(&id, "node id")?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a port
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortId(pub String);

impl PortId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn parse(id: impl Into<String>) -> Result<Self, ValueError> {
        let id = id.into();
        require_non_empty(&id, "port id")?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub String);

impl EdgeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn parse(id: impl Into<String>) -> Result<Self, ValueError> {
        let id = id.into();
        require_non_empty(&id, "edge id")?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named connection point on a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PortRecord")]
pub struct Port {
    id: PortId,
    name: String,
}

#[derive(Deserialize)]
struct PortRecord {
    id: PortId,
    name: String,
}

impl TryFrom<PortRecord> for Port {
    type Error = ValueError;

    fn try_from(record: PortRecord) -> Result<Self, Self::Error> {
        Self::new(record.id, record.name)
    }
}

impl Port {
    pub fn new(id: PortId, name: impl Into<String>) -> Result<Self, ValueError> {
        let name = name.into();
        require_non_empty(id.as_str(), "port id")?;
        require_non_empty(&name, "port name")?;
        Ok(Self { id, name })
    }

    /// Create a port with a freshly generated id
    pub fn named(name: impl Into<String>) -> Result<Self, ValueError> {
        Self::new(PortId::generate(), name)
    }

    pub fn id(&self) -> &PortId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Port({})", self.name)
    }
}

/// Reference to an externally registered node type and version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "NodeSpecRecord")]
pub struct NodeSpec {
    #[serde(rename = "type")]
    node_type: String,
    version: u32,
}

#[derive(Deserialize)]
struct NodeSpecRecord {
    #[serde(rename = "type")]
    node_type: String,
    version: u32,
}

impl TryFrom<NodeSpecRecord> for NodeSpec {
    type Error = ValueError;

    fn try_from(record: NodeSpecRecord) -> Result<Self, Self::Error> {
        Self::new(record.node_type, record.version)
    }
}

impl NodeSpec {
    pub fn new(node_type: impl Into<String>, version: u32) -> Result<Self, ValueError> {
        let node_type = node_type.into();
        require_non_empty(&node_type, "node type")?;
        if version < 1 {
            return Err(ValueError::InvalidVersion(version));
        }
        Ok(Self { node_type, version })
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn version(&self) -> u32 {
        self.version
    }
}

impl fmt::Display for NodeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.node_type, self.version)
    }
}

/// Descriptive data attached to a workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MetadataRecord")]
pub struct WorkflowMetadata {
    name: String,
    version: String,
    created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

#[derive(Deserialize)]
struct MetadataRecord {
    name: String,
    version: String,
    created_at: String,
    #[serde(default)]
    description: Option<String>,
}

impl TryFrom<MetadataRecord> for WorkflowMetadata {
    type Error = ValueError;

    fn try_from(record: MetadataRecord) -> Result<Self, Self::Error> {
        Self::new(record.name, record.version, record.created_at, record.description)
    }
}

impl WorkflowMetadata {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        created_at: impl Into<String>,
        description: Option<String>,
    ) -> Result<Self, ValueError> {
        let name = name.into();
        let version = version.into();
        let created_at = created_at.into();

        require_non_empty(&name, "workflow name")?;
        require_non_empty(&version, "workflow version")?;
        require_non_empty(&created_at, "workflow creation timestamp")?;

        Ok(Self {
            name,
            version,
            created_at,
            description,
        })
    }

    /// Metadata stamped with the current time
    pub fn now(
        name: impl Into<String>,
        version: impl Into<String>,
        description: Option<String>,
    ) -> Result<Self, ValueError> {
        Self::new(name, version, Utc::now().to_rfc3339(), description)
    }

    /// Copy of this metadata with a different description
    pub fn with_description(&self, description: Option<String>) -> Self {
        Self {
            description,
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl fmt::Display for WorkflowMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}
