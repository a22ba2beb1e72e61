// Registry doubles shared by unit tests

use crate::registry::{NodeContract, NodeError, NodeHandler, NodeRegistryLookup};
use crate::types::PortValues;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Handler that produces no outputs
pub struct Noop;

#[async_trait]
impl NodeHandler for Noop {
    async fn execute(&self, _inputs: PortValues) -> Result<PortValues, NodeError> {
        Ok(PortValues::new())
    }
}

/// Resolves the listed types at version 1 to a no-op contract
pub struct KnownTypes(pub Vec<&'static str>);

impl NodeRegistryLookup for KnownTypes {
    fn lookup(&self, node_type: &str, version: u32) -> Option<NodeContract> {
        (version == 1 && self.0.contains(&node_type)).then(|| NodeContract {
            node_type: node_type.to_string(),
            version,
            inputs: BTreeSet::new(),
            outputs: BTreeSet::new(),
            handler: Arc::new(Noop),
        })
    }
}
