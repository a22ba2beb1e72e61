use crate::builtins;
use crate::definition::NodeDefinition;
use crate::error::{RegistryError, RegistryResult};
use nodeflow_core::{NodeConfig, NodeContract, NodeRegistryLookup, NodeSpec};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// In-memory registry of node types, keyed by `type@version`
#[derive(Debug, Default)]
pub struct NodeRegistry {
    definitions: RwLock<HashMap<String, NodeDefinition>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with `console.log@1` and `trigger.execution@1`
    pub fn with_builtins() -> RegistryResult<Self> {
        let registry = Self::new();
        for definition in builtins::all()? {
            registry.register(definition)?;
        }
        Ok(registry)
    }

    /// Register a node type
    pub fn register(&self, definition: NodeDefinition) -> RegistryResult<()> {
        let key = definition.node_type.key();
        let mut definitions = self.definitions.write().unwrap_or_else(PoisonError::into_inner);

        if definitions.contains_key(&key) {
            return Err(RegistryError::AlreadyRegistered(key));
        }

        tracing::debug!("Registered node type {}", key);
        definitions.insert(key, definition);
        Ok(())
    }

    /// Register several node types, stopping at the first failure
    pub fn register_many(
        &self,
        definitions: impl IntoIterator<Item = NodeDefinition>,
    ) -> RegistryResult<()> {
        for definition in definitions {
            self.register(definition)?;
        }
        Ok(())
    }

    /// Remove a node type, returning whether it was registered
    pub fn unregister(&self, name: &str, version: u32) -> bool {
        self.definitions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key(name, version))
            .is_some()
    }

    pub fn get(&self, name: &str, version: u32) -> Option<NodeDefinition> {
        self.definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key(name, version))
            .cloned()
    }

    pub fn contains(&self, name: &str, version: u32) -> bool {
        self.definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&key(name, version))
    }

    /// Registered `type@version` keys, sorted
    pub fn list_node_types(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.definitions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn key(name: &str, version: u32) -> String {
    format!("{}@{}", name, version)
}

impl NodeRegistryLookup for NodeRegistry {
    fn lookup(&self, node_type: &str, version: u32) -> Option<NodeContract> {
        self.get(node_type, version).map(|definition| definition.contract())
    }

    /// Config keys must name declared inputs
    fn validate(&self, spec: &NodeSpec, config: &NodeConfig) -> Result<(), String> {
        let definition = self
            .get(spec.node_type(), spec.version())
            .ok_or_else(|| format!("unknown node type: {}", spec))?;

        let unknown: Vec<&str> = config
            .keys()
            .filter(|name| !definition.inputs.contains_key(*name))
            .map(String::as_str)
            .collect();

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(format!("unknown parameter(s) for {}: {}", spec, unknown.join(", ")))
        }
    }
}
