use crate::error::{RegistryError, RegistryResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z]+\.[a-z]+$").expect("node type pattern is valid"))
}

/// A registered node type: `namespace.action` name plus version
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeType {
    name: String,
    version: u32,
}

impl NodeType {
    pub fn new(name: impl Into<String>, version: u32) -> RegistryResult<Self> {
        let name = name.into();
        if !name_pattern().is_match(&name) {
            return Err(RegistryError::InvalidNodeType(name));
        }
        if version < 1 {
            return Err(RegistryError::InvalidVersion { name, version });
        }
        Ok(Self { name, version })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn namespace(&self) -> &str {
        self.name.split('.').next().unwrap_or_default()
    }

    pub fn action(&self) -> &str {
        self.name.split('.').nth(1).unwrap_or_default()
    }

    /// Registry key, `name@version`
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}
