/// Errors raised while registering node types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid node type name: {0}. Expected format: namespace.action (e.g. \"console.log\")")]
    InvalidNodeType(String),

    #[error("invalid node type version for {name}: {version} (must be at least 1)")]
    InvalidVersion { name: String, version: u32 },

    #[error("node type {0} is already registered")]
    AlreadyRegistered(String),
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
