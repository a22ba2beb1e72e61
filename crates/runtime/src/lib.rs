// Async execution of nodeflow workflow definitions

pub mod config;
pub mod error;
pub mod events;
pub mod executor;

pub use config::{ExecutorConfig, RuntimeConfig};
pub use error::ExecutionError;
pub use events::{EventKind, EventLog, ExecutionEvent, MemoryEventLog, RunId};
pub use executor::{ExecutionResult, ExecutionStatus, WorkflowExecutor};
