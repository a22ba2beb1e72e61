pub mod builder;
pub mod definition;
pub mod edge;
pub mod entrypoints;
pub mod graph;
pub mod iterator;
pub mod node;
pub mod structure;
pub mod traversal;
pub mod validation;

pub use builder::{BuilderConfig, NodeInput, PortAddress, PortRef, WorkflowBuilder, WorkflowDraft};
pub use definition::WorkflowDefinition;
pub use edge::{Edge, EdgeEndpoint};
pub use entrypoints::Entrypoints;
pub use graph::WorkflowGraph;
pub use iterator::{ExecutionIterator, ExecutionStep};
pub use node::{Node, NodePorts};
pub use structure::{GraphStructure, StructureEdge, StructureNode};
pub use traversal::TraversalOrder;
pub use validation::ValidationReport;
