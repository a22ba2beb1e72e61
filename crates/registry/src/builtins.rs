// Node types that ship with every registry created by `with_builtins`

use crate::definition::{NodeDefinition, NodeMetadata};
use crate::error::RegistryResult;
use crate::node_type::NodeType;
use async_trait::async_trait;
use chrono::Utc;
use nodeflow_core::{NodeError, NodeHandler, PortValues};
use serde_json::Value;
use std::sync::Arc;

/// Logs its `message` input and echoes it on `logged`
pub struct ConsoleLogger;

#[async_trait]
impl NodeHandler for ConsoleLogger {
    async fn execute(&self, inputs: PortValues) -> Result<PortValues, NodeError> {
        let message = match inputs.get("message") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        tracing::info!("{}", message);

        let mut outputs = PortValues::new();
        outputs.insert("logged".to_string(), Value::String(message));
        Ok(outputs)
    }
}

/// Starts a run, reporting the start time in epoch milliseconds
pub struct TriggerExecution;

#[async_trait]
impl NodeHandler for TriggerExecution {
    async fn execute(&self, _inputs: PortValues) -> Result<PortValues, NodeError> {
        let mut outputs = PortValues::new();
        outputs.insert(
            "executionStarted".to_string(),
            Value::String(Utc::now().timestamp_millis().to_string()),
        );
        Ok(outputs)
    }
}

pub fn console_logger() -> RegistryResult<NodeDefinition> {
    Ok(NodeDefinition::new(
        NodeType::new("console.log", 1)?,
        NodeMetadata::new("Console Logger", "Logs messages to the console"),
        Arc::new(ConsoleLogger),
    )
    .input("message", "string")
    .output("logged", "string"))
}

pub fn trigger_execution() -> RegistryResult<NodeDefinition> {
    Ok(NodeDefinition::new(
        NodeType::new("trigger.execution", 1)?,
        NodeMetadata::new("Execution Trigger", "Manually initiates workflow execution"),
        Arc::new(TriggerExecution),
    )
    .output("executionStarted", "number"))
}

/// Every built-in node definition
pub fn all() -> RegistryResult<Vec<NodeDefinition>> {
    Ok(vec![console_logger()?, trigger_execution()?])
}
