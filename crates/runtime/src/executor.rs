use crate::config::ExecutorConfig;
use crate::error::ExecutionError;
use crate::events::{EventKind, EventLog, ExecutionEvent, RunId};
use anyhow::Result;
use nodeflow_core::{ExecutionStep, NodeId, NodeRegistryLookup, PortValues, WorkflowDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Completed,
    Failed,
}

/// Outcome of one run
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub run_id: RunId,
    pub status: ExecutionStatus,
    /// Outputs of the last node that ran; absent when the run failed
    pub outputs: Option<PortValues>,
    /// Nodes handed out by the iterator, in order
    pub executed: Vec<NodeId>,
    pub error: Option<ExecutionError>,
}

impl ExecutionResult {
    pub fn is_completed(&self) -> bool {
        self.status == ExecutionStatus::Completed
    }
}

/// Drives a definition's execution iterator to completion
pub struct WorkflowExecutor {
    config: ExecutorConfig,
    registry: Option<Arc<dyn NodeRegistryLookup>>,
    event_log: Option<Arc<dyn EventLog>>,
}

impl WorkflowExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            config,
            registry: None,
            event_log: None,
        }
    }

    /// Resolve node types here instead of in the definition's own registry
    pub fn with_registry(mut self, registry: Arc<dyn NodeRegistryLookup>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_event_log(mut self, event_log: Arc<dyn EventLog>) -> Self {
        self.event_log = Some(event_log);
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run every ready node in turn until the iterator is exhausted.
    ///
    /// Node failures end the run with a failed result; only event log
    /// errors are returned as `Err`.
    pub async fn execute(&self, definition: &WorkflowDefinition) -> Result<ExecutionResult> {
        let run_id = RunId::new();
        tracing::info!("Starting workflow execution: run_id={}, workflow={}", run_id, definition.metadata());

        let mut iterator = match &self.registry {
            Some(registry) => definition.create_iterator_with(registry.clone()),
            None => definition.create_iterator(),
        };

        let mut executed = Vec::new();
        let mut last_outputs = None;

        loop {
            let step = match iterator.get_next_step() {
                Ok(Some(step)) => step,
                Ok(None) => break,
                Err(e) => return Ok(self.failed(run_id, executed, e.into())),
            };

            executed.push(step.node_id.clone());

            match self.run_step(run_id, &step).await? {
                Ok(outputs) => {
                    iterator.record_output(step.node_id, outputs.clone());
                    last_outputs = Some(outputs);
                }
                Err(e) => return Ok(self.failed(run_id, executed, e)),
            }
        }

        tracing::info!(
            "Workflow execution completed: run_id={}, {} node(s) executed",
            run_id,
            executed.len()
        );

        Ok(ExecutionResult {
            run_id,
            status: ExecutionStatus::Completed,
            outputs: last_outputs,
            executed,
            error: None,
        })
    }

    /// Invoke one node, recording start and finish events.
    ///
    /// The outer result carries event log failures, the inner one the node's.
    async fn run_step(
        &self,
        run_id: RunId,
        step: &ExecutionStep,
    ) -> Result<std::result::Result<PortValues, ExecutionError>> {
        tracing::debug!("Executing node {} ({}@{})", step.node_id, step.node_type, step.node_version);
        self.record(run_id, &step.node_id, EventKind::Started).await?;

        let inputs = if self.config.stringify_inputs {
            stringify(&step.inputs)
        } else {
            step.inputs.clone()
        };

        let start = Instant::now();
        let invocation = step.execute.execute(inputs);

        let result = match self.config.node_timeout_secs {
            Some(timeout_secs) => match timeout(Duration::from_secs(timeout_secs), invocation).await {
                Ok(result) => result.map_err(|source| ExecutionError::Node {
                    node_id: step.node_id.clone(),
                    source,
                }),
                Err(_) => {
                    tracing::warn!("Node {} timed out", step.node_id);
                    Err(ExecutionError::Timeout {
                        node_id: step.node_id.clone(),
                        timeout_secs,
                    })
                }
            },
            None => invocation.await.map_err(|source| ExecutionError::Node {
                node_id: step.node_id.clone(),
                source,
            }),
        };

        let duration_ms = millis(start.elapsed());

        match &result {
            Ok(_) => {
                self.record(run_id, &step.node_id, EventKind::Completed { duration_ms })
                    .await?;
            }
            Err(e) => {
                self.record(run_id, &step.node_id, EventKind::Failed { error: e.to_string() })
                    .await?;
            }
        }

        Ok(result)
    }

    async fn record(&self, run_id: RunId, node_id: &NodeId, kind: EventKind) -> Result<()> {
        match &self.event_log {
            Some(log) => log.append(ExecutionEvent::new(run_id, node_id.clone(), kind)).await,
            None => Ok(()),
        }
    }

    fn failed(&self, run_id: RunId, executed: Vec<NodeId>, error: ExecutionError) -> ExecutionResult {
        tracing::error!("Workflow execution failed: run_id={}, error={}", run_id, error);

        ExecutionResult {
            run_id,
            status: ExecutionStatus::Failed,
            outputs: None,
            executed,
            error: Some(error),
        }
    }
}

/// Whole milliseconds, saturating at `u64::MAX`
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Strings pass through; everything else is rendered as JSON text
fn stringify(inputs: &PortValues) -> PortValues {
    inputs
        .iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), Value::String(text))
        })
        .collect()
}
