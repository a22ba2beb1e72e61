use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nodeflow_core::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Identifier of one executor run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Something that happened to a node during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionEvent {
    pub id: String,
    pub run_id: RunId,
    pub node_id: NodeId,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
}

impl ExecutionEvent {
    pub fn new(run_id: RunId, node_id: NodeId, kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            run_id,
            node_id,
            timestamp: Utc::now(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    Started,
    Completed { duration_ms: u64 },
    Failed { error: String },
}

/// Append-only sink for execution events
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Append an event to the log
    async fn append(&self, event: ExecutionEvent) -> anyhow::Result<()>;

    /// All events of one run, in append order
    async fn run_events(&self, run_id: RunId) -> anyhow::Result<Vec<ExecutionEvent>>;
}

/// Event log kept in process memory
#[derive(Debug, Default)]
pub struct MemoryEventLog {
    events: RwLock<Vec<ExecutionEvent>>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<ExecutionEvent> {
        self.events.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }
}

#[async_trait]
impl EventLog for MemoryEventLog {
    async fn append(&self, event: ExecutionEvent) -> anyhow::Result<()> {
        self.events.write().await.push(event);
        Ok(())
    }

    async fn run_events(&self, run_id: RunId) -> anyhow::Result<Vec<ExecutionEvent>> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .filter(|e| e.run_id == run_id)
            .cloned()
            .collect())
    }
}
