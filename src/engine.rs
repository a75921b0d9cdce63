//! Consumed interface of the workflow engine.
//!
//! The engine owns all waiter state: which executions are suspended on a
//! message, and the primitives that resume them. This subsystem only ever
//! enumerates waiters and delivers messages; it never caches or mutates
//! waiter state between cycles.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Name of the BPMN message waiting executions are subscribed to.
pub const MESSAGE_NAME: &str = "EpistolaDocumentGenerated";

/// Process variables delivered alongside a message.
pub type Variables = HashMap<String, serde_json::Value>;

/// Opaque handle to one suspended execution (one branch of a process
/// instance). Two waiters never share a handle, even within one instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExecutionRef(pub String);

impl fmt::Display for ExecutionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One execution suspended on the completion message, as enumerated by the
/// engine. The job path is carried as the raw stored variable value; decoding
/// (and discarding malformed entries) is the poller's concern.
#[derive(Debug, Clone)]
pub struct WaitingConsumer {
    pub execution: ExecutionRef,
    pub job_path: String,
}

/// Errors surfaced by the engine collaborator.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Broadcast correlation matched no waiting subscription. Callers treat
    /// this as a zero-match outcome, never as a failure.
    #[error("no waiting subscription matched")]
    NoMatch,

    /// Enumerating waiting executions failed.
    #[error("waiter enumeration failed: {0}")]
    Enumeration(String),

    /// The engine rejected a message delivery.
    #[error("message delivery failed: {0}")]
    Delivery(String),
}

/// Messaging primitives of the workflow engine, assumed internally
/// synchronized: concurrent calls — even double delivery to an
/// already-resumed waiter — must degrade to an error result, not corruption.
#[async_trait]
pub trait ProcessEngine: Send + Sync {
    /// All executions currently suspended on `message_name`, system-wide.
    async fn find_waiting_consumers(
        &self,
        message_name: &str,
    ) -> Result<Vec<WaitingConsumer>, EngineError>;

    /// Deliver `message_name` directly to one previously enumerated waiter.
    async fn deliver_direct(
        &self,
        message_name: &str,
        execution: &ExecutionRef,
        variables: Variables,
    ) -> Result<(), EngineError>;

    /// Deliver `message_name` to every waiter whose stored `variable_name`
    /// equals `variable_value`, returning the number of waiters resumed.
    /// Raises [`EngineError::NoMatch`] when nothing is waiting.
    async fn correlate_broadcast(
        &self,
        message_name: &str,
        variable_name: &str,
        variable_value: &str,
        variables: Variables,
    ) -> Result<usize, EngineError>;
}
