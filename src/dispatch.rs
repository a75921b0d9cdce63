//! Delivery of completion outcomes to waiting executions.
//!
//! Both notification paths — the poller (which knows the exact waiter) and
//! the webhook (which does not) — converge here, so the variable shape the
//! process model sees is defined in exactly one place: `epistolaStatus`,
//! `epistolaDocumentId` and `epistolaErrorMessage`, always set together even
//! when one or two are null.

use std::sync::Arc;

use tracing::{debug, info};

use crate::engine::{EngineError, ExecutionRef, MESSAGE_NAME, ProcessEngine, Variables};
use crate::epistola::{GenerationJobDetail, GenerationJobStatus};
use crate::job_path::JobPath;

/// Process variable holding the encoded job path on a waiting execution.
pub const VAR_JOB_PATH: &str = "epistolaJobPath";
/// Process variable holding the bare request id (legacy callback shape).
pub const VAR_REQUEST_ID: &str = "epistolaRequestId";
/// Delivered variable: terminal status name.
pub const VAR_STATUS: &str = "epistolaStatus";
/// Delivered variable: generated document id, null unless completed.
pub const VAR_DOCUMENT_ID: &str = "epistolaDocumentId";
/// Delivered variable: error message, null unless failed.
pub const VAR_ERROR_MESSAGE: &str = "epistolaErrorMessage";

/// Outcome fields of a terminal job, as delivered to the process model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub status: GenerationJobStatus,
    pub document_id: Option<String>,
    pub error_message: Option<String>,
}

impl CompletionOutcome {
    /// The three delivered variables. Absent fields are explicit nulls so
    /// the process model can rely on all three being present.
    pub fn to_variables(&self) -> Variables {
        let mut variables = Variables::new();
        variables.insert(VAR_STATUS.into(), self.status.as_str().into());
        variables.insert(
            VAR_DOCUMENT_ID.into(),
            self.document_id.clone().map_or(serde_json::Value::Null, Into::into),
        );
        variables.insert(
            VAR_ERROR_MESSAGE.into(),
            self.error_message.clone().map_or(serde_json::Value::Null, Into::into),
        );
        variables
    }
}

impl From<&GenerationJobDetail> for CompletionOutcome {
    fn from(detail: &GenerationJobDetail) -> Self {
        Self {
            status: detail.status,
            document_id: detail.document_id.clone(),
            error_message: detail.error_message.clone(),
        }
    }
}

/// Dispatches completion messages over the engine's messaging primitives.
///
/// Both strategies are idempotent from the caller's perspective: targeting a
/// waiter that already resumed, or a job path nothing is waiting on, is a
/// no-op rather than an error.
pub struct MessageDispatcher<E> {
    engine: Arc<E>,
}

impl<E> Clone for MessageDispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<E: ProcessEngine> MessageDispatcher<E> {
    pub fn new(engine: Arc<E>) -> Self {
        Self { engine }
    }

    /// Deliver the outcome directly to one enumerated waiter.
    ///
    /// This is the only strategy that is safe when multiple branches of the
    /// same process instance wait on the message concurrently: each branch
    /// has its own execution handle and its own job path.
    pub async fn deliver_to(
        &self,
        execution: &ExecutionRef,
        outcome: &CompletionOutcome,
    ) -> Result<(), EngineError> {
        match self
            .engine
            .deliver_direct(MESSAGE_NAME, execution, outcome.to_variables())
            .await
        {
            Ok(()) => Ok(()),
            Err(EngineError::NoMatch) => {
                // Waiter resumed between enumeration and delivery.
                debug!(execution = %execution, "execution no longer waiting, skipping delivery");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Deliver the outcome to every waiter whose stored job path matches.
    /// Returns the number of waiters resumed; zero matches is a valid
    /// outcome, not an error.
    pub async fn correlate_by_job_path(
        &self,
        job_path: &JobPath,
        outcome: &CompletionOutcome,
    ) -> Result<usize, EngineError> {
        self.correlate(VAR_JOB_PATH, &job_path.encode(), outcome)
            .await
    }

    /// Legacy correlation on the bare request id, for callbacks that predate
    /// the tenant-qualified job path.
    pub async fn correlate_by_request_id(
        &self,
        request_id: &str,
        outcome: &CompletionOutcome,
    ) -> Result<usize, EngineError> {
        self.correlate(VAR_REQUEST_ID, request_id, outcome).await
    }

    async fn correlate(
        &self,
        variable_name: &str,
        variable_value: &str,
        outcome: &CompletionOutcome,
    ) -> Result<usize, EngineError> {
        match self
            .engine
            .correlate_broadcast(MESSAGE_NAME, variable_name, variable_value, outcome.to_variables())
            .await
        {
            Ok(count) => {
                if count > 0 {
                    info!(
                        variable = variable_name,
                        value = variable_value,
                        count,
                        "correlated completion message"
                    );
                }
                Ok(count)
            }
            Err(EngineError::NoMatch) => {
                debug!(
                    variable = variable_name,
                    value = variable_value,
                    "no waiting execution matched"
                );
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }
}
