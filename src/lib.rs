//! Completion-notification bridge between a BPMN workflow engine and the
//! Epistola document-generation service.
//!
//! A workflow step submits a generation job, stores the encoded
//! [`JobPath`](job_path::JobPath) as execution state and suspends on the
//! `EpistolaDocumentGenerated` message. Epistola finishes jobs on its own
//! timeline, so two independent delivery paths reconcile the waiters with
//! the job lifecycle:
//!
//! - the [`CompletionPoller`](poller::CompletionPoller) periodically
//!   enumerates waiting executions, queries job status per tenant and
//!   delivers terminal outcomes directly to the specific waiter;
//! - the [webhook router](webhook::callback_router) accepts pushed
//!   generation-complete callbacks and broadcasts them by job-path
//!   correlation.
//!
//! Both converge on the [`MessageDispatcher`](dispatch::MessageDispatcher),
//! so the variable shape the process model sees is defined once. The engine
//! and the credential store are collaborators behind the
//! [`ProcessEngine`](engine::ProcessEngine) and
//! [`CredentialResolver`](credentials::CredentialResolver) traits; the host
//! application provides the implementations and mounts the router.

pub mod config;
pub mod credentials;
pub mod dispatch;
pub mod engine;
pub mod epistola;
pub mod error;
pub mod job_path;
pub mod poller;
pub mod telemetry;
pub mod webhook;

pub use config::{BridgeConfig, PollerConfig};
pub use credentials::{CredentialResolver, StaticCredentialResolver, TenantCredentials};
pub use dispatch::{CompletionOutcome, MessageDispatcher};
pub use engine::{EngineError, ExecutionRef, MESSAGE_NAME, ProcessEngine, WaitingConsumer};
pub use epistola::{EpistolaClient, EpistolaError, GenerationJobDetail, GenerationJobStatus, JobStatusSource};
pub use error::BridgeError;
pub use job_path::{JobPath, JobPathError};
pub use poller::CompletionPoller;
pub use webhook::{GenerationCompletePayload, callback_router};
