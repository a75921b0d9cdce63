//! Scheduled discovery of completed generation jobs.
//!
//! One central poll loop replaces per-process timer loops: each cycle
//! enumerates every execution waiting on the completion message, groups the
//! jobs by tenant, resolves credentials once, queries Epistola per job and
//! delivers terminal outcomes directly to the waiting execution. Failures
//! are contained at the smallest possible scope — a malformed job path drops
//! one waiter, a missing credential drops one tenant bucket, a failed status
//! query drops one job until the next cycle. Nothing escapes a cycle.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::PollerConfig;
use crate::credentials::{CredentialResolver, TenantCredentials};
use crate::dispatch::{CompletionOutcome, MessageDispatcher};
use crate::engine::{ExecutionRef, MESSAGE_NAME, ProcessEngine};
use crate::epistola::JobStatusSource;
use crate::job_path::JobPath;

/// One waiter's job after its path decoded successfully.
#[derive(Debug)]
struct WaitingJob {
    request_id: String,
    execution: ExecutionRef,
}

/// Polls Epistola for completion of generation jobs and delivers messages
/// to the executions waiting on them.
///
/// The poller starts stopped; [`start`](Self::start) must be called before
/// ticks do anything. Stopping prevents future ticks but does not cancel a
/// cycle already in flight.
pub struct CompletionPoller<E, S, R> {
    dispatcher: MessageDispatcher<E>,
    engine: Arc<E>,
    status_source: Arc<S>,
    credentials: Arc<R>,
    interval: Duration,
    running: AtomicBool,
    in_cycle: AtomicBool,
}

impl<E, S, R> CompletionPoller<E, S, R>
where
    E: ProcessEngine,
    S: JobStatusSource,
    R: CredentialResolver,
{
    pub fn new(
        engine: Arc<E>,
        status_source: Arc<S>,
        credentials: Arc<R>,
        interval: Duration,
    ) -> Self {
        Self {
            dispatcher: MessageDispatcher::new(Arc::clone(&engine)),
            engine,
            status_source,
            credentials,
            interval,
            running: AtomicBool::new(false),
            in_cycle: AtomicBool::new(false),
        }
    }

    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
        info!("started Epistola completion poller");
    }

    /// Start the poller only if the configuration enables it, e.g. when
    /// Epistola delivers every completion through the webhook instead.
    pub fn start_if_enabled(&self, config: &PollerConfig) {
        if config.enabled {
            self.start();
        } else {
            info!("Epistola completion poller disabled by configuration");
        }
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        info!("stopped Epistola completion poller");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Drive [`poll`](Self::poll) forever on a fixed delay, measured from
    /// cycle completion so cycles can never overlap. Spawn this on the
    /// runtime and abort the task to shut the loop down; `stop()` alone
    /// turns remaining ticks into no-ops.
    pub async fn run(&self) {
        loop {
            self.poll().await;
            sleep(self.interval).await;
        }
    }

    /// One poll tick. A no-op while stopped, and skipped entirely if the
    /// previous cycle is somehow still in flight.
    pub async fn poll(&self) {
        if !self.is_running() {
            return;
        }
        if self.in_cycle.swap(true, Ordering::SeqCst) {
            debug!("previous poll cycle still running, skipping tick");
            return;
        }
        self.run_cycle().await;
        self.in_cycle.store(false, Ordering::SeqCst);
    }

    async fn run_cycle(&self) {
        let waiting = match self.engine.find_waiting_consumers(MESSAGE_NAME).await {
            Ok(waiting) => waiting,
            Err(e) => {
                error!(error = %e, "failed to enumerate waiting executions");
                return;
            }
        };
        if waiting.is_empty() {
            return;
        }
        debug!(
            count = waiting.len(),
            "found execution(s) waiting for Epistola completion"
        );

        let jobs_by_tenant = group_by_tenant(waiting);
        if jobs_by_tenant.is_empty() {
            return;
        }

        // Resolved once per cycle, not once per job.
        let credentials_by_tenant = match self.credentials.resolve_all().await {
            Ok(creds) => creds,
            Err(e) => {
                error!(error = %e, "failed to resolve tenant credentials");
                return;
            }
        };

        for (tenant_id, jobs) in jobs_by_tenant {
            let Some(credentials) = credentials_by_tenant.get(&tenant_id) else {
                warn!(
                    tenant = %tenant_id,
                    stranded = jobs.len(),
                    "no credentials for tenant, waiting job(s) cannot be polled"
                );
                continue;
            };
            self.check_job_statuses(credentials, &tenant_id, jobs).await;
        }
    }

    /// Query status for each job in a tenant bucket independently and
    /// deliver terminal outcomes directly to the waiting execution.
    async fn check_job_statuses(
        &self,
        credentials: &TenantCredentials,
        tenant_id: &str,
        jobs: Vec<WaitingJob>,
    ) {
        for job in jobs {
            let detail = match self
                .status_source
                .get_job_status(credentials, &job.request_id)
                .await
            {
                Ok(detail) => detail,
                Err(e) => {
                    warn!(
                        request_id = %job.request_id,
                        tenant = %tenant_id,
                        error = %e,
                        "failed to check job status, will retry next cycle"
                    );
                    continue;
                }
            };

            if !detail.status.is_terminal() {
                debug!(
                    request_id = %job.request_id,
                    status = %detail.status,
                    "job still in progress"
                );
                continue;
            }

            let outcome = CompletionOutcome::from(&detail);
            match self.dispatcher.deliver_to(&job.execution, &outcome).await {
                Ok(()) => info!(
                    execution = %job.execution,
                    request_id = %job.request_id,
                    status = %detail.status,
                    "delivered completion message"
                ),
                Err(e) => warn!(
                    execution = %job.execution,
                    request_id = %job.request_id,
                    error = %e,
                    "failed to deliver completion message"
                ),
            }
        }
    }
}

/// Decode each waiter's job path and bucket the jobs by tenant. Waiters with
/// malformed paths are logged and discarded; they never abort the cycle.
fn group_by_tenant(
    waiting: Vec<crate::engine::WaitingConsumer>,
) -> HashMap<String, Vec<WaitingJob>> {
    let mut result: HashMap<String, Vec<WaitingJob>> = HashMap::new();

    for consumer in waiting {
        let path = match consumer.job_path.parse::<JobPath>() {
            Ok(path) => path,
            Err(e) => {
                warn!(
                    execution = %consumer.execution,
                    error = %e,
                    "waiting execution has an unusable job path, skipping"
                );
                continue;
            }
        };
        result
            .entry(path.tenant_id().to_string())
            .or_default()
            .push(WaitingJob {
                request_id: path.request_id().to_string(),
                execution: consumer.execution,
            });
    }

    result
}
