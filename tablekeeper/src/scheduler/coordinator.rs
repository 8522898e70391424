//! Maintenance schedule coordination.
//!
//! `MaintenanceScheduler` reconciles configured policies with live jobs:
//! exactly one job per table, replaced when its policy changes, removed
//! when the policy disappears. Every mutation is applied by a single
//! worker task in global submission order; that total order is the sole
//! synchronization for the active-job map, so two racing updates to one
//! table can never produce two live jobs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::{MaintenancePolicy, TableRef};

use super::capabilities::{
    Fault, FaultReporter, FaultSeverity, MaintenanceMetrics, NodeAdmin, ScheduleRegistry,
    StateProvider,
};
use super::factory::JobFactory;
use super::job::MaintenanceJob;
use super::worker::{DrainStatus, SerialWorker};

/// Default drain ceiling for shutdown.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Drain ceiling used by [`MaintenanceScheduler::shutdown_default`].
    pub shutdown_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

/// The collaborators the scheduler needs.
///
/// Every field is mandatory; constructing the struct is the validation.
pub struct SchedulerDeps {
    /// Engine that executes registered jobs.
    pub registry: Arc<dyn ScheduleRegistry>,
    /// Maintenance-state computation.
    pub state_provider: Arc<dyn StateProvider>,
    /// Management access handed to constructed jobs.
    pub admin: Arc<dyn NodeAdmin>,
    /// Fault observer.
    pub faults: Arc<dyn FaultReporter>,
    /// Metrics observer.
    pub metrics: Arc<dyn MaintenanceMetrics>,
}

/// Requests processed by the scheduler worker.
enum Request {
    SetPolicy {
        table: TableRef,
        policy: MaintenancePolicy,
    },
    RemovePolicy {
        table: TableRef,
    },
    JobCount(oneshot::Sender<usize>),
    HasJob {
        table: TableRef,
        reply: oneshot::Sender<bool>,
    },
    ActiveTables(oneshot::Sender<Vec<TableRef>>),
}

/// Coordinator keeping one live maintenance job per configured table.
pub struct MaintenanceScheduler {
    worker: SerialWorker<Request>,
    config: SchedulerConfig,
}

impl MaintenanceScheduler {
    /// Create a scheduler with the default configuration.
    pub fn new(deps: SchedulerDeps) -> Self {
        Self::with_config(deps, SchedulerConfig::default())
    }

    /// Create a scheduler with custom configuration.
    pub fn with_config(deps: SchedulerDeps, config: SchedulerConfig) -> Self {
        let SchedulerDeps {
            registry,
            state_provider,
            admin,
            faults,
            metrics,
        } = deps;

        let factory = JobFactory::new(state_provider, admin, faults.clone(), metrics.clone());
        let state = WorkerState {
            jobs: HashMap::new(),
            factory,
            registry,
            faults,
            metrics,
        };
        let worker = SerialWorker::spawn(move |rx, token| state.run(rx, token));

        Self { worker, config }
    }

    /// Request that `table` be scheduled (or rescheduled) under `policy`.
    ///
    /// Fire-and-forget: returns immediately, the mutation happens on the
    /// scheduler worker in submission order. Safe to call concurrently
    /// from any number of callers for the same or different tables.
    /// Re-submitting an unchanged policy is a no-op. After shutdown has
    /// begun the request is dropped with a warning.
    pub fn set_policy(&self, table: TableRef, policy: MaintenancePolicy) {
        let request = Request::SetPolicy {
            table: table.clone(),
            policy,
        };
        if self.worker.submit(request).is_err() {
            warn!(table = %table, "Scheduler is shutting down; dropping policy update");
        }
    }

    /// Request that `table`'s schedule be torn down.
    ///
    /// Same asynchrony and safety contract as [`set_policy`](Self::set_policy);
    /// removing a table with no job is a no-op.
    pub fn remove_policy(&self, table: TableRef) {
        let request = Request::RemovePolicy {
            table: table.clone(),
        };
        if self.worker.submit(request).is_err() {
            warn!(table = %table, "Scheduler is shutting down; dropping policy removal");
        }
    }

    /// Number of live jobs. Reports zero once the scheduler has stopped.
    ///
    /// Answered by the worker, so the result reflects every request
    /// submitted before this one.
    pub async fn job_count(&self) -> usize {
        let (reply, rx) = oneshot::channel();
        if self.worker.submit(Request::JobCount(reply)).is_err() {
            return 0;
        }
        rx.await.unwrap_or(0)
    }

    /// Whether `table` currently has a live job.
    pub async fn has_job(&self, table: &TableRef) -> bool {
        let (reply, rx) = oneshot::channel();
        let request = Request::HasJob {
            table: table.clone(),
            reply,
        };
        if self.worker.submit(request).is_err() {
            return false;
        }
        rx.await.unwrap_or(false)
    }

    /// Tables with live jobs, in unspecified order.
    pub async fn active_tables(&self) -> Vec<TableRef> {
        let (reply, rx) = oneshot::channel();
        if self.worker.submit(Request::ActiveTables(reply)).is_err() {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }

    /// Stop intake and drain queued requests for up to `timeout`.
    ///
    /// Returns whether the drain completed; an expired or interrupted
    /// drain is reported and teardown proceeds regardless.
    pub async fn shutdown(&mut self, timeout: Duration) -> DrainStatus {
        info!("Scheduler shutdown requested");
        let status = self.worker.shutdown(timeout).await;
        if !status.is_complete() {
            warn!(status = ?status, "Scheduler drain did not complete");
        }
        status
    }

    /// Shut down with the configured drain ceiling.
    pub async fn shutdown_default(&mut self) -> DrainStatus {
        let timeout = self.config.shutdown_timeout;
        self.shutdown(timeout).await
    }
}

/// Worker-side state.
///
/// Exclusively owned by the worker task; nothing else ever reads or writes
/// the job map.
struct WorkerState {
    jobs: HashMap<TableRef, Arc<MaintenanceJob>>,
    factory: JobFactory,
    registry: Arc<dyn ScheduleRegistry>,
    faults: Arc<dyn FaultReporter>,
    metrics: Arc<dyn MaintenanceMetrics>,
}

impl WorkerState {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Request>, token: CancellationToken) {
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    info!(live_jobs = self.jobs.len(), "Scheduler worker cancelled");
                    break;
                }
                request = rx.recv() => match request {
                    Some(request) => self.handle(request).await,
                    None => {
                        debug!("Scheduler intake closed, queue drained");
                        break;
                    }
                },
            }
        }
    }

    async fn handle(&mut self, request: Request) {
        match request {
            Request::SetPolicy { table, policy } => {
                self.handle_policy_change(table, policy).await;
            }
            Request::RemovePolicy { table } => {
                self.handle_policy_removed(table).await;
            }
            Request::JobCount(reply) => {
                let _ = reply.send(self.jobs.len());
            }
            Request::HasJob { table, reply } => {
                let _ = reply.send(self.jobs.contains_key(&table));
            }
            Request::ActiveTables(reply) => {
                let _ = reply.send(self.jobs.keys().cloned().collect());
            }
        }
    }

    async fn handle_policy_change(&mut self, table: TableRef, policy: MaintenancePolicy) {
        if !self.policy_changed(&table, &policy) {
            debug!(table = %table, "Policy unchanged, keeping existing job");
            return;
        }
        self.replace_job(table, policy).await;
    }

    /// A table needs a new job when it has none, or when its live job was
    /// built from a structurally different policy.
    fn policy_changed(&self, table: &TableRef, policy: &MaintenancePolicy) -> bool {
        match self.jobs.get(table) {
            Some(job) => job.policy() != policy,
            None => true,
        }
    }

    /// Tear down the old job (if any), then build and register the new one.
    ///
    /// The old job is revoked before construction starts so the table never
    /// has two conflicting jobs registered. If construction fails the table
    /// is left unscheduled, not rolled back; a corrected policy has to be
    /// re-submitted.
    async fn replace_job(&mut self, table: TableRef, policy: MaintenancePolicy) {
        if self.jobs.contains_key(&table) {
            self.revoke_job(&table).await;
        }

        match self.factory.build(&table, &policy).await {
            Ok(job) => {
                info!(
                    table = %table,
                    job_id = %job.id(),
                    interval = ?policy.interval,
                    "Scheduling maintenance job"
                );
                self.jobs.insert(table.clone(), job.clone());
                self.registry.register(job).await;
                self.metrics.job_created(&table);
                self.faults.cease(Fault {
                    table,
                    severity: FaultSeverity::Error,
                });
            }
            Err(e) => {
                error!(
                    table = %table,
                    "Failed to construct maintenance job, table left unscheduled: {}",
                    e
                );
                self.metrics.construction_failed(&table);
                self.faults.raise(Fault {
                    table,
                    severity: FaultSeverity::Error,
                });
            }
        }
    }

    async fn handle_policy_removed(&mut self, table: TableRef) {
        if self.jobs.contains_key(&table) {
            self.revoke_job(&table).await;
            self.metrics.job_removed(&table);
        } else {
            debug!(table = %table, "No job to remove");
        }
    }

    /// Revoke from the registry and drop from the map, always paired.
    async fn revoke_job(&mut self, table: &TableRef) {
        if let Some(job) = self.jobs.remove(table) {
            info!(table = %table, job_id = %job.id(), "Revoking maintenance job");
            self.registry.revoke(&job).await;
        }
    }
}
