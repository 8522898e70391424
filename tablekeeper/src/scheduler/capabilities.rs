//! External capabilities consumed by the scheduler.
//!
//! These traits are the seams to the surrounding system:
//! - `ScheduleRegistry`: the engine that actually runs registered jobs
//! - `StateProvider` / `MaintenanceState`: maintenance-state computation
//! - `NodeAdmin`: the management protocol that performs maintenance
//! - `FaultReporter` / `MaintenanceMetrics`: passive observers
//!
//! The scheduler core never implements any of them; it only calls through
//! them. No-op implementations are provided for tests and embedding.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{MaintenanceParallelism, TableRef};

use super::job::MaintenanceJob;

/// Engine that accepts maintenance jobs for execution and stops them again.
///
/// The scheduler keeps its own record of every job it registers; a revoke is
/// always paired with removal from that record. `revoke` must be idempotent:
/// revoking a job the engine does not know is a no-op.
#[async_trait]
pub trait ScheduleRegistry: Send + Sync + 'static {
    /// Hand a job to the engine for execution.
    async fn register(&self, job: Arc<MaintenanceJob>);

    /// Stop and forget a previously registered job.
    async fn revoke(&self, job: &MaintenanceJob);
}

/// Error from the state-computation capability.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("table {table} is not known to current cluster metadata")]
    UnknownTable { table: TableRef },

    #[error("state computation unreachable: {0}")]
    Unreachable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Snapshot of a table's maintenance state, taken at job construction.
pub trait MaintenanceState: Send + Sync + 'static {
    /// Table this snapshot describes.
    fn table(&self) -> &TableRef;

    /// Number of replicas the table has under current cluster metadata.
    fn replica_count(&self) -> usize;

    /// When maintenance last completed for this table, if known.
    fn last_completed(&self) -> Option<DateTime<Utc>>;
}

/// Computes maintenance-state snapshots for tables.
///
/// May perform network I/O and may fail; callers are expected to bound
/// slow calls with their own timeouts.
#[async_trait]
pub trait StateProvider: Send + Sync + 'static {
    /// Take a state snapshot for `table`, given the configured polling interval.
    async fn snapshot(
        &self,
        table: &TableRef,
        interval: Duration,
    ) -> Result<Arc<dyn MaintenanceState>, StateError>;
}

/// Error from the node management protocol.
#[derive(Error, Debug)]
pub enum AdminError {
    #[error("management connection failed: {0}")]
    Connection(String),

    #[error("maintenance operation failed on {table}: {message}")]
    Operation { table: TableRef, message: String },
}

/// Remote management access used by jobs to perform the maintenance action.
///
/// Supplied to constructed jobs; its failures surface as job-execution
/// failures. The scheduler itself never calls this.
#[async_trait]
pub trait NodeAdmin: Send + Sync + 'static {
    /// Run one maintenance pass on `table`.
    async fn run_maintenance(
        &self,
        table: &TableRef,
        parallelism: MaintenanceParallelism,
    ) -> Result<(), AdminError>;
}

/// Severity of a reported fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultSeverity {
    /// Operator attention advised.
    Warning,
    /// Operator attention required.
    Error,
}

/// A fault condition raised against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Table the fault concerns.
    pub table: TableRef,
    /// Severity level.
    pub severity: FaultSeverity,
}

/// Passive observer for operator-visible fault conditions.
///
/// Raising an already-raised fault or ceasing an unknown one is a no-op for
/// conforming implementations.
pub trait FaultReporter: Send + Sync + 'static {
    /// Raise a fault.
    fn raise(&self, fault: Fault);

    /// Clear a previously raised fault.
    fn cease(&self, fault: Fault);
}

/// Passive observer for scheduler metrics.
pub trait MaintenanceMetrics: Send + Sync + 'static {
    /// A job was constructed and registered.
    fn job_created(&self, table: &TableRef);

    /// A job was revoked and dropped.
    fn job_removed(&self, table: &TableRef);

    /// Job construction failed; the table is left unscheduled.
    fn construction_failed(&self, table: &TableRef);
}

/// No-op registry; accepts and revokes without an execution engine behind it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpRegistry;

#[async_trait]
impl ScheduleRegistry for NoOpRegistry {
    async fn register(&self, _job: Arc<MaintenanceJob>) {}

    async fn revoke(&self, _job: &MaintenanceJob) {}
}

/// State snapshot with fixed contents.
#[derive(Debug, Clone)]
pub struct StaticState {
    table: TableRef,
    replica_count: usize,
    last_completed: Option<DateTime<Utc>>,
}

impl StaticState {
    /// Create a snapshot for `table` with the given replica count.
    pub fn new(table: TableRef, replica_count: usize) -> Self {
        Self {
            table,
            replica_count,
            last_completed: None,
        }
    }
}

impl MaintenanceState for StaticState {
    fn table(&self) -> &TableRef {
        &self.table
    }

    fn replica_count(&self) -> usize {
        self.replica_count
    }

    fn last_completed(&self) -> Option<DateTime<Utc>> {
        self.last_completed
    }
}

/// State provider that answers every snapshot request with fixed contents.
#[derive(Debug, Clone, Copy)]
pub struct StaticStateProvider {
    replica_count: usize,
}

impl StaticStateProvider {
    /// Provider reporting the given replica count for every table.
    pub fn new(replica_count: usize) -> Self {
        Self { replica_count }
    }

    /// Provider describing a healthy, fully replicated table.
    pub fn healthy() -> Self {
        Self::new(3)
    }
}

#[async_trait]
impl StateProvider for StaticStateProvider {
    async fn snapshot(
        &self,
        table: &TableRef,
        _interval: Duration,
    ) -> Result<Arc<dyn MaintenanceState>, StateError> {
        Ok(Arc::new(StaticState::new(table.clone(), self.replica_count)))
    }
}

/// No-op management access.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpAdmin;

#[async_trait]
impl NodeAdmin for NoOpAdmin {
    async fn run_maintenance(
        &self,
        _table: &TableRef,
        _parallelism: MaintenanceParallelism,
    ) -> Result<(), AdminError> {
        Ok(())
    }
}

/// Fault reporter that discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpFaultReporter;

impl FaultReporter for NoOpFaultReporter {
    fn raise(&self, _fault: Fault) {}

    fn cease(&self, _fault: Fault) {}
}

/// Metrics sink that discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MaintenanceMetrics for NoOpMetrics {
    fn job_created(&self, _table: &TableRef) {}

    fn job_removed(&self, _table: &TableRef) {}

    fn construction_failed(&self, _table: &TableRef) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_state_provider_snapshot() {
        let provider = StaticStateProvider::healthy();
        let table = TableRef::new("store", "orders");

        let state = provider
            .snapshot(&table, Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(state.table(), &table);
        assert_eq!(state.replica_count(), 3);
        assert_eq!(state.last_completed(), None);
    }

    #[test]
    fn test_state_error_display() {
        let err = StateError::UnknownTable {
            table: TableRef::new("store", "orders"),
        };
        assert_eq!(
            err.to_string(),
            "table store.orders is not known to current cluster metadata"
        );

        let err = StateError::Unreachable("connection refused".to_string());
        assert_eq!(
            err.to_string(),
            "state computation unreachable: connection refused"
        );
    }
}
