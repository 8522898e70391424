//! Maintenance job definitions.
//!
//! A `MaintenanceJob` is the materialized, schedulable unit built from a
//! table reference and a policy. Jobs are immutable; a policy change always
//! produces a whole new job, never an in-place update.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{JobPriority, MaintenancePolicy, TableRef};

use super::capabilities::{FaultReporter, MaintenanceMetrics, MaintenanceState, NodeAdmin};
use super::factory::ConstructionError;

/// Scheduling parameters the execution engine runs a job under.
///
/// Derived from the policy at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobParameters {
    /// Priority the engine schedules this job at.
    pub priority: JobPriority,
    /// Interval between runs.
    pub run_interval: Duration,
}

/// One table's scheduled maintenance unit.
///
/// Owned exclusively by the scheduler once inserted into its map; the
/// execution engine receives a shared handle for running it, and that
/// handle is taken back by revoking the job. The policy the job was built
/// from stays attached for change detection.
pub struct MaintenanceJob {
    id: Uuid,
    table: TableRef,
    policy: MaintenancePolicy,
    params: JobParameters,
    state: Arc<dyn MaintenanceState>,
    admin: Arc<dyn NodeAdmin>,
    faults: Arc<dyn FaultReporter>,
    metrics: Arc<dyn MaintenanceMetrics>,
    created_at: DateTime<Utc>,
}

impl MaintenanceJob {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        table: TableRef,
        policy: MaintenancePolicy,
        params: JobParameters,
        state: Arc<dyn MaintenanceState>,
        admin: Arc<dyn NodeAdmin>,
        faults: Arc<dyn FaultReporter>,
        metrics: Arc<dyn MaintenanceMetrics>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            table,
            policy,
            params,
            state,
            admin,
            faults,
            metrics,
            created_at: Utc::now(),
        }
    }

    /// Unique job id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Table this job maintains.
    pub fn table(&self) -> &TableRef {
        &self.table
    }

    /// The policy this job was built from.
    pub fn policy(&self) -> &MaintenancePolicy {
        &self.policy
    }

    /// Scheduling parameters for the execution engine.
    pub fn params(&self) -> JobParameters {
        self.params
    }

    /// Maintenance-state snapshot taken at construction.
    pub fn state(&self) -> &Arc<dyn MaintenanceState> {
        &self.state
    }

    /// Management access the engine uses to perform the maintenance action.
    pub fn admin(&self) -> &Arc<dyn NodeAdmin> {
        &self.admin
    }

    /// Fault observer for run-time fault conditions.
    pub fn faults(&self) -> &Arc<dyn FaultReporter> {
        &self.faults
    }

    /// Metrics observer for run-time measurements.
    pub fn metrics(&self) -> &Arc<dyn MaintenanceMetrics> {
        &self.metrics
    }

    /// When this job was constructed.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Cheap pre-flight checks that must pass before the job is registered.
    ///
    /// A job that cannot pass these would fail on every run; failing here
    /// keeps it out of the execution engine entirely.
    pub fn pre_validate(&self) -> Result<(), ConstructionError> {
        if self.state.table() != &self.table {
            return Err(ConstructionError::PreValidation {
                table: self.table.clone(),
                reason: format!("state snapshot describes {}", self.state.table()),
            });
        }

        if self.state.replica_count() == 0 {
            return Err(ConstructionError::PreValidation {
                table: self.table.clone(),
                reason: "table has no replicas under current cluster metadata".to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Debug for MaintenanceJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaintenanceJob")
            .field("id", &self.id)
            .field("table", &self.table)
            .field("params", &self.params)
            .field("created_at", &self.created_at)
            .finish()
    }
}
