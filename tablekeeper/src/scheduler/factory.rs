//! Job construction.
//!
//! The factory turns `(TableRef, MaintenancePolicy)` into a fully validated
//! `MaintenanceJob`: it derives the scheduling parameters, obtains a
//! maintenance-state snapshot, and runs the pre-flight checks, failing fast
//! rather than handing the engine a job destined to fail at run time.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::domain::{MaintenancePolicy, PolicyError, TableRef};

use super::capabilities::{
    FaultReporter, MaintenanceMetrics, NodeAdmin, StateError, StateProvider,
};
use super::job::{JobParameters, MaintenanceJob};

/// Why a job could not be constructed.
///
/// Construction failures are never retried by the scheduler; the table
/// stays unscheduled until a corrected policy is re-submitted.
#[derive(Error, Debug)]
pub enum ConstructionError {
    #[error("invalid policy for {table}: {source}")]
    InvalidPolicy {
        table: TableRef,
        #[source]
        source: PolicyError,
    },

    #[error("state computation failed for {table}: {source}")]
    State {
        table: TableRef,
        #[source]
        source: StateError,
    },

    #[error("pre-validation failed for {table}: {reason}")]
    PreValidation { table: TableRef, reason: String },
}

impl ConstructionError {
    /// Table the failed construction was for.
    pub fn table(&self) -> &TableRef {
        match self {
            ConstructionError::InvalidPolicy { table, .. } => table,
            ConstructionError::State { table, .. } => table,
            ConstructionError::PreValidation { table, .. } => table,
        }
    }
}

/// Builds maintenance jobs from table references and policies.
///
/// Holds the capabilities every job needs; the scheduler owns exactly one
/// factory and calls it from its worker, so construction is serialized
/// with map mutation.
pub struct JobFactory {
    state_provider: Arc<dyn StateProvider>,
    admin: Arc<dyn NodeAdmin>,
    faults: Arc<dyn FaultReporter>,
    metrics: Arc<dyn MaintenanceMetrics>,
}

impl JobFactory {
    /// Create a factory over the given capabilities.
    pub fn new(
        state_provider: Arc<dyn StateProvider>,
        admin: Arc<dyn NodeAdmin>,
        faults: Arc<dyn FaultReporter>,
        metrics: Arc<dyn MaintenanceMetrics>,
    ) -> Self {
        Self {
            state_provider,
            admin,
            faults,
            metrics,
        }
    }

    /// Build a validated job for `table` under `policy`.
    ///
    /// Deterministic given the same inputs and external state; has no side
    /// effects on the scheduler's bookkeeping.
    pub async fn build(
        &self,
        table: &TableRef,
        policy: &MaintenancePolicy,
    ) -> Result<Arc<MaintenanceJob>, ConstructionError> {
        policy
            .validate()
            .map_err(|source| ConstructionError::InvalidPolicy {
                table: table.clone(),
                source,
            })?;

        let params = JobParameters {
            priority: policy.priority,
            run_interval: policy.interval,
        };

        let state = self
            .state_provider
            .snapshot(table, policy.interval)
            .await
            .map_err(|source| ConstructionError::State {
                table: table.clone(),
                source,
            })?;

        let job = MaintenanceJob::new(
            table.clone(),
            policy.clone(),
            params,
            state,
            self.admin.clone(),
            self.faults.clone(),
            self.metrics.clone(),
        );
        job.pre_validate()?;

        debug!(table = %table, job_id = %job.id(), "Constructed maintenance job");
        Ok(Arc::new(job))
    }
}
