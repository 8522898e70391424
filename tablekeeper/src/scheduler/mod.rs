//! Maintenance scheduling core.
//!
//! The scheduler keeps exactly one live maintenance job per configured
//! table:
//! - `MaintenanceScheduler` reconciles policy updates with live jobs
//! - `JobFactory` materializes validated jobs from table and policy
//! - `SerialWorker` provides the single-consumer execution discipline
//! - capability traits define the seams to the surrounding system

pub mod capabilities;
mod coordinator;
mod factory;
mod job;
mod worker;

pub use capabilities::{
    AdminError, Fault, FaultReporter, FaultSeverity, MaintenanceMetrics, MaintenanceState,
    NoOpAdmin, NoOpFaultReporter, NoOpMetrics, NoOpRegistry, NodeAdmin, ScheduleRegistry,
    StateError, StateProvider, StaticState, StaticStateProvider,
};
pub use coordinator::{MaintenanceScheduler, SchedulerConfig, SchedulerDeps};
pub use factory::{ConstructionError, JobFactory};
pub use job::{JobParameters, MaintenanceJob};
pub use worker::{DrainStatus, SerialWorker, WorkerClosed};
