//! tablekeeper: maintenance-schedule coordination for distributed tables.
//!
//! Given a changing set of maintenance policies keyed by table, the
//! scheduler keeps exactly one live job per table: jobs are replaced when
//! their policy changes and revoked when the policy disappears. All
//! mutations flow through a single worker task in submission order, so
//! concurrent configuration updates can never race the bookkeeping.

pub mod domain;
pub mod error;
pub mod logging;
pub mod scheduler;

pub use error::{Error, Result};
pub use scheduler::{DrainStatus, MaintenanceScheduler, SchedulerConfig, SchedulerDeps};
