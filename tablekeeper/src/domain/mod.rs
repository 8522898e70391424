//! Domain value objects for maintenance scheduling.
//!
//! This module contains the immutable identity and policy types the
//! scheduler keys its bookkeeping on. Policies are compared by full
//! structural equality; that comparison is what drives change detection.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity of one manageable table within a keyspace.
///
/// The sole key of the active-job map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableRef {
    /// Keyspace the table belongs to.
    pub keyspace: String,
    /// Table name.
    pub table: String,
}

impl TableRef {
    /// Create a new table reference.
    pub fn new(keyspace: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.keyspace, self.table)
    }
}

/// Scheduling priority for a maintenance job.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum JobPriority {
    /// Background work, yields to everything else.
    #[default]
    Low,
    /// Regular scheduling weight.
    Normal,
    /// Runs ahead of normal-priority jobs.
    High,
}

/// How replicas are maintained within one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceParallelism {
    /// One replica set at a time.
    #[default]
    Serial,
    /// All replica sets concurrently.
    Parallel,
}

/// Why a policy failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("maintenance interval must be non-zero")]
    ZeroInterval,

    #[error("warn_after ({warn_after:?}) must not be shorter than the interval ({interval:?})")]
    WarnBeforeInterval {
        warn_after: Duration,
        interval: Duration,
    },

    #[error("error_after ({error_after:?}) must not be shorter than warn_after ({warn_after:?})")]
    ErrorBeforeWarn {
        error_after: Duration,
        warn_after: Duration,
    },
}

/// Desired maintenance cadence and parameters for one table.
///
/// A policy is a plain value object. Re-submitting a structurally equal
/// policy is a no-op for the scheduler; any field change produces a whole
/// new job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenancePolicy {
    /// Desired time between maintenance runs.
    pub interval: Duration,
    /// Age at which an overdue table raises a warning-level fault.
    #[serde(default)]
    pub warn_after: Option<Duration>,
    /// Age at which an overdue table raises an error-level fault.
    #[serde(default)]
    pub error_after: Option<Duration>,
    /// Replica handling within one run.
    #[serde(default)]
    pub parallelism: MaintenanceParallelism,
    /// Scheduling priority.
    #[serde(default)]
    pub priority: JobPriority,
}

impl MaintenancePolicy {
    /// Create a policy with the given interval and defaults for everything else.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            warn_after: None,
            error_after: None,
            parallelism: MaintenanceParallelism::default(),
            priority: JobPriority::default(),
        }
    }

    /// Check the field constraints every schedulable policy must satisfy.
    ///
    /// The fault thresholds, when present, must not fire before a run is
    /// even due: `interval <= warn_after <= error_after`.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.interval.is_zero() {
            return Err(PolicyError::ZeroInterval);
        }

        if let Some(warn_after) = self.warn_after {
            if warn_after < self.interval {
                return Err(PolicyError::WarnBeforeInterval {
                    warn_after,
                    interval: self.interval,
                });
            }
        }

        if let Some(error_after) = self.error_after {
            let floor = self.warn_after.unwrap_or(self.interval);
            if error_after < floor {
                return Err(PolicyError::ErrorBeforeWarn {
                    error_after,
                    warn_after: floor,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_ref_display() {
        let table = TableRef::new("store", "orders");
        assert_eq!(table.to_string(), "store.orders");
    }

    #[test]
    fn test_table_ref_equality_and_hash() {
        use std::collections::HashMap;

        let a = TableRef::new("store", "orders");
        let b = TableRef::new("store", "orders");
        let c = TableRef::new("store", "customers");
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut map = HashMap::new();
        map.insert(a, 1);
        assert_eq!(map.get(&b), Some(&1));
        assert_eq!(map.get(&c), None);
    }

    #[test]
    fn test_policy_structural_equality() {
        let p1 = MaintenancePolicy::with_interval(Duration::from_secs(60));
        let p2 = MaintenancePolicy::with_interval(Duration::from_secs(60));
        assert_eq!(p1, p2);

        let mut p3 = p2.clone();
        p3.priority = JobPriority::High;
        assert_ne!(p1, p3);
    }

    #[test]
    fn test_policy_validate_zero_interval() {
        let policy = MaintenancePolicy::with_interval(Duration::ZERO);
        assert_eq!(policy.validate(), Err(PolicyError::ZeroInterval));
    }

    #[test]
    fn test_policy_validate_warn_before_interval() {
        let mut policy = MaintenancePolicy::with_interval(Duration::from_secs(60));
        policy.warn_after = Some(Duration::from_secs(30));
        assert!(matches!(
            policy.validate(),
            Err(PolicyError::WarnBeforeInterval { .. })
        ));
    }

    #[test]
    fn test_policy_validate_error_before_warn() {
        let mut policy = MaintenancePolicy::with_interval(Duration::from_secs(60));
        policy.warn_after = Some(Duration::from_secs(120));
        policy.error_after = Some(Duration::from_secs(90));
        assert!(matches!(
            policy.validate(),
            Err(PolicyError::ErrorBeforeWarn { .. })
        ));
    }

    #[test]
    fn test_policy_validate_ok() {
        let mut policy = MaintenancePolicy::with_interval(Duration::from_secs(60));
        assert!(policy.validate().is_ok());

        policy.warn_after = Some(Duration::from_secs(120));
        policy.error_after = Some(Duration::from_secs(240));
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_policy_serde_defaults() {
        let json = r#"{"interval":{"secs":60,"nanos":0}}"#;
        let policy: MaintenancePolicy = serde_json::from_str(json).unwrap();
        assert_eq!(policy.interval, Duration::from_secs(60));
        assert_eq!(policy.priority, JobPriority::Low);
        assert_eq!(policy.parallelism, MaintenanceParallelism::Serial);
        assert_eq!(policy.warn_after, None);
    }
}
