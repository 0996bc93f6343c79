//! Work-unit records and their normalization
//!
//! The backend reports per-cloudlet execution records whose cost inputs may
//! arrive under alternate field names (`executionTime`/`execTime`,
//! `ramGb`/`ram`) or be missing entirely. [`WorkUnitRecord`] is the wire
//! shape; [`WorkUnitRecord::normalize`] turns it into the canonical
//! [`WorkUnit`] that cost estimation consumes. All fallback rules live here:
//!
//! - the primary name wins, then the alternate name (`null` counts as absent)
//! - a missing execution time or RAM figure reads as `0`
//! - a present but non-numeric value is [`Reading::Unreadable`]
//! - a missing `pes` is [`Reading::Unreadable`]

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::trace;

/// A numeric cost input after normalization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reading {
    /// Usable numeric value
    Value(f64),
    /// The field was present but could not be read as a number
    Unreadable,
}

impl Reading {
    /// Numeric value, if readable
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Unreadable => None,
        }
    }

    /// Resolve `primary ?? alternate ?? 0`
    ///
    /// # Examples
    /// ```
    /// use serde_json::json;
    /// use simdash_core::work_unit::Reading;
    ///
    /// assert_eq!(Reading::first_of(None, Some(&json!(2))), Reading::Value(2.0));
    /// assert_eq!(Reading::first_of(None, None), Reading::Value(0.0));
    /// assert_eq!(Reading::first_of(Some(&json!("n/a")), Some(&json!(2))), Reading::Unreadable);
    /// ```
    pub fn first_of(primary: Option<&Value>, alternate: Option<&Value>) -> Self {
        match primary.or(alternate) {
            Some(value) => Self::from_json(value),
            None => Self::Value(0.0),
        }
    }

    fn from_json(value: &Value) -> Self {
        match value.as_f64() {
            Some(v) if v.is_finite() => Self::Value(v),
            _ => Self::Unreadable,
        }
    }
}

impl Default for Reading {
    fn default() -> Self {
        Self::Value(0.0)
    }
}

/// Completion state reported for a work unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkUnitStatus {
    Success,
    Failed,
    Canceled,
    InExecution,
    Queued,
    /// Any state this client does not know by name
    Other(String),
}

impl From<String> for WorkUnitStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "SUCCESS" => Self::Success,
            "FAILED" => Self::Failed,
            "CANCELED" => Self::Canceled,
            "INEXEC" => Self::InExecution,
            "QUEUED" => Self::Queued,
            _ => Self::Other(raw),
        }
    }
}

impl From<WorkUnitStatus> for String {
    fn from(status: WorkUnitStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for WorkUnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Failed => write!(f, "FAILED"),
            Self::Canceled => write!(f, "CANCELED"),
            Self::InExecution => write!(f, "INEXEC"),
            Self::Queued => write!(f, "QUEUED"),
            Self::Other(raw) => write!(f, "{raw}"),
        }
    }
}

impl Default for WorkUnitStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

/// Work-unit record exactly as the backend serves it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkUnitRecord {
    pub id: u64,
    #[serde(default)]
    pub vm_id: u64,
    #[serde(default)]
    pub datacenter_id: u64,
    #[serde(default)]
    pub pes: Option<Value>,
    #[serde(default)]
    pub length: u64,
    #[serde(default)]
    pub ram_gb: Option<Value>,
    #[serde(default)]
    pub ram: Option<Value>,
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default)]
    pub finish_time: Option<f64>,
    #[serde(default)]
    pub execution_time: Option<Value>,
    #[serde(default)]
    pub exec_time: Option<Value>,
    #[serde(default)]
    pub status: Option<WorkUnitStatus>,
}

/// Canonical work unit, the only shape cost estimation sees
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkUnit {
    pub id: u64,
    pub vm_id: u64,
    pub datacenter_id: u64,
    pub pes: Reading,
    pub length: u64,
    pub ram_gb: Reading,
    pub start_time: f64,
    pub finish_time: f64,
    pub execution_time: Reading,
    pub status: WorkUnitStatus,
}

impl WorkUnitRecord {
    /// Produce the canonical record
    pub fn normalize(&self) -> WorkUnit {
        if self.execution_time.is_none() && self.exec_time.is_some() {
            trace!("Cloudlet {} reports execution time as execTime", self.id);
        }
        if self.ram_gb.is_none() && self.ram.is_some() {
            trace!("Cloudlet {} reports memory as ram", self.id);
        }

        WorkUnit {
            id: self.id,
            vm_id: self.vm_id,
            datacenter_id: self.datacenter_id,
            pes: self
                .pes
                .as_ref()
                .map_or(Reading::Unreadable, Reading::from_json),
            length: self.length,
            ram_gb: Reading::first_of(self.ram_gb.as_ref(), self.ram.as_ref()),
            start_time: self.start_time.unwrap_or_default(),
            finish_time: self.finish_time.unwrap_or_default(),
            execution_time: Reading::first_of(
                self.execution_time.as_ref(),
                self.exec_time.as_ref(),
            ),
            status: self.status.clone().unwrap_or_default(),
        }
    }
}

/// Normalize a whole payload, preserving order
pub fn normalize_records(records: &[WorkUnitRecord]) -> Vec<WorkUnit> {
    records.iter().map(WorkUnitRecord::normalize).collect()
}
