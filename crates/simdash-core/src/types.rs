//! Core domain types for simdash
//!
//! Wire shapes for everything the simulation backend serves (datacenter and
//! VM stats, summaries, run acknowledgements, pricing catalog rows) plus the
//! strongly-typed identifiers the rest of the workspace passes around.
//! All wire types use the backend's camelCase field names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Time unit every catalog rate is normalized to, in seconds
pub const HOURLY_TIME_UNIT_SECS: u32 = 3600;

/// Strongly-typed cloud provider identifier
///
/// Provider ids are compared case-sensitively, matching the keys the
/// pricing catalog uses.
///
/// # Examples
/// ```
/// use simdash_core::types::ProviderId;
///
/// let provider = ProviderId::new("aws");
/// assert_eq!(provider.as_str(), "aws");
/// assert_eq!(provider.to_string(), "aws");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    /// Create a new ProviderId from any string-like type
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Per-unit cost structure for one provider
///
/// Costs are expressed per processing element and per GB of memory for one
/// `time_unit` of wall-clock execution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRate {
    /// Cost per processing element per time unit
    pub pe_cost: f64,
    /// Cost per GB of RAM per time unit
    pub ram_cost: f64,
    /// Length of the billing time unit in seconds, always positive
    pub time_unit: u32,
}

impl ProviderRate {
    /// Create a rate billed per hour
    ///
    /// # Examples
    /// ```
    /// use simdash_core::types::ProviderRate;
    ///
    /// let rate = ProviderRate::hourly(0.05, 0.01);
    /// assert_eq!(rate.time_unit, 3600);
    /// ```
    pub fn hourly(pe_cost: f64, ram_cost: f64) -> Self {
        Self {
            pe_cost,
            ram_cost,
            time_unit: HOURLY_TIME_UNIT_SECS,
        }
    }
}

/// Estimated cost of one work unit
///
/// `Unpriceable` marks a record whose cost inputs could not be read; it is
/// never folded into a zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CostEstimate {
    Priced(f64),
    Unpriceable,
}

impl CostEstimate {
    /// Amount in currency units, if priced
    pub fn amount(&self) -> Option<f64> {
        match self {
            Self::Priced(amount) => Some(*amount),
            Self::Unpriceable => None,
        }
    }
}

/// One row of the pricing catalog served by the backend
///
/// The catalog carries no time unit; rates are hourly by convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub provider: ProviderId,
    pub pe_cost: f64,
    pub ram_cost: f64,
}

/// Size parameters for a simulation run
///
/// Values are forwarded verbatim; the backend owns validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunParams {
    pub datacenters: u32,
    pub hosts_per_datacenter: u32,
    pub vms: u32,
    pub cloudlets: u32,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            datacenters: 3,
            hosts_per_datacenter: 5,
            vms: 15,
            cloudlets: 30,
        }
    }
}

/// Backend-assigned run identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunId {
    Number(u64),
    Text(String),
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Acknowledgement returned by the run endpoint
///
/// Backends that predate the `accepted` flag return the full run result
/// instead; a successful response without the flag counts as accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAck {
    #[serde(default = "accepted_by_default")]
    pub accepted: bool,
    #[serde(default)]
    pub run_id: Option<RunId>,
}

fn accepted_by_default() -> bool {
    true
}

/// Aggregate resources of one simulated datacenter
///
/// RAM and storage are in bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatacenterStat {
    pub id: u64,
    pub num_hosts: u64,
    pub total_pes: u64,
    pub total_ram: u64,
    pub total_storage: u64,
    pub total_bandwidth: u64,
}

/// Placement and capacity of one simulated VM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmStat {
    pub id: u64,
    pub host_id: u64,
    pub datacenter_id: u64,
    pub pes: u64,
    pub mips: f64,
    pub ram: u64,
    pub storage: u64,
    pub bandwidth: u64,
}

/// Summary payload as served, with every field optional
///
/// Use [`SummarySnapshot::validate`] to obtain a [`Summary`] that is safe
/// to render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummarySnapshot {
    pub num_datacenters: Option<u64>,
    pub num_hosts: Option<u64>,
    pub num_vms: Option<u64>,
    pub total_cloudlets: Option<u64>,
    pub completed_cloudlets: Option<u64>,
    pub avg_execution_time: Option<f64>,
    pub avg_wait_time: Option<f64>,
}

/// A summary with every field present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub num_datacenters: u64,
    pub num_hosts: u64,
    pub num_vms: u64,
    pub total_cloudlets: u64,
    pub completed_cloudlets: u64,
    pub avg_execution_time: f64,
    pub avg_wait_time: f64,
}

impl SummarySnapshot {
    /// Check that every field is present
    ///
    /// Returns the names of the missing fields (wire spelling) in the error
    /// so the rejection can be logged precisely.
    ///
    /// # Examples
    /// ```
    /// use simdash_core::types::SummarySnapshot;
    ///
    /// let partial = SummarySnapshot {
    ///     num_datacenters: Some(3),
    ///     ..Default::default()
    /// };
    /// assert!(partial.validate().is_err());
    /// ```
    pub fn validate(&self) -> crate::Result<Summary> {
        let mut missing = Vec::new();
        if self.num_datacenters.is_none() {
            missing.push("numDatacenters");
        }
        if self.num_hosts.is_none() {
            missing.push("numHosts");
        }
        if self.num_vms.is_none() {
            missing.push("numVms");
        }
        if self.total_cloudlets.is_none() {
            missing.push("totalCloudlets");
        }
        if self.completed_cloudlets.is_none() {
            missing.push("completedCloudlets");
        }
        if self.avg_execution_time.is_none() {
            missing.push("avgExecutionTime");
        }
        if self.avg_wait_time.is_none() {
            missing.push("avgWaitTime");
        }

        match (
            self.num_datacenters,
            self.num_hosts,
            self.num_vms,
            self.total_cloudlets,
            self.completed_cloudlets,
            self.avg_execution_time,
            self.avg_wait_time,
        ) {
            (
                Some(num_datacenters),
                Some(num_hosts),
                Some(num_vms),
                Some(total_cloudlets),
                Some(completed_cloudlets),
                Some(avg_execution_time),
                Some(avg_wait_time),
            ) => Ok(Summary {
                num_datacenters,
                num_hosts,
                num_vms,
                total_cloudlets,
                completed_cloudlets,
                avg_execution_time,
                avg_wait_time,
            }),
            _ => Err(crate::SimdashError::IncompleteSummary(missing.join(", "))),
        }
    }
}

/// Monotonically increasing fetch-cycle marker
///
/// Every fetch cycle takes the next generation; results carrying an older
/// generation than the latest issued one are discarded.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    /// Create a generation from its raw counter value
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw counter value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datacenter_stat_wire_names() {
        let json = r#"{"id":1,"numHosts":5,"totalPes":40,"totalRam":2097152,
            "totalStorage":1073741824,"totalBandwidth":1048576}"#;
        let stat: DatacenterStat = serde_json::from_str(json).unwrap();
        assert_eq!(stat.num_hosts, 5);
        assert_eq!(stat.total_ram, 2_097_152);
    }

    #[test]
    fn test_summary_missing_avg_execution_time() {
        let json = r#"{"numDatacenters":3,"numHosts":15,"numVms":15,
            "totalCloudlets":30,"completedCloudlets":30,"avgWaitTime":0.5}"#;
        let snapshot: SummarySnapshot = serde_json::from_str(json).unwrap();
        let err = snapshot.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Summary data is incomplete: missing avgExecutionTime"
        );
    }

    #[test]
    fn test_summary_complete() {
        let json = r#"{"numDatacenters":3,"numHosts":15,"numVms":15,
            "totalCloudlets":30,"completedCloudlets":28,
            "avgExecutionTime":12.5,"avgWaitTime":0.5}"#;
        let snapshot: SummarySnapshot = serde_json::from_str(json).unwrap();
        let summary = snapshot.validate().unwrap();
        assert_eq!(summary.completed_cloudlets, 28);
        assert_eq!(summary.avg_execution_time, 12.5);
    }

    #[test]
    fn test_run_ack_defaults_to_accepted() {
        // Older backends answer with the whole run result
        let ack: RunAck = serde_json::from_str(r#"{"datacenterStats":[]}"#).unwrap();
        assert!(ack.accepted);
        assert!(ack.run_id.is_none());

        let ack: RunAck = serde_json::from_str(r#"{"accepted":false,"runId":7}"#).unwrap();
        assert!(!ack.accepted);
        assert_eq!(ack.run_id, Some(RunId::Number(7)));
    }

    #[test]
    fn test_catalog_entry_wire_names() {
        let entry: CatalogEntry =
            serde_json::from_str(r#"{"provider":"aws","peCost":0.09,"ramCost":0.02}"#).unwrap();
        assert_eq!(entry.provider, ProviderId::new("aws"));
        assert_eq!(entry.pe_cost, 0.09);
    }

    #[test]
    fn test_generation_ordering() {
        assert!(Generation::new(2) > Generation::new(1));
        assert_eq!(Generation::default().value(), 0);
        assert_eq!(Generation::new(4).to_string(), "#4");
    }

    #[test]
    fn test_cost_estimate_serializes_unpriceable_as_null() {
        let costs = vec![CostEstimate::Priced(0.14), CostEstimate::Unpriceable];
        assert_eq!(serde_json::to_string(&costs).unwrap(), "[0.14,null]");
        assert_eq!(costs[1].amount(), None);
    }

    #[test]
    fn test_run_params_defaults() {
        let params = RunParams::default();
        assert_eq!(params.datacenters, 3);
        assert_eq!(params.hosts_per_datacenter, 5);
        assert_eq!(params.vms, 15);
        assert_eq!(params.cloudlets, 30);
    }
}
