//! Simulation backend trait
//!
//! This module defines the `SimulationApi` trait the view synchronizer
//! consumes. The HTTP client in `simdash-http` implements it against the
//! real backend; tests implement it with canned payloads.

use crate::error::Result;
use crate::types::{
    CatalogEntry, DatacenterStat, RunAck, RunParams, SummarySnapshot, VmStat,
};
use crate::work_unit::WorkUnitRecord;
use async_trait::async_trait;

/// Read API of the simulation backend plus its run trigger
///
/// Every method maps a transport problem (connection failure, non-success
/// status, undecodable body) to an `Err`; callers decide how to degrade.
#[async_trait]
pub trait SimulationApi: Send + Sync {
    /// Start a simulation with the given sizes
    async fn run_simulation(&self, params: &RunParams) -> Result<RunAck>;

    /// Per-datacenter resource totals of the last run
    async fn datacenter_stats(&self) -> Result<Vec<DatacenterStat>>;

    /// Per-cloudlet execution records of the last run
    async fn work_unit_stats(&self) -> Result<Vec<WorkUnitRecord>>;

    /// Aggregate summary of the last run
    async fn summary(&self) -> Result<SummarySnapshot>;

    /// Per-VM placement of the last run
    async fn vm_stats(&self) -> Result<Vec<VmStat>>;

    /// Provider pricing catalog
    async fn pricing_catalog(&self) -> Result<Vec<CatalogEntry>>;
}
