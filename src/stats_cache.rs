//! Last successfully fetched statistics

use simdash_core::types::{DatacenterStat, Generation};
use simdash_core::work_unit::WorkUnit;

/// Datacenter and work-unit statistics from the newest completed fetch
///
/// Contents are only ever replaced as a whole; a failed fetch leaves the
/// previous contents untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsCache {
    datacenters: Vec<DatacenterStat>,
    work_units: Vec<WorkUnit>,
    generation: Option<Generation>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in the results of fetch cycle `generation`
    pub fn replace(
        &mut self,
        generation: Generation,
        datacenters: Vec<DatacenterStat>,
        work_units: Vec<WorkUnit>,
    ) {
        self.datacenters = datacenters;
        self.work_units = work_units;
        self.generation = Some(generation);
    }

    pub fn datacenters(&self) -> &[DatacenterStat] {
        &self.datacenters
    }

    pub fn work_units(&self) -> &[WorkUnit] {
        &self.work_units
    }

    /// Generation of the cached data, `None` before the first fetch
    pub fn generation(&self) -> Option<Generation> {
        self.generation
    }

    pub fn is_populated(&self) -> bool {
        self.generation.is_some()
    }
}
