//! Common test utilities for simdash tests
//!
//! Provides a scriptable in-memory [`SimulationApi`], a [`Presenter`] that
//! records every call, and builders for backend payloads.

#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::json;
use simdash::synchronizer::ViewSynchronizer;
use simdash_core::{
    api::SimulationApi,
    error::{Result, SimdashError},
    presenter::{Presenter, SyncOutcome},
    types::{
        CatalogEntry, CostEstimate, DatacenterStat, ProviderId, RunAck, RunParams, Summary,
        SummarySnapshot, VmStat,
    },
    work_unit::{WorkUnit, WorkUnitRecord},
};
use simdash_pricing::{PricingTable, default_rates};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// Global mutex to serialize environment variable modifications in tests
pub static ENV_MUTEX: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

/// Which backend call should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Run,
    Datacenters,
    WorkUnits,
    Summary,
    Catalog,
}

fn unavailable(endpoint: &str) -> SimdashError {
    SimdashError::HttpStatus {
        endpoint: endpoint.to_string(),
        status: 503,
    }
}

/// Mutable payloads served by [`StubApi`]
#[derive(Debug, Clone)]
pub struct StubData {
    pub ack: RunAck,
    pub datacenters: Vec<DatacenterStat>,
    pub work_units: Vec<WorkUnitRecord>,
    pub summary: SummarySnapshot,
    pub vms: Vec<VmStat>,
    pub catalog: Vec<CatalogEntry>,
    pub failing: Vec<Endpoint>,
}

impl Default for StubData {
    fn default() -> Self {
        Self {
            ack: RunAck {
                accepted: true,
                run_id: None,
            },
            datacenters: vec![datacenter(1, 8, 2 << 30), datacenter(2, 4, 1 << 30)],
            work_units: vec![
                record(json!({"id": 1, "pes": 2, "ramGb": 4, "executionTime": 3600})),
                record(json!({"id": 2, "pes": 4, "ram": 2, "execTime": 1800})),
            ],
            summary: complete_summary(),
            vms: Vec::new(),
            catalog: Vec::new(),
            failing: Vec::new(),
        }
    }
}

/// In-memory backend
///
/// The datacenter request of the `gated_call`-th fetch (0-based) waits until
/// [`StubApi::release`] is called, which lets tests finish a newer fetch
/// cycle before an older one.
#[derive(Default)]
pub struct StubApi {
    pub data: Mutex<StubData>,
    pub run_calls: Mutex<Vec<RunParams>>,
    pub datacenter_calls: AtomicUsize,
    pub catalog_calls: AtomicUsize,
    gated_call: Mutex<Option<usize>>,
    gate: Notify,
    gate_entered: Notify,
}

impl StubApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: StubData) -> Self {
        Self {
            data: Mutex::new(data),
            ..Self::default()
        }
    }

    /// Make `endpoint` fail until [`StubApi::heal`] is called
    pub fn fail(&self, endpoint: Endpoint) {
        self.data.lock().unwrap().failing.push(endpoint);
    }

    pub fn heal(&self) {
        self.data.lock().unwrap().failing.clear();
    }

    pub fn update(&self, change: impl FnOnce(&mut StubData)) {
        change(&mut self.data.lock().unwrap());
    }

    /// Hold the datacenter request of fetch number `call`
    pub fn gate_fetch(&self, call: usize) {
        *self.gated_call.lock().unwrap() = Some(call);
    }

    /// Wait until the gated fetch is parked
    pub async fn gate_reached(&self) {
        self.gate_entered.notified().await;
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    fn failing(&self, endpoint: Endpoint) -> bool {
        self.data.lock().unwrap().failing.contains(&endpoint)
    }
}

#[async_trait]
impl SimulationApi for StubApi {
    async fn run_simulation(&self, params: &RunParams) -> Result<RunAck> {
        self.run_calls.lock().unwrap().push(*params);
        if self.failing(Endpoint::Run) {
            return Err(unavailable("run"));
        }
        Ok(self.data.lock().unwrap().ack.clone())
    }

    async fn datacenter_stats(&self) -> Result<Vec<DatacenterStat>> {
        let call = self.datacenter_calls.fetch_add(1, Ordering::SeqCst);
        // Snapshot before parking so the gated cycle returns the old payload
        let snapshot = self.data.lock().unwrap().clone();

        let gated = *self.gated_call.lock().unwrap() == Some(call);
        if gated {
            self.gate_entered.notify_one();
            self.gate.notified().await;
        }

        if snapshot.failing.contains(&Endpoint::Datacenters) {
            return Err(unavailable("datacenter-stats"));
        }
        Ok(snapshot.datacenters)
    }

    async fn work_unit_stats(&self) -> Result<Vec<WorkUnitRecord>> {
        if self.failing(Endpoint::WorkUnits) {
            return Err(unavailable("cloudlet-stats"));
        }
        Ok(self.data.lock().unwrap().work_units.clone())
    }

    async fn summary(&self) -> Result<SummarySnapshot> {
        if self.failing(Endpoint::Summary) {
            return Err(unavailable("summary"));
        }
        Ok(self.data.lock().unwrap().summary.clone())
    }

    async fn vm_stats(&self) -> Result<Vec<VmStat>> {
        Ok(self.data.lock().unwrap().vms.clone())
    }

    async fn pricing_catalog(&self) -> Result<Vec<CatalogEntry>> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing(Endpoint::Catalog) {
            return Err(unavailable("pricing"));
        }
        Ok(self.data.lock().unwrap().catalog.clone())
    }
}

/// One presenter call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    RunEnabled(bool),
    Summary(Summary),
    Resource {
        labels: Vec<String>,
        pes: Vec<f64>,
        ram_gb: Vec<f64>,
    },
    Execution {
        labels: Vec<String>,
        exec_times: Vec<Option<f64>>,
    },
    Cost {
        provider: ProviderId,
        labels: Vec<String>,
        costs: Vec<CostEstimate>,
    },
    DatacenterTable(Vec<DatacenterStat>),
    WorkUnitTable(Vec<WorkUnit>),
    Report(SyncOutcome),
}

impl Call {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RunEnabled(_) => "run_enabled",
            Self::Summary(_) => "summary",
            Self::Resource { .. } => "resource",
            Self::Execution { .. } => "execution",
            Self::Cost { .. } => "cost",
            Self::DatacenterTable(_) => "datacenter_table",
            Self::WorkUnitTable(_) => "work_unit_table",
            Self::Report(_) => "report",
        }
    }
}

/// Presenter that records every call in order
#[derive(Default)]
pub struct RecordingPresenter {
    calls: Mutex<Vec<Call>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.calls().iter().map(Call::name).collect()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Cost redraws in call order
    pub fn cost_views(&self) -> Vec<(ProviderId, Vec<String>, Vec<CostEstimate>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Cost {
                    provider,
                    labels,
                    costs,
                } => Some((provider, labels, costs)),
                _ => None,
            })
            .collect()
    }

    pub fn reports(&self) -> Vec<SyncOutcome> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Report(outcome) => Some(outcome),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Presenter for RecordingPresenter {
    fn set_run_enabled(&self, enabled: bool) {
        self.push(Call::RunEnabled(enabled));
    }

    fn render_summary(&self, summary: &Summary) {
        self.push(Call::Summary(summary.clone()));
    }

    fn render_resource_view(&self, labels: &[String], pes: &[f64], ram_gb: &[f64]) {
        self.push(Call::Resource {
            labels: labels.to_vec(),
            pes: pes.to_vec(),
            ram_gb: ram_gb.to_vec(),
        });
    }

    fn render_execution_view(&self, labels: &[String], exec_times: &[Option<f64>]) {
        self.push(Call::Execution {
            labels: labels.to_vec(),
            exec_times: exec_times.to_vec(),
        });
    }

    fn render_cost_view(&self, provider: &ProviderId, labels: &[String], costs: &[CostEstimate]) {
        self.push(Call::Cost {
            provider: provider.clone(),
            labels: labels.to_vec(),
            costs: costs.to_vec(),
        });
    }

    fn populate_datacenter_table(&self, rows: &[DatacenterStat]) {
        self.push(Call::DatacenterTable(rows.to_vec()));
    }

    fn populate_work_unit_table(&self, rows: &[WorkUnit]) {
        self.push(Call::WorkUnitTable(rows.to_vec()));
    }

    fn report(&self, outcome: &SyncOutcome) {
        self.push(Call::Report(outcome.clone()));
    }
}

pub type TestSynchronizer = ViewSynchronizer<StubApi, RecordingPresenter>;

/// Synchronizer over `api` with default rates, pricing for aws
pub fn synchronizer(api: StubApi) -> (Arc<TestSynchronizer>, Arc<StubApi>, Arc<RecordingPresenter>) {
    let api = Arc::new(api);
    let presenter = Arc::new(RecordingPresenter::new());
    let pricing = PricingTable::new(default_rates().unwrap());
    let synchronizer = ViewSynchronizer::new(
        Arc::clone(&api),
        Arc::clone(&presenter),
        pricing,
        ProviderId::new("aws"),
    );
    (Arc::new(synchronizer), api, presenter)
}

pub fn datacenter(id: u64, total_pes: u64, total_ram: u64) -> DatacenterStat {
    DatacenterStat {
        id,
        num_hosts: 5,
        total_pes,
        total_ram,
        total_storage: 1 << 40,
        total_bandwidth: 10 << 20,
    }
}

/// Decode a work-unit record the way it arrives on the wire
pub fn record(value: serde_json::Value) -> WorkUnitRecord {
    serde_json::from_value(value).unwrap()
}

pub fn complete_summary() -> SummarySnapshot {
    serde_json::from_value(json!({
        "numDatacenters": 2,
        "numHosts": 10,
        "numVms": 15,
        "totalCloudlets": 2,
        "completedCloudlets": 2,
        "avgExecutionTime": 2700.0,
        "avgWaitTime": 0.2
    }))
    .unwrap()
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
