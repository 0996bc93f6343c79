//! Dashboard frame
//!
//! [`FramePresenter`] implements the `Presenter` contract by storing each
//! pushed view in a [`DashboardFrame`]. A view that is not pushed keeps its
//! previous contents, which is how a failed or partial update shows up as
//! stale data rather than an empty screen. Formatters render a snapshot of
//! the frame.

use chrono::{DateTime, Local};
use serde::Serialize;
use simdash_core::presenter::{Presenter, SyncOutcome};
use simdash_core::types::{CostEstimate, DatacenterStat, ProviderId, Summary};
use simdash_core::work_unit::WorkUnit;
use std::sync::{Mutex, MutexGuard};
use tracing::trace;

/// Resource chart data
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResourceChart {
    pub labels: Vec<String>,
    pub pes: Vec<f64>,
    pub ram_gb: Vec<f64>,
}

/// Execution-time chart data
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionChart {
    pub labels: Vec<String>,
    pub exec_times: Vec<Option<f64>>,
}

/// Cost chart data for one provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostChart {
    pub provider: ProviderId,
    pub labels: Vec<String>,
    pub costs: Vec<CostEstimate>,
}

/// Everything currently on screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardFrame {
    pub run_enabled: bool,
    pub summary: Option<Summary>,
    pub resource: Option<ResourceChart>,
    pub execution: Option<ExecutionChart>,
    pub cost: Option<CostChart>,
    pub datacenters: Option<Vec<DatacenterStat>>,
    pub work_units: Option<Vec<WorkUnit>>,
    pub last_outcome: Option<SyncOutcome>,
    pub updated_at: Option<DateTime<Local>>,
}

impl Default for DashboardFrame {
    fn default() -> Self {
        Self {
            run_enabled: true,
            summary: None,
            resource: None,
            execution: None,
            cost: None,
            datacenters: None,
            work_units: None,
            last_outcome: None,
            updated_at: None,
        }
    }
}

/// Presenter that records views into a shared frame
#[derive(Debug, Default)]
pub struct FramePresenter {
    frame: Mutex<DashboardFrame>,
}

impl FramePresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current frame
    pub fn snapshot(&self) -> DashboardFrame {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, DashboardFrame> {
        // Fields are replaced whole, so a poisoned frame is still consistent
        self.frame.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Presenter for FramePresenter {
    fn set_run_enabled(&self, enabled: bool) {
        self.lock().run_enabled = enabled;
    }

    fn render_summary(&self, summary: &Summary) {
        self.lock().summary = Some(summary.clone());
    }

    fn render_resource_view(&self, labels: &[String], pes: &[f64], ram_gb: &[f64]) {
        trace!("Resource view: {} datacenters", labels.len());
        self.lock().resource = Some(ResourceChart {
            labels: labels.to_vec(),
            pes: pes.to_vec(),
            ram_gb: ram_gb.to_vec(),
        });
    }

    fn render_execution_view(&self, labels: &[String], exec_times: &[Option<f64>]) {
        trace!("Execution view: {} cloudlets", labels.len());
        self.lock().execution = Some(ExecutionChart {
            labels: labels.to_vec(),
            exec_times: exec_times.to_vec(),
        });
    }

    fn render_cost_view(&self, provider: &ProviderId, labels: &[String], costs: &[CostEstimate]) {
        trace!("Cost view: {} cloudlets priced for {}", labels.len(), provider);
        self.lock().cost = Some(CostChart {
            provider: provider.clone(),
            labels: labels.to_vec(),
            costs: costs.to_vec(),
        });
    }

    fn populate_datacenter_table(&self, rows: &[DatacenterStat]) {
        self.lock().datacenters = Some(rows.to_vec());
    }

    fn populate_work_unit_table(&self, rows: &[WorkUnit]) {
        self.lock().work_units = Some(rows.to_vec());
    }

    fn report(&self, outcome: &SyncOutcome) {
        let mut frame = self.lock();
        frame.last_outcome = Some(outcome.clone());
        frame.updated_at = Some(Local::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simdash_core::types::Generation;

    #[test]
    fn test_views_keep_previous_contents() {
        let presenter = FramePresenter::new();
        let labels = vec!["Datacenter 1".to_string()];
        presenter.render_resource_view(&labels, &[8.0], &[2.0]);
        presenter.report(&SyncOutcome::Updated {
            generation: Generation::new(1),
        });

        // A failed cycle only reports
        presenter.report(&SyncOutcome::Failed {
            reason: "connection refused".to_string(),
        });

        let frame = presenter.snapshot();
        assert_eq!(frame.resource.unwrap().pes, vec![8.0]);
        assert!(frame.last_outcome.unwrap().is_stale());
        assert!(frame.updated_at.is_some());
    }

    #[test]
    fn test_run_toggle() {
        let presenter = FramePresenter::new();
        assert!(presenter.snapshot().run_enabled);
        presenter.set_run_enabled(false);
        assert!(!presenter.snapshot().run_enabled);
    }

    #[test]
    fn test_cost_view_replaced_wholesale() {
        let presenter = FramePresenter::new();
        let labels = vec!["Cloudlet 1".to_string(), "Cloudlet 2".to_string()];
        presenter.render_cost_view(
            &ProviderId::new("aws"),
            &labels,
            &[CostEstimate::Priced(0.14), CostEstimate::Unpriceable],
        );
        presenter.render_cost_view(
            &ProviderId::new("gcp"),
            &labels[..1],
            &[CostEstimate::Priced(0.1)],
        );

        let cost = presenter.snapshot().cost.unwrap();
        assert_eq!(cost.provider.as_str(), "gcp");
        assert_eq!(cost.costs, vec![CostEstimate::Priced(0.1)]);
    }
}
