//! Presentation contracts
//!
//! The view synchronizer pushes fully computed sequences through the
//! `Presenter` trait. Implementations only round currency and convert units
//! for display; they never recompute anything.
//!
//! Every trigger also yields a [`SyncOutcome`], handed to
//! [`Presenter::report`] so a presenter can mark views as stale instead of
//! relying on log output.

use crate::types::{CostEstimate, DatacenterStat, Generation, ProviderId, Summary};
use crate::work_unit::WorkUnit;
use serde::Serialize;
use std::fmt;

/// The independently refreshed projections of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Summary,
    Resource,
    Execution,
    Cost,
    DatacenterTable,
    WorkUnitTable,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Summary => "summary",
            Self::Resource => "resource chart",
            Self::Execution => "execution chart",
            Self::Cost => "cost chart",
            Self::DatacenterTable => "datacenter table",
            Self::WorkUnitTable => "cloudlet table",
        };
        write!(f, "{name}")
    }
}

/// Why one view kept its previous contents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewIssue {
    pub view: View,
    pub reason: String,
}

impl ViewIssue {
    pub fn new(view: View, reason: impl Into<String>) -> Self {
        Self {
            view,
            reason: reason.into(),
        }
    }
}

/// Result of one synchronizer trigger
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Every affected view shows data from `generation`
    Updated { generation: Generation },
    /// Caches hold `generation`, but some views kept older contents
    Partial {
        generation: Generation,
        issues: Vec<ViewIssue>,
    },
    /// A newer cycle was issued while this one was in flight
    Discarded {
        generation: Generation,
        latest: Generation,
    },
    /// Nothing was updated
    Failed { reason: String },
}

impl SyncOutcome {
    /// Whether any view may now be showing older data than requested
    pub fn is_stale(&self) -> bool {
        !matches!(self, Self::Updated { .. })
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Updated { generation } => write!(f, "up to date ({generation})"),
            Self::Partial { generation, issues } => {
                let views: Vec<String> = issues.iter().map(|i| i.view.to_string()).collect();
                write!(
                    f,
                    "partially updated ({generation}); stale: {}",
                    views.join(", ")
                )
            }
            Self::Discarded { generation, latest } => {
                write!(f, "result {generation} discarded, superseded by {latest}")
            }
            Self::Failed { reason } => write!(f, "update failed: {reason}"),
        }
    }
}

/// Sink for everything the dashboard displays
///
/// Methods take `&self`; implementations hold their own interior state so a
/// single presenter can be shared by concurrently running triggers.
pub trait Presenter: Send + Sync {
    /// Enable or disable the run control while a run is in flight
    fn set_run_enabled(&self, enabled: bool);

    /// Show a validated summary
    fn render_summary(&self, summary: &Summary);

    /// Resource chart: processing elements and RAM per datacenter
    fn render_resource_view(&self, labels: &[String], pes: &[f64], ram_gb: &[f64]);

    /// Execution chart: execution time per cloudlet, `None` when unreadable
    fn render_execution_view(&self, labels: &[String], exec_times: &[Option<f64>]);

    /// Cost chart for the selected provider
    fn render_cost_view(&self, provider: &ProviderId, labels: &[String], costs: &[CostEstimate]);

    /// Datacenter table rows
    fn populate_datacenter_table(&self, rows: &[DatacenterStat]);

    /// Cloudlet table rows
    fn populate_work_unit_table(&self, rows: &[WorkUnit]);

    /// Outcome of the trigger that just finished
    fn report(&self, outcome: &SyncOutcome);
}
