//! View synchronizer
//!
//! Owns the stats cache, the session's pricing table, and the selected
//! provider, and keeps every dashboard view consistent with them.
//!
//! ```text
//! Idle --run--> Running --ack--> Fetching --all three ok--> Rendered
//!   ^              |                 |
//!   +--rejected----+                 +--any failure--> previous state
//! ```
//!
//! Each fetch cycle takes the next [`Generation`]. A cycle that completes
//! after a newer one was issued is discarded without touching the cache or
//! the views. Every trigger returns a [`SyncOutcome`] and hands the same
//! outcome to the presenter.

use crate::stats_cache::StatsCache;
use simdash_core::api::SimulationApi;
use simdash_core::error::{Result, SimdashError};
use simdash_core::presenter::{Presenter, SyncOutcome, View, ViewIssue};
use simdash_core::types::{
    DatacenterStat, Generation, ProviderId, ProviderRate, RunParams, SummarySnapshot,
};
use simdash_core::work_unit::{WorkUnit, normalize_records};
use simdash_pricing::{
    CatalogStatus, LoadedPricing, PricingFetcher, PricingTable, RateSource, estimate_for_provider,
};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

const BYTES_PER_MIB: f64 = 1_048_576.0;

/// Where the synchronizer is in its run/fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Running,
    Fetching,
    Rendered,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Fetching => write!(f, "fetching"),
            Self::Rendered => write!(f, "rendered"),
        }
    }
}

/// Coordinates fetching, caching, estimation, and rendering
pub struct ViewSynchronizer<A, P> {
    api: Arc<A>,
    presenter: Arc<P>,
    fetcher: PricingFetcher,
    cache: RwLock<StatsCache>,
    pricing: RwLock<PricingTable>,
    provider: RwLock<ProviderId>,
    state: RwLock<SyncState>,
    latest_generation: AtomicU64,
}

impl<A, P> ViewSynchronizer<A, P>
where
    A: SimulationApi,
    P: Presenter,
{
    /// Create a synchronizer with an already loaded pricing table
    pub fn new(api: Arc<A>, presenter: Arc<P>, pricing: PricingTable, provider: ProviderId) -> Self {
        Self {
            api,
            presenter,
            fetcher: PricingFetcher::new(false),
            cache: RwLock::new(StatsCache::new()),
            pricing: RwLock::new(pricing),
            provider: RwLock::new(provider),
            state: RwLock::new(SyncState::Idle),
            latest_generation: AtomicU64::new(0),
        }
    }

    /// Use `fetcher` for later pricing reloads
    pub fn with_pricing_fetcher(mut self, fetcher: PricingFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Startup sequence: load pricing, then fetch without running
    pub async fn start(&self) -> SyncOutcome {
        if let Err(e) = self.load_pricing().await {
            let outcome = SyncOutcome::Failed {
                reason: e.to_string(),
            };
            self.presenter.report(&outcome);
            return outcome;
        }
        self.refresh().await
    }

    /// Trigger a simulation run, then refresh every view
    ///
    /// A failed or rejected run skips the stats fetch entirely.
    pub async fn run_simulation(&self, params: RunParams) -> SyncOutcome {
        self.set_state(SyncState::Running).await;
        self.presenter.set_run_enabled(false);

        info!(
            "Running simulation: {} datacenters, {} hosts each, {} VMs, {} cloudlets",
            params.datacenters, params.hosts_per_datacenter, params.vms, params.cloudlets
        );

        let acknowledged = self.api.run_simulation(&params).await.and_then(|ack| {
            if ack.accepted {
                Ok(ack)
            } else {
                Err(SimdashError::RunRejected)
            }
        });
        let ack = match acknowledged {
            Ok(ack) => ack,
            Err(e) => return self.run_failed(e).await,
        };
        debug!("Run accepted: {:?}", ack.run_id);

        let outcome = self.refresh().await;
        self.presenter.set_run_enabled(true);
        outcome
    }

    async fn run_failed(&self, e: SimdashError) -> SyncOutcome {
        error!("Error running simulation: {}", e);
        self.presenter.set_run_enabled(true);
        self.set_state(SyncState::Idle).await;

        let outcome = SyncOutcome::Failed {
            reason: e.to_string(),
        };
        self.presenter.report(&outcome);
        outcome
    }

    /// Fetch all statistics and redraw every view
    ///
    /// The three requests run concurrently and fail fast: if any of them
    /// fails, neither the cache nor any view is touched.
    pub async fn refresh(&self) -> SyncOutcome {
        let generation = self.issue_generation();
        self.set_state(SyncState::Fetching).await;
        debug!("Fetch cycle {} started", generation);

        let fetched = tokio::try_join!(
            self.api.datacenter_stats(),
            self.api.work_unit_stats(),
            self.api.summary(),
        );

        let mut cache = self.cache.write().await;

        let latest = self.latest_generation();
        if generation < latest {
            info!("Discarding fetch cycle {}, superseded by {}", generation, latest);
            let outcome = SyncOutcome::Discarded { generation, latest };
            self.presenter.report(&outcome);
            return outcome;
        }

        let (datacenters, records, snapshot) = match fetched {
            Ok(results) => results,
            Err(e) => {
                error!("Error loading data: {}", e);
                let previous = if cache.is_populated() {
                    SyncState::Rendered
                } else {
                    SyncState::Idle
                };
                self.set_state(previous).await;

                let outcome = SyncOutcome::Failed {
                    reason: e.to_string(),
                };
                self.presenter.report(&outcome);
                return outcome;
            }
        };

        let work_units = normalize_records(&records);
        cache.replace(generation, datacenters, work_units);

        let mut issues = Vec::new();
        if let Err(e) = self.draw_summary(&snapshot) {
            error!("{}", e);
            issues.push(ViewIssue::new(View::Summary, e.to_string()));
        }
        self.draw_resource_view(cache.datacenters());
        self.draw_execution_view(cache.work_units());
        self.presenter.populate_datacenter_table(cache.datacenters());
        self.presenter.populate_work_unit_table(cache.work_units());
        // Cost depends on the freshly replaced work units
        if let Err(e) = self.draw_cost_view(cache.work_units()).await {
            warn!("Cost view not updated: {}", e);
            issues.push(ViewIssue::new(View::Cost, e.to_string()));
        }
        drop(cache);

        self.set_state(SyncState::Rendered).await;

        let outcome = if issues.is_empty() {
            SyncOutcome::Updated { generation }
        } else {
            SyncOutcome::Partial { generation, issues }
        };
        self.presenter.report(&outcome);
        outcome
    }

    /// Switch the priced provider and redraw only the cost view
    ///
    /// An unknown provider leaves both the selection and the cost view as
    /// they were.
    pub async fn select_provider(&self, provider: ProviderId) -> SyncOutcome {
        if let Err(e) = self.pricing.read().await.resolve(&provider) {
            warn!("Provider not changed: {}", e);
            let outcome = SyncOutcome::Failed {
                reason: e.to_string(),
            };
            self.presenter.report(&outcome);
            return outcome;
        }

        info!("Selected provider: {}", provider);
        *self.provider.write().await = provider;
        self.redraw_cost().await
    }

    /// Recompute the cost view from cached statistics, without refetching
    pub async fn redraw_cost(&self) -> SyncOutcome {
        let cache = self.cache.read().await;
        let generation = cache.generation().unwrap_or_default();

        let outcome = match self.draw_cost_view(cache.work_units()).await {
            Ok(()) => SyncOutcome::Updated { generation },
            Err(e) => {
                warn!("Cost view not updated: {}", e);
                SyncOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };
        drop(cache);

        self.presenter.report(&outcome);
        outcome
    }

    /// Refetch the pricing catalog and redraw the cost view
    ///
    /// If the catalog cannot be fetched the current rates stay in place and
    /// the cost view is left as it was.
    pub async fn reload_pricing(&self) -> SyncOutcome {
        let outcome = match self.fetcher.load(self.api.as_ref()).await {
            Ok(LoadedPricing {
                catalog: CatalogStatus::Unavailable(reason),
                ..
            }) => {
                warn!("Pricing reload failed, keeping current rates: {}", reason);
                let generation = self.cache.read().await.generation().unwrap_or_default();
                SyncOutcome::Partial {
                    generation,
                    issues: vec![ViewIssue::new(
                        View::Cost,
                        format!("pricing catalog unavailable: {reason}"),
                    )],
                }
            }
            Ok(loaded) => {
                *self.pricing.write().await = loaded.table;
                return self.redraw_cost().await;
            }
            Err(e) => {
                error!("Pricing reload failed: {}", e);
                SyncOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };
        self.presenter.report(&outcome);
        outcome
    }

    /// Current position in the run/fetch cycle
    pub async fn state(&self) -> SyncState {
        *self.state.read().await
    }

    /// Currently selected provider
    pub async fn selected_provider(&self) -> ProviderId {
        self.provider.read().await.clone()
    }

    /// Copy of the cached statistics
    pub async fn stats(&self) -> StatsCache {
        self.cache.read().await.clone()
    }

    /// Every resolvable rate with its source
    pub async fn pricing_entries(&self) -> Vec<(ProviderId, ProviderRate, RateSource)> {
        self.pricing.read().await.entries()
    }

    /// Newest generation issued so far
    pub fn latest_generation(&self) -> Generation {
        Generation::new(self.latest_generation.load(Ordering::SeqCst))
    }

    fn issue_generation(&self) -> Generation {
        Generation::new(self.latest_generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Load the session's rates without touching any view
    ///
    /// An unreachable catalog leaves the embedded defaults in place.
    pub async fn load_pricing(&self) -> Result<()> {
        let loaded = self.fetcher.load(self.api.as_ref()).await?;
        *self.pricing.write().await = loaded.table;
        Ok(())
    }

    async fn set_state(&self, state: SyncState) {
        *self.state.write().await = state;
    }

    fn draw_resource_view(&self, datacenters: &[DatacenterStat]) {
        let labels: Vec<String> = datacenters
            .iter()
            .map(|dc| format!("Datacenter {}", dc.id))
            .collect();
        let pes: Vec<f64> = datacenters.iter().map(|dc| dc.total_pes as f64).collect();
        let ram_gb: Vec<f64> = datacenters
            .iter()
            .map(|dc| dc.total_ram as f64 / BYTES_PER_MIB)
            .collect();
        self.presenter.render_resource_view(&labels, &pes, &ram_gb);
    }

    fn draw_execution_view(&self, units: &[WorkUnit]) {
        let exec_times: Vec<Option<f64>> =
            units.iter().map(|u| u.execution_time.value()).collect();
        self.presenter
            .render_execution_view(&work_unit_labels(units), &exec_times);
    }

    async fn draw_cost_view(&self, units: &[WorkUnit]) -> Result<()> {
        let provider = self.provider.read().await.clone();
        let costs = estimate_for_provider(&*self.pricing.read().await, &provider, units)?;
        self.presenter
            .render_cost_view(&provider, &work_unit_labels(units), &costs);
        Ok(())
    }

    fn draw_summary(&self, snapshot: &SummarySnapshot) -> Result<()> {
        let summary = snapshot.validate()?;
        self.presenter.render_summary(&summary);
        Ok(())
    }
}

fn work_unit_labels(units: &[WorkUnit]) -> Vec<String> {
    units.iter().map(|u| format!("Cloudlet {}", u.id)).collect()
}
