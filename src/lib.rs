//! simdash - Terminal dashboard and cost estimator for cloud simulation runs
//!
//! This library provides functionality to:
//! - Trigger simulation runs on a CloudSim-style backend
//! - Fetch datacenter, cloudlet, and summary statistics concurrently
//! - Price every cloudlet for a selectable provider
//! - Keep summary, charts, and tables consistent through one synchronizer
//! - Run a live dashboard with interactive commands
//!
//! # Examples
//!
//! ```no_run
//! use simdash::synchronizer::ViewSynchronizer;
//! use simdash_core::types::{ProviderId, RunParams};
//! use simdash_http::HttpSimulationApi;
//! use simdash_pricing::{PricingTable, default_rates};
//! use simdash_terminal::FramePresenter;
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> simdash::Result<()> {
//!     let api = Arc::new(HttpSimulationApi::new(
//!         "http://localhost:8080/api/cloudsim".parse().unwrap(),
//!         "http://localhost:8080/pricing".parse().unwrap(),
//!         None,
//!     )?);
//!     let presenter = Arc::new(FramePresenter::new());
//!     let synchronizer = ViewSynchronizer::new(
//!         api,
//!         presenter.clone(),
//!         PricingTable::new(default_rates()?),
//!         ProviderId::new("aws"),
//!     );
//!
//!     synchronizer.start().await;
//!     let outcome = synchronizer.run_simulation(RunParams::default()).await;
//!     println!("{outcome}");
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod live_monitor;
pub mod stats_cache;
pub mod synchronizer;

// Re-export commonly used types
pub use simdash_core::{Result, SimdashError, SyncOutcome};
pub use synchronizer::{SyncState, ViewSynchronizer};

/// Non-zero exit code for a one-shot command whose update failed outright
///
/// Partial and discarded updates still printed a dashboard, so they exit 0.
pub fn exit_code(outcome: &SyncOutcome) -> Option<i32> {
    match outcome {
        SyncOutcome::Failed { .. } => Some(1),
        _ => None,
    }
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
