//! Core types, traits, and utilities for simdash
//!
//! This crate provides the domain types served by the simulation backend,
//! the error type, work-unit normalization, and the two seams the view
//! synchronizer is built around: [`SimulationApi`] for data in and
//! [`Presenter`] for data out.

pub mod api;
pub mod error;
pub mod presenter;
pub mod types;
pub mod work_unit;

// Re-export commonly used types
pub use api::SimulationApi;
pub use error::{Result, SimdashError};
pub use presenter::{Presenter, SyncOutcome, View, ViewIssue};
pub use types::{
    CatalogEntry, CostEstimate, DatacenterStat, Generation, ProviderId, ProviderRate, RunParams,
    Summary, SummarySnapshot,
};
pub use work_unit::{Reading, WorkUnit, WorkUnitRecord};
