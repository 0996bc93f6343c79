//! Pricing table and cost estimation for simdash
//!
//! This crate holds the provider rate table (embedded defaults merged with
//! the backend's catalog) and the pure cost estimator that prices
//! work units against a resolved rate.

pub mod cost_estimator;
pub mod pricing_fetcher;
pub mod pricing_table;

pub use cost_estimator::{estimate_cost, estimate_costs, estimate_for_provider};
pub use pricing_fetcher::{CatalogStatus, LoadedPricing, PricingFetcher};
pub use pricing_table::{PricingTable, RateMap, RateSource, default_rates, merge_rates};
