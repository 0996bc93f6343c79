//! Pricing fetcher for the backend's provider catalog

use crate::pricing_table::{PricingTable, default_rates};
use simdash_core::api::SimulationApi;
use simdash_core::error::Result;
use tracing::{info, warn};

/// Whether the catalog contributed to a loaded table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogStatus {
    /// Catalog fetched and merged, with this many entries
    Fetched(usize),
    /// Offline mode, the catalog was not requested
    Skipped,
    /// The fetch failed; the table holds embedded defaults only
    Unavailable(String),
}

/// A pricing table plus how it was built
#[derive(Debug, Clone)]
pub struct LoadedPricing {
    pub table: PricingTable,
    pub catalog: CatalogStatus,
}

impl LoadedPricing {
    /// True when a catalog fetch was attempted and failed
    pub fn fell_back(&self) -> bool {
        matches!(self.catalog, CatalogStatus::Unavailable(_))
    }
}

/// Loads the session's pricing table
///
/// The catalog is fetched once and merged over the embedded defaults. A
/// failed fetch degrades to the defaults and is reported through
/// [`CatalogStatus::Unavailable`] rather than as an error.
pub struct PricingFetcher {
    /// Whether to skip the catalog and use embedded defaults only
    offline_mode: bool,
}

impl PricingFetcher {
    /// Create a new PricingFetcher
    pub fn new(offline: bool) -> Self {
        Self {
            offline_mode: offline,
        }
    }

    /// Build the pricing table
    ///
    /// # Errors
    ///
    /// Only fails if the embedded default table cannot be parsed.
    pub async fn load<A>(&self, api: &A) -> Result<LoadedPricing>
    where
        A: SimulationApi + ?Sized,
    {
        let defaults = default_rates()?;

        if self.offline_mode {
            info!("Using embedded default rates (offline mode)");
            return Ok(LoadedPricing {
                table: PricingTable::new(defaults),
                catalog: CatalogStatus::Skipped,
            });
        }

        match api.pricing_catalog().await {
            Ok(entries) => {
                info!("Loaded {} provider rates from pricing catalog", entries.len());
                Ok(LoadedPricing {
                    table: PricingTable::with_catalog(defaults, &entries),
                    catalog: CatalogStatus::Fetched(entries.len()),
                })
            }
            Err(e) => {
                warn!("Could not load pricing from API: {}, using defaults", e);
                Ok(LoadedPricing {
                    table: PricingTable::new(defaults),
                    catalog: CatalogStatus::Unavailable(e.to_string()),
                })
            }
        }
    }
}
