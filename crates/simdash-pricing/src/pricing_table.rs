//! Provider rate table
//!
//! Holds the built-in default rates and the result of merging them with the
//! backend's pricing catalog. Resolution prefers the merged (catalog) rate,
//! falls back to the default for the same provider id, and fails for ids
//! neither source knows.

use once_cell::sync::Lazy;
use serde::Serialize;
use simdash_core::error::{Result, SimdashError};
use simdash_core::types::{CatalogEntry, ProviderId, ProviderRate};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

/// Embedded default rates, used when the catalog is unavailable
const EMBEDDED_DEFAULT_RATES: &str = include_str!("../embedded/default_rates.json");

/// Embedded defaults, parsed on first use
static PARSED_DEFAULT_RATES: Lazy<std::result::Result<RateMap, String>> =
    Lazy::new(|| parse_rate_map(EMBEDDED_DEFAULT_RATES).map_err(|e| e.to_string()));

/// Rates keyed by provider id
pub type RateMap = BTreeMap<ProviderId, ProviderRate>;

/// Where a resolved rate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Catalog,
    Default,
}

impl fmt::Display for RateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog => write!(f, "catalog"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Parse the embedded default rate table
///
/// # Errors
///
/// Returns an error if the embedded JSON is malformed or declares a zero
/// time unit.
pub fn default_rates() -> Result<RateMap> {
    PARSED_DEFAULT_RATES
        .clone()
        .map_err(|e| SimdashError::Config(format!("embedded default rates: {e}")))
}

fn parse_rate_map(raw: &str) -> Result<RateMap> {
    let rates: RateMap = serde_json::from_str(raw)?;
    if let Some((provider, _)) = rates.iter().find(|(_, rate)| rate.time_unit == 0) {
        return Err(SimdashError::Config(format!(
            "rate for {provider} has a zero time unit"
        )));
    }
    Ok(rates)
}

/// Merge catalog rows over the defaults
///
/// Every catalog row becomes an hourly rate keyed by its provider id,
/// overwriting any default (and any earlier row for the same id). Providers
/// the catalog does not mention keep their default.
///
/// # Examples
///
/// ```
/// use simdash_core::types::{CatalogEntry, ProviderId};
/// use simdash_pricing::pricing_table::{default_rates, merge_rates};
///
/// let defaults = default_rates().unwrap();
/// assert_eq!(merge_rates(&defaults, &[]), defaults);
///
/// let merged = merge_rates(&defaults, &[CatalogEntry {
///     provider: ProviderId::new("aws"),
///     pe_cost: 0.09,
///     ram_cost: 0.02,
/// }]);
/// let aws = merged[&ProviderId::new("aws")];
/// assert_eq!(aws.pe_cost, 0.09);
/// assert_eq!(aws.time_unit, 3600);
/// ```
pub fn merge_rates(defaults: &RateMap, fetched: &[CatalogEntry]) -> RateMap {
    let mut merged = defaults.clone();
    for entry in fetched {
        debug!(
            "Catalog rate for {}: pe={} ram={}",
            entry.provider, entry.pe_cost, entry.ram_cost
        );
        merged.insert(
            entry.provider.clone(),
            ProviderRate::hourly(entry.pe_cost, entry.ram_cost),
        );
    }
    merged
}

/// Default rates plus whatever the catalog contributed
#[derive(Debug, Clone, PartialEq)]
pub struct PricingTable {
    defaults: RateMap,
    merged: RateMap,
    catalog_providers: BTreeSet<ProviderId>,
}

impl PricingTable {
    /// Table holding only the defaults
    pub fn new(defaults: RateMap) -> Self {
        Self {
            merged: defaults.clone(),
            defaults,
            catalog_providers: BTreeSet::new(),
        }
    }

    /// Table with catalog rows merged over the defaults
    pub fn with_catalog(defaults: RateMap, fetched: &[CatalogEntry]) -> Self {
        let mut table = Self::new(defaults);
        table.apply_catalog(fetched);
        table
    }

    /// Replace the merged view with `defaults` + `fetched`
    pub fn apply_catalog(&mut self, fetched: &[CatalogEntry]) {
        self.merged = merge_rates(&self.defaults, fetched);
        self.catalog_providers = fetched.iter().map(|e| e.provider.clone()).collect();
    }

    /// Resolve the rate to price `provider` with
    ///
    /// # Errors
    ///
    /// Returns [`SimdashError::UnknownProvider`] when neither the catalog nor
    /// the defaults define the provider.
    pub fn resolve(&self, provider: &ProviderId) -> Result<ProviderRate> {
        self.merged
            .get(provider)
            .or_else(|| self.defaults.get(provider))
            .copied()
            .ok_or_else(|| SimdashError::UnknownProvider(provider.clone()))
    }

    /// Source of the rate `resolve` would return
    pub fn source(&self, provider: &ProviderId) -> Option<RateSource> {
        if self.catalog_providers.contains(provider) {
            Some(RateSource::Catalog)
        } else if self.defaults.contains_key(provider) {
            Some(RateSource::Default)
        } else {
            None
        }
    }

    /// Every resolvable provider with its rate and source, sorted by id
    pub fn entries(&self) -> Vec<(ProviderId, ProviderRate, RateSource)> {
        self.merged
            .iter()
            .map(|(provider, rate)| {
                let source = self.source(provider).unwrap_or(RateSource::Default);
                (provider.clone(), *rate, source)
            })
            .collect()
    }

    /// The merged rate map
    pub fn rates(&self) -> &RateMap {
        &self.merged
    }

    /// The built-in defaults
    pub fn defaults(&self) -> &RateMap {
        &self.defaults
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aws_only() -> RateMap {
        let mut rates = RateMap::new();
        rates.insert(ProviderId::new("aws"), ProviderRate::hourly(0.05, 0.01));
        rates
    }

    fn entry(provider: &str, pe_cost: f64, ram_cost: f64) -> CatalogEntry {
        CatalogEntry {
            provider: ProviderId::new(provider),
            pe_cost,
            ram_cost,
        }
    }

    #[test]
    fn test_embedded_defaults() {
        let rates = default_rates().unwrap();
        assert_eq!(rates.len(), 4);
        let azure = rates[&ProviderId::new("azure")];
        assert_eq!(azure.pe_cost, 0.045);
        assert_eq!(azure.ram_cost, 0.012);
        assert!(rates.values().all(|r| r.time_unit == 3600));
    }

    #[test]
    fn test_zero_time_unit_rejected() {
        let raw = r#"{"aws":{"peCost":0.05,"ramCost":0.01,"timeUnit":0}}"#;
        assert!(matches!(
            parse_rate_map(raw),
            Err(SimdashError::Config(_))
        ));
    }

    #[test]
    fn test_merge_empty_is_identity() {
        let defaults = default_rates().unwrap();
        assert_eq!(merge_rates(&defaults, &[]), defaults);
    }

    #[test]
    fn test_merge_overwrites_and_keeps_others() {
        let defaults = default_rates().unwrap();
        let merged = merge_rates(&defaults, &[entry("aws", 0.09, 0.02)]);

        let aws = merged[&ProviderId::new("aws")];
        assert_eq!(aws.pe_cost, 0.09);
        assert_eq!(aws.ram_cost, 0.02);
        assert_eq!(aws.time_unit, 3600);

        for provider in ["azure", "gcp", "ibm"] {
            let id = ProviderId::new(provider);
            assert_eq!(merged[&id], defaults[&id]);
        }
    }

    #[test]
    fn test_merge_adds_new_provider() {
        let merged = merge_rates(&aws_only(), &[entry("oracle", 0.03, 0.005)]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[&ProviderId::new("oracle")].time_unit, 3600);
    }

    #[test]
    fn test_later_catalog_row_wins() {
        let merged = merge_rates(&aws_only(), &[entry("aws", 0.1, 0.1), entry("aws", 0.2, 0.2)]);
        assert_eq!(merged[&ProviderId::new("aws")].pe_cost, 0.2);
    }

    #[test]
    fn test_resolve_and_source() {
        let table = PricingTable::with_catalog(
            default_rates().unwrap(),
            &[entry("aws", 0.09, 0.02), entry("oracle", 0.03, 0.005)],
        );

        assert_eq!(table.resolve(&ProviderId::new("aws")).unwrap().pe_cost, 0.09);
        assert_eq!(table.source(&ProviderId::new("aws")), Some(RateSource::Catalog));
        assert_eq!(table.source(&ProviderId::new("gcp")), Some(RateSource::Default));
        assert_eq!(table.source(&ProviderId::new("oracle")), Some(RateSource::Catalog));
        assert_eq!(table.entries().len(), 5);
    }

    #[test]
    fn test_resolve_unknown_provider() {
        let table = PricingTable::new(aws_only());
        let err = table.resolve(&ProviderId::new("gcp")).unwrap_err();
        assert!(matches!(err, SimdashError::UnknownProvider(ref p) if p.as_str() == "gcp"));
        assert_eq!(table.source(&ProviderId::new("gcp")), None);
    }

    #[test]
    fn test_apply_catalog_replaces_previous_catalog() {
        let mut table = PricingTable::with_catalog(aws_only(), &[entry("aws", 0.09, 0.02)]);
        table.apply_catalog(&[]);
        assert_eq!(table.resolve(&ProviderId::new("aws")).unwrap().pe_cost, 0.05);
        assert_eq!(table.source(&ProviderId::new("aws")), Some(RateSource::Default));
    }
}
