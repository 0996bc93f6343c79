//! Work-unit cost estimation
//!
//! Prices each canonical work unit as
//!
//! ```text
//! pes   * pe_cost  * (execution_time / time_unit)
//! + ram_gb * ram_cost * (execution_time / time_unit)
//! ```
//!
//! No rounding happens here; display code rounds to cents. A unit whose
//! `pes`, RAM, or execution time could not be read is
//! [`CostEstimate::Unpriceable`].
//!
//! # Examples
//!
//! ```
//! use simdash_core::types::{CostEstimate, ProviderRate};
//! use simdash_core::work_unit::{Reading, WorkUnit};
//! use simdash_pricing::cost_estimator::estimate_cost;
//!
//! let unit = WorkUnit {
//!     pes: Reading::Value(2.0),
//!     ram_gb: Reading::Value(4.0),
//!     execution_time: Reading::Value(3600.0),
//!     ..Default::default()
//! };
//! let cost = estimate_cost(&unit, &ProviderRate::hourly(0.05, 0.01));
//! assert!((cost.amount().unwrap() - 0.14).abs() < 1e-12);
//! ```

use crate::pricing_table::PricingTable;
use simdash_core::error::Result;
use simdash_core::types::{CostEstimate, ProviderId, ProviderRate};
use simdash_core::work_unit::WorkUnit;
use tracing::debug;

/// Price a single work unit
pub fn estimate_cost(unit: &WorkUnit, rate: &ProviderRate) -> CostEstimate {
    let (Some(pes), Some(ram_gb), Some(exec_time)) = (
        unit.pes.value(),
        unit.ram_gb.value(),
        unit.execution_time.value(),
    ) else {
        return CostEstimate::Unpriceable;
    };

    let billed_units = exec_time / f64::from(rate.time_unit);
    let pe_cost = pes * rate.pe_cost * billed_units;
    let ram_cost = ram_gb * rate.ram_cost * billed_units;
    let cost = pe_cost + ram_cost;

    if cost.is_finite() {
        CostEstimate::Priced(cost)
    } else {
        CostEstimate::Unpriceable
    }
}

/// Price every unit, one estimate per unit in input order
pub fn estimate_costs(units: &[WorkUnit], rate: &ProviderRate) -> Vec<CostEstimate> {
    let costs: Vec<CostEstimate> = units.iter().map(|u| estimate_cost(u, rate)).collect();

    let unpriceable = costs
        .iter()
        .filter(|c| matches!(c, CostEstimate::Unpriceable))
        .count();
    debug!(
        "Estimated {} cloudlet costs ({} unpriceable)",
        costs.len(),
        unpriceable
    );

    costs
}

/// Resolve `provider` in `table`, then price every unit
///
/// # Errors
///
/// Returns [`simdash_core::SimdashError::UnknownProvider`] without pricing
/// anything when the provider has no rate.
pub fn estimate_for_provider(
    table: &PricingTable,
    provider: &ProviderId,
    units: &[WorkUnit],
) -> Result<Vec<CostEstimate>> {
    let rate = table.resolve(provider)?;
    Ok(estimate_costs(units, &rate))
}
