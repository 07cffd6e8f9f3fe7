//! Water-consumption efficiency
//!
//! Compares the plot's actual weekly water demand against the theoretical
//! maximum, which is every occupied cell planted with the thirstiest
//! occupant. A plot of uniform watering needs scores 0; the score rises
//! toward 1 as the mix skews toward low-water plants.

use crate::data::PlantRecord;

/// Result of the water-efficiency calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterEfficiencyResult {
    /// Occupied leaf cells counted, repetitions included.
    pub occupied_cells: usize,
    /// Total weekly water requirement in litres (RHT).
    pub total_requirement: f64,
    /// Theoretical maximum weekly requirement in litres (RHT_MAX).
    pub max_requirement: f64,
    /// 1 - RHT / RHT_MAX, or 0 for an empty or zero-demand plot.
    pub efficiency: f64,
}

/// Score water efficiency over the plants occupying leaf cells.
///
/// `placed` holds one entry per occupied cell: a species planted in N
/// cells contributes its weekly watering N times.
pub fn calculate_water_efficiency(placed: &[&PlantRecord]) -> WaterEfficiencyResult {
    if placed.is_empty() {
        return WaterEfficiencyResult {
            occupied_cells: 0,
            total_requirement: 0.0,
            max_requirement: 0.0,
            efficiency: 0.0,
        };
    }

    let total_requirement: f64 = placed.iter().map(|p| p.weekly_watering).sum();
    let heaviest = placed
        .iter()
        .map(|p| p.weekly_watering)
        .fold(f64::NEG_INFINITY, f64::max);
    let max_requirement = placed.len() as f64 * heaviest;

    let efficiency = if max_requirement > 0.0 {
        1.0 - total_requirement / max_requirement
    } else {
        0.0
    };

    WaterEfficiencyResult {
        occupied_cells: placed.len(),
        total_requirement,
        max_requirement,
        efficiency,
    }
}
