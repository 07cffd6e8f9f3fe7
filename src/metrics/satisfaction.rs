//! Satisfaction of the desired nutritional/therapeutic performance
//!
//! Measures how close the placed plant mix comes to the user's target
//! proportions of vegetable and medicinal plants. A plant tagged with both
//! types counts toward both achieved proportions.

use crate::data::{DesiredPerformance, PlantKind, PlantRecord};

/// Result of the satisfaction calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatisfactionResult {
    /// Share of placed plants tagged vegetable.
    pub achieved_vegetable: f64,
    /// Share of placed plants tagged medicinal.
    pub achieved_medicinal: f64,
    /// Mean absolute deviation from the two targets.
    pub average_deviation: f64,
    /// 1 - average deviation, or 0 when nothing is placed.
    pub score: f64,
}

/// Score how well the placed mix satisfies the desired performance.
pub fn calculate_satisfaction(
    placed: &[&PlantRecord],
    target: &DesiredPerformance,
) -> SatisfactionResult {
    if placed.is_empty() {
        return SatisfactionResult {
            achieved_vegetable: 0.0,
            achieved_medicinal: 0.0,
            average_deviation: 0.0,
            score: 0.0,
        };
    }

    let total = placed.len() as f64;
    let vegetables = placed
        .iter()
        .filter(|p| p.has_kind(PlantKind::Vegetable))
        .count() as f64;
    let medicinals = placed
        .iter()
        .filter(|p| p.has_kind(PlantKind::Medicinal))
        .count() as f64;

    let achieved_vegetable = vegetables / total;
    let achieved_medicinal = medicinals / total;

    let average_deviation = ((achieved_vegetable - target.vegetable_percentage).abs()
        + (achieved_medicinal - target.medicinal_percentage).abs())
        / 2.0;

    SatisfactionResult {
        achieved_vegetable,
        achieved_medicinal,
        average_deviation,
        score: 1.0 - average_deviation,
    }
}
