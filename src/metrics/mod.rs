//! Metric modules for garden scoring
//!
//! Each component score is implemented in its own module and consumed by
//! the fitness scorer: species compatibility over discovered adjacencies,
//! water-consumption efficiency over the occupied cells, and satisfaction
//! of the desired nutritional/therapeutic performance.

pub mod compatibility;
pub mod satisfaction;
pub mod water_efficiency;

// Re-export metric functions
pub use compatibility::{calculate_compatibility, CompatibilityResult, RowScore};
pub use satisfaction::{calculate_satisfaction, SatisfactionResult};
pub use water_efficiency::{calculate_water_efficiency, WaterEfficiencyResult};
