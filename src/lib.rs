//! Garden layout fitness evaluation engine
//!
//! Scores a candidate garden layout (a spatial arrangement of plant
//! species on a subdivided plot) against multiple horticultural
//! objectives and aggregates them into a single fitness value suitable
//! for ranking candidates in a search loop:
//!
//! - `layout`: the plot's hierarchical cell tree and the lazy walker that
//!   discovers each occupied cell's right / below / below-right neighbors
//! - `data`: plant catalog, species-compatibility table, and the
//!   desired-performance target, validated at construction
//! - `metrics`: species compatibility, water-consumption efficiency, and
//!   nutritional/therapeutic satisfaction
//! - `scorer`: the weighted aggregation onto one garden, with a Rayon
//!   batch variant
//!
//! Evaluation is a pure synchronous computation over read-only shared
//! inputs; a `FitnessScorer` can be shared freely across threads.

pub mod data;
pub mod error;
pub mod layout;
pub mod metrics;
pub mod scorer;

// Re-export commonly used types
pub use data::{
    CompatibilityTable, DesiredPerformance, KindCensus, PlantCatalog, PlantKind, PlantRecord,
    SpeciesPair, SunRequirement,
};
pub use error::EngineError;
pub use layout::{Cell, Garden, LayoutWalk, NeighborTuple, PlotLayout};
pub use metrics::{
    calculate_compatibility, calculate_satisfaction, calculate_water_efficiency,
    CompatibilityResult, RowScore, SatisfactionResult, WaterEfficiencyResult,
};
pub use scorer::{
    EvaluationResult, FitnessScorer, FitnessWeights, ScoreBreakdown, INCLUDED_COMPONENTS,
};
