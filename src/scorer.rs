//! Fitness scorer - main coordinator for evaluating garden candidates
//!
//! Drives the layout walker once per garden, feeds the component scorers,
//! and combines their outputs into one weighted fitness value written back
//! onto the garden. Every call works on fresh local state, so evaluations
//! are isolated from each other and the scorer can be shared across
//! threads; the batch variant exercises exactly that with Rayon.

use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data::{CompatibilityTable, DesiredPerformance, PlantCatalog, PlantRecord};
use crate::error::EngineError;
use crate::layout::{Garden, NeighborTuple};
use crate::metrics::{
    calculate_compatibility, calculate_satisfaction, calculate_water_efficiency, RowScore,
};

/// Component names feeding the weighted sum in this version.
///
/// Yield, space use, light, and maintenance are declared in the weight
/// table but have no scorer yet; they are excluded here rather than
/// silently scored as perfect or as zero-worth.
pub const INCLUDED_COMPONENTS: &[&str] = &[
    "compatibility",
    "water-efficiency",
    "objective-satisfaction",
];

/// Named weight table for the fitness aggregation.
///
/// All weights must be non-negative. The defaults sum to 1.0 so the
/// fitness of fully-bounded components stays interpretable on a 0-1 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessWeights {
    pub compatibility: f64,
    /// Reserved: no yield scorer feeds this yet.
    pub crop_yield: f64,
    pub water_efficiency: f64,
    /// Reserved: no space-use scorer feeds this yet.
    pub space_use: f64,
    /// Reserved: no light scorer feeds this yet.
    pub light: f64,
    /// Reserved: no maintenance scorer feeds this yet.
    pub maintenance: f64,
    pub objective_satisfaction: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            compatibility: 0.15,
            crop_yield: 0.20,
            water_efficiency: 0.20,
            space_use: 0.10,
            light: 0.10,
            maintenance: 0.10,
            objective_satisfaction: 0.15,
        }
    }
}

impl FitnessWeights {
    pub(crate) fn validate(&self) -> Result<(), EngineError> {
        let named = [
            ("compatibility", self.compatibility),
            ("crop_yield", self.crop_yield),
            ("water_efficiency", self.water_efficiency),
            ("space_use", self.space_use),
            ("light", self.light),
            ("maintenance", self.maintenance),
            ("objective_satisfaction", self.objective_satisfaction),
        ];
        for (name, value) in named {
            if value < 0.0 {
                return Err(EngineError::NegativeWeight { name, value });
            }
        }
        Ok(())
    }
}

/// Per-component detail behind one fitness value.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub compatibility: f64,
    pub satisfaction: f64,
    pub water_efficiency: f64,
    pub fitness: f64,
    /// Compatibility detail per top-level layout row.
    pub row_scores: Vec<RowScore>,
    pub occupied_cells: usize,
    /// RHT, litres per week.
    pub total_water_requirement: f64,
    /// RHT_MAX, litres per week.
    pub max_water_requirement: f64,
    pub achieved_vegetable: f64,
    pub achieved_medicinal: f64,
    /// Garden-list ids that had no catalog entry and were dropped.
    pub dropped_plant_ids: Vec<u32>,
    /// Which components actually fed the weighted sum.
    pub components: &'static [&'static str],
}

/// Outcome of one evaluation. The engine's sole output value: recoverable
/// conditions land here as `success = false` with a message, never as a
/// panic or an error bubbling past the scorer.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    pub message: String,
    pub success: bool,
    /// The garden with its four score fields written, when evaluable.
    pub garden: Option<Garden>,
    pub breakdown: Option<ScoreBreakdown>,
}

/// Main garden fitness scorer.
///
/// Configured once with the read-only catalog, compatibility table,
/// desired-performance target, and weight table; evaluates any number of
/// gardens afterwards, sequentially or in parallel.
#[derive(Debug)]
pub struct FitnessScorer {
    catalog: PlantCatalog,
    compatibility: CompatibilityTable,
    target: DesiredPerformance,
    weights: FitnessWeights,
}

impl FitnessScorer {
    /// Build a scorer, rejecting invalid configuration eagerly.
    ///
    /// Catalog-level faults (duplicate ids, negative watering) are already
    /// rejected by [`PlantCatalog::new`]; this checks the weight table and
    /// the target proportions.
    pub fn new(
        catalog: PlantCatalog,
        compatibility: CompatibilityTable,
        target: DesiredPerformance,
        weights: FitnessWeights,
    ) -> Result<Self, EngineError> {
        weights.validate()?;
        target.validate()?;
        debug!(
            plants = catalog.len(),
            pairs = compatibility.len(),
            "fitness scorer configured"
        );
        Ok(Self {
            catalog,
            compatibility,
            target,
            weights,
        })
    }

    pub fn catalog(&self) -> &PlantCatalog {
        &self.catalog
    }

    pub fn weights(&self) -> &FitnessWeights {
        &self.weights
    }

    /// Evaluate one garden and return it with its scores written.
    ///
    /// Unknown ids in the garden's plant list are dropped with a
    /// diagnostic. A layout with no resolvable occupied cell yields zero
    /// scores and `success = false`. A species pair missing from the
    /// compatibility table aborts the evaluation with `success = false`.
    pub fn evaluate(&self, mut garden: Garden) -> EvaluationResult {
        // Resolve the intended plant list; unresolvable ids are dropped,
        // not fatal.
        let mut dropped: Vec<u32> = Vec::new();
        let mut listed: FxHashSet<u32> = FxHashSet::default();
        for &id in &garden.plants {
            if self.catalog.get(id).is_some() {
                listed.insert(id);
            } else {
                warn!("{}; dropped from the garden's plant list", EngineError::UnknownPlant(id));
                dropped.push(id);
            }
        }

        // One walk feeds every scorer.
        let tuples: Vec<NeighborTuple> = garden.plot.walk(&self.catalog).collect();

        // The plant list is declared a superset of what the layout places.
        let placed_ids: FxHashSet<u32> = tuples.iter().map(|t| t.center.id).collect();
        for id in &placed_ids {
            if !listed.contains(id) {
                warn!(id, "layout places a plant id missing from the garden's plant list");
            }
        }

        if tuples.is_empty() {
            garden.compatibility_score = 0.0;
            garden.satisfaction_score = 0.0;
            garden.water_efficiency_score = 0.0;
            garden.fitness_score = 0.0;
            return EvaluationResult {
                message: "layout has no occupied cells that resolve in the catalog; \
                          all scores set to zero"
                    .to_string(),
                success: false,
                garden: Some(garden),
                breakdown: Some(ScoreBreakdown {
                    compatibility: 0.0,
                    satisfaction: 0.0,
                    water_efficiency: 0.0,
                    fitness: 0.0,
                    row_scores: Vec::new(),
                    occupied_cells: 0,
                    total_water_requirement: 0.0,
                    max_water_requirement: 0.0,
                    achieved_vegetable: 0.0,
                    achieved_medicinal: 0.0,
                    dropped_plant_ids: dropped,
                    components: INCLUDED_COMPONENTS,
                }),
            };
        }

        let compatibility = match calculate_compatibility(&tuples, &self.compatibility) {
            Ok(result) => result,
            Err(err) => {
                return EvaluationResult {
                    message: err.to_string(),
                    success: false,
                    garden: None,
                    breakdown: None,
                }
            }
        };

        let placed: Vec<&PlantRecord> = tuples.iter().map(|t| t.center).collect();
        let water = calculate_water_efficiency(&placed);
        let satisfaction = calculate_satisfaction(&placed, &self.target);

        let fitness = self.weights.compatibility * compatibility.overall
            + self.weights.objective_satisfaction * satisfaction.score
            + self.weights.water_efficiency * water.efficiency;

        garden.compatibility_score = compatibility.overall;
        garden.satisfaction_score = satisfaction.score;
        garden.water_efficiency_score = water.efficiency;
        garden.fitness_score = fitness;

        let mut message = format!(
            "garden evaluated: fitness {:.4} from compatibility {:.4}, \
             water-efficiency {:.4}, objective-satisfaction {:.4}",
            fitness, compatibility.overall, water.efficiency, satisfaction.score
        );
        if !dropped.is_empty() {
            message.push_str(&format!("; dropped {} unknown plant id(s)", dropped.len()));
        }

        EvaluationResult {
            message,
            success: true,
            garden: Some(garden),
            breakdown: Some(ScoreBreakdown {
                compatibility: compatibility.overall,
                satisfaction: satisfaction.score,
                water_efficiency: water.efficiency,
                fitness,
                row_scores: compatibility.rows,
                occupied_cells: water.occupied_cells,
                total_water_requirement: water.total_requirement,
                max_water_requirement: water.max_requirement,
                achieved_vegetable: satisfaction.achieved_vegetable,
                achieved_medicinal: satisfaction.achieved_medicinal,
                dropped_plant_ids: dropped,
                components: INCLUDED_COMPONENTS,
            }),
        }
    }

    /// Evaluate many gardens in parallel.
    ///
    /// The scorer's shared state is read-only, so results are identical to
    /// calling [`evaluate`](Self::evaluate) on each garden in sequence.
    pub fn evaluate_batch(&self, gardens: Vec<Garden>) -> Vec<EvaluationResult> {
        gardens
            .into_par_iter()
            .map(|garden| self.evaluate(garden))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{PlantKind, PlantRecord, SunRequirement};
    use crate::layout::{Cell, PlotLayout};
    use std::collections::HashMap;

    fn record(id: u32, species: &str, watering: f64, kinds: Vec<PlantKind>) -> PlantRecord {
        PlantRecord {
            id,
            species: species.to_string(),
            scientific_name: format!("{} spp.", species),
            kinds,
            sun_requirement: SunRequirement::Medium,
            weekly_watering: watering,
            harvest_days: 60,
            soil_type: "loam".to_string(),
            water_per_kg: 20.0,
            benefits: vec![],
            size: 0.25,
        }
    }

    fn catalog() -> PlantCatalog {
        PlantCatalog::new(vec![
            record(1, "basil", 6.0, vec![PlantKind::Aromatic, PlantKind::Medicinal]),
            record(2, "tomato", 18.0, vec![PlantKind::Vegetable]),
        ])
        .unwrap()
    }

    fn table() -> CompatibilityTable {
        let mut nested: HashMap<String, HashMap<String, f64>> = HashMap::new();
        nested.insert(
            "basil".to_string(),
            HashMap::from([("tomato".to_string(), 0.9)]),
        );
        CompatibilityTable::from_nested(nested).unwrap()
    }

    fn scorer() -> FitnessScorer {
        FitnessScorer::new(
            catalog(),
            table(),
            DesiredPerformance::new(0.5, 0.5).unwrap(),
            FitnessWeights::default(),
        )
        .unwrap()
    }

    #[test]
    fn negative_weight_is_rejected_at_construction() {
        let weights = FitnessWeights {
            light: -0.1,
            ..FitnessWeights::default()
        };
        let err = FitnessScorer::new(
            catalog(),
            table(),
            DesiredPerformance::new(0.5, 0.5).unwrap(),
            weights,
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::NegativeWeight {
                name: "light",
                value: -0.1
            }
        );
    }

    #[test]
    fn out_of_range_target_is_rejected_at_construction() {
        let err = FitnessScorer::new(
            catalog(),
            table(),
            DesiredPerformance {
                vegetable_percentage: 2.0,
                medicinal_percentage: 0.5,
            },
            FitnessWeights::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::TargetOutOfRange { .. }));
    }

    #[test]
    fn default_weights_sum_to_one() {
        let w = FitnessWeights::default();
        let sum = w.compatibility
            + w.crop_yield
            + w.water_efficiency
            + w.space_use
            + w.light
            + w.maintenance
            + w.objective_satisfaction;
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_layout_reports_failure_with_zero_scores() {
        let garden = Garden::new(vec![1, 2], PlotLayout::new(1.0, 1.0, vec![]));
        let result = scorer().evaluate(garden);

        assert!(!result.success);
        let garden = result.garden.unwrap();
        assert_eq!(garden.fitness_score, 0.0);
        assert_eq!(garden.compatibility_score, 0.0);
        assert_eq!(garden.satisfaction_score, 0.0);
        assert_eq!(garden.water_efficiency_score, 0.0);
        assert_eq!(result.breakdown.unwrap().occupied_cells, 0);
    }

    #[test]
    fn missing_compatibility_pair_fails_the_evaluation() {
        let catalog = PlantCatalog::new(vec![
            record(1, "basil", 6.0, vec![PlantKind::Aromatic]),
            record(3, "rue", 4.0, vec![PlantKind::Medicinal]),
        ])
        .unwrap();
        let scorer = FitnessScorer::new(
            catalog,
            table(),
            DesiredPerformance::new(0.5, 0.5).unwrap(),
            FitnessWeights::default(),
        )
        .unwrap();

        let garden = Garden::new(
            vec![1, 3],
            PlotLayout::new(2.0, 1.0, vec![vec![Cell::Plant(1), Cell::Plant(3)]]),
        );
        let result = scorer.evaluate(garden);

        assert!(!result.success);
        assert!(result.garden.is_none());
        assert!(result.message.contains("no compatibility entry"));
    }

    #[test]
    fn unknown_listed_ids_are_dropped_with_a_diagnostic() {
        let garden = Garden::new(
            vec![1, 2, 77],
            PlotLayout::new(2.0, 1.0, vec![vec![Cell::Plant(1), Cell::Plant(2)]]),
        );
        let result = scorer().evaluate(garden);

        assert!(result.success);
        assert_eq!(result.breakdown.unwrap().dropped_plant_ids, vec![77]);
        assert!(result.message.contains("dropped 1 unknown plant id"));
    }

    #[test]
    fn breakdown_names_the_included_components() {
        let garden = Garden::new(
            vec![1, 2],
            PlotLayout::new(2.0, 1.0, vec![vec![Cell::Plant(1), Cell::Plant(2)]]),
        );
        let result = scorer().evaluate(garden);
        let breakdown = result.breakdown.unwrap();
        assert_eq!(
            breakdown.components,
            &["compatibility", "water-efficiency", "objective-satisfaction"]
        );
    }
}
