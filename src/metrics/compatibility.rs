//! Compatibility between planted species
//!
//! Consumes the walker's neighbor tuples and the compatibility table to
//! produce one score per layout row plus an overall score. Each row keeps
//! a map from canonical species pair to compatibility value; the first
//! occurrence of a pair wins, so repeated adjacencies of the same two
//! species do not shift the row's weight distribution. A pair missing from
//! the table fails the whole evaluation instead of counting as zero.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::collections::BTreeMap;

use crate::data::{CompatibilityTable, SpeciesPair};
use crate::error::EngineError;
use crate::layout::NeighborTuple;

/// Per-row compatibility outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowScore {
    /// Top-level layout row index.
    pub row: usize,
    /// Distinct species pairs found adjacent in this row.
    pub pairs: usize,
    /// Normalized row score in [0, 1] for non-negative tables.
    pub score: f64,
}

/// Result of the compatibility calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompatibilityResult {
    /// Mean of the row scores over rows that produced at least one pair.
    ///
    /// Averaging keeps the overall score on the same bounded scale as the
    /// per-row scores regardless of how many rows the plot has; summing
    /// would grow without bound with plot depth.
    pub overall: f64,
    pub rows: Vec<RowScore>,
}

/// Score species compatibility over a sequence of neighbor tuples.
///
/// For each tuple the candidate pairs are (center, right), (center, below),
/// and (center, below-right); sides without a neighbor are skipped. A row
/// with no pairs, or whose largest pair value is not positive, scores 0
/// and is left out of the overall mean.
pub fn calculate_compatibility(
    tuples: &[NeighborTuple],
    table: &CompatibilityTable,
) -> Result<CompatibilityResult, EngineError> {
    // BTreeMap keeps rows in declaration order for the breakdown.
    let mut per_row: BTreeMap<usize, FxHashMap<SpeciesPair, f64>> = BTreeMap::new();

    for tuple in tuples {
        let mut pairs: SmallVec<[SpeciesPair; 3]> = SmallVec::new();
        for neighbor in [tuple.right, tuple.below, tuple.below_right]
            .into_iter()
            .flatten()
        {
            pairs.push(SpeciesPair::new(&tuple.center.species, &neighbor.species));
        }

        let row_pairs = per_row.entry(tuple.row).or_default();
        for pair in pairs {
            let value = table.get_pair(&pair).ok_or_else(|| {
                EngineError::MissingCompatibility {
                    a: pair.first().to_string(),
                    b: pair.second().to_string(),
                }
            })?;
            row_pairs.entry(pair).or_insert(value);
        }
    }

    let mut rows = Vec::with_capacity(per_row.len());
    let mut score_sum = 0.0;
    let mut scored_rows = 0usize;

    for (row, pairs) in per_row {
        let score = row_score(&pairs);
        if !pairs.is_empty() {
            score_sum += score;
            scored_rows += 1;
        }
        rows.push(RowScore {
            row,
            pairs: pairs.len(),
            score,
        });
    }

    let overall = if scored_rows > 0 {
        score_sum / scored_rows as f64
    } else {
        0.0
    };

    Ok(CompatibilityResult { overall, rows })
}

/// Normalize one row's pair values: sum over (pair count x largest value).
fn row_score(pairs: &FxHashMap<SpeciesPair, f64>) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }
    let sum: f64 = pairs.values().sum();
    let max = pairs.values().copied().fold(f64::NEG_INFINITY, f64::max);
    let max_possible = pairs.len() as f64 * max;
    if max_possible > 0.0 {
        sum / max_possible
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{PlantCatalog, PlantKind, PlantRecord, SunRequirement};
    use crate::layout::{Cell, PlotLayout};
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    fn record(id: u32, species: &str) -> PlantRecord {
        PlantRecord {
            id,
            species: species.to_string(),
            scientific_name: format!("{} spp.", species),
            kinds: vec![PlantKind::Vegetable],
            sun_requirement: SunRequirement::Medium,
            weekly_watering: 5.0,
            harvest_days: 60,
            soil_type: "loam".to_string(),
            water_per_kg: 20.0,
            benefits: vec![],
            size: 0.25,
        }
    }

    fn table(entries: &[(&str, &str, f64)]) -> CompatibilityTable {
        let mut nested: HashMap<String, HashMap<String, f64>> = HashMap::new();
        for &(a, b, value) in entries {
            nested
                .entry(a.to_string())
                .or_default()
                .insert(b.to_string(), value);
        }
        CompatibilityTable::from_nested(nested).unwrap()
    }

    #[test]
    fn two_plants_in_a_row_score_one() {
        let catalog = PlantCatalog::new(vec![record(1, "basil"), record(2, "tomato")]).unwrap();
        let table = table(&[("basil", "tomato", 0.9)]);
        let plot = PlotLayout::new(2.0, 1.0, vec![vec![Cell::Plant(1), Cell::Plant(2)]]);

        let tuples: Vec<_> = plot.walk(&catalog).collect();
        let result = calculate_compatibility(&tuples, &table).unwrap();

        // One pair: sum 0.9, max 0.9, one-pair maximum 0.9.
        assert_relative_eq!(result.overall, 1.0, epsilon = 1e-12);
        assert_eq!(result.rows, vec![RowScore { row: 0, pairs: 1, score: 1.0 }]);
    }

    #[test]
    fn row_normalizes_against_its_best_pair() {
        let catalog = PlantCatalog::new(vec![
            record(1, "basil"),
            record(2, "tomato"),
            record(3, "rue"),
        ])
        .unwrap();
        let table = table(&[("basil", "tomato", 1.0), ("tomato", "rue", 0.5)]);
        let plot = PlotLayout::new(
            3.0,
            1.0,
            vec![vec![Cell::Plant(1), Cell::Plant(2), Cell::Plant(3)]],
        );

        let tuples: Vec<_> = plot.walk(&catalog).collect();
        let result = calculate_compatibility(&tuples, &table).unwrap();

        // Pairs {basil|tomato: 1.0, rue|tomato: 0.5}: 1.5 / (2 x 1.0).
        assert_relative_eq!(result.overall, 0.75, epsilon = 1e-12);
    }

    #[test]
    fn repeated_adjacency_of_a_pair_counts_once() {
        // Ids 1 and 3 are the same species, so row 0 produces the canonical
        // basil|tomato pair twice; it must enter the row map only once.
        let catalog = PlantCatalog::new(vec![
            record(1, "basil"),
            record(2, "tomato"),
            record(3, "basil"),
        ])
        .unwrap();
        let table = table(&[("basil", "tomato", 0.8)]);
        let plot = PlotLayout::new(
            3.0,
            1.0,
            vec![vec![Cell::Plant(1), Cell::Plant(2), Cell::Plant(3)]],
        );

        let tuples: Vec<_> = plot.walk(&catalog).collect();
        let result = calculate_compatibility(&tuples, &table).unwrap();

        assert_eq!(result.rows[0].pairs, 1);
        assert_relative_eq!(result.overall, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn missing_pair_is_a_data_error() {
        let catalog = PlantCatalog::new(vec![record(1, "basil"), record(2, "rue")]).unwrap();
        let table = table(&[("basil", "tomato", 0.9)]);
        let plot = PlotLayout::new(2.0, 1.0, vec![vec![Cell::Plant(1), Cell::Plant(2)]]);

        let tuples: Vec<_> = plot.walk(&catalog).collect();
        let err = calculate_compatibility(&tuples, &table).unwrap_err();
        assert_eq!(
            err,
            EngineError::MissingCompatibility {
                a: "basil".to_string(),
                b: "rue".to_string(),
            }
        );
    }

    #[test]
    fn overall_averages_only_rows_with_pairs() {
        let catalog = PlantCatalog::new(vec![
            record(1, "basil"),
            record(2, "tomato"),
            record(3, "rue"),
        ])
        .unwrap();
        let table = table(&[("basil", "tomato", 1.0)]);
        // Row 0 pairs basil with tomato; the empty row 1 blocks vertical
        // pairs; row 2 holds a lone plant that never forms a pair.
        let plot = PlotLayout::new(
            2.0,
            3.0,
            vec![
                vec![Cell::Plant(1), Cell::Plant(2)],
                vec![],
                vec![Cell::Plant(3)],
            ],
        );

        let tuples: Vec<_> = plot.walk(&catalog).collect();
        let result = calculate_compatibility(&tuples, &table).unwrap();

        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[1], RowScore { row: 2, pairs: 0, score: 0.0 });
        // The pairless row stays out of the mean instead of dragging it down.
        assert_relative_eq!(result.overall, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn all_zero_values_score_zero_without_dividing() {
        let catalog = PlantCatalog::new(vec![record(1, "basil"), record(2, "rue")]).unwrap();
        let table = table(&[("basil", "rue", 0.0)]);
        let plot = PlotLayout::new(2.0, 1.0, vec![vec![Cell::Plant(1), Cell::Plant(2)]]);

        let tuples: Vec<_> = plot.walk(&catalog).collect();
        let result = calculate_compatibility(&tuples, &table).unwrap();
        assert_eq!(result.overall, 0.0);
    }

    #[test]
    fn no_tuples_score_zero() {
        let table = table(&[]);
        let result = calculate_compatibility(&[], &table).unwrap();
        assert_eq!(result.overall, 0.0);
        assert!(result.rows.is_empty());
    }
}
