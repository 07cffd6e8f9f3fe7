//! Plant catalog, compatibility table, and desired-performance target
//!
//! These are the read-only inputs the engine is configured with. A data
//! provider hands them over either as already-parsed values or as JSON via
//! the loading helpers. All structural validation happens here, at
//! construction, so evaluation never has to re-check the catalog.

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::error::EngineError;

/// Functional classification tags a plant may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantKind {
    Vegetable,
    Medicinal,
    Aromatic,
    Ornamental,
}

/// Sunlight requirement declared in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SunRequirement {
    High,
    Medium,
    Low,
}

/// One immutable catalog entry.
///
/// Field names follow the external JSON catalog (camelCase, `type` for the
/// tag list). `species` is the key used by the compatibility table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantRecord {
    pub id: u32,
    pub species: String,
    pub scientific_name: String,
    /// Type tags, non-empty. A plant may be e.g. both vegetable and medicinal.
    #[serde(rename = "type")]
    pub kinds: Vec<PlantKind>,
    pub sun_requirement: SunRequirement,
    /// Litres per week.
    pub weekly_watering: f64,
    /// Days until harvest.
    pub harvest_days: u32,
    pub soil_type: String,
    /// Litres per kg of yield.
    pub water_per_kg: f64,
    #[serde(default)]
    pub benefits: Vec<String>,
    /// Footprint in square metres.
    pub size: f64,
}

impl PlantRecord {
    pub fn has_kind(&self, kind: PlantKind) -> bool {
        self.kinds.contains(&kind)
    }
}

/// Census of type tags across a catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindCensus {
    pub total: usize,
    pub vegetable: usize,
    pub medicinal: usize,
    pub aromatic: usize,
    pub ornamental: usize,
}

/// Id-indexed plant catalog.
///
/// Loaded once, read-only afterwards. Construction rejects duplicate ids,
/// negative watering volumes, and empty tag sets; duplicate species names
/// across distinct ids are only diagnosed, since the ids stay resolvable.
#[derive(Debug, Clone)]
pub struct PlantCatalog {
    plants: FxHashMap<u32, PlantRecord>,
}

impl PlantCatalog {
    pub fn new(records: Vec<PlantRecord>) -> Result<Self, EngineError> {
        let mut plants: FxHashMap<u32, PlantRecord> = FxHashMap::default();
        let mut species_seen: FxHashMap<String, u32> = FxHashMap::default();

        for record in records {
            if record.weekly_watering < 0.0 {
                return Err(EngineError::NegativeWatering {
                    id: record.id,
                    species: record.species.clone(),
                    volume: record.weekly_watering,
                });
            }
            if record.kinds.is_empty() {
                return Err(EngineError::EmptyTypeTags {
                    id: record.id,
                    species: record.species.clone(),
                });
            }
            if let Some(&prev_id) = species_seen.get(&record.species) {
                warn!(
                    species = %record.species,
                    first_id = prev_id,
                    second_id = record.id,
                    "catalog lists the same species under two ids"
                );
            } else {
                species_seen.insert(record.species.clone(), record.id);
            }

            let id = record.id;
            if plants.insert(id, record).is_some() {
                return Err(EngineError::DuplicatePlantId(id));
            }
        }

        Ok(Self { plants })
    }

    pub fn get(&self, id: u32) -> Option<&PlantRecord> {
        self.plants.get(&id)
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    /// Count how many entries carry each type tag.
    ///
    /// A plant with several tags is counted under each of them, so the
    /// per-tag counts may sum to more than `total`.
    pub fn kind_counts(&self) -> KindCensus {
        let mut census = KindCensus {
            total: self.plants.len(),
            ..KindCensus::default()
        };
        for plant in self.plants.values() {
            for kind in &plant.kinds {
                match kind {
                    PlantKind::Vegetable => census.vegetable += 1,
                    PlantKind::Medicinal => census.medicinal += 1,
                    PlantKind::Aromatic => census.aromatic += 1,
                    PlantKind::Ornamental => census.ornamental += 1,
                }
            }
        }
        census
    }

    /// Parse a catalog from a JSON array of plant records.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<PlantRecord> =
            serde_json::from_str(json).with_context(|| "Failed to parse plant catalog JSON")?;
        Self::new(records).map_err(Into::into)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read plant catalog: {:?}", path))?;
        Self::from_json_str(&contents)
            .with_context(|| format!("Invalid plant catalog: {:?}", path))
    }
}

/// Canonical unordered species pair.
///
/// The two names are stored in lexicographic order, so `(A, B)` and `(B, A)`
/// produce the same key across runs and processes. Never derived from a
/// process-local hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpeciesPair {
    first: String,
    second: String,
}

impl SpeciesPair {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self {
                first: a.to_string(),
                second: b.to_string(),
            }
        } else {
            Self {
                first: b.to_string(),
                second: a.to_string(),
            }
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }
}

impl std::fmt::Display for SpeciesPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}", self.first, self.second)
    }
}

/// Tolerance when checking that both directions of a pair agree.
const SYMMETRY_EPSILON: f64 = 1e-9;

/// Species-pair compatibility values.
///
/// Built from the provider's two-level `species -> species -> value`
/// mapping and canonicalized onto [`SpeciesPair`] keys, which makes lookup
/// symmetric by construction. Missing pairs are a data error surfaced at
/// evaluation time, never a silent zero.
#[derive(Debug, Clone)]
pub struct CompatibilityTable {
    values: FxHashMap<SpeciesPair, f64>,
}

impl CompatibilityTable {
    pub fn from_nested(nested: HashMap<String, HashMap<String, f64>>) -> Result<Self, EngineError> {
        let mut values: FxHashMap<SpeciesPair, f64> = FxHashMap::default();

        for (a, row) in &nested {
            for (b, &value) in row {
                let pair = SpeciesPair::new(a, b);
                if let Some(&existing) = values.get(&pair) {
                    if (existing - value).abs() > SYMMETRY_EPSILON {
                        return Err(EngineError::AsymmetricCompatibility {
                            a: pair.first().to_string(),
                            b: pair.second().to_string(),
                            forward: existing,
                            backward: value,
                        });
                    }
                } else {
                    values.insert(pair, value);
                }
            }
        }

        Ok(Self { values })
    }

    /// Symmetric lookup: `get("A", "B")` equals `get("B", "A")`.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        self.get_pair(&SpeciesPair::new(a, b))
    }

    pub fn get_pair(&self, pair: &SpeciesPair) -> Option<f64> {
        self.values.get(pair).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse a table from the provider's nested JSON mapping.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let nested: HashMap<String, HashMap<String, f64>> = serde_json::from_str(json)
            .with_context(|| "Failed to parse compatibility table JSON")?;
        Self::from_nested(nested).map_err(Into::into)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read compatibility table: {:?}", path))?;
        Self::from_json_str(&contents)
            .with_context(|| format!("Invalid compatibility table: {:?}", path))
    }
}

/// Target proportions of vegetable and medicinal plants the user wants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesiredPerformance {
    pub vegetable_percentage: f64,
    pub medicinal_percentage: f64,
}

impl DesiredPerformance {
    pub fn new(vegetable_percentage: f64, medicinal_percentage: f64) -> Result<Self, EngineError> {
        let target = Self {
            vegetable_percentage,
            medicinal_percentage,
        };
        target.validate()?;
        Ok(target)
    }

    pub(crate) fn validate(&self) -> Result<(), EngineError> {
        if !(0.0..=1.0).contains(&self.vegetable_percentage) {
            return Err(EngineError::TargetOutOfRange {
                name: "vegetable_percentage",
                value: self.vegetable_percentage,
            });
        }
        if !(0.0..=1.0).contains(&self.medicinal_percentage) {
            return Err(EngineError::TargetOutOfRange {
                name: "medicinal_percentage",
                value: self.medicinal_percentage,
            });
        }
        Ok(())
    }
}
