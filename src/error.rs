//! Error taxonomy for the fitness engine
//!
//! Configuration faults are rejected eagerly when the catalog, table, or
//! scorer is constructed. During an evaluation only a missing compatibility
//! pair is fatal; unresolved plant ids are skipped with a diagnostic.

use thiserror::Error;

/// Errors produced while building engine inputs or evaluating a garden.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// A plant id referenced by a garden or layout has no catalog entry.
    #[error("plant id {0} has no catalog entry")]
    UnknownPlant(u32),

    /// A species pair placed next to each other has no compatibility entry.
    ///
    /// Surfaced as an evaluation failure rather than defaulting to zero,
    /// which would bias scores without signaling the data gap.
    #[error("no compatibility entry for species pair '{a}' / '{b}'")]
    MissingCompatibility { a: String, b: String },

    /// Two catalog records share the same id.
    #[error("duplicate plant id {0} in catalog")]
    DuplicatePlantId(u32),

    /// A catalog record declares a negative weekly watering volume.
    #[error("plant '{species}' (id {id}) has negative weekly watering ({volume} L)")]
    NegativeWatering { id: u32, species: String, volume: f64 },

    /// A catalog record carries no type tags at all.
    #[error("plant '{species}' (id {id}) has an empty type-tag set")]
    EmptyTypeTags { id: u32, species: String },

    /// A fitness weight is negative.
    #[error("fitness weight '{name}' must be non-negative, got {value}")]
    NegativeWeight { name: &'static str, value: f64 },

    /// A desired-performance proportion falls outside [0, 1].
    #[error("target proportion '{name}' must lie in [0, 1], got {value}")]
    TargetOutOfRange { name: &'static str, value: f64 },

    /// The provider supplied different values for the two directions of a pair.
    #[error("compatibility for '{a}' / '{b}' is asymmetric ({forward} vs {backward})")]
    AsymmetricCompatibility {
        a: String,
        b: String,
        forward: f64,
        backward: f64,
    },
}
