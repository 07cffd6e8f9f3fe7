//! Plot layout tree and neighbor discovery
//!
//! A plot is an ordered sequence of rows; each row is an ordered sequence
//! of cells. A cell either holds a plant id, is explicitly empty, or nests
//! a sub-grid of cells sharing the same macro-cell position (nesting depth
//! is unbounded). The walker turns this irregular tree into a flat, lazy
//! sequence of resolved neighbor tuples, one per occupied leaf cell, in
//! row-major declaration order.

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::data::{PlantCatalog, PlantRecord};
use crate::error::EngineError;

/// Marker used by the external layout format for an unoccupied cell.
pub const VOID_MARKER: &str = "VOID";

/// One position in the plot grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Occupied by the plant with this catalog id.
    Plant(u32),
    /// Explicitly empty.
    Void,
    /// A sub-grid occupying this macro-cell position.
    Group(Vec<Cell>),
}

// The external layout format mixes scalars and lists inside one row:
// a plant id, the string "VOID", or a nested list. Serde's derived
// representations cannot express that shape, so the mapping is spelled out.
impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Plant(id) => serializer.serialize_u32(*id),
            Cell::Void => serializer.serialize_str(VOID_MARKER),
            Cell::Group(cells) => cells.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CellVisitor;

        impl<'de> Visitor<'de> for CellVisitor {
            type Value = Cell;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "a plant id, the string \"{}\", or a list of cells", VOID_MARKER)
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Cell, E> {
                u32::try_from(value)
                    .map(Cell::Plant)
                    .map_err(|_| E::custom(format!("plant id {} out of range", value)))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Cell, E> {
                u32::try_from(value)
                    .map(Cell::Plant)
                    .map_err(|_| E::custom(format!("plant id {} out of range", value)))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Cell, E> {
                if value == VOID_MARKER {
                    Ok(Cell::Void)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(value), &self))
                }
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Cell, A::Error> {
                let mut cells = Vec::new();
                while let Some(cell) = seq.next_element()? {
                    cells.push(cell);
                }
                Ok(Cell::Group(cells))
            }
        }

        deserializer.deserialize_any(CellVisitor)
    }
}

/// Physical plot with its spatial cell arrangement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotLayout {
    /// Plot width in metres.
    pub size_x: f64,
    /// Plot depth in metres.
    pub size_y: f64,
    pub rows: Vec<Vec<Cell>>,
}

impl PlotLayout {
    pub fn new(size_x: f64, size_y: f64, rows: Vec<Vec<Cell>>) -> Self {
        Self { size_x, size_y, rows }
    }

    /// Start a fresh traversal of this layout against `catalog`.
    ///
    /// The walk is lazy and restartable; calling this again yields an
    /// identical sequence.
    pub fn walk<'a>(&'a self, catalog: &'a PlantCatalog) -> LayoutWalk<'a> {
        LayoutWalk {
            catalog,
            rows: &self.rows,
            next_row: 0,
            current_row: 0,
            stack: Vec::new(),
        }
    }
}

/// One candidate garden: the individual being scored.
///
/// Holds the intended plant-id list, the plot layout, and the four result
/// fields the scorer writes back. Scores default to zero until computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Garden {
    /// Plant ids intended to be present; a superset of the ids placed in
    /// the layout.
    pub plants: Vec<u32>,
    pub plot: PlotLayout,
    #[serde(default)]
    pub compatibility_score: f64,
    #[serde(default)]
    pub satisfaction_score: f64,
    #[serde(default)]
    pub water_efficiency_score: f64,
    #[serde(default)]
    pub fitness_score: f64,
}

impl Garden {
    pub fn new(plants: Vec<u32>, plot: PlotLayout) -> Self {
        Self {
            plants,
            plot,
            compatibility_score: 0.0,
            satisfaction_score: 0.0,
            water_efficiency_score: 0.0,
            fitness_score: 0.0,
        }
    }
}

/// An occupied leaf cell together with its resolved neighborhood.
///
/// `row` is the index of the enclosing top-level layout row, which is the
/// unit the compatibility scorer aggregates over. Neighbors are the cell to
/// the right, the cell directly below, and the cell diagonally below-right;
/// absent or empty positions yield `None`.
#[derive(Debug, Clone, Copy)]
pub struct NeighborTuple<'a> {
    pub row: usize,
    pub center: &'a PlantRecord,
    pub right: Option<&'a PlantRecord>,
    pub below: Option<&'a PlantRecord>,
    pub below_right: Option<&'a PlantRecord>,
}

#[derive(Clone, Copy)]
struct Frame<'a> {
    cells: &'a [Cell],
    /// Row beneath, for bottom neighbors. `None` inside a sub-grid: a
    /// group's neighbor arithmetic is local to the group, not the parent.
    below: Option<&'a [Cell]>,
    col: usize,
}

/// Lazy row-major traversal over every occupied leaf cell of a layout.
///
/// Sub-grids are walked with the neighbor rule applied at their own local
/// indices. A group encountered *as* a neighbor stands for its macro-cell
/// and resolves to its first occupied leaf. Plant ids with no catalog
/// entry are skipped with a diagnostic; they never abort the walk.
pub struct LayoutWalk<'a> {
    catalog: &'a PlantCatalog,
    rows: &'a [Vec<Cell>],
    next_row: usize,
    current_row: usize,
    stack: Vec<Frame<'a>>,
}

impl<'a> LayoutWalk<'a> {
    fn resolve(&self, cell: Option<&'a Cell>) -> Option<&'a PlantRecord> {
        match cell? {
            Cell::Void => None,
            Cell::Plant(id) => {
                let found = self.catalog.get(*id);
                if found.is_none() {
                    warn!("{}; neighbor treated as empty", EngineError::UnknownPlant(*id));
                }
                found
            }
            Cell::Group(cells) => self.first_leaf(cells),
        }
    }

    /// Depth-first first occupied leaf of a sub-grid, used when a whole
    /// group is someone's neighbor.
    fn first_leaf(&self, cells: &'a [Cell]) -> Option<&'a PlantRecord> {
        for cell in cells {
            match cell {
                Cell::Void => {}
                Cell::Plant(id) => {
                    if let Some(plant) = self.catalog.get(*id) {
                        return Some(plant);
                    }
                }
                Cell::Group(inner) => {
                    if let Some(plant) = self.first_leaf(inner) {
                        return Some(plant);
                    }
                }
            }
        }
        None
    }
}

impl<'a> Iterator for LayoutWalk<'a> {
    type Item = NeighborTuple<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(frame) = self.stack.last_mut() else {
                if self.next_row >= self.rows.len() {
                    return None;
                }
                self.current_row = self.next_row;
                let below = self.rows.get(self.next_row + 1).map(Vec::as_slice);
                self.stack.push(Frame {
                    cells: &self.rows[self.next_row],
                    below,
                    col: 0,
                });
                self.next_row += 1;
                continue;
            };

            if frame.col >= frame.cells.len() {
                self.stack.pop();
                continue;
            }

            let cells = frame.cells;
            let below = frame.below;
            let col = frame.col;
            frame.col += 1;

            match &cells[col] {
                Cell::Void => {}
                Cell::Group(inner) => {
                    self.stack.push(Frame {
                        cells: inner,
                        below: None,
                        col: 0,
                    });
                }
                Cell::Plant(id) => {
                    let Some(center) = self.catalog.get(*id) else {
                        warn!("{}; cell skipped", EngineError::UnknownPlant(*id));
                        continue;
                    };
                    return Some(NeighborTuple {
                        row: self.current_row,
                        center,
                        right: self.resolve(cells.get(col + 1)),
                        below: self.resolve(below.and_then(|b| b.get(col))),
                        below_right: self.resolve(below.and_then(|b| b.get(col + 1))),
                    });
                }
            }
        }
    }
}
