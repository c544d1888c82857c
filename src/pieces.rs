//! Tetromino definitions and the rotation table.
//!
//! Each piece is a named set of exactly four unit cells, given as `(row, col)`
//! offsets. The [`PieceLibrary`] pairs every piece with all of its distinct
//! rotations and is built once, then shared read-only with the solver.

use rustc_hash::FxHashMap;

use crate::error::ConfigError;
use crate::geometry::{all_rotations, normalize, Coord};

/// Number of cells in every piece.
pub const CELLS_PER_PIECE: usize = 4;

/// The cells of one piece orientation.
pub type Shape = [Coord; CELLS_PER_PIECE];

/// The seven one-sided tetrominoes.
///
/// Mirror images (S/Z, J/L) are separate entries because only rotations are
/// generated. The order fixes each piece's 1-based code in encodings.
pub const TETROMINOES: &[(&str, Shape)] = &[
    // straight
    ("I", [(0, 0), (0, 1), (0, 2), (0, 3)]),
    // square
    ("O", [(0, 0), (0, 1), (1, 0), (1, 1)]),
    ("T", [(0, 0), (0, 1), (0, 2), (1, 1)]),
    ("S", [(0, 1), (0, 2), (1, 0), (1, 1)]),
    ("Z", [(0, 0), (0, 1), (1, 1), (1, 2)]),
    ("J", [(0, 0), (1, 0), (1, 1), (1, 2)]),
    ("L", [(0, 2), (1, 0), (1, 1), (1, 2)]),
];

/// A named piece with its base shape and every distinct rotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    pub name: String,
    /// Base shape as configured, normalized.
    pub base: Shape,
    /// Distinct rotations in generation order, identity first.
    pub rotations: Vec<Shape>,
}

impl Piece {
    /// Validates a base shape and computes its rotations.
    pub fn new(name: impl Into<String>, coords: &[Coord]) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if coords.len() != CELLS_PER_PIECE {
            return Err(ConfigError::WrongCellCount {
                piece: name,
                count: coords.len(),
            });
        }

        if let Some(span) = widest_span(coords).filter(|&span| span > CELLS_PER_PIECE as i64) {
            return Err(ConfigError::TooWide { piece: name, span });
        }

        let base = to_shape(&normalize(coords));
        if let Some(window) = base.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(ConfigError::DuplicateCell {
                piece: name,
                coord: window[0],
            });
        }

        let rotations = all_rotations(&base).iter().map(|r| to_shape(r)).collect();

        Ok(Self {
            name,
            base,
            rotations,
        })
    }
}

/// Number of cells covered along the longer axis of the bounding box.
fn widest_span(coords: &[Coord]) -> Option<i64> {
    let span = |axis: fn(&Coord) -> i32| {
        let min = coords.iter().map(axis).min()?;
        let max = coords.iter().map(axis).max()?;
        Some(i64::from(max) - i64::from(min) + 1)
    };
    Some(span(|&(row, _)| row)?.max(span(|&(_, col)| col)?))
}

// callers guarantee exactly CELLS_PER_PIECE coordinates
fn to_shape(coords: &[Coord]) -> Shape {
    let mut shape = [(0, 0); CELLS_PER_PIECE];
    shape.copy_from_slice(coords);
    shape
}

/// A piece placed on specific cells of a grid.
///
/// `cells` are absolute row-major indices (`row * side + col`), ascending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Placement {
    pub piece_index: usize,
    pub cells: [usize; CELLS_PER_PIECE],
}

impl Placement {
    /// Resolves the piece name through the library this placement came from.
    pub fn piece_name<'a>(&self, library: &'a PieceLibrary) -> Option<&'a str> {
        library.get(self.piece_index).map(|piece| piece.name.as_str())
    }
}

/// An exact tiling: pairwise disjoint placements covering every available cell.
pub type Solution = Vec<Placement>;

/// The rotation table: every configured piece with its rotations.
///
/// Piece order is configuration order and is stable for the process lifetime.
#[derive(Clone, Debug)]
pub struct PieceLibrary {
    pieces: Vec<Piece>,
    index_by_name: FxHashMap<String, usize>,
}

impl PieceLibrary {
    /// Builds a library from `(name, coordinates)` definitions.
    pub fn new<I, S>(definitions: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, Vec<Coord>)>,
        S: Into<String>,
    {
        let mut pieces = Vec::new();
        let mut index_by_name = FxHashMap::default();

        for (name, coords) in definitions {
            let piece = Piece::new(name, &coords)?;
            if index_by_name.contains_key(&piece.name) {
                return Err(ConfigError::DuplicateName(piece.name));
            }
            index_by_name.insert(piece.name.clone(), pieces.len());
            pieces.push(piece);
        }

        if pieces.is_empty() {
            return Err(ConfigError::EmptyLibrary);
        }

        log::debug!(
            "Built piece library with {} pieces and {} orientations",
            pieces.len(),
            pieces.iter().map(|p| p.rotations.len()).sum::<usize>()
        );

        Ok(Self {
            pieces,
            index_by_name,
        })
    }

    /// The library of the seven built-in tetrominoes.
    pub fn tetrominoes() -> Self {
        let pieces: Vec<Piece> = TETROMINOES
            .iter()
            .map(|&(name, base)| Piece {
                name: name.to_string(),
                base,
                rotations: all_rotations(&base).iter().map(|r| to_shape(r)).collect(),
            })
            .collect();
        let index_by_name = pieces
            .iter()
            .enumerate()
            .map(|(i, piece)| (piece.name.clone(), i))
            .collect();

        Self {
            pieces,
            index_by_name,
        }
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn get(&self, piece_index: usize) -> Option<&Piece> {
        self.pieces.get(piece_index)
    }

    /// Looks up a piece index by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index_by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}
