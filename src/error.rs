//! Error types for configuration, input, search and persistence.

use std::path::PathBuf;

use thiserror::Error;

use crate::geometry::Coord;
use crate::pieces::CELLS_PER_PIECE;

/// Failure raised by the solver before any search work.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TilingError {
    #[error("{available} available cells cannot be split into pieces of {}", CELLS_PER_PIECE)]
    Cardinality { available: usize },
}

/// Invalid piece or score configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("piece '{piece}' has {count} cells, expected {}", CELLS_PER_PIECE)]
    WrongCellCount { piece: String, count: usize },

    #[error("piece '{piece}' lists cell {coord:?} more than once")]
    DuplicateCell { piece: String, coord: Coord },

    #[error("piece '{0}' is defined more than once")]
    DuplicateName(String),

    #[error("piece '{piece}' spans {span} cells along one axis, at most {} allowed", CELLS_PER_PIECE)]
    TooWide { piece: String, span: i64 },

    #[error("piece name must not be empty")]
    EmptyName,

    #[error("piece library is empty")]
    EmptyLibrary,

    #[error("score variant {variant} has no score for piece '{piece}'")]
    MissingScore { variant: usize, piece: String },
}

/// A grid line that cannot be turned into a square grid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("{cells} cells is not a perfect square")]
    NotSquare { cells: usize },

    #[error("invalid cell value '{value}' at position {position}")]
    InvalidValue { position: usize, value: String },
}

/// A stored solution that cannot be decoded back into placements.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid tag '{tag}' at ({row},{col})")]
    InvalidTag { tag: String, row: usize, col: usize },

    #[error("group {code}.{instance} has {count} cells, expected {}", CELLS_PER_PIECE)]
    WrongGroupSize {
        code: usize,
        instance: usize,
        count: usize,
    },

    #[error("piece code {0} is not in the piece library")]
    UnknownPieceCode(usize),

    #[error("encoding is not square: row {row} has {len} tags, expected {side}")]
    RaggedEncoding { row: usize, len: usize, side: usize },

    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
}

/// Crate-level error, attaching paths to I/O failures.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error during {operation} on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in '{}': {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write image '{}': {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("grid #{index}: {source}")]
    Grid {
        index: usize,
        #[source]
        source: GridError,
    },

    #[error("grid #{index}: {source}")]
    Tiling {
        index: usize,
        #[source]
        source: TilingError,
    },

    #[error("cannot draw a {side}×{side} grid with {cell_size}px cells")]
    CanvasSize { side: usize, cell_size: u32 },

    #[error("failed to decode '{}': {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Attaches a path and operation to an I/O error.
pub fn io_error(
    path: impl Into<PathBuf>,
    operation: &'static str,
) -> impl FnOnce(std::io::Error) -> Error {
    let path = path.into();
    move |source| Error::Io {
        path,
        operation,
        source,
    }
}
