//! Tetromino Tiler Library
//!
//! Enumerates every exact tiling of a square grid, with some cells blocked,
//! by a library of tetrominoes usable in any of their rotations.
//!
//! The core is the rotation table ([`pieces::PieceLibrary`]) and the
//! exact-cover search ([`solver::enumerate_tilings`]); the remaining modules
//! load inputs and score, store and draw the solutions.

pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod persistence;
pub mod pieces;
pub mod render;
pub mod scoring;
pub mod solver;

pub use error::{Error, Result, TilingError};
pub use grid::Grid;
pub use pieces::{PieceLibrary, Placement, Solution};
pub use solver::{compute_placements, enumerate_tilings, enumerate_tilings_limited};
