//! Exact-cover backtracking solver.
//!
//! Key points:
//! - Every legal placement is computed once per grid and indexed by cell
//! - Covered cells live in a boolean array that is mutated and restored
//!   around each recursive call, so no state escapes a branch
//! - Branching always happens on the uncovered cell with the fewest
//!   remaining candidates (minimum remaining values)

use std::ops::ControlFlow;

use crate::error::TilingError;
use crate::geometry::extents;
use crate::grid::{cell_to_idx, Grid};
use crate::pieces::{PieceLibrary, Placement, Shape, Solution, CELLS_PER_PIECE};

/// Every legal placement on a grid, indexed by the cells it covers.
#[derive(Clone, Debug)]
pub struct PlacementIndex {
    /// All placements in generation order (piece, rotation, row, column).
    pub placements: Vec<Placement>,
    /// Placement ids covering each cell, indexed by cell. Blocked cells have
    /// no entries.
    pub by_cell: Vec<Vec<usize>>,
    /// Available cell indices, ascending.
    pub available: Vec<usize>,
}

impl PlacementIndex {
    /// Placements covering `cell`, in generation order.
    pub fn covering(&self, cell: usize) -> impl Iterator<Item = &Placement> + '_ {
        self.by_cell
            .get(cell)
            .into_iter()
            .flatten()
            .map(|&id| &self.placements[id])
    }
}

/// Computes every placement of every piece rotation that fits on the grid.
///
/// Offsets range over the rotation's own bounding box so that each rotation
/// stays inside the N×N grid. A placement is kept only if all of its cells
/// are available.
pub fn compute_placements(grid: &Grid, library: &PieceLibrary) -> PlacementIndex {
    let side = grid.side();
    let mut placements = Vec::new();
    let mut by_cell = vec![Vec::new(); grid.cell_count()];

    for (piece_index, piece) in library.pieces().iter().enumerate() {
        for rotation in &piece.rotations {
            let (max_row, max_col) = extents(rotation);
            let (Some(row_span), Some(col_span)) = (
                side.checked_sub(max_row as usize),
                side.checked_sub(max_col as usize),
            ) else {
                continue;
            };

            for row_offset in 0..row_span {
                for col_offset in 0..col_span {
                    let Some(placement) =
                        try_create_placement(grid, piece_index, rotation, row_offset, col_offset)
                    else {
                        continue;
                    };

                    let id = placements.len();
                    for &cell in &placement.cells {
                        by_cell[cell].push(id);
                    }
                    placements.push(placement);
                }
            }
        }
    }

    log::debug!(
        "Computed {} placements on a {side}x{side} grid",
        placements.len()
    );

    PlacementIndex {
        placements,
        by_cell,
        available: grid.available_cells().collect(),
    }
}

/// Translates a rotation to an offset on the grid.
///
/// Returns `None` if any cell would land on a blocked cell.
fn try_create_placement(
    grid: &Grid,
    piece_index: usize,
    rotation: &Shape,
    row_offset: usize,
    col_offset: usize,
) -> Option<Placement> {
    let mut cells = [0; CELLS_PER_PIECE];

    for (slot, &(row, col)) in cells.iter_mut().zip(rotation) {
        let cell = cell_to_idx(
            row_offset + row as usize,
            col_offset + col as usize,
            grid.side(),
        );
        if !grid.is_available(cell) {
            return None;
        }
        *slot = cell;
    }

    Some(Placement { piece_index, cells })
}

/// Finds every exact tiling of the grid's available cells.
///
/// Fails with [`TilingError::Cardinality`] before any search work if the
/// available cell count is not a multiple of the piece size. A grid with no
/// available cells has exactly one tiling: the empty one.
pub fn enumerate_tilings(grid: &Grid, library: &PieceLibrary) -> Result<Vec<Solution>, TilingError> {
    enumerate_tilings_limited(grid, library, None)
}

/// Like [`enumerate_tilings`], stopping after `max_solutions` tilings.
///
/// The result is always a prefix of the unlimited search order.
pub fn enumerate_tilings_limited(
    grid: &Grid,
    library: &PieceLibrary,
    max_solutions: Option<usize>,
) -> Result<Vec<Solution>, TilingError> {
    let available = grid.available_count();
    if available % CELLS_PER_PIECE != 0 {
        return Err(TilingError::Cardinality { available });
    }

    let index = compute_placements(grid, library);
    let mut search = Search::new(&index, grid.cell_count(), max_solutions);
    search.run();

    log::debug!(
        "Search visited {} nodes and found {} solutions",
        search.nodes,
        search.solutions.len()
    );

    Ok(search.solutions)
}

/// Mutable state of one depth-first search, owned by a single call chain.
struct Search<'a> {
    index: &'a PlacementIndex,
    /// `covered[cell]` is true once a placement in the partial solution uses it.
    covered: Vec<bool>,
    covered_count: usize,
    partial: Solution,
    solutions: Vec<Solution>,
    max_solutions: Option<usize>,
    nodes: u64,
}

impl<'a> Search<'a> {
    fn new(index: &'a PlacementIndex, cell_count: usize, max_solutions: Option<usize>) -> Self {
        Self {
            index,
            covered: vec![false; cell_count],
            covered_count: 0,
            partial: Vec::with_capacity(index.available.len() / CELLS_PER_PIECE),
            solutions: Vec::new(),
            max_solutions,
            nodes: 0,
        }
    }

    fn run(&mut self) {
        if self.max_solutions == Some(0) {
            return;
        }
        let _ = self.backtrack();
    }

    fn backtrack(&mut self) -> ControlFlow<()> {
        self.nodes += 1;

        if self.covered_count == self.index.available.len() {
            self.solutions.push(self.partial.clone());
            if self.max_solutions.is_some_and(|max| self.solutions.len() >= max) {
                return ControlFlow::Break(());
            }
            return ControlFlow::Continue(());
        }

        let Some(cell) = self.most_constrained_cell() else {
            return ControlFlow::Continue(());
        };

        let index = self.index;
        for placement in index.covering(cell) {
            if !self.fits(placement) {
                continue;
            }

            self.mark(placement, true);
            self.partial.push(*placement);
            let flow = self.backtrack();
            self.partial.pop();
            self.mark(placement, false);

            flow?;
        }

        ControlFlow::Continue(())
    }

    /// Picks the uncovered cell with the fewest fitting placements.
    ///
    /// Ties go to the first such cell in ascending index order. A cell with
    /// no fitting placement ends the scan early since that branch is dead.
    fn most_constrained_cell(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;

        for &cell in &self.index.available {
            if self.covered[cell] {
                continue;
            }

            let candidates = self
                .index
                .covering(cell)
                .filter(|placement| self.fits(placement))
                .count();

            if best.map_or(true, |(_, fewest)| candidates < fewest) {
                best = Some((cell, candidates));
                if candidates == 0 {
                    break;
                }
            }
        }

        best.map(|(cell, _)| cell)
    }

    #[inline]
    fn fits(&self, placement: &Placement) -> bool {
        placement.cells.iter().all(|&cell| !self.covered[cell])
    }

    #[inline]
    fn mark(&mut self, placement: &Placement, covered: bool) {
        for &cell in &placement.cells {
            self.covered[cell] = covered;
        }
        if covered {
            self.covered_count += CELLS_PER_PIECE;
        } else {
            self.covered_count -= CELLS_PER_PIECE;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Coord;
    use rustc_hash::FxHashSet;

    fn library_of(pieces: &[(&str, &[Coord])]) -> PieceLibrary {
        PieceLibrary::new(pieces.iter().map(|&(name, coords)| (name, coords.to_vec()))).unwrap()
    }

    const SQUARE: &[Coord] = &[(0, 0), (0, 1), (1, 0), (1, 1)];
    const STRAIGHT: &[Coord] = &[(0, 0), (0, 1), (0, 2), (0, 3)];

    fn full_grid(side: usize) -> Grid {
        Grid::new(side, vec![true; side * side]).unwrap()
    }

    /// Checks that a solution is an exact cover made of library placements.
    fn assert_exact_cover(grid: &Grid, library: &PieceLibrary, solution: &[Placement]) {
        let legal: FxHashSet<Placement> = compute_placements(grid, library)
            .placements
            .into_iter()
            .collect();
        let mut seen = FxHashSet::default();

        for placement in solution {
            assert!(legal.contains(placement), "{placement:?} is not a legal placement");
            for &cell in &placement.cells {
                assert!(grid.is_available(cell), "cell {cell} is blocked");
                assert!(seen.insert(cell), "cell {cell} covered twice");
            }
        }

        let available: FxHashSet<usize> = grid.available_cells().collect();
        assert_eq!(seen, available);
    }

    #[test]
    fn test_square_tiles_two_by_two() {
        let library = library_of(&[("O", SQUARE)]);
        let solutions = enumerate_tilings(&full_grid(2), &library).unwrap();
        assert_eq!(
            solutions,
            vec![vec![Placement {
                piece_index: 0,
                cells: [0, 1, 2, 3]
            }]]
        );
    }

    #[test]
    fn test_straight_tiles_four_by_four_two_ways() {
        let library = library_of(&[("I", STRAIGHT)]);
        let grid = full_grid(4);
        let solutions = enumerate_tilings(&grid, &library).unwrap();

        let rows: Vec<[usize; 4]> = solutions[0].iter().map(|p| p.cells).collect();
        let cols: Vec<[usize; 4]> = solutions[1].iter().map(|p| p.cells).collect();
        assert_eq!(solutions.len(), 2);
        assert_eq!(rows, [[0, 1, 2, 3], [4, 5, 6, 7], [8, 9, 10, 11], [12, 13, 14, 15]]);
        assert_eq!(cols, [[0, 4, 8, 12], [1, 5, 9, 13], [2, 6, 10, 14], [3, 7, 11, 15]]);
    }

    #[test]
    fn test_all_tetrominoes_tile_four_by_four() {
        let library = PieceLibrary::tetrominoes();
        let grid = full_grid(4);
        let solutions = enumerate_tilings(&grid, &library).unwrap();

        assert_eq!(solutions.len(), 117);
        for solution in &solutions {
            assert_eq!(solution.len(), 4);
            assert_exact_cover(&grid, &library, solution);
        }
    }

    #[test]
    fn test_masked_grid_solutions_are_exact_covers() {
        let library = PieceLibrary::tetrominoes();
        let grid = Grid::parse_line("0,1,1,0,1,1,1,1,1,1,1,1,0,1,1,1,1,1,1,1,1,0,1,1,0").unwrap();
        let solutions = enumerate_tilings(&grid, &library).unwrap();

        assert_eq!(solutions.len(), 14);
        for solution in &solutions {
            assert_exact_cover(&grid, &library, solution);
        }
    }

    #[test]
    fn test_cardinality_error_before_search() {
        let library = PieceLibrary::tetrominoes();
        let grid = Grid::parse_line("1,1,1,0").unwrap();
        assert_eq!(
            enumerate_tilings(&grid, &library),
            Err(TilingError::Cardinality { available: 3 })
        );
    }

    #[test]
    fn test_blocked_grid_has_one_empty_solution() {
        let library = PieceLibrary::tetrominoes();
        let grid = Grid::new(3, vec![false; 9]).unwrap();
        assert_eq!(enumerate_tilings(&grid, &library).unwrap(), vec![Vec::new()]);
    }

    #[test]
    fn test_untileable_grid_has_no_solutions() {
        let library = library_of(&[("O", SQUARE)]);
        // a 1x4 strip inside a 4x4 grid cannot hold a square
        let grid = Grid::parse_line("1,1,1,1,0,0,0,0,0,0,0,0,0,0,0,0").unwrap();
        assert!(enumerate_tilings(&grid, &library).unwrap().is_empty());
    }

    #[test]
    fn test_enumeration_is_repeatable() {
        let library = PieceLibrary::tetrominoes();
        let grid = full_grid(4);
        assert_eq!(
            enumerate_tilings(&grid, &library).unwrap(),
            enumerate_tilings(&grid, &library).unwrap()
        );
    }

    #[test]
    fn test_limited_search_returns_prefix() {
        let library = PieceLibrary::tetrominoes();
        let grid = full_grid(4);
        let all = enumerate_tilings(&grid, &library).unwrap();
        let limited = enumerate_tilings_limited(&grid, &library, Some(10)).unwrap();

        assert_eq!(limited.as_slice(), &all[..10]);
        assert!(enumerate_tilings_limited(&grid, &library, Some(0)).unwrap().is_empty());
    }

    #[test]
    fn test_placements_respect_rotation_extents() {
        let library = library_of(&[("I", STRAIGHT)]);
        let index = compute_placements(&full_grid(4), &library);

        // 4 horizontal + 4 vertical
        assert_eq!(index.placements.len(), 8);
        assert_eq!(index.available.len(), 16);
        for cell in 0..16 {
            assert_eq!(index.by_cell[cell].len(), 2, "cell {cell}");
        }
    }

    #[test]
    fn test_placements_skip_blocked_cells() {
        let library = library_of(&[("O", SQUARE)]);
        let grid = Grid::parse_line("1,1,1,1,1,0,1,1,1").unwrap();
        let index = compute_placements(&grid, &library);

        assert_eq!(
            index.placements,
            vec![
                Placement { piece_index: 0, cells: [0, 1, 3, 4] },
                Placement { piece_index: 0, cells: [3, 4, 6, 7] },
            ]
        );
        assert_eq!(index.covering(4).count(), 2);
        assert_eq!(index.covering(8).count(), 0);
        assert!(index.by_cell[5].is_empty());
    }

    #[test]
    fn test_piece_larger_than_grid_has_no_placements() {
        let library = library_of(&[("I", STRAIGHT)]);
        let index = compute_placements(&full_grid(3), &library);
        assert!(index.placements.is_empty());
    }
}
