//! Grid representation, input parsing and text formatting.
//!
//! A grid is a flat row-major array of availability flags with side length
//! `N`; cell index is `row * N + col`.

use crate::error::GridError;
use crate::pieces::Placement;

/// An N×N availability mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    side: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// Creates a grid from `side * side` availability flags.
    pub fn new(side: usize, cells: Vec<bool>) -> Result<Self, GridError> {
        if side.checked_mul(side) != Some(cells.len()) {
            return Err(GridError::NotSquare { cells: cells.len() });
        }
        Ok(Self { side, cells })
    }

    /// Creates a grid from raw values, nonzero meaning available.
    ///
    /// The side length is inferred from the value count.
    pub fn from_values(values: &[u64]) -> Result<Self, GridError> {
        let side = integer_sqrt(values.len()).ok_or(GridError::NotSquare {
            cells: values.len(),
        })?;
        Self::new(side, values.iter().map(|&v| v != 0).collect())
    }

    /// Parses one comma-separated line of non-negative integers.
    pub fn parse_line(line: &str) -> Result<Self, GridError> {
        let cells = line
            .trim()
            .split(',')
            .enumerate()
            .map(|(position, part)| {
                if is_digits(part) {
                    // any nonzero digit makes the value truthy
                    Ok(part.bytes().any(|b| b != b'0'))
                } else {
                    Err(GridError::InvalidValue {
                        position,
                        value: part.to_string(),
                    })
                }
            })
            .collect::<Result<Vec<bool>, _>>()?;

        let side = integer_sqrt(cells.len()).ok_or(GridError::NotSquare { cells: cells.len() })?;
        Self::new(side, cells)
    }

    pub fn side(&self) -> usize {
        self.side
    }

    /// Total number of cells, `side * side`.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_available(&self, cell_index: usize) -> bool {
        self.cells.get(cell_index).copied().unwrap_or(false)
    }

    /// Indices of available cells in ascending order.
    pub fn available_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, &available)| available.then_some(i))
    }

    pub fn available_count(&self) -> usize {
        self.cells.iter().filter(|&&available| available).count()
    }
}

fn is_digits(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

fn integer_sqrt(n: usize) -> Option<usize> {
    let root = (n as f64).sqrt().round() as usize;
    (root.checked_mul(root) == Some(n)).then_some(root)
}

/// Returns true if a line looks like grid data: comma-separated digit runs.
pub fn is_grid_line(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.split(',').all(is_digits)
}

/// Parses every grid line of an input file.
///
/// Blank lines are ignored and non-grid lines are skipped with a warning.
/// Each remaining line yields its own result so one malformed grid does not
/// hide the others; grid ids are positions in the returned list.
pub fn load_grids(text: &str) -> Vec<Result<Grid, GridError>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            let keep = is_grid_line(line);
            if !keep {
                log::warn!("Skipping non-grid line: {line}");
            }
            keep
        })
        .map(Grid::parse_line)
        .collect()
}

/// Converts a cell position to a linear cell index.
#[inline(always)]
pub const fn cell_to_idx(row: usize, col: usize, side: usize) -> usize {
    row * side + col
}

/// Converts a linear cell index to `(row, col)`.
#[inline(always)]
pub const fn idx_to_cell(cell_index: usize, side: usize) -> (usize, usize) {
    (cell_index / side, cell_index % side)
}

/// Converts a solution to a flat grid of 1-based piece numbers, 0 for empty.
pub fn solution_to_grid(cell_count: usize, solution: &[Placement]) -> Vec<usize> {
    let mut grid = vec![0; cell_count];

    for placement in solution {
        for &cell in &placement.cells {
            if let Some(slot) = grid.get_mut(cell) {
                *slot = placement.piece_index + 1;
            }
        }
    }

    grid
}

/// Formats a solution as a human-readable string.
///
/// Covered cells show their piece number (base 36 for numbers >= 10),
/// blocked cells show `#` and uncovered available cells show `.`.
pub fn format_solution(grid: &Grid, solution: &[Placement]) -> String {
    let numbers = solution_to_grid(grid.cell_count(), solution);
    let mut output = String::with_capacity(grid.cell_count() + grid.side());

    for row in 0..grid.side() {
        for col in 0..grid.side() {
            let cell = cell_to_idx(row, col, grid.side());
            let display_char = match numbers[cell] {
                0 if grid.is_available(cell) => '.',
                0 => '#',
                n => char::from_digit(n as u32, 36)
                    .map_or('?', |c| c.to_ascii_uppercase()),
            };
            output.push(display_char);
        }
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_infers_side() {
        let grid = Grid::parse_line("1,1,0,1,1,1,1,1,2").unwrap();
        assert_eq!(grid.side(), 3);
        assert_eq!(grid.available_count(), 8);
        assert!(!grid.is_available(2));
        assert!(grid.is_available(8));
        assert!(!grid.is_available(9));
    }

    #[test]
    fn test_parse_line_rejects_non_square() {
        assert_eq!(
            Grid::parse_line("1,1,1"),
            Err(GridError::NotSquare { cells: 3 })
        );
    }

    #[test]
    fn test_parse_line_rejects_invalid_value() {
        assert_eq!(
            Grid::parse_line("1,x,1,1"),
            Err(GridError::InvalidValue {
                position: 1,
                value: "x".to_string()
            })
        );
    }

    #[test]
    fn test_from_values_treats_nonzero_as_available() {
        let grid = Grid::from_values(&[0, 3, 1, 0]).unwrap();
        assert_eq!(grid.available_cells().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_load_grids_skips_non_grid_lines() {
        let text = "# header\n\n1,1,1,1\nhello,world\n1,0,1\n 0,0,0,0 \n";
        let grids = load_grids(text);
        assert_eq!(grids.len(), 3);
        assert_eq!(grids[0].as_ref().map(Grid::side), Ok(2));
        assert_eq!(grids[1], Err(GridError::NotSquare { cells: 3 }));
        assert_eq!(grids[2].as_ref().map(Grid::available_count), Ok(0));
    }

    #[test]
    fn test_coordinate_conversion_roundtrip() {
        for side in 1..6 {
            for idx in 0..side * side {
                let (row, col) = idx_to_cell(idx, side);
                assert!(row < side && col < side);
                assert_eq!(cell_to_idx(row, col, side), idx);
            }
        }
    }

    #[test]
    fn test_format_solution_marks_blocked_and_uncovered_cells() {
        let grid = Grid::parse_line("1,1,1,1,0,1,1,1,1").unwrap();
        let solution = [Placement {
            piece_index: 11,
            cells: [0, 1, 2, 5],
        }];
        assert_eq!(format_solution(&grid, &solution), "CCC\n.#C\n...\n");
    }
}
