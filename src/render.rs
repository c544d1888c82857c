//! PNG rendering of grids, solutions and the piece library.

use std::path::Path;

use image::{Rgb, RgbImage};

use crate::error::{io_error, Error, Result};
use crate::geometry::extents;
use crate::grid::{idx_to_cell, Grid};
use crate::pieces::{PieceLibrary, Placement};

/// Pixels per grid cell unless configured otherwise.
pub const DEFAULT_CELL_SIZE: u32 = 50;

/// Largest width or height of a grid image, in pixels.
pub const MAX_CANVAS_SIDE: u32 = 16_384;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const BLOCKED: Rgb<u8> = Rgb([180, 180, 180]);
const LIGHT_GRAY: Rgb<u8> = Rgb([211, 211, 211]);

/// Columns in the piece sheet.
const SHEET_COLUMNS: u32 = 4;
/// Size of one piece tile in the sheet.
const SHEET_TILE: u32 = 120;
/// Size of one piece cell in the sheet.
const SHEET_CELL: u32 = 20;

/// Converts an HSV color (all components in `0.0..=1.0`) to RGB.
fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> Rgb<u8> {
    let sector = (hue.rem_euclid(1.0) * 6.0).floor();
    let fraction = hue.rem_euclid(1.0) * 6.0 - sector;
    let p = value * (1.0 - saturation);
    let q = value * (1.0 - saturation * fraction);
    let t = value * (1.0 - saturation * (1.0 - fraction));

    let (r, g, b) = match sector as u8 {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    };

    // truncation matches int(c * 255)
    Rgb([(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8])
}

/// One evenly spaced hue per placement.
fn palette(count: usize) -> Vec<Rgb<u8>> {
    (0..count)
        .map(|i| hsv_to_rgb(i as f64 / count as f64, 0.6, 0.9))
        .collect()
}

/// Fills the inclusive pixel rectangle `(x0, y0)..=(x1, y1)`, clipped to the image.
fn fill_rect(image: &mut RgbImage, (x0, y0): (u32, u32), (x1, y1): (u32, u32), color: Rgb<u8>) {
    if image.width() == 0 || image.height() == 0 {
        return;
    }
    let x_end = x1.min(image.width().saturating_sub(1));
    let y_end = y1.min(image.height().saturating_sub(1));
    for y in y0..=y_end {
        for x in x0..=x_end {
            image.put_pixel(x, y, color);
        }
    }
}

/// Draws a one-pixel outline along the inclusive rectangle.
fn outline_rect(image: &mut RgbImage, (x0, y0): (u32, u32), (x1, y1): (u32, u32), color: Rgb<u8>) {
    fill_rect(image, (x0, y0), (x1, y0), color);
    fill_rect(image, (x0, y1), (x1, y1), color);
    fill_rect(image, (x0, y0), (x0, y1), color);
    fill_rect(image, (x1, y0), (x1, y1), color);
}

/// Pixel bounds of a grid cell, inclusive.
fn cell_bounds(cell: usize, side: usize, cell_size: u32) -> ((u32, u32), (u32, u32)) {
    let (row, col) = idx_to_cell(cell, side);
    let x0 = col as u32 * cell_size;
    let y0 = row as u32 * cell_size;
    ((x0, y0), (x0 + cell_size, y0 + cell_size))
}

/// Side of a grid image in pixels, if the cell size is usable.
fn canvas_side(grid: &Grid, cell_size: u32) -> Result<u32> {
    u32::try_from(grid.side())
        .ok()
        .and_then(|side| side.checked_mul(cell_size))
        .filter(|&size| cell_size > 0 && size <= MAX_CANVAS_SIDE)
        .ok_or(Error::CanvasSize {
            side: grid.side(),
            cell_size,
        })
}

fn blank_canvas(grid: &Grid, cell_size: u32) -> Result<RgbImage> {
    let size = canvas_side(grid, cell_size)?;
    Ok(RgbImage::from_pixel(size, size, WHITE))
}

fn shade_blocked(image: &mut RgbImage, grid: &Grid, cell_size: u32) {
    for cell in (0..grid.cell_count()).filter(|&cell| !grid.is_available(cell)) {
        let (top_left, bottom_right) = cell_bounds(cell, grid.side(), cell_size);
        fill_rect(image, top_left, bottom_right, BLOCKED);
    }
}

/// Draws one tiling, each placement in its own hue.
///
/// Blocked cells are gray; placement cells are inset by one pixel so piece
/// borders stay visible. Fails for a zero cell size or an image wider than
/// [`MAX_CANVAS_SIDE`].
pub fn render_solution(grid: &Grid, solution: &[Placement], cell_size: u32) -> Result<RgbImage> {
    let mut image = blank_canvas(grid, cell_size)?;
    shade_blocked(&mut image, grid, cell_size);

    for (placement, color) in solution.iter().zip(palette(solution.len())) {
        for &cell in &placement.cells {
            let ((x0, y0), (x1, y1)) = cell_bounds(cell, grid.side(), cell_size);
            fill_rect(
                &mut image,
                (x0 + 1, y0 + 1),
                (x1.saturating_sub(1), y1.saturating_sub(1)),
                color,
            );
        }
    }

    Ok(image)
}

/// Draws the availability mask alone.
pub fn render_grid(grid: &Grid, cell_size: u32) -> Result<RgbImage> {
    let mut image = blank_canvas(grid, cell_size)?;
    shade_blocked(&mut image, grid, cell_size);
    Ok(image)
}

/// Draws every base piece on a reference sheet, four pieces per row.
pub fn render_pieces(library: &PieceLibrary) -> RgbImage {
    let rows = (library.len() as u32).div_ceil(SHEET_COLUMNS).max(1);
    let mut image = RgbImage::from_pixel(SHEET_COLUMNS * SHEET_TILE, rows * SHEET_TILE, WHITE);

    for (i, piece) in library.pieces().iter().enumerate() {
        let origin_x = (i as u32 % SHEET_COLUMNS) * SHEET_TILE;
        let origin_y = (i as u32 / SHEET_COLUMNS) * SHEET_TILE;
        let (max_row, max_col) = extents(&piece.base);
        let width = (max_col as u32 + 1) * SHEET_CELL;
        let height = (max_row as u32 + 1) * SHEET_CELL;
        let start_x = origin_x + SHEET_TILE.saturating_sub(width) / 2;
        let start_y = origin_y + SHEET_TILE.saturating_sub(height) / 2;

        for &(row, col) in &piece.base {
            let top_left = (
                start_x + col as u32 * SHEET_CELL,
                start_y + row as u32 * SHEET_CELL,
            );
            let bottom_right = (top_left.0 + SHEET_CELL, top_left.1 + SHEET_CELL);
            fill_rect(&mut image, top_left, bottom_right, LIGHT_GRAY);
            outline_rect(&mut image, top_left, bottom_right, BLACK);
        }
    }

    image
}

/// Writes an image as PNG, creating parent directories.
pub fn save_png(image: &RgbImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error(parent, "create directory"))?;
    }
    image.save(path).map_err(|source| Error::Image {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_primary_hues() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Rgb([255, 0, 0]));
        assert_eq!(hsv_to_rgb(1.0 / 3.0, 1.0, 1.0), Rgb([0, 255, 0]));
        assert_eq!(hsv_to_rgb(0.5, 0.0, 1.0), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_palette_has_distinct_colors() {
        let colors = palette(7);
        for (i, color) in colors.iter().enumerate() {
            assert!(!colors[i + 1..].contains(color), "color {i} repeats");
        }
    }

    #[test]
    fn test_solution_image_layout() {
        let grid = Grid::parse_line("1,1,1,1,0,1,1,1,1").unwrap();
        let solution = [Placement {
            piece_index: 0,
            cells: [0, 1, 2, 5],
        }];
        let image = render_solution(&grid, &solution, 10).unwrap();

        assert_eq!(image.dimensions(), (30, 30));
        // blocked cell (1, 1)
        assert_eq!(*image.get_pixel(15, 15), BLOCKED);
        // covered cell (0, 0) interior uses the first hue
        assert_eq!(*image.get_pixel(5, 5), hsv_to_rgb(0.0, 0.6, 0.9));
        // uncovered available cell (2, 0) stays white
        assert_eq!(*image.get_pixel(5, 25), WHITE);
    }

    #[test]
    fn test_unusable_cell_size_is_an_error() {
        let grid = Grid::parse_line("1,0,0,1").unwrap();
        assert!(matches!(
            render_grid(&grid, 0),
            Err(Error::CanvasSize { side: 2, cell_size: 0 })
        ));
        assert!(matches!(
            render_solution(&grid, &[], u32::MAX),
            Err(Error::CanvasSize { .. })
        ));
        assert_eq!(canvas_side(&grid, MAX_CANVAS_SIDE / 2).unwrap(), MAX_CANVAS_SIDE);
        assert!(canvas_side(&grid, MAX_CANVAS_SIDE / 2 + 1).is_err());
    }

    #[test]
    fn test_fill_rect_on_empty_image_is_a_no_op() {
        let mut image = RgbImage::new(0, 0);
        fill_rect(&mut image, (0, 0), (4, 4), BLACK);
        assert_eq!(image.dimensions(), (0, 0));
    }

    #[test]
    fn test_piece_sheet_size() {
        let image = render_pieces(&PieceLibrary::tetrominoes());
        assert_eq!(image.dimensions(), (4 * SHEET_TILE, 2 * SHEET_TILE));
    }

    #[test]
    fn test_save_png_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("grid_0.png");
        let grid = Grid::parse_line("1,0,0,1").unwrap();

        save_png(&render_grid(&grid, 4).unwrap(), &path).unwrap();
        let loaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(loaded.dimensions(), (8, 8));
        assert_eq!(*loaded.get_pixel(5, 1), BLOCKED);
    }
}
