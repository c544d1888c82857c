//! 2D rotation and normalization utilities.
//!
//! A shape on the square lattice has at most 4 orientations under rotation
//! (0, 90, 180 and 270 degrees). Reflections are not generated: mirror-image
//! pieces are listed separately in the piece library.

/// A `(row, col)` offset in a piece's own frame.
pub type Coord = (i32, i32);

/// Rotates every coordinate by 90 degrees: `(r, c) -> (c, -r)`.
///
/// The result is not normalized and may contain negative offsets.
pub fn rotate(shape: &[Coord]) -> Vec<Coord> {
    shape.iter().map(|&(row, col)| (col, -row)).collect()
}

/// Translates a shape so its minimum row and column are both zero, then
/// sorts the coordinates.
///
/// Two shapes are the same orientation iff their normalized forms are equal.
pub fn normalize(shape: &[Coord]) -> Vec<Coord> {
    let min_row = shape.iter().map(|&(row, _)| row).min().unwrap_or(0);
    let min_col = shape.iter().map(|&(_, col)| col).min().unwrap_or(0);

    let mut normalized: Vec<Coord> = shape
        .iter()
        .map(|&(row, col)| (row - min_row, col - min_col))
        .collect();
    normalized.sort_unstable();
    normalized
}

/// Generates all distinct orientations of a shape under rotation.
///
/// Starts from the identity and applies [`rotate`] three more times,
/// keeping the first occurrence of each normalized form in generation order.
/// The result always has 1, 2 or 4 entries.
pub fn all_rotations(base: &[Coord]) -> Vec<Vec<Coord>> {
    let mut seen = rustc_hash::FxHashSet::default();
    let mut rotations = Vec::with_capacity(4);
    let mut current = base.to_vec();

    for _ in 0..4 {
        let normalized = normalize(&current);
        if seen.insert(normalized.clone()) {
            rotations.push(normalized);
        }
        current = rotate(&current);
    }

    rotations
}

/// Returns the largest row and column offsets of a shape.
///
/// For a normalized shape this is its bounding box minus one in each axis.
pub fn extents(shape: &[Coord]) -> (i32, i32) {
    let max_row = shape.iter().map(|&(row, _)| row).max().unwrap_or(0);
    let max_col = shape.iter().map(|&(_, col)| col).max().unwrap_or(0);
    (max_row, max_col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::TETROMINOES;

    #[test]
    fn test_rotate_maps_row_to_negative_col() {
        assert_eq!(rotate(&[(0, 0), (1, 2), (-3, 4)]), vec![(0, 0), (2, -1), (4, 3)]);
    }

    #[test]
    fn test_normalize_anchors_at_origin_and_sorts() {
        let shape = [(5, -1), (3, 0), (4, -2), (3, -2)];
        assert_eq!(normalize(&shape), vec![(0, 0), (0, 2), (1, 0), (2, 1)]);
    }

    #[test]
    fn test_normalize_is_translation_invariant() {
        let shape = [(0, 0), (0, 1), (1, 1), (1, 2)];
        let shifted: Vec<Coord> = shape.iter().map(|&(r, c)| (r + 7, c - 3)).collect();
        assert_eq!(normalize(&shape), normalize(&shifted));
    }

    #[test]
    fn test_four_rotations_return_to_start() {
        for (name, base) in TETROMINOES {
            let mut current = base.to_vec();
            for _ in 0..4 {
                current = rotate(&current);
            }
            assert_eq!(normalize(&current), normalize(base), "piece {name}");
        }
    }

    #[test]
    fn test_rotation_counts_for_tetrominoes() {
        let expected = [("I", 2), ("O", 1), ("T", 4), ("S", 2), ("Z", 2), ("J", 4), ("L", 4)];
        for ((name, base), (expected_name, count)) in TETROMINOES.iter().zip(expected) {
            assert_eq!(*name, expected_name);
            assert_eq!(all_rotations(base).len(), count, "piece {name}");
        }
    }

    #[test]
    fn test_rotation_count_is_never_three() {
        for (name, base) in TETROMINOES {
            let rotations = all_rotations(base);
            assert!(
                matches!(rotations.len(), 1 | 2 | 4),
                "piece {name} has {} rotations",
                rotations.len()
            );
        }
    }

    #[test]
    fn test_rotations_keep_generation_order() {
        let t_piece = [(0, 0), (0, 1), (0, 2), (1, 1)];
        assert_eq!(
            all_rotations(&t_piece),
            vec![
                vec![(0, 0), (0, 1), (0, 2), (1, 1)],
                vec![(0, 1), (1, 0), (1, 1), (2, 1)],
                vec![(0, 1), (1, 0), (1, 1), (1, 2)],
                vec![(0, 0), (1, 0), (1, 1), (2, 0)],
            ]
        );
    }

    #[test]
    fn test_rotations_are_distinct_and_normalized() {
        for (name, base) in TETROMINOES {
            let rotations = all_rotations(base);
            for (i, rotation) in rotations.iter().enumerate() {
                assert_eq!(&normalize(rotation), rotation, "piece {name} rotation {i}");
                for other in &rotations[i + 1..] {
                    assert_ne!(rotation, other, "piece {name} has duplicate rotations");
                }
            }
        }
    }

    #[test]
    fn test_extents_of_vertical_bar() {
        assert_eq!(extents(&[(0, 0), (1, 0), (2, 0), (3, 0)]), (3, 0));
    }
}
