//! Ranking of solutions by per-piece score tables.

use crate::pieces::{Placement, Solution};

/// Score of each piece, indexed by piece index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreVariant {
    scores: Vec<i64>,
}

impl ScoreVariant {
    pub fn new(scores: Vec<i64>) -> Self {
        Self { scores }
    }

    /// Score of one piece; pieces outside the table score zero.
    pub fn score_of(&self, piece_index: usize) -> i64 {
        self.scores.get(piece_index).copied().unwrap_or(0)
    }

    /// Sum of piece scores over a solution.
    pub fn score(&self, solution: &[Placement]) -> i64 {
        solution
            .iter()
            .map(|placement| self.score_of(placement.piece_index))
            .sum()
    }

    /// Returns the highest-scoring solution with its score.
    ///
    /// Ties go to the earliest solution. Returns `None` for an empty list.
    pub fn best<'s>(&self, solutions: &'s [Solution]) -> Option<(i64, &'s Solution)> {
        let mut best: Option<(i64, &Solution)> = None;
        for solution in solutions {
            let score = self.score(solution);
            if best.map_or(true, |(top, _)| score > top) {
                best = Some((score, solution));
            }
        }
        best
    }
}
