//! JSON configuration of the piece library and score variants.
//!
//! ```json
//! {
//!   "base_pieces": { "I": [[0, 0], [0, 1], [0, 2], [0, 3]] },
//!   "score_variants": [{ "I": 1 }]
//! }
//! ```
//!
//! `base_pieces` keeps file order, which fixes each piece's 1-based code.

use std::fmt;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::{io_error, ConfigError, Error, Result};
use crate::geometry::Coord;
use crate::pieces::{PieceLibrary, TETROMINOES};
use crate::scoring::ScoreVariant;

/// Built-in score variants for the default tetromino library.
///
/// Each row lists scores for I, O, T, S, Z, J, L in that order.
pub const DEFAULT_SCORE_VARIANTS: &[[i64; 7]] = &[
    // prefer straight pieces
    [3, 1, 1, 1, 1, 1, 1],
    // prefer squares
    [1, 3, 1, 1, 1, 1, 1],
    // prefer asymmetric pieces
    [0, 0, 1, 2, 2, 2, 2],
];

/// Piece definitions plus score variants, as loaded from JSON.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(deserialize_with = "ordered_pieces")]
    pub base_pieces: Vec<(String, Vec<Coord>)>,
    #[serde(default)]
    pub score_variants: Vec<FxHashMap<String, i64>>,
}

impl Default for Config {
    fn default() -> Self {
        let base_pieces = TETROMINOES
            .iter()
            .map(|(name, shape)| (name.to_string(), shape.to_vec()))
            .collect();
        let score_variants = DEFAULT_SCORE_VARIANTS
            .iter()
            .map(|scores| {
                TETROMINOES
                    .iter()
                    .zip(scores)
                    .map(|((name, _), &score)| (name.to_string(), score))
                    .collect()
            })
            .collect();

        Self {
            base_pieces,
            score_variants,
        }
    }
}

impl Config {
    /// Parses a configuration from JSON text.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Loads a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(io_error(path, "read config"))?;
        Self::from_json(&text).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Builds the rotation table for the configured pieces.
    pub fn piece_library(&self) -> std::result::Result<PieceLibrary, ConfigError> {
        PieceLibrary::new(self.base_pieces.iter().cloned())
    }

    /// Resolves score variants against a library.
    ///
    /// Every variant must score every piece; extra names are ignored.
    pub fn score_variants(
        &self,
        library: &PieceLibrary,
    ) -> std::result::Result<Vec<ScoreVariant>, ConfigError> {
        self.score_variants
            .iter()
            .enumerate()
            .map(|(variant, scores)| {
                library
                    .pieces()
                    .iter()
                    .map(|piece| {
                        scores
                            .get(&piece.name)
                            .copied()
                            .ok_or_else(|| ConfigError::MissingScore {
                                variant: variant + 1,
                                piece: piece.name.clone(),
                            })
                    })
                    .collect::<std::result::Result<Vec<i64>, _>>()
                    .map(ScoreVariant::new)
            })
            .collect()
    }
}

/// Deserializes a JSON object into `(key, value)` pairs in file order.
fn ordered_pieces<'de, D>(deserializer: D) -> std::result::Result<Vec<(String, Vec<Coord>)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedPieces;

    impl<'de> Visitor<'de> for OrderedPieces {
        type Value = Vec<(String, Vec<Coord>)>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a map from piece name to a list of [row, col] pairs")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut pieces = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, coords)) = map.next_entry::<String, Vec<Coord>>()? {
                pieces.push((name, coords));
            }
            Ok(pieces)
        }
    }

    deserializer.deserialize_map(OrderedPieces)
}
