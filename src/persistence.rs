//! File I/O for saving and loading encoded solutions.
//!
//! A solution is stored as a tag grid: one string per cell, `"0"` for cells
//! no placement covers, otherwise `"{code}.{k}"` where `code` is the piece's
//! 1-based library position and `k` numbers that piece's placements in
//! solution order.
//!
//! Formats for `solutions.<ext>`:
//! - `json`: array of [`EncodedSolution`] records
//! - `csv`: header `grid,solution,shapes_used,encoding`, shapes separated by
//!   spaces, encoding rows joined by `/` with tags separated by spaces
//! - `txt`: per record a `grid <g> solution <s> shapes <c>...` line, one line
//!   of space-separated tags per grid row, then a blank line

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{io_error, DecodeError, Error, Result};
use crate::grid::{cell_to_idx, idx_to_cell, Grid};
use crate::pieces::{PieceLibrary, Placement, Solution, CELLS_PER_PIECE};

const SOLUTIONS_STEM: &str = "solutions";
const CSV_HEADER: &str = "grid,solution,shapes_used,encoding";

/// On-disk format for encoded solutions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum EncodingFormat {
    #[default]
    Json,
    Csv,
    Txt,
}

impl EncodingFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Txt => "txt",
        }
    }
}

/// One stored solution of one grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedSolution {
    /// Grid id (position among the input's grid lines).
    pub grid: usize,
    /// 1-based solution id within the grid.
    pub solution: usize,
    pub encoding: Vec<Vec<String>>,
    /// Distinct piece codes in the solution, descending.
    pub shapes_used: Vec<usize>,
}

/// Path of the solutions file for a format inside `output_dir`.
pub fn solutions_path(output_dir: &Path, format: EncodingFormat) -> PathBuf {
    output_dir.join(format!("{SOLUTIONS_STEM}.{}", format.extension()))
}

/// Encodes a solution as a `side`×`side` tag grid.
///
/// Returns `None` for an empty solution.
pub fn encode_solution(side: usize, solution: &[Placement]) -> Option<Vec<Vec<String>>> {
    if solution.is_empty() {
        return None;
    }

    let mut tags = vec![vec!["0".to_string(); side]; side];
    let mut instances: FxHashMap<usize, usize> = FxHashMap::default();

    for placement in solution {
        let code = placement.piece_index + 1;
        let instance = instances.entry(code).or_insert(0);
        *instance += 1;
        let tag = format!("{code}.{instance}");

        for &cell in &placement.cells {
            let (row, col) = idx_to_cell(cell, side);
            if let Some(slot) = tags.get_mut(row).and_then(|r| r.get_mut(col)) {
                slot.clone_from(&tag);
            }
        }
    }

    Some(tags)
}

/// Distinct 1-based piece codes used by a solution, descending.
pub fn shapes_used(solution: &[Placement]) -> Vec<usize> {
    let mut codes: Vec<usize> = solution.iter().map(|p| p.piece_index + 1).collect();
    codes.sort_unstable_by(|a, b| b.cmp(a));
    codes.dedup();
    codes
}

/// Encodes every non-empty solution of one grid, numbering solutions from 1.
pub fn encode_all(grid_id: usize, grid: &Grid, solutions: &[Solution]) -> Vec<EncodedSolution> {
    solutions
        .iter()
        .enumerate()
        .filter_map(|(i, solution)| {
            encode_solution(grid.side(), solution).map(|encoding| EncodedSolution {
                grid: grid_id,
                solution: i + 1,
                encoding,
                shapes_used: shapes_used(solution),
            })
        })
        .collect()
}

/// Rebuilds placements from a tag grid.
///
/// Cells sharing a tag form one placement; placements are ordered by the
/// row-major position of their first cell.
pub fn decode_solution(
    encoding: &[Vec<String>],
    library: &PieceLibrary,
) -> std::result::Result<Solution, DecodeError> {
    let side = encoding.len();
    let mut groups: Vec<((usize, usize), Vec<usize>)> = Vec::new();
    let mut group_by_tag: FxHashMap<(usize, usize), usize> = FxHashMap::default();

    for (row, tags) in encoding.iter().enumerate() {
        if tags.len() != side {
            return Err(DecodeError::RaggedEncoding {
                row,
                len: tags.len(),
                side,
            });
        }

        for (col, tag) in tags.iter().enumerate() {
            if tag == "0" {
                continue;
            }
            let key = parse_tag(tag).ok_or_else(|| DecodeError::InvalidTag {
                tag: tag.clone(),
                row,
                col,
            })?;
            let group = *group_by_tag.entry(key).or_insert_with(|| {
                groups.push((key, Vec::with_capacity(CELLS_PER_PIECE)));
                groups.len() - 1
            });
            groups[group].1.push(cell_to_idx(row, col, side));
        }
    }

    groups
        .into_iter()
        .map(|((code, instance), cells)| {
            let cells: [usize; CELLS_PER_PIECE] =
                cells
                    .as_slice()
                    .try_into()
                    .map_err(|_| DecodeError::WrongGroupSize {
                        code,
                        instance,
                        count: cells.len(),
                    })?;
            let piece_index = code
                .checked_sub(1)
                .filter(|&i| i < library.len())
                .ok_or(DecodeError::UnknownPieceCode(code))?;
            Ok(Placement { piece_index, cells })
        })
        .collect()
}

fn parse_tag(tag: &str) -> Option<(usize, usize)> {
    let (code, instance) = tag.split_once('.')?;
    let is_number = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !is_number(code) || !is_number(instance) {
        return None;
    }
    Some((code.parse().ok()?, instance.parse().ok()?))
}

/// Saves records to `solutions.<ext>` in `output_dir`, creating the directory.
///
/// Returns the path written.
pub fn save(
    records: &[EncodedSolution],
    output_dir: &Path,
    format: EncodingFormat,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir).map_err(io_error(output_dir, "create directory"))?;
    let path = solutions_path(output_dir, format);

    match format {
        EncodingFormat::Json => save_json(records, &path)?,
        EncodingFormat::Csv => {
            fs::write(&path, to_csv(records)).map_err(io_error(&path, "write solutions"))?
        }
        EncodingFormat::Txt => {
            fs::write(&path, to_txt(records)).map_err(io_error(&path, "write solutions"))?
        }
    }

    log::debug!("Saved {} encoded solutions to {}", records.len(), path.display());
    Ok(path)
}

fn save_json(records: &[EncodedSolution], path: &Path) -> Result<()> {
    let file = File::create(path).map_err(io_error(path, "create solutions"))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, records).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_error(path, "flush solutions"))
}

/// Loads all records saved in `output_dir` in the given format.
pub fn load(output_dir: &Path, format: EncodingFormat) -> Result<Vec<EncodedSolution>> {
    let path = solutions_path(output_dir, format);
    let text = fs::read_to_string(&path).map_err(io_error(&path, "read solutions"))?;

    let parsed = match format {
        EncodingFormat::Json => {
            return serde_json::from_str(&text).map_err(|source| Error::Json { path, source })
        }
        EncodingFormat::Csv => parse_csv(&text),
        EncodingFormat::Txt => parse_txt(&text),
    };
    parsed.map_err(|source| Error::Decode { path, source })
}

fn join_codes(codes: &[usize]) -> String {
    codes
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn to_csv(records: &[EncodedSolution]) -> String {
    let mut output = String::from(CSV_HEADER);
    output.push('\n');
    for record in records {
        let rows: Vec<String> = record.encoding.iter().map(|row| row.join(" ")).collect();
        let _ = writeln!(
            output,
            "{},{},{},{}",
            record.grid,
            record.solution,
            join_codes(&record.shapes_used),
            rows.join("/")
        );
    }
    output
}

fn to_txt(records: &[EncodedSolution]) -> String {
    let mut output = String::new();
    for record in records {
        let _ = writeln!(
            output,
            "grid {} solution {} shapes {}",
            record.grid,
            record.solution,
            join_codes(&record.shapes_used)
        );
        for row in &record.encoding {
            let _ = writeln!(output, "{}", row.join(" "));
        }
        output.push('\n');
    }
    output
}

fn malformed(line: usize, reason: impl Into<String>) -> DecodeError {
    DecodeError::MalformedRecord {
        line,
        reason: reason.into(),
    }
}

fn parse_number(field: &str, line: usize, what: &str) -> std::result::Result<usize, DecodeError> {
    field
        .trim()
        .parse()
        .map_err(|_| malformed(line, format!("invalid {what} '{field}'")))
}

fn parse_codes(field: &str, line: usize) -> std::result::Result<Vec<usize>, DecodeError> {
    field
        .split_whitespace()
        .map(|code| parse_number(code, line, "piece code"))
        .collect()
}

fn parse_row(row: &str) -> Vec<String> {
    row.split_whitespace().map(str::to_string).collect()
}

fn parse_csv(text: &str) -> std::result::Result<Vec<EncodedSolution>, DecodeError> {
    let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

    match lines.next() {
        Some((_, header)) if header.trim() == CSV_HEADER => {}
        Some((i, _)) => return Err(malformed(i + 1, "missing CSV header")),
        None => return Ok(Vec::new()),
    }

    lines
        .map(|(i, line)| {
            let line_no = i + 1;
            let fields: Vec<&str> = line.split(',').collect();
            let [grid, solution, shapes, encoding] = fields.as_slice() else {
                return Err(malformed(line_no, format!("expected 4 fields, found {}", fields.len())));
            };
            Ok(EncodedSolution {
                grid: parse_number(grid, line_no, "grid id")?,
                solution: parse_number(solution, line_no, "solution id")?,
                encoding: encoding.split('/').map(parse_row).collect(),
                shapes_used: parse_codes(shapes, line_no)?,
            })
        })
        .collect()
}

fn parse_txt(text: &str) -> std::result::Result<Vec<EncodedSolution>, DecodeError> {
    let mut records = Vec::new();
    let mut current: Option<EncodedSolution> = None;

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = line.trim();

        if line.is_empty() {
            records.extend(current.take());
        } else if line.starts_with("grid ") {
            records.extend(current.take());
            current = Some(parse_txt_header(line, line_no)?);
        } else if let Some(record) = current.as_mut() {
            record.encoding.push(parse_row(line));
        } else {
            return Err(malformed(line_no, "tag row outside of a solution block"));
        }
    }

    records.extend(current);
    Ok(records)
}

fn parse_txt_header(
    line: &str,
    line_no: usize,
) -> std::result::Result<EncodedSolution, DecodeError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let ["grid", grid, "solution", solution, "shapes", codes @ ..] = tokens.as_slice() else {
        return Err(malformed(line_no, "expected 'grid <g> solution <s> shapes <codes>'"));
    };

    Ok(EncodedSolution {
        grid: parse_number(grid, line_no, "grid id")?,
        solution: parse_number(solution, line_no, "solution id")?,
        encoding: Vec::new(),
        shapes_used: parse_codes(&codes.join(" "), line_no)?,
    })
}
