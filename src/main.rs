//! Tetromino Tiler
//!
//! Reads square grids of available cells, one comma-separated line per grid,
//! and finds every way to tile the available cells with tetrominoes. Tilings
//! can be counted, drawn as PNG images, or encoded to disk and drawn later.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use tiler::config::Config;
use tiler::error::{io_error, Error, Result};
use tiler::grid::{self, Grid};
use tiler::persistence::{self, EncodingFormat};
use tiler::pieces::{PieceLibrary, Solution};
use tiler::render::{self, DEFAULT_CELL_SIZE};
use tiler::scoring::ScoreVariant;
use tiler::solver;

/// Discovers and draws tetromino tilings of N×N grids.
#[derive(Parser)]
#[command(name = "tiler")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input file with one comma-separated 0/1 grid per line.
    #[arg(short, long, global = true, default_value = "input.txt")]
    input: PathBuf,

    /// Directory for images and saved solutions.
    #[arg(short, long, global = true, default_value = "outputs")]
    output_dir: PathBuf,

    /// JSON file with base pieces and score variants.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Pixels per grid cell.
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_CELL_SIZE,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    cell_size: u32,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Clone, Subcommand)]
enum Command {
    /// Solve every grid and draw the best tiling for each score variant.
    Solve,
    /// Solve every grid, print every tiling and draw it.
    All,
    /// Print the number of tilings of each grid.
    Count {
        /// Stop counting a grid after this many tilings.
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Solve every grid and save the encoded tilings.
    Save {
        #[arg(short, long, value_enum, default_value_t)]
        format: EncodingFormat,
    },
    /// Draw previously saved tilings without solving again.
    Decode {
        #[arg(short, long, value_enum, default_value_t)]
        format: EncodingFormat,
    },
    /// Draw each grid's availability mask without solving.
    Raw,
    /// Draw a reference sheet of the configured pieces.
    Shapes {
        #[arg(long, default_value = "outputs/all_shapes_debug.png")]
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let library = config.piece_library()?;

    match cli.command.clone().unwrap_or(Command::Solve) {
        Command::Solve => {
            let variants = config.score_variants(&library)?;
            run_solve(cli, &library, &variants)
        }
        Command::All => run_all(cli, &library),
        Command::Count { limit } => run_count(cli, &library, limit),
        Command::Save { format } => run_save(cli, &library, format),
        Command::Decode { format } => run_decode(cli, &library, format),
        Command::Raw => run_raw(cli),
        Command::Shapes { path } => {
            render::save_png(&render::render_pieces(&library), &path)?;
            println!("Saved piece sheet to {}", path.display());
            Ok(())
        }
    }
}

/// Reads the input file, skipping grids that fail to parse.
fn read_grids(path: &Path) -> Result<Vec<(usize, Grid)>> {
    let text = std::fs::read_to_string(path).map_err(io_error(path, "read input"))?;

    Ok(grid::load_grids(&text)
        .into_iter()
        .enumerate()
        .filter_map(|(index, grid)| match grid {
            Ok(grid) => Some((index, grid)),
            Err(source) => {
                log::error!("{}, skipping", Error::Grid { index, source });
                None
            }
        })
        .collect())
}

/// Solves one grid and reports the count.
///
/// Returns `None` for grids with no available cells and for grids whose
/// cell count cannot be tiled; the batch continues either way.
fn solve_grid(
    index: usize,
    grid: &Grid,
    library: &PieceLibrary,
    limit: Option<usize>,
) -> Option<Vec<Solution>> {
    let side = grid.side();
    if grid.available_count() == 0 {
        println!("Grid #{index} ({side}×{side}): empty, skipping");
        return None;
    }

    match solver::enumerate_tilings_limited(grid, library, limit) {
        Ok(solutions) => {
            println!("Grid #{index} ({side}×{side}): {} solution(s)", solutions.len());
            Some(solutions)
        }
        Err(source) => {
            log::error!("{}, skipping", Error::Tiling { index, source });
            None
        }
    }
}

/// Draws the best tiling of each grid under every score variant.
fn run_solve(cli: &Cli, library: &PieceLibrary, variants: &[ScoreVariant]) -> Result<()> {
    if variants.is_empty() {
        log::warn!("No score variants configured; nothing will be drawn");
    }

    for (index, grid) in read_grids(&cli.input)? {
        let Some(solutions) = solve_grid(index, &grid, library, None) else {
            continue;
        };

        for (variant_id, variant) in variants.iter().enumerate().map(|(i, v)| (i + 1, v)) {
            let Some((score, best)) = variant.best(&solutions) else {
                continue;
            };
            println!("  Variant {variant_id}: score={score}");
            let path = cli
                .output_dir
                .join(format!("grid_{index}_variant{variant_id}.png"));
            render::save_png(&render::render_solution(&grid, best, cli.cell_size)?, &path)?;
        }
    }

    Ok(())
}

/// Prints and draws every tiling of every grid.
fn run_all(cli: &Cli, library: &PieceLibrary) -> Result<()> {
    for (index, grid) in read_grids(&cli.input)? {
        let Some(solutions) = solve_grid(index, &grid, library, None) else {
            continue;
        };

        for (i, solution) in solutions.iter().enumerate() {
            println!("  Solution {}:", i + 1);
            print!("{}", grid::format_solution(&grid, solution));
            let path = cli.output_dir.join(format!("grid_{index}_sol{}.png", i + 1));
            render::save_png(&render::render_solution(&grid, solution, cli.cell_size)?, &path)?;
        }
    }

    Ok(())
}

fn run_count(cli: &Cli, library: &PieceLibrary, limit: Option<usize>) -> Result<()> {
    for (index, grid) in read_grids(&cli.input)? {
        solve_grid(index, &grid, library, limit);
    }
    Ok(())
}

/// Solves every grid and writes all encoded tilings to one file.
fn run_save(cli: &Cli, library: &PieceLibrary, format: EncodingFormat) -> Result<()> {
    let mut records = Vec::new();
    for (index, grid) in read_grids(&cli.input)? {
        if let Some(solutions) = solve_grid(index, &grid, library, None) {
            records.extend(persistence::encode_all(index, &grid, &solutions));
        }
    }

    let path = persistence::save(&records, &cli.output_dir, format)?;
    println!("Saved {} encodings to {}", records.len(), path.display());
    Ok(())
}

/// Loads saved tilings and draws each over its grid.
fn run_decode(cli: &Cli, library: &PieceLibrary, format: EncodingFormat) -> Result<()> {
    let grids = read_grids(&cli.input)?;
    let records = persistence::load(&cli.output_dir, format)?;

    for record in records {
        let Some((_, grid)) = grids.iter().find(|(index, _)| *index == record.grid) else {
            log::warn!("Saved solution refers to unknown grid #{}, skipping", record.grid);
            continue;
        };
        if record.encoding.len() != grid.side() {
            log::warn!(
                "Saved solution {} does not match the size of grid #{}, skipping",
                record.solution,
                record.grid
            );
            continue;
        }

        let solution = persistence::decode_solution(&record.encoding, library).map_err(|source| {
            Error::Decode {
                path: persistence::solutions_path(&cli.output_dir, format),
                source,
            }
        })?;
        let path = cli
            .output_dir
            .join(format!("grid_{}_sol{}.png", record.grid, record.solution));
        render::save_png(&render::render_solution(grid, &solution, cli.cell_size)?, &path)?;
        println!("Drew decoded grid {} solution {}", record.grid, record.solution);
    }

    Ok(())
}

/// Draws every grid's mask without solving.
fn run_raw(cli: &Cli) -> Result<()> {
    for (index, grid) in read_grids(&cli.input)? {
        let path = cli.output_dir.join(format!("grid_{index}.png"));
        render::save_png(&render::render_grid(&grid, cli.cell_size)?, &path)?;
    }
    Ok(())
}
