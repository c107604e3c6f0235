#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that batch-solves Lockstep puzzles.
//!
//! By default every catalog entry is solved in order, each winning solution
//! is verified by replay and rendered step by step, and a diagnostics line
//! reports how much work the search performed. Individual entries, board
//! files, and single-line share strings are handled through flags.

mod catalog;
mod share;

use std::{fs, path::PathBuf, time::Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use lockstep_core::{CellCoord, SearchOutcome, SearchReport};
use lockstep_system_solver::{Frame, Solver};
use lockstep_world::Board;

use catalog::CatalogEntry;
use share::PuzzleSnapshot;

/// Cost bound applied when neither the catalog nor the caller names one.
const DEFAULT_COST_LIMIT: u32 = 45;

/// Command-line arguments accepted by the `lockstep` binary.
#[derive(Debug, Parser)]
#[command(name = "lockstep", about = "Solve pressure-spike grid puzzles")]
struct Args {
    /// Zero-based catalog entry to solve; solves the whole catalog when
    /// absent.
    #[arg(long, conflicts_with_all = ["board", "from_share", "share"])]
    puzzle: Option<usize>,

    /// List the built-in catalog and exit.
    #[arg(long)]
    list: bool,

    /// Solve a board text file instead of a catalog entry.
    #[arg(long, conflicts_with = "from_share")]
    board: Option<PathBuf>,

    /// Waypoint to visit before the goal, as COLUMN,ROW; repeat the flag to
    /// chain waypoints in order. Only meaningful together with --board.
    #[arg(long = "waypoint", value_parser = parse_waypoint, requires = "board")]
    waypoints: Vec<CellCoord>,

    /// Maximum accumulated path cost the search explores. Defaults to the
    /// catalog entry's bound, or 45 for boards and share strings.
    #[arg(long)]
    cost_limit: Option<u32>,

    /// Print the share string for a catalog entry and exit.
    #[arg(long)]
    share: Option<usize>,

    /// Solve a puzzle encoded as a share string.
    #[arg(long)]
    from_share: Option<String>,

    /// Skip rendering each step of winning solutions.
    #[arg(long)]
    no_frames: bool,
}

/// Entry point for the Lockstep command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();

    if args.list {
        list_catalog();
        return Ok(());
    }

    if let Some(index) = args.share {
        let entry = catalog_entry(index)?;
        println!("{}", share_string(entry)?);
        return Ok(());
    }

    if let Some(token) = args.from_share.as_deref() {
        let snapshot = PuzzleSnapshot::decode(token).context("share string failed to decode")?;
        let cost_limit = args.cost_limit.unwrap_or(DEFAULT_COST_LIMIT);
        return solve_puzzle(
            &snapshot.name,
            &snapshot.board,
            &snapshot.waypoints,
            cost_limit,
            !args.no_frames,
        );
    }

    if let Some(path) = args.board.as_deref() {
        let text = fs::read_to_string(path)
            .with_context(|| format!("could not read board file {}", path.display()))?;
        let cost_limit = args.cost_limit.unwrap_or(DEFAULT_COST_LIMIT);
        return solve_puzzle(
            &path.display().to_string(),
            &text,
            &args.waypoints,
            cost_limit,
            !args.no_frames,
        );
    }

    match args.puzzle {
        Some(index) => {
            let entry = catalog_entry(index)?;
            solve_entry(entry, args.cost_limit, !args.no_frames)
        }
        None => {
            for entry in catalog::ENTRIES {
                solve_entry(entry, args.cost_limit, !args.no_frames)?;
            }
            Ok(())
        }
    }
}

fn solve_entry(entry: &CatalogEntry, cost_limit: Option<u32>, show_frames: bool) -> Result<()> {
    solve_puzzle(
        entry.name,
        entry.board,
        entry.waypoints,
        cost_limit.unwrap_or(entry.cost_limit),
        show_frames,
    )
}

fn solve_puzzle(
    name: &str,
    board_text: &str,
    waypoints: &[CellCoord],
    cost_limit: u32,
    show_frames: bool,
) -> Result<()> {
    println!("== {name}");

    let mut solver = Solver::new(board_text, waypoints)
        .with_context(|| format!("puzzle '{name}' failed to load"))?;
    let started = Instant::now();
    let SearchReport {
        outcome,
        diagnostics,
    } = solver.search(cost_limit);
    let elapsed = started.elapsed();

    match outcome {
        SearchOutcome::Won(solution) => {
            let steps: String = solution
                .steps
                .iter()
                .map(|step| step.direction.code())
                .collect();
            println!(
                "solved with cost {} in {} steps: {steps}",
                solution.cost,
                solution.steps.len()
            );

            if show_frames {
                let frames = solver
                    .replay(&solution)
                    .with_context(|| format!("puzzle '{name}' failed solution verification"))?;
                for frame in &frames {
                    print_frame(frame);
                }
            }
        }
        SearchOutcome::Exhausted => println!("no solution within the reachable states"),
        SearchOutcome::BoundExceeded => {
            println!("no solution within cost bound {cost_limit}");
        }
    }

    println!(
        "{} iterations, peak frontier {}, {} distinct states, {elapsed:?} elapsed\n",
        diagnostics.iterations, diagnostics.peak_frontier, diagnostics.distinct_states
    );
    Ok(())
}

fn print_frame(frame: &Frame) {
    println!("{}", frame.rendered);
    match frame.direction {
        Some(direction) => println!("cost {} after {direction}\n", frame.cost),
        None => println!("total cost {}\n", frame.cost),
    }
}

fn list_catalog() {
    for (index, entry) in catalog::ENTRIES.iter().enumerate() {
        println!(
            "{index}: {} ({} waypoints, cost bound {})",
            entry.name,
            entry.waypoints.len(),
            entry.cost_limit
        );
    }
}

fn share_string(entry: &CatalogEntry) -> Result<String> {
    let board = Board::parse(entry.board)
        .with_context(|| format!("catalog entry '{}' failed to parse", entry.name))?;
    let snapshot = PuzzleSnapshot {
        name: entry.name.to_owned(),
        board: entry.board.to_owned(),
        waypoints: entry.waypoints.to_vec(),
    };
    Ok(snapshot.encode(board.width(), board.height()))
}

fn catalog_entry(index: usize) -> Result<&'static CatalogEntry> {
    catalog::ENTRIES.get(index).ok_or_else(|| {
        anyhow!(
            "no catalog entry {index}; the catalog holds {} puzzles",
            catalog::ENTRIES.len()
        )
    })
}

fn parse_waypoint(value: &str) -> Result<CellCoord, String> {
    let (column, row) = value
        .split_once(',')
        .ok_or_else(|| format!("expected COLUMN,ROW, got '{value}'"))?;
    let column = column
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid column in '{value}'"))?;
    let row = row
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid row in '{value}'"))?;
    Ok(CellCoord::new(column, row))
}
