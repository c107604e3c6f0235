#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Best-first search over puzzle states, with waypoint ordering, a cost
//! bound, spike-phase-aware deduplication, and solution replay.
//!
//! The solver is a pure system over the world engine: every expansion
//! checks out an ancestor snapshot, trials one move, and decides whether
//! the successor deserves a frontier slot. Tractability rests on two
//! filters working together. The global `(location, cost, state)` set
//! suppresses exact duplicates, while the per-path stagnation guard stops
//! paths from oscillating across spike toggles that never change the board
//! structurally.

use std::{
    cmp::{Ordering, Reverse},
    collections::{BinaryHeap, HashSet},
};

use lockstep_core::{
    BoardError, CellCoord, Direction, Event, MoveRecord, Player, SearchDiagnostics, SearchOutcome,
    SearchReport, Solution, StateId,
};
use lockstep_world::{self as world, query, Engine};
use thiserror::Error;

/// Best-first searcher for one puzzle.
///
/// Construct it from a board text plus the waypoints that must be visited,
/// in order, before the goal; the goal itself is always the final link of
/// the waypoint chain.
#[derive(Debug)]
pub struct Solver {
    engine: Engine,
    waypoints: Vec<CellCoord>,
}

impl Solver {
    /// Loads a puzzle and fixes its required waypoint order.
    pub fn new(board_text: &str, waypoints: &[CellCoord]) -> Result<Self, BoardError> {
        let engine = Engine::new(board_text)?;
        let mut chain = waypoints.to_vec();
        chain.push(query::goal(&engine));
        Ok(Self {
            engine,
            waypoints: chain,
        })
    }

    /// Runs the search until it wins, exhausts the reachable states, or
    /// pops a node whose accumulated cost exceeds `cost_limit`.
    ///
    /// The bound overrun is an expected outcome, reported as
    /// [`SearchOutcome::BoundExceeded`] — callers size the bound to keep
    /// frontier growth in check.
    pub fn search(&mut self, cost_limit: u32) -> SearchReport {
        let mut frontier = BinaryHeap::new();
        let mut admitted: HashSet<(CellCoord, u32, StateId)> = HashSet::new();
        let mut diagnostics = SearchDiagnostics::default();
        let mut events: Vec<Event> = Vec::new();

        let initial = query::initial_state(&self.engine);
        let mut start = Player::at(query::start(&self.engine));
        let priority = self.priority_for(&start);
        start.set_priority(priority);
        frontier.push(Reverse(FrontierEntry {
            player: start,
            state: initial,
        }));
        diagnostics.peak_frontier = 1;

        while let Some(Reverse(entry)) = frontier.pop() {
            let FrontierEntry { mut player, state } = entry;

            // At most one waypoint can be satisfied per pop; the chain is
            // consumed strictly in order.
            if let Some(&waypoint) = self.waypoints.get(player.waypoints_done().len()) {
                if player.location() == waypoint {
                    player.mark_waypoint(waypoint);
                }
            }

            // The goal is the chain's final link, so a full chain means the
            // player stands on the goal with every waypoint behind it.
            if player.waypoints_done().len() == self.waypoints.len() {
                diagnostics.distinct_states = query::snapshot_count(&self.engine);
                return SearchReport {
                    outcome: SearchOutcome::Won(Solution {
                        cost: player.cost(),
                        steps: player.steps().to_vec(),
                    }),
                    diagnostics,
                };
            }

            if player.cost() > cost_limit {
                diagnostics.distinct_states = query::snapshot_count(&self.engine);
                return SearchReport {
                    outcome: SearchOutcome::BoundExceeded,
                    diagnostics,
                };
            }

            for direction in Direction::ALL {
                world::restore(&mut self.engine, state, player.clone());
                events.clear();
                let Some(next_state) = world::apply_move(&mut self.engine, direction, &mut events)
                else {
                    continue;
                };

                let mut successor = query::player(&self.engine).clone();
                let key = (successor.location(), successor.cost(), next_state);
                if admitted.contains(&key) {
                    continue;
                }
                if !self.breaks_stagnation(&mut successor, next_state) {
                    continue;
                }

                successor.record_step(MoveRecord {
                    direction,
                    origin: state,
                });
                let priority = self.priority_for(&successor);
                successor.set_priority(priority);
                let _ = admitted.insert(key);
                frontier.push(Reverse(FrontierEntry {
                    player: successor,
                    state: next_state,
                }));
            }

            diagnostics.iterations += 1;
            diagnostics.peak_frontier = diagnostics.peak_frontier.max(frontier.len());
        }

        diagnostics.distinct_states = query::snapshot_count(&self.engine);
        SearchReport {
            outcome: SearchOutcome::Exhausted,
            diagnostics,
        }
    }

    /// Re-drives a winning path through the engine, verifying every step
    /// still applies, and renders one frame per step plus a final frame on
    /// the goal.
    ///
    /// The solution must come from this solver's own [`Solver::search`]
    /// run; its step records reference snapshots interned during that run.
    /// A failure here is an internal-consistency bug, never a normal
    /// outcome.
    pub fn replay(&mut self, solution: &Solution) -> Result<Vec<Frame>, ReplayError> {
        let mut frames = Vec::with_capacity(solution.steps.len() + 1);
        let mut sim = Player::at(query::start(&self.engine));
        let mut events: Vec<Event> = Vec::new();

        for (index, record) in solution.steps.iter().enumerate() {
            let rendered =
                query::snapshot(&self.engine, record.origin).render_with_marker(sim.location());

            world::restore(&mut self.engine, record.origin, sim);
            events.clear();
            if world::apply_move(&mut self.engine, record.direction, &mut events).is_none() {
                return Err(ReplayError::StepRejected {
                    step: index,
                    direction: record.direction,
                    board: rendered,
                });
            }

            sim = query::player(&self.engine).clone();
            frames.push(Frame {
                rendered,
                direction: Some(record.direction),
                cost: sim.cost(),
            });
        }

        if sim.location() != query::goal(&self.engine) {
            return Err(ReplayError::GoalMissed {
                column: sim.location().column(),
                row: sim.location().row(),
            });
        }

        frames.push(Frame {
            rendered: query::board(&self.engine).render_with_marker(query::goal(&self.engine)),
            direction: None,
            cost: sim.cost(),
        });

        Ok(frames)
    }

    /// Priority of a node: accumulated cost plus the Manhattan chain from
    /// its location through every outstanding waypoint to the goal.
    fn priority_for(&self, player: &Player) -> u32 {
        let mut remaining = 0u32;
        let mut last = player.location();
        for &waypoint in &self.waypoints[player.waypoints_done().len()..] {
            remaining = remaining.saturating_add(last.manhattan_distance(waypoint));
            last = waypoint;
        }
        player.cost().saturating_add(remaining)
    }

    /// Stagnation guard. While a path's boards stay equivalent to its last
    /// structurally distinct snapshot, the path may not revisit a location
    /// it already covered in that plateau; a structurally new board resets
    /// the plateau.
    fn breaks_stagnation(&self, player: &mut Player, state: StateId) -> bool {
        match player.plateau_reference() {
            Some(reference)
                if reference == state
                    || query::states_equivalent(&self.engine, state, reference) =>
            {
                if player.plateau_visited(player.location()) {
                    false
                } else {
                    player.record_plateau_visit(player.location());
                    true
                }
            }
            _ => {
                player.reset_plateau(state);
                true
            }
        }
    }
}

/// One rendered step of a replayed solution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Board rendered with the player marker, before the step is taken (on
    /// the goal for the final frame).
    pub rendered: String,
    /// Direction taken from this frame; `None` for the final frame.
    pub direction: Option<Direction>,
    /// Accumulated cost after taking the step.
    pub cost: u32,
}

/// Internal-consistency failure raised when a recorded solution no longer
/// re-applies during replay.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReplayError {
    /// A recorded step was rejected by the engine.
    #[error("recorded step {step} ({direction}) was rejected during replay:\n{board}")]
    StepRejected {
        /// Zero-based index of the failing step.
        step: usize,
        /// Direction the failing step recorded.
        direction: Direction,
        /// Board the step was replayed against, with the player marked.
        board: String,
    },
    /// The replayed path ended somewhere other than the goal.
    #[error("replayed path ended at column {column}, row {row}, not on the goal")]
    GoalMissed {
        /// Column the path ended on.
        column: u32,
        /// Row the path ended on.
        row: u32,
    },
}

/// Frontier slot ordered by the explicit `(priority, cost, location)` key.
#[derive(Clone, Debug)]
struct FrontierEntry {
    player: Player,
    state: StateId,
}

impl FrontierEntry {
    fn ordering_key(&self) -> (u32, u32, CellCoord) {
        (
            self.player.priority(),
            self.player.cost(),
            self.player.location(),
        )
    }
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.ordering_key() == other.ordering_key()
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordering_key().cmp(&other.ordering_key())
    }
}
