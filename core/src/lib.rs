#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lockstep engine.
//!
//! This crate defines the vocabulary that connects the authoritative world,
//! the solver system, and adapters: tile and cell classification, grid
//! coordinates, movement directions, interned state identifiers, the events
//! broadcast by accepted moves, and the [`Player`] value a search path
//! carries through the frontier. The world executes moves against these
//! contracts and the solver consumes them without ever touching the board
//! representation directly.

use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of tile kinds that can occupy a board cell.
///
/// The terrain kinds (everything up to [`Tile::Lock`]) live in a cell's
/// fixed layer; [`Tile::Monster`] and [`Tile::Brick`] live in the movable
/// overlay layer. [`Tile::PlayerMarker`] exists purely so replayed
/// solutions can render the player's position and is never valid in
/// simulation input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tile {
    /// Open floor with nothing on it.
    Space,
    /// The player's starting cell.
    Start,
    /// The cell the player must reach.
    Goal,
    /// Impassable terrain.
    Wall,
    /// A spike currently risen out of the floor.
    SpikeUp,
    /// A spike currently retracted into the floor.
    SpikeDown,
    /// A spike that is permanently risen and never toggles.
    SpikeFixed,
    /// The key that opens a lock.
    Key,
    /// A locked cell that only a key holder may enter.
    Lock,
    /// A monster occupying the overlay layer.
    Monster,
    /// A pushable brick occupying the overlay layer.
    Brick,
    /// Render-only marker showing the player in printed solutions.
    PlayerMarker,
}

impl Tile {
    /// Single-character code used by the board text format.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Space => ' ',
            Self::Start => 'S',
            Self::Goal => 'G',
            Self::Wall => '#',
            Self::SpikeUp => 'A',
            Self::SpikeDown => '-',
            Self::SpikeFixed => 'Y',
            Self::Key => 'K',
            Self::Lock => 'L',
            Self::Monster => 'M',
            Self::Brick => 'B',
            Self::PlayerMarker => 'O',
        }
    }

    /// Resolves a tile from its single-character code.
    #[must_use]
    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            ' ' => Some(Self::Space),
            'S' => Some(Self::Start),
            'G' => Some(Self::Goal),
            '#' => Some(Self::Wall),
            'A' => Some(Self::SpikeUp),
            '-' => Some(Self::SpikeDown),
            'Y' => Some(Self::SpikeFixed),
            'K' => Some(Self::Key),
            'L' => Some(Self::Lock),
            'M' => Some(Self::Monster),
            'B' => Some(Self::Brick),
            'O' => Some(Self::PlayerMarker),
            _ => None,
        }
    }
}

/// A single board cell: fixed terrain plus movable overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    fixed: Tile,
    overlay: Tile,
}

impl Cell {
    /// Creates a cell from its two layers.
    #[must_use]
    pub const fn new(fixed: Tile, overlay: Tile) -> Self {
        Self { fixed, overlay }
    }

    /// Terrain layer of the cell.
    #[must_use]
    pub const fn fixed(&self) -> Tile {
        self.fixed
    }

    /// Movable-object layer of the cell.
    #[must_use]
    pub const fn overlay(&self) -> Tile {
        self.overlay
    }

    /// True when a player may stand here: the terrain is not a wall and no
    /// brick or monster occupies the overlay.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.fixed != Tile::Wall
            && self.overlay != Tile::Brick
            && self.overlay != Tile::Monster
    }

    /// True when a pushed object would collide with this cell.
    #[must_use]
    pub fn is_obstruction(&self) -> bool {
        matches!(
            self.fixed,
            Tile::Wall | Tile::Lock | Tile::SpikeUp | Tile::SpikeFixed
        ) || matches!(self.overlay, Tile::Brick | Tile::Monster)
    }

    /// True when the cells differ at most by rising/retracted spike phase.
    ///
    /// This is the equivalence the solver's deduplication and stagnation
    /// logic run on; strict structural equality stays [`PartialEq`].
    #[must_use]
    pub fn phase_equivalent(&self, other: &Cell) -> bool {
        if self == other {
            return true;
        }

        let spike_pair = matches!(
            (self.fixed, other.fixed),
            (Tile::SpikeUp, Tile::SpikeDown) | (Tile::SpikeDown, Tile::SpikeUp)
        );
        spike_pair && self.overlay == other.overlay
    }
}

/// True when the object on `cell` can be pushed into `beyond`.
#[must_use]
pub fn is_pushable(cell: Cell, beyond: Cell) -> bool {
    matches!(cell.overlay(), Tile::Brick | Tile::Monster) && !beyond.is_obstruction()
}

/// True when the monster on `cell` is crushed against `beyond` instead of
/// being pushed into it.
#[must_use]
pub fn is_killable(cell: Cell, beyond: Cell) -> bool {
    cell.overlay() == Tile::Monster && beyond.is_obstruction()
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All directions, in the order the solver expands them.
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Single-letter code used when printing solutions.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::North => 'N',
            Self::East => 'E',
            Self::South => 'S',
            Self::West => 'W',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Cell one step away in `direction`, or `None` when the step would
    /// leave the non-negative quadrant. Upper bounds are the board's concern.
    #[must_use]
    pub fn stepped(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::North => self.row.checked_sub(1).map(|row| Self::new(self.column, row)),
            Direction::East => self
                .column
                .checked_add(1)
                .map(|column| Self::new(column, self.row)),
            Direction::South => self.row.checked_add(1).map(|row| Self::new(self.column, row)),
            Direction::West => self
                .column
                .checked_sub(1)
                .map(|column| Self::new(column, self.row)),
        }
    }
}

/// Identifier of a distinct board snapshot interned by the state store.
///
/// Identifiers are dense indices allocated in interning order; they are only
/// meaningful to the store that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(u32);

impl StateId {
    /// Creates a new state identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// One step of a path: the direction taken and the snapshot it was taken
/// from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Direction the move was made in.
    pub direction: Direction,
    /// Snapshot the move was applied from.
    pub origin: StateId,
}

/// Events broadcast by the engine after an accepted move.
///
/// Rejected moves broadcast nothing; the engine's return value is the only
/// signal. Adapters narrate these, tests assert on them, and the solver
/// ignores them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// The player advanced into an open cell.
    PlayerMoved {
        /// Cell the player vacated.
        from: CellCoord,
        /// Cell the player entered.
        to: CellCoord,
    },
    /// The player picked up the key.
    KeyCollected {
        /// Cell the key occupied.
        cell: CellCoord,
    },
    /// The player spent the key to open a lock.
    LockOpened {
        /// Cell the lock occupied.
        cell: CellCoord,
    },
    /// A brick or monster was pushed one cell further.
    ObjectPushed {
        /// Cell the object vacated.
        from: CellCoord,
        /// Cell the object now occupies.
        to: CellCoord,
    },
    /// A monster was crushed against an obstruction.
    MonsterSlain {
        /// Cell the monster occupied.
        cell: CellCoord,
    },
    /// Every rising or retracted spike flipped phase.
    SpikesToggled,
}

/// A candidate path's complete search state.
///
/// Players are copied once per explored direction and popped exactly once
/// from the frontier; the search never revisits an expanded node. Frontier
/// order compares `(priority, cost, location)`, never identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    location: CellCoord,
    cost: u32,
    has_key: bool,
    priority: u32,
    waypoints_done: Vec<CellCoord>,
    steps: Vec<MoveRecord>,
    plateau_reference: Option<StateId>,
    explored: HashSet<CellCoord>,
}

impl Player {
    /// Creates a fresh player standing on `location` with zero cost.
    #[must_use]
    pub fn at(location: CellCoord) -> Self {
        Self {
            location,
            cost: 0,
            has_key: false,
            priority: 0,
            waypoints_done: Vec::new(),
            steps: Vec::new(),
            plateau_reference: None,
            explored: HashSet::new(),
        }
    }

    /// Cell the player currently occupies.
    #[must_use]
    pub const fn location(&self) -> CellCoord {
        self.location
    }

    /// Accumulated cost of the path behind this player.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// True while the player carries the key.
    #[must_use]
    pub const fn has_key(&self) -> bool {
        self.has_key
    }

    /// Frontier priority last computed for this node.
    #[must_use]
    pub const fn priority(&self) -> u32 {
        self.priority
    }

    /// Waypoints already satisfied, in the order they were reached.
    #[must_use]
    pub fn waypoints_done(&self) -> &[CellCoord] {
        &self.waypoints_done
    }

    /// Move history from the initial state to this node.
    #[must_use]
    pub fn steps(&self) -> &[MoveRecord] {
        &self.steps
    }

    /// Moves the player onto `location`.
    pub fn set_location(&mut self, location: CellCoord) {
        self.location = location;
    }

    /// Records that the key was picked up.
    pub fn collect_key(&mut self) {
        self.has_key = true;
    }

    /// Spends the key on a lock.
    pub fn consume_key(&mut self) {
        self.has_key = false;
    }

    /// Adds the cost of one accepted move.
    pub fn add_cost(&mut self, amount: u32) {
        self.cost = self.cost.saturating_add(amount);
    }

    /// Stores the priority the solver computed for this node.
    pub fn set_priority(&mut self, priority: u32) {
        self.priority = priority;
    }

    /// Appends a step to the move history.
    pub fn record_step(&mut self, record: MoveRecord) {
        self.steps.push(record);
    }

    /// Marks the next outstanding waypoint as satisfied.
    pub fn mark_waypoint(&mut self, waypoint: CellCoord) {
        self.waypoints_done.push(waypoint);
    }

    /// Snapshot the current spike-phase plateau is measured against.
    #[must_use]
    pub const fn plateau_reference(&self) -> Option<StateId> {
        self.plateau_reference
    }

    /// True when `location` was already visited during the current plateau.
    #[must_use]
    pub fn plateau_visited(&self, location: CellCoord) -> bool {
        self.explored.contains(&location)
    }

    /// Records a location visited while the plateau persists.
    pub fn record_plateau_visit(&mut self, location: CellCoord) {
        let _ = self.explored.insert(location);
    }

    /// Resets the plateau to measure against a structurally new snapshot.
    pub fn reset_plateau(&mut self, reference: StateId) {
        self.plateau_reference = Some(reference);
        self.explored.clear();
    }
}

/// A winning path and its total cost.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// Accumulated cost of the winning path.
    pub cost: u32,
    /// Steps from the initial state to the goal, in order.
    pub steps: Vec<MoveRecord>,
}

/// Terminal status of one solver run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The goal was reached with every waypoint satisfied in order.
    Won(Solution),
    /// The reachable state space was exhausted without a win.
    Exhausted,
    /// A frontier node exceeded the configured cost bound.
    BoundExceeded,
}

/// Reporting side-channel describing how much work a search performed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchDiagnostics {
    /// Number of frontier nodes popped and expanded.
    pub iterations: u64,
    /// Largest number of nodes the frontier held at once.
    pub peak_frontier: usize,
    /// Distinct board snapshots interned during the run.
    pub distinct_states: usize,
}

/// Outcome and diagnostics of one solver run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchReport {
    /// How the run terminated.
    pub outcome: SearchOutcome,
    /// Work accounting for the run.
    pub diagnostics: SearchDiagnostics,
}

/// Errors raised while parsing a board text block.
///
/// Parsing fails fast: an invalid board never produces a puzzle.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    /// The input contained no rows.
    #[error("board text contains no rows")]
    Empty,
    /// A row's character count was odd; cells are two characters wide.
    #[error("row {row} has an odd character count; cells are two characters wide")]
    OddRowLength {
        /// Zero-based index of the offending row.
        row: usize,
    },
    /// A row disagreed with the first row's width.
    #[error("row {row} is {found} cells wide, expected {expected}")]
    WidthMismatch {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width established by the first row, in cells.
        expected: usize,
        /// Width actually found, in cells.
        found: usize,
    },
    /// A character was not a known tile code.
    #[error("unknown tile code {code:?} at row {row}, column {column}")]
    UnknownTile {
        /// The unrecognised character.
        code: char,
        /// Zero-based row of the offending cell.
        row: usize,
        /// Zero-based column of the offending cell.
        column: usize,
    },
    /// The terrain layer held an overlay-only tile or the render marker.
    #[error("tile {code:?} is not valid terrain at row {row}, column {column}")]
    InvalidTerrain {
        /// Code of the misplaced tile.
        code: char,
        /// Zero-based row of the offending cell.
        row: usize,
        /// Zero-based column of the offending cell.
        column: usize,
    },
    /// The overlay layer held a terrain-only tile or the render marker.
    #[error("tile {code:?} is not a valid overlay at row {row}, column {column}")]
    InvalidOverlay {
        /// Code of the misplaced tile.
        code: char,
        /// Zero-based row of the offending cell.
        row: usize,
        /// Zero-based column of the offending cell.
        column: usize,
    },
    /// No start cell was present.
    #[error("board has no start cell")]
    MissingStart,
    /// More than one start cell was present.
    #[error("board has more than one start cell")]
    DuplicateStart,
    /// No goal cell was present.
    #[error("board has no goal cell")]
    MissingGoal,
    /// More than one goal cell was present.
    #[error("board has more than one goal cell")]
    DuplicateGoal,
    /// A border cell's terrain was not a wall.
    #[error("border cell at row {row}, column {column} is not a wall")]
    UnwalledBorder {
        /// Zero-based row of the offending cell.
        row: usize,
        /// Zero-based column of the offending cell.
        column: usize,
    },
}
