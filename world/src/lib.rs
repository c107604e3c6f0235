#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative puzzle state management for Lockstep.
//!
//! This crate owns the board representation, the append-only snapshot
//! store, and the transition function that applies one directional move to
//! the working state. The solver system drives it exclusively through
//! [`restore`], [`apply_move`], and the read-only [`query`] functions.

mod board;
mod store;

pub use board::Board;
pub use store::StateStore;

use lockstep_core::{
    is_killable, is_pushable, BoardError, Cell, CellCoord, Direction, Event, Player, StateId, Tile,
};

/// Authoritative puzzle state: the working board, the working player, and
/// the store of every snapshot reached so far.
///
/// The working pair is a scratch area. The search checks out an ancestor
/// snapshot with [`restore`], applies one trial move with [`apply_move`],
/// and reads the result back through [`query`]; stored snapshots are never
/// mutated by trials.
#[derive(Debug)]
pub struct Engine {
    board: Board,
    player: Player,
    store: StateStore,
    initial: StateId,
}

impl Engine {
    /// Loads a puzzle from its board text and registers the initial
    /// snapshot.
    pub fn new(board_text: &str) -> Result<Self, BoardError> {
        let board = Board::parse(board_text)?;
        let player = Player::at(board.start());
        let mut store = StateStore::new();
        let initial = store.intern(&board);
        Ok(Self {
            board,
            player,
            store,
            initial,
        })
    }
}

/// Resets the working board to the stored snapshot and substitutes the
/// given player.
///
/// The snapshot is cloned, so later trials never touch the store's copy.
///
/// # Panics
///
/// Panics when `state` was never interned; handing the engine a stale or
/// fabricated id is a bug in the caller, not a recoverable condition.
pub fn restore(engine: &mut Engine, state: StateId, player: Player) {
    engine.board = engine.store.snapshot(state).clone();
    engine.player = player;
}

/// Applies one directional move to the working board and player.
///
/// Returns the id of the resulting snapshot, interning it if this state was
/// never reached before, or `None` when the move is rejected. A rejected
/// move leaves board and player byte-for-byte unchanged. Accepted moves
/// describe their effects through `out_events`; rejections stay silent.
pub fn apply_move(
    engine: &mut Engine,
    direction: Direction,
    out_events: &mut Vec<Event>,
) -> Option<StateId> {
    let origin = engine.player.location();
    let destination = origin.stepped(direction)?;
    if !engine.board.contains(destination) {
        return None;
    }
    if !try_enter(engine, origin, destination, direction, out_events) {
        return None;
    }

    // Spikes are a clock: every accepted move flips them, before the cost
    // of the landing tile is judged.
    engine.board.toggle_spikes();
    out_events.push(Event::SpikesToggled);

    let landing = engine
        .board
        .cell(engine.player.location())
        .expect("player location stays on the board");
    let cost = match landing.fixed() {
        Tile::SpikeUp | Tile::SpikeFixed => 2,
        _ => 1,
    };
    engine.player.add_cost(cost);

    Some(engine.store.intern(&engine.board))
}

/// Resolves whether the player may act on `destination`, mutating board and
/// player on success. Every failing branch bails before the first mutation.
fn try_enter(
    engine: &mut Engine,
    origin: CellCoord,
    destination: CellCoord,
    direction: Direction,
    out_events: &mut Vec<Event>,
) -> bool {
    let target = engine
        .board
        .cell(destination)
        .expect("destination was bounds-checked");

    if target.fixed() == Tile::Wall {
        return false;
    }

    if target.fixed() == Tile::Lock {
        if !engine.player.has_key() {
            return false;
        }
        engine.player.set_location(destination);
        engine.player.consume_key();
        engine
            .board
            .set_cell(destination, Cell::new(Tile::Space, Tile::Space));
        out_events.push(Event::LockOpened { cell: destination });
        out_events.push(Event::PlayerMoved {
            from: origin,
            to: destination,
        });
        return true;
    }

    if target.is_open() {
        engine.player.set_location(destination);
        if target.fixed() == Tile::Key {
            engine.player.collect_key();
            engine
                .board
                .set_cell(destination, Cell::new(Tile::Space, target.overlay()));
            out_events.push(Event::KeyCollected { cell: destination });
        }
        out_events.push(Event::PlayerMoved {
            from: origin,
            to: destination,
        });
        return true;
    }

    // The destination holds a brick or monster; what happens depends on the
    // cell one further step along the same direction.
    let Some(beyond_coord) = destination.stepped(direction) else {
        return false;
    };
    let Some(beyond) = engine.board.cell(beyond_coord) else {
        return false;
    };

    if is_killable(target, beyond) {
        engine
            .board
            .set_cell(destination, Cell::new(target.fixed(), Tile::Space));
        out_events.push(Event::MonsterSlain { cell: destination });
        return true;
    }

    if is_pushable(target, beyond) {
        engine
            .board
            .set_cell(beyond_coord, Cell::new(beyond.fixed(), target.overlay()));
        engine
            .board
            .set_cell(destination, Cell::new(target.fixed(), Tile::Space));
        out_events.push(Event::ObjectPushed {
            from: destination,
            to: beyond_coord,
        });
        return true;
    }

    false
}

/// Query functions that provide read-only access to the engine state.
pub mod query {
    use lockstep_core::{CellCoord, Player, StateId};

    use super::{Board, Engine};

    /// Snapshot id registered when the engine loaded its board.
    #[must_use]
    pub fn initial_state(engine: &Engine) -> StateId {
        engine.initial
    }

    /// Start cell of the loaded board.
    #[must_use]
    pub fn start(engine: &Engine) -> CellCoord {
        engine.board.start()
    }

    /// Goal cell of the loaded board.
    #[must_use]
    pub fn goal(engine: &Engine) -> CellCoord {
        engine.board.goal()
    }

    /// Read-only view of the working player.
    #[must_use]
    pub fn player(engine: &Engine) -> &Player {
        &engine.player
    }

    /// Read-only view of the working board.
    #[must_use]
    pub fn board(engine: &Engine) -> &Board {
        &engine.board
    }

    /// Stored snapshot for `state`. Panics when the id was never interned.
    #[must_use]
    pub fn snapshot(engine: &Engine, state: StateId) -> &Board {
        engine.store.snapshot(state)
    }

    /// True when the two snapshots are the same logical state, spike phase
    /// ignored.
    #[must_use]
    pub fn states_equivalent(engine: &Engine, left: StateId, right: StateId) -> bool {
        left == right
            || engine
                .store
                .snapshot(left)
                .structurally_equal(engine.store.snapshot(right))
    }

    /// Number of distinct snapshots interned so far.
    #[must_use]
    pub fn snapshot_count(engine: &Engine) -> usize {
        engine.store.len()
    }

    /// True when the working player stands on the goal.
    #[must_use]
    pub fn is_won(engine: &Engine) -> bool {
        engine.player.location() == engine.board.goal()
    }
}
