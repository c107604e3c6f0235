//! Append-only interning store for board snapshots.

use std::collections::HashMap;

use lockstep_core::StateId;

use crate::board::Board;

/// Content-addressed cache of every distinct board reached during a run.
///
/// The store interns a board's canonical encoding exactly once and hands
/// back a dense [`StateId`]; entries are never evicted or mutated, so any
/// previously issued id restores its snapshot for the lifetime of the run.
#[derive(Debug, Default)]
pub struct StateStore {
    ids: HashMap<String, StateId>,
    snapshots: Vec<Board>,
}

impl StateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns the board's canonical encoding, registering a snapshot if
    /// this state was never seen before, and returns its id.
    pub fn intern(&mut self, board: &Board) -> StateId {
        let encoding = board.encode();
        if let Some(id) = self.ids.get(&encoding) {
            return *id;
        }

        let id = StateId::new(self.snapshots.len() as u32);
        self.snapshots.push(board.clone());
        let _ = self.ids.insert(encoding, id);
        id
    }

    /// True when the id was issued by this store.
    #[must_use]
    pub fn contains(&self, id: StateId) -> bool {
        (id.get() as usize) < self.snapshots.len()
    }

    /// Stored snapshot for `id`.
    ///
    /// # Panics
    ///
    /// Panics when `id` was never issued by this store; restoring to a
    /// fabricated or foreign id is a contract violation of the search, not
    /// a recoverable condition.
    #[must_use]
    pub fn snapshot(&self, id: StateId) -> &Board {
        self.snapshots
            .get(id.get() as usize)
            .unwrap_or_else(|| panic!("state {} was never interned in this store", id.get()))
    }

    /// Number of distinct snapshots interned so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True when no snapshot was interned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORRIDOR: &str = "# # # # # # \n# S     G # \n# # # # # # ";

    #[test]
    fn interning_the_same_encoding_reuses_the_id() {
        let board = Board::parse(CORRIDOR).expect("corridor parses");
        let mut store = StateStore::new();

        let first = store.intern(&board);
        let second = store.intern(&board.clone());

        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn snapshots_restore_the_interned_board() {
        let board = Board::parse(CORRIDOR).expect("corridor parses");
        let mut store = StateStore::new();

        let id = store.intern(&board);

        assert!(store.contains(id));
        assert_eq!(store.snapshot(id), &board);
    }

    #[test]
    fn distinct_encodings_receive_distinct_ids() {
        let corridor = Board::parse(CORRIDOR).expect("corridor parses");
        let spiked =
            Board::parse("# # # # # # \n# S A   G # \n# # # # # # ").expect("spiked parses");
        let mut store = StateStore::new();

        let first = store.intern(&corridor);
        let second = store.intern(&spiked);

        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
    }

    #[test]
    #[should_panic(expected = "never interned")]
    fn unknown_id_panics() {
        let store = StateStore::new();
        let _ = store.snapshot(StateId::new(7));
    }
}
