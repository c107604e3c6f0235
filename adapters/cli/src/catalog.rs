//! Built-in puzzle catalog batch-solved by the CLI.
//!
//! Boards are written in the two-character-per-cell text format; waypoint
//! coordinates are `(column, row)` and must be visited in the listed order
//! before the goal.

use lockstep_core::CellCoord;

/// One catalog puzzle: board, required waypoints, and a cost bound sized
/// generously above its known solution cost.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CatalogEntry {
    /// Display name used in listings and solve banners.
    pub name: &'static str,
    /// Board text block.
    pub board: &'static str,
    /// Waypoints to visit in order before the goal.
    pub waypoints: &'static [CellCoord],
    /// Cost bound the search runs under.
    pub cost_limit: u32,
}

/// Catalog entries in solve order.
pub(crate) const ENTRIES: &[CatalogEntry] = &[
    CatalogEntry {
        name: "corridor",
        board: "# # # # # # \n# S     G # \n# # # # # # ",
        waypoints: &[],
        cost_limit: 10,
    },
    CatalogEntry {
        name: "spike gauntlet",
        board: "# # # # # # \n# S -   G # \n# # # # # # ",
        waypoints: &[],
        cost_limit: 10,
    },
    CatalogEntry {
        name: "brick detour",
        board: "# # # # # # \n# S #   G # \n#    B    # \n# # # # # # ",
        waypoints: &[],
        cost_limit: 15,
    },
    CatalogEntry {
        name: "monster gate",
        board: "# # # # # # \n# S    M# # \n# # # G # # \n# # # # # # ",
        waypoints: &[],
        cost_limit: 12,
    },
    CatalogEntry {
        name: "key and lock",
        board: "# # # # # # \n# S   L G # \n# K # # # # \n# # # # # # ",
        waypoints: &[],
        cost_limit: 12,
    },
    CatalogEntry {
        name: "waypoint patrol",
        board: "# # # # # # \n# S     G # \n#         # \n# # # # # # ",
        waypoints: &[CellCoord::new(4, 2)],
        cost_limit: 12,
    },
];
