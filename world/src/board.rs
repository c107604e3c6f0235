//! Board representation and the two-character-per-cell text codec.

use lockstep_core::{BoardError, Cell, CellCoord, Tile};

/// Rectangular puzzle board with value semantics.
///
/// Every border cell's terrain is a wall, exactly one cell is the start and
/// exactly one the goal; [`Board::parse`] refuses anything else. Boards are
/// cloned freely: each search expansion mutates its own copy and the state
/// store keeps the originals frozen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    start: CellCoord,
    goal: CellCoord,
}

impl Board {
    /// Parses a board from its text block.
    ///
    /// Rows are separated by line breaks (blank lines are skipped so block
    /// literals may carry leading and trailing newlines); each row is a
    /// sequence of two-character cells, terrain code first, overlay code
    /// second.
    pub fn parse(text: &str) -> Result<Self, BoardError> {
        let rows: Vec<&str> = text.lines().filter(|line| !line.is_empty()).collect();
        if rows.is_empty() {
            return Err(BoardError::Empty);
        }

        let mut width = 0usize;
        let mut cells = Vec::new();
        let mut start = None;
        let mut goal = None;

        for (row, line) in rows.iter().enumerate() {
            let codes: Vec<char> = line.chars().collect();
            if codes.len() % 2 != 0 {
                return Err(BoardError::OddRowLength { row });
            }

            let row_width = codes.len() / 2;
            if row == 0 {
                width = row_width;
            } else if row_width != width {
                return Err(BoardError::WidthMismatch {
                    row,
                    expected: width,
                    found: row_width,
                });
            }

            for (column, pair) in codes.chunks(2).enumerate() {
                let fixed = Tile::from_code(pair[0]).ok_or(BoardError::UnknownTile {
                    code: pair[0],
                    row,
                    column,
                })?;
                let overlay = Tile::from_code(pair[1]).ok_or(BoardError::UnknownTile {
                    code: pair[1],
                    row,
                    column,
                })?;

                if matches!(fixed, Tile::Brick | Tile::Monster | Tile::PlayerMarker) {
                    return Err(BoardError::InvalidTerrain {
                        code: pair[0],
                        row,
                        column,
                    });
                }
                if !matches!(overlay, Tile::Space | Tile::Brick | Tile::Monster) {
                    return Err(BoardError::InvalidOverlay {
                        code: pair[1],
                        row,
                        column,
                    });
                }

                let coord = CellCoord::new(column as u32, row as u32);
                match fixed {
                    Tile::Start => {
                        if start.replace(coord).is_some() {
                            return Err(BoardError::DuplicateStart);
                        }
                    }
                    Tile::Goal => {
                        if goal.replace(coord).is_some() {
                            return Err(BoardError::DuplicateGoal);
                        }
                    }
                    _ => {}
                }

                cells.push(Cell::new(fixed, overlay));
            }
        }

        let height = rows.len();
        for (index, cell) in cells.iter().enumerate() {
            let row = index / width;
            let column = index % width;
            let on_border =
                row == 0 || row == height - 1 || column == 0 || column == width - 1;
            if on_border && cell.fixed() != Tile::Wall {
                return Err(BoardError::UnwalledBorder { row, column });
            }
        }

        let start = start.ok_or(BoardError::MissingStart)?;
        let goal = goal.ok_or(BoardError::MissingGoal)?;

        Ok(Self {
            width: width as u32,
            height: height as u32,
            cells,
            start,
            goal,
        })
    }

    /// Width of the board in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the board in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Cell the player starts on.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        self.start
    }

    /// Cell the player must reach.
    #[must_use]
    pub const fn goal(&self) -> CellCoord {
        self.goal
    }

    /// True when the coordinate lies on the board.
    #[must_use]
    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.column() < self.width && coord.row() < self.height
    }

    /// Cell at the coordinate, if it lies on the board.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<Cell> {
        self.index(coord).map(|index| self.cells[index])
    }

    pub(crate) fn set_cell(&mut self, coord: CellCoord, cell: Cell) {
        if let Some(index) = self.index(coord) {
            self.cells[index] = cell;
        }
    }

    /// Flips every rising spike to retracted and vice versa. Permanent
    /// spikes never change.
    pub(crate) fn toggle_spikes(&mut self) {
        for cell in &mut self.cells {
            let toggled = match cell.fixed() {
                Tile::SpikeUp => Tile::SpikeDown,
                Tile::SpikeDown => Tile::SpikeUp,
                _ => continue,
            };
            *cell = Cell::new(toggled, cell.overlay());
        }
    }

    /// Canonical text encoding: row-major, two codes per cell, rows
    /// separated by `'\n'`. Two boards with identical encodings are the
    /// same state.
    #[must_use]
    pub fn encode(&self) -> String {
        self.render(None)
    }

    /// Encoding with the player marker written into the overlay layer of
    /// `player`'s cell, for presentation of replayed solutions.
    #[must_use]
    pub fn render_with_marker(&self, player: CellCoord) -> String {
        self.render(Some(player))
    }

    /// True when `other` is the same logical puzzle state: every cell
    /// equal, rising/retracted spike phase ignored.
    #[must_use]
    pub fn structurally_equal(&self, other: &Board) -> bool {
        self.width == other.width
            && self.height == other.height
            && self
                .cells
                .iter()
                .zip(other.cells.iter())
                .all(|(mine, theirs)| mine.phase_equivalent(theirs))
    }

    fn render(&self, marker: Option<CellCoord>) -> String {
        let mut text =
            String::with_capacity(self.cells.len() * 2 + self.height as usize);
        for row in 0..self.height {
            if row > 0 {
                text.push('\n');
            }
            for column in 0..self.width {
                let coord = CellCoord::new(column, row);
                let cell = self.cells[(row * self.width + column) as usize];
                text.push(cell.fixed().code());
                if marker == Some(coord) {
                    text.push(Tile::PlayerMarker.code());
                } else {
                    text.push(cell.overlay().code());
                }
            }
        }
        text
    }

    fn index(&self, coord: CellCoord) -> Option<usize> {
        if self.contains(coord) {
            Some((coord.row() * self.width + coord.column()) as usize)
        } else {
            None
        }
    }
}
