// Core game logic: board generation, flood-fill reveal, flag toggling,
// and win/loss detection. Nothing in here knows about the terminal; the
// UI layer derives everything it draws from the CellView values the
// engine hands back.

use rand::Rng;

/// Shown in the status bar when the player clears the board.
pub const WIN_MESSAGE: &str = "Minefield clear!";
/// Shown in the status bar when the player reveals a mine.
pub const LOSS_MESSAGE: &str = "Game over!";

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,   // 9x9, 10 mines
    Medium, // 16x16, 40 mines
    Hard,   // 16x30, 99 mines
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Get board dimensions (rows, cols, mine count) for this difficulty
    pub fn params(&self) -> (usize, usize, usize) {
        match self {
            Difficulty::Easy => (9, 9, 10),
            Difficulty::Medium => (16, 16, 40),
            Difficulty::Hard => (16, 30, 99),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

/// Visibility of a single cell. Transitions are Hidden -> Revealed
/// (never undone) and Hidden <-> Flagged; a Flagged cell must be
/// unflagged before it can be revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Hidden,
    Flagged,
    Revealed,
}

/// A single cell on the board. `mine` is fixed at generation time;
/// `adjacent` is computed when the cell is revealed and is meaningless
/// before that.
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    pub mine: bool,
    pub state: CellState,
    pub adjacent: u8,
}

impl Cell {
    fn hidden() -> Self {
        Cell {
            mine: false,
            state: CellState::Hidden,
            adjacent: 0,
        }
    }
}

/// What the surface should draw for one cell. Purely presentational,
/// derived from engine state and never stored back into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    Hidden,
    Flag,
    /// Revealed with no adjacent mines
    Blank,
    /// Revealed with 1-8 adjacent mines
    Number(u8),
    /// A mine uncovered by the losing sweep
    Mine,
    /// The mine the player actually hit
    MineHit,
}

/// Session result state. Won and Lost are terminal: every further
/// reveal or flag toggle is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    InProgress,
    Won,
    Lost,
}

/// The minefield: flat row-major cell storage plus dimensions.
pub struct Board {
    rows: usize,
    cols: usize,
    mine_count: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Generate a board with `mine_count` mines placed uniformly at
    /// random, by rejection sampling: draw a random cell, retry on
    /// duplicate, until enough distinct cells hold mines. No cell is
    /// excluded, so the first reveal is not guaranteed to be safe.
    ///
    /// # Panics
    /// Panics unless `rows > 0`, `cols > 0` and
    /// `0 < mine_count < rows * cols`.
    pub fn generate<R: Rng>(rows: usize, cols: usize, mine_count: usize, rng: &mut R) -> Self {
        assert!(rows > 0 && cols > 0, "board must have a positive area");
        assert!(
            mine_count > 0 && mine_count < rows * cols,
            "mine count must leave at least one safe cell"
        );
        let mut board = Board {
            rows,
            cols,
            mine_count,
            cells: vec![Cell::hidden(); rows * cols],
        };
        let mut placed = 0;
        while placed < mine_count {
            let i = rng.gen_range(0..board.cells.len());
            if !board.cells[i].mine {
                board.cells[i].mine = true;
                placed += 1;
            }
        }
        board
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    /// Convert (row, col) coordinates to flat array index
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Count mines in the Moore neighborhood of (row, col), clipped at
    /// the board edges.
    fn count_adjacent(&self, row: usize, col: usize) -> u8 {
        let mut count = 0u8;
        for r in row.saturating_sub(1)..=(row + 1).min(self.rows - 1) {
            for c in col.saturating_sub(1)..=(col + 1).min(self.cols - 1) {
                if (r, c) != (row, col) && self.cells[self.index(r, c)].mine {
                    count += 1;
                }
            }
        }
        count
    }
}

/// Cells whose visuals changed during a reveal, plus the status the
/// session ended up in. An empty `changed` means the call was a no-op.
pub struct RevealResult {
    pub changed: Vec<(usize, usize, CellView)>,
    pub status: Status,
}

/// Outcome of a flag toggle. `changed` is None when the toggle was a
/// no-op (revealed cell, terminal session, out of bounds).
pub struct FlagResult {
    pub changed: Option<(usize, usize, CellView)>,
    pub flags_remaining: isize,
}

/// One play-through of a single board. A session is created on
/// difficulty selection and replaced wholesale on restart or difficulty
/// change; nothing is reused across sessions.
pub struct GameSession {
    board: Board,
    flags_remaining: isize,
    revealed_safe: usize,
    status: Status,
}

impl GameSession {
    pub fn new<R: Rng>(rows: usize, cols: usize, mine_count: usize, rng: &mut R) -> Self {
        let board = Board::generate(rows, cols, mine_count, rng);
        GameSession {
            flags_remaining: mine_count as isize,
            revealed_safe: 0,
            status: Status::InProgress,
            board,
        }
    }

    pub fn from_difficulty<R: Rng>(difficulty: Difficulty, rng: &mut R) -> Self {
        let (rows, cols, mines) = difficulty.params();
        Self::new(rows, cols, mines, rng)
    }

    pub fn rows(&self) -> usize {
        self.board.rows
    }

    pub fn cols(&self) -> usize {
        self.board.cols
    }

    pub fn mine_count(&self) -> usize {
        self.board.mine_count
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Flag counter shown to the player. Starts at the mine count and is
    /// not clamped: over-flagging drives it negative.
    pub fn flags_remaining(&self) -> isize {
        self.flags_remaining
    }

    pub fn revealed_safe(&self) -> usize {
        self.revealed_safe
    }

    /// Terminal message for the status bar, present once the game ends.
    pub fn status_message(&self) -> Option<&'static str> {
        match self.status {
            Status::InProgress => None,
            Status::Won => Some(WIN_MESSAGE),
            Status::Lost => Some(LOSS_MESSAGE),
        }
    }

    /// Visual state of one cell as it stands right now. The triggered
    /// mine is not distinguished here; that detail only exists in the
    /// RevealResult of the losing call.
    pub fn view(&self, row: usize, col: usize) -> CellView {
        let cell = &self.board.cells[self.board.index(row, col)];
        match cell.state {
            CellState::Hidden => CellView::Hidden,
            CellState::Flagged => CellView::Flag,
            CellState::Revealed if cell.mine => CellView::Mine,
            CellState::Revealed if cell.adjacent == 0 => CellView::Blank,
            CellState::Revealed => CellView::Number(cell.adjacent),
        }
    }

    /// Reveal the cell at (row, col).
    ///
    /// No-op on a flagged cell (it must be unflagged first), on an
    /// already-revealed cell, after the game has ended, or out of
    /// bounds. Revealing a mine ends the game and reports every mine on
    /// the board, with the triggered one distinguished as `MineHit`.
    /// Revealing a safe cell flood-fills: a zero-adjacent cell
    /// auto-reveals its whole connected clear region plus the numbered
    /// border around it.
    pub fn reveal(&mut self, row: usize, col: usize) -> RevealResult {
        let mut changed = Vec::new();
        if !self.board.in_bounds(row, col) || self.status != Status::InProgress {
            return RevealResult {
                changed,
                status: self.status,
            };
        }
        let idx = self.board.index(row, col);
        if self.board.cells[idx].state != CellState::Hidden {
            return RevealResult {
                changed,
                status: self.status,
            };
        }

        if self.board.cells[idx].mine {
            // Loss: sweep the whole board and surface every mine.
            self.status = Status::Lost;
            for r in 0..self.board.rows {
                for c in 0..self.board.cols {
                    let i = self.board.index(r, c);
                    if self.board.cells[i].mine {
                        self.board.cells[i].state = CellState::Revealed;
                        let view = if (r, c) == (row, col) {
                            CellView::MineHit
                        } else {
                            CellView::Mine
                        };
                        changed.push((r, c, view));
                    }
                }
            }
            return RevealResult {
                changed,
                status: self.status,
            };
        }

        // Flood fill with an explicit work list rather than recursion so
        // a large clear region cannot overflow the call stack.
        let mut frontier = vec![(row, col)];
        while let Some((r, c)) = frontier.pop() {
            let i = self.board.index(r, c);
            if self.board.cells[i].state != CellState::Hidden {
                continue; // already revealed, or flagged (flags block expansion)
            }
            let adjacent = self.board.count_adjacent(r, c);
            self.board.cells[i].state = CellState::Revealed;
            self.board.cells[i].adjacent = adjacent;
            self.revealed_safe += 1;
            changed.push((
                r,
                c,
                if adjacent == 0 {
                    CellView::Blank
                } else {
                    CellView::Number(adjacent)
                },
            ));
            if adjacent == 0 {
                // Neighbors of a zero cell are never mines, so the
                // frontier only ever holds safe cells.
                for nr in r.saturating_sub(1)..=(r + 1).min(self.board.rows - 1) {
                    for nc in c.saturating_sub(1)..=(c + 1).min(self.board.cols - 1) {
                        if (nr, nc) != (r, c) {
                            frontier.push((nr, nc));
                        }
                    }
                }
            }
        }

        if self.revealed_safe == self.board.rows * self.board.cols - self.board.mine_count {
            self.status = Status::Won;
        }
        RevealResult {
            changed,
            status: self.status,
        }
    }

    /// Toggle a flag at (row, col). No-op on revealed cells, terminal
    /// sessions and out-of-bounds coordinates.
    pub fn toggle_flag(&mut self, row: usize, col: usize) -> FlagResult {
        if !self.board.in_bounds(row, col) || self.status != Status::InProgress {
            return FlagResult {
                changed: None,
                flags_remaining: self.flags_remaining,
            };
        }
        let idx = self.board.index(row, col);
        let view = match self.board.cells[idx].state {
            CellState::Revealed => {
                return FlagResult {
                    changed: None,
                    flags_remaining: self.flags_remaining,
                };
            }
            CellState::Hidden => {
                self.board.cells[idx].state = CellState::Flagged;
                self.flags_remaining -= 1;
                CellView::Flag
            }
            CellState::Flagged => {
                self.board.cells[idx].state = CellState::Hidden;
                self.flags_remaining += 1;
                CellView::Hidden
            }
        };
        FlagResult {
            changed: Some((row, col, view)),
            flags_remaining: self.flags_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Build a session around a hand-placed mine layout so tests are
    /// fully deterministic.
    fn session_with_mines(rows: usize, cols: usize, mines: &[(usize, usize)]) -> GameSession {
        let mut board = Board {
            rows,
            cols,
            mine_count: mines.len(),
            cells: vec![Cell::hidden(); rows * cols],
        };
        for &(r, c) in mines {
            let i = board.index(r, c);
            assert!(!board.cells[i].mine, "duplicate mine in test layout");
            board.cells[i].mine = true;
        }
        GameSession {
            flags_remaining: mines.len() as isize,
            revealed_safe: 0,
            status: Status::InProgress,
            board,
        }
    }

    /// Ten mines filling the bottom edge of a 9x9 board, leaving a big
    /// zero-adjacent region around the top-left corner.
    fn bottom_edge_mines() -> Vec<(usize, usize)> {
        let mut mines: Vec<(usize, usize)> = (0..9).map(|c| (8, c)).collect();
        mines.push((7, 8));
        mines
    }

    #[test]
    fn difficulty_presets() {
        assert_eq!(Difficulty::Easy.params(), (9, 9, 10));
        assert_eq!(Difficulty::Medium.params(), (16, 16, 40));
        assert_eq!(Difficulty::Hard.params(), (16, 30, 99));
    }

    #[test]
    fn generate_places_exact_mine_count() {
        let mut rng = StdRng::seed_from_u64(42);
        for difficulty in Difficulty::ALL {
            let (rows, cols, mines) = difficulty.params();
            let board = Board::generate(rows, cols, mines, &mut rng);
            let placed = board.cells.iter().filter(|cell| cell.mine).count();
            assert_eq!(placed, mines, "{} should have {} mines", difficulty.name(), mines);
        }
    }

    #[test]
    fn generate_max_density_leaves_one_safe_cell() {
        let mut rng = StdRng::seed_from_u64(7);
        let board = Board::generate(5, 5, 24, &mut rng);
        let safe = board.cells.iter().filter(|cell| !cell.mine).count();
        assert_eq!(safe, 1);
    }

    #[test]
    #[should_panic(expected = "at least one safe cell")]
    fn generate_rejects_full_board() {
        let mut rng = StdRng::seed_from_u64(0);
        Board::generate(3, 3, 9, &mut rng);
    }

    #[test]
    fn generate_is_deterministic_with_seed() {
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);
        let a = Board::generate(9, 9, 10, &mut rng1);
        let b = Board::generate(9, 9, 10, &mut rng2);
        for (x, y) in a.cells.iter().zip(b.cells.iter()) {
            assert_eq!(x.mine, y.mine);
        }
    }

    #[test]
    fn reveal_numbered_cell_is_idempotent() {
        // Single center mine: every other cell shows a 1, no cascades.
        let mut session = session_with_mines(3, 3, &[(1, 1)]);
        let first = session.reveal(0, 0);
        assert_eq!(first.changed, vec![(0, 0, CellView::Number(1))]);
        assert_eq!(session.revealed_safe(), 1);

        let second = session.reveal(0, 0);
        assert!(second.changed.is_empty());
        assert_eq!(second.status, Status::InProgress);
        assert_eq!(session.revealed_safe(), 1);
    }

    #[test]
    fn reveal_out_of_bounds_is_ignored() {
        let mut session = session_with_mines(3, 3, &[(1, 1)]);
        let result = session.reveal(3, 0);
        assert!(result.changed.is_empty());
        assert_eq!(session.status(), Status::InProgress);
        let flag = session.toggle_flag(0, 5);
        assert!(flag.changed.is_none());
    }

    #[test]
    fn reveal_mine_loses_and_reports_all_mines() {
        let mut session = session_with_mines(9, 9, &bottom_edge_mines());
        let result = session.reveal(8, 3);
        assert_eq!(result.status, Status::Lost);
        assert_eq!(result.changed.len(), 10);
        let hits: Vec<_> = result
            .changed
            .iter()
            .filter(|(_, _, view)| *view == CellView::MineHit)
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, 8);
        assert_eq!(hits[0].1, 3);
        for &(r, c, view) in &result.changed {
            if (r, c) != (8, 3) {
                assert_eq!(view, CellView::Mine);
            }
            assert_eq!(session.board.cells[session.board.index(r, c)].state, CellState::Revealed);
        }
        assert_eq!(session.status_message(), Some(LOSS_MESSAGE));
    }

    #[test]
    fn terminal_session_rejects_further_actions() {
        let mut session = session_with_mines(3, 3, &[(1, 1)]);
        session.reveal(1, 1);
        assert_eq!(session.status(), Status::Lost);

        let reveal = session.reveal(0, 0);
        assert!(reveal.changed.is_empty());
        assert_eq!(reveal.status, Status::Lost);

        let flags_before = session.flags_remaining();
        let flag = session.toggle_flag(0, 0);
        assert!(flag.changed.is_none());
        assert_eq!(flag.flags_remaining, flags_before);
    }

    #[test]
    fn reveal_flagged_cell_is_noop() {
        let mut session = session_with_mines(3, 3, &[(1, 1)]);
        session.toggle_flag(0, 0);
        let result = session.reveal(0, 0);
        assert!(result.changed.is_empty());
        assert_eq!(result.status, Status::InProgress);
        assert_eq!(session.view(0, 0), CellView::Flag);
    }

    #[test]
    fn flag_round_trip_restores_counter() {
        let mut session = session_with_mines(3, 3, &[(1, 1)]);
        assert_eq!(session.flags_remaining(), 1);

        let on = session.toggle_flag(2, 2);
        assert_eq!(on.changed, Some((2, 2, CellView::Flag)));
        assert_eq!(on.flags_remaining, 0);

        let off = session.toggle_flag(2, 2);
        assert_eq!(off.changed, Some((2, 2, CellView::Hidden)));
        assert_eq!(off.flags_remaining, 1);
        assert_eq!(session.view(2, 2), CellView::Hidden);
    }

    #[test]
    fn flag_counter_goes_negative_without_clamping() {
        let mut session = session_with_mines(3, 3, &[(1, 1)]);
        session.toggle_flag(0, 0);
        session.toggle_flag(0, 1);
        let last = session.toggle_flag(0, 2);
        assert_eq!(last.flags_remaining, -2);
        assert_eq!(session.flags_remaining(), -2);
    }

    #[test]
    fn flag_on_revealed_cell_is_noop() {
        let mut session = session_with_mines(3, 3, &[(1, 1)]);
        session.reveal(0, 0);
        let flag = session.toggle_flag(0, 0);
        assert!(flag.changed.is_none());
        assert_eq!(flag.flags_remaining, 1);
    }

    #[test]
    fn zero_cell_cascades_over_clear_region_and_border() {
        // All mines on the bottom edge: revealing the far corner floods
        // every safe cell in one move, which is also an immediate win.
        let mut session = session_with_mines(9, 9, &bottom_edge_mines());
        let result = session.reveal(0, 0);
        assert_eq!(result.changed.len(), 71);
        assert_eq!(session.revealed_safe(), 71);
        assert_eq!(result.status, Status::Won);
        // The border next to the mines carries numbers, the interior is blank.
        assert_eq!(session.view(0, 0), CellView::Blank);
        assert_eq!(session.view(7, 0), CellView::Number(2));
        // Mines themselves were never touched by the cascade.
        assert_eq!(session.view(8, 0), CellView::Hidden);
        assert_eq!(session.status_message(), Some(WIN_MESSAGE));
    }

    #[test]
    fn flags_block_flood_fill_expansion() {
        // One far-corner mine; the rest of the board is one clear region.
        let mut session = session_with_mines(5, 5, &[(4, 4)]);
        session.toggle_flag(2, 2);

        let result = session.reveal(0, 0);
        assert_eq!(session.view(2, 2), CellView::Flag);
        assert!(!result.changed.iter().any(|&(r, c, _)| (r, c) == (2, 2)));
        // 25 cells minus the mine and the flagged barrier.
        assert_eq!(session.revealed_safe(), 23);
        assert_eq!(result.status, Status::InProgress);

        // Unflagging and revealing the barrier cell completes the board.
        session.toggle_flag(2, 2);
        let finish = session.reveal(2, 2);
        assert_eq!(finish.changed, vec![(2, 2, CellView::Blank)]);
        assert_eq!(finish.status, Status::Won);
    }

    #[test]
    fn win_by_revealing_each_safe_cell() {
        // Center mine only: no cascades, so every safe cell takes its
        // own reveal and the win lands exactly on the last one.
        let mut session = session_with_mines(3, 3, &[(1, 1)]);
        let safe: Vec<(usize, usize)> = (0..3)
            .flat_map(|r| (0..3).map(move |c| (r, c)))
            .filter(|&(r, c)| (r, c) != (1, 1))
            .collect();
        for (i, &(r, c)) in safe.iter().enumerate() {
            assert_eq!(session.status(), Status::InProgress);
            let result = session.reveal(r, c);
            if i + 1 < safe.len() {
                assert_eq!(result.status, Status::InProgress);
            } else {
                assert_eq!(result.status, Status::Won);
            }
        }
        assert_eq!(session.revealed_safe(), 8);
    }

    #[test]
    fn session_from_difficulty_sets_counters() {
        let mut rng = StdRng::seed_from_u64(1);
        let session = GameSession::from_difficulty(Difficulty::Easy, &mut rng);
        assert_eq!(session.rows(), 9);
        assert_eq!(session.cols(), 9);
        assert_eq!(session.mine_count(), 10);
        assert_eq!(session.flags_remaining(), 10);
        assert_eq!(session.revealed_safe(), 0);
        assert_eq!(session.status(), Status::InProgress);
        assert_eq!(session.status_message(), None);
    }
}
