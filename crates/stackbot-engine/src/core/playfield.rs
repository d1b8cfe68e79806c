use std::{
    cell::OnceCell,
    fmt,
    hash::{Hash, Hasher},
};

use super::{
    HIDDEN_ROWS, STANDARD_VISIBLE_HEIGHT, STANDARD_WIDTH,
    cluster_id::ClusterId,
    piece::{Piece, PieceKind},
};

/// A single cell of a [`Playfield`].
///
/// `Wall` is never stored in the grid: it is the sentinel returned for
/// coordinates outside the board, so that collision checks treat the
/// boundary exactly like an occupied cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Block {
    /// Empty cell (no piece).
    #[default]
    Empty,
    /// Outside the board.
    Wall,
    /// Locked cell of a specific piece type.
    Piece(PieceKind),
}

impl Block {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Block::Empty
    }

    fn as_char(self) -> char {
        match self {
            Block::Empty => ' ',
            Block::Wall => '#',
            Block::Piece(kind) => kind.as_char(),
        }
    }
}

/// Grid of locked cells, including the hidden spawn rows above the visible area.
///
/// # Layout
///
/// - Cells are stored row-major; `(0, 0)` is the top-left cell of the hidden area
/// - Rows grow downward; the last row is the floor
/// - The top [`HIDDEN_ROWS`] rows are the spawn buffer; a stack reaching into
///   them means the game is lost
///
/// The grid never changes size after construction.
///
/// Boards are compared and hashed by their cells only; the memoized
/// [`ClusterId`] is derived data.
///
/// # Example
///
/// ```
/// use stackbot_engine::{Piece, PieceKind, PiecePosition, Playfield};
///
/// let mut board = Playfield::standard();
/// assert_eq!(board.free_height(), board.height());
///
/// let piece = Piece::new(PieceKind::I, 1, PiecePosition::new(0, 22));
/// assert!(board.place(piece));
/// assert_eq!(board.free_height(), 23);
/// ```
#[derive(Debug, Clone)]
pub struct Playfield {
    width: usize,
    height: usize,
    cells: Vec<Block>,
    cluster_id: OnceCell<ClusterId>,
}

impl PartialEq for Playfield {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.cells == other.cells
    }
}

impl Eq for Playfield {}

impl Hash for Playfield {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.width.hash(state);
        self.height.hash(state);
        self.cells.hash(state);
    }
}

impl Default for Playfield {
    fn default() -> Self {
        Self::standard()
    }
}

impl Playfield {
    /// Creates an empty board `width` columns wide with `visible_height`
    /// visible rows plus the hidden spawn rows.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero.
    #[must_use]
    pub fn new(width: usize, visible_height: usize) -> Self {
        assert!(width > 0, "board width must not be zero");
        let height = visible_height + HIDDEN_ROWS;
        Self {
            width,
            height,
            cells: vec![Block::Empty; width * height],
            cluster_id: OnceCell::new(),
        }
    }

    /// Creates the standard empty 10×20 board (24 rows including hidden rows).
    #[must_use]
    pub fn standard() -> Self {
        Self::new(STANDARD_WIDTH, STANDARD_VISIBLE_HEIGHT)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Total number of rows, hidden rows included.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok().filter(|x| *x < self.width)?;
        let y = usize::try_from(y).ok().filter(|y| *y < self.height)?;
        Some(y * self.width + x)
    }

    /// Returns the block at `(x, y)`, or [`Block::Wall`] outside the board.
    #[must_use]
    pub fn block_at(&self, x: i32, y: i32) -> Block {
        self.index(x, y).map_or(Block::Wall, |i| self.cells[i])
    }

    fn row(&self, y: usize) -> &[Block] {
        &self.cells[y * self.width..][..self.width]
    }

    /// Iterates over the rows from top (hidden rows first) to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Block]> {
        self.cells.chunks(self.width)
    }

    /// Returns `true` if every cell of row `y` is occupied.
    #[must_use]
    pub fn is_line_complete(&self, y: usize) -> bool {
        y < self.height && self.row(y).iter().all(|b| !b.is_empty())
    }

    /// Returns `true` if any cell of row `y` is occupied.
    #[must_use]
    pub fn is_line_occupied(&self, y: usize) -> bool {
        y < self.height && self.row(y).iter().any(|b| !b.is_empty())
    }

    /// Index of the topmost occupied row, or `height()` for an empty board.
    ///
    /// Larger is better: it is the number of free rows above the stack.
    #[must_use]
    pub fn free_height(&self) -> usize {
        (0..self.height)
            .find(|&y| self.is_line_occupied(y))
            .unwrap_or(self.height)
    }

    /// Counts empty cells whose upper neighbor in the same column is occupied.
    #[must_use]
    pub fn hole_count(&self) -> usize {
        (1..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .filter(|&(x, y)| {
                self.cells[y * self.width + x].is_empty()
                    && !self.cells[(y - 1) * self.width + x].is_empty()
            })
            .count()
    }

    /// Sum over occupied cells of `(height - row)²`.
    ///
    /// Cells near the top of the board weigh much more than cells near the
    /// floor, so this penalizes tall and uneven stacks.
    #[must_use]
    pub fn quadratic_height(&self) -> u64 {
        self.rows()
            .enumerate()
            .map(|(y, row)| {
                let weight = (self.height - y) as u64;
                let occupied = row.iter().filter(|b| !b.is_empty()).count() as u64;
                occupied * weight * weight
            })
            .sum()
    }

    /// Returns `true` if the stack has risen into the hidden spawn rows.
    #[must_use]
    pub fn is_lost(&self) -> bool {
        self.free_height() < HIDDEN_ROWS
    }

    /// Removes every complete row and returns how many were removed.
    ///
    /// Rows are visited once from top to bottom. Each complete row is removed
    /// by shifting every row above it down by one and inserting an empty row
    /// at the top, so the rows below the current one are never disturbed.
    pub fn clear_completed_lines(&mut self) -> usize {
        let mut count = 0;
        for y in 0..self.height {
            if self.is_line_complete(y) {
                self.cells.copy_within(..y * self.width, self.width);
                self.cells[..self.width].fill(Block::Empty);
                count += 1;
            }
        }
        if count > 0 {
            self.cluster_id.take();
        }
        count
    }

    /// Locks `piece` into the board at its current rotation and anchor.
    ///
    /// Returns `false` without modifying the board if any target cell is
    /// outside the board. Occupied target cells are overwritten; callers are
    /// expected to place only pieces that [fit](Piece::fits).
    pub fn place(&mut self, piece: Piece) -> bool {
        let mut targets = [0; 4];
        for (target, (x, y)) in targets.iter_mut().zip(piece.cells()) {
            let Some(index) = self.index(x, y) else {
                return false;
            };
            *target = index;
        }
        for index in targets {
            self.cells[index] = Block::Piece(piece.kind());
        }
        self.cluster_id.take();
        true
    }

    /// Returns this board's cluster, computing it on first use.
    #[must_use]
    pub fn cluster_id(&self) -> ClusterId {
        *self.cluster_id.get_or_init(|| {
            let free_height = self.free_height();
            if free_height < HIDDEN_ROWS {
                ClusterId::Lost
            } else {
                ClusterId::Stack {
                    free_height,
                    holes: self.hole_count(),
                }
            }
        })
    }

    /// Creates a standard board from ASCII art for testing.
    ///
    /// `#` marks an occupied cell and `.` an empty one. Each line is one row
    /// of 10 cells; the lines are aligned to the floor, so the last line is
    /// the bottom row.
    ///
    /// # Panics
    ///
    /// Panics if a row does not have exactly 10 cells or there are more rows
    /// than the board height.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let mut board = Self::standard();
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(lines.len() <= board.height, "too many rows: {}", lines.len());

        let top = board.height - lines.len();
        for (i, line) in lines.iter().enumerate() {
            let chars: Vec<char> = line.chars().filter(|c| *c == '#' || *c == '.').collect();
            assert_eq!(
                chars.len(),
                board.width,
                "Each row must have exactly {} cells, got {} at row {}",
                board.width,
                chars.len(),
                i
            );
            for (x, &ch) in chars.iter().enumerate() {
                if ch == '#' {
                    board.cells[(top + i) * board.width + x] = Block::Piece(PieceKind::O);
                }
            }
        }
        board
    }
}

impl fmt::Display for Playfield {
    /// Debug text dump: one character per cell between `|` borders, followed
    /// by the board's cluster id.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            write!(f, "|")?;
            for block in row {
                write!(f, "{}", block.as_char())?;
            }
            writeln!(f, "|")?;
        }
        write!(f, "cluster: {}", self.cluster_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::piece::PiecePosition;

    fn fill_row(board: &mut Playfield, y: usize) {
        for x in 0..board.width {
            board.cells[y * board.width + x] = Block::Piece(PieceKind::I);
        }
    }

    #[test]
    fn test_initial_board() {
        let board = Playfield::standard();
        assert_eq!(board.width(), 10);
        assert_eq!(board.height(), 24);
        assert_eq!(board.cells.len(), 240);
        assert!(board.cells.iter().all(|b| b.is_empty()));
        assert_eq!(board.free_height(), 24);
        assert_eq!(board.hole_count(), 0);
        assert_eq!(board.quadratic_height(), 0);
        assert!(!board.is_lost());
    }

    #[test]
    #[should_panic(expected = "width must not be zero")]
    fn test_zero_width_board_is_rejected() {
        let _ = Playfield::new(0, 20);
    }

    #[test]
    fn test_block_at_out_of_bounds_is_wall() {
        let board = Playfield::standard();
        assert_eq!(board.block_at(-1, 0), Block::Wall);
        assert_eq!(board.block_at(10, 0), Block::Wall);
        assert_eq!(board.block_at(0, -1), Block::Wall);
        assert_eq!(board.block_at(0, 24), Block::Wall);
        assert_eq!(board.block_at(0, 0), Block::Empty);
        assert_eq!(board.block_at(9, 23), Block::Empty);
    }

    #[test]
    fn test_line_queries() {
        let mut board = Playfield::standard();
        fill_row(&mut board, 23);
        board.cells[22 * 10 + 4] = Block::Piece(PieceKind::T);

        assert!(board.is_line_complete(23));
        assert!(board.is_line_occupied(23));
        assert!(!board.is_line_complete(22));
        assert!(board.is_line_occupied(22));
        assert!(!board.is_line_occupied(21));
        assert!(!board.is_line_complete(24));
        assert_eq!(board.free_height(), 22);
    }

    #[test]
    fn test_hole_count() {
        let board = Playfield::from_ascii(
            r"
            .#........
            ..........
            .#.#......
            .###......
            ",
        );
        // column 1: one hole under the top cell; column 3: none
        assert_eq!(board.hole_count(), 1);
    }

    #[test]
    fn test_quadratic_height() {
        let board = Playfield::from_ascii(
            r"
            #.........
            ##........
            ",
        );
        // rows 22 and 23 have weights 2 and 1
        assert_eq!(board.quadratic_height(), 4 + 2);
    }

    #[test]
    fn test_clear_lines_single_line() {
        let mut board = Playfield::from_ascii(
            r"
            #.........
            ##########
            ",
        );
        assert_eq!(board.clear_completed_lines(), 1);
        assert_eq!(board.block_at(0, 23), Block::Piece(PieceKind::O));
        assert!(!board.is_line_occupied(22));
        assert_eq!(board.free_height(), 23);
    }

    #[test]
    fn test_clear_lines_non_adjacent() {
        let mut board = Playfield::from_ascii(
            r"
            ##########
            #.........
            ##########
            .#........
            ",
        );
        assert_eq!(board.clear_completed_lines(), 2);
        assert_eq!(board.block_at(0, 22), Block::Piece(PieceKind::O));
        assert_eq!(board.block_at(1, 23), Block::Piece(PieceKind::O));
        assert_eq!(board.free_height(), 22);
    }

    #[test]
    fn test_clear_lines_consecutive() {
        let mut board = Playfield::standard();
        for y in 20..24 {
            fill_row(&mut board, y);
        }
        board.cells[19 * 10] = Block::Piece(PieceKind::L);
        assert_eq!(board.clear_completed_lines(), 4);
        assert_eq!(board.block_at(0, 23), Block::Piece(PieceKind::L));
        assert_eq!(board.free_height(), 23);
    }

    #[test]
    fn test_clear_lines_is_idempotent() {
        let mut board = Playfield::from_ascii(
            r"
            ##########
            #.#.......
            ",
        );
        assert_eq!(board.clear_completed_lines(), 1);
        assert_eq!(board.clear_completed_lines(), 0);
    }

    #[test]
    fn test_place_marks_cells() {
        let mut board = Playfield::standard();
        let piece = Piece::new(PieceKind::T, 0, PiecePosition::new(0, 22));
        assert!(board.place(piece));
        assert_eq!(board.block_at(1, 22), Block::Piece(PieceKind::T));
        assert_eq!(board.block_at(0, 23), Block::Piece(PieceKind::T));
        assert_eq!(board.block_at(1, 23), Block::Piece(PieceKind::T));
        assert_eq!(board.block_at(2, 23), Block::Piece(PieceKind::T));
        assert_eq!(board.cells.iter().filter(|b| !b.is_empty()).count(), 4);
    }

    #[test]
    fn test_place_out_of_bounds_has_no_effect() {
        let mut board = Playfield::standard();
        let before = board.clone();
        // last cell would land below the floor
        let piece = Piece::new(PieceKind::I, 0, PiecePosition::new(0, 21));
        assert!(!board.place(piece));
        assert_eq!(board, before);
        assert!(board.cells.iter().all(|b| b.is_empty()));
    }

    #[test]
    fn test_lost_board() {
        let mut board = Playfield::standard();
        board.cells[2 * 10 + 5] = Block::Piece(PieceKind::S);
        assert_eq!(board.free_height(), 2);
        assert!(board.is_lost());
        assert_eq!(board.cluster_id(), ClusterId::Lost);

        let mut board = Playfield::standard();
        board.cells[4 * 10 + 5] = Block::Piece(PieceKind::S);
        assert!(!board.is_lost());
    }

    #[test]
    fn test_cluster_id_is_stable_and_invalidated_by_mutation() {
        let mut board = Playfield::from_ascii(
            r"
            .#........
            ..........
            ##########
            ",
        );
        let id = board.cluster_id();
        assert_eq!(
            id,
            ClusterId::Stack {
                free_height: 21,
                holes: 1
            }
        );
        assert_eq!(board.cluster_id(), id);

        board.clear_completed_lines();
        assert_eq!(
            board.cluster_id(),
            ClusterId::Stack {
                free_height: 22,
                holes: 1
            }
        );
    }

    #[test]
    fn test_equality_ignores_memoized_cluster() {
        let a = Playfield::standard();
        let b = Playfield::standard();
        let _ = a.cluster_id();
        assert_eq!(a, b);
    }

    #[test]
    fn test_display_dump() {
        let board = Playfield::from_ascii("#........#");
        let dump = board.to_string();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 25);
        assert_eq!(lines[0], "|          |");
        assert_eq!(lines[23], "|O        O|");
        assert_eq!(lines[24], "cluster: 23-0");
    }
}
