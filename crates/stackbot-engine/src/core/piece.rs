use std::fmt;

use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::playfield::Playfield;

/// Offset of one occupied cell relative to the piece anchor, as `(column, row)`.
///
/// Rows grow downward, so `(0, 1)` is the cell directly below the anchor.
pub type CellOffset = (i32, i32);

/// The four occupied offsets of a single rotation state.
pub type RotationState = [CellOffset; 4];

/// A falling piece (tetromino) with anchor position, rotation, and type.
///
/// Pieces are plain values: every movement or rotation returns a new `Piece`
/// and leaves the original untouched, so search branches can hold independent
/// copies without sharing state.
///
/// # Example
///
/// ```
/// use stackbot_engine::{Piece, PieceKind, Playfield};
///
/// let board = Playfield::standard();
/// let piece = Piece::spawn(PieceKind::T, board.width());
/// let moved = piece.moved_by(&board, 1, 0).unwrap();
/// let rotated = moved.rotated_by(&board, -1).unwrap();
/// assert_eq!(rotated.rotation(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceKind,
    rotation: usize,
    position: PiecePosition,
}

impl Piece {
    /// Creates a piece at an explicit rotation and anchor.
    ///
    /// # Panics
    ///
    /// Panics if `rotation` is not a valid rotation index for `kind`.
    #[must_use]
    pub fn new(kind: PieceKind, rotation: usize, position: PiecePosition) -> Self {
        assert!(
            rotation < kind.rotation_count(),
            "rotation {rotation} out of range for {kind:?}"
        );
        Self {
            kind,
            rotation,
            position,
        }
    }

    /// Creates a freshly spawned piece: rotation 0, anchored near the
    /// horizontal center of a board `board_width` columns wide, on the top row.
    #[must_use]
    pub fn spawn(kind: PieceKind, board_width: usize) -> Self {
        #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let x = (board_width / 2) as i32 - 2;
        Self::new(kind, 0, PiecePosition::new(x, 0))
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn rotation(&self) -> usize {
        self.rotation
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    /// Key identifying this piece's search state: anchor and rotation.
    #[must_use]
    pub fn state_key(&self) -> (i32, i32, usize) {
        (self.position.x, self.position.y, self.rotation)
    }

    /// Returns the absolute `(column, row)` of each of the four occupied cells.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        cells_at(self.kind, self.rotation, self.position)
    }

    /// Returns `true` if every cell of the piece is in bounds and empty.
    #[must_use]
    pub fn fits(&self, board: &Playfield) -> bool {
        fits_at(board, self.kind, self.rotation, self.position)
    }

    /// Moves the anchor by `(dx, dy)`.
    ///
    /// Returns `None` if any target cell is out of bounds or occupied.
    #[must_use]
    pub fn moved_by(&self, board: &Playfield, dx: i32, dy: i32) -> Option<Self> {
        let position = self.position.offset(dx, dy);
        fits_at(board, self.kind, self.rotation, position).then_some(Self {
            position,
            ..*self
        })
    }

    /// Rotates by `steps` states (negative steps rotate the other way), keeping
    /// the anchor fixed.
    ///
    /// No wall kicks are attempted: the target rotation is checked at the
    /// current anchor only. Single-rotation shapes always succeed unchanged.
    #[must_use]
    pub fn rotated_by(&self, board: &Playfield, steps: i32) -> Option<Self> {
        let count = self.kind.rotation_count();
        if count == 1 {
            return Some(*self);
        }
        let rotation = rotate_index(self.rotation, steps, count);
        fits_at(board, self.kind, rotation, self.position).then_some(Self {
            rotation,
            ..*self
        })
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn rotate_index(rotation: usize, steps: i32, count: usize) -> usize {
    (rotation as i32 + steps).rem_euclid(count as i32) as usize
}

fn cells_at(
    kind: PieceKind,
    rotation: usize,
    position: PiecePosition,
) -> impl Iterator<Item = (i32, i32)> {
    kind.rotations()[rotation]
        .into_iter()
        .map(move |(dx, dy)| (position.x + dx, position.y + dy))
}

fn fits_at(board: &Playfield, kind: PieceKind, rotation: usize, position: PiecePosition) -> bool {
    cells_at(kind, rotation, position).all(|(x, y)| board.block_at(x, y).is_empty())
}

impl fmt::Display for Piece {
    /// Renders the piece's current rotation inside its 4×4 box.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells = self.kind.rotations()[self.rotation];
        for y in 0..4 {
            for x in 0..4 {
                let ch = if cells.contains(&(x, y)) {
                    self.kind.as_char()
                } else {
                    ' '
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Anchor position of a piece on the board.
///
/// Coordinates are signed because collision checks routinely test positions
/// just outside the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct PiecePosition {
    x: i32,
    y: i32,
}

impl PiecePosition {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn x(self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> i32 {
        self.y
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::BY_CODE[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// Piece kinds indexed by their numeric code in series input files.
    pub const BY_CODE: [PieceKind; PieceKind::LEN] = [
        PieceKind::O,
        PieceKind::Z,
        PieceKind::S,
        PieceKind::T,
        PieceKind::J,
        PieceKind::L,
        PieceKind::I,
    ];

    /// Returns the kind for a numeric piece code (`0..=6`).
    ///
    /// # Examples
    ///
    /// ```
    /// use stackbot_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_code(0), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_code(6), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_code(7), None);
    /// ```
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::BY_CODE.get(i).copied())
    }

    /// Inverse of [`PieceKind::from_code`].
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            PieceKind::O => 0,
            PieceKind::Z => 1,
            PieceKind::S => 2,
            PieceKind::T => 3,
            PieceKind::J => 4,
            PieceKind::L => 5,
            PieceKind::I => 6,
        }
    }

    /// Number of distinct rotation states: 1 (O), 2 (S, Z, I) or 4 (T, J, L).
    #[must_use]
    pub fn rotation_count(self) -> usize {
        self.rotations().len()
    }

    /// Occupied offsets of every rotation state, in rotation-index order.
    #[must_use]
    pub fn rotations(self) -> &'static [RotationState] {
        SHAPE_TABLE[self as usize]
    }

    /// Returns the single character representation of this piece kind.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }

    /// Parses a piece kind from a single character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'T' => Some(PieceKind::T),
            _ => None,
        }
    }
}

// Offsets are relative to the top-left corner of each shape's bounding box.
// Rotation 0 is the spawn orientation.
const SHAPE_TABLE: [&[RotationState]; PieceKind::LEN] = [
    // I-piece
    &[
        [(0, 0), (0, 1), (0, 2), (0, 3)],
        [(0, 1), (1, 1), (2, 1), (3, 1)],
    ],
    // O-piece
    &[[(1, 1), (0, 0), (0, 1), (1, 0)]],
    // S-piece
    &[
        [(1, 0), (2, 0), (0, 1), (1, 1)],
        [(0, 0), (0, 1), (1, 1), (1, 2)],
    ],
    // Z-piece
    &[
        [(0, 0), (1, 0), (1, 1), (2, 1)],
        [(1, 0), (0, 1), (1, 1), (0, 2)],
    ],
    // J-piece
    &[
        [(1, 1), (1, 0), (2, 0), (1, 2)],
        [(1, 1), (0, 1), (2, 1), (2, 2)],
        [(1, 1), (1, 0), (0, 2), (1, 2)],
        [(1, 1), (0, 0), (0, 1), (2, 1)],
    ],
    // L-piece
    &[
        [(1, 1), (0, 0), (1, 0), (1, 2)],
        [(1, 1), (2, 0), (0, 1), (2, 1)],
        [(1, 1), (1, 0), (1, 2), (2, 2)],
        [(1, 1), (0, 1), (0, 2), (2, 1)],
    ],
    // T-piece
    &[
        [(1, 1), (0, 1), (2, 1), (1, 0)],
        [(1, 1), (1, 2), (2, 1), (1, 0)],
        [(1, 1), (0, 1), (2, 1), (1, 2)],
        [(1, 1), (0, 1), (1, 2), (1, 0)],
    ],
];
