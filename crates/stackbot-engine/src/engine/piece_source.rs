use std::{fmt, str::FromStr};

use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{InvalidPieceCode, PieceKind};

/// The pseudo-random stream shared by a game series.
///
/// Every random decision (piece choice, random policies, exploration) draws
/// from one stream, so a series is reproducible from its seed alone.
pub type GameRng = Pcg32;

/// Creates a [`GameRng`] from a signed seed as found in series input files.
///
/// # Example
///
/// ```
/// use rand::Rng as _;
/// use stackbot_engine::seeded_rng;
///
/// let a: u32 = seeded_rng(-7).random();
/// let b: u32 = seeded_rng(-7).random();
/// assert_eq!(a, b);
/// ```
#[must_use]
pub fn seeded_rng(seed: i64) -> GameRng {
    GameRng::seed_from_u64(seed.cast_unsigned())
}

/// Which shape each new piece takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PieceSelection {
    /// A uniformly random shape for every spawn.
    #[default]
    Random,
    /// The same shape for every spawn.
    Fixed(PieceKind),
}

impl PieceSelection {
    /// Code selecting a random shape for every spawn.
    pub const RANDOM_CODE: i64 = -1;

    /// Interprets a piece code: `-1` is random, `0..=6` pins one shape
    /// (see [`PieceKind::from_code`]).
    pub fn from_code(code: i64) -> Result<Self, InvalidPieceCode> {
        if code == Self::RANDOM_CODE {
            return Ok(Self::Random);
        }
        PieceKind::from_code(code)
            .map(Self::Fixed)
            .ok_or(InvalidPieceCode { code })
    }

    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::Random => Self::RANDOM_CODE,
            Self::Fixed(kind) => kind.code(),
        }
    }

    /// Picks the shape of the next piece.
    pub fn next_kind<R>(self, rng: &mut R) -> PieceKind
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::Random => rng.random(),
            Self::Fixed(kind) => kind,
        }
    }
}

/// Error returned when parsing a [`PieceSelection`] from text.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParsePieceSelectionError {
    #[display("expected `random`, a piece code (-1 to 6) or a piece letter, got {_0:?}")]
    Malformed(#[error(not(source))] String),
    #[display("{_0}")]
    InvalidCode(InvalidPieceCode),
}

impl FromStr for PieceSelection {
    type Err = ParsePieceSelectionError;

    /// Accepts `random`, a numeric piece code, or a piece letter (`I`, `O`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("random") {
            return Ok(Self::Random);
        }
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(kind) = PieceKind::from_char(c.to_ascii_uppercase()) {
                return Ok(Self::Fixed(kind));
            }
        }
        let code = s
            .parse()
            .map_err(|_| ParsePieceSelectionError::Malformed(s.to_owned()))?;
        Self::from_code(code).map_err(ParsePieceSelectionError::InvalidCode)
    }
}

impl fmt::Display for PieceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => write!(f, "random"),
            Self::Fixed(kind) => write!(f, "{}", kind.as_char()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(PieceSelection::from_code(-1), Ok(PieceSelection::Random));
        assert_eq!(
            PieceSelection::from_code(6),
            Ok(PieceSelection::Fixed(PieceKind::I))
        );
        assert_eq!(
            PieceSelection::from_code(7),
            Err(InvalidPieceCode { code: 7 })
        );
        assert_eq!(
            PieceSelection::from_code(-2),
            Err(InvalidPieceCode { code: -2 })
        );
    }

    #[test]
    fn test_from_str() {
        assert_eq!("3".parse::<PieceSelection>(), Ok(PieceSelection::Fixed(PieceKind::T)));
        assert_eq!("t".parse::<PieceSelection>(), Ok(PieceSelection::Fixed(PieceKind::T)));
        assert_eq!("-1".parse::<PieceSelection>(), Ok(PieceSelection::Random));
        assert_eq!("Random".parse::<PieceSelection>(), Ok(PieceSelection::Random));
        for selection in [PieceSelection::Random, PieceSelection::Fixed(PieceKind::Z)] {
            assert_eq!(selection.to_string().parse::<PieceSelection>(), Ok(selection));
        }
        assert_eq!(
            "x".parse::<PieceSelection>(),
            Err(ParsePieceSelectionError::Malformed("x".to_owned()))
        );
        assert_eq!(
            "9".parse::<PieceSelection>(),
            Err(ParsePieceSelectionError::InvalidCode(InvalidPieceCode {
                code: 9
            }))
        );
    }

    #[test]
    fn test_fixed_selection_never_changes() {
        let mut rng = seeded_rng(1);
        let selection = PieceSelection::Fixed(PieceKind::L);
        assert!((0..50).all(|_| selection.next_kind(&mut rng) == PieceKind::L));
    }

    #[test]
    fn test_random_selection_covers_all_kinds() {
        let mut rng = seeded_rng(42);
        let kinds: HashSet<_> = (0..500)
            .map(|_| PieceSelection::Random.next_kind(&mut rng))
            .collect();
        assert_eq!(kinds.len(), PieceKind::LEN);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let a: Vec<u32> = {
            let mut rng = seeded_rng(1234);
            (0..8).map(|_| rng.random()).collect()
        };
        let b: Vec<u32> = {
            let mut rng = seeded_rng(1234);
            (0..8).map(|_| rng.random()).collect()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn test_negative_seeds_keep_their_bits() {
        use rand::SeedableRng as _;

        let mut from_seed = seeded_rng(-1);
        let mut from_bits = GameRng::seed_from_u64(u64::MAX);
        for _ in 0..8 {
            assert_eq!(from_seed.random::<u32>(), from_bits.random::<u32>());
        }
        assert_ne!(seeded_rng(-1).random::<u64>(), seeded_rng(1).random::<u64>());
    }
}
