pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("{lines} lines cleared at once cannot be scored")]
pub struct ScoringError {
    #[error(not(source))]
    pub lines: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid piece code {code} (expected -1 for random or 0-6)")]
pub struct InvalidPieceCode {
    #[error(not(source))]
    pub code: i64,
}
