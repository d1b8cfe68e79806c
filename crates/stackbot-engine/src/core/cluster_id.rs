use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Coarse classification of a board used to share value estimates between
/// many concrete boards.
///
/// A board is classified by its free height and hole count, except that every
/// lost board maps to the single [`ClusterId::Lost`] cluster.
///
/// The textual form is `"L"` for lost boards and `"{free_height}-{holes}"`
/// otherwise (e.g. `"17-3"`).
///
/// # Example
///
/// ```
/// use stackbot_engine::ClusterId;
///
/// let id: ClusterId = "17-3".parse().unwrap();
/// assert_eq!(id, ClusterId::Stack { free_height: 17, holes: 3 });
/// assert_eq!(ClusterId::Lost.to_string(), "L");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::IsVariant)]
pub enum ClusterId {
    /// Reserved cluster for boards whose stack reached the hidden rows.
    Lost,
    /// A live board.
    Stack { free_height: usize, holes: usize },
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterId::Lost => write!(f, "L"),
            ClusterId::Stack { free_height, holes } => write!(f, "{free_height}-{holes}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid cluster id: {input:?}")]
pub struct ParseClusterIdError {
    #[error(not(source))]
    input: String,
}

impl FromStr for ClusterId {
    type Err = ParseClusterIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "L" {
            return Ok(ClusterId::Lost);
        }
        let error = || ParseClusterIdError {
            input: s.to_owned(),
        };
        let (free_height, holes) = s.split_once('-').ok_or_else(error)?;
        Ok(ClusterId::Stack {
            free_height: free_height.parse().map_err(|_| error())?,
            holes: holes.parse().map_err(|_| error())?,
        })
    }
}

impl Serialize for ClusterId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClusterId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
