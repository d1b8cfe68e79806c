//! Series input files.
//!
//! The first line is a header and is ignored. Every following line holds one
//! series as `games,policy,piece,seed`:
//!
//! ```text
//! games,policy,piece,seed
//! 50,random,6,1
//! 10,reinforcement-learning,-1,42
//! ```
//!
//! `piece` is `-1` for random shapes or a code from `0` to `6`. The first
//! blank line ends the input.

use std::{io::BufRead, num::ParseIntError, str::FromStr};

use anyhow::Context as _;
use stackbot_engine::{InvalidPieceCode, PieceSelection};

/// One requested series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SeriesRecord {
    pub game_count: usize,
    pub policy: String,
    pub piece: PieceSelection,
    pub seed: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub(crate) enum RecordError {
    #[display("expected 4 comma-separated fields (games,policy,piece,seed), found {found}")]
    FieldCount { found: usize },
    #[display("invalid {field} {value:?}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        source: ParseIntError,
    },
    #[display("{_0}")]
    InvalidPiece(#[error(not(source))] InvalidPieceCode),
}

impl FromStr for SeriesRecord {
    type Err = RecordError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let &[game_count, policy, piece, seed] = fields.as_slice() else {
            return Err(RecordError::FieldCount {
                found: fields.len(),
            });
        };
        let piece = parse_number(piece, "piece code")?;
        Ok(Self {
            game_count: parse_number(game_count, "game count")?,
            policy: policy.to_owned(),
            piece: PieceSelection::from_code(piece).map_err(RecordError::InvalidPiece)?,
            seed: parse_number(seed, "seed")?,
        })
    }
}

fn parse_number<T>(value: &str, field: &'static str) -> Result<T, RecordError>
where
    T: FromStr<Err = ParseIntError>,
{
    value.parse().map_err(|source| RecordError::InvalidNumber {
        field,
        value: value.to_owned(),
        source,
    })
}

/// Skips the header and yields `(line number, record)` pairs lazily, so the
/// records before a malformed line can be processed first.
pub(crate) fn read_records<R>(
    reader: R,
) -> anyhow::Result<impl Iterator<Item = anyhow::Result<(usize, SeriesRecord)>>>
where
    R: BufRead,
{
    let mut lines = reader.lines().zip(1..);
    let (header, _) = lines
        .next()
        .context("Input is empty: expected a header line")?;
    header.context("Failed to read the header line")?;

    Ok(lines.map_while(|(line, number)| match line {
        Err(e) => Some(Err(anyhow::Error::new(e).context(format!("Failed to read line {number}")))),
        Ok(line) if line.trim().is_empty() => None,
        Ok(line) => Some(
            line.parse::<SeriesRecord>()
                .map(|record| (number, record))
                .with_context(|| format!("Invalid record on line {number}")),
        ),
    }))
}

#[cfg(test)]
mod tests {
    use stackbot_engine::PieceKind;

    use super::*;

    #[test]
    fn test_parse_record() {
        let record: SeriesRecord = "50,random,6,1".parse().unwrap();
        assert_eq!(
            record,
            SeriesRecord {
                game_count: 50,
                policy: "random".to_owned(),
                piece: PieceSelection::Fixed(PieceKind::I),
                seed: 1,
            }
        );
        let record: SeriesRecord = "3, quadratic, -1, -9".parse().unwrap();
        assert_eq!(record.piece, PieceSelection::Random);
        assert_eq!(record.seed, -9);
    }

    #[test]
    fn test_field_count() {
        assert_eq!(
            "50,random,6".parse::<SeriesRecord>(),
            Err(RecordError::FieldCount { found: 3 })
        );
        assert_eq!(
            "1,2,3,4,5".parse::<SeriesRecord>(),
            Err(RecordError::FieldCount { found: 5 })
        );
    }

    #[test]
    fn test_non_numeric_fields() {
        let err = "many,random,6,1".parse::<SeriesRecord>().unwrap_err();
        assert_eq!(err.to_string(), r#"invalid game count "many""#);
        assert!(std::error::Error::source(&err).is_some());

        let err = "5,random,6,x".parse::<SeriesRecord>().unwrap_err();
        assert_eq!(err.to_string(), r#"invalid seed "x""#);

        assert!(matches!(
            "-5,random,6,1".parse::<SeriesRecord>(),
            Err(RecordError::InvalidNumber {
                field: "game count",
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_piece_code() {
        assert_eq!(
            "5,random,9,1".parse::<SeriesRecord>(),
            Err(RecordError::InvalidPiece(InvalidPieceCode { code: 9 }))
        );
    }

    #[test]
    fn test_read_records_skips_header_and_stops_at_blank_line() {
        let input = "games,policy,piece,seed\n5,random,0,1\n7,quadratic,-1,2\n\n9,random,0,3\n";
        let records = read_records(input.as_bytes())
            .unwrap()
            .collect::<anyhow::Result<Vec<_>>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0, 2);
        assert_eq!(records[1].0, 3);
        assert_eq!(records[1].1.policy, "quadratic");
    }

    #[test]
    fn test_read_records_reports_line_number() {
        let input = "header\n5,random,0,1\noops\n";
        let mut records = read_records(input.as_bytes()).unwrap();
        assert!(records.next().unwrap().is_ok());
        let err = records.next().unwrap().unwrap_err();
        assert_eq!(err.to_string(), "Invalid record on line 3");
        assert!(format!("{err:#}").contains("found 1"));
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(read_records("".as_bytes()).is_err());
    }
}
