#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use lockstep_core::{BoardError, CellCoord};
use lockstep_world::Board;
use serde::{Deserialize, Serialize};

const SHARE_DOMAIN: &str = "lockstep";
const SHARE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded puzzle payload.
pub(crate) const SHARE_HEADER: &str = "lockstep:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// A complete puzzle captured as a single-line string for transfer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct PuzzleSnapshot {
    /// Display name carried alongside the puzzle.
    pub name: String,
    /// Board text block in the two-character cell format.
    pub board: String,
    /// Waypoints to visit in order before the goal.
    pub waypoints: Vec<CellCoord>,
}

impl PuzzleSnapshot {
    /// Encodes the snapshot into a single-line string suitable for
    /// clipboard transfer. The declared dimensions must match the board.
    #[must_use]
    pub(crate) fn encode(&self, columns: u32, rows: u32) -> String {
        let json = serde_json::to_vec(self).expect("puzzle snapshot serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{SHARE_HEADER}:{columns}x{rows}:{encoded}")
    }

    /// Decodes a snapshot from the provided string representation,
    /// validating that the embedded board parses and matches the declared
    /// dimensions.
    pub(crate) fn decode(value: &str) -> Result<Self, ShareError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ShareError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(ShareError::MissingPrefix)?;
        let version = parts.next().ok_or(ShareError::MissingVersion)?;
        let dimensions = parts.next().ok_or(ShareError::MissingDimensions)?;
        let payload = parts.next().ok_or(ShareError::MissingPayload)?;

        if domain != SHARE_DOMAIN {
            return Err(ShareError::InvalidPrefix(domain.to_owned()));
        }
        if version != SHARE_VERSION {
            return Err(ShareError::UnsupportedVersion(version.to_owned()));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(ShareError::InvalidEncoding)?;
        let decoded: PuzzleSnapshot =
            serde_json::from_slice(&bytes).map_err(ShareError::InvalidPayload)?;

        let board = Board::parse(&decoded.board).map_err(ShareError::InvalidBoard)?;
        if board.width() != columns || board.height() != rows {
            return Err(ShareError::DimensionMismatch {
                declared_columns: columns,
                declared_rows: rows,
                actual_columns: board.width(),
                actual_rows: board.height(),
            });
        }

        Ok(decoded)
    }
}

/// Errors that can occur while decoding puzzle share strings.
#[derive(Debug)]
pub(crate) enum ShareError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded puzzle.
    MissingPrefix,
    /// The encoded puzzle did not contain a version segment.
    MissingVersion,
    /// The encoded puzzle did not include grid dimensions.
    MissingDimensions,
    /// The encoded puzzle did not include the payload segment.
    MissingPayload,
    /// The encoded puzzle used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded puzzle used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded puzzle.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
    /// The embedded board text failed to parse.
    InvalidBoard(BoardError),
    /// The embedded board disagreed with the declared dimensions.
    DimensionMismatch {
        /// Columns declared in the envelope.
        declared_columns: u32,
        /// Rows declared in the envelope.
        declared_rows: u32,
        /// Columns the embedded board actually has.
        actual_columns: u32,
        /// Rows the embedded board actually has.
        actual_rows: u32,
    },
}

impl fmt::Display for ShareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "share payload was empty"),
            Self::MissingPrefix => write!(f, "share string is missing the prefix"),
            Self::MissingVersion => write!(f, "share string is missing the version"),
            Self::MissingDimensions => write!(f, "share string is missing the grid dimensions"),
            Self::MissingPayload => write!(f, "share string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "share prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "share version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode share payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse share payload: {error}")
            }
            Self::InvalidBoard(error) => {
                write!(f, "shared board is invalid: {error}")
            }
            Self::DimensionMismatch {
                declared_columns,
                declared_rows,
                actual_columns,
                actual_rows,
            } => write!(
                f,
                "shared board is {actual_columns}x{actual_rows} but the envelope declares \
                 {declared_columns}x{declared_rows}"
            ),
        }
    }
}

impl Error for ShareError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            Self::InvalidBoard(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), ShareError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| ShareError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| ShareError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| ShareError::InvalidDimensions(dimensions.to_owned()))?;

    if columns == 0 || rows == 0 {
        return Err(ShareError::InvalidDimensions(dimensions.to_owned()));
    }

    Ok((columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORRIDOR: &str = "# # # # # # \n# S     G # \n# # # # # # ";

    fn snapshot() -> PuzzleSnapshot {
        PuzzleSnapshot {
            name: "corridor".to_owned(),
            board: CORRIDOR.to_owned(),
            waypoints: vec![CellCoord::new(2, 1)],
        }
    }

    #[test]
    fn round_trip_preserves_the_puzzle() {
        let original = snapshot();

        let encoded = original.encode(6, 3);
        assert!(encoded.starts_with(&format!("{SHARE_HEADER}:6x3:")));

        let decoded = PuzzleSnapshot::decode(&encoded).expect("snapshot decodes");
        assert_eq!(original, decoded);
    }

    #[test]
    fn empty_strings_are_rejected() {
        assert!(matches!(
            PuzzleSnapshot::decode("   "),
            Err(ShareError::EmptyPayload)
        ));
    }

    #[test]
    fn foreign_prefixes_are_rejected() {
        let encoded = snapshot().encode(6, 3);
        let foreign = encoded.replacen("lockstep", "maze", 1);
        assert!(matches!(
            PuzzleSnapshot::decode(&foreign),
            Err(ShareError::InvalidPrefix(_))
        ));
    }

    #[test]
    fn unknown_versions_are_rejected() {
        let encoded = snapshot().encode(6, 3);
        let newer = encoded.replacen("v1", "v9", 1);
        assert!(matches!(
            PuzzleSnapshot::decode(&newer),
            Err(ShareError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn malformed_dimensions_are_rejected() {
        assert!(matches!(
            PuzzleSnapshot::decode("lockstep:v1:6by3:abc"),
            Err(ShareError::InvalidDimensions(_))
        ));
        assert!(matches!(
            PuzzleSnapshot::decode("lockstep:v1:0x3:abc"),
            Err(ShareError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn garbage_payloads_are_rejected() {
        assert!(matches!(
            PuzzleSnapshot::decode("lockstep:v1:6x3:!!!"),
            Err(ShareError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let encoded = snapshot().encode(9, 9);
        assert!(matches!(
            PuzzleSnapshot::decode(&encoded),
            Err(ShareError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn invalid_boards_are_rejected() {
        let broken = PuzzleSnapshot {
            name: "broken".to_owned(),
            board: "# # \n# # ".to_owned(),
            waypoints: Vec::new(),
        };
        let encoded = broken.encode(2, 2);
        assert!(matches!(
            PuzzleSnapshot::decode(&encoded),
            Err(ShareError::InvalidBoard(_))
        ));
    }
}
