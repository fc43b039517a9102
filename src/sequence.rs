//! Click sequences: the 4-cell PIN picked on a 3×3 grid.
//!
//! Cells are numbered row-major from 1 (top-left) to 9 (bottom-right).
//! Order matters; `[1, 5, 9, 3]` and `[3, 9, 5, 1]` are different sequences.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of cells in a sequence.
pub const SEQUENCE_LEN: usize = 4;

/// Grid side length.
pub const GRID_SIDE: u8 = 3;

/// Highest cell number.
pub const MAX_CELL: u8 = GRID_SIDE * GRID_SIDE;

/// Errors that can occur when building a click sequence.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SequenceError {
    #[error("Click sequence must have exactly 4 cells, got {0}")]
    WrongLength(usize),

    #[error("Click sequence cell {0} is outside 1-9")]
    OutOfRange(i64),

    #[error("Click sequence repeats cell {0}")]
    Duplicate(u8),

    #[error("Invalid click sequence '{0}'")]
    Unparsable(String),
}

/// Returns true iff `seq` is exactly 4 distinct values, each in 1..=9.
pub fn validate(seq: &[i64]) -> bool {
    check(seq).is_ok()
}

fn check(seq: &[i64]) -> Result<[u8; SEQUENCE_LEN], SequenceError> {
    if seq.len() != SEQUENCE_LEN {
        return Err(SequenceError::WrongLength(seq.len()));
    }

    let mut cells = [0u8; SEQUENCE_LEN];
    for (slot, &value) in cells.iter_mut().zip(seq) {
        if !(1..=i64::from(MAX_CELL)).contains(&value) {
            return Err(SequenceError::OutOfRange(value));
        }
        *slot = value as u8;
    }

    for (i, cell) in cells.iter().enumerate() {
        if cells[..i].contains(cell) {
            return Err(SequenceError::Duplicate(*cell));
        }
    }

    Ok(cells)
}

/// A validated click sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<i64>")]
pub struct ClickSequence([u8; SEQUENCE_LEN]);

impl ClickSequence {
    /// Builds a sequence from cell numbers, rejecting invalid input.
    pub fn new(cells: [u8; SEQUENCE_LEN]) -> Result<Self, SequenceError> {
        Self::from_values(&cells.map(i64::from))
    }

    /// Builds a sequence from arbitrary integers, rejecting invalid input.
    pub fn from_values(values: &[i64]) -> Result<Self, SequenceError> {
        check(values).map(Self)
    }

    /// Builds a sequence from (row, column) grid clicks, both 0-based.
    pub fn from_grid_clicks(clicks: &[(u8, u8)]) -> Result<Self, SequenceError> {
        let values = clicks
            .iter()
            .map(|&(row, col)| match cell_at(row, col) {
                Some(cell) => Ok(i64::from(cell)),
                None => Err(SequenceError::OutOfRange(
                    i64::from(row) * i64::from(GRID_SIDE) + i64::from(col) + 1,
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_values(&values)
    }

    /// Returns the cells in click order.
    pub fn cells(&self) -> &[u8; SEQUENCE_LEN] {
        &self.0
    }

    /// Ordered equality against raw integers, as found in embedded metadata.
    pub fn matches(&self, values: &[i64]) -> bool {
        values.len() == SEQUENCE_LEN
            && self
                .0
                .iter()
                .zip(values)
                .all(|(&cell, &value)| i64::from(cell) == value)
    }
}

/// Cell number for a 0-based (row, column), if it lies on the grid.
pub fn cell_at(row: u8, col: u8) -> Option<u8> {
    (row < GRID_SIDE && col < GRID_SIDE).then(|| row * GRID_SIDE + col + 1)
}

impl TryFrom<Vec<i64>> for ClickSequence {
    type Error = SequenceError;

    fn try_from(values: Vec<i64>) -> Result<Self, Self::Error> {
        Self::from_values(&values)
    }
}

impl From<ClickSequence> for Vec<i64> {
    fn from(seq: ClickSequence) -> Self {
        seq.0.iter().map(|&c| i64::from(c)).collect()
    }
}

impl fmt::Display for ClickSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{a}-{b}-{c}-{d}")
    }
}

impl FromStr for ClickSequence {
    type Err = SequenceError;

    /// Accepts `1,5,9,3`, `1 5 9 3`, `1-5-9-3` or `1593`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let unparsable = || SequenceError::Unparsable(s.to_string());

        let values: Vec<i64> = if s.chars().all(|c| c.is_ascii_digit()) {
            s.chars()
                .map(|c| c.to_digit(10).map(i64::from).ok_or_else(unparsable))
                .collect::<Result<_, _>>()?
        } else {
            s.split(|c: char| c == ',' || c == '-' || c.is_whitespace())
                .filter(|part| !part.is_empty())
                .map(|part| part.parse::<i64>().map_err(|_| unparsable()))
                .collect::<Result<_, _>>()?
        };

        Self::from_values(&values)
    }
}
