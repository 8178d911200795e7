//! Time positions and note spacings
//!
//! Positions are measured in quarter notes from the start of the document and
//! held as exact rationals. Every legal position is an integer multiple of
//! 1/128 of a quarter note, so grid arithmetic (`pos % subunit`) never drifts
//! the way it would with floating point.
//!
//! On the wire a position is a plain JSON number. Multiples of 1/128 are
//! dyadic fractions, which `f64` represents exactly, so the conversion in both
//! directions is lossless.

use std::fmt;

use num_rational::Rational32;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TabError};

/// Re-export Rational for position arithmetic
pub type Rational = Rational32;

/// Denominator of the position grid (1/128 of a quarter note)
const GRID_DENOM: i32 = 128;

/// A non-negative document position in quarter notes
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Position(Rational);

impl Position {
    /// The start of the document
    pub fn zero() -> Self {
        Position(Rational::from_integer(0))
    }

    /// Smallest distance between two legal positions
    pub fn grid() -> Rational {
        Rational::new(1, GRID_DENOM)
    }

    /// Whole number of quarter notes
    pub fn from_quarters(quarters: u16) -> Self {
        Position(Rational::from_integer(i32::from(quarters)))
    }

    /// Validate a rational as a position
    pub fn new(value: Rational) -> Result<Self> {
        if value < Rational::from_integer(0) {
            return Err(TabError::InvalidPosition(format!("{} is negative", value)));
        }
        let ticks = to_ticks(value).ok_or_else(|| {
            TabError::InvalidPosition(format!("{} is not a multiple of 1/{}", value, GRID_DENOM))
        })?;
        Position::from_ticks(ticks)
    }

    /// Position `ticks` grid steps after the start
    pub fn from_ticks(ticks: i64) -> Result<Self> {
        if ticks < 0 {
            return Err(TabError::InvalidPosition(format!("{} ticks is negative", ticks)));
        }
        let ticks = i32::try_from(ticks).map_err(|_| {
            TabError::InvalidPosition(format!("{} ticks is past the last position", ticks))
        })?;
        Ok(Position(Rational::new(ticks, GRID_DENOM)))
    }

    /// The underlying rational value
    pub fn value(self) -> Rational {
        self.0
    }

    /// Number of grid steps from the start
    pub fn ticks(self) -> i64 {
        // positions are on the grid, so the denominator divides GRID_DENOM
        i64::from(*self.0.numer()) * i64::from(GRID_DENOM / *self.0.denom())
    }

    /// Move by a signed grid-aligned amount
    ///
    /// Fails with `ShiftBeforeStart` when the result would be negative and
    /// `InvalidPosition` when the amount is off the grid or the result lies
    /// past the last representable position.
    pub fn shifted(self, amount: Rational) -> Result<Position> {
        let target = self.ticks() + offset_ticks(amount)?;
        if target < 0 {
            return Err(TabError::ShiftBeforeStart {
                position: self.to_string(),
                amount: amount.to_string(),
            });
        }
        Position::from_ticks(target)
    }

    /// Like [`Position::shifted`], but `None` on any failure
    pub fn checked_shift(self, amount: Rational) -> Option<Position> {
        self.shifted(amount).ok()
    }

    /// Whether this position lies exactly on a multiple of `unit`
    pub fn is_multiple_of(self, unit: Rational) -> bool {
        if unit == Rational::from_integer(0) {
            return false;
        }
        // (a/b) / (c/d) is whole when b*c divides a*d; i64 holds both products
        let dividend = i64::from(*self.0.numer()) * i64::from(*unit.denom());
        let divisor = i64::from(*self.0.denom()) * i64::from(*unit.numer());
        dividend % divisor == 0
    }

    /// Signed distance from `origin` to this position
    pub fn offset_from(self, origin: Position) -> Rational {
        self.0 - origin.0
    }
}

/// Check that a signed amount (shift distance, subunit) lies on the grid
pub fn check_offset(amount: Rational) -> Result<()> {
    offset_ticks(amount).map(|_| ())
}

/// Number of grid steps in a signed grid-aligned amount
pub fn offset_ticks(amount: Rational) -> Result<i64> {
    to_ticks(amount).ok_or_else(|| {
        TabError::InvalidPosition(format!(
            "offset {} is not a multiple of 1/{}",
            amount, GRID_DENOM
        ))
    })
}

fn to_ticks(value: Rational) -> Option<i64> {
    let denom = *value.denom();
    if GRID_DENOM % denom != 0 {
        return None;
    }
    Some(i64::from(*value.numer()) * i64::from(GRID_DENOM / denom))
}

fn rational_to_f64(value: Rational) -> f64 {
    f64::from(*value.numer()) / f64::from(*value.denom())
}

fn rational_from_f64(value: f64) -> Result<Rational> {
    if !value.is_finite() {
        return Err(TabError::InvalidPosition(format!("{} is not finite", value)));
    }
    let ticks = value * f64::from(GRID_DENOM);
    if ticks.fract() != 0.0 || ticks.abs() > f64::from(i32::MAX) {
        return Err(TabError::InvalidPosition(format!(
            "{} is not a multiple of 1/{}",
            value, GRID_DENOM
        )));
    }
    Ok(Rational::new(ticks as i32, GRID_DENOM))
}

impl TryFrom<f64> for Position {
    type Error = TabError;

    fn try_from(value: f64) -> Result<Self> {
        Position::new(rational_from_f64(value)?)
    }
}

impl From<Position> for f64 {
    fn from(position: Position) -> f64 {
        rational_to_f64(position.0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse a signed JS/JSON number into a grid-aligned rational offset
pub fn offset_from_f64(value: f64) -> Result<Rational> {
    rational_from_f64(value)
}

/// Note-value granularities, in quarter notes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "f64", into = "f64")]
pub enum Spacing {
    Whole,
    Half,
    #[default]
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
    SixtyFourth,
    OneTwentyEighth,
}

impl Spacing {
    /// All spacings, longest first
    pub const ALL: [Spacing; 8] = [
        Spacing::Whole,
        Spacing::Half,
        Spacing::Quarter,
        Spacing::Eighth,
        Spacing::Sixteenth,
        Spacing::ThirtySecond,
        Spacing::SixtyFourth,
        Spacing::OneTwentyEighth,
    ];

    /// Length in quarter notes
    pub fn value(self) -> Rational {
        match self {
            Spacing::Whole => Rational::from_integer(4),
            Spacing::Half => Rational::from_integer(2),
            Spacing::Quarter => Rational::from_integer(1),
            Spacing::Eighth => Rational::new(1, 2),
            Spacing::Sixteenth => Rational::new(1, 4),
            Spacing::ThirtySecond => Rational::new(1, 8),
            Spacing::SixtyFourth => Rational::new(1, 16),
            Spacing::OneTwentyEighth => Rational::new(1, 32),
        }
    }

    /// Look up the spacing with the given length
    pub fn from_value(value: Rational) -> Option<Spacing> {
        Spacing::ALL.into_iter().find(|s| s.value() == value)
    }

    /// Next finer spacing, if any
    pub fn halved(self) -> Option<Spacing> {
        Spacing::from_value(self.value() / Rational::from_integer(2))
    }
}

impl TryFrom<f64> for Spacing {
    type Error = TabError;

    fn try_from(value: f64) -> Result<Self> {
        let rational =
            rational_from_f64(value).map_err(|_| TabError::InvalidSpacing(value.to_string()))?;
        Spacing::from_value(rational).ok_or_else(|| TabError::InvalidSpacing(value.to_string()))
    }
}

impl From<Spacing> for f64 {
    fn from(spacing: Spacing) -> f64 {
        rational_to_f64(spacing.value())
    }
}

impl From<Spacing> for Rational {
    fn from(spacing: Spacing) -> Rational {
        spacing.value()
    }
}
