//! Positions of events on the track.
//!
//! Position is measured in whole notes from the start of the track and
//! is always exact. Float and ticks appear only when the position leaves
//! the crate.
//!
//! # Examples
//!
//! ```
//! use fraction::Fraction;
//! use staff_score::primitives::AbsolutePosition;
//!
//! let a = AbsolutePosition::from(Fraction::new(0u64, 4u64));
//! let b = a + Fraction::new(1u64, 4u64) + Fraction::new(1u64, 12u64);
//! assert_eq!(b.get(), Fraction::new(1u64, 3u64));
//! assert_eq!(b.ticks(960), Some(1280));
//! ```

use std::ops::{Add, AddAssign, Sub};

use fraction::Fraction;

use super::fraction_tools::{as_f64, to_ticks, zero};

/// Absolute position in whole notes.
#[derive(Debug, PartialEq, Eq, PartialOrd, Clone, Copy, Hash)]
pub struct AbsolutePosition {
    position: Fraction,
}
impl AbsolutePosition {
    pub fn new(position: Fraction) -> Self {
        Self { position }
    }
    pub fn start() -> Self {
        Self { position: zero() }
    }
    pub fn get(&self) -> Fraction {
        self.position
    }
    /// Integer ticks for the given resolution (ticks per quarter note).
    pub fn ticks(&self, ticks_per_quarter: u32) -> Option<u64> {
        to_ticks(self.position, ticks_per_quarter as u64 * 4)
    }
}
impl Add for AbsolutePosition {
    fn add(self, rhs: Self) -> Self {
        Self {
            position: self.position + rhs.position,
        }
    }

    type Output = Self;
}
impl Sub for AbsolutePosition {
    /// Distance between positions.
    fn sub(self, rhs: Self) -> Fraction {
        self.position - rhs.position
    }

    type Output = Fraction;
}
impl Add<Fraction> for AbsolutePosition {
    fn add(self, rhs: Fraction) -> Self::Output {
        Self {
            position: self.position + rhs,
        }
    }

    type Output = Self;
}
impl AddAssign<Fraction> for AbsolutePosition {
    fn add_assign(&mut self, rhs: Fraction) {
        self.position = self.position + rhs
    }
}
impl From<Fraction> for AbsolutePosition {
    fn from(value: Fraction) -> Self {
        Self { position: value }
    }
}
impl From<AbsolutePosition> for f64 {
    fn from(value: AbsolutePosition) -> Self {
        as_f64(value.position)
    }
}
