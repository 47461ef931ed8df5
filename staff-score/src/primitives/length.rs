//! Written note durations and their real (effective) length.
//!
//! All lengths are measured in whole notes: quarter is 1/4,
//! triplet eighth is 1/12.

use std::fmt::Display;

use fraction::Fraction;
use serde::{Deserialize, Serialize};

use crate::error::{ScoreError, ScoreResult};

use super::{fraction_tools::written_lengths, LIMIT_DENOMINATOR};

/// `actual` notes played in the time of `normal` notes.
///
/// Triplet is 3:2.
#[derive(
    Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize,
)]
pub struct TupletRatio {
    actual: u8,
    normal: u8,
}
impl TupletRatio {
    pub fn new(actual: u8, normal: u8) -> ScoreResult<Self> {
        if actual == 0 || normal == 0 {
            return Err(ScoreError::InvalidDuration(format!(
                "tuplet ratio can not contain zero: {actual}:{normal}"
            )));
        }
        Ok(Self { actual, normal })
    }
    pub fn triplet() -> Self {
        Self {
            actual: 3,
            normal: 2,
        }
    }
    pub fn actual(&self) -> u8 {
        self.actual
    }
    pub fn normal(&self) -> u8 {
        self.normal
    }
    /// Multiplier, applied to written length: 2/3 for triplet.
    pub fn scale(&self) -> Fraction {
        Fraction::new(self.normal as u64, self.actual as u64)
    }
    pub fn is_triplet(&self) -> bool {
        self.actual == 3 && self.normal == 2
    }
}
impl Display for TupletRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.actual, self.normal)
    }
}

/// Duration of a note: power-of-two base, optional dot and
/// optional tuplet scaling.
///
/// # Example
/// ```
/// # use fraction::Fraction;
/// # use staff_score::primitives::{Duration, TupletRatio};
/// let dotted_quarter = Duration::new(4, true).unwrap();
/// assert_eq!(dotted_quarter.effective(), Fraction::new(3u64, 8u64));
///
/// let triplet_eighth = Duration::new(8, false)
///     .unwrap()
///     .with_tuplet(TupletRatio::triplet());
/// assert_eq!(triplet_eighth.effective(), Fraction::new(1u64, 12u64));
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Duration {
    base: Fraction,
    dotted: bool,
    tuplet: Option<TupletRatio>,
}
impl Duration {
    /// # Parameters
    /// * denominator: 1 for whole, 4 for quarter, up to 128.
    /// * dotted: adds half of the base. 128th can not be dotted.
    pub fn new(denominator: u64, dotted: bool) -> ScoreResult<Self> {
        if !denominator.is_power_of_two() || denominator > LIMIT_DENOMINATOR
        {
            return Err(ScoreError::InvalidDuration(format!(
                "base should be 1/2^n up to 1/{LIMIT_DENOMINATOR}, \
                got 1/{denominator}"
            )));
        }
        if dotted && denominator == LIMIT_DENOMINATOR {
            return Err(ScoreError::InvalidDuration(format!(
                "1/{denominator} can not be dotted"
            )));
        }
        Ok(Self {
            base: Fraction::new(1u64, denominator),
            dotted,
            tuplet: None,
        })
    }
    pub fn whole() -> Self {
        Self::from_parts(Fraction::new(1u64, 1u64), false)
    }
    pub fn half() -> Self {
        Self::from_parts(Fraction::new(1u64, 2u64), false)
    }
    pub fn quarter() -> Self {
        Self::from_parts(Fraction::new(1u64, 4u64), false)
    }
    pub fn eighth() -> Self {
        Self::from_parts(Fraction::new(1u64, 8u64), false)
    }
    pub fn sixteenth() -> Self {
        Self::from_parts(Fraction::new(1u64, 16u64), false)
    }

    fn from_parts(base: Fraction, dotted: bool) -> Self {
        Self {
            base,
            dotted,
            tuplet: None,
        }
    }

    /// Build duration from written length (without tuplet scaling),
    /// e.g. 3/8 becomes dotted quarter.
    pub fn from_written(length: Fraction) -> ScoreResult<Self> {
        written_lengths()
            .into_iter()
            .find(|(len, _)| *len == length)
            .map(|(len, dotted)| match dotted {
                true => Self::from_parts(len * Fraction::new(2u64, 3u64), true),
                false => Self::from_parts(len, false),
            })
            .ok_or(ScoreError::UnrepresentableDuration(length))
    }

    pub fn with_tuplet(mut self, ratio: TupletRatio) -> Self {
        self.tuplet = Some(ratio);
        self
    }
    pub fn without_tuplet(mut self) -> Self {
        self.tuplet = None;
        self
    }
    pub fn with_dot(mut self, dotted: bool) -> Self {
        self.dotted = dotted;
        self
    }

    pub fn base(&self) -> Fraction {
        self.base
    }
    pub fn dotted(&self) -> bool {
        self.dotted
    }
    pub fn tuplet(&self) -> Option<TupletRatio> {
        self.tuplet
    }
    /// 1 for non-tuplet durations.
    pub fn scale(&self) -> Fraction {
        match self.tuplet {
            None => Fraction::new(1u64, 1u64),
            Some(ratio) => ratio.scale(),
        }
    }
    /// Length as written on paper: base and dot, no tuplet.
    pub fn written(&self) -> Fraction {
        match self.dotted {
            true => self.base * Fraction::new(3u64, 2u64),
            false => self.base,
        }
    }
    /// Real length of the note in whole notes.
    pub fn effective(&self) -> Fraction {
        self.written() * self.scale()
    }

    /// Every duration, that one note can take under the given tuplet,
    /// from the longest to the shortest.
    pub fn candidates(tuplet: Option<TupletRatio>) -> Vec<Self> {
        written_lengths()
            .into_iter()
            .filter_map(|(len, _)| Self::from_written(len).ok())
            .map(|dur| Self { tuplet, ..dur })
            .collect()
    }
}
impl Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let denom = self.base.denom().copied().unwrap_or(0);
        let dot = match self.dotted {
            true => ".",
            false => "",
        };
        match self.tuplet {
            None => write!(f, "{denom}{dot}"),
            Some(ratio) => write!(f, "{denom}{dot} ({ratio})"),
        }
    }
}
