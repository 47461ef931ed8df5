use std::fmt::Display;

use fraction::Fraction;
use serde::{Deserialize, Serialize};

use crate::error::{ScoreError, ScoreResult};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u32,
    pub denominator: u32,
}
impl TimeSignature {
    pub fn new(numerator: u32, denominator: u32) -> ScoreResult<Self> {
        if numerator == 0 || !denominator.is_power_of_two() {
            return Err(ScoreError::InvalidDuration(format!(
                "invalid time signature: {numerator}/{denominator}"
            )));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }
    /// Length of the full measure in whole notes.
    pub fn length(&self) -> Fraction {
        Fraction::new(self.numerator, self.denominator)
    }
}
impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
        }
    }
}
impl Display for TimeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
