//! Tools for treating Fractions as musical lengths.

use fraction::Fraction;

use crate::error::{ScoreError, ScoreResult};

use super::LIMIT_DENOMINATOR;

/// Fraction of 0/1, the neutral element for summing lengths.
pub fn zero() -> Fraction {
    Fraction::new(0u64, 1u64)
}

/// Sum lengths without going through floating point.
pub fn sum_lengths(lengths: impl IntoIterator<Item = Fraction>) -> Fraction {
    lengths.into_iter().fold(zero(), |acc, len| acc + len)
}

/// Converts fraction to f64. Used only at the boundaries, where
/// the caller wants a float time.
pub fn as_f64(frac: Fraction) -> f64 {
    let (num, denom) = match (frac.numer(), frac.denom()) {
        (Some(n), Some(d)) => (*n as f64, *d as f64),
        _ => return f64::NAN,
    };
    match frac.is_sign_negative() {
        true => -num / denom,
        false => num / denom,
    }
}

/// Converts length (in whole notes) to integer ticks, rounding to the
/// nearest tick.
///
/// Returns None for negative or not finite fractions.
///
/// # Example
/// ```
/// # use fraction::Fraction;
/// # use staff_score::primitives::fraction_tools::to_ticks;
/// // triplet eighth with 960 ticks per quarter
/// assert_eq!(to_ticks(Fraction::new(1u64, 12u64), 960 * 4), Some(320));
/// assert_eq!(to_ticks(Fraction::new(3u64, 8u64), 960 * 4), Some(1440));
/// ```
pub fn to_ticks(frac: Fraction, ticks_per_whole: u64) -> Option<u64> {
    if frac.is_sign_negative() && frac != zero() {
        return None;
    }
    let num = *frac.numer()? as u128;
    let denom = *frac.denom()? as u128;
    if denom == 0 {
        return None;
    }
    let ticks = (num * ticks_per_whole as u128 + denom / 2) / denom;
    u64::try_from(ticks).ok()
}

/// All lengths that can be written by one note (with or without a dot),
/// from the dotted whole down to 1/128.
///
/// # Returns
///
/// Vector of (length, dotted), started with the largest.
pub fn written_lengths() -> Vec<(Fraction, bool)> {
    let mut lengths = Vec::new();
    let mut denom = 1u64;
    while denom <= LIMIT_DENOMINATOR {
        if denom < LIMIT_DENOMINATOR {
            lengths.push((Fraction::new(3u64, denom * 2), true));
        }
        lengths.push((Fraction::new(1u64, denom), false));
        denom *= 2;
    }
    lengths
}

/// Split complex fraction by simple fractions, that could be interpreted as
/// musical lengths.
///
/// Greedy: every step takes the biggest written length, that still fits,
/// so dotted values are used where possible.
///
/// # Returns
///
/// Vector of (length, dotted), started with the largest.
///
/// # Example
///
/// ```
/// # use fraction::Fraction;
/// # use staff_score::primitives::decompose_length;
/// assert_eq!(
///     decompose_length(Fraction::new(13u64, 16u64)).unwrap(),
///     vec![
///         (Fraction::new(3u64, 4u64), true),
///         (Fraction::new(1u64, 16u64), false),
///     ]
/// );
/// ```
pub fn decompose_length(frac: Fraction) -> ScoreResult<Vec<(Fraction, bool)>> {
    if frac.is_sign_negative() || frac == zero() {
        return Err(ScoreError::InvalidDuration(format!(
            "can not decompose non-positive length {frac}"
        )));
    }
    let denom = *frac
        .denom()
        .ok_or(ScoreError::UnrepresentableDuration(frac))?;
    if !denom.is_power_of_two() || denom > LIMIT_DENOMINATOR {
        return Err(ScoreError::UnrepresentableDuration(frac));
    }
    let lengths = written_lengths();
    let mut rest = frac;
    let mut pieces = Vec::new();
    while rest > zero() {
        let piece = lengths
            .iter()
            .find(|(len, _)| *len <= rest)
            .ok_or(ScoreError::UnrepresentableDuration(frac))?;
        rest = rest - piece.0;
        pieces.push(*piece);
    }
    Ok(pieces)
}
