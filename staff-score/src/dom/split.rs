//! Fitting notes into the measure space.
//!
//! Note, that does not fit the space left, is split into tied fragments;
//! note, that is shorter than the space, can be extended.

use std::collections::VecDeque;

use fraction::Fraction;

use crate::{
    error::{ScoreError, ScoreResult},
    primitives::{
        fraction_tools::{decompose_length, zero},
        Duration, Pitch,
    },
};

use super::{NoteEntity, NoteId, Staff};

impl Staff {
    /// Split the note, so its first part is `max` long.
    ///
    /// # Returns
    ///
    /// All fragments in order, the first is the original note.
    /// If the note already fits `max`, it is returned unchanged.
    ///
    /// Lengths, that can not be written by one (dotted) note, are made of
    /// several tied fragments. Notes are tied one to another, rests are
    /// not. Tie, that went out of the note, goes out of the last fragment.
    ///
    /// # Example
    /// ```
    /// # use fraction::Fraction;
    /// # use staff_score::dom::Staff;
    /// # use staff_score::primitives::{Duration, NoteName, Pitch};
    /// let mut staff = Staff::default();
    /// let m = staff.push_measure();
    /// let c4 = Some(Pitch::new(NoteName::C, 4, None));
    /// let half = staff.push_note(m, Duration::half(), c4).unwrap();
    /// let parts = staff
    ///     .subtract_duration(half, Fraction::new(1u64, 4u64))
    ///     .unwrap();
    /// assert_eq!(parts.len(), 2);
    /// assert_eq!(parts[0], half);
    /// assert_eq!(staff.tie_target(parts[0]).unwrap(), Some(parts[1]));
    /// assert_eq!(
    ///     staff.effective_duration(parts[1]).unwrap(),
    ///     Fraction::new(1u64, 4u64)
    /// );
    /// ```
    pub fn subtract_duration(
        &mut self,
        id: NoteId,
        max: Fraction,
    ) -> ScoreResult<Vec<NoteId>> {
        if max <= zero() {
            return Err(ScoreError::InvalidSplit(max));
        }
        let note = self.note(id)?.clone();
        let effective = note.effective_duration();
        if max >= effective {
            return Ok(vec![id]);
        }
        let scale = note.duration.scale();
        let ratio = note.duration.tuplet();
        let durations = decompose_length(max / scale)?
            .into_iter()
            .chain(decompose_length((effective - max) / scale)?)
            .map(|(length, _)| {
                let dur = Duration::from_written(length)?;
                Ok(match ratio {
                    Some(ratio) => dur.with_tuplet(ratio),
                    None => dur,
                })
            })
            .collect::<ScoreResult<Vec<_>>>()?;
        if let Some(tuplet) = note.tuplet {
            let lengths: Vec<Fraction> =
                durations.iter().map(|dur| dur.effective()).collect();
            self.check_tuplet_replacement(tuplet, id, &lengths)?;
        }

        let old_target = self.untie_forward(id)?;
        {
            let head = self.note_mut(id)?;
            head.duration = durations[0];
            head.fragment = true;
        }
        let mut fragments = vec![id];
        for duration in durations.into_iter().skip(1) {
            let prev = fragments[fragments.len() - 1];
            let mut entity = NoteEntity::new(duration, note.pitch, note.measure);
            entity.fragment = true;
            let new = self.insert_after(prev, entity)?;
            if let Some(tuplet) = note.tuplet {
                self.join_tuplet_after(tuplet, prev, new)?;
            }
            if !note.is_rest() {
                self.link(prev, new)?;
            }
            fragments.push(new);
        }
        if let Some(target) = old_target {
            self.link(fragments[fragments.len() - 1], target)?;
        }
        log::debug!(
            "split {:?} at {} into {} fragments",
            id,
            max,
            fragments.len()
        );
        Ok(fragments)
    }

    /// Extend the note to the longest duration, that is not longer than
    /// `max`.
    ///
    /// Tuplet members keep their ratio. Returns false, if nothing longer
    /// than the current duration fits.
    pub fn try_to_fill(&mut self, id: NoteId, max: Fraction) -> ScoreResult<bool> {
        if max <= zero() {
            return Err(ScoreError::InvalidSplit(max));
        }
        let note = self.note(id)?;
        let current = note.effective_duration();
        let tuplet = note.tuplet;
        let best = Duration::candidates(note.duration.tuplet())
            .into_iter()
            .find(|dur| dur.effective() <= max);
        let best = match best {
            Some(dur) if dur.effective() > current => dur,
            _ => return Ok(false),
        };
        if let Some(tuplet) = tuplet {
            self.check_tuplet_replacement(tuplet, id, &[best.effective()])?;
        }
        log::debug!("filled {:?} up to {}", id, best);
        self.note_mut(id)?.duration = best;
        Ok(true)
    }

    /// Append note to the end of the staff.
    ///
    /// Note, that does not fit the last measure, is split at the barline
    /// and flows into the next measures, which are created as needed.
    ///
    /// # Returns
    ///
    /// All placed fragments in order.
    pub fn append_flowing(
        &mut self,
        duration: Duration,
        pitch: Option<Pitch>,
    ) -> ScoreResult<Vec<NoteId>> {
        let measure = match self.measures.last().map(|m| m.id) {
            Some(measure) => measure,
            None => self.push_measure(),
        };
        let space = self.measure_remaining(measure)?;
        if space > zero() && space < duration.effective() {
            decompose_length(space)?;
        }
        let first = self.push_note(measure, duration, pitch)?;
        let mut pending = VecDeque::from([first]);
        let mut placed = Vec::new();
        while let Some(id) = pending.pop_front() {
            let measure = self.note(id)?.measure;
            let space = self.space_before(id)?;
            let fragments = match space > zero() {
                true => self.subtract_duration(id, space)?,
                false => Vec::new(),
            };
            let mut filled = zero();
            let mut overflow = Vec::new();
            for fragment in fragments {
                match filled < space {
                    true => {
                        filled += self.effective_duration(fragment)?;
                        placed.push(fragment);
                    }
                    false => overflow.push(fragment),
                }
            }
            if space <= zero() {
                overflow.push(id);
            }
            if overflow.is_empty() {
                continue;
            }
            let next = match self.next_measure(measure)? {
                Some(next) => next,
                None => self.push_measure(),
            };
            overflow.extend(pending.drain(..));
            for fragment in overflow.iter() {
                self.move_to_measure(*fragment, next)?;
            }
            pending.extend(overflow);
        }
        Ok(placed)
    }

    /// Measure length minus notes before the given one.
    fn space_before(&self, id: NoteId) -> ScoreResult<Fraction> {
        let (m_idx, slot) = self.location(id)?;
        let measure = &self.measures[m_idx];
        let mut space = measure.time_signature.length();
        for prev in measure.notes[..slot].iter() {
            space -= self.effective_duration(*prev)?;
        }
        Ok(space)
    }
}
