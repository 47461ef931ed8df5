//! Ties between notes of the same pitch.
//!
//! Tie is one relation, stored on both sides: `a.tie_to == Some(b)` if
//! and only if `b.tie_from == Some(a)`. Every operation here sets or
//! clears both sides inside one call, or fails without touching the
//! staff.

use fraction::Fraction;

use crate::{
    error::{ScoreError, ScoreResult, TieRejection},
    primitives::fraction_tools::sum_lengths,
};

use super::{MeasureId, NoteId, Staff};

impl Staff {
    /// Tie note `from` to the note `to`, that follows it.
    ///
    /// Both notes should have the same sounding pitch (resolved by the key
    /// signature and the accidentals written earlier in their measures),
    /// `to` should be the very next note of the staff, and neither side
    /// may already be tied to another note. Tying the same pair twice is
    /// a no-op.
    pub fn tie_to(&mut self, from: NoteId, to: NoteId) -> ScoreResult<()> {
        let reject = |reason: TieRejection| {
            log::warn!("rejected tie {:?} -> {:?}: {}", from, to, reason);
            Err(ScoreError::InvalidTie { from, to, reason })
        };
        let source = self.note(from)?;
        let target = self.note(to)?;
        if from == to {
            return reject(TieRejection::SelfTie);
        }
        if source.is_rest() || target.is_rest() {
            return reject(TieRejection::Rest);
        }
        if source.tie_to == Some(to) {
            return Ok(());
        }
        if source.tie_to.is_some() {
            return reject(TieRejection::SourceAlreadyTied);
        }
        if target.tie_from.is_some() {
            return reject(TieRejection::TargetAlreadyTied);
        }
        if self.tie_pitch(from)? != self.tie_pitch(to)? {
            return reject(TieRejection::PitchMismatch);
        }
        if self.location(to)? < self.location(from)? {
            return reject(TieRejection::Backwards);
        }
        if self.next_in_order(from)? != Some(to) {
            return reject(TieRejection::NotConsecutive);
        }
        self.note_mut(from)?.tie_to = Some(to);
        self.note_mut(to)?.tie_from = Some(from);
        log::debug!("tied {:?} -> {:?}", from, to);
        Ok(())
    }

    /// Same relation as [Staff::tie_to], seen from the later note:
    /// `id` becomes tied from `source`.
    pub fn tie_from(&mut self, id: NoteId, source: NoteId) -> ScoreResult<()> {
        self.tie_to(source, id)
    }

    /// Clear incoming and outgoing ties of the note, together with the
    /// matching links of its partners.
    pub fn remove_tie(&mut self, id: NoteId) -> ScoreResult<()> {
        let note = self.note(id)?;
        let (to, from) = (note.tie_to, note.tie_from);
        if let Some(to) = to {
            self.note_mut(to)?.tie_from = None;
        }
        if let Some(from) = from {
            self.note_mut(from)?.tie_to = None;
        }
        let note = self.note_mut(id)?;
        note.tie_to = None;
        note.tie_from = None;
        if to.is_some() || from.is_some() {
            log::debug!("removed ties of {:?}", id);
        }
        Ok(())
    }

    /// Set both sides of the tie without checks. Callers guarantee, that
    /// both notes are free on the linked sides and share the pitch.
    pub(crate) fn link(&mut self, from: NoteId, to: NoteId) -> ScoreResult<()> {
        self.note(to)?;
        self.note_mut(from)?.tie_to = Some(to);
        self.note_mut(to)?.tie_from = Some(from);
        Ok(())
    }

    /// Clear only the outgoing tie of the note.
    pub fn untie_forward(&mut self, id: NoteId) -> ScoreResult<Option<NoteId>> {
        let to = self.note(id)?.tie_to;
        if let Some(to) = to {
            self.note_mut(to)?.tie_from = None;
            self.note_mut(id)?.tie_to = None;
        }
        Ok(to)
    }

    pub fn tie_target(&self, id: NoteId) -> ScoreResult<Option<NoteId>> {
        Ok(self.note(id)?.tie_to)
    }
    pub fn tie_source(&self, id: NoteId) -> ScoreResult<Option<NoteId>> {
        Ok(self.note(id)?.tie_from)
    }

    /// The first note of the chain of ties, containing the note.
    pub fn tie_chain_head(&self, id: NoteId) -> ScoreResult<NoteId> {
        let mut head = id;
        while let Some(from) = self.note(head)?.tie_from {
            head = from;
        }
        Ok(head)
    }

    /// The whole chain of ties, containing the note, from the head.
    pub fn tie_chain(&self, id: NoteId) -> ScoreResult<Vec<NoteId>> {
        let mut chain = vec![self.tie_chain_head(id)?];
        while let Some(next) = self.note(chain[chain.len() - 1])?.tie_to {
            chain.push(next);
        }
        Ok(chain)
    }

    /// Duration of the note together with all notes tied after it.
    pub fn tied_duration(&self, id: NoteId) -> ScoreResult<Fraction> {
        let mut lengths = vec![self.effective_duration(id)?];
        let mut current = id;
        while let Some(next) = self.note(current)?.tie_to {
            lengths.push(self.effective_duration(next)?);
            current = next;
        }
        Ok(sum_lengths(lengths))
    }

    /// Note, that follows the given one in score order. Empty measures
    /// are skipped.
    pub(crate) fn next_in_order(&self, id: NoteId) -> ScoreResult<Option<NoteId>> {
        let (m_idx, slot) = self.location(id)?;
        let next = self.measures[m_idx].notes.get(slot + 1).copied();
        Ok(next.or_else(|| {
            self.measures[m_idx + 1..]
                .iter()
                .find_map(|m| m.notes.first().copied())
        }))
    }

    /// Notes, appended to the measure, land between the last note before
    /// its end and the note, that last note is tied to. That tie is
    /// removed.
    pub(crate) fn untie_over_measure_end(
        &mut self,
        measure: MeasureId,
    ) -> ScoreResult<()> {
        let idx = self.measure_index(measure)?;
        let last = self.measures[..=idx]
            .iter()
            .rev()
            .find_map(|m| m.notes.last().copied());
        if let Some(last) = last {
            if let Some(to) = self.untie_forward(last)? {
                log::debug!(
                    "tie {:?} -> {:?} is broken by notes, pushed into {:?}",
                    last,
                    to,
                    measure
                );
            }
        }
        Ok(())
    }

    /// Pitch, used to decide whether notes can be tied: midi key under
    /// the key signature of the note's measure and the accidentals,
    /// written before the note.
    fn tie_pitch(&self, id: NoteId) -> ScoreResult<Option<u8>> {
        let key = self.key_signature_of(id)?;
        let pitch = match self.note(id)?.pitch() {
            Some(pitch) => *pitch,
            None => return Ok(None),
        };
        key.resolve(&pitch, &self.accidentals_before(id)?).map(Some)
    }
}
