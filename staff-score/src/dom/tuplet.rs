//! Tuplet groups.
//!
//! Grouping is decided when the group is created: the caller states the
//! ratio, the nominal span and the members at once. Afterwards the group
//! is only checked, never corrected.

use fraction::Fraction;

use crate::{
    error::{ScoreError, ScoreResult},
    primitives::{fraction_tools::sum_lengths, Duration, Pitch, TupletRatio},
};

use super::{MeasureId, NoteEntity, NoteId, Staff, TupletId};

#[derive(Debug, PartialEq, Clone)]
pub struct TupletGroup {
    id: TupletId,
    ratio: TupletRatio,
    span: Fraction,
    expected_members: usize,
    members: Vec<NoteId>,
}
impl TupletGroup {
    pub fn id(&self) -> TupletId {
        self.id
    }
    pub fn ratio(&self) -> TupletRatio {
        self.ratio
    }
    /// Nominal duration of the whole group: quarter for three triplet
    /// eighths.
    pub fn span(&self) -> Fraction {
        self.span
    }
    /// Number of members the group was created with.
    pub fn expected_members(&self) -> usize {
        self.expected_members
    }
    pub fn members(&self) -> &[NoteId] {
        &self.members
    }
}

impl Staff {
    /// Create tuplet notes at the end of measure, together with their
    /// group.
    ///
    /// Written durations are scaled by `ratio`. Effective durations of
    /// members should sum to `span`, otherwise nothing is created.
    ///
    /// # Example
    /// ```
    /// # use fraction::Fraction;
    /// # use staff_score::dom::Staff;
    /// # use staff_score::primitives::{Duration, NoteName, Pitch, TupletRatio};
    /// let mut staff = Staff::default();
    /// let m = staff.push_measure();
    /// let e = Some(Pitch::new(NoteName::E, 4, None));
    /// let (_, notes) = staff
    ///     .push_tuplet(
    ///         m,
    ///         TupletRatio::triplet(),
    ///         Fraction::new(1u64, 4u64),
    ///         vec![(Duration::eighth(), e); 3],
    ///     )
    ///     .unwrap();
    /// assert!(staff.is_part_of_full_triplet(notes[1]).unwrap());
    /// assert_eq!(staff.containing_tuplet(notes[0]).unwrap(), notes);
    /// ```
    pub fn push_tuplet(
        &mut self,
        measure: MeasureId,
        ratio: TupletRatio,
        span: Fraction,
        members: Vec<(Duration, Option<Pitch>)>,
    ) -> ScoreResult<(TupletId, Vec<NoteId>)> {
        self.measure(measure)?;
        if members.is_empty() {
            return Err(ScoreError::InvalidDuration(
                "tuplet without members".to_string(),
            ));
        }
        let id = TupletId(self.next_tuplet);
        let members: Vec<(Duration, Option<Pitch>)> = members
            .into_iter()
            .map(|(dur, pitch)| (dur.with_tuplet(ratio), pitch))
            .collect();
        let found = sum_lengths(members.iter().map(|(dur, _)| dur.effective()));
        if found != span {
            log::warn!(
                "tuplet {} members sum to {}, expected {}",
                ratio,
                found,
                span
            );
            return Err(ScoreError::TupletIntegrity {
                tuplet: id,
                expected: span,
                found,
            });
        }
        self.untie_over_measure_end(measure)?;
        self.next_tuplet += 1;
        let mut notes = Vec::with_capacity(members.len());
        for (duration, pitch) in members {
            let mut entity = NoteEntity::new(duration, pitch, measure);
            entity.tuplet = Some(id);
            let note = self.alloc(entity);
            self.measure_mut(measure)?.notes.push(note);
            notes.push(note);
        }
        self.tuplets.insert(
            id,
            TupletGroup {
                id,
                ratio,
                span,
                expected_members: notes.len(),
                members: notes.clone(),
            },
        );
        log::debug!(
            "pushed tuplet {:?} ({}) of {} notes",
            id,
            ratio,
            notes.len()
        );
        Ok((id, notes))
    }

    pub fn tuplet(&self, tuplet: TupletId) -> ScoreResult<&TupletGroup> {
        self.tuplets
            .get(&tuplet)
            .ok_or(ScoreError::NoSuchTuplet(tuplet))
    }
    pub(crate) fn tuplet_mut(
        &mut self,
        tuplet: TupletId,
    ) -> ScoreResult<&mut TupletGroup> {
        self.tuplets
            .get_mut(&tuplet)
            .ok_or(ScoreError::NoSuchTuplet(tuplet))
    }
    pub fn tuplets(&self) -> impl Iterator<Item = &TupletGroup> {
        self.tuplets.values()
    }

    /// Members should sum to the nominal span of the group.
    pub fn validate_tuplet(&self, tuplet: TupletId) -> ScoreResult<()> {
        self.check_tuplet_replacement_inner(tuplet, None)
    }

    /// Check the group as if note `id` were replaced by notes of the given
    /// effective durations.
    pub(crate) fn check_tuplet_replacement(
        &self,
        tuplet: TupletId,
        id: NoteId,
        replacement: &[Fraction],
    ) -> ScoreResult<()> {
        self.check_tuplet_replacement_inner(tuplet, Some((id, replacement)))
    }

    fn check_tuplet_replacement_inner(
        &self,
        tuplet: TupletId,
        replacement: Option<(NoteId, &[Fraction])>,
    ) -> ScoreResult<()> {
        let group = self.tuplet(tuplet)?;
        let mut lengths = Vec::with_capacity(group.members.len());
        for member in group.members.iter() {
            match replacement {
                Some((id, new)) if id == *member => lengths.extend_from_slice(new),
                _ => lengths.push(self.effective_duration(*member)?),
            }
        }
        let found = sum_lengths(lengths);
        if found != group.span {
            log::warn!(
                "tuplet {:?} broken: {} instead of {}",
                tuplet,
                found,
                group.span
            );
            return Err(ScoreError::TupletIntegrity {
                tuplet,
                expected: group.span,
                found,
            });
        }
        Ok(())
    }

    /// Put `new` right after `anchor` in the members of the group.
    pub(crate) fn join_tuplet_after(
        &mut self,
        tuplet: TupletId,
        anchor: NoteId,
        new: NoteId,
    ) -> ScoreResult<()> {
        let group = self.tuplet_mut(tuplet)?;
        let idx = group
            .members
            .iter()
            .position(|id| *id == anchor)
            .ok_or(ScoreError::NoSuchNote(anchor))?;
        group.members.insert(idx + 1, new);
        self.note_mut(new)?.tuplet = Some(tuplet);
        Ok(())
    }

    /// Remove note from its group, if any. The note loses its tuplet
    /// scaling, and the group is dropped when no members left.
    pub fn leave_tuplet(&mut self, id: NoteId) -> ScoreResult<()> {
        let tuplet = match self.note(id)?.tuplet {
            None => return Ok(()),
            Some(tuplet) => tuplet,
        };
        let group = self.tuplet_mut(tuplet)?;
        group.members.retain(|member| *member != id);
        if group.members.is_empty() {
            self.tuplets.remove(&tuplet);
            log::debug!("dropped empty tuplet {:?}", tuplet);
        }
        let note = self.note_mut(id)?;
        note.tuplet = None;
        note.duration = note.duration.without_tuplet();
        Ok(())
    }

    /// Note is a member of group with ratio 3:2.
    pub fn is_triplet(&self, id: NoteId) -> ScoreResult<bool> {
        match self.note(id)?.tuplet {
            None => Ok(false),
            Some(tuplet) => Ok(self.tuplet(tuplet)?.ratio.is_triplet()),
        }
    }
    /// Note is a member of any tuplet group.
    pub fn is_tuplet_member(&self, id: NoteId) -> ScoreResult<bool> {
        Ok(self.note(id)?.tuplet.is_some())
    }

    /// Triplet member, whose group still has all its original members,
    /// none of them split, and the members sum to the span.
    pub fn is_part_of_full_triplet(&self, id: NoteId) -> ScoreResult<bool> {
        if !self.is_triplet(id)? {
            return Ok(false);
        }
        let tuplet = match self.note(id)?.tuplet {
            Some(tuplet) => tuplet,
            None => return Ok(false),
        };
        let group = self.tuplet(tuplet)?;
        if group.members.len() != group.expected_members {
            return Ok(false);
        }
        for member in group.members.iter() {
            if self.note(*member)?.fragment {
                return Ok(false);
            }
        }
        Ok(self.validate_tuplet(tuplet).is_ok())
    }

    /// All members of the note's group in order. Empty if the note is not
    /// a tuplet member.
    pub fn containing_tuplet(&self, id: NoteId) -> ScoreResult<Vec<NoteId>> {
        match self.note(id)?.tuplet {
            None => Ok(Vec::new()),
            Some(tuplet) => Ok(self.tuplet(tuplet)?.members.clone()),
        }
    }
}
