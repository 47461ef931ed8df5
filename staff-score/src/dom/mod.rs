//! Staff: the owner of all notes, measures and tuplet groups.
//!
//! Notes live in one arena per staff, measures keep ordered handles to
//! their notes. Ties and tuplet membership are stored as handles too, so
//! removing a note is a local operation: sever the links on both sides,
//! then free the slot.
//!
//! ```
//! use staff_score::dom::Staff;
//! use staff_score::primitives::{Duration, NoteName, Pitch};
//!
//! let mut staff = Staff::default();
//! let measure = staff.push_measure();
//! let c4 = Pitch::new(NoteName::C, 4, None);
//! let a = staff.push_note(measure, Duration::half(), Some(c4)).unwrap();
//! let b = staff.push_note(measure, Duration::half(), Some(c4)).unwrap();
//! staff.tie_to(a, b).unwrap();
//! assert_eq!(staff.tie_target(a).unwrap(), Some(b));
//! assert_eq!(staff.tie_source(b).unwrap(), Some(a));
//!
//! staff.remove_note(b).unwrap();
//! assert_eq!(staff.tie_target(a).unwrap(), None);
//! ```

use std::collections::BTreeMap;

use fraction::Fraction;

use crate::{
    error::{ScoreError, ScoreResult},
    primitives::{
        fraction_tools::sum_lengths, Duration, KeySignature, Pitch,
        TimeSignature,
    },
};

pub mod note;
pub mod split;
pub mod tie;
pub mod transpose;
pub mod tuplet;

pub use note::{NoteEntity, NoteId, NoteKind};
pub use tuplet::TupletGroup;

/// Handle of a measure inside [Staff].
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct MeasureId(pub(crate) u32);

/// Handle of a tuplet group inside [Staff].
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct TupletId(pub(crate) u32);

#[derive(Debug, PartialEq, Clone)]
pub struct Measure {
    id: MeasureId,
    time_signature: TimeSignature,
    key_signature: KeySignature,
    notes: Vec<NoteId>,
}
impl Measure {
    pub fn id(&self) -> MeasureId {
        self.id
    }
    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }
    pub fn key_signature(&self) -> KeySignature {
        self.key_signature
    }
    /// Notes in score order.
    pub fn notes(&self) -> &[NoteId] {
        &self.notes
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    note: Option<NoteEntity>,
}

#[derive(Debug, Clone)]
pub struct Staff {
    notes: Vec<Slot>,
    free: Vec<u32>,
    measures: Vec<Measure>,
    tuplets: BTreeMap<TupletId, TupletGroup>,
    next_measure: u32,
    next_tuplet: u32,
    /// used for new measures
    time_signature: TimeSignature,
    key_signature: KeySignature,
}
impl Default for Staff {
    fn default() -> Self {
        Self::new(TimeSignature::default(), KeySignature::default())
    }
}
impl Staff {
    pub fn new(time_signature: TimeSignature, key_signature: KeySignature) -> Self {
        Self {
            notes: Vec::new(),
            free: Vec::new(),
            measures: Vec::new(),
            tuplets: BTreeMap::new(),
            next_measure: 0,
            next_tuplet: 0,
            time_signature,
            key_signature,
        }
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }
    pub fn key_signature(&self) -> KeySignature {
        self.key_signature
    }

    /// Append measure with the staff time and key signatures.
    pub fn push_measure(&mut self) -> MeasureId {
        self.push_measure_with(self.time_signature, self.key_signature)
    }
    pub fn push_measure_with(
        &mut self,
        time_signature: TimeSignature,
        key_signature: KeySignature,
    ) -> MeasureId {
        let id = MeasureId(self.next_measure);
        self.next_measure += 1;
        self.measures.push(Measure {
            id,
            time_signature,
            key_signature,
            notes: Vec::new(),
        });
        log::debug!("pushed measure {:?} ({})", id, time_signature);
        id
    }

    /// Remove measure with all its notes.
    ///
    /// Every note is torn down first, so notes of other measures keep no
    /// ties to the removed ones.
    pub fn remove_measure(&mut self, measure: MeasureId) -> ScoreResult<()> {
        let idx = self.measure_index(measure)?;
        let notes = self.measures[idx].notes.clone();
        for id in notes {
            self.remove_note(id)?;
        }
        self.measures.remove(idx);
        log::debug!("removed measure {:?}", measure);
        Ok(())
    }

    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }
    pub fn measure(&self, measure: MeasureId) -> ScoreResult<&Measure> {
        self.measures
            .iter()
            .find(|m| m.id == measure)
            .ok_or(ScoreError::NoSuchMeasure(measure))
    }
    pub fn set_key_signature(
        &mut self,
        measure: MeasureId,
        key_signature: KeySignature,
    ) -> ScoreResult<()> {
        self.measure_mut(measure)?.key_signature = key_signature;
        Ok(())
    }
    fn measure_mut(&mut self, measure: MeasureId) -> ScoreResult<&mut Measure> {
        self.measures
            .iter_mut()
            .find(|m| m.id == measure)
            .ok_or(ScoreError::NoSuchMeasure(measure))
    }
    /// Order of the measure in the staff.
    pub(crate) fn measure_index(&self, measure: MeasureId) -> ScoreResult<usize> {
        self.measures
            .iter()
            .position(|m| m.id == measure)
            .ok_or(ScoreError::NoSuchMeasure(measure))
    }
    pub(crate) fn next_measure(&self, measure: MeasureId) -> ScoreResult<Option<MeasureId>> {
        let idx = self.measure_index(measure)?;
        Ok(self.measures.get(idx + 1).map(|m| m.id))
    }

    /// Sum of effective durations of notes in measure.
    pub fn measure_content(&self, measure: MeasureId) -> ScoreResult<Fraction> {
        let measure = self.measure(measure)?;
        let lengths = measure
            .notes
            .iter()
            .map(|id| self.effective_duration(*id))
            .collect::<ScoreResult<Vec<_>>>()?;
        Ok(sum_lengths(lengths))
    }
    /// Space left in measure. Negative if measure is overfull.
    pub fn measure_remaining(&self, measure: MeasureId) -> ScoreResult<Fraction> {
        let length = self.measure(measure)?.time_signature.length();
        Ok(length - self.measure_content(measure)?)
    }

    /// Append note (or rest, if pitch is None) to the end of measure.
    ///
    /// Tied notes stay neighbours: if the note lands between a tied pair,
    /// that tie is removed. Tuplet notes are created by
    /// [Staff::push_tuplet].
    pub fn push_note(
        &mut self,
        measure: MeasureId,
        duration: Duration,
        pitch: Option<Pitch>,
    ) -> ScoreResult<NoteId> {
        if let Some(ratio) = duration.tuplet() {
            return Err(ScoreError::InvalidDuration(format!(
                "duration with tuplet {ratio} outside of tuplet group"
            )));
        }
        self.untie_over_measure_end(measure)?;
        let id = self.alloc(NoteEntity::new(duration, pitch, measure));
        self.measure_mut(measure)?.notes.push(id);
        Ok(id)
    }

    /// Insert note right after the anchor, in the anchor's measure.
    pub(crate) fn insert_after(
        &mut self,
        anchor: NoteId,
        note: NoteEntity,
    ) -> ScoreResult<NoteId> {
        let (m_idx, slot) = self.location(anchor)?;
        let measure = self.measures[m_idx].id;
        let id = self.alloc(NoteEntity { measure, ..note });
        self.measures[m_idx].notes.insert(slot + 1, id);
        Ok(id)
    }

    /// Move note to the end of other measure.
    pub(crate) fn move_to_measure(
        &mut self,
        id: NoteId,
        measure: MeasureId,
    ) -> ScoreResult<()> {
        let old = self.note(id)?.measure;
        self.measure(measure)?;
        self.measure_mut(old)?.notes.retain(|n| *n != id);
        self.measure_mut(measure)?.notes.push(id);
        self.note_mut(id)?.measure = measure;
        Ok(())
    }

    fn alloc(&mut self, note: NoteEntity) -> NoteId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.notes[index as usize];
                slot.note = Some(note);
                NoteId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.notes.push(Slot {
                    generation: 0,
                    note: Some(note),
                });
                NoteId {
                    index: self.notes.len() as u32 - 1,
                    generation: 0,
                }
            }
        }
    }

    pub fn note(&self, id: NoteId) -> ScoreResult<&NoteEntity> {
        self.notes
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.note.as_ref())
            .ok_or(ScoreError::NoSuchNote(id))
    }
    pub(crate) fn note_mut(&mut self, id: NoteId) -> ScoreResult<&mut NoteEntity> {
        self.notes
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.note.as_mut())
            .ok_or(ScoreError::NoSuchNote(id))
    }
    pub fn contains(&self, id: NoteId) -> bool {
        self.note(id).is_ok()
    }

    /// All notes of the staff in score order.
    pub fn notes_in_order(&self) -> impl Iterator<Item = NoteId> + '_ {
        self.measures.iter().flat_map(|m| m.notes.iter().copied())
    }

    /// (order of the measure, order of the note inside measure).
    ///
    /// Comparing locations gives the time order of notes.
    pub(crate) fn location(&self, id: NoteId) -> ScoreResult<(usize, usize)> {
        let measure = self.note(id)?.measure;
        let m_idx = self.measure_index(measure)?;
        let slot = self.measures[m_idx]
            .notes
            .iter()
            .position(|n| *n == id)
            .ok_or(ScoreError::NoSuchNote(id))?;
        Ok((m_idx, slot))
    }

    /// Key signature of the measure, that holds the note.
    pub fn key_signature_of(&self, id: NoteId) -> ScoreResult<KeySignature> {
        let measure = self.note(id)?.measure;
        Ok(self.measure(measure)?.key_signature)
    }

    pub fn effective_duration(&self, id: NoteId) -> ScoreResult<Fraction> {
        Ok(self.note(id)?.effective_duration())
    }
    pub fn kind(&self, id: NoteId) -> ScoreResult<NoteKind> {
        Ok(self.note(id)?.kind())
    }

    /// Change written duration of the note.
    ///
    /// Tuplet members keep their ratio and the group should stay valid,
    /// otherwise [ScoreError::TupletIntegrity] is returned and nothing
    /// changes.
    pub fn set_duration(&mut self, id: NoteId, duration: Duration) -> ScoreResult<()> {
        let note = self.note(id)?;
        let duration = match note.tuplet {
            None => duration.without_tuplet(),
            Some(tuplet) => {
                let group = self.tuplet(tuplet)?;
                let duration = duration.with_tuplet(group.ratio());
                self.check_tuplet_replacement(
                    tuplet,
                    id,
                    &[duration.effective()],
                )?;
                duration
            }
        };
        log::debug!("set duration of {:?} to {}", id, duration);
        self.note_mut(id)?.duration = duration;
        Ok(())
    }
    pub fn set_dotted(&mut self, id: NoteId, dotted: bool) -> ScoreResult<()> {
        let duration = self.note(id)?.duration.with_dot(dotted);
        self.set_duration(id, duration)
    }

    /// Sever every link of the note: ties on both sides and tuplet
    /// membership. Should be called before the note is released.
    pub fn prepare_for_delete(&mut self, id: NoteId) -> ScoreResult<()> {
        self.remove_tie(id)?;
        self.leave_tuplet(id)?;
        Ok(())
    }

    /// Tear the note down and free its slot.
    pub fn remove_note(&mut self, id: NoteId) -> ScoreResult<NoteEntity> {
        self.prepare_for_delete(id)?;
        let measure = self.note(id)?.measure;
        self.measure_mut(measure)?.notes.retain(|n| *n != id);
        let slot = &mut self.notes[id.index as usize];
        let note = slot.note.take().ok_or(ScoreError::NoSuchNote(id))?;
        slot.generation += 1;
        self.free.push(id.index);
        log::debug!("removed note {:?}", id);
        Ok(note)
    }
}
