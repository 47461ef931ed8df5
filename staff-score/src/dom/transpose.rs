use crate::{
    error::{ScoreError, ScoreResult},
    primitives::{AccidentalMap, Pitch},
};

use super::{NoteId, Staff};

impl Staff {
    /// Shift the sounding pitch of the note and every note tied with it.
    ///
    /// New pitches are spelled in the key signature of each measure.
    /// Accidental is written only if the measure context would not imply
    /// it anyway. Other notes of the touched measures keep sounding as
    /// before: if they relied on an accidental, carried from a transposed
    /// note, they get it written explicitly. Rests are left untouched.
    ///
    /// # Example
    /// ```
    /// # use staff_score::dom::Staff;
    /// # use staff_score::primitives::{Accidental, Duration, NoteName, Pitch};
    /// let mut staff = Staff::default();
    /// let m = staff.push_measure();
    /// let c4 = Some(Pitch::new(NoteName::C, 4, None));
    /// let id = staff.push_note(m, Duration::quarter(), c4).unwrap();
    /// staff.transpose_by(id, 1).unwrap();
    /// assert_eq!(
    ///     staff.note(id).unwrap().pitch(),
    ///     Some(&Pitch::new(NoteName::C, 4, Some(Accidental::Sharp)))
    /// );
    /// ```
    pub fn transpose_by(&mut self, id: NoteId, semitones: i32) -> ScoreResult<()> {
        if self.note(id)?.is_rest() {
            return Ok(());
        }
        let chain = self.tie_chain(id)?;
        let mut targets = Vec::with_capacity(chain.len());
        for note in chain.iter() {
            let key = self.key_signature_of(*note)?;
            let pitch = match self.note(*note)?.pitch {
                Some(pitch) => pitch,
                None => continue,
            };
            let current = key.resolve(&pitch, &self.accidentals_before(*note)?)?;
            let target = current as i32 + semitones;
            let target = u8::try_from(target)
                .ok()
                .filter(|key| *key <= 127)
                .ok_or(ScoreError::PitchOutOfRange(target))?;
            targets.push((*note, target));
        }
        let neighbours = self.sounding_neighbours(&chain)?;
        for (note, target) in targets {
            let key = self.key_signature_of(note)?;
            let (name, octave, accidental) = key.spell(target);
            let context = self.accidentals_before(note)?;
            let written = match key.effective_accidental(name, octave, &context) {
                x if x == accidental => None,
                _ => Some(accidental),
            };
            self.note_mut(note)?.pitch = Some(Pitch::new(name, octave, written));
        }
        self.keep_sounding(neighbours)?;
        log::debug!("transposed {:?} by {} semitones", id, semitones);
        Ok(())
    }

    /// Midi keys of the pitched notes, that share measures with the
    /// chain, but are not part of it. In score order.
    fn sounding_neighbours(&self, chain: &[NoteId]) -> ScoreResult<Vec<(NoteId, u8)>> {
        let mut measures = Vec::new();
        for note in chain {
            let (m_idx, _) = self.location(*note)?;
            if !measures.contains(&m_idx) {
                measures.push(m_idx);
            }
        }
        measures.sort_unstable();
        let mut neighbours = Vec::new();
        for m_idx in measures {
            let key = self.measures[m_idx].key_signature;
            for note in self.measures[m_idx].notes.iter() {
                if chain.contains(note) {
                    continue;
                }
                if let Some(pitch) = self.note(*note)?.pitch {
                    let midi = key.resolve(&pitch, &self.accidentals_before(*note)?)?;
                    neighbours.push((*note, midi));
                }
            }
        }
        Ok(neighbours)
    }

    /// Write accidentals for the notes, that stopped sounding as `midi`.
    fn keep_sounding(&mut self, neighbours: Vec<(NoteId, u8)>) -> ScoreResult<()> {
        for (note, midi) in neighbours {
            let key = self.key_signature_of(note)?;
            let pitch = match self.note(note)?.pitch {
                Some(pitch) => pitch,
                None => continue,
            };
            if key.resolve(&pitch, &self.accidentals_before(note)?)? == midi {
                continue;
            }
            match pitch.accidental_for(midi) {
                Some(accidental) => {
                    log::debug!("{:?} keeps sounding {} with {:?}", note, midi, accidental);
                    if let Some(pitch) = self.note_mut(note)?.pitch.as_mut() {
                        pitch.set_accidental(Some(accidental));
                    }
                }
                None => log::warn!("can not keep {:?} sounding as {}", note, midi),
            }
        }
        Ok(())
    }

    /// Accidentals, written in the measure before the note.
    ///
    /// Tie continuations do not change the map.
    pub(crate) fn accidentals_before(&self, id: NoteId) -> ScoreResult<AccidentalMap> {
        let (m_idx, slot) = self.location(id)?;
        let mut map = AccidentalMap::new();
        for prev in self.measures[m_idx].notes[..slot].iter() {
            let note = self.note(*prev)?;
            if note.tie_from.is_some() {
                continue;
            }
            if let Some(pitch) = note.pitch {
                if let Some(accidental) = pitch.accidental() {
                    map.carry(pitch.name(), pitch.octave(), accidental);
                }
            }
        }
        Ok(map)
    }
}
