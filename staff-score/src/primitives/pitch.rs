use std::fmt::Display;

pub use musical_note::{midi_to_note, Accidental, Key, NoteName, Scale};
use musical_note::NotesMap;
use serde::{Deserialize, Serialize};

use crate::error::{ScoreError, ScoreResult};

/// Letters in the order of the staff lines.
pub(crate) const LETTERS: [NoteName; 7] = [
    NoteName::C,
    NoteName::D,
    NoteName::E,
    NoteName::F,
    NoteName::G,
    NoteName::A,
    NoteName::B,
];

/// Letter, that follows the given one on the staff.
pub(crate) fn next_letter(name: NoteName) -> NoteName {
    let idx = LETTERS.iter().position(|l| *l == name).unwrap_or(0);
    LETTERS[(idx + 1) % LETTERS.len()]
}

/// Semitones from C to the natural letter.
fn letter_semitone(name: NoteName) -> i32 {
    NotesMap::get().get_by_note(name, Accidental::White) as i32
}

/// Semitones, the accidental moves the letter by.
pub fn alteration(name: NoteName, accidental: Accidental) -> i32 {
    let shift = NotesMap::get().get_by_note(name, accidental) as i32
        - letter_semitone(name);
    match shift {
        x if x > 6 => x - 12,
        x if x < -6 => x + 12,
        x => x,
    }
}

/// Written pitch of a note.
///
/// `accidental` is the accidental written before the note.
/// None means the note follows the measure and the key signature,
/// `Some(Accidental::White)` is an explicit natural.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct Pitch {
    name: NoteName,
    /// scientific octave: C4 is the middle C (midi 60).
    octave: i8,
    accidental: Option<Accidental>,
}
impl Pitch {
    pub fn new(name: NoteName, octave: i8, accidental: Option<Accidental>) -> Self {
        Self {
            name,
            octave,
            accidental,
        }
    }
    pub fn name(&self) -> NoteName {
        self.name
    }
    pub fn octave(&self) -> i8 {
        self.octave
    }
    pub fn accidental(&self) -> Option<Accidental> {
        self.accidental
    }
    pub fn set_accidental(&mut self, accidental: Option<Accidental>) -> &mut Self {
        self.accidental = accidental;
        self
    }

    /// Midi key if the given accidental is in effect.
    pub fn midi_with(&self, accidental: Accidental) -> ScoreResult<u8> {
        let key = (self.octave as i32 + 1) * 12
            + letter_semitone(self.name)
            + alteration(self.name, accidental);
        u8::try_from(key)
            .ok()
            .filter(|key| *key <= 127)
            .ok_or(ScoreError::PitchOutOfRange(key))
    }

    /// Accidental, with which the letter and octave of the pitch sound
    /// as `midi`. None if double accidentals are not enough.
    pub fn accidental_for(&self, midi: u8) -> Option<Accidental> {
        let (_, accidental) = NotesMap::get()
            .resolve_note_for_midi((self.name, Accidental::White), midi % 12)?;
        match self.midi_with(accidental) {
            Ok(key) if key == midi => Some(accidental),
            _ => None,
        }
    }
}
impl Display for Pitch {
    /// Dutch names, as `musical_note` parses them: `fis5`, `bes3`, `c4`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let acc = match self.accidental {
            None | Some(Accidental::White) => String::new(),
            Some(acc) => acc.to_string_by_note(self.name),
        };
        write!(f, "{}{}{}", self.name.to_string(), acc, self.octave)
    }
}

#[cfg(test)]
mod tests {
    use super::{alteration, next_letter, Accidental, NoteName, Pitch};

    #[test]
    fn midi() {
        let c4 = Pitch::new(NoteName::C, 4, None);
        assert_eq!(c4.midi_with(Accidental::White).unwrap(), 60);
        assert_eq!(c4.midi_with(Accidental::Sharp).unwrap(), 61);
        let b_sharp3 = Pitch::new(NoteName::B, 3, Some(Accidental::Sharp));
        assert_eq!(b_sharp3.midi_with(Accidental::Sharp).unwrap(), 60);
        let c_flat4 = Pitch::new(NoteName::C, 4, Some(Accidental::Flat));
        assert_eq!(c_flat4.midi_with(Accidental::Flat).unwrap(), 59);
        let low = Pitch::new(NoteName::C, -1, None);
        assert!(low.midi_with(Accidental::Flat).is_err());
        let high = Pitch::new(NoteName::G, 9, None);
        assert_eq!(high.midi_with(Accidental::White).unwrap(), 127);
        assert!(high.midi_with(Accidental::Sharp).is_err());
    }

    #[test]
    fn alterations() {
        assert_eq!(alteration(NoteName::B, Accidental::Sharp), 1);
        assert_eq!(alteration(NoteName::C, Accidental::DoubleFlat), -2);
        assert_eq!(alteration(NoteName::A, Accidental::DoubleSharp), 2);
        assert_eq!(alteration(NoteName::E, Accidental::White), 0);
        assert_eq!(next_letter(NoteName::B), NoteName::C);
    }

    #[test]
    fn accidental_for() {
        let f4 = Pitch::new(NoteName::F, 4, None);
        assert_eq!(f4.accidental_for(66), Some(Accidental::Sharp));
        assert_eq!(f4.accidental_for(63), Some(Accidental::DoubleFlat));
        assert_eq!(f4.accidental_for(65), Some(Accidental::White));
        assert_eq!(f4.accidental_for(69), None);
        // right letter, wrong octave
        assert_eq!(f4.accidental_for(78), None);
    }

    #[test]
    fn display() {
        let pitch = Pitch::new(NoteName::F, 5, Some(Accidental::Sharp));
        assert_eq!(pitch.to_string(), "fis5");
        let pitch = Pitch::new(NoteName::E, 3, Some(Accidental::Flat));
        assert_eq!(pitch.to_string(), "es3");
        assert_eq!(NoteName::from_str("b"), Some(NoteName::B));
    }
}
