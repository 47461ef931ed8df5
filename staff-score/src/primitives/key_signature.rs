//! Key signature and the accidentals, active inside one measure.
//!
//! Accidental of a note without written accidental is decided in order:
//! - accidental, carried from previous note of the measure (same letter,
//!   same octave);
//! - accidental of the key signature for the letter;
//! - natural.
//!
//! The measure-scoped [AccidentalMap] is owned by the caller and should be
//! reset at every barline. [KeySignature] itself holds no state.

use std::{collections::HashMap, str::FromStr};

use musical_note::NotesMap;
use serde::{Deserialize, Serialize};

use crate::error::{ScoreError, ScoreResult};

use super::{
    pitch::{alteration, next_letter},
    midi_to_note, Accidental, Key, NoteName, Pitch, Scale,
};

/// Major tonics from 7 flats to 7 sharps.
const TONICS: [(NoteName, Accidental); 15] = [
    (NoteName::C, Accidental::Flat),
    (NoteName::G, Accidental::Flat),
    (NoteName::D, Accidental::Flat),
    (NoteName::A, Accidental::Flat),
    (NoteName::E, Accidental::Flat),
    (NoteName::B, Accidental::Flat),
    (NoteName::F, Accidental::White),
    (NoteName::C, Accidental::White),
    (NoteName::G, Accidental::White),
    (NoteName::D, Accidental::White),
    (NoteName::A, Accidental::White),
    (NoteName::E, Accidental::White),
    (NoteName::B, Accidental::White),
    (NoteName::F, Accidental::Sharp),
    (NoteName::C, Accidental::Sharp),
];

/// Seven degrees of the key, spelled from the tonic letter by letter.
/// None if a degree needs more than a double accidental.
fn degree_notes(key: Key) -> Option<Vec<(NoteName, Accidental)>> {
    let notes_map = NotesMap::get();
    let mut midi = key.get_root()[0];
    let mut notes = vec![key.tonic];
    for interval in key.scale.structure() {
        midi = (midi + interval) % 12;
        let letter = next_letter(notes[notes.len() - 1].0);
        notes.push(
            notes_map.resolve_note_for_midi((letter, Accidental::White), midi)?,
        );
    }
    Some(notes)
}

/// Key signature as position on the circle of fifths:
/// positive for sharps, negative for flats.
#[derive(
    Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize, Default,
)]
pub struct KeySignature {
    fifths: i8,
}
impl KeySignature {
    pub fn new(fifths: i8) -> ScoreResult<Self> {
        if !(-7..=7).contains(&fifths) {
            return Err(ScoreError::InvalidKeySignature(format!(
                "expected from 7 flats to 7 sharps, got {fifths}"
            )));
        }
        Ok(Self { fifths })
    }
    pub fn c_major() -> Self {
        Self { fifths: 0 }
    }
    pub fn fifths(&self) -> i8 {
        self.fifths
    }

    /// Major key with this signature.
    pub fn key(&self) -> Key {
        let (name, accidental) = usize::try_from(self.fifths as i32 + 7)
            .ok()
            .and_then(|idx| TONICS.get(idx))
            .copied()
            .unwrap_or_default();
        Key::new(name, accidental, Scale::Major)
    }

    fn scale_notes(&self) -> Vec<(NoteName, Accidental)> {
        degree_notes(self.key()).unwrap_or_default()
    }

    /// Accidental, the key signature applies to the letter.
    pub fn default_accidental(&self, name: NoteName) -> Accidental {
        self.scale_notes()
            .into_iter()
            .find(|(letter, _)| *letter == name)
            .map(|(_, accidental)| accidental)
            .unwrap_or_default()
    }

    /// Accidental in effect for a note without written accidental.
    ///
    /// # Example
    /// ```
    /// # use staff_score::primitives::{
    /// #     Accidental, AccidentalMap, KeySignature, NoteName};
    /// let g_major: KeySignature = "G".parse().unwrap();
    /// let mut map = AccidentalMap::new();
    /// assert_eq!(
    ///     g_major.effective_accidental(NoteName::F, 4, &map),
    ///     Accidental::Sharp
    /// );
    /// map.carry(NoteName::F, 4, Accidental::White);
    /// assert_eq!(
    ///     g_major.effective_accidental(NoteName::F, 4, &map),
    ///     Accidental::White
    /// );
    /// // other octave is not affected
    /// assert_eq!(
    ///     g_major.effective_accidental(NoteName::F, 5, &map),
    ///     Accidental::Sharp
    /// );
    /// ```
    pub fn effective_accidental(
        &self,
        name: NoteName,
        octave: i8,
        accidentals: &AccidentalMap,
    ) -> Accidental {
        accidentals
            .get(name, octave)
            .unwrap_or_else(|| self.default_accidental(name))
    }

    /// Accidental, that sounds for the pitch: written one, or effective
    /// in the context.
    pub fn sounding_accidental(
        &self,
        pitch: &Pitch,
        accidentals: &AccidentalMap,
    ) -> Accidental {
        pitch.accidental().unwrap_or_else(|| {
            self.effective_accidental(pitch.name(), pitch.octave(), accidentals)
        })
    }

    /// Midi key of the pitch in the context of the accidental map.
    pub fn resolve(
        &self,
        pitch: &Pitch,
        accidentals: &AccidentalMap,
    ) -> ScoreResult<u8> {
        pitch.midi_with(self.sounding_accidental(pitch, accidentals))
    }

    /// Spell midi key as letter, octave and accidental.
    ///
    /// Prefers spelling of the key signature, then natural, then
    /// sharp for sharp keys (and C major) and flat for flat keys.
    pub fn spell(&self, midi: u8) -> (NoteName, i8, Accidental) {
        let pc = midi % 12;
        let notes_map = NotesMap::get();
        let in_key = self
            .scale_notes()
            .into_iter()
            .find(|(name, acc)| notes_map.get_by_note(*name, *acc) == pc)
            .map(|(_, acc)| acc);
        let natural = || {
            notes_map
                .get_by_midi(&pc)
                .contains_key(&Accidental::White)
                .then_some(Accidental::White)
        };
        let altered = match self.fifths < 0 {
            true => Accidental::Flat,
            false => Accidental::Sharp,
        };
        let preferred = in_key.or_else(natural).unwrap_or(altered);
        let note = midi_to_note(midi, self.key(), Some(preferred));
        let natural_key = midi as i32 - alteration(note.note, note.accidental);
        let octave = (natural_key
            - notes_map.get_by_note(note.note, Accidental::White) as i32)
            .div_euclid(12)
            - 1;
        (note.note, octave as i8, note.accidental)
    }
}
impl TryFrom<Key> for KeySignature {
    type Error = ScoreError;

    /// Count of sharps and flats on the degrees of the key.
    fn try_from(key: Key) -> Result<Self, Self::Error> {
        let notes = degree_notes(key).ok_or_else(|| {
            ScoreError::InvalidKeySignature(format!("{:?}", key.tonic))
        })?;
        let fifths: i32 = notes
            .iter()
            .map(|(name, acc)| alteration(*name, *acc))
            .sum();
        let fifths = i8::try_from(fifths).map_err(|_| {
            ScoreError::InvalidKeySignature(format!("{:?}", key.tonic))
        })?;
        Self::new(fifths)
    }
}
impl FromStr for KeySignature {
    type Err = ScoreError;

    /// Parses tonic names like `C`, `Bb`, `F#` or dutch `fis`, `es`,
    /// with optional minor suffix: `Am`, `ebm`, `C# minor`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScoreError::InvalidKeySignature(s.to_string());
        let lower = s.trim().to_ascii_lowercase();
        let (tonic, scale) = [
            (" minor", Scale::Minor),
            (" major", Scale::Major),
            ("min", Scale::Minor),
            ("maj", Scale::Major),
            ("m", Scale::Minor),
        ]
        .into_iter()
        .find_map(|(suffix, scale)| {
            lower.strip_suffix(suffix).map(|tonic| (tonic.trim(), scale))
        })
        .unwrap_or((lower.as_str(), Scale::Major));
        let mut chars = tonic.chars();
        let letter = chars
            .next()
            .filter(|c| c.is_ascii_alphabetic())
            .ok_or_else(invalid)?;
        let accidental = match chars.as_str() {
            "#" => "is",
            "##" => "isis",
            "b" => "es",
            "bb" => "eses",
            dutch => dutch,
        };
        let key = Key::from_str(&format!("{letter}{accidental}"), scale)
            .ok_or_else(invalid)?;
        Self::try_from(key).map_err(|_| invalid())
    }
}

/// Accidentals, written in the current measure.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AccidentalMap {
    accidentals: HashMap<(NoteName, i8), Accidental>,
}
impl AccidentalMap {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn get(&self, name: NoteName, octave: i8) -> Option<Accidental> {
        self.accidentals.get(&(name, octave)).copied()
    }
    /// Make accidental active till the end of measure.
    pub fn carry(&mut self, name: NoteName, octave: i8, accidental: Accidental) {
        self.accidentals.insert((name, octave), accidental);
    }
    /// Should be called at the barline.
    pub fn reset(&mut self) {
        self.accidentals.clear();
    }
    pub fn is_empty(&self) -> bool {
        self.accidentals.is_empty()
    }
}
