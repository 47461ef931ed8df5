//! Serialization of the staff into timed note-on / note-off events.
//!
//! Tie chain sounds as one note: the head emits note-on and note-off
//! for the whole chain, continuations emit nothing. Rests only advance
//! the position.
//!
//! Accidentals are resolved as a player reads the measure: written
//! accidental, else accidental carried from previous notes of the
//! measure, else the key signature. Map of carried accidentals is reset
//! at every barline.

use std::{
    cmp::Ordering,
    collections::{HashMap, VecDeque},
    ops::Range,
};

use fraction::Fraction;
use itertools::Itertools;

use crate::{
    dom::{NoteId, Staff},
    error::{ScoreError, ScoreResult},
    primitives::{AbsolutePosition, Accidental, AccidentalMap, KeySignature},
    settings::ExportSettings,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEventKind {
    NoteOn {
        key: u8,
        velocity: u8,
        /// Accidental, that should be printed before the note.
        accidental: Option<Accidental>,
    },
    NoteOff {
        key: u8,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiEvent {
    position: AbsolutePosition,
    channel: u8,
    kind: MidiEventKind,
}
impl MidiEvent {
    pub fn position(&self) -> AbsolutePosition {
        self.position
    }
    pub fn channel(&self) -> u8 {
        self.channel
    }
    pub fn kind(&self) -> MidiEventKind {
        self.kind
    }
    pub fn key(&self) -> u8 {
        match self.kind {
            MidiEventKind::NoteOn { key, .. } => key,
            MidiEventKind::NoteOff { key } => key,
        }
    }
    pub fn is_note_on(&self) -> bool {
        matches!(self.kind, MidiEventKind::NoteOn { .. })
    }
    /// Position in integer ticks.
    pub fn tick(&self, ticks_per_quarter: u32) -> Option<u64> {
        self.position.ticks(ticks_per_quarter)
    }
}

/// Note as a whole: the caller-facing view of a note-on / note-off pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteSpan {
    pub onset: AbsolutePosition,
    pub key: u8,
    pub duration: Fraction,
    pub channel: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MidiTrack {
    events: Vec<MidiEvent>,
    velocity: u8,
}
impl Default for MidiTrack {
    fn default() -> Self {
        Self::new(&ExportSettings::default())
    }
}
impl MidiTrack {
    pub fn new(settings: &ExportSettings) -> Self {
        Self {
            events: Vec::new(),
            velocity: settings.velocity,
        }
    }
    pub fn velocity(&self) -> u8 {
        self.velocity
    }
    /// Events in the order they were emitted.
    pub fn events(&self) -> &[MidiEvent] {
        &self.events
    }
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn push(
        &mut self,
        position: AbsolutePosition,
        channel: u8,
        kind: MidiEventKind,
    ) {
        log::trace!("{:?} at {:?}, channel {}", kind, position.get(), channel);
        self.events.push(MidiEvent {
            position,
            channel,
            kind,
        });
    }

    /// Events by time. At the same position note-offs go first, so a
    /// note, repeated right after itself, is not cut.
    pub fn sorted_events(&self) -> Vec<MidiEvent> {
        self.events
            .iter()
            .copied()
            .sorted_by(|a, b| {
                a.position
                    .partial_cmp(&b.position)
                    .unwrap_or(Ordering::Equal)
                    .then(a.is_note_on().cmp(&b.is_note_on()))
            })
            .collect()
    }

    /// Pairs of note-on and note-off as (onset, key, duration, channel).
    pub fn note_spans(&self) -> Vec<NoteSpan> {
        let mut sounding: HashMap<(u8, u8), VecDeque<AbsolutePosition>> =
            HashMap::new();
        let mut spans = Vec::new();
        for event in self.sorted_events() {
            let slot = (event.channel, event.key());
            match event.kind {
                MidiEventKind::NoteOn { .. } => {
                    sounding.entry(slot).or_default().push_back(event.position)
                }
                MidiEventKind::NoteOff { .. } => {
                    if let Some(onset) =
                        sounding.get_mut(&slot).and_then(|q| q.pop_front())
                    {
                        spans.push(NoteSpan {
                            onset,
                            key: event.key(),
                            duration: event.position - onset,
                            channel: event.channel,
                        });
                    }
                }
            }
        }
        spans.sort_by(|a, b| {
            a.onset
                .partial_cmp(&b.onset)
                .unwrap_or(Ordering::Equal)
                .then(a.key.cmp(&b.key))
        });
        spans
    }
}

/// Write note to the track at the position.
///
/// Note, that starts a tie chain, sounds for the whole chain. Tie
/// continuations and rests emit nothing. Displayed accidental of the note
/// is carried in `accidentals` till the caller resets the map.
///
/// # Returns
///
/// Position right after the note.
pub fn add_to_track(
    staff: &Staff,
    id: NoteId,
    track: &mut MidiTrack,
    position: AbsolutePosition,
    key: KeySignature,
    accidentals: &mut AccidentalMap,
    channel: u8,
) -> ScoreResult<AbsolutePosition> {
    let head = staff.tie_source(id)?.is_none();
    emit(staff, id, track, position, key, accidentals, channel, head)
}

#[allow(clippy::too_many_arguments)]
fn emit(
    staff: &Staff,
    id: NoteId,
    track: &mut MidiTrack,
    position: AbsolutePosition,
    key: KeySignature,
    accidentals: &mut AccidentalMap,
    channel: u8,
    head: bool,
) -> ScoreResult<AbsolutePosition> {
    if channel > 15 {
        return Err(ScoreError::InvalidChannel(channel));
    }
    let note = staff.note(id)?;
    let end = position + note.effective_duration();
    let pitch = match note.pitch() {
        Some(pitch) => pitch,
        None => return Ok(end),
    };
    if !head {
        log::trace!("{:?} continues a tie", id);
        return Ok(end);
    }
    let effective =
        key.effective_accidental(pitch.name(), pitch.octave(), accidentals);
    let displayed = pitch.accidental().filter(|acc| *acc != effective);
    let midi_key = pitch.midi_with(pitch.accidental().unwrap_or(effective))?;
    let length = staff.tied_duration(id)?;
    if let Some(accidental) = displayed {
        accidentals.carry(pitch.name(), pitch.octave(), accidental);
    }
    let velocity = track.velocity;
    track.push(
        position,
        channel,
        MidiEventKind::NoteOn {
            key: midi_key,
            velocity,
            accidental: displayed,
        },
    );
    track.push(
        position + length,
        channel,
        MidiEventKind::NoteOff { key: midi_key },
    );
    Ok(end)
}

/// Write all measures of the staff to the track, starting at `start`.
///
/// # Example
/// ```
/// use staff_score::dom::Staff;
/// use staff_score::midi::{export_staff, MidiTrack};
/// use staff_score::primitives::{AbsolutePosition, Duration, NoteName, Pitch};
/// use staff_score::settings::ExportSettings;
///
/// let mut staff = Staff::default();
/// let m = staff.push_measure();
/// let c4 = Some(Pitch::new(NoteName::C, 4, None));
/// let a = staff.push_note(m, Duration::half(), c4).unwrap();
/// let b = staff.push_note(m, Duration::half(), c4).unwrap();
/// staff.tie_to(a, b).unwrap();
///
/// let settings = ExportSettings::default();
/// let mut track = MidiTrack::new(&settings);
/// let start = AbsolutePosition::start();
/// let end = export_staff(&staff, &mut track, start, &settings).unwrap();
/// assert_eq!(end.ticks(960), Some(3840));
/// assert_eq!(track.note_spans().len(), 1);
/// ```
pub fn export_staff(
    staff: &Staff,
    track: &mut MidiTrack,
    start: AbsolutePosition,
    settings: &ExportSettings,
) -> ScoreResult<AbsolutePosition> {
    export_measures(staff, track, start, 0..staff.measures().len(), settings)
}

/// Write measures of the given range (by order in the staff).
///
/// Note, tied from a measure before the range, is played as a chain
/// head, so the exported fragment does not start with silence.
pub fn export_measures(
    staff: &Staff,
    track: &mut MidiTrack,
    start: AbsolutePosition,
    measures: Range<usize>,
    settings: &ExportSettings,
) -> ScoreResult<AbsolutePosition> {
    settings.validate()?;
    track.velocity = settings.velocity;
    let first_measure = measures.start;
    let measures = staff.measures().get(measures.clone()).ok_or(
        ScoreError::MeasureRange {
            start: measures.start,
            end: measures.end,
            count: staff.measures().len(),
        },
    )?;
    let mut accidentals = AccidentalMap::new();
    let mut position = start;
    for measure in measures {
        accidentals.reset();
        for id in measure.notes() {
            let head = match staff.tie_source(*id)? {
                None => true,
                Some(source) => staff.location(source)?.0 < first_measure,
            };
            position = emit(
                staff,
                *id,
                track,
                position,
                measure.key_signature(),
                &mut accidentals,
                settings.channel,
                head,
            )?;
        }
    }
    log::debug!(
        "exported {} measures up to {:?}",
        measures.len(),
        position.get()
    );
    Ok(position)
}
