use fraction::Fraction;
use itertools::Itertools;
use staff_score::{
    add_to_track, export_measures, export_staff, AbsolutePosition,
    Accidental, AccidentalMap, Duration, ExportSettings, KeySignature,
    MidiEventKind, MidiTrack, NoteName, NoteSpan, Pitch, Staff,
    TimeSignature, TupletRatio,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn pitch(name: NoteName, accidental: Option<Accidental>) -> Option<Pitch> {
    Some(Pitch::new(name, 4, accidental))
}

fn span(onset: Fraction, key: u8, duration: Fraction) -> NoteSpan {
    NoteSpan {
        onset: AbsolutePosition::new(onset),
        key,
        duration,
        channel: 0,
    }
}

#[test]
fn tied_quarters_make_one_note() {
    init();
    let mut staff = Staff::default();
    let m = staff.push_measure();
    let e = pitch(NoteName::E, None);
    let a = staff.push_note(m, Duration::quarter(), e).expect("push");
    let b = staff.push_note(m, Duration::quarter(), e).expect("push");
    staff.push_note(m, Duration::half(), e).expect("push");
    staff.tie_to(a, b).expect("Can not tie quarters");

    let mut track = MidiTrack::default();
    let end = export_staff(
        &staff,
        &mut track,
        AbsolutePosition::start(),
        &ExportSettings::default(),
    )
    .expect("Can not export");
    assert_eq!(end.get(), Fraction::new(1u64, 1u64));
    assert_eq!(track.events().iter().filter(|ev| ev.is_note_on()).count(), 2);
    track
        .note_spans()
        .into_iter()
        .zip_eq(vec![
            span(Fraction::new(0u64, 1u64), 64, Fraction::new(1u64, 2u64)),
            span(Fraction::new(1u64, 2u64), 64, Fraction::new(1u64, 2u64)),
        ])
        .map(|(a, b)| assert_eq!(a, b))
        .count();
}

#[test]
fn position_advances_by_durations() {
    let mut staff = Staff::default();
    let m1 = staff.push_measure();
    let m2 = staff.push_measure();
    let g = pitch(NoteName::G, None);
    let durations = vec![
        Duration::new(4, true).expect("dotted quarter"),
        Duration::eighth(),
        Duration::half(),
    ];
    for dur in durations.iter() {
        staff.push_note(m1, *dur, g).expect("push");
    }
    staff
        .push_tuplet(
            m2,
            TupletRatio::triplet(),
            Fraction::new(1u64, 4u64),
            vec![(Duration::eighth(), g); 3],
        )
        .expect("Can not push triplet");
    staff
        .push_note(m2, Duration::new(2, true).expect("dotted half"), g)
        .expect("push");

    let start = AbsolutePosition::new(Fraction::new(3u64, 1u64));
    let mut track = MidiTrack::default();
    let end =
        export_staff(&staff, &mut track, start, &ExportSettings::default())
            .expect("Can not export");
    assert_eq!(end - start, Fraction::new(2u64, 1u64));

    let spans = track.note_spans();
    assert_eq!(spans.len(), 7);
    let onsets: Vec<Fraction> =
        spans.iter().map(|s| s.onset - start).collect();
    assert_eq!(
        onsets,
        vec![
            Fraction::new(0u64, 1u64),
            Fraction::new(3u64, 8u64),
            Fraction::new(1u64, 2u64),
            Fraction::new(1u64, 1u64),
            Fraction::new(13u64, 12u64),
            Fraction::new(7u64, 6u64),
            Fraction::new(5u64, 4u64),
        ]
    );
    // positions never go back
    for pair in track.sorted_events().windows(2) {
        assert!(pair[0].position() <= pair[1].position());
    }
    // first triplet eighth ends 1/12 after the barline
    assert_eq!(
        track.sorted_events()[8].tick(960),
        Some(960 * 4 * 3 + 960 * 4 + 320)
    );
}

#[test]
fn accidental_carry_in_c_major() {
    let mut staff = Staff::default();
    let m1 = staff.push_measure();
    let m2 = staff.push_measure();
    let c_sharp = pitch(NoteName::C, Some(Accidental::Sharp));
    staff
        .push_note(m1, Duration::quarter(), c_sharp)
        .expect("push");
    staff
        .push_note(m1, Duration::quarter(), pitch(NoteName::C, None))
        .expect("push");
    staff
        .push_note(m1, Duration::quarter(), pitch(NoteName::C, None))
        .expect("push");
    staff
        .push_note(m1, Duration::quarter(), pitch(NoteName::D, None))
        .expect("push");
    // barline resets the carry
    staff
        .push_note(m2, Duration::whole(), pitch(NoteName::C, None))
        .expect("push");

    let mut track = MidiTrack::default();
    export_staff(
        &staff,
        &mut track,
        AbsolutePosition::start(),
        &ExportSettings::default(),
    )
    .expect("Can not export");
    let ons: Vec<(u8, Option<Accidental>)> = track
        .events()
        .iter()
        .filter_map(|ev| match ev.kind() {
            MidiEventKind::NoteOn {
                key, accidental, ..
            } => Some((key, accidental)),
            MidiEventKind::NoteOff { .. } => None,
        })
        .collect();
    assert_eq!(
        ons,
        vec![
            (61, Some(Accidental::Sharp)),
            (61, None),
            (61, None),
            (62, None),
            (60, None),
        ]
    );
}

#[test]
fn explicit_natural_cancels_carry() {
    let mut staff = Staff::default();
    let m = staff.push_measure();
    for acc in [Some(Accidental::Sharp), Some(Accidental::White), None] {
        staff
            .push_note(m, Duration::quarter(), pitch(NoteName::C, acc))
            .expect("push");
    }
    let mut track = MidiTrack::default();
    export_staff(
        &staff,
        &mut track,
        AbsolutePosition::start(),
        &ExportSettings::default(),
    )
    .expect("Can not export");
    let keys: Vec<u8> = track.note_spans().iter().map(|s| s.key).collect();
    assert_eq!(keys, vec![61, 60, 60]);
}

#[test]
fn tie_over_barline_keeps_carry_out() {
    let mut staff =
        Staff::new(TimeSignature::default(), KeySignature::c_major());
    let m1 = staff.push_measure();
    let m2 = staff.push_measure();
    let f_sharp = pitch(NoteName::F, Some(Accidental::Sharp));
    let a = staff
        .push_note(m1, Duration::half(), pitch(NoteName::G, None))
        .expect("push");
    let b = staff.push_note(m1, Duration::half(), f_sharp).expect("push");
    let c = staff.push_note(m2, Duration::quarter(), f_sharp).expect("push");
    staff.tie_to(b, c).expect("Can not tie over barline");
    let dotted_half = Duration::new(2, true).expect("dotted");
    let d = staff
        .push_note(m2, dotted_half, pitch(NoteName::F, None))
        .expect("push");

    let mut track = MidiTrack::default();
    let mut map = AccidentalMap::new();
    let key = KeySignature::c_major();
    let mut pos = AbsolutePosition::start();
    for id in [a, b] {
        pos = add_to_track(&staff, id, &mut track, pos, key, &mut map, 0)
            .expect("add");
    }
    map.reset();
    for id in [c, d] {
        pos = add_to_track(&staff, id, &mut track, pos, key, &mut map, 0)
            .expect("add");
    }
    assert_eq!(pos.get(), Fraction::new(2u64, 1u64));
    track
        .note_spans()
        .into_iter()
        .zip_eq(vec![
            span(Fraction::new(0u64, 1u64), 67, Fraction::new(1u64, 2u64)),
            span(Fraction::new(1u64, 2u64), 66, Fraction::new(3u64, 4u64)),
            // continuation does not carry the sharp
            span(Fraction::new(5u64, 4u64), 65, Fraction::new(3u64, 4u64)),
        ])
        .map(|(a, b)| assert_eq!(a, b))
        .count();
}

#[test]
fn fragment_starting_with_continuation() {
    let mut staff = Staff::default();
    let m1 = staff.push_measure();
    let m2 = staff.push_measure();
    let b = pitch(NoteName::B, None);
    let first = staff.push_note(m1, Duration::whole(), b).expect("push");
    let second = staff.push_note(m2, Duration::half(), b).expect("push");
    staff.push_note(m2, Duration::half(), None).expect("push");
    staff.tie_to(first, second).expect("Can not tie");

    let settings = ExportSettings {
        channel: 5,
        velocity: 80,
        ..Default::default()
    };
    let mut track = MidiTrack::new(&settings);
    let end = export_measures(
        &staff,
        &mut track,
        AbsolutePosition::start(),
        1..2,
        &settings,
    )
    .expect("Can not export");
    assert_eq!(end.get(), Fraction::new(1u64, 1u64));
    assert_eq!(
        track.note_spans(),
        vec![NoteSpan {
            onset: AbsolutePosition::start(),
            key: 71,
            duration: Fraction::new(1u64, 2u64),
            channel: 5,
        }]
    );
    assert!(track.events().iter().all(|ev| match ev.kind() {
        MidiEventKind::NoteOn { velocity, .. } => velocity == 80,
        MidiEventKind::NoteOff { .. } => true,
    }));
    assert!(export_measures(
        &staff,
        &mut track,
        AbsolutePosition::start(),
        1..3,
        &settings,
    )
    .is_err());
}

fn keys(staff: &Staff) -> Vec<(u8, Fraction)> {
    let mut track = MidiTrack::default();
    export_staff(
        staff,
        &mut track,
        AbsolutePosition::start(),
        &ExportSettings::default(),
    )
    .expect("Can not export");
    track
        .note_spans()
        .into_iter()
        .map(|s| (s.key, s.onset.get()))
        .collect()
}

#[test]
fn rejected_tie_keeps_every_note_audible() {
    let mut staff = Staff::default();
    let m = staff.push_measure();
    let c = pitch(NoteName::C, None);
    let a = staff.push_note(m, Duration::quarter(), c).expect("push");
    staff
        .push_note(m, Duration::quarter(), pitch(NoteName::D, None))
        .expect("push");
    let b = staff.push_note(m, Duration::half(), c).expect("push");
    assert!(staff.tie_to(a, b).is_err());
    keys(&staff)
        .into_iter()
        .zip_eq(vec![
            (60, Fraction::new(0u64, 1u64)),
            (62, Fraction::new(1u64, 4u64)),
            (60, Fraction::new(1u64, 2u64)),
        ])
        .map(|(a, b)| assert_eq!(a, b))
        .count();
}

#[test]
fn tie_by_carried_sharp_sounds_once() {
    let mut staff = Staff::default();
    let m = staff.push_measure();
    let a = staff
        .push_note(m, Duration::half(), pitch(NoteName::C, Some(Accidental::Sharp)))
        .expect("push");
    let b = staff
        .push_note(m, Duration::half(), pitch(NoteName::C, None))
        .expect("push");
    staff.tie_to(a, b).expect("Can not tie");
    let mut track = MidiTrack::default();
    export_staff(
        &staff,
        &mut track,
        AbsolutePosition::start(),
        &ExportSettings::default(),
    )
    .expect("Can not export");
    assert_eq!(
        track.note_spans(),
        vec![span(Fraction::new(0u64, 1u64), 61, Fraction::new(1u64, 1u64))]
    );
}

#[test]
fn transposing_leaves_neighbours_alone() {
    let mut staff = Staff::default();
    let m = staff.push_measure();
    let first = staff
        .push_note(m, Duration::half(), pitch(NoteName::C, Some(Accidental::Sharp)))
        .expect("push");
    staff
        .push_note(m, Duration::half(), pitch(NoteName::C, None))
        .expect("push");
    let before: Vec<u8> = keys(&staff).into_iter().map(|(k, _)| k).collect();
    assert_eq!(before, vec![61, 61]);
    staff.transpose_by(first, 1).expect("Can not transpose");
    let after: Vec<u8> = keys(&staff).into_iter().map(|(k, _)| k).collect();
    assert_eq!(after, vec![62, 61]);
}
