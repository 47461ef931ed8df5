use fraction::Fraction;
use itertools::Itertools;
use staff_score::{
    primitives::fraction_tools::sum_lengths, Duration, NoteKind, NoteName,
    Pitch, ScoreError, Staff, TupletRatio,
};

fn c5() -> Option<Pitch> {
    Some(Pitch::new(NoteName::C, 5, None))
}

#[test]
fn three_triplet_eighths_are_a_quarter() {
    let mut staff = Staff::default();
    let m = staff.push_measure();
    let (tuplet, notes) = staff
        .push_tuplet(
            m,
            TupletRatio::triplet(),
            Fraction::new(1u64, 4u64),
            vec![(Duration::eighth(), c5()); 3],
        )
        .expect("Can not push triplet");
    let sum = sum_lengths(
        notes
            .iter()
            .map(|id| staff.effective_duration(*id).expect("duration")),
    );
    assert_eq!(sum, Duration::quarter().effective());
    assert_eq!(
        staff.tuplet(tuplet).expect("tuplet").span(),
        Fraction::new(1u64, 4u64)
    );
    for id in notes.iter() {
        assert_eq!(staff.kind(*id).expect("kind"), NoteKind::TupletMember);
        assert!(staff.is_part_of_full_triplet(*id).expect("query"));
        staff
            .containing_tuplet(*id)
            .expect("siblings")
            .into_iter()
            .zip_eq(notes.iter().copied())
            .map(|(a, b)| assert_eq!(a, b))
            .count();
    }
}

#[test]
fn triplet_of_quarter_and_eighth() {
    let mut staff = Staff::default();
    let m = staff.push_measure();
    let (_, notes) = staff
        .push_tuplet(
            m,
            TupletRatio::triplet(),
            Fraction::new(1u64, 4u64),
            vec![(Duration::quarter(), c5()), (Duration::eighth(), None)],
        )
        .expect("Can not push triplet");
    assert_eq!(
        staff.effective_duration(notes[0]).expect("duration"),
        Fraction::new(1u64, 6u64)
    );
    assert!(staff.is_part_of_full_triplet(notes[1]).expect("query"));
}

#[test]
fn split_member_is_not_full_anymore() {
    let mut staff = Staff::default();
    let m = staff.push_measure();
    let (tuplet, notes) = staff
        .push_tuplet(
            m,
            TupletRatio::triplet(),
            Fraction::new(1u64, 2u64),
            vec![(Duration::quarter(), c5()); 3],
        )
        .expect("Can not push triplet");
    let parts = staff
        .subtract_duration(notes[2], Fraction::new(1u64, 12u64))
        .expect("Can not split");
    assert_eq!(parts.len(), 2);
    staff.validate_tuplet(tuplet).expect("group should stay valid");
    assert!(!staff.is_part_of_full_triplet(notes[0]).expect("query"));
    assert_eq!(staff.containing_tuplet(notes[0]).expect("siblings").len(), 4);
}

#[test]
fn integrity_errors_are_reported() {
    let mut staff = Staff::default();
    let m = staff.push_measure();
    let result = staff.push_tuplet(
        m,
        TupletRatio::triplet(),
        Fraction::new(1u64, 4u64),
        vec![(Duration::eighth(), c5()); 4],
    );
    match result {
        Err(ScoreError::TupletIntegrity {
            expected, found, ..
        }) => {
            assert_eq!(expected, Fraction::new(1u64, 4u64));
            assert_eq!(found, Fraction::new(1u64, 3u64));
        }
        x => panic!("expected integrity error, got {:?}", x),
    }
}
