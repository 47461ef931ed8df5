use fraction::Fraction;
use itertools::Itertools;
use staff_score::{
    primitives::fraction_tools::sum_lengths, Duration, KeySignature, NoteName,
    Pitch, Staff, TimeSignature,
};

fn e5() -> Option<Pitch> {
    Some(Pitch::new(NoteName::E, 5, None))
}

#[test]
fn split_at_remaining_space() {
    let mut staff = Staff::default();
    let m = staff.push_measure();
    staff
        .push_note(m, Duration::new(2, true).expect("dotted half"), e5())
        .expect("push");
    let half = staff.push_note(m, Duration::half(), e5()).expect("push");
    let remaining = staff.measure_remaining(m).expect("remaining");
    assert_eq!(remaining, -Fraction::new(1u64, 4u64));

    let space = Fraction::new(1u64, 4u64);
    let parts = staff.subtract_duration(half, space).expect("Can not split");
    assert_eq!(staff.tie_target(parts[0]).expect("target"), Some(parts[1]));
    assert_eq!(
        sum_lengths(
            parts
                .iter()
                .map(|id| staff.effective_duration(*id).expect("duration"))
        ),
        Fraction::new(1u64, 2u64)
    );
}

#[test]
fn flowing_note_across_measures() {
    let mut staff = Staff::new(
        TimeSignature::new(2, 4).expect("time signature"),
        KeySignature::new(-2).expect("key"),
    );
    staff
        .append_flowing(Duration::new(4, true).expect("dotted"), e5())
        .expect("append");
    let placed = staff
        .append_flowing(Duration::whole(), e5())
        .expect("append");
    assert_eq!(staff.measures().len(), 3);
    // 1/8 closes the first measure, 2/4 fills the second
    placed
        .iter()
        .map(|id| staff.effective_duration(*id).expect("duration"))
        .zip_eq(vec![
            Fraction::new(1u64, 8u64),
            Fraction::new(1u64, 2u64),
            Fraction::new(1u64, 4u64),
            Fraction::new(1u64, 8u64),
        ])
        .map(|(a, b)| assert_eq!(a, b))
        .count();
    assert_eq!(staff.tie_chain(placed[2]).expect("chain"), placed);
    for measure in staff.measures() {
        assert_eq!(
            measure.key_signature(),
            KeySignature::new(-2).expect("key")
        );
    }
    assert_eq!(
        staff
            .measure_remaining(staff.measures()[2].id())
            .expect("remaining"),
        Fraction::new(1u64, 8u64)
    );
}

#[test]
fn fill_up_to_barline() {
    let mut staff = Staff::default();
    let m = staff.push_measure();
    staff.push_note(m, Duration::quarter(), e5()).expect("push");
    let last = staff
        .push_note(m, Duration::sixteenth(), e5())
        .expect("push");
    let remaining = staff.measure_remaining(m).expect("remaining")
        + staff.effective_duration(last).expect("duration");
    assert!(staff.try_to_fill(last, remaining).expect("Can not fill"));
    assert_eq!(
        staff.note(last).expect("note").duration(),
        Duration::new(2, true).expect("dotted half")
    );
    assert_eq!(
        staff.measure_remaining(m).expect("remaining"),
        Fraction::new(0u64, 1u64)
    );
}

#[test]
fn transpose_tied_notes_over_barline() {
    let mut staff = Staff::new(
        TimeSignature::default(),
        KeySignature::new(-1).expect("F major"),
    );
    let m1 = staff.push_measure();
    let m2 = staff.push_measure();
    let a4 = Some(Pitch::new(NoteName::A, 4, None));
    let a = staff.push_note(m1, Duration::whole(), a4).expect("push");
    let b = staff.push_note(m2, Duration::whole(), a4).expect("push");
    staff.tie_to(a, b).expect("Can not tie");
    staff.transpose_by(a, 1).expect("Can not transpose");
    // Bb is in F major
    let b_flat = Pitch::new(NoteName::B, 4, None);
    assert_eq!(staff.note(a).expect("note").pitch(), Some(&b_flat));
    assert_eq!(staff.note(b).expect("note").pitch(), Some(&b_flat));
}
