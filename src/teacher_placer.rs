//! Phase 2: pick a teacher for a class whose room and time are held.

use std::cmp::Reverse;

use log::trace;

use crate::data::{ClassRequest, PreferenceTarget, SpecializationKind, Teacher, TeacherId};
use crate::ledger::OccupancyLedger;
use crate::studio::Studio;
use crate::timegrid::{Day, SlotRange};

/// Whether a teacher's recorded specializations allow them to teach `class`.
///
/// A kind with nothing recorded does not restrict anyone. A recorded kind
/// must match: the style or level by value, the age group by an `a-b` range
/// spanning the class's whole age range.
pub fn is_qualified(teacher: &Teacher, class: &ClassRequest) -> bool {
    teacher.specializations.iter().all(|(kind, values)| match kind {
        SpecializationKind::Style => values.contains(&class.style),
        SpecializationKind::Level => values.contains(&class.level),
        SpecializationKind::AgeGroup => values
            .iter()
            .any(|group| age_group_covers(group, class.age_start, class.age_end)),
    })
}

fn age_group_covers(group: &str, age_start: u32, age_end: u32) -> bool {
    let parsed = group.split_once('-').and_then(|(lo, hi)| {
        Some((lo.trim().parse::<u32>().ok()?, hi.trim().parse::<u32>().ok()?))
    });
    match parsed {
        Some((lo, hi)) => lo <= age_start && age_end <= hi,
        None => group.trim() == format!("{age_start}-{age_end}"),
    }
}

/// Sum of the class's `teacher` preferences naming this teacher.
pub fn teacher_score(teacher_id: TeacherId, class: &ClassRequest) -> u32 {
    class
        .preferences
        .iter()
        .filter(|p| p.target == PreferenceTarget::Teacher(teacher_id))
        .map(|p| p.weight)
        .fold(0, u32::saturating_add)
}

/// The best qualified teacher who is free for `range` on `day`.
///
/// Highest preference score wins; the lower teacher id breaks ties.
pub fn best_teacher(
    class: &ClassRequest,
    day: Day,
    range: &SlotRange,
    studio: &Studio<'_>,
    ledger: &OccupancyLedger,
) -> Option<(TeacherId, u32)> {
    let candidates: Vec<(TeacherId, u32)> = studio
        .teachers()
        .filter(|t| is_qualified(t, class))
        .filter(|t| studio.teacher_covers(t.teacher_id, day, range))
        .filter(|t| ledger.is_teacher_free(t.teacher_id, day, range))
        .map(|t| (t.teacher_id, teacher_score(t.teacher_id, class)))
        .collect();
    trace!(
        "Class {}: {} qualified teachers free on {} {}",
        class.class_id,
        candidates.len(),
        day,
        range
    );
    candidates
        .into_iter()
        .max_by_key(|&(teacher_id, score)| (score, Reverse(teacher_id)))
}
