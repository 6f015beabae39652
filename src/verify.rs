//! Independent check of a finished schedule against the hard constraints.
//!
//! Works from the raw input and a list of assignments only, so it can audit
//! schedules that came from anywhere, not just from this engine.

use std::collections::HashMap;

use itertools::Itertools;

use crate::data::{
    Assignment, ClassId, ClassRequest, RoomId, SchedulingInput, Teacher, TeacherId, Violation,
    ViolationKind,
};
use crate::studio::{RoomGroups, coalesce, effective_room_availability};
use crate::teacher_placer::is_qualified;
use crate::timegrid::{Day, duration_to_slots};

/// Lists every hard-constraint violation in `assignments`. Empty means the
/// schedule is sound.
pub fn check(input: &SchedulingInput, assignments: &[Assignment]) -> Vec<Violation> {
    let classes: HashMap<ClassId, &ClassRequest> =
        input.classes.iter().map(|c| (c.class_id, c)).collect();
    let teachers: HashMap<TeacherId, &Teacher> =
        input.teachers.iter().map(|t| (t.teacher_id, t)).collect();
    let rooms = effective_room_availability(&input.rooms);
    let groups = RoomGroups::build(&input.rooms);

    let mut violations = Vec::new();

    for a in assignments {
        let (Some(class), Some(teacher), Some(room_availability)) = (
            classes.get(&a.class_id),
            teachers.get(&a.teacher_id),
            rooms.get(&a.room_id),
        ) else {
            violations.push(Violation {
                kind: ViolationKind::UnknownReference,
                description: format!(
                    "Class {} refers to an unknown class, room {} or teacher {}",
                    a.class_id, a.room_id, a.teacher_id
                ),
            });
            continue;
        };

        let range = a.range();
        if let Ok(duration) = duration_to_slots(class.duration_hours) {
            if range.len() != duration || range.is_empty() {
                violations.push(Violation {
                    kind: ViolationKind::DurationMismatch,
                    description: format!(
                        "Class {} runs {} but needs {} slots",
                        a.class_id, range, duration
                    ),
                });
            }
        }

        let room_ok = room_availability
            .get(&a.day)
            .is_some_and(|set| set.covers(&range));
        if !room_ok {
            violations.push(Violation {
                kind: ViolationKind::RoomUnavailable,
                description: format!(
                    "Class {} uses room {} on {} {} outside its availability",
                    a.class_id, a.room_id, a.day, range
                ),
            });
        }

        let teacher_ok = coalesce(&teacher.availability)
            .get(&a.day)
            .is_some_and(|set| set.covers(&range));
        if !teacher_ok {
            violations.push(Violation {
                kind: ViolationKind::TeacherUnavailable,
                description: format!(
                    "Class {} needs teacher {} on {} {} outside their availability",
                    a.class_id, a.teacher_id, a.day, range
                ),
            });
        }

        if !is_qualified(teacher, class) {
            violations.push(Violation {
                kind: ViolationKind::Unqualified,
                description: format!(
                    "Teacher {} is not qualified for class {} ({} level {})",
                    a.teacher_id, a.class_id, class.style, class.level
                ),
            });
        }
    }

    let by_group = assignments
        .iter()
        .filter_map(|a| groups.group_of(a.room_id).map(|g| ((g, a.day), a)))
        .into_group_map();
    for ((group, day), members) in by_group.into_iter().sorted_by_key(|(key, _)| *key) {
        for (x, y) in members.iter().tuple_combinations() {
            if x.range().overlaps(&y.range()) {
                violations.push(Violation {
                    kind: ViolationKind::RoomOverlap,
                    description: overlap_description("room group", group, day, x, y),
                });
            }
        }
    }

    let by_teacher = assignments
        .iter()
        .map(|a| ((a.teacher_id, a.day), a))
        .into_group_map();
    for ((teacher_id, day), members) in by_teacher.into_iter().sorted_by_key(|(key, _)| *key) {
        for (x, y) in members.iter().tuple_combinations() {
            if x.range().overlaps(&y.range()) {
                violations.push(Violation {
                    kind: ViolationKind::TeacherOverlap,
                    description: overlap_description("teacher", teacher_id, day, x, y),
                });
            }
        }
    }

    violations
}

fn overlap_description(
    what: &str,
    id: RoomId,
    day: Day,
    x: &Assignment,
    y: &Assignment,
) -> String {
    format!(
        "Classes {} ({}) and {} ({}) overlap on {} for {} {}",
        x.class_id,
        x.range(),
        y.class_id,
        y.range(),
        day,
        what,
        id
    )
}
