//! Input validation for scheduling runs.
//!
//! Two tiers. Problems with rooms, teachers or the input as a whole stop the
//! run before anything is ranked:
//! - duplicate ids
//! - an empty room set
//! - availability ranges that are empty or overlap each other
//! - combined rooms that list themselves, another combined room, an unknown
//!   room, or nothing at all
//!
//! Problems with a single class only disqualify that class; the coordinator
//! records it as an `InvalidRequest` and carries on.

use std::collections::{BTreeMap, HashSet};

use crate::data::{
    Availability, ClassRequest, PreferenceTarget, Room, RoomId, SchedulingInput, Teacher,
};
use crate::error::{Result, ScheduleError};
use crate::timegrid::{Slot, duration_to_slots};

/// Checks everything that must hold before any class is ranked.
pub fn validate_input(input: &SchedulingInput) -> Result<()> {
    if input.rooms.is_empty() {
        return Err(ScheduleError::NoRooms);
    }
    unique_ids("class", input.classes.iter().map(|c| c.class_id))?;
    unique_ids("room", input.rooms.iter().map(|r| r.room_id))?;
    unique_ids("teacher", input.teachers.iter().map(|t| t.teacher_id))?;
    validate_rooms(&input.rooms)?;
    validate_teachers(&input.teachers)
}

fn unique_ids(kind: &'static str, ids: impl Iterator<Item = u32>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ScheduleError::DuplicateId { kind, id });
        }
    }
    Ok(())
}

pub fn validate_rooms(rooms: &[Room]) -> Result<()> {
    let by_id: BTreeMap<RoomId, &Room> = rooms.iter().map(|r| (r.room_id, r)).collect();
    for room in rooms {
        validate_availability(&format!("room {}", room.room_id), &room.availability)?;

        if !room.is_combined {
            if !room.component_room_ids.is_empty() {
                return Err(ScheduleError::UnexpectedComponents(room.room_id));
            }
            continue;
        }
        if room.component_room_ids.is_empty() {
            return Err(ScheduleError::MissingComponents(room.room_id));
        }
        for &component in &room.component_room_ids {
            if component == room.room_id {
                return Err(ScheduleError::SelfComponent(room.room_id));
            }
            match by_id.get(&component) {
                None => {
                    return Err(ScheduleError::UnknownComponent {
                        room_id: room.room_id,
                        component,
                    });
                }
                Some(other) if other.is_combined => {
                    return Err(ScheduleError::NestedCombined {
                        room_id: room.room_id,
                        component,
                    });
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}

pub fn validate_teachers(teachers: &[Teacher]) -> Result<()> {
    for teacher in teachers {
        validate_availability(
            &format!("teacher {}", teacher.teacher_id),
            &teacher.availability,
        )?;
    }
    Ok(())
}

fn validate_availability(owner: &str, availability: &Availability) -> Result<()> {
    for (day, ranges) in availability {
        if let Some(range) = ranges.iter().find(|r| r.is_empty()) {
            return Err(ScheduleError::EmptyRange {
                owner: owner.to_string(),
                day: *day,
                range: *range,
            });
        }
        let mut sorted = ranges.clone();
        sorted.sort();
        if let Some(pair) = sorted.windows(2).find(|pair| pair[0].overlaps(&pair[1])) {
            return Err(ScheduleError::OverlappingRanges {
                owner: owner.to_string(),
                day: *day,
                first: pair[0],
                second: pair[1],
            });
        }
    }
    Ok(())
}

/// Checks one class and returns its length in slots.
pub fn validate_class(class: &ClassRequest) -> Result<Slot> {
    let duration = duration_to_slots(class.duration_hours)?;
    if class.age_start > class.age_end {
        return Err(ScheduleError::InvertedAgeRange {
            start: class.age_start,
            end: class.age_end,
        });
    }
    for preference in &class.preferences {
        if let PreferenceTarget::Time(range) = preference.target {
            if range.is_empty() {
                return Err(ScheduleError::EmptyTimePreference(range));
            }
        }
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timegrid::{Day, SlotRange};

    fn range(text: &str) -> SlotRange {
        text.parse().unwrap()
    }

    fn sample_input() -> SchedulingInput {
        SchedulingInput {
            classes: vec![ClassRequest::new(1, "Jazz I", "Jazz", "1", 1.0)],
            rooms: vec![
                Room::new(1, "Studio 1").with_availability(Day::Monday, range("16:00-20:00")),
                Room::new(2, "Studio 2").with_availability(Day::Monday, range("16:00-20:00")),
                Room::combined(3, "Studio 1+2", [1, 2]),
            ],
            teachers: vec![
                Teacher::new(1, "Ana").with_availability(Day::Monday, range("16:00-20:00")),
            ],
        }
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_input(&sample_input()).is_ok());
    }

    #[test]
    fn test_no_rooms() {
        let mut input = sample_input();
        input.rooms.clear();
        assert_eq!(validate_input(&input), Err(ScheduleError::NoRooms));
    }

    #[test]
    fn test_duplicate_ids() {
        let mut input = sample_input();
        input.teachers.push(Teacher::new(1, "Ana again"));
        assert_eq!(
            validate_input(&input),
            Err(ScheduleError::DuplicateId { kind: "teacher", id: 1 })
        );

        let mut input = sample_input();
        input.classes.push(ClassRequest::new(1, "Jazz II", "Jazz", "2", 1.0));
        assert!(matches!(
            validate_input(&input),
            Err(ScheduleError::DuplicateId { kind: "class", .. })
        ));
    }

    #[test]
    fn test_combined_room_errors() {
        let mut input = sample_input();
        input.rooms[2] = Room::combined(3, "Loop", [1, 3]);
        assert_eq!(validate_input(&input), Err(ScheduleError::SelfComponent(3)));

        let mut input = sample_input();
        input.rooms.push(Room::combined(4, "Everything", [3, 1]));
        assert_eq!(
            validate_input(&input),
            Err(ScheduleError::NestedCombined { room_id: 4, component: 3 })
        );

        let mut input = sample_input();
        input.rooms[2] = Room::combined(3, "Ghost", [1, 9]);
        assert_eq!(
            validate_input(&input),
            Err(ScheduleError::UnknownComponent { room_id: 3, component: 9 })
        );

        let mut input = sample_input();
        input.rooms[2] = Room::combined(3, "Nothing", []);
        assert_eq!(validate_input(&input), Err(ScheduleError::MissingComponents(3)));

        let mut input = sample_input();
        input.rooms[0].component_room_ids = vec![2];
        assert_eq!(validate_input(&input), Err(ScheduleError::UnexpectedComponents(1)));
    }

    #[test]
    fn test_bad_availability() {
        let mut input = sample_input();
        input.rooms[0] =
            Room::new(1, "Studio 1").with_availability(Day::Monday, range("18:00-17:00"));
        assert!(matches!(
            validate_input(&input),
            Err(ScheduleError::EmptyRange { day: Day::Monday, .. })
        ));

        let mut input = sample_input();
        input.teachers[0] = Teacher::new(1, "Ana")
            .with_availability(Day::Friday, range("17:00-19:00"))
            .with_availability(Day::Friday, range("16:00-17:30"));
        assert_eq!(
            validate_input(&input),
            Err(ScheduleError::OverlappingRanges {
                owner: "teacher 1".into(),
                day: Day::Friday,
                first: range("16:00-17:30"),
                second: range("17:00-19:00"),
            })
        );
    }

    #[test]
    fn test_touching_ranges_are_allowed() {
        let mut input = sample_input();
        input.teachers[0] = Teacher::new(1, "Ana")
            .with_availability(Day::Friday, range("17:00-19:00"))
            .with_availability(Day::Friday, range("16:00-17:00"));
        assert!(validate_input(&input).is_ok());
    }

    #[test]
    fn test_validate_class() {
        let class = ClassRequest::new(1, "Tap", "Tap", "1", 1.25);
        assert_eq!(validate_class(&class), Ok(5));

        let class = ClassRequest::new(2, "Tap", "Tap", "1", 0.0);
        assert!(matches!(
            validate_class(&class),
            Err(ScheduleError::InvalidDuration { .. })
        ));

        let class = ClassRequest::new(3, "Tap", "Tap", "1", 1.0).with_ages(12, 8);
        assert_eq!(
            validate_class(&class),
            Err(ScheduleError::InvertedAgeRange { start: 12, end: 8 })
        );

        let class = ClassRequest::new(4, "Tap", "Tap", "1", 1.0)
            .with_preference(PreferenceTarget::Time(range("19:00-18:00")), 3);
        assert!(matches!(
            validate_class(&class),
            Err(ScheduleError::EmptyTimePreference(_))
        ));
    }
}
