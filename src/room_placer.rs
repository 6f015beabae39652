//! Phase 1: choose a day, start slot and room for a class.
//!
//! A candidate must sit inside one effective availability range of the room,
//! inside the day's window, and clear of every reservation held by the
//! room's group. Candidates are scored by the class's `day`, `time` and
//! `room` preferences; ties go to the earlier day, then the earlier start,
//! then the lower room id.

use std::cmp::Reverse;

use log::trace;

use crate::data::{ClassRequest, Preference, PreferenceTarget, RoomId};
use crate::ledger::OccupancyLedger;
use crate::studio::Studio;
use crate::timegrid::{Day, Slot, SlotRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoomTimeCandidate {
    pub day: Day,
    pub room_id: RoomId,
    pub range: SlotRange,
}

/// Ordering key for candidates: larger is better.
pub type CandidateRank = (u32, Reverse<Day>, Reverse<Slot>, Reverse<RoomId>);

/// Sum of the weights of every `day`, `time` or `room` preference the
/// candidate satisfies. `teacher` preferences are scored in phase 2.
pub fn preference_score(candidate: &RoomTimeCandidate, preferences: &[Preference]) -> u32 {
    preferences
        .iter()
        .filter(|p| match p.target {
            PreferenceTarget::Day(day) => day == candidate.day,
            PreferenceTarget::Time(window) => window.contains(&candidate.range),
            PreferenceTarget::Room(room_id) => room_id == candidate.room_id,
            PreferenceTarget::Teacher(_) => false,
        })
        .map(|p| p.weight)
        .fold(0, u32::saturating_add)
}

pub fn rank(candidate: &RoomTimeCandidate, score: u32) -> CandidateRank {
    (
        score,
        Reverse(candidate.day),
        Reverse(candidate.range.start),
        Reverse(candidate.room_id),
    )
}

/// Every feasible placement for a class of `duration` slots right now.
pub fn candidates(
    duration: Slot,
    studio: &Studio<'_>,
    ledger: &OccupancyLedger,
) -> Vec<RoomTimeCandidate> {
    let mut found = Vec::new();
    for day in studio.grid().days() {
        let Some(window) = studio.grid().window(day) else {
            continue;
        };
        for room_id in studio.room_ids() {
            let Some(group) = studio.groups().group_of(room_id) else {
                continue;
            };
            for declared in studio.room_ranges(room_id, day) {
                let Some(usable) = declared.intersection(&window) else {
                    continue;
                };
                for free in ledger.group_gaps(group, day, usable) {
                    if free.len() < duration {
                        continue;
                    }
                    found.extend((free.start..=free.end - duration).map(|start| {
                        RoomTimeCandidate {
                            day,
                            room_id,
                            range: SlotRange::starting_at(start, duration),
                        }
                    }));
                }
            }
        }
    }
    found
}

/// The highest ranked feasible placement and its preference score.
pub fn best_placement(
    class: &ClassRequest,
    duration: Slot,
    studio: &Studio<'_>,
    ledger: &OccupancyLedger,
) -> Option<(RoomTimeCandidate, u32)> {
    let found = candidates(duration, studio, ledger);
    trace!(
        "Class {}: {} room-time candidates",
        class.class_id,
        found.len()
    );
    found
        .into_iter()
        .map(|c| (c, preference_score(&c, &class.preferences)))
        .max_by_key(|(c, score)| rank(c, *score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StudioConfig;
    use crate::data::{Room, SchedulingInput};

    fn range(text: &str) -> SlotRange {
        text.parse().unwrap()
    }

    fn candidate(day: Day, room_id: RoomId, text: &str) -> RoomTimeCandidate {
        RoomTimeCandidate {
            day,
            room_id,
            range: range(text),
        }
    }

    fn two_rooms() -> SchedulingInput {
        SchedulingInput {
            classes: vec![],
            rooms: vec![
                Room::new(2, "Studio 2")
                    .with_availability(Day::Monday, range("17:00-18:00"))
                    .with_availability(Day::Tuesday, range("17:00-18:30")),
                Room::new(1, "Studio 1").with_availability(Day::Tuesday, range("17:00-18:00")),
            ],
            teachers: vec![],
        }
    }

    #[test]
    fn test_preference_score_sums_matches() {
        let class = ClassRequest::new(1, "Hip Hop", "Hip Hop", "1", 1.0)
            .with_preference(PreferenceTarget::Day(Day::Tuesday), 3)
            .with_preference(PreferenceTarget::Time(range("16:00-18:00")), 5)
            .with_preference(PreferenceTarget::Room(2), 2)
            .with_preference(PreferenceTarget::Room(2), 1)
            .with_preference(PreferenceTarget::Teacher(9), 50);

        let all = candidate(Day::Tuesday, 2, "17:00-18:00");
        assert_eq!(preference_score(&all, &class.preferences), 11);

        // runs past the preferred window, so only day and room count
        let late = candidate(Day::Tuesday, 2, "17:30-18:30");
        assert_eq!(preference_score(&late, &class.preferences), 6);

        let none = candidate(Day::Monday, 1, "19:00-20:00");
        assert_eq!(preference_score(&none, &class.preferences), 0);
    }

    #[test]
    fn test_rank_breaks_ties_by_day_start_room() {
        let early_day = candidate(Day::Monday, 5, "19:00-20:00");
        let later_day = candidate(Day::Tuesday, 1, "09:00-10:00");
        assert!(rank(&early_day, 0) > rank(&later_day, 0));

        let early_start = candidate(Day::Monday, 5, "09:00-10:00");
        assert!(rank(&early_start, 0) > rank(&early_day, 0));

        let low_room = candidate(Day::Monday, 1, "09:00-10:00");
        assert!(rank(&low_room, 0) > rank(&early_start, 0));

        // preference score dominates the tie-break
        assert!(rank(&later_day, 1) > rank(&low_room, 0));
    }

    #[test]
    fn test_candidates_follow_availability() {
        let input = two_rooms();
        let studio = Studio::prepare(&input, &StudioConfig::default());
        let ledger = OccupancyLedger::new();

        let found = candidates(4, &studio, &ledger);
        assert_eq!(
            found,
            vec![
                candidate(Day::Monday, 2, "17:00-18:00"),
                candidate(Day::Tuesday, 1, "17:00-18:00"),
                candidate(Day::Tuesday, 2, "17:00-18:00"),
                candidate(Day::Tuesday, 2, "17:15-18:15"),
                candidate(Day::Tuesday, 2, "17:30-18:30"),
            ]
        );
        assert!(candidates(8, &studio, &ledger).is_empty());
    }

    #[test]
    fn test_candidates_respect_operating_hours() {
        let input = two_rooms();
        let config = StudioConfig {
            operating_hours: range("17:15-20:00"),
            ..StudioConfig::default()
        };
        let studio = Studio::prepare(&input, &config);
        let found = candidates(4, &studio, &OccupancyLedger::new());
        assert_eq!(
            found,
            vec![
                candidate(Day::Tuesday, 2, "17:15-18:15"),
                candidate(Day::Tuesday, 2, "17:30-18:30"),
            ]
        );
    }

    #[test]
    fn test_candidates_skip_reserved_group_time() {
        let input = two_rooms();
        let studio = Studio::prepare(&input, &StudioConfig::default());
        let mut ledger = OccupancyLedger::new();
        let hold = ledger
            .reserve_provisional(2, Day::Tuesday, range("17:00-17:30"))
            .unwrap();
        ledger.commit(hold, 1).unwrap();

        let tuesday_room_2: Vec<_> = candidates(4, &studio, &ledger)
            .into_iter()
            .filter(|c| c.day == Day::Tuesday && c.room_id == 2)
            .collect();
        assert_eq!(tuesday_room_2, vec![candidate(Day::Tuesday, 2, "17:30-18:30")]);
    }

    #[test]
    fn test_best_placement_without_preferences_is_earliest() {
        let input = two_rooms();
        let studio = Studio::prepare(&input, &StudioConfig::default());
        let class = ClassRequest::new(1, "Tap", "Tap", "1", 1.0);
        let (best, score) = best_placement(&class, 4, &studio, &OccupancyLedger::new()).unwrap();
        assert_eq!(best, candidate(Day::Monday, 2, "17:00-18:00"));
        assert_eq!(score, 0);
    }

    #[test]
    fn test_best_placement_follows_preferences() {
        let input = two_rooms();
        let studio = Studio::prepare(&input, &StudioConfig::default());
        let class = ClassRequest::new(1, "Tap", "Tap", "1", 1.0)
            .with_preference(PreferenceTarget::Day(Day::Tuesday), 2)
            .with_preference(PreferenceTarget::Time(range("17:30-19:00")), 1);
        let (best, score) = best_placement(&class, 4, &studio, &OccupancyLedger::new()).unwrap();
        assert_eq!(best, candidate(Day::Tuesday, 2, "17:30-18:30"));
        assert_eq!(score, 3);
    }
}
