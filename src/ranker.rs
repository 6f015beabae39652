//! Orders classes hardest-first for the greedy placement.
//!
//! A class is hard to place when few (day, room, start) triples fit it, when
//! few teachers are qualified for it, or when it carries heavy preferences
//! that a depleted timetable could no longer honour:
//!
//! ```text
//! difficulty = room_time_factor / max(1, fits)
//!            + teacher_factor   / max(1, qualified teachers)
//!            + preference_factor * total preference weight
//! ```
//!
//! Ties go to the longer class, then to the lower class id.

use std::cmp::Ordering;

use log::debug;

use crate::config::RankingConfig;
use crate::data::ClassRequest;
use crate::studio::Studio;
use crate::teacher_placer::is_qualified;
use crate::timegrid::Slot;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedClass<'a> {
    pub class: &'a ClassRequest,
    pub duration: Slot,
    pub difficulty: f64,
}

/// Number of (day, room, start) triples where `duration` fits inside a room's
/// effective availability and the day's window, ignoring occupancy.
pub fn count_fits(duration: Slot, studio: &Studio<'_>) -> usize {
    let mut fits = 0;
    for day in studio.grid().days() {
        let Some(window) = studio.grid().window(day) else {
            continue;
        };
        for room_id in studio.room_ids() {
            fits += studio
                .room_ranges(room_id, day)
                .iter()
                .filter_map(|declared| declared.intersection(&window))
                .filter(|usable| usable.len() >= duration)
                .map(|usable| usize::from(usable.len() - duration) + 1)
                .sum::<usize>();
        }
    }
    fits
}

pub fn count_qualified(class: &ClassRequest, studio: &Studio<'_>) -> usize {
    studio.teachers().filter(|t| is_qualified(t, class)).count()
}

pub fn difficulty(
    class: &ClassRequest,
    duration: Slot,
    studio: &Studio<'_>,
    config: &RankingConfig,
) -> f64 {
    let fits = count_fits(duration, studio).max(1) as f64;
    let teachers = count_qualified(class, studio).max(1) as f64;
    config.room_time_factor / fits
        + config.teacher_factor / teachers
        + config.preference_factor * f64::from(class.total_preference_weight())
}

fn compare(a: &RankedClass<'_>, b: &RankedClass<'_>) -> Ordering {
    b.difficulty
        .total_cmp(&a.difficulty)
        .then_with(|| b.duration.cmp(&a.duration))
        .then_with(|| a.class.class_id.cmp(&b.class.class_id))
}

/// Sorts validated classes (with their slot lengths) into processing order.
pub fn rank<'a>(
    classes: &[(&'a ClassRequest, Slot)],
    studio: &Studio<'_>,
    config: &RankingConfig,
) -> Vec<RankedClass<'a>> {
    let mut ranked: Vec<RankedClass<'a>> = classes
        .iter()
        .map(|&(class, duration)| RankedClass {
            class,
            duration,
            difficulty: difficulty(class, duration, studio, config),
        })
        .collect();
    ranked.sort_by(compare);
    for (position, entry) in ranked.iter().enumerate() {
        debug!(
            "Rank {}: class {} (difficulty {:.3}, {} slots)",
            position + 1,
            entry.class.class_id,
            entry.difficulty,
            entry.duration
        );
    }
    ranked
}
