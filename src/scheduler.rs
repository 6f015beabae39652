use crate::config::StudioConfig;
use crate::data::{
    Assignment, ClassRequest, SchedulingInput, SchedulingOutput, Statistics, UnscheduledReason,
    UnscheduledRecord,
};
use crate::error::Result;
use crate::ledger::OccupancyLedger;
use crate::ranker;
use crate::room_placer;
use crate::studio::Studio;
use crate::teacher_placer;
use crate::timegrid::Slot;
use crate::validation;
use log::{debug, info, warn};
use std::time::Instant;

/// What happened to one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Scheduled(Assignment),
    Unscheduled(UnscheduledRecord),
}

/// Greedy two-phase scheduler owning the occupancy ledger for one run.
pub struct Scheduler<'a> {
    input: &'a SchedulingInput,
    config: &'a StudioConfig,
    studio: Studio<'a>,
    ledger: OccupancyLedger,
}

impl<'a> Scheduler<'a> {
    /// Validates the input and prepares an empty ledger.
    pub fn new(input: &'a SchedulingInput, config: &'a StudioConfig) -> Result<Self> {
        validation::validate_input(input)?;
        Ok(Self {
            input,
            config,
            studio: Studio::prepare(input, config),
            ledger: OccupancyLedger::new(),
        })
    }

    pub fn studio(&self) -> &Studio<'a> {
        &self.studio
    }

    pub fn ledger(&self) -> &OccupancyLedger {
        &self.ledger
    }

    /// Runs both phases for one class against the current ledger.
    ///
    /// Room time is held while a teacher is searched for and given back if
    /// none is found, so a failed class leaves the ledger untouched. A class
    /// that fails validation is reported as `InvalidRequest`.
    pub fn place(&mut self, class: &ClassRequest) -> Result<Outcome> {
        match validation::validate_class(class) {
            Ok(duration) => self.place_validated(class, duration),
            Err(e) => Ok(Outcome::Unscheduled(UnscheduledRecord::new(
                class.class_id,
                UnscheduledReason::InvalidRequest,
                e.to_string(),
            ))),
        }
    }

    fn place_validated(&mut self, class: &ClassRequest, duration: Slot) -> Result<Outcome> {
        let Some((placement, room_score)) =
            room_placer::best_placement(class, duration, &self.studio, &self.ledger)
        else {
            debug!("Class {}: no room-time slot", class.class_id);
            return Ok(Outcome::Unscheduled(UnscheduledRecord::new(
                class.class_id,
                UnscheduledReason::NoRoomTimeSlot,
                format!("no free room fits {duration} slots on any studio day"),
            )));
        };

        let group = self
            .studio
            .groups()
            .group_of(placement.room_id)
            .unwrap_or(placement.room_id);
        let hold = self
            .ledger
            .reserve_provisional(group, placement.day, placement.range)?;

        let Some((teacher_id, teacher_score)) = teacher_placer::best_teacher(
            class,
            placement.day,
            &placement.range,
            &self.studio,
            &self.ledger,
        ) else {
            self.ledger.release(hold);
            debug!(
                "Class {}: no qualified teacher on {} {}, room {} released",
                class.class_id, placement.day, placement.range, placement.room_id
            );
            return Ok(Outcome::Unscheduled(UnscheduledRecord::new(
                class.class_id,
                UnscheduledReason::NoQualifiedTeacher,
                format!(
                    "no qualified teacher free on {} {}",
                    placement.day, placement.range
                ),
            )));
        };

        self.ledger.commit(hold, teacher_id)?;
        let assignment = Assignment {
            class_id: class.class_id,
            day: placement.day,
            start_slot: placement.range.start,
            end_slot: placement.range.end,
            room_id: placement.room_id,
            teacher_id,
            score: room_score.saturating_add(teacher_score),
        };
        debug!(
            "Class {}: {} {} in room {} with teacher {} (score {})",
            class.class_id,
            assignment.day,
            placement.range,
            assignment.room_id,
            assignment.teacher_id,
            assignment.score
        );
        Ok(Outcome::Scheduled(assignment))
    }

    /// Schedules every class: invalid ones are recorded up front, the rest
    /// are ranked and placed one at a time.
    pub fn run(&mut self) -> Result<SchedulingOutput> {
        let start_time = Instant::now();
        let input = self.input;
        info!(
            "Scheduling {} classes across {} rooms ({} groups) and {} teachers...",
            input.classes.len(),
            input.rooms.len(),
            self.studio.groups().len(),
            input.teachers.len()
        );

        let mut unscheduled = Vec::new();
        let mut valid = Vec::with_capacity(input.classes.len());
        for class in &input.classes {
            match validation::validate_class(class) {
                Ok(duration) => valid.push((class, duration)),
                Err(e) => {
                    warn!("Class {} rejected: {}", class.class_id, e);
                    unscheduled.push(UnscheduledRecord::new(
                        class.class_id,
                        UnscheduledReason::InvalidRequest,
                        e.to_string(),
                    ));
                }
            }
        }

        let ranked = ranker::rank(&valid, &self.studio, &self.config.ranking);

        let mut assignments = Vec::new();
        for entry in &ranked {
            match self.place_validated(entry.class, entry.duration)? {
                Outcome::Scheduled(assignment) => assignments.push(assignment),
                Outcome::Unscheduled(record) => unscheduled.push(record),
            }
        }
        assignments.sort();

        let statistics = Statistics::collect(input.classes.len(), assignments.len(), &unscheduled);
        info!(
            "Scheduled {}/{} classes ({:.1}%) in {:.2?}",
            statistics.scheduled,
            statistics.total,
            statistics.rate * 100.0,
            start_time.elapsed()
        );

        Ok(SchedulingOutput {
            assignments,
            unscheduled,
            statistics,
        })
    }
}

/// Schedules the input from scratch with a fresh ledger.
pub fn solve(input: &SchedulingInput, config: &StudioConfig) -> Result<SchedulingOutput> {
    Scheduler::new(input, config)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{PreferenceTarget, Room, SpecializationKind, Teacher};
    use crate::error::ScheduleError;
    use crate::timegrid::{Day, SlotRange};

    fn range(text: &str) -> SlotRange {
        text.parse().unwrap()
    }

    fn input() -> SchedulingInput {
        SchedulingInput {
            classes: vec![
                ClassRequest::new(1, "Ballet I", "Ballet", "1", 1.0),
                ClassRequest::new(2, "Tap I", "Tap", "1", 1.0),
            ],
            rooms: vec![
                Room::new(1, "Studio 1").with_availability(Day::Monday, range("17:00-19:00")),
            ],
            teachers: vec![
                Teacher::new(1, "Ana")
                    .with_availability(Day::Monday, range("17:00-19:00"))
                    .with_specialization(SpecializationKind::Style, "Ballet"),
            ],
        }
    }

    #[test]
    fn test_failed_teacher_search_leaves_ledger_untouched() {
        let input = input();
        let config = StudioConfig::default();
        let mut scheduler = Scheduler::new(&input, &config).unwrap();

        let first = scheduler.place(&input.classes[0]).unwrap();
        assert!(matches!(first, Outcome::Scheduled(_)));
        let before = scheduler.ledger().clone();

        let second = scheduler.place(&input.classes[1]).unwrap();
        match second {
            Outcome::Unscheduled(record) => {
                assert_eq!(record.reason, UnscheduledReason::NoQualifiedTeacher)
            }
            other => panic!("expected NoQualifiedTeacher, got {other:?}"),
        }
        assert_eq!(scheduler.ledger(), &before);
    }

    #[test]
    fn test_place_rejects_invalid_duration_without_reserving() {
        let input = input();
        let config = StudioConfig::default();
        let mut scheduler = Scheduler::new(&input, &config).unwrap();

        for hours in [0.0, -1.0, 0.3] {
            let class = ClassRequest::new(9, "Broken", "Ballet", "1", hours);
            match scheduler.place(&class).unwrap() {
                Outcome::Unscheduled(record) => {
                    assert_eq!(record.reason, UnscheduledReason::InvalidRequest)
                }
                other => panic!("expected InvalidRequest, got {other:?}"),
            }
        }
        assert!(scheduler.ledger().is_empty());
    }

    #[test]
    fn test_place_adds_teacher_preference_to_score() {
        let mut input = input();
        input.classes[0] = ClassRequest::new(1, "Ballet I", "Ballet", "1", 1.0)
            .with_preference(PreferenceTarget::Day(Day::Monday), 2)
            .with_preference(PreferenceTarget::Teacher(1), 5);
        let config = StudioConfig::default();
        let mut scheduler = Scheduler::new(&input, &config).unwrap();

        let Outcome::Scheduled(assignment) = scheduler.place(&input.classes[0]).unwrap() else {
            panic!("class should be scheduled");
        };
        assert_eq!(assignment.score, 7);
        assert_eq!(assignment.range(), range("17:00-18:00"));
    }

    #[test]
    fn test_run_records_invalid_classes_first() {
        let mut input = input();
        input.classes.push(ClassRequest::new(3, "Broken", "Ballet", "1", 0.3));
        let output = solve(&input, &StudioConfig::default()).unwrap();

        assert_eq!(output.statistics.total, 3);
        assert_eq!(output.statistics.scheduled, 1);
        assert_eq!(output.unscheduled[0].class_id, 3);
        assert_eq!(output.unscheduled[0].reason, UnscheduledReason::InvalidRequest);
        assert_eq!(output.unscheduled[1].class_id, 2);
        assert_eq!(output.unscheduled[1].reason, UnscheduledReason::NoQualifiedTeacher);
    }

    #[test]
    fn test_empty_room_set_halts_run() {
        let mut input = input();
        input.rooms.clear();
        assert_eq!(
            solve(&input, &StudioConfig::default()).unwrap_err(),
            ScheduleError::NoRooms
        );
    }

    #[test]
    fn test_no_classes_is_an_empty_schedule() {
        let mut input = input();
        input.classes.clear();
        let output = solve(&input, &StudioConfig::default()).unwrap();
        assert!(output.assignments.is_empty());
        assert!(output.unscheduled.is_empty());
        assert_eq!(output.statistics.rate, 0.0);
    }
}
