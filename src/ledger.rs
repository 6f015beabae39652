//! Occupancy ledger: what has been reserved so far in a run.
//!
//! Room time is reserved per room-group, so one entry blocks every room in
//! the group. Room time is first taken as a provisional [`Hold`]; the hold is
//! either committed together with a teacher reservation or released, which
//! restores the ledger to exactly its previous state.

use std::collections::BTreeMap;

use log::trace;

use crate::data::TeacherId;
use crate::error::{Result, ScheduleError};
use crate::ranges::RangeSet;
use crate::studio::GroupId;
use crate::timegrid::{Day, SlotRange};

/// Provisional room-time reservation awaiting a teacher.
#[must_use = "a hold must be committed or released"]
#[derive(Debug, PartialEq, Eq)]
pub struct Hold {
    group: GroupId,
    day: Day,
    range: SlotRange,
}

impl Hold {
    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn day(&self) -> Day {
        self.day
    }

    pub fn range(&self) -> SlotRange {
        self.range
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OccupancyLedger {
    rooms: BTreeMap<(GroupId, Day), RangeSet>,
    teachers: BTreeMap<(TeacherId, Day), RangeSet>,
}

impl OccupancyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_group_free(&self, group: GroupId, day: Day, range: &SlotRange) -> bool {
        self.rooms
            .get(&(group, day))
            .is_none_or(|taken| !taken.overlaps(range))
    }

    pub fn is_teacher_free(&self, teacher: TeacherId, day: Day, range: &SlotRange) -> bool {
        self.teachers
            .get(&(teacher, day))
            .is_none_or(|taken| !taken.overlaps(range))
    }

    /// Free parts of `within` for a room-group on `day`.
    pub fn group_gaps(&self, group: GroupId, day: Day, within: SlotRange) -> Vec<SlotRange> {
        match self.rooms.get(&(group, day)) {
            Some(taken) => taken.gaps(within),
            None if within.is_empty() => Vec::new(),
            None => vec![within],
        }
    }

    pub fn group_reservations(&self, group: GroupId, day: Day) -> &[SlotRange] {
        self.rooms
            .get(&(group, day))
            .map(RangeSet::as_slice)
            .unwrap_or_default()
    }

    pub fn teacher_reservations(&self, teacher: TeacherId, day: Day) -> &[SlotRange] {
        self.teachers
            .get(&(teacher, day))
            .map(RangeSet::as_slice)
            .unwrap_or_default()
    }

    /// Takes room time for a whole group until a teacher is found.
    pub fn reserve_provisional(
        &mut self,
        group: GroupId,
        day: Day,
        range: SlotRange,
    ) -> Result<Hold> {
        if !self.is_group_free(group, day, &range) {
            return Err(ScheduleError::Conflict {
                resource: format!("room group {group}"),
                day,
                range,
            });
        }
        self.rooms.entry((group, day)).or_default().insert(range);
        trace!("Holding group {group} on {day} for {range}");
        Ok(Hold { group, day, range })
    }

    /// Makes a hold permanent and books the teacher for the same time.
    ///
    /// On a teacher conflict the hold is released before the error returns.
    pub fn commit(&mut self, hold: Hold, teacher: TeacherId) -> Result<()> {
        if !self.is_teacher_free(teacher, hold.day, &hold.range) {
            let (day, range) = (hold.day, hold.range);
            self.release(hold);
            return Err(ScheduleError::Conflict {
                resource: format!("teacher {teacher}"),
                day,
                range,
            });
        }
        self.teachers
            .entry((teacher, hold.day))
            .or_default()
            .insert(hold.range);
        trace!(
            "Committed group {} and teacher {teacher} on {} for {}",
            hold.group, hold.day, hold.range
        );
        Ok(())
    }

    /// Gives the held room time back.
    pub fn release(&mut self, hold: Hold) {
        if let Some(taken) = self.rooms.get_mut(&(hold.group, hold.day)) {
            taken.remove(hold.range);
            if taken.is_empty() {
                self.rooms.remove(&(hold.group, hold.day));
            }
        }
        trace!(
            "Released group {} on {} for {}",
            hold.group, hold.day, hold.range
        );
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty() && self.teachers.is_empty()
    }
}
