use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::timegrid::{Day, Slot, SlotRange};

// Type aliases for clarity
pub type RoomId = u32;
pub type ClassId = u32;
pub type TeacherId = u32;

/// Declared free ranges per day, sorted and disjoint once validated.
pub type Availability = BTreeMap<Day, Vec<SlotRange>>;

/// What a preference asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PreferenceTarget {
    Day(Day),
    /// Satisfied when the class runs entirely inside this range.
    Time(SlotRange),
    Room(RoomId),
    Teacher(TeacherId),
}

/// A weighted soft preference attached to a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    #[serde(flatten)]
    pub target: PreferenceTarget,
    pub weight: u32,
}

/// A class that needs a day, a time, a room and a teacher.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRequest {
    pub class_id: ClassId,
    pub name: String,
    pub style: String,
    pub level: String,
    pub age_start: u32,
    pub age_end: u32,
    pub duration_hours: f64,
    #[serde(default)]
    pub preferences: Vec<Preference>,
}

impl ClassRequest {
    pub fn new(
        class_id: ClassId,
        name: impl Into<String>,
        style: impl Into<String>,
        level: impl Into<String>,
        duration_hours: f64,
    ) -> Self {
        Self {
            class_id,
            name: name.into(),
            style: style.into(),
            level: level.into(),
            age_start: 0,
            age_end: u32::MAX,
            duration_hours,
            preferences: Vec::new(),
        }
    }

    pub fn with_ages(mut self, age_start: u32, age_end: u32) -> Self {
        self.age_start = age_start;
        self.age_end = age_end;
        self
    }

    pub fn with_preference(mut self, target: PreferenceTarget, weight: u32) -> Self {
        self.preferences.push(Preference { target, weight });
        self
    }

    /// Sum of every preference weight, whatever its type.
    pub fn total_preference_weight(&self) -> u32 {
        self.preferences
            .iter()
            .map(|p| p.weight)
            .fold(0, u32::saturating_add)
    }
}

/// A physical studio, or a combination of studios opened into one.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub room_id: RoomId,
    pub name: String,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub is_combined: bool,
    #[serde(default)]
    pub component_room_ids: Vec<RoomId>,
}

impl Room {
    pub fn new(room_id: RoomId, name: impl Into<String>) -> Self {
        Self {
            room_id,
            name: name.into(),
            availability: Availability::new(),
            is_combined: false,
            component_room_ids: Vec::new(),
        }
    }

    pub fn combined(
        room_id: RoomId,
        name: impl Into<String>,
        components: impl IntoIterator<Item = RoomId>,
    ) -> Self {
        Self {
            is_combined: true,
            component_room_ids: components.into_iter().collect(),
            ..Self::new(room_id, name)
        }
    }

    pub fn with_availability(mut self, day: Day, range: SlotRange) -> Self {
        self.availability.entry(day).or_default().push(range);
        self
    }
}

/// Kinds of specialization a studio records for its teachers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecializationKind {
    Style,
    /// Values are age ranges such as `"7-12"`.
    AgeGroup,
    Level,
}

/// A teacher with their weekly availability and specializations.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub teacher_id: TeacherId,
    pub name: String,
    #[serde(default)]
    pub availability: Availability,
    /// A missing kind means no restriction was recorded for it.
    #[serde(default)]
    pub specializations: BTreeMap<SpecializationKind, BTreeSet<String>>,
}

impl Teacher {
    pub fn new(teacher_id: TeacherId, name: impl Into<String>) -> Self {
        Self {
            teacher_id,
            name: name.into(),
            availability: Availability::new(),
            specializations: BTreeMap::new(),
        }
    }

    pub fn with_availability(mut self, day: Day, range: SlotRange) -> Self {
        self.availability.entry(day).or_default().push(range);
        self
    }

    pub fn with_specialization(mut self, kind: SpecializationKind, value: impl Into<String>) -> Self {
        self.specializations
            .entry(kind)
            .or_default()
            .insert(value.into());
        self
    }
}

/// The complete input for the scheduling problem.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingInput {
    pub classes: Vec<ClassRequest>,
    pub rooms: Vec<Room>,
    pub teachers: Vec<Teacher>,
}

/// Represents a single, fully scheduled class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub class_id: ClassId,
    pub day: Day,
    pub start_slot: Slot,
    pub end_slot: Slot,
    pub room_id: RoomId,
    pub teacher_id: TeacherId,
    pub score: u32,
}

impl Assignment {
    #[inline]
    pub fn range(&self) -> SlotRange {
        SlotRange::new(self.start_slot, self.end_slot)
    }
}

/// Why a class did not make it into the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnscheduledReason {
    NoRoomTimeSlot,
    NoQualifiedTeacher,
    InvalidRequest,
}

impl UnscheduledReason {
    pub const ALL: [UnscheduledReason; 3] = [
        UnscheduledReason::NoRoomTimeSlot,
        UnscheduledReason::NoQualifiedTeacher,
        UnscheduledReason::InvalidRequest,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnscheduledRecord {
    pub class_id: ClassId,
    pub reason: UnscheduledReason,
    pub detail: String,
}

impl UnscheduledRecord {
    pub fn new(class_id: ClassId, reason: UnscheduledReason, detail: impl Into<String>) -> Self {
        Self {
            class_id,
            reason,
            detail: detail.into(),
        }
    }
}

/// Run summary handed to report generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total: usize,
    pub scheduled: usize,
    pub unscheduled: usize,
    pub rate: f64,
    pub by_reason: BTreeMap<UnscheduledReason, usize>,
}

impl Statistics {
    pub fn collect(total: usize, scheduled: usize, unscheduled: &[UnscheduledRecord]) -> Self {
        let mut by_reason: BTreeMap<UnscheduledReason, usize> =
            UnscheduledReason::ALL.iter().map(|r| (*r, 0)).collect();
        for record in unscheduled {
            *by_reason.entry(record.reason).or_default() += 1;
        }
        let rate = if total == 0 {
            0.0
        } else {
            scheduled as f64 / total as f64
        };
        Self {
            total,
            scheduled,
            unscheduled: unscheduled.len(),
            rate,
            by_reason,
        }
    }
}

/// Describes a hard constraint that a schedule breaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViolationKind {
    RoomOverlap,
    TeacherOverlap,
    RoomUnavailable,
    TeacherUnavailable,
    Unqualified,
    UnknownReference,
    DurationMismatch,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.description)
    }
}

/// The final output of the scheduler.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingOutput {
    pub assignments: Vec<Assignment>,
    pub unscheduled: Vec<UnscheduledRecord>,
    pub statistics: Statistics,
}
