use thiserror::Error;

use crate::data::RoomId;
use crate::timegrid::{Day, SlotRange};

/// Errors raised by input validation and the scheduling engine.
///
/// Per-class variants end up in an `InvalidRequest` unscheduled record; the
/// rest abort the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("invalid time '{0}': expected HH:MM on a 15-minute boundary")]
    InvalidTime(String),

    #[error("invalid time range '{0}': expected HH:MM-HH:MM")]
    InvalidRange(String),

    #[error("duration of {hours} hours is not a positive multiple of 0.25 hours within one day")]
    InvalidDuration { hours: f64 },

    #[error("age range {start}-{end} starts after it ends")]
    InvertedAgeRange { start: u32, end: u32 },

    #[error("time preference {0} ends before it starts")]
    EmptyTimePreference(SlotRange),

    #[error("{owner} declares an empty range {range} on {day}")]
    EmptyRange {
        owner: String,
        day: Day,
        range: SlotRange,
    },

    #[error("{owner} declares overlapping ranges {first} and {second} on {day}")]
    OverlappingRanges {
        owner: String,
        day: Day,
        first: SlotRange,
        second: SlotRange,
    },

    #[error("room {0} lists itself as a component")]
    SelfComponent(RoomId),

    #[error("room {room_id} lists combined room {component} as a component")]
    NestedCombined { room_id: RoomId, component: RoomId },

    #[error("room {room_id} lists unknown component room {component}")]
    UnknownComponent { room_id: RoomId, component: RoomId },

    #[error("combined room {0} lists no component rooms")]
    MissingComponents(RoomId),

    #[error("room {0} is not combined but lists component rooms")]
    UnexpectedComponents(RoomId),

    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u32 },

    #[error("no rooms supplied")]
    NoRooms,

    #[error("{resource} is already reserved on {day} during {range}")]
    Conflict {
        resource: String,
        day: Day,
        range: SlotRange,
    },
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
