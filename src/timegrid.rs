//! The 15-minute slot grid.
//!
//! Every time of day is an integer slot index counted from midnight, so
//! `00:00` is slot 0, `17:30` is slot 70 and `24:00` (slot 96) is only valid
//! as the end of a range. Ranges are half-open `[start, end)`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

pub type Slot = u16;

pub const SLOT_MINUTES: u16 = 15;
pub const SLOTS_PER_HOUR: u16 = 60 / SLOT_MINUTES;
pub const SLOTS_PER_DAY: Slot = 24 * SLOTS_PER_HOUR;

/// Day of the studio week. Ordering follows the calendar, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses an `HH:MM` boundary into a slot index.
pub fn parse_time(text: &str) -> Result<Slot> {
    let invalid = || ScheduleError::InvalidTime(text.to_string());
    let (h, m) = text.trim().split_once(':').ok_or_else(invalid)?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return Err(invalid());
    }
    let hours: u16 = h.parse().map_err(|_| invalid())?;
    let minutes: u16 = m.parse().map_err(|_| invalid())?;
    if minutes >= 60 || minutes % SLOT_MINUTES != 0 || hours > 24 || (hours == 24 && minutes != 0)
    {
        return Err(invalid());
    }
    Ok(hours * SLOTS_PER_HOUR + minutes / SLOT_MINUTES)
}

/// Renders a slot index as `HH:MM`.
pub fn format_slot(slot: Slot) -> String {
    format!(
        "{:02}:{:02}",
        slot / SLOTS_PER_HOUR,
        (slot % SLOTS_PER_HOUR) * SLOT_MINUTES
    )
}

/// Converts a class length in hours to a whole number of slots.
///
/// Rejects anything that is not a positive multiple of a quarter hour or
/// that would not fit in a single day.
pub fn duration_to_slots(hours: f64) -> Result<Slot> {
    let quarters = hours * f64::from(SLOTS_PER_HOUR);
    let rounded = quarters.round();
    if !hours.is_finite()
        || rounded <= 0.0
        || (quarters - rounded).abs() > 1e-6
        || rounded > f64::from(SLOTS_PER_DAY)
    {
        return Err(ScheduleError::InvalidDuration { hours });
    }
    Ok(rounded as Slot)
}

/// A half-open slot interval `[start, end)`.
///
/// On the wire a range is the string `"HH:MM-HH:MM"`. Parsing only checks
/// the format; ordering of the two ends is checked by validation so that a
/// bad range can be reported against the entity that declared it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotRange {
    pub start: Slot,
    pub end: Slot,
}

impl SlotRange {
    #[inline]
    pub const fn new(start: Slot, end: Slot) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn starting_at(start: Slot, len: Slot) -> Self {
        Self::new(start, start + len)
    }

    #[inline]
    pub fn len(&self) -> Slot {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether `other` lies entirely inside this range.
    #[inline]
    pub fn contains(&self, other: &SlotRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    #[inline]
    pub fn overlaps(&self, other: &SlotRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn intersection(&self, other: &SlotRange) -> Option<SlotRange> {
        let range = SlotRange::new(self.start.max(other.start), self.end.min(other.end));
        (!range.is_empty()).then_some(range)
    }

    /// Smallest range covering both.
    pub fn hull(&self, other: &SlotRange) -> SlotRange {
        SlotRange::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl fmt::Display for SlotRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_slot(self.start), format_slot(self.end))
    }
}

impl FromStr for SlotRange {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| ScheduleError::InvalidRange(s.to_string()))?;
        Ok(SlotRange::new(parse_time(start)?, parse_time(end)?))
    }
}

impl TryFrom<String> for SlotRange {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SlotRange> for String {
    fn from(range: SlotRange) -> Self {
        range.to_string()
    }
}

/// The bounded daily windows the engine searches.
///
/// For each configured day the window is the hull of every declared room and
/// teacher range on that day, cut down to the studio's operating hours. Days
/// nobody declared availability for have no window at all.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeGrid {
    windows: BTreeMap<Day, SlotRange>,
}

impl TimeGrid {
    pub fn derive(
        days: &[Day],
        operating_hours: SlotRange,
        declared: impl IntoIterator<Item = (Day, SlotRange)>,
    ) -> Self {
        let mut hulls: BTreeMap<Day, SlotRange> = BTreeMap::new();
        for (day, range) in declared {
            if range.is_empty() || !days.contains(&day) {
                continue;
            }
            hulls
                .entry(day)
                .and_modify(|hull| *hull = hull.hull(&range))
                .or_insert(range);
        }
        let windows = hulls
            .into_iter()
            .filter_map(|(day, hull)| hull.intersection(&operating_hours).map(|w| (day, w)))
            .collect();
        Self { windows }
    }

    #[inline]
    pub fn window(&self, day: Day) -> Option<SlotRange> {
        self.windows.get(&day).copied()
    }

    /// Days with a window, in calendar order.
    pub fn days(&self) -> impl Iterator<Item = Day> + '_ {
        self.windows.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
