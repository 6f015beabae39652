//! Read-only view of the studio that both placement phases search.
//!
//! Built once per run from validated input: the room-group partition, each
//! room's effective availability and the time grid.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::config::StudioConfig;
use crate::data::{Availability, Room, RoomId, SchedulingInput, Teacher, TeacherId};
use crate::ranges::RangeSet;
use crate::timegrid::{Day, SlotRange, TimeGrid};

/// Identifies a room-group. It is the smallest room id in the group.
pub type GroupId = RoomId;

/// Flat partition of rooms into mutually exclusive groups.
///
/// A combined room and each of its components end up in one group, and the
/// relation is closed transitively, so every occupancy check is a single
/// group lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoomGroups {
    group_of: BTreeMap<RoomId, GroupId>,
    members: BTreeMap<GroupId, Vec<RoomId>>,
}

impl RoomGroups {
    pub fn build(rooms: &[Room]) -> Self {
        let mut parent: BTreeMap<RoomId, RoomId> =
            rooms.iter().map(|r| (r.room_id, r.room_id)).collect();

        for room in rooms.iter().filter(|r| r.is_combined) {
            for component in &room.component_room_ids {
                if !parent.contains_key(component) {
                    continue;
                }
                let a = find_root(&mut parent, room.room_id);
                let b = find_root(&mut parent, *component);
                // the smaller id becomes the root
                let (root, child) = if a <= b { (a, b) } else { (b, a) };
                parent.insert(child, root);
            }
        }

        let ids: Vec<RoomId> = parent.keys().copied().collect();
        let mut group_of = BTreeMap::new();
        let mut members: BTreeMap<GroupId, Vec<RoomId>> = BTreeMap::new();
        for id in ids {
            let root = find_root(&mut parent, id);
            group_of.insert(id, root);
            members.entry(root).or_default().push(id);
        }
        Self { group_of, members }
    }

    #[inline]
    pub fn group_of(&self, room_id: RoomId) -> Option<GroupId> {
        self.group_of.get(&room_id).copied()
    }

    pub fn members(&self, group: GroupId) -> &[RoomId] {
        self.members.get(&group).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn same_group(&self, a: RoomId, b: RoomId) -> bool {
        matches!((self.group_of(a), self.group_of(b)), (Some(x), Some(y)) if x == y)
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

fn find_root(parent: &mut BTreeMap<RoomId, RoomId>, id: RoomId) -> RoomId {
    let mut root = id;
    while let Some(&next) = parent.get(&root) {
        if next == root {
            break;
        }
        root = next;
    }
    let mut cursor = id;
    while cursor != root {
        let next = parent.get(&cursor).copied().unwrap_or(root);
        parent.insert(cursor, root);
        cursor = next;
    }
    root
}

/// Availability per day as coalesced range sets.
///
/// Touching declared ranges merge, so `17:00-17:30` and `17:30-19:00` offer
/// one continuous stretch.
pub type DayRanges = BTreeMap<Day, RangeSet>;

pub fn coalesce(availability: &Availability) -> DayRanges {
    availability
        .iter()
        .map(|(day, ranges)| (*day, RangeSet::from_ranges(ranges.iter().copied())))
        .filter(|(_, set)| !set.is_empty())
        .collect()
}

/// Availability each room can actually offer.
///
/// Plain rooms keep what they declared. A combined room is limited to the
/// time all of its components are free: with no declaration of its own it
/// gets exactly that intersection, otherwise its declaration is clipped to it.
pub fn effective_room_availability(rooms: &[Room]) -> BTreeMap<RoomId, DayRanges> {
    let by_id: BTreeMap<RoomId, &Room> = rooms.iter().map(|r| (r.room_id, r)).collect();
    rooms
        .iter()
        .map(|room| {
            let availability = if room.is_combined {
                combined_availability(room, &by_id)
            } else {
                coalesce(&room.availability)
            };
            (room.room_id, availability)
        })
        .collect()
}

fn combined_availability(room: &Room, by_id: &BTreeMap<RoomId, &Room>) -> DayRanges {
    let mut shared: Option<DayRanges> = None;
    for component in room.component_room_ids.iter().filter_map(|id| by_id.get(id)) {
        let own = coalesce(&component.availability);
        shared = Some(match shared {
            None => own,
            Some(acc) => acc
                .into_iter()
                .filter_map(|(day, set)| {
                    let both = set.intersection(own.get(&day)?);
                    (!both.is_empty()).then_some((day, both))
                })
                .collect(),
        });
    }
    let shared = shared.unwrap_or_default();

    if room.availability.is_empty() {
        return shared;
    }

    let mut effective = DayRanges::new();
    for (day, declared) in coalesce(&room.availability) {
        let clipped = match shared.get(&day) {
            Some(physical) => declared.intersection(physical),
            None => RangeSet::new(),
        };
        if clipped != declared {
            warn!(
                "Combined room {} declares more time on {} than its components allow; using {:?}",
                room.room_id,
                day,
                clipped.iter().map(ToString::to_string).collect::<Vec<_>>()
            );
        }
        if !clipped.is_empty() {
            effective.insert(day, clipped);
        }
    }
    effective
}

/// Everything the placement phases need to know about rooms and teachers.
#[derive(Debug, Clone)]
pub struct Studio<'a> {
    grid: TimeGrid,
    groups: RoomGroups,
    rooms: BTreeMap<RoomId, DayRanges>,
    teachers: BTreeMap<TeacherId, &'a Teacher>,
    teacher_availability: BTreeMap<TeacherId, DayRanges>,
}

impl<'a> Studio<'a> {
    /// Builds the studio view. Expects input that already passed validation.
    pub fn prepare(input: &'a SchedulingInput, config: &StudioConfig) -> Self {
        let rooms = effective_room_availability(&input.rooms);
        let teachers: BTreeMap<TeacherId, &Teacher> =
            input.teachers.iter().map(|t| (t.teacher_id, t)).collect();
        let teacher_availability: BTreeMap<TeacherId, DayRanges> = teachers
            .iter()
            .map(|(id, t)| (*id, coalesce(&t.availability)))
            .collect();

        let declared = rooms
            .values()
            .chain(teacher_availability.values())
            .flat_map(|availability| {
                availability
                    .iter()
                    .flat_map(|(day, set)| set.iter().map(move |r| (*day, *r)))
            });
        let grid = TimeGrid::derive(&config.days, config.operating_hours, declared);
        let groups = RoomGroups::build(&input.rooms);

        debug!(
            "Studio prepared: {} rooms in {} groups, {} teachers, {} studio days",
            rooms.len(),
            groups.len(),
            teachers.len(),
            grid.days().count()
        );

        Self {
            grid,
            groups,
            rooms,
            teachers,
            teacher_availability,
        }
    }

    #[inline]
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    #[inline]
    pub fn groups(&self) -> &RoomGroups {
        &self.groups
    }

    /// Room ids in ascending order.
    pub fn room_ids(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.rooms.keys().copied()
    }

    /// The room's effective availability on `day`, coalesced and sorted.
    pub fn room_ranges(&self, room_id: RoomId, day: Day) -> &[SlotRange] {
        self.rooms
            .get(&room_id)
            .and_then(|availability| availability.get(&day))
            .map(RangeSet::as_slice)
            .unwrap_or_default()
    }

    /// Teachers in ascending id order.
    pub fn teachers(&self) -> impl Iterator<Item = &'a Teacher> + '_ {
        self.teachers.values().copied()
    }

    /// Whether the teacher's availability on `day` holds all of `range`.
    pub fn teacher_covers(&self, teacher_id: TeacherId, day: Day, range: &SlotRange) -> bool {
        self.teacher_availability
            .get(&teacher_id)
            .and_then(|availability| availability.get(&day))
            .is_some_and(|set| set.covers(range))
    }
}
