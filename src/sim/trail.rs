//! Trail store with a bucketed spatial index
//!
//! Each vehicle's trail is an append-only sequence of grid points in travel
//! order. Points carry an absolute index so the eraser can drop the oldest
//! points without renumbering the rest. Collision queries go through a
//! bucket map keyed by the quantized cell, so lookups cost the bucket's
//! occupancy instead of a scan over every trail.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use glam::IVec2;

use super::vehicle::VehicleId;
use crate::consts::TRAIL_BUCKET;
use crate::error::{Error, Result};
use crate::{Cell, is_adjacent};

/// Initial capacity for a bucket's entry list
const BUCKET_INITIAL_CAPACITY: usize = 16;

/// What a collision query covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailQuery {
    Point(Cell),
    /// Inclusive axis-aligned run of cells. A diagonal pair only checks
    /// its two endpoints.
    Segment { from: Cell, to: Cell },
}

impl From<Cell> for TrailQuery {
    fn from(cell: Cell) -> Self {
        TrailQuery::Point(cell)
    }
}

impl TrailQuery {
    fn cells(&self) -> Vec<Cell> {
        match *self {
            TrailQuery::Point(cell) => vec![cell],
            TrailQuery::Segment { from, to } => {
                if from.x != to.x && from.y != to.y {
                    return vec![from, to];
                }
                let step = (to - from).signum();
                let len = (to - from).abs().max_element();
                (0..=len).map(|i| from + step * i).collect()
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TrailEntry {
    vehicle: VehicleId,
    index: usize,
    cell: Cell,
}

#[derive(Debug, Clone, Default)]
struct Trail {
    points: VecDeque<Cell>,
    /// Absolute index of `points[0]` (number of points erased so far)
    removed: usize,
}

impl Trail {
    fn last_index(&self) -> Option<usize> {
        (!self.points.is_empty()).then(|| self.removed + self.points.len() - 1)
    }
}

/// All trails of one round
#[derive(Debug, Clone, Default)]
pub struct TrailStore {
    trails: BTreeMap<VehicleId, Trail>,
    buckets: HashMap<IVec2, Vec<TrailEntry>>,
}

#[inline]
fn bucket_of(cell: Cell) -> IVec2 {
    IVec2::new(cell.x.div_euclid(TRAIL_BUCKET), cell.y.div_euclid(TRAIL_BUCKET))
}

impl TrailStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend `vehicle`'s trail by one grid step.
    ///
    /// The first point of an empty trail is accepted anywhere; every later
    /// point must be a 4-neighbour of the current last point.
    pub fn append(&mut self, vehicle: VehicleId, point: Cell) -> Result<()> {
        let trail = self.trails.entry(vehicle).or_default();
        if let Some(&last) = trail.points.back() {
            if !is_adjacent(last, point) {
                return Err(Error::InvalidAppend {
                    vehicle,
                    last,
                    point,
                });
            }
        }

        let index = trail.removed + trail.points.len();
        trail.points.push_back(point);
        self.buckets
            .entry(bucket_of(point))
            .or_insert_with(|| Vec::with_capacity(BUCKET_INITIAL_CAPACITY))
            .push(TrailEntry {
                vehicle,
                index,
                cell: point,
            });
        Ok(())
    }

    /// Erase the whole trail. Returns the number of points removed.
    pub fn clear(&mut self, vehicle: VehicleId) -> usize {
        self.truncate(vehicle, 0)
    }

    /// Keep only the newest `keep_last` points. Returns the number removed.
    pub fn truncate(&mut self, vehicle: VehicleId, keep_last: usize) -> usize {
        let Some(trail) = self.trails.get_mut(&vehicle) else {
            return 0;
        };
        let remove = trail.points.len().saturating_sub(keep_last);
        for _ in 0..remove {
            let Some(cell) = trail.points.pop_front() else {
                break;
            };
            let index = trail.removed;
            trail.removed += 1;

            let key = bucket_of(cell);
            if let Some(entries) = self.buckets.get_mut(&key) {
                entries.retain(|e| !(e.vehicle == vehicle && e.index == index));
                if entries.is_empty() {
                    self.buckets.remove(&key);
                }
            }
        }
        remove
    }

    /// Every vehicle whose trail covers a queried cell.
    ///
    /// `exclude` skips that vehicle's most recent point (the leading edge it
    /// is extending); the rest of its trail still counts.
    pub fn intersects(
        &self,
        query: impl Into<TrailQuery>,
        exclude: Option<VehicleId>,
    ) -> BTreeSet<VehicleId> {
        let skip = exclude.and_then(|v| {
            self.trails
                .get(&v)
                .and_then(Trail::last_index)
                .map(|idx| (v, idx))
        });

        let mut hits = BTreeSet::new();
        for cell in query.into().cells() {
            let Some(entries) = self.buckets.get(&bucket_of(cell)) else {
                continue;
            };
            for entry in entries.iter().filter(|e| e.cell == cell) {
                if skip == Some((entry.vehicle, entry.index)) {
                    continue;
                }
                hits.insert(entry.vehicle);
            }
        }
        hits
    }

    /// Whether any trail covers `cell`
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.buckets
            .get(&bucket_of(cell))
            .is_some_and(|entries| entries.iter().any(|e| e.cell == cell))
    }

    /// Trail points of `vehicle`, oldest first
    pub fn points(&self, vehicle: VehicleId) -> impl Iterator<Item = Cell> + '_ {
        self.trails
            .get(&vehicle)
            .into_iter()
            .flat_map(|t| t.points.iter().copied())
    }

    pub fn len(&self, vehicle: VehicleId) -> usize {
        self.trails.get(&vehicle).map_or(0, |t| t.points.len())
    }

    pub fn last(&self, vehicle: VehicleId) -> Option<Cell> {
        self.trails.get(&vehicle).and_then(|t| t.points.back().copied())
    }

    /// Total points across all trails
    pub fn total_len(&self) -> usize {
        self.trails.values().map(|t| t.points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::{Heading, Turn};
    use proptest::prelude::*;

    const A: VehicleId = VehicleId(0);
    const B: VehicleId = VehicleId(1);

    fn line(store: &mut TrailStore, v: VehicleId, from: Cell, heading: Heading, n: i32) {
        for i in 0..n {
            store.append(v, heading.advance(from, i)).unwrap();
        }
    }

    #[test]
    fn test_append_rejects_gaps() {
        let mut store = TrailStore::new();
        store.append(A, IVec2::new(5, 5)).unwrap();
        store.append(A, IVec2::new(6, 5)).unwrap();

        let err = store.append(A, IVec2::new(8, 5)).unwrap_err();
        assert!(matches!(err, Error::InvalidAppend { .. }));
        // Diagonal is not adjacent either
        assert!(store.append(A, IVec2::new(7, 6)).is_err());
        assert_eq!(store.len(A), 2);
        assert_eq!(store.last(A), Some(IVec2::new(6, 5)));
    }

    #[test]
    fn test_intersects_reports_all_owners() {
        let mut store = TrailStore::new();
        line(&mut store, A, IVec2::new(0, 3), Heading::East, 10);
        line(&mut store, B, IVec2::new(4, 0), Heading::South, 10);

        let hits = store.intersects(IVec2::new(4, 3), None);
        assert_eq!(hits.into_iter().collect::<Vec<_>>(), vec![A, B]);
        assert!(store.intersects(IVec2::new(50, 50), None).is_empty());
    }

    #[test]
    fn test_exclude_skips_only_leading_edge() {
        let mut store = TrailStore::new();
        line(&mut store, A, IVec2::new(0, 0), Heading::East, 4);

        // Leading edge is (3, 0)
        assert!(store.intersects(IVec2::new(3, 0), Some(A)).is_empty());
        assert!(store.intersects(IVec2::new(2, 0), Some(A)).contains(&A));
        // Excluding another vehicle changes nothing
        assert!(store.intersects(IVec2::new(3, 0), Some(B)).contains(&A));
    }

    #[test]
    fn test_segment_query() {
        let mut store = TrailStore::new();
        line(&mut store, B, IVec2::new(10, 0), Heading::South, 20);

        let across = TrailQuery::Segment {
            from: IVec2::new(0, 7),
            to: IVec2::new(20, 7),
        };
        assert!(store.intersects(across, None).contains(&B));

        let beside = TrailQuery::Segment {
            from: IVec2::new(0, 7),
            to: IVec2::new(9, 7),
        };
        assert!(store.intersects(beside, None).is_empty());
    }

    #[test]
    fn test_truncate_drops_oldest_and_index() {
        let mut store = TrailStore::new();
        line(&mut store, A, IVec2::new(0, 0), Heading::East, 10);

        assert_eq!(store.truncate(A, 4), 6);
        assert_eq!(store.len(A), 4);
        assert!(!store.is_occupied(IVec2::new(0, 0)));
        assert!(!store.is_occupied(IVec2::new(5, 0)));
        assert!(store.is_occupied(IVec2::new(6, 0)));

        // Trail keeps extending from its head
        store.append(A, IVec2::new(10, 0)).unwrap();
        assert_eq!(store.points(A).next(), Some(IVec2::new(6, 0)));
        assert!(store.intersects(IVec2::new(9, 0), Some(A)).contains(&A));
    }

    #[test]
    fn test_clear_then_restart_anywhere() {
        let mut store = TrailStore::new();
        line(&mut store, A, IVec2::new(0, 0), Heading::East, 5);
        assert_eq!(store.clear(A), 5);
        assert!(store.is_empty());
        store.append(A, IVec2::new(40, 40)).unwrap();
        assert_eq!(store.len(A), 1);
    }

    fn turn_strategy() -> impl Strategy<Value = Option<Turn>> {
        prop_oneof![Just(None), Just(Some(Turn::Left)), Just(Some(Turn::Right))]
    }

    proptest! {
        #[test]
        fn prop_walk_appends_are_adjacent(turns in prop::collection::vec(turn_strategy(), 1..200)) {
            let mut store = TrailStore::new();
            let mut cell = IVec2::new(0, 0);
            let mut heading = Heading::East;
            store.append(A, cell).unwrap();

            for (i, turn) in turns.iter().enumerate() {
                if let Some(turn) = turn {
                    heading = heading.turned(*turn);
                }
                cell = heading.advance(cell, 1);
                prop_assert!(store.append(A, cell).is_ok());
                prop_assert_eq!(store.len(A), i + 2);
            }

            let points: Vec<_> = store.points(A).collect();
            for pair in points.windows(2) {
                prop_assert!(is_adjacent(pair[0], pair[1]));
            }
        }

        #[test]
        fn prop_truncate_keeps_newest(len in 1usize..120, keep in 0usize..150) {
            let mut store = TrailStore::new();
            line(&mut store, A, IVec2::new(-60, 3), Heading::East, len as i32);
            let before: Vec<_> = store.points(A).collect();

            store.truncate(A, keep);
            let after: Vec<_> = store.points(A).collect();
            let kept = keep.min(len);
            prop_assert_eq!(&after[..], &before[len - kept..]);

            for cell in &before[..len - kept] {
                prop_assert!(!store.is_occupied(*cell));
            }
            for cell in &after {
                prop_assert!(store.is_occupied(*cell));
            }
        }
    }
}
