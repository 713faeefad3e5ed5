//! Computer pilots
//!
//! Each difficulty is its own [`Strategy`]. A strategy sees the round
//! through an [`AiView`] and answers with a relative steer plus an optional
//! shot. All randomness comes from a per-pilot seeded `Pcg32`, so the same
//! seed and the same views always give the same decisions.

mod easy;
mod hard;
mod medium;

use std::collections::{HashSet, VecDeque};

use rand::Rng;
use rand_pcg::Pcg32;

pub use easy::Easy;
pub use hard::Hard;
pub use medium::Medium;

use crate::sim::{
    Arena, Command, Heading, MatchState, PilotKind, PowerUp, PowerUpKind, TickInput, TrailStore,
    Turn, VehicleId,
};
use crate::settings::Difficulty;
use crate::{Cell, manhattan};

/// Relative steering choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steer {
    Straight,
    Left,
    Right,
}

impl Steer {
    pub const ALL: [Steer; 3] = [Steer::Straight, Steer::Left, Steer::Right];

    /// Heading after applying this steer to `heading`
    pub fn apply(self, heading: Heading) -> Heading {
        match self {
            Steer::Straight => heading,
            Steer::Left => heading.turned(Turn::Left),
            Steer::Right => heading.turned(Turn::Right),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub steer: Steer,
    pub fire: bool,
}

impl Decision {
    pub const STRAIGHT: Decision = Decision {
        steer: Steer::Straight,
        fire: false,
    };
}

/// Another vehicle as seen by a pilot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opponent {
    pub id: VehicleId,
    pub pos: Cell,
    pub heading: Heading,
}

/// What a pilot may look at when deciding
#[derive(Debug, Clone)]
pub struct AiView<'a> {
    pub me: VehicleId,
    pub pos: Cell,
    pub heading: Heading,
    pub ammo: u32,
    pub shield: bool,
    pub arena: Arena,
    pub trails: &'a TrailStore,
    /// Living opponents, ascending id
    pub opponents: Vec<Opponent>,
    pub powerups: &'a [PowerUp],
}

impl<'a> AiView<'a> {
    /// View for a living vehicle, or `None` if it is gone
    pub fn from_state(state: &'a MatchState, id: VehicleId) -> Option<Self> {
        let me = state.vehicle(id).filter(|v| v.alive)?;
        Some(Self {
            me: id,
            pos: me.pos,
            heading: me.heading,
            ammo: me.ammo,
            shield: me.has_shield(),
            arena: state.arena,
            trails: &state.trails,
            opponents: state
                .vehicles
                .iter()
                .filter(|v| v.alive && v.id != id)
                .map(|v| Opponent {
                    id: v.id,
                    pos: v.pos,
                    heading: v.heading,
                })
                .collect(),
            powerups: state.powerups.active(),
        })
    }

    /// Wall, trail or vehicle
    pub fn is_blocked(&self, cell: Cell) -> bool {
        !self.arena.contains(cell)
            || self.trails.is_occupied(cell)
            || self.opponents.iter().any(|o| o.pos == cell)
    }

    pub fn nearest_opponent(&self) -> Option<&Opponent> {
        self.opponents
            .iter()
            .min_by_key(|o| (manhattan(self.pos, o.pos), o.id))
    }
}

/// A computer pilot
pub trait Strategy {
    fn decide(&mut self, view: &AiView) -> Decision;
}

/// Build the pilot for a difficulty
pub fn pilot_for(difficulty: Difficulty, seed: u64) -> Box<dyn Strategy> {
    match difficulty {
        Difficulty::Easy => Box::new(Easy::new(seed)),
        Difficulty::Medium => Box::new(Medium::new(seed)),
        Difficulty::Hard => Box::new(Hard::new(seed)),
    }
}

/// Whether `lookahead` cells along `heading` are all free
pub fn is_safe(view: &AiView, heading: Heading, lookahead: i32) -> bool {
    (1..=lookahead).all(|i| !view.is_blocked(heading.advance(view.pos, i)))
}

/// Steers whose next `lookahead` cells are clear, in `Steer::ALL` order.
/// Falls back to a one-cell check when nothing passes the full lookahead.
pub fn safe_options(view: &AiView, lookahead: i32) -> Vec<(Steer, Heading)> {
    let options = |depth: i32| -> Vec<(Steer, Heading)> {
        Steer::ALL
            .iter()
            .map(|&s| (s, s.apply(view.heading)))
            .filter(|&(_, h)| is_safe(view, h, depth))
            .collect()
    };
    let safe = options(lookahead);
    if safe.is_empty() && lookahead > 1 {
        return options(1);
    }
    safe
}

/// Breadth-first count of free cells reachable from `start`, visiting at
/// most `cap` cells. `also_blocked` is treated as a wall. Returns 0 if
/// `start` itself is blocked.
pub fn flood_space(view: &AiView, start: Cell, cap: usize, also_blocked: Option<Cell>) -> usize {
    let blocked = |cell: Cell| view.is_blocked(cell) || Some(cell) == also_blocked;
    if blocked(start) {
        return 0;
    }

    let mut frontier = VecDeque::from([start]);
    let mut visited = HashSet::from([start]);
    let mut count = 0;
    while let Some(cell) = frontier.pop_front() {
        count += 1;
        if count >= cap {
            break;
        }
        for heading in Heading::ALL {
            let next = heading.advance(cell, 1);
            if !blocked(next) && visited.insert(next) {
                frontier.push_back(next);
            }
        }
    }
    count
}

/// Whether an opponent sits on the line ahead of `pos` along `heading`
pub fn aligned_ahead(view: &AiView, heading: Heading) -> bool {
    let d = heading.delta();
    view.opponents.iter().any(|o| {
        let rel = o.pos - view.pos;
        // Same row or column, and in front
        (rel.x * d.y - rel.y * d.x) == 0 && rel.dot(d) > 0
    })
}

/// Closest pickup of an accepted kind within `range` cells
pub fn nearest_powerup(
    view: &AiView,
    range: i32,
    wanted: impl Fn(PowerUpKind) -> bool,
) -> Option<Cell> {
    view.powerups
        .iter()
        .filter(|p| wanted(p.kind))
        .map(|p| (manhattan(view.pos, p.pos), p.id, p.pos))
        .filter(|(dist, _, _)| *dist <= range)
        .min_by_key(|&(dist, id, _)| (dist, id))
        .map(|(_, _, pos)| pos)
}

/// Pick the best-scoring option (`scores[i]` belongs to `options[i]`).
/// Holding the current heading wins any tie it takes part in; other ties
/// are broken by `rng`.
fn choose(options: &[(Steer, Heading)], scores: &[f32], rng: &mut Pcg32) -> Steer {
    let best = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let tied: Vec<Steer> = options
        .iter()
        .zip(scores)
        .filter(|(_, score)| **score >= best)
        .map(|((steer, _), _)| *steer)
        .collect();
    match tied.len() {
        0 => Steer::Straight,
        _ if tied.contains(&Steer::Straight) => Steer::Straight,
        1 => tied[0],
        n => tied[rng.random_range(0..n)],
    }
}

/// Per-pilot seed derived from the round seed
pub fn pilot_seed(round_seed: u64, id: VehicleId) -> u64 {
    round_seed ^ (u64::from(id.0) + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Computer pilots of one round, keyed by vehicle
pub struct Roster {
    pilots: Vec<(VehicleId, Box<dyn Strategy>)>,
}

impl Roster {
    pub fn empty() -> Self {
        Self { pilots: Vec::new() }
    }

    /// One pilot for every AI vehicle in `state`
    pub fn for_match(state: &MatchState) -> Self {
        let pilots = state
            .vehicles
            .iter()
            .filter_map(|v| match v.pilot {
                PilotKind::Ai(difficulty) => {
                    Some((v.id, pilot_for(difficulty, pilot_seed(state.seed, v.id))))
                }
                PilotKind::Human { .. } => None,
            })
            .collect();
        Self { pilots }
    }

    pub fn len(&self) -> usize {
        self.pilots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pilots.is_empty()
    }

    /// Ask every living AI vehicle for its move and queue the commands
    pub fn queue_commands(&mut self, state: &MatchState, input: &mut TickInput) {
        for (id, pilot) in &mut self.pilots {
            let Some(view) = AiView::from_state(state, *id) else {
                continue;
            };
            let decision = pilot.decide(&view);
            match decision.steer {
                Steer::Straight => {}
                Steer::Left => input.push(*id, Command::Turn(Turn::Left)),
                Steer::Right => input.push(*id, Command::Turn(Turn::Right)),
            }
            if decision.fire {
                input.push(*id, Command::Fire);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Trail store with one-cell blockers, each under its own owner id
    pub fn blockers(cells: &[(i32, i32)]) -> TrailStore {
        let mut trails = TrailStore::new();
        for (i, &(x, y)) in cells.iter().enumerate() {
            trails
                .append(VehicleId(100 + i as u8), Cell::new(x, y))
                .unwrap();
        }
        trails
    }

    pub fn view<'a>(
        trails: &'a TrailStore,
        pos: (i32, i32),
        heading: Heading,
        opponent: (i32, i32),
    ) -> AiView<'a> {
        AiView {
            me: VehicleId(1),
            pos: Cell::new(pos.0, pos.1),
            heading,
            ammo: 0,
            shield: false,
            arena: Arena::default(),
            trails,
            opponents: vec![Opponent {
                id: VehicleId(0),
                pos: Cell::new(opponent.0, opponent.1),
                heading: Heading::West,
            }],
            powerups: &[],
        }
    }
}
