//! Round state and core simulation types
//!
//! `MatchState` is the full entity set of one round. It is owned by the
//! coordinator for the round's lifetime and dropped when the round ends.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::grid::{Arena, Heading};
use super::powerup::{PowerUpKind, PowerUpSpawner};
use super::projectile::Projectile;
use super::trail::TrailStore;
use super::vehicle::{PilotKind, Vehicle, VehicleId};
use crate::{Cell, ticks_to_secs};

/// Why a vehicle was (or would have been) taken out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crash {
    Wall,
    /// Ran into trail; owners may include the vehicle itself
    Trail { owners: Vec<VehicleId> },
    /// Two vehicles met in the same cell or swapped cells
    HeadOn { other: VehicleId },
    Projectile { shooter: VehicleId },
}

impl Crash {
    pub fn label(&self) -> &'static str {
        match self {
            Crash::Wall => "Wall crash",
            Crash::Trail { .. } => "Trail crash",
            Crash::HeadOn { .. } => "Head-on collision",
            Crash::Projectile { .. } => "Pulse hit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Elimination {
    pub vehicle: VehicleId,
    pub tick: u64,
    pub cause: Crash,
}

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    Winner(VehicleId),
    /// Nobody left alive (simultaneous crash)
    Draw,
}

impl RoundOutcome {
    pub fn winner(&self) -> Option<VehicleId> {
        match self {
            RoundOutcome::Winner(id) => Some(*id),
            RoundOutcome::Draw => None,
        }
    }
}

/// Discrete notifications emitted after a tick completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Shot { vehicle: VehicleId, projectile: u32 },
    PowerUpSpawned { id: u32, kind: PowerUpKind, pos: Cell },
    PowerUpCollected { vehicle: VehicleId, kind: PowerUpKind },
    TrailErased { vehicle: VehicleId, removed: usize },
    ShieldAbsorbed { vehicle: VehicleId, cause: Crash },
    VehicleEliminated { vehicle: VehicleId, cause: Crash },
    RoundEnded(RoundOutcome),
    MenuNavigate,
    TournamentOver { winner: Option<VehicleId> },
}

/// Setup for one round
#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub arena: Arena,
    /// One entry per vehicle, in slot order
    pub pilots: Vec<PilotKind>,
    /// Tournament wins carried into the round, per slot
    pub scores: Vec<u32>,
    pub seed: u64,
    pub powerups: bool,
}

impl MatchConfig {
    pub fn new(pilots: Vec<PilotKind>, seed: u64) -> Self {
        Self {
            arena: Arena::default(),
            scores: vec![0; pilots.len()],
            pilots,
            seed,
            powerups: true,
        }
    }
}

/// Round summary for the result screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundSummary {
    pub outcome: RoundOutcome,
    pub ticks: u64,
    pub duration_secs: f32,
    /// Cause of the first elimination
    pub crash: Option<Crash>,
    pub eliminations: Vec<Elimination>,
    pub trail_lengths: Vec<(VehicleId, usize)>,
}

/// Complete round state (deterministic for a seed and input sequence)
#[derive(Debug, Clone)]
pub struct MatchState {
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub arena: Arena,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Vehicles (sorted by id for determinism)
    pub vehicles: Vec<Vehicle>,
    pub trails: TrailStore,
    /// Projectiles in flight (sorted by id)
    pub projectiles: Vec<Projectile>,
    pub powerups: PowerUpSpawner,
    pub powerups_enabled: bool,
    /// Elimination order
    pub eliminations: Vec<Elimination>,
    pub outcome: Option<RoundOutcome>,
    next_id: u32,
}

impl MatchState {
    pub fn new(config: &MatchConfig) -> Self {
        let count = config.pilots.len();
        let mut state = Self {
            seed: config.seed,
            rng: Pcg32::seed_from_u64(config.seed),
            arena: config.arena,
            time_ticks: 0,
            vehicles: Vec::with_capacity(count),
            trails: TrailStore::new(),
            projectiles: Vec::new(),
            powerups: PowerUpSpawner::default(),
            powerups_enabled: config.powerups,
            eliminations: Vec::new(),
            outcome: None,
            next_id: 1,
        };

        for (i, pilot) in config.pilots.iter().enumerate() {
            let id = VehicleId(i as u8);
            let (pos, heading) = config.arena.spawn_point(i, count);
            let mut vehicle = Vehicle::new(id, *pilot, pos, heading);
            vehicle.score = config.scores.get(i).copied().unwrap_or(0);
            state.vehicles.push(vehicle);
            if let Err(e) = state.trails.append(id, pos) {
                log::warn!("Spawn point rejected: {}", e);
            }
        }

        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn vehicle_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.iter_mut().find(|v| v.id == id)
    }

    pub fn alive_count(&self) -> usize {
        self.vehicles.iter().filter(|v| v.alive).count()
    }

    pub fn alive_ids(&self) -> Vec<VehicleId> {
        self.vehicles.iter().filter(|v| v.alive).map(|v| v.id).collect()
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Move a vehicle to a fresh start cell, restarting its trail there.
    /// For scripted setups between ticks.
    pub fn place_vehicle(&mut self, id: VehicleId, pos: Cell, heading: Heading) {
        let Some(vehicle) = self.vehicle_mut(id) else {
            return;
        };
        vehicle.pos = pos;
        vehicle.heading = heading;
        self.trails.clear(id);
        if let Err(e) = self.trails.append(id, pos) {
            log::warn!("Start point rejected: {}", e);
        }
    }

    pub fn summary(&self) -> Option<RoundSummary> {
        let outcome = self.outcome?;
        Some(RoundSummary {
            outcome,
            ticks: self.time_ticks,
            duration_secs: ticks_to_secs(self.time_ticks),
            crash: self.eliminations.first().map(|e| e.cause.clone()),
            eliminations: self.eliminations.clone(),
            trail_lengths: self
                .vehicles
                .iter()
                .map(|v| (v.id, self.trails.len(v.id)))
                .collect(),
        })
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.vehicles.sort_by_key(|v| v.id);
        self.projectiles.sort_by_key(|p| p.id);
    }
}
