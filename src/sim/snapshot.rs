//! Read-only views of a round for renderers and replay capture

use serde::{Deserialize, Serialize};

use super::grid::{Arena, Heading};
use super::powerup::PowerUp;
use super::projectile::Projectile;
use super::state::{MatchState, RoundOutcome};
use super::vehicle::{EffectKind, VehicleId};
use crate::Cell;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleView {
    pub id: VehicleId,
    pub pos: Cell,
    pub heading: Heading,
    pub alive: bool,
    pub shield: bool,
    pub boosted: bool,
    pub ammo: u32,
    pub score: u32,
}

/// Everything a renderer needs to draw one round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub tick: u64,
    pub arena: Arena,
    pub vehicles: Vec<VehicleView>,
    /// Trail points per vehicle, oldest first
    pub trails: Vec<(VehicleId, Vec<Cell>)>,
    pub projectiles: Vec<Projectile>,
    pub powerups: Vec<PowerUp>,
    pub outcome: Option<RoundOutcome>,
}

impl MatchState {
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            tick: self.time_ticks,
            arena: self.arena,
            vehicles: self.vehicle_views(),
            trails: self
                .vehicles
                .iter()
                .map(|v| (v.id, self.trails.points(v.id).collect()))
                .collect(),
            projectiles: self.projectiles.clone(),
            powerups: self.powerups.active().to_vec(),
            outcome: self.outcome,
        }
    }

    fn vehicle_views(&self) -> Vec<VehicleView> {
        self.vehicles
            .iter()
            .map(|v| VehicleView {
                id: v.id,
                pos: v.pos,
                heading: v.heading,
                alive: v.alive,
                shield: v.has_shield(),
                boosted: v.has_effect(EffectKind::SpeedBoost),
                ammo: v.ammo,
                score: v.score,
            })
            .collect()
    }
}

/// Vehicle state in a replay frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayVehicle {
    pub id: VehicleId,
    pub pos: Cell,
    pub heading: Heading,
    pub alive: bool,
    /// Points in the trail after this tick. A boosted tick grows it by more
    /// than one; an eraser shrinks it to this many newest points.
    pub trail_len: usize,
}

/// One recorded tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub tick: u64,
    pub vehicles: Vec<ReplayVehicle>,
    pub projectiles: Vec<(u32, Cell)>,
    pub powerups: Vec<(u32, Cell)>,
}

/// Per-tick recording of a session (output artifact only)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Replay {
    pub frames: Vec<ReplayFrame>,
}

impl Replay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, state: &MatchState) {
        self.frames.push(ReplayFrame {
            tick: state.time_ticks,
            vehicles: state
                .vehicles
                .iter()
                .map(|v| ReplayVehicle {
                    id: v.id,
                    pos: v.pos,
                    heading: v.heading,
                    alive: v.alive,
                    trail_len: state.trails.len(v.id),
                })
                .collect(),
            projectiles: state.projectiles.iter().map(|p| (p.id, p.pos)).collect(),
            powerups: state
                .powerups
                .active()
                .iter()
                .map(|p| (p.id, p.pos))
                .collect(),
        });
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::state::MatchConfig;
    use crate::sim::tick::{TickInput, tick};
    use crate::sim::vehicle::PilotKind;

    fn running() -> MatchState {
        let mut config = MatchConfig::new(
            vec![PilotKind::Human { slot: 0 }, PilotKind::Human { slot: 1 }],
            8,
        );
        config.powerups = false;
        let mut state = MatchState::new(&config);
        for _ in 0..5 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        state
    }

    #[test]
    fn test_snapshot_matches_state() {
        let state = running();
        let snap = state.snapshot();

        assert_eq!(snap.tick, 5);
        assert_eq!(snap.vehicles.len(), 2);
        assert_eq!(snap.trails[0].1.len(), 6);
        assert_eq!(snap.trails[0].1.last().copied(), Some(snap.vehicles[0].pos));
        assert!(snap.outcome.is_none());
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_string(&running().snapshot()).unwrap();
        assert!(json.contains("\"trails\""));
    }

    #[test]
    fn test_replay_records_heads() {
        let mut config = MatchConfig::new(
            vec![PilotKind::Human { slot: 0 }, PilotKind::Human { slot: 1 }],
            8,
        );
        config.powerups = false;
        let mut state = MatchState::new(&config);
        let mut replay = Replay::new();

        for _ in 0..3 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            replay.record(&state);
        }
        assert_eq!(replay.len(), 3);
        let ticks: Vec<u64> = replay.frames.iter().map(|f| f.tick).collect();
        assert_eq!(ticks, vec![1, 2, 3]);

        let restored = Replay::from_json(&replay.to_json().unwrap()).unwrap();
        assert_eq!(restored.frames, replay.frames);
    }

    #[test]
    fn test_replay_tracks_trail_length() {
        let mut state = running();
        let mut replay = Replay::new();
        replay.record(&state);
        assert_eq!(replay.frames[0].vehicles[0].trail_len, 6);

        state.trails.truncate(VehicleId(0), 2);
        tick(&mut state, &TickInput::default(), SIM_DT);
        replay.record(&state);

        let p1 = &replay.frames[1].vehicles[0];
        assert_eq!(p1.trail_len, 3);
        assert_eq!(p1.pos, state.vehicles[0].pos);
    }
}
