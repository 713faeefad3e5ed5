//! Fixed timestep simulation tick
//!
//! Core round loop that advances the match deterministically.

use serde::{Deserialize, Serialize};

use super::collision;
use super::grid::{Heading, Turn};
use super::projectile::Projectile;
use super::state::{GameEvent, MatchState, RoundOutcome};
use super::vehicle::VehicleId;

/// A per-vehicle command for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Relative quarter turn
    Turn(Turn),
    /// Absolute heading (reverse and same-heading requests are ignored)
    Steer(Heading),
    /// Fire a pulse shot if ammo is available
    Fire,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Commands in arrival order; for turns the last one per vehicle wins
    pub commands: Vec<(VehicleId, Command)>,
}

impl TickInput {
    pub fn push(&mut self, vehicle: VehicleId, command: Command) {
        self.commands.push((vehicle, command));
    }
}

/// Advance the round by one fixed timestep.
///
/// Returns the events produced by this tick. Does nothing once the round
/// has an outcome.
pub fn tick(state: &mut MatchState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.is_over() {
        return events;
    }

    state.time_ticks += 1;

    // Queue turns; firing waits until the turn is applied
    let mut shooters: Vec<VehicleId> = Vec::new();
    for &(id, command) in &input.commands {
        let Some(vehicle) = state.vehicle_mut(id) else {
            log::debug!("Ignoring command for unknown vehicle {}", id);
            continue;
        };
        if !vehicle.alive {
            continue;
        }
        match command {
            Command::Turn(turn) => vehicle.turn(turn),
            Command::Steer(heading) => {
                vehicle.steer(heading);
            }
            Command::Fire => shooters.push(id),
        }
    }

    for vehicle in state.vehicles.iter_mut().filter(|v| v.alive) {
        vehicle.apply_pending_turn();
        vehicle.tick_effects();
    }

    for id in shooters {
        fire(state, id, &mut events);
    }

    // 1. Projectiles
    collision::advance_projectiles(state, &mut events);

    // 2. Vehicles, one grid step per sub-step
    let budgets: Vec<(VehicleId, u32)> = state
        .vehicles
        .iter_mut()
        .map(|v| (v.id, v.step(dt)))
        .collect();
    let max_steps = budgets.iter().map(|(_, n)| *n).max().unwrap_or(0);
    for sub in 0..max_steps {
        let movers: Vec<VehicleId> = budgets
            .iter()
            .filter(|(_, n)| *n > sub)
            .map(|(id, _)| *id)
            .collect();
        collision::advance_vehicles(state, &movers, &mut events);
    }

    // Next pickup for the following ticks
    if state.powerups_enabled {
        spawn_powerups(state, &mut events);
    }

    if let Some(outcome) = check_round_end(state) {
        finish_round(state, outcome);
        events.push(GameEvent::RoundEnded(outcome));
    }

    // Ensure deterministic ordering
    state.normalize_order();
    events
}

fn fire(state: &mut MatchState, id: VehicleId, events: &mut Vec<GameEvent>) {
    let Some(vehicle) = state.vehicle_mut(id) else {
        return;
    };
    if !vehicle.try_fire() {
        return;
    }
    let (pos, heading) = (vehicle.pos, vehicle.heading);
    let projectile = state.next_entity_id();
    state
        .projectiles
        .push(Projectile::new(projectile, id, pos, heading));
    events.push(GameEvent::Shot {
        vehicle: id,
        projectile,
    });
}

fn spawn_powerups(state: &mut MatchState, events: &mut Vec<GameEvent>) {
    let tick = state.time_ticks;
    let arena = state.arena;
    let MatchState {
        rng,
        powerups,
        trails,
        vehicles,
        ..
    } = state;
    let occupied = |cell| trails.is_occupied(cell) || vehicles.iter().any(|v| v.pos == cell);
    if let Some(id) = powerups.tick(rng, &arena, tick, occupied) {
        if let Some(p) = powerups.active().iter().find(|p| p.id == id) {
            events.push(GameEvent::PowerUpSpawned {
                id,
                kind: p.kind,
                pos: p.pos,
            });
        }
    }
}

/// Round is over once at most one vehicle is left (none for a solo run)
pub fn check_round_end(state: &MatchState) -> Option<RoundOutcome> {
    let alive = state.alive_ids();
    match (alive.len(), state.vehicles.len()) {
        (0, _) => Some(RoundOutcome::Draw),
        (1, n) if n > 1 => Some(RoundOutcome::Winner(alive[0])),
        _ => None,
    }
}

fn finish_round(state: &mut MatchState, outcome: RoundOutcome) {
    state.outcome = Some(outcome);
    state.projectiles.clear();
    match outcome {
        RoundOutcome::Winner(id) => {
            if let Some(v) = state.vehicle_mut(id) {
                v.score += 1;
            }
            log::info!("Round over at tick {}: {} wins", state.time_ticks, id);
        }
        RoundOutcome::Draw => {
            log::info!("Round over at tick {}: draw", state.time_ticks);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;
    use crate::consts::SIM_DT;
    use crate::sim::powerup::PowerUpKind;
    use crate::sim::state::{Crash, MatchConfig};
    use crate::sim::vehicle::{EffectKind, PilotKind};
    use crate::is_adjacent;

    const P1: VehicleId = VehicleId(0);
    const P2: VehicleId = VehicleId(1);

    fn duel() -> MatchState {
        let mut config = MatchConfig::new(
            vec![PilotKind::Human { slot: 0 }, PilotKind::Human { slot: 1 }],
            12345,
        );
        config.powerups = false;
        let mut state = MatchState::new(&config);
        // P2 cruises north, well clear of everything for 60+ ticks
        state.place_vehicle(P2, Cell::new(100, 70), Heading::North);
        state
    }

    fn turn(id: VehicleId, turn: Turn) -> TickInput {
        TickInput {
            commands: vec![(id, Command::Turn(turn))],
        }
    }

    #[test]
    fn test_west_wall_at_tick_50() {
        let mut state = duel();
        state.place_vehicle(P1, Cell::new(49, 10), Heading::West);

        let input = TickInput::default();
        let mut ended_at = None;
        for _ in 0..60 {
            let events = tick(&mut state, &input, SIM_DT);
            if events.contains(&GameEvent::RoundEnded(RoundOutcome::Winner(P2))) {
                ended_at = Some(state.time_ticks);
                break;
            }
        }

        assert_eq!(ended_at, Some(50));
        assert_eq!(state.eliminations.len(), 1);
        assert_eq!(state.eliminations[0].vehicle, P1);
        assert_eq!(state.eliminations[0].tick, 50);
        assert_eq!(state.eliminations[0].cause, Crash::Wall);
        assert_eq!(state.vehicle(P2).unwrap().score, 1);
        assert_eq!(state.vehicle(P1).unwrap().score, 0);
    }

    #[test]
    fn test_shield_saves_once_on_own_trail() {
        let mut state = duel();
        state.place_vehicle(P1, Cell::new(20, 20), Heading::East);
        state
            .powerups
            .place(PowerUpKind::Shield, Cell::new(21, 20), 0);

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.vehicle(P1).unwrap().has_shield());

        // Loop back onto the start cell three ticks later
        tick(&mut state, &turn(P1, Turn::Right), SIM_DT);
        tick(&mut state, &turn(P1, Turn::Right), SIM_DT);
        let events = tick(&mut state, &turn(P1, Turn::Right), SIM_DT);

        let p1 = state.vehicle(P1).unwrap();
        assert!(p1.alive);
        assert!(!p1.has_shield());
        assert_eq!(p1.pos, Cell::new(20, 20));
        assert!(events.contains(&GameEvent::ShieldAbsorbed {
            vehicle: P1,
            cause: Crash::Trail { owners: vec![P1] },
        }));

        // Second trail hit is fatal
        let events = tick(&mut state, &turn(P1, Turn::Right), SIM_DT);
        assert!(!state.vehicle(P1).unwrap().alive);
        assert!(events.contains(&GameEvent::RoundEnded(RoundOutcome::Winner(P2))));
    }

    #[test]
    fn test_turning_never_self_collides() {
        let mut state = duel();
        state.place_vehicle(P1, Cell::new(30, 30), Heading::East);
        let turns = [Turn::Left, Turn::Left, Turn::Right, Turn::Right, Turn::Left];
        for t in turns {
            tick(&mut state, &turn(P1, t), SIM_DT);
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(state.vehicle(P1).unwrap().alive);
        assert!(state.eliminations.is_empty());
    }

    #[test]
    fn test_pulse_shot_eliminates_target() {
        let mut state = duel();
        state.place_vehicle(P1, Cell::new(10, 10), Heading::East);
        state.place_vehicle(P2, Cell::new(15, 10), Heading::East);
        state.vehicle_mut(P1).unwrap().ammo = 1;

        let fire = TickInput {
            commands: vec![(P1, Command::Fire)],
        };
        let events = tick(&mut state, &fire, SIM_DT);
        assert!(matches!(events[0], GameEvent::Shot { vehicle: P1, .. }));
        assert_eq!(state.vehicle(P1).unwrap().ammo, 0);

        for _ in 0..10 {
            if state.is_over() {
                break;
            }
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.outcome, Some(RoundOutcome::Winner(P1)));
        assert_eq!(
            state.eliminations[0].cause,
            Crash::Projectile { shooter: P1 }
        );
    }

    #[test]
    fn test_fire_without_ammo_does_nothing() {
        let mut state = duel();
        let fire = TickInput {
            commands: vec![(P1, Command::Fire)],
        };
        let events = tick(&mut state, &fire, SIM_DT);
        assert!(events.is_empty());
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_boosted_trail_stays_connected() {
        let mut state = duel();
        state.place_vehicle(P1, Cell::new(10, 40), Heading::East);
        state
            .vehicle_mut(P1)
            .unwrap()
            .apply_effect(EffectKind::SpeedBoost, 40);

        let mut last_len = state.trails.len(P1);
        for _ in 0..20 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            let len = state.trails.len(P1);
            assert!(len >= last_len);
            last_len = len;
        }
        // 1.5 cells per tick
        assert_eq!(last_len, 1 + 30);
        let points: Vec<_> = state.trails.points(P1).collect();
        assert!(points.windows(2).all(|w| is_adjacent(w[0], w[1])));
    }

    #[test]
    fn test_round_waits_for_last_survivor() {
        let config = MatchConfig::new(
            vec![
                PilotKind::Human { slot: 0 },
                PilotKind::Human { slot: 1 },
                PilotKind::Human { slot: 2 },
            ],
            3,
        );
        let mut state = MatchState::new(&config);
        state.vehicle_mut(VehicleId(0)).unwrap().eliminate();
        assert_eq!(check_round_end(&state), None);

        state.vehicle_mut(VehicleId(2)).unwrap().eliminate();
        assert_eq!(
            check_round_end(&state),
            Some(RoundOutcome::Winner(VehicleId(1)))
        );
    }

    #[test]
    fn test_no_ticks_after_outcome() {
        let mut state = duel();
        state.vehicle_mut(P1).unwrap().eliminate();
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.is_over());
        let at = state.time_ticks;

        assert!(tick(&mut state, &TickInput::default(), SIM_DT).is_empty());
        assert_eq!(state.time_ticks, at);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let config = MatchConfig::new(
            vec![PilotKind::Human { slot: 0 }, PilotKind::Human { slot: 1 }],
            99999,
        );
        let mut state1 = MatchState::new(&config);
        let mut state2 = MatchState::new(&config);
        let script = [
            turn(P1, Turn::Left),
            TickInput::default(),
            turn(P2, Turn::Right),
            TickInput::default(),
        ];

        for i in 0..400 {
            let input = &script[i % script.len()];
            let e1 = tick(&mut state1, input, SIM_DT);
            let e2 = tick(&mut state2, input, SIM_DT);
            assert_eq!(e1, e2);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.eliminations, state2.eliminations);
        assert_eq!(state1.outcome, state2.outcome);
    }
}
