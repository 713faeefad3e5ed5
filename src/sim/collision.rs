//! Collision adjudication
//!
//! Runs in a fixed order every tick: projectiles first, then vehicle
//! movement sub-steps, with power-up pickup after each successful move.
//! Detection is a pure function of the pre-move state so vehicles moving in
//! the same sub-step are judged against the same picture.

use super::grid::Arena;
use super::powerup::PowerUpKind;
use super::state::{Crash, Elimination, GameEvent, MatchState};
use super::trail::TrailStore;
use super::vehicle::{EffectKind, HitOutcome, VehicleId};
use crate::Cell;
use crate::consts::{ERASER_CELLS, PULSE_AMMO, SHIELD_TICKS, SPEED_BOOST_TICKS};

/// One vehicle's attempted grid step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub vehicle: VehicleId,
    pub from: Cell,
    pub to: Cell,
}

/// Judge a batch of simultaneous moves.
///
/// Checks, per move: arena bounds, then trails (ignoring the mover's own
/// leading edge), then other movers landing on the same cell or swapping
/// cells with it. Each mover is judged on its own; the result lists only
/// movers that crashed, in input order.
pub fn detect_crashes(arena: &Arena, trails: &TrailStore, moves: &[Move]) -> Vec<(VehicleId, Crash)> {
    let mut crashes = Vec::new();
    for m in moves {
        if !arena.contains(m.to) {
            crashes.push((m.vehicle, Crash::Wall));
            continue;
        }

        let owners = trails.intersects(m.to, Some(m.vehicle));
        if !owners.is_empty() {
            crashes.push((
                m.vehicle,
                Crash::Trail {
                    owners: owners.into_iter().collect(),
                },
            ));
            continue;
        }

        let head_on = moves.iter().find(|o| {
            o.vehicle != m.vehicle && (o.to == m.to || (o.to == m.from && o.from == m.to))
        });
        if let Some(other) = head_on {
            crashes.push((
                m.vehicle,
                Crash::HeadOn {
                    other: other.vehicle,
                },
            ));
        }
    }
    crashes
}

/// Apply a would-be-fatal hit, honouring shields
pub fn resolve_hit(
    state: &mut MatchState,
    id: VehicleId,
    cause: Crash,
    events: &mut Vec<GameEvent>,
) -> HitOutcome {
    let tick = state.time_ticks;
    let Some(vehicle) = state.vehicle_mut(id) else {
        return HitOutcome::AlreadyDown;
    };

    let outcome = vehicle.take_hit();
    match outcome {
        HitOutcome::Absorbed => {
            log::debug!("{} shield absorbed {:?} at tick {}", id, cause, tick);
            events.push(GameEvent::ShieldAbsorbed { vehicle: id, cause });
        }
        HitOutcome::Eliminated => {
            log::info!("{} eliminated at tick {}: {}", id, tick, cause.label());
            state.eliminations.push(Elimination {
                vehicle: id,
                tick,
                cause: cause.clone(),
            });
            events.push(GameEvent::VehicleEliminated { vehicle: id, cause });
        }
        HitOutcome::AlreadyDown => {}
    }
    outcome
}

/// Step 1: move projectiles cell by cell; walls and vehicles stop them
pub fn advance_projectiles(state: &mut MatchState, events: &mut Vec<GameEvent>) {
    let projectiles = std::mem::take(&mut state.projectiles);
    let mut survivors = Vec::with_capacity(projectiles.len());

    for mut projectile in projectiles {
        let path: Vec<Cell> = projectile.path().collect();
        let mut live = true;

        for cell in path {
            if !state.arena.contains(cell) {
                live = false;
                break;
            }
            let target = state
                .vehicles
                .iter()
                .find(|v| v.alive && v.id != projectile.owner && v.pos == cell)
                .map(|v| v.id);
            if let Some(target) = target {
                resolve_hit(
                    state,
                    target,
                    Crash::Projectile {
                        shooter: projectile.owner,
                    },
                    events,
                );
                live = false;
                break;
            }
            projectile.pos = cell;
        }

        if live && projectile.age() {
            survivors.push(projectile);
        }
    }

    state.projectiles = survivors;
}

/// Step 2: one movement sub-step for `movers` (ascending id)
pub fn advance_vehicles(state: &mut MatchState, movers: &[VehicleId], events: &mut Vec<GameEvent>) {
    let moves: Vec<Move> = movers
        .iter()
        .filter_map(|id| state.vehicle(*id))
        .filter(|v| v.alive)
        .map(|v| Move {
            vehicle: v.id,
            from: v.pos,
            to: v.lead(),
        })
        .collect();

    let crashes = detect_crashes(&state.arena, &state.trails, &moves);

    for m in &moves {
        let crash = crashes
            .iter()
            .find(|(id, _)| *id == m.vehicle)
            .map(|(_, crash)| crash.clone());

        let proceed = match crash {
            None => true,
            Some(crash) => {
                let into_wall = crash == Crash::Wall;
                match resolve_hit(state, m.vehicle, crash, events) {
                    // A shield can't push through the arena edge; hold position
                    HitOutcome::Absorbed => !into_wall,
                    HitOutcome::Eliminated | HitOutcome::AlreadyDown => false,
                }
            }
        };

        if proceed {
            commit_move(state, *m, events);
        }
    }
}

fn commit_move(state: &mut MatchState, m: Move, events: &mut Vec<GameEvent>) {
    if let Err(e) = state.trails.append(m.vehicle, m.to) {
        log::warn!("Discarding move: {}", e);
        return;
    }
    if let Some(vehicle) = state.vehicle_mut(m.vehicle) {
        vehicle.advance_to(m.to);
    }

    // Driving into a shot in flight
    if let Some(idx) = state
        .projectiles
        .iter()
        .position(|p| p.pos == m.to && p.owner != m.vehicle)
    {
        let projectile = state.projectiles.remove(idx);
        let outcome = resolve_hit(
            state,
            m.vehicle,
            Crash::Projectile {
                shooter: projectile.owner,
            },
            events,
        );
        if outcome != HitOutcome::Absorbed {
            return;
        }
    }

    collect_powerup(state, m.vehicle, m.to, events);
}

/// Step 3: pick up whatever sits on `cell`
pub fn collect_powerup(
    state: &mut MatchState,
    id: VehicleId,
    cell: Cell,
    events: &mut Vec<GameEvent>,
) {
    let Some(instance) = state.powerups.at(cell).map(|p| p.id) else {
        return;
    };
    let Some(kind) = state.powerups.collect(id, instance) else {
        return;
    };
    events.push(GameEvent::PowerUpCollected { vehicle: id, kind });
    apply_powerup(state, id, kind, events);
}

/// Transfer a collected power-up onto the vehicle
pub fn apply_powerup(
    state: &mut MatchState,
    id: VehicleId,
    kind: PowerUpKind,
    events: &mut Vec<GameEvent>,
) {
    match kind {
        PowerUpKind::SpeedBoost => {
            if let Some(v) = state.vehicle_mut(id) {
                v.apply_effect(EffectKind::SpeedBoost, SPEED_BOOST_TICKS);
            }
        }
        PowerUpKind::Shield => {
            if let Some(v) = state.vehicle_mut(id) {
                v.apply_effect(EffectKind::Shield, SHIELD_TICKS);
            }
        }
        PowerUpKind::TrailEraser => {
            // Oldest points go; the head cell always stays
            let len = state.trails.len(id);
            let keep = len.saturating_sub(ERASER_CELLS).max(1);
            let removed = state.trails.truncate(id, keep);
            events.push(GameEvent::TrailErased {
                vehicle: id,
                removed,
            });
        }
        PowerUpKind::PulseWeapon => {
            if let Some(v) = state.vehicle_mut(id) {
                v.ammo += PULSE_AMMO;
            }
        }
    }
}
