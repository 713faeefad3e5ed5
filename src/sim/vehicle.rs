//! Lightcycle vehicles and their timed effects

use std::fmt;

use serde::{Deserialize, Serialize};

use super::grid::{Heading, Turn};
use crate::Cell;
use crate::consts::{BASE_SPEED, SPEED_BOOST_MULTIPLIER};
use crate::settings::Difficulty;

/// Vehicle slot within a round (stable across the rounds of a tournament)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VehicleId(pub u8);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0 + 1)
    }
}

/// Who is driving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PilotKind {
    /// Human player, fed by input slot
    Human { slot: u8 },
    Ai(Difficulty),
}

/// Timed effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    SpeedBoost,
    Shield,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: EffectKind,
    pub remaining_ticks: u32,
}

/// What a collision did to a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Shield soaked the hit and is now gone
    Absorbed,
    Eliminated,
    /// Already out; nothing changed
    AlreadyDown,
}

/// A lightcycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub pilot: PilotKind,
    pub pos: Cell,
    pub heading: Heading,
    /// Base speed in cells per second (before effects)
    pub speed: f32,
    pub alive: bool,
    pub effects: Vec<ActiveEffect>,
    /// Pulse weapon shots left
    pub ammo: u32,
    /// Round wins in the current tournament
    pub score: u32,
    /// Heading to take at the start of the next tick
    #[serde(skip)]
    pending: Option<Heading>,
    /// Fractional cells travelled but not yet stepped
    #[serde(skip)]
    travel: f32,
}

impl Vehicle {
    pub fn new(id: VehicleId, pilot: PilotKind, pos: Cell, heading: Heading) -> Self {
        Self {
            id,
            pilot,
            pos,
            heading,
            speed: BASE_SPEED,
            alive: true,
            effects: Vec::new(),
            ammo: 0,
            score: 0,
            pending: None,
            travel: 0.0,
        }
    }

    /// Queue a relative quarter turn from the current heading
    pub fn turn(&mut self, turn: Turn) {
        self.pending = Some(self.heading.turned(turn));
    }

    /// Queue an absolute heading. Ignored if it is the current heading or
    /// its reverse.
    pub fn steer(&mut self, heading: Heading) -> bool {
        if heading == self.heading || heading.is_opposite(self.heading) {
            return false;
        }
        self.pending = Some(heading);
        true
    }

    pub fn pending_heading(&self) -> Option<Heading> {
        self.pending
    }

    /// Apply the queued turn, if any
    pub fn apply_pending_turn(&mut self) {
        if let Some(next) = self.pending.take() {
            if !next.is_opposite(self.heading) {
                self.heading = next;
            }
        }
    }

    /// Speed after power-up modifiers
    pub fn effective_speed(&self) -> f32 {
        if self.has_effect(EffectKind::SpeedBoost) {
            self.speed * SPEED_BOOST_MULTIPLIER
        } else {
            self.speed
        }
    }

    /// Accumulate `dt` seconds of travel; returns whole grid steps owed
    pub fn step(&mut self, dt: f32) -> u32 {
        if !self.alive {
            return 0;
        }
        self.travel += self.effective_speed() * dt;
        let steps = self.travel.floor();
        self.travel -= steps;
        steps as u32
    }

    /// Next cell along the heading
    #[inline]
    pub fn lead(&self) -> Cell {
        self.heading.advance(self.pos, 1)
    }

    pub fn advance_to(&mut self, cell: Cell) {
        self.pos = cell;
    }

    /// Insert or refresh an effect. Reapplying a kind resets its timer.
    pub fn apply_effect(&mut self, kind: EffectKind, duration: u32) {
        if let Some(effect) = self.effects.iter_mut().find(|e| e.kind == kind) {
            effect.remaining_ticks = duration;
        } else {
            self.effects.push(ActiveEffect {
                kind,
                remaining_ticks: duration,
            });
        }
    }

    pub fn has_effect(&self, kind: EffectKind) -> bool {
        self.effects
            .iter()
            .any(|e| e.kind == kind && e.remaining_ticks > 0)
    }

    pub fn has_shield(&self) -> bool {
        self.has_effect(EffectKind::Shield)
    }

    pub fn remove_effect(&mut self, kind: EffectKind) {
        self.effects.retain(|e| e.kind != kind);
    }

    /// Count effect timers down by one tick and drop expired ones
    pub fn tick_effects(&mut self) {
        for effect in &mut self.effects {
            effect.remaining_ticks = effect.remaining_ticks.saturating_sub(1);
        }
        self.effects.retain(|e| e.remaining_ticks > 0);
    }

    /// Mark eliminated. Returns false if already eliminated.
    pub fn eliminate(&mut self) -> bool {
        let was_alive = self.alive;
        self.alive = false;
        self.pending = None;
        was_alive
    }

    /// A collision that would eliminate this vehicle. The shield, if up,
    /// takes the hit instead and expires.
    pub fn take_hit(&mut self) -> HitOutcome {
        if !self.alive {
            return HitOutcome::AlreadyDown;
        }
        if self.has_shield() {
            self.remove_effect(EffectKind::Shield);
            return HitOutcome::Absorbed;
        }
        self.eliminate();
        HitOutcome::Eliminated
    }

    /// Use one pulse shot if available
    pub fn try_fire(&mut self) -> bool {
        if !self.alive || self.ammo == 0 {
            return false;
        }
        self.ammo -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use glam::IVec2;

    fn cycle() -> Vehicle {
        Vehicle::new(
            VehicleId(0),
            PilotKind::Human { slot: 0 },
            IVec2::new(10, 10),
            Heading::East,
        )
    }

    #[test]
    fn test_steer_rejects_reverse_and_same() {
        let mut v = cycle();
        assert!(!v.steer(Heading::West));
        assert!(!v.steer(Heading::East));
        assert!(v.pending_heading().is_none());

        assert!(v.steer(Heading::North));
        v.apply_pending_turn();
        assert_eq!(v.heading, Heading::North);
        assert_eq!(v.lead(), IVec2::new(10, 9));
    }

    #[test]
    fn test_last_turn_wins() {
        let mut v = cycle();
        v.turn(Turn::Left);
        v.turn(Turn::Right);
        v.apply_pending_turn();
        assert_eq!(v.heading, Heading::South);
    }

    #[test]
    fn test_step_one_cell_per_tick() {
        let mut v = cycle();
        for _ in 0..10 {
            assert_eq!(v.step(SIM_DT), 1);
        }
    }

    #[test]
    fn test_speed_boost_steps() {
        let mut v = cycle();
        v.apply_effect(EffectKind::SpeedBoost, 10);
        let steps: u32 = (0..4).map(|_| v.step(SIM_DT)).sum();
        assert_eq!(steps, 6);
    }

    #[test]
    fn test_effects_refresh_not_stack() {
        let mut v = cycle();
        v.apply_effect(EffectKind::Shield, 5);
        v.tick_effects();
        v.apply_effect(EffectKind::Shield, 5);
        assert_eq!(v.effects.len(), 1);
        assert_eq!(v.effects[0].remaining_ticks, 5);

        for _ in 0..5 {
            v.tick_effects();
        }
        assert!(!v.has_shield());
        assert!(v.effects.is_empty());
    }

    #[test]
    fn test_shield_absorbs_once() {
        let mut v = cycle();
        v.apply_effect(EffectKind::Shield, 70);
        assert_eq!(v.take_hit(), HitOutcome::Absorbed);
        assert!(v.alive);
        assert!(!v.has_shield());
        assert_eq!(v.take_hit(), HitOutcome::Eliminated);
        assert!(!v.alive);
    }

    #[test]
    fn test_eliminate_is_idempotent() {
        let mut v = cycle();
        assert!(v.eliminate());
        assert!(!v.eliminate());
        assert_eq!(v.take_hit(), HitOutcome::AlreadyDown);
        assert_eq!(v.step(SIM_DT), 0);
    }

    #[test]
    fn test_fire_uses_ammo() {
        let mut v = cycle();
        assert!(!v.try_fire());
        v.ammo = 2;
        assert!(v.try_fire());
        assert!(v.try_fire());
        assert!(!v.try_fire());
    }
}
