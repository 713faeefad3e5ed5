//! Power-up pickups and their spawner

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::grid::Arena;
use super::vehicle::VehicleId;
use crate::Cell;
use crate::consts::{MAX_POWERUPS, POWERUP_SPAWN_INTERVAL, SPAWN_ATTEMPTS};
use crate::error::{Error, Result};

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    SpeedBoost,
    Shield,
    TrailEraser,
    PulseWeapon,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::SpeedBoost,
        PowerUpKind::Shield,
        PowerUpKind::TrailEraser,
        PowerUpKind::PulseWeapon,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PowerUpKind::SpeedBoost => "Speed boost activated",
            PowerUpKind::Shield => "Shield online",
            PowerUpKind::TrailEraser => "Trail section erased",
            PowerUpKind::PulseWeapon => "Pulse weapon loaded",
        }
    }
}

/// An uncollected pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Cell,
    pub spawn_tick: u64,
}

/// Timed spawner; owns the active pickups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUpSpawner {
    pub interval_ticks: u32,
    pub max_active: usize,
    ticks_since_spawn: u32,
    active: Vec<PowerUp>,
    next_id: u32,
}

impl Default for PowerUpSpawner {
    fn default() -> Self {
        Self::new(POWERUP_SPAWN_INTERVAL, MAX_POWERUPS)
    }
}

impl PowerUpSpawner {
    pub fn new(interval_ticks: u32, max_active: usize) -> Self {
        Self {
            interval_ticks: interval_ticks.max(1),
            max_active,
            ticks_since_spawn: 0,
            active: Vec::new(),
            next_id: 1,
        }
    }

    /// Active pickups, ascending id
    pub fn active(&self) -> &[PowerUp] {
        &self.active
    }

    pub fn at(&self, cell: Cell) -> Option<&PowerUp> {
        self.active.iter().find(|p| p.pos == cell)
    }

    /// Put a pickup at a known cell
    pub fn place(&mut self, kind: PowerUpKind, pos: Cell, tick: u64) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.active.push(PowerUp {
            id,
            kind,
            pos,
            spawn_tick: tick,
        });
        id
    }

    /// Advance the spawn timer; on expiry try to place one pickup.
    ///
    /// `occupied` must report trail cells, vehicle cells and anything else
    /// a pickup may not sit on. Returns the new pickup's id, if any.
    pub fn tick(
        &mut self,
        rng: &mut Pcg32,
        arena: &Arena,
        tick: u64,
        occupied: impl Fn(Cell) -> bool,
    ) -> Option<u32> {
        self.ticks_since_spawn += 1;
        if self.ticks_since_spawn < self.interval_ticks {
            return None;
        }
        self.ticks_since_spawn = 0;
        if self.active.len() >= self.max_active {
            return None;
        }

        match self.try_spawn(rng, arena, tick, &occupied) {
            Ok(id) => Some(id),
            Err(e) => {
                log::debug!("Skipping power-up spawn: {}", e);
                None
            }
        }
    }

    fn try_spawn(
        &mut self,
        rng: &mut Pcg32,
        arena: &Arena,
        tick: u64,
        occupied: &impl Fn(Cell) -> bool,
    ) -> Result<u32> {
        let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
        for _ in 0..SPAWN_ATTEMPTS {
            let cell = Cell::new(
                rng.random_range(0..arena.width),
                rng.random_range(0..arena.height),
            );
            if occupied(cell) || self.at(cell).is_some() {
                continue;
            }
            let id = self.place(kind, cell, tick);
            log::debug!("Spawned {:?} #{} at {} (tick {})", kind, id, cell, tick);
            return Ok(id);
        }
        Err(Error::SpawnExhausted {
            attempts: SPAWN_ATTEMPTS,
        })
    }

    /// Remove a pickup on behalf of `vehicle`; returns its kind
    pub fn collect(&mut self, vehicle: VehicleId, instance: u32) -> Option<PowerUpKind> {
        let idx = self.active.iter().position(|p| p.id == instance)?;
        let pickup = self.active.remove(idx);
        log::debug!("{} collected {:?} #{}", vehicle, pickup.kind, pickup.id);
        Some(pickup.kind)
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.ticks_since_spawn = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;
    use rand::SeedableRng;

    #[test]
    fn test_spawn_on_interval_and_cap() {
        let mut rng = Pcg32::seed_from_u64(7);
        let arena = Arena::new(20, 20);
        let mut spawner = PowerUpSpawner::new(5, 2);

        let mut spawned = Vec::new();
        for t in 1..=30u64 {
            if let Some(id) = spawner.tick(&mut rng, &arena, t, |_| false) {
                spawned.push((t, id));
            }
        }
        assert_eq!(spawned.len(), 2);
        assert_eq!(spawned[0].0, 5);
        assert_eq!(spawned[1].0, 10);
        assert_eq!(spawner.active().len(), 2);
    }

    #[test]
    fn test_spawn_avoids_occupied() {
        let mut rng = Pcg32::seed_from_u64(11);
        let arena = Arena::new(4, 4);
        let mut spawner = PowerUpSpawner::new(1, 10);
        let free = IVec2::new(2, 3);

        let id = spawner.tick(&mut rng, &arena, 1, |c| c != free);
        assert!(id.is_some());
        assert_eq!(spawner.active()[0].pos, free);
    }

    #[test]
    fn test_spawn_exhausted_is_silent() {
        let mut rng = Pcg32::seed_from_u64(3);
        let arena = Arena::new(4, 4);
        let mut spawner = PowerUpSpawner::new(1, 10);

        assert!(spawner.tick(&mut rng, &arena, 1, |_| true).is_none());
        assert!(spawner.active().is_empty());
    }

    #[test]
    fn test_collect_removes_once() {
        let mut spawner = PowerUpSpawner::default();
        let id = spawner.place(PowerUpKind::Shield, IVec2::new(3, 3), 0);

        assert_eq!(spawner.collect(VehicleId(0), id), Some(PowerUpKind::Shield));
        assert_eq!(spawner.collect(VehicleId(1), id), None);
        assert!(spawner.at(IVec2::new(3, 3)).is_none());
    }

    #[test]
    fn test_deterministic_for_seed() {
        let arena = Arena::default();
        let run = || {
            let mut rng = Pcg32::seed_from_u64(42);
            let mut spawner = PowerUpSpawner::new(1, 3);
            for t in 1..=3 {
                spawner.tick(&mut rng, &arena, t, |_| false);
            }
            spawner
                .active()
                .iter()
                .map(|p| (p.kind, p.pos))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
