//! Pulse weapon shots

use serde::{Deserialize, Serialize};

use super::grid::Heading;
use super::vehicle::VehicleId;
use crate::Cell;
use crate::consts::{PROJECTILE_LIFETIME_TICKS, PROJECTILE_STEP};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    /// Shooter. Only an id: the shooter may be eliminated while the shot
    /// is still in flight.
    pub owner: VehicleId,
    pub pos: Cell,
    pub heading: Heading,
    /// Cells per tick
    pub speed: u32,
    pub ttl_ticks: u32,
}

impl Projectile {
    pub fn new(id: u32, owner: VehicleId, pos: Cell, heading: Heading) -> Self {
        Self {
            id,
            owner,
            pos,
            heading,
            speed: PROJECTILE_STEP,
            ttl_ticks: PROJECTILE_LIFETIME_TICKS,
        }
    }

    /// Cells crossed this tick, in order
    pub fn path(&self) -> impl Iterator<Item = Cell> + '_ {
        (1..=self.speed as i32).map(move |i| self.heading.advance(self.pos, i))
    }

    /// Burn one tick of lifetime. Returns false once expired.
    pub fn age(&mut self) -> bool {
        self.ttl_ticks = self.ttl_ticks.saturating_sub(1);
        self.ttl_ticks > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;

    #[test]
    fn test_path_covers_every_cell() {
        let p = Projectile::new(1, VehicleId(0), IVec2::new(5, 5), Heading::North);
        let path: Vec<_> = p.path().collect();
        assert_eq!(path, vec![IVec2::new(5, 4), IVec2::new(5, 3)]);
    }

    #[test]
    fn test_lifetime_expires() {
        let mut p = Projectile::new(1, VehicleId(0), IVec2::ZERO, Heading::East);
        let mut ticks = 0;
        while p.age() {
            ticks += 1;
        }
        assert_eq!(ticks, PROJECTILE_LIFETIME_TICKS - 1);
    }
}
