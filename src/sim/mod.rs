//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by vehicle / entity ID)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod grid;
pub mod powerup;
pub mod projectile;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod trail;
pub mod vehicle;

pub use collision::{Move, detect_crashes};
pub use grid::{Arena, Heading, Turn};
pub use powerup::{PowerUp, PowerUpKind, PowerUpSpawner};
pub use projectile::Projectile;
pub use snapshot::{MatchSnapshot, Replay, ReplayFrame, ReplayVehicle, VehicleView};
pub use state::{
    Crash, Elimination, GameEvent, MatchConfig, MatchState, RoundOutcome, RoundSummary,
};
pub use tick::{Command, TickInput, check_round_end, tick};
pub use trail::{TrailQuery, TrailStore};
pub use vehicle::{ActiveEffect, EffectKind, HitOutcome, PilotKind, Vehicle, VehicleId};
