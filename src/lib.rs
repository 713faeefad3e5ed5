//! Lightgrid - a grid lightcycle arena
//!
//! Core modules:
//! - `sim`: Deterministic simulation (trails, vehicles, collisions, rounds)
//! - `ai`: Computer pilots, one strategy per difficulty
//! - `game`: Menu / match / tournament state machine
//! - `settings`, `highscores`: Plain data handed to and emitted by the core
//! - `audio`: Mapping from gameplay events to sound cues

pub mod ai;
pub mod audio;
pub mod error;
pub mod game;
pub mod highscores;
pub mod menu;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use game::{Game, GamePhase, InputEvent};
pub use highscores::HighScores;
pub use settings::{Difficulty, GameMode, Settings};

use glam::IVec2;

/// A grid cell in arena coordinates (x grows east, y grows south)
pub type Cell = IVec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (16 Hz grid cadence)
    pub const SIM_DT: f32 = 1.0 / 16.0;
    /// Maximum ticks per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Arena dimensions in cells
    pub const ARENA_WIDTH: i32 = 120;
    pub const ARENA_HEIGHT: i32 = 76;

    /// Base vehicle speed (cells per second, one cell per tick)
    pub const BASE_SPEED: f32 = 16.0;
    /// Speed multiplier while a speed boost is active
    pub const SPEED_BOOST_MULTIPLIER: f32 = 1.5;

    /// Effect durations in ticks
    pub const SPEED_BOOST_TICKS: u32 = 80;
    pub const SHIELD_TICKS: u32 = 70;
    /// Oldest trail points removed by one eraser pickup
    pub const ERASER_CELLS: usize = 35;
    /// Shots granted by one pulse weapon pickup
    pub const PULSE_AMMO: u32 = 3;

    /// Projectile cells travelled per tick
    pub const PROJECTILE_STEP: u32 = 2;
    pub const PROJECTILE_LIFETIME_TICKS: u32 = 60;

    /// Power-up spawning
    pub const POWERUP_SPAWN_INTERVAL: u32 = 170;
    pub const MAX_POWERUPS: usize = 3;
    pub const SPAWN_ATTEMPTS: u32 = 200;

    /// Side length (in cells) of one trail index bucket
    pub const TRAIL_BUCKET: i32 = 8;

    /// RoundOver / TournamentOver auto-advance (10 seconds)
    pub const SUMMARY_TIMEOUT_TICKS: u32 = 160;
}

/// Manhattan distance between two cells
#[inline]
pub fn manhattan(a: Cell, b: Cell) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Whether two cells are 4-neighbours
#[inline]
pub fn is_adjacent(a: Cell, b: Cell) -> bool {
    manhattan(a, b) == 1
}

/// Seconds of simulated time covered by a tick count
#[inline]
pub fn ticks_to_secs(ticks: u64) -> f32 {
    ticks as f32 * consts::SIM_DT
}
