//! Error taxonomy for the simulation core
//!
//! None of these are fatal: callers log them and carry on with a safe
//! fallback (discarded move, skipped spawn, clamped setting, defaults).

use crate::Cell;
use crate::sim::VehicleId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{vehicle}: point {point} is not adjacent to trail end {last}")]
    InvalidAppend {
        vehicle: VehicleId,
        last: Cell,
        point: Cell,
    },

    #[error("no free cell for a power-up after {attempts} attempts")]
    SpawnExhausted { attempts: u32 },

    #[error("setting `{field}` out of range: {value}")]
    ConfigOutOfRange { field: &'static str, value: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
