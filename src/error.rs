// src/error.rs
//! Crate-wide error type.
//!
//! Most of these never escape a turn: `Blocked`/`Occupied`/`NoStair`/
//! `EmptyInventoryTile` are "the action did not consume a turn" outcomes,
//! caught right where the action runs. `Io` and `Terminal` are the only
//! variants that make it up to `main`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Coordinates referred to a tile outside the fixed floor grid.
    #[error("coordinates out of bounds")]
    OutOfBounds,

    /// Destination tile has `blocks = true`.
    #[error("tile blocks movement")]
    Blocked,

    /// Destination tile already has an occupant.
    #[error("tile is occupied")]
    Occupied,

    /// Pick-up attempted on a tile with no items.
    #[error("nothing here to pick up")]
    EmptyInventoryTile,

    /// Stair action attempted on a tile that is not the matching staircase kind.
    #[error("no matching staircase here")]
    NoStair,

    /// I/O failure (terminal size query, log file, etc).
    #[error("I/O error: {0}")]
    Io(String),

    /// Terminal backend failed to initialize or flush.
    #[error("terminal error: {0}")]
    Terminal(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
