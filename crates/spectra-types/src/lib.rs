//! Shared domain types for the Spectra match analysis workspace.

pub mod config;
pub mod game_type;
pub mod geometry;
pub mod killfeed;
pub mod player;
pub mod progress;
pub mod team;
pub mod validity;

mod errors;

pub use errors::{Result, SpectraError};
