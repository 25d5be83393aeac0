//! Error types.

use thiserror::Error;

/// Malformed level or difficulty configuration. Fatal at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    #[error("level {level}: {requested} items do not fit in {capacity} cells")]
    Overfilled {
        level: u8,
        requested: usize,
        capacity: usize,
    },
    #[error("level {level}: grid {width}x{height} is outside 2x2..4x4")]
    GridSize { level: u8, width: u8, height: u8 },
    #[error("level {level}: {required} treasures required but {placed} placed")]
    Unclearable {
        level: u8,
        required: u8,
        placed: u8,
    },
    #[error("level {level} has fewer cells than the level before it")]
    ShrinkingGrid { level: u8 },
    #[error("difficulty {index} needs non-zero health and time limits")]
    Difficulty { index: u8 },
}

/// An optional peripheral did not answer. The feature it backs is switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("peripheral unavailable")]
pub struct PeripheralUnavailable;
