//! Per-level treasure grid.
//!
//! Cells are stored row-major. The cursor is a single row-major index, so
//! moving it is a rotation over the whole grid rather than a per-row wrap.

use heapless::Vec;

use crate::{
    config::{
        LevelConfig,
        MAX_CELLS,
        MAX_SIDE,
    },
    error::ConfigError,
    rng::Rng,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CellKind {
    Empty,
    Treasure,
    Bomb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cell {
    pub kind: CellKind,
    pub revealed: bool,
}

impl Cell {
    const EMPTY: Self = Self {
        kind: CellKind::Empty,
        revealed: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Left,
    Right,
}

/// Column and row of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    pub x: u8,
    pub y: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u8,
    height: u8,
    cells: Vec<Cell, MAX_CELLS>,
    cursor: usize,
    treasures_found: u8,
    treasures_required: u8,
}

impl Grid {
    /// Lays out a level. The same `seed` always gives the same layout.
    ///
    /// Any size from 1x1 up to 4x4 is accepted here; the tighter level
    /// limits are enforced by [`LevelConfig::validate`].
    pub fn generate(level: &LevelConfig, seed: u32) -> Result<Self, ConfigError> {
        if !(1..=MAX_SIDE).contains(&level.width) || !(1..=MAX_SIDE).contains(&level.height) {
            return Err(ConfigError::GridSize {
                level: 0,
                width: level.width,
                height: level.height,
            });
        }
        let capacity = level.cells();
        let requested = level.treasures as usize + level.bombs as usize;
        if requested > capacity {
            return Err(ConfigError::Overfilled {
                level: 0,
                requested,
                capacity,
            });
        }

        let mut order: Vec<u8, MAX_CELLS> = (0..capacity as u8).collect();
        Rng::new(seed).shuffle(&mut order);

        let mut cells: Vec<Cell, MAX_CELLS> = Vec::new();
        cells.resize(capacity, Cell::EMPTY).ok();
        for (n, &index) in order.iter().take(requested).enumerate() {
            cells[usize::from(index)].kind = if n < usize::from(level.treasures) {
                CellKind::Treasure
            } else {
                CellKind::Bomb
            };
        }

        Ok(Self {
            width: level.width,
            height: level.height,
            cells,
            cursor: 0,
            treasures_found: 0,
            treasures_required: level.required.min(level.treasures),
        })
    }

    pub const fn width(&self) -> u8 {
        self.width
    }

    pub const fn height(&self) -> u8 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Row-major index of the cursor.
    pub const fn cursor_index(&self) -> usize {
        self.cursor
    }

    pub fn cursor(&self) -> Position {
        self.position_of(self.cursor)
    }

    pub const fn treasures_found(&self) -> u8 {
        self.treasures_found
    }

    pub const fn treasures_required(&self) -> u8 {
        self.treasures_required
    }

    pub const fn is_cleared(&self) -> bool {
        self.treasures_found >= self.treasures_required
    }

    pub fn cell(&self, position: Position) -> Option<&Cell> {
        self.index_of(position).map(|index| &self.cells[index])
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn count(&self, kind: CellKind) -> usize {
        self.cells.iter().filter(|cell| cell.kind == kind).count()
    }

    pub fn position_of(&self, index: usize) -> Position {
        let width = usize::from(self.width);
        Position {
            x: (index % width) as u8,
            y: (index / width) as u8,
        }
    }

    pub fn index_of(&self, position: Position) -> Option<usize> {
        (position.x < self.width && position.y < self.height)
            .then(|| usize::from(position.y) * usize::from(self.width) + usize::from(position.x))
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        let len = self.cells.len();
        self.cursor = match direction {
            Direction::Right => (self.cursor + 1) % len,
            Direction::Left => (self.cursor + len - 1) % len,
        };
    }

    /// Reveals the cell and reports what it holds.
    ///
    /// Revealing a cell twice is harmless: the second call only reports the
    /// kind again. Out-of-range positions report [`CellKind::Empty`].
    pub fn reveal(&mut self, position: Position) -> CellKind {
        let Some(index) = self.index_of(position) else {
            return CellKind::Empty;
        };
        let cell = &mut self.cells[index];
        if !cell.revealed {
            cell.revealed = true;
            if cell.kind == CellKind::Treasure {
                self.treasures_found += 1;
            }
        }
        cell.kind
    }

    pub fn is_revealed(&self, position: Position) -> bool {
        self.cell(position).is_some_and(|cell| cell.revealed)
    }
}
