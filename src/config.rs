//! Game tuning: difficulties, the nine grid levels and disarm timing.
//!
//! Everything starts from [`GameConfig::default`], which reproduces the
//! shipped game, and can be adjusted with the `with_*` setters before
//! [`GameConfig::validate`] runs at startup.

use crate::{
    error::ConfigError,
    time::{
        Duration,
        ms,
    },
};

/// Number of grid levels before the final chest choice.
pub const GRID_LEVELS: usize = 9;

/// The final level, where one of two chests is picked.
pub const FINAL_LEVEL: u8 = 10;

/// Number of selectable difficulties.
pub const DIFFICULTY_COUNT: usize = 3;

/// Largest grid side.
pub const MAX_SIDE: u8 = 4;

/// Largest grid, in cells.
pub const MAX_CELLS: usize = (MAX_SIDE as usize) * (MAX_SIDE as usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DifficultyConfig {
    pub name: &'static str,
    pub start_health: u8,
    pub level_seconds: u16,
    /// Countdown for the final chest choice.
    pub final_seconds: u16,
    pub shake_enabled: bool,
}

impl DifficultyConfig {
    pub const EASY: Self = Self {
        name: "EASY",
        start_health: 6,
        level_seconds: 60,
        final_seconds: 30,
        shake_enabled: true,
    };
    pub const MEDIUM: Self = Self {
        name: "MED",
        start_health: 4,
        level_seconds: 30,
        final_seconds: 15,
        shake_enabled: false,
    };
    pub const HARD: Self = Self {
        name: "HARD",
        start_health: 2,
        level_seconds: 15,
        final_seconds: 15,
        shake_enabled: false,
    };

    #[must_use]
    pub const fn level_time(&self) -> Duration {
        ms(self.level_seconds as u64 * 1000)
    }

    #[must_use]
    pub const fn final_time(&self) -> Duration {
        ms(self.final_seconds as u64 * 1000)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LevelConfig {
    pub width: u8,
    pub height: u8,
    pub treasures: u8,
    pub bombs: u8,
    /// Treasures that must be found to clear the level.
    pub required: u8,
}

impl LevelConfig {
    #[must_use]
    pub const fn new(width: u8, height: u8, treasures: u8, bombs: u8, required: u8) -> Self {
        Self {
            width,
            height,
            treasures,
            bombs,
            required,
        }
    }

    #[must_use]
    pub const fn cells(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Checks this entry on its own. `level` is 1-based and only used for reporting.
    pub fn validate(&self, level: u8) -> Result<(), ConfigError> {
        if !(2..=MAX_SIDE).contains(&self.width) || !(2..=MAX_SIDE).contains(&self.height) {
            return Err(ConfigError::GridSize {
                level,
                width: self.width,
                height: self.height,
            });
        }
        let requested = self.treasures as usize + self.bombs as usize;
        if requested > self.cells() {
            return Err(ConfigError::Overfilled {
                level,
                requested,
                capacity: self.cells(),
            });
        }
        if self.required == 0 || self.required > self.treasures {
            return Err(ConfigError::Unclearable {
                level,
                required: self.required,
                placed: self.treasures,
            });
        }
        Ok(())
    }
}

const DEFAULT_LEVELS: [LevelConfig; GRID_LEVELS] = [
    LevelConfig::new(2, 2, 2, 1, 1),
    LevelConfig::new(3, 2, 3, 2, 2),
    LevelConfig::new(3, 2, 3, 2, 2),
    LevelConfig::new(3, 3, 4, 3, 2),
    LevelConfig::new(3, 3, 4, 3, 3),
    LevelConfig::new(4, 3, 5, 4, 3),
    LevelConfig::new(4, 3, 5, 5, 3),
    LevelConfig::new(4, 4, 6, 5, 4),
    LevelConfig::new(4, 4, 6, 6, 4),
];

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub difficulties: [DifficultyConfig; DIFFICULTY_COUNT],
    pub levels: [LevelConfig; GRID_LEVELS],
    /// Shake magnitude that counts as a disarm gesture.
    pub shake_threshold: f32,
    /// Window for the disarm gesture.
    pub shake_duration: Duration,
    /// Period of the ticking sound while a bomb is armed.
    pub disarm_tick: Duration,
    /// How long the "level clear" banner stays up.
    pub level_clear_banner: Duration,
    /// Hold for "GET READY", "LEVEL n" and the final intro. Zero skips them.
    pub intro_banner: Duration,
    /// Hold for outcome messages such as "TIME UP!". Zero skips them.
    pub message_banner: Duration,
    /// Remaining whole seconds at and below which a warning beeps each second.
    pub warning_seconds: u16,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            difficulties: [
                DifficultyConfig::EASY,
                DifficultyConfig::MEDIUM,
                DifficultyConfig::HARD,
            ],
            levels: DEFAULT_LEVELS,
            shake_threshold: 2.0,
            shake_duration: ms(3000),
            disarm_tick: ms(500),
            level_clear_banner: ms(1500),
            intro_banner: ms(1000),
            message_banner: ms(1200),
            warning_seconds: 5,
        }
    }
}

impl GameConfig {
    #[must_use]
    pub fn with_difficulty(mut self, index: usize, difficulty: DifficultyConfig) -> Self {
        self.difficulties[index] = difficulty;
        self
    }

    #[must_use]
    pub fn with_levels(mut self, levels: [LevelConfig; GRID_LEVELS]) -> Self {
        self.levels = levels;
        self
    }

    /// Uses `level` for all nine grid levels.
    #[must_use]
    pub fn with_uniform_levels(self, level: LevelConfig) -> Self {
        self.with_levels([level; GRID_LEVELS])
    }

    #[must_use]
    pub const fn with_shake_threshold(mut self, threshold: f32) -> Self {
        self.shake_threshold = threshold;
        self
    }

    #[must_use]
    pub const fn with_shake_duration(mut self, duration: Duration) -> Self {
        self.shake_duration = duration;
        self
    }

    #[must_use]
    pub const fn with_disarm_tick(mut self, period: Duration) -> Self {
        self.disarm_tick = period;
        self
    }

    #[must_use]
    pub const fn with_level_clear_banner(mut self, banner: Duration) -> Self {
        self.level_clear_banner = banner;
        self
    }

    #[must_use]
    pub const fn with_banners(mut self, intro: Duration, message: Duration) -> Self {
        self.intro_banner = intro;
        self.message_banner = message;
        self
    }

    #[must_use]
    pub const fn with_warning_seconds(mut self, seconds: u16) -> Self {
        self.warning_seconds = seconds;
        self
    }

    /// Level `n`, 1-based. Panics outside `1..=9`.
    #[must_use]
    pub fn level(&self, n: u8) -> &LevelConfig {
        &self.levels[usize::from(n - 1)]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, difficulty) in self.difficulties.iter().enumerate() {
            if difficulty.start_health == 0
                || difficulty.level_seconds == 0
                || difficulty.final_seconds == 0
            {
                return Err(ConfigError::Difficulty { index: index as u8 });
            }
        }

        let mut previous_cells = 0;
        for (index, level) in self.levels.iter().enumerate() {
            let number = index as u8 + 1;
            level.validate(number)?;
            if level.cells() < previous_cells {
                return Err(ConfigError::ShrinkingGrid { level: number });
            }
            previous_cells = level.cells();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn overfilled_level_is_rejected() {
        let config = GameConfig::default().with_uniform_levels(LevelConfig::new(2, 2, 3, 2, 1));
        assert_eq!(
            config.validate(),
            Err(ConfigError::Overfilled {
                level: 1,
                requested: 5,
                capacity: 4,
            })
        );
    }

    #[test]
    fn shrinking_levels_are_rejected() {
        let mut levels = DEFAULT_LEVELS;
        levels[4] = LevelConfig::new(2, 2, 1, 1, 1);
        let config = GameConfig::default().with_levels(levels);
        assert_eq!(config.validate(), Err(ConfigError::ShrinkingGrid { level: 5 }));
    }

    #[test]
    fn unclearable_level_is_rejected() {
        let config = GameConfig::default().with_uniform_levels(LevelConfig::new(2, 2, 1, 1, 2));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Unclearable { level: 1, .. })
        ));
    }

    #[test]
    fn zero_health_difficulty_is_rejected() {
        let broken = DifficultyConfig {
            start_health: 0,
            ..DifficultyConfig::HARD
        };
        let config = GameConfig::default().with_difficulty(2, broken);
        assert_eq!(config.validate(), Err(ConfigError::Difficulty { index: 2 }));
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let config = GameConfig::default().with_uniform_levels(LevelConfig::new(5, 2, 1, 1, 1));
        assert!(matches!(config.validate(), Err(ConfigError::GridSize { .. })));
    }
}
