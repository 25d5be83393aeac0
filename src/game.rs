//! The game state machine.
//!
//! [`Game::update`] is called once per loop iteration with that iteration's
//! instant and input events. Events are handled first, in order, and only
//! then do the timers advance. A tick that already cost health never also
//! charges a timeout; the expiry is picked up on the following tick.
//!
//! Outcome messages and intros are timed [`Banner`]s. While one is up the
//! game takes no input and its clock stands still.
//!
//! The game never touches hardware. Everything observable comes out as
//! [`Intent`]s for the feedback dispatcher, plus read accessors for the
//! renderer.

use core::mem;

use heapless::Vec;

use crate::{
    config::{
        DIFFICULTY_COUNT,
        DifficultyConfig,
        FINAL_LEVEL,
        GRID_LEVELS,
        GameConfig,
    },
    disarm::{
        Disarm,
        DisarmOutcome,
        DisarmStep,
    },
    error::ConfigError,
    feedback::{
        HealthTier,
        Intent,
    },
    grid::{
        CellKind,
        Direction,
        Grid,
    },
    input::InputEvent,
    rng::Rng,
    time::{
        Duration,
        Instant,
        ms,
        since,
    },
};

/// Points for each treasure dug up.
pub const TREASURE_POINTS: u32 = 50;
/// Points for a successful disarm.
pub const DISARM_POINTS: u32 = 100;
/// Base points for clearing a level, before the time bonus.
pub const LEVEL_POINTS: u32 = 100;
/// Time bonus per whole second left on the clock.
pub const POINTS_PER_SECOND: u32 = 2;
/// Points for picking the right chest.
pub const FINAL_POINTS: u32 = 500;

/// Most intents a single update can raise.
pub const MAX_INTENTS: usize = 16;

pub type Intents = Vec<Intent, MAX_INTENTS>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Title screen, waiting for the first press.
    Title,
    Menu,
    Playing,
    Disarming,
    LevelClear,
    Final,
    Win,
    GameOver,
}

/// Per-run bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunState {
    pub health: u8,
    pub score: u32,
    /// 1..=9 on grid levels, 10 for the chest choice.
    pub level: u8,
    pub time_remaining: Duration,
    pub difficulty: DifficultyConfig,
}

impl RunState {
    fn new(difficulty: DifficultyConfig) -> Self {
        Self {
            health: difficulty.start_health,
            score: 0,
            level: 1,
            time_remaining: difficulty.level_time(),
            difficulty,
        }
    }

    /// Whole seconds left, rounded down.
    #[must_use]
    pub fn seconds_left(&self) -> u32 {
        (self.time_remaining.ticks() / 1000) as u32
    }

    /// Seconds left as shown on the clock, rounded up.
    #[must_use]
    pub fn clock_seconds(&self) -> u32 {
        self.time_remaining.ticks().div_ceil(1000) as u32
    }

    #[must_use]
    pub const fn health_tier(&self) -> HealthTier {
        HealthTier::of(self.health, self.difficulty.start_health)
    }
}

/// The two-chest choice on level 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FinalChoice {
    pub selected: u8,
    pub treasure: u8,
}

/// A short message held on screen before play resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Banner {
    /// Difficulty name before level 1.
    GetReady,
    /// "LEVEL n" before each grid level.
    LevelIntro,
    /// Both chests before the final countdown starts.
    FinalIntro,
    Disarmed,
    DisarmFailed,
    TimeUp,
    WrongChest,
    /// Health left after a wrong chest.
    TryAgain,
    Correct,
}

impl Banner {
    const fn is_intro(self) -> bool {
        matches!(self, Self::GetReady | Self::LevelIntro | Self::FinalIntro)
    }

    const fn followed_by(self) -> Option<Self> {
        match self {
            Self::GetReady => Some(Self::LevelIntro),
            Self::WrongChest => Some(Self::TryAgain),
            _ => None,
        }
    }
}

pub struct Game {
    config: GameConfig,
    shake_available: bool,
    phase: Phase,
    selection: u8,
    run: RunState,
    grid: Grid,
    disarm: Disarm,
    final_choice: FinalChoice,
    clear_until: Instant,
    banner: Option<(Banner, Instant)>,
    last_update: Option<Instant>,
    last_warning: Option<u32>,
    timer_fresh: bool,
    hurt_this_tick: bool,
    rng: Rng,
    revision: u32,
    intents: Intents,
}

impl Game {
    /// Validates `config` and parks the game on the title screen.
    ///
    /// `shake_available` is false when no accelerometer answered; the disarm
    /// mini game is then off whatever the difficulty says.
    pub fn new(config: GameConfig, seed: u32, shake_available: bool) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = Rng::new(seed);
        let grid = Grid::generate(config.level(1), rng.next())?;
        let run = RunState::new(config.difficulties[0]);
        let disarm = Disarm::new(config.shake_duration, config.disarm_tick);

        let mut game = Self {
            config,
            shake_available,
            phase: Phase::Title,
            selection: 0,
            run,
            grid,
            disarm,
            final_choice: FinalChoice {
                selected: 0,
                treasure: 0,
            },
            clear_until: Instant::from_ticks(0),
            banner: None,
            last_update: None,
            last_warning: None,
            timer_fresh: false,
            hurt_this_tick: false,
            rng,
            revision: 0,
            intents: Vec::new(),
        };
        game.emit(Intent::Startup);
        info!("game ready, shake {}", shake_available);
        Ok(game)
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn run(&self) -> &RunState {
        &self.run
    }

    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    pub const fn disarm(&self) -> &Disarm {
        &self.disarm
    }

    pub const fn final_choice(&self) -> FinalChoice {
        self.final_choice
    }

    /// The message on screen, if any.
    pub fn banner(&self) -> Option<Banner> {
        self.banner.map(|(banner, _)| banner)
    }

    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Difficulty index highlighted in the menu.
    pub const fn selection(&self) -> u8 {
        self.selection
    }

    /// Bumped on every visible change.
    pub const fn revision(&self) -> u32 {
        self.revision
    }

    /// Whether a bomb on this run can be disarmed at all.
    pub const fn shake_enabled(&self) -> bool {
        self.shake_available && self.run.difficulty.shake_enabled
    }

    /// Whether the current level still offers a disarm.
    pub const fn disarm_available(&self) -> bool {
        self.disarm.eligible(self.shake_enabled())
    }

    // ── Update ─────────────────────────────────────────────────────────────

    /// Runs one tick: handles `events` in order, then advances timers.
    /// Returns the intents raised since the previous update.
    pub fn update(&mut self, now: Instant, events: &[InputEvent]) -> Intents {
        let elapsed = self.last_update.map_or(ms(0), |last| since(now, last));
        self.last_update = Some(now);
        self.hurt_this_tick = false;
        self.timer_fresh = false;
        self.expire_banner(now);

        for &event in events {
            if let Some(banner) = self.banner() {
                trace!("ignoring {} under {}", event, banner);
                continue;
            }
            let before = self.phase;
            self.handle(event, now);
            let settled = matches!(
                self.phase,
                Phase::LevelClear | Phase::Win | Phase::GameOver
            );
            if self.phase != before && settled {
                break;
            }
        }

        self.advance(now, elapsed);
        mem::take(&mut self.intents)
    }

    fn handle(&mut self, event: InputEvent, now: Instant) {
        match (self.phase, event) {
            (_, InputEvent::Nothing) => {}
            (Phase::Title, InputEvent::ButtonPress) => self.open_menu(),
            (Phase::Menu, InputEvent::RotateLeft) => self.select(DIFFICULTY_COUNT as u8 - 1),
            (Phase::Menu, InputEvent::RotateRight) => self.select(1),
            (Phase::Menu, InputEvent::ButtonPress) => self.start_run(now),
            (Phase::Playing, InputEvent::RotateLeft) => self.move_cursor(Direction::Left),
            (Phase::Playing, InputEvent::RotateRight) => self.move_cursor(Direction::Right),
            (Phase::Playing, InputEvent::ButtonPress) => self.dig(now),
            (Phase::Disarming, InputEvent::ShakeDetected) => {
                if let Some(outcome) = self.disarm.on_shake(now) {
                    self.resolve_disarm(outcome, now);
                }
            }
            (Phase::Final, InputEvent::RotateLeft | InputEvent::RotateRight) => {
                self.final_choice.selected ^= 1;
                self.emit(Intent::CursorMoved);
                self.touch();
            }
            (Phase::Final, InputEvent::ButtonPress) => self.open_chest(now),
            (Phase::Win | Phase::GameOver, InputEvent::ButtonPress) => self.back_to_menu(),
            (phase, event) => trace!("ignoring {} in {}", event, phase),
        }
    }

    fn advance(&mut self, now: Instant, elapsed: Duration) {
        if self.banner.is_some() {
            return;
        }
        match self.phase {
            Phase::Playing => {
                self.run_clock(elapsed);
                if self.run.time_remaining == ms(0) && !self.hurt_this_tick {
                    info!("time up on level {}", self.run.level);
                    self.emit(Intent::TimeUp);
                    self.show(Banner::TimeUp, now);
                    self.lose_health();
                    if self.phase == Phase::Playing {
                        // Same layout, fresh clock.
                        self.reset_clock(self.run.difficulty.level_time());
                    }
                }
            }
            Phase::Disarming => {
                // The level clock keeps running; an expiry waits until the
                // bomb is resolved.
                if !self.timer_fresh {
                    self.run.time_remaining = self.run.time_remaining.checked_sub(elapsed).unwrap_or(ms(0));
                }
                match self.disarm.tick(now) {
                    DisarmStep::Waiting => {}
                    DisarmStep::Tick => self.emit(Intent::DisarmTick),
                    DisarmStep::Resolved(outcome) => self.resolve_disarm(outcome, now),
                }
            }
            Phase::LevelClear => {
                if now >= self.clear_until {
                    self.next_level(now);
                }
            }
            Phase::Final => {
                self.run_clock(elapsed);
                if self.run.time_remaining == ms(0) && !self.hurt_this_tick {
                    info!("final choice timed out");
                    self.game_over();
                }
            }
            Phase::Title | Phase::Menu | Phase::Win | Phase::GameOver => {}
        }
    }

    // ── Transitions ────────────────────────────────────────────────────────

    fn open_menu(&mut self) {
        self.phase = Phase::Menu;
        self.emit(Intent::Confirm);
        self.emit(Intent::MenuSelect(self.selection));
        self.touch();
    }

    fn select(&mut self, step: u8) {
        self.selection = (self.selection + step) % DIFFICULTY_COUNT as u8;
        self.emit(Intent::MenuSelect(self.selection));
        self.touch();
    }

    fn start_run(&mut self, now: Instant) {
        let difficulty = self.config.difficulties[usize::from(self.selection)];
        info!("starting {} run", difficulty.name);
        self.run = RunState::new(difficulty);
        self.emit(Intent::RunStarted);
        self.emit(Intent::HealthTier(self.run.health_tier()));
        self.start_level();
        if self.phase == Phase::Playing {
            self.show(Banner::GetReady, now);
        }
    }

    fn start_level(&mut self) {
        let level = *self.config.level(self.run.level);
        match Grid::generate(&level, self.rng.next()) {
            Ok(grid) => self.grid = grid,
            Err(err) => {
                // Unreachable with a validated config.
                error!("level {} failed to generate: {}", self.run.level, err);
                self.game_over();
                return;
            }
        }
        self.disarm.reset();
        self.reset_clock(self.run.difficulty.level_time());
        self.phase = Phase::Playing;
        debug!(
            "level {}: {}x{}, need {}",
            self.run.level,
            level.width,
            level.height,
            level.required
        );
        self.touch();
    }

    fn move_cursor(&mut self, direction: Direction) {
        self.grid.move_cursor(direction);
        self.emit(Intent::CursorMoved);
        self.touch();
    }

    fn dig(&mut self, now: Instant) {
        let position = self.grid.cursor();
        if self.grid.is_revealed(position) {
            return;
        }
        self.touch();
        match self.grid.reveal(position) {
            CellKind::Empty => self.emit(Intent::Confirm),
            CellKind::Treasure => {
                self.add_score(TREASURE_POINTS);
                self.emit(Intent::FoundTreasure);
                if self.grid.is_cleared() {
                    self.clear_level(now);
                }
            }
            CellKind::Bomb => {
                if self.disarm.eligible(self.shake_enabled()) && self.disarm.arm(now) {
                    info!("bomb armed, shake to disarm");
                    self.phase = Phase::Disarming;
                    self.emit(Intent::DisarmStarted);
                } else {
                    self.emit(Intent::HitBomb);
                    self.lose_health();
                }
            }
        }
    }

    fn resolve_disarm(&mut self, outcome: DisarmOutcome, now: Instant) {
        self.disarm.cancel();
        self.phase = Phase::Playing;
        self.touch();
        match outcome {
            DisarmOutcome::Success => {
                info!("bomb disarmed");
                self.add_score(DISARM_POINTS);
                self.emit(Intent::DisarmSuccess);
                self.emit(Intent::HealthTier(self.run.health_tier()));
                self.show(Banner::Disarmed, now);
            }
            DisarmOutcome::Failure => {
                info!("disarm failed");
                self.emit(Intent::DisarmFailed);
                self.show(Banner::DisarmFailed, now);
                self.lose_health();
            }
        }
    }

    fn clear_level(&mut self, now: Instant) {
        let bonus = LEVEL_POINTS + POINTS_PER_SECOND * self.run.seconds_left();
        self.add_score(bonus);
        self.disarm.cancel();
        self.phase = Phase::LevelClear;
        self.clear_until = now + self.config.level_clear_banner;
        info!(
            "level {} cleared, +{} (score {})",
            self.run.level,
            bonus,
            self.run.score
        );
        self.emit(Intent::LevelCleared);
    }

    fn next_level(&mut self, now: Instant) {
        if usize::from(self.run.level) >= GRID_LEVELS {
            self.enter_final(now);
        } else {
            self.run.level += 1;
            self.start_level();
            if self.phase == Phase::Playing {
                self.show(Banner::LevelIntro, now);
            }
        }
    }

    fn enter_final(&mut self, now: Instant) {
        self.run.level = FINAL_LEVEL;
        self.final_choice = FinalChoice {
            selected: 0,
            treasure: u8::from(self.rng.coin()),
        };
        self.disarm.cancel();
        self.reset_clock(self.run.difficulty.final_time());
        self.phase = Phase::Final;
        info!("final level");
        self.emit(Intent::FinalStarted);
        self.show(Banner::FinalIntro, now);
    }

    fn open_chest(&mut self, now: Instant) {
        self.touch();
        if self.final_choice.selected == self.final_choice.treasure {
            self.add_score(FINAL_POINTS);
            self.phase = Phase::Win;
            info!("victory with {} points", self.run.score);
            self.emit(Intent::Victory);
            self.show(Banner::Correct, now);
        } else {
            self.emit(Intent::WrongChest);
            self.show(Banner::WrongChest, now);
            self.lose_health();
        }
    }

    fn back_to_menu(&mut self) {
        self.disarm.cancel();
        self.banner = None;
        self.run = RunState::new(self.config.difficulties[usize::from(self.selection)]);
        self.phase = Phase::Menu;
        self.emit(Intent::Confirm);
        self.emit(Intent::MenuSelect(self.selection));
        self.touch();
    }

    fn game_over(&mut self) {
        self.disarm.cancel();
        self.phase = Phase::GameOver;
        info!(
            "game over on level {} with {} points",
            self.run.level,
            self.run.score
        );
        self.emit(Intent::GameOver);
        self.touch();
    }

    // ── Bookkeeping ────────────────────────────────────────────────────────

    fn lose_health(&mut self) {
        self.run.health = self.run.health.saturating_sub(1);
        self.hurt_this_tick = true;
        self.touch();
        if self.run.health == 0 {
            self.game_over();
        } else if self.phase != Phase::Final {
            // The final choice keeps its own breathing light.
            self.emit(Intent::HealthTier(self.run.health_tier()));
        }
    }

    fn add_score(&mut self, points: u32) {
        self.run.score = self.run.score.saturating_add(points);
    }

    /// Puts `banner` up for its configured hold. A zero hold skips it.
    fn show(&mut self, banner: Banner, now: Instant) {
        let hold = if banner.is_intro() {
            self.config.intro_banner
        } else {
            self.config.message_banner
        };
        self.touch();
        if hold == ms(0) {
            self.banner = None;
            return;
        }
        debug!("banner {}", banner);
        self.banner = Some((banner, now + hold));
    }

    fn expire_banner(&mut self, now: Instant) {
        let Some((banner, until)) = self.banner else {
            return;
        };
        if now < until {
            return;
        }
        self.banner = None;
        self.timer_fresh = true;
        self.touch();
        if let Some(next) = banner.followed_by()
            && matches!(self.phase, Phase::Playing | Phase::Final)
        {
            self.show(next, now);
        }
    }

    fn reset_clock(&mut self, budget: Duration) {
        self.run.time_remaining = budget;
        self.last_warning = None;
        self.timer_fresh = true;
    }

    /// Counts down and raises the once-per-second warning near the end.
    fn run_clock(&mut self, elapsed: Duration) {
        if self.timer_fresh {
            return;
        }
        let before = self.run.clock_seconds();
        self.run.time_remaining = self.run.time_remaining.checked_sub(elapsed).unwrap_or(ms(0));
        let seconds = self.run.clock_seconds();
        if seconds != before {
            self.touch();
        }
        let warning = u32::from(self.config.warning_seconds);
        if (1..=warning).contains(&seconds) && self.last_warning != Some(seconds) {
            self.last_warning = Some(seconds);
            self.emit(Intent::TimeWarning);
        }
    }

    fn emit(&mut self, intent: Intent) {
        if self.intents.push(intent).is_err() {
            warn!("intent queue full, dropping {}", intent);
        }
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::LevelConfig,
        time::at,
    };

    /// Tuning with `level` everywhere and no banners in the way.
    fn quick(level: LevelConfig) -> GameConfig {
        GameConfig::default()
            .with_uniform_levels(level)
            .with_banners(ms(0), ms(0))
    }

    fn small_game(level: LevelConfig, difficulty: usize) -> Game {
        let mut game = Game::new(quick(level), 42, true).unwrap();
        game.update(at(0), &[InputEvent::ButtonPress]);
        for _ in 0..difficulty {
            game.update(at(0), &[InputEvent::RotateRight]);
        }
        game.update(at(0), &[InputEvent::ButtonPress]);
        game
    }

    /// Moves the cursor onto the first cell of `kind`.
    fn aim(game: &mut Game, kind: CellKind, now: Instant) {
        let target = game
            .grid()
            .cells()
            .iter()
            .position(|cell| cell.kind == kind && !cell.revealed)
            .unwrap();
        while game.grid().cursor_index() != target {
            game.update(now, &[InputEvent::RotateRight]);
        }
    }

    #[test]
    fn title_waits_for_a_press() {
        let mut game = Game::new(GameConfig::default(), 1, true).unwrap();
        game.update(at(0), &[InputEvent::RotateRight]);
        assert_eq!(game.phase(), Phase::Title);
        assert_eq!(game.selection(), 0);

        let intents = game.update(at(20), &[InputEvent::ButtonPress]);
        assert_eq!(game.phase(), Phase::Menu);
        assert_eq!(intents.as_slice(), [Intent::Confirm, Intent::MenuSelect(0)]);
    }

    #[test]
    fn menu_wraps_both_ways() {
        let mut game = Game::new(GameConfig::default(), 1, true).unwrap();
        game.update(at(0), &[InputEvent::ButtonPress]);
        game.update(at(0), &[InputEvent::RotateLeft]);
        assert_eq!(game.selection(), 2);
        game.update(at(0), &[InputEvent::RotateRight]);
        assert_eq!(game.selection(), 0);
    }

    #[test]
    fn first_update_reports_startup() {
        let mut game = Game::new(GameConfig::default(), 1, true).unwrap();
        let intents = game.update(at(0), &[]);
        assert_eq!(intents.as_slice(), [Intent::Startup]);
        assert!(game.update(at(20), &[]).is_empty());
    }

    #[test]
    fn start_run_uses_selected_difficulty() {
        let game = small_game(LevelConfig::new(2, 2, 1, 1, 1), 1);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.run().health, 4);
        assert_eq!(game.run().level, 1);
        assert_eq!(game.run().time_remaining, ms(30_000));
    }

    #[test]
    fn shake_outside_disarm_is_ignored() {
        let mut game = small_game(LevelConfig::new(2, 2, 1, 1, 1), 0);
        let before = *game.run();
        game.update(at(10), &[InputEvent::ShakeDetected]);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.run().score, before.score);
    }

    #[test]
    fn empty_dig_only_reveals() {
        let mut game = small_game(LevelConfig::new(2, 2, 1, 1, 1), 2);
        aim(&mut game, CellKind::Empty, at(0));
        game.update(at(0), &[InputEvent::ButtonPress]);
        assert_eq!(game.run().score, 0);
        assert_eq!(game.run().health, 2);
        assert!(game.grid().is_revealed(game.grid().cursor()));
    }

    #[test]
    fn timeout_keeps_layout_and_resets_clock() {
        let mut game = small_game(LevelConfig::new(2, 2, 1, 1, 1), 2);
        aim(&mut game, CellKind::Empty, at(0));
        game.update(at(0), &[InputEvent::ButtonPress]);
        let layout = game.grid().clone();

        let intents = game.update(at(15_000), &[]);
        assert!(intents.contains(&Intent::TimeUp));
        assert_eq!(game.run().health, 1);
        assert_eq!(game.run().time_remaining, ms(15_000));
        assert_eq!(game.grid(), &layout);
    }

    #[test]
    fn bomb_and_timeout_in_one_tick_cost_one_health() {
        let mut game = small_game(LevelConfig::new(2, 2, 1, 1, 1), 1);
        aim(&mut game, CellKind::Bomb, at(0));
        game.update(at(29_000), &[]);

        let intents = game.update(at(31_000), &[InputEvent::ButtonPress]);
        assert!(intents.contains(&Intent::HitBomb));
        assert!(!intents.contains(&Intent::TimeUp));
        assert_eq!(game.run().health, 3);

        // The expiry lands on the next tick.
        let intents = game.update(at(31_020), &[]);
        assert!(intents.contains(&Intent::TimeUp));
        assert_eq!(game.run().health, 2);
    }

    #[test]
    fn warning_beeps_once_per_second() {
        let mut game = small_game(LevelConfig::new(2, 2, 1, 1, 1), 2);
        let mut warnings = 0;
        for step in 1..=700 {
            let intents = game.update(at(step * 20), &[]);
            warnings += intents.iter().filter(|&&i| i == Intent::TimeWarning).count();
        }
        // 14s elapsed of 15: the clock has shown 5, 4, 3, 2 and 1.
        assert_eq!(warnings, 5);
    }

    #[test]
    fn game_over_returns_to_menu_on_press() {
        let mut game = small_game(LevelConfig::new(2, 2, 1, 2, 1), 2);
        aim(&mut game, CellKind::Bomb, at(0));
        game.update(at(0), &[InputEvent::ButtonPress]);
        aim(&mut game, CellKind::Bomb, at(0));
        game.update(at(0), &[InputEvent::ButtonPress]);
        assert_eq!(game.phase(), Phase::GameOver);

        game.update(at(100), &[InputEvent::ButtonPress]);
        assert_eq!(game.phase(), Phase::Menu);
        assert_eq!(game.run().score, 0);
    }

    #[test]
    fn press_after_game_over_in_same_tick_is_dropped() {
        let mut game = small_game(LevelConfig::new(2, 2, 1, 2, 1), 2);
        aim(&mut game, CellKind::Bomb, at(0));
        game.update(at(0), &[InputEvent::ButtonPress]);
        aim(&mut game, CellKind::Bomb, at(0));
        game.update(
            at(0),
            &[InputEvent::ButtonPress, InputEvent::ButtonPress],
        );
        assert_eq!(game.phase(), Phase::GameOver);
    }

    #[test]
    fn level_clear_banner_then_next_level() {
        let mut game = small_game(LevelConfig::new(2, 2, 1, 1, 1), 0);
        aim(&mut game, CellKind::Treasure, at(0));
        game.update(at(0), &[InputEvent::ButtonPress]);
        assert_eq!(game.phase(), Phase::LevelClear);

        game.update(at(1000), &[]);
        assert_eq!(game.phase(), Phase::LevelClear);
        game.update(at(1500), &[]);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.run().level, 2);
        assert_eq!(game.grid().treasures_found(), 0);
        assert!(game.disarm_available());
        assert_eq!(game.run().time_remaining, ms(60_000));
    }

    #[test]
    fn no_accelerometer_means_no_disarm() {
        let mut game = Game::new(quick(LevelConfig::new(2, 2, 1, 1, 1)), 42, false).unwrap();
        game.update(at(0), &[InputEvent::ButtonPress]);
        game.update(at(0), &[InputEvent::ButtonPress]);
        aim(&mut game, CellKind::Bomb, at(0));
        game.update(at(0), &[InputEvent::ButtonPress]);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.run().health, 5);
    }

    #[test]
    fn intro_banners_hold_input_and_clock() {
        let config = GameConfig::default().with_uniform_levels(LevelConfig::new(2, 2, 1, 1, 1));
        let mut game = Game::new(config, 42, true).unwrap();
        game.update(at(0), &[InputEvent::ButtonPress]);
        game.update(at(0), &[InputEvent::ButtonPress]);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.banner(), Some(Banner::GetReady));

        let intents = game.update(at(500), &[InputEvent::RotateRight]);
        assert!(intents.is_empty());
        assert_eq!(game.grid().cursor_index(), 0);

        game.update(at(1_000), &[]);
        assert_eq!(game.banner(), Some(Banner::LevelIntro));
        game.update(at(2_000), &[]);
        assert_eq!(game.banner(), None);
        assert_eq!(game.run().time_remaining, ms(60_000));

        game.update(at(2_020), &[InputEvent::RotateRight]);
        assert_eq!(game.grid().cursor_index(), 1);
        assert_eq!(game.run().time_remaining, ms(59_980));
    }

    #[test]
    fn disarm_result_is_announced() {
        let config = GameConfig::default()
            .with_uniform_levels(LevelConfig::new(2, 2, 1, 1, 1))
            .with_banners(ms(0), ms(1_200));
        let mut game = Game::new(config, 42, true).unwrap();
        game.update(at(0), &[InputEvent::ButtonPress]);
        game.update(at(0), &[InputEvent::ButtonPress]);
        aim(&mut game, CellKind::Bomb, at(0));
        game.update(at(0), &[InputEvent::ButtonPress]);
        assert_eq!(game.phase(), Phase::Disarming);

        game.update(at(1_000), &[InputEvent::ShakeDetected]);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.banner(), Some(Banner::Disarmed));

        game.update(at(2_199), &[]);
        assert_eq!(game.banner(), Some(Banner::Disarmed));
        game.update(at(2_200), &[]);
        assert_eq!(game.banner(), None);
    }

    #[test]
    fn timeout_on_last_health_ends_the_run() {
        let mut game = small_game(LevelConfig::new(2, 2, 1, 1, 1), 2);
        aim(&mut game, CellKind::Bomb, at(0));
        game.update(at(0), &[InputEvent::ButtonPress]);
        assert_eq!(game.run().health, 1);

        let intents = game.update(at(15_000), &[]);
        assert!(intents.contains(&Intent::TimeUp));
        assert!(intents.contains(&Intent::GameOver));
        assert_eq!(game.phase(), Phase::GameOver);
        assert_eq!(game.run().health, 0);
    }
}
