//! # treasure-hunt
//!
//! A grid treasure/bomb hunt for a small handheld: turn to move, press to
//! dig, shake to disarm.
//!
//! Nine grid levels grow from 2×2 to 4×4, each with a countdown; find the
//! required treasures, avoid bombs, then pick the right one of two chests.
//!
//! The crate splits into:
//! - **Game core**: [`game::Game`] state machine over [`grid::Grid`] and the
//!   [`disarm::Disarm`] mini game, configured by [`config::GameConfig`]
//! - **Input**: [`input::InputAggregator`] turns raw controls into debounced
//!   [`input::InputEvent`]s
//! - **Feedback**: [`feedback::dispatch`] maps game intents to
//!   [`leds::LedPattern`]s and [`sound::SoundEffect`]s
//! - **Rendering**: [`render::Renderer`] draws screens through a
//!   [`render::DisplaySink`], with [`display::GraphicsDisplay`] for
//!   `embedded-graphics` targets
//!
//! Everything above builds and tests on the host. The `board` feature adds
//! the Disobey 2026 badge drivers and the `treasure_hunt` firmware binary.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! let mut game = Game::new(GameConfig::default(), seed, input.shake_available())?;
//! loop {
//!     let now = clock.now();
//!     input.poll(now);
//!     let intents = game.update(now, &input.drain());
//!     feedback::dispatch(&intents, now, &mut leds, &mut melody, &mut motor);
//!     renderer.render(&game, now, &mut screen)?;
//! }
//! ```

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to every module.
mod fmt;

pub mod buttons;
pub mod config;
pub mod disarm;
pub mod display;
pub mod error;
pub mod feedback;
pub mod game;
pub mod grid;
pub mod input;
pub mod leds;
pub mod render;
pub mod rng;
pub mod sound;
pub mod time;
pub mod vibration;

#[cfg(feature = "board")]
pub mod board;
#[cfg(feature = "board")]
pub use board::{
    BacklightResources,
    ButtonResources,
    DisplayResources,
    LedResources,
    Resources,
    VibrationResources,
};

pub use config::{
    DifficultyConfig,
    GameConfig,
    LevelConfig,
};
pub use display::GraphicsDisplay;
pub use error::{
    ConfigError,
    PeripheralUnavailable,
};
pub use game::{
    Game,
    Phase,
};
pub use input::{
    InputAggregator,
    InputEvent,
};
pub use leds::LedAnimator;
pub use render::Renderer;
pub use sound::MelodyPlayer;
pub use time::Clock;
pub use vibration::Vibration;
