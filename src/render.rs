//! Game state to draw calls.
//!
//! [`Renderer`] knows the screen layouts; a [`DisplaySink`] knows how to put
//! text, the grid and a couple of icons on a panel. Layouts use a 128×64
//! logical space that the sink is free to scale.

use core::fmt::{
    self,
    Write as _,
};

use heapless::String;

use crate::{
    game::{
        Banner,
        DISARM_POINTS,
        Game,
        Phase,
    },
    grid::Grid,
    time::{
        Duration,
        Instant,
        ms,
        since,
    },
};

/// Logical screen width.
pub const WIDTH: i32 = 128;
/// Logical screen height.
pub const HEIGHT: i32 = 64;

/// Longest line any screen formats.
const LINE: usize = 24;

/// One step of the title chest opening.
const TITLE_FRAME: Duration = ms(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Icon {
    ChestClosed,
    ChestAjar,
    ChestOpen,
    Bomb,
}

/// Where frames end up. Drawing is buffered until [`DisplaySink::present`].
pub trait DisplaySink {
    type Error;

    fn clear(&mut self) -> Result<(), Self::Error>;
    /// `x`, `y` is the top-left corner of the first glyph.
    fn draw_text(&mut self, x: i32, y: i32, text: &str) -> Result<(), Self::Error>;
    /// Draws the grid with its cursor below the status line.
    fn draw_grid(&mut self, grid: &Grid) -> Result<(), Self::Error>;
    fn draw_icon(&mut self, icon: Icon, x: i32, y: i32) -> Result<(), Self::Error>;
    fn present(&mut self) -> Result<(), Self::Error>;
}

pub struct Renderer {
    refresh: Duration,
    last: Option<(u32, Instant)>,
    title_since: Option<Instant>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(ms(250))
    }
}

impl Renderer {
    /// `refresh` bounds how stale a countdown on screen can get.
    pub const fn new(refresh: Duration) -> Self {
        Self {
            refresh,
            last: None,
            title_since: None,
        }
    }

    /// Forces the next [`Renderer::render`] to draw.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Draws a frame if the game changed or the refresh interval passed.
    /// Returns whether a frame was presented.
    pub fn render<D>(&mut self, game: &Game, now: Instant, sink: &mut D) -> Result<bool, D::Error>
    where
        D: DisplaySink + ?Sized,
    {
        if let Some((revision, drawn_at)) = self.last
            && revision == game.revision()
            && since(now, drawn_at) < self.refresh
        {
            return Ok(false);
        }

        if game.phase() != Phase::Title {
            self.title_since = None;
        }

        sink.clear()?;
        if let Some(banner) = game.banner() {
            message(game, banner, sink)?;
        } else {
            match game.phase() {
                Phase::Title => {
                    let since_shown = since(now, *self.title_since.get_or_insert(now));
                    title(since_shown, sink)?;
                }
                Phase::Menu => menu(game, sink)?,
                Phase::Playing => playfield(game, sink)?,
                Phase::Disarming => disarm_prompt(game, now, sink)?,
                Phase::LevelClear => level_clear(game, sink)?,
                Phase::Final => final_pick(game, sink)?,
                Phase::Win => victory(game, sink)?,
                Phase::GameOver => game_over(game, sink)?,
            }
        }
        sink.present()?;

        self.last = Some((game.revision(), now));
        Ok(true)
    }
}

fn text<D>(sink: &mut D, x: i32, y: i32, args: fmt::Arguments<'_>) -> Result<(), D::Error>
where
    D: DisplaySink + ?Sized,
{
    let mut line = String::<LINE>::new();
    if line.write_fmt(args).is_err() {
        warn!("screen line truncated");
    }
    sink.draw_text(x, y, &line)
}

// ── Screens ────────────────────────────────────────────────────────────────

/// Title with the chest opening frame by frame, then the start prompt.
fn title<D: DisplaySink + ?Sized>(shown: Duration, sink: &mut D) -> Result<(), D::Error> {
    let frame = shown.ticks() / TITLE_FRAME.ticks();
    sink.draw_text(25, 10, "TREASURE")?;
    sink.draw_text(45, 22, "HUNT")?;
    let chest = match frame {
        0 => Icon::ChestClosed,
        1 => Icon::ChestAjar,
        _ => Icon::ChestOpen,
    };
    sink.draw_icon(chest, 25, 38)?;
    sink.draw_icon(Icon::Bomb, 85, 36)?;
    if frame >= 3 {
        sink.draw_text(28, 54, "PRESS BTN")?;
    }
    Ok(())
}

fn message<D: DisplaySink + ?Sized>(
    game: &Game,
    banner: Banner,
    sink: &mut D,
) -> Result<(), D::Error> {
    let run = game.run();
    match banner {
        Banner::GetReady => {
            sink.draw_text(50, 22, run.difficulty.name)?;
            sink.draw_text(28, 35, "GET READY")
        }
        Banner::LevelIntro => text(sink, 38, 28, format_args!("LEVEL {}", run.level)),
        Banner::FinalIntro => {
            sink.draw_text(42, 8, "FINAL!")?;
            sink.draw_icon(Icon::ChestClosed, 25, 26)?;
            sink.draw_icon(Icon::ChestClosed, 85, 26)?;
            sink.draw_text(32, 52, "PICK ONE")
        }
        Banner::Disarmed => {
            sink.draw_text(30, 22, "DISARMED!")?;
            text(sink, 32, 36, format_args!("+{} PTS", DISARM_POINTS))
        }
        Banner::DisarmFailed => sink.draw_text(40, 28, "FAILED!"),
        Banner::TimeUp => sink.draw_text(40, 28, "TIME UP!"),
        Banner::WrongChest => {
            sink.draw_text(40, 8, "WRONG!")?;
            sink.draw_icon(Icon::Bomb, 52, 24)
        }
        Banner::TryAgain => {
            sink.draw_text(30, 22, "TRY AGAIN")?;
            text(sink, 40, 36, format_args!("{} LEFT", run.health))
        }
        Banner::Correct => {
            sink.draw_text(32, 8, "CORRECT!")?;
            sink.draw_icon(Icon::ChestOpen, 50, 24)
        }
    }
}

fn menu<D: DisplaySink + ?Sized>(game: &Game, sink: &mut D) -> Result<(), D::Error> {
    sink.draw_text(20, 2, "SELECT MODE")?;
    for (index, difficulty) in game.config().difficulties.iter().enumerate() {
        let y = 16 + 14 * index as i32;
        let selected = index == usize::from(game.selection());
        if selected {
            sink.draw_text(5, y, ">")?;
        }
        text(
            sink,
            15,
            y,
            format_args!("{} {}HP", difficulty.name, difficulty.start_health),
        )?;
        if selected {
            text(sink, 95, y, format_args!("{}S", difficulty.level_seconds))?;
        }
    }
    sink.draw_text(30, 56, "BTN START")
}

/// Status line, then the grid.
fn playfield<D: DisplaySink + ?Sized>(game: &Game, sink: &mut D) -> Result<(), D::Error> {
    let run = game.run();
    let grid = game.grid();
    text(sink, 0, 0, format_args!("L{}", run.level))?;
    text(sink, 22, 0, format_args!("{}S", run.clock_seconds()))?;
    text(sink, 52, 0, format_args!("H:{}", run.health))?;
    text(
        sink,
        90,
        0,
        format_args!("{}/{}", grid.treasures_found(), grid.treasures_required()),
    )?;
    if game.disarm_available() {
        sink.draw_text(120, 0, "*")?;
    }
    sink.draw_grid(grid)
}

fn disarm_prompt<D: DisplaySink + ?Sized>(
    game: &Game,
    now: Instant,
    sink: &mut D,
) -> Result<(), D::Error> {
    let tenths = game.disarm().remaining(now).ticks() / 100;
    sink.draw_icon(Icon::Bomb, 52, 8)?;
    sink.draw_text(32, 30, "SHAKE TO")?;
    sink.draw_text(38, 42, "DISARM!")?;
    text(sink, 50, 54, format_args!("{}.{}S", tenths / 10, tenths % 10))
}

fn level_clear<D: DisplaySink + ?Sized>(game: &Game, sink: &mut D) -> Result<(), D::Error> {
    text(sink, 35, 22, format_args!("LEVEL {}", game.run().level))?;
    sink.draw_text(42, 36, "CLEAR!")
}

const CHEST_X: [i32; 2] = [20, 90];

fn final_pick<D: DisplaySink + ?Sized>(game: &Game, sink: &mut D) -> Result<(), D::Error> {
    let run = game.run();
    sink.draw_text(48, 0, "PICK!")?;
    text(sink, 52, 10, format_args!("H:{}", run.health))?;
    for x in CHEST_X {
        sink.draw_icon(Icon::ChestClosed, x, 26)?;
    }
    let selected = usize::from(game.final_choice().selected);
    text(
        sink,
        CHEST_X[selected] + 5,
        44,
        format_args!("{}", selected + 1),
    )?;
    text(sink, 55, 54, format_args!("{}S", run.clock_seconds()))
}

fn victory<D: DisplaySink + ?Sized>(game: &Game, sink: &mut D) -> Result<(), D::Error> {
    sink.draw_text(32, 8, "YOU WIN!")?;
    sink.draw_icon(Icon::ChestOpen, 50, 22)?;
    text(sink, 42, 52, format_args!("SC:{}", game.run().score))
}

fn game_over<D: DisplaySink + ?Sized>(game: &Game, sink: &mut D) -> Result<(), D::Error> {
    let run = game.run();
    sink.draw_text(28, 8, "GAME OVER")?;
    sink.draw_icon(Icon::Bomb, 52, 22)?;
    text(sink, 48, 44, format_args!("LV:{}", run.level))?;
    text(sink, 45, 54, format_args!("SC:{}", run.score))
}
