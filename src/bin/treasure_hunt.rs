//! Treasure hunt firmware for the Disobey 2026 badge.
//!
//! Controls:
//! - Left/Right: move the cursor (menu, grid, chests)
//! - A or B: dig / confirm
//!
//! The badge has no accelerometer, so shake-to-disarm stays off and bombs
//! always cost health. Sound effects play as vibration pulses.

#![no_std]
#![no_main]

use defmt::{
    error,
    info,
    warn,
};
use embassy_executor::Spawner;
use embassy_time::{
    Duration,
    Timer,
};
use esp_backtrace as _;
use esp_hal::{
    gpio::{
        Input,
        Output,
    },
    timer::timg::TimerGroup,
};
use esp_println as _;
// Named by the `split_resources!` expansion.
use treasure_hunt::board::{
    BacklightResources,
    ButtonResources,
    DisplayResources,
    LedResources,
    Resources,
    VibrationResources,
};
use treasure_hunt::{
    Game,
    GameConfig,
    GraphicsDisplay,
    InputAggregator,
    MelodyPlayer,
    Renderer,
    Vibration,
    board,
    buttons::{
        BadgeControls,
        Button,
        DpadEncoder,
    },
    display::Display,
    feedback,
    input::{
        InputConfig,
        NoAccelerometer,
    },
    leds::Leds,
    mk_static,
    time::{
        Clock,
        EmbassyClock,
    },
};

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

/// One pass of the main loop.
const TICK: Duration = Duration::from_millis(20);

type Controls =
    InputAggregator<DpadEncoder<Input<'static>>, Button<Input<'static>>, NoAccelerometer>;
type Screen = GraphicsDisplay<Display<'static>>;
type Motor = Vibration<Output<'static>>;

#[embassy_executor::task]
async fn game_task(
    input: &'static mut Controls,
    screen: &'static mut Screen,
    leds: &'static mut Leds<'static>,
    motor: &'static mut Motor,
    seed: u32,
) {
    let mut game = match Game::new(GameConfig::default(), seed, input.shake_available()) {
        Ok(game) => game,
        Err(err) => {
            error!("game config rejected: {}", err);
            loop {
                Timer::after(Duration::from_secs(600)).await;
            }
        }
    };
    let mut melody = MelodyPlayer::default();
    let mut renderer = Renderer::default();
    let clock = EmbassyClock;
    info!("treasure hunt started");

    loop {
        let now = clock.now();

        input.poll(now);
        let events = input.drain();
        let intents = game.update(now, &events);

        feedback::dispatch(&intents, now, leds, &mut melody, motor);
        melody.service(now, motor);
        leds.service(now).await;

        if renderer.render(&game, now, screen).is_err() {
            warn!("display write failed");
            renderer.invalidate();
        }

        Timer::after(TICK).await;
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = board::init();
    let resources = treasure_hunt::split_resources!(peripherals);

    esp_alloc::heap_allocator!(size: 64 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let seed = esp_hal::rng::Rng::new().random();

    let _backlight = board::backlight_on(resources.backlight);
    let screen = mk_static!(Screen, GraphicsDisplay::fit(Display::from(resources.display)));
    let leds = mk_static!(Leds<'static>, resources.leds.into());
    let motor = mk_static!(Motor, resources.vibra.into());

    let controls: BadgeControls = resources.buttons.into();
    let input = mk_static!(
        Controls,
        InputAggregator::new(
            controls.encoder,
            controls.secondary,
            None::<NoAccelerometer>,
            InputConfig::from(&GameConfig::default()),
        )
    );

    spawner.must_spawn(game_task(input, screen, leds, motor, seed));

    loop {
        Timer::after(Duration::from_secs(600)).await;
    }
}
