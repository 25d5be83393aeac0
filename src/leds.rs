//! Status LED patterns.
//!
//! A [`LedPattern`] is declarative: a colour, an animation mode and an
//! optional lifetime. [`LedAnimator`] turns the active pattern into a colour
//! for any instant. Timed patterns play over the last steady one and fall
//! back to it when they expire.
//!
//! With the `board` feature, [`Leds`] drives the badge's WS2812 strip through
//! the RMT peripheral and shows the animator's colour on every LED.

use palette::Srgb;

use crate::time::{
    Duration,
    Instant,
    since,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedMode {
    Solid,
    /// On for one period, off for the next.
    Blink(Duration),
    /// Triangle-wave brightness with this period.
    Breathe(Duration),
    /// Cycles red, yellow, green, blue, magenta; the pattern colour is ignored.
    Rainbow,
    /// Linear fade to black over this span, then stays dark.
    FadeOut(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedPattern {
    pub color: Srgb<u8>,
    pub mode: LedMode,
    /// `None` keeps the pattern until replaced.
    pub duration: Option<Duration>,
}

impl LedPattern {
    #[must_use]
    pub const fn steady(color: Srgb<u8>, mode: LedMode) -> Self {
        Self {
            color,
            mode,
            duration: None,
        }
    }

    #[must_use]
    pub const fn timed(color: Srgb<u8>, mode: LedMode, duration: Duration) -> Self {
        Self {
            color,
            mode,
            duration: Some(duration),
        }
    }

    /// Colour `elapsed` after the pattern started.
    #[must_use]
    pub fn color_at(&self, elapsed: Duration) -> Srgb<u8> {
        let t = elapsed.ticks();
        match self.mode {
            LedMode::Solid => self.color,
            LedMode::Blink(rate) => {
                let rate = rate.ticks().max(1);
                if (t / rate) % 2 == 0 { self.color } else { BLACK }
            }
            LedMode::Breathe(period) => {
                let period = period.ticks().max(2);
                let half = period / 2;
                let distance = (t % period).abs_diff(half);
                // 50..=255, brightest at the start of each period.
                scale(self.color, 50 + 205 * distance.min(half) / half)
            }
            LedMode::Rainbow => RAINBOW[((t / RAINBOW_STEP_MS) % RAINBOW.len() as u64) as usize],
            LedMode::FadeOut(over) => {
                let over = over.ticks().max(1);
                scale(self.color, 255 * over.saturating_sub(t) / over)
            }
        }
    }
}

const BLACK: Srgb<u8> = Srgb::new(0, 0, 0);

const RAINBOW_STEP_MS: u64 = 100;
const RAINBOW: [Srgb<u8>; 5] = [
    Srgb::new(255, 0, 0),
    Srgb::new(255, 255, 0),
    Srgb::new(0, 255, 0),
    Srgb::new(0, 0, 255),
    Srgb::new(255, 0, 255),
];

fn scale(color: Srgb<u8>, level: u64) -> Srgb<u8> {
    let channel = |c: u8| (u64::from(c) * level / 255) as u8;
    Srgb::new(channel(color.red), channel(color.green), channel(color.blue))
}

/// Something that can show a [`LedPattern`].
#[cfg_attr(test, mockall::automock)]
pub trait StatusLed {
    fn set_pattern(&mut self, pattern: LedPattern, now: Instant);
}

#[derive(Debug, Clone, Copy)]
pub struct LedAnimator {
    base: (LedPattern, Instant),
    overlay: Option<(LedPattern, Instant)>,
}

impl Default for LedAnimator {
    fn default() -> Self {
        Self {
            base: (LedPattern::steady(BLACK, LedMode::Solid), Instant::from_ticks(0)),
            overlay: None,
        }
    }
}

impl LedAnimator {
    /// Colour to show at `now`. Drops an expired overlay.
    pub fn color_at(&mut self, now: Instant) -> Srgb<u8> {
        if let Some((pattern, started)) = self.overlay {
            let elapsed = since(now, started);
            match pattern.duration {
                Some(limit) if elapsed < limit => return pattern.color_at(elapsed),
                _ => self.overlay = None,
            }
        }
        let (pattern, started) = self.base;
        pattern.color_at(since(now, started))
    }

    /// The pattern currently on show, ignoring expiry.
    #[must_use]
    pub fn active(&self) -> LedPattern {
        self.overlay.map_or(self.base.0, |(pattern, _)| pattern)
    }
}

impl StatusLed for LedAnimator {
    fn set_pattern(&mut self, pattern: LedPattern, now: Instant) {
        if pattern.duration.is_some() {
            self.overlay = Some((pattern, now));
        } else {
            self.base = (pattern, now);
        }
    }
}

#[cfg(feature = "board")]
pub use strip::{
    BAR_COUNT,
    LED_COUNT,
    Leds,
};

#[cfg(feature = "board")]
mod strip {
    extern crate alloc;

    use embassy_time::{
        Duration,
        Timer,
    };
    use esp_hal::{
        Blocking,
        gpio::{
            Level,
            Output,
        },
        rmt::{
            PulseCode,
            Tx,
        },
    };
    use palette::Srgb;

    use super::{
        LedAnimator,
        LedPattern,
        StatusLed,
    };
    use crate::time::Instant;

    /// Number of WS2812 LEDs on the badge, in two bars of five.
    pub const LED_COUNT: usize = 10;

    /// Number of LEDs per bar (left or right).
    pub const BAR_COUNT: usize = 5;

    /// WS2812 strip used as one status light: every LED shows the animator's colour.
    pub struct Leds<'a> {
        channel: Option<esp_hal::rmt::Channel<'a, Blocking, Tx>>,
        power: Option<Output<'a>>,
        animator: LedAnimator,
        shown: Option<Srgb<u8>>,
        brightness: u8,
    }

    impl<'a> Leds<'a> {
        pub fn new(channel: esp_hal::rmt::Channel<'a, Blocking, Tx>) -> Self {
            Self {
                channel: Some(channel),
                power: None,
                animator: LedAnimator::default(),
                shown: None,
                brightness: 40,
            }
        }

        /// Keeps the strip's power rail switched on for as long as the driver lives.
        pub fn with_power(mut self, power: Output<'a>) -> Self {
            self.power = Some(power);
            self
        }

        /// Caps every channel at `brightness`/255; the LEDs are very bright.
        pub const fn with_brightness(mut self, brightness: u8) -> Self {
            self.brightness = brightness;
            self
        }

        /// Pushes the animated colour for `now` to the strip if it changed.
        pub async fn service(&mut self, now: Instant) {
            let color = super::scale(self.animator.color_at(now), u64::from(self.brightness));
            if self.shown == Some(color) {
                return;
            }
            self.shown = Some(color);
            self.flush(color).await;
        }

        async fn flush(&mut self, color: Srgb<u8>) {
            let Some(channel) = self.channel.take() else {
                error!("RMT channel lost during previous transmission");
                return;
            };

            // WS2812 expects GRB byte order
            let pulses = core::iter::repeat_n(color, LED_COUNT)
                .flat_map(|c| {
                    [
                        Self::byte_to_pulses(c.green),
                        Self::byte_to_pulses(c.red),
                        Self::byte_to_pulses(c.blue),
                    ]
                    .into_iter()
                    .flatten()
                })
                .chain(core::iter::once(PulseCode::end_marker()))
                .collect::<alloc::vec::Vec<_>>();

            let transaction = match channel.transmit(&pulses) {
                Ok(t) => t,
                Err(e) => {
                    error!("RMT transmit failed: {}", e);
                    return;
                }
            };

            self.channel = Some(match transaction.wait() {
                Ok(ch) => ch,
                Err((err, ch)) => {
                    error!("RMT transaction failed: {}", err);
                    ch
                }
            });

            // WS2812 reset time
            Timer::after(Duration::from_micros(50)).await;
        }

        /// WS2812 bit timing at 40 MHz RMT clock.
        const fn bit_to_pulse(bit: bool) -> PulseCode {
            if bit {
                // '1': 0.8 µs high (32 ticks), 0.45 µs low (18 ticks)
                PulseCode::new(Level::High, 32, Level::Low, 18)
            } else {
                // '0': 0.4 µs high (16 ticks), 0.85 µs low (34 ticks)
                PulseCode::new(Level::High, 16, Level::Low, 34)
            }
        }

        fn byte_to_pulses(byte: u8) -> [PulseCode; 8] {
            let mut pulses = [PulseCode::default(); 8];
            for (i, pulse) in pulses.iter_mut().enumerate() {
                *pulse = Self::bit_to_pulse((byte >> (7 - i)) & 1 != 0);
            }
            pulses
        }
    }

    impl StatusLed for Leds<'_> {
        fn set_pattern(&mut self, pattern: LedPattern, now: Instant) {
            self.animator.set_pattern(pattern, now);
        }
    }
}
