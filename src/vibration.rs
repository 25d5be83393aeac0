//! Vibration motor as the sound output.
//!
//! The badge has no buzzer, so each note of an effect becomes a motor pulse.
//! The motor cannot change pitch; only note timing survives.

use embedded_hal::digital::OutputPin;

use crate::sound::SoundSink;

/// Notes below this frequency are felt as silence rests.
const AUDIBLE_HZ: u32 = 20;

/// Controls the onboard vibration motor.
pub struct Vibration<P> {
    pin: P,
    running: bool,
}

impl<P: OutputPin> Vibration<P> {
    /// Takes a pin already driven low.
    pub const fn new(pin: P) -> Self {
        Self {
            pin,
            running: false,
        }
    }

    pub fn on(&mut self) {
        self.drive(true);
    }

    pub fn off(&mut self) {
        self.drive(false);
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }

    fn drive(&mut self, high: bool) {
        let result = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match result {
            Ok(()) => self.running = high,
            Err(_) => warn!("vibration motor pin write failed"),
        }
    }
}

impl<P: OutputPin> SoundSink for Vibration<P> {
    fn play_tone(&mut self, frequency_hz: u32, _duration_ms: u32) {
        self.drive(frequency_hz >= AUDIBLE_HZ);
    }

    fn stop(&mut self) {
        self.off();
    }
}

#[cfg(feature = "board")]
mod badge {
    use esp_hal::gpio::{
        Level,
        Output,
        OutputConfig,
    };

    use super::Vibration;
    use crate::board::VibrationResources;

    impl From<VibrationResources<'static>> for Vibration<Output<'static>> {
        fn from(res: VibrationResources<'static>) -> Self {
            Self::new(Output::new(res.motor, Level::Low, OutputConfig::default()))
        }
    }
}
