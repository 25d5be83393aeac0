//! Polled push buttons, and a D-pad standing in for the rotary encoder.
//!
//! The badge has no encoder, so left/right on the D-pad step the cursor and
//! A acts as the encoder's push switch. B is the secondary button.

use embedded_hal::digital::InputPin;

use crate::input::{
    PushButton,
    RotaryInput,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Pulled up, reads low while held.
    ActiveLow,
    /// Pulled down, reads high while held.
    ActiveHigh,
}

/// A button that reports each press once.
pub struct Button<P> {
    pin: P,
    polarity: Polarity,
    held: bool,
}

impl<P: InputPin> Button<P> {
    pub const fn new(pin: P, polarity: Polarity) -> Self {
        Self {
            pin,
            polarity,
            held: false,
        }
    }

    /// Current level, treating a read error as released.
    pub fn is_held(&mut self) -> bool {
        let level = match self.polarity {
            Polarity::ActiveLow => self.pin.is_low(),
            Polarity::ActiveHigh => self.pin.is_high(),
        };
        level.unwrap_or_else(|_| {
            warn!("button read failed");
            false
        })
    }

    /// `true` on the poll where the button goes from released to held.
    pub fn just_pressed(&mut self) -> bool {
        let held = self.is_held();
        let edge = held && !self.held;
        self.held = held;
        edge
    }
}

impl<P: InputPin> PushButton for Button<P> {
    fn pressed(&mut self) -> bool {
        self.just_pressed()
    }
}

/// Left/right/select buttons presented as a rotary encoder.
pub struct DpadEncoder<P> {
    pub left: Button<P>,
    pub right: Button<P>,
    pub select: Button<P>,
}

impl<P: InputPin> RotaryInput for DpadEncoder<P> {
    fn rotation_delta(&mut self) -> i8 {
        let left = self.left.just_pressed();
        let right = self.right.just_pressed();
        match (left, right) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }

    fn button_pressed(&mut self) -> bool {
        self.select.just_pressed()
    }
}

#[cfg(feature = "board")]
pub use badge::BadgeControls;

#[cfg(feature = "board")]
mod badge {
    use esp_hal::gpio::{
        Input,
        InputConfig,
        Pull,
    };

    use super::{
        Button,
        DpadEncoder,
        Polarity,
    };
    use crate::board::ButtonResources;

    /// The badge buttons the game uses.
    pub struct BadgeControls {
        pub encoder: DpadEncoder<Input<'static>>,
        pub secondary: Button<Input<'static>>,
    }

    impl From<ButtonResources<'static>> for BadgeControls {
        fn from(res: ButtonResources<'static>) -> Self {
            let pull_up = InputConfig::default().with_pull(Pull::Up);
            let active_low = |pin| Button::new(pin, Polarity::ActiveLow);
            Self {
                encoder: DpadEncoder {
                    left: active_low(Input::new(res.left, pull_up)),
                    right: active_low(Input::new(res.right, pull_up)),
                    select: active_low(Input::new(res.a, pull_up)),
                },
                secondary: active_low(Input::new(res.b, pull_up)),
            }
        }
    }
}
