//! Input aggregation.
//!
//! Raw controls are polled once per tick and turned into a short queue of
//! debounced [`InputEvent`]s. Contact bounce and repeated accelerometer
//! spikes are swallowed here and never reach the game.

use heapless::Deque;

use crate::{
    config::GameConfig,
    error::PeripheralUnavailable,
    time::{
        Duration,
        Instant,
        ms,
    },
};

/// A normalised player action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputEvent {
    /// Nothing happened since the last poll.
    Nothing,
    RotateLeft,
    RotateRight,
    ButtonPress,
    ShakeDetected,
}

/// Rotary encoder with integrated push switch.
pub trait RotaryInput {
    /// Detents turned since the last call: -1, 0 or +1.
    fn rotation_delta(&mut self) -> i8;
    /// `true` once per press (edge-triggered).
    fn button_pressed(&mut self) -> bool;
}

/// A separate push button.
pub trait PushButton {
    /// `true` once per press (edge-triggered).
    fn pressed(&mut self) -> bool;
}

/// Optional motion sensor.
pub trait Accelerometer {
    /// Current shake magnitude with gravity removed.
    fn read_magnitude(&mut self) -> Result<f32, PeripheralUnavailable>;
}

/// Placeholder for boards without an accelerometer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAccelerometer;

impl Accelerometer for NoAccelerometer {
    fn read_magnitude(&mut self) -> Result<f32, PeripheralUnavailable> {
        Err(PeripheralUnavailable)
    }
}

/// Board without a secondary button.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoButton;

impl PushButton for NoButton {
    fn pressed(&mut self) -> bool {
        false
    }
}

/// Accepts an edge only if the previous accepted edge is at least
/// `min_interval` old.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debouncer {
    min_interval: Duration,
    last: Option<Instant>,
}

impl Debouncer {
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// Feeds one sample. Returns `true` if `edge` is accepted as an event.
    pub fn accept(&mut self, edge: bool, now: Instant) -> bool {
        if !edge {
            return false;
        }
        if let Some(last) = self.last
            && now
                .checked_duration_since(last)
                .is_some_and(|gap| gap < self.min_interval)
        {
            return false;
        }
        self.last = Some(now);
        true
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Debounce windows, plus the shake threshold taken from the game tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputConfig {
    pub rotation_debounce: Duration,
    pub button_debounce: Duration,
    pub shake_debounce: Duration,
    shake_threshold: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self::from(&GameConfig::default())
    }
}

impl From<&GameConfig> for InputConfig {
    fn from(config: &GameConfig) -> Self {
        Self {
            rotation_debounce: ms(20),
            button_debounce: ms(20),
            shake_debounce: ms(250),
            shake_threshold: config.shake_threshold,
        }
    }
}

impl InputConfig {
    #[must_use]
    pub const fn with_rotation_debounce(mut self, interval: Duration) -> Self {
        self.rotation_debounce = interval;
        self
    }

    #[must_use]
    pub const fn with_button_debounce(mut self, interval: Duration) -> Self {
        self.button_debounce = interval;
        self
    }

    #[must_use]
    pub const fn with_shake_debounce(mut self, interval: Duration) -> Self {
        self.shake_debounce = interval;
        self
    }

    #[must_use]
    pub const fn shake_threshold(&self) -> f32 {
        self.shake_threshold
    }
}

/// Queue depth; one tick produces at most one event per source.
pub const EVENT_QUEUE: usize = 8;

pub struct InputAggregator<R, B, A> {
    rotary: R,
    button: B,
    accelerometer: Option<A>,
    config: InputConfig,
    rotation: Debouncer,
    press: Debouncer,
    shake: Debouncer,
    queue: Deque<InputEvent, EVENT_QUEUE>,
}

impl<R, B, A> InputAggregator<R, B, A>
where
    R: RotaryInput,
    B: PushButton,
    A: Accelerometer,
{
    /// Probes the accelerometer once; a missing or silent sensor is dropped
    /// and shake detection stays off.
    pub fn new(rotary: R, button: B, accelerometer: Option<A>, config: InputConfig) -> Self {
        let accelerometer = accelerometer.and_then(|mut sensor| match sensor.read_magnitude() {
            Ok(_) => Some(sensor),
            Err(err) => {
                warn!("accelerometer probe failed ({}), shake disarm disabled", err);
                None
            }
        });
        Self {
            rotary,
            button,
            accelerometer,
            rotation: Debouncer::new(config.rotation_debounce),
            press: Debouncer::new(config.button_debounce),
            shake: Debouncer::new(config.shake_debounce),
            config,
            queue: Deque::new(),
        }
    }

    /// Whether shake events can ever be produced.
    pub const fn shake_available(&self) -> bool {
        self.accelerometer.is_some()
    }

    /// Samples every source once and queues whatever survived debouncing.
    pub fn poll(&mut self, now: Instant) {
        let delta = self.rotary.rotation_delta();
        if self.rotation.accept(delta != 0, now) {
            self.push(if delta > 0 {
                InputEvent::RotateRight
            } else {
                InputEvent::RotateLeft
            });
        }

        // Read both so neither keeps a stale edge.
        let encoder = self.rotary.button_pressed();
        let secondary = self.button.pressed();
        if self.press.accept(encoder || secondary, now) {
            self.push(InputEvent::ButtonPress);
        }

        if let Some(sensor) = self.accelerometer.as_mut() {
            match sensor.read_magnitude() {
                Ok(magnitude) => {
                    if self
                        .shake
                        .accept(magnitude >= self.config.shake_threshold, now)
                    {
                        self.push(InputEvent::ShakeDetected);
                    }
                }
                Err(err) => debug!("accelerometer read failed: {}", err),
            }
        }
    }

    /// Next queued event, or [`InputEvent::Nothing`] once drained.
    pub fn next(&mut self) -> InputEvent {
        self.queue.pop_front().unwrap_or(InputEvent::Nothing)
    }

    /// Empties the queue into a batch for one game update.
    pub fn drain(&mut self) -> heapless::Vec<InputEvent, EVENT_QUEUE> {
        let mut batch = heapless::Vec::new();
        while let Some(event) = self.queue.pop_front() {
            batch.push(event).ok();
        }
        batch
    }

    fn push(&mut self, event: InputEvent) {
        if self.queue.push_back(event).is_err() {
            trace!("input queue full, dropping {}", event);
        }
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::time::at;

    #[derive(Clone, Default)]
    struct Script {
        delta: Rc<Cell<i8>>,
        press: Rc<Cell<bool>>,
    }

    impl RotaryInput for Script {
        fn rotation_delta(&mut self) -> i8 {
            self.delta.replace(0)
        }

        fn button_pressed(&mut self) -> bool {
            self.press.replace(false)
        }
    }

    struct Shaker(Rc<Cell<Option<f32>>>);

    impl Accelerometer for Shaker {
        fn read_magnitude(&mut self) -> Result<f32, PeripheralUnavailable> {
            self.0.get().ok_or(PeripheralUnavailable)
        }
    }

    #[test]
    fn debouncer_enforces_spacing() {
        let mut debouncer = Debouncer::new(ms(20));
        assert!(debouncer.accept(true, at(100)));
        assert!(!debouncer.accept(true, at(110)));
        assert!(!debouncer.accept(false, at(130)));
        assert!(debouncer.accept(true, at(120)));
    }

    #[test]
    fn idle_poll_yields_nothing() {
        let script = Script::default();
        let mut input =
            InputAggregator::new(script, NoButton, None::<NoAccelerometer>, InputConfig::default());
        input.poll(at(0));
        assert_eq!(input.next(), InputEvent::Nothing);
    }

    #[test]
    fn rotation_and_press_become_events() {
        let script = Script::default();
        let mut input = InputAggregator::new(
            script.clone(),
            NoButton,
            None::<NoAccelerometer>,
            InputConfig::default(),
        );

        script.delta.set(-1);
        script.press.set(true);
        input.poll(at(0));
        assert_eq!(input.next(), InputEvent::RotateLeft);
        assert_eq!(input.next(), InputEvent::ButtonPress);
        assert_eq!(input.next(), InputEvent::Nothing);

        // Bounce inside the window is dropped.
        script.press.set(true);
        input.poll(at(10));
        assert_eq!(input.next(), InputEvent::Nothing);

        script.delta.set(1);
        input.poll(at(40));
        assert_eq!(input.drain().as_slice(), [InputEvent::RotateRight]);
    }

    #[test]
    fn missing_accelerometer_disables_shake() {
        let reading = Rc::new(Cell::new(None));
        let input = InputAggregator::new(
            Script::default(),
            NoButton,
            Some(Shaker(reading)),
            InputConfig::default(),
        );
        assert!(!input.shake_available());
    }

    #[test]
    fn shake_over_threshold_is_debounced() {
        let reading = Rc::new(Cell::new(Some(0.1)));
        let mut input = InputAggregator::new(
            Script::default(),
            NoButton,
            Some(Shaker(reading.clone())),
            InputConfig::default(),
        );
        assert!(input.shake_available());

        reading.set(Some(3.5));
        input.poll(at(0));
        input.poll(at(100));
        input.poll(at(300));
        assert_eq!(
            input.drain().as_slice(),
            [InputEvent::ShakeDetected, InputEvent::ShakeDetected]
        );

        // A flaky read mid-game is skipped, not fatal.
        reading.set(None);
        input.poll(at(600));
        assert_eq!(input.next(), InputEvent::Nothing);
    }

    #[test]
    fn shake_threshold_follows_game_tuning() {
        let tuning = GameConfig::default().with_shake_threshold(4.0);
        let reading = Rc::new(Cell::new(Some(0.1)));
        let mut input = InputAggregator::new(
            Script::default(),
            NoButton,
            Some(Shaker(reading.clone())),
            InputConfig::from(&tuning),
        );
        assert!((InputConfig::default().shake_threshold() - 2.0).abs() < f32::EPSILON);

        reading.set(Some(3.5));
        input.poll(at(0));
        assert_eq!(input.next(), InputEvent::Nothing);

        reading.set(Some(4.0));
        input.poll(at(300));
        assert_eq!(input.next(), InputEvent::ShakeDetected);
    }
}
