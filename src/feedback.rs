//! Intent → LED pattern / sound effect translation.
//!
//! The game decides *when* something happened and pushes an [`Intent`];
//! [`feedback_for`] decides what that looks and sounds like. Nothing here
//! keeps state between calls.

use palette::Srgb;

use crate::{
    leds::{
        LedMode,
        LedPattern,
        StatusLed,
    },
    sound::{
        MelodyPlayer,
        SoundEffect,
        SoundSink,
    },
    time::{
        Instant,
        ms,
    },
};

/// LED colour band for the remaining health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HealthTier {
    Full,
    Half,
    Low,
    Empty,
}

impl HealthTier {
    #[must_use]
    pub const fn of(health: u8, max: u8) -> Self {
        if health == 0 {
            Self::Empty
        } else if health >= max {
            Self::Full
        } else if health >= max / 2 {
            Self::Half
        } else {
            Self::Low
        }
    }
}

/// Something the player should see or hear about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Intent {
    Startup,
    /// Menu highlight moved to this difficulty index.
    MenuSelect(u8),
    CursorMoved,
    Confirm,
    RunStarted,
    FoundTreasure,
    HitBomb,
    DisarmStarted,
    DisarmTick,
    DisarmSuccess,
    DisarmFailed,
    TimeWarning,
    TimeUp,
    LevelCleared,
    FinalStarted,
    WrongChest,
    Victory,
    GameOver,
    HealthTier(HealthTier),
}

/// What an intent turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub led: Option<LedPattern>,
    pub sound: Option<SoundEffect>,
}

const OFF: Srgb<u8> = Srgb::new(0, 0, 0);
const RED: Srgb<u8> = Srgb::new(255, 0, 0);
const GREEN: Srgb<u8> = Srgb::new(0, 255, 0);
const YELLOW: Srgb<u8> = Srgb::new(255, 255, 0);
const PURPLE: Srgb<u8> = Srgb::new(255, 0, 255);
const MENU_COLORS: [Srgb<u8>; 3] = [GREEN, YELLOW, RED];

const fn explosion() -> LedPattern {
    LedPattern::timed(RED, LedMode::Blink(ms(100)), ms(600))
}

#[must_use]
pub fn feedback_for(intent: Intent) -> Feedback {
    use palette::named;

    let (led, sound) = match intent {
        Intent::Startup => (
            Some(LedPattern::steady(named::GOLD, LedMode::Solid)),
            Some(SoundEffect::Startup),
        ),
        Intent::MenuSelect(index) => (
            MENU_COLORS
                .get(usize::from(index))
                .map(|&color| LedPattern::steady(color, LedMode::Solid)),
            Some(SoundEffect::Click),
        ),
        Intent::CursorMoved => (None, Some(SoundEffect::Click)),
        Intent::Confirm | Intent::RunStarted => (None, Some(SoundEffect::Button)),
        Intent::FoundTreasure => (
            Some(LedPattern::timed(named::CYAN, LedMode::Solid, ms(200))),
            Some(SoundEffect::Found),
        ),
        Intent::HitBomb | Intent::DisarmFailed | Intent::TimeUp => {
            (Some(explosion()), Some(SoundEffect::Bomb))
        }
        Intent::DisarmStarted => (
            Some(LedPattern::steady(RED, LedMode::Breathe(ms(500)))),
            Some(SoundEffect::Tick),
        ),
        Intent::DisarmTick => (None, Some(SoundEffect::Tick)),
        Intent::DisarmSuccess => (
            Some(LedPattern::timed(GREEN, LedMode::Solid, ms(1000))),
            Some(SoundEffect::DisarmSuccess),
        ),
        Intent::TimeWarning => (None, Some(SoundEffect::Warn)),
        Intent::LevelCleared => (
            Some(LedPattern::timed(GREEN, LedMode::Solid, ms(1500))),
            Some(SoundEffect::Win),
        ),
        Intent::FinalStarted => (
            Some(LedPattern::steady(PURPLE, LedMode::Breathe(ms(1000)))),
            None,
        ),
        Intent::WrongChest => (
            Some(LedPattern::timed(RED, LedMode::Solid, ms(1000))),
            Some(SoundEffect::Bomb),
        ),
        Intent::Victory => (
            Some(LedPattern::steady(named::WHITE, LedMode::Rainbow)),
            Some(SoundEffect::Win),
        ),
        Intent::GameOver => (
            Some(LedPattern::steady(RED, LedMode::FadeOut(ms(500)))),
            Some(SoundEffect::Lose),
        ),
        Intent::HealthTier(tier) => {
            let color = match tier {
                HealthTier::Full => GREEN,
                HealthTier::Half => YELLOW,
                HealthTier::Low => RED,
                HealthTier::Empty => OFF,
            };
            (Some(LedPattern::steady(color, LedMode::Solid)), None)
        }
    };
    Feedback { led, sound }
}

/// Routes a tick's intents to the LED and the melody player, in order.
pub fn dispatch<L, S>(
    intents: &[Intent],
    now: Instant,
    led: &mut L,
    melody: &mut MelodyPlayer,
    sink: &mut S,
) where
    L: StatusLed + ?Sized,
    S: SoundSink + ?Sized,
{
    for &intent in intents {
        trace!("feedback for {}", intent);
        let feedback = feedback_for(intent);
        if let Some(pattern) = feedback.led {
            led.set_pattern(pattern, now);
        }
        if let Some(effect) = feedback.sound {
            melody.play(effect, now, sink);
        }
    }
}

#[cfg(test)]
mod tests {
    use mockall::{
        Sequence,
        predicate::eq,
    };

    use super::*;
    use crate::{
        config::GameConfig,
        game::Game,
        input::InputEvent,
        leds::MockStatusLed,
        sound::MockSoundSink,
        time::at,
    };

    #[test]
    fn health_tiers_follow_thresholds() {
        assert_eq!(HealthTier::of(6, 6), HealthTier::Full);
        assert_eq!(HealthTier::of(3, 6), HealthTier::Half);
        assert_eq!(HealthTier::of(2, 6), HealthTier::Low);
        assert_eq!(HealthTier::of(0, 6), HealthTier::Empty);
        assert_eq!(HealthTier::of(1, 2), HealthTier::Half);
    }

    #[test]
    fn tick_is_sound_only() {
        let feedback = feedback_for(Intent::DisarmTick);
        assert_eq!(feedback.led, None);
        assert_eq!(feedback.sound, Some(SoundEffect::Tick));
    }

    #[test]
    fn bomb_blinks_red_for_a_while() {
        let led = feedback_for(Intent::HitBomb).led.unwrap();
        assert_eq!(led.color, RED);
        assert_eq!(led.mode, LedMode::Blink(ms(100)));
        assert_eq!(led.duration, Some(ms(600)));
    }

    #[test]
    fn menu_colour_tracks_difficulty() {
        assert_eq!(feedback_for(Intent::MenuSelect(2)).led.unwrap().color, RED);
        assert_eq!(feedback_for(Intent::MenuSelect(9)).led, None);
    }

    #[test]
    fn dispatch_keeps_intent_order() {
        let mut led = MockStatusLed::new();
        let mut sink = MockSoundSink::new();
        let mut seq = Sequence::new();
        let now = at(40);

        led.expect_set_pattern()
            .with(eq(explosion()), eq(now))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        led.expect_set_pattern()
            .with(eq(LedPattern::steady(YELLOW, LedMode::Solid)), eq(now))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        sink.expect_play_tone()
            .with(eq(400), eq(100))
            .times(1)
            .return_const(());

        let mut melody = MelodyPlayer::default();
        dispatch(
            &[Intent::HitBomb, Intent::HealthTier(HealthTier::Half)],
            now,
            &mut led,
            &mut melody,
            &mut sink,
        );
        assert_eq!(melody.current(), Some(SoundEffect::Bomb));
    }

    #[test]
    fn startup_jingle_plays_through_the_first_press() {
        let mut led = MockStatusLed::new();
        led.expect_set_pattern().return_const(());
        let mut sink = MockSoundSink::new();
        let mut seq = Sequence::new();
        for frequency in [523, 659, 784] {
            sink.expect_play_tone()
                .with(eq(frequency), eq(100))
                .times(1)
                .in_sequence(&mut seq)
                .return_const(());
        }
        sink.expect_stop().times(1).in_sequence(&mut seq).return_const(());

        let mut game = Game::new(GameConfig::default(), 1, true).unwrap();
        let mut melody = MelodyPlayer::default();
        let intents = game.update(at(0), &[]);
        dispatch(&intents, at(0), &mut led, &mut melody, &mut sink);

        // Confirm and the menu click land mid-jingle.
        let intents = game.update(at(50), &[InputEvent::ButtonPress]);
        assert_eq!(intents.as_slice(), [Intent::Confirm, Intent::MenuSelect(0)]);
        dispatch(&intents, at(50), &mut led, &mut melody, &mut sink);

        for now in (60..=400).step_by(20) {
            melody.service(at(now), &mut sink);
        }
        assert_eq!(melody.current(), None);
    }
}
