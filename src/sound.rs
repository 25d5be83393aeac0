//! Named sound effects and a non-blocking melody sequencer.

use crate::time::{
    Instant,
    ms,
};

/// A single note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tone {
    pub frequency_hz: u32,
    pub duration_ms: u32,
}

const fn tone(frequency_hz: u32, duration_ms: u32) -> Tone {
    Tone {
        frequency_hz,
        duration_ms,
    }
}

const CLICK: &[Tone] = &[tone(1200, 15)];
const BUTTON: &[Tone] = &[tone(800, 30), tone(1200, 30)];
const STARTUP: &[Tone] = &[tone(523, 100), tone(659, 100), tone(784, 100)];
const WIN: &[Tone] = &[tone(523, 150), tone(659, 150), tone(784, 150), tone(1047, 150)];
const LOSE: &[Tone] = &[tone(330, 250), tone(294, 250), tone(262, 250)];
const FOUND: &[Tone] = &[tone(659, 80), tone(784, 100)];
const BOMB: &[Tone] = &[tone(400, 100), tone(300, 100), tone(200, 100)];
const WARN: &[Tone] = &[tone(800, 100)];
const DISARM_SUCCESS: &[Tone] = &[tone(600, 60), tone(800, 60), tone(1000, 60)];
const TICK: &[Tone] = &[tone(1000, 30)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SoundEffect {
    /// Encoder detent.
    Click,
    /// Button confirmation, low then high.
    Button,
    /// C-E-G arpeggio.
    Startup,
    /// C-E-G-C, slower.
    Win,
    /// Descending E-D-C.
    Lose,
    Found,
    Bomb,
    Warn,
    DisarmSuccess,
    Tick,
}

impl SoundEffect {
    #[must_use]
    pub const fn notes(self) -> &'static [Tone] {
        match self {
            Self::Click => CLICK,
            Self::Button => BUTTON,
            Self::Startup => STARTUP,
            Self::Win => WIN,
            Self::Lose => LOSE,
            Self::Found => FOUND,
            Self::Bomb => BOMB,
            Self::Warn => WARN,
            Self::DisarmSuccess => DISARM_SUCCESS,
            Self::Tick => TICK,
        }
    }

    /// Control chirps rank below everything else.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Click => 0,
            Self::Button => 1,
            _ => 2,
        }
    }

    /// Total length of the effect.
    #[must_use]
    pub fn duration_ms(self) -> u32 {
        self.notes().iter().map(|note| note.duration_ms).sum()
    }
}

/// Tone generator. Calls return immediately; the tone keeps sounding until
/// the next `play_tone` or `stop`.
#[cfg_attr(test, mockall::automock)]
pub trait SoundSink {
    fn play_tone(&mut self, frequency_hz: u32, duration_ms: u32);
    fn stop(&mut self);
}

/// Steps through an effect's notes as time passes.
///
/// Starting an effect replaces whatever was playing, unless the new one has
/// a lower [`SoundEffect::priority`] and the old one is still sounding.
#[derive(Debug, Default, Clone)]
pub struct MelodyPlayer {
    playing: Option<Playing>,
}

#[derive(Debug, Clone, Copy)]
struct Playing {
    effect: SoundEffect,
    note: usize,
    note_ends: Instant,
}

impl Playing {
    /// Whether the whole effect would have ended by `now`, even if `service`
    /// has not caught up yet.
    fn finished(&self, now: Instant) -> bool {
        let rest: u32 = self.effect.notes()[self.note + 1..]
            .iter()
            .map(|tone| tone.duration_ms)
            .sum();
        now >= self.note_ends + ms(u64::from(rest))
    }
}

impl MelodyPlayer {
    pub fn play<S: SoundSink + ?Sized>(&mut self, effect: SoundEffect, now: Instant, sink: &mut S) {
        if let Some(playing) = self.playing
            && effect.priority() < playing.effect.priority()
            && !playing.finished(now)
        {
            trace!("{} drowned out by {}", effect, playing.effect);
            return;
        }
        self.playing = None;
        self.start_note(effect, 0, now, sink);
    }

    /// Advances to the next note once the current one has run its length.
    pub fn service<S: SoundSink + ?Sized>(&mut self, now: Instant, sink: &mut S) {
        let Some(playing) = self.playing else {
            return;
        };
        if now < playing.note_ends {
            return;
        }
        self.start_note(playing.effect, playing.note + 1, playing.note_ends, sink);
        if self.playing.is_none() {
            sink.stop();
        }
    }

    /// Silences the current effect, if any.
    pub fn cancel<S: SoundSink + ?Sized>(&mut self, sink: &mut S) {
        if self.playing.take().is_some() {
            sink.stop();
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<SoundEffect> {
        self.playing.map(|playing| playing.effect)
    }

    fn start_note<S: SoundSink + ?Sized>(
        &mut self,
        effect: SoundEffect,
        note: usize,
        starts: Instant,
        sink: &mut S,
    ) {
        self.playing = effect.notes().get(note).map(|tone| {
            sink.play_tone(tone.frequency_hz, tone.duration_ms);
            Playing {
                effect,
                note,
                note_ends: starts + ms(u64::from(tone.duration_ms)),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::at;

    #[derive(Default)]
    struct Recorder {
        tones: std::vec::Vec<(u32, u32)>,
        stops: usize,
    }

    impl SoundSink for Recorder {
        fn play_tone(&mut self, frequency_hz: u32, duration_ms: u32) {
            self.tones.push((frequency_hz, duration_ms));
        }

        fn stop(&mut self) {
            self.stops += 1;
        }
    }

    #[test]
    fn steps_through_notes_on_time() {
        let mut sink = Recorder::default();
        let mut player = MelodyPlayer::default();

        player.play(SoundEffect::Found, at(0), &mut sink);
        player.service(at(79), &mut sink);
        assert_eq!(sink.tones, [(659, 80)]);

        player.service(at(80), &mut sink);
        assert_eq!(sink.tones, [(659, 80), (784, 100)]);

        player.service(at(180), &mut sink);
        assert_eq!(sink.stops, 1);
        assert_eq!(player.current(), None);
    }

    #[test]
    fn new_effect_replaces_old() {
        let mut sink = Recorder::default();
        let mut player = MelodyPlayer::default();

        player.play(SoundEffect::Lose, at(0), &mut sink);
        player.play(SoundEffect::Tick, at(10), &mut sink);
        assert_eq!(player.current(), Some(SoundEffect::Tick));

        player.service(at(40), &mut sink);
        assert_eq!(sink.tones, [(330, 250), (1000, 30)]);
        assert_eq!(sink.stops, 1);
    }

    #[test]
    fn cancel_stops_only_when_playing() {
        let mut sink = Recorder::default();
        let mut player = MelodyPlayer::default();
        player.cancel(&mut sink);
        assert_eq!(sink.stops, 0);

        player.play(SoundEffect::Warn, at(0), &mut sink);
        player.cancel(&mut sink);
        assert_eq!(sink.stops, 1);
    }

    #[test]
    fn durations_add_up() {
        assert_eq!(SoundEffect::Win.duration_ms(), 600);
        assert_eq!(SoundEffect::Click.duration_ms(), 15);
    }

    #[test]
    fn chirps_do_not_cut_off_a_jingle() {
        let mut sink = Recorder::default();
        let mut player = MelodyPlayer::default();

        player.play(SoundEffect::Startup, at(0), &mut sink);
        player.play(SoundEffect::Click, at(0), &mut sink);
        player.play(SoundEffect::Button, at(50), &mut sink);
        assert_eq!(player.current(), Some(SoundEffect::Startup));

        for now in (0..=400).step_by(20) {
            player.service(at(now), &mut sink);
        }
        assert_eq!(sink.tones, [(523, 100), (659, 100), (784, 100)]);
    }

    #[test]
    fn button_overrides_click_and_jingle_overrides_button() {
        let mut sink = Recorder::default();
        let mut player = MelodyPlayer::default();

        player.play(SoundEffect::Click, at(0), &mut sink);
        player.play(SoundEffect::Button, at(5), &mut sink);
        assert_eq!(player.current(), Some(SoundEffect::Button));
        player.play(SoundEffect::Click, at(10), &mut sink);
        assert_eq!(player.current(), Some(SoundEffect::Button));

        // Once the button chirp has run out a click plays again.
        player.play(SoundEffect::Click, at(65), &mut sink);
        assert_eq!(player.current(), Some(SoundEffect::Click));

        player.play(SoundEffect::Bomb, at(70), &mut sink);
        assert_eq!(player.current(), Some(SoundEffect::Bomb));
    }
}
