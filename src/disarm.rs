//! Shake-to-disarm mini game.
//!
//! The first bomb dug on a level can be neutralised by shaking the badge
//! before a short deadline. The parent state machine arms it, forwards shake
//! events and calls [`Disarm::tick`] every loop; this module only decides the
//! outcome and when the armed bomb should tick audibly.

use crate::time::{
    Duration,
    Instant,
    until,
};

/// Where the disarm sequence is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisarmState {
    Idle,
    Armed { deadline: Instant, next_tick: Instant },
}

/// How an armed sequence ended. The machine is back in `Idle` when this is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisarmOutcome {
    Success,
    Failure,
}

/// Result of servicing an armed sequence for one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisarmStep {
    Waiting,
    Tick,
    Resolved(DisarmOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disarm {
    state: DisarmState,
    used_this_level: bool,
    window: Duration,
    tick_period: Duration,
}

impl Disarm {
    pub fn new(window: Duration, tick_period: Duration) -> Self {
        Self {
            state: DisarmState::Idle,
            used_this_level: false,
            window,
            tick_period: tick_period.max(Duration::from_ticks(1)),
        }
    }

    /// Fresh level: idle and available again.
    pub fn reset(&mut self) {
        self.state = DisarmState::Idle;
        self.used_this_level = false;
    }

    pub const fn state(&self) -> DisarmState {
        self.state
    }

    pub const fn is_active(&self) -> bool {
        matches!(self.state, DisarmState::Armed { .. })
    }

    pub const fn used_this_level(&self) -> bool {
        self.used_this_level
    }

    /// Whether a freshly revealed bomb would start a disarm sequence.
    pub const fn eligible(&self, shake_enabled: bool) -> bool {
        shake_enabled && !self.used_this_level && !self.is_active()
    }

    /// Starts the countdown. Returns `false` if the sequence was already used
    /// on this level or is running.
    pub fn arm(&mut self, now: Instant) -> bool {
        if self.used_this_level || self.is_active() {
            return false;
        }
        self.used_this_level = true;
        self.state = DisarmState::Armed {
            deadline: now + self.window,
            next_tick: now + self.tick_period,
        };
        true
    }

    /// A shake arrived. Succeeds only while armed and strictly before the deadline.
    pub fn on_shake(&mut self, now: Instant) -> Option<DisarmOutcome> {
        match self.state {
            DisarmState::Armed { deadline, .. } if now < deadline => {
                self.state = DisarmState::Idle;
                Some(DisarmOutcome::Success)
            }
            _ => None,
        }
    }

    pub fn tick(&mut self, now: Instant) -> DisarmStep {
        let DisarmState::Armed {
            deadline,
            next_tick,
        } = self.state
        else {
            return DisarmStep::Waiting;
        };

        if now >= deadline {
            self.state = DisarmState::Idle;
            return DisarmStep::Resolved(DisarmOutcome::Failure);
        }
        if now >= next_tick {
            // Skip missed ticks instead of bursting them after a stall.
            let mut next = next_tick + self.tick_period;
            while next <= now {
                next = next + self.tick_period;
            }
            self.state = DisarmState::Armed {
                deadline,
                next_tick: next,
            };
            return DisarmStep::Tick;
        }
        DisarmStep::Waiting
    }

    /// Drops an armed sequence and its tick schedule without an outcome.
    pub fn cancel(&mut self) {
        self.state = DisarmState::Idle;
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        match self.state {
            DisarmState::Armed { deadline, .. } => until(now, deadline),
            DisarmState::Idle => Duration::from_ticks(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{
        at,
        ms,
    };

    fn disarm() -> Disarm {
        Disarm::new(ms(3000), ms(500))
    }

    #[test]
    fn shake_before_deadline_succeeds() {
        let mut disarm = disarm();
        assert!(disarm.arm(at(1000)));
        assert_eq!(disarm.on_shake(at(3999)), Some(DisarmOutcome::Success));
        assert_eq!(disarm.state(), DisarmState::Idle);
    }

    #[test]
    fn deadline_fails_and_late_shake_is_ignored() {
        let mut disarm = disarm();
        disarm.arm(at(0));
        assert_eq!(disarm.on_shake(at(3000)), None);
        assert_eq!(
            disarm.tick(at(3000)),
            DisarmStep::Resolved(DisarmOutcome::Failure)
        );
        assert!(!disarm.is_active());
    }

    #[test]
    fn ticks_every_period() {
        let mut disarm = disarm();
        disarm.arm(at(0));
        assert_eq!(disarm.tick(at(499)), DisarmStep::Waiting);
        assert_eq!(disarm.tick(at(500)), DisarmStep::Tick);
        assert_eq!(disarm.tick(at(600)), DisarmStep::Waiting);
        assert_eq!(disarm.tick(at(1000)), DisarmStep::Tick);
        // A stalled loop gets one tick, not a burst.
        assert_eq!(disarm.tick(at(2400)), DisarmStep::Tick);
        assert_eq!(disarm.tick(at(2450)), DisarmStep::Waiting);
    }

    #[test]
    fn usable_once_per_level() {
        let mut disarm = disarm();
        assert!(disarm.eligible(true));
        disarm.arm(at(0));
        disarm.on_shake(at(10));
        assert!(!disarm.eligible(true));
        assert!(!disarm.arm(at(20)));

        disarm.reset();
        assert!(disarm.eligible(true));
        assert!(!disarm.eligible(false));
    }

    #[test]
    fn cancel_clears_schedule() {
        let mut disarm = disarm();
        disarm.arm(at(0));
        disarm.cancel();
        assert!(!disarm.is_active());
        assert_eq!(disarm.tick(at(500)), DisarmStep::Waiting);
        assert_eq!(disarm.remaining(at(100)), ms(0));
    }
}
