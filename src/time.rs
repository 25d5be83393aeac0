//! Millisecond timebase shared by every component.
//!
//! The main loop reads [`Clock::now`] once per tick and hands that instant to
//! everything it services, so all time-dependent decisions within a tick agree.

/// A point on the monotonic millisecond timeline.
pub type Instant = fugit::TimerInstantU64<1000>;

/// A span on the millisecond timeline.
pub type Duration = fugit::MillisDurationU64;

/// Monotonic clock source.
pub trait Clock {
    fn now(&self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Shorthand for a millisecond [`Duration`].
#[must_use]
pub const fn ms(millis: u64) -> Duration {
    Duration::from_ticks(millis)
}

/// Shorthand for an [`Instant`] `millis` after boot.
#[must_use]
pub const fn at(millis: u64) -> Instant {
    Instant::from_ticks(millis)
}

/// Time from `earlier` to `now`, zero if `now` is not after it.
#[must_use]
pub fn since(now: Instant, earlier: Instant) -> Duration {
    now.checked_duration_since(earlier).unwrap_or(ms(0))
}

/// Time left until `deadline`, zero once it has passed.
#[must_use]
pub fn until(now: Instant, deadline: Instant) -> Duration {
    deadline.checked_duration_since(now).unwrap_or(ms(0))
}

/// [`Clock`] backed by `embassy-time`.
#[cfg(feature = "board")]
#[derive(Clone, Copy, Default)]
pub struct EmbassyClock;

#[cfg(feature = "board")]
impl Clock for EmbassyClock {
    fn now(&self) -> Instant {
        at(embassy_time::Instant::now().as_millis())
    }
}
