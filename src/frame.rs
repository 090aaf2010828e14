//! Frame timing.
//!
//! [`FrameClock`] turns redraw instants into a monotonically increasing elapsed
//! time (fed to the shader uniforms) and the delta since the previous frame
//! (fed to the controls and the mixer). [`Delay`] is a one-shot countdown
//! advanced by those deltas.

use instant::{Duration, Instant};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameTime {
    /// Time since the first frame.
    pub elapsed: Duration,
    /// Time since the previous frame; zero on the first one.
    pub delta: Duration,
}

#[derive(Clone, Debug, Default)]
pub struct FrameClock {
    start: Option<Instant>,
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`. Instants earlier than the previous tick
    /// count as no time passing.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let start = *self.start.get_or_insert(now);
        let last = self.last.unwrap_or(now);
        let now = now.max(last);
        self.last = Some(now);
        FrameTime {
            elapsed: now.duration_since(start),
            delta: now.duration_since(last),
        }
    }
}

/// Fires once after a fixed amount of frame time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delay {
    remaining: Duration,
    fired: bool,
}

impl Delay {
    pub fn new(duration: Duration) -> Self {
        Self {
            remaining: duration,
            fired: false,
        }
    }

    /// `true` on the one call where the countdown runs out.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.fired {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(dt);
        if self.remaining.is_zero() {
            self.fired = true;
            return true;
        }
        false
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}
