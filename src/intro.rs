//! Intro sequence started by the begin button.
//!
//! Time zero is the click. From there:
//!
//! - the loading-screen mask closes over [`REVEAL_DURATION`] (`power4.out`)
//! - background audio starts at once
//! - after [`CAMERA_DELAY`] the camera flies to its final framing over
//!   [`CAMERA_FLIGHT`] (`power1.out`)
//! - interactive control unlocks at [`CAMERA_FLIGHT`]
//!
//! The sequencer is advanced with frame deltas and reports what changed as an
//! [`IntroFrame`]; it never touches the scene itself.

use cgmath::{EuclideanSpace, Point3, VectorSpace};
use instant::Duration;

use crate::cancel::CancellationToken;

pub const REVEAL_DURATION: Duration = Duration::from_secs(2);
pub const CAMERA_DELAY: Duration = Duration::from_secs(3);
/// Length of the camera flight. Also the moment controls unlock.
pub const CAMERA_FLIGHT: Duration = Duration::from_secs(28);

/// Mask radius in percent before the click.
pub const REVEAL_OPEN: f32 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ease {
    Linear,
    /// Quadratic ease-out.
    Power1Out,
    /// Quintic ease-out.
    Power4Out,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power1Out => 1.0 - (1.0 - t).powi(2),
            Ease::Power4Out => 1.0 - (1.0 - t).powi(5),
        }
    }
}

pub trait Lerp: Copy {
    fn lerp_to(self, other: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp_to(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Point3<f32> {
    fn lerp_to(self, other: Self, t: f32) -> Self {
        Point3::from_vec(self.to_vec().lerp(other.to_vec(), t))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween<T: Lerp> {
    pub from: T,
    pub to: T,
    pub start: Duration,
    pub duration: Duration,
    pub ease: Ease,
}

impl<T: Lerp> Tween<T> {
    pub fn end(&self) -> Duration {
        self.start + self.duration
    }

    /// Value at timeline time `at`, held at `from` before the start and at
    /// `to` after the end.
    pub fn value_at(&self, at: Duration) -> T {
        if at <= self.start {
            return self.from;
        }
        if at >= self.end() || self.duration.is_zero() {
            return self.to;
        }
        let t = (at - self.start).as_secs_f32() / self.duration.as_secs_f32();
        self.from.lerp_to(self.to, self.ease.apply(t))
    }

    /// `true` when the frame that moved the clock from `previous` to `now`
    /// touched the tween, however long that frame was.
    fn overlaps(&self, previous: Duration, now: Duration) -> bool {
        previous < self.end() && now >= self.start
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    StartAudio,
    RevealFinished,
    UnlockControls,
    CameraSettled,
}

/// What one advance of the timeline produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IntroFrame {
    /// Loading-screen mask radius in percent, while the reveal runs.
    pub reveal_radius: Option<f32>,
    /// Camera position, while the flight runs.
    pub camera: Option<Point3<f32>>,
    /// Cues whose time was reached during this advance, in timeline order.
    pub cues: Vec<Cue>,
}

#[derive(Clone, Debug)]
pub struct IntroSequencer {
    reveal: Tween<f32>,
    flight: Tween<Point3<f32>>,
    cues: Vec<(Duration, Cue, bool)>,
    elapsed: Duration,
    started: bool,
    cancel: CancellationToken,
}

impl IntroSequencer {
    pub fn new(from: Point3<f32>, to: Point3<f32>, cancel: CancellationToken) -> Self {
        let flight = Tween {
            from,
            to,
            start: CAMERA_DELAY,
            duration: CAMERA_FLIGHT,
            ease: Ease::Power1Out,
        };
        Self {
            reveal: Tween {
                from: REVEAL_OPEN,
                to: 0.0,
                start: Duration::ZERO,
                duration: REVEAL_DURATION,
                ease: Ease::Power4Out,
            },
            cues: vec![
                (Duration::ZERO, Cue::StartAudio, false),
                (REVEAL_DURATION, Cue::RevealFinished, false),
                (CAMERA_FLIGHT, Cue::UnlockControls, false),
                (flight.end(), Cue::CameraSettled, false),
            ],
            flight,
            elapsed: Duration::ZERO,
            started: false,
            cancel,
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Running means started, not cancelled and with cues still pending.
    pub fn is_running(&self) -> bool {
        self.started
            && !self.cancel.is_cancelled()
            && self.cues.iter().any(|(_, _, fired)| !fired)
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Starts the timeline. Starting twice is a no-op.
    pub fn start(&mut self) -> IntroFrame {
        if self.started || self.cancel.is_cancelled() {
            return IntroFrame::default();
        }
        log::info!("intro started");
        self.started = true;
        self.advance(Duration::ZERO)
    }

    pub fn advance(&mut self, dt: Duration) -> IntroFrame {
        if !self.is_running() {
            return IntroFrame::default();
        }
        let previous = self.elapsed;
        self.elapsed += dt;
        let now = self.elapsed;

        let mut frame = IntroFrame::default();
        if self.reveal.overlaps(previous, now) {
            frame.reveal_radius = Some(self.reveal.value_at(now));
        }
        if self.flight.overlaps(previous, now) {
            frame.camera = Some(self.flight.value_at(now));
        }
        for (at, cue, fired) in self.cues.iter_mut() {
            if !*fired && now >= *at {
                *fired = true;
                log::info!("intro cue {:?} at {:.3}s", cue, now.as_secs_f32());
                frame.cues.push(*cue);
            }
        }
        frame
    }
}
