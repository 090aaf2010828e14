//! Keyframe tracks read from glTF animations.

use cgmath::{InnerSpace, VectorSpace};

#[derive(Clone, Debug)]
pub enum Keyframes {
    Translation(Vec<cgmath::Vector3<f32>>),
    Rotation(Vec<cgmath::Quaternion<f32>>),
    Scale(Vec<cgmath::Vector3<f32>>),
    Other,
}

impl Keyframes {
    fn len(&self) -> usize {
        match self {
            Keyframes::Translation(v) | Keyframes::Scale(v) => v.len(),
            Keyframes::Rotation(q) => q.len(),
            Keyframes::Other => 0,
        }
    }
}

/// A sampled value of a single channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sample {
    Translation(cgmath::Vector3<f32>),
    Rotation(cgmath::Quaternion<f32>),
    Scale(cgmath::Vector3<f32>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    Step,
}

/// One animated property of one node.
#[derive(Clone, Debug)]
pub struct Channel {
    /// glTF index of the animated node.
    pub node: usize,
    pub keyframes: Keyframes,
    pub timestamps: Vec<f32>,
    pub interpolation: Interpolation,
}

impl Channel {
    /// Value of the channel at `time` seconds, clamped to the first and last key.
    pub fn sample(&self, time: f32) -> Option<Sample> {
        let len = self.timestamps.len().min(self.keyframes.len());
        if len == 0 {
            return None;
        }
        let last = len - 1;
        let (from, to, t) = if time <= self.timestamps[0] {
            (0, 0, 0.0)
        } else if time >= self.timestamps[last] {
            (last, last, 0.0)
        } else {
            // first key strictly after `time`; the guards above keep it in 1..=last
            let to = self.timestamps[..len].partition_point(|&stamp| stamp <= time);
            let from = to - 1;
            let span = self.timestamps[to] - self.timestamps[from];
            let t = if span > 0.0 {
                (time - self.timestamps[from]) / span
            } else {
                0.0
            };
            (from, to, t)
        };
        let t = match self.interpolation {
            Interpolation::Linear => t,
            Interpolation::Step => 0.0,
        };
        match &self.keyframes {
            Keyframes::Translation(v) => Some(Sample::Translation(v[from].lerp(v[to], t))),
            Keyframes::Scale(v) => Some(Sample::Scale(v[from].lerp(v[to], t))),
            Keyframes::Rotation(q) => Some(Sample::Rotation(nlerp(q[from], q[to], t))),
            Keyframes::Other => None,
        }
    }
}

/// Normalized lerp along the shorter arc.
fn nlerp(a: cgmath::Quaternion<f32>, b: cgmath::Quaternion<f32>, t: f32) -> cgmath::Quaternion<f32> {
    let b = if a.dot(b) < 0.0 { -b } else { b };
    let q = a * (1.0 - t) + b * t;
    if q.magnitude2() > 0.0 { q.normalize() } else { a }
}

/// A named animation: all channels that share one glTF animation.
#[derive(Clone, Debug)]
pub struct AnimationClip {
    pub name: String,
    pub channels: Vec<Channel>,
    /// Last timestamp over all channels, in seconds.
    pub duration: f32,
}

impl AnimationClip {
    pub fn new(name: String, channels: Vec<Channel>) -> Self {
        let duration = channels
            .iter()
            .filter_map(|channel| channel.timestamps.last().copied())
            .fold(0.0_f32, f32::max);
        Self {
            name,
            channels,
            duration,
        }
    }
}
