//! Animation mixer for the particle bundle.
//!
//! Up to [`MAX_CLIPS`] clips play in a loop, each one starting after its own
//! fixed delay. Delays are counted down with the frame deltas handed to
//! [`AnimationMixer::update`], so a mixer that is not updated never starts
//! anything.

use instant::Duration;

use crate::data_structures::scene_graph::ModelBundle;

pub const MAX_CLIPS: usize = 6;

/// Start delay of the clip at `index`: 10 ms for the first two, `20 × index`
/// ms after that.
pub fn start_delay(index: usize) -> Duration {
    if index > 1 {
        Duration::from_millis(20 * index as u64)
    } else {
        Duration::from_millis(10)
    }
}

#[derive(Clone, Debug)]
struct ClipAction {
    clip: usize,
    /// Seconds left before the clip starts.
    delay: f32,
    /// Playback position in seconds.
    time: f32,
    playing: bool,
}

#[derive(Clone, Debug, Default)]
pub struct AnimationMixer {
    actions: Vec<ClipAction>,
}

impl AnimationMixer {
    /// Schedules the first `min(clip_count, MAX_CLIPS)` clips.
    pub fn staggered(clip_count: usize) -> Self {
        let actions = (0..clip_count.min(MAX_CLIPS))
            .map(|clip| ClipAction {
                clip,
                delay: start_delay(clip).as_secs_f32(),
                time: 0.0,
                playing: false,
            })
            .collect();
        Self { actions }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Whether the clip at `index` has started.
    pub fn is_playing(&self, index: usize) -> bool {
        self.actions
            .iter()
            .any(|action| action.clip == index && action.playing)
    }

    /// Playback position of the clip at `index`, if scheduled.
    pub fn clip_time(&self, index: usize) -> Option<f32> {
        self.actions
            .iter()
            .find(|action| action.clip == index)
            .map(|action| action.time)
    }

    /// Advances every action by `dt` seconds and poses the bundle.
    pub fn update(&mut self, dt: f32, bundle: &mut ModelBundle) {
        for action in self.actions.iter_mut() {
            if action.playing {
                action.time += dt;
            } else {
                action.delay -= dt;
                if action.delay <= 0.0 {
                    log::debug!("clip {} started", action.clip);
                    action.playing = true;
                    action.time = -action.delay;
                    action.delay = 0.0;
                }
            }
        }

        for action in self.actions.iter().filter(|action| action.playing) {
            let Some(clip) = bundle.clips.get(action.clip) else {
                continue;
            };
            let time = if clip.duration > 0.0 {
                action.time.rem_euclid(clip.duration)
            } else {
                0.0
            };
            let samples: Vec<_> = clip
                .channels
                .iter()
                .filter_map(|channel| Some((channel.node, channel.sample(time)?)))
                .collect();
            for (node, sample) in samples {
                bundle.apply_sample(node, sample);
            }
        }
        bundle.update_world_transforms();
    }
}
