//! Keyframe clips and the mixer that plays them on an attached scene.

use crate::scene::{
    node::{NodePath, Transform},
    SceneGraph,
};
use nalgebra_glm::{Quat, Vec3};

/// Something the render loop can advance once per frame.
pub trait Animator {
    /// Whether advancing currently has any effect.
    fn is_active(&self) -> bool;

    fn advance(&mut self, delta: f32, scene: &mut SceneGraph);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Step,
    Linear,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Keyframes {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
}

/// One animated property of one node.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationChannel {
    /// Path of the target below the model root.
    pub target: NodePath,
    pub interpolation: Interpolation,
    pub times: Vec<f32>,
    pub keyframes: Keyframes,
}

impl AnimationChannel {
    /// Keyframes around `time` and the blend between them. Times outside
    /// the keyframe range hold the first or last value.
    fn span(&self, time: f32) -> Option<(usize, usize, f32)> {
        let last = self.times.len().checked_sub(1)?;
        let next = self.times.partition_point(|&t| t <= time);
        if next == 0 {
            return Some((0, 0, 0.0));
        }
        if next > last {
            return Some((last, last, 0.0));
        }

        let prev = next - 1;
        if self.interpolation == Interpolation::Step {
            return Some((prev, prev, 0.0));
        }
        let length = self.times[next] - self.times[prev];
        let blend = if length > 0.0 {
            (time - self.times[prev]) / length
        } else {
            0.0
        };
        Some((prev, next, blend))
    }

    pub fn sample(&self, time: f32, transform: &mut Transform) {
        let Some((from, to, blend)) = self.span(time) else {
            return;
        };
        match &self.keyframes {
            Keyframes::Translation(values) => {
                if let (Some(a), Some(b)) = (values.get(from), values.get(to)) {
                    transform.translation = nalgebra_glm::lerp(a, b, blend);
                }
            }
            Keyframes::Rotation(values) => {
                if let (Some(a), Some(b)) = (values.get(from), values.get(to)) {
                    transform.rotation = nalgebra_glm::quat_slerp(a, b, blend);
                }
            }
            Keyframes::Scale(values) => {
                if let (Some(a), Some(b)) = (values.get(from), values.get(to)) {
                    transform.scale = nalgebra_glm::lerp(a, b, blend);
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    /// Seconds; the last keyframe time over all channels.
    pub duration: f32,
    pub channels: Vec<AnimationChannel>,
}

impl AnimationClip {
    pub fn new(name: &str, channels: Vec<AnimationChannel>) -> Self {
        let duration = channels
            .iter()
            .filter_map(|channel| channel.times.last().copied())
            .fold(0.0f32, f32::max);
        Self {
            name: name.to_string(),
            duration,
            channels,
        }
    }
}

#[derive(Clone, Debug)]
struct Playback {
    clip: usize,
    time: f32,
}

/// Plays at most one clip of a loaded model, looping, on the scene root it
/// was attached as.
///
/// A freshly built mixer has no clip selected and therefore stays inactive.
#[derive(Clone, Debug)]
pub struct AnimationMixer {
    clips: Vec<AnimationClip>,
    root: usize,
    playback: Option<Playback>,
}

impl AnimationMixer {
    pub fn new(clips: Vec<AnimationClip>, root: usize) -> Self {
        Self {
            clips,
            root,
            playback: None,
        }
    }

    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    /// Starts `index` from time zero. Returns false if there is no such clip.
    pub fn play(&mut self, index: usize) -> bool {
        match self.clips.get(index) {
            Some(clip) => {
                log::debug!("playing clip `{}` ({}s)", clip.name, clip.duration);
                self.playback = Some(Playback {
                    clip: index,
                    time: 0.0,
                });
                true
            }
            None => false,
        }
    }

    pub fn stop(&mut self) {
        self.playback = None;
    }

    pub fn current(&self) -> Option<(&AnimationClip, f32)> {
        self.playback
            .as_ref()
            .map(|p| (&self.clips[p.clip], p.time))
    }
}

impl Animator for AnimationMixer {
    fn is_active(&self) -> bool {
        self.playback.is_some()
    }

    fn advance(&mut self, delta: f32, scene: &mut SceneGraph) {
        let Some(playback) = self.playback.as_mut() else {
            return;
        };
        let clip = &self.clips[playback.clip];
        playback.time += delta;
        if clip.duration > 0.0 {
            playback.time = playback.time.rem_euclid(clip.duration);
        } else {
            playback.time = 0.0;
        }

        let Some(root) = scene.root_mut(self.root) else {
            return;
        };
        for channel in &clip.channels {
            if let Some(node) = root.node_at_mut(&channel.target) {
                channel.sample(playback.time, &mut node.transform);
            }
        }
    }
}
