//! Playback of glTF animation clips.
//!
//! The mixer owns the clips of one model. `clip_action` hands out a handle to
//! the action of a clip, creating it the first time; actions start paused,
//! loop once playing and only contribute to [`AnimationMixer::sample`] while
//! playing.

use std::ops::{Add, Mul};

use cgmath::{InnerSpace, Quaternion, Vector3, VectorSpace};

use crate::resources::animation::{Clip, Interpolation, Keyframes, Track};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionHandle(usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pose {
    Translation(Vector3<f32>),
    Rotation(Quaternion<f32>),
    Scale(Vector3<f32>),
}

/// A sampled value for one node, keyed by glTF node index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePose {
    pub node: usize,
    pub pose: Pose,
}

#[derive(Debug, Clone)]
struct ClipAction {
    clip: usize,
    time: f32,
    playing: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AnimationMixer {
    clips: Vec<Clip>,
    actions: Vec<ClipAction>,
}

impl AnimationMixer {
    pub fn new(clips: Vec<Clip>) -> Self {
        Self {
            clips,
            actions: Vec::new(),
        }
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    /// Action of the clip at `index`, or `None` if the model has no such clip.
    pub fn clip_action(&mut self, index: usize) -> Option<ActionHandle> {
        if index >= self.clips.len() {
            return None;
        }
        if let Some(existing) = self.actions.iter().position(|action| action.clip == index) {
            return Some(ActionHandle(existing));
        }
        self.actions.push(ClipAction {
            clip: index,
            time: 0.0,
            playing: false,
        });
        Some(ActionHandle(self.actions.len() - 1))
    }

    pub fn play(&mut self, handle: ActionHandle) {
        if let Some(action) = self.actions.get_mut(handle.0) {
            action.playing = true;
        }
    }

    /// Stops the action and rewinds it.
    pub fn stop(&mut self, handle: ActionHandle) {
        if let Some(action) = self.actions.get_mut(handle.0) {
            action.playing = false;
            action.time = 0.0;
        }
    }

    pub fn is_playing(&self, handle: ActionHandle) -> bool {
        self.actions.get(handle.0).is_some_and(|action| action.playing)
    }

    pub fn time(&self, handle: ActionHandle) -> f32 {
        self.actions.get(handle.0).map_or(0.0, |action| action.time)
    }

    pub fn update(&mut self, dt: f32) {
        for action in self.actions.iter_mut().filter(|action| action.playing) {
            let duration = self.clips[action.clip].duration();
            action.time += dt;
            if duration <= 0.0 {
                action.time = 0.0;
            } else if action.time > duration {
                action.time %= duration;
            }
        }
    }

    /// Current pose of every track of every playing action.
    pub fn sample(&self) -> Vec<NodePose> {
        self.actions
            .iter()
            .filter(|action| action.playing)
            .flat_map(|action| {
                self.clips[action.clip]
                    .tracks
                    .iter()
                    .filter_map(move |track| {
                        Some(NodePose {
                            node: track.node,
                            pose: sample_track(track, action.time)?,
                        })
                    })
            })
            .collect()
    }
}

fn sample_track(track: &Track, time: f32) -> Option<Pose> {
    let (i0, i1, t) = find_keyframe(&track.timestamps, time)?;
    let span = track.timestamps[i1] - track.timestamps[i0];
    let mode = track.interpolation;
    Some(match &track.keyframes {
        Keyframes::Translation(values) => Pose::Translation(sample_values(
            values,
            mode,
            (i0, i1, t, span),
            |a: Vector3<f32>, b, t| a.lerp(b, t),
        )?),
        Keyframes::Rotation(values) => {
            let rotation = sample_values(values, mode, (i0, i1, t, span), |a: Quaternion<f32>, b, t| {
                a.slerp(b, t)
            })?;
            match mode {
                Interpolation::CubicSpline => Pose::Rotation(rotation.normalize()),
                _ => Pose::Rotation(rotation),
            }
        }
        Keyframes::Scale(values) => Pose::Scale(sample_values(
            values,
            mode,
            (i0, i1, t, span),
            |a: Vector3<f32>, b, t| a.lerp(b, t),
        )?),
        Keyframes::Other => return None,
    })
}

/// Value between keyframes `i0` and `i1`, `t` of the way through an interval
/// `span` seconds long.
fn sample_values<T>(
    values: &[T],
    mode: Interpolation,
    (i0, i1, t, span): (usize, usize, f32, f32),
    lerp: impl Fn(T, T, f32) -> T,
) -> Option<T>
where
    T: Copy + Add<Output = T> + Mul<f32, Output = T>,
{
    match mode {
        Interpolation::Step => values.get(i0).copied(),
        Interpolation::Linear => Some(lerp(*values.get(i0)?, *values.get(i1)?, t)),
        Interpolation::CubicSpline => Some(hermite(
            *values.get(3 * i0 + 1)?,
            *values.get(3 * i0 + 2)?,
            *values.get(3 * i1 + 1)?,
            *values.get(3 * i1)?,
            t,
            span,
        )),
    }
}

/// Cubic Hermite segment from `v0` (leaving with `out0`) to `v1` (arriving with `in1`).
fn hermite<T>(v0: T, out0: T, v1: T, in1: T, t: f32, span: f32) -> T
where
    T: Copy + Add<Output = T> + Mul<f32, Output = T>,
{
    let t2 = t * t;
    let t3 = t2 * t;
    v0 * (2.0 * t3 - 3.0 * t2 + 1.0)
        + out0 * ((t3 - 2.0 * t2 + t) * span)
        + v1 * (-2.0 * t3 + 3.0 * t2)
        + in1 * ((t3 - t2) * span)
}

/// Keyframe interval around `time` and the blend factor inside it.
fn find_keyframe(times: &[f32], time: f32) -> Option<(usize, usize, f32)> {
    let last = times.len().checked_sub(1)?;
    if time <= times[0] {
        return Some((0, 0, 0.0));
    }
    if time >= times[last] {
        return Some((last, last, 0.0));
    }
    let hi = times.partition_point(|&t| t <= time);
    let lo = hi - 1;
    let span = times[hi] - times[lo];
    let factor = if span.abs() < 1e-8 {
        0.0
    } else {
        (time - times[lo]) / span
    };
    Some((lo, hi, factor))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide_clip() -> Clip {
        Clip {
            name: "slide".to_string(),
            tracks: vec![Track {
                node: 3,
                timestamps: vec![0.0, 1.0, 2.0],
                keyframes: Keyframes::Translation(vec![
                    Vector3::new(0.0, 0.0, 0.0),
                    Vector3::new(1.0, 0.0, 0.0),
                    Vector3::new(1.0, 2.0, 0.0),
                ]),
                interpolation: Interpolation::Linear,
            }],
        }
    }

    #[test]
    fn should_find_keyframe_interval() {
        let times = [0.0, 1.0, 2.0];
        assert_eq!(find_keyframe(&times, -1.0), Some((0, 0, 0.0)));
        assert_eq!(find_keyframe(&times, 1.5), Some((1, 2, 0.5)));
        assert_eq!(find_keyframe(&times, 1.0), Some((1, 2, 0.0)));
        assert_eq!(find_keyframe(&times, 5.0), Some((2, 2, 0.0)));
        assert_eq!(find_keyframe(&[], 0.0), None);
    }

    #[test]
    fn should_not_sample_paused_actions() {
        let mut mixer = AnimationMixer::new(vec![slide_clip()]);
        let action = mixer.clip_action(0).unwrap();
        mixer.update(0.5);
        assert!(mixer.sample().is_empty());
        assert_eq!(mixer.time(action), 0.0);
    }

    #[test]
    fn should_interpolate_and_loop_playing_actions() {
        let mut mixer = AnimationMixer::new(vec![slide_clip()]);
        let action = mixer.clip_action(0).unwrap();
        assert_eq!(mixer.clip_action(0), Some(action));
        mixer.play(action);

        mixer.update(0.5);
        let poses = mixer.sample();
        assert_eq!(poses.len(), 1);
        assert_eq!(poses[0].node, 3);
        assert_eq!(poses[0].pose, Pose::Translation(Vector3::new(0.5, 0.0, 0.0)));

        mixer.update(2.0);
        assert!((mixer.time(action) - 0.5).abs() < 1e-6);
    }

    fn track(interpolation: Interpolation, values: Vec<Vector3<f32>>) -> Track {
        Track {
            node: 0,
            timestamps: vec![0.0, 1.0],
            keyframes: Keyframes::Translation(values),
            interpolation,
        }
    }

    fn sampled_x(track: &Track, time: f32) -> f32 {
        match sample_track(track, time) {
            Some(Pose::Translation(position)) => position.x,
            other => panic!("expected a translation, got {other:?}"),
        }
    }

    #[test]
    fn should_hold_step_keyframes() {
        let step = track(
            Interpolation::Step,
            vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(4.0, 0.0, 0.0)],
        );
        assert_eq!(sampled_x(&step, 0.9), 0.0);
        assert_eq!(sampled_x(&step, 1.0), 4.0);
    }

    #[test]
    fn should_read_cubic_spline_values_between_tangents() {
        let zero = Vector3::new(0.0, 0.0, 0.0);
        // [in, value, out] per keyframe
        let flat = track(
            Interpolation::CubicSpline,
            vec![zero, zero, zero, zero, Vector3::new(2.0, 0.0, 0.0), zero],
        );
        assert!((sampled_x(&flat, 0.5) - 1.0).abs() < 1e-6);
        assert_eq!(sampled_x(&flat, 1.0), 2.0);

        let launched = track(
            Interpolation::CubicSpline,
            vec![zero, zero, Vector3::new(1.0, 0.0, 0.0), zero, zero, zero],
        );
        assert!((sampled_x(&launched, 0.5) - 0.125).abs() < 1e-6);
    }

    #[test]
    fn should_skip_cubic_spline_tracks_missing_tangents() {
        let short = track(
            Interpolation::CubicSpline,
            vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)],
        );
        assert_eq!(sample_track(&short, 0.5), None);
    }

    #[test]
    fn should_reject_missing_clip_index() {
        let mut mixer = AnimationMixer::new(vec![slide_clip()]);
        assert_eq!(mixer.clip_action(1), None);
    }
}
