//! Animation clips read from glTF files.

#[derive(Clone, Debug, PartialEq)]
pub enum Keyframes {
    Translation(Vec<cgmath::Vector3<f32>>),
    Rotation(Vec<cgmath::Quaternion<f32>>),
    Scale(Vec<cgmath::Vector3<f32>>),
    Other,
}

/// How values between two keyframes are computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Linear,
    /// Hold the earlier keyframe until the next one.
    Step,
    /// Hermite spline. Outputs hold `[in-tangent, value, out-tangent]` per keyframe.
    CubicSpline,
}

impl From<gltf::animation::Interpolation> for Interpolation {
    fn from(interpolation: gltf::animation::Interpolation) -> Self {
        match interpolation {
            gltf::animation::Interpolation::Linear => Interpolation::Linear,
            gltf::animation::Interpolation::Step => Interpolation::Step,
            gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
        }
    }
}

/// Keyframes of one channel, targeting one node by glTF index.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub node: usize,
    pub timestamps: Vec<f32>,
    pub keyframes: Keyframes,
    pub interpolation: Interpolation,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Clip {
    pub name: String,
    pub tracks: Vec<Track>,
}

impl Clip {
    /// Time of the last keyframe over all tracks.
    pub fn duration(&self) -> f32 {
        self.tracks
            .iter()
            .filter_map(|track| track.timestamps.last().copied())
            .fold(0.0, f32::max)
    }
}

pub fn read_clips(gltf: &gltf::Document, buffer_data: &[Vec<u8>]) -> Vec<Clip> {
    gltf.animations()
        .map(|animation| {
            let tracks = animation
                .channels()
                .map(|channel| read_track(&channel, buffer_data))
                .collect();
            Clip {
                name: animation
                    .name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("clip-{}", animation.index())),
                tracks,
            }
        })
        .collect()
}

fn read_track(channel: &gltf::animation::Channel<'_>, buffer_data: &[Vec<u8>]) -> Track {
    let reader = channel.reader(|buffer| buffer_data.get(buffer.index()).map(Vec::as_slice));
    let timestamps = match reader.read_inputs() {
        Some(gltf::accessor::Iter::Standard(times)) => times.collect(),
        Some(gltf::accessor::Iter::Sparse(_)) => {
            log::warn!("Sparse animation input in channel {} is not supported", channel.index());
            Vec::new()
        }
        None => {
            log::warn!("No timestamps found in channel {}", channel.index());
            Vec::new()
        }
    };
    let keyframes = match reader.read_outputs() {
        Some(gltf::animation::util::ReadOutputs::Translations(translations)) => {
            Keyframes::Translation(translations.map(Into::into).collect())
        }
        Some(gltf::animation::util::ReadOutputs::Rotations(rotations)) => Keyframes::Rotation(
            rotations
                .into_f32()
                .map(|[x, y, z, w]| cgmath::Quaternion::new(w, x, y, z))
                .collect(),
        ),
        Some(gltf::animation::util::ReadOutputs::Scales(scales)) => {
            Keyframes::Scale(scales.map(Into::into).collect())
        }
        Some(gltf::animation::util::ReadOutputs::MorphTargetWeights(_)) | None => Keyframes::Other,
    };
    let interpolation = Interpolation::from(channel.sampler().interpolation());
    let per_key = if interpolation == Interpolation::CubicSpline { 3 } else { 1 };
    let outputs = match &keyframes {
        Keyframes::Translation(values) | Keyframes::Scale(values) => Some(values.len()),
        Keyframes::Rotation(values) => Some(values.len()),
        Keyframes::Other => None,
    };
    if let Some(outputs) = outputs {
        if outputs != timestamps.len() * per_key {
            log::warn!(
                "Channel {} has {outputs} outputs for {} keyframes ({interpolation:?})",
                channel.index(),
                timestamps.len()
            );
        }
    }
    Track {
        node: channel.target().node().index(),
        timestamps,
        keyframes,
        interpolation,
    }
}
