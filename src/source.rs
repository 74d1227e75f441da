//! Raw frame records to validated [`Sequence`]s.
//!
//! Upstream models emit gappy data: a landmark that was not detected shows up
//! as `NaN`/`null` coordinates. [`FrameSource`] keeps such entities in place
//! as not-visible keypoints so entity order never shifts between frames.

use crate::error::{Error, Result};
use crate::sequence::{Bounds, Frame, Keypoint, Sequence, Topology};
use log::debug;
use serde::{Deserialize, Serialize};

/// Default playback rate when none is declared.
pub const DEFAULT_FRAME_RATE: f32 = 30.0;

/// One entity as produced upstream. Missing fields mean "unknown".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawKeypoint {
    /// X coordinate; `None` or `NaN` for a missed detection.
    #[serde(default)]
    pub x: Option<f32>,
    /// Y coordinate; `None` or `NaN` for a missed detection.
    #[serde(default)]
    pub y: Option<f32>,
    /// Optional depth.
    #[serde(default)]
    pub z: Option<f32>,
    /// Optional detection confidence.
    #[serde(default)]
    pub confidence: Option<f32>,
    /// Optional visibility flag.
    #[serde(default)]
    pub visible: Option<bool>,
}

impl RawKeypoint {
    /// Plain 2D coordinate.
    #[must_use]
    pub const fn xy(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: None,
            confidence: None,
            visible: None,
        }
    }

    /// Plain 3D coordinate.
    #[must_use]
    pub const fn xyz(x: f32, y: f32, z: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
            confidence: None,
            visible: None,
        }
    }

    /// Attach a confidence score.
    #[must_use]
    pub const fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    fn into_keypoint(self, entity: usize) -> Keypoint {
        let x = self.x.unwrap_or(f32::NAN);
        let y = self.y.unwrap_or(f32::NAN);
        let gap = !x.is_finite() || !y.is_finite() || self.z.is_some_and(|z| !z.is_finite());

        let confidence = match self.confidence {
            _ if gap => Some(0.0),
            Some(c) if c.is_nan() => Some(0.0),
            Some(c) => Some(c.clamp(0.0, 1.0)),
            None => None,
        };
        let visible = if gap { Some(false) } else { self.visible };

        Keypoint {
            entity,
            x,
            y,
            z: self.z,
            confidence,
            visible,
        }
    }
}

impl From<(f32, f32)> for RawKeypoint {
    fn from((x, y): (f32, f32)) -> Self {
        Self::xy(x, y)
    }
}

/// All entities of one raw frame, in entity order.
pub type RawFrame = Vec<RawKeypoint>;

/// Builder turning raw records into a [`Sequence`].
///
/// # Example
///
/// ```
/// use perennity_viz::source::FrameSource;
///
/// let seq = FrameSource::new()
///     .frame_rate(10.0)
///     .from_coords(&[vec![(0.0, 0.0), (1.0, 1.0)], vec![(f32::NAN, f32::NAN), (2.0, 2.0)]])
///     .unwrap();
///
/// assert_eq!(seq.len(), 2);
/// assert!(!seq.frames()[1].keypoints()[0].is_visible(0.0));
/// ```
#[derive(Debug, Clone)]
pub struct FrameSource {
    frame_rate: f32,
    bounds: Option<Bounds>,
    topology: Topology,
}

impl Default for FrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource {
    /// Source with the default frame rate, no declared bounds and no edges.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            bounds: None,
            topology: Topology::none(),
        }
    }

    /// Declared playback rate of the data.
    #[must_use]
    pub fn frame_rate(mut self, frame_rate: f32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Declared coordinate bounds (otherwise computed from the data).
    #[must_use]
    pub fn bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Connection topology drawn as edges.
    #[must_use]
    pub fn topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Build a sequence from raw frames.
    ///
    /// # Errors
    ///
    /// - [`Error::ShapeMismatch`] naming the first frame whose entity count
    ///   differs from frame 0.
    /// - [`Error::InvalidConnection`] / [`Error::InvalidConfig`] from
    ///   [`Sequence::new`].
    pub fn build(&self, raw: &[RawFrame]) -> Result<Sequence> {
        let expected = raw.first().map_or(0, Vec::len);
        let mut frames = Vec::with_capacity(raw.len());

        for (frame_index, record) in raw.iter().enumerate() {
            if record.len() != expected {
                return Err(Error::ShapeMismatch {
                    frame_index,
                    expected,
                    found: record.len(),
                });
            }
            frames.push(Frame::new(
                record
                    .iter()
                    .enumerate()
                    .map(|(entity, kp)| kp.into_keypoint(entity))
                    .collect(),
            ));
        }

        debug!("built sequence: {} frames x {} entities", frames.len(), expected);
        Sequence::new(frames, self.frame_rate, self.bounds, self.topology.clone())
    }

    /// Build a sequence from per-frame `(x, y)` coordinate lists.
    ///
    /// # Errors
    ///
    /// See [`FrameSource::build`].
    pub fn from_coords(&self, frames: &[Vec<(f32, f32)>]) -> Result<Sequence> {
        let raw: Vec<RawFrame> = frames
            .iter()
            .map(|f| f.iter().copied().map(RawKeypoint::from).collect())
            .collect();
        self.build(&raw)
    }

    /// Build a sequence from a row-major array of
    /// `frames x entities x dims` coordinates, `dims` being 2 or 3.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] if `dims` is not 2 or 3, or if `entities`
    ///   is zero while `data` is not empty.
    /// - [`Error::ShapeMismatch`] if `data` ends with an incomplete frame.
    pub fn from_flat(&self, data: &[f32], entities: usize, dims: usize) -> Result<Sequence> {
        if dims != 2 && dims != 3 {
            return Err(Error::InvalidConfig(format!("dims must be 2 or 3, got {dims}")));
        }
        if data.is_empty() {
            return self.build(&[]);
        }
        if entities == 0 {
            return Err(Error::InvalidConfig(
                "entities must be non-zero for non-empty data".to_string(),
            ));
        }

        let stride = entities * dims;
        let remainder = data.len() % stride;
        if remainder != 0 {
            return Err(Error::ShapeMismatch {
                frame_index: data.len() / stride,
                expected: entities,
                found: remainder / dims,
            });
        }

        let raw: Vec<RawFrame> = data
            .chunks_exact(stride)
            .map(|frame| {
                frame
                    .chunks_exact(dims)
                    .map(|c| match *c {
                        [x, y, z] => RawKeypoint::xyz(x, y, z),
                        [x, y] => RawKeypoint::xy(x, y),
                        _ => RawKeypoint::default(),
                    })
                    .collect()
            })
            .collect();
        self.build(&raw)
    }
}
