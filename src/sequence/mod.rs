//! Frame-sequence data model.
//!
//! A [`Sequence`] is an ordered list of [`Frame`]s that all track the same
//! entities in the same order, plus the metadata shared by every frame:
//! playback rate, optional declared coordinate bounds and the connection
//! [`Topology`] drawn as edges.

mod bounds;
mod topology;

pub use bounds::Bounds;
pub use topology::Topology;

use crate::error::{Error, Result};

/// One tracked entity (landmark) within a frame, in data space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    /// Stable entity identifier (position within the frame).
    pub entity: usize,
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Optional depth coordinate.
    pub z: Option<f32>,
    /// Optional detection confidence in `[0, 1]`.
    pub confidence: Option<f32>,
    /// Optional visibility flag.
    pub visible: Option<bool>,
}

impl Keypoint {
    /// A fully confident keypoint at `(x, y)`.
    #[must_use]
    pub const fn new(entity: usize, x: f32, y: f32) -> Self {
        Self {
            entity,
            x,
            y,
            z: None,
            confidence: None,
            visible: None,
        }
    }

    /// A keypoint explicitly marked as not detected.
    #[must_use]
    pub const fn missing(entity: usize) -> Self {
        Self {
            entity,
            x: f32::NAN,
            y: f32::NAN,
            z: None,
            confidence: Some(0.0),
            visible: Some(false),
        }
    }

    /// Set the depth coordinate.
    #[must_use]
    pub const fn with_z(mut self, z: f32) -> Self {
        self.z = Some(z);
        self
    }

    /// Set the detection confidence.
    #[must_use]
    pub const fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Set the visibility flag.
    #[must_use]
    pub const fn with_visibility(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    /// Confidence used for visibility decisions.
    ///
    /// An explicit `visible == false` always wins; otherwise the explicit
    /// confidence, falling back to `1.0`.
    #[must_use]
    pub fn effective_confidence(&self) -> f32 {
        if self.visible == Some(false) {
            return 0.0;
        }
        match self.confidence {
            Some(c) if c.is_nan() => 0.0,
            Some(c) => c.clamp(0.0, 1.0),
            None => 1.0,
        }
    }

    /// Whether the x/y coordinates are usable.
    #[must_use]
    pub fn has_position(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Whether this keypoint should be drawn at `threshold`.
    #[must_use]
    pub fn is_visible(&self, threshold: f32) -> bool {
        self.has_position() && self.effective_confidence() >= threshold && self.effective_confidence() > 0.0
    }
}

/// One time-indexed snapshot of every tracked entity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    keypoints: Vec<Keypoint>,
}

impl Frame {
    /// Build a frame; entity identifiers are assigned from position.
    #[must_use]
    pub fn new(mut keypoints: Vec<Keypoint>) -> Self {
        for (i, kp) in keypoints.iter_mut().enumerate() {
            kp.entity = i;
        }
        Self { keypoints }
    }

    /// All keypoints in entity order.
    #[must_use]
    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    /// Keypoint for an entity.
    #[must_use]
    pub fn get(&self, entity: usize) -> Option<&Keypoint> {
        self.keypoints.get(entity)
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    /// Whether the frame tracks no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

/// Ordered frames plus shared playback and layout metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    frames: Vec<Frame>,
    frame_rate: f32,
    bounds: Option<Bounds>,
    topology: Topology,
}

impl Sequence {
    /// Build a validated sequence.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] if `frame_rate` is not a positive finite number.
    /// - [`Error::ShapeMismatch`] if a frame's entity count differs from the first frame's.
    /// - [`Error::InvalidConnection`] if the topology references a missing entity.
    pub fn new(
        frames: Vec<Frame>,
        frame_rate: f32,
        bounds: Option<Bounds>,
        topology: Topology,
    ) -> Result<Self> {
        if !frame_rate.is_finite() || frame_rate <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "frame rate must be positive, got {frame_rate}"
            )));
        }

        if let Some(first) = frames.first() {
            let expected = first.len();
            if let Some((frame_index, frame)) =
                frames.iter().enumerate().find(|(_, f)| f.len() != expected)
            {
                return Err(Error::ShapeMismatch {
                    frame_index,
                    expected,
                    found: frame.len(),
                });
            }
            topology.validate(expected)?;
        }

        Ok(Self {
            frames,
            frame_rate,
            bounds,
            topology,
        })
    }

    /// A sequence with no frames.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `frame_rate` is not positive.
    pub fn empty(frame_rate: f32) -> Result<Self> {
        Self::new(Vec::new(), frame_rate, None, Topology::none())
    }

    /// All frames in order.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Frame at `index`.
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the sequence has no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Entities per frame (0 for an empty sequence).
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.frames.first().map_or(0, Frame::len)
    }

    /// Declared playback rate in frames per second.
    #[must_use]
    pub const fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    /// Bounds declared at construction, if any.
    #[must_use]
    pub const fn declared_bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Declared bounds, else the extent of every positioned keypoint.
    #[must_use]
    pub fn data_bounds(&self) -> Option<Bounds> {
        self.bounds.or_else(|| Bounds::from_frames(&self.frames))
    }

    /// Connection topology.
    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }
}
