//! Data-space coordinate bounds.

use super::Frame;
use serde::{Deserialize, Serialize};
use trueno::Vector;

/// Axis-aligned data-space extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Smallest x.
    pub min_x: f32,
    /// Smallest y.
    pub min_y: f32,
    /// Largest x.
    pub max_x: f32,
    /// Largest y.
    pub max_y: f32,
}

impl Bounds {
    /// Unit square, the coordinate space of normalized landmarks.
    pub const UNIT: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    /// Create bounds from corner coordinates.
    #[must_use]
    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Extent along x.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    /// Extent along y.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// Midpoint as `(x, y)`.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        ((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    /// Extent of every positioned, detected keypoint across `frames`.
    ///
    /// Keypoints with non-finite coordinates or zero confidence do not
    /// contribute. Returns `None` when nothing contributes.
    #[must_use]
    pub fn from_frames(frames: &[Frame]) -> Option<Self> {
        let (xs, ys): (Vec<f32>, Vec<f32>) = frames
            .iter()
            .flat_map(Frame::keypoints)
            .filter(|kp| kp.has_position() && kp.effective_confidence() > 0.0)
            .map(|kp| (kp.x, kp.y))
            .unzip();

        if xs.is_empty() {
            return None;
        }

        let xs = Vector::from_vec(xs);
        let ys = Vector::from_vec(ys);

        Some(Self::new(
            xs.min().ok()?,
            ys.min().ok()?,
            xs.max().ok()?,
            ys.max().ok()?,
        ))
    }
}
