//! Data-space to canvas-space coordinate mapping.
//!
//! The mapping is an affine transform built once per export from the
//! sequence bounds and the canvas size. Each axis is a [`LinearScale`];
//! aspect-preserving mode gives both axes the same pixels-per-unit factor and
//! centers the content inside the padded viewport.

use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};
use crate::scale::{LinearScale, Scale};
use crate::sequence::{Bounds, Keypoint, Sequence};

/// Options controlling how data space is fitted onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapperOptions {
    /// Scale x and y independently to fill the viewport.
    pub stretch_to_fill: bool,
    /// Pixels-per-unit used on an axis whose data extent is zero.
    pub fallback_scale: Option<f32>,
    /// Empty border kept on every side, in pixels.
    pub padding: u32,
    /// Make data y grow upward instead of downward.
    pub flip_y: bool,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            stretch_to_fill: false,
            fallback_scale: None,
            padding: 0,
            flip_y: false,
        }
    }
}

/// Stateless affine transform from data space to canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    x: LinearScale,
    y: LinearScale,
    viewport: Rect,
}

impl CoordinateMapper {
    /// Build a mapper fitting `bounds` into a `canvas_size` canvas.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDimensions`] if the canvas is empty or smaller than
    ///   twice the padding.
    /// - [`Error::DegenerateBounds`] if either axis has zero or non-finite
    ///   extent and no `fallback_scale` is configured.
    pub fn new(bounds: Bounds, canvas_size: (u32, u32), options: MapperOptions) -> Result<Self> {
        let (width, height) = canvas_size;
        let pad = options.padding.saturating_mul(2);
        if width == 0 || height == 0 || pad >= width || pad >= height {
            return Err(Error::InvalidDimensions { width, height });
        }

        let viewport = Rect::new(
            options.padding as f32,
            options.padding as f32,
            (width - pad) as f32,
            (height - pad) as f32,
        );

        let fallback = options.fallback_scale.filter(|s| s.is_finite() && *s > 0.0);
        let data_w = bounds.width();
        let data_h = bounds.height();
        let fit_x = axis_fit(viewport.width, data_w);
        let fit_y = axis_fit(viewport.height, data_h);

        let (sx, sy) = match (fit_x, fit_y, fallback) {
            (None, _, None) | (_, None, None) => {
                return Err(Error::DegenerateBounds {
                    width: data_w,
                    height: data_h,
                })
            }
            (Some(fx), Some(fy), _) if options.stretch_to_fill => (fx, fy),
            (Some(fx), Some(fy), _) => (fx.min(fy), fx.min(fy)),
            (Some(fx), None, Some(fb)) => (fx, if options.stretch_to_fill { fb } else { fx.min(fb) }),
            (None, Some(fy), Some(fb)) => (if options.stretch_to_fill { fb } else { fy.min(fb) }, fy),
            (None, None, Some(fb)) => (fb, fb),
        };

        let (cx, cy) = center_or_origin(bounds);
        let x = centered_axis(cx, sx, viewport.x, viewport.width, false)?;
        let y = centered_axis(cy, sy, viewport.y, viewport.height, options.flip_y)?;

        Ok(Self { x, y, viewport })
    }

    /// Build a mapper for a whole sequence, using its declared or computed bounds.
    ///
    /// A sequence without a single positioned keypoint (empty, or every
    /// coordinate a gap) maps through [`Bounds::UNIT`]; nothing will be drawn
    /// with it, so frames render as plain background.
    ///
    /// # Errors
    ///
    /// As [`CoordinateMapper::new`].
    pub fn for_sequence(seq: &Sequence, canvas_size: (u32, u32), options: MapperOptions) -> Result<Self> {
        let bounds = seq.data_bounds().unwrap_or(Bounds::UNIT);
        Self::new(bounds, canvas_size, options)
    }

    /// Map a data-space keypoint to canvas pixels.
    #[must_use]
    pub fn map(&self, keypoint: &Keypoint) -> Point {
        self.map_xy(keypoint.x, keypoint.y)
    }

    /// Map raw data-space coordinates to canvas pixels.
    #[must_use]
    pub fn map_xy(&self, x: f32, y: f32) -> Point {
        Point::new(self.x.scale(x), self.y.scale(y))
    }

    /// Padded drawing area in canvas pixels.
    #[must_use]
    pub const fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Pixels per data unit along `(x, y)`.
    #[must_use]
    pub fn factors(&self) -> (f32, f32) {
        (self.x.factor(), self.y.factor().abs())
    }
}

/// Pixels-per-unit that makes `extent` fill `available`, if the extent is usable.
fn axis_fit(available: f32, extent: f32) -> Option<f32> {
    if extent.is_finite() && extent > f32::EPSILON {
        Some(available / extent)
    } else {
        None
    }
}

fn center_or_origin(bounds: Bounds) -> (f32, f32) {
    let (cx, cy) = bounds.center();
    (
        if cx.is_finite() { cx } else { 0.0 },
        if cy.is_finite() { cy } else { 0.0 },
    )
}

/// Axis scale mapping a data window centered on `center` onto `[start, start + length]`.
fn centered_axis(center: f32, factor: f32, start: f32, length: f32, flip: bool) -> Result<LinearScale> {
    let half = length / (2.0 * factor);
    let range = if flip {
        (start + length, start)
    } else {
        (start, start + length)
    };
    LinearScale::new((center - half, center + half), range)
}
