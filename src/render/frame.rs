//! Draws one frame (edges, points, labels) onto a canvas.

use crate::canvas::Canvas;
use crate::color::{entity_color, Rgba};
use crate::error::Result;
use crate::geometry::{Line, Point};
use crate::mapper::CoordinateMapper;
use crate::scale::{ColorScale, Scale};
use crate::sequence::{Frame, Keypoint, Topology};
use crate::style::{ColorMode, Style};

use super::label::draw_label;
use super::primitives::{clip_segment, draw_circle, draw_thick_line, Drawable};

/// What a single [`FrameRenderer::render`] call put on the canvas.
///
/// Points and edges that lie entirely off the canvas are not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Keypoints drawn.
    pub points_drawn: usize,
    /// Edges drawn.
    pub edges_drawn: usize,
}

/// Renders frames with a fixed style and visibility threshold.
///
/// Edges are drawn before points so points stay on top. Keypoints whose
/// confidence is below the threshold are skipped together with every edge
/// touching them. The canvas is never cleared here.
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    style: Style,
    visibility_threshold: f32,
    confidence_scale: Option<ColorScale>,
}

impl FrameRenderer {
    /// Create a renderer. `visibility_threshold` is clamped to `[0, 1]`.
    #[must_use]
    pub fn new(style: Style, visibility_threshold: f32) -> Self {
        let confidence_scale = match style.color_mode {
            ColorMode::Confidence { palette } => Some(ColorScale::unit(palette)),
            _ => None,
        };
        let visibility_threshold = if visibility_threshold.is_nan() {
            0.0
        } else {
            visibility_threshold.clamp(0.0, 1.0)
        };

        Self {
            style,
            visibility_threshold,
            confidence_scale,
        }
    }

    /// The style this renderer draws with.
    #[must_use]
    pub const fn style(&self) -> &Style {
        &self.style
    }

    /// Minimum confidence a keypoint needs to be drawn.
    #[must_use]
    pub const fn visibility_threshold(&self) -> f32 {
        self.visibility_threshold
    }

    /// Fill color for a keypoint under the current color mode.
    #[must_use]
    pub fn point_color(&self, keypoint: &Keypoint) -> Rgba {
        match (&self.style.color_mode, &self.confidence_scale) {
            (ColorMode::Uniform { color }, _) => *color,
            (ColorMode::Confidence { .. }, Some(scale)) => scale.scale(keypoint.effective_confidence()),
            _ => entity_color(keypoint.entity),
        }
    }

    /// Draw `frame` onto `canvas`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SurfaceClosed`](crate::Error::SurfaceClosed) if the
    /// canvas was already released.
    pub fn render(
        &self,
        canvas: &mut Canvas,
        frame: &Frame,
        topology: &Topology,
        mapper: &CoordinateMapper,
    ) -> Result<FrameStats> {
        let fb = canvas.surface_mut()?;
        let mut stats = FrameStats::default();
        let (right, bottom) = (fb.width() as f32 - 1.0, fb.height() as f32 - 1.0);

        let positions: Vec<Option<Point>> = frame
            .keypoints()
            .iter()
            .map(|kp| {
                Some(mapper.map(kp)).filter(|p| kp.is_visible(self.visibility_threshold) && p.is_finite())
            })
            .collect();

        if self.style.edge_width > 0.0 {
            let margin = self.style.edge_width.max(1.0) / 2.0 + 1.0;
            let (min, max) = (Point::new(-margin, -margin), Point::new(right + margin, bottom + margin));
            for &(a, b) in topology.connections() {
                let (Some(Some(start)), Some(Some(end))) = (positions.get(a), positions.get(b)) else {
                    continue;
                };
                // Only the part that can reach the canvas is rasterized
                let Some((start, end)) = clip_segment(*start, *end, min, max) else {
                    continue;
                };
                let color = self
                    .style
                    .edge_color
                    .unwrap_or_else(|| frame.get(a).map_or(Rgba::BLACK, |kp| self.point_color(kp)));

                if self.style.edge_width <= 1.0 {
                    let line = Line::new(start, end);
                    if self.style.antialias {
                        line.draw_aa(fb, color);
                    } else {
                        line.draw(fb, color);
                    }
                } else {
                    draw_thick_line(
                        fb,
                        start.x.round() as i32,
                        start.y.round() as i32,
                        end.x.round() as i32,
                        end.y.round() as i32,
                        self.style.edge_width,
                        color,
                    );
                }
                stats.edges_drawn += 1;
            }
        }

        let radius = self.style.point_radius.max(0.0).round() as i32;
        let reach = radius as f32 + 1.0;
        let on_canvas = |p: &Point| p.x >= -reach && p.y >= -reach && p.x <= right + reach && p.y <= bottom + reach;
        let positions: Vec<Option<Point>> = positions.into_iter().map(|p| p.filter(on_canvas)).collect();

        for (kp, pos) in frame.keypoints().iter().zip(&positions) {
            let Some(p) = pos else { continue };
            draw_circle(fb, p.x.round() as i32, p.y.round() as i32, radius, self.point_color(kp));
            stats.points_drawn += 1;
        }

        if self.style.show_labels {
            let scale = if radius >= 4 { 2 } else { 1 };
            for (kp, pos) in frame.keypoints().iter().zip(&positions) {
                let Some(p) = pos else { continue };
                let offset = radius + 2;
                draw_label(
                    fb,
                    p.x.round() as i32 + offset,
                    p.y.round() as i32 - offset,
                    &kp.entity.to_string(),
                    scale,
                    self.style.label_color,
                );
            }
        }

        Ok(stats)
    }
}
