//! Styling for rendered frames.

use crate::color::Rgba;
use crate::scale::Palette;
use serde::{Deserialize, Serialize};

/// How keypoints are colored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ColorMode {
    /// Every keypoint the same color.
    Uniform {
        /// Point color.
        color: Rgba,
    },
    /// A stable distinct color per entity.
    #[default]
    PerEntity,
    /// Color by detection confidence along a palette.
    Confidence {
        /// Palette from low (0) to high (1) confidence.
        #[serde(default)]
        palette: Palette,
    },
}

/// Visual parameters for one rendering call. Immutable while rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Keypoint disc radius in pixels.
    pub point_radius: f32,
    /// Edge width in pixels; zero hides edges.
    pub edge_width: f32,
    /// Keypoint coloring.
    pub color_mode: ColorMode,
    /// Edge color; `None` uses the color of the edge's first entity.
    pub edge_color: Option<Rgba>,
    /// Canvas background.
    pub background: Rgba,
    /// Draw entity indices next to keypoints.
    pub show_labels: bool,
    /// Label color.
    pub label_color: Rgba,
    /// Anti-alias one-pixel edges.
    pub antialias: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            point_radius: 4.0,
            edge_width: 2.0,
            color_mode: ColorMode::PerEntity,
            edge_color: Some(Rgba::rgb(96, 96, 96)),
            background: Rgba::WHITE,
            show_labels: false,
            label_color: Rgba::BLACK,
            antialias: true,
        }
    }
}

impl Style {
    /// Default style.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the keypoint radius.
    #[must_use]
    pub fn point_radius(mut self, radius: f32) -> Self {
        self.point_radius = radius;
        self
    }

    /// Set the edge width.
    #[must_use]
    pub fn edge_width(mut self, width: f32) -> Self {
        self.edge_width = width;
        self
    }

    /// Set the keypoint color mode.
    #[must_use]
    pub fn color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = mode;
        self
    }

    /// Set a fixed edge color, or `None` to follow the entity color.
    #[must_use]
    pub fn edge_color(mut self, color: Option<Rgba>) -> Self {
        self.edge_color = color;
        self
    }

    /// Set the background color.
    #[must_use]
    pub fn background(mut self, color: Rgba) -> Self {
        self.background = color;
        self
    }

    /// Toggle entity index labels.
    #[must_use]
    pub fn labels(mut self, show: bool) -> Self {
        self.show_labels = show;
        self
    }
}
