//! # Perennity-Viz
//!
//! Frame-sequence visualization for tracked landmarks (hand, pose, or any
//! fixed set of entities) with exports to PNG stills, numbered PNG sequences
//! and animated GIFs.
//!
//! The pipeline runs in one direction:
//!
//! ```text
//! FrameSource -> CoordinateMapper -> FrameRenderer -> AnimationDriver
//! ```
//!
//! - **FrameSource** validates raw per-frame records into a [`Sequence`](sequence::Sequence)
//! - **CoordinateMapper** maps data space to pixels with aspect-preserving or stretched fit
//! - **FrameRenderer** draws edges, keypoints and optional labels onto a canvas
//! - **AnimationDriver** runs the export state machine and cleans up on every exit path
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use perennity_viz::prelude::*;
//!
//! let seq = FrameSource::new()
//!     .frame_rate(30.0)
//!     .topology(Topology::new(vec![(0, 1), (1, 2)]))
//!     .from_flat(&[0.0, 0.0, 1.0, 1.0, 2.0, 0.0], 3, 2)?;
//!
//! DataVisualizer::new()
//!     .dimensions(640, 480)
//!     .plot(&seq, "pose.png")?;
//! # Ok::<(), perennity_viz::Error>(())
//! ```
//!
//! ## References
//!
//! - Wu, X. (1991). "An Efficient Antialiasing Technique." SIGGRAPH '91.
//! - Bresenham, J. E. (1965). "Algorithm for computer control of a digital plotter."

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Pixel math converts between float and integer coordinates throughout
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Color types and color space conversions.
pub mod color;

/// Core framebuffer for pixel rendering.
pub mod framebuffer;

/// Geometric primitives (points, lines, rectangles).
pub mod geometry;

/// Scale functions for data-to-visual mappings.
pub mod scale;

// ============================================================================
// Pipeline Modules
// ============================================================================

pub mod sequence;

pub mod source;

/// Data-space to pixel-space mapping.
pub mod mapper;

pub mod canvas;

pub mod style;

/// Rendering and rasterization.
pub mod render;

pub mod animation;

/// Output encoders (PNG, PNG sequence, GIF).
pub mod output;

pub mod config;

pub mod visualizer;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for perennity-viz operations.
pub mod error;

pub use error::{Error, Result};
pub use visualizer::DataVisualizer;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use perennity_viz::prelude::*;
/// ```
pub mod prelude {
    pub use batuta_common::display::WithDimensions;
    pub use crate::animation::{AnimationDriver, CancellationToken, DriverState, ExportReport};
    pub use crate::canvas::Canvas;
    pub use crate::color::{Hsla, Rgba};
    pub use crate::config::{ResampleMode, VizConfig};
    pub use crate::error::{Error, Result};
    pub use crate::framebuffer::Framebuffer;
    pub use crate::geometry::{Line, Point, Rect};
    pub use crate::mapper::{CoordinateMapper, MapperOptions};
    pub use crate::output::OutputTarget;
    pub use crate::render::{FrameRenderer, FrameStats};
    pub use crate::scale::{ColorScale, LinearScale, Palette, Scale};
    pub use crate::sequence::{Bounds, Frame, Keypoint, Sequence, Topology};
    pub use crate::source::{FrameSource, RawFrame, RawKeypoint};
    pub use crate::style::{ColorMode, Style};
    pub use crate::visualizer::DataVisualizer;
}

// ============================================================================
// Tests
// ============================================================================
