//! Rasterization and per-frame rendering.
//!
//! # Algorithms
//!
//! - **Wu's Anti-aliased Line**: Smooth one-pixel edges with sub-pixel accuracy
//! - **Bresenham's Line**: Plain and disc-stamped thick edges
//! - **Midpoint Circle**: Filled keypoint discs
//!
//! # References
//!
//! - Wu, X. (1991). "An Efficient Antialiasing Technique." SIGGRAPH '91.
//! - Bresenham, J. E. (1965). "Algorithm for computer control of a digital plotter."

mod frame;
mod label;
mod primitives;

pub use frame::{FrameRenderer, FrameStats};
pub use label::{draw_label, label_size};
pub use primitives::{draw_circle, draw_line, draw_line_aa, draw_point, draw_thick_line, Drawable};
