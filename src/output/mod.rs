//! Output encoders (PNG still, PNG sequence, animated GIF).
//!
//! Every export destination is an [`OutputTarget`]; opening one yields a
//! [`FrameEncoder`] that accepts frames strictly in order, is finalized with
//! [`FrameEncoder::finish`], and can remove whatever it wrote with
//! [`FrameEncoder::discard`] when an export fails.

mod gif_encoder;
mod png_encoder;
mod png_sequence;

pub use gif_encoder::GifWriter;
pub use png_encoder::PngEncoder;
pub use png_sequence::{PngSequenceWriter, StillWriter};

use crate::error::Result;
use crate::framebuffer::Framebuffer;
use std::path::{Path, PathBuf};

/// Ordered frame sink behind an export.
pub trait FrameEncoder {
    /// Append one frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be written.
    fn encode(&mut self, fb: &Framebuffer) -> Result<()>;

    /// Finalize the output (container trailer, buffered bytes).
    ///
    /// # Errors
    ///
    /// Returns an error if finalizing fails.
    fn finish(&mut self) -> Result<()>;

    /// Remove every file this encoder created.
    ///
    /// # Errors
    ///
    /// Returns the first removal failure other than "already gone".
    fn discard(&mut self) -> Result<()>;

    /// Files written so far.
    fn outputs(&self) -> &[PathBuf];

    /// Frames accepted so far.
    fn frames_encoded(&self) -> usize;
}

/// Where an export goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// One PNG file.
    Still(PathBuf),
    /// Numbered PNG files `{prefix}{index:05}.png` inside `dir`.
    ImageSequence {
        /// Destination directory (created if missing).
        dir: PathBuf,
        /// File name prefix.
        prefix: String,
    },
    /// One animated GIF file.
    Animation(PathBuf),
}

impl OutputTarget {
    /// Still PNG at `path`.
    pub fn still(path: impl Into<PathBuf>) -> Self {
        Self::Still(path.into())
    }

    /// PNG sequence in `dir` named `frame_00000.png`, `frame_00001.png`, ...
    pub fn image_sequence(dir: impl Into<PathBuf>) -> Self {
        Self::ImageSequence {
            dir: dir.into(),
            prefix: "frame_".to_string(),
        }
    }

    /// Animated GIF at `path`.
    pub fn animation(path: impl Into<PathBuf>) -> Self {
        Self::Animation(path.into())
    }

    /// Whether only a single frame is exported.
    #[must_use]
    pub const fn is_still(&self) -> bool {
        matches!(self, Self::Still(_))
    }

    /// Primary path of the target (file, or directory for sequences).
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Still(p) | Self::Animation(p) => p,
            Self::ImageSequence { dir, .. } => dir,
        }
    }

    /// Acquire an encoder for this target.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be prepared or the canvas
    /// is too large for the container.
    pub fn open(&self, canvas_size: (u32, u32), frame_rate: f32, looping: bool) -> Result<Box<dyn FrameEncoder>> {
        Ok(match self {
            Self::Still(path) => Box::new(StillWriter::new(path)),
            Self::ImageSequence { dir, prefix } => Box::new(PngSequenceWriter::create(dir, prefix)?),
            Self::Animation(path) => Box::new(GifWriter::new(path, canvas_size, frame_rate, looping)?),
        })
    }
}

/// Remove `path`, treating "not found" as success.
fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
